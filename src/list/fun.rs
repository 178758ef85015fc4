// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::common::*;
use crate::cursor::{CursorIter, ListCursor};
use crate::user::UserID;
use crate::{auth, links};

/// Look up the lists the given user has been added to.
///
/// This stream loads 20 lists per page by default; the page size can be raised to a maximum of
/// 1000 with `with_page_size`.
pub fn memberships<T: Into<UserID>>(user: T, token: &auth::Token) -> CursorIter<ListCursor> {
    let params = ParamList::new().add_user_param(user.into());
    CursorIter::new(links::lists::MEMBERSHIPS, token, Some(params), Some(20))
}

/// Look up the lists the given user is subscribed to, not including lists they own.
///
/// This stream loads 20 lists per page by default; the page size can be raised to a maximum of
/// 1000 with `with_page_size`.
pub fn subscriptions<T: Into<UserID>>(user: T, token: &auth::Token) -> CursorIter<ListCursor> {
    let params = ParamList::new().add_user_param(user.into());
    CursorIter::new(links::lists::SUBSCRIPTIONS, token, Some(params), Some(20))
}

/// Look up the lists created by the given user.
///
/// This stream loads 20 lists per page by default; the page size can be raised to a maximum of
/// 1000 with `with_page_size`.
pub fn ownerships<T: Into<UserID>>(user: T, token: &auth::Token) -> CursorIter<ListCursor> {
    let params = ParamList::new().add_user_param(user.into());
    CursorIter::new(links::lists::OWNERSHIPS, token, Some(params), Some(20))
}

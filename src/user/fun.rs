// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::common::*;
use crate::error::Result;
use crate::{auth, cursor, links};

use super::*;

/// Lookup user information for a single user.
pub async fn show<T: Into<UserID>>(acct: T, token: &auth::Token) -> Result<Response<TwitterUser>> {
    let params = ParamList::new()
        .extended_tweets()
        .add_user_param(acct.into());

    let req = get(links::users::SHOW, token, Some(&params));

    request_with_json_response(req).await
}

/// Lookup the users a given account follows, as a stream of their profiles.
///
/// This stream loads 20 users per page by default; the page size can be raised to a maximum of
/// 200 with `with_page_size`.
pub fn friends_of<T: Into<UserID>>(
    acct: T,
    token: &auth::Token,
) -> cursor::CursorIter<cursor::UserCursor> {
    let params = ParamList::new().add_user_param(acct.into());
    cursor::CursorIter::new(links::users::FRIENDS_LIST, token, Some(params), Some(20))
}

/// Lookup the users a given account follows, as a stream of their IDs.
///
/// This stream loads 500 IDs per page by default; the page size can be raised to a maximum of
/// 5000 with `with_page_size`.
pub fn friends_ids<T: Into<UserID>>(
    acct: T,
    token: &auth::Token,
) -> cursor::CursorIter<cursor::IdCursor> {
    let params = ParamList::new().add_user_param(acct.into());
    cursor::CursorIter::new(links::users::FRIENDS_IDS, token, Some(params), Some(500))
}

/// Lookup the users that follow a given account, as a stream of their profiles.
///
/// This stream loads 20 users per page by default; the page size can be raised to a maximum of
/// 200 with `with_page_size`.
pub fn followers_of<T: Into<UserID>>(
    acct: T,
    token: &auth::Token,
) -> cursor::CursorIter<cursor::UserCursor> {
    let params = ParamList::new().add_user_param(acct.into());
    cursor::CursorIter::new(links::users::FOLLOWERS_LIST, token, Some(params), Some(20))
}

/// Lookup the users that follow a given account, as a stream of their IDs.
///
/// This stream loads 500 IDs per page by default; the page size can be raised to a maximum of
/// 5000 with `with_page_size`.
pub fn followers_ids<T: Into<UserID>>(
    acct: T,
    token: &auth::Token,
) -> cursor::CursorIter<cursor::IdCursor> {
    let params = ParamList::new().add_user_param(acct.into());
    cursor::CursorIter::new(links::users::FOLLOWERS_IDS, token, Some(params), Some(500))
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Types and traits to navigate cursored collections.
//!
//! Much of this module can be considered an implementation detail; the main intended entry point
//! to this code is `CursorIter`, and that can just be used as a stream to ignore the rest of this
//! module. The rest of it is available to make sure consumers of the API can understand precisely
//! what types come out of functions that return `CursorIter`.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::common::*;
use crate::{auth, error, list, user};

/// A continuation marker for one page of a cursored collection.
///
/// Older endpoints report cursors as numbers, newer ones as opaque strings. Both are carried
/// through to the next request verbatim; a numeric cursor is never treated as a counter. A cursor
/// of `0` (or a negative number, or an empty string) is the terminal sentinel meaning no further
/// pages exist, as distinct from a live continuation value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CursorId {
    /// A numeric cursor reference.
    Numeric(i64),
    /// An opaque cursor token.
    Token(String),
}

impl CursorId {
    /// Whether this cursor value means "no further pages".
    pub fn is_terminal(&self) -> bool {
        match self {
            CursorId::Numeric(id) => *id <= 0,
            CursorId::Token(token) => token.is_empty(),
        }
    }
}

impl fmt::Display for CursorId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CursorId::Numeric(id) => write!(f, "{}", id),
            CursorId::Token(token) => f.write_str(token),
        }
    }
}

/// Trait to generalize over paginated views of API results.
///
/// Types that implement Cursor are used as intermediate steps in [`CursorIter`]'s `Stream`
/// implementation, to properly load the data from Twitter. Most of the time you don't need to
/// deal with Cursor structs directly, but you can get them via `CursorIter`'s manual paging
/// functionality.
pub trait Cursor {
    /// What type is being returned by the API call?
    type Item;

    /// Returns a reference to the previous page of results, if the page carried one.
    fn previous_cursor(&self) -> Option<CursorId>;
    /// Returns a reference to the next page of results, if the page carried one.
    fn next_cursor(&self) -> Option<CursorId>;
    /// Consumes the cursor and returns the collection of results from inside.
    fn into_inner(self) -> Vec<Self::Item>;
}

/// Represents a single-page view into a list of user IDs.
///
/// This type is intended to be used in the background by [`CursorIter`] to hold an intermediate
/// list of IDs to iterate over. See that struct's documentation for details.
#[derive(Debug, Deserialize)]
pub struct IdCursor {
    /// Reference to the previous page of results.
    #[serde(default)]
    pub previous_cursor: Option<CursorId>,
    /// Reference to the next page of results.
    #[serde(default)]
    pub next_cursor: Option<CursorId>,
    /// The list of user IDs in this page of results. A page that omits the key entirely is
    /// treated as an empty page.
    #[serde(default)]
    pub ids: Vec<u64>,
}

impl Cursor for IdCursor {
    type Item = u64;

    fn previous_cursor(&self) -> Option<CursorId> {
        self.previous_cursor.clone()
    }

    fn next_cursor(&self) -> Option<CursorId> {
        self.next_cursor.clone()
    }

    fn into_inner(self) -> Vec<Self::Item> {
        self.ids
    }
}

/// Represents a single-page view into a list of users.
#[derive(Debug, Deserialize)]
pub struct UserCursor {
    /// Reference to the previous page of results.
    #[serde(default)]
    pub previous_cursor: Option<CursorId>,
    /// Reference to the next page of results.
    #[serde(default)]
    pub next_cursor: Option<CursorId>,
    /// The list of users in this page of results.
    #[serde(default)]
    pub users: Vec<user::TwitterUser>,
}

impl Cursor for UserCursor {
    type Item = user::TwitterUser;

    fn previous_cursor(&self) -> Option<CursorId> {
        self.previous_cursor.clone()
    }

    fn next_cursor(&self) -> Option<CursorId> {
        self.next_cursor.clone()
    }

    fn into_inner(self) -> Vec<Self::Item> {
        self.users
    }
}

/// Represents a single-page view into a list of lists.
#[derive(Debug, Deserialize)]
pub struct ListCursor {
    /// Reference to the previous page of results.
    #[serde(default)]
    pub previous_cursor: Option<CursorId>,
    /// Reference to the next page of results.
    #[serde(default)]
    pub next_cursor: Option<CursorId>,
    /// The list of lists in this page of results.
    #[serde(default)]
    pub lists: Vec<list::List>,
}

impl Cursor for ListCursor {
    type Item = list::List;

    fn previous_cursor(&self) -> Option<CursorId> {
        self.previous_cursor.clone()
    }

    fn next_cursor(&self) -> Option<CursorId> {
        self.next_cursor.clone()
    }

    fn into_inner(self) -> Vec<Self::Item> {
        self.lists
    }
}

/// Represents a paginated list of results, such as the users who follow a specific user or the
/// lists owned by that user.
///
/// This struct is given by several methods in this library, whenever Twitter would return a
/// cursored list of items. It implements the `Stream` trait, loading items in batches so that
/// several can be immediately returned whenever a single network call completes. No network call
/// is made until the stream is first polled.
///
/// ```rust,no_run
/// # #[tokio::main]
/// # async fn main() {
/// # let token: skylark::Token = unimplemented!();
/// use futures::TryStreamExt;
///
/// skylark::user::followers_of("rustlang", &token)
///     .take_first(10)
///     .try_for_each(|resp| {
///         println!("{}", resp.response.screen_name);
///         futures::future::ok(())
///     })
///     .await
///     .unwrap();
/// # }
/// ```
///
/// The stream yields `Response<T::Item>` on a successful iteration, and `Error` for errors, so
/// network errors, rate-limit errors and other issues are passed directly through in
/// `poll_next()`. The stream will allow you to poll again after an error to re-initiate the
/// failed network call; this way, you can wait for your network connection to return or for your
/// rate limit to refresh and try again with the same state.
///
/// `CursorIter` has a few adaptors of its own that you can use before consuming it.
/// `with_page_size` will let you set how many results are pulled in with a single network call,
/// for the endpoints that support it. `take_first` caps the iteration without handing the cap to
/// the server: once the given number of items has been yielded, no further page is fetched. The
/// cap is a fetch cutoff rather than a truncation, so a page that was already loaded is always
/// served to the end — combine it with `StreamExt::take` if you need an exact count.
///
/// ## Manual paging
///
/// The stream works by loading in a page of results (with size set by the method's default or by
/// `with_page_size`) when it's polled, and serving the individual elements from that
/// locally-cached page until it runs out. If you need to control the network calls yourself, the
/// `call()` method gives you the cursor struct for one page directly; assign `next_cursor` from
/// it between calls to page through results manually.
#[must_use = "cursor iterators are lazy and do nothing unless consumed"]
pub struct CursorIter<T>
where
    T: Cursor + DeserializeOwned,
{
    link: &'static str,
    token: auth::Token,
    params_base: Option<ParamList>,
    /// The number of results returned in one network call.
    ///
    /// Certain calls set their own minimums and maximums for what this value can be. Furthermore,
    /// some calls don't allow you to set the size of the pages at all. Refer to the individual
    /// methods' documentation for specifics.
    pub page_size: Option<i32>,
    /// Reference to the previous page of results, as reported by the most recently loaded page.
    ///
    /// This value is intended to be automatically set and used as part of this struct's `Stream`
    /// implementation. It is made available for those who wish to manually manage network calls
    /// and pagination.
    pub previous_cursor: Option<CursorId>,
    /// Reference to the next page of results, as reported by the most recently loaded page. A
    /// terminal value (`0`, a negative number, or an empty token) indicates that the current page
    /// of results is the last page of the cursor.
    ///
    /// This value is intended to be automatically set and used as part of this struct's `Stream`
    /// implementation. It is made available for those who wish to manually manage network calls
    /// and pagination.
    pub next_cursor: Option<CursorId>,
    limit: Option<usize>,
    emitted: usize,
    loaded: bool,
    loader: Option<FutureResponse<T>>,
    iter: Option<ResponseIter<T::Item>>,
}

impl<T> CursorIter<T>
where
    T: Cursor + DeserializeOwned + Send + 'static,
{
    /// Creates a new instance of CursorIter, with the given parameters and no results loaded.
    ///
    /// This is essentially an internal infrastructure function, not meant to be used from
    /// consumer code.
    #[doc(hidden)]
    pub fn new(
        link: &'static str,
        token: &auth::Token,
        params_base: Option<ParamList>,
        page_size: Option<i32>,
    ) -> CursorIter<T> {
        CursorIter {
            link,
            token: token.clone(),
            params_base,
            page_size,
            previous_cursor: None,
            next_cursor: None,
            limit: None,
            emitted: 0,
            loaded: false,
            loader: None,
            iter: None,
        }
    }

    /// Sets the number of results returned in a single network call.
    ///
    /// Certain calls set their own minimums and maximums for what this value can be. Furthermore,
    /// some calls don't allow you to set the size of the pages at all. Refer to the individual
    /// methods' documentation for specifics. If this method is called for a response that does
    /// not accept changing the page size, no change to the underlying struct will occur.
    ///
    /// Calling this function will invalidate any current results, if any were previously loaded.
    pub fn with_page_size(self, page_size: i32) -> CursorIter<T> {
        if self.page_size.is_some() {
            CursorIter {
                page_size: Some(page_size),
                previous_cursor: None,
                next_cursor: None,
                emitted: 0,
                loaded: false,
                loader: None,
                iter: None,
                ..self
            }
        } else {
            self
        }
    }

    /// Caps the iteration at the given number of items.
    ///
    /// The cap is evaluated between pages: once the stream has yielded at least `limit` items, no
    /// further page is fetched, even if the server reports one. Items remaining on an
    /// already-loaded page are still served, so slightly more than `limit` items may be yielded
    /// when the cap falls in the middle of a page.
    ///
    /// Calling this function will invalidate any current results, if any were previously loaded.
    pub fn take_first(self, limit: usize) -> CursorIter<T> {
        CursorIter {
            limit: Some(limit),
            previous_cursor: None,
            next_cursor: None,
            emitted: 0,
            loaded: false,
            loader: None,
            iter: None,
            ..self
        }
    }

    /// Loads the next page of results.
    ///
    /// This is intended to be used as part of this struct's `Stream` implementation. It is
    /// provided as a convenience for those who wish to manage network calls and pagination
    /// manually.
    pub fn call(&self) -> FutureResponse<T> {
        let cursor = self
            .next_cursor
            .as_ref()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-1".to_string());
        let params = self
            .params_base
            .clone()
            .unwrap_or_default()
            .add_param("cursor", cursor)
            .add_opt_param("count", self.page_size.map(|count| count.to_string()));

        let req = get(self.link, &self.token, Some(&params));

        Box::pin(request_with_json_response(req))
    }

    /// Folds a freshly loaded page into the iteration state, updating the cursor references and
    /// buffering the page's elements.
    fn absorb_page(&mut self, resp: Response<T>) {
        self.loaded = true;
        self.previous_cursor = resp.response.previous_cursor();
        self.next_cursor = resp.response.next_cursor();

        let page = Response::map(resp, |cursor| cursor.into_inner());
        self.iter = Some(page.into_iter());
    }

    /// Serves the next element of the buffered page, if one remains.
    fn next_buffered(&mut self) -> Option<Response<T::Item>> {
        let item = self.iter.as_mut()?.next()?;
        self.emitted += 1;
        Some(item)
    }

    /// Whether the iteration should fetch another page once the buffered one is exhausted: the
    /// most recent page must report a live continuation (or none must have been loaded yet), and
    /// the item cap must not have been reached.
    fn wants_next_page(&self) -> bool {
        let at_end = self.loaded
            && self
                .next_cursor
                .as_ref()
                .map_or(true, |cursor| cursor.is_terminal());
        let at_limit = self.limit.map_or(false, |limit| self.emitted >= limit);

        !at_end && !at_limit
    }
}

impl<T> Stream for CursorIter<T>
where
    T: Cursor + DeserializeOwned + Send + 'static,
    T::Item: Unpin,
{
    type Item = error::Result<Response<T::Item>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(mut fut) = this.loader.take() {
                match fut.as_mut().poll(cx) {
                    Poll::Pending => {
                        this.loader = Some(fut);
                        return Poll::Pending;
                    }
                    Poll::Ready(Err(e)) => return Poll::Ready(Some(Err(e))),
                    Poll::Ready(Ok(resp)) => this.absorb_page(resp),
                }
            }

            if let Some(item) = this.next_buffered() {
                return Poll::Ready(Some(Ok(item)));
            }

            if !this.wants_next_page() {
                return Poll::Ready(None);
            }

            this.loader = Some(this.call());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Token;
    use crate::links;

    fn id_page(json: &str) -> Response<IdCursor> {
        Response {
            rate_limit: RateLimit::default(),
            response: serde_json::from_str(json).unwrap(),
        }
    }

    fn fresh_iter() -> CursorIter<IdCursor> {
        CursorIter::new(
            links::users::FOLLOWERS_IDS,
            &Token::Bearer("test".to_string()),
            None,
            None,
        )
    }

    fn drain(iter: &mut CursorIter<IdCursor>) -> Vec<u64> {
        let mut out = Vec::new();
        while let Some(item) = iter.next_buffered() {
            out.push(item.response);
        }
        out
    }

    #[test]
    fn cursor_id_decodes_numbers_and_tokens() {
        assert_eq!(
            serde_json::from_str::<CursorId>("1374004777531007833").unwrap(),
            CursorId::Numeric(1374004777531007833)
        );
        assert_eq!(
            serde_json::from_str::<CursorId>("\"ABC\"").unwrap(),
            CursorId::Token("ABC".to_string())
        );
    }

    #[test]
    fn terminal_sentinels() {
        assert!(CursorId::Numeric(0).is_terminal());
        assert!(CursorId::Numeric(-1).is_terminal());
        assert!(CursorId::Token(String::new()).is_terminal());
        assert!(!CursorId::Numeric(17).is_terminal());
        assert!(!CursorId::Token("ABC".to_string()).is_terminal());
    }

    #[test]
    fn two_page_iteration_in_order() {
        let mut iter = fresh_iter();
        assert!(iter.wants_next_page(), "first page should be wanted lazily");

        iter.absorb_page(id_page(r#"{"ids": [1, 2, 3], "next_cursor": "ABC"}"#));
        assert_eq!(drain(&mut iter), vec![1, 2, 3]);
        assert!(iter.wants_next_page());
        assert_eq!(iter.next_cursor, Some(CursorId::Token("ABC".to_string())));

        // the follow-up request passes the token through verbatim
        let fut = iter.call();
        drop(fut);

        iter.absorb_page(id_page(r#"{"ids": [4, 5, 6], "next_cursor": 0}"#));
        assert_eq!(drain(&mut iter), vec![4, 5, 6]);
        assert!(!iter.wants_next_page(), "terminal cursor must stop paging");
    }

    #[test]
    fn opaque_token_is_sent_verbatim() {
        let mut iter = fresh_iter();
        iter.absorb_page(id_page(r#"{"ids": [1], "next_cursor": "AaDnwvvzB"}"#));
        drain(&mut iter);

        let params = iter
            .params_base
            .clone()
            .unwrap_or_default()
            .add_param("cursor", iter.next_cursor.as_ref().unwrap().to_string());
        assert_eq!(
            params.get("cursor").map(|v| v.as_ref()),
            Some("AaDnwvvzB")
        );
    }

    #[test]
    fn missing_collection_key_is_an_empty_page() {
        let mut iter = fresh_iter();
        iter.absorb_page(id_page(r#"{"next_cursor": 0, "previous_cursor": 0}"#));

        assert_eq!(drain(&mut iter), Vec::<u64>::new());
        assert!(!iter.wants_next_page());
    }

    #[test]
    fn empty_page_with_live_cursor_keeps_paging() {
        let mut iter = fresh_iter();
        iter.absorb_page(id_page(r#"{"ids": [], "next_cursor": 1234}"#));

        assert_eq!(drain(&mut iter), Vec::<u64>::new());
        assert!(iter.wants_next_page());
    }

    #[test]
    fn limit_within_first_page_suppresses_second_fetch() {
        let mut iter = fresh_iter().take_first(2);
        iter.absorb_page(id_page(r#"{"ids": [1, 2, 3], "next_cursor": 99}"#));

        // the loaded page is served to the end...
        assert_eq!(drain(&mut iter), vec![1, 2, 3]);
        // ...but no further page is fetched
        assert!(!iter.wants_next_page());
    }

    #[test]
    fn limit_past_first_page_fetches_whole_second_page() {
        let mut iter = fresh_iter().take_first(5);
        iter.absorb_page(id_page(r#"{"ids": [1, 2, 3], "next_cursor": 99}"#));
        assert_eq!(drain(&mut iter), vec![1, 2, 3]);
        assert!(iter.wants_next_page(), "3 emitted < limit 5");

        iter.absorb_page(id_page(r#"{"ids": [4, 5, 6], "next_cursor": 100}"#));
        assert_eq!(drain(&mut iter), vec![4, 5, 6]);
        assert!(!iter.wants_next_page(), "6 emitted >= limit 5");
    }

    #[test]
    fn zero_limit_fetches_nothing() {
        let iter = fresh_iter().take_first(0);
        assert!(!iter.wants_next_page());
    }
}

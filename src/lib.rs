// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A library for interacting with Twitter.
//!
//! Everything starts with a [`Token`]: either an app-only Bearer token, or a user-context
//! credential set whose per-request signing is supplied by the caller through the
//! [`SignRequest`] trait. Each function here takes a reference to one and returns a future; the
//! futures resolve to a [`Response`] that pairs the decoded result with the rate-limit headers
//! from the call that produced it.
//!
//! ```rust,no_run
//! # #[tokio::main]
//! # async fn main() {
//! let token = skylark::Token::Bearer("AAAA...".to_string());
//!
//! let rustlang = skylark::user::show("rustlang", &token).await.unwrap();
//! println!(
//!     "{} (@{})",
//!     rustlang.response.name, rustlang.response.screen_name
//! );
//! # }
//! ```
//!
//! ## Paginated collections
//!
//! Twitter serves large collections a page at a time, and the paging protocol differs between
//! endpoint families. This crate papers over the differences by handing out lazy streams:
//!
//! - Cursored endpoints (followers, friends, list memberships) return a
//!   [`CursorIter`][cursor::CursorIter], which follows the `next_cursor` value from each page,
//!   numeric or opaque-token alike, until it reports a terminal value.
//! - Classic search pages through the `search_metadata.next_results` query-string fragment; see
//!   the [`search`] module.
//! - Premium search pages through a top-level `next` token; see the [`premium`] module.
//!
//! All three load pages only as the consumer asks for elements, can be capped with `take_first`,
//! and never modify the parameter set a page was loaded with when they build the follow-up
//! request.
//!
//! ## Errors
//!
//! Failed API calls are classified into [`error::ApiError`], which carries a typed
//! [`kind`][error::ApiErrorKind] derived from the HTTP status and the error body, the server's
//! message, and the rate-limit snapshot from the failing response. Transport failures and
//! deserialization problems get their own variants on [`error::Error`].

#![warn(missing_docs)]

pub mod auth;
mod common;
pub mod cursor;
pub mod error;
mod links;
pub mod list;
pub mod media;
pub mod premium;
pub mod raw;
pub mod search;
pub mod tweet;
pub mod user;

pub use crate::auth::{SignRequest, Token};
pub use crate::common::{RateLimit, Response, ResponseIter};

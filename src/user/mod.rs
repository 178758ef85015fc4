// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Structs and methods for pulling user information from Twitter.
//!
//! ## Types
//!
//! - `UserID`: used as a generic input to many functions, this enum allows you to refer to a user
//!   by a numeric ID or by their screen name.
//! - `TwitterUser`: returned by many functions in this module, this type describes the content of
//!   a user's profile.
//!
//! ## Functions
//!
//! - `show`: direct lookup of a single user's profile.
//! - `friends_of`/`friends_ids` and `followers_of`/`followers_ids`: cursored lookups. These calls
//!   can return more entries than Twitter is willing to return at once, so they're delivered in
//!   pages. This library takes those paginated results and wraps a stream around them that loads
//!   the pages as-needed.

use chrono;
use serde::Deserialize;

use crate::common::*;

mod fun;

pub use self::fun::*;

/// Convenience enum to generalize between referring to an account by numeric ID or by screen
/// name.
///
/// Many API calls ask for a user either by screen name (e.g. `rustlang`) or by a numeric ID
/// assigned to the account (e.g. `165262228`). These calls are abstracted around this enum,
/// and you can pass anything with a `From` conversion into it: a `u64`, a `&str`, a `String`,
/// or a `&TwitterUser` you've already loaded.
///
/// ```rust,no_run
/// # #[tokio::main]
/// # async fn main() {
/// # let token: skylark::Token = unimplemented!();
/// // all of these are equivalent, given that 165262228 is @rustlang's ID
/// let user = skylark::user::show(165262228, &token).await.unwrap();
/// let user = skylark::user::show("rustlang", &token).await.unwrap();
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UserID {
    /// Referring via the account's numeric ID.
    ID(u64),
    /// Referring via the account's screen name.
    ScreenName(CowStr),
}

impl From<u64> for UserID {
    fn from(id: u64) -> UserID {
        UserID::ID(id)
    }
}

impl From<&u64> for UserID {
    fn from(id: &u64) -> UserID {
        UserID::ID(*id)
    }
}

impl From<&'static str> for UserID {
    fn from(name: &'static str) -> UserID {
        UserID::ScreenName(name.into())
    }
}

impl From<String> for UserID {
    fn from(name: String) -> UserID {
        UserID::ScreenName(name.into())
    }
}

impl From<&TwitterUser> for UserID {
    fn from(user: &TwitterUser) -> UserID {
        UserID::ID(user.id)
    }
}

/// Represents a Twitter user.
///
/// Field-level documentation is mostly ripped wholesale from [Twitter's user
/// documentation][api-user].
///
/// [api-user]: https://developer.twitter.com/en/docs/accounts-and-users/follow-search-get-users/api-reference/get-users-show
#[derive(Debug, Clone, Deserialize)]
pub struct TwitterUser {
    /// The unique identifier for this user.
    pub id: u64,
    /// The screen name or handle identifying this user.
    ///
    /// Screen names are unique per-user but can be changed. Use `id` as a user identifier
    /// whenever possible.
    pub screen_name: String,
    /// The name of the user, as they've defined it.
    pub name: String,
    /// The UTC timestamp for when this user account was created on Twitter.
    #[serde(deserialize_with = "deserialize_datetime")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// The user-defined string describing their account.
    pub description: Option<String>,
    /// The user-defined location for this account's profile.
    pub location: Option<String>,
    /// The number of followers this user has.
    pub followers_count: i32,
    /// The number of users this user is following.
    pub friends_count: i32,
    /// The number of tweets (including retweets) posted by this user.
    pub statuses_count: i32,
    /// Indicates whether this user has chosen to protect their tweets.
    pub protected: bool,
    /// Indicates whether this user has a verified account.
    pub verified: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parse_user_profile() {
        let user: TwitterUser = serde_json::from_str(
            r#"{
                "id": 165262228,
                "screen_name": "rustlang",
                "name": "Rust Language",
                "created_at": "Sun Jul 11 11:34:49 +0000 2010",
                "description": "A language empowering everyone.",
                "location": null,
                "followers_count": 100000,
                "friends_count": 50,
                "statuses_count": 4000,
                "protected": false,
                "verified": true
            }"#,
        )
        .unwrap();

        assert_eq!(user.id, 165262228);
        assert_eq!(user.screen_name, "rustlang");
        assert_eq!(user.created_at.year(), 2010);
        assert_eq!(user.created_at.month(), 7);
        assert_eq!(user.created_at.hour(), 11);
        assert!(user.location.is_none());
        assert!(user.verified);
    }

    #[test]
    fn user_id_conversions() {
        assert_eq!(UserID::from(165262228), UserID::ID(165262228));
        assert_eq!(
            UserID::from("rustlang"),
            UserID::ScreenName("rustlang".into())
        );
        assert_eq!(
            UserID::from("rustlang".to_string()),
            UserID::ScreenName("rustlang".into())
        );
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Structs and methods for working with lists.
//!
//! A list is a curated set of accounts whose tweets can be viewed as a combined timeline. The
//! functions in this module look up the lists connected to a given user; they're all cursored
//! lookups, delivered as streams that load pages as-needed.
//!
//! - `ownerships`: lists the user has created.
//! - `subscriptions`: lists the user has subscribed to, excluding their own.
//! - `memberships`: lists the user has been added to by others.

use chrono;
use serde::Deserialize;

use crate::common::*;

mod fun;

pub use self::fun::*;

/// Represents the metadata for a list.
#[derive(Debug, Clone, Deserialize)]
pub struct List {
    /// The numeric ID for this list.
    pub id: u64,
    /// The name of this list.
    pub name: String,
    /// The "slug" of this list, as used in its URL.
    pub slug: String,
    /// The full name of this list, preceded by the owner's handle, e.g. `@rustlang/compiler-team`.
    pub full_name: String,
    /// The user-supplied description of this list.
    pub description: String,
    /// The number of accounts that subscribe to this list.
    pub subscriber_count: u64,
    /// The number of accounts that have been added to this list.
    pub member_count: u64,
    /// The UTC timestamp for when this list was created.
    #[serde(deserialize_with = "deserialize_datetime")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_list() {
        let list: List = serde_json::from_str(
            r#"{
                "id": 84839422,
                "name": "Official Twitter Accounts",
                "slug": "official-twitter-accounts",
                "full_name": "@twitter/official-twitter-accounts",
                "description": "Accounts managed by Twitter, Inc.",
                "subscriber_count": 20,
                "member_count": 0,
                "created_at": "Tue Mar 05 18:10:13 +0000 2013"
            }"#,
        )
        .unwrap();

        assert_eq!(list.id, 84839422);
        assert_eq!(list.slug, "official-twitter-accounts");
        assert_eq!(list.subscriber_count, 20);
    }
}

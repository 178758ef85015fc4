// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! URLs for the API endpoints wrapped by this crate.

pub mod users {
    pub const SHOW: &str = "https://api.twitter.com/1.1/users/show.json";
    pub const FRIENDS_LIST: &str = "https://api.twitter.com/1.1/friends/list.json";
    pub const FRIENDS_IDS: &str = "https://api.twitter.com/1.1/friends/ids.json";
    pub const FOLLOWERS_LIST: &str = "https://api.twitter.com/1.1/followers/list.json";
    pub const FOLLOWERS_IDS: &str = "https://api.twitter.com/1.1/followers/ids.json";
}

pub mod statuses {
    pub const SHOW: &str = "https://api.twitter.com/1.1/statuses/show.json";
    pub const SEARCH: &str = "https://api.twitter.com/1.1/search/tweets.json";
    pub const LIKE: &str = "https://api.twitter.com/1.1/favorites/create.json";
    pub const UNLIKE: &str = "https://api.twitter.com/1.1/favorites/destroy.json";
    pub const RETWEET_STEM: &str = "https://api.twitter.com/1.1/statuses/retweet";
    pub const UNRETWEET_STEM: &str = "https://api.twitter.com/1.1/statuses/unretweet";
}

pub mod lists {
    pub const OWNERSHIPS: &str = "https://api.twitter.com/1.1/lists/ownerships.json";
    pub const SUBSCRIPTIONS: &str = "https://api.twitter.com/1.1/lists/subscriptions.json";
    pub const MEMBERSHIPS: &str = "https://api.twitter.com/1.1/lists/memberships.json";
}

pub mod search {
    /// Stem for the premium search endpoints; the product path and environment label are
    /// appended per-request, e.g. `{PREMIUM_STEM}/30day/{label}.json`.
    pub const PREMIUM_STEM: &str = "https://api.twitter.com/1.1/tweets/search";
}

pub mod media {
    pub const UPLOAD: &str = "https://upload.twitter.com/1.1/media/upload.json";
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Structs and methods for pulling tweet information from Twitter, and acting on tweets.
//!
//! `show` loads a single tweet by ID. `like`/`unlike` and `retweet`/`unretweet` perform the
//! corresponding actions on behalf of the authenticated user; these require a user-context
//! token. Twitter reports repeating an action as an error, so `try_like` and `try_retweet` are
//! provided for the cases where "already done" is an acceptable answer rather than a fault.

use chrono;
use serde::Deserialize;

use crate::common::*;
use crate::error::{ApiErrorKind, Error, Result};
use crate::user::TwitterUser;
use crate::{auth, links};

/// Represents a single status update.
#[derive(Debug, Clone, Deserialize)]
pub struct Tweet {
    /// Numeric ID for this tweet.
    pub id: u64,
    /// UTC timestamp from when this tweet was posted.
    #[serde(deserialize_with = "deserialize_datetime")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// The text of the tweet. With the `tweet_mode=extended` parameter this arrives under the
    /// `full_text` key instead.
    #[serde(alias = "full_text")]
    pub text: String,
    /// The user who posted this tweet. This is not present on tweets loaded as part of a user's
    /// own timeline.
    pub user: Option<Box<TwitterUser>>,
    /// "Approximately" how many times this tweet has been liked by users.
    #[serde(default)]
    pub favorite_count: i32,
    /// How many times this tweet has been retweeted.
    #[serde(default)]
    pub retweet_count: i32,
    /// Indicates whether the authenticated user has liked this tweet. Absent without a
    /// user-context token.
    pub favorited: Option<bool>,
    /// Indicates whether the authenticated user has retweeted this tweet. Absent without a
    /// user-context token.
    pub retweeted: Option<bool>,
    /// The machine-detected language of the tweet text, if available.
    pub lang: Option<String>,
}

/// Lookup a single tweet by numeric ID.
pub async fn show(id: u64, token: &auth::Token) -> Result<Response<Tweet>> {
    let params = ParamList::new()
        .extended_tweets()
        .add_param("id", id.to_string());

    let req = get(links::statuses::SHOW, token, Some(&params));

    request_with_json_response(req).await
}

/// Like the given tweet on behalf of the authenticated user.
///
/// On success the liked tweet is returned. Liking a tweet that the user has already liked is an
/// error; use `try_like` if that case shouldn't be a fault.
pub async fn like(id: u64, token: &auth::Token) -> Result<Response<Tweet>> {
    let params = ParamList::new()
        .extended_tweets()
        .add_param("id", id.to_string());

    let req = post(links::statuses::LIKE, token, Some(&params));

    request_with_json_response(req).await
}

/// Like the given tweet, treating "already liked" as success.
///
/// Returns `Ok(None)` when Twitter reports the tweet as already liked; any other error is
/// returned as-is.
pub async fn try_like(id: u64, token: &auth::Token) -> Result<Option<Response<Tweet>>> {
    match like(id, token).await {
        Ok(resp) => Ok(Some(resp)),
        Err(Error::Api(err)) if err.kind == ApiErrorKind::AlreadyFavorited => Ok(None),
        Err(e) => Err(e),
    }
}

/// Remove a like of the given tweet on behalf of the authenticated user.
pub async fn unlike(id: u64, token: &auth::Token) -> Result<Response<Tweet>> {
    let params = ParamList::new()
        .extended_tweets()
        .add_param("id", id.to_string());

    let req = post(links::statuses::UNLIKE, token, Some(&params));

    request_with_json_response(req).await
}

/// Retweet the given tweet on behalf of the authenticated user.
///
/// On success the new retweet is returned. Retweeting a tweet the user has already retweeted is
/// an error; use `try_retweet` if that case shouldn't be a fault.
pub async fn retweet(id: u64, token: &auth::Token) -> Result<Response<Tweet>> {
    let url = format!("{}/{}.json", links::statuses::RETWEET_STEM, id);
    let params = ParamList::new().extended_tweets();

    let req = post(&url, token, Some(&params));

    request_with_json_response(req).await
}

/// Retweet the given tweet, treating "already retweeted" as success.
///
/// Returns `Ok(None)` when Twitter reports the tweet as already retweeted; any other error is
/// returned as-is.
pub async fn try_retweet(id: u64, token: &auth::Token) -> Result<Option<Response<Tweet>>> {
    match retweet(id, token).await {
        Ok(resp) => Ok(Some(resp)),
        Err(Error::Api(err)) if err.kind == ApiErrorKind::AlreadyRetweeted => Ok(None),
        Err(e) => Err(e),
    }
}

/// Remove a retweet of the given tweet on behalf of the authenticated user.
pub async fn unretweet(id: u64, token: &auth::Token) -> Result<Response<Tweet>> {
    let url = format!("{}/{}.json", links::statuses::UNRETWEET_STEM, id);
    let params = ParamList::new().extended_tweets();

    let req = post(&url, token, Some(&params));

    request_with_json_response(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tweet_with_extended_text() {
        let tweet: Tweet = serde_json::from_str(
            r#"{
                "id": 1050118621198921728,
                "created_at": "Wed Oct 10 20:19:24 +0000 2018",
                "full_text": "To make room for more expression, we will now allow 280 characters in a tweet.",
                "user": {
                    "id": 6253282,
                    "screen_name": "TwitterAPI",
                    "name": "Twitter API",
                    "created_at": "Wed May 23 06:01:13 +0000 2007",
                    "description": null,
                    "location": "San Francisco, CA",
                    "followers_count": 6128663,
                    "friends_count": 12,
                    "statuses_count": 3333,
                    "protected": false,
                    "verified": true
                },
                "favorite_count": 70,
                "retweet_count": 12,
                "favorited": false,
                "retweeted": false,
                "lang": "en"
            }"#,
        )
        .unwrap();

        assert_eq!(tweet.id, 1050118621198921728);
        assert!(tweet.text.starts_with("To make room"));
        assert_eq!(tweet.user.unwrap().screen_name, "TwitterAPI");
        assert_eq!(tweet.favorited, Some(false));
    }

    #[test]
    fn parse_tweet_without_user() {
        let tweet: Tweet = serde_json::from_str(
            r#"{
                "id": 1,
                "created_at": "Tue Mar 21 20:50:14 +0000 2006",
                "text": "just setting up my twttr"
            }"#,
        )
        .unwrap();

        assert!(tweet.user.is_none());
        assert_eq!(tweet.favorite_count, 0);
        assert!(tweet.lang.is_none());
    }
}

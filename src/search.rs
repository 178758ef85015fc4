// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Structs and methods for searching for tweets.
//!
//! Since there are several optional parameters for searches, they're handled with a builder
//! pattern. To begin, call `search` with your requested search term. Additional parameters can be
//! added onto the `SearchBuilder` struct that is returned. When you're ready to load the first
//! page of results, hand your tokens to `call`:
//!
//! ```rust,no_run
//! # #[tokio::main]
//! # async fn main() {
//! # let token: skylark::Token = unimplemented!();
//! use skylark::search::{self, ResultType};
//!
//! let search = search::search("rustlang")
//!     .result_type(ResultType::Recent)
//!     .call(&token)
//!     .await
//!     .unwrap();
//!
//! for tweet in &search.response.statuses {
//!     println!("(@{}) {}", tweet.user.as_ref().unwrap().screen_name, tweet.text);
//! }
//! # }
//! ```
//!
//! Paging through search results works differently from the cursored calls elsewhere in this
//! crate: instead of a cursor value, each page reports a `next_results` query-string fragment.
//! `SearchResult::next_page` re-parses that fragment and merges it over the original search
//! parameters, so fields like `max_id` always come from the fragment verbatim. The original
//! parameter set is cloned for every merge and never modified in place; loading page three does
//! not disturb a handle you kept to page one. If you'd rather not drive the paging yourself,
//! `SearchBuilder::into_stream` folds it into a `Stream` of tweets.

use std::fmt;

use futures::{stream, Stream, StreamExt, TryStreamExt};
use serde::Deserialize;

use crate::common::*;
use crate::tweet::Tweet;
use crate::{auth, error, links};

/// Begin setting up a tweet search with the given query.
pub fn search(query: impl Into<CowStr>) -> SearchBuilder {
    SearchBuilder {
        query: query.into(),
        lang: None,
        result_type: None,
        count: None,
        until: None,
        geocode: None,
        since_id: None,
        max_id: None,
        limit: None,
    }
}

/// Represents what kind of tweets should be included in search results.
#[derive(Debug, Copy, Clone)]
pub enum ResultType {
    /// Return only the most recent tweets in the response.
    Recent,
    /// Return only the most popular tweets in the response.
    Popular,
    /// Include both popular and real-time results in the response.
    Mixed,
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ResultType::Recent => f.write_str("recent"),
            ResultType::Popular => f.write_str("popular"),
            ResultType::Mixed => f.write_str("mixed"),
        }
    }
}

/// Distance measurement used in a location search.
#[derive(Debug, Copy, Clone)]
pub enum Distance {
    /// The given radius in miles.
    Miles(f32),
    /// The given radius in kilometers.
    Kilometers(f32),
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Distance::Miles(radius) => write!(f, "{}mi", radius),
            Distance::Kilometers(radius) => write!(f, "{}km", radius),
        }
    }
}

/// Represents a tweet search query before being sent.
#[must_use = "SearchBuilder is lazy and won't do anything unless `call`ed"]
pub struct SearchBuilder {
    query: CowStr,
    lang: Option<CowStr>,
    result_type: Option<ResultType>,
    count: Option<u32>,
    until: Option<(u32, u32, u32)>,
    geocode: Option<(f64, f64, Distance)>,
    since_id: Option<u64>,
    max_id: Option<u64>,
    limit: Option<usize>,
}

impl SearchBuilder {
    /// Restrict search results to those that have been machine-parsed as the given two-letter
    /// language code.
    pub fn lang(self, lang: impl Into<CowStr>) -> Self {
        SearchBuilder {
            lang: Some(lang.into()),
            ..self
        }
    }

    /// Specify the type of search results to include. The default is `Mixed`.
    pub fn result_type(self, result_type: ResultType) -> Self {
        SearchBuilder {
            result_type: Some(result_type),
            ..self
        }
    }

    /// Set the number of tweets to return per page, up to a maximum of 100. Defaults to 15.
    pub fn count(self, count: u32) -> Self {
        SearchBuilder {
            count: Some(count),
            ..self
        }
    }

    /// Returns tweets created before the given date. Keep in mind that search is limited to the
    /// last 7 days of results, so giving a date here that's older than a week will return no
    /// results.
    pub fn until(self, year: u32, month: u32, day: u32) -> Self {
        SearchBuilder {
            until: Some((year, month, day)),
            ..self
        }
    }

    /// Restricts results to users located within the given radius of the given coordinate. This
    /// is preferably populated from location-tagged tweets, but can be filled in from the user's
    /// profile as a fallback.
    pub fn geocode(self, latitude: f64, longitude: f64, radius: Distance) -> Self {
        SearchBuilder {
            geocode: Some((latitude, longitude, radius)),
            ..self
        }
    }

    /// Restricts results to those with higher IDs than (i.e. that were posted after) the given
    /// tweet ID.
    pub fn since_tweet(self, since_id: u64) -> Self {
        SearchBuilder {
            since_id: Some(since_id),
            ..self
        }
    }

    /// Restricts results to those with IDs no higher than (i.e. that were posted earlier than or
    /// the same time as) the given tweet ID.
    pub fn max_tweet(self, max_id: u64) -> Self {
        SearchBuilder {
            max_id: Some(max_id),
            ..self
        }
    }

    /// Caps the total iteration of `into_stream` at the given number of tweets.
    ///
    /// As with [`CursorIter::take_first`][], the cap is evaluated between pages: a page that was
    /// already loaded is served to the end, and no page is fetched once at least `limit` tweets
    /// have been yielded.
    ///
    /// [`CursorIter::take_first`]: crate::cursor::CursorIter::take_first
    pub fn take_first(self, limit: usize) -> Self {
        SearchBuilder {
            limit: Some(limit),
            ..self
        }
    }

    fn to_params(&self) -> ParamList {
        ParamList::new()
            .extended_tweets()
            .add_param("q", self.query.clone())
            .add_opt_param("lang", self.lang.clone())
            .add_opt_param("result_type", self.result_type.map(|rt| rt.to_string()))
            .add_opt_param("count", self.count.map(|c| c.to_string()))
            .add_opt_param(
                "until",
                self.until
                    .map(|(y, m, d)| format!("{:04}-{:02}-{:02}", y, m, d)),
            )
            .add_opt_param(
                "geocode",
                self.geocode
                    .map(|(lat, lon, radius)| format!("{},{},{}", lat, lon, radius)),
            )
            .add_opt_param("since_id", self.since_id.map(|id| id.to_string()))
            .add_opt_param("max_id", self.max_id.map(|id| id.to_string()))
    }

    /// Finalize the search terms and load the first page of responses.
    pub async fn call(self, token: &auth::Token) -> error::Result<Response<SearchResult>> {
        SearchResult::load(self.to_params(), token).await
    }

    /// Finalize the search terms and iterate over the results as a `Stream`, loading pages as
    /// they're needed.
    pub fn into_stream(
        self,
        token: &auth::Token,
    ) -> impl Stream<Item = error::Result<Response<Tweet>>> {
        let token = token.clone();
        let limit = self.limit;
        let first_page = Some(self.to_params());

        stream::try_unfold(
            (token, first_page, 0usize),
            move |(token, pending, emitted)| async move {
                let params = match pending {
                    Some(params) if limit.map_or(true, |cap| emitted < cap) => params,
                    _ => return Ok::<_, error::Error>(None),
                };
                let page = SearchResult::load(params, &token).await?;
                let next = page.response.next_page_params();
                let emitted = emitted + page.response.statuses.len();
                Ok(Some((page, (token, next, emitted))))
            },
        )
        .map_ok(|page| {
            let statuses = Response::map(page, |result| result.statuses);
            stream::iter(statuses).map(Ok)
        })
        .try_flatten()
    }
}

/// The deserialized shape of one page of search results.
#[derive(Debug, Deserialize)]
struct RawSearch {
    /// A page that omits the key entirely is treated as an empty page.
    #[serde(default)]
    statuses: Vec<Tweet>,
    search_metadata: Option<SearchMetadata>,
}

/// The metadata block returned alongside a page of search results.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchMetadata {
    /// How long the query took to run, in seconds.
    pub completed_in: Option<f64>,
    /// The largest tweet ID in this page of results.
    pub max_id: Option<u64>,
    /// The smallest tweet ID eligible for this page of results.
    pub since_id: Option<u64>,
    /// The search query, as interpreted by Twitter.
    pub query: Option<String>,
    /// The requested page size.
    pub count: Option<u32>,
    /// A query-string fragment (`"?max_id=...&q=..."`) encoding the request for the next page of
    /// results, if one exists.
    pub next_results: Option<String>,
    /// A query-string fragment encoding a request for results newer than this page.
    pub refresh_url: Option<String>,
}

/// Represents one page of search results, and the query parameters that loaded it.
#[derive(Debug)]
pub struct SearchResult {
    /// The list of statuses in this page of results.
    pub statuses: Vec<Tweet>,
    /// The metadata block for this page, if the response carried one.
    pub metadata: Option<SearchMetadata>,
    params: ParamList,
}

impl SearchResult {
    async fn load(params: ParamList, token: &auth::Token) -> error::Result<Response<SearchResult>> {
        let req = get(links::statuses::SEARCH, token, Some(&params));
        let resp: Response<RawSearch> = request_with_json_response(req).await?;

        Ok(Response::map(resp, |raw| SearchResult {
            statuses: raw.statuses,
            metadata: raw.search_metadata,
            params,
        }))
    }

    /// The parameter set a request for the next page of results would use, if this page reported
    /// one.
    ///
    /// The `next_results` fragment is parsed as an urlencoded query string, with each value
    /// percent-decoded, and merged over a copy of the parameters that loaded this page. The
    /// fragment wins wherever the two overlap; `max_id` and friends are taken from it verbatim
    /// rather than being computed locally. An absent, empty, or unparseable fragment means there
    /// is no next page.
    pub fn next_page_params(&self) -> Option<ParamList> {
        let fragment = self.metadata.as_ref()?.next_results.as_deref()?;
        if fragment.is_empty() {
            return None;
        }

        let mut params = self.params.clone();
        for (key, value) in url::form_urlencoded::parse(fragment.trim_start_matches('?').as_bytes())
        {
            params.add_param_ref(key.into_owned(), value.into_owned());
        }
        Some(params)
    }

    /// Loads the next page of search results, or `None` if this page was the last.
    pub async fn next_page(
        &self,
        token: &auth::Token,
    ) -> error::Result<Option<Response<SearchResult>>> {
        match self.next_page_params() {
            Some(params) => Ok(Some(SearchResult::load(params, token).await?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with_next(params: ParamList, next_results: Option<&str>) -> SearchResult {
        SearchResult {
            statuses: Vec::new(),
            metadata: Some(SearchMetadata {
                completed_in: Some(0.035),
                max_id: Some(250126199840518145),
                since_id: Some(24012619984051000),
                query: None,
                count: Some(4),
                next_results: next_results.map(|s| s.to_string()),
                refresh_url: None,
            }),
            params,
        }
    }

    #[test]
    fn next_results_fragment_is_decoded_and_merged() {
        let params = ParamList::new()
            .add_param("q", "#test")
            .add_param("result_type", "recent");
        let page = page_with_next(params, Some("?max_id=123&q=%23test"));

        let next = page.next_page_params().unwrap();
        assert_eq!(next.get("max_id").map(|v| v.as_ref()), Some("123"));
        assert_eq!(next.get("q").map(|v| v.as_ref()), Some("#test"));
        // parameters the fragment doesn't override are carried along
        assert_eq!(next.get("result_type").map(|v| v.as_ref()), Some("recent"));
    }

    #[test]
    fn merging_does_not_touch_the_original_params() {
        let params = ParamList::new().add_param("q", "#test");
        let page = page_with_next(params, Some("?max_id=123&q=%23test"));

        let _ = page.next_page_params();
        let _ = page.next_page_params();

        assert_eq!(page.params.len(), 1);
        assert!(page.params.get("max_id").is_none());
        assert_eq!(page.params.get("q").map(|v| v.as_ref()), Some("#test"));
    }

    #[test]
    fn absent_or_empty_next_results_ends_paging() {
        let params = ParamList::new().add_param("q", "rustlang");

        let page = page_with_next(params.clone(), None);
        assert!(page.next_page_params().is_none());

        let page = page_with_next(params.clone(), Some(""));
        assert!(page.next_page_params().is_none());

        let no_metadata = SearchResult {
            statuses: Vec::new(),
            metadata: None,
            params,
        };
        assert!(no_metadata.next_page_params().is_none());
    }

    #[test]
    fn missing_statuses_key_is_an_empty_page() {
        let raw: RawSearch = serde_json::from_str(
            r#"{"search_metadata": {"completed_in": 0.02, "max_id": 0, "since_id": 0}}"#,
        )
        .unwrap();

        assert!(raw.statuses.is_empty());
        assert!(raw.search_metadata.unwrap().next_results.is_none());
    }

    #[test]
    fn builder_assembles_params() {
        let params = search("rustlang")
            .lang("en")
            .result_type(ResultType::Recent)
            .count(10)
            .until(2022, 3, 8)
            .to_params();

        assert_eq!(params.get("q").map(|v| v.as_ref()), Some("rustlang"));
        assert_eq!(params.get("lang").map(|v| v.as_ref()), Some("en"));
        assert_eq!(params.get("result_type").map(|v| v.as_ref()), Some("recent"));
        assert_eq!(params.get("count").map(|v| v.as_ref()), Some("10"));
        assert_eq!(params.get("until").map(|v| v.as_ref()), Some("2022-03-08"));
        assert_eq!(
            params.get("tweet_mode").map(|v| v.as_ref()),
            Some("extended")
        );
    }
}

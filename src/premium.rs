// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Structs and methods for the premium search endpoints.
//!
//! The premium search APIs sit apart from the standard 7-day search: they're scoped to a
//! [`Product`] (30-day or full-archive) and to a "dev environment" label configured on the
//! developer dashboard, and their responses page through an opaque top-level `next` token instead
//! of a `next_results` query string. Requesting the next page is a fresh call to the same
//! endpoint with `next` merged into a copy of the original parameters; as with classic search,
//! the caller's parameter set is never modified in place.
//!
//! ```rust,no_run
//! # #[tokio::main]
//! # async fn main() {
//! # let token: skylark::Token = unimplemented!();
//! use skylark::premium::{self, Product};
//!
//! let page = premium::search(Product::ThirtyDay, "dev", "rustlang lang:en")
//!     .max_results(100)
//!     .call(&token)
//!     .await
//!     .unwrap();
//!
//! if let Some(older) = page.response.next_page(&token).await.unwrap() {
//!     println!("loaded {} more tweets", older.response.results.len());
//! }
//! # }
//! ```

use chrono::{DateTime, Utc};
use futures::{stream, Stream, StreamExt, TryStreamExt};
use serde::Deserialize;

use crate::common::*;
use crate::tweet::Tweet;
use crate::{auth, error, links};

/// The premium search tier to query against.
#[derive(Debug, Copy, Clone)]
pub enum Product {
    /// Search tweets posted within the last 30 days.
    ThirtyDay,
    /// Search the complete tweet archive, back to the first tweet in 2006.
    FullArchive,
}

impl Product {
    fn as_str(self) -> &'static str {
        match self {
            Product::ThirtyDay => "30day",
            Product::FullArchive => "fullarchive",
        }
    }
}

/// Begin setting up a premium search against the given product and environment label.
pub fn search(
    product: Product,
    label: impl AsRef<str>,
    query: impl Into<CowStr>,
) -> PremiumSearchBuilder {
    PremiumSearchBuilder {
        endpoint: format!(
            "{}/{}/{}.json",
            links::search::PREMIUM_STEM,
            product.as_str(),
            label.as_ref()
        ),
        query: query.into(),
        from_date: None,
        to_date: None,
        max_results: None,
        tag: None,
        limit: None,
    }
}

/// Represents a premium search query before being sent.
#[must_use = "PremiumSearchBuilder is lazy and won't do anything unless `call`ed"]
pub struct PremiumSearchBuilder {
    endpoint: String,
    query: CowStr,
    from_date: Option<DateTime<Utc>>,
    to_date: Option<DateTime<Utc>>,
    max_results: Option<u32>,
    tag: Option<CowStr>,
    limit: Option<usize>,
}

impl PremiumSearchBuilder {
    /// The oldest UTC time from which tweets will be provided.
    pub fn from_date(self, from_date: DateTime<Utc>) -> Self {
        PremiumSearchBuilder {
            from_date: Some(from_date),
            ..self
        }
    }

    /// The newest UTC time from which tweets will be provided, exclusive.
    pub fn to_date(self, to_date: DateTime<Utc>) -> Self {
        PremiumSearchBuilder {
            to_date: Some(to_date),
            ..self
        }
    }

    /// Set the number of tweets to return per page, between 10 and the product's maximum
    /// (100 for sandbox environments, 500 otherwise).
    pub fn max_results(self, max_results: u32) -> Self {
        PremiumSearchBuilder {
            max_results: Some(max_results),
            ..self
        }
    }

    /// A tag to echo back in the response, to correlate rules with their matches.
    pub fn tag(self, tag: impl Into<CowStr>) -> Self {
        PremiumSearchBuilder {
            tag: Some(tag.into()),
            ..self
        }
    }

    /// Caps the total iteration of `into_stream` at the given number of tweets.
    ///
    /// The cap is evaluated between pages: a page that was already loaded is served to the end,
    /// and no page is fetched once at least `limit` tweets have been yielded.
    pub fn take_first(self, limit: usize) -> Self {
        PremiumSearchBuilder {
            limit: Some(limit),
            ..self
        }
    }

    fn to_params(&self) -> ParamList {
        ParamList::new()
            .add_param("query", self.query.clone())
            .add_opt_param(
                "fromDate",
                self.from_date.map(|d| d.format("%Y%m%d%H%M").to_string()),
            )
            .add_opt_param(
                "toDate",
                self.to_date.map(|d| d.format("%Y%m%d%H%M").to_string()),
            )
            .add_opt_param("maxResults", self.max_results.map(|c| c.to_string()))
            .add_opt_param("tag", self.tag.clone())
    }

    /// Finalize the search terms and load the first page of responses.
    pub async fn call(self, token: &auth::Token) -> error::Result<Response<PremiumSearchResult>> {
        let params = self.to_params();
        PremiumSearchResult::load(self.endpoint, params, token).await
    }

    /// Finalize the search terms and iterate over the results as a `Stream`, loading pages as
    /// they're needed.
    pub fn into_stream(
        self,
        token: &auth::Token,
    ) -> impl Stream<Item = error::Result<Response<Tweet>>> {
        let token = token.clone();
        let limit = self.limit;
        let endpoint = self.endpoint.clone();
        let first_page = Some(self.to_params());

        stream::try_unfold(
            (token, first_page, 0usize),
            move |(token, pending, emitted)| {
                let endpoint = endpoint.clone();
                async move {
                    let params = match pending {
                        Some(params) if limit.map_or(true, |cap| emitted < cap) => params,
                        _ => return Ok::<_, error::Error>(None),
                    };
                    let page = PremiumSearchResult::load(endpoint, params, &token).await?;
                    let next = page.response.next_page_params();
                    let emitted = emitted + page.response.results.len();
                    Ok(Some((page, (token, next, emitted))))
                }
            },
        )
        .map_ok(|page| {
            let results = Response::map(page, |result| result.results);
            stream::iter(results).map(Ok)
        })
        .try_flatten()
    }
}

/// The deserialized shape of one page of premium search results.
#[derive(Debug, Deserialize)]
struct RawPremiumSearch {
    /// A page that omits the key entirely is treated as an empty page.
    #[serde(default)]
    results: Vec<Tweet>,
    next: Option<String>,
}

/// Represents one page of premium search results, and the query parameters that loaded it.
#[derive(Debug)]
pub struct PremiumSearchResult {
    /// The list of tweets in this page of results.
    pub results: Vec<Tweet>,
    /// The continuation token for the next page, if one exists.
    pub next: Option<String>,
    endpoint: String,
    params: ParamList,
}

impl PremiumSearchResult {
    async fn load(
        endpoint: String,
        params: ParamList,
        token: &auth::Token,
    ) -> error::Result<Response<PremiumSearchResult>> {
        let req = get(&endpoint, token, Some(&params));
        let resp: Response<RawPremiumSearch> = request_with_json_response(req).await?;

        Ok(Response::map(resp, |raw| PremiumSearchResult {
            results: raw.results,
            next: raw.next,
            endpoint,
            params,
        }))
    }

    /// The parameter set a request for the next page of results would use, if this page reported
    /// one.
    ///
    /// The continuation token is merged as `next` over a copy of the parameters that loaded this
    /// page; the token itself is passed through verbatim. An absent or empty token means there is
    /// no next page.
    pub fn next_page_params(&self) -> Option<ParamList> {
        let next = self.next.as_deref()?;
        if next.is_empty() {
            return None;
        }

        Some(self.params.clone().add_param("next", next.to_string()))
    }

    /// Loads the next page of search results, or `None` if this page was the last.
    pub async fn next_page(
        &self,
        token: &auth::Token,
    ) -> error::Result<Option<Response<PremiumSearchResult>>> {
        match self.next_page_params() {
            Some(params) => Ok(Some(
                PremiumSearchResult::load(self.endpoint.clone(), params, token).await?,
            )),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(params: ParamList, next: Option<&str>) -> PremiumSearchResult {
        PremiumSearchResult {
            results: Vec::new(),
            next: next.map(|s| s.to_string()),
            endpoint: "https://api.twitter.com/1.1/tweets/search/30day/dev.json".to_string(),
            params,
        }
    }

    #[test]
    fn next_token_is_merged_over_a_copy() {
        let params = ParamList::new()
            .add_param("query", "rustlang")
            .add_param("maxResults", "100");
        let page = page(params, Some("NTcxODIyMDMyODMwMjU1MTA0"));

        let next = page.next_page_params().unwrap();
        assert_eq!(
            next.get("next").map(|v| v.as_ref()),
            Some("NTcxODIyMDMyODMwMjU1MTA0")
        );
        assert_eq!(next.get("query").map(|v| v.as_ref()), Some("rustlang"));

        // the original parameter set is left untouched
        assert_eq!(page.params.len(), 2);
        assert!(page.params.get("next").is_none());
    }

    #[test]
    fn absent_or_empty_next_ends_paging() {
        let params = ParamList::new().add_param("query", "rustlang");

        assert!(page(params.clone(), None).next_page_params().is_none());
        assert!(page(params, Some("")).next_page_params().is_none());
    }

    #[test]
    fn missing_results_key_is_an_empty_page() {
        let raw: RawPremiumSearch =
            serde_json::from_str(r#"{"requestParameters": {"maxResults": 100}}"#).unwrap();

        assert!(raw.results.is_empty());
        assert!(raw.next.is_none());
    }

    #[test]
    fn builder_assembles_endpoint_and_params() {
        let builder = search(Product::FullArchive, "research", "from:rustlang");

        assert_eq!(
            builder.endpoint,
            "https://api.twitter.com/1.1/tweets/search/fullarchive/research.json"
        );

        let params = builder.max_results(50).to_params();
        assert_eq!(
            params.get("query").map(|v| v.as_ref()),
            Some("from:rustlang")
        );
        assert_eq!(params.get("maxResults").map(|v| v.as_ref()), Some("50"));
    }
}

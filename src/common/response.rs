// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Infrastructure types related to packaging rate-limit information alongside responses from
//! Twitter, and the functions that execute a request and route error responses through the
//! classifier in the `error` module.

use std::iter::FromIterator;
use std::vec;

use chrono::{DateTime, TimeZone, Utc};
use hyper::{Body, Request};
use serde::de::DeserializeOwned;

use crate::common::Headers;
use crate::error::{self, ApiError};

/// A snapshot of the rate-limit headers attached to a response.
///
/// Twitter reports rate-limit quotas through the `x-rate-limit-limit`, `x-rate-limit-remaining`,
/// and `x-rate-limit-reset` headers. Not every response carries them; a field is `None` when its
/// header was absent, rather than being reported as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RateLimit {
    /// The rate limit ceiling for the given request, if reported.
    pub limit: Option<i32>,
    /// The number of requests left for the current window, if reported.
    pub remaining: Option<i32>,
    /// The UTC instant at which the rate window resets, if reported.
    pub reset_at: Option<DateTime<Utc>>,
}

impl RateLimit {
    /// Reads the rate-limit headers from the given set. Headers that are absent or that fail to
    /// parse leave the corresponding field unset.
    pub fn from_headers(headers: &Headers) -> RateLimit {
        RateLimit {
            limit: header_int(headers, "x-rate-limit-limit"),
            remaining: header_int(headers, "x-rate-limit-remaining"),
            reset_at: header_int(headers, "x-rate-limit-reset")
                .and_then(|secs| Utc.timestamp_opt(i64::from(secs), 0).single()),
        }
    }

    /// The time remaining until the rate window resets, measured against the current clock.
    ///
    /// Returns `None` if the response did not report a reset instant. A reset instant in the past
    /// yields a zero duration.
    pub fn reset_in(&self) -> Option<std::time::Duration> {
        self.reset_in_at(Utc::now())
    }

    /// The time remaining until the rate window resets, measured against the given instant.
    /// `reset_in` defers to this with the current time; it's exposed separately so callers (and
    /// tests) can compute the window against a clock they control.
    pub fn reset_in_at(&self, now: DateTime<Utc>) -> Option<std::time::Duration> {
        let reset_at = self.reset_at?;
        Some((reset_at - now).to_std().unwrap_or_default())
    }
}

fn header_int(headers: &Headers, name: &'static str) -> Option<i32> {
    headers
        .get(name)
        .and_then(|val| val.to_str().ok())
        .and_then(|val| val.parse().ok())
}

/// A helper struct to wrap response data with accompanying rate limit information.
///
/// This is returned by all the API call functions in this crate, so that users always have the
/// most recent quota information on hand.
#[derive(Debug)]
pub struct Response<T> {
    /// The latest rate-limit information returned with the request.
    pub rate_limit: RateLimit,
    /// The decoded response from the request.
    pub response: T,
}

impl<T> Response<T> {
    /// Convert a `Response<T>` to a `Response<U>` by running its contained response through the
    /// given function. This preserves its rate-limit information.
    pub fn map<F, U>(src: Response<T>, fun: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            rate_limit: src.rate_limit,
            response: fun(src.response),
        }
    }

    /// Like `map`, but for a conversion that can fail.
    pub fn try_map<F, U>(src: Response<T>, fun: F) -> error::Result<Response<U>>
    where
        F: FnOnce(T) -> error::Result<U>,
    {
        Ok(Response {
            rate_limit: src.rate_limit,
            response: fun(src.response)?,
        })
    }
}

/// Iterator returned by calling `.into_iter()` on a `Response<Vec<T>>`.
///
/// Each item is wrapped in its own `Response`, carrying the rate-limit information of the call
/// that loaded the page it came from.
pub struct ResponseIter<T> {
    rate_limit: RateLimit,
    resp_iter: vec::IntoIter<T>,
}

impl<T> Iterator for ResponseIter<T> {
    type Item = Response<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.resp_iter.next().map(|item| Response {
            rate_limit: self.rate_limit,
            response: item,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.resp_iter.size_hint()
    }
}

impl<T> DoubleEndedIterator for ResponseIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.resp_iter.next_back().map(|item| Response {
            rate_limit: self.rate_limit,
            response: item,
        })
    }
}

impl<T> ExactSizeIterator for ResponseIter<T> {
    fn len(&self) -> usize {
        self.resp_iter.len()
    }
}

impl<T> IntoIterator for Response<Vec<T>> {
    type Item = Response<T>;
    type IntoIter = ResponseIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        ResponseIter {
            rate_limit: self.rate_limit,
            resp_iter: self.response.into_iter(),
        }
    }
}

impl<T> FromIterator<Response<T>> for Response<Vec<T>> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Response<T>>,
    {
        let mut rate_limit = RateLimit::default();
        let mut items = Vec::new();

        for item in iter {
            // keep the most pessimistic snapshot: the latest reset window, and within the same
            // window, the lowest remaining count
            if item.rate_limit.reset_at > rate_limit.reset_at {
                rate_limit = item.rate_limit;
            } else if item.rate_limit.reset_at == rate_limit.reset_at
                && item.rate_limit.remaining < rate_limit.remaining
            {
                rate_limit = item.rate_limit;
            }
            items.push(item.response);
        }

        Response {
            rate_limit,
            response: items,
        }
    }
}

#[cfg(feature = "native_tls")]
fn connector() -> hyper_tls::HttpsConnector<hyper::client::HttpConnector> {
    hyper_tls::HttpsConnector::new()
}

#[cfg(all(feature = "rustls", not(feature = "native_tls")))]
fn connector() -> hyper_rustls::HttpsConnector<hyper::client::HttpConnector> {
    hyper_rustls::HttpsConnector::with_native_roots()
}

#[cfg(all(
    feature = "rustls_webpki",
    not(any(feature = "native_tls", feature = "rustls"))
))]
fn connector() -> hyper_rustls::HttpsConnector<hyper::client::HttpConnector> {
    hyper_rustls::HttpsConnector::with_webpki_roots()
}

// n.b. this function is re-exported in the `raw` module - these docs are public!
/// Starts the given request and returns hyper's response future directly.
///
/// Transport-level failures (connection errors and the like) surface through the future as
/// `hyper::Error`; they are a separate channel from the API errors classified out of a completed
/// response.
pub fn get_response(request: Request<Body>) -> hyper::client::ResponseFuture {
    let client = hyper::Client::builder().build(connector());
    client.request(request)
}

// n.b. this function is re-exported in the `raw` module - these docs are public!
/// Executes the given request and returns the raw response body, alongside the rate-limit
/// information from the response headers.
///
/// A response with a non-success status code is decoded and classified into an
/// [`ApiError`][crate::error::ApiError] before being returned as `Error::Api`.
pub async fn raw_request(request: Request<Body>) -> error::Result<Response<Vec<u8>>> {
    let resp = get_response(request).await?;
    let (parts, body) = resp.into_parts();
    let body = hyper::body::to_bytes(body).await?;

    if !parts.status.is_success() {
        return Err(error::Error::Api(ApiError::from_response(
            parts.status,
            &body,
            &parts.headers,
        )));
    }

    Ok(Response {
        rate_limit: RateLimit::from_headers(&parts.headers),
        response: body.to_vec(),
    })
}

// n.b. this function is re-exported in the `raw` module - these docs are public!
/// Executes the given request and deserializes its JSON response body into the target type,
/// alongside the rate-limit information from the response headers.
pub async fn request_with_json_response<T: DeserializeOwned>(
    request: Request<Body>,
) -> error::Result<Response<T>> {
    let resp = raw_request(request).await?;
    Response::try_map(resp, |body| Ok(serde_json::from_slice::<T>(&body)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate_limit_headers() -> Headers {
        let mut headers = Headers::new();
        headers.insert("x-rate-limit-limit", "150".parse().unwrap());
        headers.insert("x-rate-limit-remaining", "149".parse().unwrap());
        headers.insert("x-rate-limit-reset", "1339019097".parse().unwrap());
        headers
    }

    #[test]
    fn parse_rate_limit_headers() {
        let rate_limit = RateLimit::from_headers(&rate_limit_headers());

        assert_eq!(rate_limit.limit, Some(150));
        assert_eq!(rate_limit.remaining, Some(149));
        assert_eq!(
            rate_limit.reset_at,
            Utc.timestamp_opt(1339019097, 0).single()
        );
    }

    #[test]
    fn reset_in_against_frozen_clock() {
        let rate_limit = RateLimit::from_headers(&rate_limit_headers());
        let now = Utc.timestamp_opt(1339019097 - 15777, 0).single().unwrap();

        assert_eq!(
            rate_limit.reset_in_at(now),
            Some(std::time::Duration::from_secs(15777))
        );
    }

    #[test]
    fn reset_in_clamps_to_zero_when_window_passed() {
        let rate_limit = RateLimit::from_headers(&rate_limit_headers());
        let now = Utc.timestamp_opt(1339019097 + 60, 0).single().unwrap();

        assert_eq!(
            rate_limit.reset_in_at(now),
            Some(std::time::Duration::from_secs(0))
        );
    }

    #[test]
    fn absent_headers_stay_absent() {
        let rate_limit = RateLimit::from_headers(&Headers::new());

        assert_eq!(rate_limit.limit, None);
        assert_eq!(rate_limit.remaining, None);
        assert_eq!(rate_limit.reset_at, None);
        assert_eq!(rate_limit.reset_in(), None);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A composite error type for all the ways requests can fail, and the classification of API error
//! responses into a typed taxonomy.
//!
//! Whenever a call completes with a non-success status code, the status, the decoded error body,
//! and the response headers are folded into an [`ApiError`]: a kind drawn from [`ApiErrorKind`],
//! the error message and numeric code Twitter reported, and a [`RateLimit`] snapshot from the same
//! response. Classification itself never fails; an undecodable error body simply produces an empty
//! message.
//!
//! Transport failures (connection errors, TLS setup, IO) are separate variants of [`Error`] and
//! never go through classification.

use hyper::StatusCode;
use serde::Deserialize;

use crate::common::{Headers, RateLimit};

/// A convenient shorthand for any function that returns an `Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// A set of errors that can occur when making requests or processing responses.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The API returned an error response. The enclosed value carries the classified kind, the
    /// reported message and code, and the rate-limit state of the failing call.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The web request experienced an error. The enclosed error was returned from hyper.
    #[error("Network error: {0}")]
    NetError(#[from] hyper::Error),
    /// The `native_tls` implementation returned an error. The enclosed error was returned from
    /// `native_tls`.
    #[cfg(feature = "native_tls")]
    #[error("TLS error: {0}")]
    TlsError(#[from] native_tls::Error),
    /// An error was experienced while processing the response stream. The enclosed error was
    /// returned from libstd.
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
    /// An error occurred while parsing the JSON response. The enclosed error was returned from
    /// serde.
    #[error("JSON deserialize error: {0}")]
    DeserializeError(#[from] serde_json::Error),
}

/// The set of error categories an API error response can be classified into.
///
/// Most kinds map directly from the HTTP status of the failing response. The exception is a 403,
/// which is refined by the error message: Twitter reports "already did that" conditions for
/// likes, retweets, and duplicate posts as a generic Forbidden status with a well-known message
/// string, and those are broken out here so callers can match on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// HTTP 400. The request was malformed.
    BadRequest,
    /// HTTP 401. Missing or invalid authentication.
    Unauthorized,
    /// HTTP 403 with no recognized message.
    Forbidden,
    /// HTTP 404. The requested resource does not exist.
    NotFound,
    /// HTTP 406. An invalid format was requested.
    NotAcceptable,
    /// HTTP 403 reporting that the authenticated user has already liked the given status.
    AlreadyFavorited,
    /// HTTP 403 reporting that the authenticated user has already retweeted the given status.
    AlreadyRetweeted,
    /// HTTP 403 reporting that the posted status duplicates a recent one.
    DuplicateStatus,
    /// HTTP 429 (or the legacy 420). The rate limit for this endpoint is exhausted.
    TooManyRequests,
    /// HTTP 500.
    InternalServerError,
    /// HTTP 502 or 503. The service is overloaded or down.
    ServiceUnavailable,
    /// HTTP 504. The upstream request timed out.
    GatewayTimeout,
    /// Media processing rejected the uploaded media as invalid.
    InvalidMedia,
    /// Media processing failed internally.
    MediaInternalError,
    /// Media processing does not support the uploaded format.
    UnsupportedMedia,
    /// Any other 4xx status.
    GenericClientError,
    /// Any other status.
    GenericServerError,
}

/// An error response from the API, classified into an [`ApiErrorKind`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("API error ({kind:?}): {message}")]
pub struct ApiError {
    /// The classified category of this error.
    pub kind: ApiErrorKind,
    /// The error message reported in the response body, or an empty string if none could be
    /// decoded.
    pub message: String,
    /// The numeric error code reported in the response body, if any.
    pub code: Option<i32>,
    /// The rate-limit state of the call that failed.
    pub rate_limit: RateLimit,
}

impl ApiError {
    /// Classifies an error response from its status code, raw body, and headers.
    ///
    /// This is pure construction: a body that fails to decode, or that carries neither an `error`
    /// nor an `errors` key, yields an empty message rather than a failure.
    pub fn from_response(status: StatusCode, body: &[u8], headers: &Headers) -> ApiError {
        let (message, code) = extract_message(body);
        let kind = if status == StatusCode::FORBIDDEN {
            forbidden_refinement(&message).unwrap_or(ApiErrorKind::Forbidden)
        } else {
            kind_for_status(status)
        };

        ApiError {
            kind,
            message,
            code,
            rate_limit: RateLimit::from_headers(headers),
        }
    }

    /// Classifies a failure reported by the asynchronous media-processing pipeline.
    ///
    /// These arrive not as an `error`/`errors` body but as a `{name, message, code}` object in a
    /// media status poll; the `name` selects the kind. Unrecognized names are treated as internal
    /// media errors.
    pub fn from_media_error(error: &MediaError, rate_limit: RateLimit) -> ApiError {
        let kind = match &*error.name {
            "InvalidMedia" => ApiErrorKind::InvalidMedia,
            "InternalError" => ApiErrorKind::MediaInternalError,
            "UnsupportedMedia" => ApiErrorKind::UnsupportedMedia,
            _ => ApiErrorKind::MediaInternalError,
        };

        ApiError {
            kind,
            message: error.message.clone().unwrap_or_default(),
            code: error.code,
            rate_limit,
        }
    }
}

/// An error reported by the media-processing pipeline during an upload status poll.
#[derive(Debug, Clone, PartialEq, Deserialize, thiserror::Error)]
#[error("media error {name} ({code:?}): {message:?}")]
pub struct MediaError {
    /// The name of the error condition.
    pub name: String,
    /// A description of the failure, when one is given.
    #[serde(default)]
    pub message: Option<String>,
    /// A numeric code for the failure, when one is given.
    #[serde(default)]
    pub code: Option<i32>,
}

/// The two body shapes an error response can take: a single `error` string, or an `errors` list
/// of strings or `{message, code}` objects.
#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Single { error: String },
    Multiple { errors: Vec<ErrorRecord> },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorRecord {
    Coded {
        message: String,
        #[serde(default)]
        code: Option<i32>,
    },
    Text(String),
}

fn extract_message(body: &[u8]) -> (String, Option<i32>) {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(ErrorBody::Single { error }) => (error, None),
        Ok(ErrorBody::Multiple { errors }) => match errors.into_iter().next() {
            Some(ErrorRecord::Coded { message, code }) => (message.trim().to_string(), code),
            Some(ErrorRecord::Text(text)) => (text.trim().to_string(), None),
            None => (String::new(), None),
        },
        Err(_) => (String::new(), None),
    }
}

fn kind_for_status(status: StatusCode) -> ApiErrorKind {
    match status.as_u16() {
        400 => ApiErrorKind::BadRequest,
        401 => ApiErrorKind::Unauthorized,
        403 => ApiErrorKind::Forbidden,
        404 => ApiErrorKind::NotFound,
        406 => ApiErrorKind::NotAcceptable,
        420 | 429 => ApiErrorKind::TooManyRequests,
        500 => ApiErrorKind::InternalServerError,
        502 | 503 => ApiErrorKind::ServiceUnavailable,
        504 => ApiErrorKind::GatewayTimeout,
        code if (400..500).contains(&code) => ApiErrorKind::GenericClientError,
        _ => ApiErrorKind::GenericServerError,
    }
}

/// Looks up the extracted 403 message in the fixed set of known "already done" strings. The
/// comparison is exact equality; an unrecognized message gets no override.
fn forbidden_refinement(message: &str) -> Option<ApiErrorKind> {
    match message {
        "Status is a duplicate." => Some(ApiErrorKind::DuplicateStatus),
        "You have already favorited this status." => Some(ApiErrorKind::AlreadyFavorited),
        "You have already retweeted this Tweet." => Some(ApiErrorKind::AlreadyRetweeted),
        "sharing is not permissible for this status (Share validations failed)" => {
            Some(ApiErrorKind::AlreadyRetweeted)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(status: u16, body: &str) -> ApiError {
        ApiError::from_response(
            StatusCode::from_u16(status).unwrap(),
            body.as_bytes(),
            &Headers::new(),
        )
    }

    #[test]
    fn duplicate_status_refinement() {
        let err = classify(403, r#"{"error": "Status is a duplicate."}"#);
        assert_eq!(err.kind, ApiErrorKind::DuplicateStatus);
        assert_eq!(err.message, "Status is a duplicate.");
        assert_eq!(err.code, None);
    }

    #[test]
    fn already_favorited_refinement() {
        let err = classify(403, r#"{"error": "You have already favorited this status."}"#);
        assert_eq!(err.kind, ApiErrorKind::AlreadyFavorited);
    }

    #[test]
    fn already_retweeted_refinement() {
        let err = classify(
            403,
            r#"{"errors": [{"message": "You have already retweeted this Tweet.", "code": 327}]}"#,
        );
        assert_eq!(err.kind, ApiErrorKind::AlreadyRetweeted);
        assert_eq!(err.code, Some(327));
    }

    #[test]
    fn share_validation_refinement() {
        let err = classify(
            403,
            r#"{"error": "sharing is not permissible for this status (Share validations failed)"}"#,
        );
        assert_eq!(err.kind, ApiErrorKind::AlreadyRetweeted);
    }

    #[test]
    fn unrecognized_403_stays_forbidden() {
        let err = classify(403, r#"{"error": "some unrelated message"}"#);
        assert_eq!(err.kind, ApiErrorKind::Forbidden);
        assert_eq!(err.message, "some unrelated message");
    }

    #[test]
    fn refinement_is_exact_match_not_substring() {
        let err = classify(403, r#"{"error": "Status is a duplicate. Sort of."}"#);
        assert_eq!(err.kind, ApiErrorKind::Forbidden);
    }

    #[test]
    fn not_found_with_empty_body() {
        let err = classify(404, "{}");
        assert_eq!(err.kind, ApiErrorKind::NotFound);
        assert_eq!(err.message, "");
        assert_eq!(err.code, None);
    }

    #[test]
    fn errors_list_of_strings_is_trimmed() {
        let err = classify(400, "{\"errors\": [\"  Bad Authentication data.\\n\"]}");
        assert_eq!(err.kind, ApiErrorKind::BadRequest);
        assert_eq!(err.message, "Bad Authentication data.");
    }

    #[test]
    fn errors_list_of_objects_takes_first() {
        let err = classify(
            401,
            r#"{"errors": [{"message": "Could not authenticate you.", "code": 32},
                           {"message": "something else", "code": 99}]}"#,
        );
        assert_eq!(err.kind, ApiErrorKind::Unauthorized);
        assert_eq!(err.message, "Could not authenticate you.");
        assert_eq!(err.code, Some(32));
    }

    #[test]
    fn undecodable_body_still_classifies() {
        let err = classify(503, "<html>Over capacity</html>");
        assert_eq!(err.kind, ApiErrorKind::ServiceUnavailable);
        assert_eq!(err.message, "");
    }

    #[test]
    fn status_table() {
        assert_eq!(classify(406, "{}").kind, ApiErrorKind::NotAcceptable);
        assert_eq!(classify(420, "{}").kind, ApiErrorKind::TooManyRequests);
        assert_eq!(classify(429, "{}").kind, ApiErrorKind::TooManyRequests);
        assert_eq!(classify(500, "{}").kind, ApiErrorKind::InternalServerError);
        assert_eq!(classify(502, "{}").kind, ApiErrorKind::ServiceUnavailable);
        assert_eq!(classify(504, "{}").kind, ApiErrorKind::GatewayTimeout);
        assert_eq!(classify(418, "{}").kind, ApiErrorKind::GenericClientError);
        assert_eq!(classify(599, "{}").kind, ApiErrorKind::GenericServerError);
    }

    #[test]
    fn rate_limit_attached_from_headers() {
        let mut headers = Headers::new();
        headers.insert("x-rate-limit-limit", "15".parse().unwrap());
        headers.insert("x-rate-limit-remaining", "0".parse().unwrap());
        headers.insert("x-rate-limit-reset", "1339019097".parse().unwrap());

        let err = ApiError::from_response(StatusCode::TOO_MANY_REQUESTS, b"{}", &headers);
        assert_eq!(err.kind, ApiErrorKind::TooManyRequests);
        assert_eq!(err.rate_limit.limit, Some(15));
        assert_eq!(err.rate_limit.remaining, Some(0));
    }

    #[test]
    fn media_error_classification() {
        let media: MediaError = serde_json::from_str(
            r#"{"name": "UnsupportedMedia", "message": "Unsupported", "code": 2}"#,
        )
        .unwrap();
        let err = ApiError::from_media_error(&media, RateLimit::default());

        assert_eq!(err.kind, ApiErrorKind::UnsupportedMedia);
        assert_eq!(err.message, "Unsupported");
        assert_eq!(err.code, Some(2));
    }

    #[test]
    fn media_error_unknown_name_falls_back() {
        let media: MediaError =
            serde_json::from_str(r#"{"name": "SomethingNew"}"#).unwrap();
        let err = ApiError::from_media_error(&media, RateLimit::default());

        assert_eq!(err.kind, ApiErrorKind::MediaInternalError);
        assert_eq!(err.message, "");
        assert_eq!(err.code, None);
    }

    #[test]
    fn media_error_name_table() {
        for (name, kind) in &[
            ("InvalidMedia", ApiErrorKind::InvalidMedia),
            ("InternalError", ApiErrorKind::MediaInternalError),
            ("UnsupportedMedia", ApiErrorKind::UnsupportedMedia),
        ] {
            let media = MediaError {
                name: name.to_string(),
                message: None,
                code: None,
            };
            let err = ApiError::from_media_error(&media, RateLimit::default());
            assert_eq!(err.kind, *kind);
        }
    }
}

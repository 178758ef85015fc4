// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Types used to authenticate API calls.
//!
//! Every function in this crate takes a [`Token`], which supplies the `Authorization` header for
//! the requests it makes. Two modes are supported:
//!
//! - `Token::Bearer` carries an OAuth 2 Bearer token for app-only authentication. Most read-only
//!   endpoints accept this mode, with rate limits tracked against the app itself.
//! - `Token::Signed` defers to a caller-supplied [`SignRequest`] implementation that produces a
//!   signed header per request. This is how user-context authentication (OAuth 1.0a) plugs in:
//!   the signing algorithm itself lives outside this crate, and any implementation that can turn
//!   a method/URL/parameter set into an `Authorization` header value will do.
//!
//! ```rust,no_run
//! let token = skylark::Token::Bearer("AAAA...".to_string());
//! ```

pub(crate) mod raw;

use std::fmt;
use std::sync::Arc;

use hyper::Method;

use crate::common::ParamList;

/// A per-request signing function for user-context authentication.
///
/// Implementations receive everything that participates in a request signature: the HTTP method,
/// the base URL (without its query string), and the full set of parameters that will be sent in
/// the query string or an urlencoded body. They return the complete value of the `Authorization`
/// header, e.g. `OAuth oauth_consumer_key="...", ...`.
pub trait SignRequest: Send + Sync {
    /// Produces the `Authorization` header value for a request with the given shape.
    fn authorization(&self, method: &Method, url: &str, params: Option<&ParamList>) -> String;
}

/// A token that can be used to sign requests to the API.
#[derive(Clone)]
pub enum Token {
    /// An OAuth 2 Bearer token, for app-only endpoints.
    Bearer(String),
    /// A user-context credential set, signed per-request by the given signer.
    Signed(Arc<dyn SignRequest>),
}

impl Token {
    /// Wraps the given signer into a `Token`.
    pub fn signed(signer: impl SignRequest + 'static) -> Token {
        Token::Signed(Arc::new(signer))
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Bearer(_) => f.write_str("Token::Bearer(..)"),
            Token::Signed(_) => f.write_str("Token::Signed(..)"),
        }
    }
}

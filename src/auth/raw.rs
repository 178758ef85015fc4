// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Internal mechanisms for the `auth` module.

use hyper::header::{AUTHORIZATION, CONTENT_TYPE};
use hyper::{Body, Method, Request};

use crate::common::*;

use super::Token;

pub struct RequestBuilder<'a> {
    base_uri: &'a str,
    method: Method,
    params: Option<ParamList>,
    query: Option<String>,
    body: Option<(Body, &'static str)>,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(method: Method, base_uri: &'a str) -> Self {
        RequestBuilder {
            base_uri,
            method,
            params: None,
            query: None,
            body: None,
        }
    }

    pub fn with_query_params(self, params: &ParamList) -> Self {
        let total_params = if let Some(mut my_params) = self.params {
            my_params.combine(params.clone());
            my_params
        } else {
            params.clone()
        };
        RequestBuilder {
            query: Some(params.to_urlencoded()),
            params: Some(total_params),
            ..self
        }
    }

    pub fn with_body_params(self, params: &ParamList) -> Self {
        let total_params = if let Some(mut my_params) = self.params {
            my_params.combine(params.clone());
            my_params
        } else {
            params.clone()
        };
        RequestBuilder {
            body: Some((
                Body::from(params.to_urlencoded()),
                "application/x-www-form-urlencoded",
            )),
            params: Some(total_params),
            ..self
        }
    }

    pub fn with_body_json(self, body: impl serde::Serialize) -> Self {
        self.with_body(
            serde_json::to_string(&body).unwrap(),
            "application/json; charset=UTF-8",
        )
    }

    pub fn with_body(self, body: impl Into<Body>, content: &'static str) -> Self {
        RequestBuilder {
            body: Some((body.into(), content)),
            ..self
        }
    }

    pub fn request_token(self, token: &Token) -> Request<Body> {
        match token {
            Token::Bearer(bearer) => self.request_authorization(format!("Bearer {}", bearer)),
            Token::Signed(signer) => {
                let header =
                    signer.authorization(&self.method, self.base_uri, self.params.as_ref());
                self.request_authorization(header)
            }
        }
    }

    fn request_authorization(self, authorization: String) -> Request<Body> {
        let full_url = if let Some(query) = self.query {
            format!("{}?{}", self.base_uri, query)
        } else {
            self.base_uri.to_string()
        };
        let request = Request::builder()
            .method(self.method)
            .uri(full_url)
            .header(AUTHORIZATION, authorization);

        if let Some((body, content)) = self.body {
            request.header(CONTENT_TYPE, content).body(body).unwrap()
        } else {
            request.body(Body::empty()).unwrap()
        }
    }
}

// n.b. this function is re-exported in the `raw` module - these docs are public!
/// Assemble a signed GET request to the given URL with the given parameters.
///
/// The given parameters, if present, will be appended to the given `uri` as a percent-encoded
/// query string. If the given `token` is a signed token, the parameters are also handed to the
/// signer so they can participate in the request signature.
pub fn get(uri: &str, token: &Token, params: Option<&ParamList>) -> Request<Body> {
    let mut request = RequestBuilder::new(Method::GET, uri);
    if let Some(params) = params {
        request = request.with_query_params(params);
    }
    request.request_token(token)
}

// n.b. this function is re-exported in the `raw` module - these docs are public!
/// Assemble a signed POST request to the given URL with the given parameters.
///
/// The given parameters, if present, will be percent-encoded and included in the POST body
/// formatted with a content-type of `application/x-www-form-urlencoded`. If the given `token` is
/// a signed token, the parameters are also handed to the signer so they can participate in the
/// request signature.
pub fn post(uri: &str, token: &Token, params: Option<&ParamList>) -> Request<Body> {
    let mut request = RequestBuilder::new(Method::POST, uri);
    if let Some(params) = params {
        request = request.with_body_params(params);
    }
    request.request_token(token)
}

// n.b. this function is re-exported in the `raw` module - these docs are public!
/// Assemble a signed POST request to the given URL with the given JSON body.
///
/// This method of building requests allows you to use endpoints that require a request body of
/// plain text or JSON, like `POST media/metadata/create`. Note that this function does not hand
/// its body to the signer, so take care if the endpoint you're using lists parameters as part of
/// its signature specification.
pub fn post_json<B: serde::Serialize>(uri: &str, token: &Token, body: B) -> Request<Body> {
    RequestBuilder::new(Method::POST, uri)
        .with_body_json(body)
        .request_token(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_header() {
        let token = Token::Bearer("AAAA1234".to_string());
        let req = get("https://api.twitter.com/1.1/users/show.json", &token, None);

        assert_eq!(req.headers()[AUTHORIZATION], "Bearer AAAA1234");
        assert_eq!(req.method(), Method::GET);
    }

    #[test]
    fn query_params_are_encoded_into_the_url() {
        let token = Token::Bearer("AAAA1234".to_string());
        let params = ParamList::new().add_param("q", "#rustlang");
        let req = get(
            "https://api.twitter.com/1.1/search/tweets.json",
            &token,
            Some(&params),
        );

        assert_eq!(
            req.uri().query(),
            Some("q=%23rustlang"),
        );
    }

    #[test]
    fn signer_sees_method_url_and_params() {
        struct Recorder;
        impl crate::auth::SignRequest for Recorder {
            fn authorization(
                &self,
                method: &Method,
                url: &str,
                params: Option<&ParamList>,
            ) -> String {
                format!(
                    "Stub method={} url={} nparams={}",
                    method,
                    url,
                    params.map(|p| p.len()).unwrap_or(0)
                )
            }
        }

        let token = Token::signed(Recorder);
        let params = ParamList::new().add_param("status", "hi");
        let req = post(
            "https://api.twitter.com/1.1/statuses/update.json",
            &token,
            Some(&params),
        );

        assert_eq!(
            req.headers()[AUTHORIZATION],
            "Stub method=POST url=https://api.twitter.com/1.1/statuses/update.json nparams=1"
        );
    }
}

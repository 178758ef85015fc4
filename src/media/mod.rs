// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Functionality to upload images, GIFs, and videos that can be attached to tweets.
//!
//! Tweet media is uploaded separately from the act of posting the tweet itself. In order to
//! attach an image to a new tweet, you need to upload it first, then take the Media ID that
//! Twitter generates and reference that when posting the tweet.
//!
//! Uploads are chunked: an `INIT` call reserves a media ID, the file is pushed in base64-encoded
//! `APPEND` segments, and a `FINALIZE` call closes the upload. Images are usually ready
//! immediately; GIFs and videos go through asynchronous processing, reported through the
//! `processing_info` block that [`wait_for_processing`] polls until it resolves.
//!
//! ```rust,no_run
//! # #[tokio::main]
//! # async fn main() {
//! # let token: skylark::Token = unimplemented!();
//! use skylark::media::{self, media_types, MediaCategory};
//!
//! let image = vec![]; //pretend we loaded an image file into this
//! let handle = media::upload_media(
//!     &image,
//!     &media_types::image_png(),
//!     &MediaCategory::Image,
//!     &token,
//! )
//! .await
//! .unwrap();
//!
//! let handle = media::wait_for_processing(handle, &token).await.unwrap();
//! println!("attach media ID {} to a tweet", handle.id);
//! # }
//! ```

use std::time::{Duration, Instant};

use serde::de::Error;
use serde::{Deserialize, Deserializer};
use tokio::time;

use crate::common::*;
use crate::error::ApiError;
use crate::{auth, error, links};

use mime;

/// A collection of convenience functions that return media types accepted by Twitter.
///
/// These can be handed to [`upload_media`] to set the media type of an upload. The functions in
/// the module correspond to media types that Twitter is known to accept.
pub mod media_types {
    use mime::{self, Mime};

    /// PNG images.
    pub fn image_png() -> Mime {
        mime::IMAGE_PNG
    }

    /// JPG images.
    pub fn image_jpg() -> Mime {
        mime::IMAGE_JPEG
    }

    /// WEBP images.
    pub fn image_webp() -> Mime {
        "image/webp".parse().unwrap()
    }

    /// Animated GIF images.
    pub fn image_gif() -> Mime {
        mime::IMAGE_GIF
    }

    /// MP4 videos.
    pub fn video_mp4() -> Mime {
        "video/mp4".parse().unwrap()
    }
}

/// The category of an upload, which determines the size limits and processing pipeline Twitter
/// applies to it. `.to_string()` returns the string the API expects.
#[derive(Debug, Copy, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MediaCategory {
    /// Static image. Four can be attached to a single tweet.
    #[display(fmt = "tweet_image")]
    Image,
    /// Animated GIF.
    #[display(fmt = "tweet_gif")]
    Gif,
    /// Video.
    #[display(fmt = "tweet_video")]
    Video,
}

/// The processing state of an upload.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressInfo {
    /// The upload is waiting to be processed. Contains the number of seconds after which to
    /// check again.
    Pending(u64),
    /// The upload is being processed. Contains the number of seconds after which to check again.
    InProgress(u64),
    /// Processing failed. Contains the reason.
    Failed(error::MediaError),
    /// Processing is finished. The media can be used in other API calls.
    Success,
}

#[derive(Debug, Deserialize)]
enum RawProgressInfoTag {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "in_progress")]
    InProgress,
    #[serde(rename = "failed")]
    Failed,
    #[serde(rename = "succeeded")]
    Success,
}

#[derive(Debug, Deserialize)]
struct RawProgressInfo {
    state: RawProgressInfoTag,
    progress_percent: Option<f64>,
    check_after_secs: Option<u64>,
    error: Option<error::MediaError>,
}

impl<'de> Deserialize<'de> for ProgressInfo {
    fn deserialize<D>(deser: D) -> Result<ProgressInfo, D::Error>
    where
        D: Deserializer<'de>,
    {
        use self::RawProgressInfoTag::*;
        let raw = RawProgressInfo::deserialize(deser)?;
        let check_after = raw
            .check_after_secs
            .ok_or_else(|| D::Error::custom("Missing field: check_after_secs"));
        Ok(match raw.state {
            Pending => ProgressInfo::Pending(check_after?),
            InProgress => ProgressInfo::InProgress(check_after?),
            Success => ProgressInfo::Success,
            Failed => {
                let err = raw
                    .error
                    .ok_or_else(|| D::Error::custom("Missing field: error"))?;
                ProgressInfo::Failed(err)
            }
        })
    }
}

/// The deserialized shape of an upload response, before its expiration window is pinned to the
/// local clock.
#[derive(Debug, Deserialize)]
struct RawMediaHandle {
    /// ID that can be used in API calls (e.g. attach to tweet).
    #[serde(rename = "media_id_string")]
    id: String,
    /// Number of seconds the media can be used in other API calls.
    //this field can be missing on a failed upload, in which case 0 is a reasonable stand-in
    #[serde(default)]
    #[serde(rename = "expires_after_secs")]
    expires_after: u64,
    /// Progress information. If present, determines whether the media is ready to use.
    #[serde(rename = "processing_info")]
    progress: Option<ProgressInfo>,
}

/// An uploaded media file, as referenced in other API calls.
#[derive(Debug, Clone)]
pub struct MediaHandle {
    /// ID that can be used in API calls (e.g. attach to tweet).
    pub id: String,
    /// The local instant after which the media can no longer be used in other API calls.
    pub expires_at: Instant,
    /// Progress information. If present, determines whether the media is ready to use.
    pub progress: Option<ProgressInfo>,
}

impl From<RawMediaHandle> for MediaHandle {
    fn from(raw: RawMediaHandle) -> Self {
        Self {
            id: raw.id,
            // this conversion only makes sense immediately after receiving the response
            expires_at: Instant::now() + Duration::from_secs(raw.expires_after),
            progress: raw.progress,
        }
    }
}

impl MediaHandle {
    /// Whether the handle is still within its expiration window.
    pub fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Uploads are pushed in segments of this size.
const CHUNK_SIZE: usize = 512 * 1024;

/// Uploads the given media to Twitter, returning a handle that can be attached to a tweet.
///
/// For categories that are processed asynchronously (GIFs and videos), the returned handle may
/// still carry a pending [`ProgressInfo`]; hand it to [`wait_for_processing`] to poll until the
/// media is ready.
pub async fn upload_media(
    data: &[u8],
    media_type: &mime::Mime,
    media_category: &MediaCategory,
    token: &auth::Token,
) -> error::Result<MediaHandle> {
    let params = ParamList::new()
        .add_param("command", "INIT")
        .add_param("total_bytes", data.len().to_string())
        .add_param("media_type", media_type.to_string())
        .add_param("media_category", media_category.to_string());
    let req = post(links::media::UPLOAD, token, Some(&params));
    let media = request_with_json_response::<RawMediaHandle>(req)
        .await?
        .response;

    for (ix, chunk) in data.chunks(CHUNK_SIZE).enumerate() {
        let params = ParamList::new()
            .add_param("command", "APPEND")
            .add_param("media_id", media.id.clone())
            .add_param("media_data", base64::encode(chunk))
            .add_param("segment_index", ix.to_string());
        let req = post(links::media::UPLOAD, token, Some(&params));
        // this request has no response body upon success
        raw_request(req).await?;
    }

    let params = ParamList::new()
        .add_param("command", "FINALIZE")
        .add_param("media_id", media.id.clone());
    let req = post(links::media::UPLOAD, token, Some(&params));
    let resp = request_with_json_response::<RawMediaHandle>(req).await?;
    let rate_limit = resp.rate_limit;
    let handle = MediaHandle::from(resp.response);

    if let Some(ProgressInfo::Failed(err)) = &handle.progress {
        return Err(error::Error::Api(ApiError::from_media_error(
            err, rate_limit,
        )));
    }
    Ok(handle)
}

/// Polls the processing status of the given media upload.
///
/// A reported processing failure is classified into an [`ApiError`] and surfaced as a fault,
/// carrying the rate-limit information from the status response.
pub async fn get_status(media_id: String, token: &auth::Token) -> error::Result<MediaHandle> {
    let params = ParamList::new()
        .add_param("command", "STATUS")
        .add_param("media_id", media_id);
    let req = get(links::media::UPLOAD, token, Some(&params));
    let resp = request_with_json_response::<RawMediaHandle>(req).await?;
    let rate_limit = resp.rate_limit;
    let handle = MediaHandle::from(resp.response);

    if let Some(ProgressInfo::Failed(err)) = &handle.progress {
        return Err(error::Error::Api(ApiError::from_media_error(
            err, rate_limit,
        )));
    }
    Ok(handle)
}

/// Polls the given media handle until Twitter reports its processing as complete.
///
/// The poll interval is the `check_after_secs` value from the most recent status response.
/// Returns the refreshed handle on success; a processing failure surfaces as an `Error::Api`
/// whose kind is derived from the reported media error.
pub async fn wait_for_processing(
    mut handle: MediaHandle,
    token: &auth::Token,
) -> error::Result<MediaHandle> {
    loop {
        match handle.progress {
            None | Some(ProgressInfo::Success) => return Ok(handle),
            Some(ProgressInfo::Pending(secs)) | Some(ProgressInfo::InProgress(secs)) => {
                time::sleep(Duration::from_secs(secs)).await;
                handle = get_status(handle.id.clone(), token).await?;
            }
            Some(ProgressInfo::Failed(ref err)) => {
                return Err(error::Error::Api(ApiError::from_media_error(
                    err,
                    RateLimit::default(),
                )));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_media(json: &str) -> RawMediaHandle {
        serde_json::from_str::<RawMediaHandle>(json).unwrap()
    }

    #[test]
    fn parse_media_handle() {
        let media = parse_media(
            r#"{"media_id": 710511363345354753, "media_id_string": "710511363345354753", "expires_after_secs": 86400}"#,
        );

        assert_eq!(media.id, "710511363345354753");
        assert_eq!(media.expires_after, 86400);
        assert!(media.progress.is_none());
    }

    #[test]
    fn parse_media_pending() {
        let media = parse_media(
            r#"{"media_id_string": "13", "expires_after_secs": 86400,
                "processing_info": {"state": "pending", "check_after_secs": 5}}"#,
        );

        match media.progress {
            Some(ProgressInfo::Pending(5)) => (),
            other => panic!("unexpected value of progress={:?}", other),
        }
    }

    #[test]
    fn parse_media_in_progress() {
        let media = parse_media(
            r#"{"media_id_string": "13", "expires_after_secs": 3595,
                "processing_info": {"state": "in_progress", "check_after_secs": 10,
                                    "progress_percent": 75.0}}"#,
        );

        match media.progress {
            Some(ProgressInfo::InProgress(10)) => (),
            other => panic!("unexpected value of progress={:?}", other),
        }
    }

    #[test]
    fn parse_media_fail() {
        let media = parse_media(
            r#"{"media_id_string": "710511363345354753",
                "processing_info": {"state": "failed",
                                    "error": {"code": 1, "name": "InvalidMedia",
                                              "message": "Unsupported video format"}}}"#,
        );

        assert_eq!(media.expires_after, 0);
        match media.progress {
            Some(ProgressInfo::Failed(error)) => assert_eq!(
                error,
                crate::error::MediaError {
                    code: Some(1),
                    name: "InvalidMedia".to_string(),
                    message: Some("Unsupported video format".to_string()),
                }
            ),
            other => panic!("unexpected value of progress={:?}", other),
        }
    }

    #[test]
    fn parse_media_succeeded() {
        let media = parse_media(
            r#"{"media_id_string": "13", "expires_after_secs": 86400,
                "processing_info": {"state": "succeeded", "progress_percent": 100.0}}"#,
        );

        assert_eq!(media.progress, Some(ProgressInfo::Success));
    }
}

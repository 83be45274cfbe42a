//! Body collection and parsing for HTTP requests

use crate::error::FrameworkError;
use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body;
use serde::de::DeserializeOwned;

/// Collect a full request body, failing with `PayloadTooLarge` past `limit` bytes
pub async fn collect_body<B>(body: B, limit: usize) -> Result<Bytes, FrameworkError>
where
    B: Body,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Err(FrameworkError::PayloadTooLarge { limit })
        }
        Err(e) => Err(FrameworkError::internal(format!(
            "Failed to read request body: {}",
            e
        ))),
    }
}

/// Parse bytes as JSON into the target type
pub fn parse_json<T: DeserializeOwned>(bytes: &Bytes) -> Result<T, FrameworkError> {
    serde_json::from_slice(bytes).map_err(|e| FrameworkError::BadRequest(e.to_string()))
}

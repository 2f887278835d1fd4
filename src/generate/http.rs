//! Response handling shared by the provider adapters.

use std::time::Duration;

use base64::Engine as _;
use reqwest::{Client, Response};
use serde_json::Value;

use crate::{
    assets::decode::decode_data_uri,
    foundation::error::{CarouselError, CarouselResult},
};

const USER_AGENT: &str = concat!("carousel-engine/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);
const ERROR_BODY_LIMIT: usize = 300;

pub fn client() -> CarouselResult<Client> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

fn truncate(text: &str) -> &str {
    match text.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Parse a JSON body, mapping non-2xx statuses to a provider error.
pub async fn json_or_error(provider: &str, resp: Response) -> CarouselResult<Value> {
    let status = resp.status();
    let bytes = resp.bytes().await?;
    if !status.is_success() {
        let text = String::from_utf8_lossy(&bytes);
        return Err(CarouselError::provider(format!(
            "{provider} returned {status}: {}",
            truncate(&text)
        )));
    }
    serde_json::from_slice(&bytes)
        .map_err(|e| CarouselError::provider(format!("{provider} sent malformed JSON: {e}")))
}

pub async fn bytes_or_error(provider: &str, resp: Response) -> CarouselResult<Vec<u8>> {
    let status = resp.status();
    let bytes = resp.bytes().await?;
    if !status.is_success() {
        let text = String::from_utf8_lossy(&bytes);
        return Err(CarouselError::provider(format!(
            "{provider} returned {status}: {}",
            truncate(&text)
        )));
    }
    Ok(bytes.to_vec())
}

/// Fetch a result URL; `data:` URIs are decoded in place.
pub async fn download(http: &Client, provider: &str, url: &str) -> CarouselResult<Vec<u8>> {
    if url.starts_with("data:") {
        return decode_data_uri(url);
    }
    let resp = http.get(url).send().await?;
    bytes_or_error(provider, resp).await
}

pub fn decode_b64(provider: &str, data: &str) -> CarouselResult<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|e| CarouselError::provider(format!("{provider} sent invalid base64: {e}")))
}

/// String at `pointer`, or a provider error naming what was missing.
pub fn str_at<'a>(provider: &str, value: &'a Value, pointer: &str) -> CarouselResult<&'a str> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| CarouselError::provider(format!("{provider} response has no {pointer}")))
}

pub fn trim_base(base: &str) -> &str {
    base.trim_end_matches('/')
}

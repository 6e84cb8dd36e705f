// Base64 codec shared by the fetcher and the writer.
// GitHub wraps file content as line-broken base64 of the raw bytes.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::Value;
use thiserror::Error;

/// Failure to turn a base64 payload back into text or JSON.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("content is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("content is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encode raw bytes as standard base64.
pub fn encode_bytes(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Encode UTF-8 text as standard base64.
pub fn encode_text(text: &str) -> String {
    encode_bytes(text.as_bytes())
}

/// Decode base64 into raw bytes, ignoring embedded whitespace.
pub fn decode_bytes(encoded: &str) -> Result<Vec<u8>, CodecError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(STANDARD.decode(compact)?)
}

/// Decode base64 into UTF-8 text.
pub fn decode_text(encoded: &str) -> Result<String, CodecError> {
    Ok(String::from_utf8(decode_bytes(encoded)?)?)
}

/// Decode base64 into a parsed JSON value.
pub fn decode_json(encoded: &str) -> Result<Value, CodecError> {
    let text = decode_text(encoded)?;
    Ok(serde_json::from_str(&text)?)
}

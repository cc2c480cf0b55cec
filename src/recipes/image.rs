//! `data:` URL handling for recipe images. Only PNG is stored.

use base64ct::{Base64, Encoding};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DATA_URL_RE: Regex = Regex::new(r"^data:image/(\w+);base64,").unwrap();
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("Unsupported image type: {0}, only png is accepted")]
    UnsupportedType(String),

    #[error("Invalid base64 image data")]
    InvalidBase64,
}

/// Decodes a `data:image/png;base64,...` URL into raw bytes.
///
/// A value that is not a data URL at all yields `Ok(None)` and is ignored by
/// the caller, so clients may echo back whatever they received.
pub fn decode_data_url(value: &str) -> Result<Option<Vec<u8>>, ImageError> {
    let Some(caps) = DATA_URL_RE.captures(value) else {
        return Ok(None);
    };
    let kind = &caps[1];
    if !kind.eq_ignore_ascii_case("png") {
        return Err(ImageError::UnsupportedType(kind.to_string()));
    }
    let payload = value[caps[0].len()..].trim();
    let bytes = Base64::decode_vec(payload).map_err(|_| ImageError::InvalidBase64)?;
    Ok(Some(bytes))
}

pub fn encode_data_url(bytes: &[u8]) -> String {
    format!("data:image/png;base64,{}", Base64::encode_string(bytes))
}

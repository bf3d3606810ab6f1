//! Resolution of the image carried by an analysis request.
//!
//! Clients send either an inline base64 payload (bare or as a `data:` URL) or a
//! public URL. [`ImageSource`] holds whichever one was chosen and knows how to
//! turn it into raw bytes or a URL, depending on what a detector backend needs.

use base64::{
    Engine as _, alphabet,
    engine::{
        DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig,
        general_purpose::STANDARD,
    },
};
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

/// MIME type assumed when an inline payload carries no `data:` prefix.
pub const DEFAULT_MIME: &str = "image/jpeg";

/// Standard alphabet, padding optional on decode (browsers' `atob` accepts both).
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Errors raised while turning a request payload into image bytes.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The inline payload is not valid base64.
    #[error("Invalid base64 image data: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
    /// The inline payload decoded to zero bytes.
    #[error("Image data is empty")]
    Empty,
    /// The remote image answered with a non-success status.
    #[error("Failed to fetch image from URL: {0}")]
    Fetch(String),
    /// The remote image is larger than the configured body limit.
    #[error("Image at URL exceeds {0} bytes")]
    TooLarge(usize),
    /// The remote image could not be reached at all.
    #[error("Failed to fetch image from URL: {0}")]
    Http(#[from] reqwest::Error),
}

/// The image a request asked us to analyze.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// Decoded inline payload.
    Inline { bytes: Vec<u8>, mime: String },
    /// Public URL the image lives at.
    Remote(String),
}

impl ImageSource {
    /// Decodes an inline payload, accepting both bare base64 and
    /// `data:<mime>;base64,<payload>` URLs.
    pub fn from_base64(payload: &str) -> Result<Self, ImageError> {
        let (mime, data) = split_data_url(payload);
        let cleaned: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = LENIENT.decode(cleaned)?;
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }

        Ok(Self::Inline {
            bytes,
            mime: mime.unwrap_or(DEFAULT_MIME).to_string(),
        })
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        Self::Remote(url.into())
    }

    /// Short description for log fields; never includes the payload itself.
    pub fn describe(&self) -> String {
        match self {
            Self::Inline { bytes, mime } => format!("inline {mime} ({} bytes)", bytes.len()),
            Self::Remote(url) => format!("remote {url}"),
        }
    }

    /// Raw image bytes, downloading the remote image if needed.
    ///
    /// Remote downloads stop with [`ImageError::TooLarge`] once more than
    /// `limit` bytes are announced or received.
    pub async fn bytes(&self, client: &Client, limit: usize) -> Result<Vec<u8>, ImageError> {
        match self {
            Self::Inline { bytes, .. } => Ok(bytes.clone()),
            Self::Remote(url) => {
                debug!(image.url = %url, "fetching remote image");
                let mut res = client.get(url).send().await?;
                let status = res.status();
                if !status.is_success() {
                    return Err(ImageError::Fetch(
                        status
                            .canonical_reason()
                            .map(str::to_string)
                            .unwrap_or_else(|| status.to_string()),
                    ));
                }
                if res.content_length().is_some_and(|len| len > limit as u64) {
                    return Err(ImageError::TooLarge(limit));
                }

                let mut bytes = Vec::new();
                while let Some(chunk) = res.chunk().await? {
                    if bytes.len() + chunk.len() > limit {
                        return Err(ImageError::TooLarge(limit));
                    }
                    bytes.extend_from_slice(&chunk);
                }
                Ok(bytes)
            }
        }
    }

    /// A URL an upstream model can load: the remote URL itself, or a
    /// re-encoded `data:` URL for inline images.
    pub fn as_url(&self) -> String {
        match self {
            Self::Inline { bytes, mime } => {
                format!("data:{mime};base64,{}", STANDARD.encode(bytes))
            }
            Self::Remote(url) => url.clone(),
        }
    }

    /// The `inputs` value for JSON-payload inference endpoints: the URL for
    /// remote images, bare base64 for inline ones.
    pub fn as_inputs(&self) -> String {
        match self {
            Self::Inline { bytes, .. } => STANDARD.encode(bytes),
            Self::Remote(url) => url.clone(),
        }
    }
}

/// Splits `data:image/png;base64,AAAA` into `(Some("image/png"), "AAAA")`.
/// Anything without a `data:` prefix is returned untouched.
fn split_data_url(payload: &str) -> (Option<&str>, &str) {
    let trimmed = payload.trim();
    let Some(rest) = trimmed.strip_prefix("data:") else {
        return (None, trimmed);
    };
    let Some((header, data)) = rest.split_once(',') else {
        return (None, rest);
    };
    let mime = header
        .split(';')
        .next()
        .filter(|m| !m.is_empty());
    (mime, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_bare_base64() {
        let source = ImageSource::from_base64("aGVsbG8=").unwrap();
        assert_eq!(
            source,
            ImageSource::Inline {
                bytes: b"hello".to_vec(),
                mime: DEFAULT_MIME.to_string()
            }
        );
    }

    #[test]
    fn decodes_base64_without_padding() {
        let source = ImageSource::from_base64("aGVsbG8").unwrap();
        assert_eq!(
            source,
            ImageSource::Inline {
                bytes: b"hello".to_vec(),
                mime: DEFAULT_MIME.to_string()
            }
        );
        assert_eq!(source.as_inputs(), "aGVsbG8=");
    }

    #[test]
    fn strips_data_url_prefix_and_keeps_mime() {
        let source = ImageSource::from_base64("data:image/png;base64,aGVsbG8=").unwrap();
        match source {
            ImageSource::Inline { bytes, mime } => {
                assert_eq!(bytes, b"hello");
                assert_eq!(mime, "image/png");
            }
            other => panic!("unexpected source {other:?}"),
        }
    }

    #[test]
    fn tolerates_line_wrapped_payloads() {
        let source = ImageSource::from_base64("aGVs\nbG8=").unwrap();
        assert_eq!(source.as_inputs(), "aGVsbG8=");
    }

    #[test]
    fn rejects_invalid_base64() {
        let err = ImageSource::from_base64("not base64 at all!").unwrap_err();
        assert!(matches!(err, ImageError::InvalidBase64(_)));
    }

    #[test]
    fn rejects_empty_payload_after_prefix() {
        let err = ImageSource::from_base64("data:image/png;base64,").unwrap_err();
        assert!(matches!(err, ImageError::Empty));
    }

    #[test]
    fn inline_image_round_trips_as_data_url() {
        let source = ImageSource::from_base64("data:image/webp;base64,aGVsbG8=").unwrap();
        assert_eq!(source.as_url(), "data:image/webp;base64,aGVsbG8=");
    }

    #[test]
    fn remote_image_is_passed_through() {
        let source = ImageSource::from_url("https://example.com/cat.png");
        assert_eq!(source.as_url(), "https://example.com/cat.png");
        assert_eq!(source.as_inputs(), "https://example.com/cat.png");
        assert_eq!(source.describe(), "remote https://example.com/cat.png");
    }
}

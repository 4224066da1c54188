//! Live adapters that call the real provider APIs.

pub mod openai;
pub mod stability;

use base64::Engine;
use reqwest::Response;

use crate::codec;
use crate::error::ProviderFailure;
use crate::ports::GeneratedImage;

/// Longest response excerpt kept in failure messages.
const MAX_BODY_EXCERPT: usize = 500;

/// Cut a response body down for logging.
pub(crate) fn excerpt(body: &str) -> String {
    if body.len() > MAX_BODY_EXCERPT {
        let mut end = MAX_BODY_EXCERPT;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

/// Read the body and turn non-2xx statuses into [`ProviderFailure::Rejected`].
pub(crate) async fn read_success_body(response: Response) -> Result<String, ProviderFailure> {
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        return Err(ProviderFailure::Rejected { status: status.as_u16(), message: excerpt(&text) });
    }
    Ok(text)
}

/// Decode a base64 image payload from a 2xx body.
pub(crate) fn decode_image_payload(b64: &str) -> Result<GeneratedImage, ProviderFailure> {
    let data = base64::engine::general_purpose::STANDARD.decode(b64.trim()).map_err(|e| {
        ProviderFailure::InvalidResponse { message: format!("Failed to decode base64: {e}") }
    })?;
    if data.is_empty() {
        return Err(ProviderFailure::InvalidResponse { message: "empty image payload".into() });
    }
    let mime_type = codec::sniff_mime(&data).to_string();
    Ok(GeneratedImage { data, mime_type })
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_truncates_long_bodies() {
        let long = "x".repeat(800);
        let cut = excerpt(&long);
        assert_eq!(cut.len(), MAX_BODY_EXCERPT + 3);
        assert!(cut.ends_with("..."));
        assert_eq!(excerpt("short"), "short");
    }

    #[test]
    fn excerpt_respects_char_boundaries() {
        let body = "é".repeat(400);
        assert!(excerpt(&body).ends_with("..."));
    }

    #[test]
    fn payload_decoding() {
        let image = decode_image_payload("iVBORw0KGgo=").unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert!(matches!(
            decode_image_payload("%%%"),
            Err(ProviderFailure::InvalidResponse { .. })
        ));
        assert!(matches!(decode_image_payload(""), Err(ProviderFailure::InvalidResponse { .. })));
    }
}

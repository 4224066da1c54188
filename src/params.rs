//! Request parameters shared by the pipeline and the provider adapters.

/// Edge length of the normalized square sent to providers.
pub const TARGET_EDGE: u32 = 1024;

/// Share of the canvas width, measured from the right, that providers may repaint.
pub const EDITABLE_FRACTION: f32 = 0.46;

/// Default upload ceiling (6 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 6 * 1024 * 1024;

/// Default image strength for strength-based transforms.
pub const DEFAULT_STRENGTH: f32 = 0.35;

/// Check an upload against the size ceiling before any decoding happens.
///
/// # Errors
///
/// Returns `(size, limit)` if the upload is larger than `limit`.
pub fn validate_upload_size(bytes: &[u8], limit: usize) -> Result<(), (usize, usize)> {
    if bytes.len() > limit {
        Err((bytes.len(), limit))
    } else {
        Ok(())
    }
}

/// Validate an image strength scalar.
///
/// # Errors
///
/// Returns an error if the value is outside `[0, 1]` or not finite.
pub fn validate_strength(strength: f32) -> Result<(), String> {
    if strength.is_finite() && (0.0..=1.0).contains(&strength) {
        Ok(())
    } else {
        Err(format!("Unsupported strength '{strength}'. Valid: 0.0 to 1.0"))
    }
}

/// Prompt sent to providers for a given golfer.
#[must_use]
pub fn build_prompt(subject: &str) -> String {
    format!(
        "Photorealistic photo of the person on the left standing beside {subject} on a sunny \
         golf course fairway, both smiling at the camera, natural lighting, keep the person on \
         the left unchanged, add {subject} on the right side of the frame."
    )
}

/// Caption drawn on the local composite.
#[must_use]
pub fn fallback_caption(subject: &str) -> String {
    format!("You with {subject}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_at_limit_is_accepted() {
        let bytes = vec![0u8; 16];
        assert!(validate_upload_size(&bytes, 16).is_ok());
        assert_eq!(validate_upload_size(&bytes, 15), Err((16, 15)));
    }

    #[test]
    fn strength_bounds() {
        assert!(validate_strength(0.0).is_ok());
        assert!(validate_strength(DEFAULT_STRENGTH).is_ok());
        assert!(validate_strength(1.0).is_ok());
        assert!(validate_strength(1.5).is_err());
        assert!(validate_strength(-0.1).is_err());
        assert!(validate_strength(f32::NAN).is_err());
    }

    #[test]
    fn prompt_names_subject() {
        let prompt = build_prompt("Tiger Woods");
        assert!(prompt.contains("Tiger Woods"));
        assert!(prompt.contains("left"));
    }

    #[test]
    fn caption_format() {
        assert_eq!(fallback_caption("John Daly"), "You with John Daly");
    }
}

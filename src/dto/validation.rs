//! Validation helpers for DTOs.

use validator::ValidationError;

/// Upper bound on submitted names and gift text; nothing in the roster or
/// the gift options comes close to it.
const MAX_FIELD_LENGTH: usize = 64;

/// Validates that a submitted roster name is non-blank and reasonably sized.
///
/// Roster membership is checked in the service layer against the configured
/// participant list; this only rejects input that can never be valid.
pub fn validate_submitted_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("name_blank");
        err.message = Some("Name must not be empty".into());
        return Err(err);
    }

    if name.len() > MAX_FIELD_LENGTH {
        let mut err = ValidationError::new("name_length");
        err.message = Some(
            format!(
                "Name must be at most {MAX_FIELD_LENGTH} characters (got {})",
                name.len()
            )
            .into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Validates an optional free-text gift entry: present values must fit the
/// same length bound as names. Blank text is allowed here and rejected by
/// the service only when the custom option was actually chosen.
pub fn validate_custom_text(text: &str) -> Result<(), ValidationError> {
    if text.len() > MAX_FIELD_LENGTH {
        let mut err = ValidationError::new("custom_text_length");
        err.message = Some(
            format!(
                "Custom gift text must be at most {MAX_FIELD_LENGTH} characters (got {})",
                text.len()
            )
            .into(),
        );
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_submitted_name_valid() {
        assert!(validate_submitted_name("Kornis").is_ok());
        assert!(validate_submitted_name("a").is_ok());
    }

    #[test]
    fn test_validate_submitted_name_blank() {
        assert!(validate_submitted_name("").is_err());
        assert!(validate_submitted_name("   ").is_err());
        assert!(validate_submitted_name("\t\n").is_err());
    }

    #[test]
    fn test_validate_submitted_name_too_long() {
        assert!(validate_submitted_name(&"x".repeat(64)).is_ok());
        assert!(validate_submitted_name(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_custom_text_allows_blank() {
        assert!(validate_custom_text("").is_ok());
        assert!(validate_custom_text(&"x".repeat(65)).is_err());
    }
}

//! Input shape checks performed before any store call.
//!
//! These only look at what the caller sent, so rejecting here reveals
//! nothing about stored messages.

use crate::http::error::ApiError;

/// Answer to any retrieval whose path does not carry a usable key and PIN.
pub const NO_KEY_OR_PIN: &str = "no valid key or pin passed";

/// PIN length in characters, as compared against `pin_size`.
pub fn pin_len(pin: &str) -> usize {
    pin.chars().count()
}

pub fn validate_pin(pin: &str, pin_size: usize) -> Result<(), ApiError> {
    if pin_len(pin) != pin_size {
        return Err(ApiError::Malformed("incorrect pin size".into()));
    }
    Ok(())
}

/// Validate the path parameters of a retrieval.
pub fn validate_retrieval(key: &str, pin: &str, pin_size: usize) -> Result<(), ApiError> {
    if key.is_empty() || pin.is_empty() || pin_len(pin) != pin_size {
        return Err(ApiError::Malformed(NO_KEY_OR_PIN.into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_length() {
        assert!(validate_pin("1234", 4).is_ok());
        assert!(validate_pin("123", 4).is_err());
        assert!(validate_pin("12345", 4).is_err());
        assert!(validate_pin("", 4).is_err());
    }

    #[test]
    fn test_pin_length_counts_characters() {
        assert_eq!(pin_len("١٢٣٤"), 4);
        assert!(validate_pin("١٢٣٤", 4).is_ok());
    }

    #[test]
    fn test_retrieval_shape() {
        assert!(validate_retrieval("key", "1234", 4).is_ok());
        assert!(validate_retrieval("", "1234", 4).is_err());
        assert!(validate_retrieval("key", "12", 4).is_err());
        assert!(validate_retrieval("key", "", 0).is_err());
    }
}

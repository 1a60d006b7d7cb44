//! Token Errors

/// Errors from creating or verifying tokens
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Signing secret is too short
    #[error("Invalid key size: must be at least {min} characters")]
    InvalidKeySize { min: usize },

    /// Duration does not fit in a token timestamp
    #[error("Invalid token duration")]
    InvalidDuration,

    /// Signing failed
    #[error("Failed to create token: {0}")]
    Creation(#[source] jsonwebtoken::errors::Error),

    /// Malformed, forged, or signed with an unexpected algorithm
    #[error("Token is invalid")]
    Invalid,

    /// Signature is valid but the token has expired
    #[error("Token has expired")]
    Expired,
}

impl TokenError {
    /// Whether the error concerns the presented token (as opposed to the maker).
    pub fn is_verification_error(&self) -> bool {
        matches!(self, TokenError::Invalid | TokenError::Expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_size_message() {
        let err = TokenError::InvalidKeySize { min: 32 };
        assert!(err.to_string().contains("at least 32"));
        assert!(!err.is_verification_error());
    }

    #[test]
    fn test_verification_errors() {
        assert!(TokenError::Invalid.is_verification_error());
        assert!(TokenError::Expired.is_verification_error());
        assert!(!TokenError::InvalidDuration.is_verification_error());
    }
}

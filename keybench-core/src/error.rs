//! Error types for the Keybench core.
//!
//! Uses `thiserror` for public API error types with structured variants
//! covering the provider, configuration, and export domains.

/// Top-level error type for the Keybench core library.
#[derive(Debug, thiserror::Error)]
pub enum KeybenchError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from signature provider backends.
///
/// A benchmark run aborts on the first provider error; there is no retry
/// and no partial result.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Signature backend '{backend}' is unavailable: {message}")]
    Unavailable { backend: String, message: String },

    #[error("Key generation failed for {algorithm}: {message}")]
    Keygen { algorithm: String, message: String },

    #[error("Signing failed for {algorithm}: {message}")]
    Sign { algorithm: String, message: String },

    #[error("Verification failed for {algorithm}: {message}")]
    Verify { algorithm: String, message: String },

    #[error("Key export is not supported by the '{backend}' backend")]
    ExportUnsupported { backend: String },

    #[error("Key export failed: {message}")]
    ExportFailed { message: String },
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Configuration parse error: {message}")]
    ParseError { message: String },

    #[error("Unknown algorithm id: {id}")]
    UnknownAlgorithm { id: String },
}

/// A type alias for results using the top-level `KeybenchError`.
pub type Result<T> = std::result::Result<T, KeybenchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_provider() {
        let err = KeybenchError::Provider(ProviderError::Keygen {
            algorithm: "rsa2048".into(),
            message: "entropy pool exhausted".into(),
        });
        assert_eq!(
            err.to_string(),
            "Provider error: Key generation failed for rsa2048: entropy pool exhausted"
        );
    }

    #[test]
    fn test_error_display_unavailable() {
        let err = ProviderError::Unavailable {
            backend: "openssl".into(),
            message: "curve lookup failed".into(),
        };
        assert_eq!(
            err.to_string(),
            "Signature backend 'openssl' is unavailable: curve lookup failed"
        );
    }

    #[test]
    fn test_error_display_config() {
        let err = KeybenchError::Config(ConfigError::UnknownAlgorithm { id: "rsa1024".into() });
        assert_eq!(
            err.to_string(),
            "Configuration error: Unknown algorithm id: rsa1024"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: KeybenchError = io_err.into();
        assert!(matches!(err, KeybenchError::Io(_)));
    }

    #[test]
    fn test_provider_error_variants() {
        let err = ProviderError::Sign {
            algorithm: "p256".into(),
            message: "key mismatch".into(),
        };
        assert_eq!(err.to_string(), "Signing failed for p256: key mismatch");

        let err = ProviderError::ExportUnsupported { backend: "mock".into() };
        assert_eq!(
            err.to_string(),
            "Key export is not supported by the 'mock' backend"
        );
    }
}

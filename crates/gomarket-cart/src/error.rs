//! # Cart Error Types
//!
//! Errors raised by the cart layer, plus the serializable shape handed to
//! the mobile UI bridge.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    What Surfaces, What Doesn't                          │
//! │                                                                         │
//! │  use_cart() outside a provider ──► CartError::OutsideProvider (raised) │
//! │                                                                         │
//! │  add existing id / unknown id   ──► CartChange::Unchanged (silent)     │
//! │                                                                         │
//! │  storage read fails on mount    ──► CartError::Storage (raised)        │
//! │  stored cart is malformed       ──► warn! + empty cart (silent)        │
//! │  storage write fails            ──► error! in worker (silent)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;

use gomarket_db::DbError;

/// Cart layer errors.
#[derive(Debug, Error)]
pub enum CartError {
    /// The accessor was called with no enclosing provider scope.
    ///
    /// This is a programming error in the calling code, not a runtime
    /// condition to recover from.
    #[error("use_cart must be used within a CartProvider")]
    OutsideProvider,

    /// The key/value store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] DbError),

    /// The cart could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration values are out of range.
    #[error("Invalid cart configuration: {0}")]
    InvalidConfig(String),

    /// Config file could not be read or parsed.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// The persistence worker exited before reaching the requested version.
    #[error("Persistence worker stopped")]
    WorkerStopped,
}

impl From<toml::de::Error> for CartError {
    fn from(err: toml::de::Error) -> Self {
        CartError::ConfigLoadFailed(err.to_string())
    }
}

/// Result type for cart operations.
pub type CartResult<T> = Result<T, CartError>;

// =============================================================================
// UI Bridge Error
// =============================================================================

/// Error shape sent across the bridge to the JS UI.
///
/// ```json
/// { "code": "USAGE_ERROR", "message": "use_cart must be used within a CartProvider" }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for bridge responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Accessor used outside a provider
    UsageError,

    /// Storage operation failed
    StorageError,

    /// Configuration invalid or unreadable
    ConfigError,

    /// Anything else
    Internal,
}

impl CartError {
    /// Returns the bridge error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            CartError::OutsideProvider => ErrorCode::UsageError,
            CartError::Storage(_) => ErrorCode::StorageError,
            CartError::InvalidConfig(_) | CartError::ConfigLoadFailed(_) => ErrorCode::ConfigError,
            CartError::Serialization(_) | CartError::WorkerStopped => ErrorCode::Internal,
        }
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        let code = err.code();
        let message = match &err {
            CartError::Storage(e) => {
                // Log the actual error but return a generic message
                tracing::error!(error = %e, "Cart storage failed");
                "Cart storage is unavailable".to_string()
            }
            other => other.to_string(),
        };
        ApiError { code, message }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

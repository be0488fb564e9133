//! Error types for the kiwi client

use thiserror::Error;

/// Result type alias for kiwi operations
pub type Result<T> = std::result::Result<T, KiwiError>;

/// Error types for kiwi operations
#[derive(Error, Debug)]
pub enum KiwiError {
    /// Socket or WebSocket handshake could not be established
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Send or receive failed on an established connection
    #[error("Transport error: {0}")]
    TransportError(String),

    /// WebSocket error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Unknown key name
    #[error("Unsupported key: {0}")]
    InvalidKey(String),

    /// Invalid configuration value
    #[error("Config error: {0}")]
    ConfigError(String),
}

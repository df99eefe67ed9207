//! Error Types
//!
//! This module defines the error types used throughout the viewer.
//!
//! # Overview
//!
//! The main error type [`Error`] covers all failure modes including:
//! - GPU initialization failures
//! - Asset reading and glTF decoding errors
//! - Configuration parsing errors
//!
//! Asset-specific failures are grouped under [`AssetError`] so that load
//! completions can be reported (and logged) without losing their cause.
//!
//! All public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, Error>`.

use thiserror::Error;

/// Failures that happen while reading or decoding an asset file.
#[derive(Error, Debug)]
pub enum AssetError {
    /// The requested asset was not found.
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// The file was readable but its content is unusable.
    #[error("Invalid asset data: {0}")]
    InvalidData(String),

    /// A glTF buffer could not be resolved.
    #[error("Missing buffer data: {0}")]
    MissingBuffer(String),

    /// Data URI parsing error.
    #[error("Data URI error: {0}")]
    DataUri(String),

    /// HTTP response error with status code.
    #[error("HTTP response error: status {status} for {url}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },
}

/// The main error type for the viewer.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // GPU & Rendering Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create the presentation surface.
    #[error("Failed to create surface: {0}")]
    SurfaceCreateFailed(#[from] wgpu::CreateSurfaceError),

    /// Event loop error (winit).
    #[cfg(feature = "winit")]
    #[error("Event loop error: {0}")]
    EventLoopError(#[from] winit::error::EventLoopError),

    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// Asset reading or decoding failure.
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// glTF parsing error.
    #[error("glTF error: {0}")]
    Gltf(#[from] gltf::Error),

    /// Base64 decoding error.
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    // ========================================================================
    // I/O & Network Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport error.
    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(String),

    /// URL parsing error.
    #[cfg(feature = "http")]
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// JSON parse error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration value is out of its accepted range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

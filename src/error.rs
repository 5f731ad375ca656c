//! Error types for dotfield.
//!
//! One enum per concern: image loading, sampling, catalog and settings
//! files, GPU initialization, and the application shell.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while fetching or decoding a source image.
///
/// Any of these is surfaced to the user as an alert; the current dot field
/// is left untouched.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The HTTP request could not be completed.
    #[error("failed to fetch image from {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with a non-success status.
    #[error("failed to fetch image from {url}: server returned {status}")]
    Status { url: String, status: u16 },
    /// The local file could not be read.
    #[error("failed to read image file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The bytes were fetched but are not a decodable image.
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    /// The loader runtime could not be started.
    #[error("failed to start image loader: {0}")]
    Runtime(std::io::Error),
}

/// Errors that can occur while sampling an image into dot candidates.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SampleError {
    /// A grid step of zero would never advance.
    #[error("grid step must be at least 1")]
    ZeroStep,
}

/// Errors that can occur while loading the use-case catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read use-case file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid use-case data: {0}")]
    Parse(#[from] serde_json::Error),
    /// Dots must each reference a use case, so an empty catalog is unusable.
    #[error("use-case catalog is empty")]
    Empty,
}

/// Errors that can occur while loading or validating settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("setting `{name}` out of range: {value} (expected {expected})")]
    OutOfRange {
        name: &'static str,
        value: f32,
        expected: &'static str,
    },
}

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support.")]
    NoAdapter,
    /// The adapter cannot present to this surface.
    #[error("surface reports no supported texture formats")]
    NoSurfaceFormat,
    /// Failed to create GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
}

/// Errors that can occur when running the application.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

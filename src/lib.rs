//! # dotfield
//!
//! An interactive particle field built from a logo image.
//!
//! Pixels sampled from the image become a 3D cloud of dots that fly into
//! formation, drift with simplex noise, and react to the pointer: clicking a
//! dot shows the use case attached to it, and in the relational mode the
//! dots sharing a tag with it burst out into a ring while everything else
//! fades.
//!
//! ## Pipeline
//!
//! ```text
//! image ──▶ sampler ──▶ field (spawn + formation tween)
//!                          │
//!            frame ──▶ tweens ──▶ noise drift ──▶ renderer
//!                          ▲
//! pointer ──▶ hit-test ──▶ interaction (popup / explode / reset)
//! ```
//!
//! All mutable state lives in a [`Session`]; the windowed app in [`app`]
//! drives it from a winit event loop at 30 frames per second.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use dotfield::{app, Catalog, ImageSource, Session, Settings};
//!
//! let session = Session::new(
//!     Arc::new(Catalog::builtin()?),
//!     Settings::default(),
//!     glam::Vec2::new(1280.0, 720.0),
//! );
//! app::run(session, Some(ImageSource::File("logo.png".into())))?;
//! ```
//!
//! ## Features
//!
//! - `egui` (default): overlay with the use-case popup, controls panel,
//!   image source box and load-failure alert. Without it the field still
//!   runs and load failures are only logged.

pub mod app;
pub mod camera;
pub mod catalog;
pub mod dot;
pub mod error;
pub mod field;
pub mod gpu;
pub mod input;
pub mod interaction;
pub mod loader;
pub mod motion;
pub mod noise;
pub mod popup;
pub mod sampler;
pub mod session;
pub mod settings;
pub mod spawn;
pub mod time;
pub mod tween;
#[cfg(feature = "egui")]
pub mod ui;

pub use catalog::{are_related, Catalog, UseCase};
pub use error::{AppError, CatalogError, GpuError, LoadError, SampleError, SettingsError};
pub use field::DotField;
pub use interaction::{hit_test, InteractionState};
pub use loader::ImageSource;
pub use sampler::sample;
pub use session::{LoadOutcome, Session};
pub use settings::{Control, Settings};

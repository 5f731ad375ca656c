//! Image loading.
//!
//! Images come from an HTTP(S) URL or a local file and are decoded to RGBA8.
//! [`load_image`] is the async entry point; [`spawn_load`] runs it on a
//! background thread with its own single-threaded runtime and hands the
//! result to a callback, tagged with the generation it was started for.

use std::convert::Infallible;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::thread::JoinHandle;

use image::RgbaImage;

use crate::error::LoadError;

/// Where to fetch an image from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Url(String),
    File(PathBuf),
}

impl FromStr for ImageSource {
    type Err = Infallible;

    /// Anything starting with `http://` or `https://` is a URL; everything
    /// else is a path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Ok(ImageSource::Url(s.to_string()))
        } else {
            Ok(ImageSource::File(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Url(url) => f.write_str(url),
            ImageSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Result of one background load.
#[derive(Debug)]
pub struct LoadResult {
    pub generation: u64,
    pub source: ImageSource,
    pub image: Result<RgbaImage, LoadError>,
}

/// Fetch the raw bytes for `source`.
pub async fn fetch_bytes(source: &ImageSource) -> Result<Vec<u8>, LoadError> {
    match source {
        ImageSource::Url(url) => {
            let http = |source| LoadError::Http {
                url: url.clone(),
                source,
            };
            let response = reqwest::get(url).await.map_err(http)?;
            let status = response.status();
            if !status.is_success() {
                return Err(LoadError::Status {
                    url: url.clone(),
                    status: status.as_u16(),
                });
            }
            let bytes = response.bytes().await.map_err(http)?;
            Ok(bytes.to_vec())
        }
        ImageSource::File(path) => tokio::fs::read(path).await.map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        }),
    }
}

/// Decode an encoded image (format guessed from its header) into RGBA8.
pub fn decode(bytes: &[u8]) -> Result<RgbaImage, LoadError> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

/// Fetch and decode an image.
pub async fn load_image(source: &ImageSource) -> Result<RgbaImage, LoadError> {
    let bytes = fetch_bytes(source).await?;
    let len = bytes.len();
    let image = tokio::task::spawn_blocking(move || decode(&bytes))
        .await
        .map_err(|err| LoadError::Runtime(std::io::Error::other(err)))??;
    log::info!(
        "decoded {} ({} bytes, {}x{})",
        source,
        len,
        image.width(),
        image.height()
    );
    Ok(image)
}

/// Load `source` on a background thread and pass the outcome to `done`.
pub fn spawn_load<F>(source: ImageSource, generation: u64, done: F) -> JoinHandle<()>
where
    F: FnOnce(LoadResult) + Send + 'static,
{
    std::thread::spawn(move || {
        log::info!("loading image {source} (generation {generation})");
        let image = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime.block_on(load_image(&source)),
            Err(err) => Err(LoadError::Runtime(err)),
        };
        done(LoadResult {
            generation,
            source,
            image,
        });
    })
}

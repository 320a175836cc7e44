//! htmlshot
//!
//! Renders a local HTML file to a full-page PNG or JPEG image with a headless
//! browser.
//!
//! # Features
//!
//! - **CDP Backend** (default): Uses Chrome DevTools Protocol via headless Chrome
//! - **Swappable engine**: the render driver only talks to the [`Engine`] trait,
//!   so tests run against a fake without starting a browser
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "cdp")]
//! # async fn run() -> htmlshot::Result<()> {
//! use htmlshot::{cdp::CdpEngine, config, paths, render, Engine};
//!
//! let args = ["page.html", "out/page.jpg", "--quality", "80"];
//! if let config::Parsed::Run(cfg) = config::parse_args(args)? {
//!     let root = std::env::current_dir().map_err(|e| htmlshot::Error::io(".", e))?;
//!     let plan = paths::resolve(&root, &cfg)?;
//!     render::render(&plan, CdpEngine::new).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub mod paths;

#[cfg(feature = "cdp")]
pub mod cdp;

// Async-friendly browser handle (worker-thread backed)
pub mod async_api;
pub use async_api::Browser;

pub mod render;

/// Default viewport width in CSS pixels
pub const DEFAULT_WIDTH: u32 = 1440;
/// Default viewport height in CSS pixels
pub const DEFAULT_HEIGHT: u32 = 900;
/// Default JPEG quality
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

/// Image encoding selected from the output extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

/// Options passed to [`Engine::capture`]. Captures always cover the whole
/// scrollable page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOptions {
    pub format: ImageFormat,
    /// Encoder quality, only set for JPEG
    pub quality: Option<u8>,
}

impl CaptureOptions {
    /// Full-page capture in `format`, carrying `quality` only for JPEG.
    pub fn full_page(format: ImageFormat, quality: u8) -> Self {
        Self {
            format,
            quality: match format {
                ImageFormat::Jpeg => Some(quality),
                ImageFormat::Png => None,
            },
        }
    }
}

/// Configuration for launching a browser engine
///
/// The defaults suit containerized or root execution: the OS sandbox is off
/// and page loads are bounded by a fixed 30 second timeout.
///
/// # Examples
///
/// ```
/// let cfg = htmlshot::EngineConfig::default();
/// assert_eq!(cfg.timeout_ms, 30_000);
/// assert!(!cfg.sandbox);
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Viewport dimensions
    pub viewport: Viewport,
    /// Timeout for navigation and the network-idle wait, in milliseconds
    pub timeout_ms: u64,
    /// Run without a visible window
    pub headless: bool,
    /// Keep the Chrome OS-level sandbox enabled
    pub sandbox: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            timeout_ms: 30_000,
            headless: true,
            sandbox: false,
        }
    }
}

/// Core trait for headless browser backends
///
/// One engine owns one browser process and one page.
pub trait Engine {
    /// Launch a browser and open a page
    fn new(config: EngineConfig) -> Result<Self>
    where
        Self: Sized;

    /// Resize the page viewport
    fn set_viewport(&mut self, viewport: Viewport) -> Result<()>;

    /// Navigate to `url` and wait until the network is idle
    fn load_url(&mut self, url: &str) -> Result<()>;

    /// Wait for web fonts triggered by the page to finish loading. Pages
    /// without a font loading API count as ready.
    fn wait_for_fonts(&mut self) -> Result<()>;

    /// Capture the page as encoded image bytes
    fn capture(&mut self, options: &CaptureOptions) -> Result<Vec<u8>>;

    /// Close the engine and clean up resources
    fn close(self) -> Result<()>;
}

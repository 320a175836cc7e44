//! Chrome DevTools Protocol adapter implementation

use crate::{CaptureOptions, Engine, EngineConfig, Error, ImageFormat, Result, Viewport};
use headless_chrome::browser::tab::Tab;
use headless_chrome::protocol::cdp::types::Event;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::types::Bounds;
use headless_chrome::{Browser, LaunchOptions};
use log::{debug, info};
use std::ffi::OsStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const IDLE_POLL: Duration = Duration::from_millis(50);

const FONTS_READY: &str =
    "document.fonts && document.fonts.ready ? document.fonts.ready.then(() => true) : true";

const SCROLL_WIDTH: &str = "Math.max(document.documentElement.scrollWidth, document.body ? document.body.scrollWidth : 0)";
const SCROLL_HEIGHT: &str = "Math.max(document.documentElement.scrollHeight, document.body ? document.body.scrollHeight : 0)";

/// CDP-based engine implementation (uses the `headless_chrome` crate)
///
/// This adapter launches a headless Chrome instance and manages a single tab.
/// Network idle is taken from Chrome's own `networkIdle` lifecycle event,
/// which fires once the frame has had no in-flight requests for 500ms.
pub struct CdpEngine {
    browser: Browser,
    tab: Arc<Tab>,
    config: EngineConfig,
    viewport: Viewport,
    network_idle: Arc<AtomicBool>,
}

impl CdpEngine {
    fn eval_number(&self, expression: &str) -> Result<f64> {
        let eval = self
            .tab
            .evaluate(expression, false)
            .map_err(|e| Error::Script(format!("Evaluation failed: {}", e)))?;
        eval.value
            .and_then(|v| v.as_f64())
            .ok_or_else(|| Error::Script(format!("Expected a number from `{}`", expression)))
    }

    fn resize(&self, width: u32, height: u32) -> Result<()> {
        self.tab
            .set_bounds(Bounds::Normal {
                left: None,
                top: None,
                width: Some(width as f64),
                height: Some(height as f64),
            })
            .map_err(|e| Error::Render(format!("Failed to resize window: {}", e)))?;
        Ok(())
    }

    fn wait_for_network_idle(&self) -> Result<()> {
        let deadline = Instant::now() + Duration::from_millis(self.config.timeout_ms);
        while !self.network_idle.load(Ordering::SeqCst) {
            if Instant::now() >= deadline {
                return Err(Error::Timeout(self.config.timeout_ms));
            }
            std::thread::sleep(IDLE_POLL);
        }
        Ok(())
    }
}

impl Engine for CdpEngine {
    fn new(config: EngineConfig) -> Result<Self>
    where
        Self: Sized,
    {
        let mut args: Vec<&OsStr> = Vec::new();
        if !config.sandbox {
            args.push(OsStr::new("--disable-setuid-sandbox"));
        }

        // Configure headless Chrome launch options
        let launch_options = LaunchOptions::default_builder()
            .headless(config.headless)
            .sandbox(config.sandbox)
            .window_size(Some((config.viewport.width, config.viewport.height)))
            .args(args)
            .build()
            .map_err(|e| Error::Launch(format!("Failed to build launch options: {}", e)))?;

        // Launch the browser
        let browser = Browser::new(launch_options)
            .map_err(|e| Error::Launch(format!("Failed to launch browser: {}", e)))?;
        info!("launched headless Chrome");

        let tab = browser
            .new_tab()
            .map_err(|e| Error::Launch(format!("Failed to create tab: {}", e)))?;
        tab.set_default_timeout(Duration::from_millis(config.timeout_ms));

        tab.call_method(Page::SetLifecycleEventsEnabled { enabled: true })?;

        // "init" starts a new document, "networkIdle" ends its loading
        let network_idle = Arc::new(AtomicBool::new(false));
        let flag = network_idle.clone();
        tab.add_event_listener(Arc::new(move |event: &Event| {
            if let Event::PageLifecycleEvent(lifecycle) = event {
                match lifecycle.params.name.as_str() {
                    "init" => flag.store(false, Ordering::SeqCst),
                    "networkIdle" => flag.store(true, Ordering::SeqCst),
                    _ => {}
                }
            }
        }))?;

        let viewport = config.viewport;
        Ok(Self {
            browser,
            tab,
            config,
            viewport,
            network_idle,
        })
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.resize(viewport.width, viewport.height)?;
        self.viewport = viewport;
        Ok(())
    }

    fn load_url(&mut self, url: &str) -> Result<()> {
        self.network_idle.store(false, Ordering::SeqCst);

        self.tab
            .navigate_to(url)
            .map_err(|e| Error::Load(format!("Navigation failed: {}", e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| Error::Load(format!("Wait for navigation failed: {}", e)))?;

        self.wait_for_network_idle()?;
        debug!("network idle for {}", url);
        Ok(())
    }

    fn wait_for_fonts(&mut self) -> Result<()> {
        self.tab
            .evaluate(FONTS_READY, true)
            .map_err(|e| Error::Script(format!("Waiting for fonts failed: {}", e)))?;
        Ok(())
    }

    fn capture(&mut self, options: &CaptureOptions) -> Result<Vec<u8>> {
        let width = self.eval_number(SCROLL_WIDTH)?.ceil().max(self.viewport.width as f64);
        let height = self.eval_number(SCROLL_HEIGHT)?.ceil().max(self.viewport.height as f64);
        // Grow the window so content below the fold is laid out and painted
        self.resize(width as u32, height as u32)?;

        let format = match options.format {
            ImageFormat::Png => Page::CaptureScreenshotFormatOption::Png,
            ImageFormat::Jpeg => Page::CaptureScreenshotFormatOption::Jpeg,
        };
        let clip = Page::Viewport {
            x: 0.0,
            y: 0.0,
            width,
            height,
            scale: 1.0,
        };

        let data = self
            .tab
            .capture_screenshot(format, options.quality.map(u32::from), Some(clip), true)
            .map_err(|e| Error::Render(format!("Screenshot failed: {}", e)))?;

        debug!("captured {}x{} as {:?} ({} bytes)", width, height, options.format, data.len());
        Ok(data)
    }

    fn close(self) -> Result<()> {
        // Dropping the browser terminates the child process
        drop(self.tab);
        drop(self.browser);
        info!("closed headless Chrome");
        Ok(())
    }
}

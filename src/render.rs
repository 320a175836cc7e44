//! Render driver: browser session from launch to image on disk

use crate::async_api::Browser;
use crate::paths::RenderPlan;
use crate::{Engine, EngineConfig, Error, Result};
use log::{debug, info};

/// Render `plan` with an engine built by `launcher` and write the image to
/// `plan.output`, replacing any existing file.
///
/// The browser is closed whether or not capture succeeds. On success a close
/// failure is reported; on failure the original error wins.
///
/// On the failure path the browser handle is dropped rather than closed, and
/// that drop blocks the calling thread until the worker has shut the engine
/// down. Call this from a multi-threaded runtime.
pub async fn render<E, F>(plan: &RenderPlan, launcher: F) -> Result<()>
where
    E: Engine + 'static,
    F: FnOnce(EngineConfig) -> Result<E> + Send + 'static,
{
    let url = plan.file_url()?;
    let config = EngineConfig {
        viewport: plan.viewport,
        ..Default::default()
    };

    let browser = Browser::launch(config, launcher).await?;
    info!("rendering {}", url);

    // On error the handle drops here, which tears the browser down
    capture_to_file(&browser, plan, &url).await?;
    browser.close().await
}

async fn capture_to_file(browser: &Browser, plan: &RenderPlan, url: &str) -> Result<()> {
    let page = browser.page();

    page.set_viewport(plan.viewport).await?;
    debug!("viewport {}x{}", plan.viewport.width, plan.viewport.height);

    page.goto(url).await?;
    page.wait_for_fonts().await?;

    let image = page.screenshot(plan.capture_options()).await?;
    tokio::fs::write(&plan.output, &image)
        .await
        .map_err(|e| Error::io(&plan.output, e))?;
    debug!("wrote {} bytes to {}", image.len(), plan.output.display());
    Ok(())
}

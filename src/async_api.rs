use crate::{CaptureOptions, Engine, EngineConfig, Error, Result, Viewport};
use log::{debug, warn};
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};
use tokio::sync::oneshot;

enum Command {
    SetViewport(Viewport, oneshot::Sender<Result<()>>),
    Goto(String, oneshot::Sender<Result<()>>),
    WaitForFonts(oneshot::Sender<Result<()>>),
    Screenshot(CaptureOptions, oneshot::Sender<Result<Vec<u8>>>),
    Close(oneshot::Sender<Result<()>>),
}

/// An async-friendly browser abstraction backed by a dedicated worker thread.
///
/// The worker thread owns a synchronous [`Engine`] and executes commands sent
/// from async code, one at a time and in order.
///
/// The engine is closed exactly once: by [`Browser::close`], or when the
/// handle is dropped on any other path. Dropping blocks until the worker has
/// finished tearing the engine down.
pub struct Browser {
    cmd_tx: Option<Sender<Command>>,
    worker: Option<JoinHandle<()>>,
}

/// A handle representing the browser's page.
pub struct Page<'a> {
    browser: &'a Browser,
}

impl Browser {
    /// Launch an engine on a new worker thread.
    ///
    /// `launcher` runs on the worker thread, so the engine itself never has
    /// to be `Send`.
    pub async fn launch<E, F>(config: EngineConfig, launcher: F) -> Result<Self>
    where
        E: Engine + 'static,
        F: FnOnce(EngineConfig) -> Result<E> + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (init_tx, init_rx) = oneshot::channel::<Result<()>>();

        let worker = thread::spawn(move || {
            // Initialize engine on the worker thread
            let mut engine = match launcher(config) {
                Ok(e) => e,
                Err(err) => {
                    let _ = init_tx.send(Err(err));
                    return;
                }
            };
            let _ = init_tx.send(Ok(()));

            // Command loop
            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    Command::SetViewport(viewport, resp) => {
                        let _ = resp.send(engine.set_viewport(viewport));
                    }
                    Command::Goto(url, resp) => {
                        let _ = resp.send(engine.load_url(&url));
                    }
                    Command::WaitForFonts(resp) => {
                        let _ = resp.send(engine.wait_for_fonts());
                    }
                    Command::Screenshot(options, resp) => {
                        let _ = resp.send(engine.capture(&options));
                    }
                    Command::Close(resp) => {
                        let _ = resp.send(engine.close());
                        return;
                    }
                }
            }

            // Handle dropped without an explicit close
            debug!("browser handle dropped, closing engine");
            if let Err(e) = engine.close() {
                warn!("Failed to close browser: {}", e);
            }
        });

        let browser = Self {
            cmd_tx: Some(cmd_tx),
            worker: Some(worker),
        };

        match init_rx.await {
            Ok(Ok(())) => Ok(browser),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(Error::Disconnected),
        }
    }

    /// The page opened at launch
    pub fn page(&self) -> Page<'_> {
        Page { browser: self }
    }

    /// Close the browser and wait for the engine to shut down.
    pub async fn close(self) -> Result<()> {
        self.request(Command::Close).await
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<Result<T>>) -> Command) -> Result<T> {
        let cmd_tx = self.cmd_tx.as_ref().ok_or(Error::Disconnected)?;
        let (tx, rx) = oneshot::channel();
        cmd_tx.send(make(tx)).map_err(|_| Error::Disconnected)?;
        rx.await.map_err(|_| Error::Disconnected)?
    }
}

impl Drop for Browser {
    fn drop(&mut self) {
        // Hanging up ends the command loop
        drop(self.cmd_tx.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("browser worker thread panicked");
            }
        }
    }
}

impl Page<'_> {
    pub async fn set_viewport(&self, viewport: Viewport) -> Result<()> {
        self.browser
            .request(|resp| Command::SetViewport(viewport, resp))
            .await
    }

    /// Navigate and wait until the network is idle.
    pub async fn goto(&self, url: &str) -> Result<()> {
        let url = url.to_string();
        self.browser.request(|resp| Command::Goto(url, resp)).await
    }

    pub async fn wait_for_fonts(&self) -> Result<()> {
        self.browser.request(Command::WaitForFonts).await
    }

    pub async fn screenshot(&self, options: CaptureOptions) -> Result<Vec<u8>> {
        self.browser
            .request(|resp| Command::Screenshot(options, resp))
            .await
    }
}

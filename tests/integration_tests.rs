//! Full flow over the library: parse, resolve, render

use htmlshot::config::{parse_args, Parsed};
use htmlshot::{paths, render, CaptureOptions, Engine, EngineConfig, ImageFormat, Result, Viewport};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

fn project() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    std::fs::write(root.join("example.html"), "<!DOCTYPE html><h1>Static</h1>").unwrap();
    (dir, root)
}

/// Records the viewport it launched with and every capture request
#[derive(Default, Clone)]
struct Recorder {
    launched: Arc<Mutex<Vec<Viewport>>>,
    captures: Arc<Mutex<Vec<CaptureOptions>>>,
}

struct StubEngine {
    recorder: Recorder,
}

impl Engine for StubEngine {
    fn new(_config: EngineConfig) -> Result<Self> {
        Ok(StubEngine {
            recorder: Recorder::default(),
        })
    }

    fn set_viewport(&mut self, _viewport: Viewport) -> Result<()> {
        Ok(())
    }

    fn load_url(&mut self, url: &str) -> Result<()> {
        assert!(url.starts_with("file://"), "{}", url);
        Ok(())
    }

    fn wait_for_fonts(&mut self) -> Result<()> {
        Ok(())
    }

    fn capture(&mut self, options: &CaptureOptions) -> Result<Vec<u8>> {
        self.recorder.captures.lock().unwrap().push(*options);
        Ok(match options.format {
            ImageFormat::Png => b"\x89PNG\r\n\x1a\n".to_vec(),
            ImageFormat::Jpeg => vec![0xFF, 0xD8, 0xFF, 0xD9],
        })
    }

    fn close(self) -> Result<()> {
        Ok(())
    }
}

fn stub(recorder: &Recorder) -> impl FnOnce(EngineConfig) -> Result<StubEngine> + Send + 'static {
    let recorder = recorder.clone();
    move |config| {
        recorder.launched.lock().unwrap().push(config.viewport);
        Ok(StubEngine { recorder })
    }
}

async fn shoot(root: &Path, args: &[&str], recorder: &Recorder) -> Result<String> {
    let cfg = match parse_args(args.iter().copied())? {
        Parsed::Run(cfg) => cfg,
        Parsed::Info(text) => panic!("unexpected usage output: {}", text),
    };
    let plan = paths::resolve(root, &cfg)?;
    render::render(&plan, stub(recorder)).await?;
    Ok(plan.display_output())
}

#[tokio::test]
async fn static_page_to_explicit_png() {
    let (_dir, root) = project();
    let recorder = Recorder::default();

    let saved = shoot(&root, &["example.html", "out/shot.png"], &recorder).await.unwrap();

    assert_eq!(saved, PathBuf::from("out").join("shot.png").display().to_string());
    assert!(root.join("out").is_dir());
    let bytes = std::fs::read(root.join("out/shot.png")).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    assert_eq!(recorder.launched.lock().unwrap().as_slice(), &[Viewport { width: 1440, height: 900 }]);
}

#[tokio::test]
async fn default_output_lands_in_screenshots() {
    let (_dir, root) = project();
    let recorder = Recorder::default();

    let saved = shoot(&root, &["example.html", "--width", "1280", "--height", "800"], &recorder)
        .await
        .unwrap();

    assert_eq!(saved, PathBuf::from("screenshots").join("example.png").display().to_string());
    assert!(root.join("screenshots/example.png").is_file());
    assert_eq!(recorder.launched.lock().unwrap()[0], Viewport { width: 1280, height: 800 });
}

#[tokio::test]
async fn jpeg_output_carries_quality() {
    let (_dir, root) = project();
    let recorder = Recorder::default();

    shoot(&root, &["example.html", "shots/hero.JPG", "--quality", "50"], &recorder)
        .await
        .unwrap();

    let captures = recorder.captures.lock().unwrap();
    assert_eq!(captures.len(), 1);
    assert_eq!(captures[0].format, ImageFormat::Jpeg);
    assert_eq!(captures[0].quality, Some(50));
}

#[tokio::test]
async fn running_twice_overwrites() {
    let (_dir, root) = project();
    let recorder = Recorder::default();
    let args = ["example.html", "out/shot.png"];

    shoot(&root, &args, &recorder).await.unwrap();
    shoot(&root, &args, &recorder).await.unwrap();

    assert_eq!(recorder.captures.lock().unwrap().len(), 2);
    assert!(root.join("out/shot.png").is_file());
}

#[tokio::test]
async fn rejected_output_never_launches() {
    let (_dir, root) = project();
    let recorder = Recorder::default();

    for args in [["example.html", "out/anim.gif"], ["example.html", "../escape.png"]] {
        assert!(shoot(&root, &args, &recorder).await.is_err());
    }
    assert!(recorder.launched.lock().unwrap().is_empty());
}

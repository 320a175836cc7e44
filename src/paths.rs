//! Path resolution and output validation
//!
//! All paths are anchored at the project root (the invoking working
//! directory). The output image must stay inside that root.

use crate::config::Config;
use crate::{CaptureOptions, Error, ImageFormat, Result, Viewport};
use log::debug;
use std::fs;
use std::path::{Component, Path, PathBuf};
use url::Url;

/// Directory, relative to the root, used when no output path is given
pub const DEFAULT_OUTPUT_DIR: &str = "screenshots";

/// Fully resolved, validated inputs for one render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPlan {
    pub root: PathBuf,
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: ImageFormat,
    pub viewport: Viewport,
    pub quality: u8,
}

impl RenderPlan {
    /// `file://` URL of the input document
    pub fn file_url(&self) -> Result<String> {
        Url::from_file_path(&self.input)
            .map(|u| u.to_string())
            .map_err(|_| Error::Load(format!("cannot build a file URL for {}", self.input.display())))
    }

    pub fn capture_options(&self) -> CaptureOptions {
        CaptureOptions::full_page(self.format, self.quality)
    }

    /// Output path relative to the root, or absolute when that is empty
    pub fn display_output(&self) -> String {
        display_relative(&self.root, &self.output)
    }
}

/// Resolve and validate `config` against `root`, creating the output's
/// parent directories.
///
/// Checks run in order: input exists, output extension is supported, output
/// lies inside `root`. Nothing is created on disk unless all of them pass.
pub fn resolve(root: &Path, config: &Config) -> Result<RenderPlan> {
    let root = normalize(root);

    let input = absolutize(&root, &config.input);
    if fs::metadata(&input).is_err() {
        return Err(Error::InputNotFound(input));
    }

    let output = match &config.output {
        Some(path) => absolutize(&root, path),
        None => absolutize(&root, &default_output(&input)),
    };

    let format = image_format(&output)?;
    ensure_inside(&root, &output)?;

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    debug!("resolved {} -> {} ({:?})", input.display(), output.display(), format);

    Ok(RenderPlan {
        root,
        input,
        output,
        format,
        viewport: config.viewport,
        quality: config.quality,
    })
}

/// `screenshots/<input stem>.png`
pub fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Path::new(DEFAULT_OUTPUT_DIR).join(format!("{stem}.png"))
}

/// Pick the encoding from the output extension (case-insensitive).
pub fn image_format(path: &Path) -> Result<ImageFormat> {
    let ext = path.extension().map(|e| e.to_string_lossy().to_lowercase());
    match ext.as_deref() {
        Some("png") => Ok(ImageFormat::Png),
        Some("jpg") | Some("jpeg") => Ok(ImageFormat::Jpeg),
        Some(other) => Err(Error::UnsupportedExtension(format!(".{other}"))),
        None => Err(Error::UnsupportedExtension("(none)".into())),
    }
}

/// Reject `path` unless it is `root` or lies beneath it. Both must already
/// be absolute and normalized.
pub fn ensure_inside(root: &Path, path: &Path) -> Result<()> {
    if path.strip_prefix(root).is_ok() {
        Ok(())
    } else {
        Err(Error::OutsideRoot(path.to_path_buf()))
    }
}

/// Join `path` onto `root` unless already absolute, then normalize.
pub fn absolutize(root: &Path, path: &Path) -> PathBuf {
    normalize(&root.join(path))
}

/// Lexically remove `.` and `..` components. Does not touch the file system,
/// so the path need not exist.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Render `path` relative to `root` when possible.
pub fn display_relative(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel.display().to_string(),
        _ => path.display().to_string(),
    }
}

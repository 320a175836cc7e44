//! Binary-level tests, mostly for paths that fail or exit before a browser launches

#![cfg(feature = "cdp")]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Fresh project root containing `page.html`; the guard removes it on drop
fn project() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("project");
    std::fs::create_dir_all(&root).unwrap();
    std::fs::write(root.join("page.html"), "<h1>hello</h1>").unwrap();
    (dir, root)
}

fn htmlshot(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_htmlshot"))
        .args(args)
        .current_dir(root)
        .output()
        .expect("failed to spawn htmlshot")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

#[test]
fn no_arguments_prints_usage() {
    let (_dir, root) = project();
    let out = htmlshot(&root, &[]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("<input.html> [output.(png|jpg|jpeg)]"), "{}", stdout);
    assert!(stdout.contains("Examples:"));
}

#[test]
fn help_flag_prints_usage() {
    let (_dir, root) = project();
    for flag in ["-h", "--help"] {
        let out = htmlshot(&root, &["page.html", flag]);
        assert!(out.status.success());
        assert!(String::from_utf8_lossy(&out.stdout).contains("--quality"));
    }
}

#[test]
fn invalid_flag_value_exits_with_one() {
    let (_dir, root) = project();
    let out = htmlshot(&root, &["page.html", "--width", "0"]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stderr(&out), "Failed to render screenshot: Invalid value for --width: 0");
}

#[test]
fn unknown_flag_exits_with_one() {
    let (_dir, root) = project();
    let out = htmlshot(&root, &["page.html", "--dpi", "2"]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stderr(&out), "Failed to render screenshot: Unknown flag: --dpi");
}

#[test]
fn missing_input_file() {
    let (_dir, root) = project();
    let out = htmlshot(&root, &["absent.html"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(
        stderr(&out).starts_with("Failed to render screenshot: Input HTML file not found: "),
        "{}",
        stderr(&out)
    );
}

#[test]
fn gif_output_rejected_before_launch() {
    let (_dir, root) = project();
    let out = htmlshot(&root, &["page.html", "anim/out.gif"]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(
        stderr(&out),
        "Failed to render screenshot: Unsupported output extension: .gif. Use .png, .jpg, or .jpeg."
    );
    assert!(!root.join("anim").exists());
}

#[test]
fn output_outside_project_rejected() {
    let (_dir, root) = project();
    let out = htmlshot(&root, &["page.html", "../outside.png"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(
        stderr(&out).contains("Output path must be inside this repository. Received: "),
        "{}",
        stderr(&out)
    );
    assert!(stderr(&out).ends_with("outside.png"));
    assert!(!root.parent().unwrap().join("outside.png").exists());
}

#[test]
#[ignore] // Requires Chrome to be installed
fn successful_render_reports_saved_path() {
    let (_dir, root) = project();
    let out = htmlshot(&root, &["page.html", "out/shot.png"]);
    assert_eq!(out.status.code(), Some(0), "{}", stderr(&out));
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "Saved screenshot: out/shot.png");

    let bytes = std::fs::read(root.join("out/shot.png")).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
}

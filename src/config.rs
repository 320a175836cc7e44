//! Command-line parsing into a validated [`Config`]

use crate::{Error, Result, Viewport, DEFAULT_HEIGHT, DEFAULT_JPEG_QUALITY, DEFAULT_WIDTH};
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{CommandFactory, Parser};
use log::warn;
use std::ffi::OsString;
use std::path::PathBuf;

const USAGE: &str =
    "htmlshot <input.html> [output.(png|jpg|jpeg)] [--width <px>] [--height <px>] [--quality <1-100>]";

/// Flags that consume the following token as their value
const VALUE_FLAGS: [&str; 3] = ["--width", "--height", "--quality"];

const EXAMPLES: &str = "\
Examples:
  htmlshot ./example.html
  htmlshot ./example.html ./screenshots/example.png --width 1280 --height 800
  htmlshot ./preview.html ./prompts/material-you/screenshot.jpg --quality 88";

/// Render a local HTML file to a full-page PNG or JPEG screenshot
#[derive(Parser, Debug)]
#[command(
    name = "htmlshot",
    version,
    override_usage = USAGE,
    after_help = EXAMPLES,
    arg_required_else_help = true,
    args_override_self = true
)]
struct Args {
    /// Input HTML file, optionally followed by the output image path
    #[arg(value_name = "PATH")]
    paths: Vec<String>,

    /// Viewport width in pixels
    #[arg(long, value_name = "px", default_value_t = DEFAULT_WIDTH, value_parser = parse_width, allow_hyphen_values = true)]
    width: u32,

    /// Viewport height in pixels
    #[arg(long, value_name = "px", default_value_t = DEFAULT_HEIGHT, value_parser = parse_height, allow_hyphen_values = true)]
    height: u32,

    /// JPEG quality, ignored for PNG output
    #[arg(long, value_name = "1-100", default_value_t = DEFAULT_JPEG_QUALITY, value_parser = parse_quality, allow_hyphen_values = true)]
    quality: u8,
}

/// Validated settings for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Source HTML file as given on the command line
    pub input: PathBuf,
    /// Destination image as given on the command line, if any
    pub output: Option<PathBuf>,
    pub viewport: Viewport,
    /// JPEG quality in 1..=100
    pub quality: u8,
}

/// Outcome of argument parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    /// Render with this configuration
    Run(Config),
    /// Print this text (usage or version) to stdout and exit successfully
    Info(String),
}

/// Parse the arguments following the program name.
///
/// An empty list, or `-h`/`--help` anywhere in it, yields [`Parsed::Info`]
/// with the usage text.
pub fn parse_args<I, T>(args: I) -> Result<Parsed>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let argv: Vec<OsString> = args.into_iter().map(Into::into).collect();

    if argv.iter().any(|a| a == "-h" || a == "--help") {
        return Ok(Parsed::Info(Args::command().render_help().to_string()));
    }
    reject_unknown_flags(&argv)?;

    let argv = std::iter::once(OsString::from("htmlshot")).chain(argv);
    let args = match Args::try_parse_from(argv) {
        Ok(args) => args,
        Err(err) => {
            return match err.kind() {
                ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand | ErrorKind::DisplayVersion => {
                    Ok(Parsed::Info(err.render().to_string()))
                }
                _ => Err(usage_error(&err)),
            };
        }
    };

    let mut paths = args.paths.into_iter().filter(|p| !p.is_empty());
    let input = paths
        .next()
        .ok_or_else(|| Error::usage("Missing input HTML file path."))?;
    let output = paths.next();
    let extra: Vec<String> = paths.collect();
    if !extra.is_empty() {
        warn!("Ignoring extra arguments: {}", extra.join(" "));
    }

    Ok(Parsed::Run(Config {
        input: PathBuf::from(input),
        output: output.map(PathBuf::from),
        viewport: Viewport {
            width: args.width,
            height: args.height,
        },
        quality: args.quality,
    }))
}

/// Reject tokens clap would otherwise accept: the bare `--` separator and the
/// `--flag=value` form. Tokens consumed as a flag's value are not inspected.
fn reject_unknown_flags(argv: &[OsString]) -> Result<()> {
    let mut tokens = argv.iter();
    while let Some(token) = tokens.next() {
        match token.to_str() {
            Some(flag) if VALUE_FLAGS.contains(&flag) => {
                tokens.next();
            }
            Some(flag) if flag == "--" || (flag.starts_with("--") && flag.contains('=')) => {
                return Err(Error::usage(format!("Unknown flag: {flag}")));
            }
            _ => {}
        }
    }
    Ok(())
}

fn parse_positive(flag: &str, value: &str) -> Result<u32> {
    if value.is_empty() {
        return Err(Error::usage(format!("Missing value for {flag}")));
    }
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(Error::usage(format!("Invalid value for {flag}: {value}"))),
    }
}

fn parse_width(value: &str) -> Result<u32> {
    parse_positive("--width", value)
}

fn parse_height(value: &str) -> Result<u32> {
    parse_positive("--height", value)
}

fn parse_quality(value: &str) -> Result<u8> {
    let n = parse_positive("--quality", value)?;
    u8::try_from(n)
        .ok()
        .filter(|q| *q <= 100)
        .ok_or_else(|| {
            Error::usage(format!(
                "Invalid value for --quality: {value}. Use a value from 1 to 100."
            ))
        })
}

/// Translate a clap failure into the tool's own one-line messages.
fn usage_error(err: &clap::Error) -> Error {
    // Value parser failures already carry the final message.
    if let Some(inner) = std::error::Error::source(err).and_then(|s| s.downcast_ref::<Error>()) {
        return Error::usage(inner.to_string());
    }

    let invalid_arg = match err.get(ContextKind::InvalidArg) {
        Some(ContextValue::String(arg)) => Some(arg.as_str()),
        _ => None,
    };

    match (err.kind(), invalid_arg) {
        (ErrorKind::UnknownArgument, Some(arg)) => Error::usage(format!("Unknown flag: {arg}")),
        // clap names the arg as "--width <px>"
        (ErrorKind::InvalidValue, Some(arg)) => {
            let flag = arg.split_whitespace().next().unwrap_or(arg);
            Error::usage(format!("Missing value for {flag}"))
        }
        _ => {
            let rendered = err.render().to_string();
            let line = rendered.lines().next().unwrap_or_default();
            Error::usage(line.trim_start_matches("error: ").to_string())
        }
    }
}

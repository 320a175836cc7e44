use htmlshot::cdp::CdpEngine;
use htmlshot::config::{self, Parsed};
use htmlshot::{paths, render, Engine, Error, Result};

async fn run() -> Result<Option<String>> {
    let cfg = match config::parse_args(std::env::args_os().skip(1))? {
        Parsed::Run(cfg) => cfg,
        Parsed::Info(text) => {
            println!("{}", text.trim_end());
            return Ok(None);
        }
    };

    let root = std::env::current_dir().map_err(|e| Error::io(".", e))?;
    let plan = paths::resolve(&root, &cfg)?;
    render::render(&plan, CdpEngine::new).await?;

    Ok(Some(plan.display_output()))
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run().await {
        Ok(Some(saved)) => println!("Saved screenshot: {}", saved),
        Ok(None) => {}
        Err(e) => {
            eprintln!("Failed to render screenshot: {}", e);
            std::process::exit(1);
        }
    }
}

use anyhow::{Context, Result};
use clap::Parser;
use skinny_ear::cli::{render_status, SkinnyEarCli};
use skinny_ear::{EarLayoutEnhancer, RunStatus};
use tracing::{error, info};

fn main() {
    if let Err(err) = run() {
        error!("{err:#}");
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = SkinnyEarCli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .init();

    info!("Starting skinny-ear v{}", env!("CARGO_PKG_VERSION"));

    let config = cli
        .layout_config()
        .context("Failed to build layout configuration")?;
    let ear = config
        .ear
        .clone()
        .unwrap_or_default()
        .display()
        .to_string();

    let enhancer = EarLayoutEnhancer::new(config);
    let status = enhancer
        .run()
        .with_context(|| format!("Failed to enhance {ear}"))?;

    let rendered = render_status(&status, cli.format).context("Failed to render report")?;
    print!("{rendered}");
    if !rendered.ends_with('\n') {
        println!();
    }

    if let RunStatus::Skipped { .. } = status {
        info!("Layout skipped, ear left unchanged");
    }
    Ok(())
}

//! agentflow CLI entry point

use agentflow::core::TaskEvent;
use agentflow::{llm, pipeline, Config, OutputWriter};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "agentflow", version, about = "Generate product content pages with an agent pipeline")]
struct Cli {
    /// Config file (defaults to ./agentflow.yml, then the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Product data JSON file
    #[arg(short, long)]
    product: Option<PathBuf>,

    /// Output directory for generated pages
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the execution order and exit
    #[arg(long)]
    plan: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    log::info!("agentflow v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(path) => {
            let mut config = Config::from_file(path)?;
            config.apply_env(|key| std::env::var(key).ok())?;
            config
        }
        None => Config::auto_load()?,
    };
    if let Some(output) = cli.output {
        config.paths.output = output;
    }
    config.validate()?;

    let product_path = cli.product.unwrap_or_else(|| config.product_data_path());
    let llm = llm::from_config(&config)?;
    let mut coordinator = pipeline::build(&config, llm, &product_path);

    if cli.plan {
        for (i, name) in coordinator.execution_order()?.iter().enumerate() {
            println!("{}. {}", i + 1, name);
        }
        return Ok(());
    }

    let mut events = coordinator.subscribe();
    let reporter = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                TaskEvent::TaskStarted { task } => log::debug!("▶ {}", task),
                TaskEvent::TaskCompleted { task, elapsed_ms } => {
                    log::info!("✓ {} ({}ms)", task, elapsed_ms)
                }
                TaskEvent::TaskFailed { task, error } => log::error!("✗ {}: {}", task, error),
                TaskEvent::RunStarted { .. } | TaskEvent::RunCompleted { .. } => {}
            }
        }
    });

    log::info!("Reading product data from: {}", product_path.display());
    let run = coordinator.execute().await;
    // Closes the event channel so the reporter drains and exits
    drop(coordinator);
    let _ = reporter.await;
    let results = run?;

    let writer = OutputWriter::new(&config.paths.output);
    let written = writer.write_all(&results)?;

    println!("Generated outputs:");
    for path in written {
        println!("  • {}", path.display());
    }

    Ok(())
}

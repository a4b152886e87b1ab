use anyhow::Context;
use clap::Parser;

use walk_core::WalkDocument;
use walk_core::config::WalkConfig;
use walk_core::document::data_file_path;
use walk_core::llm::build_client;
use walk_core::walk;

#[derive(Parser, Debug)]
#[command(name = "walk-driver")]
#[command(about = "Random-walk a chat model across sampling temperatures and save the paths")]
struct Args {
    /// Model identifier as `<namespace>:<name>`, e.g. `llama3.2:1b`
    #[arg(long = "model_name", short = 'm')]
    model_name: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let cfg = WalkConfig::load().context("load walk config")?;

    // Resolve the output path before spending any model calls on a bad id.
    let data_file = data_file_path(&cfg.data_dir, &args.model_name)?;

    tracing::info!(
        "walk.start model={} steps={} grid={}x{} temperatures={:?} rounds_per_temperature={} total_calls={} endpoint={}",
        args.model_name,
        cfg.total_steps,
        cfg.grid_size,
        cfg.grid_size,
        cfg.temperatures,
        cfg.rounds_per_temperature,
        cfg.total_calls(),
        cfg.llm.endpoint,
    );

    let llm = build_client(&cfg.llm).context("build llm client")?;
    let run = walk::run(&cfg.walk_params(), &args.model_name, llm.as_ref())
        .await
        .with_context(|| format!("random walk for {}", args.model_name))?;

    let mut doc = WalkDocument::new();
    doc.insert(run);
    doc.save(&data_file)
        .with_context(|| format!("save {}", data_file.display()))?;
    tracing::info!("walk.saved path={}", data_file.display());

    Ok(())
}

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use path_animator::render::render;
use path_animator::{Quality, load_scene};
use walk_core::config::WalkConfig;

#[derive(Parser, Debug)]
#[command(name = "path-animator")]
#[command(about = "Animate saved random-walk trajectories for one model and temperature")]
struct Args {
    /// Model identifier as `<namespace>:<name>`
    #[arg(long = "model_name", short = 'm')]
    model_name: String,

    /// Sampling temperature to plot; rounded to one decimal
    #[arg(long = "temperature", short = 't')]
    temperature: String,

    /// Number of trials to draw, starting from trial 0
    #[arg(long = "rounds_per_temp", short = 'r')]
    rounds_per_temp: usize,

    /// Rendering preset: l=480p15, m=720p30, h=1080p60, p=1440p60, k=2160p60
    #[arg(long = "quality", short = 'q', value_enum, default_value = "l")]
    quality: Quality,

    /// Root directory for rendered output
    #[arg(long = "media_dir", default_value = "media")]
    media_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let cfg = WalkConfig::load().context("load walk config")?;

    let scene = load_scene(
        &cfg.data_dir,
        &args.model_name,
        &args.temperature,
        args.rounds_per_temp,
    )
    .with_context(|| {
        format!(
            "build scene for {} at temperature {}",
            args.model_name, args.temperature
        )
    })?;
    tracing::info!(
        "animate.scene model={} temperature={:?} trials={} transitions={} duration_secs={:.1}",
        scene.model,
        scene.temperature,
        scene.tracks.len(),
        scene.transitions().count(),
        scene.duration(),
    );

    let out = render(&scene, args.quality, &args.media_dir).context("render animation")?;
    tracing::info!(
        "animate.rendered frames={} video={} last_frame={}",
        out.frames,
        out.paths.video.display(),
        out.paths.last_frame.display(),
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_flags_and_quality_default() {
        let args =
            Args::try_parse_from(["path-animator", "-m", "m:v", "-t", "0.5", "-r", "1"]).unwrap();
        assert_eq!(args.model_name, "m:v");
        assert_eq!(args.temperature, "0.5");
        assert_eq!(args.rounds_per_temp, 1);
        assert_eq!(args.quality, Quality::Low);
        assert_eq!(args.media_dir, PathBuf::from("media"));

        assert!(Args::try_parse_from(["path-animator", "-m", "m:v", "-t", "0.5"]).is_err());
    }

    #[test]
    fn long_flags_and_quality_letters() {
        let args = Args::try_parse_from([
            "path-animator",
            "--model_name",
            "m:v",
            "--temperature",
            "1.0",
            "--rounds_per_temp",
            "5",
            "--quality",
            "k",
        ])
        .unwrap();
        assert_eq!(args.quality, Quality::FourK);
        assert!(
            Args::try_parse_from([
                "path-animator", "-m", "m:v", "-t", "1.0", "-r", "5", "-q", "x"
            ])
            .is_err()
        );
    }
}

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "warhol", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the animated display on a simulated panel.
    Run(RunArgs),
    /// Print the default display configuration as JSON.
    Config,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Display configuration JSON. Defaults apply to missing fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of frames to run.
    #[arg(long, default_value_t = 300)]
    frames: u64,

    /// Override the refresh variant from the configuration.
    #[arg(long, value_enum)]
    variant: Option<VariantChoice>,

    /// Seed for block motion and colors. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Background image (PNG or JPEG). A procedural image is used when omitted.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Simulated transfer time per band, in microseconds.
    #[arg(long, default_value_t = 0)]
    latency_us: u64,

    /// Write the final panel contents to this PNG.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum VariantChoice {
    Synchronous,
    Background,
}

impl From<VariantChoice> for warhol::RefreshVariant {
    fn from(v: VariantChoice) -> Self {
        match v {
            VariantChoice::Synchronous => Self::Synchronous,
            VariantChoice::Background => Self::Background,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Config => cmd_config(),
    }
}

fn cmd_config() -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&warhol::DisplayConfig::default())
        .context("serialize default config")?;
    println!("{json}");
    Ok(())
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let mut cfg = match &args.config {
        Some(path) => warhol::DisplayConfig::from_path(path)?,
        None => warhol::DisplayConfig::default(),
    };
    if let Some(v) = args.variant {
        cfg.variant = v.into();
    }
    cfg.validate()?;

    let source: Box<dyn warhol::BackgroundSource> = match &args.image {
        Some(path) => Box::new(warhol::EncodedImage::from_path(path)?),
        None => Box::new(warhol::PopArtBackground),
    };
    let rng: Box<dyn warhol::RandomSource> = match args.seed {
        Some(seed) => Box::new(warhol::RngSource::seeded(seed)),
        None => Box::new(warhol::RngSource::from_os()),
    };
    let panel = warhol::SimulatedPanel::new(
        cfg.size(),
        warhol::SimulatedPanelOpts {
            latency: Duration::from_micros(args.latency_us),
        },
    )?;

    let mut session = warhol::DisplaySession::from_config(&cfg, panel, source, rng)?;
    let stats = session.run(args.frames)?;
    if let Some(e) = session.screen().control().fault() {
        anyhow::bail!("display could not start: {e}");
    }
    tracing::info!(
        frames = stats.frames,
        bands = stats.flush.bands,
        waits = stats.flush.waits,
        state = ?session.screen().control().state(),
        "run complete"
    );

    if let Some(out) = &args.out {
        if let Some(parent) = out.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        let gram = session.panel().snapshot()?;
        let rgb: Vec<u8> = gram
            .as_bytes()
            .chunks_exact(2)
            .flat_map(|px| {
                let c = warhol::Rgb565::from_be_bytes([px[0], px[1]]).to_rgba32();
                [c.r, c.g, c.b]
            })
            .collect();
        image::save_buffer_with_format(
            out,
            &rgb,
            u32::from(cfg.width),
            u32::from(cfg.height),
            image::ColorType::Rgb8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write PNG '{}'", out.display()))?;
        eprintln!("wrote {}", out.display());
    }
    Ok(())
}

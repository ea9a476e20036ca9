// hatchalign: command line front end for the hatch alignment vision loop

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use hatchvision_core::{AlignmentConfig, HsvBounds, PublishLayout, VisionConfig};
use hatchvision_eye::{annotate, AlignmentLoop, AlignmentPipeline, FrameOutcome, ImageDirSource, LoopSummary};
use hatchvision_table::{JsonLinesSink, TableConnection, TableSink};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hatchalign")]
#[command(about = "Hatch alignment from the two reflective strips around a slot", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (JSON, TOML or YAML)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the alignment loop over a directory of frames
    Run {
        /// Directory of frames, replayed in file name order
        #[arg(long)]
        source: PathBuf,

        #[command(flatten)]
        vision: VisionArgs,

        /// Table path in the shared store
        #[arg(long)]
        table: Option<String>,

        /// Publish layout (offset, direction-distance)
        #[arg(long)]
        layout: Option<PublishLayout>,

        /// Where offsets go
        #[arg(long, value_enum, default_value_t = SinkKind::Table)]
        sink: SinkKind,

        /// Save annotated frames into this directory
        #[arg(long)]
        annotate_dir: Option<PathBuf>,
    },

    /// Analyze a single image and print every stage's result
    Analyze {
        image: PathBuf,

        #[command(flatten)]
        vision: VisionArgs,

        /// Write the annotated frame to this path
        #[arg(long)]
        annotate: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    ShowConfig {
        #[command(flatten)]
        vision: VisionArgs,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SinkKind {
    /// In-process shared table
    Table,
    /// JSON lines on stdout
    Stdout,
}

/// Overrides for the `vision` config section
#[derive(Args, Debug)]
struct VisionArgs {
    /// Lower HSV bound
    #[arg(long, num_args = 3, value_names = ["H", "S", "V"])]
    lower: Option<Vec<u8>>,

    /// Upper HSV bound
    #[arg(long, num_args = 3, value_names = ["H", "S", "V"])]
    upper: Option<Vec<u8>>,

    /// Minimum region area in pixels (exclusive)
    #[arg(long)]
    min_area: Option<f64>,

    /// Physical distance between the two strips
    #[arg(long)]
    separation: Option<f64>,

    /// Reference center line in working-frame pixels
    #[arg(long)]
    center_x: Option<u32>,

    /// Resize frames to this width first; 0 keeps the source size
    #[arg(long)]
    resize_width: Option<u32>,
}

impl VisionArgs {
    fn apply(&self, vision: &mut VisionConfig) {
        let lower = self.lower.as_deref().and_then(triple);
        let upper = self.upper.as_deref().and_then(triple);
        if lower.is_some() || upper.is_some() {
            vision.bounds = HsvBounds::new(
                lower.unwrap_or(vision.bounds.lower),
                upper.unwrap_or(vision.bounds.upper),
            );
        }
        if let Some(area) = self.min_area {
            vision.min_area = area;
        }
        if let Some(separation) = self.separation {
            vision.target_separation = separation;
        }
        if let Some(center) = self.center_x {
            vision.center_x = Some(center);
        }
        if let Some(width) = self.resize_width {
            vision.resize_width = (width > 0).then_some(width);
        }
    }
}

fn triple(values: &[u8]) -> Option<[u8; 3]> {
    values.try_into().ok()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AlignmentConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AlignmentConfig::default(),
    };
    config.apply_env();
    if let Some(level) = &cli.log_level {
        config.runtime.log_level = level.clone();
    }

    init_logging(&config.runtime.log_level, cli.log_level.is_some());

    match cli.command {
        Commands::Run { source, vision, table, layout, sink, annotate_dir } => {
            vision.apply(&mut config.vision);
            if let Some(table) = table {
                config.sink.table = table;
            }
            if let Some(layout) = layout {
                config.sink.layout = layout;
            }
            if annotate_dir.is_some() {
                config.runtime.annotate_dir = annotate_dir;
            }
            config.validate().context("Invalid configuration")?;
            run(&config, &source, sink).await?;
        }
        Commands::Analyze { image, vision, annotate } => {
            vision.apply(&mut config.vision);
            config.validate().context("Invalid configuration")?;
            analyze(&config, &image, annotate.as_deref())?;
        }
        Commands::ShowConfig { vision } => {
            vision.apply(&mut config.vision);
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}

/// Logs go to stderr so `--sink stdout` output stays machine readable
fn init_logging(level: &str, explicit: bool) {
    let filter = if explicit {
        EnvFilter::new(level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(config: &AlignmentConfig, source_dir: &Path, sink_kind: SinkKind) -> Result<()> {
    let source = ImageDirSource::open(source_dir)
        .with_context(|| format!("Failed to open frame source {}", source_dir.display()))?;

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received, stopping after the current frame");
            stop_tx.send_replace(true);
        }
    });

    match sink_kind {
        SinkKind::Table => {
            let connection = Arc::new(TableConnection::new(config.sink.server.clone()));
            // the store lives in this process, so it is up as soon as it exists
            connection.listener().notify(true, "in-process table");
            if let Err(e) = connection.connect(config.sink.connect_timeout()).await {
                warn!("Continuing without a store connection: {}", e);
            }

            let sink = Arc::new(TableSink::new(connection, &config.sink.table, config.sink.layout));
            let summary = AlignmentLoop::new(source, sink.clone(), config)?.run(stop_rx).await;

            println!("{}", format_summary(&summary));
            println!("{}:", sink.table().path());
            for (key, value) in sink.table().snapshot() {
                println!("  {} = {}", key, value);
            }
        }
        SinkKind::Stdout => {
            let sink = Arc::new(JsonLinesSink::new(std::io::stdout()));
            let summary = AlignmentLoop::new(source, sink, config)?.run(stop_rx).await;
            eprintln!("{}", format_summary(&summary));
        }
    }

    Ok(())
}

fn format_summary(summary: &LoopSummary) -> String {
    let mut text = format!(
        "Frames: {} in {:.2}s ({:.1} fps)\n\
         Aligned: {}  No target: {}  Rejected: {}  Deadline misses: {}\n\
         Published: {}  Dropped: {}\n\
         Stopped: {:?}",
        summary.frames,
        summary.elapsed.as_secs_f64(),
        summary.fps(),
        summary.aligned,
        summary.no_target,
        summary.rejected,
        summary.deadline_misses,
        summary.published,
        summary.dropped,
        summary.stop_reason,
    );
    if let Some(offset) = summary.last_offset {
        text.push_str(&format!("\nLast offset: {:.4} ({})", offset.value, offset.direction));
    }
    text
}

fn analyze(config: &AlignmentConfig, path: &Path, annotate_to: Option<&Path>) -> Result<()> {
    let frame = image::open(path)
        .with_context(|| format!("Failed to read image {}", path.display()))?
        .to_rgb8();

    let pipeline = AlignmentPipeline::new(&config.vision, frame.dimensions())?;
    let frame = pipeline.prepare(frame);
    let analysis = pipeline.process(&frame);

    let (width, height) = pipeline.dimensions();
    println!("{} ({}x{}, center line x={})", path.display(), width, height, analysis.center_x);
    for (i, candidate) in analysis.candidates.iter().enumerate() {
        println!(
            "  candidate {}: centroid ({:.1}, {:.1}), area {:.0}, radius {:.1}",
            i,
            candidate.centroid.x,
            candidate.centroid.y,
            candidate.area,
            candidate.enclosing_circle.radius
        );
    }

    let side = |candidate: &Option<hatchvision_eye::processing::Candidate>| match candidate {
        Some(c) => format!("x={:.1}", c.centroid.x),
        None => "none".to_string(),
    };
    println!("  left:  {}", side(&analysis.pair.left));
    println!("  right: {}", side(&analysis.pair.right));

    match &analysis.outcome {
        FrameOutcome::Aligned(offset) => {
            println!("  offset: {:.4} ({})", offset.value, offset.direction)
        }
        FrameOutcome::NoTarget { .. } => println!("  offset: no target"),
        FrameOutcome::Rejected(e) => println!("  offset: rejected ({})", e),
    }

    if let Some(out) = annotate_to {
        annotate(&frame, &analysis)
            .save(out)
            .with_context(|| format!("Failed to write {}", out.display()))?;
        info!("Annotated frame written to {}", out.display());
    }

    Ok(())
}

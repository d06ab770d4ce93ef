use std::{
    io::Write,
    path::PathBuf,
    process::ExitCode,
    sync::atomic::{AtomicU32, Ordering},
};

use async_trait::async_trait;
use clap::Parser;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dicom_stack::{LoaderOptions, ProgressIndicator, Spacing, VolumeLoader, config};

/// Assemble a directory of DICOM slices into a volume and report its shape.
#[derive(Parser, Debug)]
#[command(name = "dicom-stack", version, about)]
struct Cli {
    /// Directory holding the slices of one volume.
    dir: PathBuf,

    /// Extension marking slice files.
    #[arg(long, env = "DICOM_STACK_EXTENSION", default_value = config::DEFAULT_EXTENSION)]
    extension: String,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

/// Percentage written to stderr, redrawn only when it changes.
#[derive(Default)]
struct ConsoleProgress {
    last_percent: AtomicU32,
}

#[async_trait]
impl ProgressIndicator for ConsoleProgress {
    async fn show(&self) {
        self.last_percent.store(u32::MAX, Ordering::Relaxed);
    }

    async fn hide(&self) {
        eprintln!();
    }

    fn set_message(&self, message: &str) {
        eprint!("\r{message:<24}");
    }

    fn set_progress(&self, fraction: f32) {
        let percent = (fraction.clamp(0.0, 1.0) * 100.0) as u32;
        if self.last_percent.swap(percent, Ordering::Relaxed) != percent {
            eprint!("\r{:<24}{percent:>3}%", "");
            let _ = std::io::stderr().flush();
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let loader = VolumeLoader::new()
        .with_options(LoaderOptions::default().with_extension(cli.extension))
        .with_indicator(ConsoleProgress::default());

    let loaded = match loader.load_volume(&cli.dir).await {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let (width, height, depth) = loaded.volume.dim();
    println!("dimensions: {width} x {height} x {depth}");
    match &loaded.spacing {
        Spacing::Known(factors) => println!("spacing:    {factors}"),
        Spacing::Unknown { reason } => println!("spacing:    unknown ({reason})"),
    }
    if let Some((x, y, z)) = loaded.physical_extent() {
        println!("extent:     {x:.1} x {y:.1} x {z:.1} mm");
    }
    if let Some((lo, hi)) = loaded.volume.intensity_range() {
        println!("intensity:  {lo} .. {hi}");
    }

    ExitCode::SUCCESS
}

fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "dicom_stack=debug"
    } else {
        "dicom_stack=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

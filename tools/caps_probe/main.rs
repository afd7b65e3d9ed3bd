//! Build a simulated camera from configuration and report its capabilities.
//!
//! ```text
//! caps_probe --config config/camera.toml
//! caps_probe --json
//! RUST_LOG=detector_caps=debug caps_probe
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use detector_caps::config::CameraConfig;
use detector_caps::hardware::mock::MockCamera;
use detector_caps::hardware::{resolve_all, CapabilityKind};

#[derive(Parser, Debug)]
#[command(name = "caps_probe", about = "List the capabilities of a configured camera")]
struct Args {
    /// Camera configuration file (TOML). Defaults and DETCAPS_* variables apply.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Serialize)]
struct CapabilityReport {
    kind: CapabilityKind,
    code: u16,
    status: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match &args.config {
        Some(path) => CameraConfig::load_from(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => CameraConfig::load_env().context("loading configuration")?,
    };

    let camera = MockCamera::new(&config).context("building camera")?;
    let hw = camera.interface();

    let report: Vec<CapabilityReport> = resolve_all(hw)
        .into_iter()
        .map(|(kind, resolved)| CapabilityReport {
            kind,
            code: kind.code(),
            status: match resolved {
                Ok(handle) => handle.describe(),
                Err(err) if err.is_lookup_failure() => format!("unavailable: {err}"),
                Err(err) => format!("error: {err}"),
            },
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Camera '{}' ({} capabilities)", hw.name(), hw.len());
        for entry in &report {
            println!("  [{}] {:<9} {}", entry.code, entry.kind.to_string(), entry.status);
        }
    }

    Ok(())
}

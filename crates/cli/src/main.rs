//! satcover CLI - inspect boundaries and region covers from the shell
//!
//! The counting path needs a granule index backend and is wired by the
//! embedding service; the CLI exercises the boundary parsing and region
//! covering stages against local .poly files.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use satcover_core::application::{CoverConfig, RegionCoverer};
use satcover_core::domain::BoundingBox;
use satcover_core::port::BoundarySource;
use satcover_infra_poly::PolyDirSource;

#[derive(Parser)]
#[command(name = "satcover")]
#[command(about = "Region covers for satellite granule queries", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding <region>.poly boundary files
    #[arg(long, env = "SATCOVER_POLY_DIR", default_value = ".")]
    poly_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the cell cover approximating a region
    Cover {
        /// Region identifier (resolves to <poly_dir>/<region>.poly)
        region: String,

        /// Finest allowed cell level (0-15)
        #[arg(long, default_value = "15")]
        max_level: u8,

        /// Upper bound on cover size
        #[arg(long, default_value = "100")]
        max_cells: usize,

        /// Emit machine-readable JSON instead of a listing
        #[arg(long)]
        json: bool,
    },

    /// Parse a region boundary and report its point count
    Parse {
        /// Region identifier
        region: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let source = PolyDirSource::new(&cli.poly_dir);

    match cli.command {
        Commands::Cover {
            region,
            max_level,
            max_cells,
            json,
        } => {
            let coords = source
                .boundary(&region)
                .await
                .with_context(|| format!("loading boundary for region '{region}'"))?;
            let coverer = RegionCoverer::new(CoverConfig {
                max_level,
                max_cells,
            })?;
            let cover = coverer.cover(&coords)?;

            if json {
                let cells: Vec<_> = cover
                    .iter()
                    .map(|cell| {
                        let bbox = BoundingBox::of_cell(cell);
                        json!({
                            "cell": cell.to_string(),
                            "level": u8::from(cell.resolution()),
                            "lat_lo": bbox.lat_lo,
                            "lng_lo": bbox.lng_lo,
                            "lat_hi": bbox.lat_hi,
                            "lng_hi": bbox.lng_hi,
                        })
                    })
                    .collect();
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "region": region,
                        "cells": cells,
                    }))?
                );
            } else {
                println!("cover for '{}': {} cells", region, cover.len());
                for cell in cover.iter() {
                    let bbox = BoundingBox::of_cell(cell);
                    println!(
                        "  {} level={} lat=[{:.4}, {:.4}] lng=[{:.4}, {:.4}]",
                        cell,
                        u8::from(cell.resolution()),
                        bbox.lat_lo,
                        bbox.lat_hi,
                        bbox.lng_lo,
                        bbox.lng_hi,
                    );
                }
            }
        }

        Commands::Parse { region } => {
            let coords = source
                .boundary(&region)
                .await
                .with_context(|| format!("loading boundary for region '{region}'"))?;
            println!(
                "region '{}': {} boundary points",
                region,
                coords.len() / 2
            );
        }
    }

    Ok(())
}

fn init_logging() {
    let log_format = std::env::var("SATCOVER_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("satcover=info"))
        .expect("Failed to create env filter");

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }
}

//! Cropsight CLI - crop health, soil and pest risk from multispectral imagery

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use cropsight_algorithms::imagery::{correct_and_index, IndexMaps, SpectralIndex};
use cropsight_algorithms::{analyze_field, AnalysisConfig, FieldAssessment};
use cropsight_core::io::{read_band_stack, read_geotiff, write_geotiff};
use cropsight_core::raster::{BandStack, Raster, BAND_COUNT};
use cropsight_core::SensorSeries;

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "cropsight")]
#[command(author, version, about = "Crop health, soil and pest risk from multispectral imagery", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
    /// Run the full field analysis
    Analyze {
        /// Eight single-band GeoTIFFs: blue green red nir re1 re2 re3 swir1
        #[arg(num_args = BAND_COUNT, required = true)]
        bands: Vec<PathBuf>,
        /// Sensor series (JSON)
        #[arg(short, long)]
        sensors: PathBuf,
        /// Analysis configuration (JSON); defaults apply to missing fields
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Block-average the input by this factor before analysis
        #[arg(short, long)]
        downsample: Option<usize>,
        /// Output directory
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Correct the bands and write the eight index maps
    Indices {
        /// Eight single-band GeoTIFFs: blue green red nir re1 re2 re3 swir1
        #[arg(num_args = BAND_COUNT, required = true)]
        bands: Vec<PathBuf>,
        /// Analysis configuration (JSON); only the spectral section is used
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Block-average the input by this factor first
        #[arg(short, long)]
        downsample: Option<usize>,
        /// Output directory
        #[arg(short, long)]
        output: PathBuf,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set the default subscriber")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_bands(paths: &[PathBuf]) -> Result<BandStack> {
    let pb = spinner("Reading bands...");
    let stack = read_band_stack(paths).context("Failed to read band stack")?;
    pb.finish_and_clear();
    info!(
        "Input: {} x {} x {} bands",
        stack.cols(),
        stack.rows(),
        stack.band_count()
    );
    Ok(stack)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} from {}", what, path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid {} in {}", what, path.display()))
}

fn load_config(path: Option<&Path>, downsample: Option<usize>) -> Result<AnalysisConfig> {
    let mut config = match path {
        Some(p) => read_json(p, "configuration")?,
        None => AnalysisConfig::default(),
    };
    if let Some(factor) = downsample {
        config.downsample = factor;
    }
    Ok(config)
}

fn write_raster<T: cropsight_core::RasterElement>(
    raster: &Raster<T>,
    dir: &Path,
    name: &str,
) -> Result<()> {
    let path = dir.join(format!("{}.tif", name));
    write_geotiff(raster, &path).with_context(|| format!("Failed to write {}", path.display()))
}

fn write_indices(maps: &IndexMaps, dir: &Path) -> Result<()> {
    for index in SpectralIndex::ALL {
        write_raster(maps.get(index), dir, index.name())?;
    }
    Ok(())
}

fn write_assessment(assessment: &FieldAssessment, dir: &Path) -> Result<()> {
    let pb = spinner("Writing outputs...");
    write_indices(&assessment.spectral.indices, dir)?;
    write_raster(&assessment.health.health_map, dir, "health_map")?;
    write_raster(&assessment.soil.moisture_map, dir, "moisture_map")?;
    write_raster(&assessment.soil.soil_types.map, dir, "soil_types")?;
    write_raster(&assessment.pest.anomaly.map, dir, "spectral_anomaly")?;
    write_raster(&assessment.pest.risk_map.values, dir, "risk_map")?;
    write_raster(&assessment.pest.risk_map.levels, dir, "risk_levels")?;

    let json = serde_json::to_string_pretty(assessment).context("Failed to encode assessment")?;
    fs::write(dir.join("assessment.json"), json).context("Failed to write assessment.json")?;
    pb.finish_and_clear();
    Ok(())
}

fn print_assessment(a: &FieldAssessment) {
    println!("Field: {} x {} pixels", a.shape.1, a.shape.0);
    println!(
        "  Crop health:  {:.2} ({}, confidence {:.2})",
        a.health.overall.score,
        a.health.overall.status.label(),
        a.health.overall.confidence
    );
    println!(
        "  Soil health:  {:.2} ({:?}, dominant soil {})",
        a.soil.overall.score,
        a.soil.overall.status,
        a.soil.soil_types.dominant.label()
    );
    println!(
        "  Pest risk:    {:.2} ({}), vulnerable area {:.1}%",
        a.pest.overall.score,
        a.pest.overall.status.label(),
        a.pest.vulnerable_area_percentage
    );
    for pest in &a.pest.presence.likely_pests {
        println!("    likely: {}", pest.label());
    }
    for p in &a.soil.parameters {
        let unit = p.parameter.unit();
        match p.condition {
            Some(_) => println!(
                "    {:<24} {:>8.2} {:<6} {}",
                p.parameter.series_name(),
                p.summary.mean,
                unit,
                p.label
            ),
            None => println!("    {:<24} {:>8} {:<6} {}", p.parameter.series_name(), "-", unit, p.label),
        }
    }
    for rec in &a.soil.recommendations {
        println!("  - {}", rec);
    }
    println!(
        "  Overall:      {:.2} ({})",
        a.overall.score,
        a.overall.status.label()
    );
}

fn done(dir: &Path, elapsed: std::time::Duration) {
    println!("Outputs saved to: {}", dir.display());
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Info { input } => {
            let raster: Raster<f64> = read_geotiff(&input).context("Failed to read raster")?;
            let (rows, cols) = raster.shape();
            let stats = raster.statistics();
            let gt = raster.transform();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
            println!("Cell size: {}", gt.cell_size());
            println!("Origin: ({:.6}, {:.6})", gt.origin_x, gt.origin_y);
            let (x0, y0) = gt.pixel_to_geo(0, 0);
            let (x1, y1) = gt.pixel_to_geo(cols.saturating_sub(1), rows.saturating_sub(1));
            println!(
                "Pixel centres: ({:.6}, {:.6}) to ({:.6}, {:.6})",
                x0, y0, x1, y1
            );
            println!("\nStatistics:");
            if let Some(min) = stats.min {
                println!("  Min: {:.4}", min);
            }
            if let Some(max) = stats.max {
                println!("  Max: {:.4}", max);
            }
            if let Some(mean) = stats.mean {
                println!("  Mean: {:.4}", mean);
            }
            println!(
                "  Valid cells: {} ({:.1}%)",
                stats.valid_count,
                100.0 * stats.valid_count as f64 / raster.len().max(1) as f64
            );
        }

        Commands::Analyze {
            bands,
            sensors,
            config,
            downsample,
            output,
        } => {
            let config = load_config(config.as_deref(), downsample)?;
            let sensors: SensorSeries = read_json(&sensors, "sensor series")?;
            let stack = read_bands(&bands)?;
            fs::create_dir_all(&output)
                .with_context(|| format!("Failed to create {}", output.display()))?;

            let start = Instant::now();
            let pb = spinner("Analysing field...");
            let assessment =
                analyze_field(&stack, &sensors, &config).context("Field analysis failed")?;
            pb.finish_and_clear();
            let elapsed = start.elapsed();

            write_assessment(&assessment, &output)?;
            print_assessment(&assessment);
            done(&output, elapsed);
        }

        Commands::Indices {
            bands,
            config,
            downsample,
            output,
        } => {
            let config = load_config(config.as_deref(), downsample)?;
            let stack = read_bands(&bands)?;
            let (stack, spectral) = if config.downsample == 1 {
                (stack, config.spectral.clone())
            } else {
                let small = stack
                    .downsample(config.downsample)
                    .context("Invalid downsample factor")?;
                (small, config.spectral.fast_path())
            };
            fs::create_dir_all(&output)
                .with_context(|| format!("Failed to create {}", output.display()))?;

            let start = Instant::now();
            let products = correct_and_index(&stack, &spectral)
                .context("Failed to compute indices")?;
            let elapsed = start.elapsed();

            write_indices(&products.indices, &output)?;
            for index in SpectralIndex::ALL {
                let stats = products.indices.get(index).statistics();
                println!(
                    "  {:<6} mean {:>8.4}",
                    index.name(),
                    stats.mean.unwrap_or(f64::NAN)
                );
            }
            done(&output, elapsed);
        }
    }

    Ok(())
}

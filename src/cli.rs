use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "annual-composite")]
#[command(about = "Masked annual spectral index composites, zonal statistics and trends")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Scene archive manifest (JSON)
    #[arg(long, global = true)]
    pub archive: Option<PathBuf>,

    /// Region of interest: JSON file with a `vertices` ring of [lon, lat] pairs
    #[arg(short, long, global = true)]
    pub region: Option<PathBuf>,

    /// Output file path, `-` for stdout
    #[arg(short, long, default_value = "-", global = true)]
    pub output: PathBuf,

    /// Cloud/shadow mask strength (0 disables the mask)
    #[arg(long, default_value = "100", global = true)]
    pub cloud_mask: u8,

    /// Water mask strength (0 disables the mask)
    #[arg(long, default_value = "0", global = true)]
    pub water_mask: u8,

    /// Engine settings file (JSON); defaults apply to missing fields
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Worker threads for series builds
    #[arg(long, global = true)]
    pub threads: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Annual median composite of an index
    Composite {
        /// Index name (NDVI, EVI, NDWI, MNDWI, NDBI, LST)
        #[arg(short, long, default_value = "NDVI")]
        index: String,

        /// Calendar year
        #[arg(short, long)]
        year: i32,
    },

    /// Zonal statistics of an annual composite
    Stats {
        #[arg(short, long, default_value = "NDVI")]
        index: String,

        #[arg(short, long)]
        year: i32,
    },

    /// Yearly median trend over a year range
    Series {
        #[arg(short, long, default_value = "NDVI")]
        index: String,

        /// First year (defaults to the configured start year)
        #[arg(long)]
        start: Option<i32>,

        /// Last year, inclusive (defaults to the configured end year)
        #[arg(long)]
        end: Option<i32>,
    },

    /// Pixels whose composite changed by more than a threshold against a baseline year
    Anomaly {
        #[arg(short, long, default_value = "NDVI")]
        index: String,

        #[arg(short, long)]
        year: i32,

        /// Baseline year
        #[arg(short, long)]
        baseline: i32,

        /// Absolute difference threshold in index units
        #[arg(short, long)]
        threshold: Option<f32>,
    },

    /// Two annual composites side by side
    Compare {
        #[arg(short, long, default_value = "NDVI")]
        index: String,

        /// Left-hand year
        #[arg(long)]
        left: i32,

        /// Right-hand year
        #[arg(long)]
        right: i32,
    },

    /// Run the operations listed in a batch file
    Batch {
        /// Batch file (JSON)
        file: PathBuf,
    },
}

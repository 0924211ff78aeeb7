use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "cart-analytics")]
#[command(about = "Sales analytics over closed shopping carts", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the analysis pipeline and write charts, spreadsheet and rules
    Analyze(AnalyzeArgs),
    /// Populate the database with generated users, carts and items
    Seed(SeedArgs),
    /// Print configuration values
    PrintConfig,
    /// Truncate all database tables
    TruncateDb,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Directory the artifacts are written to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Do not mine association rules
    #[arg(long)]
    pub skip_association: bool,
}

#[derive(Debug, Args)]
pub struct SeedArgs {
    #[arg(long)]
    pub users: Option<usize>,
    #[arg(long)]
    pub carts: Option<usize>,
    /// Maximum number of distinct products per cart
    #[arg(long)]
    pub items_per_cart: Option<usize>,
    /// Spread cart timestamps over this many past days
    #[arg(long)]
    pub days: Option<u32>,
    /// Fixed seed for reproducible data
    #[arg(long)]
    pub rng_seed: Option<u64>,
}

use crate::domain::model::Device;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "rank-collector")]
#[command(about = "Collect marketplace search ranks and shop hit counts for tracked products")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "collector.toml")]
    pub config: String,

    /// Restrict the run to these devices (pc, sp)
    #[arg(long, value_delimiter = ',')]
    pub device: Vec<Device>,

    /// Load and group targets without fetching or writing anything
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

use std::path::PathBuf;

use streetdb::OutputFormat;

/// Street-trie builder (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "streetdb", version, about, propagate_version = true)]
pub struct Cli {
    /// Path to a CSV file. Defaults to the only .csv in the current folder.
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub input: Option<PathBuf>,

    /// Output file path; in shard mode its stem names the shard files.
    #[arg(long, default_value = "street_trie.packed", value_hint = clap::ValueHint::FilePath)]
    pub output: PathBuf,

    /// Output format. Defaults to packed for compact binary output.
    #[arg(long, value_enum, default_value_t = Format::Packed)]
    pub format: Format,

    /// Path to a countries CSV (country, name, latitude, longitude).
    /// Defaults to countries.csv beside the builder; "none" disables.
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub countries: Option<PathBuf>,

    /// Shard by this many prefix characters (0 to disable).
    #[arg(long, default_value_t = 3)]
    pub shard_prefix_len: usize,

    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum Format {
    Json,
    Msgpack,
    Packed,
}

impl Format {
    pub fn as_output(self) -> OutputFormat {
        match self {
            Format::Json => OutputFormat::Json,
            Format::Msgpack => OutputFormat::Msgpack,
            Format::Packed => OutputFormat::Packed,
        }
    }
}

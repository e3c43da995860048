use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "trace-compose", author, version, about)]
pub struct Args {
    /// Figure manifest (JSON)
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,

    /// Directory holding the trace files (overrides the manifest)
    #[arg(long, value_name = "DIR")]
    pub input_dir: Option<PathBuf>,

    /// Directory receiving the figures (overrides the manifest)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Only run the named figure; repeatable
    #[arg(long, value_name = "NAME")]
    pub only: Vec<String>,

    /// Load and compose every figure without writing images
    #[arg(long, default_value_t = false)]
    pub check: bool,
}

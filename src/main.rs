mod cli;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use cli::Args;
use trace_compose::batch::{self, BatchOptions};
use trace_compose::manifest::Manifest;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// `Ok(false)` when at least one figure failed.
fn run(args: Args) -> anyhow::Result<bool> {
    let mut manifest = Manifest::from_path(&args.manifest)
        .with_context(|| format!("loading manifest {}", args.manifest.display()))?;
    if let Some(dir) = args.input_dir {
        manifest.input_dir = dir;
    }
    if let Some(dir) = args.output_dir {
        manifest.output_dir = dir;
    }

    let opts = BatchOptions {
        only: args.only,
        check: args.check,
    };
    let report = batch::run(&manifest, &opts)?;

    for (name, err) in &report.failed {
        eprintln!("{name}: {err:#}");
    }
    Ok(report.is_success())
}

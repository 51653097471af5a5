//! Command-line bootstrap for the sweep harness.
//!
//! With no arguments, writes `inputTemplate.txt` for the demo model.
//! With an input file, resolves and runs it. With `--split`, partitions
//! the input file instead of running it:
//!
//! ```text
//! sweep-harness
//! sweep-harness experiment.txt
//! sweep-harness experiment.txt --split drift:d num_agents:n
//! ```

mod demo;

use std::path::Path;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sweep_harness_core_rs::template::TEMPLATE_FILE;
use sweep_harness_core_rs::Harness;

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut harness = Harness::new(demo::DemoModel::new());

    match args.split_first() {
        None => {
            if let Err(e) = harness.write_template() {
                error!("failed to write template: {}", e);
                return ExitCode::FAILURE;
            }
            info!("wrote {}; fill it in and pass it back as an argument", TEMPLATE_FILE);
        }
        Some((file, rest)) if rest.first().map(String::as_str) == Some("--split") => {
            let pairs = match parse_split_pairs(&rest[1..]) {
                Ok(pairs) => pairs,
                Err(arg) => {
                    error!("--split arguments must be <parameter>:<tag>, got {:?}", arg);
                    return ExitCode::FAILURE;
                }
            };
            match harness.split(Path::new(file), &pairs) {
                Ok(written) => {
                    for path in &written {
                        info!("wrote {}", path.display());
                    }
                    info!(partitions = written.len(), "split complete");
                }
                Err(e) => {
                    error!("split failed: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
        Some((file, [])) => match harness.run_file(Path::new(file)) {
            Ok(summary) => {
                info!(
                    leaf_runs = summary.leaf_runs,
                    replications = summary.replications,
                    end_rows = summary.rows.end,
                    timecourse_rows = summary.rows.timecourse,
                    "all runs complete"
                );
            }
            Err(e) => {
                error!("run failed: {}", e);
                return ExitCode::FAILURE;
            }
        },
        Some(_) => {
            error!("usage: sweep-harness [<input file> [--split <parameter>:<tag> ...]]");
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}

/// Parse `name:tag` pairs; at least one is required after `--split`.
fn parse_split_pairs(args: &[String]) -> Result<Vec<(String, String)>, String> {
    if args.is_empty() {
        return Err(String::from("nothing"));
    }
    args.iter()
        .map(|arg| {
            arg.split_once(':')
                .filter(|(name, tag)| !name.is_empty() && !tag.is_empty())
                .map(|(name, tag)| (name.to_string(), tag.to_string()))
                .ok_or_else(|| arg.clone())
        })
        .collect()
}

//! # promo-checker CLI — batch code verifier
//!
//! Reads a proxy list and a code list, asks how many checkers to run, then
//! classifies every code through rotating proxies into per-outcome files.
//!
//! ## Usage
//!
//! ```bash
//! # Interactive run with the default file layout
//! cargo run --release
//!
//! # Non-interactive: 16 checkers, explicit inputs
//! cargo run --release -- --workers 16 --proxies proxies.txt --codes codes.txt
//!
//! # Print the configuration JSON schema
//! cargo run -- --schema
//! ```
//!
//! ## Environment Variables
//!
//! - `LOG_FORMAT=json` — structured JSON output (production)
//! - `RUST_LOG=info` — log level filter (default: info)

use inquire::validator::Validation;
use inquire::Text;
use promo_checker::config::export_schema;
use promo_checker::{
    await_checkers, init_tracing, input, spawn_checkers, CheckerConfig, CheckerContext,
    CheckerError, CodeQueue, GiftClient, ProxyRing, RunCounters, SinkSet,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Parsed CLI arguments. Every option is optional; unset values fall back
/// to the config file or its defaults.
struct Args {
    /// Path to a TOML configuration file.
    config: Option<PathBuf>,
    /// Checker count; skips the interactive prompt when set.
    workers: Option<usize>,
    /// Override for the proxy list path.
    proxies: Option<PathBuf>,
    /// Override for the code list path.
    codes: Option<PathBuf>,
    /// Override for the output directory.
    output: Option<PathBuf>,
    /// Print the configuration JSON schema and exit.
    schema: bool,
}

/// Parse command-line arguments manually (no external arg parser dependency).
///
/// # Returns
///
/// - `Ok(Args)` on success
/// - `Err(String)` with a usage message on failure
fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = std::env::args().collect();
    let mut config: Option<PathBuf> = None;
    let mut workers: Option<usize> = None;
    let mut proxies: Option<PathBuf> = None;
    let mut codes: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;
    let mut schema = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                i += 1;
                if i >= args.len() {
                    return Err("--config requires a value".to_string());
                }
                config = Some(PathBuf::from(&args[i]));
            }
            "--workers" | "-w" => {
                i += 1;
                if i >= args.len() {
                    return Err("--workers requires a value".to_string());
                }
                let count: usize = args[i]
                    .parse()
                    .map_err(|_| format!("invalid worker count: {}", args[i]))?;
                if count == 0 {
                    return Err("worker count must be at least 1".to_string());
                }
                workers = Some(count);
            }
            "--proxies" => {
                i += 1;
                if i >= args.len() {
                    return Err("--proxies requires a value".to_string());
                }
                proxies = Some(PathBuf::from(&args[i]));
            }
            "--codes" => {
                i += 1;
                if i >= args.len() {
                    return Err("--codes requires a value".to_string());
                }
                codes = Some(PathBuf::from(&args[i]));
            }
            "--output" => {
                i += 1;
                if i >= args.len() {
                    return Err("--output requires a value".to_string());
                }
                output = Some(PathBuf::from(&args[i]));
            }
            "--schema" => {
                schema = true;
            }
            "--help" | "-h" => {
                return Err(usage());
            }
            other => {
                return Err(format!("unknown argument: {other}\n{}", usage()));
            }
        }
        i += 1;
    }

    Ok(Args {
        config,
        workers,
        proxies,
        codes,
        output,
        schema,
    })
}

/// Print usage information.
fn usage() -> String {
    [
        "Usage: promo-checker [OPTIONS]",
        "",
        "Options:",
        "  --config, -c <FILE>   Load settings from a TOML file",
        "  --workers, -w <N>     Checker count (skips the interactive prompt)",
        "  --proxies <FILE>      Proxy list, one endpoint per line (default: proxies.txt)",
        "  --codes <FILE>        Code list, one code or URL per line (default: codes.txt)",
        "  --output <DIR>        Directory for outcome files (default: output)",
        "  --schema              Print the configuration JSON schema and exit",
        "  --help, -h            Show this help message",
    ]
    .join("\n")
}

/// Ask the operator how many checkers to run.
///
/// Falls back to `default` when the prompt cannot be shown, e.g. when
/// stdin is not a terminal.
fn prompt_for_workers(default: usize) -> usize {
    let initial = default.to_string();
    let prompt = Text::new("How many checkers do you want to run?")
        .with_initial_value(&initial)
        .with_validator(
            |input: &str| -> Result<Validation, inquire::CustomUserError> {
                match input.trim().parse::<usize>() {
                    Ok(n) if n >= 1 => Ok(Validation::Valid),
                    _ => Ok(Validation::Invalid(
                        "enter a whole number of at least 1".into(),
                    )),
                }
            },
        )
        .prompt();

    match prompt {
        Ok(answer) => answer.trim().parse().unwrap_or(default),
        Err(e) => {
            warn!(error = %e, default, "prompt unavailable, using configured worker count");
            default
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    let _ = init_tracing();

    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{msg}");
            std::process::exit(1);
        }
    };

    if args.schema {
        match export_schema() {
            Ok(schema) => println!("{schema}"),
            Err(e) => {
                eprintln!("Failed to export schema: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    // Config file first, CLI overrides on top.
    let mut config = match &args.config {
        Some(path) => match CheckerConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config: {e}");
                std::process::exit(1);
            }
        },
        None => CheckerConfig::default(),
    };
    if let Some(proxies) = args.proxies {
        config.proxies_file = proxies;
    }
    if let Some(codes) = args.codes {
        config.codes_file = codes;
    }
    if let Some(output) = args.output {
        config.output_dir = output;
    }

    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    }

    // Load inputs
    let proxy_lines = match input::read_lines(&config.proxies_file) {
        Ok(lines) => lines,
        Err(e) => {
            eprintln!("Failed to read proxy list: {e}");
            std::process::exit(1);
        }
    };
    if proxy_lines.is_empty() {
        eprintln!("{}", CheckerError::NoProxies);
        std::process::exit(1);
    }

    let codes = match input::load_codes(&config.codes_file) {
        Ok(codes) => codes,
        Err(e) => {
            eprintln!("Failed to read code list: {e}");
            std::process::exit(1);
        }
    };
    if codes.is_empty() {
        eprintln!("{}", CheckerError::NoCodes);
        std::process::exit(1);
    }

    info!(
        proxies = proxy_lines.len(),
        codes = codes.len(),
        "inputs loaded"
    );

    let workers = match args.workers {
        Some(count) => count,
        None => prompt_for_workers(config.workers),
    };

    // Build the shared run state
    let ring = match ProxyRing::from_lines(&proxy_lines, &config) {
        Ok(ring) => Arc::new(ring),
        Err(e) => {
            eprintln!("Failed to prepare proxies: {e}");
            std::process::exit(1);
        }
    };

    let sinks = match SinkSet::create(&config.output_dir, &config.record_prefix).await {
        Ok(sinks) => Arc::new(sinks),
        Err(e) => {
            eprintln!("Failed to create output files: {e}");
            std::process::exit(1);
        }
    };

    let queue = Arc::new(CodeQueue::new(codes));
    let counters = Arc::new(RunCounters::new());
    let classifier = Arc::new(GiftClient::new(&config));

    let ctx = CheckerContext {
        queue: Arc::clone(&queue),
        ring,
        classifier,
        sinks,
        counters: Arc::clone(&counters),
        poll_interval: config.poll_interval(),
    };

    eprintln!(
        "Spawning {} checkers over {} codes...",
        workers,
        queue.initial_len()
    );

    let handles = spawn_checkers(&ctx, workers);
    let reports = await_checkers(handles).await;

    // Print final summary
    eprintln!("\n--- Run Summary ---");
    for report in &reports {
        eprintln!(
            "  {}: {} checked, {} hits, {} deferred",
            report.checker_id, report.processed, report.hits, report.deferrals
        );
    }

    let snapshot = counters.snapshot();
    eprintln!("  3-month:  {}", snapshot.three_month);
    eprintln!("  1-month:  {}", snapshot.one_month);
    eprintln!("  invalid:  {}", snapshot.invalid);
    eprintln!("  used:     {}", snapshot.used);
    eprintln!("  unknown:  {}", snapshot.unknown());
    eprintln!("Total: {} codes classified", snapshot.total);
    eprintln!("Results written to {}", config.output_dir.display());
}

//! Headless match-cascade runner (default binary).
//!
//! Plays hint-chosen swaps on a seeded board and prints the final board and
//! score. Logging goes to stderr and is controlled by `RUST_LOG`.

use anyhow::Result;

use match_cascade::runner::{load_config, parse_runner_args, render_text, run};

fn main() -> Result<()> {
    init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = parse_runner_args(&args)?;
    let config = load_config(&args)?;

    let summary = run(config, args.turns)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", render_text(&summary));
    }
    Ok(())
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

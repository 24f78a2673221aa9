//! Generate a puzzle worksheet PDF from the command line.
//!
//! Usage: cargo run --bin print-worksheet -- [--theme T] [--min-rating N]
//!        [--max-rating N] [--count N] [--output PATH] [--seed N] [--offline]
//!
//! `--offline` skips the Lichess API; only a configured snapshot file and the
//! curated set are used.

use std::env;
use std::fs;
use std::sync::Arc;

use anyhow::Context;
use puzzle_server::clients::memory::MemoryApi;
use puzzle_server::config::Config;
use puzzle_server::service::{GenerateRequest, WorksheetError, WorksheetService};
use tracing_subscriber::EnvFilter;

const DEFAULT_COUNT: i64 = 9;
const DEFAULT_OUTPUT: &str = "puzzles.pdf";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = env::args().collect();

    let mut request = GenerateRequest {
        count: DEFAULT_COUNT,
        ..GenerateRequest::default()
    };
    let mut output = DEFAULT_OUTPUT.to_string();
    let mut offline = false;

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match args[i].as_str() {
            "--theme" => {
                if let Some(v) = value {
                    request.theme = v.clone();
                }
                i += 2;
            }
            "--min-rating" => {
                request.min_rating = value.and_then(|s| s.parse().ok()).unwrap_or(request.min_rating);
                i += 2;
            }
            "--max-rating" => {
                request.max_rating = value.and_then(|s| s.parse().ok()).unwrap_or(request.max_rating);
                i += 2;
            }
            "--count" => {
                request.count = value.and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_COUNT);
                i += 2;
            }
            "--output" => {
                if let Some(v) = value {
                    output = v.clone();
                }
                i += 2;
            }
            "--seed" => {
                request.seed = value.and_then(|s| s.parse().ok());
                i += 2;
            }
            "--offline" => {
                offline = true;
                i += 1;
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: {} [--theme T] [--min-rating N] [--max-rating N] [--count N] [--output PATH] [--seed N] [--offline]",
                    args[0]
                );
                return Ok(());
            }
            other => {
                eprintln!("Ignoring unknown argument: {other}");
                i += 1;
            }
        }
    }

    let config = Config::from_env();
    let service = if offline {
        WorksheetService::with_api(Arc::new(MemoryApi::default()), &config)
    } else {
        WorksheetService::from_config(&config).context("Failed to build Lichess client")?
    };

    println!(
        "Fetching {} puzzle(s) for theme '{}' (rating {}-{})...",
        request.count, request.theme, request.min_rating, request.max_rating
    );

    let worksheet = match service.generate(&request).await {
        Ok(worksheet) => worksheet,
        Err(WorksheetError::NoPuzzlesFound) => {
            eprintln!("No puzzles found matching your criteria!");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    fs::write(&output, &worksheet.pdf).with_context(|| format!("Failed to write {output}"))?;

    println!();
    println!("Generated {output}");
    println!("  Theme:         {}", request.theme);
    println!("  Rating range:  {}-{}", request.min_rating, request.max_rating);
    println!("  Puzzles:       {}", worksheet.puzzle_count);
    println!("  Pages:         {} puzzle + {} solution", worksheet.puzzle_pages, worksheet.solution_pages);

    Ok(())
}

use crate::config::{Config, SaveFormat};
use crate::scraper::{CrawlOutcome, CrawlSettings, CrawlState, Crawler, WebDriverSession};
use crate::sinks::Sink;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

mod config;
mod db;
mod errors;
mod logging;
mod scraper;
mod sinks;

#[cfg(test)]
mod tests;

/// Collect classified ads from a search and save them to Excel, CSV or SQLite.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// JSON config file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Append-only event log
    #[arg(long, default_value = "avito_parser.log")]
    log_file: PathBuf,

    /// Start without asking for confirmation
    #[arg(short, long)]
    yes: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // 1️⃣ Logging goes to a file; the console is for the user.
    if let Err(e) = logging::init(&cli.log_file) {
        eprintln!("Could not open log file {}: {e}", cli.log_file.display());
    }

    // 2️⃣ Config
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    print_parameters(&config);
    if !cli.yes && !confirm("\nStart scraping? (y/n): ") {
        println!("Exiting.");
        return ExitCode::SUCCESS;
    }

    // 3️⃣ Sink is fixed before anything is fetched
    let sink = Sink::from_config(&config);
    let base_url = match config.search_url() {
        Ok(url) => url,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    // 4️⃣ Browser session
    let session = match WebDriverSession::start(&config.webdriver_url, config.headless) {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("webdriver not initialized, scraping stopped: {e}");
            eprintln!("Failed to initialize WebDriver: {e}");
            return ExitCode::FAILURE;
        }
    };

    // 5️⃣ Crawl
    let settings = CrawlSettings {
        base_url,
        pages: config.pages,
        max_ads: config.max_ads,
        request_delay: config.request_delay(),
    };
    let outcome = Crawler::new(session, settings).run();

    if outcome.state == CrawlState::Aborted {
        eprintln!(
            "An error occurred during scraping: {}",
            outcome.abort_reason.as_deref().unwrap_or("unknown error")
        );
    }
    for line in outcome_summary(&outcome) {
        println!("{line}");
    }

    // 6️⃣ Save whatever we have, even after an abort
    match sink.append(&outcome.listings) {
        Ok(report) => match config.save_format {
            SaveFormat::Sqlite if report.rows_written == 0 => {
                println!("No new ads found.");
            }
            SaveFormat::Sqlite => {
                println!(
                    "Added {} new ads to the database ({} collected).",
                    report.rows_written, report.batch_size
                );
            }
            _ => println!("Data saved to {}", report.destination),
        },
        Err(e) => {
            tracing::error!(destination = %sink.destination(), "failed to save data: {e}");
            eprintln!("Failed to save data to {}: {e}", sink.destination());
            return ExitCode::FAILURE;
        }
    }

    println!("Scraping finished.");
    ExitCode::SUCCESS
}

fn print_parameters(config: &Config) {
    println!("\n=== Run parameters ===");
    println!("Search URL: {}", config.base_url);
    println!("Pages: {}", config.pages);
    println!("Maximum ads: {}", config.max_ads);
    println!("Save format: {}", config.save_format);
    match config.save_format {
        SaveFormat::Excel | SaveFormat::Csv => {
            println!("Output file: {}", config.output_file.as_deref().unwrap_or_default());
        }
        SaveFormat::Sqlite => println!("Database file: {}", config.db_name),
    }
}

fn outcome_summary(outcome: &CrawlOutcome) -> Vec<String> {
    let mut lines = Vec::new();
    if outcome.cap_reached {
        lines.push("Maximum number of ads reached.".to_string());
    }
    lines.push(format!(
        "Collected {} ads ({} skipped) from {} page(s).",
        outcome.listings.len(),
        outcome.skipped,
        outcome.pages_visited
    ));
    lines
}

fn confirm(prompt: &str) -> bool {
    print!("{prompt}");
    let _ = io::stdout().flush();

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    answer_is_yes(&answer)
}

fn answer_is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

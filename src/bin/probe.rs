//! Run the fact checking pipeline for one claim, stage by stage
//!
//! Prints what each stage produced so search, scraping or summarization
//! problems can be pinned down without the web server.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use truthlens::config::{LogFormat, LoggingConfig};
use truthlens::search::prepare_query;
use truthlens::{telemetry, Config, FactChecker};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum Stage {
    Search,
    Scrape,
    Summarize,
    Similarity,
    Verdict,
}

#[derive(Parser)]
#[command(name = "truthlens-probe")]
#[command(about = "Trace a claim through search, scrape, summarize, similarity and verdict")]
struct Cli {
    /// Claim to check
    claim: String,

    /// Stop after this stage
    #[arg(long, value_enum, default_value = "verdict")]
    stage: Stage,

    /// Config file (defaults to TRUTHLENS_CONFIG or truthlens.toml)
    #[arg(long, env = "TRUTHLENS_CONFIG")]
    config: Option<String>,

    /// Print each stage as JSON
    #[arg(long)]
    json: bool,

    /// Log level for pipeline internals
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();

    let config = match &cli.config {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    telemetry::init_tracing(&LoggingConfig {
        level: cli.log_level.clone(),
        format: LogFormat::Pretty,
    });

    // The probe always runs every stage fresh
    let mut config = config;
    config.cache.enabled = false;
    let checker = FactChecker::from_config(&config).context("Failed to build fact checker")?;

    let claim = checker.validate_claim(&cli.claim)?;
    let query = prepare_query(&claim);

    let outcome = checker.search(&query).await;
    print_stage(&cli, "search", &outcome, || {
        let mut lines: Vec<String> = outcome
            .attempts
            .iter()
            .map(|a| match &a.error {
                Some(e) => format!("  [{}] {:?} -> error: {}", a.strategy, a.query, e),
                None => format!("  [{}] {:?} -> {} urls", a.strategy, a.query, a.hits),
            })
            .collect();
        lines.extend(outcome.urls.iter().map(|u| format!("  {}", u)));
        lines
    })?;
    if cli.stage == Stage::Search {
        return Ok(());
    }

    let articles = checker.scrape(&outcome.urls).await;
    print_stage(&cli, "scrape", &articles, || {
        articles
            .iter()
            .map(|a| {
                format!(
                    "  {} ({} chars){}",
                    a.url,
                    a.text.chars().count(),
                    a.image_url.as_ref().map(|i| format!(" image: {}", i)).unwrap_or_default()
                )
            })
            .collect()
    })?;
    if cli.stage == Stage::Scrape {
        return Ok(());
    }

    let summaries = checker.summarize(&articles).await;
    print_stage(&cli, "summarize", &summaries, || {
        summaries
            .iter()
            .zip(&articles)
            .map(|(s, a)| format!("  {} [{}]\n    {}", a.url, s.method.as_str(), s.text))
            .collect()
    })?;
    if cli.stage == Stage::Summarize {
        return Ok(());
    }

    let texts: Vec<String> = summaries.iter().map(|s| s.text.clone()).collect();
    let scores = checker.similarity(&claim, &texts).await;
    print_stage(&cli, "similarity", &scores, || {
        scores
            .iter()
            .zip(&articles)
            .map(|(score, a)| format!("  {:.3}  {}", score, a.url))
            .collect()
    })?;
    if cli.stage == Stage::Similarity {
        return Ok(());
    }

    let report = checker
        .assess(&claim, &outcome, &articles, &summaries, &scores)
        .await;
    print_stage(&cli, "verdict", &report, || {
        let mut lines = vec![
            format!("  {}", report.verdict_label),
            format!(
                "  confidence {} (avg {:.3}, max {:.3}, {} sources)",
                report.confidence, report.stats.average, report.stats.max, report.stats.count
            ),
        ];
        if report.sources.is_empty() {
            lines.extend(report.source_urls.iter().map(|u| format!("  unanalyzed: {}", u)));
        }
        lines
    })?;

    Ok(())
}

fn print_stage<T, F>(cli: &Cli, name: &str, value: &T, lines: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce() -> Vec<String>,
{
    if cli.json {
        let json = serde_json::to_string_pretty(value)?;
        println!("{{\"stage\": {:?}, \"output\": {}}}", name, json);
    } else {
        println!("== {} ==", name);
        for line in lines() {
            println!("{}", line);
        }
    }
    Ok(())
}

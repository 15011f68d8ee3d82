// src/main.rs
// =============================================================================
// This is the entry point of the code-health CLI.
//
// What happens here:
// 1. Set up logging (stderr, so JSON on stdout stays clean)
// 2. Parse command-line arguments using clap
// 3. Build the Analyzer once (rule catalog + HTTP client)
// 4. Dispatch to the subcommand and print the result
// 5. Exit with proper code (0 = clean, 1 = findings, 2 = error)
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, ProbeArgs};
use code_health::analyzer::{Rating, Severity};
use code_health::{service, AnalysisRequest, Analyzer, EngineConfig, Outcome, Report, VerifyReport};
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const EXIT_CLEAN: i32 = 0;
const EXIT_FINDINGS: i32 = 1;
const EXIT_ERROR: i32 = 2;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Analyze { path, filename, language, verify_links, json, probe } => {
            let code = read_source(path.as_deref())?;
            let filename = filename.or_else(|| file_name_hint(path.as_deref()));

            let mut request = AnalysisRequest::new(code).verify_links(verify_links);
            request.filename = filename;
            request.language = language;

            let analyzer = build_analyzer(&probe)?;
            let outcome = service::analyze(analyzer, request).await;
            handle_analysis(outcome, json)
        }
        Commands::Verify { urls, json, probe } => {
            let analyzer = build_analyzer(&probe)?;
            let outcome = service::verify(analyzer, urls).await;
            handle_verification(outcome, json)
        }
    }
}

fn build_analyzer(probe: &ProbeArgs) -> Result<Arc<Analyzer>> {
    let config = EngineConfig::default()
        .with_batch_size(probe.batch_size)
        .with_probe_timeout(Duration::from_secs(probe.timeout_secs));
    let analyzer = Analyzer::new(config).context("failed to initialise the analysis engine")?;
    Ok(Arc::new(analyzer))
}

// Reads PATH, or stdin when PATH is missing or "-"
fn read_source(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("could not read {}", path.display())),
        _ => {
            let mut code = String::new();
            std::io::stdin()
                .read_to_string(&mut code)
                .context("could not read stdin")?;
            Ok(code)
        }
    }
}

fn file_name_hint(path: Option<&Path>) -> Option<String> {
    path.filter(|p| *p != Path::new("-"))
        .and_then(|p| p.file_name())
        .map(|name| name.to_string_lossy().into_owned())
}

fn handle_analysis(outcome: Outcome<Report>, json: bool) -> Result<i32> {
    if json {
        print_json(&outcome)?;
    }
    match outcome {
        Outcome::Ok(report) => {
            if !json {
                print_report(&report);
            }
            let has_findings = report.summary.errors > 0 || report.summary.broken_links > 0;
            Ok(if has_findings { EXIT_FINDINGS } else { EXIT_CLEAN })
        }
        Outcome::ClientError { message } | Outcome::ServerError { message } => {
            if !json {
                eprintln!("Error: {}", message);
            }
            Ok(EXIT_ERROR)
        }
    }
}

fn handle_verification(outcome: Outcome<VerifyReport>, json: bool) -> Result<i32> {
    if json {
        print_json(&outcome)?;
    }
    match outcome {
        Outcome::Ok(report) => {
            if !json {
                print_links(&report.results);
                println!("📊 Summary:");
                println!("   ✅ Working: {}", report.summary.working);
                println!("   ❌ Broken: {}", report.summary.broken);
                println!("   📋 Total: {}", report.summary.total);
            }
            Ok(if report.summary.broken > 0 { EXIT_FINDINGS } else { EXIT_CLEAN })
        }
        Outcome::ClientError { message } | Outcome::ServerError { message } => {
            if !json {
                eprintln!("Error: {}", message);
            }
            Ok(EXIT_ERROR)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json_output = serde_json::to_string_pretty(value)?;
    println!("{}", json_output);
    Ok(())
}

// Prints a report as human-readable tables
fn print_report(report: &Report) {
    let summary = &report.summary;
    println!("🔍 Language: {}", report.language);
    println!(
        "{} Score: {} / 100 ({})",
        rating_icon(summary.rating),
        summary.score,
        summary.rating.as_str()
    );
    println!();

    if report.issues.is_empty() {
        println!("✅ No issues found");
    } else {
        println!("{:<10} {:<10} {:<24} {}", "LOCATION", "SEVERITY", "RULE", "MESSAGE");
        println!("{}", "=".repeat(90));
        for issue in &report.issues {
            let location = format!("{}:{}", issue.line, issue.column);
            println!(
                "{:<10} {:<10} {:<24} {}",
                location,
                severity_label(issue.severity),
                issue.rule_id,
                issue.message
            );
        }
    }
    println!();

    let m = &report.metrics;
    println!("📏 Metrics:");
    println!("   Lines: {}  Characters: {}  Words: {}", m.line_count, m.character_count, m.word_count);
    println!("   Functions (approx.): {}  Comments: {}", m.function_count, m.comment_count);
    println!();

    if !report.links.is_empty() {
        print_links(&report.links);
    }

    println!("📊 Summary:");
    println!("   ❌ Errors: {}", summary.errors);
    println!("   ⚠️  Warnings: {}", summary.warnings);
    println!("   ℹ️  Info: {}", summary.info);
    if summary.total_links > 0 {
        println!("   🔗 Broken links: {} of {}", summary.broken_links, summary.total_links);
    }
}

fn print_links(links: &[code_health::LinkResult]) {
    println!("{:<60} {:<10} {:<20}", "URL", "STATUS", "DETAIL");
    println!("{}", "=".repeat(90));
    for link in links {
        // Truncate URL if too long for display
        let url_display = if link.url.chars().count() > 57 {
            format!("{}...", link.url.chars().take(57).collect::<String>())
        } else {
            link.url.clone()
        };
        let status = if link.ok { "✅ OK" } else { "❌ BROKEN" };
        let detail = match (link.status, link.error.as_deref()) {
            (Some(code), _) => format!("HTTP {}", code),
            (None, Some(reason)) => reason.to_string(),
            (None, None) => String::new(),
        };
        println!("{:<60} {:<10} {:<20}", url_display, status, detail);
    }
    println!();
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "❌ error",
        Severity::Warning => "⚠️  warn",
        Severity::Info => "ℹ️  info",
    }
}

fn rating_icon(rating: Rating) -> &'static str {
    match rating {
        Rating::Excellent => "🟢",
        Rating::Good => "🟡",
        Rating::NeedsImprovement => "🟠",
        Rating::Poor => "🔴",
    }
}

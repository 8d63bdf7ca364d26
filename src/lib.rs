pub mod audit;
pub mod cli;
pub mod config;
pub mod extractor;
pub mod fetcher;
pub mod html_scan;
pub mod http_client;
pub mod keywords;
pub mod models;
pub mod rate_limiter;
pub mod readability;
pub mod reporter;
pub mod seo_analyzer;
pub mod server;

use anyhow::{Context, Result};
use audit::{AuditConfig, SiteAuditor};
use cli::{Cli, Command, PageSource};
use colored::*;
use config::Config;
use extractor::SignalExtractor;
use fetcher::PageFetcher;
use rate_limiter::RateLimitOptions;
use reporter::Reporter;
use server::AppState;
use std::path::Path;

/// Loads the config file named on the command line, or the first one found on the
/// default search paths, and lets explicit CLI values override it.
pub fn resolve_args(args: Cli) -> Result<Cli> {
    let config = match &args.config {
        Some(path) => Some(Config::from_file(Path::new(path))?),
        None => Config::from_default_paths()?,
    };

    Ok(match config {
        Some(config) => config.merge_with_cli(&args),
        None => args,
    })
}

/// Returns the page URL and its HTML, read from disk or fetched from the site.
async fn load_page(fetcher: &PageFetcher, source: &PageSource) -> Result<(String, String)> {
    if let Some(file) = &source.file {
        let html = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read HTML file: {}", file))?;
        return Ok((file.clone(), html));
    }

    let target = source
        .target
        .as_deref()
        .context("Provide a page URL or --file")?;
    let page = fetcher.fetch(target).await?;
    Ok((page.url.to_string(), page.html))
}

fn is_json(output: &str) -> bool {
    output.eq_ignore_ascii_case("json")
}

pub async fn run(args: Cli) -> Result<()> {
    execute(resolve_args(args)?).await
}

/// Runs a command whose arguments have already been merged with the config file.
pub async fn execute(args: Cli) -> Result<()> {
    // Validate origin
    if !args.site_origin.starts_with("http://") && !args.site_origin.starts_with("https://") {
        anyhow::bail!("Site origin must start with http:// or https://");
    }

    let fetcher = PageFetcher::new(&args.site_origin, args.timeout)?;
    let extractor = SignalExtractor::with_max_keywords(args.max_keywords);
    let json_output = is_json(&args.output);

    match &args.command {
        Command::Analyze(source) => {
            let (url, html) = load_page(&fetcher, source).await?;
            let analysis = extractor.extract(&url, &html);

            if json_output {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                Reporter::print_analysis(&analysis);
            }
            if let Some(filename) = &args.save {
                Reporter::save_json_report(&analysis, filename)?;
            }
        }
        Command::Readability(source) => {
            let (url, html) = load_page(&fetcher, source).await?;
            let report = readability::analyze(&html_scan::visible_text(&html));

            if json_output {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                Reporter::print_readability(&url, &report);
            }
            if let Some(filename) = &args.save {
                Reporter::save_json_report(&report, filename)?;
            }
        }
        Command::Audit {
            targets,
            concurrency,
            rate_limit,
        } => {
            let mut auditor = SiteAuditor::new(
                fetcher,
                extractor,
                AuditConfig {
                    concurrency: *concurrency,
                    requests_per_second: *rate_limit,
                },
            );

            if !json_output {
                println!(
                    "{} {} page(s) on {}",
                    "Auditing".bright_yellow().bold(),
                    targets.len(),
                    args.site_origin
                );
                auditor.enable_progress_bar(targets.len());
            }

            let audit = auditor.run(targets).await;

            if json_output {
                println!("{}", serde_json::to_string_pretty(&audit)?);
            } else {
                Reporter::print_audit(&audit);
            }
            if let Some(filename) = &args.save {
                Reporter::save_json_report(&audit, filename)?;
            }
        }
        Command::Serve {
            bind,
            port,
            limit,
            window_ms,
            trust_proxy,
        } => {
            if *window_ms == 0 {
                anyhow::bail!("--window-ms must be greater than zero");
            }

            let state = AppState::new(
                fetcher,
                extractor,
                RateLimitOptions {
                    limit: *limit,
                    window_ms: *window_ms,
                },
            )
            .with_trust_proxy(*trust_proxy);

            println!(
                "{} http://{}:{}/api",
                "Listening on".bright_green().bold(),
                bind,
                port
            );
            server::serve(state, bind, *port).await?;
        }
    }

    Ok(())
}

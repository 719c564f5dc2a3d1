//! Codex CLI - study progress, streaks and share links.

mod config;

use std::path::PathBuf;
use std::sync::Arc;
use anyhow::{anyhow, Context, Result};
use chrono::{Local, TimeZone};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use codex_core::{ActivityType, CompletionKey, DomainId, DomainProgress, SharePayload};
use codex_storage::JsonFileStore;
use codex_progress::{DomainCatalog, ProgressEngine, ShareCodec, ShareContext, StaticCatalog};
use crate::config::CodexConfig;

const BUNDLED_CATALOG: &str = include_str!("../catalog.json");

#[derive(Parser)]
#[command(name = "codex")]
#[command(about = "Study progress, streaks and share links", long_about = None)]
struct Cli {
    /// Config file (default: ~/.codex/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Catalog file, overriding the configured one
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog domains
    Domains,
    /// Check a point
    Check {
        domain: DomainId,
        subdomain: usize,
        point: usize,
    },
    /// Uncheck a point
    Uncheck {
        domain: DomainId,
        subdomain: usize,
        point: usize,
    },
    /// Show completion per domain
    Progress {
        /// View a shared link or code instead of local progress
        #[arg(long)]
        share: Option<String>,
    },
    /// Show the mastery summary
    Mastery {
        /// View a shared link or code instead of local progress
        #[arg(long)]
        share: Option<String>,
    },
    /// Show streak statistics
    Streak,
    /// Record an activity
    Log {
        /// Activity type (quiz, note, resource, project, other, ...)
        kind: ActivityType,
        message: String,
        /// Domain the activity relates to (repeatable)
        #[arg(long = "domain")]
        domains: Vec<DomainId>,
    },
    /// Show recent activity
    Activity {
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Print a share link for local progress
    Share,
    /// Copy a shared snapshot into local progress
    Import {
        /// Share link or bare code
        source: String,
    },
    /// Clear every point of a domain
    Reset { domain: DomainId },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "codex=debug" } else { "codex=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = CodexConfig::load(cli.config.as_deref())?;
    let catalog = load_catalog(cli.catalog.or_else(|| config.catalog.path.clone()))?;

    let store_path = config.store_path()?;
    let store = JsonFileStore::open(&store_path)
        .with_context(|| format!("Failed to open store {}", store_path.display()))?;
    debug!(path = %store_path.display(), "store ready");

    let engine = ProgressEngine::new(Arc::new(store), Arc::new(catalog))
        .with_config(config.engine_config());

    match cli.command {
        Commands::Domains => {
            for domain in engine.catalog().domains() {
                let marker = if domain.active { "" } else { " (inactive)" };
                println!("{} | {}{}", domain.id, domain.name, marker);
                for (s, sub) in domain.subdomains.iter().enumerate() {
                    println!("  [{}] {}", s, sub.title);
                    for (p, point) in sub.points.iter().enumerate() {
                        let key = CompletionKey::new(domain.id, s, p);
                        let mark = if engine.is_checked(&key) { "x" } else { " " };
                        println!("    [{}] {} {}", mark, p, point.text);
                    }
                }
            }
        }
        Commands::Check { domain, subdomain, point } => {
            let key = CompletionKey::new(domain, subdomain, point);
            if engine.set_point(&key, true)? {
                println!("Checked {}", key);
            } else {
                println!("{} already checked", key);
            }
        }
        Commands::Uncheck { domain, subdomain, point } => {
            let key = CompletionKey::new(domain, subdomain, point);
            if engine.set_point(&key, false)? {
                println!("Unchecked {}", key);
            } else {
                println!("{} was not checked", key);
            }
        }
        Commands::Progress { share } => {
            let engine = with_shared_view(engine, share.as_deref())?;
            for progress in engine.all_domain_progress() {
                let name = engine
                    .catalog()
                    .domain(progress.domain_id)
                    .map(|d| d.name.as_str())
                    .unwrap_or_default();
                print_progress(name, &progress);
            }
        }
        Commands::Mastery { share } => {
            let engine = with_shared_view(engine, share.as_deref())?;
            let data = engine.mastery_data();

            println!("Mastery");
            println!("  Subjects: {}/{}", data.checked_subjects, data.total_subjects);
            println!("  Average completion: {:.1}%", data.avg_completion);
            println!("  Hours logged: {:.1}", data.total_hours_logged);
            println!(
                "  Quizzes: {}  Notes: {}  Resources: {}  Projects: {}",
                data.quiz_count, data.note_count, data.resource_count, data.project_count
            );
            println!("  Current streak: {} days", data.current_streak);
            if let Some(at) = data.last_activity_at {
                println!("  Last activity: {}", format_timestamp(at));
            }
            for (id, score) in &data.domain_activity_score {
                println!("  Domain {} activity: {}", id, score);
            }
        }
        Commands::Streak => {
            let stats = engine.streak_stats();
            println!("Current streak: {} days", stats.current_streak);
            println!("Best streak: {} days", stats.best_streak);
            println!("Active days: {}", stats.active_days);
        }
        Commands::Log { kind, message, domains } => {
            let entry = engine.record_activity(kind, domains, message, None)?;
            println!("Logged {} at {}", entry.kind, format_timestamp(entry.timestamp));
        }
        Commands::Activity { limit } => {
            let entries = engine.activity_log().recent(limit);
            println!("Activity ({})", entries.len());
            for entry in entries {
                let domains: Vec<String> = entry.domain_ids.iter().map(|d| d.to_string()).collect();
                println!(
                    "  {} | {} | [{}] {}",
                    format_timestamp(entry.timestamp),
                    entry.kind,
                    domains.join(","),
                    entry.message,
                );
            }
        }
        Commands::Share => {
            println!("{}", engine.share_url());
        }
        Commands::Import { source } => {
            let payload = parse_share(&source)?;
            let imported = engine.import_snapshot(&payload)?;
            info!("Imported {} points", imported);
            println!("Imported {} points", imported);
        }
        Commands::Reset { domain } => {
            let cleared = engine.reset_domain(domain)?;
            println!("Cleared {} points", cleared);
        }
    }

    Ok(())
}

fn load_catalog(path: Option<PathBuf>) -> Result<StaticCatalog> {
    match path {
        Some(path) => StaticCatalog::load(&path)
            .with_context(|| format!("Failed to load catalog {}", path.display())),
        None => StaticCatalog::from_json_str(BUNDLED_CATALOG).context("Bundled catalog is invalid"),
    }
}

fn with_shared_view(engine: ProgressEngine, share: Option<&str>) -> Result<ProgressEngine> {
    let Some(source) = share else {
        return Ok(engine);
    };
    let payload = parse_share(source)?;
    if payload.created_at > 0 {
        println!("Viewing shared progress from {}", format_timestamp(payload.created_at));
    }
    Ok(engine.with_context(ShareContext::shared(payload)))
}

/// Accept either a full share link or the bare encoded payload.
fn parse_share(source: &str) -> Result<SharePayload> {
    let source = source.trim();
    let payload = if source.contains('?') || source.contains("share=") {
        ShareContext::from_url(source).payload().cloned()
    } else {
        ShareCodec::decode(source)
    };
    payload.ok_or_else(|| anyhow!("Invalid share link"))
}

fn print_progress(name: &str, progress: &DomainProgress) {
    println!(
        "  {:>3} | {:<28} | {:>3}/{:<3} | {:>5.1}%",
        progress.domain_id, name, progress.checked, progress.total, progress.completion,
    );
}

fn format_timestamp(millis: i64) -> String {
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| millis.to_string())
}

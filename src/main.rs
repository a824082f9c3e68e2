use anyhow::Result;
use chrono::Local;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use curator::oracle::{EndpointStatus, OllamaEndpoint, OllamaOracle, RelevanceAdapter};
use curator::pool::PoolBuild;
use curator::rss::HttpFeedFetcher;
use curator::{
    logging, Article, CurationEngine, CurationError, CurationMode, CurationResult, CuratorConfig, Persona,
    PoolBuilder,
};

#[derive(Parser, Debug)]
#[clap(name = "curator", about = "Curate AI news feeds for a reader persona")]
struct Cli {
    /// Persona to curate for (see --list-personas)
    #[clap(short, long, default_value = "Developers and Programmers")]
    persona: String,

    /// Number of articles to show
    #[clap(short, long, default_value = "5")]
    count: usize,

    /// Classify each article, or let the model rank the whole pool
    #[clap(short, long, value_enum, default_value = "select")]
    mode: ModeArg,

    /// Print the curation result as JSON
    #[clap(long)]
    json: bool,

    /// Always fetch fresh feeds
    #[clap(long)]
    no_cache: bool,

    /// Print the uncurated pool instead of curating it
    #[clap(long)]
    browse: bool,

    /// Only browse these sources (repeatable)
    #[clap(long = "source", requires = "browse")]
    sources: Vec<String>,

    /// List the available personas and exit
    #[clap(long)]
    list_personas: bool,

    /// Report the models available at each Ollama endpoint and exit
    #[clap(long)]
    check_endpoints: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Filter,
    Select,
}

impl From<ModeArg> for CurationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Filter => CurationMode::Filter,
            ModeArg::Select => CurationMode::Select,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::configure_logging()?;
    let config = CuratorConfig::from_env()?;

    if cli.list_personas {
        print_personas(&Persona::catalog());
        return Ok(());
    }

    let oracle = Arc::new(OllamaOracle::new(&config.oracle)?);

    if cli.check_endpoints {
        print_endpoint_report(&config.oracle.model, &oracle.check_endpoints().await);
        return Ok(());
    }

    let engine = CurationEngine::new(RelevanceAdapter::new(oracle, config.adapter.clone()));
    if !cli.browse {
        // Reject bad arguments before touching the network.
        if cli.count == 0 {
            return Err(CurationError::InvalidCount.into());
        }
        engine.resolve_persona(&cli.persona)?;
    }

    let cache_ttl = if cli.no_cache {
        Duration::ZERO
    } else {
        config.cache_ttl
    };
    let builder = PoolBuilder::new(Arc::new(HttpFeedFetcher::new()?)).with_cache_ttl(cache_ttl);
    let build = builder.build_pool_with_report(&config.sources).await;

    if cli.browse {
        print_pool(&build, &cli.sources);
        return Ok(());
    }

    let mode = CurationMode::from(cli.mode);
    let show_progress = !cli.json && mode == CurationMode::Filter;

    let result = engine
        .curate_with_progress(&build.articles, &cli.persona, cli.count, mode, |done, total| {
            if show_progress {
                eprint!("\rAnalyzing article {}/{}", done, total);
                let _ = io::stderr().flush();
            }
        })
        .await?;
    if show_progress && !build.articles.is_empty() {
        eprintln!();
    }

    info!("Curation finished with {} items", result.items.len());

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result, &build);
    }

    Ok(())
}

fn print_personas(personas: &[Persona]) {
    println!("{}", "Personas".bright_blue());
    println!("{}", "─".repeat(80).dimmed());
    for persona in personas {
        println!("{}", persona.name.bright_yellow());
        println!("  {}", persona.description);
        println!("  {}", persona.keywords.join(", ").dimmed());
    }
}

fn print_endpoint_report(model: &str, report: &[(OllamaEndpoint, EndpointStatus)]) {
    println!("\n{}", "OLLAMA ENDPOINTS".bright_blue());
    println!("{}", "─".repeat(80).dimmed());

    let mut up_count = 0;
    for (endpoint, status) in report {
        match status {
            EndpointStatus::Up(models) => {
                up_count += 1;
                println!("{} {}", endpoint.to_string().bright_white(), "UP".bright_green());
                if models.iter().any(|m| m == model || m.starts_with(&format!("{}:", model))) {
                    println!("  AVAILABLE: {}", model.bright_green());
                } else {
                    println!("  MISSING: {}", model.bright_red());
                }
                for other in models {
                    println!("    - {}", other.dimmed());
                }
            }
            EndpointStatus::Down(error) => {
                println!("{} {}", endpoint.to_string().bright_white(), "DOWN".bright_red());
                println!("  Error: {}", error);
            }
        }
    }

    println!("\nSummary: {}/{} endpoints UP", up_count, report.len());
}

fn print_failures(build: &PoolBuild) {
    for failure in &build.failures {
        println!(
            "{} {}: {}",
            "Skipped".bright_yellow(),
            failure.source,
            failure.error.dimmed()
        );
    }
}

fn print_pool(build: &PoolBuild, only: &[String]) {
    let articles: Vec<&Article> = build
        .articles
        .iter()
        .filter(|a| only.is_empty() || only.iter().any(|s| s.eq_ignore_ascii_case(&a.source)))
        .collect();

    println!("{}", "═".repeat(80).bright_blue());
    println!(
        "{}  {} articles{}",
        "ARTICLE POOL".bright_blue(),
        articles.len(),
        if build.from_cache { " (cached)" } else { "" }
    );
    println!("{}", "═".repeat(80).bright_blue());
    print_failures(build);

    for article in articles {
        println!("\n{}", article.title.bold());
        let domain = article.domain.map(|d| d.to_string()).unwrap_or_default();
        println!(
            "{} | {} | {}",
            article.source.bright_magenta(),
            article.published.dimmed(),
            domain.dimmed()
        );
        if !article.summary.is_empty() {
            println!("{}", article.summary);
        }
        println!("{}", article.link.bright_cyan());
    }
}

fn print_result(result: &CurationResult, build: &PoolBuild) {
    println!("{}", "═".repeat(80).bright_blue());
    println!(
        "{}  {}",
        "CURATED FOR".bright_blue(),
        result.persona.bright_yellow()
    );
    println!(
        "{}: {} | {}: {}",
        "Mode".bright_blue(),
        result.mode,
        "Updated".bright_blue(),
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    println!("{}", "═".repeat(80).bright_blue());
    print_failures(build);

    if result.degraded {
        println!(
            "{}",
            "The language model was unavailable; results are not personalized.".bright_red()
        );
    }

    if result.items.is_empty() {
        println!("\nNo relevant articles found.");
        return;
    }

    if result.mode == CurationMode::Filter && result.total_relevant > result.items.len() {
        println!(
            "Showing {} of {} relevant articles",
            result.items.len(),
            result.total_relevant
        );
    }

    for (i, item) in result.items.iter().enumerate() {
        println!("\n{}. {}", i + 1, item.title.bold());
        let mut meta = vec![item.source.bright_magenta().to_string()];
        if let Some(published) = &item.published {
            meta.push(published.dimmed().to_string());
        }
        if let Some(domain) = item.domain {
            meta.push(domain.to_string().dimmed().to_string());
        }
        println!("{}", meta.join(" | "));
        if let Some(relevance) = &item.relevance {
            println!("{} {}", "Why:".bright_green(), relevance);
        }
        if let Some(summary) = &item.summary {
            println!("{}", summary);
        }
        println!("{}", item.link.bright_cyan());
    }
}

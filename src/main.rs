use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use catalog_crawler::application::{CrawlService, load_companies};
use catalog_crawler::infrastructure::{AppConfig, HttpClient, PlatformDetector, init_logging_with_config};

#[derive(Parser, Debug)]
#[command(name = "catalog-crawler", version, about = "Crawl competitor storefront catalogs into a SQLite table")]
struct Cli {
    /// Config file (TOML or JSON); defaults to ./catalog-crawler.toml when present
    #[arg(short, long, env = "CATALOG_CRAWLER_CONFIG")]
    config: Option<PathBuf>,

    /// JSON array of companies to crawl
    #[arg(long, default_value = "companies.json")]
    companies: PathBuf,

    /// SQLite database file, overrides the configured path
    #[arg(long)]
    database: Option<PathBuf>,

    /// Concurrent company crawls, overrides the configured value
    #[arg(long)]
    concurrency: Option<usize>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,

    /// Only detect and print each company's platform, without crawling
    #[arg(long)]
    detect_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(database) = cli.database {
        config.database.path = database;
    }
    if let Some(concurrency) = cli.concurrency {
        config.crawl.max_concurrency = concurrency;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.validate().context("Invalid configuration")?;

    init_logging_with_config(&config.logging)?;
    info!("Catalog crawler v{}", env!("CARGO_PKG_VERSION"));

    let companies = load_companies(&cli.companies)?;

    if cli.detect_only {
        let detector = PlatformDetector::new(HttpClient::with_config(config.crawl.http_client_config())?);
        for company in &companies {
            let tag = detector.detect_tag(&company.start_url).await;
            println!("{}\t{}\t{tag}", company.name, company.start_url);
        }
        return Ok(());
    }

    let service = CrawlService::from_config(&config)
        .await
        .context("Failed to prepare crawl")?;
    let summary = service.run(&companies).await?;

    print!("{summary}");
    info!(total_rows = service.store().count().await?, "Catalog updated");

    Ok(())
}

use clap::Parser;
use rank_collector::core::PageFetcher;
use rank_collector::domain::ports::{RecordSink, TargetSource};
use rank_collector::utils::error::ErrorSeverity;
use rank_collector::utils::{logger, validation::Validate};
use rank_collector::{
    CliConfig, CollectorConfig, CollectorError, HttpFetcher, ListingExtractor, LocalStore,
    RankCollector, SupabaseStore,
};
use rank_collector::config::StorageKind;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 內的 SUPABASE_URL / SUPABASE_SECRET_KEY
    dotenvy::dotenv().ok();

    let args = CliConfig::parse();

    let mut config = if Path::new(&args.config).exists() {
        match CollectorConfig::from_file(&args.config) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
                eprintln!("💡 Make sure the file exists and is valid TOML format");
                std::process::exit(1);
            }
        }
    } else {
        CollectorConfig::default()
    };

    if !args.device.is_empty() {
        config.devices = args.device.clone();
    }

    let log_file = match config.log_dir() {
        Some(dir) => match logger::daily_log_file(dir) {
            Ok(file) => Some(file),
            Err(e) => {
                eprintln!("⚠️ Log file disabled: {}", e);
                None
            }
        },
        None => None,
    };
    logger::init_cli_logger(args.verbose, config.logging.json, log_file);

    tracing::info!("Starting rank-collector");
    tracing::debug!("Collector config: {:?}", config.search);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let result = match config.storage.r#type {
        StorageKind::Supabase => {
            let store = SupabaseStore::new(&config.supabase_settings()?);
            execute(&config, &args, store.clone(), store).await
        }
        StorageKind::Local => {
            let local = config.local_settings()?;
            let store = LocalStore::new(&local.targets_file, &local.output_dir);
            execute(&config, &args, store.clone(), store).await
        }
    };

    if let Err(e) = result {
        tracing::error!(
            "❌ Rank collection failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn execute<T: TargetSource, S: RecordSink>(
    config: &CollectorConfig,
    args: &CliConfig,
    source: T,
    sink: S,
) -> Result<(), CollectorError> {
    let extractor = ListingExtractor::new(&config.search.marketplace_domain)?;
    let fetcher = HttpFetcher::new(&config.search, &config.user_agents)?;
    let collector = RankCollector::new(fetcher, source, sink, extractor)
        .with_devices(config.devices.clone())
        .with_interval(config.request_interval());

    if args.dry_run {
        return dry_run(&collector, config).await;
    }

    let summary = collector.run().await?;
    println!(
        "✅ {} searches ({} failed), {} rankings, {} shop hit counts in {:.1}s",
        summary.searches,
        summary.errors,
        summary.rankings,
        summary.hit_counts,
        summary.elapsed.as_secs_f64()
    );
    Ok(())
}

async fn dry_run<F: PageFetcher, T: TargetSource, S: RecordSink>(
    collector: &RankCollector<F, T, S>,
    config: &CollectorConfig,
) -> Result<(), CollectorError> {
    tracing::info!("🔍 DRY RUN MODE - No searches will be sent");
    let groups = collector.plan().await?;
    for group in &groups {
        let shops: Vec<String> = group.tracked_shops().into_iter().map(|s| s.shop_code).collect();
        println!(
            "keyword={} products={} shops=[{}] devices={:?}",
            group.keyword,
            group.products.len(),
            shops.join(", "),
            config.devices
        );
    }
    println!(
        "{} keywords × {} devices = {} searches planned",
        groups.len(),
        config.devices.len(),
        groups.len() * config.devices.len()
    );
    Ok(())
}

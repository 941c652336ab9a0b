use clap::Parser;
use kobo_bridge::core::{RunSummary, Submitter};
use kobo_bridge::utils::error::ErrorSeverity;
use kobo_bridge::utils::{logger, validation::Validate};
use kobo_bridge::{
    BridgeError, CliArgs, DryRunSubmitter, KoboSubmitter, LocalStorage, SubmissionConfig,
    SubmissionDriver,
};

fn exit_code_for(e: &BridgeError) -> i32 {
    match e.severity() {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn fail(e: BridgeError) -> ! {
    tracing::error!(
        "❌ Run aborted: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(exit_code_for(&e));
}

async fn run_with<S: Submitter>(
    config: SubmissionConfig,
    submitter: S,
    limit: Option<usize>,
) -> Result<RunSummary, BridgeError> {
    SubmissionDriver::new(config, submitter)
        .with_limit(limit)
        .run_from_source()
        .await
}

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    if args.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("📁 Loading configuration from: {}", args.config);

    // 設定載入失敗直接結束，不可帶著不完整的設定繼續
    let config = match SubmissionConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(BridgeError::IoError(e)) => fail(BridgeError::ConfigParseError {
            field: args.config.clone(),
            message: format!("cannot read config file: {}", e),
        }),
        Err(e) => fail(e),
    };

    if let Err(e) = config.validate() {
        fail(e);
    }

    tracing::info!("✅ Config file loaded.");
    tracing::debug!("Config: {:?}", config);

    let result = if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - submissions are written to {}", args.output_path);
        let storage = LocalStorage::new(args.output_path.clone());
        run_with(config, DryRunSubmitter::new(storage), args.limit).await
    } else {
        let submitter = KoboSubmitter::from_config(&config);
        tracing::info!("🌐 Posting submissions to {}", submitter.endpoint());
        run_with(config, submitter, args.limit).await
    };

    match result {
        Ok(summary) => {
            println!(
                "✅ {} submitted, {} accepted, {} failed",
                summary.total(),
                summary.succeeded(),
                summary.failed()
            );
            if summary.failed() > 0 {
                std::process::exit(2);
            }
        }
        Err(e) => fail(e),
    }
}

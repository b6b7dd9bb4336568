//! Motion Attest - Human movement verification service
//!
//! Classifies pointer-movement samples and issues signed attestations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use motion_attest::app::cli::{Cli, Commands, ConfigAction};
use motion_attest::app::config::Config;
use motion_attest::attestation::{Attestor, SessionRegistry, SigningKey};
use motion_attest::capture::types::MovementSubmission;
use motion_attest::server::{self, AppState};
use motion_attest::time::clock::{Clock, SystemClock};
use motion_attest::MovementClassifier;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments first so we can use --verbose to set log level
    let cli = Cli::parse_args();

    // Initialize tracing (--verbose enables debug-level output)
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);

    // `config init` must work even when the existing file is unreadable
    if let Commands::Config {
        action: ConfigAction::Init { force },
    } = cli.command
    {
        return run_init(force, &config_path);
    }

    // Load config
    let config = if let Some(path) = &cli.config {
        Config::load(path)?
    } else {
        Config::load_default()?
    };

    // Execute command
    match cli.command {
        Commands::Serve { bind } => {
            run_serve(bind, &config)?;
        }
        Commands::Analyze { input, target_hits } => {
            run_analyze(&input, target_hits, &config)?;
        }
        Commands::Config { action } => {
            run_config(action, &config, &config_path)?;
        }
    }

    Ok(())
}

fn run_serve(bind: Option<String>, config: &Config) -> anyhow::Result<()> {
    let bind_addr = bind.unwrap_or_else(|| config.server.bind_addr.clone());

    let key = SigningKey::from_env(&config.server.secret_env).unwrap_or_else(|| {
        warn!(
            "{} is not set; using an ephemeral signing key. Attestations will not survive a restart.",
            config.server.secret_env
        );
        SigningKey::generate()
    });

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let state = Arc::new(AppState::new(
        MovementClassifier::new(config.thresholds.clone()),
        Attestor::new(key),
        SessionRegistry::new(
            config.session.ttl(),
            config.session.session_id_len,
            Arc::clone(&clock),
        ),
        clock,
    ));

    info!(
        thresholds_version = config.thresholds.version,
        min_points = config.thresholds.min_points,
        target_hits_required = config.thresholds.target_hits_required,
        session_ttl_secs = config.session.ttl_secs,
        "Starting verification server"
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server::serve(&bind_addr, state, config.server.permissive_cors))?;
    Ok(())
}

fn run_analyze(input: &Path, target_hits: Option<u32>, config: &Config) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(input)?;
    let submission: MovementSubmission = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Invalid movement file {}: {}", input.display(), e))?;

    let hits = target_hits.unwrap_or(submission.target_hits);
    let classifier = MovementClassifier::new(config.thresholds.clone());
    let result = classifier.analyze(&submission.points, hits);

    info!(
        input = %input.display(),
        points = result.point_count,
        checks_passed = result.checks_passed,
        verified = result.verified,
        ai_detected = result.ai_detected,
        "Analysis complete"
    );
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}

fn run_init(force: bool, config_path: &PathBuf) -> anyhow::Result<()> {
    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {:?}. Use --force to overwrite.",
            config_path
        );
    }

    let config = Config::default();
    config.save(config_path)?;
    println!("Created config at {:?}", config_path);
    println!("\nConfig content:\n{}", config.to_toml()?);

    Ok(())
}

fn run_config(action: ConfigAction, config: &Config, config_path: &Path) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = config.to_toml()?;
            println!("Configuration ({:?}):\n", config_path);
            println!("{}", toml_str);
        }
        ConfigAction::Get { key } => {
            match find_config_value(config, &key)? {
                Some(v) => println!("{} = {}", key, v),
                None => {
                    anyhow::bail!("Configuration key '{}' not found", key);
                }
            }
        }
        ConfigAction::Init { force } => {
            run_init(force, &config_path.to_path_buf())?;
        }
    }

    Ok(())
}

/// Look up a dotted key in the serialized config; every segment but the
/// last names a table (`thresholds.curves.min_ratio` reads `[thresholds.curves]`)
fn find_config_value(config: &Config, key: &str) -> anyhow::Result<Option<String>> {
    let root = toml::Value::try_from(config)?;
    let value = key
        .split('.')
        .try_fold(&root, |value, segment| value.get(segment));
    Ok(value.map(ToString::to_string))
}

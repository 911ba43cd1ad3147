mod config;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use captionloop_adcp::{AttemptLog, FinalPayload};
use captionloop_agent::{
    CaptionBrief, GeneratorType, Provider, ProviderConfig, DEFAULT_MAX_WORDS, DEFAULT_MODEL,
    DEFAULT_OLLAMA_BASE_URL, OPENAI_API_KEY_ENV,
};
use captionloop_core::{LoopRunner, RunSettings, DEFAULT_MAX_ATTEMPTS};
use captionloop_critic::EvaluatorType;
use captionloop_logging::{init_tracing, LogEvent, LogFormat, Logger};

use crate::config::ProjectConfig;

const DEFAULT_GENERATOR_TEMPERATURE: f64 = 0.4;

#[derive(Parser, Debug)]
#[command(
    name = "captionloop",
    about = "Propose/evaluate loop for short marketing captions",
    version,
    author
)]
struct Cli {
    /// Product the caption must mention
    #[arg(short, long)]
    product: String,

    /// Target audience for the caption
    #[arg(short, long)]
    audience: String,

    /// Maximum attempts before giving up (default: 5)
    #[arg(short = 'n', long)]
    max_attempts: Option<usize>,

    /// Caption generator
    #[arg(short, long, value_enum)]
    generator: Option<GeneratorChoice>,

    /// Caption evaluator
    #[arg(short, long, value_enum)]
    evaluator: Option<EvaluatorChoice>,

    /// Model for both roles (overrides captionloop.toml)
    #[arg(short, long)]
    model: Option<String>,

    /// Generator sampling temperature
    #[arg(short, long)]
    temperature: Option<f64>,

    /// Model provider
    #[arg(long, value_enum)]
    provider: Option<ProviderChoice>,

    /// API key for OpenAI (falls back to OPENAI_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Ollama server URL
    #[arg(long)]
    ollama_base_url: Option<String>,

    /// OpenAI-compatible API base URL
    #[arg(long)]
    openai_base_url: Option<String>,

    /// Word ceiling for captions
    #[arg(long)]
    max_words: Option<usize>,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty")]
    log_format: LogFormatChoice,

    /// Tracing filter for diagnostics (RUST_LOG wins when set)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Also append loop events to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Directory holding captionloop.toml (default: current directory)
    #[arg(short = 'd', long)]
    working_dir: Option<PathBuf>,

    /// Dry run: show the resolved settings without calling any model
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GeneratorChoice {
    Template,
    Llm,
}

impl From<GeneratorChoice> for GeneratorType {
    fn from(choice: GeneratorChoice) -> Self {
        match choice {
            GeneratorChoice::Template => GeneratorType::Template,
            GeneratorChoice::Llm => GeneratorType::Llm,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EvaluatorChoice {
    #[value(alias = "heuristic")]
    Rules,
    Llm,
}

impl From<EvaluatorChoice> for EvaluatorType {
    fn from(choice: EvaluatorChoice) -> Self {
        match choice {
            EvaluatorChoice::Rules => EvaluatorType::Rules,
            EvaluatorChoice::Llm => EvaluatorType::Llm,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProviderChoice {
    Ollama,
    Openai,
}

impl From<ProviderChoice> for Provider {
    fn from(choice: ProviderChoice) -> Self {
        match choice {
            ProviderChoice::Ollama => Provider::Ollama,
            ProviderChoice::Openai => Provider::OpenAi,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_format: LogFormat = cli.log_format.into();
    init_tracing(&cli.log_level, log_format);

    // Determine working directory
    let working_dir = match cli.working_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    let project_config = ProjectConfig::load(&working_dir)?.unwrap_or_default();
    let env_api_key = std::env::var(OPENAI_API_KEY_ENV).ok();
    let settings = resolve_settings(&cli, &project_config, env_api_key)?;

    if cli.dry_run {
        render::print_dry_run(&settings, &working_dir);
        return Ok(());
    }

    let capabilities = settings
        .build_capabilities()
        .context("Invalid model configuration")?;

    let logger = match cli.log_file {
        Some(ref path) => Logger::with_file(log_format, path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?,
        None => Logger::new(log_format),
    };
    let logger = Arc::new(logger);

    logger.log(&LogEvent::LoopStarted {
        product: settings.brief.product.clone(),
        audience: settings.brief.audience.clone(),
        generator: capabilities.generator.name().to_string(),
        evaluator: capabilities.evaluator.name().to_string(),
        max_attempts: settings.max_attempts,
    });

    let runner = LoopRunner::new(
        capabilities.generator.as_ref(),
        capabilities.evaluator.as_ref(),
        settings.max_attempts,
        logger,
    );
    let outcome = runner.run().await?;

    render::print_outcome(&outcome);

    let attempt_log = AttemptLog::from_history(outcome.history())
        .to_validated_json()
        .context("Attempt log failed schema validation")?;
    let final_payload = FinalPayload::build(
        &settings.brief.product,
        &settings.brief.audience,
        outcome.candidate(),
        outcome.attributes(),
    )
    .and_then(|payload| payload.to_validated_json())
    .context("Final payload failed schema validation")?;

    render::print_reports(&attempt_log, &final_payload)?;

    // Exit with appropriate code
    std::process::exit(outcome.exit_code());
}

/// Merge CLI flags, captionloop.toml and defaults.
///
/// Priority: CLI flag > role section > top-level key > built-in default.
fn resolve_settings(
    cli: &Cli,
    config: &ProjectConfig,
    env_api_key: Option<String>,
) -> Result<RunSettings> {
    let generator = match (cli.generator, config.generator.mode.as_deref()) {
        (Some(choice), _) => choice.into(),
        (None, Some(mode)) => mode
            .parse::<GeneratorType>()
            .map_err(anyhow::Error::msg)
            .context("Invalid [generator].mode in captionloop.toml")?,
        (None, None) => GeneratorType::Llm,
    };

    let evaluator = match (cli.evaluator, config.evaluator.mode.as_deref()) {
        (Some(choice), _) => choice.into(),
        (None, Some(mode)) => mode
            .parse::<EvaluatorType>()
            .map_err(anyhow::Error::msg)
            .context("Invalid [evaluator].mode in captionloop.toml")?,
        (None, None) => EvaluatorType::Llm,
    };

    let provider = match (cli.provider, config.provider.as_deref()) {
        (Some(choice), _) => choice.into(),
        (None, Some(name)) => name
            .parse::<Provider>()
            .map_err(anyhow::Error::msg)
            .context("Invalid provider in captionloop.toml")?,
        (None, None) => Provider::default(),
    };

    let api_key = cli
        .api_key
        .clone()
        .or(env_api_key)
        .filter(|key| !key.trim().is_empty());
    let ollama_base_url = cli
        .ollama_base_url
        .clone()
        .or_else(|| config.ollama.base_url.clone())
        .unwrap_or_else(|| DEFAULT_OLLAMA_BASE_URL.to_string());
    let openai_base_url = cli
        .openai_base_url
        .clone()
        .or_else(|| config.openai.base_url.clone());

    let provider_for = |model: &str, temperature: f64| {
        let mut provider_config = ProviderConfig::new(provider, model)
            .with_temperature(temperature)
            .with_ollama_base_url(ollama_base_url.clone());
        if let Some(ref url) = openai_base_url {
            provider_config = provider_config.with_openai_base_url(url.clone());
        }
        if let Some(ref key) = api_key {
            provider_config = provider_config.with_api_key(key.clone());
        }
        provider_config
    };

    let generator_model = cli
        .model
        .as_deref()
        .or(config.generator_model())
        .unwrap_or(DEFAULT_MODEL);
    let evaluator_model = cli
        .model
        .as_deref()
        .or(config.evaluator_model())
        .unwrap_or(DEFAULT_MODEL);
    let temperature = cli
        .temperature
        .or(config.generator.temperature)
        .unwrap_or(DEFAULT_GENERATOR_TEMPERATURE);

    Ok(RunSettings {
        brief: CaptionBrief::new(cli.product.clone(), cli.audience.clone()),
        max_attempts: cli
            .max_attempts
            .or(config.max_attempts)
            .unwrap_or(DEFAULT_MAX_ATTEMPTS),
        max_words: cli
            .max_words
            .or(config.max_words)
            .unwrap_or(DEFAULT_MAX_WORDS),
        generator,
        evaluator,
        generator_provider: provider_for(generator_model, temperature),
        // the evaluator factory pins its own temperature
        evaluator_provider: provider_for(evaluator_model, 0.0),
    })
}

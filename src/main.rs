// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info, warn};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use text_to_shots::app_config::{Config, LogLevel, ModelProvider};
use text_to_shots::errors::AppError;
use text_to_shots::file_utils::FileManager;
use text_to_shots::pipeline::{StoryProcessor, references};

/// CLI Wrapper for ModelProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliModelProvider {
    Ollama,
    OpenAI,
    Anthropic,
    LMStudio,
}

impl From<CliModelProvider> for ModelProvider {
    fn from(cli_provider: CliModelProvider) -> Self {
        match cli_provider {
            CliModelProvider::Ollama => ModelProvider::Ollama,
            CliModelProvider::OpenAI => ModelProvider::OpenAI,
            CliModelProvider::Anthropic => ModelProvider::Anthropic,
            CliModelProvider::LMStudio => ModelProvider::LMStudio,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// Options shared by every command that reads the configuration
#[derive(Args, Debug, Clone)]
struct ConfigArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config: String,

    /// Model provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliModelProvider>,

    /// Model name used for scene and shot generation
    #[arg(short, long)]
    model: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Args, Debug)]
struct ProcessArgs {
    /// Story text files to process
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,

    /// Do not load reference documents
    #[arg(long)]
    no_references: bool,

    /// Folder holding reference .txt files
    #[arg(short, long)]
    references_folder: Option<PathBuf>,

    /// Where to write results (default: next to each input)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Fail when scene or shot output breaks the expected format
    #[arg(long)]
    strict: bool,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Turn story files into scene and shot breakdowns
    Process(ProcessArgs),

    /// List available reference documents
    References {
        /// Folder holding reference .txt files
        #[arg(short, long)]
        references_folder: Option<PathBuf>,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Create the reference documents folder
    InitReferences {
        /// Folder to create (default: the configured references folder)
        #[arg(value_name = "DIR")]
        dir: Option<PathBuf>,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Validate the configuration and test the provider connection
    Check {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Generate shell completions for text_to_shots
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// text_to_shots - story to storyboard with AI
///
/// Turns a short story into a scene breakdown and a per-scene shot list
/// with image-generation prompts, using a chat-completion provider.
#[derive(Parser, Debug)]
#[command(name = "text_to_shots")]
#[command(version)]
#[command(about = "AI-powered story to scenes and shots breakdown")]
#[command(long_about = "text_to_shots detects the language of a story, translates it to English when needed, \
segments it into scenes, and decomposes the scenes into shots with image prompts.

EXAMPLES:
    text_to_shots process story.txt                      # Process one story with conf.json
    text_to_shots process a.txt b.txt -o out/            # Process several stories into out/
    text_to_shots process story.txt --no-references      # Ignore reference documents
    text_to_shots process story.txt -p ollama -m llama3.2
    text_to_shots references                             # List reference documents
    text_to_shots init-references refs/                 # Create a reference folder
    text_to_shots check                                  # Test the provider connection
    text_to_shots completions bash > text_to_shots.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file does not exist,
    a default one is created. API keys may also come from OPENAI_API_KEY or
    ANTHROPIC_API_KEY, including from a .env file.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &LogLevel) -> LevelFilter {
    match level {
        LogLevel::Error => LevelFilter::Error,
        LogLevel::Warn => LevelFilter::Warn,
        LogLevel::Info => LevelFilter::Info,
        LogLevel::Debug => LevelFilter::Debug,
        LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install at the most verbose level; the effective level is set from config
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let _ = dotenvy::dotenv();

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Process(args) => run_process(args).await,
        Commands::References { references_folder, config } => {
            let config = load_config(&config)?;
            let folder = references_folder.unwrap_or_else(|| PathBuf::from(&config.pipeline.references_folder));
            run_references(&folder)
        }
        Commands::InitReferences { dir, config } => {
            let config = load_config(&config)?;
            let folder = dir.unwrap_or_else(|| PathBuf::from(&config.pipeline.references_folder));
            FileManager::ensure_dir(&folder)?;
            info!("Reference folder ready: {:?}", folder);
            Ok(())
        }
        Commands::Check { config } => {
            let config = load_config(&config)?;
            run_check(&config).await
        }
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "text_to_shots", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Load or create the configuration, apply CLI overrides, and validate it
fn load_config(options: &ConfigArgs) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    let config_path = &options.config;
    let mut config = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    // Override config with CLI options if provided
    if let Some(provider) = &options.provider {
        config.provider = provider.clone().into();
    }
    if let Some(model) = &options.model {
        config.active_provider_config_mut().model = model.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate()
        .context("Configuration validation failed")?;

    if options.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    Ok(config)
}

async fn run_process(args: ProcessArgs) -> Result<()> {
    let mut config = load_config(&args.config)?;
    if let Some(folder) = &args.references_folder {
        config.pipeline.references_folder = folder.to_string_lossy().to_string();
    }
    if args.strict {
        config.pipeline.strict_format = true;
    }

    let processor = StoryProcessor::from_config(&config, None)?;
    let use_references = config.pipeline.use_references && !args.no_references;
    let models = config.get_models();

    info!("🚀 text_to_shots: {} - {}", config.provider.display_name(), models.default_model);

    let progress = ProgressBar::new(args.inputs.len() as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] {pos}/{len} stories {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress.set_style(style);
    progress.enable_steady_tick(Duration::from_millis(120));
    progress.set_message("Processing");

    let processor = &processor;
    let output_dir = args.output_dir.as_deref();
    let outcomes: Vec<(PathBuf, Result<(), AppError>)> = stream::iter(args.inputs.iter().cloned())
        .map(|input| {
            let progress = progress.clone();
            async move {
                let outcome = process_file(processor, &input, output_dir, use_references).await;
                progress.inc(1);
                (input, outcome)
            }
        })
        .buffer_unordered(config.pipeline.concurrent_stories.max(1))
        .collect()
        .await;

    progress.finish_and_clear();

    let total = outcomes.len();
    let mut failed = 0;
    for (input, outcome) in outcomes {
        if let Err(e) = outcome {
            failed += 1;
            error!("{:?}: {}", input, e);
        }
    }

    if failed > 0 {
        return Err(anyhow!("{} of {} stories failed", failed, total));
    }
    info!("Processed {} stories", total);
    Ok(())
}

async fn process_file(
    processor: &StoryProcessor,
    input: &Path,
    output_dir: Option<&Path>,
    use_references: bool,
) -> Result<(), AppError> {
    if !FileManager::file_exists(input) {
        return Err(AppError::File(format!("Input file does not exist: {:?}", input)));
    }

    let story = FileManager::read_to_string(input)
        .map_err(|e| AppError::File(format!("{:#}", e)))?;

    let result = processor.process_story(&story, use_references).await?;

    let output_dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().filter(|p| !p.as_os_str().is_empty()).map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));
    FileManager::ensure_dir(&output_dir).map_err(|e| AppError::File(format!("{:#}", e)))?;

    let json = serde_json::to_string_pretty(&result)
        .map_err(|e| AppError::Unknown(format!("Failed to serialize result: {}", e)))?;
    let json_path = FileManager::generate_output_path(input, &output_dir, "analysis.json");
    FileManager::write_to_file(&json_path, &json).map_err(|e| AppError::File(format!("{:#}", e)))?;

    let markdown_path = FileManager::generate_output_path(input, &output_dir, "breakdown.md");
    FileManager::write_to_file(&markdown_path, &result.to_markdown())
        .map_err(|e| AppError::File(format!("{:#}", e)))?;

    info!("Success: {:?}", markdown_path);
    Ok(())
}

fn run_references(folder: &Path) -> Result<()> {
    let available = references::list_available(folder);
    if available.is_empty() {
        info!("No reference documents in {:?}", folder);
        return Ok(());
    }

    info!("{} reference document(s) in {:?}:", available.len(), folder);
    for name in available {
        println!("{}", name);
    }
    Ok(())
}

async fn run_check(config: &Config) -> Result<()> {
    let processor = StoryProcessor::from_config(config, None)?;
    let ctx = processor.context();

    info!("Testing {} connection at {}", config.provider.display_name(), config.get_endpoint());
    ctx.provider
        .test_connection(&ctx.models.default_model)
        .await
        .with_context(|| format!("Could not reach {}", config.provider.display_name()))?;

    info!("Connection OK, model {}", ctx.models.default_model);
    info!("{} reference document(s) available", processor.list_available_references().len());
    Ok(())
}

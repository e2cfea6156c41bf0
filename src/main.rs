//! WhatsApp Mailer CLI - main entry point
//!
//! Unified CLI interface for checking number lists, previewing message
//! variants and running a mailing.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use whatsapp_mailer::automation::{DryRun, ShellDriver};
use whatsapp_mailer::{
    Config, Delays, Dispatcher, Error, MailingSession, MessageVariants, SendLock, WebSender,
};

#[derive(Parser)]
#[command(name = "whatsapp_mailer")]
#[command(about = "WhatsApp Web Bulk Mailer & Contact List Normalizer", long_about = None)]
#[command(version)]
struct Cli {
    /// Append-mode log file (falls back to config, then the default)
    #[arg(long, env = "MAILER_LOG_FILE")]
    log_file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a numbers file and show the normalized list with an estimate
    Check {
        /// Path to the numbers file (.txt)
        file: PathBuf,
    },

    /// Print obfuscated variants of a message
    Preview {
        /// Message text
        #[arg(short, long)]
        message: Option<String>,

        /// Read the message from a file instead
        #[arg(long)]
        message_file: Option<PathBuf>,

        /// Number of variants to print
        #[arg(short, long, default_value = "3")]
        count: usize,

        /// Per-character substitution probability
        #[arg(long)]
        probability: Option<f64>,
    },

    /// Run a mailing over a numbers file
    Send {
        /// Path to the numbers file (.txt)
        #[arg(short, long)]
        numbers: PathBuf,

        /// Message text (caption when an image is attached)
        #[arg(short, long)]
        message: Option<String>,

        /// Read the message from a file instead
        #[arg(long)]
        message_file: Option<PathBuf>,

        /// Image attached to every send (.jpeg, .jpg, .png)
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// External input driver command
        #[arg(long, env = "MAILER_DRIVER")]
        driver: Option<PathBuf>,

        /// Log every automation step instead of driving the UI
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Obfuscation mode: reset | compound
        #[arg(long)]
        mode: Option<String>,

        /// Drop numbers that are not dialable after cleaning
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Check { .. } => "check",
            Commands::Preview { .. } => "preview",
            Commands::Send { .. } => "send",
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Load .env for local development
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = Config::new();
    if let Some(log_file) = cli.log_file.clone() {
        config.log_file = log_file;
    }

    init_logging(&config.log_file)?;
    info!("App started");

    let command_name = cli.command.name();
    let start = Instant::now();

    let result = execute_command(cli.command, config);

    debug!("{} finished in {:?}", command_name, start.elapsed());
    result
}

/// Initialize logging into the append-mode log file; falls back to stderr
/// when the file cannot be opened.
fn init_logging(log_file: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("whatsapp_mailer=info".parse()?);

    match OpenOptions::new().create(true).append(true).open(log_file) {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Arc::new(file))
                .init();
        }
        Err(_) => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
    Ok(())
}

fn execute_command(command: Commands, mut config: Config) -> anyhow::Result<()> {
    match command {
        Commands::Check { file } => {
            let mut session = MailingSession::new();
            session.load_recipients(&file, &config)?;

            for number in &session.recipients {
                println!("{}", number);
            }
            let (count, estimate) = session.summary();
            println!("\n{}", count);
            println!("{}", estimate);
        }

        Commands::Preview {
            message,
            message_file,
            count,
            probability,
        } => {
            let template = read_message(message, message_file)?;
            let probability = probability.unwrap_or(config.obfuscation_probability);

            let mut rng = rand::thread_rng();
            for _ in 0..count {
                println!(
                    "{}",
                    whatsapp_mailer::obfuscate::transform_with(&template, &mut rng, probability)
                );
            }
        }

        Commands::Send {
            numbers,
            message,
            message_file,
            image,
            driver,
            dry_run,
            mode,
            strict,
        } => {
            if strict {
                config.strict_validation = true;
            }
            let mode = match mode {
                Some(m) => m.parse().map_err(Error::InvalidArgument)?,
                None => config.obfuscation_mode,
            };

            let mut session = MailingSession::new();
            session.set_message(&read_message(message, message_file)?);
            session.load_recipients(&numbers, &config)?;

            if let Some(path) = image {
                session.attach_image(path);
            }
            if let Some(attachment) = &session.image {
                println!("Выбрано изображение: {}", attachment.file_name);
            }

            let (count, estimate) = session.summary();
            println!("{}", count);
            println!("{}", estimate);

            // One mailing at a time: the browser session and the clipboard
            // cannot be shared.
            let _lock = SendLock::acquire(&config.lock_file)?;

            let mut variants =
                MessageVariants::new(&session.message, mode, config.obfuscation_probability);

            let stats = if dry_run {
                let sender = WebSender::new(DryRun, &config.web_url, Delays::none());
                Dispatcher::new(sender, Delays::none()).run(&session, &mut variants)
            } else {
                let program = driver.ok_or_else(|| {
                    Error::InvalidArgument(
                        "pass --driver <command> or --dry-run".to_string(),
                    )
                })?;
                let sender = WebSender::new(
                    ShellDriver::new(program),
                    &config.web_url,
                    config.delays.clone(),
                );
                Dispatcher::new(sender, config.delays.clone()).run(&session, &mut variants)
            };

            println!("\n✅ Отправлено: {}", stats.sent);
            if stats.failed > 0 {
                println!("❌ Ошибок: {} (подробности в {})", stats.failed, config.log_file);
            }
        }
    }

    Ok(())
}

/// Message template from --message or --message-file.
fn read_message(message: Option<String>, message_file: Option<PathBuf>) -> anyhow::Result<String> {
    match (message, message_file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => Ok(std::fs::read_to_string(path)?),
        (None, None) => Err(Error::InvalidArgument(
            "pass --message or --message-file".to_string(),
        )
        .into()),
    }
}

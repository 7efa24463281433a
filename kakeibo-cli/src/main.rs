use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use kakeibo_finance::{LineReport, ReceiptAggregator, ReceiptOutcome, ReplyFormatter};
use kakeibo_ingest::{LineClassifier, LineVerdict};
use std::io::Read;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

mod collaborators;
mod config;
mod line;
mod logging;
mod ocr;
mod pipeline;
mod server;
mod state;

use line::LineClient;
use ocr::VisionClient;
use pipeline::ReceiptService;
use server::AppState;
use state::Credentials;

#[derive(Parser, Debug)]
#[command(name = "kakeibo", version, about = "Receipt photos in, spending breakdown out")]
struct Cli {
    /// Config file (default: ~/.kakeibo/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the LINE webhook service
    Serve {
        /// Listen port (overrides config and PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Classify OCR text from a file (or stdin) and print the reply
    Classify {
        /// Text file with OCR output; reads stdin when omitted
        #[arg(long)]
        file: Option<PathBuf>,

        /// Also print the raw text message
        #[arg(long)]
        raw: bool,

        /// List each booked item under the breakdown
        #[arg(long)]
        items: bool,

        /// Print the verdict for every line
        #[arg(long)]
        verbose: bool,

        /// Print the aggregation as JSON instead of reply messages
        #[arg(long, conflicts_with = "verbose")]
        json: bool,
    },

    /// Config file helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config.toml (including the category table)
    Init,
    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg_path = cli.config.as_deref();

    match cli.command {
        Command::Serve { port } => {
            let mut cfg = config::load_config(cfg_path)?;
            cfg.apply_env()?;
            if let Some(p) = port {
                cfg.server.port = p;
            }
            logging::init_logger(&cfg.logging.level);
            run_server(cfg).await?;
        }

        Command::Classify {
            file,
            raw,
            items,
            verbose,
            json,
        } => {
            let cfg = config::load_config(cfg_path)?;
            logging::init_logger(&cfg.logging.level);

            let text = read_input(file)?;
            let classifier = LineClassifier::new()?;
            let dictionary = cfg.dictionary()?;
            let aggregator = ReceiptAggregator::new(&classifier, &dictionary);

            if verbose {
                for report in aggregator.explain(&text) {
                    println!("{}", describe_line(&report));
                }
                println!();
            }

            if json {
                let result = aggregator.aggregate(&text);
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                let formatter = ReplyFormatter::new(raw || cfg.reply.include_raw_text, items || cfg.reply.list_items);
                let outcome = ReceiptOutcome::evaluate(&aggregator, Some(&text));
                for (i, body) in formatter.render(&outcome).iter().enumerate() {
                    if i > 0 {
                        println!("---");
                    }
                    println!("{body}");
                }
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config(cfg_path)?,
            ConfigCommand::Show => {
                let mut cfg = config::load_config(cfg_path)?;
                cfg.apply_env()?;
                if cfg.categories.is_empty() {
                    cfg.categories = cfg.dictionary()?.entries().to_vec();
                }
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

async fn run_server(cfg: config::Config) -> Result<()> {
    let creds = Credentials::from_env().context("missing credentials (LINE_CHANNEL_SECRET, LINE_CHANNEL_ACCESS_TOKEN, GOOGLE_API_KEY)")?;

    let dictionary = cfg.dictionary()?;
    let categories = dictionary.len();

    let service = ReceiptService::new(
        LineClassifier::new()?,
        dictionary,
        cfg.reply,
        Arc::new(VisionClient::new(&cfg.ocr, creds.google_api_key.clone())?),
        Arc::new(LineClient::new(&cfg.line, creds.line_channel_access_token.clone())?),
    );

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", cfg.server.host, cfg.server.port))?;

    info!(
        build = env!("KAKEIBO_BUILD_SHA"),
        categories,
        raw_text = cfg.reply.include_raw_text,
        "starting kakeibo"
    );

    let state = AppState {
        service: Arc::new(service),
        channel_secret: Arc::from(creds.line_channel_secret.as_str()),
    };
    server::serve(addr, state, &cfg.server.webhook_path).await
}

fn read_input(file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => {
            if !path.exists() {
                bail!("file not found: {} (pass --file <path>)", path.display());
            }
            std::fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))
        }
        None => {
            let mut s = String::new();
            std::io::stdin()
                .read_to_string(&mut s)
                .context("read stdin")?;
            Ok(s)
        }
    }
}

fn describe_line(report: &LineReport) -> String {
    let line = &report.line;
    match &report.verdict {
        LineVerdict::ItemCandidate { name, raw_price } => {
            let category = report.category.as_deref().unwrap_or("-");
            match &report.keyword {
                Some(keyword) => format!("[item] {name} {raw_price}円 -> {category} ({keyword})"),
                None => format!("[item] {name} {raw_price}円 -> {category}"),
            }
        }
        LineVerdict::Noise { rule } => format!("[noise:{rule}] {line}"),
        LineVerdict::Unmatched => format!("[skip] {line}"),
    }
}

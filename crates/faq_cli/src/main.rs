//! Campus FAQ assistant command-line interface.
//!
//! # Usage
//!
//! ```bash
//! faq --kb fixtures/kb/campus_faq.json ask "What is the library fine for late books?"
//! faq --kb kb.sqlite search "tuition refund" -k 5 --json
//! faq --kb kb.json serve < questions.txt
//! faq --kb kb.json stats
//! faq health
//! ```

mod output;

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use faq_ai::ollama::OllamaClient;
use faq_ai::Assistant;
use faq_core::config::AssistantConfig;
use faq_core::knowledge::{load_snapshot, KnowledgeBase};
use tracing_subscriber::EnvFilter;

/// Answer questions from a fixed campus knowledge base.
#[derive(Parser)]
#[command(name = "faq", version, about)]
struct Cli {
    /// TOML config file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Knowledge base snapshot (.json, .sqlite, .sqlite3 or .db)
    #[arg(long, global = true)]
    kb: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Answer one question
    Ask {
        question: String,
        /// Output the answer as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show ranked retrieval hits for a query
    Search {
        query: String,
        #[arg(short = 'k', long, default_value_t = 8)]
        top_k: usize,
        #[arg(long)]
        json: bool,
    },
    /// Answer one question per stdin line, one JSON answer per stdout line
    Serve,
    /// Knowledge base statistics
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Probe the Ollama endpoint
    Health,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = AssistantConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Health => {
            let client = OllamaClient::new(&config.ollama.base_url)?;
            client.health_check()?;
            println!("ollama ok ({})", client.base_url());
        }
        Command::Stats { json } => {
            let kb = load_kb(cli.kb.as_ref())?;
            println!("{}", output::format_stats(&kb.stats(), json));
        }
        Command::Ask { question, json } => {
            let assistant = Assistant::with_ollama(load_kb(cli.kb.as_ref())?, config)?;
            let answer = assistant.generate_response(&question);
            println!("{}", output::format_answer(&question, &answer, json));
        }
        Command::Search {
            query,
            top_k,
            json,
        } => {
            let assistant = Assistant::with_ollama(load_kb(cli.kb.as_ref())?, config)?;
            let outcome = assistant.retrieve(&query, top_k);
            println!(
                "{}",
                output::format_search(&query, &outcome, assistant.knowledge_base(), json)
            );
        }
        Command::Serve => {
            let assistant = Assistant::with_ollama(load_kb(cli.kb.as_ref())?, config)?;
            serve(&assistant)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_env("FAQ_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Any load failure, an empty knowledge base included, ends the process before a query
/// is accepted.
fn load_kb(path: Option<&PathBuf>) -> Result<Arc<KnowledgeBase>> {
    let Some(path) = path else {
        bail!("--kb <SNAPSHOT> is required for this command");
    };
    tracing::info!(path = %path.display(), "loading knowledge base");
    let kb = load_snapshot(path)?;
    Ok(Arc::new(kb))
}

fn serve(assistant: &Assistant) -> Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for line in stdin.lock().lines() {
        let line = line?;
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        let answer = assistant.generate_response(question);
        writeln!(out, "{}", output::answer_json_line(question, &answer))?;
        out.flush()?;
    }
    Ok(())
}

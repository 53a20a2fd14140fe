use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::json;

use hrrag_cli::bootstrap::{init_tracing, load_settings, open_pipeline};
use hrrag_cli::history::{ChatHistory, Role};
use hrrag_cli::offline;
use hrrag_cli::{QaAnswer, QaPipeline};
use hrrag_core::config::Settings;
use hrrag_core::types::FusionPolicy;
use hrrag_embed::get_default_embedder;
use hrrag_hybrid::open_service;

const NO_ANSWER: &str = "No answer found.";

#[derive(Parser)]
#[command(name = "hrrag", about = "Hybrid retrieval over HR policy documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Clean, chunk and embed the source document into the chunk store
    Ingest {
        #[arg(long)]
        source: Option<PathBuf>,
        #[arg(long)]
        no_progress: bool,
    },
    /// Build the vector index from the chunk store
    BuildIndex,
    /// Rank chunks for a query without calling the LLM
    Query {
        text: String,
        #[arg(long)]
        top_k: Option<usize>,
        #[arg(long)]
        policy: Option<FusionPolicy>,
    },
    /// Answer one question
    Ask { question: String },
    /// Interactive chat; `/clear` wipes history, `/quit` exits
    Chat {
        /// Send questions to a running `hrrag-server` instead of answering in-process
        #[arg(long)]
        server: Option<String>,
    },
    /// List previous questions, newest first
    History,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = load_settings().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    match cli.command {
        Command::Ingest { source, no_progress } => {
            let embedder = get_default_embedder(&settings.embedding)?;
            let store = offline::ingest(&settings, source.as_deref(), embedder.as_ref(), !no_progress)?;
            println!("✅ Ingest complete ({} chunks, dim {}) -> {}", store.len(), store.dim(), settings.data.store_path().display());
        }
        Command::BuildIndex => {
            let index = offline::build_index(&settings)?;
            println!("Total vectors indexed: {}", index.len());
        }
        Command::Query { text, top_k, policy } => run_query(&settings, &text, top_k, policy)?,
        Command::Ask { question } => {
            let qa = open_pipeline(&settings)?;
            let answer = tokio::runtime::Runtime::new()?.block_on(qa.answer(&question))?;
            print_answer(&answer);
        }
        Command::Chat { server } => run_chat(&settings, server)?,
        Command::History => {
            let history = ChatHistory::load(&settings.chat.history_path());
            let summaries = history.summaries();
            if summaries.is_empty() { println!("No previous chats yet."); }
            for (n, text, time) in summaries { println!("{}. {}  ({})", n, text, time); }
        }
    }
    Ok(())
}

fn run_query(settings: &Settings, text: &str, top_k: Option<usize>, policy: Option<FusionPolicy>) -> anyhow::Result<()> {
    let service = open_service(settings)?;
    let ranker = policy.map_or(*service.ranker(), |p| service.ranker().with_policy(p));
    let top_k = top_k.unwrap_or(settings.retrieval.top_k);
    let ranked = service.retrieve_scored_with(&ranker, text, top_k, None)?;
    println!("🔍 {} results for: \"{}\" ({:?})", ranked.len(), text, ranker.policy());
    for (i, (cand, chunk)) in ranked.iter().zip(service.texts_for(&ranked)).enumerate() {
        println!("\n  {}. fused={:.4}  distance={:.4}  bm25={:.4}  id={}", i + 1, cand.fused_score, cand.dense_distance, cand.lexical_score, cand.chunk_id);
        println!("     {}", chunk);
    }
    Ok(())
}

fn print_answer(answer: &QaAnswer) {
    println!("{}", answer.answer);
    if !answer.sources.is_empty() {
        println!("\nSources:");
        for (i, s) in answer.sources.iter().enumerate() { println!("  [{}] {}", i + 1, s); }
    }
}

enum Backend {
    Local(QaPipeline, tokio::runtime::Runtime),
    Remote(reqwest::blocking::Client, String),
}

impl Backend {
    /// Every failure becomes the reply text; the chat loop never aborts on a bad answer.
    fn ask(&self, question: &str) -> String {
        match self {
            Backend::Local(qa, rt) => match rt.block_on(qa.answer(question)) {
                Ok(a) if !a.answer.trim().is_empty() => a.answer,
                Ok(_) => NO_ANSWER.to_string(),
                Err(e) => format!("Request failed: {}", e),
            },
            Backend::Remote(client, url) => {
                let resp = match client.post(format!("{}/query", url.trim_end_matches('/'))).json(&json!({ "question": question })).send() {
                    Ok(r) => r,
                    Err(e) => return format!("Request failed: {}", e),
                };
                if !resp.status().is_success() { return format!("Error: backend returned {}", resp.status().as_u16()); }
                match resp.json::<serde_json::Value>() {
                    Ok(v) => v.get("answer").and_then(|a| a.as_str()).filter(|a| !a.trim().is_empty()).unwrap_or(NO_ANSWER).to_string(),
                    Err(e) => format!("Request failed: {}", e),
                }
            }
        }
    }
}

fn run_chat(settings: &Settings, server: Option<String>) -> anyhow::Result<()> {
    let backend = match server {
        Some(url) => Backend::Remote(reqwest::blocking::Client::builder().timeout(Duration::from_secs(30)).build()?, url),
        None => Backend::Local(open_pipeline(settings)?, tokio::runtime::Runtime::new()?),
    };
    let mut history = ChatHistory::load(&settings.chat.history_path());
    println!("HR Policy Assistant\n===================");
    println!("Ask about leave, benefits or conduct. /clear wipes history, /quit exits.");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("\nYou: ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        let question = line.trim();
        match question {
            "" => continue,
            "/quit" | "/exit" => break,
            "/clear" => {
                history.clear();
                history.save()?;
                println!("History cleared.");
                continue;
            }
            _ => {}
        }
        if let Err(e) = history.record(Role::User, question) { tracing::warn!(error = %e, "failed to save chat history"); }
        let answer = backend.ask(question);
        println!("\nAssistant: {}", answer);
        if let Err(e) = history.record(Role::Assistant, answer) { tracing::warn!(error = %e, "failed to save chat history"); }
    }
    Ok(())
}

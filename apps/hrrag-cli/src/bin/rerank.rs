use std::io::{self, Write};

use clap::Parser;

use hrrag_cli::bootstrap::{init_tracing, load_settings};
use hrrag_cli::history::preview;
use hrrag_core::types::FusionPolicy;
use hrrag_hybrid::open_service;

/// Rank chunks with min-max normalized fusion and print the top matches.
#[derive(Parser)]
#[command(name = "hrrag-rerank")]
struct Args {
    question: Option<String>,
    #[arg(long, default_value_t = 5)]
    top_k: usize,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let settings = load_settings()?;
    let service = open_service(&settings)?;
    let question = match args.question {
        Some(q) => q,
        None => {
            print!("Enter your HR question: ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().read_line(&mut line)?;
            line.trim().to_string()
        }
    };
    let ranker = service.ranker().with_policy(FusionPolicy::Normalized);
    let ranked = service.retrieve_scored_with(&ranker, &question, args.top_k, None)?;
    println!("\nTop relevant chunks:");
    for (cand, text) in ranked.iter().zip(service.texts_for(&ranked)) {
        println!("\nScore: {:.3}\nText: {}", cand.fused_score, preview(&text, 400));
    }
    Ok(())
}

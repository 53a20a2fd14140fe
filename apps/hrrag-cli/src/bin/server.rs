use hrrag_cli::bootstrap::{init_tracing, load_settings, open_pipeline};
use hrrag_cli::server::{serve, AppState};

fn main() -> anyhow::Result<()> {
    init_tracing();
    let settings = load_settings().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    // Opened before the runtime starts: the local embedder and blocking HTTP clients must not be built on async threads.
    let qa = open_pipeline(&settings)?;
    tracing::info!(chunks = qa.retriever().len(), top_k = qa.top_k(), "retrieval context ready");
    tokio::runtime::Runtime::new()?.block_on(serve(&settings.server, AppState { qa }))
}

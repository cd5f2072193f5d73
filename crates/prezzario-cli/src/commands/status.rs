//! Status command

use crate::app::OutputFormat;
use anyhow::Result;
use prezzario_core::{corpus, Config};

pub async fn run(config: &Config, format: OutputFormat) -> Result<()> {
    let stats = corpus::stats(&config.corpus.chunks_path, &config.corpus.embeddings_path);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        OutputFormat::Cli => {
            println!("Chunk file:      {:?}", config.corpus.chunks_path);
            println!("Chunks:          {}", stats.chunk_count);
            println!();
            println!("Embedding cache: {:?}", config.corpus.embeddings_path);
            println!("Embedded:        {}", stats.embedded_count);
            match (&stats.embedding_model, stats.embedding_dimensions) {
                (Some(model), Some(dims)) => {
                    println!("Model:           {} ({} dims)", model, dims);
                }
                _ => println!("Model:           (no cache)"),
            }
            if stats.embedded_count != stats.chunk_count {
                println!();
                println!("Cache is stale; it will be rebuilt on the next search");
            }
        }
    }

    Ok(())
}

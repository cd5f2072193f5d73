//! Corpus build command

use crate::app::BuildArgs;
use anyhow::Result;
use prezzario_core::{corpus::ingest, Config, CorpusIndex, HttpEmbedder};

pub async fn run(args: BuildArgs, config: &Config) -> Result<()> {
    let chunks = ingest::ingest_catalog_dir(&args.catalog_dir)?;
    if chunks.is_empty() {
        anyhow::bail!("no catalog chunks found under {:?}", args.catalog_dir);
    }

    ingest::write_chunk_file(&chunks, &config.corpus.chunks_path)?;
    println!(
        "Wrote {} chunks to {:?}",
        chunks.len(),
        config.corpus.chunks_path
    );

    if args.embed {
        let embedder = HttpEmbedder::from_config(config.llm_service.clone())?;
        let corpus = CorpusIndex::load(
            &config.corpus.chunks_path,
            &config.corpus.embeddings_path,
            &embedder,
        )
        .await?;
        println!(
            "Encoded {} chunks with {} into {:?}",
            corpus.len(),
            corpus.embedding_model(),
            config.corpus.embeddings_path
        );
    }

    Ok(())
}

//! Hybrid retrieval for one query
//!
//! Runs the lexical and semantic scorers over the corpus, fuses the two
//! score vectors and returns the top-k candidates with their raw and
//! combined scores.

use super::{fuse_scores, rank_top_k, semantic_scores, AnnIndex, Bm25Index, ScoredCandidate, SearchOptions};
use crate::corpus::CorpusIndex;
use crate::error::Result;
use crate::llm::Embedder;

/// Retrieve the top-k chunks for a single query.
///
/// The query is embedded with the same model the corpus matrix was built
/// under (the `CorpusIndex` loader enforces the pairing).
pub async fn hybrid_retrieve(
    query: &str,
    bm25: &Bm25Index,
    corpus: &CorpusIndex,
    embedder: &dyn Embedder,
    ann: Option<&AnnIndex>,
    options: &SearchOptions,
) -> Result<Vec<ScoredCandidate>> {
    let lexical = bm25.scores(query);

    let query_embedding = embedder.embed(query).await?;
    let semantic = semantic_scores(&query_embedding, corpus.embeddings(), ann, options.top_k);

    let combined = fuse_scores(&lexical, &semantic, options.alpha)?;
    let ranked = rank_top_k(&combined, options.top_k);

    Ok(ranked
        .into_iter()
        .map(|chunk_id| ScoredCandidate {
            chunk_id,
            lexical_score: lexical[chunk_id],
            semantic_score: semantic[chunk_id],
            combined_score: combined[chunk_id],
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Chunk;
    use crate::error::Result;
    use async_trait::async_trait;

    /// Deterministic embedder: one-hot on the first matching keyword
    struct KeywordEmbedder;

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let keywords = ["demolizione", "pavimenti", "tinteggiatura"];
            let mut v = vec![0.0; keywords.len()];
            for (i, kw) in keywords.iter().enumerate() {
                if text.contains(kw) {
                    v[i] = 1.0;
                }
            }
            Ok(v)
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::with_capacity(texts.len());
            for t in texts {
                out.push(self.embed(t).await?);
            }
            Ok(out)
        }

        fn dimensions(&self) -> usize {
            3
        }

        fn model_name(&self) -> &str {
            "keyword-test"
        }
    }

    async fn fixture() -> (CorpusIndex, Bm25Index) {
        let texts = [
            "demolizione muri portanti",
            "posa pavimenti ceramica",
            "tinteggiatura pareti interne",
        ];
        let chunks: Vec<Chunk> = texts
            .iter()
            .enumerate()
            .map(|(id, t)| Chunk {
                id,
                text: t.to_string(),
            })
            .collect();
        let embedder = KeywordEmbedder;
        let embeddings = embedder
            .embed_batch(&texts.iter().map(|t| t.to_string()).collect::<Vec<_>>())
            .await
            .unwrap();
        let corpus = CorpusIndex::from_parts(chunks, embeddings, "keyword-test").unwrap();
        let bm25 = Bm25Index::build(&texts);
        (corpus, bm25)
    }

    #[tokio::test]
    async fn test_hybrid_ranks_matching_chunk_first() {
        let (corpus, bm25) = fixture().await;
        let options = SearchOptions {
            top_k: 3,
            alpha: 0.1,
        };

        let candidates = hybrid_retrieve(
            "tinteggiatura pareti",
            &bm25,
            &corpus,
            &KeywordEmbedder,
            None,
            &options,
        )
        .await
        .unwrap();

        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0].chunk_id, 2);
        assert!(candidates[0].combined_score >= candidates[1].combined_score);
    }

    #[tokio::test]
    async fn test_hybrid_respects_top_k() {
        let (corpus, bm25) = fixture().await;
        let options = SearchOptions {
            top_k: 1,
            alpha: 0.1,
        };

        let candidates =
            hybrid_retrieve("demolizione", &bm25, &corpus, &KeywordEmbedder, None, &options)
                .await
                .unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].chunk_id, 0);
    }

    #[tokio::test]
    async fn test_hybrid_same_query_is_deterministic() {
        let (corpus, bm25) = fixture().await;
        let options = SearchOptions::default();

        let a = hybrid_retrieve("posa pavimenti", &bm25, &corpus, &KeywordEmbedder, None, &options)
            .await
            .unwrap();
        let b = hybrid_retrieve("posa pavimenti", &bm25, &corpus, &KeywordEmbedder, None, &options)
            .await
            .unwrap();

        let ids = |v: &[ScoredCandidate]| v.iter().map(|c| c.chunk_id).collect::<Vec<_>>();
        assert_eq!(ids(&a), ids(&b));
    }
}

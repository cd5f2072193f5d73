//! Retrieval orchestrator
//!
//! Drives the full query -> refine -> retrieve -> judge -> retry loop:
//!
//! 1. Refine the raw query into canonical category phrases (falls back to
//!    the raw query when the oracle degrades).
//! 2. Hybrid-retrieve top-k candidates per phrase; union and dedup by
//!    chunk id in first-seen order.
//! 3. Judge every new candidate against the *original* query, tracking the
//!    single best (chunk, score) pair.
//! 4. If the best score is below the confidence threshold and refinement
//!    actually produced something to vary, run exactly one retry round
//!    with alternative phrasings. A degraded alternatives call terminates
//!    instead of looping.
//!
//! Oracle failures never escape this module; the only fatal error a caller
//! can see comes from corpus loading, upstream of here.

use super::{hybrid_retrieve, AnnIndex, Bm25Index, JudgedCandidate, SearchOptions};
use crate::config::RetrievalConfig;
use crate::corpus::CorpusIndex;
use crate::error::Result;
use crate::llm::{Embedder, QueryRefiner, RelevanceJudge};
use std::collections::HashSet;

/// Best judged candidate for a session
#[derive(Debug, Clone)]
pub struct BestMatch {
    pub chunk_id: usize,
    pub text: String,
    pub title: String,
    /// Judge score, 0-100
    pub relevance: u8,
}

/// Result of one retrieval session
#[derive(Debug, Clone, Default)]
pub struct RetrievalOutcome {
    /// Best candidate found, `None` only when no candidate was ever judged
    pub best: Option<BestMatch>,
    /// Every judged candidate in first-seen order
    pub judged: Vec<JudgedCandidate>,
    /// Whether the alternatives retry round ran
    pub retried: bool,
}

/// Retrieval engine bound to one corpus.
///
/// Everything is injected: the corpus, the embedder, the refiner and the
/// judge. The struct is read-only after construction, so one instance can
/// serve concurrent sessions.
pub struct Retriever<'a> {
    corpus: &'a CorpusIndex,
    bm25: Bm25Index,
    ann: AnnIndex,
    embedder: &'a dyn Embedder,
    refiner: &'a dyn QueryRefiner,
    judge: &'a dyn RelevanceJudge,
    config: RetrievalConfig,
}

/// Mutable state threaded through one session's rounds
#[derive(Default)]
struct Session {
    seen: HashSet<usize>,
    judged: Vec<JudgedCandidate>,
    best: Option<(usize, u8)>,
}

impl<'a> Retriever<'a> {
    /// Build the lexical and ANN indexes over the corpus and bind the
    /// oracle collaborators.
    pub fn new(
        corpus: &'a CorpusIndex,
        embedder: &'a dyn Embedder,
        refiner: &'a dyn QueryRefiner,
        judge: &'a dyn RelevanceJudge,
        config: RetrievalConfig,
    ) -> Self {
        let texts: Vec<&str> = corpus.chunks().iter().map(|c| c.text.as_str()).collect();
        let bm25 = Bm25Index::build(&texts);
        let ann = AnnIndex::build(corpus.embeddings());

        Self {
            corpus,
            bm25,
            ann,
            embedder,
            refiner,
            judge,
            config,
        }
    }

    /// Run one full retrieval session for `raw_query`.
    pub async fn retrieve_best(&self, raw_query: &str) -> Result<RetrievalOutcome> {
        let mut refined = self.refiner.refine(raw_query).await;
        if refined.is_empty() {
            refined = vec![raw_query.to_string()];
        }
        // Refinement that degraded to the raw query leaves nothing to vary
        // in a retry round
        let degraded = refined.len() == 1 && refined[0] == raw_query;

        tracing::debug!("Working query set: {:?}", refined);

        let mut session = Session::default();
        self.run_round(&refined, raw_query, &mut session).await;

        let confident = session
            .best
            .map_or(false, |(_, score)| score >= self.config.confidence_threshold);

        let mut retried = false;
        if !confident && !degraded {
            let best_score = session.best.map(|(_, s)| s).unwrap_or(0);
            tracing::info!(
                "Best accuracy only {}, trying alternative phrasings",
                best_score
            );

            let alternatives = self.refiner.alternatives(raw_query).await;
            if alternatives.is_empty() {
                tracing::warn!("No alternative phrasings available, keeping current best");
            } else {
                retried = true;
                self.run_round(&alternatives, raw_query, &mut session).await;
            }
        }

        let best = session.best.map(|(chunk_id, relevance)| {
            let chunk = &self.corpus.chunks()[chunk_id];
            BestMatch {
                chunk_id,
                text: chunk.text.clone(),
                title: chunk.title().to_string(),
                relevance,
            }
        });

        if let Some(ref b) = best {
            tracing::info!("Best candidate: chunk {} (accuracy {})", b.chunk_id, b.relevance);
        } else {
            tracing::warn!("No candidate was judged for query {:?}", raw_query);
        }

        Ok(RetrievalOutcome {
            best,
            judged: session.judged,
            retried,
        })
    }

    /// One retrieve+judge round over a working query set. Candidates
    /// already judged in a previous round are skipped, not re-judged.
    async fn run_round(&self, queries: &[String], original_query: &str, session: &mut Session) {
        let options = SearchOptions {
            top_k: self.config.top_k,
            alpha: self.config.alpha,
        };

        for query in queries {
            tracing::debug!("Retrieving candidates for {:?}", query);
            let candidates = match hybrid_retrieve(
                query,
                &self.bm25,
                self.corpus,
                self.embedder,
                Some(&self.ann),
                &options,
            )
            .await
            {
                Ok(candidates) => candidates,
                Err(e) => {
                    tracing::warn!("Retrieval failed for {:?}: {}, skipping query", query, e);
                    continue;
                }
            };

            for candidate in candidates {
                if !session.seen.insert(candidate.chunk_id) {
                    continue;
                }

                let chunk = &self.corpus.chunks()[candidate.chunk_id];
                let relevance = self.judge.judge(original_query, chunk.title()).await;
                tracing::debug!(
                    "Chunk {} title {:?} accuracy {}",
                    candidate.chunk_id,
                    chunk.title(),
                    relevance
                );

                session.judged.push(JudgedCandidate {
                    chunk_id: candidate.chunk_id,
                    relevance,
                });

                // Strict greater-than: the first candidate at a given score
                // wins, so ties break by judging order
                let improved = session.best.map_or(true, |(_, best)| relevance > best);
                if improved {
                    session.best = Some((candidate.chunk_id, relevance));
                }
            }
        }
    }
}

//! In-memory BM25 lexical scoring
//!
//! Okapi BM25 over whitespace-lowercased tokens. Each chunk is one
//! document; the corpus defines the term document frequencies. The index
//! is immutable once built and deterministic given the corpus.

use std::collections::HashMap;

const K1: f64 = 1.5;
const B: f64 = 0.75;

/// Floor factor for non-positive IDF values. Very common terms would
/// otherwise score negative and push matching chunks below non-matching
/// ones.
const EPSILON: f64 = 0.25;

/// BM25 index over a fixed corpus
pub struct Bm25Index {
    doc_tokens: Vec<Vec<String>>,
    doc_lens: Vec<usize>,
    avg_doc_len: f64,
    idf: HashMap<String, f64>,
}

impl Bm25Index {
    /// Build the index from chunk texts.
    pub fn build<S: AsRef<str>>(texts: &[S]) -> Self {
        let doc_tokens: Vec<Vec<String>> = texts
            .iter()
            .map(|t| tokenize(t.as_ref()))
            .collect();
        let doc_lens: Vec<usize> = doc_tokens.iter().map(Vec::len).collect();

        let n_docs = doc_tokens.len();
        let avg_doc_len = if n_docs == 0 {
            0.0
        } else {
            doc_lens.iter().sum::<usize>() as f64 / n_docs as f64
        };

        // Document frequency per term
        let mut df: HashMap<String, usize> = HashMap::new();
        for tokens in &doc_tokens {
            let mut seen: Vec<&String> = tokens.iter().collect();
            seen.sort_unstable();
            seen.dedup();
            for term in seen {
                *df.entry(term.clone()).or_insert(0) += 1;
            }
        }

        // Okapi IDF with an epsilon floor for terms in most documents
        let mut idf: HashMap<String, f64> = HashMap::with_capacity(df.len());
        let mut idf_sum = 0.0;
        let mut negative: Vec<String> = Vec::new();
        for (term, freq) in df {
            let value = ((n_docs as f64 - freq as f64 + 0.5) / (freq as f64 + 0.5)).ln();
            idf_sum += value;
            if value <= 0.0 {
                negative.push(term.clone());
            }
            idf.insert(term, value);
        }
        if !idf.is_empty() {
            let floor = EPSILON * (idf_sum / idf.len() as f64).max(0.0);
            for term in negative {
                idf.insert(term, floor);
            }
        }

        Self {
            doc_tokens,
            doc_lens,
            avg_doc_len,
            idf,
        }
    }

    /// Score the query against every document. An empty query scores every
    /// document 0; it is not an error.
    pub fn scores(&self, query: &str) -> Vec<f64> {
        let query_tokens = tokenize(query);
        let mut scores = vec![0.0; self.doc_tokens.len()];

        if query_tokens.is_empty() || self.avg_doc_len == 0.0 {
            return scores;
        }

        for (doc_id, tokens) in self.doc_tokens.iter().enumerate() {
            let dl = self.doc_lens[doc_id] as f64;
            let norm = K1 * (1.0 - B + B * dl / self.avg_doc_len);

            let mut score = 0.0;
            for term in &query_tokens {
                let Some(&idf) = self.idf.get(term) else {
                    continue;
                };
                let tf = tokens.iter().filter(|t| *t == term).count() as f64;
                if tf > 0.0 {
                    score += idf * tf * (K1 + 1.0) / (tf + norm);
                }
            }
            scores[doc_id] = score;
        }

        scores
    }

    pub fn len(&self) -> usize {
        self.doc_tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_tokens.is_empty()
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|t| t.to_lowercase())
        .collect()
}

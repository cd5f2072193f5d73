//! Score fusion
//!
//! Combines a lexical and a semantic score vector into one ranking:
//! min-max normalize each vector, sharpen with a softmax so the top
//! candidates dominate, then blend with `alpha * lexical + (1 - alpha) *
//! semantic`. All steps are total: degenerate inputs (zero range, empty
//! vectors) produce well-defined uniform output, never NaN or Inf.

use crate::error::{PrezzarioError, Result};

/// Min-max normalize to [0, 1]. A zero-range vector (all values equal)
/// normalizes to all zeros instead of dividing by zero.
pub fn min_max_normalize(scores: &[f64]) -> Vec<f64> {
    let Some(&first) = scores.first() else {
        return vec![];
    };

    let (min, max) = scores.iter().fold((first, first), |(lo, hi), &s| {
        (lo.min(s), hi.max(s))
    });
    let range = max - min;

    if range == 0.0 {
        return vec![0.0; scores.len()];
    }

    scores.iter().map(|&s| (s - min) / range).collect()
}

/// Numerically stable softmax. Empty input yields empty output; uniform
/// input yields the uniform distribution.
pub fn softmax(scores: &[f64]) -> Vec<f64> {
    let Some(max) = scores.iter().copied().reduce(f64::max) else {
        return vec![];
    };

    let exps: Vec<f64> = scores.iter().map(|&s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();

    exps.into_iter().map(|e| e / sum).collect()
}

/// Fuse parallel lexical and semantic score vectors into combined scores.
pub fn fuse_scores(lexical: &[f64], semantic: &[f64], alpha: f64) -> Result<Vec<f64>> {
    if lexical.len() != semantic.len() {
        return Err(PrezzarioError::Search(format!(
            "score vector length mismatch: {} lexical vs {} semantic",
            lexical.len(),
            semantic.len()
        )));
    }
    if !(0.0..=1.0).contains(&alpha) {
        return Err(PrezzarioError::InvalidInput(format!(
            "alpha must be in [0, 1], got {}",
            alpha
        )));
    }

    let lex = softmax(&min_max_normalize(lexical));
    let sem = softmax(&min_max_normalize(semantic));

    Ok(lex
        .iter()
        .zip(sem.iter())
        .map(|(&l, &s)| alpha * l + (1.0 - alpha) * s)
        .collect())
}

/// Indices sorted descending by score, truncated to `top_k`. The sort is
/// stable, so ties keep corpus order and results stay deterministic.
pub fn rank_top_k(scores: &[f64], top_k: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..scores.len()).collect();
    indices.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    indices.truncate(top_k);
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranking(lexical: &[f64], semantic: &[f64], alpha: f64, k: usize) -> Vec<usize> {
        let combined = fuse_scores(lexical, semantic, alpha).unwrap();
        rank_top_k(&combined, k)
    }

    #[test]
    fn test_normalize_range() {
        let norm = min_max_normalize(&[2.0, 4.0, 6.0]);
        assert_eq!(norm, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_normalize_zero_range_is_uniform() {
        let norm = min_max_normalize(&[3.0, 3.0, 3.0]);
        assert_eq!(norm, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_normalize_empty() {
        assert!(min_max_normalize(&[]).is_empty());
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let sm = softmax(&[0.1, 0.5, 1.0]);
        let sum: f64 = sm.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(sm[2] > sm[1] && sm[1] > sm[0]);
    }

    #[test]
    fn test_softmax_uniform_input() {
        let sm = softmax(&[0.0, 0.0, 0.0, 0.0]);
        for v in sm {
            assert!((v - 0.25).abs() < 1e-9);
        }
    }

    #[test]
    fn test_fusion_zero_range_no_nan() {
        let flat = vec![7.0; 4];
        let combined = fuse_scores(&flat, &flat, 0.1).unwrap();
        assert!(combined.iter().all(|c| c.is_finite()));
        // Deterministic repeat
        assert_eq!(combined, fuse_scores(&flat, &flat, 0.1).unwrap());
        // Uniform ordering breaks ties by corpus order
        assert_eq!(rank_top_k(&combined, 4), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_alpha_one_is_pure_lexical_order() {
        let lexical = vec![0.2, 0.9, 0.5];
        let semantic = vec![0.9, 0.1, 0.5];
        assert_eq!(ranking(&lexical, &semantic, 1.0, 3), vec![1, 2, 0]);
    }

    #[test]
    fn test_alpha_zero_is_pure_semantic_order() {
        let lexical = vec![0.2, 0.9, 0.5];
        let semantic = vec![0.9, 0.1, 0.5];
        assert_eq!(ranking(&lexical, &semantic, 0.0, 3), vec![0, 2, 1]);
    }

    #[test]
    fn test_rank_truncates_to_top_k() {
        let ranked = rank_top_k(&[0.1, 0.9, 0.5, 0.7], 2);
        assert_eq!(ranked, vec![1, 3]);
    }

    #[test]
    fn test_rank_ties_keep_corpus_order() {
        let ranked = rank_top_k(&[0.5, 0.9, 0.5, 0.5], 4);
        assert_eq!(ranked, vec![1, 0, 2, 3]);
    }

    #[test]
    fn test_fusion_rejects_length_mismatch() {
        assert!(fuse_scores(&[0.1], &[0.1, 0.2], 0.5).is_err());
    }

    #[test]
    fn test_fusion_rejects_bad_alpha() {
        assert!(fuse_scores(&[0.1], &[0.2], 1.5).is_err());
        assert!(fuse_scores(&[0.1], &[0.2], -0.1).is_err());
    }
}

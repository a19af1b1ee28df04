//! Cosine similarity between embedding vectors.

use crate::error::{RagEvalError, Result};

/// Compute cosine similarity between a query vector and each candidate.
///
/// All candidates must have the query's dimension; a mismatch is an error
/// for the whole call. A zero-norm query or candidate makes the affected
/// entry `None` — undefined, not silently 0.
pub fn cosine_similarities(query: &[f32], candidates: &[Vec<f32>]) -> Result<Vec<Option<f64>>> {
    for (index, candidate) in candidates.iter().enumerate() {
        if candidate.len() != query.len() {
            return Err(RagEvalError::DimensionMismatch {
                expected: query.len(),
                actual: candidate.len(),
                index,
            });
        }
    }

    let query_norm = l2_norm(query);

    Ok(candidates
        .iter()
        .map(|candidate| {
            let candidate_norm = l2_norm(candidate);
            if query_norm == 0.0 || candidate_norm == 0.0 {
                return None;
            }
            let dot: f64 = query
                .iter()
                .zip(candidate.iter())
                .map(|(a, b)| *a as f64 * *b as f64)
                .sum();
            Some(dot / (query_norm * candidate_norm))
        })
        .collect())
}

/// Mean of a similarity list. Undefined if the list is empty or any entry
/// is undefined.
pub fn mean_similarity(similarities: &[Option<f64>]) -> Option<f64> {
    if similarities.is_empty() {
        return None;
    }
    let mut sum = 0.0;
    for similarity in similarities {
        sum += (*similarity)?;
    }
    Some(sum / similarities.len() as f64)
}

fn l2_norm(vector: &[f32]) -> f64 {
    vector
        .iter()
        .map(|x| *x as f64 * *x as f64)
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_vectors() {
        let sims = cosine_similarities(&[1.0, 0.0, 0.0], &[vec![1.0, 0.0, 0.0]]).unwrap();
        assert!((sims[0].unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_orthogonal_vectors() {
        let sims = cosine_similarities(&[1.0, 0.0, 0.0], &[vec![0.0, 1.0, 0.0]]).unwrap();
        assert!(sims[0].unwrap().abs() < 1e-9);
    }

    #[test]
    fn test_opposite_vectors() {
        let sims = cosine_similarities(&[1.0, 2.0], &[vec![-1.0, -2.0]]).unwrap();
        assert!((sims[0].unwrap() + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_scaling_invariance() {
        let query = [0.3, -0.7, 0.2];
        let candidate = vec![0.5, 0.1, -0.4];
        let scaled: Vec<f32> = candidate.iter().map(|x| x * 37.5).collect();

        let sims = cosine_similarities(&query, &[candidate, scaled]).unwrap();
        assert!((sims[0].unwrap() - sims[1].unwrap()).abs() < 1e-9);
    }

    #[test]
    fn test_dimension_mismatch() {
        let result = cosine_similarities(&[1.0, 0.0], &[vec![1.0, 0.0, 0.0]]);
        assert!(matches!(
            result,
            Err(RagEvalError::DimensionMismatch {
                expected: 2,
                actual: 3,
                index: 0,
            })
        ));
    }

    #[test]
    fn test_zero_norm_candidate_is_undefined() {
        let sims = cosine_similarities(&[1.0, 0.0], &[vec![0.0, 0.0], vec![1.0, 0.0]]).unwrap();
        assert!(sims[0].is_none());
        assert!(sims[1].is_some());
    }

    #[test]
    fn test_zero_norm_query_is_undefined() {
        let sims = cosine_similarities(&[0.0, 0.0], &[vec![1.0, 0.0]]).unwrap();
        assert!(sims[0].is_none());
    }

    #[test]
    fn test_mean_similarity() {
        let mean = mean_similarity(&[Some(0.9), Some(0.8), Some(0.7)]).unwrap();
        assert!((mean - 0.8).abs() < 1e-9);
        assert_eq!(mean_similarity(&[Some(1.0), None]), None);
        assert_eq!(mean_similarity(&[]), None);
    }
}

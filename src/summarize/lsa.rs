//! Latent semantic analysis extractive summarizer
//!
//! Builds a binary term-by-sentence matrix `A`, finds the leading
//! eigenpairs of the sentence Gram matrix `AᵀA` (squared singular values
//! and right singular vectors of `A`) by power iteration with deflation, and
//! ranks each sentence by the length of its projection onto the strong
//! topics.

use super::Summarizer;
use crate::error::{Result, TruthLensError};
use crate::text::{content_words, split_sentences};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

const MAX_ITERATIONS: usize = 100;
const CONVERGENCE_EPSILON: f64 = 1e-9;
/// Topics weaker than this fraction of the strongest singular value are ignored
const TOPIC_CUTOFF: f64 = 0.5;

#[derive(Debug, Clone, Copy, Default)]
pub struct LsaSummarizer;

impl LsaSummarizer {
    pub fn new() -> Self {
        Self
    }

    /// Pick the `max_sentences` highest ranked sentences, in document order
    pub fn summarize_text(text: &str, max_sentences: usize) -> String {
        let sentences = split_sentences(text);
        if sentences.is_empty() || max_sentences == 0 {
            return String::new();
        }
        if sentences.len() <= max_sentences {
            return sentences.join(" ");
        }

        let ranks = rank_sentences(&sentences);
        let mut order: Vec<usize> = (0..sentences.len()).collect();
        order.sort_by(|&a, &b| ranks[b].total_cmp(&ranks[a]).then(a.cmp(&b)));
        order.truncate(max_sentences);
        order.sort_unstable();

        order
            .into_iter()
            .map(|i| sentences[i].as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl Summarizer for LsaSummarizer {
    fn name(&self) -> &'static str {
        "lsa"
    }

    async fn summarize(&self, text: &str, max_sentences: usize) -> Result<String> {
        let text = text.to_string();
        tokio::task::spawn_blocking(move || Self::summarize_text(&text, max_sentences))
            .await
            .map_err(|e| TruthLensError::Summarization(format!("LSA task failed: {}", e)))
    }
}

/// Rank every sentence by its weighted projection onto the leading topics
fn rank_sentences(sentences: &[String]) -> Vec<f64> {
    let mut vocabulary: HashMap<String, usize> = HashMap::new();
    let term_sets: Vec<HashSet<usize>> = sentences
        .iter()
        .map(|s| {
            content_words(s)
                .into_iter()
                .map(|w| {
                    let next = vocabulary.len();
                    *vocabulary.entry(w).or_insert(next)
                })
                .collect()
        })
        .collect();

    let n = sentences.len();
    let mut gram = vec![vec![0.0f64; n]; n];
    for i in 0..n {
        for j in i..n {
            let shared = term_sets[i].intersection(&term_sets[j]).count() as f64;
            gram[i][j] = shared;
            gram[j][i] = shared;
        }
    }

    let topics = leading_eigenpairs(gram);
    let mut ranks = vec![0.0f64; n];
    for (eigenvalue, vector) in &topics {
        for (rank, component) in ranks.iter_mut().zip(vector) {
            // (sigma * v_i)^2 with sigma^2 = eigenvalue
            *rank += eigenvalue * component * component;
        }
    }
    ranks.iter().map(|r| r.sqrt()).collect()
}

/// Eigenpairs of a symmetric positive semi-definite matrix, strongest first,
/// stopping at the first one whose singular value falls below the cutoff
fn leading_eigenpairs(mut matrix: Vec<Vec<f64>>) -> Vec<(f64, Vec<f64>)> {
    let n = matrix.len();
    let mut pairs: Vec<(f64, Vec<f64>)> = Vec::new();
    let mut strongest_sigma = 0.0f64;

    for _ in 0..n {
        let Some((eigenvalue, vector)) = power_iteration(&matrix, &pairs) else {
            break;
        };
        let sigma = eigenvalue.sqrt();
        if pairs.is_empty() {
            strongest_sigma = sigma;
        } else if sigma <= strongest_sigma * TOPIC_CUTOFF {
            break;
        }

        // Deflate: M -= lambda * v vᵀ
        for i in 0..n {
            for j in 0..n {
                matrix[i][j] -= eigenvalue * vector[i] * vector[j];
            }
        }
        pairs.push((eigenvalue, vector));
    }

    pairs
}

fn power_iteration(matrix: &[Vec<f64>], found: &[(f64, Vec<f64>)]) -> Option<(f64, Vec<f64>)> {
    let n = matrix.len();
    // Deterministic, non-uniform start so it is never orthogonal to every topic
    let mut v: Vec<f64> = (0..n).map(|i| 1.0 + (i as f64 + 1.0).recip()).collect();
    orthogonalize(&mut v, found);
    if !normalize(&mut v) {
        return None;
    }

    for _ in 0..MAX_ITERATIONS {
        let mut next: Vec<f64> = matrix
            .iter()
            .map(|row| row.iter().zip(&v).map(|(a, b)| a * b).sum())
            .collect();
        orthogonalize(&mut next, found);
        if !normalize(&mut next) {
            return None;
        }

        let delta: f64 = next.iter().zip(&v).map(|(a, b)| (a - b).abs()).sum();
        v = next;
        if delta < CONVERGENCE_EPSILON {
            break;
        }
    }

    let eigenvalue: f64 = matrix
        .iter()
        .zip(&v)
        .map(|(row, vi)| vi * row.iter().zip(&v).map(|(a, b)| a * b).sum::<f64>())
        .sum();

    (eigenvalue > CONVERGENCE_EPSILON).then_some((eigenvalue, v))
}

/// Remove the components along already found eigenvectors
fn orthogonalize(v: &mut [f64], found: &[(f64, Vec<f64>)]) {
    for (_, u) in found {
        let dot: f64 = v.iter().zip(u).map(|(a, b)| a * b).sum();
        for (vi, ui) in v.iter_mut().zip(u) {
            *vi -= dot * ui;
        }
    }
}

fn normalize(v: &mut [f64]) -> bool {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm < CONVERGENCE_EPSILON {
        return false;
    }
    v.iter_mut().for_each(|x| *x /= norm);
    true
}

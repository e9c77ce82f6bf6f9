//! Local bag-of-words embedder using the hashing trick

use super::Embedder;
use crate::error::Result;
use crate::text::{content_words, stem};
use async_trait::async_trait;
use sha2::{Digest, Sha256};

/// Term-frequency vectors hashed into a fixed number of buckets
///
/// Words are lowercased, stop words dropped and common suffixes stripped,
/// so "launches" and "launched" land in the same bucket.
#[derive(Debug, Clone)]
pub struct HashedBagOfWords {
    dimensions: usize,
}

impl HashedBagOfWords {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for word in content_words(text) {
            vector[self.bucket(&stem(&word))] += 1.0;
        }
        vector
    }

    fn bucket(&self, term: &str) -> usize {
        let digest = Sha256::digest(term.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        (u64::from_le_bytes(prefix) % self.dimensions as u64) as usize
    }
}

#[async_trait]
impl Embedder for HashedBagOfWords {
    fn name(&self) -> &'static str {
        "hashed"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.vectorize(text))
    }
}

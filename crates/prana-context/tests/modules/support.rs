//! Shared fixtures: a deterministic bag-of-words embedder and a small knowledge base.

use prana_context::{Embedding, EmbeddingProvider};
use prana_core::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Number of hash buckets in the fake embedding.
pub const DIMENSION: usize = 256;

/// Embeds text as word counts hashed into fixed buckets.
#[derive(Clone, Default)]
pub struct BagOfWords {
    pub calls: Arc<AtomicUsize>,
}

impl BagOfWords {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn bucket(word: &str) -> usize {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in word.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    (hash % DIMENSION as u64) as usize
}

impl EmbeddingProvider for BagOfWords {
    fn model_name(&self) -> &str {
        "bag-of-words"
    }

    async fn ensure_model_available(&self) -> Result<()> {
        Ok(())
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut vector = vec![0.0; DIMENSION];
        for word in text
            .to_lowercase()
            .split(|ch: char| !ch.is_alphanumeric())
            .filter(|word| word.len() > 2)
        {
            vector[bucket(word)] += 1.0;
        }
        Ok(vector)
    }
}

/// Write a three-article knowledge base and return its path.
pub fn write_knowledge_base(dir: &Path) -> PathBuf {
    let path = dir.join("articles.json");
    fs::write(
        &path,
        r#"{
  "articles": [
    {
      "articleId": "mountain-pose",
      "title": "Mountain Pose",
      "content": "Stand tall with feet grounded hip width apart. Lengthen the spine, relax the shoulders and let the arms hang beside the torso. Mountain pose builds posture awareness.",
      "category": "asanas",
      "tags": ["standing", "posture"],
      "difficulty": "beginner"
    },
    {
      "articleId": "nadi-shodhana",
      "title": "Alternate Nostril Breathing",
      "content": "Alternate nostril breathing calms the nervous system. Close the right nostril with the thumb and inhale through the left nostril. Close the left nostril and exhale through the right nostril. Continue alternating nostril breathing for several rounds.",
      "category": "pranayama",
      "tags": ["breathing", "calm"],
      "source": "Hatha Yoga Pradipika"
    },
    {
      "articleId": "childs-pose",
      "title": "Child's Pose",
      "content": "Kneel on the mat, sit back on the heels and fold forward. Rest the forehead on the floor with arms extended or alongside the legs. Child's pose is a resting posture between stronger sequences.",
      "category": "beginner",
      "safetyNotes": "Use a bolster under the torso for knee discomfort."
    }
  ]
}"#,
    )
    .unwrap();
    path
}

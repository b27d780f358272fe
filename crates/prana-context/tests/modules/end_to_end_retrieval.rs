//! End-to-end retrieval over a small knowledge base.

use crate::support::{BagOfWords, DIMENSION, write_knowledge_base};
use prana_context::{ChunkConfig, EmbeddingClient, IndexBuilder, Retriever, VectorIndex};
use std::sync::Arc;
use tempfile::TempDir;

async fn built_index(temp: &TempDir) -> Arc<VectorIndex> {
    let knowledge_base = write_knowledge_base(temp.path());
    let index = Arc::new(VectorIndex::new(temp.path().join("index.json")));
    let builder = IndexBuilder::new(
        EmbeddingClient::new(BagOfWords::default()),
        ChunkConfig {
            target_size: 120,
            overlap: 20,
            break_preference: "\n".to_owned(),
        },
        knowledge_base,
    );
    builder.build(&index, true).await.unwrap();
    index
}

#[tokio::test]
async fn test_query_close_to_second_article_ranks_it_first() {
    let temp = TempDir::new().unwrap();
    let index = built_index(&temp).await;
    let retriever = Retriever::new(EmbeddingClient::new(BagOfWords::default()), index);

    let retrieval = retriever
        .retrieve("How do I practice alternate nostril breathing?", 10, 0.0)
        .await
        .unwrap();

    assert!(!retrieval.is_empty());
    assert_eq!(retrieval.chunks[0].chunk.article_id, "nadi-shodhana");

    let first_other = retrieval
        .chunks
        .iter()
        .position(|retrieved| retrieved.chunk.article_id != "nadi-shodhana");
    if let Some(boundary) = first_other {
        assert!(
            retrieval.chunks[boundary..]
                .iter()
                .all(|retrieved| retrieved.chunk.article_id != "nadi-shodhana"),
            "article chunks should rank above unrelated ones"
        );
    }

    assert!(retrieval.context_block.contains("[Source 1:"));
    assert!(
        retrieval
            .context_block
            .starts_with("[Source 1: Alternate Nostril Breathing]\n")
    );
    assert_eq!(retrieval.sources[0].source, "Hatha Yoga Pradipika");
    assert_eq!(retrieval.sources.len(), retrieval.chunks.len());
}

#[tokio::test]
async fn test_results_respect_top_k_and_threshold() {
    let temp = TempDir::new().unwrap();
    let index = built_index(&temp).await;
    let retriever = Retriever::new(EmbeddingClient::new(BagOfWords::default()), index);

    let retrieval = retriever.retrieve("nostril breathing", 2, 0.1).await.unwrap();
    assert!(retrieval.chunks.len() <= 2);
    for pair in retrieval.chunks.windows(2) {
        assert!(pair[0].similarity_score >= pair[1].similarity_score);
    }

    let strict = retriever.retrieve("nostril breathing", 10, 0.999).await.unwrap();
    assert!(strict.is_empty());
    assert!(strict.context_block.is_empty());
}

#[tokio::test]
async fn test_fresh_process_reloads_snapshot_on_first_query() {
    let temp = TempDir::new().unwrap();
    let built = built_index(&temp).await;
    let expected = built.stats();

    let fresh = Arc::new(VectorIndex::new(temp.path().join("index.json")));
    assert!(fresh.is_empty());
    let retriever = Retriever::new(
        EmbeddingClient::new(BagOfWords::default()),
        Arc::clone(&fresh),
    );
    let retrieval = retriever.retrieve("child resting posture", 3, 0.0).await.unwrap();

    assert!(!retrieval.is_empty());
    assert_eq!(fresh.stats(), expected);
    assert_eq!(fresh.dimension(), Some(DIMENSION));
}

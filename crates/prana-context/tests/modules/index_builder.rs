//! Build step: chunking, embedding, staging and snapshot reuse.

use crate::support::{BagOfWords, DIMENSION, write_knowledge_base};
use prana_context::{
    ChunkConfig, EmbeddingClient, IndexBuilder, ProgressCallback, SearchBackend as _, VectorIndex,
};
use prana_core::{ArticleCategory, Error};
use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn builder(provider: BagOfWords, temp: &TempDir) -> IndexBuilder<BagOfWords> {
    IndexBuilder::new(
        EmbeddingClient::new(provider),
        ChunkConfig::default(),
        write_knowledge_base(temp.path()),
    )
}

#[tokio::test]
async fn test_build_populates_and_persists() {
    let temp = TempDir::new().unwrap();
    let provider = BagOfWords::default();
    let index = VectorIndex::new(temp.path().join("data").join("index.json"));

    let report = builder(provider.clone(), &temp)
        .build(&index, false)
        .await
        .unwrap();

    assert!(!report.reused_snapshot);
    assert_eq!(report.articles, Some(3));
    assert_eq!(report.chunks, 3, "short articles become one chunk each");
    assert_eq!(report.dimension, Some(DIMENSION));
    assert_eq!(report.categories.get(&ArticleCategory::Asanas), Some(&1));
    assert!(report.snapshot.is_file());

    // One dimension probe plus one call per chunk
    assert_eq!(provider.call_count(), 4);

    let entry = index.get("childs-pose-chunk-0").unwrap();
    assert_eq!(entry.metadata.total_chunks, 1);
    assert_eq!(
        entry.metadata.safety_notes,
        "Use a bolster under the torso for knee discomfort."
    );
}

#[tokio::test]
async fn test_second_build_reuses_snapshot_unless_forced() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("index.json");
    builder(BagOfWords::default(), &temp)
        .build(&VectorIndex::new(&path), false)
        .await
        .unwrap();

    let provider = BagOfWords::default();
    let index = VectorIndex::new(&path);
    let report = builder(provider.clone(), &temp)
        .build(&index, false)
        .await
        .unwrap();
    assert!(report.reused_snapshot);
    assert_eq!(report.articles, None);
    assert_eq!(report.chunks, 3);
    assert_eq!(provider.call_count(), 0);

    let forced = builder(provider.clone(), &temp)
        .build(&index, true)
        .await
        .unwrap();
    assert!(!forced.reused_snapshot);
    assert_eq!(index.len(), 3, "rebuild replaces rather than appends");
    assert_eq!(provider.call_count(), 4);
}

#[tokio::test]
async fn test_empty_snapshot_is_rebuilt_without_force() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("index.json");
    let empty_kb = temp.path().join("empty.json");
    fs::write(&empty_kb, r#"{ "articles": [] }"#).unwrap();

    let empty = IndexBuilder::new(
        EmbeddingClient::new(BagOfWords::default()),
        ChunkConfig::default(),
        &empty_kb,
    )
    .build(&VectorIndex::new(&path), false)
    .await
    .unwrap();
    assert_eq!(empty.chunks, 0);
    assert!(path.is_file());

    let index = VectorIndex::new(&path);
    let report = builder(BagOfWords::default(), &temp)
        .build(&index, false)
        .await
        .unwrap();
    assert!(!report.reused_snapshot);
    assert_eq!(report.chunks, 3);
    index.ensure_ready().unwrap();
}

#[tokio::test]
async fn test_progress_is_reported_per_chunk() {
    let temp = TempDir::new().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let progress: ProgressCallback = Arc::new(move |done, total| {
        sink.lock().unwrap().push((done, total));
    });

    let index = VectorIndex::new(temp.path().join("index.json"));
    builder(BagOfWords::default(), &temp)
        .with_progress(progress)
        .build(&index, true)
        .await
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![(1, 3), (2, 3), (3, 3)]);
}

#[tokio::test]
async fn test_invalid_chunking_fails_before_touching_index() {
    let temp = TempDir::new().unwrap();
    let provider = BagOfWords::default();
    let index = VectorIndex::new(temp.path().join("index.json"));
    let builder = IndexBuilder::new(
        EmbeddingClient::new(provider.clone()),
        ChunkConfig {
            target_size: 50,
            overlap: 50,
            break_preference: "\n".to_owned(),
        },
        write_knowledge_base(temp.path()),
    );

    let result = builder.build(&index, true).await;
    assert!(matches!(result, Err(Error::InvalidChunkConfig(_))));
    assert!(index.is_empty());
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_missing_knowledge_base_is_reported() {
    let temp = TempDir::new().unwrap();
    let index = VectorIndex::new(temp.path().join("index.json"));
    let builder = IndexBuilder::new(
        EmbeddingClient::new(BagOfWords::default()),
        ChunkConfig::default(),
        temp.path().join("missing.json"),
    );
    let result = builder.build(&index, true).await;
    assert!(matches!(result, Err(Error::KnowledgeBase(_))));
}

use super::*;

use recall_memory_vector::VectorBackendOptions;
use recall_protocols::query::OrderBy;
use serde_json::json;

async fn create_backend() -> HybridBackend {
    let backend = HybridBackend::new(
        SqlBackend::new(":memory:"),
        VectorBackend::new(VectorBackendOptions::default().with_dimensions(3)),
    );
    backend.initialize().await.unwrap();
    backend
}

fn plain(id: &str, agent: &str) -> Memory {
    Memory::new(id, agent, "session-1", "observation", format!("Content {}", id))
}

fn embedded(id: &str, agent: &str, embedding: Vec<f32>) -> Memory {
    plain(id, agent).with_embedding(embedding)
}

#[tokio::test]
async fn test_backend_id_and_lifecycle() {
    let backend = create_backend().await;
    assert_eq!(backend.id(), "hybrid");
    assert!(backend.is_initialized());
    assert!(backend.sql_backend().is_initialized());
    assert!(backend.vector_backend().is_initialized());
    backend.initialize().await.unwrap();

    backend.store(embedded("m1", "A", vec![1.0, 0.0, 0.0])).await.unwrap();
    backend.close().await.unwrap();
    assert!(!backend.is_initialized());
    assert_eq!(backend.sql_backend().count(), 0);
    assert_eq!(backend.vector_backend().count(), 0);
    backend.close().await.unwrap();
}

#[tokio::test]
async fn test_store_without_embedding_skips_vector() {
    let backend = create_backend().await;
    let stored = backend.store(plain("m1", "A")).await.unwrap();
    assert_eq!(stored.id, "m1");

    assert!(backend.sql_backend().contains("m1"));
    assert!(!backend.vector_backend().contains("m1"));
}

#[tokio::test]
async fn test_store_with_empty_embedding_skips_vector() {
    let backend = create_backend().await;
    backend.store(embedded("m1", "A", Vec::new())).await.unwrap();

    assert!(backend.sql_backend().contains("m1"));
    assert_eq!(backend.vector_backend().count(), 0);
}

#[tokio::test]
async fn test_store_with_embedding_writes_both() {
    let backend = create_backend().await;
    backend.store(embedded("m1", "A", vec![1.0, 0.0, 0.0])).await.unwrap();

    assert!(backend.sql_backend().contains("m1"));
    assert!(backend.vector_backend().contains("m1"));
    let retrieved = backend.retrieve("m1").await.unwrap().unwrap();
    assert_eq!(retrieved.embedding, Some(vec![1.0, 0.0, 0.0]));
}

#[tokio::test]
async fn test_update_adds_embedding() {
    let backend = create_backend().await;
    backend.store(plain("m1", "A")).await.unwrap();

    backend.update(embedded("m1", "A", vec![0.0, 1.0, 0.0])).await.unwrap();
    assert!(backend.vector_backend().contains("m1"));
}

#[tokio::test]
async fn test_update_drops_embedding() {
    let backend = create_backend().await;
    backend.store(embedded("m1", "A", vec![1.0, 0.0, 0.0])).await.unwrap();

    let mut updated = plain("m1", "A");
    updated.content = "No longer embedded".to_string();
    backend.update(updated).await.unwrap();

    assert!(!backend.vector_backend().contains("m1"));
    let retrieved = backend.retrieve("m1").await.unwrap().unwrap();
    assert_eq!(retrieved.content, "No longer embedded");
}

#[tokio::test]
async fn test_update_unknown_is_noop() {
    let backend = create_backend().await;
    backend.update(embedded("ghost", "A", vec![1.0, 0.0, 0.0])).await.unwrap();

    assert_eq!(backend.sql_backend().count(), 0);
    assert_eq!(backend.vector_backend().count(), 0);
}

#[tokio::test]
async fn test_delete_fans_out() {
    let backend = create_backend().await;
    backend.store(embedded("m1", "A", vec![1.0, 0.0, 0.0])).await.unwrap();
    backend.store(plain("m2", "A")).await.unwrap();

    backend.delete("m1").await.unwrap();
    backend.delete("m2").await.unwrap();
    backend.delete("never-stored").await.unwrap();

    assert_eq!(backend.sql_backend().count(), 0);
    assert_eq!(backend.vector_backend().count(), 0);
}

#[tokio::test]
async fn test_query_delegates_to_sql() {
    let backend = create_backend().await;
    backend
        .store(plain("m1", "A").with_tags(["keep"]))
        .await
        .unwrap();
    backend.store(plain("m2", "A")).await.unwrap();

    let results = backend.query(MemoryQuery::new().with_tags(["keep"])).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "m1");
}

#[tokio::test]
async fn test_vector_search_delegates_to_vector() {
    let backend = create_backend().await;
    backend.store(embedded("m1", "A", vec![1.0, 0.0, 0.0])).await.unwrap();
    backend.store(plain("m2", "A")).await.unwrap();

    let results = backend.vector_search(&[1.0, 0.0, 0.0], 10).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].memory.id, "m1");
}

#[tokio::test]
async fn test_hybrid_search_fallback_matches_sql_query() {
    let backend = create_backend().await;
    for (id, ts) in [("m1", 100), ("m2", 300), ("m3", 200)] {
        backend.store(plain(id, "A").with_timestamp(ts)).await.unwrap();
    }
    backend.store(plain("other", "B")).await.unwrap();

    let query = MemoryQuery::new().agent("A").with_limit(2);
    let expected = backend.sql_backend().query(query.clone()).await.unwrap();
    let results = backend
        .hybrid_search(HybridSearchOptions::new(query))
        .await
        .unwrap();

    assert_eq!(results.len(), expected.len());
    for (result, memory) in results.iter().zip(expected.iter()) {
        assert_eq!(&result.memory, memory);
        assert_eq!(result.similarity, 1.0);
    }
    assert_eq!(results[0].memory.id, "m2");
}

#[tokio::test]
async fn test_hybrid_search_empty_embedding_falls_back() {
    let backend = create_backend().await;
    backend.store(plain("m1", "A")).await.unwrap();

    let options = HybridSearchOptions::default().with_embedding(Vec::new());
    let results = backend.hybrid_search(options).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].similarity, 1.0);
}

#[tokio::test]
async fn test_hybrid_search_ranks_and_truncates() {
    let backend = create_backend().await;
    for i in 0..6 {
        backend
            .store(embedded(&format!("m{}", i), "A", vec![1.0, i as f32, 0.0]))
            .await
            .unwrap();
    }

    let options = HybridSearchOptions::default()
        .with_embedding(vec![1.0, 0.0, 0.0])
        .with_k(3);
    let results = backend.hybrid_search(options).await.unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].memory.id, "m0");
    assert!(results.windows(2).all(|w| w[0].similarity >= w[1].similarity));
}

#[tokio::test]
async fn test_hybrid_search_filters_candidates() {
    let backend = create_backend().await;
    let metadata = [("priority".to_string(), json!("high"))].into_iter().collect();
    backend
        .store(embedded("hit", "A", vec![0.9, 0.1, 0.0]).with_metadata(metadata))
        .await
        .unwrap();
    backend.store(embedded("miss", "A", vec![1.0, 0.0, 0.0])).await.unwrap();
    backend.store(embedded("other", "B", vec![1.0, 0.0, 0.0])).await.unwrap();

    let filter = [("priority".to_string(), json!("high"))].into_iter().collect();
    let options = HybridSearchOptions::new(MemoryQuery::new().agent("A").with_metadata(filter))
        .with_embedding(vec![1.0, 0.0, 0.0])
        .with_k(5);
    let results = backend.hybrid_search(options).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].memory.id, "hit");
}

#[tokio::test]
async fn test_hybrid_search_overfetch_can_underfill() {
    let backend = create_backend().await;
    // Four close matches owned by B crowd out A's single distant memory
    // when k = 1 shortlists only 2 candidates.
    for i in 0..4 {
        backend
            .store(embedded(&format!("b{}", i), "B", vec![1.0, 0.0, 0.0]))
            .await
            .unwrap();
    }
    backend.store(embedded("a0", "A", vec![0.0, 1.0, 0.0])).await.unwrap();

    let options = HybridSearchOptions::new(MemoryQuery::new().agent("A"))
        .with_embedding(vec![1.0, 0.0, 0.0])
        .with_k(1);
    assert!(backend.hybrid_search(options).await.unwrap().is_empty());

    let options = HybridSearchOptions::new(MemoryQuery::new().agent("A"))
        .with_embedding(vec![1.0, 0.0, 0.0])
        .with_k(3);
    let results = backend.hybrid_search(options).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].memory.id, "a0");
}

#[tokio::test]
async fn test_hybrid_search_ignores_pagination_with_embedding() {
    let backend = create_backend().await;
    for i in 0..4 {
        backend
            .store(embedded(&format!("m{}", i), "A", vec![1.0, i as f32, 0.0]))
            .await
            .unwrap();
    }

    let query = MemoryQuery::new()
        .with_limit(1)
        .with_offset(10)
        .ordered_by(OrderBy::Timestamp);
    let options = HybridSearchOptions::new(query)
        .with_embedding(vec![1.0, 0.0, 0.0])
        .with_k(4);
    assert_eq!(backend.hybrid_search(options).await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_stats() {
    let backend = create_backend().await;
    for i in 0..3 {
        backend
            .store(embedded(&format!("e{}", i), "A", vec![1.0, 0.0, 0.0]))
            .await
            .unwrap();
    }
    for i in 0..2 {
        let mut memory = plain(&format!("p{}", i), "A");
        memory.memory_type = "plan".to_string();
        backend.store(memory).await.unwrap();
    }

    let stats = backend.stats();
    assert_eq!(stats.total_memories, 5);
    assert_eq!(stats.vectorized, 3);
    assert_eq!(stats.by_agent.get("A"), Some(&5));
    assert_eq!(stats.by_type.get("observation"), Some(&3));
    assert_eq!(stats.by_type.get("plan"), Some(&2));
    assert_eq!(stats.avg_similarity, 0.0);
}

#[tokio::test]
async fn test_clear_agent_fans_out() {
    let backend = create_backend().await;
    backend.store(embedded("a1", "A", vec![1.0, 0.0, 0.0])).await.unwrap();
    backend.store(plain("a2", "A")).await.unwrap();
    backend.store(embedded("b1", "B", vec![1.0, 0.0, 0.0])).await.unwrap();

    backend.clear_agent("A").await.unwrap();

    assert!(backend.query(MemoryQuery::new().agent("A")).await.unwrap().is_empty());
    assert_eq!(backend.query(MemoryQuery::new().agent("B")).await.unwrap().len(), 1);
    assert_eq!(backend.vector_backend().count(), 1);
}

#[tokio::test]
async fn test_stats_on_empty_backend() {
    let backend = create_backend().await;
    assert_eq!(backend.stats(), MemoryStats::default());
}

//! On-disk collection format and brute-force cosine search

use serde::Deserialize;
use serde::Serialize;

use crate::embeddings::cosine_similarity;
use crate::models::FaqEntry;

pub const DISTANCE_COSINE: &str = "cosine";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqMetadata {
    pub question: String,
    pub answer: String,
}

/// One persisted row: id, embedded document, metadata and the vector itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRow {
    pub id: String,
    pub document: String,
    pub metadata: FaqMetadata,
    pub embedding: Vec<f32>,
}

impl StoredRow {
    pub fn to_entry(&self) -> FaqEntry {
        FaqEntry {
            id: self.id.clone(),
            question: self.metadata.question.clone(),
            answer: self.metadata.answer.clone(),
        }
    }
}

/// A stored entry together with its cosine distance to the query
#[derive(Debug, Clone)]
pub struct ScoredEntry {
    pub entry: FaqEntry,
    pub distance: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    pub distance: String,
    pub embedding_model: String,
    pub dimension: usize,
    /// Next sequential id; never reused, so ids stay unique across duplicate ingestion
    pub next_id: u64,
    pub rows: Vec<StoredRow>,
}

impl Collection {
    pub fn new(name: &str, embedding_model: &str, dimension: usize) -> Self {
        Self {
            name: name.to_string(),
            distance: DISTANCE_COSINE.to_string(),
            embedding_model: embedding_model.to_string(),
            dimension,
            next_id: 0,
            rows: Vec::new(),
        }
    }

    pub fn allocate_id(&mut self) -> String {
        let id = format!("faq_{}", self.next_id);
        self.next_id += 1;
        id
    }

    /// Rows ranked by ascending cosine distance. Ties keep insertion order, so an
    /// all-zero query vector yields the first `limit` rows.
    pub fn nearest(&self, query: &[f32], limit: usize) -> Vec<ScoredEntry> {
        let mut scored: Vec<(usize, f32)> = self
            .rows
            .iter()
            .enumerate()
            .map(|(idx, row)| (idx, 1.0 - cosine_similarity(query, &row.embedding)))
            .collect();

        scored.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        scored.truncate(limit);

        scored
            .into_iter()
            .map(|(idx, distance)| ScoredEntry {
                entry: self.rows[idx].to_entry(),
                distance,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(collection: &mut Collection, question: &str, embedding: Vec<f32>) {
        let id = collection.allocate_id();
        collection.rows.push(StoredRow {
            id,
            document: format!("Q: {question} A: answer"),
            metadata: FaqMetadata {
                question: question.to_string(),
                answer: "answer".to_string(),
            },
            embedding,
        });
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut collection = Collection::new("faq_collection", "m", 2);
        assert_eq!(collection.allocate_id(), "faq_0");
        assert_eq!(collection.allocate_id(), "faq_1");
        assert_eq!(collection.next_id, 2);
    }

    #[test]
    fn test_nearest_orders_by_distance() {
        let mut collection = Collection::new("faq_collection", "m", 2);
        row(&mut collection, "far", vec![0.0, 1.0]);
        row(&mut collection, "near", vec![1.0, 0.1]);
        row(&mut collection, "exact", vec![1.0, 0.0]);

        let results = collection.nearest(&[1.0, 0.0], 2);
        let questions: Vec<&str> = results.iter().map(|r| r.entry.question.as_str()).collect();

        assert_eq!(questions, vec!["exact", "near"]);
        assert!(results[0].distance <= results[1].distance);
    }

    #[test]
    fn test_zero_query_returns_insertion_order() {
        let mut collection = Collection::new("faq_collection", "m", 2);
        row(&mut collection, "first", vec![0.0, 1.0]);
        row(&mut collection, "second", vec![1.0, 0.0]);
        row(&mut collection, "third", vec![1.0, 1.0]);

        let results = collection.nearest(&[0.0, 0.0], 10);
        let ids: Vec<&str> = results.iter().map(|r| r.entry.id.as_str()).collect();

        assert_eq!(ids, vec!["faq_0", "faq_1", "faq_2"]);
    }

    #[test]
    fn test_nearest_on_empty_collection() {
        let collection = Collection::new("faq_collection", "m", 2);
        assert!(collection.nearest(&[1.0, 0.0], 3).is_empty());
    }
}

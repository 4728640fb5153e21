//! Persistent FAQ vector store
//!
//! The whole collection lives in one JSON file and is held in memory behind a
//! read/write lock. Queries only take the read lock, so any number of them can
//! run concurrently; ingestion and clearing are serialized by a separate write
//! guard that also covers persisting the file.

pub mod collection;

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;

use tokio::sync::Mutex;
use tracing::debug;
use tracing::info;

pub use collection::FaqMetadata;
pub use collection::ScoredEntry;
pub use collection::StoredRow;

use self::collection::Collection;
use self::collection::DISTANCE_COSINE;
use crate::embeddings::Embedder;
use crate::errors::FaqRagError;
use crate::errors::Result;
use crate::models::FaqEntry;
use crate::models::NewFaqEntry;
use crate::models::RetrievedMatch;

pub struct VectorStore {
    path: PathBuf,
    embedder: Arc<dyn Embedder>,
    collection: RwLock<Collection>,
    write_guard: Mutex<()>,
}

impl VectorStore {
    /// Open the collection at `path`, creating an empty one when the file does not exist
    ///
    /// # Errors
    /// - Unreadable or corrupt collection file
    /// - Collection built with a different embedding model or dimension
    /// - Parent directory cannot be created or the file cannot be written
    pub async fn open(
        path: impl AsRef<Path>,
        name: &str,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let collection = if tokio::fs::try_exists(&path).await? {
            let content = tokio::fs::read_to_string(&path).await?;
            let collection: Collection = serde_json::from_str(&content)?;
            Self::check_compatible(&collection, embedder.as_ref())?;
            info!(
                "Opened collection '{}' at {} with {} entries",
                collection.name,
                path.display(),
                collection.rows.len()
            );
            collection
        } else {
            let collection = Collection::new(name, embedder.model_name(), embedder.dimension());
            write_collection(&path, &collection).await?;
            info!("Created empty collection '{}' at {}", name, path.display());
            collection
        };

        Ok(Self {
            path,
            embedder,
            collection: RwLock::new(collection),
            write_guard: Mutex::new(()),
        })
    }

    fn check_compatible(collection: &Collection, embedder: &dyn Embedder) -> Result<()> {
        if collection.distance != DISTANCE_COSINE {
            return Err(FaqRagError::StoreError(format!(
                "Unsupported distance '{}', expected '{DISTANCE_COSINE}'",
                collection.distance
            )));
        }
        if collection.dimension != embedder.dimension()
            || collection.embedding_model != embedder.model_name()
        {
            return Err(FaqRagError::StoreError(format!(
                "Collection was built with {} ({} dims) but the configured embedder is {} ({} dims); clear and re-ingest",
                collection.embedding_model,
                collection.dimension,
                embedder.model_name(),
                embedder.dimension()
            )));
        }
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Collection>> {
        self.collection
            .read()
            .map_err(|_| FaqRagError::StoreError("collection lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Collection>> {
        self.collection
            .write()
            .map_err(|_| FaqRagError::StoreError("collection lock poisoned".to_string()))
    }

    /// Embed and append entries. Re-ingesting the same entries appends duplicate
    /// rows with fresh ids; call [`VectorStore::clear`] first for a clean reload.
    pub async fn ingest(&self, entries: &[NewFaqEntry]) -> Result<Vec<FaqEntry>> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let documents: Vec<String> = entries.iter().map(NewFaqEntry::document_text).collect();
        let embeddings = self.embedder.embed_batch(&documents).await?;
        if embeddings.len() != entries.len() {
            return Err(FaqRagError::EmbeddingError(format!(
                "Expected {} embeddings, got {}",
                entries.len(),
                embeddings.len()
            )));
        }

        let _guard = self.write_guard.lock().await;
        let mut next = self.read()?.clone();
        let mut ingested = Vec::with_capacity(entries.len());
        for ((entry, document), embedding) in entries.iter().zip(documents).zip(embeddings) {
            let id = next.allocate_id();
            ingested.push(FaqEntry {
                id: id.clone(),
                question: entry.question.clone(),
                answer: entry.answer.clone(),
            });
            next.rows.push(StoredRow {
                id,
                document,
                metadata: FaqMetadata {
                    question: entry.question.clone(),
                    answer: entry.answer.clone(),
                },
                embedding,
            });
        }

        // Readers only see the new rows once they are on disk
        write_collection(&self.path, &next).await?;
        let name = next.name.clone();
        *self.write()? = next;

        info!("Added {} FAQ entries to {}", ingested.len(), name);
        Ok(ingested)
    }

    /// Up to `limit` entries ranked by cosine distance to `text`, closest first
    pub async fn query_with_scores(&self, text: &str, limit: usize) -> Result<Vec<ScoredEntry>> {
        if limit == 0 || self.count()? == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(text).await?;
        let results = self.read()?.nearest(&query_embedding, limit);
        debug!("Query matched {} entries (limit {})", results.len(), limit);
        Ok(results)
    }

    /// Up to `limit` matches, most similar first; empty when the store is empty
    pub async fn query(&self, text: &str, limit: usize) -> Result<Vec<RetrievedMatch>> {
        Ok(self
            .query_with_scores(text, limit)
            .await?
            .iter()
            .map(|scored| RetrievedMatch::from(&scored.entry))
            .collect())
    }

    /// Number of stored rows, duplicates included
    pub fn count(&self) -> Result<usize> {
        Ok(self.read()?.rows.len())
    }

    /// All stored entries in insertion order
    pub fn entries(&self) -> Result<Vec<FaqEntry>> {
        Ok(self.read()?.rows.iter().map(StoredRow::to_entry).collect())
    }

    /// Remove every row. Ids keep counting up so they are never reused.
    pub async fn clear(&self) -> Result<usize> {
        let _guard = self.write_guard.lock().await;
        let mut next = self.read()?.clone();
        let removed = next.rows.len();
        next.rows.clear();

        write_collection(&self.path, &next).await?;
        let name = next.name.clone();
        *self.write()? = next;

        info!("Cleared {} entries from {}", removed, name);
        Ok(removed)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Write through a temporary file so a crash never leaves a half-written collection
async fn write_collection(path: &Path, collection: &Collection) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let data = serde_json::to_vec(collection)?;
    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, data).await?;
    tokio::fs::rename(&tmp_path, path).await?;
    Ok(())
}

//! Block repository contracts and document-store implementation.
//!
//! # Responsibility
//! - Provide typed CRUD over the `blocks` collection.
//! - Provide substring search over block `content`.

use crate::model::block::{Block, BlockId};
use crate::repo::{RepoError, RepoResult};
use crate::store::{Document, DocumentStore};

/// Collection holding block documents.
pub const BLOCKS_COLLECTION: &str = "blocks";

const CONTENT_FIELD: &str = "content";

/// Repository interface for block CRUD operations.
pub trait BlockRepository {
    fn get_block(&self, id: BlockId) -> RepoResult<Option<Block>>;
    /// Every block in the store, in insertion order.
    fn list_blocks(&self) -> RepoResult<Vec<Block>>;
    /// Blocks whose `content` contains `text` (store default comparison).
    fn search_blocks(&self, text: &str) -> RepoResult<Vec<Block>>;
    fn insert_block(&self, block: &Block) -> RepoResult<()>;
    fn update_block(&self, block: &Block) -> RepoResult<bool>;
    fn delete_block(&self, id: BlockId) -> RepoResult<bool>;
}

/// Block repository borrowing a shared document store.
pub struct DocumentBlockRepository<'s> {
    store: &'s DocumentStore,
}

impl<'s> DocumentBlockRepository<'s> {
    pub fn new(store: &'s DocumentStore) -> Self {
        Self { store }
    }
}

impl BlockRepository for DocumentBlockRepository<'_> {
    fn get_block(&self, id: BlockId) -> RepoResult<Option<Block>> {
        match self.store.get(BLOCKS_COLLECTION, &id.to_string())? {
            Some(document) => Ok(Some(block_from_document(&document)?)),
            None => Ok(None),
        }
    }

    fn list_blocks(&self) -> RepoResult<Vec<Block>> {
        self.store
            .find_all(BLOCKS_COLLECTION)
            .map(|document| block_from_document(&document?))
            .collect()
    }

    fn search_blocks(&self, text: &str) -> RepoResult<Vec<Block>> {
        self.store
            .find_containing(BLOCKS_COLLECTION, CONTENT_FIELD, text)
            .map(|document| block_from_document(&document?))
            .collect()
    }

    fn insert_block(&self, block: &Block) -> RepoResult<()> {
        let document = Document::from_entity(block)?;
        self.store.insert(BLOCKS_COLLECTION, &document)?;
        Ok(())
    }

    fn update_block(&self, block: &Block) -> RepoResult<bool> {
        let document = Document::from_entity(block)?;
        Ok(self.store.update(BLOCKS_COLLECTION, &document)?)
    }

    fn delete_block(&self, id: BlockId) -> RepoResult<bool> {
        Ok(self.store.delete(BLOCKS_COLLECTION, &id.to_string())?)
    }
}

fn block_from_document(document: &Document) -> RepoResult<Block> {
    document
        .to_entity::<Block>()
        .map_err(|err| RepoError::Mapping {
            collection: BLOCKS_COLLECTION,
            id: document.id().to_string(),
            message: err.to_string(),
        })
}

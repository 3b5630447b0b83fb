//! Block domain model.
//!
//! # Responsibility
//! - Define the content item shared by text, checklist and header rows.
//! - Provide default construction per variant.
//!
//! # Invariants
//! - `id`, `created_at` and `kind` are fixed at construction.
//! - `is_checked` is present exactly for `Checkbox` and `Header` blocks.
//! - `order` is only meaningful relative to other blocks loaded for the same
//!   section; it is not unique across the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every block.
pub type BlockId = Uuid;

/// Section used when the caller has not picked one.
pub const DEFAULT_SECTION: &str = "Notes";

/// Variant tag for a block, serialized as `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Free text paragraph.
    Text,
    /// Checklist entry.
    Checkbox,
    /// Section header that can also be ticked off.
    Header,
}

impl BlockKind {
    /// Content a freshly added block starts with.
    pub fn default_content(self) -> &'static str {
        match self {
            Self::Text => "New Text",
            Self::Checkbox => "New Todo",
            Self::Header => "New Header",
        }
    }

    /// Whether this variant carries the `isChecked` flag.
    pub fn is_checkable(self) -> bool {
        matches!(self, Self::Checkbox | Self::Header)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Checkbox => "Checkbox",
            Self::Header => "Header",
        }
    }
}

impl Display for BlockKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape errors for block variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockValidationError {
    /// Checkbox/Header block without a checked flag.
    MissingCheckedFlag { id: BlockId, kind: BlockKind },
    /// Text block carrying a checked flag.
    UnexpectedCheckedFlag { id: BlockId },
}

impl Display for BlockValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCheckedFlag { id, kind } => {
                write!(f, "{kind} block {id} must carry isChecked")
            }
            Self::UnexpectedCheckedFlag { id } => {
                write!(f, "Text block {id} must not carry isChecked")
            }
        }
    }
}

impl Error for BlockValidationError {}

/// One content item belonging to a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    #[serde(rename = "_id")]
    id: BlockId,
    created_at: DateTime<Utc>,
    #[serde(rename = "type")]
    kind: BlockKind,
    /// Owning section name.
    pub section: String,
    /// Display position within the section.
    pub order: i64,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_checked: Option<bool>,
}

impl Block {
    /// Creates a block of `kind` with its default content and a fresh id.
    pub fn new(kind: BlockKind, section: impl Into<String>, order: i64) -> Self {
        Self::with_id(Uuid::new_v4(), Utc::now(), kind, section, order)
    }

    /// Creates a block with caller-provided identity.
    ///
    /// Used where identity already exists, such as tests and fixtures.
    pub fn with_id(
        id: BlockId,
        created_at: DateTime<Utc>,
        kind: BlockKind,
        section: impl Into<String>,
        order: i64,
    ) -> Self {
        Self {
            id,
            created_at,
            kind,
            section: section.into(),
            order,
            content: kind.default_content().to_string(),
            is_checked: kind.is_checkable().then_some(false),
        }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    /// Checks the variant-specific field shape.
    pub fn validate(&self) -> Result<(), BlockValidationError> {
        match (self.kind.is_checkable(), self.is_checked) {
            (true, None) => Err(BlockValidationError::MissingCheckedFlag {
                id: self.id,
                kind: self.kind,
            }),
            (false, Some(_)) => Err(BlockValidationError::UnexpectedCheckedFlag { id: self.id }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Block, BlockKind, BlockValidationError};
    use serde_json::json;

    #[test]
    fn new_blocks_get_variant_defaults() {
        let text = Block::new(BlockKind::Text, "Notes", 0);
        assert_eq!(text.content, "New Text");
        assert_eq!(text.is_checked, None);

        let todo = Block::new(BlockKind::Checkbox, "Notes", 1);
        assert_eq!(todo.content, "New Todo");
        assert_eq!(todo.is_checked, Some(false));

        let header = Block::new(BlockKind::Header, "Work", 2);
        assert_eq!(header.content, "New Header");
        assert_eq!(header.is_checked, Some(false));
        assert_eq!(header.section, "Work");
    }

    #[test]
    fn serializes_with_document_keys() {
        let block = Block::new(BlockKind::Checkbox, "Notes", 3);
        let value = serde_json::to_value(&block).unwrap();

        assert_eq!(value["_id"], json!(block.id().to_string()));
        assert_eq!(value["type"], json!("Checkbox"));
        assert_eq!(value["order"], json!(3));
        assert_eq!(value["isChecked"], json!(false));
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn text_block_omits_checked_flag() {
        let block = Block::new(BlockKind::Text, "Notes", 0);
        let value = serde_json::to_value(&block).unwrap();
        assert!(value.get("isChecked").is_none());
    }

    #[test]
    fn validate_rejects_mismatched_checked_flag() {
        let mut text = Block::new(BlockKind::Text, "Notes", 0);
        text.is_checked = Some(true);
        assert!(matches!(
            text.validate(),
            Err(BlockValidationError::UnexpectedCheckedFlag { .. })
        ));

        let mut todo = Block::new(BlockKind::Checkbox, "Notes", 0);
        todo.is_checked = None;
        assert!(matches!(
            todo.validate(),
            Err(BlockValidationError::MissingCheckedFlag { .. })
        ));
    }
}

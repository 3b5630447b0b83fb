//! Workspace engine: the section-scoped window of blocks.
//!
//! # Responsibility
//! - Hold the loaded, capped window of blocks for the active section.
//! - Apply search filtering and reordering to that window.
//! - Persist every block mutation immediately and drive streak updates.
//!
//! # Invariants
//! - Every mutation updates the window and the store in the same call; there
//!   is no deferred save and no change subscription.
//! - After `move_block`, window orders are exactly `0..len` left to right.
//! - A new block gets `max(order in window) + 1`, or `0` for an empty window.
//! - Orders are only renumbered within the window, never across the whole
//!   section.

use crate::config::WorkspaceOptions;
use crate::model::block::{Block, BlockId, BlockKind, BlockValidationError};
use crate::model::stats::ActivityStats;
use crate::repo::block_repo::{BlockRepository, DocumentBlockRepository};
use crate::repo::stats_repo::{DocumentStatsRepository, StatsRepository};
use crate::repo::RepoError;
use crate::service::streak::{apply_activity, streak_label, Clock, StreakUpdate};
use crate::store::{DocumentStore, StoreError};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;

/// Errors from workspace engine operations.
#[derive(Debug)]
pub enum WorkspaceError {
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Block shape does not match its variant.
    Validation(BlockValidationError),
    /// Target block is not part of the loaded window.
    BlockNotLoaded(BlockId),
    /// Checked flag requested on a variant without one.
    NotCheckable(BlockId),
    /// Move index outside the loaded window.
    IndexOutOfRange { index: usize, len: usize },
    /// No order is left after the highest one in the window.
    OrderOverflow { max: i64 },
}

impl Display for WorkspaceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::BlockNotLoaded(id) => write!(f, "block not loaded: {id}"),
            Self::NotCheckable(id) => write!(f, "block cannot be checked: {id}"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for {len} loaded blocks")
            }
            Self::OrderOverflow { max } => write!(f, "no order left after {max}"),
        }
    }
}

impl Error for WorkspaceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for WorkspaceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<StoreError> for WorkspaceError {
    fn from(value: StoreError) -> Self {
        Self::Repo(RepoError::Store(value))
    }
}

impl From<BlockValidationError> for WorkspaceError {
    fn from(value: BlockValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Section-scoped workspace over one document store.
pub struct WorkspaceService {
    store: DocumentStore,
    clock: Box<dyn Clock>,
    options: WorkspaceOptions,
    section: String,
    search_text: String,
    window: Vec<Block>,
    stats: ActivityStats,
}

impl WorkspaceService {
    /// Loads (or creates) the stats record and the initial section window.
    pub fn open(
        store: DocumentStore,
        clock: Box<dyn Clock>,
        options: WorkspaceOptions,
    ) -> WorkspaceResult<Self> {
        let stats = DocumentStatsRepository::new(&store).get_stats()?;
        let section = options.initial_section.clone();
        let mut service = Self {
            store,
            clock,
            options,
            section,
            search_text: String::new(),
            window: Vec::new(),
            stats,
        };
        service.load_section()?;

        info!(
            "event=workspace_open module=workspace status=ok loaded={} streak={}",
            service.window.len(),
            service.stats.current_streak
        );
        Ok(service)
    }

    /// Blocks currently materialized, in display order.
    pub fn blocks(&self) -> &[Block] {
        &self.window
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.window.iter().find(|block| block.id() == id)
    }

    pub fn current_section(&self) -> &str {
        &self.section
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn stats(&self) -> &ActivityStats {
        &self.stats
    }

    pub fn streak_label(&self) -> String {
        streak_label(&self.stats)
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Switches the active section and reloads its window.
    ///
    /// Selecting the section that is already active does nothing.
    pub fn set_section(&mut self, name: impl Into<String>) -> WorkspaceResult<()> {
        let name = name.into();
        if name == self.section {
            return Ok(());
        }
        self.section = name;
        self.load_section()
    }

    /// Replaces the window with the first `load_cap` blocks of the active
    /// section, ordered by `order`.
    pub fn load_section(&mut self) -> WorkspaceResult<()> {
        let repo = DocumentBlockRepository::new(&self.store);
        let mut blocks = repo
            .list_blocks()?
            .into_iter()
            .filter(|block| block.section == self.section)
            .collect::<Vec<_>>();
        sort_for_display(&mut blocks);
        let total = blocks.len();
        blocks.truncate(self.options.load_cap);

        debug!(
            "event=section_load module=workspace status=ok total={} loaded={}",
            total,
            blocks.len()
        );
        self.window = blocks;
        Ok(())
    }

    /// Filters the window by block content.
    ///
    /// Blank (or whitespace-only) text is no filter and reloads the section.
    /// The stored text changes only when the new window was loaded.
    pub fn set_search_text(&mut self, text: impl Into<String>) -> WorkspaceResult<()> {
        let text = text.into();
        if text.trim().is_empty() {
            self.load_section()?;
            self.search_text = text;
            return Ok(());
        }

        let repo = DocumentBlockRepository::new(&self.store);
        let mut blocks = repo
            .search_blocks(&text)?
            .into_iter()
            .filter(|block| block.section == self.section)
            .collect::<Vec<_>>();
        sort_for_display(&mut blocks);

        debug!(
            "event=section_search module=workspace status=ok hits={}",
            blocks.len()
        );
        self.window = blocks;
        self.search_text = text;
        Ok(())
    }

    /// Appends a new block of `kind` to the active section.
    ///
    /// Once the block is stored the call succeeds; a failed streak write is
    /// logged and left for the next activity.
    pub fn add_block(&mut self, kind: BlockKind) -> WorkspaceResult<Block> {
        let order = match self.window.iter().map(|block| block.order).max() {
            None => 0,
            Some(max) => max
                .checked_add(1)
                .ok_or(WorkspaceError::OrderOverflow { max })?,
        };
        let block = Block::new(kind, self.section.clone(), order);
        block.validate()?;

        DocumentBlockRepository::new(&self.store).insert_block(&block)?;
        self.window.push(block.clone());
        if let Err(err) = self.record_activity() {
            warn!(
                "event=streak_update module=workspace status=error op=add error={}",
                err
            );
        }

        info!(
            "event=block_add module=workspace status=ok kind={} order={}",
            kind, order
        );
        Ok(block)
    }

    /// Deletes a block from the store and the window.
    ///
    /// Returns whether the store held the block; a missing id is not an error.
    pub fn delete_block(&mut self, id: BlockId) -> WorkspaceResult<bool> {
        let existed = DocumentBlockRepository::new(&self.store).delete_block(id)?;
        self.window.retain(|block| block.id() != id);

        info!(
            "event=block_delete module=workspace status=ok existed={}",
            existed
        );
        Ok(existed)
    }

    /// Moves the block at `from` to `to` and renumbers the window.
    pub fn move_block(&mut self, from: usize, to: usize) -> WorkspaceResult<()> {
        let len = self.window.len();
        for index in [from, to] {
            if index >= len {
                return Err(WorkspaceError::IndexOutOfRange { index, len });
            }
        }

        let moved = self.window.remove(from);
        self.window.insert(to, moved);

        let repo = DocumentBlockRepository::new(&self.store);
        let mut renumbered = 0_usize;
        for (index, block) in self.window.iter_mut().enumerate() {
            let order = index as i64;
            if block.order == order {
                continue;
            }
            block.order = order;
            if !repo.update_block(block)? {
                warn!("event=block_update module=workspace status=missing op=move");
            }
            renumbered += 1;
        }

        if renumbered > 0 {
            self.record_activity()?;
        }

        info!(
            "event=block_move module=workspace status=ok from={} to={} renumbered={}",
            from, to, renumbered
        );
        Ok(())
    }

    /// Replaces the content of a loaded block and saves it.
    pub fn update_block_content(
        &mut self,
        id: BlockId,
        content: impl Into<String>,
    ) -> WorkspaceResult<()> {
        let content = content.into();
        let repo = DocumentBlockRepository::new(&self.store);
        let block = self
            .window
            .iter_mut()
            .find(|block| block.id() == id)
            .ok_or(WorkspaceError::BlockNotLoaded(id))?;
        if block.content == content {
            return Ok(());
        }

        block.content = content;
        if !repo.update_block(block)? {
            warn!("event=block_update module=workspace status=missing op=content");
        }
        self.record_activity()?;
        Ok(())
    }

    /// Sets the checked flag of a loaded Checkbox or Header block and saves it.
    pub fn set_block_checked(&mut self, id: BlockId, checked: bool) -> WorkspaceResult<()> {
        let repo = DocumentBlockRepository::new(&self.store);
        let block = self
            .window
            .iter_mut()
            .find(|block| block.id() == id)
            .ok_or(WorkspaceError::BlockNotLoaded(id))?;
        if !block.kind().is_checkable() {
            return Err(WorkspaceError::NotCheckable(id));
        }
        if block.is_checked == Some(checked) {
            return Ok(());
        }

        block.is_checked = Some(checked);
        if !repo.update_block(block)? {
            warn!("event=block_update module=workspace status=missing op=checked");
        }
        self.record_activity()?;
        Ok(())
    }

    /// In-memory stats change only after the store accepted them.
    fn record_activity(&mut self) -> WorkspaceResult<StreakUpdate> {
        let mut next = self.stats.clone();
        let update = apply_activity(&mut next, self.clock.today());
        if !update.changed() {
            return Ok(update);
        }

        let repo = DocumentStatsRepository::new(&self.store);
        if !repo.update_stats(&next)? {
            repo.insert_stats(&next)?;
        }
        self.stats = next;

        info!(
            "event=streak_update module=workspace status=ok outcome={:?} current={} longest={}",
            update, self.stats.current_streak, self.stats.longest_streak
        );
        Ok(update)
    }
}

fn sort_for_display(blocks: &mut [Block]) {
    blocks.sort_by(|a, b| {
        a.order
            .cmp(&b.order)
            .then_with(|| a.created_at().cmp(&b.created_at()))
    });
}

//! Domain model for workspace blocks and activity statistics.
//!
//! # Responsibility
//! - Define the canonical entities persisted in the document store.
//! - Fix their document shape (`_id`, camelCase keys, `type` tag).
//!
//! # Invariants
//! - Every block is identified by a stable `BlockId` that is never reused.
//! - Exactly one `ActivityStats` record exists per store once accessed.

pub mod block;
pub mod stats;

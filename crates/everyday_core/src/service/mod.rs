//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into workspace-level commands.
//! - Own the open/ready lifecycle of the workspace.
//! - Keep UI layers decoupled from storage details.

pub mod bootstrap;
pub mod streak;
pub mod workspace_service;

//! Operations modules for the vkcomments CLI.
//!
//! Each module implements one stage of the export pipeline with a consistent
//! structure: pure helpers that are unit-testable without a network, plus the
//! async functions that drive them against the VK API.

pub mod collect;
pub mod comments;
pub mod export;

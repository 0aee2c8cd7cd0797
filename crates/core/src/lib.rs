//! Domain engine for the praxis milestone platform.
//!
//! Pure, synchronous, storage-free logic: every operation takes a snapshot
//! of a milestone (or one of its sub-collections) and returns a new one.
//! Persistence, transport, authentication, and clocks belong to the calling
//! crates; everything here completes in-memory and never blocks.

pub mod checkpoint;
pub mod error;
pub mod lifecycle;
pub mod milestone;
pub mod rubric;
pub mod signoff;
pub mod types;
pub mod validation;

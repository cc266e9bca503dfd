//! # epstat-core: Foundational Types for Episode Log Analysis
//!
//! This crate defines the primitives every epstat analysis builds on.
//! It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalKey` for action identity.** Duplicate detection never
//!    compares raw JSON text; every action flows through
//!    `CanonicalKey::from_value()`, which is insensitive to object member
//!    order and sensitive to array order.
//!
//! 2. **One outcome rule.** `Outcome::classify()` is the single definition
//!    of win/loss. Episodes without actions are `NoAction` and never count
//!    as losses.
//!
//! 3. **Per-line failures are data.** The JSONL scanner returns parse
//!    failures as `LineError` values next to the parsed records instead of
//!    aborting.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `epstat-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod config;
pub mod episode;
pub mod error;
pub mod jsonl;
pub mod outcome;
pub mod repetition;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalKey;
pub use config::AnalysisConfig;
pub use episode::{action_type, state_list_len, Episode, Trajectory};
pub use error::{CanonicalizationError, EpstatError, LineError, LineErrorKind};
pub use jsonl::{scan_file, JsonlRecord, JsonlScan};
pub use outcome::{LossKind, Outcome, Termination, DEFAULT_WIN_THRESHOLD};
pub use repetition::{ActionCounter, RepetitionStats};

//! # epstat-report: Episode Log Analyses
//!
//! One module per analysis, all fed by the shared loader:
//!
//! - **Count** (`count.rs`): per-file inventory with breakdowns by agent,
//!   role, end reason, outcome and final action.
//!
//! - **Summary** (`summary.rs`): win rate and step/reward statistics, with
//!   losses split into step-limit and invalid-action losses.
//!
//! - **Repeats** (`repeats.rs`): repeated-action statistics per episode and
//!   per outcome group, CSV export, histogram and box-plot data.
//!
//! - **Schema** (`schema.rs`): dotted-path type inference over a sample of
//!   records.
//!
//! - **Terminations** (`terminations.rs`): early terminations and short
//!   losses.
//!
//! - **Investigate** (`investigate.rs`): raw deep dive of chosen episodes.
//!
//! - **Outcomes** (`outcomes.rs`): `network,episode,outcome` CSV export
//!   from episode result files.
//!
//! Every analysis returns a report value; text rendering is a separate
//! function so the CLI can choose between text and JSON.
//!
//! ## Crate Policy
//!
//! - Depends only on `epstat-core` internally.
//! - No printing; renderers return `String`.
//! - Unreadable files and bad lines are logged with `tracing` and skipped.

pub mod count;
pub mod export;
pub mod format;
pub mod investigate;
pub mod loader;
pub mod outcomes;
pub mod repeats;
pub mod schema;
pub mod stats;
pub mod summary;
pub mod terminations;

pub use count::{count_episodes, CountReport};
pub use investigate::{investigate, EpisodeSelection};
pub use loader::{load_files, EpisodeSet, LoadedEpisode};
pub use outcomes::{collect_outcomes, ExportOutcome, OutcomeRow, OutcomeSource};
pub use repeats::{analyze_repeats, RepeatCsvRow, RepeatsReport};
pub use schema::{analyze_schema, SchemaReport};
pub use summary::{summarize, SummaryReport};
pub use terminations::{early_terminations, short_losses, EarlyTerminationReport, ShortLoss};

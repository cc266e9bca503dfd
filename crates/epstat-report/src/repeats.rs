//! # Repeated-Action Analysis
//!
//! Measures how often agents re-issue an identical action (type and
//! parameters) within one episode. Action identity is the
//! [`CanonicalKey`](epstat_core::CanonicalKey) of the action, so two
//! actions whose parameter objects list members in a different order are
//! the same action.
//!
//! Only episodes with actions take part. Results can be rendered as text,
//! exported as a per-episode CSV table, or reduced to histogram and
//! box-plot data.

use std::fmt::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use epstat_core::{ActionCounter, AnalysisConfig, EpstatError, Outcome, RepetitionStats};

use crate::export;
use crate::format;
use crate::loader::EpisodeSet;
use crate::stats::{histogram, mean, percent, FiveNumberSummary};

/// How many repeated actions `--detailed` lists per episode.
pub const TOP_REPEATED: usize = 3;

/// An action that occurred more than once in an episode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepeatedAction {
    /// Canonical JSON text of the action.
    pub action: String,
    /// Occurrences within the episode.
    pub count: usize,
}

/// Repetition figures for one episode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeRepeats {
    /// Source file path.
    pub file: String,
    /// 1-based line number.
    pub line: usize,
    /// `win` or `loss`.
    pub outcome: Outcome,
    /// Counts and percentage.
    #[serde(flatten)]
    pub stats: RepetitionStats,
    /// Most frequent repeated actions.
    pub top_repeated: Vec<RepeatedAction>,
}

/// Aggregates over a group of episodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupRepeats {
    /// Episodes in the group.
    pub episodes: usize,
    /// Mean distinct repeated actions.
    pub avg_distinct_repeated: f64,
    /// Mean total repetitions.
    pub avg_total_reps: f64,
    /// Mean repetition rate in percent.
    pub avg_repetition_rate_pct: f64,
    /// Fewest distinct repeated actions.
    pub min_distinct_repeated: usize,
    /// Most distinct repeated actions.
    pub max_distinct_repeated: usize,
    /// Fewest total repetitions.
    pub min_total_reps: usize,
    /// Most total repetitions.
    pub max_total_reps: usize,
    /// Lowest repetition rate.
    pub min_repetition_rate_pct: f64,
    /// Highest repetition rate.
    pub max_repetition_rate_pct: f64,
    /// Episodes without any repeated action.
    pub no_repeat_episodes: usize,
}

impl GroupRepeats {
    fn of<'a>(episodes: impl Iterator<Item = &'a EpisodeRepeats>) -> Self {
        let stats: Vec<&RepetitionStats> = episodes.map(|e| &e.stats).collect();
        if stats.is_empty() {
            return Self::default();
        }
        let distinct: Vec<f64> = stats.iter().map(|s| s.num_repeated_actions as f64).collect();
        let reps: Vec<f64> = stats.iter().map(|s| s.total_repetitions as f64).collect();
        let rates: Vec<f64> = stats.iter().map(|s| s.repeat_percentage).collect();
        Self {
            episodes: stats.len(),
            avg_distinct_repeated: mean(&distinct),
            avg_total_reps: mean(&reps),
            avg_repetition_rate_pct: mean(&rates),
            min_distinct_repeated: stats.iter().map(|s| s.num_repeated_actions).min().unwrap_or(0),
            max_distinct_repeated: stats.iter().map(|s| s.num_repeated_actions).max().unwrap_or(0),
            min_total_reps: stats.iter().map(|s| s.total_repetitions).min().unwrap_or(0),
            max_total_reps: stats.iter().map(|s| s.total_repetitions).max().unwrap_or(0),
            min_repetition_rate_pct: rates.iter().copied().fold(f64::INFINITY, f64::min),
            max_repetition_rate_pct: rates.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            no_repeat_episodes: stats.iter().filter(|s| s.num_repeated_actions == 0).count(),
        }
    }

    /// Share of episodes without repeats, in percent.
    pub fn no_repeat_pct(&self) -> f64 {
        percent(self.no_repeat_episodes, self.episodes)
    }
}

/// Group aggregates for all episodes, wins and losses.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RepeatsSummary {
    /// Episodes analyzed.
    pub total_episodes: usize,
    /// Winning episodes.
    pub wins: usize,
    /// Losing episodes.
    pub losses: usize,
    /// All episodes.
    pub all: GroupRepeats,
    /// Winning episodes only.
    pub win: GroupRepeats,
    /// Losing episodes only.
    pub loss: GroupRepeats,
}

/// Repetition analysis of a set of episodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RepeatsReport {
    /// Aggregates.
    pub summary: RepeatsSummary,
    /// One entry per analyzed episode, in input order.
    pub episode_details: Vec<EpisodeRepeats>,
}

impl RepeatsReport {
    /// True when no episode with actions was found.
    pub fn is_empty(&self) -> bool {
        self.episode_details.is_empty()
    }

    fn group(&self, outcome: Option<Outcome>) -> impl Iterator<Item = &EpisodeRepeats> {
        with_outcome(&self.episode_details, outcome)
    }

    /// `(group label, distinct repeated actions per episode)` for the
    /// all/wins/losses groups.
    pub fn distinct_repeated_by_group(&self) -> [(&'static str, Vec<f64>); 3] {
        let values = |outcome: Option<Outcome>| {
            self.group(outcome)
                .map(|e| e.stats.num_repeated_actions as f64)
                .collect::<Vec<_>>()
        };
        [
            ("all", values(None)),
            ("wins", values(Some(Outcome::Win))),
            ("losses", values(Some(Outcome::Loss))),
        ]
    }
}

fn with_outcome(
    details: &[EpisodeRepeats],
    outcome: Option<Outcome>,
) -> impl Iterator<Item = &EpisodeRepeats> {
    details
        .iter()
        .filter(move |e| outcome.map_or(true, |o| e.outcome == o))
}

/// Analyze repeated actions of every episode with actions.
pub fn analyze_repeats(set: &EpisodeSet, config: &AnalysisConfig) -> RepeatsReport {
    let mut details = Vec::new();
    for loaded in set.episodes() {
        let episode = &loaded.episode;
        let outcome = Outcome::classify(episode, config.win_threshold);
        if outcome == Outcome::NoAction {
            continue;
        }
        let counter = ActionCounter::from_actions(&episode.trajectory.actions);
        let top_repeated = counter
            .most_repeated(TOP_REPEATED)
            .into_iter()
            .map(|(key, count)| RepeatedAction {
                action: key.to_canonical_string().unwrap_or_else(|e| {
                    tracing::warn!(file = %loaded.file.display(), line = loaded.line, "{e}");
                    key.to_string()
                }),
                count,
            })
            .collect();
        details.push(EpisodeRepeats {
            file: loaded.file.display().to_string(),
            line: loaded.line,
            outcome,
            stats: counter.stats(),
            top_repeated,
        });
    }

    let summary = RepeatsSummary {
        total_episodes: details.len(),
        wins: with_outcome(&details, Some(Outcome::Win)).count(),
        losses: with_outcome(&details, Some(Outcome::Loss)).count(),
        all: GroupRepeats::of(with_outcome(&details, None)),
        win: GroupRepeats::of(with_outcome(&details, Some(Outcome::Win))),
        loss: GroupRepeats::of(with_outcome(&details, Some(Outcome::Loss))),
    };
    tracing::debug!(episodes = summary.total_episodes, "analyzed repeated actions");
    RepeatsReport {
        summary,
        episode_details: details,
    }
}

/// Summary text.
pub fn render_text(report: &RepeatsReport) -> String {
    let s = &report.summary;
    let mut out = String::new();
    format::banner(&mut out, "REPEATED ACTIONS ANALYSIS");
    let _ = writeln!(out, "Total Episodes Analyzed: {}", s.total_episodes);
    let _ = writeln!(out, "  Wins: {}", s.wins);
    let _ = writeln!(out, "  Losses: {}", s.losses);

    for (title, group) in [
        ("OVERALL STATISTICS", &s.all),
        ("WINNING EPISODES", &s.win),
        ("LOSING EPISODES", &s.loss),
    ] {
        format::section(&mut out, title);
        if group.episodes > 0 {
            group_lines(&mut out, group);
        }
    }
    format::closing_rule(&mut out);
    out
}

fn group_lines(out: &mut String, g: &GroupRepeats) {
    let _ = writeln!(out, "Avg Distinct Repeated Actions per Episode: {:.2}", g.avg_distinct_repeated);
    let _ = writeln!(out, "Avg Total Repetitions per Episode: {:.2}", g.avg_total_reps);
    let _ = writeln!(out, "Avg Repetition Rate: {:.1}%", g.avg_repetition_rate_pct);
    let _ = writeln!(out, "Min Distinct Repeated Actions: {}", g.min_distinct_repeated);
    let _ = writeln!(out, "Max Distinct Repeated Actions: {}", g.max_distinct_repeated);
    let _ = writeln!(out, "Min Total Repetitions: {}", g.min_total_reps);
    let _ = writeln!(out, "Max Total Repetitions: {}", g.max_total_reps);
    let _ = writeln!(out, "Min Repetition Rate: {:.1}%", g.min_repetition_rate_pct);
    let _ = writeln!(out, "Max Repetition Rate: {:.1}%", g.max_repetition_rate_pct);
    let _ = writeln!(
        out,
        "Episodes with No Repeated Actions: {} ({:.1}%)",
        g.no_repeat_episodes,
        g.no_repeat_pct()
    );
}

/// Per-episode text for `--detailed`.
pub fn render_detailed(report: &RepeatsReport) -> String {
    let mut out = String::new();
    format::banner(&mut out, "DETAILED EPISODE INFORMATION");
    for (i, ep) in report.episode_details.iter().enumerate() {
        let _ = writeln!(out, "Episode {} [{}]:", i + 1, ep.outcome.as_str().to_uppercase());
        let _ = writeln!(out, "  File: {}:{}", ep.file, ep.line);
        let _ = writeln!(out, "  Total Actions: {}", ep.stats.total_actions);
        let _ = writeln!(out, "  Unique Actions: {}", ep.stats.unique_actions);
        let _ = writeln!(out, "  Repeated Actions: {}", ep.stats.num_repeated_actions);
        let _ = writeln!(out, "  Total Repetitions: {}", ep.stats.total_repetitions);
        let _ = writeln!(out, "  Repeat Percentage: {:.1}%", ep.stats.repeat_percentage);
        if !ep.top_repeated.is_empty() {
            let _ = writeln!(out, "  Most Repeated:");
            for repeated in &ep.top_repeated {
                let _ = writeln!(
                    out,
                    "    {}x {}",
                    repeated.count,
                    format::truncate_chars(&repeated.action, 120)
                );
            }
        }
        out.push('\n');
    }
    out
}

/// One row of the per-episode CSV export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatCsvRow {
    /// 1-based position among analyzed episodes.
    pub episode: usize,
    /// `win` or `loss`.
    pub outcome: Outcome,
    /// Number of actions.
    pub total_actions: usize,
    /// Distinct actions.
    pub unique_actions: usize,
    /// Distinct actions occurring more than once.
    pub num_repeated_actions: usize,
    /// Extra occurrences.
    pub total_repetitions: usize,
    /// Repetition rate, rounded to 4 decimals.
    pub repeat_percentage: f64,
}

/// Rows of the per-episode CSV export.
pub fn csv_rows(report: &RepeatsReport) -> Vec<RepeatCsvRow> {
    report
        .episode_details
        .iter()
        .enumerate()
        .map(|(i, ep)| RepeatCsvRow {
            episode: i + 1,
            outcome: ep.outcome,
            total_actions: ep.stats.total_actions,
            unique_actions: ep.stats.unique_actions,
            num_repeated_actions: ep.stats.num_repeated_actions,
            total_repetitions: ep.stats.total_repetitions,
            repeat_percentage: round4(ep.stats.repeat_percentage),
        })
        .collect()
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Write the per-episode CSV table.
pub fn write_repeat_csv(path: &Path, report: &RepeatsReport) -> Result<(), EpstatError> {
    export::write_csv(path, &csv_rows(report))
}

/// Read a table written by [`write_repeat_csv`].
pub fn read_repeat_csv(path: &Path) -> Result<Vec<RepeatCsvRow>, EpstatError> {
    export::read_csv(path)
}

/// One histogram bin of distinct repeated actions per episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramRow {
    /// `all`, `wins` or `losses`.
    pub group: String,
    /// Lower bin edge.
    pub bin_start: f64,
    /// Upper bin edge.
    pub bin_end: f64,
    /// Episodes in the bin.
    pub count: usize,
}

/// Histogram data of distinct repeated actions per episode, per group.
/// Empty groups contribute no rows.
pub fn histogram_rows(report: &RepeatsReport, bins: usize) -> Vec<HistogramRow> {
    report
        .distinct_repeated_by_group()
        .into_iter()
        .flat_map(|(group, values)| {
            histogram(&values, bins)
                .into_iter()
                .map(move |bin| HistogramRow {
                    group: group.to_string(),
                    bin_start: bin.start,
                    bin_end: bin.end,
                    count: bin.count,
                })
        })
        .collect()
}

/// Box-plot data of distinct repeated actions per episode, per group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxplotRow {
    /// `all`, `wins` or `losses`.
    pub group: String,
    /// Sample size.
    pub n: usize,
    /// Smallest value.
    pub min: f64,
    /// First quartile.
    pub q1: f64,
    /// Median.
    pub median: f64,
    /// Third quartile.
    pub q3: f64,
    /// Largest value.
    pub max: f64,
    /// Mean.
    pub mean: f64,
}

/// Five-number summaries per non-empty group.
pub fn boxplot_rows(report: &RepeatsReport) -> Vec<BoxplotRow> {
    report
        .distinct_repeated_by_group()
        .into_iter()
        .filter_map(|(group, values)| {
            FiveNumberSummary::of(&values).map(|s| BoxplotRow {
                group: group.to_string(),
                n: s.n,
                min: s.min,
                q1: s.q1,
                median: s.median,
                q3: s.q3,
                max: s.max,
                mean: s.mean,
            })
        })
        .collect()
}

/// Write histogram data as CSV.
pub fn write_histogram_csv(path: &Path, report: &RepeatsReport, bins: usize) -> Result<(), EpstatError> {
    export::write_csv(path, &histogram_rows(report, bins))
}

/// Write box-plot data as CSV.
pub fn write_boxplot_csv(path: &Path, report: &RepeatsReport) -> Result<(), EpstatError> {
    export::write_csv(path, &boxplot_rows(report))
}

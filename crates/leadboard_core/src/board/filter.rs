//! Filter engine for board views.
//!
//! # Responsibility
//! - Derive a display-ready partition from a board plus a `FilterSpec`.
//! - Report pre/post filter counts for "X of Y" feedback.
//!
//! # Invariants
//! - Filtering never mutates the input board.
//! - Output keeps every column key of the input.
//! - Active predicates combine with logical AND.

use crate::board::store::LeadBoard;
use crate::model::lead::Lead;
use chrono::{DateTime, TimeZone, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Created-date window applied to leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRange {
    #[default]
    All,
    /// Calendar day of `now`, local midnight to local midnight.
    Today,
    /// Rolling 7 * 24h window.
    #[serde(rename = "last_7_days")]
    Last7Days,
    /// Rolling 30 * 24h window.
    #[serde(rename = "last_30_days")]
    Last30Days,
}

impl DateRange {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Today => "today",
            Self::Last7Days => "last_7_days",
            Self::Last30Days => "last_30_days",
        }
    }

    /// Accepted `created_at_ms` window: inclusive lower bound, exclusive upper bound.
    fn created_window<Tz: TimeZone>(self, now: &DateTime<Tz>) -> CreatedWindow {
        let now_ms = now.timestamp_millis();
        match self {
            Self::All => CreatedWindow::default(),
            Self::Today => {
                let start = start_of_day_ms(now);
                CreatedWindow {
                    from_ms: Some(start),
                    until_ms: Some(start_of_next_day_ms(now).unwrap_or(start + DAY_MS)),
                }
            }
            Self::Last7Days => CreatedWindow::since(now_ms - 7 * DAY_MS),
            Self::Last30Days => CreatedWindow::since(now_ms - 30 * DAY_MS),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct CreatedWindow {
    from_ms: Option<i64>,
    until_ms: Option<i64>,
}

impl CreatedWindow {
    fn since(from_ms: i64) -> Self {
        Self {
            from_ms: Some(from_ms),
            until_ms: None,
        }
    }

    fn contains(self, created_at_ms: i64) -> bool {
        self.from_ms.map_or(true, |from| created_at_ms >= from)
            && self.until_ms.map_or(true, |until| created_at_ms < until)
    }
}

impl FromStr for DateRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "today" => Ok(Self::Today),
            "last_7_days" | "7d" => Ok(Self::Last7Days),
            "last_30_days" | "30d" => Ok(Self::Last30Days),
            other => Err(format!(
                "invalid date range `{other}`; expected all|today|last_7_days|last_30_days"
            )),
        }
    }
}

/// Immutable filter value object for one board view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSpec {
    query: String,
    date_range: DateRange,
    listing_id: Option<String>,
}

impl FilterSpec {
    /// Builds a filter; the query is trimmed and inner whitespace collapsed.
    pub fn new(query: &str, date_range: DateRange, listing_id: Option<String>) -> Self {
        let query = WHITESPACE_RE.replace_all(query.trim(), " ").to_lowercase();
        Self {
            query,
            date_range,
            listing_id: listing_id.filter(|id| !id.trim().is_empty()),
        }
    }

    /// Filter with only a text query.
    pub fn text(query: &str) -> Self {
        Self::new(query, DateRange::All, None)
    }

    /// Normalized lowercase query; empty means inactive.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn date_range(&self) -> DateRange {
        self.date_range
    }

    pub fn listing_id(&self) -> Option<&str> {
        self.listing_id.as_deref()
    }

    /// Whether any predicate restricts the view.
    pub fn is_active(&self) -> bool {
        !self.query.is_empty() || self.date_range != DateRange::All || self.listing_id.is_some()
    }

    fn matches(&self, lead: &Lead, window: CreatedWindow) -> bool {
        self.matches_text(lead)
            && window.contains(lead.created_at_ms)
            && self
                .listing_id
                .as_deref()
                .map_or(true, |id| lead.listing_id() == Some(id))
    }

    fn matches_text(&self, lead: &Lead) -> bool {
        if self.query.is_empty() {
            return true;
        }
        let contains = |value: &str| {
            WHITESPACE_RE
                .replace_all(value, " ")
                .to_lowercase()
                .contains(self.query.as_str())
        };
        contains(&lead.name)
            || lead.company.as_deref().is_some_and(contains)
            || contains(&lead.email)
            || lead
                .listing
                .as_ref()
                .is_some_and(|listing| contains(&listing.title))
    }
}

/// Filtered projection of a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredBoard {
    /// Matching leads, same column keys as the source.
    pub board: LeadBoard,
    /// Leads in the source before filtering.
    pub total_count: usize,
    /// Leads left after filtering.
    pub filtered_count: usize,
}

/// Derives the filtered view of `board` at instant `now`.
///
/// `now`'s timezone defines the calendar day used by `DateRange::Today`.
pub fn filter_board<Tz: TimeZone>(
    board: &LeadBoard,
    spec: &FilterSpec,
    now: &DateTime<Tz>,
) -> FilteredBoard {
    let window = spec.date_range.created_window(now);
    let view = LeadBoard::from_leads(
        board
            .leads()
            .filter(|lead| spec.matches(lead, window))
            .cloned(),
    );

    FilteredBoard {
        total_count: board.len(),
        filtered_count: view.len(),
        board: view,
    }
}

fn start_of_day_ms<Tz: TimeZone>(now: &DateTime<Tz>) -> i64 {
    let wall_clock_fallback = || {
        let time = now.time();
        let elapsed_ms = i64::from(time.num_seconds_from_midnight()) * 1000
            + i64::from(time.nanosecond() / 1_000_000);
        now.timestamp_millis() - elapsed_ms
    };

    match now.date_naive().and_hms_opt(0, 0, 0) {
        Some(midnight) => now
            .timezone()
            .from_local_datetime(&midnight)
            .earliest()
            .map_or_else(wall_clock_fallback, |start| start.timestamp_millis()),
        None => wall_clock_fallback(),
    }
}

fn start_of_next_day_ms<Tz: TimeZone>(now: &DateTime<Tz>) -> Option<i64> {
    let midnight = now.date_naive().succ_opt()?.and_hms_opt(0, 0, 0)?;
    now.timezone()
        .from_local_datetime(&midnight)
        .earliest()
        .map(|start| start.timestamp_millis())
}

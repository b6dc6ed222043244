//! Status projection - Builds the live round timeline for a window.
//!
//! Persisted rounds are overlaid with a virtual lattice of expected slots for
//! every enabled cadence. Slots nobody has materialized yet show up as
//! `NOT_STARTED`, stale ones as `MISSED`, and when nothing is pending a single
//! synthetic "next" slot is appended. Nothing here writes to the database.

use crate::{
    core::{
        round::{format_timestamp, list_rounds_in_window, parse_timestamp, status},
        round_type::{Cadence, enabled_cadences},
    },
    entities::round,
    errors::Result,
};
use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// A pending slot this many minutes old, or older, is shown as missed.
pub const STALE_AFTER_MINUTES: i64 = 30;

/// One row of the status timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundStatusView {
    /// Canonical timestamp of the slot
    pub round_timestamp: String,
    /// Persisted status, or a derived one for virtual slots
    pub status: String,
}

impl RoundStatusView {
    fn new(round_timestamp: String, status: &str) -> Self {
        Self {
            round_timestamp,
            status: status.to_string(),
        }
    }
}

/// Projects the status timeline for `[window_start, now]`, oldest first.
///
/// A `CREATED` round is shown as `CREATED`; it is not treated as pending.
///
/// # Errors
/// - Configuration errors from [`enabled_cadences`]
/// - Database errors, and `InvalidTimestamp` for a corrupt pending round key
#[instrument(skip(db))]
pub async fn project<C>(
    db: &C,
    window_start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<Vec<RoundStatusView>>
where
    C: ConnectionTrait,
{
    let cadences = enabled_cadences(db).await?;
    let rounds = list_rounds_in_window(db, window_start, now).await?;
    debug!(
        rounds = rounds.len(),
        cadences = cadences.len(),
        "Building round timeline"
    );

    build_timeline(&rounds, &cadences, window_start, now)
}

/// Merges persisted rounds with the cadence lattice and applies the display rules.
pub fn build_timeline(
    rounds: &[round::Model],
    cadences: &[Cadence],
    window_start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<Vec<RoundStatusView>> {
    let window_start = window_start.trunc_subsecs(0);
    let now = now.trunc_subsecs(0);

    // Canonical keys are fixed width, so map order is chronological order
    let mut slots: BTreeMap<String, RoundStatusView> = rounds
        .iter()
        .map(|round| {
            (
                round.round_timestamp.clone(),
                RoundStatusView::new(round.round_timestamp.clone(), &round.status),
            )
        })
        .collect();

    for cadence in cadences {
        overlay_lattice(&mut slots, window_start, now, cadence.step);
    }

    let mut timeline: Vec<RoundStatusView> = slots.into_values().collect();
    mark_missed(&mut timeline, now)?;
    append_next_slot(&mut timeline, now, cadences);

    Ok(timeline)
}

/// Adds a `NOT_STARTED` entry for every lattice slot that has no round yet.
fn overlay_lattice(
    slots: &mut BTreeMap<String, RoundStatusView>,
    window_start: DateTime<Utc>,
    now: DateTime<Utc>,
    step: TimeDelta,
) {
    let mut slot = window_start;
    while slot <= now {
        let key = format_timestamp(slot);
        slots
            .entry(key.clone())
            .or_insert_with(|| RoundStatusView::new(key, status::NOT_STARTED));
        slot += step;
    }
}

/// Rewrites pending entries at least [`STALE_AFTER_MINUTES`] old to `MISSED`.
fn mark_missed(timeline: &mut [RoundStatusView], now: DateTime<Utc>) -> Result<()> {
    let stale_after = TimeDelta::minutes(STALE_AFTER_MINUTES);
    for entry in timeline
        .iter_mut()
        .filter(|entry| entry.status == status::NOT_STARTED)
    {
        let slot = parse_timestamp(&entry.round_timestamp)?;
        if now - slot >= stale_after {
            entry.status = status::MISSED.to_string();
        }
    }
    Ok(())
}

/// Appends one pending slot at `now` plus the shortest enabled cadence,
/// unless something is already pending or no cadence is enabled.
fn append_next_slot(
    timeline: &mut Vec<RoundStatusView>,
    now: DateTime<Utc>,
    cadences: &[Cadence],
) {
    if timeline
        .iter()
        .any(|entry| entry.status == status::NOT_STARTED)
    {
        return;
    }

    if let Some(step) = cadences.iter().map(|cadence| cadence.step).min() {
        timeline.push(RoundStatusView::new(
            format_timestamp(now + step),
            status::NOT_STARTED,
        ));
    }
}

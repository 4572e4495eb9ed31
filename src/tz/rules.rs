//! Turning a data block into UTC offset transitions.
//!
//! Transitions are located by the reading of the local clock, so that
//! a resolver can search them by local date-time rather than by UTC instant.
//! Two streams are kept: one for the standard offset, and one for the
//! offset actually observed on the wall clock (i.e. including DST).
use crate::common::{Ambiguity, EpochSeconds, Offset};
use crate::tz::error::{DecodeResult, Violation};
use crate::tz::tzif::DataBlock;

/// A change from one UTC offset to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetTransition {
    // The UTC instant of the change, shifted by (before - after).
    // Read at `offset_after`, it gives the local clock at the moment of change.
    local_instant: EpochSeconds,
    offset_before: Offset,
    offset_after: Offset,
}

impl OffsetTransition {
    fn at_utc(utc: EpochSeconds, offset_before: Offset, offset_after: Offset) -> Self {
        Self {
            local_instant: utc.saturating_add(i64::from(offset_before) - i64::from(offset_after)),
            offset_before,
            offset_after,
        }
    }

    pub fn local_instant(&self) -> EpochSeconds {
        self.local_instant
    }

    pub fn offset_before(&self) -> Offset {
        self.offset_before
    }

    pub fn offset_after(&self) -> Offset {
        self.offset_after
    }

    /// The moment of change on the UTC clock
    pub fn utc_instant(&self) -> EpochSeconds {
        self.local_instant
            .saturating_add(i64::from(self.offset_after) - i64::from(self.offset_before))
    }

    /// The local clock reading at which the change happens
    pub fn local_before(&self) -> EpochSeconds {
        self.local_instant.saturating_add(self.offset_after.into())
    }

    /// The local clock reading directly after the change
    pub fn local_after(&self) -> EpochSeconds {
        self.utc_instant().saturating_add(self.offset_after.into())
    }

    /// The size of the change. "gaps" are positive, "folds" are negative.
    pub fn size(&self) -> i64 {
        i64::from(self.offset_after) - i64::from(self.offset_before)
    }

    pub fn is_gap(&self) -> bool {
        self.offset_after > self.offset_before
    }

    pub fn is_fold(&self) -> bool {
        self.offset_after < self.offset_before
    }

    // The first local clock reading affected by the change
    fn local_start(&self) -> EpochSeconds {
        self.utc_instant()
            .saturating_add(self.offset_before.min(self.offset_after).into())
    }
}

/// The transitions of a zone with at least one recorded change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRules {
    first_standard_offset: Offset,
    first_wall_offset: Offset,
    standard_transitions: Vec<OffsetTransition>,
    wall_transitions: Vec<OffsetTransition>,
}

/// The UTC offset rules of a zone, derived from its explicit transitions only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneRuleSet {
    /// A single offset, always in force
    Fixed(Offset),
    Transitions(TransitionRules),
}

impl ZoneRuleSet {
    pub fn first_standard_offset(&self) -> Offset {
        match self {
            ZoneRuleSet::Fixed(offset) => *offset,
            ZoneRuleSet::Transitions(r) => r.first_standard_offset,
        }
    }

    pub fn first_wall_offset(&self) -> Offset {
        match self {
            ZoneRuleSet::Fixed(offset) => *offset,
            ZoneRuleSet::Transitions(r) => r.first_wall_offset,
        }
    }

    pub fn standard_transitions(&self) -> &[OffsetTransition] {
        match self {
            ZoneRuleSet::Fixed(_) => &[],
            ZoneRuleSet::Transitions(r) => &r.standard_transitions,
        }
    }

    pub fn wall_transitions(&self) -> &[OffsetTransition] {
        match self {
            ZoneRuleSet::Fixed(_) => &[],
            ZoneRuleSet::Transitions(r) => &r.wall_transitions,
        }
    }

    /// Get the UTC offset at the given moment in time.
    /// After the last transition, its offset stays in force.
    pub fn offset_for_instant(&self, t: EpochSeconds) -> Offset {
        offset_at(self.wall_transitions(), self.first_wall_offset(), t)
    }

    /// Get the standard offset (i.e. excluding DST) at the given moment in time.
    pub fn standard_offset_for_instant(&self, t: EpochSeconds) -> Offset {
        offset_at(self.standard_transitions(), self.first_standard_offset(), t)
    }

    pub fn is_dst(&self, t: EpochSeconds) -> bool {
        self.offset_for_instant(t) != self.standard_offset_for_instant(t)
    }

    /// Determine the offset(s) for a reading of the local clock,
    /// expressed as seconds since 1970-01-01T00:00 on that clock.
    pub fn ambiguity_for_local(&self, t: EpochSeconds) -> Ambiguity {
        let transitions = self.wall_transitions();
        // NOTE: we assume transitions don't overlap on the local clock
        match bisect(transitions, t, OffsetTransition::local_start).checked_sub(1) {
            None => Ambiguity::Unambiguous(self.first_wall_offset()),
            Some(i) => {
                let tr = &transitions[i];
                if t < tr.local_start().saturating_add(tr.size().abs()) {
                    if tr.is_gap() {
                        Ambiguity::Gap(tr.offset_after, tr.offset_before)
                    } else {
                        Ambiguity::Fold(tr.offset_before, tr.offset_after)
                    }
                } else {
                    Ambiguity::Unambiguous(tr.offset_after)
                }
            }
        }
    }
}

fn offset_at(transitions: &[OffsetTransition], first: Offset, t: EpochSeconds) -> Offset {
    match bisect(transitions, t, OffsetTransition::utc_instant).checked_sub(1) {
        None => first,
        Some(i) => transitions[i].offset_after,
    }
}

// Bisect the array to count the entries with a key at or before the given time.
#[inline]
fn bisect<T, F>(arr: &[T], x: EpochSeconds, key: F) -> usize
where
    F: Fn(&T) -> EpochSeconds,
{
    let mut size = arr.len();
    let mut left = 0;
    let mut right = size;
    while left < right {
        let mid = left + size / 2;

        if key(&arr[mid]) <= x {
            left = mid + 1;
        } else {
            right = mid;
        }
        size = right - left;
    }
    left
}

/// Derive the offset rules from a decoded data block.
///
/// Leap second records are ignored, and nothing is extrapolated
/// past the last transition.
pub fn build(block: &DataBlock) -> DecodeResult<ZoneRuleSet> {
    let first = block
        .local_time_types
        .first()
        .ok_or(Violation::NoLocalTimeTypes)?;
    if block.transition_times.is_empty() {
        return Ok(ZoneRuleSet::Fixed(first.utoff));
    }
    // The offset before any transition is that of the first type, DST or not.
    // The standard baseline is the first type that isn't DST.
    let first_wall_offset = first.utoff;
    let first_standard_offset = block
        .local_time_types
        .iter()
        .find(|t| !t.is_dst)
        .ok_or(Violation::NoStandardTime)?
        .utoff;

    let mut std_offset = first_standard_offset;
    let mut wall_offset = first_wall_offset;
    let mut standard_transitions = Vec::new();
    let mut wall_transitions = Vec::with_capacity(block.transition_times.len());
    for (&t, &idx) in block.transition_times.iter().zip(&block.transition_types) {
        let ltt = block.local_time_type(idx).ok_or(Violation::TypeIndex)?;
        if !ltt.is_dst && ltt.utoff != std_offset {
            standard_transitions.push(OffsetTransition::at_utc(t, std_offset, ltt.utoff));
            std_offset = ltt.utoff;
        }
        if ltt.utoff != wall_offset {
            wall_transitions.push(OffsetTransition::at_utc(t, wall_offset, ltt.utoff));
            wall_offset = ltt.utoff;
        }
    }
    Ok(ZoneRuleSet::Transitions(TransitionRules {
        first_standard_offset,
        first_wall_offset,
        standard_transitions,
        wall_transitions,
    }))
}

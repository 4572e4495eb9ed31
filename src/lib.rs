//! Decoder for the TZif binary time zone format (RFC 8536).
//!
//! Decoding produces a [`ZoneRuleSet`]: either a single fixed offset, or
//! the transitions of the standard offset and of the wall clock offset,
//! each located by the local clock reading at which the change happens.
//!
//! The crate does no I/O of its own. Reading files, and deciding what to
//! do with those that fail, is up to the caller. See [`ZoneStore`] and
//! [`DebugPrinter`] for two ways of collecting the results.
//!
//! ```no_run
//! let bytes = std::fs::read("/usr/share/zoneinfo/Europe/Amsterdam")?;
//! let rules = tzif_rules::decode(&bytes)?;
//! assert_eq!(rules.offset_for_instant(1_690_000_000), 7200);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod common;
pub mod tz;

pub use common::{Ambiguity, EpochSeconds, Offset, offset_fmt};
pub use tz::error::{DecodeResult, FormatError, Violation};
pub use tz::rules::{OffsetTransition, TransitionRules, ZoneRuleSet};
pub use tz::store::{DebugPrinter, Outcome, RuleSink, ZoneStore, decode_into};
pub use tz::tzif::{
    DataBlock, DecodeOptions, Header, LeapSecond, LocalTimeType, Tzif, Version, parse, parse_with,
};
pub use tz::{decode, decode_with};

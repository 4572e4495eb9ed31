//! Handing decoded rules to whoever consumes them.
//!
//! The decoder itself doesn't know where its output goes. A [`RuleSink`]
//! receives the rules of each file, keyed by a zone ID the caller supplies
//! (typically the file's path relative to the zoneinfo root).
use crate::common::offset_fmt;
use crate::tz::{
    self,
    error::{DecodeResult, FormatError},
    rules::{OffsetTransition, ZoneRuleSet},
    tzif::DecodeOptions,
};
use ahash::AHashMap;
use std::{io, sync::Arc};
use tracing::{debug, trace, warn};

/// A consumer of decoded zone rules.
pub trait RuleSink {
    fn accept(&mut self, key: &str, rules: ZoneRuleSet);
}

impl<F> RuleSink for F
where
    F: FnMut(&str, ZoneRuleSet),
{
    fn accept(&mut self, key: &str, rules: ZoneRuleSet) {
        self(key, rules)
    }
}

/// What happened to a file passed to [`decode_into`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The rules were handed to the sink
    Accepted,
    /// Not a TZif file. Zoneinfo directories contain other files too
    /// (e.g. `zone.tab`), so this isn't an error.
    Skipped,
}

/// Decode a single file and pass the result to the sink.
/// Any error is specific to this file: the caller may continue with others.
pub fn decode_into<S>(
    key: &str,
    bytes: &[u8],
    options: &DecodeOptions,
    sink: &mut S,
) -> DecodeResult<Outcome>
where
    S: RuleSink + ?Sized,
{
    match tz::decode_with(bytes, options) {
        Ok(rules) => {
            sink.accept(key, rules);
            Ok(Outcome::Accepted)
        }
        Err(FormatError::NotTzif) => {
            trace!(key, "not a TZif file, skipping");
            Ok(Outcome::Skipped)
        }
        Err(err) => Err(err),
    }
}

/// Registry of zone rules by zone ID.
#[derive(Debug, Default)]
pub struct ZoneStore {
    // Choice of data structure:
    // "Ahash" works significantly faster than the standard hashing algorithm.
    // We don't need the cryptographic security of the standard algorithm,
    // since the keys are supplied by the caller, not by untrusted input.
    zones: AHashMap<String, Arc<ZoneRuleSet>>,
    options: DecodeOptions,
}

impl ZoneStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DecodeOptions) -> Self {
        Self {
            zones: AHashMap::with_capacity(8), // a reasonable default size
            options,
        }
    }

    pub fn options(&self) -> DecodeOptions {
        self.options
    }

    /// Decode the TZif data and register the rules under the given key.
    /// On failure, the store is left unchanged.
    pub fn insert_tzif(&mut self, key: &str, bytes: &[u8]) -> DecodeResult<Outcome> {
        let options = self.options;
        decode_into(key, bytes, &options, self)
            .inspect_err(|err| warn!(key, %err, "failed to decode TZif file"))
    }

    /// Register the rules under the given key, returning those it replaces.
    pub fn insert(&mut self, key: impl Into<String>, rules: ZoneRuleSet) -> Option<Arc<ZoneRuleSet>> {
        self.zones.insert(key.into(), Arc::new(rules))
    }

    /// Fetches the rules for the given zone ID.
    pub fn get(&self, key: &str) -> Option<Arc<ZoneRuleSet>> {
        self.zones.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.zones.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Arc<ZoneRuleSet>> {
        self.zones.remove(key)
    }

    pub fn clear(&mut self) {
        self.zones.clear();
    }

    /// All registered zone IDs, sorted.
    pub fn zone_ids(&self) -> Vec<&str> {
        let mut ids: Vec<_> = self.zones.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

impl RuleSink for ZoneStore {
    fn accept(&mut self, key: &str, rules: ZoneRuleSet) {
        debug!(
            key,
            transitions = rules.wall_transitions().len(),
            "registered zone rules"
        );
        if self.insert(key, rules).is_some() {
            debug!(key, "replaced existing zone rules");
        }
    }
}

/// Writes a human-readable listing of each zone's rules.
///
/// I/O errors don't interrupt the caller's loop: the first one is kept
/// and returned by [`DebugPrinter::finish`]. Nothing is written after it.
#[derive(Debug)]
pub struct DebugPrinter<W> {
    out: W,
    error: Option<io::Error>,
}

impl<W: io::Write> DebugPrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out, error: None }
    }

    pub fn finish(self) -> io::Result<W> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.out),
        }
    }

    fn write_rules(&mut self, key: &str, rules: &ZoneRuleSet) -> io::Result<()> {
        writeln!(self.out, "{key}")?;
        match rules {
            ZoneRuleSet::Fixed(offset) => writeln!(self.out, "  fixed {}", offset_fmt(*offset))?,
            ZoneRuleSet::Transitions(_) => {
                writeln!(
                    self.out,
                    "  initial standard {} wall {}",
                    offset_fmt(rules.first_standard_offset()),
                    offset_fmt(rules.first_wall_offset())
                )?;
                for tr in rules.standard_transitions() {
                    self.write_transition("standard", tr)?;
                }
                for tr in rules.wall_transitions() {
                    self.write_transition("wall", tr)?;
                }
            }
        }
        Ok(())
    }

    fn write_transition(&mut self, kind: &str, tr: &OffsetTransition) -> io::Result<()> {
        writeln!(
            self.out,
            "  {kind} utc={} local={} {} -> {}",
            tr.utc_instant(),
            tr.local_before(),
            offset_fmt(tr.offset_before()),
            offset_fmt(tr.offset_after())
        )
    }
}

impl<W: io::Write> RuleSink for DebugPrinter<W> {
    fn accept(&mut self, key: &str, rules: ZoneRuleSet) {
        if self.error.is_none() {
            self.error = self.write_rules(key, &rules).err();
        }
    }
}

//! Scalar types and helpers shared by the decoder and the rule queries.
pub(crate) mod parse;

/// Offset in seconds from UTC. Positive values are east of Greenwich.
pub type Offset = i32;

/// Time since UNIX epoch in seconds.
/// Depending on context, counted on the UTC clock or on a local wall clock.
pub type EpochSeconds = i64;

/// Format an offset in seconds as a string like "+hh:mm",
/// adding ":ss" only if needed
pub fn offset_fmt(secs: Offset) -> String {
    // Widen first: `i32::MIN` can't be negated
    let secs = i64::from(secs);
    let (sign, secs) = if secs < 0 { ('-', -secs) } else { ('+', secs) };
    if secs % 60 == 0 {
        format!("{}{:02}:{:02}", sign, secs / 3600, (secs % 3600) / 60)
    } else {
        format!(
            "{}{:02}:{:02}:{:02}",
            sign,
            secs / 3600,
            (secs % 3600) / 60,
            secs % 60
        )
    }
}

/// How a local clock reading maps onto UTC offsets.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Ambiguity {
    Unambiguous(Offset),
    Gap(Offset, Offset),  // (earlier, later) occurrence, (a > b)
    Fold(Offset, Offset), // (earlier, later) occurrence, (a > b)
}

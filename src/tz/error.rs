use std::fmt;

/// Reasons a TZif file can't be decoded.
///
/// Every failure is scoped to a single file:
/// callers decoding a batch should report it and move on.
#[derive(Debug, Clone, PartialEq, Eq, Copy)]
pub enum FormatError {
    /// The magic value is missing. Callers scanning a directory
    /// of mixed content should skip the file rather than fail.
    NotTzif,
    /// The version byte isn't one of `0x00`, `'2'` or `'3'`.
    UnsupportedVersion(u8),
    /// The buffer ended before a required field.
    Truncated,
    /// The data is present but inconsistent.
    Invalid(Violation),
}

/// The rule broken by an [`FormatError::Invalid`] file.
#[derive(Debug, Clone, PartialEq, Eq, Copy)]
pub enum Violation {
    /// `typecnt` is zero
    NoLocalTimeTypes,
    /// `charcnt` is zero
    NoDesignations,
    /// `isutcnt` or `isstdcnt` is neither zero nor `typecnt`
    IndicatorCount,
    /// Transition times are not strictly ascending
    TransitionOrder,
    /// A transition refers to a local time type that doesn't exist
    TypeIndex,
    /// A local time type points outside the designation bytes
    DesignationIndex,
    /// A UT offset of -2**31
    OffsetOutOfRange,
    /// Leap second occurrences are not strictly ascending
    LeapSecondOrder,
    /// The version 2+ header doesn't repeat the magic and version
    HeaderMismatch,
    /// The footer doesn't start with a newline
    MissingFooter,
    /// No local time type is standard time, so no baseline exists
    NoStandardTime,
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::NotTzif => write!(f, "Not a TZif file"),
            FormatError::UnsupportedVersion(v) => write!(f, "Unsupported TZif version byte {v:#04x}"),
            FormatError::Truncated => write!(f, "Unexpected end of TZif data"),
            FormatError::Invalid(v) => write!(f, "Invalid TZif data: {v}"),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Violation::NoLocalTimeTypes => "no local time types",
            Violation::NoDesignations => "no designation characters",
            Violation::IndicatorCount => "indicator count must be zero or equal to the type count",
            Violation::TransitionOrder => "transition times not in ascending order",
            Violation::TypeIndex => "transition type index out of range",
            Violation::DesignationIndex => "designation index out of range",
            Violation::OffsetOutOfRange => "UT offset out of range",
            Violation::LeapSecondOrder => "leap second records not in ascending order",
            Violation::HeaderMismatch => "second header doesn't match the first",
            Violation::MissingFooter => "footer must start with a newline",
            Violation::NoStandardTime => "no standard time local time type",
        })
    }
}

impl std::error::Error for FormatError {}

impl From<Violation> for FormatError {
    fn from(v: Violation) -> Self {
        FormatError::Invalid(v)
    }
}

pub type DecodeResult<T> = Result<T, FormatError>;

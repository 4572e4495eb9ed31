//! Decoding (and re-encoding) of the TZif binary format, as laid out in RFC 8536.
//!
//! A file consists of a version 1 header and data block with 32-bit times,
//! followed (for version 2 and up) by a second header and data block
//! with 64-bit times and a newline-enclosed footer.
use crate::common::parse::Scan;
use crate::common::{EpochSeconds, Offset};
use crate::tz::error::{DecodeResult, FormatError, Violation};
use tracing::trace;

const MAGIC: &[u8; 4] = b"TZif";
const RESERVED_LEN: usize = 15;

/// The format version, identified by the fifth byte of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    V1,
    V2,
    V3,
}

impl Version {
    fn from_byte(b: u8) -> DecodeResult<Self> {
        match b {
            0 => Ok(Version::V1),
            b'2' => Ok(Version::V2),
            b'3' => Ok(Version::V3),
            n => Err(FormatError::UnsupportedVersion(n)),
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Version::V1 => 0,
            Version::V2 => b'2',
            Version::V3 => b'3',
        }
    }

    /// The size in bytes of transition times and leap second occurrences
    /// in a data block of this version.
    pub fn time_width(self) -> usize {
        match self {
            Version::V1 => 4,
            Version::V2 | Version::V3 => 8,
        }
    }
}

/// Which checks to run on the decoded data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Reject data that is readable but breaks the rules of RFC 8536
    /// (unordered transitions, dangling designation indices, etc.)
    /// Checks the rule builder can't do without are always applied.
    pub strict: bool,
}

impl DecodeOptions {
    pub const STRICT: Self = Self { strict: true };
    pub const LENIENT: Self = Self { strict: false };
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self::STRICT
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Copy)]
pub struct Header {
    pub version: Version,
    pub isutcnt: u32,
    pub isstdcnt: u32,
    pub leapcnt: u32,
    pub timecnt: u32,
    pub typecnt: u32,
    pub charcnt: u32,
}

impl Header {
    /// The exact size in bytes of the data block described by this header,
    /// given the width of its time values. None on overflow.
    pub fn block_len(&self, time_width: usize) -> Option<usize> {
        (self.timecnt as usize)
            .checked_mul(time_width + 1)?
            .checked_add((self.typecnt as usize).checked_mul(6)?)?
            .checked_add(self.charcnt as usize)?
            .checked_add((self.leapcnt as usize).checked_mul(time_width + 4)?)?
            .checked_add(self.isstdcnt as usize)?
            .checked_add(self.isutcnt as usize)
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(MAGIC);
        out.push(self.version.to_byte());
        out.extend_from_slice(&[0; RESERVED_LEN]);
        for count in [
            self.isutcnt,
            self.isstdcnt,
            self.leapcnt,
            self.timecnt,
            self.typecnt,
            self.charcnt,
        ] {
            out.extend_from_slice(&count.to_be_bytes());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTimeType {
    pub utoff: Offset,
    pub is_dst: bool,
    /// Start of the designation in [`DataBlock::designations`]
    pub desig_idx: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeapSecond {
    pub occurrence: EpochSeconds,
    pub correction: i32,
}

/// The body following a header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataBlock {
    pub transition_times: Vec<EpochSeconds>,
    /// For each transition, the index of its local time type
    pub transition_types: Vec<u8>,
    pub local_time_types: Vec<LocalTimeType>,
    /// NUL-terminated abbreviations, packed back-to-back
    pub designations: Vec<u8>,
    pub leap_seconds: Vec<LeapSecond>,
    pub is_std: Vec<bool>,
    pub is_ut: Vec<bool>,
}

impl DataBlock {
    /// The header that describes this block.
    pub fn header_for(&self, version: Version) -> Header {
        Header {
            version,
            isutcnt: self.is_ut.len() as u32,
            isstdcnt: self.is_std.len() as u32,
            leapcnt: self.leap_seconds.len() as u32,
            timecnt: self.transition_times.len() as u32,
            typecnt: self.local_time_types.len() as u32,
            charcnt: self.designations.len() as u32,
        }
    }

    pub fn local_time_type(&self, idx: u8) -> Option<&LocalTimeType> {
        self.local_time_types.get(usize::from(idx))
    }

    /// The abbreviation starting at the given index (e.g. "CEST").
    /// None if the index is out of range or the string isn't terminated.
    pub fn designation(&self, idx: u8) -> Option<&[u8]> {
        let tail = self.designations.get(usize::from(idx)..)?;
        let end = tail.iter().position(|&b| b == 0)?;
        Some(&tail[..end])
    }

    /// Check the invariants of RFC 8536 that the layout alone doesn't enforce.
    fn check(&self, options: &DecodeOptions) -> DecodeResult<()> {
        let typecnt = self.local_time_types.len();
        if typecnt == 0 {
            Err(Violation::NoLocalTimeTypes)?;
        }
        if self
            .transition_types
            .iter()
            .any(|&idx| usize::from(idx) >= typecnt)
        {
            Err(Violation::TypeIndex)?;
        }
        if !options.strict {
            return Ok(());
        }
        if self.designations.is_empty() {
            Err(Violation::NoDesignations)?;
        }
        if ![0, typecnt].contains(&self.is_std.len()) || ![0, typecnt].contains(&self.is_ut.len()) {
            Err(Violation::IndicatorCount)?;
        }
        if self.transition_times.windows(2).any(|w| w[0] >= w[1]) {
            Err(Violation::TransitionOrder)?;
        }
        for ltt in &self.local_time_types {
            if ltt.utoff == i32::MIN {
                Err(Violation::OffsetOutOfRange)?;
            }
            if usize::from(ltt.desig_idx) >= self.designations.len() {
                Err(Violation::DesignationIndex)?;
            }
        }
        if self
            .leap_seconds
            .windows(2)
            .any(|w| w[0].occurrence >= w[1].occurrence)
        {
            Err(Violation::LeapSecondOrder)?;
        }
        Ok(())
    }

    fn encode_into(&self, time_version: Version, out: &mut Vec<u8>) {
        for &t in &self.transition_times {
            encode_time(t, time_version, out);
        }
        out.extend_from_slice(&self.transition_types);
        for ltt in &self.local_time_types {
            out.extend_from_slice(&ltt.utoff.to_be_bytes());
            out.push(ltt.is_dst as u8);
            out.push(ltt.desig_idx);
        }
        out.extend_from_slice(&self.designations);
        for leap in &self.leap_seconds {
            encode_time(leap.occurrence, time_version, out);
            out.extend_from_slice(&leap.correction.to_be_bytes());
        }
        out.extend(self.is_std.iter().map(|&b| b as u8));
        out.extend(self.is_ut.iter().map(|&b| b as u8));
    }
}

/// A decoded TZif file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tzif {
    pub version: Version,
    pub v1: DataBlock,
    /// The 64-bit data block. Present for version 2 and up.
    pub v2: Option<DataBlock>,
    /// The raw TZ string between the footer newlines. Present for version 2 and up.
    pub footer: Option<Vec<u8>>,
}

impl Tzif {
    /// The block with the most complete data: the 64-bit one if present.
    pub fn data_block(&self) -> &DataBlock {
        self.v2.as_ref().unwrap_or(&self.v1)
    }

    /// The POSIX TZ string for times after the last transition, not interpreted.
    pub fn footer(&self) -> Option<&[u8]> {
        self.footer.as_deref()
    }

    /// Serialize back to the binary format.
    /// Reserved bytes are written as zeroes and flags as 0 or 1.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.v1.header_for(self.version).encode_into(&mut out);
        self.v1.encode_into(Version::V1, &mut out);
        if let Some(v2) = &self.v2 {
            v2.header_for(self.version).encode_into(&mut out);
            v2.encode_into(self.version, &mut out);
            out.push(b'\n');
            out.extend_from_slice(self.footer().unwrap_or_default());
            out.push(b'\n');
        }
        out
    }
}

pub fn parse(s: &[u8]) -> DecodeResult<Tzif> {
    parse_with(s, &DecodeOptions::default())
}

pub fn parse_with(s: &[u8], options: &DecodeOptions) -> DecodeResult<Tzif> {
    let mut scan = Scan::new(s);
    let header = parse_header(&mut scan)?;
    trace!(?header, "decoding TZif data");
    // The first block always has 32-bit times, regardless of the version
    let v1 = parse_data_block(header, Version::V1, &mut scan)?;
    if header.version == Version::V1 {
        v1.check(options)?;
        return Ok(Tzif {
            version: header.version,
            v1,
            v2: None,
            footer: None,
        });
    }
    // This "second" header is not the same as the first one
    if scan.len() < MAGIC.len() {
        Err(FormatError::Truncated)?;
    }
    let second = match parse_header(&mut scan) {
        Err(FormatError::NotTzif) => Err(Violation::HeaderMismatch)?,
        h => h?,
    };
    if second.version != header.version {
        Err(Violation::HeaderMismatch)?;
    }
    let v2 = parse_data_block(second, header.version, &mut scan)?;
    v2.check(options)?;
    let footer = parse_footer(&mut scan)?;
    Ok(Tzif {
        version: header.version,
        v1,
        v2: Some(v2),
        footer: Some(footer),
    })
}

fn parse_header(s: &mut Scan) -> DecodeResult<Header> {
    // A cut-off magic is still recognizably a TZif file
    if s.len() < MAGIC.len() && MAGIC.starts_with(s.rest()) {
        return Err(FormatError::Truncated);
    }
    if s.take_array::<4>() != Some(MAGIC) {
        return Err(FormatError::NotTzif);
    }
    let version = Version::from_byte(s.next().ok_or(FormatError::Truncated)?)?;
    s.take(RESERVED_LEN).ok_or(FormatError::Truncated)?;
    let mut count = || s.be_u32().ok_or(FormatError::Truncated);
    Ok(Header {
        version,
        isutcnt: count()?,
        isstdcnt: count()?,
        leapcnt: count()?,
        timecnt: count()?,
        typecnt: count()?,
        charcnt: count()?,
    })
}

fn parse_time(s: &mut Scan, time_version: Version) -> Option<EpochSeconds> {
    match time_version {
        Version::V1 => s.be_i32().map(EpochSeconds::from),
        Version::V2 | Version::V3 => s.be_i64(),
    }
}

fn parse_flags(s: &mut Scan, n: u32) -> Option<Vec<bool>> {
    Some(s.take(n as usize)?.iter().map(|&b| b != 0).collect())
}

fn parse_data_block(header: Header, time_version: Version, s: &mut Scan) -> DecodeResult<DataBlock> {
    // Counts are untrusted: check the whole block is there before allocating for it
    match header.block_len(time_version.time_width()) {
        Some(len) if len <= s.len() => {}
        _ => Err(FormatError::Truncated)?,
    }
    parse_data_block_fields(header, time_version, s).ok_or(FormatError::Truncated)
}

fn parse_data_block_fields(header: Header, time_version: Version, s: &mut Scan) -> Option<DataBlock> {
    let transition_times = (0..header.timecnt)
        .map(|_| parse_time(s, time_version))
        .collect::<Option<Vec<_>>>()?;
    let transition_types = s.take(header.timecnt as usize)?.to_vec();
    let local_time_types = (0..header.typecnt)
        .map(|_| {
            Some(LocalTimeType {
                utoff: s.be_i32()?,
                is_dst: s.next()? != 0,
                desig_idx: s.next()?,
            })
        })
        .collect::<Option<Vec<_>>>()?;
    let designations = s.take(header.charcnt as usize)?.to_vec();
    let leap_seconds = (0..header.leapcnt)
        .map(|_| {
            Some(LeapSecond {
                occurrence: parse_time(s, time_version)?,
                correction: s.be_i32()?,
            })
        })
        .collect::<Option<Vec<_>>>()?;
    Some(DataBlock {
        transition_times,
        transition_types,
        local_time_types,
        designations,
        leap_seconds,
        is_std: parse_flags(s, header.isstdcnt)?,
        is_ut: parse_flags(s, header.isutcnt)?,
    })
}

fn parse_footer(s: &mut Scan) -> DecodeResult<Vec<u8>> {
    match s.advance_on(b'\n') {
        Some(true) => {}
        Some(false) => Err(Violation::MissingFooter)?,
        None => Err(FormatError::Truncated)?,
    }
    let tz_str = s
        .take_until(|b| b == b'\n')
        .ok_or(FormatError::Truncated)?;
    Ok(tz_str.to_vec())
}

fn encode_time(t: EpochSeconds, time_version: Version, out: &mut Vec<u8>) {
    match time_version {
        Version::V1 => out.extend_from_slice(&(t as i32).to_be_bytes()),
        Version::V2 | Version::V3 => out.extend_from_slice(&t.to_be_bytes()),
    }
}

//! Functionality for handling time zone information files (TZif).
pub mod error;
pub mod rules;
pub mod store;
pub mod tzif;

use error::DecodeResult;
use rules::ZoneRuleSet;
use tzif::DecodeOptions;

/// Decode a TZif file into its offset rules, with strict checks.
pub fn decode(bytes: &[u8]) -> DecodeResult<ZoneRuleSet> {
    decode_with(bytes, &DecodeOptions::default())
}

/// Decode a TZif file into its offset rules.
/// The rules come from the 64-bit data block if present,
/// otherwise from the version 1 block.
pub fn decode_with(bytes: &[u8], options: &DecodeOptions) -> DecodeResult<ZoneRuleSet> {
    rules::build(tzif::parse_with(bytes, options)?.data_block())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Ambiguity;
    use crate::tz::error::{FormatError, Violation};

    const TZ_AMS: &[u8] = include_bytes!("../../tests/tzif/Amsterdam.tzif");
    const TZ_UTC: &[u8] = include_bytes!("../../tests/tzif/UTC.tzif");
    const TZ_FIXED: &[u8] = include_bytes!("../../tests/tzif/GMT-13.tzif");
    const TZ_LEAP: &[u8] = include_bytes!("../../tests/tzif/right-UTC.tzif");

    /// Version 1 file: two transitions, into standard time and then DST.
    #[rustfmt::skip]
    const ONE_DST_TRANSITION: &[u8] = &[
        b'T', b'Z', b'i', b'f', 0,
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, // isutcnt
        0, 0, 0, 0, // isstdcnt
        0, 0, 0, 0, // leapcnt
        0, 0, 0, 2, // timecnt
        0, 0, 0, 2, // typecnt
        0, 0, 0, 4, // charcnt
        0, 0, 0, 0, // transition times
        0, 0x0f, 0x42, 0x40,
        0, 1, // transition types
        0, 0, 0, 0, 0, 0, // local time types
        0, 0, 0x0e, 0x10, 1, 0,
        b'U', b'T', b'C', 0, // designations
    ];

    #[test]
    fn test_one_dst_transition() {
        let rules = decode(ONE_DST_TRANSITION).unwrap();
        assert_eq!(rules.first_standard_offset(), 0);
        assert_eq!(rules.first_wall_offset(), 0);
        assert!(rules.standard_transitions().is_empty());
        let [tr] = rules.wall_transitions() else {
            panic!("expected one transition, got {rules:?}");
        };
        assert_eq!(tr.local_instant(), 996_400);
        assert_eq!(tr.offset_before(), 0);
        assert_eq!(tr.offset_after(), 3600);
        assert_eq!(tzif::parse(ONE_DST_TRANSITION).unwrap().encode(), ONE_DST_TRANSITION);
    }

    #[test]
    fn test_errors() {
        assert_eq!(decode(b"XYZZ").unwrap_err(), FormatError::NotTzif);
        assert_eq!(decode(&ONE_DST_TRANSITION[..30]).unwrap_err(), FormatError::Truncated);
        let mut bytes = ONE_DST_TRANSITION.to_vec();
        bytes[58] = 1; // the first local time type is now DST as well
        assert_eq!(
            decode(&bytes).unwrap_err(),
            FormatError::Invalid(Violation::NoStandardTime)
        );
        // ...which doesn't matter without transitions
        let mut bytes = TZ_UTC.to_vec();
        bytes[48] = 1;
        let n = bytes.len();
        bytes[n - 12] = 1;
        assert_eq!(decode(&bytes), Ok(ZoneRuleSet::Fixed(0)));
    }

    #[test]
    fn test_fixed() {
        assert_eq!(decode(TZ_UTC), Ok(ZoneRuleSet::Fixed(0)));
        assert_eq!(decode(TZ_FIXED), Ok(ZoneRuleSet::Fixed(13 * 3600)));
    }

    #[test]
    fn test_leap_seconds_ignored() {
        // The single transition doesn't change the offset
        let rules = decode(TZ_LEAP).unwrap();
        assert!(matches!(rules, ZoneRuleSet::Transitions(_)));
        assert!(rules.wall_transitions().is_empty());
        assert_eq!(rules.offset_for_instant(1483228826), 0);
    }

    #[test]
    fn test_ams() {
        let rules = decode(TZ_AMS).unwrap();
        assert_eq!(rules.wall_transitions().len(), 179);
        assert_eq!(rules.standard_transitions().len(), 2);
        assert_eq!(
            rules.ambiguity_for_local(1698541200 + 5000),
            Ambiguity::Fold(7200, 3600)
        );
    }

    #[test]
    fn test_concurrent_decoding() {
        let inputs = [TZ_AMS, TZ_UTC, TZ_FIXED, TZ_LEAP];
        let results: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = inputs.iter().map(|&data| s.spawn(move || decode(data))).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        for (data, result) in inputs.iter().zip(results) {
            assert_eq!(result, decode(data));
        }
    }

    /// Smoke test to see we don't crash decoding any TZif files in the tzdata database.
    /// Checks the decoded rules are internally consistent.
    #[test]
    fn smoke_test() {
        const TZDIR: &str = "/usr/share/zoneinfo";
        for entry in walkdir::WalkDir::new(TZDIR)
            .into_iter()
            .filter_map(Result::ok)
        {
            let path = entry.path();

            // Skip unreadable files
            let Ok(bytes) = std::fs::read(path) else {
                continue;
            };

            let rules = match decode(&bytes) {
                Ok(rules) => rules,
                Err(FormatError::NotTzif) => continue,
                // Newer zic releases may write version 4, which we don't accept
                Err(FormatError::UnsupportedVersion(_)) => continue,
                Err(err) => panic!("failed to decode TZif file {:?}: {err}", path),
            };

            for (stream, first) in [
                (rules.wall_transitions(), rules.first_wall_offset()),
                (rules.standard_transitions(), rules.first_standard_offset()),
            ] {
                let mut prev = first;
                for tr in stream {
                    assert_eq!(tr.offset_before(), prev, "{:?}", path);
                    assert_ne!(tr.offset_before(), tr.offset_after(), "{:?}", path);
                    prev = tr.offset_after();
                }
                assert!(
                    stream.windows(2).all(|w| w[0].utc_instant() < w[1].utc_instant()),
                    "{:?}",
                    path
                );
            }
            assert_eq!(tzif::parse(&bytes).unwrap().encode(), bytes, "{:?}", path);
        }
    }
}

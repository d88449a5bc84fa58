//! Compact notification payload decoder
//!
//! Constrained nodes send a deliberately terse, SenML-flavored text encoding
//! with exactly two field kinds:
//!
//! - `"v":N` - an integer scaled by 100 000 (so `"v":150000` means `1.5`)
//! - `"bv":true` / `"bv":false` - a boolean
//!
//! The decoder scans the payload left to right for those two literal markers
//! and emits values in the order the fields appear; the persistence layer
//! maps position to column. This is not a general-purpose SenML parser and
//! must never fail: any field it cannot parse empties the whole output
//! (all-or-nothing), and an empty or non-UTF-8 payload decodes to nothing.

use crate::sample::SampleValue;

/// Application scale factor for `"v"` fields
const VALUE_SCALE: f64 = 100_000.0;

/// Decode a compact notification payload into an ordered sample.
///
/// Never panics and never errors; malformed input yields an empty vec.
pub fn decode(payload: &[u8]) -> Vec<SampleValue> {
    let bytes = payload;
    let mut values = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos..].starts_with(b"\"v\"") {
            // Skip the marker and the colon after it
            let (token, next) = take_field(bytes, pos + 4);
            match token.trim().parse::<i64>() {
                Ok(raw) => values.push(SampleValue::Number(raw as f64 / VALUE_SCALE)),
                Err(_) => return Vec::new(),
            }
            pos = next;
        } else if bytes[pos..].starts_with(b"\"bv\"") {
            let (token, next) = take_field(bytes, pos + 5);
            match token.trim() {
                "true" => values.push(SampleValue::Bool(true)),
                "false" => values.push(SampleValue::Bool(false)),
                _ => return Vec::new(),
            }
            pos = next;
        }
        pos += 1;
    }

    values
}

/// Take the field value starting at `start`, running up to the next `,` or
/// `}` (exclusive) or the end of the payload. Returns the token and the
/// index of the terminator.
fn take_field(bytes: &[u8], start: usize) -> (&str, usize) {
    let start = start.min(bytes.len());
    let mut end = start;
    while end < bytes.len() && bytes[end] != b',' && bytes[end] != b'}' {
        end += 1;
    }
    // Tokens are delimited by ASCII, so a broken UTF-8 token simply fails
    // the parse above and empties the output.
    (std::str::from_utf8(&bytes[start..end]).unwrap_or(""), end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::is_registration_echo;
    use pretty_assertions::assert_eq;

    #[test]
    fn scaled_integer_field_divides_by_100000() {
        let values = decode(br#"{"bn":"co","v":150000}"#);
        assert_eq!(values, vec![SampleValue::Number(1.5)]);
    }

    #[test]
    fn negative_scaled_integer() {
        let values = decode(br#"{"v":-250000}"#);
        assert_eq!(values, vec![SampleValue::Number(-2.5)]);
    }

    #[test]
    fn boolean_field_preserves_literal() {
        assert_eq!(decode(br#"{"bv":true}"#), vec![SampleValue::Bool(true)]);
        assert_eq!(decode(br#"{"bv":false}"#), vec![SampleValue::Bool(false)]);
    }

    #[test]
    fn field_order_determines_output_order() {
        let values = decode(br#"{"bn":"temphum","v":2150000,"v":6400000}"#);
        assert_eq!(
            values,
            vec![SampleValue::Number(21.5), SampleValue::Number(64.0)]
        );
    }

    #[test]
    fn mixed_fields_keep_payload_order() {
        let values = decode(br#"{"bv":true,"v":100000}"#);
        assert_eq!(
            values,
            vec![SampleValue::Bool(true), SampleValue::Number(1.0)]
        );
    }

    #[test]
    fn empty_payload_decodes_to_nothing() {
        assert_eq!(decode(b""), Vec::new());
        assert_eq!(decode(b"{}"), Vec::new());
    }

    #[test]
    fn payload_without_known_fields_decodes_to_nothing() {
        assert_eq!(decode(br#"{"bn":"hvac","u":"Cel"}"#), Vec::new());
    }

    #[test]
    fn unparseable_integer_empties_the_whole_output() {
        // All-or-nothing: the good field before the bad one is dropped too
        assert_eq!(decode(br#"{"v":100000,"v":12x34}"#), Vec::new());
        assert_eq!(decode(br#"{"v":}"#), Vec::new());
    }

    #[test]
    fn non_boolean_bv_token_empties_the_whole_output() {
        assert_eq!(decode(br#"{"bv":maybe}"#), Vec::new());
    }

    #[test]
    fn truncated_field_at_end_of_payload_is_malformed() {
        assert_eq!(decode(br#"{"v""#), Vec::new());
    }

    #[test]
    fn non_utf8_payload_decodes_to_nothing() {
        assert_eq!(decode(&[0xff, 0xfe, b'"', b'v', b'"']), Vec::new());
    }

    #[test]
    fn base_name_field_is_not_mistaken_for_a_value() {
        // "bn" shares a prefix with neither "v" nor "bv" marker byte-for-byte
        let values = decode(br#"{"bn":"co_sensor","v":50000}"#);
        assert_eq!(values, vec![SampleValue::Number(0.5)]);
    }

    #[test]
    fn registration_echo_sentinel_round_trip() {
        let values = decode(br#"{"v":-100000}"#);
        assert_eq!(values, vec![SampleValue::Number(-1.0)]);
        assert!(is_registration_echo(&values));
    }

    #[test]
    fn whitespace_around_tokens_is_tolerated() {
        assert_eq!(decode(br#"{"v": 150000 }"#), vec![SampleValue::Number(1.5)]);
        assert_eq!(decode(br#"{"bv": true}"#), vec![SampleValue::Bool(true)]);
    }
}

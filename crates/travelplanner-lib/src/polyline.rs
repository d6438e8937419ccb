//! Encoded polyline decoding.
//!
//! Routing providers return road geometry in the encoded polyline format:
//! zig-zag encoded coordinate deltas packed into 5-bit chunks offset by 63.

use crate::geo::GeoPoint;

/// Precision used by OpenRouteService and most other providers.
pub const DEFAULT_PRECISION: u32 = 5;

/// Decode an encoded polyline into `[lat, lon]` points.
///
/// Returns `None` when the input is truncated, contains bytes outside the
/// encoding alphabet, or accumulates past the `i64` range.
pub fn decode_polyline(encoded: &str, precision: u32) -> Option<Vec<GeoPoint>> {
    let factor = 10f64.powi(precision as i32);
    let bytes = encoded.as_bytes();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lon: i64 = 0;
    let mut points = Vec::new();

    while index < bytes.len() {
        lat = lat.checked_add(next_delta(bytes, &mut index)?)?;
        lon = lon.checked_add(next_delta(bytes, &mut index)?)?;
        points.push(GeoPoint::new(lat as f64 / factor, lon as f64 / factor));
    }

    Some(points)
}

fn next_delta(bytes: &[u8], index: &mut usize) -> Option<i64> {
    let mut result: i64 = 0;
    let mut shift = 0;
    loop {
        let byte = i64::from(*bytes.get(*index)?) - 63;
        if !(0..64).contains(&byte) || shift > 60 {
            return None;
        }
        *index += 1;
        result |= (byte & 0x1f) << shift;
        shift += 5;
        if byte < 0x20 {
            break;
        }
    }

    Some(if result & 1 == 1 {
        !(result >> 1)
    } else {
        result >> 1
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: GeoPoint, lat: f64, lon: f64) -> bool {
        (a.latitude - lat).abs() < 1e-9 && (a.longitude - lon).abs() < 1e-9
    }

    #[test]
    fn decodes_reference_polyline() {
        let points = decode_polyline("_p~iF~ps|U_ulLnnqC_mqNvxq`@", DEFAULT_PRECISION).unwrap();
        assert_eq!(points.len(), 3);
        assert!(close(points[0], 38.5, -120.2));
        assert!(close(points[1], 40.7, -120.95));
        assert!(close(points[2], 43.252, -126.453));
    }

    #[test]
    fn empty_input_has_no_points() {
        assert_eq!(decode_polyline("", DEFAULT_PRECISION), Some(vec![]));
    }

    #[test]
    fn truncated_input_is_rejected() {
        // Latitude present, longitude missing.
        assert_eq!(decode_polyline("_p~iF", DEFAULT_PRECISION), None);
        assert_eq!(decode_polyline("_p~", DEFAULT_PRECISION), None);
    }

    /// Encode a single non-negative delta.
    fn encode_delta(value: i64) -> String {
        let mut rest = (value as u64) << 1;
        let mut out = String::new();
        while rest >= 0x20 {
            out.push(char::from((0x20 | (rest & 0x1f)) as u8 + 63));
            rest >>= 5;
        }
        out.push(char::from(rest as u8 + 63));
        out
    }

    #[test]
    fn overflowing_accumulation_is_rejected() {
        // Each point adds 2^62 - 1 to the latitude; the third overflows.
        let point = format!("{}?", encode_delta((1 << 62) - 1));
        let two = decode_polyline(&point.repeat(2), DEFAULT_PRECISION);
        assert_eq!(two.map(|points| points.len()), Some(2));
        assert_eq!(decode_polyline(&point.repeat(3), DEFAULT_PRECISION), None);
    }

    #[test]
    fn invalid_characters_are_rejected() {
        assert_eq!(decode_polyline("  ", DEFAULT_PRECISION), None);
    }
}

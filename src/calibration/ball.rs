//! Ball colour range from two sampled tones.

use crate::config::{ColorRange, BALL_SATURATION_RANGE, BALL_VALUE_RANGE};

/// Build the ball range from its darkest and lightest observed HSV values.
///
/// The samples are ordered per channel and widened by `tolerance`. Only the
/// hue bounds are kept from the samples; saturation and value are replaced by
/// fixed broad bounds because they vary too much with lighting.
pub fn ball_range_from_samples(dark: [u8; 3], lit: [u8; 3], tolerance: [i32; 3]) -> ColorRange {
    let sampled = ColorRange::new(dark.map(i32::from), lit.map(i32::from)).reordered();

    let mut range = ColorRange::new(
        [
            sampled.low[0] - tolerance[0],
            sampled.low[1] - tolerance[1],
            sampled.low[2] - tolerance[2],
        ],
        [
            sampled.high[0] + tolerance[0],
            sampled.high[1] + tolerance[1],
            sampled.high[2] + tolerance[2],
        ],
    );

    range.low[1] = BALL_SATURATION_RANGE.0;
    range.high[1] = BALL_SATURATION_RANGE.1;
    range.low[2] = BALL_VALUE_RANGE.0;
    range.high[2] = BALL_VALUE_RANGE.1;
    range
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hue_widened_and_sv_overridden() {
        let range = ball_range_from_samples([28, 140, 90], [34, 220, 250], [5, 60, 60]);
        assert_eq!(range.low, [23, 100, 30]);
        assert_eq!(range.high, [39, 255, 255]);
    }

    #[test]
    fn test_samples_in_either_order() {
        let a = ball_range_from_samples([34, 220, 250], [28, 140, 90], [3, 0, 0]);
        let b = ball_range_from_samples([28, 140, 90], [34, 220, 250], [3, 0, 0]);
        assert_eq!(a, b);
        assert_eq!(a.low[0], 25);
        assert_eq!(a.high[0], 37);
    }
}

//! Colour conversion and thresholding for the blob search.
//!
//! Hue is stored on the 0-179 scale (half degrees) with saturation and value
//! on 0-255, so one hue unit is two degrees.

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{dilate, erode};

use crate::config::ColorRange;

/// Radius of the square structuring element used to clean the ball mask.
const MASK_OPENING_RADIUS: u8 = 2;

/// Convert one RGB pixel to HSV.
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = rgb.map(|c| c as f64);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let saturation = if max > 0.0 { delta / max * 255.0 } else { 0.0 };

    let mut hue = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    if hue < 0.0 {
        hue += 360.0;
    }

    let mut half_hue = (hue / 2.0).round() as u32;
    if half_hue >= 180 {
        half_hue -= 180;
    }

    [
        half_hue as u8,
        saturation.round().clamp(0.0, 255.0) as u8,
        max as u8,
    ]
}

/// HSV copy of `frame`; channel 0 is hue, 1 saturation, 2 value.
pub fn to_hsv(frame: &RgbImage) -> RgbImage {
    RgbImage::from_fn(frame.width(), frame.height(), |x, y| {
        Rgb(rgb_to_hsv(frame.get_pixel(x, y).0))
    })
}

/// HSV value of a single pixel, `None` outside the frame.
pub fn sample_hsv(frame: &RgbImage, x: u32, y: u32) -> Option<[u8; 3]> {
    if x >= frame.width() || y >= frame.height() {
        return None;
    }
    Some(rgb_to_hsv(frame.get_pixel(x, y).0))
}

/// Binary mask (255 inside, 0 outside) of the pixels whose HSV value lies in `range`.
pub fn in_range_mask(frame: &RgbImage, range: &ColorRange) -> GrayImage {
    GrayImage::from_fn(frame.width(), frame.height(), |x, y| {
        let hsv = rgb_to_hsv(frame.get_pixel(x, y).0);
        if range.contains(hsv) {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Erode then dilate to drop speckles smaller than the structuring element.
pub fn open_mask(mask: &GrayImage) -> GrayImage {
    let eroded = erode(mask, Norm::LInf, MASK_OPENING_RADIUS);
    dilate(&eroded, Norm::LInf, MASK_OPENING_RADIUS)
}

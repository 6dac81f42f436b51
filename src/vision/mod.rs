//! Colour segmentation and blob search on camera frames.

pub mod annotate;
pub mod color;
pub mod contour;
mod locator;

pub use locator::{BallCandidate, BallSearch, BlobLocator, QuadSearch};

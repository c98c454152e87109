pub mod trail;

pub use trail::{trail_thickness, TrailTracker};

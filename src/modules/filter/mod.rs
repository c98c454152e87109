pub mod minradius;

pub use minradius::MinRadius;

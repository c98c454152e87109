pub mod hsvrange;

pub use hsvrange::HsvRange;

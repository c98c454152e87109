pub mod capture;

pub use capture::CaptureInput;

pub mod videofile;

pub use videofile::VideoFileOutput;

pub mod file_times;
pub mod image_scanner;

pub use file_times::FileTimes;
pub use image_scanner::{list_subfolders, ImageFile, ImageScanner};

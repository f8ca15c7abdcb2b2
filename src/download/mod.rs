// src/download/mod.rs
// Image downloading: fetch each image URL and store it on disk.

mod images;

pub use images::{file_name_for, sanitize_file_name, DownloadSummary, ImageDownloader};

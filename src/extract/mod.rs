// src/extract/mod.rs
// =============================================================================
// Everything we read out of a fetched page.
//
// Submodules:
// - html: Extracts hyperlinks and image sources and makes them absolute
// - classify: Tells internal links from external ones
// =============================================================================

mod classify;
mod html;

pub use classify::is_internal_link;
pub use html::{absolutize_link, extract_images, extract_links, resolve_image};

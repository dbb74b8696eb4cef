//! Service layer for the collection-point directory.
//! - Parses loosely typed request input (comma-separated item ids, path ids).
//! - Owns the point registration transaction through the `PointRepository` seam.
//! - Shapes responses, e.g. turning stored image filenames into public URLs.

pub mod errors;
pub mod point;
pub mod db;
pub mod image_url;
pub mod upload;
#[cfg(test)]
pub mod test_support;

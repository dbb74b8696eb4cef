//! Public URLs for stored image filenames.

/// Path under which the HTTP layer serves the uploads directory.
pub const UPLOADS_PATH: &str = "/uploads";

/// Builds `<public base>/uploads/<filename>` for points and items.
/// Pure string formatting: the same filename always yields the same URL.
#[derive(Debug, Clone)]
pub struct ImageUrls {
    base: String,
}

impl ImageUrls {
    pub fn new(public_url: impl Into<String>) -> Self {
        let base = public_url.into().trim_end_matches('/').to_string();
        Self { base }
    }

    pub fn url_for(&self, filename: &str) -> String {
        format!("{}{}/{}", self.base, UPLOADS_PATH, filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_base_and_uploads_path() {
        let urls = ImageUrls::new("http://192.168.1.17:3333");
        assert_eq!(urls.url_for("photo.jpg"), "http://192.168.1.17:3333/uploads/photo.jpg");
    }

    #[test]
    fn trailing_slash_in_base_is_ignored() {
        let a = ImageUrls::new("http://localhost:3333/");
        let b = ImageUrls::new("http://localhost:3333");
        assert_eq!(a.url_for("x.png"), b.url_for("x.png"));
    }

    #[test]
    fn same_filename_same_url() {
        let urls = ImageUrls::new("https://ecoleta.example.com");
        let first = urls.url_for("a1b2c3d4e5f6-photo.jpg");
        let second = urls.url_for("a1b2c3d4e5f6-photo.jpg");
        assert_eq!(first, second);
    }
}

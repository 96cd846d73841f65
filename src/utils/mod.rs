use std::path::Path;

pub trait PathExt {
    fn ext_lower(&self) -> String;
}

impl PathExt for Path {
    fn ext_lower(&self) -> String {
        self.extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase())
            .unwrap_or_default()
    }
}

/// Best-effort extension of the path component of a URL, lowercased.
pub fn url_ext_lower(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    Path::new(path).ext_lower()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ext_lower_normalizes_case() {
        assert_eq!(Path::new("photo.GIF").ext_lower(), "gif");
        assert_eq!(Path::new("photo.png").ext_lower(), "png");
        assert_eq!(Path::new("no_extension").ext_lower(), "");
    }

    #[test]
    fn url_ext_ignores_query_and_fragment() {
        assert_eq!(url_ext_lower("http://cdn.example/a/b.gif?width=3"), "gif");
        assert_eq!(url_ext_lower("http://cdn.example/a/b.PNG#top"), "png");
        assert_eq!(url_ext_lower("http://cdn.example/a/b"), "");
    }
}

//! Rewrites upload URLs to a remote host when the file is missing locally.
//!
//! A URL is only rewritten when it points under the local uploads base URL
//! and the matching file under the uploads directory does not exist. The
//! path, query and fragment after the base are carried over byte for byte.

use crate::error_reporting::{ErrorReporting, E_WARNING};
use crate::models::{ImageAttributes, ImageSrc, Scheme, Srcset, UploadDir};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::ffi::OsString;
use std::path::PathBuf;

/// Quoted absolute URLs in free-form content. Each quote style only closes
/// on the same quote character.
static QUOTED_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""(https?://[^"]+?)"|'(https?://[^']+?)'"#).expect("quoted URL pattern is valid")
});

#[derive(Debug, Clone)]
pub struct UrlRewriter {
    /// Local base URL, already normalised to `scheme`
    base_url: String,
    base_dir: PathBuf,
    remote_url: String,
    scheme: Scheme,
    reporting: ErrorReporting,
}

impl UrlRewriter {
    pub fn new(upload_dir: UploadDir, remote_url: impl Into<String>, scheme: Scheme) -> Self {
        Self {
            base_url: set_url_scheme(&upload_dir.base_url, scheme),
            base_dir: upload_dir.base_dir,
            remote_url: remote_url.into(),
            scheme,
            reporting: ErrorReporting::default(),
        }
    }

    pub fn with_reporting(mut self, reporting: ErrorReporting) -> Self {
        self.reporting = reporting;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn remote_url(&self) -> &str {
        &self.remote_url
    }

    /// Rewrite a single URL, or return it unchanged.
    pub fn rewrite(&self, url: &str) -> String {
        if url.is_empty() {
            return url.to_string();
        }

        let compare_url = set_url_scheme(url, self.scheme);
        let Some(relative) = compare_url.strip_prefix(self.base_url.as_str()) else {
            return url.to_string();
        };

        if self.exists_locally(relative) {
            return url.to_string();
        }

        let rewritten = format!("{}{}", self.remote_url, relative);
        tracing::debug!("Rewrote {} -> {}", url, rewritten);
        rewritten
    }

    /// Missing files and failed checks both count as absent.
    fn exists_locally(&self, relative: &str) -> bool {
        let mut path = OsString::from(self.base_dir.as_os_str());
        path.push(relative);
        let path = PathBuf::from(path);

        match path.try_exists() {
            Ok(exists) => exists,
            Err(e) => {
                self.reporting.report(
                    E_WARNING,
                    &format!("Could not check {}: {}; treating as missing", path.display(), e),
                );
                false
            }
        }
    }

    pub fn filter_image_src(&self, image: Option<ImageSrc>) -> Option<ImageSrc> {
        image.map(|mut image| {
            image.url = self.rewrite(&image.url);
            image
        })
    }

    pub fn filter_image_attributes(&self, mut attributes: ImageAttributes) -> ImageAttributes {
        if let Some(src) = attributes.get_mut("src") {
            *src = self.rewrite(src);
        }
        attributes
    }

    pub fn filter_image_srcset(&self, mut sources: Srcset) -> Srcset {
        for source in sources.values_mut() {
            source.url = self.rewrite(&source.url);
        }
        sources
    }

    /// Rewrite every quoted `http(s)://` URL in `content`, keeping the quotes.
    pub fn filter_content(&self, content: &str) -> String {
        QUOTED_URL
            .replace_all(content, |caps: &Captures| {
                let (quote, url) = match (caps.get(1), caps.get(2)) {
                    (Some(url), _) => ('"', url.as_str()),
                    (None, Some(url)) => ('\'', url.as_str()),
                    (None, None) => return caps[0].to_string(),
                };
                format!("{quote}{}{quote}", self.rewrite(url))
            })
            .into_owned()
    }
}

/// Force `url` onto `scheme`. Surrounding whitespace is trimmed and a
/// scheme-relative `//host/...` URL is treated as `http://host/...`.
pub fn set_url_scheme(url: &str, scheme: Scheme) -> String {
    let url = url.trim();
    let url = match url.strip_prefix("//") {
        Some(rest) => format!("http://{}", rest),
        None => url.to_string(),
    };

    match url.split_once("://") {
        Some((prefix, rest))
            if !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') =>
        {
            format!("{}://{}", scheme, rest)
        }
        _ => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SrcsetDescriptor, SrcsetSource};
    use std::fs;
    use tempfile::TempDir;

    const BASE: &str = "https://site.test/wp-content/uploads";
    const REMOTE: &str = "https://cdn.example/uploads";

    fn rewriter_with(files: &[&str]) -> (TempDir, UrlRewriter) {
        let dir = TempDir::new().unwrap();
        for file in files {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, b"local").unwrap();
        }
        let rewriter = UrlRewriter::new(UploadDir::new(BASE, dir.path()), REMOTE, Scheme::Https);
        (dir, rewriter)
    }

    #[test]
    fn missing_file_points_at_remote() {
        let (_dir, rewriter) = rewriter_with(&[]);
        assert_eq!(
            rewriter.rewrite("https://site.test/wp-content/uploads/2024/01/a.png"),
            "https://cdn.example/uploads/2024/01/a.png"
        );
    }

    #[test]
    fn present_file_is_left_alone() {
        let (_dir, rewriter) = rewriter_with(&["2024/01/a.png"]);
        let url = "https://site.test/wp-content/uploads/2024/01/a.png";
        assert_eq!(rewriter.rewrite(url), url);
    }

    #[test]
    fn urls_outside_uploads_are_untouched() {
        let (_dir, rewriter) = rewriter_with(&[]);
        for url in [
            "",
            "https://site.test/wp-content/themes/x/logo.png",
            "https://other.test/wp-content/uploads/a.png",
            "/wp-content/uploads/a.png",
            "not a url",
        ] {
            assert_eq!(rewriter.rewrite(url), url);
        }
    }

    #[test]
    fn scheme_differences_are_ignored() {
        let (_dir, rewriter) = rewriter_with(&["present.png"]);
        assert_eq!(
            rewriter.rewrite("http://site.test/wp-content/uploads/x.png"),
            rewriter.rewrite("https://site.test/wp-content/uploads/x.png"),
        );
        assert_eq!(
            rewriter.rewrite("//site.test/wp-content/uploads/x.png"),
            "https://cdn.example/uploads/x.png"
        );
        let url = "http://site.test/wp-content/uploads/present.png";
        assert_eq!(rewriter.rewrite(url), url);
    }

    #[test]
    fn failed_existence_check_counts_as_missing() {
        let (_dir, rewriter) = rewriter_with(&[]);
        // NUL makes the stat call itself fail
        assert_eq!(
            rewriter.rewrite("https://site.test/wp-content/uploads/a\0.png"),
            "https://cdn.example/uploads/a\0.png"
        );

        let long_name = format!("{}.png", "a".repeat(300));
        assert_eq!(
            rewriter.rewrite(&format!("{}/{}", BASE, long_name)),
            format!("{}/{}", REMOTE, long_name)
        );
    }

    #[test]
    fn query_and_fragment_are_preserved() {
        let (_dir, rewriter) = rewriter_with(&[]);
        assert_eq!(
            rewriter.rewrite("https://site.test/wp-content/uploads/a%20b.png?ver=2&x=1#top"),
            "https://cdn.example/uploads/a%20b.png?ver=2&x=1#top"
        );
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let (_dir, rewriter) = rewriter_with(&[]);
        let once = rewriter.rewrite("https://site.test/wp-content/uploads/a.png");
        assert_eq!(rewriter.rewrite(&once), once);
    }

    #[test]
    fn image_src_adapter() {
        let (_dir, rewriter) = rewriter_with(&[]);
        assert_eq!(rewriter.filter_image_src(None), None);

        let image = ImageSrc {
            url: format!("{}/a-150x150.png", BASE),
            width: 150,
            height: 150,
            is_intermediate: true,
        };
        let filtered = rewriter.filter_image_src(Some(image.clone())).unwrap();
        assert_eq!(filtered.url, format!("{}/a-150x150.png", REMOTE));
        assert_eq!((filtered.width, filtered.height, filtered.is_intermediate), (150, 150, true));
    }

    #[test]
    fn attributes_adapter_only_touches_src() {
        let (_dir, rewriter) = rewriter_with(&[]);
        let mut attributes = ImageAttributes::new();
        attributes.insert("alt".to_string(), format!("{}/a.png", BASE));
        assert_eq!(rewriter.filter_image_attributes(attributes.clone()), attributes);

        attributes.insert("src".to_string(), format!("{}/a.png", BASE));
        let filtered = rewriter.filter_image_attributes(attributes);
        assert_eq!(filtered["src"], format!("{}/a.png", REMOTE));
        assert_eq!(filtered["alt"], format!("{}/a.png", BASE));
    }

    #[test]
    fn srcset_adapter_rewrites_each_entry() {
        let (_dir, rewriter) = rewriter_with(&["a-300x200.png"]);
        let mut sources = Srcset::new();
        for width in [300, 1024] {
            sources.insert(
                width,
                SrcsetSource {
                    url: format!("{}/a-{}x200.png", BASE, width),
                    descriptor: SrcsetDescriptor::Width,
                    value: width,
                },
            );
        }

        let filtered = rewriter.filter_image_srcset(sources);
        assert_eq!(filtered[&300].url, format!("{}/a-300x200.png", BASE));
        assert_eq!(filtered[&1024].url, format!("{}/a-1024x200.png", REMOTE));
    }

    #[test]
    fn content_scan_keeps_markup() {
        let (_dir, rewriter) = rewriter_with(&[]);
        let html = r#"<img src="https://site.test/wp-content/uploads/x.png">"#;
        assert_eq!(
            rewriter.filter_content(html),
            r#"<img src="https://cdn.example/uploads/x.png">"#
        );
    }

    #[test]
    fn content_scan_handles_both_quote_styles() {
        let (_dir, rewriter) = rewriter_with(&["kept.png"]);
        let html = concat!(
            "<a href='https://site.test/wp-content/uploads/a.pdf'>a</a>",
            r#"<img src="https://site.test/wp-content/uploads/kept.png" alt="https://site.test/">"#,
            "<p>https://site.test/wp-content/uploads/bare.png</p>",
        );
        let expected = concat!(
            "<a href='https://cdn.example/uploads/a.pdf'>a</a>",
            r#"<img src="https://site.test/wp-content/uploads/kept.png" alt="https://site.test/">"#,
            "<p>https://site.test/wp-content/uploads/bare.png</p>",
        );
        assert_eq!(rewriter.filter_content(html), expected);
    }

    #[test]
    fn set_url_scheme_normalises() {
        assert_eq!(set_url_scheme(" http://a.test/x ", Scheme::Https), "https://a.test/x");
        assert_eq!(set_url_scheme("//a.test/x", Scheme::Https), "https://a.test/x");
        assert_eq!(set_url_scheme("ftp://a.test/x", Scheme::Http), "http://a.test/x");
        assert_eq!(set_url_scheme("/relative/x", Scheme::Https), "/relative/x");
        assert_eq!(set_url_scheme("data:image/png", Scheme::Https), "data:image/png");
        assert_eq!(set_url_scheme("héllo://a.test/x", Scheme::Https), "héllo://a.test/x");
    }
}

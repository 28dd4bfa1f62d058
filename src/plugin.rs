use crate::config::Config;
use crate::constants::REWRITE_PRIORITY;
use crate::filters::FilterTable;
use crate::rewriter::UrlRewriter;
use std::sync::Arc;

/// Build the media rewriter if this process should rewrite at all.
///
/// Only a `local` environment with a remote URL configured gets one.
pub fn media_rewriter(config: &Config) -> Option<Arc<UrlRewriter>> {
    if !config.environment.is_local() {
        tracing::info!(
            "Media rewriting disabled: environment is {}, not local",
            config.environment
        );
        return None;
    }
    let Some(remote_url) = config.remote_url.as_deref() else {
        tracing::info!("Media rewriting disabled: no remote URL configured");
        return None;
    };

    let rewriter = UrlRewriter::new(config.upload_dir.clone(), remote_url, config.site_scheme)
        .with_reporting(config.error_reporting());
    tracing::info!(
        "Rewriting missing media under {} to {}",
        rewriter.base_url(),
        rewriter.remote_url()
    );
    Some(Arc::new(rewriter))
}

/// Register the rewriter's adapters on every media hook. Returns whether
/// anything was registered.
pub fn register(config: &Config, filters: &mut FilterTable) -> bool {
    let Some(rewriter) = media_rewriter(config) else {
        return false;
    };

    let r = Arc::clone(&rewriter);
    filters
        .attachment_url
        .add(REWRITE_PRIORITY, move |url| r.rewrite(&url));

    let r = Arc::clone(&rewriter);
    filters
        .attachment_image_src
        .add(REWRITE_PRIORITY, move |image| r.filter_image_src(image));

    let r = Arc::clone(&rewriter);
    filters
        .attachment_image_attributes
        .add(REWRITE_PRIORITY, move |attributes| r.filter_image_attributes(attributes));

    let r = Arc::clone(&rewriter);
    filters
        .calculate_image_srcset
        .add(REWRITE_PRIORITY, move |sources| r.filter_image_srcset(sources));

    filters
        .the_content
        .add(REWRITE_PRIORITY, move |content| rewriter.filter_content(&content));

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|name| vars.get(name).cloned()).unwrap()
    }

    #[test]
    fn inert_outside_local_environment() {
        let config = config(&[
            ("WP_ENVIRONMENT_TYPE", "staging"),
            ("REWRITE_MEDIA_REMOTE", "https://cdn.example/uploads"),
        ]);
        let mut filters = FilterTable::new();
        assert!(!register(&config, &mut filters));
        assert!(filters.is_empty());
    }

    #[test]
    fn inert_without_remote_url() {
        let config = config(&[("WP_ENVIRONMENT_TYPE", "local")]);
        let mut filters = FilterTable::new();
        assert!(!register(&config, &mut filters));
        assert!(filters.is_empty());
    }

    #[test]
    fn registers_every_media_hook() {
        let config = config(&[
            ("WP_ENVIRONMENT_TYPE", "local"),
            ("REWRITE_MEDIA_REMOTE", "https://cdn.example/uploads"),
            ("UPLOADS_DIR", "/nonexistent/uploads"),
        ]);
        let mut filters = FilterTable::new();
        assert!(register(&config, &mut filters));
        assert_eq!(filters.attachment_url.len(), 1);
        assert_eq!(filters.attachment_image_src.len(), 1);
        assert_eq!(filters.attachment_image_attributes.len(), 1);
        assert_eq!(filters.calculate_image_srcset.len(), 1);
        assert_eq!(filters.the_content.len(), 1);

        assert_eq!(
            filters
                .attachment_url
                .apply("http://localhost:8080/wp-content/uploads/a.png".to_string()),
            "https://cdn.example/uploads/a.png"
        );
    }

    #[test]
    fn configured_base_is_matched_verbatim() {
        for base in [
            "http://Site.test/wp-content/uploads",
            "http://site.test:80/wp-content/uploads",
            "http://site.test/médias/uploads",
        ] {
            let config = config(&[
                ("WP_ENVIRONMENT_TYPE", "local"),
                ("REWRITE_MEDIA_REMOTE", "https://cdn.example/uploads"),
                ("UPLOADS_URL", base),
                ("UPLOADS_DIR", "/nonexistent/uploads"),
            ]);
            let rewriter = media_rewriter(&config).unwrap();
            assert_eq!(
                rewriter.rewrite(&format!("{}/a.png", base)),
                "https://cdn.example/uploads/a.png"
            );
        }
    }
}

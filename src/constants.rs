/// Application-wide constants
/// Environment variable names and default values live here

/// Environment type that enables every development feature
pub const LOCAL_ENVIRONMENT: &str = "local";

/// Default dev server port
pub const DEFAULT_PORT: u16 = 8080;

/// Default static site directory
pub const DEFAULT_SITE_ROOT: &str = "./public";

/// Default local uploads base URL (no trailing slash)
pub const DEFAULT_UPLOADS_URL: &str = "http://localhost:8080/wp-content/uploads";

/// Default local uploads base directory
pub const DEFAULT_UPLOADS_DIR: &str = "./wp-content/uploads";

/// Largest HTML body the content middleware will buffer and rewrite (8 MB)
pub const MAX_REWRITE_BODY_SIZE: usize = 8 * 1024 * 1024;

/// Default tracing filter when RUST_LOG is unset
pub const DEFAULT_LOG_FILTER: &str = "rewrite_media=debug,tower_http=debug";

/// Priority the media rewriter registers its filters at (runs first)
pub const REWRITE_PRIORITY: i32 = 0;

/// Priority for callbacks that don't care about ordering
pub const DEFAULT_PRIORITY: i32 = 10;

pub mod env {
    pub const PORT: &str = "PORT";
    pub const SITE_ROOT: &str = "SITE_ROOT";
    pub const UPLOADS_URL: &str = "UPLOADS_URL";
    pub const UPLOADS_DIR: &str = "UPLOADS_DIR";
    pub const SITE_SCHEME: &str = "SITE_SCHEME";
    pub const ENVIRONMENT_TYPE: &str = "WP_ENVIRONMENT_TYPE";
    pub const REMOTE_URL: &str = "REWRITE_MEDIA_REMOTE";
    pub const ERROR_REPORTING: &str = "DEV_ERROR_REPORTING";
}

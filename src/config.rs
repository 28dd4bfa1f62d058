use crate::constants::{self, env as vars};
use crate::error::ConfigError;
use crate::error_reporting::ErrorReporting;
use crate::models::{EnvironmentType, Scheme, UploadDir};
use std::env;
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub site_root: PathBuf,
    pub upload_dir: UploadDir,
    pub site_scheme: Scheme,
    pub environment: EnvironmentType,
    /// Remote media base URL without trailing slash; `None` disables rewriting
    pub remote_url: Option<String>,
    error_reporting: ErrorReporting,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self::from_lookup(|name| env::var(name).ok())?)
    }

    /// Build the config from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup(vars::PORT) {
            Some(v) => v.trim().parse().map_err(|e| ConfigError::Invalid {
                name: vars::PORT,
                reason: format!("{}", e),
            })?,
            None => constants::DEFAULT_PORT,
        };

        // Compared byte for byte against page URLs, so keep it as configured
        let base_url = lookup(vars::UPLOADS_URL)
            .unwrap_or_else(|| constants::DEFAULT_UPLOADS_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();
        let uploads_url = parse_http_url(vars::UPLOADS_URL, &base_url)?;
        if uploads_url.path().trim_end_matches('/').is_empty() {
            return Err(ConfigError::RootPath {
                name: vars::UPLOADS_URL,
                value: uploads_url.to_string(),
            });
        }

        let site_scheme = match lookup(vars::SITE_SCHEME) {
            Some(v) => v.trim().parse().map_err(|reason| ConfigError::Invalid {
                name: vars::SITE_SCHEME,
                reason,
            })?,
            None => uploads_url
                .scheme()
                .parse()
                .map_err(|reason| ConfigError::Invalid { name: vars::UPLOADS_URL, reason })?,
        };

        let remote_url = match lookup(vars::REMOTE_URL).map(|v| v.trim().to_string()) {
            Some(v) if !v.is_empty() => {
                parse_http_url(vars::REMOTE_URL, &v)?;
                Some(v.trim_end_matches('/').to_string())
            }
            _ => None,
        };

        let upload_dir = UploadDir::new(
            base_url,
            lookup(vars::UPLOADS_DIR).unwrap_or_else(|| constants::DEFAULT_UPLOADS_DIR.to_string()),
        );

        Ok(Self {
            port,
            site_root: lookup(vars::SITE_ROOT)
                .unwrap_or_else(|| constants::DEFAULT_SITE_ROOT.to_string())
                .into(),
            upload_dir,
            site_scheme,
            environment: EnvironmentType::from_setting(lookup(vars::ENVIRONMENT_TYPE).as_deref()),
            remote_url,
            error_reporting: ErrorReporting::resolve(lookup(vars::ERROR_REPORTING).as_deref()),
        })
    }

    /// Mask in effect: the configured one locally, everything elsewhere.
    pub fn error_reporting(&self) -> ErrorReporting {
        if self.environment.is_local() {
            self.error_reporting
        } else {
            ErrorReporting::ALL
        }
    }

    /// Path the uploads directory is served under, e.g. `/wp-content/uploads`.
    pub fn uploads_path(&self) -> String {
        Url::parse(&self.upload_dir.base_url)
            .map(|u| u.path().trim_end_matches('/').to_string())
            .unwrap_or_default()
    }
}

fn parse_http_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    let not_absolute = || ConfigError::NotAbsoluteUrl {
        name,
        value: value.to_string(),
    };
    let url = Url::parse(value.trim()).map_err(|_| not_absolute())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(not_absolute());
    }
    Ok(url)
}

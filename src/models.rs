use crate::constants::LOCAL_ENVIRONMENT;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Runtime mode of the site. Unknown values resolve to `Production`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentType {
    Local,
    Development,
    Staging,
    #[default]
    Production,
}

impl EnvironmentType {
    pub fn is_local(&self) -> bool {
        *self == EnvironmentType::Local
    }

    /// Lenient parse: anything unrecognised is production.
    pub fn from_setting(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or_default()
    }
}

impl std::fmt::Display for EnvironmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnvironmentType::Local => f.write_str(LOCAL_ENVIRONMENT),
            EnvironmentType::Development => write!(f, "development"),
            EnvironmentType::Staging => write!(f, "staging"),
            EnvironmentType::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for EnvironmentType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            LOCAL_ENVIRONMENT => Ok(EnvironmentType::Local),
            "development" => Ok(EnvironmentType::Development),
            "staging" => Ok(EnvironmentType::Staging),
            "production" => Ok(EnvironmentType::Production),
            _ => Err(format!("Invalid environment type: {}", s)),
        }
    }
}

/// Site-wide preferred URL scheme.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Scheme {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            _ => Err(format!("Invalid scheme: {}", s)),
        }
    }
}

/// Where uploaded media lives, both as a URL and on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadDir {
    /// Base URL without trailing slash, e.g. `https://site.test/wp-content/uploads`
    pub base_url: String,
    pub base_dir: PathBuf,
}

impl UploadDir {
    pub fn new(base_url: impl Into<String>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_url: base_url.into(),
            base_dir: base_dir.into(),
        }
    }
}

/// An image descriptor: URL plus dimensions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageSrc {
    pub url: String,
    pub width: u32,
    pub height: u32,
    /// True when the URL points at a resized copy rather than the original
    pub is_intermediate: bool,
}

/// Attribute map for an `<img>` element, keyed by attribute name.
pub type ImageAttributes = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SrcsetDescriptor {
    #[serde(rename = "w")]
    Width,
    #[serde(rename = "x")]
    Density,
}

/// One candidate in a responsive source set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SrcsetSource {
    pub url: String,
    pub descriptor: SrcsetDescriptor,
    pub value: u32,
}

/// Source set keyed by candidate width.
pub type Srcset = BTreeMap<u32, SrcsetSource>;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: EnvironmentType,
    /// Whether missing media is being rewritten to the remote host
    pub rewriting: bool,
}

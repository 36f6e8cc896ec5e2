//! ellibre configuration file handling

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the optional configuration file at the project root
pub const CONFIG_FILE: &str = "ellibre.toml";

/// Top-level configuration (ellibre.toml)
#[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct EllibreConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub banner: BannerConfig,
}

/// Input and output locations, relative to the project root
#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct PathsConfig {
    /// Library sources wrapped into the main bundle
    #[serde(default = "default_src")]
    pub src: PathBuf,
    /// Files concatenated into polyfills.js
    #[serde(default = "default_polyfills")]
    pub polyfills: PathBuf,
    /// Output directory
    #[serde(default = "default_dist")]
    pub dist: PathBuf,
    #[serde(default = "default_license")]
    pub license: PathBuf,
    /// npm manifest supplying author and version
    #[serde(default = "default_package")]
    pub package: PathBuf,
}

fn default_src() -> PathBuf {
    PathBuf::from("src")
}

fn default_polyfills() -> PathBuf {
    PathBuf::from("polyfills")
}

fn default_dist() -> PathBuf {
    PathBuf::from("dist")
}

fn default_license() -> PathBuf {
    PathBuf::from("LICENSE")
}

fn default_package() -> PathBuf {
    PathBuf::from("package.json")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            src: default_src(),
            polyfills: default_polyfills(),
            dist: default_dist(),
            license: default_license(),
            package: default_package(),
        }
    }
}

/// Header comment of the main bundle
#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct BannerConfig {
    #[serde(default = "default_description")]
    pub description: String,
}

fn default_description() -> String {
    "Advanced functionalities for web architecture written in vanilla js.".to_string()
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            description: default_description(),
        }
    }
}

impl EllibreConfig {
    /// Load configuration from a directory. A missing ellibre.toml yields the defaults.
    pub fn load_from_dir(path: &Path) -> Result<Self> {
        let config_path = if path.is_file() {
            path.to_path_buf()
        } else {
            path.join(CONFIG_FILE)
        };

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: EllibreConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(config)
    }
}

/// The fields of package.json that end up in the banner
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct PackageManifest {
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub version: String,
}

/// npm accepts either `"Name <mail>"` or `{ "name": .., "email": .. }`
#[derive(Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Author {
    Name(String),
    Person { name: String },
}

impl PackageManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn author_name(&self) -> &str {
        match &self.author {
            Some(Author::Name(name)) | Some(Author::Person { name }) => name,
            None => "",
        }
    }
}

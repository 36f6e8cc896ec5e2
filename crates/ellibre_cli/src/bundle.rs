//! Bundle builder
//!
//! Produces the two artifacts in the output directory:
//!
//! - `polyfills.js`: every polyfill file, in name order, each followed by CRLF
//! - `ellibre.js`: a license banner and a strict-mode IIFE wrapping every
//!   source file
//!
//! Each bundle is built independently; a failure is reported as `NOK` and the
//! next bundle still runs.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error};

use crate::config::{EllibreConfig, PackageManifest};

const CRLF: &str = "\r\n";

/// Filesystem problems the builder reports itself
#[derive(Error, Debug)]
pub enum BundleError {
    #[error("input directory {0} does not exist")]
    MissingDirectory(PathBuf),
}

/// One output artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bundle {
    Polyfills,
    Library,
}

impl Bundle {
    /// All bundles in build order
    pub const ALL: [Bundle; 2] = [Bundle::Polyfills, Bundle::Library];

    /// Output file name
    pub fn file_name(&self) -> &'static str {
        match self {
            Bundle::Polyfills => "polyfills.js",
            Bundle::Library => "ellibre.js",
        }
    }

    /// Render the bundle contents
    pub fn render(&self, project: &Project) -> Result<String> {
        match self {
            Bundle::Polyfills => {
                render_polyfills(&project.resolve(&project.config.paths.polyfills))
            }
            Bundle::Library => render_library(project),
        }
    }
}

/// A project root plus its configuration
pub struct Project {
    pub root: PathBuf,
    pub config: EllibreConfig,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>, config: EllibreConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn load(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let config = EllibreConfig::load_from_dir(&root)?;
        Ok(Self::new(root, config))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    /// Render and write one bundle into the output directory
    pub fn build(&self, bundle: Bundle) -> Result<PathBuf> {
        let contents = bundle.render(self)?;
        let dist = self.resolve(&self.config.paths.dist);
        fs::create_dir_all(&dist)
            .with_context(|| format!("Failed to create {}", dist.display()))?;

        let output = dist.join(bundle.file_name());
        fs::write(&output, contents)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        debug!(bundle = bundle.file_name(), output = %output.display(), "bundle written");
        Ok(output)
    }

    /// Build every bundle, printing `building <name> ... OK|NOK` to `out`.
    /// Returns the number of failed bundles.
    pub fn build_all(&self, out: &mut impl Write) -> Result<usize> {
        let mut failed = 0;
        for bundle in Bundle::ALL {
            write!(out, "building {} ... ", bundle.file_name())?;
            out.flush()?;
            match self.build(bundle) {
                Ok(_) => writeln!(out, "OK")?,
                Err(err) => {
                    error!(bundle = bundle.file_name(), "{err:#}");
                    writeln!(out, "NOK")?;
                    failed += 1;
                }
            }
        }
        Ok(failed)
    }
}

/// Regular files of `dir`, sorted by name
fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(BundleError::MissingDirectory(dir.to_path_buf()).into());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn render_polyfills(dir: &Path) -> Result<String> {
    let mut out = String::new();
    for file in list_files(dir)? {
        out.push_str(&read(&file)?);
        out.push_str(CRLF);
    }
    Ok(out)
}

/// Split on LF or CRLF
fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// The `/** ... */` header of the library bundle
pub fn banner(description: &str, manifest: &PackageManifest, license: &str) -> String {
    let mut out = String::from("/**\n");
    out.push_str(&format!(" * {description}\n"));
    out.push_str(&format!(" * @author {}\n", manifest.author_name()));
    out.push_str(&format!(" * @version {}\n", manifest.version));
    out.push_str(" * @license\n");
    for line in lines(license) {
        out.push_str(" * ");
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(" */");
    out
}

fn render_library(project: &Project) -> Result<String> {
    let paths = &project.config.paths;
    let license = read(&project.resolve(&paths.license))?;
    let manifest = PackageManifest::load(&project.resolve(&paths.package))?;

    let mut out = banner(&project.config.banner.description, &manifest, &license);
    out.push_str("\r\n(function() {\r\n\t\"use strict\";\r\n");
    for file in list_files(&project.resolve(&paths.src))? {
        let source = read(&file)?;
        out.push_str(&lines(&source).collect::<Vec<_>>().join("\r\n\t"));
        out.push_str(CRLF);
    }
    out.push_str("})();");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("polyfills")).unwrap();
        fs::write(root.join("polyfills/b.js"), "var b;").unwrap();
        fs::write(root.join("polyfills/a.js"), "var a;").unwrap();
        fs::create_dir(root.join("src")).unwrap();
        fs::write(root.join("src/animation.js"), "function a() {\n  return 1;\n}").unwrap();
        fs::write(root.join("src/binding.js"), "var x;\r\nvar y;").unwrap();
        fs::write(root.join("LICENSE"), "MIT\n\nCopyright").unwrap();
        fs::write(
            root.join("package.json"),
            r#"{"name": "ellibre", "author": "Jane", "version": "1.0.0"}"#,
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_polyfills_sorted_with_crlf() {
        let dir = project();
        let output = Project::load(dir.path()).unwrap().build(Bundle::Polyfills).unwrap();
        assert_eq!(fs::read_to_string(output).unwrap(), "var a;\r\nvar b;\r\n");
    }

    #[test]
    fn test_banner_prefixes_license_lines() {
        let manifest = PackageManifest {
            author: Some(crate::config::Author::Name("Jane".to_string())),
            version: "1.0.0".to_string(),
        };
        assert_eq!(
            banner("Widgets.", &manifest, "MIT\r\n\r\nCopyright"),
            "/**\n * Widgets.\n * @author Jane\n * @version 1.0.0\n * @license\n * MIT\n * \n * Copyright\n */"
        );
    }

    #[test]
    fn test_library_wraps_sources() {
        let dir = project();
        let output = Project::load(dir.path()).unwrap().build(Bundle::Library).unwrap();
        let text = fs::read_to_string(output).unwrap();

        let body = text.split_once(" */").unwrap().1;
        assert_eq!(
            body,
            "\r\n(function() {\r\n\t\"use strict\";\r\n\
             function a() {\r\n\t  return 1;\r\n\t}\r\n\
             var x;\r\n\tvar y;\r\n\
             })();"
        );
        assert!(text.starts_with("/**\n * Advanced functionalities"));
    }

    #[test]
    fn test_failed_bundle_does_not_stop_the_next() {
        let dir = project();
        fs::remove_dir_all(dir.path().join("polyfills")).unwrap();

        let project = Project::load(dir.path()).unwrap();
        let mut out = Vec::new();
        let failed = project.build_all(&mut out).unwrap();

        assert_eq!(failed, 1);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "building polyfills.js ... NOK\nbuilding ellibre.js ... OK\n"
        );
        assert!(dir.path().join("dist/ellibre.js").exists());
        assert!(!dir.path().join("dist/polyfills.js").exists());
    }

    #[test]
    fn test_missing_manifest_fails_library_only() {
        let dir = project();
        fs::remove_file(dir.path().join("package.json")).unwrap();

        let project = Project::load(dir.path()).unwrap();
        let err = project.build(Bundle::Library).unwrap_err();
        assert!(format!("{err:#}").contains("package.json"));
        assert!(project.build(Bundle::Polyfills).is_ok());
    }
}

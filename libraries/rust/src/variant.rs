use crate::errors::Error;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

pub const VERSION_FILE: &str = ".ab-test-version";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Original,
    Ai,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantProfile {
    pub name: &'static str,
    pub port: u16,
    pub build_dir: &'static str,
    pub index_file: &'static str,
    pub description: &'static str,
}

const ORIGINAL: VariantProfile = VariantProfile {
    name: "Original",
    port: 3001,
    build_dir: "dist",
    index_file: "index.html",
    description: "Traditional trading platform with basic features",
};

const AI: VariantProfile = VariantProfile {
    name: "AI Enhanced",
    port: 3002,
    build_dir: "dist-ai",
    index_file: "index-ai.html",
    description: "AI-powered trading platform with intelligent features",
};

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::Original, Variant::Ai];

    pub fn profile(&self) -> &'static VariantProfile {
        match self {
            Variant::Original => &ORIGINAL,
            Variant::Ai => &AI,
        }
    }

    /// The value stored in the version file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Original => "original",
            Variant::Ai => "ai",
        }
    }

    pub fn local_url(&self) -> String {
        format!("http://localhost:{}", self.profile().port)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "original" | "classic" | "originalversion" => Ok(Variant::Original),
            "ai" | "aiversion" => Ok(Variant::Ai),
            other => Err(format!("unknown variant: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildStatus {
    pub variant: Variant,
    pub path: PathBuf,
    pub built: bool,
    pub files: usize,
}

/// Active dashboard variant, persisted as a bare string in
/// `<root>/.ab-test-version`.
#[derive(Debug, Clone)]
pub struct VariantStore {
    root: PathBuf,
}

impl VariantStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        VariantStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn version_file(&self) -> PathBuf {
        self.root.join(VERSION_FILE)
    }

    /// Never fails: a missing, unreadable or unknown file means `Original`.
    pub fn current(&self) -> Variant {
        let path = self.version_file();

        match fs::read_to_string(&path) {
            Ok(content) => content.parse().unwrap_or_else(|err| {
                warn!("{} in {}, using original", err, path.display());
                Variant::Original
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => Variant::Original,
            Err(err) => {
                warn!("unable to read {}: {}, using original", path.display(), err);
                Variant::Original
            }
        }
    }

    pub fn switch(&self, variant: Variant) -> Result<(), Error> {
        fs::write(self.version_file(), variant.as_str())?;
        info!("active variant set to {}", variant);
        Ok(())
    }

    pub fn build_status(&self) -> Result<Vec<BuildStatus>, Error> {
        Variant::ALL
            .iter()
            .map(|variant| {
                let path = self.root.join(variant.profile().build_dir);

                let (built, files) = if path.is_dir() {
                    (true, fs::read_dir(&path)?.count())
                } else {
                    (false, 0)
                };

                Ok(BuildStatus {
                    variant: *variant,
                    path,
                    built,
                    files,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use temp_dir::TempDir;

    #[test]
    fn test_variant_from_str() {
        assert_eq!("ai".parse::<Variant>(), Ok(Variant::Ai));
        assert_eq!(" AI ".parse::<Variant>(), Ok(Variant::Ai));
        assert_eq!("classic".parse::<Variant>(), Ok(Variant::Original));
        assert_eq!("aiVersion".parse::<Variant>(), Ok(Variant::Ai));
        assert!("beta".parse::<Variant>().is_err());
    }

    #[test]
    fn test_current_defaults_to_original() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let store = VariantStore::new(dir.path());

        assert_eq!(store.current(), Variant::Original);
    }

    #[test]
    fn test_switch_persists_across_stores() {
        let dir = TempDir::new().expect("failed to create temp dir");

        VariantStore::new(dir.path())
            .switch(Variant::Ai)
            .expect("failed to switch");

        let content = fs::read_to_string(dir.path().join(VERSION_FILE)).expect("missing file");
        assert_eq!(content, "ai");
        assert_eq!(VariantStore::new(dir.path()).current(), Variant::Ai);
    }

    #[test]
    fn test_current_trims_and_rejects_garbage() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let store = VariantStore::new(dir.path());

        fs::write(store.version_file(), "ai\n").expect("failed to write");
        assert_eq!(store.current(), Variant::Ai);

        fs::write(store.version_file(), "something-else").expect("failed to write");
        assert_eq!(store.current(), Variant::Original);
    }

    #[test]
    fn test_build_status() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let dist = dir.path().join("dist");
        fs::create_dir(&dist).expect("failed to create dist");
        fs::write(dist.join("index.html"), "<html></html>").expect("failed to write");
        fs::write(dist.join("app.js"), "").expect("failed to write");

        let statuses = VariantStore::new(dir.path())
            .build_status()
            .expect("failed to read build status");

        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].variant, Variant::Original);
        assert!(statuses[0].built);
        assert_eq!(statuses[0].files, 2);
        assert_eq!(statuses[1].variant, Variant::Ai);
        assert!(!statuses[1].built);
        assert_eq!(statuses[1].path, dir.path().join("dist-ai"));
    }

    #[test]
    fn test_profiles() {
        assert_eq!(Variant::Ai.profile().port, 3002);
        assert_eq!(Variant::Original.profile().index_file, "index.html");
        assert_eq!(Variant::Ai.local_url(), "http://localhost:3002");
    }
}

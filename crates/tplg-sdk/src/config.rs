use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tplg_build::BuildOptions;
use tplg_types::abi::{ABI_VERSION, MAX_PRIV_SIZE};
use tplg_writer::WriterOptions;

use crate::error::{TplgError, TplgResult};

/// Settings for one compilation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// ABI version stamped into every block header.
    pub abi_version: u32,
    /// Topology version stamped into every block header.
    pub version: u32,
    /// Largest private data block, in bytes. Clamped to the ABI cap.
    pub max_private_size: usize,
    /// Directories searched for `file` sources of data sections.
    pub include_dirs: Vec<PathBuf>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            abi_version: ABI_VERSION,
            version: 0,
            max_private_size: MAX_PRIV_SIZE,
            include_dirs: Vec::new(),
        }
    }
}

impl CompilerConfig {
    /// Parse a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(text: &str) -> TplgResult<Self> {
        toml::from_str(text).map_err(|e| TplgError::Config(e.to_string()))
    }

    /// Load a TOML file.
    pub fn load(path: &Path) -> TplgResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| TplgError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> TplgResult<String> {
        toml::to_string_pretty(self).map_err(|e| TplgError::Config(e.to_string()))
    }

    /// The effective private data cap.
    pub fn private_cap(&self) -> usize {
        self.max_private_size.min(MAX_PRIV_SIZE)
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            max_private_size: self.private_cap(),
        }
    }

    pub fn writer_options(&self) -> WriterOptions {
        WriterOptions {
            abi_version: self.abi_version,
            version: self.version,
        }
    }

    /// Find `name` in the include directories, falling back to `base`
    /// (normally the directory of the source being loaded).
    pub fn resolve_file(&self, name: &str, base: Option<&Path>) -> Option<PathBuf> {
        let path = Path::new(name);
        if path.is_absolute() {
            return path.exists().then(|| path.to_path_buf());
        }
        base.into_iter()
            .chain(self.include_dirs.iter().map(PathBuf::as_path))
            .map(|dir| dir.join(path))
            .chain(std::iter::once(path.to_path_buf()))
            .find(|candidate| candidate.exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CompilerConfig::default();
        assert_eq!(config.abi_version, 5);
        assert_eq!(config.version, 0);
        assert_eq!(config.max_private_size, 128 * 1024);
        assert!(config.include_dirs.is_empty());
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config = CompilerConfig::from_toml_str("version = 3\n").unwrap();
        assert_eq!(config.version, 3);
        assert_eq!(config.abi_version, 5);
        assert_eq!(config.writer_options().version, 3);
    }

    #[test]
    fn private_cap_is_clamped() {
        let config = CompilerConfig::from_toml_str("max_private_size = 999999999").unwrap();
        assert_eq!(config.private_cap(), MAX_PRIV_SIZE);
        assert_eq!(config.build_options().max_private_size, MAX_PRIV_SIZE);
    }

    #[test]
    fn bad_toml_is_config_error() {
        let err = CompilerConfig::from_toml_str("version = \"three\"").unwrap_err();
        assert!(matches!(err, TplgError::Config(_)));
    }

    #[test]
    fn toml_round_trip() {
        let config = CompilerConfig {
            include_dirs: vec![PathBuf::from("/usr/share/alsa/topology")],
            version: 2,
            ..Default::default()
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(CompilerConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn resolve_file_searches_include_dirs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("coeffs.bin"), [1u8, 2]).unwrap();
        let config = CompilerConfig {
            include_dirs: vec![dir.path().to_path_buf()],
            ..Default::default()
        };
        assert_eq!(
            config.resolve_file("coeffs.bin", None),
            Some(dir.path().join("coeffs.bin"))
        );
        assert!(config.resolve_file("missing.bin", None).is_none());
    }
}

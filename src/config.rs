use std::path::{Path, PathBuf};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::data::constants::{DEFAULT_ENERGY_CEILING_EV, DEFAULT_HEADER_LINES};

/// Name of the optional per-dataset configuration file.
pub const CONFIG_FILE_NAME: &str = "alecs.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

// ---------------------------------------------------------------------------
// Dataset layout
// ---------------------------------------------------------------------------

/// Where the dataset lives on disk and how its tables are read.
///
/// Every field has a default matching the published ALeCS layout:
///
/// ```text
/// <root>/
///   molLatex.txt      identifier → display label
///   BEB/<id>.dat      cross-section tables
///   pdbs/<id>.pdb     3-D structures
///   xyz/<id>.xyz      atom lists (mass ordering only)
///   alecs.toml        optional overrides
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatasetConfig {
    /// Dataset root. Relative paths below resolve against it. Not read from
    /// the config file itself.
    #[serde(skip)]
    pub root: PathBuf,
    pub catalog_file: PathBuf,
    pub cross_section_dir: PathBuf,
    pub cross_section_extension: String,
    pub structure_dir: PathBuf,
    pub structure_extension: String,
    pub atom_list_dir: PathBuf,
    pub header_lines: usize,
    /// Inclusive energy ceiling in eV; `None` keeps every row. In the
    /// config file, `false` or a value of zero or less turns it off.
    #[serde(deserialize_with = "deserialize_ceiling")]
    pub energy_ceiling_ev: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CeilingSetting {
    Enabled(bool),
    Ev(f64),
}

fn deserialize_ceiling<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    match CeilingSetting::deserialize(d)? {
        CeilingSetting::Enabled(false) => Ok(None),
        CeilingSetting::Enabled(true) => Err(D::Error::custom(
            "energy_ceiling_ev = true is ambiguous, give the ceiling in eV",
        )),
        CeilingSetting::Ev(v) if v.is_nan() => {
            Err(D::Error::custom("energy_ceiling_ev must be a number"))
        }
        CeilingSetting::Ev(v) if v <= 0.0 => Ok(None),
        CeilingSetting::Ev(v) => Ok(Some(v)),
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            catalog_file: PathBuf::from("molLatex.txt"),
            cross_section_dir: PathBuf::from("BEB"),
            cross_section_extension: "dat".to_string(),
            structure_dir: PathBuf::from("pdbs"),
            structure_extension: "pdb".to_string(),
            atom_list_dir: PathBuf::from("xyz"),
            header_lines: DEFAULT_HEADER_LINES,
            energy_ceiling_ev: Some(DEFAULT_ENERGY_CEILING_EV),
        }
    }
}

impl DatasetConfig {
    /// Default layout rooted at `root`.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Read `<root>/alecs.toml` if present, otherwise use the defaults.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(CONFIG_FILE_NAME);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No {CONFIG_FILE_NAME} in {}, using defaults", root.display());
                return Ok(Self::for_root(root));
            }
            Err(source) => return Err(ConfigError::Io { path, source }),
        };
        let mut config = Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        config.root = root.to_path_buf();
        log::info!("Loaded dataset configuration from {}", path.display());
        Ok(config)
    }

    fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.root.join(&self.catalog_file)
    }

    pub fn cross_section_dir(&self) -> PathBuf {
        self.root.join(&self.cross_section_dir)
    }

    pub fn structure_path(&self, id: &str) -> PathBuf {
        self.root
            .join(&self.structure_dir)
            .join(format!("{id}.{}", self.structure_extension))
    }

    pub fn atom_list_path(&self, id: &str) -> PathBuf {
        self.root.join(&self.atom_list_dir).join(format!("{id}.xyz"))
    }
}

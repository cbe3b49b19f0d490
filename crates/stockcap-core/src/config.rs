//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `stockcap-config.yaml` at the
//! project root. Every section and field has a default, so an empty file
//! is a valid configuration.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use stockcap_limits::DEFAULT_MAX_EDITABLE_LIMIT;
use stockcap_types::{Cell, StorageKind};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StockcapConfig {
    /// Limit editing and persistence.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// The hauling simulation run by the engine binary.
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl StockcapConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `STOCKCAP_SNAPSHOT_PATH` overrides `limits.snapshot_path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.limits.apply_env_overrides();
        Ok(config)
    }
}

/// Limit editing and persistence settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LimitsConfig {
    /// Largest value the operator edit field accepts.
    #[serde(default = "default_max_editable_limit")]
    pub max_editable_limit: u32,

    /// Where the limit snapshot is read from and written to.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
}

impl LimitsConfig {
    /// Override the snapshot path from the environment when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("STOCKCAP_SNAPSHOT_PATH") {
            self.snapshot_path = val;
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_editable_limit: default_max_editable_limit(),
            snapshot_path: default_snapshot_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) used when `RUST_LOG` is
    /// unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Parameters for the hauling simulation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Random seed for reproducible runs.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of discrete steps to run.
    #[serde(default = "default_steps")]
    pub steps: u64,

    /// Number of hauling agents.
    #[serde(default = "default_agents")]
    pub agents: u32,

    /// Largest stack an agent carries in one haul.
    #[serde(default = "default_max_carry")]
    pub max_carry: u32,

    /// Storage locations to create, in destination priority order.
    #[serde(default = "default_stockpiles")]
    pub stockpiles: Vec<StockpileConfig>,

    /// Loose stacks lying around at the start.
    #[serde(default = "default_ground_items")]
    pub ground_items: Vec<GroundItemConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            steps: default_steps(),
            agents: default_agents(),
            max_carry: default_max_carry(),
            stockpiles: default_stockpiles(),
            ground_items: default_ground_items(),
        }
    }
}

/// One storage location in the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StockpileConfig {
    /// Display name.
    pub name: String,

    /// What kind of storage owns the policy.
    #[serde(default = "default_owner")]
    pub owner: StorageKind,

    /// Column of the top-left cell.
    #[serde(default)]
    pub x: i32,

    /// Row of the top-left cell.
    #[serde(default)]
    pub z: i32,

    /// Width in cells.
    #[serde(default = "default_extent")]
    pub width: u32,

    /// Depth in cells.
    #[serde(default = "default_extent")]
    pub depth: u32,

    /// Quantity limits by resource kind name. Zero or negative means none.
    #[serde(default)]
    pub limits: BTreeMap<String, i64>,

    /// Step at which this stockpile is torn down, if ever.
    #[serde(default)]
    pub demolish_at_step: Option<u64>,
}

impl StockpileConfig {
    /// The cells covered by this stockpile's rectangle.
    ///
    /// Cells whose coordinates would overflow are left out.
    pub fn cells(&self) -> Vec<Cell> {
        let mut cells = Vec::new();
        for dx in 0..self.width {
            for dz in 0..self.depth {
                let x = i32::try_from(dx).ok().and_then(|dx| self.x.checked_add(dx));
                let z = i32::try_from(dz).ok().and_then(|dz| self.z.checked_add(dz));
                if let (Some(x), Some(z)) = (x, z) {
                    cells.push(Cell::new(x, z));
                }
            }
        }
        cells
    }
}

/// A loose stack placed at the start of the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GroundItemConfig {
    /// Resource kind name.
    pub kind: String,

    /// Units in the stack.
    pub count: u32,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_max_editable_limit() -> u32 {
    DEFAULT_MAX_EDITABLE_LIMIT
}

fn default_snapshot_path() -> String {
    "stockcap-limits.json".to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_steps() -> u64 {
    30
}

const fn default_agents() -> u32 {
    4
}

const fn default_max_carry() -> u32 {
    25
}

const fn default_owner() -> StorageKind {
    StorageKind::Stockpile
}

const fn default_extent() -> u32 {
    1
}

fn default_stockpiles() -> Vec<StockpileConfig> {
    vec![
        StockpileConfig {
            name: "Steel yard".to_owned(),
            owner: StorageKind::Stockpile,
            x: 0,
            z: 0,
            width: 2,
            depth: 2,
            limits: BTreeMap::from([("steel".to_owned(), 50)]),
            demolish_at_step: None,
        },
        StockpileConfig {
            name: "Overflow shelf".to_owned(),
            owner: StorageKind::Shelf,
            x: 10,
            z: 0,
            width: 1,
            depth: 1,
            limits: BTreeMap::from([("steel".to_owned(), 20), ("wood".to_owned(), 30)]),
            demolish_at_step: None,
        },
    ]
}

fn default_ground_items() -> Vec<GroundItemConfig> {
    let stack = |kind: &str, count: u32| GroundItemConfig {
        kind: kind.to_owned(),
        count,
    };
    vec![
        stack("steel", 30),
        stack("steel", 30),
        stack("steel", 25),
        stack("wood", 40),
        stack("steel", 10),
        stack("wood", 15),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = StockcapConfig::default();
        assert_eq!(config.limits.max_editable_limit, 9999);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.simulation.seed, 42);
        assert_eq!(config.simulation.stockpiles.len(), 2);
        assert!(!config.simulation.ground_items.is_empty());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
limits:
  max_editable_limit: 500
  snapshot_path: "/tmp/limits.json"

logging:
  level: "debug"

simulation:
  seed: 7
  steps: 12
  agents: 2
  max_carry: 10
  stockpiles:
    - name: "Armory"
      owner: Shelf
      x: 3
      z: 4
      width: 2
      depth: 1
      limits:
        steel: 15
        wood: 0
      demolish_at_step: 6
  ground_items:
    - kind: steel
      count: 9
"#;

        let config = StockcapConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.limits.max_editable_limit, 500);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.simulation.seed, 7);
        assert_eq!(config.simulation.agents, 2);
        let armory = config.simulation.stockpiles.first();
        assert_eq!(armory.map(|s| s.owner), Some(StorageKind::Shelf));
        assert_eq!(armory.and_then(|s| s.limits.get("steel")).copied(), Some(15));
        assert_eq!(armory.and_then(|s| s.demolish_at_step), Some(6));
        assert_eq!(
            armory.map(StockpileConfig::cells),
            Some(vec![Cell::new(3, 4), Cell::new(4, 4)])
        );
        assert_eq!(config.simulation.ground_items.len(), 1);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = StockcapConfig::parse("simulation:\n  seed: 9\n");
        let config = config.ok().unwrap_or_default();
        assert_eq!(config.simulation.seed, 9);
        // Everything else uses defaults.
        assert_eq!(config.simulation.steps, 30);
        assert_eq!(config.limits.max_editable_limit, 9999);
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(StockcapConfig::parse("").is_ok());
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let config = StockcapConfig::parse("limits: [unclosed");
        assert!(matches!(config, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn stockpile_cells_skip_overflow() {
        let pile = StockpileConfig {
            name: "Edge".to_owned(),
            owner: StorageKind::Stockpile,
            x: i32::MAX,
            z: 0,
            width: 2,
            depth: 1,
            limits: BTreeMap::new(),
            demolish_at_step: None,
        };
        assert_eq!(pile.cells(), vec![Cell::new(i32::MAX, 0)]);
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("stockcap-config.yaml");
        if path.exists() {
            let config = StockcapConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}

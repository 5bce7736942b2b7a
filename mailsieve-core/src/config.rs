//! Scan configuration — action thresholds, scoring knobs, symbol definitions.
//!
//! The config is deserialized from TOML into raw tables, then resolved into
//! a [`ScanConfig`] with a populated [`SymbolRegistry`]. Resolution is where
//! cross-references are checked: an action name must parse, and a symbol may
//! only reference groups declared in the same config.

use crate::domain::{Action, SymbolDef, SymbolFlags, SymbolGroup};
use crate::registry::{SymbolCache, SymbolRegistry};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors from configuration parsing and resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config syntax: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown action \"{0}\" in threshold ladder")]
    UnknownAction(String),

    #[error("symbol {symbol} references unknown group {group}")]
    UnknownGroup { symbol: String, group: String },
}

/// Resolved scan configuration.
pub struct ScanConfig {
    /// Action threshold ladder. Absent actions are treated as disabled (NaN).
    pub actions: BTreeMap<Action, f64>,
    /// Multiplier amplifying successive positive contributions within one
    /// message. 1.0 disables amplification.
    pub grow_factor: f64,
    /// Default maximum counted hits per symbol, and the cap on distinct
    /// options per symbol.
    pub default_max_shots: u32,
    /// Symbol and group definitions.
    pub symbols: SymbolRegistry,
    /// Optional usage-frequency cache, bumped after successful insertions.
    pub cache: Option<Arc<dyn SymbolCache>>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            actions: BTreeMap::new(),
            grow_factor: 1.0,
            default_max_shots: 100,
            symbols: SymbolRegistry::new(),
            cache: None,
        }
    }
}

impl fmt::Debug for ScanConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanConfig")
            .field("actions", &self.actions)
            .field("grow_factor", &self.grow_factor)
            .field("default_max_shots", &self.default_max_shots)
            .field("symbols", &self.symbols)
            .field("cache", &self.cache.as_ref().map(|_| "<cache>"))
            .finish()
    }
}

// ── Raw TOML schema ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawConfig {
    grow_factor: Option<f64>,
    default_max_shots: Option<u32>,
    #[serde(default)]
    actions: BTreeMap<String, f64>,
    #[serde(default)]
    groups: BTreeMap<String, RawGroup>,
    #[serde(default)]
    symbols: BTreeMap<String, RawSymbol>,
}

#[derive(Debug, Deserialize)]
struct RawGroup {
    #[serde(default)]
    max_score: f64,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSymbol {
    #[serde(default)]
    weight: f64,
    description: Option<String>,
    #[serde(default)]
    groups: Vec<String>,
    #[serde(default)]
    one_shot: bool,
    #[serde(default)]
    one_param: bool,
    #[serde(default)]
    nshots: u32,
}

impl ScanConfig {
    /// Parse and resolve a TOML configuration.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(input)?;
        let mut config = ScanConfig {
            grow_factor: raw.grow_factor.unwrap_or(1.0),
            default_max_shots: raw.default_max_shots.unwrap_or(100),
            ..ScanConfig::default()
        };

        for (name, threshold) in raw.actions {
            let action = name
                .parse::<Action>()
                .map_err(|_| ConfigError::UnknownAction(name))?;
            config.actions.insert(action, threshold);
        }

        for (name, group) in raw.groups {
            let mut built = SymbolGroup::new(name, group.max_score);
            if let Some(desc) = group.description {
                built = built.with_description(desc);
            }
            config.symbols.insert_group(built);
        }

        for (name, sym) in raw.symbols {
            let mut flags = SymbolFlags::empty();
            if sym.one_shot {
                flags |= SymbolFlags::ONE_SHOT;
            }
            if sym.one_param {
                flags |= SymbolFlags::ONE_PARAM;
            }
            let mut def = SymbolDef::new(name.clone(), sym.weight)
                .with_flags(flags)
                .with_nshots(sym.nshots);
            if let Some(desc) = sym.description {
                def = def.with_description(desc);
            }
            for group_name in sym.groups {
                let handle = config.symbols.group(&group_name).cloned().ok_or_else(|| {
                    ConfigError::UnknownGroup {
                        symbol: name.clone(),
                        group: group_name.clone(),
                    }
                })?;
                def = def.in_group(handle);
            }
            config.symbols.register(def);
        }

        Ok(config)
    }

    /// Threshold for an action; NaN when the action is disabled.
    pub fn action_limit(&self, action: Action) -> f64 {
        self.actions.get(&action).copied().unwrap_or(f64::NAN)
    }

    pub fn with_cache(mut self, cache: Arc<dyn SymbolCache>) -> Self {
        self.cache = Some(cache);
        self
    }
}

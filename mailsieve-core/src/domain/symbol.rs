//! Static symbol definitions as published by the rule registry.

use super::group::SymbolGroup;
use super::SymbolName;
use bitflags::bitflags;
use std::sync::Arc;

bitflags! {
    /// Behavioral flags attached to a symbol definition.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SymbolFlags: u32 {
        /// Only the first hit of this symbol is scored.
        const ONE_SHOT = 1 << 0;
        /// The symbol carries at most one option string.
        const ONE_PARAM = 1 << 1;
    }
}

/// Registry-side definition of a symbol.
///
/// Definitions are shared immutably (`Arc`); a live configuration reload
/// replaces registry entries rather than mutating them, so results that
/// already hold a definition keep seeing the weights they were scored with.
#[derive(Debug, Clone)]
pub struct SymbolDef {
    pub name: SymbolName,
    /// Static weight; multiplied by the per-hit weight at insertion.
    pub weight: f64,
    pub description: Option<String>,
    pub flags: SymbolFlags,
    /// Maximum number of hits counted; 0 falls back to the config default.
    pub nshots: u32,
    /// Ordered group memberships.
    pub groups: Vec<Arc<SymbolGroup>>,
}

impl SymbolDef {
    pub fn new(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight,
            description: None,
            flags: SymbolFlags::empty(),
            nshots: 0,
            groups: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_flags(mut self, flags: SymbolFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_nshots(mut self, nshots: u32) -> Self {
        self.nshots = nshots;
        self
    }

    pub fn in_group(mut self, group: Arc<SymbolGroup>) -> Self {
        self.groups.push(group);
        self
    }

    pub fn one_shot(&self) -> bool {
        self.flags.contains(SymbolFlags::ONE_SHOT)
    }

    pub fn one_param(&self) -> bool {
        self.flags.contains(SymbolFlags::ONE_PARAM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let def = SymbolDef::new("SPAM_WORD", 5.0);
        assert_eq!(def.weight, 5.0);
        assert_eq!(def.nshots, 0);
        assert!(!def.one_shot());
        assert!(!def.one_param());
        assert!(def.groups.is_empty());
    }

    #[test]
    fn flags_compose() {
        let def = SymbolDef::new("DKIM_ALLOW", -1.0)
            .with_flags(SymbolFlags::ONE_SHOT | SymbolFlags::ONE_PARAM);
        assert!(def.one_shot());
        assert!(def.one_param());
    }

    #[test]
    fn group_membership_preserves_order() {
        let a = Arc::new(SymbolGroup::new("a", 5.0));
        let b = Arc::new(SymbolGroup::new("b", 0.0));
        let def = SymbolDef::new("X", 1.0).in_group(a).in_group(b);
        let names: Vec<&str> = def.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }
}

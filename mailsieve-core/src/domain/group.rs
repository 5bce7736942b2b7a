//! Symbol groups — named aggregation buckets with an optional score cap.

/// A named bucket of symbols sharing a combined score limit.
///
/// A `max_score` of zero or below means the group is uncapped. Symbols may
/// belong to several groups; the strictest cap wins when a contribution is
/// truncated.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolGroup {
    pub name: String,
    pub max_score: f64,
    pub description: Option<String>,
}

impl SymbolGroup {
    pub fn new(name: impl Into<String>, max_score: f64) -> Self {
        Self {
            name: name.into(),
            max_score,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether the group enforces a combined score limit.
    pub fn is_capped(&self) -> bool {
        self.max_score > 0.0
    }
}

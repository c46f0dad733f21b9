use super::scope::DEFAULT_SEPARATOR;

/// Default bound on tree nesting during translation.
pub const DEFAULT_MAX_DEPTH: usize = 500;

/// Knobs for an [`IrBuilder`](super::IrBuilder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderConfig {
    /// Joins scope names into qualified names.
    pub separator: String,
    /// Nodes nested deeper than this fail with a `DepthLimitError`.
    pub max_depth: usize,
    /// Shift line numbers so a decorated function reports positions as if
    /// its decorators were not there.
    pub discount_decorators: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        BuilderConfig {
            separator: DEFAULT_SEPARATOR.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            discount_decorators: true,
        }
    }
}

impl BuilderConfig {
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_discount_decorators(mut self, discount: bool) -> Self {
        self.discount_decorators = discount;
        self
    }
}

// ============================================================================
// spark-view - Constants
// Template syntax markers and display modes shared by the render engine
// ============================================================================

// =============================================================================
// ATTRIBUTE PREFIXES
// =============================================================================

/// Prefix of a bound attribute: `:title="expr"`
pub const BOUND_PREFIX: char = ':';

/// Prefix of an event attribute: `@click="methodName"`
pub const EVENT_PREFIX: char = '@';

/// Prefix of a directive attribute: `e-show="expr"`
pub const DIRECTIVE_PREFIX: &str = "e-";

/// Name of the two-way binding directive: `e-model[:prop]="field"`
pub const MODEL_DIRECTIVE: &str = "model";

/// Live property a model binding targets when no `:prop` suffix is given
pub const DEFAULT_MODEL_PROPERTY: &str = "value";

/// Marker attribute set on the mounted root element
pub const ROOT_MARKER: &str = "data-e-app";

// =============================================================================
// INTERPOLATION
// =============================================================================

/// Opening marker of a `{{ expr }}` segment
pub const INTERPOLATION_OPEN: &str = "{{";

/// Closing marker of a `{{ expr }}` segment
pub const INTERPOLATION_CLOSE: &str = "}}";

// =============================================================================
// EXPRESSIONS
// =============================================================================

/// Tokens that are never resolved as data fields (loop-like fragments)
pub const RESERVED_WORDS: [&str; 2] = ["in", "of"];

// =============================================================================
// DISPLAY MODES
// =============================================================================

/// Display mode of a hidden node
pub const DISPLAY_HIDDEN: &str = "none";

/// Display mode `show` falls back to when no visible mode was ever seen
pub const DISPLAY_FALLBACK: &str = "block";

/// Name of the built-in visibility directive
pub const SHOW_DIRECTIVE: &str = "show";

/// Events that mirror the live `value` into a model's watched attribute
pub const MODEL_SYNC_EVENTS: [&str; 2] = ["input", "change"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_do_not_overlap() {
        assert_ne!(BOUND_PREFIX, EVENT_PREFIX);
        assert!(!DIRECTIVE_PREFIX.starts_with(BOUND_PREFIX));
        assert!(!DIRECTIVE_PREFIX.starts_with(EVENT_PREFIX));
    }

    #[test]
    fn hidden_and_fallback_differ() {
        assert_ne!(DISPLAY_HIDDEN, DISPLAY_FALLBACK);
    }
}

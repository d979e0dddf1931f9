// ============================================================================
// spark-view - Directives
// Named lifecycle hooks attached to nodes through `e-<name>` attributes
// ============================================================================

use std::fmt;
use std::rc::Rc;

use crate::app::App;
use crate::core::constants::{DISPLAY_FALLBACK, DISPLAY_HIDDEN, MODEL_DIRECTIVE};
use crate::core::error::{Error, ExpressionError, InvalidDirectiveError};
use crate::core::types::ElementRef;
use crate::core::value::Value;
use crate::view::snapshot::NodeSnapshot;

/// A directive lifecycle hook.
pub type Hook = Rc<dyn Fn(&DirectiveBinding<'_>) -> Result<(), Error>>;

/// What a hook gets to work with.
pub struct DirectiveBinding<'a> {
    pub app: &'a App,
    /// The live element carrying the directive.
    pub element: ElementRef,
    /// Raw attribute value, usually an expression.
    pub value: &'a str,
    pub snapshot: &'a NodeSnapshot,
}

impl DirectiveBinding<'_> {
    /// Evaluate the attribute value on behalf of the node, subscribing it to
    /// every field the value references.
    pub fn evaluate(&self) -> Result<Value, ExpressionError> {
        self.app.evaluate_for(self.snapshot.id(), self.value)
    }
}

// =============================================================================
// DIRECTIVE
// =============================================================================

/// Hooks for one directive. Every hook is optional.
///
/// # Example
///
/// ```
/// use spark_view::view::directive::Directive;
///
/// let focus = Directive::new()
///     .mounted(|binding| {
///         binding.app.tree().set_attribute(binding.element, "autofocus", "")
///     });
/// assert!(focus.has_mounted());
/// assert!(!focus.has_updated());
/// ```
#[derive(Clone, Default)]
pub struct Directive {
    mounted: Option<Hook>,
    unmount: Option<Hook>,
    updated: Option<Hook>,
}

impl Directive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs once per node, during the first mount pass.
    pub fn mounted(
        mut self,
        hook: impl Fn(&DirectiveBinding<'_>) -> Result<(), Error> + 'static,
    ) -> Self {
        self.mounted = Some(Rc::new(hook));
        self
    }

    /// Runs when the app is unmounted.
    pub fn unmount(
        mut self,
        hook: impl Fn(&DirectiveBinding<'_>) -> Result<(), Error> + 'static,
    ) -> Self {
        self.unmount = Some(Rc::new(hook));
        self
    }

    /// Runs at the end of every render of the node, mount pass included.
    pub fn updated(
        mut self,
        hook: impl Fn(&DirectiveBinding<'_>) -> Result<(), Error> + 'static,
    ) -> Self {
        self.updated = Some(Rc::new(hook));
        self
    }

    pub fn has_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    pub fn has_unmount(&self) -> bool {
        self.unmount.is_some()
    }

    pub fn has_updated(&self) -> bool {
        self.updated.is_some()
    }

    pub(crate) fn mounted_hook(&self) -> Option<Hook> {
        self.mounted.clone()
    }

    pub(crate) fn unmount_hook(&self) -> Option<Hook> {
        self.unmount.clone()
    }

    pub(crate) fn updated_hook(&self) -> Option<Hook> {
        self.updated.clone()
    }
}

impl fmt::Debug for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Directive")
            .field("mounted", &self.has_mounted())
            .field("unmount", &self.has_unmount())
            .field("updated", &self.has_updated())
            .finish()
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Registered directives, in registration order.
#[derive(Debug, Clone, Default)]
pub struct DirectiveRegistry {
    entries: Vec<(String, Directive)>,
}

impl DirectiveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `directive` under `name` (without the `e-` prefix).
    ///
    /// A name that is already registered keeps its position and gets the
    /// new hooks.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        directive: Directive,
    ) -> Result<(), InvalidDirectiveError> {
        let name = name.into();
        validate_name(&name)?;
        match self.entries.iter().position(|(existing, _)| *existing == name) {
            Some(index) => self.entries[index].1 = directive,
            None => self.entries.push((name, directive)),
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Directive> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, directive)| directive)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Owned copy of the entries, for calling hooks without holding a borrow
    /// of the registry.
    pub fn entries(&self) -> Vec<(String, Directive)> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn validate_name(name: &str) -> Result<(), InvalidDirectiveError> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name.chars().any(char::is_whitespace) {
        "name contains whitespace"
    } else if name.contains(':') {
        "name contains `:`"
    } else if name == MODEL_DIRECTIVE {
        "`model` is reserved for two-way binding"
    } else {
        return Ok(());
    };
    Err(InvalidDirectiveError {
        name: name.to_string(),
        reason,
    })
}

// =============================================================================
// BUILT-IN: show
// =============================================================================

/// `e-show="expr"`: hide the node while `expr` is falsy.
///
/// Hiding remembers the node's current display mode; showing a hidden node
/// restores the remembered mode, or `block` when none was ever seen.
pub fn show() -> Directive {
    Directive::new().updated(|binding| {
        let visible = binding.evaluate()?.is_truthy();
        let tree = binding.app.tree();
        let current = tree.display(binding.element);

        if visible {
            if current == DISPLAY_HIDDEN {
                let restored = binding
                    .snapshot
                    .remembered_display()
                    .unwrap_or_else(|| DISPLAY_FALLBACK.to_string());
                tree.set_display(binding.element, &restored);
            }
        } else if current != DISPLAY_HIDDEN {
            binding.snapshot.remember_display(current);
            tree.set_display(binding.element, DISPLAY_HIDDEN);
        }
        Ok(())
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_names_are_rejected() {
        let mut registry = DirectiveRegistry::new();
        for name in ["", "has space", "a:b", "model"] {
            let err = registry.register(name, Directive::new()).unwrap_err();
            assert_eq!(err.name, name);
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn reregistering_replaces_in_place() {
        let mut registry = DirectiveRegistry::new();
        registry.register("a", Directive::new()).unwrap();
        registry.register("b", Directive::new()).unwrap();
        registry
            .register("a", Directive::new().updated(|_| Ok(())))
            .unwrap();

        assert_eq!(registry.names(), vec!["a", "b"]);
        assert!(registry.get("a").unwrap().has_updated());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn show_only_updates() {
        let directive = show();
        assert!(directive.has_updated());
        assert!(!directive.has_mounted());
        assert!(!directive.has_unmount());
    }
}

// ============================================================================
// spark-view - Render Steps
// One render pass over one node snapshot
// ============================================================================
//
// Order of a pass:
//   bind @events (once per snapshot)
//   directive `mounted` hooks (first mount pass only)
//   :attr bindings
//   e-model bindings
//   text interpolation
//   directive `updated` hooks
//
// Nothing here holds a borrow of engine state while calling into the host,
// a hook or a method: any of them may re-enter the app.
// ============================================================================

use std::rc::Rc;

use tracing::{debug, trace, warn};

use super::directive::{Directive, DirectiveBinding, Hook};
use super::interpolate;
use super::snapshot::{AttributeKind, NodeSnapshot};
use crate::app::App;
use crate::core::constants::{
    DEFAULT_MODEL_PROPERTY, DIRECTIVE_PREFIX, EVENT_PREFIX, MODEL_SYNC_EVENTS,
};
use crate::core::error::{Error, ExpressionError};
use crate::core::types::Event;

/// Render `snapshot` once. `mount_pass` is true only during the initial
/// mount walk.
pub(crate) fn render_snapshot(
    app: &App,
    snapshot: &NodeSnapshot,
    mount_pass: bool,
) -> Result<(), Error> {
    trace!(node = %snapshot.id(), tag = snapshot.tag(), mount_pass, "render");

    bind_events(app, snapshot);
    if mount_pass {
        run_directive_hooks(app, snapshot, Directive::mounted_hook)?;
    }
    render_bound_attributes(app, snapshot)?;
    render_models(app, snapshot)?;
    render_text(app, snapshot)?;
    run_directive_hooks(app, snapshot, Directive::updated_hook)?;
    Ok(())
}

// =============================================================================
// EVENTS
// =============================================================================

fn bind_events(app: &App, snapshot: &NodeSnapshot) {
    if snapshot.events_bound() {
        return;
    }
    let tree = app.tree();
    let element = snapshot.element();

    for binding in snapshot.events() {
        let handle = app.downgrade();
        let method = binding.method.clone();
        let listener = tree.add_event_listener(
            element,
            &binding.event,
            Rc::new(move |event: &Event| match handle.upgrade() {
                Some(app) => app.call_method(&method, event),
                None => Ok(()),
            }),
        );
        snapshot.track_listener(listener);
        tree.remove_attribute(element, &format!("{EVENT_PREFIX}{}", binding.event));
        trace!(node = %snapshot.id(), event = %binding.event, method = %binding.method, "event bound");
    }
    snapshot.mark_events_bound();
}

// =============================================================================
// DIRECTIVES
// =============================================================================

/// Run one kind of hook for every directive active on the node.
///
/// A directive is active while its `e-<name>` attribute is present and
/// non-empty on the live element.
pub(crate) fn run_directive_hooks(
    app: &App,
    snapshot: &NodeSnapshot,
    select: fn(&Directive) -> Option<Hook>,
) -> Result<(), Error> {
    let tree = app.tree();
    let element = snapshot.element();

    for (name, directive) in app.directive_entries() {
        let Some(hook) = select(&directive) else {
            continue;
        };
        let value = match tree.attribute(element, &format!("{DIRECTIVE_PREFIX}{name}")) {
            Some(value) if !value.is_empty() => value,
            _ => continue,
        };
        hook(&DirectiveBinding {
            app,
            element,
            value: &value,
            snapshot,
        })?;
    }
    Ok(())
}

// =============================================================================
// ATTRIBUTE BINDINGS
// =============================================================================

fn render_bound_attributes(app: &App, snapshot: &NodeSnapshot) -> Result<(), Error> {
    for attribute in snapshot.attributes() {
        if let AttributeKind::Bound { target } = &attribute.kind {
            let value = app.evaluate_for(snapshot.id(), &attribute.value)?;
            app.tree()
                .set_attribute(snapshot.element(), target, &value.to_string())?;
        }
    }
    Ok(())
}

// =============================================================================
// TWO-WAY BINDINGS
// =============================================================================

fn render_models(app: &App, snapshot: &NodeSnapshot) -> Result<(), Error> {
    let element = snapshot.element();

    for attribute in snapshot.attributes() {
        let AttributeKind::Model { property, field } = &attribute.kind else {
            continue;
        };
        if !app.store().contains(field) {
            warn!(node = %snapshot.id(), field = %field, "model bound to an undeclared field, skipped");
            continue;
        }

        let value = app.store().get(field, Some(snapshot.id()))?.to_string();
        let tree = app.tree();
        tree.set_attribute(element, property, &value)?;
        if tree.property(element, property).is_some() {
            tree.set_property(element, property, &value);
        }

        if snapshot.observe_property(property) {
            observe_model(app, snapshot, property, field);
        }
    }
    Ok(())
}

/// Install the live-to-store half of a two-way binding.
fn observe_model(app: &App, snapshot: &NodeSnapshot, property: &str, field: &str) {
    let tree = app.tree();
    let element = snapshot.element();

    let handle = app.downgrade();
    let field_name = field.to_string();
    let observer = tree.on_value_changed(
        element,
        property,
        Rc::new(move |raw: &str| {
            let Some(app) = handle.upgrade() else {
                return Ok(());
            };
            let current = app.get(&field_name)?;
            app.set(&field_name, current.coerce_like(raw))?;
            Ok(())
        }),
    );
    snapshot.track_listener(observer);

    // Typing changes the live `value` property only; copy it into the
    // watched attribute so the observer above sees it. Whatever the write
    // back raises is returned to the host's dispatch.
    for event in MODEL_SYNC_EVENTS {
        let handle = app.downgrade();
        let watched = property.to_string();
        let listener = tree.add_event_listener(
            element,
            event,
            Rc::new(move |_: &Event| {
                let Some(app) = handle.upgrade() else {
                    return Ok(());
                };
                let tree = app.tree();
                let live = tree
                    .property(element, DEFAULT_MODEL_PROPERTY)
                    .unwrap_or_default();
                tree.set_attribute(element, &watched, &live)
            }),
        );
        snapshot.track_listener(listener);
    }

    debug!(node = %snapshot.id(), property, field, "model observer installed");
}

// =============================================================================
// TEXT
// =============================================================================

fn render_text(app: &App, snapshot: &NodeSnapshot) -> Result<(), ExpressionError> {
    let tree = app.tree();
    for text in snapshot.texts() {
        let rendered = interpolate::render(&text.original, |code| {
            app.evaluate_for(snapshot.id(), code)
        })?;
        tree.set_text_content(text.node, &rendered);
    }
    Ok(())
}

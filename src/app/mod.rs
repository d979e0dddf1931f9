// ============================================================================
// spark-view - App
// Mounts a presentation tree, owns the data and re-renders what changed
// ============================================================================

mod options;

pub use options::{AppOptions, Method};

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, error, instrument, warn};

use options::MountedCallback;

use crate::core::constants::{EVENT_PREFIX, ROOT_MARKER, SHOW_DIRECTIVE};
use crate::core::error::{
    ConstructionError, ExpressionError, InvalidDirectiveError, RenderTargetError, Result,
};
use crate::core::types::{ElementRef, Event, NodeId};
use crate::core::value::Value;
use crate::expression::Evaluator;
use crate::reactivity::store::DataStore;
use crate::view::directive::{self, Directive, DirectiveRegistry};
use crate::view::render::{render_snapshot, run_directive_hooks};
use crate::view::snapshot::{NodeSnapshot, capture_tree, descendants, link_parents};
use crate::view::tree::PresentationTree;

// =============================================================================
// APP
// =============================================================================

struct AppInner {
    tree: Box<dyn PresentationTree>,
    store: DataStore,
    evaluator: Evaluator,
    methods: RefCell<HashMap<String, Method>>,
    directives: RefCell<DirectiveRegistry>,

    /// Snapshot arena of the current mount, indexed by `NodeId::index`.
    nodes: RefCell<Vec<Rc<NodeSnapshot>>>,
    root: Cell<Option<NodeId>>,
    /// Bumped by every unmount; ids and listeners from older mounts go dead.
    generation: Cell<u32>,
    initialized: Cell<bool>,
    mounted: RefCell<Option<MountedCallback>>,
}

/// A mounted (or mountable) view.
///
/// `App` is a cheap handle: clones share the same data, methods and tree.
/// Listeners installed on the host hold only a weak handle, so dropping every
/// `App` clone turns them into no-ops.
///
/// # Example
///
/// ```
/// use spark_view::{App, AppOptions, MemoryTree};
///
/// let tree = MemoryTree::new();
/// let root = tree.element_with("div", &[("id", "app")]);
/// let greeting = tree.child(root, "p", &[]);
/// let text = tree.append_text(greeting, "Hello {{ name }}!");
///
/// let app = App::new(
///     tree.clone(),
///     AppOptions::new().element_selector("#app").data("name", "Ann"),
/// )
/// .unwrap();
/// assert_eq!(tree.text(text), "Hello Ann!");
///
/// app.set("name", "Bo").unwrap();
/// assert_eq!(tree.text(text), "Hello Bo!");
/// ```
#[derive(Clone)]
pub struct App {
    inner: Rc<AppInner>,
}

/// Weak handle held by host listeners. Upgrades only while the mount it was
/// created for is still current.
#[derive(Clone)]
pub(crate) struct WeakApp {
    inner: Weak<AppInner>,
    generation: u32,
}

impl WeakApp {
    pub(crate) fn upgrade(&self) -> Option<App> {
        let app = App {
            inner: self.inner.upgrade()?,
        };
        app.is_live(self.generation).then_some(app)
    }
}

impl App {
    /// Build an app over `tree`, mounting it right away when the options
    /// name a root selector.
    ///
    /// User directives are registered first, then the built-in `show`.
    pub fn new<T: PresentationTree + 'static>(tree: T, options: AppOptions) -> Result<App> {
        let AppOptions {
            element_selector,
            mounted,
            data,
            methods,
            directives,
        } = options;

        let mut registry = DirectiveRegistry::new();
        for (name, directive) in directives {
            registry.register(name, directive)?;
        }
        registry.register(SHOW_DIRECTIVE, directive::show())?;

        let store = DataStore::new();
        for (field, value) in data {
            store.declare(field, value);
        }

        let app = App {
            inner: Rc::new(AppInner {
                tree: Box::new(tree),
                store,
                evaluator: Evaluator::new(),
                methods: RefCell::new(methods.into_iter().collect()),
                directives: RefCell::new(registry),
                nodes: RefCell::new(Vec::new()),
                root: Cell::new(None),
                generation: Cell::new(0),
                initialized: Cell::new(false),
                mounted: RefCell::new(mounted),
            }),
        };

        if let Some(selector) = element_selector {
            app.mount(&selector)?;
        }
        Ok(app)
    }

    // =========================================================================
    // MOUNTING
    // =========================================================================

    /// Snapshot the tree under `selector` and render every node below it.
    ///
    /// The root itself is marked with `data-e-app` but not rendered. The
    /// `mounted` callback runs after the first successful mount only.
    #[instrument(skip(self))]
    pub fn mount(&self, selector: &str) -> Result<()> {
        if self.inner.root.get().is_some() {
            return Err(ConstructionError::AlreadyMounted.into());
        }
        let tree = self.tree();
        let root = tree
            .select(selector)
            .ok_or_else(|| ConstructionError::MissingRoot {
                selector: selector.to_string(),
            })?;
        tree.set_attribute(root, ROOT_MARKER, "")?;

        let mut arena = Vec::new();
        let root_id = capture_tree(tree, root, self.inner.generation.get(), &mut arena);
        link_parents(&arena);
        let order = descendants(&arena, root_id);
        debug!(nodes = arena.len(), root = %root_id, "tree captured");

        *self.inner.nodes.borrow_mut() = arena;
        self.inner.root.set(Some(root_id));

        for id in order {
            if let Some(snapshot) = self.snapshot(id) {
                render_snapshot(self, &snapshot, true)?;
            }
        }
        self.inner.initialized.set(true);
        debug!("mounted");

        let callback = self.inner.mounted.borrow_mut().take();
        if let Some(callback) = callback {
            callback(self)?;
        }
        Ok(())
    }

    /// Tear the current mount down.
    ///
    /// Active directives get their `unmount` hook. Every listener and value
    /// observer this mount registered is detached from the host, text nodes
    /// get their mount-time content back and `@event` attributes return to
    /// the live nodes. Every dependency edge is dropped. Data and methods
    /// survive, so the app can be mounted again. The first error is returned
    /// after teardown completes.
    pub fn unmount(&self) -> Result<()> {
        let Some(root) = self.inner.root.get() else {
            return Ok(());
        };
        let nodes = self.inner.nodes.borrow().clone();

        let mut first_error = None;
        for id in descendants(&nodes, root) {
            let Some(snapshot) = nodes.get(id.index()) else {
                continue;
            };
            if let Err(err) = run_directive_hooks(self, snapshot, Directive::unmount_hook) {
                error!(node = %id, error = %err, "unmount hook failed");
                first_error.get_or_insert(err);
            }
        }

        let tree = self.tree();
        for snapshot in nodes.iter() {
            for listener in snapshot.take_listeners() {
                tree.remove_listener(snapshot.element(), listener);
            }
            for text in snapshot.texts() {
                tree.set_text_content(text.node, &text.original);
            }
            if !snapshot.events_bound() {
                continue;
            }
            for binding in snapshot.events() {
                let restored = tree.set_attribute(
                    snapshot.element(),
                    &format!("{EVENT_PREFIX}{}", binding.event),
                    &binding.method,
                );
                if let Err(err) = restored {
                    first_error.get_or_insert(err);
                }
            }
        }
        if let Some(root_snapshot) = nodes.get(root.index()) {
            tree.remove_attribute(root_snapshot.element(), ROOT_MARKER);
        }

        self.inner.store.clear_subscriptions();
        self.inner.nodes.borrow_mut().clear();
        self.inner.root.set(None);
        self.inner.initialized.set(false);
        self.inner
            .generation
            .set(self.inner.generation.get().wrapping_add(1));
        debug!(nodes = nodes.len(), "unmounted");

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.root.get().is_some()
    }

    /// True once the initial mount walk has finished.
    pub fn is_initialized(&self) -> bool {
        self.inner.initialized.get()
    }

    fn is_live(&self, generation: u32) -> bool {
        self.is_mounted() && self.inner.generation.get() == generation
    }

    pub(crate) fn downgrade(&self) -> WeakApp {
        WeakApp {
            inner: Rc::downgrade(&self.inner),
            generation: self.inner.generation.get(),
        }
    }

    // =========================================================================
    // DATA
    // =========================================================================

    /// Declare a new field. Returns false (and keeps the old value) when the
    /// field already exists.
    pub fn declare(&self, field: impl Into<String>, initial: impl Into<Value>) -> bool {
        self.inner.store.declare(field, initial.into())
    }

    /// Read a field without subscribing anything.
    pub fn get(&self, field: &str) -> Result<Value> {
        self.inner.store.get(field, None)
    }

    /// Write a field and synchronously re-render its subscribers.
    ///
    /// Returns false when the value was equal to the current one, in which
    /// case nothing re-renders.
    pub fn set(&self, field: &str, value: impl Into<Value>) -> Result<bool> {
        let Some(subscribers) = self.inner.store.set(field, value.into())? else {
            return Ok(false);
        };
        for id in subscribers {
            self.render(id)?;
        }
        Ok(true)
    }

    /// Modify a field in place, then [`set`](Self::set) it.
    pub fn update(&self, field: &str, modify: impl FnOnce(&mut Value)) -> Result<bool> {
        let mut value = self.get(field)?;
        modify(&mut value);
        self.set(field, value)
    }

    /// Evaluate an expression against the current data, subscribing nothing.
    pub fn evaluate(&self, expression: &str) -> std::result::Result<Value, ExpressionError> {
        self.inner
            .evaluator
            .evaluate(expression, &self.inner.store, None)
    }

    /// Evaluate an expression on behalf of `node`, subscribing it to every
    /// field the expression references.
    pub fn evaluate_for(
        &self,
        node: NodeId,
        expression: &str,
    ) -> std::result::Result<Value, ExpressionError> {
        self.inner
            .evaluator
            .evaluate(expression, &self.inner.store, Some(node))
    }

    /// Nodes currently subscribed to `field`, in subscription order.
    pub fn subscribers(&self, field: &str) -> Vec<NodeId> {
        self.inner.store.subscribers(field)
    }

    pub fn store(&self) -> &DataStore {
        &self.inner.store
    }

    // =========================================================================
    // RENDERING
    // =========================================================================

    /// Re-render one node.
    ///
    /// An id that is not a live snapshot is logged and ignored.
    pub fn render(&self, id: NodeId) -> Result<()> {
        match self.resolve(id) {
            Ok(snapshot) => render_snapshot(self, &snapshot, false),
            Err(err) => {
                error!(error = %err, "render skipped");
                Ok(())
            }
        }
    }

    fn resolve(&self, id: NodeId) -> std::result::Result<Rc<NodeSnapshot>, RenderTargetError> {
        let current = self.inner.generation.get();
        if id.generation() != current {
            return Err(RenderTargetError::Stale {
                id,
                generation: id.generation(),
                current,
            });
        }
        self.inner
            .nodes
            .borrow()
            .get(id.index())
            .cloned()
            .ok_or(RenderTargetError::Unknown { id })
    }

    /// The snapshot behind `id`, if it belongs to the current mount.
    pub fn snapshot(&self, id: NodeId) -> Option<Rc<NodeSnapshot>> {
        self.resolve(id).ok()
    }

    /// The snapshot id of a live element, if it is part of the mount.
    pub fn node_for(&self, element: ElementRef) -> Option<NodeId> {
        self.inner
            .nodes
            .borrow()
            .iter()
            .find(|snapshot| snapshot.element() == element)
            .map(|snapshot| snapshot.id())
    }

    pub fn root(&self) -> Option<NodeId> {
        self.inner.root.get()
    }

    pub fn tree(&self) -> &dyn PresentationTree {
        self.inner.tree.as_ref()
    }

    // =========================================================================
    // METHODS & DIRECTIVES
    // =========================================================================

    /// Register or replace a method.
    pub fn method(
        &self,
        name: impl Into<String>,
        method: impl Fn(&App, &Event) -> Result<()> + 'static,
    ) {
        self.inner
            .methods
            .borrow_mut()
            .insert(name.into(), Rc::new(method));
    }

    /// Invoke a method as if `event` had fired. Unknown names are logged and
    /// ignored.
    pub fn call_method(&self, name: &str, event: &Event) -> Result<()> {
        let method = self.inner.methods.borrow().get(name).cloned();
        match method {
            Some(method) => {
                debug!(method = name, event = %event.name, target = %event.target, "dispatch");
                method(self, event)
            }
            None => {
                warn!(method = name, event = %event.name, "no such method");
                Ok(())
            }
        }
    }

    /// Register or replace a directive. Takes effect from the next render.
    pub fn directive(
        &self,
        name: impl Into<String>,
        directive: Directive,
    ) -> std::result::Result<(), InvalidDirectiveError> {
        self.inner.directives.borrow_mut().register(name, directive)
    }

    pub fn directive_names(&self) -> Vec<String> {
        self.inner
            .directives
            .borrow()
            .names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub(crate) fn directive_entries(&self) -> Vec<(String, Directive)> {
        self.inner.directives.borrow().entries()
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("root", &self.inner.root.get())
            .field("generation", &self.inner.generation.get())
            .field("fields", &self.inner.store.fields())
            .field("nodes", &self.inner.nodes.borrow().len())
            .field("directives", &self.directive_names())
            .finish()
    }
}

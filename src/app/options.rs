// ============================================================================
// spark-view - App Options
// Construction-time configuration
// ============================================================================

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::App;
use crate::core::error::{ConstructionError, Error};
use crate::core::types::Event;
use crate::core::value::Value;
use crate::view::directive::Directive;

/// An event handler named by `@event="method"` attributes.
pub type Method = Rc<dyn Fn(&App, &Event) -> Result<(), Error>>;

pub(crate) type MountedCallback = Box<dyn FnOnce(&App) -> Result<(), Error>>;

/// Everything an [`App`] starts with.
///
/// # Example
///
/// ```
/// use spark_view::AppOptions;
///
/// let options = AppOptions::new()
///     .element_selector("#app")
///     .data("count", 0)
///     .data("label", "clicks")
///     .method("inc", |app, _event| {
///         app.update("count", |count| *count = (count.to_number() + 1.0).into())?;
///         Ok(())
///     });
/// assert_eq!(options.field_names(), vec!["count", "label"]);
/// ```
#[derive(Default)]
pub struct AppOptions {
    pub(crate) element_selector: Option<String>,
    pub(crate) mounted: Option<MountedCallback>,
    pub(crate) data: IndexMap<String, Value>,
    pub(crate) methods: Vec<(String, Method)>,
    pub(crate) directives: Vec<(String, Directive)>,
}

impl AppOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Root to mount on construction. Without one, call [`App::mount`].
    pub fn element_selector(mut self, selector: impl Into<String>) -> Self {
        self.element_selector = Some(selector.into());
        self
    }

    /// Called once, after the first mount completes.
    pub fn mounted(mut self, callback: impl FnOnce(&App) -> Result<(), Error> + 'static) -> Self {
        self.mounted = Some(Box::new(callback));
        self
    }

    /// Declare one field. A later call for the same field wins.
    pub fn data(mut self, field: impl Into<String>, initial: impl Into<Value>) -> Self {
        self.data.insert(field.into(), initial.into());
        self
    }

    /// Declare many fields, e.g. from [`data!`](crate::data).
    pub fn fields(mut self, fields: impl IntoIterator<Item = (String, Value)>) -> Self {
        self.data.extend(fields);
        self
    }

    /// Declare every key of a JSON object as a field.
    ///
    /// ```
    /// use spark_view::AppOptions;
    /// use serde_json::json;
    ///
    /// let options = AppOptions::new()
    ///     .data_json(json!({ "name": "Ann", "tags": ["a"] }))
    ///     .unwrap();
    /// assert_eq!(options.field_names(), vec!["name", "tags"]);
    ///
    /// assert!(AppOptions::new().data_json(json!([1, 2])).is_err());
    /// ```
    pub fn data_json(mut self, data: serde_json::Value) -> Result<Self, ConstructionError> {
        match data {
            serde_json::Value::Object(map) => {
                for (field, value) in map {
                    self.data.insert(field, value.into());
                }
                Ok(self)
            }
            other => Err(ConstructionError::InvalidData {
                found: Value::from(other).type_name(),
            }),
        }
    }

    /// Register a method for `@event` attributes.
    pub fn method(
        mut self,
        name: impl Into<String>,
        method: impl Fn(&App, &Event) -> Result<(), Error> + 'static,
    ) -> Self {
        self.methods.push((name.into(), Rc::new(method)));
        self
    }

    /// Register a directive. Names are checked when the app is built.
    pub fn directive(mut self, name: impl Into<String>, directive: Directive) -> Self {
        self.directives.push((name.into(), directive));
        self
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.data.keys().map(String::as_str).collect()
    }
}

impl fmt::Debug for AppOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppOptions")
            .field("element_selector", &self.element_selector)
            .field("mounted", &self.mounted.is_some())
            .field("data", &self.data)
            .field(
                "methods",
                &self.methods.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            )
            .field("directives", &self.directives)
            .finish()
    }
}

//! # Task metadata attached to a dispatch call.
//!
//! [`TaskMeta`] bundles the descriptive `name`/`module` pair that decorates
//! every event published for a dispatch. It carries no runtime invariants:
//! both fields are free-form strings used for logging only.
//!
//! A meta can be created:
//! - **Explicitly** with [`TaskMeta::new`] (module defaults to `"general"`)
//! - **From config** with [`TaskMeta::with_defaults`] (inherit the configured module)

use std::borrow::Cow;

use crate::core::Config;

/// Module name used when none is supplied.
pub(crate) const DEFAULT_MODULE: &str = "general";

/// Descriptive name/module pair for one dispatch call.
///
/// ## Example
/// ```
/// use stagerun::TaskMeta;
///
/// let meta = TaskMeta::new("orderProcessing");
/// assert_eq!(meta.name(), "orderProcessing");
/// assert_eq!(meta.module(), "general");
///
/// let meta = meta.with_module("order");
/// assert_eq!(meta.module(), "order");
/// ```
#[derive(Clone, Debug)]
pub struct TaskMeta {
    name: Cow<'static, str>,
    module: Cow<'static, str>,
}

impl TaskMeta {
    /// Creates metadata for the given task name with the `"general"` module.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            module: Cow::Borrowed(DEFAULT_MODULE),
        }
    }

    /// Creates metadata inheriting the module from global config.
    ///
    /// ```
    /// use stagerun::{Config, TaskMeta};
    ///
    /// let mut cfg = Config::default();
    /// cfg.default_module = "billing".to_string();
    ///
    /// let meta = TaskMeta::with_defaults("invoiceRun", &cfg);
    /// assert_eq!(meta.module(), "billing");
    /// ```
    pub fn with_defaults(name: impl Into<Cow<'static, str>>, cfg: &Config) -> Self {
        Self {
            name: name.into(),
            module: Cow::Owned(cfg.default_module.clone()),
        }
    }

    /// Returns a new meta with the given module.
    pub fn with_module(mut self, module: impl Into<Cow<'static, str>>) -> Self {
        self.module = module.into();
        self
    }

    /// Returns the task name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the module name.
    pub fn module(&self) -> &str {
        &self.module
    }
}

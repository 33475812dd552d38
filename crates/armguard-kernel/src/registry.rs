//! [`ModelRegistry`] – resolves configured model kinds to factories.
//!
//! Each [`ModelEntry`][armguard_types::ModelEntry] names a `kind`; the
//! registry maps that string to a factory that builds the model from a
//! [`ModelContext`].  Integrators add their own kinds with
//! [`ModelRegistry::register`] before handing the registry to
//! [`CollisionManager::load`][crate::manager::CollisionManager::load].
//!
//! # Example
//!
//! ```rust
//! use armguard_kernel::{ModelContext, ModelRegistry, OpenModel};
//! use armguard_types::ModelEntry;
//!
//! let mut registry = ModelRegistry::builtin();
//! registry.register("quiet", |ctx: &ModelContext<'_>| OpenModel::factory(ctx));
//!
//! let entry = ModelEntry::new("head_guard").with_kind("quiet");
//! let ctx = ModelContext { entry: &entry, joints: &[], kinematics: None };
//! let model = registry.instantiate(&ctx).unwrap();
//! assert_eq!(model.name(), "head_guard");
//! ```

use std::collections::BTreeMap;

use armguard_types::GuardError;

use crate::keep_out::EndOfArmKeepOut;
use crate::model::{CollisionModel, ModelContext, OpenModel};

/// Builds one model instance from its construction context.
pub type ModelFactory =
    Box<dyn Fn(&ModelContext<'_>) -> Result<Box<dyn CollisionModel>, GuardError> + Send + Sync>;

/// Kind → factory table.
#[derive(Default)]
pub struct ModelRegistry {
    factories: BTreeMap<String, ModelFactory>,
}

impl ModelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in kinds: [`OpenModel::KIND`] and
    /// [`EndOfArmKeepOut::KIND`].
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(OpenModel::KIND, OpenModel::factory);
        registry.register(EndOfArmKeepOut::KIND, EndOfArmKeepOut::factory);
        registry
    }

    /// Register `factory` under `kind`, replacing any previous factory.
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(&ModelContext<'_>) -> Result<Box<dyn CollisionModel>, GuardError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(kind.into(), Box::new(factory));
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Registered kinds in lexical order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build the model described by `ctx.entry`.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::UnknownModel`] when the entry's kind is not
    /// registered, and whatever the factory returns otherwise.
    pub fn instantiate(&self, ctx: &ModelContext<'_>) -> Result<Box<dyn CollisionModel>, GuardError> {
        let kind = ctx.entry.kind();
        let factory = self.factories.get(kind).ok_or_else(|| GuardError::UnknownModel {
            model: ctx.name().to_string(),
            kind: kind.to_string(),
        })?;
        factory(ctx)
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("kinds", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armguard_types::ModelEntry;

    fn ctx(entry: &ModelEntry) -> ModelContext<'_> {
        ModelContext {
            entry,
            joints: &[],
            kinematics: None,
        }
    }

    #[test]
    fn builtin_kinds_are_registered() {
        let registry = ModelRegistry::builtin();
        assert_eq!(
            registry.kinds().collect::<Vec<_>>(),
            vec![EndOfArmKeepOut::KIND, OpenModel::KIND]
        );
    }

    #[test]
    fn kind_defaults_to_entry_name() {
        let registry = ModelRegistry::builtin();
        let entry = ModelEntry::new("open");
        assert_eq!(registry.instantiate(&ctx(&entry)).unwrap().name(), "open");
    }

    #[test]
    fn unknown_kind_names_model_and_kind() {
        let registry = ModelRegistry::builtin();
        let entry = ModelEntry::new("base_guard").with_kind("no_such_kind");
        let err = registry.instantiate(&ctx(&entry)).err().unwrap();
        assert_eq!(
            err,
            GuardError::UnknownModel {
                model: "base_guard".into(),
                kind: "no_such_kind".into(),
            }
        );
    }

    #[test]
    fn factory_errors_propagate() {
        let mut registry = ModelRegistry::new();
        registry.register("broken", |ctx: &ModelContext<'_>| {
            Err(ctx.instantiation_error("missing calibration"))
        });
        assert!(registry.contains("broken"));
        let entry = ModelEntry::new("broken");
        assert!(matches!(
            registry.instantiate(&ctx(&entry)),
            Err(GuardError::ModelInstantiation { .. })
        ));
    }

    #[test]
    fn register_replaces_existing_kind() {
        let mut registry = ModelRegistry::builtin();
        registry.register(OpenModel::KIND, |ctx: &ModelContext<'_>| {
            Err(ctx.instantiation_error("replaced"))
        });
        let entry = ModelEntry::new("open");
        assert!(registry.instantiate(&ctx(&entry)).is_err());
    }
}

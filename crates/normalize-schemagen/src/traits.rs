//! Traits for emitter backends.

use crate::synth::Synthesis;

/// Options shared by all backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Add the `export` keyword to declarations.
    pub export: bool,
    /// Also emit inferred static types next to each schema.
    pub infer_types: bool,
    /// Appended to entity names to form schema identifiers.
    pub schema_suffix: String,
    /// Module the schema DSL is imported from.
    pub import_path: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            export: true,
            infer_types: false,
            schema_suffix: "Schema".into(),
            import_path: "zod".into(),
        }
    }
}

impl EmitOptions {
    /// Identifier a schema named `name` is declared under.
    pub fn schema_ident(&self, name: &str) -> String {
        format!("{name}{}", self.schema_suffix)
    }
}

/// An emitter backend.
///
/// Backends turn a [`Synthesis`] into text for a target module.
///
/// # Implementing Custom Backends
///
/// ```ignore
/// use normalize_schemagen::{Backend, EmitOptions, Synthesis, register_backend};
///
/// struct YupBackend;
///
/// impl Backend for YupBackend {
///     fn name(&self) -> &'static str { "yup" }
///     fn extension(&self) -> &'static str { "ts" }
///     fn generate(&self, synthesis: &Synthesis, options: &EmitOptions) -> String { /* ... */ }
/// }
///
/// // Register before first use
/// register_backend(&YupBackend);
/// ```
pub trait Backend: Send + Sync {
    /// Unique backend identifier (e.g., "zod", "json").
    fn name(&self) -> &'static str;

    /// File extension for generated output (e.g., "ts", "json").
    fn extension(&self) -> &'static str;

    /// Render the synthesized definitions.
    fn generate(&self, synthesis: &Synthesis, options: &EmitOptions) -> String;
}

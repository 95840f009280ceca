//! Ordered validation-schema generation from service type models.
//!
//! `normalize-schemagen` turns a service type model (record types, method
//! parameters, unions, enums and their validation rules) into named schema
//! definitions, emitted so that every schema follows the schemas it
//! references.
//!
//! # Architecture
//!
//! ```text
//! ServiceModel ─> collect ─> resolve ─> synthesize ─> Backend
//!  (model.rs)    Vec<Entity>  Resolution  Synthesis    ├─> Zod module
//!                                 │          ▲         └─> JSON dump
//!                                 └ circular ┘ rules.rs (per member)
//! ```
//!
//! Entities caught in a reference cycle are not an error: they are emitted
//! last and reference each other through lazy references.
//!
//! # Example
//!
//! ```
//! use normalize_schemagen::{PascalNaming, ServiceModel, generate, output};
//!
//! let model = ServiceModel::from_json_str(r#"{
//!     "types": [{
//!         "name": "User",
//!         "fields": [
//!             { "name": "id", "type": "integer", "required": true },
//!             { "name": "name", "type": "string", "required": true,
//!               "rules": [{ "kind": "length", "min": 1 }] }
//!         ]
//!     }]
//! }"#).unwrap();
//!
//! let synthesis = generate(&model, &PascalNaming).unwrap();
//! let ts = output::generate_zod(&synthesis, &Default::default());
//! assert!(ts.contains("name: z.string().nonempty(),"));
//! ```
//!
//! # Feature Flags
//!
//! - `backend-zod` - Zod module generation (default)
//! - `backend-json` - JSON dump of schema expressions (default)

pub mod collect;
pub mod entity;
pub mod expr;
pub mod model;
pub mod output;
pub mod registry;
pub mod resolve;
pub mod rules;
pub mod synth;
pub mod traits;

use std::collections::BTreeSet;

// Re-export commonly used items
pub use collect::{Naming, PascalNaming, collect};
pub use entity::{Entity, EntityKind, Member, ParamLocation, Primitive, Rule, TypeRef};
pub use expr::{Constructor, Op, SchemaExpr};
pub use model::{ModelError, ServiceModel};
pub use resolve::{Diagnostic, Resolution, resolve};
pub use rules::{MapContext, MemberRole, map_member};
pub use synth::{Definition, Synthesis, synthesize};

// Re-export traits
pub use traits::{Backend, EmitOptions};

// Re-export registry functions
pub use registry::{backend_names, backends, get_backend, register_backend};

/// Fatal generation error.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("duplicate entity name: {0}")]
    DuplicateName(String),
}

/// Run the full pipeline: collect, resolve, synthesize.
pub fn generate(model: &ServiceModel, naming: &dyn Naming) -> Result<Synthesis, GenerateError> {
    let entities = collect(model, naming);

    let mut seen = BTreeSet::new();
    for entity in &entities {
        if !seen.insert(entity.name.as_str()) {
            return Err(GenerateError::DuplicateName(entity.name.clone()));
        }
    }

    let resolution = resolve(entities);
    let synthesis = synthesize(&resolution);
    tracing::debug!(
        ordered = synthesis.definitions.len(),
        circular = synthesis.circular.len(),
        "synthesized schemas"
    );
    Ok(synthesis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_names_are_fatal() {
        let model = ServiceModel::from_json_str(
            r#"{
                "types": [{ "name": "Status" }],
                "enums": [{ "name": "Status", "values": ["on", "off"] }]
            }"#,
        )
        .unwrap();
        let err = generate(&model, &PascalNaming).unwrap_err();
        assert!(matches!(err, GenerateError::DuplicateName(name) if name == "Status"));
    }

    #[test]
    fn parameter_bag_name_can_collide() {
        let model = ServiceModel::from_json_str(
            r#"{
                "types": [{ "name": "UsersGetParams" }],
                "interfaces": [{ "name": "Users", "methods": [
                    { "name": "get", "params": [{ "name": "id", "type": "string" }] }
                ] }]
            }"#,
        )
        .unwrap();
        assert!(generate(&model, &PascalNaming).is_err());
    }
}

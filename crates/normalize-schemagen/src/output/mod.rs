//! Emitter backends.
//!
//! Each backend takes a [`Synthesis`](crate::synth::Synthesis) and produces
//! text. All backends implement the [`Backend`](crate::traits::Backend)
//! trait for uniform access via the registry.

// Zod (TypeScript validator)
#[cfg(feature = "backend-zod")]
pub mod zod;

#[cfg(feature = "backend-zod")]
pub use zod::{ZodBackend, generate_zod, render_expr};

// JSON dump of the schema expressions
#[cfg(feature = "backend-json")]
pub mod json;

#[cfg(feature = "backend-json")]
pub use json::{JsonBackend, generate_json};

//! JSON dump of synthesized schema expressions.
//!
//! Useful for feeding another emitter, or for inspecting what the
//! synthesizer decided without committing to a target syntax.

use crate::synth::Synthesis;
use crate::traits::{Backend, EmitOptions};
use serde::Serialize;

/// Static instance of the JSON backend for registry.
pub static JSON_BACKEND: JsonBackend = JsonBackend;

/// JSON backend implementing the Backend trait.
pub struct JsonBackend;

impl Backend for JsonBackend {
    fn name(&self) -> &'static str {
        "json"
    }

    fn extension(&self) -> &'static str {
        "json"
    }

    fn generate(&self, synthesis: &Synthesis, options: &EmitOptions) -> String {
        generate_json(synthesis, options)
    }
}

#[derive(Serialize)]
struct Document<'a> {
    schema_suffix: &'a str,
    #[serde(flatten)]
    synthesis: &'a Synthesis,
}

/// Serialize a synthesis as pretty-printed JSON.
pub fn generate_json(synthesis: &Synthesis, options: &EmitOptions) -> String {
    let document = Document {
        schema_suffix: &options.schema_suffix,
        synthesis,
    };
    // Only string-keyed maps and JSON values, so serialization cannot fail.
    let json = serde_json::to_string_pretty(&document).expect("synthesis serializes to JSON");
    json + "\n"
}

//! Dependency resolution over the entity worklist.
//!
//! Entities are emitted in readiness layers: each pass takes every pending
//! entity whose dependencies are already placed, sorts that layer by name and
//! appends it. A pass that places nothing ends resolution, and whatever is
//! still pending becomes the circular group.

use crate::entity::Entity;
use serde::Serialize;
use std::collections::BTreeSet;

/// Result of resolving a worklist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    /// Entities in emission order.
    pub ordered: Vec<Entity>,
    /// Entities stalled by a reference cycle, sorted by name.
    pub circular: Vec<Entity>,
}

/// A non-fatal finding surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub message: String,
    /// Entity names the diagnostic is about.
    pub names: Vec<String>,
}

/// Order entities so that every entity follows the entities it references.
pub fn resolve(entities: Vec<Entity>) -> Resolution {
    let total = entities.len();
    let mut resolved: BTreeSet<String> = BTreeSet::new();
    let mut ordered: Vec<Entity> = Vec::with_capacity(total);
    let mut pending = entities;
    let mut pass = 0usize;

    while !pending.is_empty() {
        pass += 1;
        let (mut ready, rest): (Vec<Entity>, Vec<Entity>) =
            pending.into_iter().partition(|entity| {
                entity
                    .dependencies()
                    .iter()
                    .all(|dep| resolved.contains(*dep))
            });
        pending = rest;

        if ready.is_empty() {
            break;
        }
        ready.sort_by(|a, b| a.name.cmp(&b.name));
        tracing::trace!(pass, layer = ready.len(), "placed readiness layer");
        resolved.extend(ready.iter().map(|entity| entity.name.clone()));
        ordered.extend(ready);
    }

    pending.sort_by(|a, b| a.name.cmp(&b.name));
    let resolution = Resolution {
        ordered,
        circular: pending,
    };
    tracing::debug!(
        entities = total,
        passes = pass,
        circular = resolution.circular.len(),
        "resolved emission order"
    );
    for diagnostic in resolution.diagnostics() {
        tracing::warn!(names = ?diagnostic.names, "{}", diagnostic.message);
    }
    resolution
}

impl Resolution {
    pub fn is_acyclic(&self) -> bool {
        self.circular.is_empty()
    }

    pub fn circular_names(&self) -> BTreeSet<String> {
        self.circular.iter().map(|e| e.name.clone()).collect()
    }

    /// Warnings for the circular group and for references to unknown names.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        if self.circular.is_empty() {
            return diagnostics;
        }

        let names: Vec<String> = self.circular.iter().map(|e| e.name.clone()).collect();
        diagnostics.push(Diagnostic {
            message: format!(
                "circular references between {}; using lazy references",
                names.join(", ")
            ),
            names,
        });

        let known: BTreeSet<&str> = self
            .ordered
            .iter()
            .chain(&self.circular)
            .map(|e| e.name.as_str())
            .collect();
        for entity in &self.circular {
            let unknown: Vec<String> = entity
                .dependencies()
                .into_iter()
                .filter(|dep| !known.contains(dep))
                .map(String::from)
                .collect();
            if !unknown.is_empty() {
                diagnostics.push(Diagnostic {
                    message: format!(
                        "{} references unknown {}",
                        entity.name,
                        unknown.join(", ")
                    ),
                    names: vec![entity.name.clone()],
                });
            }
        }
        diagnostics
    }
}

//! Schema synthesis: one [`SchemaExpr`] per resolved entity.

use crate::entity::{Entity, EntityKind, RecordDef, UnionDef, UnionShape};
use crate::expr::{Constructor, ObjectField, Op, SchemaExpr};
use crate::resolve::Resolution;
use crate::rules::{MapContext, MemberRole, key_bounds, map_member};
use serde::Serialize;
use std::collections::BTreeSet;

/// A named schema definition, ready for a backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Definition {
    pub name: String,
    pub schema: SchemaExpr,
}

/// Synthesized definitions in emission order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Synthesis {
    /// Definitions whose references are all emitted before them.
    pub definitions: Vec<Definition>,
    /// Definitions of circular entities, which reference each other lazily.
    pub circular: Vec<Definition>,
}

impl Synthesis {
    /// Every definition, ordered ones first.
    pub fn all(&self) -> impl Iterator<Item = &Definition> {
        self.definitions.iter().chain(&self.circular)
    }

    pub fn get(&self, name: &str) -> Option<&SchemaExpr> {
        self.all().find(|d| d.name == name).map(|d| &d.schema)
    }
}

/// Synthesize every entity of a resolution, preserving its order.
pub fn synthesize(resolution: &Resolution) -> Synthesis {
    let circular = resolution.circular_names();
    let define = |entity: &Entity| Definition {
        name: entity.name.clone(),
        schema: synthesize_entity(entity, &circular),
    };
    Synthesis {
        definitions: resolution.ordered.iter().map(&define).collect(),
        circular: resolution.circular.iter().map(&define).collect(),
    }
}

/// Synthesize a single entity given the circular names of its run.
pub fn synthesize_entity(entity: &Entity, circular: &BTreeSet<String>) -> SchemaExpr {
    let name = entity.name.as_str();
    match &entity.kind {
        EntityKind::Record(record) => synthesize_record(name, record, circular),
        EntityKind::ParameterBag(bag) => {
            let ctx = MapContext::new(name, circular, MemberRole::Field);
            let fields = bag
                .members
                .iter()
                .map(|m| ObjectField::new(&m.name, map_member(m, &ctx)))
                .collect();
            SchemaExpr::new(Constructor::Object { fields })
        }
        EntityKind::Union(union) => synthesize_union(name, union, circular),
        EntityKind::Enum(def) => SchemaExpr::new(Constructor::Enum {
            values: def.values.clone(),
        }),
    }
}

fn synthesize_record(name: &str, record: &RecordDef, circular: &BTreeSet<String>) -> SchemaExpr {
    let field_ctx = MapContext::new(name, circular, MemberRole::Field);
    let value_ctx = MapContext::new(name, circular, MemberRole::MapValue);
    let (min_keys, max_keys) = key_bounds(&record.rules);

    let required_keys: Vec<&str> = match &record.map {
        Some(map) => map
            .required_keys
            .iter()
            .map(String::as_str)
            .filter(|key| !record.members.iter().any(|m| m.name == *key))
            .collect(),
        None => Vec::new(),
    };

    let mut known: Vec<String> = record.members.iter().map(|m| m.name.clone()).collect();
    known.extend(required_keys.iter().map(|key| key.to_string()));

    let mut expr = if !known.is_empty() {
        let mut fields: Vec<ObjectField> = record
            .members
            .iter()
            .map(|m| ObjectField::new(&m.name, map_member(m, &field_ctx)))
            .collect();
        if let Some(map) = &record.map {
            for key in &required_keys {
                fields.push(ObjectField::new(*key, map_member(&map.value, &value_ctx)));
            }
        }

        let field_count = fields.len() as u64;
        let mut expr = SchemaExpr::new(Constructor::Object { fields });
        if let Some(map) = &record.map {
            if max_keys.is_none_or(|max| field_count < max) {
                expr.push(Op::Catchall(Box::new(map_member(&map.value, &value_ctx))));
            }
        }
        expr
    } else if let Some(map) = &record.map {
        SchemaExpr::new(Constructor::Record {
            value: Box::new(map_member(&map.value, &value_ctx)),
        })
    } else {
        SchemaExpr::new(Constructor::Record {
            value: Box::new(SchemaExpr::new(Constructor::Any)),
        })
    };

    if let Some(count) = min_keys {
        expr.push(Op::MinKeys {
            count,
            message: format!("{name} must have at least {count} {}", keys(count)),
        });
    }
    if let Some(count) = max_keys {
        expr.push(Op::MaxKeys {
            count,
            message: format!("{name} must have at most {count} {}", keys(count)),
        });
    }

    if let Some(map) = &record.map {
        if !map.key.rules.is_empty() || !map.key.ty.is_primitive() {
            let key_ctx = MapContext::new(name, circular, MemberRole::MapKey);
            expr.push(Op::KeyCheck {
                key: Box::new(map_member(&map.key, &key_ctx)),
                known,
            });
        }
    }
    expr
}

fn keys(count: u64) -> &'static str {
    if count == 1 { "key" } else { "keys" }
}

fn synthesize_union(name: &str, union: &UnionDef, circular: &BTreeSet<String>) -> SchemaExpr {
    let ctx = MapContext::new(name, circular, MemberRole::Variant);
    match union.shape() {
        UnionShape::Alias(variant) => map_member(variant, &ctx),
        UnionShape::Empty => SchemaExpr::new(Constructor::Unsupported {
            reason: "union has no variants".into(),
        }),
        UnionShape::AllPrimitive => SchemaExpr::new(Constructor::Unsupported {
            reason: "unions of primitive types are not supported".into(),
        }),
        UnionShape::Mixed => {
            let variants = union.variants.iter().map(|v| map_member(v, &ctx)).collect();
            match &union.discriminator {
                Some(discriminator) => SchemaExpr::new(Constructor::DiscriminatedUnion {
                    discriminator: discriminator.clone(),
                    variants,
                }),
                None => SchemaExpr::new(Constructor::Union { variants }),
            }
        }
    }
}

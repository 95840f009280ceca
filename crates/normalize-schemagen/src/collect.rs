//! Entity collection from a [`ServiceModel`].

use crate::entity::{EntityKind, EnumDef, ParameterBag, RecordDef, UnionDef};
use crate::entity::{Entity, Member};
use crate::model::ServiceModel;

/// Naming convention for entities that have no declared name.
pub trait Naming {
    /// Name of the parameter bag for `interface.method`.
    fn parameter_bag(&self, interface: &str, method: &str) -> String;
}

/// `{Interface}{Method}Params` in PascalCase.
#[derive(Debug, Clone, Copy, Default)]
pub struct PascalNaming;

impl Naming for PascalNaming {
    fn parameter_bag(&self, interface: &str, method: &str) -> String {
        format!("{}{}Params", pascal_case(interface), pascal_case(method))
    }
}

fn pascal_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if c == '_' || c == '-' || c == ' ' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Gather every schema-worthy entity of the model into a flat worklist.
///
/// Order: record types, parameter bags (interface then method order),
/// unions, enums. Methods without parameters produce no entity.
pub fn collect(model: &ServiceModel, naming: &dyn Naming) -> Vec<Entity> {
    let mut entities = Vec::new();

    for decl in &model.types {
        entities.push(Entity {
            name: decl.name.clone(),
            kind: EntityKind::Record(RecordDef {
                members: decl.fields.clone(),
                map: decl.map.clone(),
                rules: decl.rules.clone(),
            }),
        });
    }

    for interface in &model.interfaces {
        for method in interface.methods.iter().filter(|m| !m.params.is_empty()) {
            let members = method
                .params
                .iter()
                .map(|param| Member {
                    location: method.location(param),
                    ..param.clone()
                })
                .collect();
            entities.push(Entity {
                name: naming.parameter_bag(&interface.name, &method.name),
                kind: EntityKind::ParameterBag(ParameterBag {
                    interface: interface.name.clone(),
                    method: method.name.clone(),
                    members,
                }),
            });
        }
    }

    for decl in &model.unions {
        entities.push(Entity {
            name: decl.name.clone(),
            kind: EntityKind::Union(UnionDef {
                variants: decl.variants.clone(),
                discriminator: decl.discriminator.clone(),
            }),
        });
    }

    for decl in &model.enums {
        entities.push(Entity {
            name: decl.name.clone(),
            kind: EntityKind::Enum(EnumDef {
                values: decl.values.clone(),
            }),
        });
    }

    tracing::debug!(count = entities.len(), "collected entities");
    entities
}

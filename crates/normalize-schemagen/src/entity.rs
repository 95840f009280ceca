//! Schema-worthy entities and their members.
//!
//! Entities are immutable views built once per run by the
//! [collector](crate::collect) and consumed by the resolver and synthesizer.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeSet;

/// A primitive type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Primitive {
    String,
    Number,
    Integer,
    Long,
    Float,
    Double,
    Boolean,
    Date,
    DateTime,
    Binary,
    Untyped,
    Null,
}

impl Primitive {
    /// Parse a model type tag. Returns `None` for names of other entities.
    pub fn parse(tag: &str) -> Option<Self> {
        let primitive = match tag {
            "string" => Self::String,
            "number" => Self::Number,
            "integer" => Self::Integer,
            "long" => Self::Long,
            "float" => Self::Float,
            "double" => Self::Double,
            "boolean" => Self::Boolean,
            "date" => Self::Date,
            "date-time" => Self::DateTime,
            "binary" => Self::Binary,
            "untyped" => Self::Untyped,
            "null" => Self::Null,
            _ => return None,
        };
        Some(primitive)
    }

    /// Canonical tag for this primitive.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateTime => "date-time",
            Self::Binary => "binary",
            Self::Untyped => "untyped",
            Self::Null => "null",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Number | Self::Integer | Self::Long | Self::Float | Self::Double
        )
    }

    /// Integral kinds get an integer refinement on top of the number constructor.
    pub fn is_integral(self) -> bool {
        matches!(self, Self::Integer | Self::Long)
    }
}

/// The declared type of a member: a primitive or the name of another entity.
///
/// Serialized as a plain string tag (`"string"`, `"date-time"`, `"User"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TypeRef {
    Primitive(Primitive),
    Named(String),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    /// The referenced entity name, if this is not a primitive.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Primitive(_) => None,
        }
    }
}

impl From<Primitive> for TypeRef {
    fn from(primitive: Primitive) -> Self {
        Self::Primitive(primitive)
    }
}

impl From<String> for TypeRef {
    fn from(tag: String) -> Self {
        match Primitive::parse(&tag) {
            Some(primitive) => Self::Primitive(primitive),
            None => Self::Named(tag),
        }
    }
}

impl From<TypeRef> for String {
    fn from(ty: TypeRef) -> Self {
        match ty {
            TypeRef::Primitive(primitive) => primitive.as_str().to_string(),
            TypeRef::Named(name) => name,
        }
    }
}

/// Transport location a method parameter is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Header,
    Query,
    Path,
    Body,
}

impl ParamLocation {
    /// Header, query and path values arrive as strings and must be coerced.
    pub fn coerces(self) -> bool {
        !matches!(self, Self::Body)
    }
}

/// A declarative validation constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Rule {
    /// String length. `min == max` means an exact length.
    Length {
        #[serde(default)]
        min: Option<u64>,
        #[serde(default)]
        max: Option<u64>,
    },
    Pattern { pattern: String },
    Enum { values: Vec<String> },
    /// Numeric comparison bounds.
    Range {
        #[serde(default)]
        gt: Option<Number>,
        #[serde(default)]
        gte: Option<Number>,
        #[serde(default)]
        lt: Option<Number>,
        #[serde(default)]
        lte: Option<Number>,
    },
    MultipleOf { value: Number },
    /// Array item count.
    Items {
        #[serde(default)]
        min: Option<u64>,
        #[serde(default)]
        max: Option<u64>,
    },
    /// Object key count.
    Keys {
        #[serde(default)]
        min: Option<u64>,
        #[serde(default)]
        max: Option<u64>,
    },
}

/// A field, method parameter, map key, map value or union variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Field or parameter name. Empty for map keys and values.
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub array: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default, rename = "const", skip_serializing_if = "Option::is_none")]
    pub constant: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,
    /// Transport location, only set on method parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<ParamLocation>,
}

impl Member {
    pub fn required(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self::new(name, ty, true)
    }

    pub fn optional(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self::new(name, ty, false)
    }

    fn new(name: impl Into<String>, ty: impl Into<TypeRef>, required: bool) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            array: false,
            required,
            constant: None,
            default: None,
            rules: Vec::new(),
            location: None,
        }
    }

    pub fn array(mut self) -> Self {
        self.array = true;
        self
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_const(mut self, value: impl Into<Value>) -> Self {
        self.constant = Some(value.into());
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn at(mut self, location: ParamLocation) -> Self {
        self.location = Some(location);
        self
    }
}

/// Map-like extension of a record: extra keys validated by key and value schemas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapExtension {
    pub key: Member,
    pub value: Member,
    /// Keys that must be present, each validated by the value schema.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_keys: Vec<String>,
}

/// A record type: named fields plus an optional map extension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordDef {
    pub members: Vec<Member>,
    pub map: Option<MapExtension>,
    /// Entity-level rules (key count bounds).
    pub rules: Vec<Rule>,
}

/// The parameters of a single method call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterBag {
    pub interface: String,
    pub method: String,
    pub members: Vec<Member>,
}

/// A union of member-shaped variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnionDef {
    pub variants: Vec<Member>,
    pub discriminator: Option<String>,
}

/// Structural classification of a union, decided before synthesis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnionShape<'a> {
    /// No variants at all.
    Empty,
    /// Exactly one variant, and it names another entity.
    Alias(&'a Member),
    /// Every variant is a primitive.
    AllPrimitive,
    /// At least one entity reference among several variants.
    Mixed,
}

impl UnionDef {
    pub fn shape(&self) -> UnionShape<'_> {
        match self.variants.as_slice() {
            [] => UnionShape::Empty,
            [only] if !only.ty.is_primitive() => UnionShape::Alias(only),
            variants if variants.iter().all(|v| v.ty.is_primitive()) => UnionShape::AllPrimitive,
            _ => UnionShape::Mixed,
        }
    }
}

/// A string enumeration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDef {
    pub values: Vec<String>,
}

/// The kind of entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Record(RecordDef),
    ParameterBag(ParameterBag),
    Union(UnionDef),
    Enum(EnumDef),
}

/// One schema-worthy unit with a unique name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Emitted schema identifier, also the key other entities reference.
    pub name: String,
    pub kind: EntityKind,
}

impl Entity {
    pub fn record(name: impl Into<String>, members: Vec<Member>) -> Self {
        Self {
            name: name.into(),
            kind: EntityKind::Record(RecordDef {
                members,
                ..Default::default()
            }),
        }
    }

    pub fn map(name: impl Into<String>, record: RecordDef) -> Self {
        Self {
            name: name.into(),
            kind: EntityKind::Record(record),
        }
    }

    pub fn union(
        name: impl Into<String>,
        variants: Vec<Member>,
        discriminator: Option<&str>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: EntityKind::Union(UnionDef {
                variants,
                discriminator: discriminator.map(String::from),
            }),
        }
    }

    pub fn string_enum(name: impl Into<String>, values: Vec<&str>) -> Self {
        Self {
            name: name.into(),
            kind: EntityKind::Enum(EnumDef {
                values: values.into_iter().map(String::from).collect(),
            }),
        }
    }

    /// Every member whose type may name another entity.
    pub fn members(&self) -> Vec<&Member> {
        match &self.kind {
            EntityKind::Record(record) => {
                let mut members: Vec<&Member> = record.members.iter().collect();
                if let Some(map) = &record.map {
                    members.push(&map.key);
                    members.push(&map.value);
                }
                members
            }
            EntityKind::ParameterBag(bag) => bag.members.iter().collect(),
            EntityKind::Union(union) => union.variants.iter().collect(),
            EntityKind::Enum(_) => Vec::new(),
        }
    }

    /// Names of the other entities this one references directly.
    ///
    /// Self-references are excluded: they never block emission.
    pub fn dependencies(&self) -> BTreeSet<&str> {
        self.members()
            .into_iter()
            .filter_map(|member| member.ty.name())
            .filter(|name| *name != self.name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_tags_parse_primitives_and_names() {
        assert_eq!(
            TypeRef::from("date-time".to_string()),
            TypeRef::Primitive(Primitive::DateTime)
        );
        assert_eq!(TypeRef::from("User".to_string()), TypeRef::named("User"));
        assert_eq!(
            TypeRef::from("document".to_string()),
            TypeRef::named("document")
        );
        assert_eq!(TypeRef::from("any".to_string()), TypeRef::named("any"));
    }

    #[test]
    fn dependencies_skip_self_and_primitives() {
        let node = Entity::record(
            "Node",
            vec![
                Member::required("id", Primitive::String),
                Member::optional("children", TypeRef::named("Node")).array(),
                Member::optional("owner", TypeRef::named("User")),
                Member::optional("editor", TypeRef::named("User")),
            ],
        );

        let deps: Vec<&str> = node.dependencies().into_iter().collect();
        assert_eq!(deps, vec!["User"]);
    }

    #[test]
    fn map_key_and_value_are_dependencies() {
        let record = RecordDef {
            members: Vec::new(),
            map: Some(MapExtension {
                key: Member::required("", TypeRef::named("Region")),
                value: Member::required("", TypeRef::named("Quota")),
                required_keys: Vec::new(),
            }),
            rules: Vec::new(),
        };
        let quotas = Entity::map("Quotas", record);

        let deps: Vec<&str> = quotas.dependencies().into_iter().collect();
        assert_eq!(deps, vec!["Quota", "Region"]);
    }

    #[test]
    fn union_shapes() {
        let alias = UnionDef {
            variants: vec![Member::required("cat", TypeRef::named("Cat"))],
            discriminator: None,
        };
        assert!(matches!(alias.shape(), UnionShape::Alias(m) if m.name == "cat"));

        let primitive = UnionDef {
            variants: vec![
                Member::required("text", Primitive::String),
                Member::required("count", Primitive::Integer),
            ],
            discriminator: None,
        };
        assert_eq!(primitive.shape(), UnionShape::AllPrimitive);

        let single_primitive = UnionDef {
            variants: vec![Member::required("text", Primitive::String)],
            discriminator: None,
        };
        assert_eq!(single_primitive.shape(), UnionShape::AllPrimitive);

        let mixed = UnionDef {
            variants: vec![
                Member::required("text", Primitive::String),
                Member::required("cat", TypeRef::named("Cat")),
            ],
            discriminator: None,
        };
        assert_eq!(mixed.shape(), UnionShape::Mixed);
    }

    #[test]
    fn member_deserializes_from_model_json() {
        let member: Member = serde_json::from_value(serde_json::json!({
            "name": "limit",
            "type": "integer",
            "const": 10,
            "rules": [{ "kind": "range", "gte": 0, "lte": 100 }]
        }))
        .unwrap();

        assert_eq!(member.ty, TypeRef::Primitive(Primitive::Integer));
        assert!(!member.required);
        assert_eq!(member.constant, Some(serde_json::json!(10)));
        assert!(matches!(
            &member.rules[0],
            Rule::Range { gte: Some(n), lt: None, .. } if n.as_u64() == Some(0)
        ));
    }
}

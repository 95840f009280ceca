//! Syntax-agnostic schema expressions.
//!
//! A [`SchemaExpr`] is a constructor followed by chained operations, in the
//! order they must be applied. Backends in [`output`](crate::output) render
//! expressions into concrete syntax.

use serde::Serialize;
use serde_json::{Number, Value};

/// A composed schema: base constructor plus ordered operations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaExpr {
    pub base: Constructor,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ops: Vec<Op>,
}

/// The base constructor of a schema expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Constructor {
    String,
    Number { coerce: bool },
    Boolean { coerce: bool },
    Date { coerce: bool },
    Any,
    Null,
    Literal { value: Value },
    Enum { values: Vec<String> },
    /// Direct reference to another entity's schema.
    Ref { name: String },
    /// Reference resolved at use time, for self and circular references.
    Lazy { name: String },
    Object { fields: Vec<ObjectField> },
    /// Keyed collection with string keys.
    Record { value: Box<SchemaExpr> },
    Union { variants: Vec<SchemaExpr> },
    DiscriminatedUnion {
        discriminator: String,
        variants: Vec<SchemaExpr>,
    },
    /// A construct the generator recognizes but cannot express.
    Unsupported { reason: String },
}

/// A named field of an object constructor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectField {
    pub name: String,
    pub schema: SchemaExpr,
}

/// A chained schema operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", content = "arg", rename_all = "kebab-case")]
pub enum Op {
    Int,
    /// Minimum string length or item count.
    Min(u64),
    /// Maximum string length or item count.
    Max(u64),
    Length(u64),
    Nonempty,
    Regex(String),
    Gt(Number),
    Gte(Number),
    Lt(Number),
    Lte(Number),
    Positive,
    Nonnegative,
    Negative,
    Nonpositive,
    MultipleOf(Number),
    Default(Value),
    Array,
    Optional,
    /// Schema for object keys not declared as fields.
    Catchall(Box<SchemaExpr>),
    /// Post-construction check on the realized key count.
    MinKeys { count: u64, message: String },
    MaxKeys { count: u64, message: String },
    /// Validate every undeclared key against a key schema, reporting
    /// failures on the offending key's path.
    KeyCheck {
        key: Box<SchemaExpr>,
        known: Vec<String>,
    },
}

impl SchemaExpr {
    pub fn new(base: Constructor) -> Self {
        Self {
            base,
            ops: Vec::new(),
        }
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Self::new(Constructor::Ref { name: name.into() })
    }

    pub fn lazy(name: impl Into<String>) -> Self {
        Self::new(Constructor::Lazy { name: name.into() })
    }

    pub fn literal(value: Value) -> Self {
        Self::new(Constructor::Literal { value })
    }

    pub fn with(mut self, op: Op) -> Self {
        self.ops.push(op);
        self
    }

    pub fn push(&mut self, op: Op) {
        self.ops.push(op);
    }

    pub fn is_optional(&self) -> bool {
        self.ops.contains(&Op::Optional)
    }

    /// Whether a lazy reference appears anywhere in this expression.
    pub fn contains_lazy(&self) -> bool {
        let in_base = match &self.base {
            Constructor::Lazy { .. } => true,
            Constructor::Object { fields } => fields.iter().any(|f| f.schema.contains_lazy()),
            Constructor::Record { value } => value.contains_lazy(),
            Constructor::Union { variants } | Constructor::DiscriminatedUnion { variants, .. } => {
                variants.iter().any(SchemaExpr::contains_lazy)
            }
            _ => false,
        };
        in_base
            || self.ops.iter().any(|op| match op {
                Op::Catchall(schema) => schema.contains_lazy(),
                Op::KeyCheck { key, .. } => key.contains_lazy(),
                _ => false,
            })
    }
}

impl ObjectField {
    pub fn new(name: impl Into<String>, schema: SchemaExpr) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

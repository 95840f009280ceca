//! Member-level rule mapping.
//!
//! Maps a single member's declared type and rules to a [`SchemaExpr`].
//! Operations are appended in a fixed order: base constructor, constraints,
//! array wrapper, optionality.

use crate::entity::{Member, Primitive, Rule, TypeRef};
use crate::expr::{Constructor, Op, SchemaExpr};
use serde_json::Number;
use std::collections::BTreeSet;

/// Where a member sits inside its owning entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberRole {
    /// Record field or method parameter.
    Field,
    /// Union variant. Never optional.
    Variant,
    /// Map key. Presence is governed by the map, not the member.
    MapKey,
    /// Map value. Presence is governed by the map, not the member.
    MapValue,
}

/// Context for mapping one member.
#[derive(Debug, Clone, Copy)]
pub struct MapContext<'a> {
    /// Name of the entity that owns the member.
    pub owner: &'a str,
    /// Names demoted to the circular set by the resolver.
    pub circular: &'a BTreeSet<String>,
    pub role: MemberRole,
}

impl<'a> MapContext<'a> {
    pub fn new(owner: &'a str, circular: &'a BTreeSet<String>, role: MemberRole) -> Self {
        Self {
            owner,
            circular,
            role,
        }
    }

    fn allows_optional(&self) -> bool {
        self.role == MemberRole::Field
    }
}

/// Map a member to its schema expression.
pub fn map_member(member: &Member, ctx: &MapContext<'_>) -> SchemaExpr {
    let mut expr = match &member.ty {
        TypeRef::Primitive(primitive) => map_primitive(*primitive, member),
        TypeRef::Named(name) => map_reference(name, ctx),
    };
    let default = applicable_default(member);

    if member.array {
        expr.push(Op::Array);
        let (min, max) = item_bounds(&member.rules);
        if let Some(min) = min {
            expr.push(min_op(min));
        }
        if let Some(max) = max {
            expr.push(Op::Max(max));
        }
    }
    if let Some(default) = default {
        expr.push(Op::Default(default.clone()));
    }

    if !member.required && ctx.allows_optional() && default.is_none() {
        expr.push(Op::Optional);
    }
    expr
}

fn map_primitive(primitive: Primitive, member: &Member) -> SchemaExpr {
    match primitive {
        Primitive::Null => SchemaExpr::new(Constructor::Null),
        Primitive::String => map_string(member),
        p if p.is_numeric() => map_number(p, member),
        Primitive::Boolean => match &member.constant {
            Some(value) => SchemaExpr::literal(value.clone()),
            None => SchemaExpr::new(Constructor::Boolean {
                coerce: coerces(member),
            }),
        },
        Primitive::Date | Primitive::DateTime => {
            SchemaExpr::new(Constructor::Date { coerce: true })
        }
        _ => SchemaExpr::new(Constructor::Any),
    }
}

fn map_string(member: &Member) -> SchemaExpr {
    if let Some(value) = &member.constant {
        return SchemaExpr::literal(value.clone());
    }
    let enum_values = member.rules.iter().find_map(|rule| match rule {
        Rule::Enum { values } => Some(values),
        _ => None,
    });
    if let Some(values) = enum_values {
        return SchemaExpr::new(Constructor::Enum {
            values: values.clone(),
        });
    }

    let mut expr = SchemaExpr::new(Constructor::String);
    match length_bounds(&member.rules) {
        (Some(min), Some(max)) if min == max => expr.push(Op::Length(min)),
        (min, max) => {
            if let Some(min) = min {
                expr.push(min_op(min));
            }
            if let Some(max) = max {
                expr.push(Op::Max(max));
            }
        }
    }
    for rule in &member.rules {
        if let Rule::Pattern { pattern } = rule {
            expr.push(Op::Regex(pattern.clone()));
        }
    }
    expr
}

// Constants are emitted as plain literals; literal coercion is not supported.
fn map_number(primitive: Primitive, member: &Member) -> SchemaExpr {
    if let Some(value) = &member.constant {
        return SchemaExpr::literal(value.clone());
    }

    let mut expr = SchemaExpr::new(Constructor::Number {
        coerce: coerces(member),
    });
    if primitive.is_integral() {
        expr.push(Op::Int);
    }

    let bounds = range_bounds(&member.rules);
    if let Some(n) = bounds.gt {
        expr.push(if is_zero(&n) { Op::Positive } else { Op::Gt(n) });
    }
    if let Some(n) = bounds.gte {
        expr.push(if is_zero(&n) {
            Op::Nonnegative
        } else {
            Op::Gte(n)
        });
    }
    if let Some(n) = bounds.lt {
        expr.push(if is_zero(&n) { Op::Negative } else { Op::Lt(n) });
    }
    if let Some(n) = bounds.lte {
        expr.push(if is_zero(&n) {
            Op::Nonpositive
        } else {
            Op::Lte(n)
        });
    }
    for rule in &member.rules {
        if let Rule::MultipleOf { value } = rule {
            expr.push(Op::MultipleOf(value.clone()));
        }
    }
    expr
}

fn map_reference(name: &str, ctx: &MapContext<'_>) -> SchemaExpr {
    if name == ctx.owner || ctx.circular.contains(name) {
        SchemaExpr::lazy(name)
    } else {
        SchemaExpr::reference(name)
    }
}

/// Only numeric and boolean parameters bound outside the body coerce.
fn coerces(member: &Member) -> bool {
    member.location.is_some_and(|location| location.coerces())
}

/// Defaults apply to non-constant strings, numbers and booleans.
fn applicable_default(member: &Member) -> Option<&serde_json::Value> {
    let default = member.default.as_ref()?;
    if member.constant.is_some() {
        return None;
    }
    match member.ty {
        TypeRef::Primitive(Primitive::String | Primitive::Boolean) => Some(default),
        TypeRef::Primitive(p) if p.is_numeric() => Some(default),
        _ => None,
    }
}

fn min_op(min: u64) -> Op {
    if min == 1 { Op::Nonempty } else { Op::Min(min) }
}

fn is_zero(n: &Number) -> bool {
    n.as_f64() == Some(0.0)
}

fn length_bounds(rules: &[Rule]) -> (Option<u64>, Option<u64>) {
    let mut bounds = (None, None);
    for rule in rules {
        if let Rule::Length { min, max } = rule {
            bounds.0 = min.or(bounds.0);
            bounds.1 = max.or(bounds.1);
        }
    }
    bounds
}

fn item_bounds(rules: &[Rule]) -> (Option<u64>, Option<u64>) {
    let mut bounds = (None, None);
    for rule in rules {
        if let Rule::Items { min, max } = rule {
            bounds.0 = min.or(bounds.0);
            bounds.1 = max.or(bounds.1);
        }
    }
    bounds
}

/// Entity-level key count bounds.
pub(crate) fn key_bounds(rules: &[Rule]) -> (Option<u64>, Option<u64>) {
    let mut bounds = (None, None);
    for rule in rules {
        if let Rule::Keys { min, max } = rule {
            bounds.0 = min.or(bounds.0);
            bounds.1 = max.or(bounds.1);
        }
    }
    bounds
}

#[derive(Default)]
struct RangeBounds {
    gt: Option<Number>,
    gte: Option<Number>,
    lt: Option<Number>,
    lte: Option<Number>,
}

fn range_bounds(rules: &[Rule]) -> RangeBounds {
    let mut bounds = RangeBounds::default();
    for rule in rules {
        if let Rule::Range { gt, gte, lt, lte } = rule {
            bounds.gt = gt.clone().or(bounds.gt);
            bounds.gte = gte.clone().or(bounds.gte);
            bounds.lt = lt.clone().or(bounds.lt);
            bounds.lte = lte.clone().or(bounds.lte);
        }
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ParamLocation;
    use serde_json::json;

    fn field(member: &Member) -> SchemaExpr {
        let circular = BTreeSet::new();
        map_member(member, &MapContext::new("Owner", &circular, MemberRole::Field))
    }

    fn number(n: i64) -> Number {
        Number::from(n)
    }

    #[test]
    fn min_length_one_is_nonempty() {
        let member = Member::required("name", Primitive::String).with_rule(Rule::Length {
            min: Some(1),
            max: None,
        });
        assert_eq!(field(&member).ops, vec![Op::Nonempty]);
    }

    #[test]
    fn equal_length_bounds_become_exact_length() {
        let member = Member::required("code", Primitive::String).with_rule(Rule::Length {
            min: Some(3),
            max: Some(3),
        });
        assert_eq!(field(&member).ops, vec![Op::Length(3)]);
    }

    #[test]
    fn length_then_pattern_order() {
        let member = Member::required("slug", Primitive::String)
            .with_rule(Rule::Pattern {
                pattern: "^[a-z-]+$".into(),
            })
            .with_rule(Rule::Length {
                min: Some(3),
                max: Some(64),
            });
        assert_eq!(
            field(&member).ops,
            vec![Op::Min(3), Op::Max(64), Op::Regex("^[a-z-]+$".into())]
        );
    }

    #[test]
    fn string_constant_wins_over_enum() {
        let member = Member::required("kind", Primitive::String)
            .with_const("circle")
            .with_rule(Rule::Enum {
                values: vec!["circle".into(), "square".into()],
            });
        assert_eq!(field(&member), SchemaExpr::literal(json!("circle")));
    }

    #[test]
    fn string_enum_with_default_is_not_optional() {
        let member = Member::optional("status", Primitive::String)
            .with_default("active")
            .with_rule(Rule::Enum {
                values: vec!["active".into(), "archived".into()],
            });
        let expr = field(&member);
        assert_eq!(
            expr.base,
            Constructor::Enum {
                values: vec!["active".into(), "archived".into()]
            }
        );
        assert_eq!(expr.ops, vec![Op::Default(json!("active"))]);
    }

    #[test]
    fn gte_zero_is_nonnegative() {
        let member = Member::required("count", Primitive::Integer).with_rule(Rule::Range {
            gt: None,
            gte: Some(number(0)),
            lt: None,
            lte: None,
        });
        assert_eq!(field(&member).ops, vec![Op::Int, Op::Nonnegative]);
    }

    #[test]
    fn range_order_is_fixed() {
        let member = Member::required("ratio", Primitive::Double)
            .with_rule(Rule::MultipleOf {
                value: Number::from_f64(0.5).unwrap(),
            })
            .with_rule(Rule::Range {
                gt: None,
                gte: None,
                lt: None,
                lte: Some(number(10)),
            })
            .with_rule(Rule::Range {
                gt: Some(number(0)),
                gte: None,
                lt: None,
                lte: None,
            });
        assert_eq!(
            field(&member).ops,
            vec![
                Op::Positive,
                Op::Lte(number(10)),
                Op::MultipleOf(Number::from_f64(0.5).unwrap())
            ]
        );
    }

    #[test]
    fn zero_upper_bounds_specialise() {
        let member = Member::required("debt", Primitive::Long).with_rule(Rule::Range {
            gt: None,
            gte: None,
            lt: Some(number(0)),
            lte: Some(number(0)),
        });
        assert_eq!(
            field(&member).ops,
            vec![Op::Int, Op::Negative, Op::Nonpositive]
        );
    }

    #[test]
    fn numeric_constant_skips_default() {
        let member = Member::optional("version", Primitive::Integer)
            .with_const(2)
            .with_default(1);
        let expr = field(&member);
        assert_eq!(expr.base, Constructor::Literal { value: json!(2) });
        assert_eq!(expr.ops, vec![Op::Optional]);
    }

    #[test]
    fn string_constant_with_default_stays_optional() {
        let member = Member::optional("kind", Primitive::String)
            .with_const("a")
            .with_default("a");
        assert_eq!(field(&member).ops, vec![Op::Optional]);
    }

    #[test]
    fn dropped_default_keeps_optional() {
        let created =
            Member::optional("createdAt", Primitive::DateTime).with_default("2024-01-01");
        let doc = Member::optional("doc", Primitive::Untyped).with_default(json!({}));

        assert_eq!(field(&created).ops, vec![Op::Optional]);
        assert_eq!(field(&doc).ops, vec![Op::Optional]);
    }

    #[test]
    fn numeric_default_replaces_optional() {
        let member = Member::optional("page", Primitive::Integer).with_default(1);
        assert_eq!(field(&member).ops, vec![Op::Int, Op::Default(json!(1))]);
    }

    #[test]
    fn query_parameters_coerce_and_body_parameters_do_not() {
        let query = Member::required("limit", Primitive::Integer).at(ParamLocation::Query);
        let body = Member::required("limit", Primitive::Integer).at(ParamLocation::Body);
        let field_only = Member::required("limit", Primitive::Integer);

        assert_eq!(field(&query).base, Constructor::Number { coerce: true });
        assert_eq!(field(&body).base, Constructor::Number { coerce: false });
        assert_eq!(field(&field_only).base, Constructor::Number { coerce: false });
    }

    #[test]
    fn header_boolean_coerces_but_string_never_does() {
        let flag = Member::required("dryRun", Primitive::Boolean).at(ParamLocation::Header);
        assert_eq!(field(&flag).base, Constructor::Boolean { coerce: true });

        let name = Member::required("name", Primitive::String).at(ParamLocation::Path);
        assert_eq!(field(&name).base, Constructor::String);
    }

    #[test]
    fn dates_always_coerce() {
        let member = Member::optional("createdAt", Primitive::DateTime);
        let expr = field(&member);
        assert_eq!(expr.base, Constructor::Date { coerce: true });
        assert_eq!(expr.ops, vec![Op::Optional]);
    }

    #[test]
    fn binary_and_untyped_are_any() {
        assert_eq!(
            field(&Member::required("blob", Primitive::Binary)).base,
            Constructor::Any
        );
        assert_eq!(
            field(&Member::required("doc", Primitive::Untyped)).base,
            Constructor::Any
        );
    }

    #[test]
    fn null_is_null_constructor() {
        let expr = field(&Member::required("nothing", Primitive::Null));
        assert_eq!(expr, SchemaExpr::new(Constructor::Null));
    }

    #[test]
    fn arrays_wrap_after_element_constraints() {
        let member = Member::optional("tags", Primitive::String)
            .array()
            .with_rule(Rule::Length {
                min: Some(2),
                max: None,
            })
            .with_rule(Rule::Items {
                min: Some(1),
                max: Some(10),
            });
        assert_eq!(
            field(&member).ops,
            vec![
                Op::Min(2),
                Op::Array,
                Op::Nonempty,
                Op::Max(10),
                Op::Optional
            ]
        );
    }

    #[test]
    fn array_item_minimum_above_one() {
        let member = Member::required("ids", Primitive::String)
            .array()
            .with_rule(Rule::Items {
                min: Some(2),
                max: None,
            });
        assert_eq!(field(&member).ops, vec![Op::Array, Op::Min(2)]);
    }

    #[test]
    fn self_and_circular_references_are_lazy() {
        let circular: BTreeSet<String> = ["Author".to_string()].into();
        let ctx = MapContext::new("Book", &circular, MemberRole::Field);

        let parent = Member::optional("parent", TypeRef::named("Book"));
        let author = Member::required("author", TypeRef::named("Author"));
        let shelf = Member::required("shelf", TypeRef::named("Shelf"));

        assert_eq!(map_member(&parent, &ctx).base, Constructor::Lazy {
            name: "Book".into()
        });
        assert_eq!(map_member(&author, &ctx), SchemaExpr::lazy("Author"));
        assert_eq!(map_member(&shelf, &ctx), SchemaExpr::reference("Shelf"));
    }

    #[test]
    fn references_ignore_defaults_for_optionality() {
        let member = Member::optional("owner", TypeRef::named("User")).with_default(json!({}));
        assert_eq!(
            field(&member),
            SchemaExpr::reference("User").with(Op::Optional)
        );
    }

    #[test]
    fn variants_and_map_members_are_never_optional() {
        let circular = BTreeSet::new();
        let member = Member::optional("text", Primitive::String);
        for role in [MemberRole::Variant, MemberRole::MapKey, MemberRole::MapValue] {
            let expr = map_member(&member, &MapContext::new("Owner", &circular, role));
            assert!(!expr.is_optional(), "{role:?} should not be optional");
        }
    }
}

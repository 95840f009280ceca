//! Zod writer for synthesized schemas.
//!
//! Emits one `const` per definition, ordered definitions first, then the
//! circular group. Definitions that reference anything lazily are annotated
//! with `z.ZodTypeAny` so TypeScript can type the self-referential initializer.

use crate::expr::{Constructor, Op, SchemaExpr};
use crate::synth::{Definition, Synthesis};
use crate::traits::{Backend, EmitOptions};
use serde_json::Value;
use std::fmt::Write;

/// Static instance of the Zod backend for registry.
pub static ZOD_BACKEND: ZodBackend = ZodBackend;

/// Zod backend implementing the Backend trait.
pub struct ZodBackend;

impl Backend for ZodBackend {
    fn name(&self) -> &'static str {
        "zod"
    }

    fn extension(&self) -> &'static str {
        "ts"
    }

    fn generate(&self, synthesis: &Synthesis, options: &EmitOptions) -> String {
        generate_zod(synthesis, options)
    }
}

/// Generate a Zod module from a synthesis.
pub fn generate_zod(synthesis: &Synthesis, options: &EmitOptions) -> String {
    let mut writer = ZodWriter::new(options);
    writer.write_module(synthesis);
    writer.output
}

/// Render a single expression, without any surrounding declaration.
pub fn render_expr(expr: &SchemaExpr, options: &EmitOptions) -> String {
    let mut writer = ZodWriter::new(options);
    writer.write_expr(expr);
    writer.output
}

struct ZodWriter<'a> {
    options: &'a EmitOptions,
    output: String,
    indent: usize,
}

impl<'a> ZodWriter<'a> {
    fn new(options: &'a EmitOptions) -> Self {
        Self {
            options,
            output: String::new(),
            indent: 0,
        }
    }

    fn write_module(&mut self, synthesis: &Synthesis) {
        self.output
            .push_str("// Generated by normalize-schemagen. Do not edit.\n\n");
        writeln!(
            self.output,
            "import {{ z }} from {};",
            quote(&self.options.import_path)
        )
        .unwrap();

        for def in &synthesis.definitions {
            self.write_definition(def, false);
        }
        for def in &synthesis.circular {
            self.write_definition(def, true);
        }
    }

    fn write_definition(&mut self, def: &Definition, circular: bool) {
        let export = if self.options.export { "export " } else { "" };
        let ident = self.options.schema_ident(&def.name);
        let annotation = if circular || def.schema.contains_lazy() {
            ": z.ZodTypeAny"
        } else {
            ""
        };

        self.output.push('\n');
        write!(self.output, "{export}const {ident}{annotation} = ").unwrap();
        self.write_expr(&def.schema);
        self.output.push_str(";\n");

        if self.options.infer_types {
            writeln!(
                self.output,
                "{export}type {} = z.infer<typeof {ident}>;",
                def.name
            )
            .unwrap();
        }
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.output.push_str("  ");
        }
    }

    fn write_expr(&mut self, expr: &SchemaExpr) {
        self.write_constructor(&expr.base);
        for op in &expr.ops {
            self.write_op(op);
        }
    }

    fn write_list(&mut self, items: &[SchemaExpr]) {
        self.output.push('[');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.write_expr(item);
        }
        self.output.push(']');
    }

    fn write_constructor(&mut self, base: &Constructor) {
        match base {
            Constructor::String => self.output.push_str("z.string()"),
            Constructor::Number { coerce } => self.output.push_str(if *coerce {
                "z.coerce.number()"
            } else {
                "z.number()"
            }),
            Constructor::Boolean { coerce } => self.output.push_str(if *coerce {
                "z.coerce.boolean()"
            } else {
                "z.boolean()"
            }),
            Constructor::Date { coerce } => self.output.push_str(if *coerce {
                "z.coerce.date()"
            } else {
                "z.date()"
            }),
            Constructor::Any => self.output.push_str("z.any()"),
            Constructor::Null => self.output.push_str("z.null()"),
            Constructor::Literal { value } => {
                write!(self.output, "z.literal({value})").unwrap();
            }
            Constructor::Enum { values } => {
                let values: Vec<String> = values.iter().map(|v| quote(v)).collect();
                write!(self.output, "z.enum([{}])", values.join(", ")).unwrap();
            }
            Constructor::Ref { name } => {
                let ident = self.options.schema_ident(name);
                self.output.push_str(&ident);
            }
            Constructor::Lazy { name } => {
                let ident = self.options.schema_ident(name);
                write!(self.output, "z.lazy(() => {ident})").unwrap();
            }
            Constructor::Object { fields } => {
                if fields.is_empty() {
                    self.output.push_str("z.object({})");
                    return;
                }
                self.output.push_str("z.object({\n");
                self.indent += 1;
                for field in fields {
                    self.write_indent();
                    write!(self.output, "{}: ", property(&field.name)).unwrap();
                    self.write_expr(&field.schema);
                    self.output.push_str(",\n");
                }
                self.indent -= 1;
                self.write_indent();
                self.output.push_str("})");
            }
            Constructor::Record { value } => {
                self.output.push_str("z.record(z.string(), ");
                self.write_expr(value);
                self.output.push(')');
            }
            Constructor::Union { variants } => {
                self.output.push_str("z.union(");
                self.write_list(variants);
                self.output.push(')');
            }
            Constructor::DiscriminatedUnion {
                discriminator,
                variants,
            } => {
                write!(self.output, "z.discriminatedUnion({}, ", quote(discriminator)).unwrap();
                self.write_list(variants);
                self.output.push(')');
            }
            Constructor::Unsupported { reason } => {
                write!(self.output, "z.any() /* unsupported: {reason} */").unwrap();
            }
        }
    }

    fn write_op(&mut self, op: &Op) {
        match op {
            Op::Int => self.output.push_str(".int()"),
            Op::Min(n) => write!(self.output, ".min({n})").unwrap(),
            Op::Max(n) => write!(self.output, ".max({n})").unwrap(),
            Op::Length(n) => write!(self.output, ".length({n})").unwrap(),
            Op::Nonempty => self.output.push_str(".nonempty()"),
            Op::Regex(pattern) => {
                write!(self.output, ".regex(new RegExp({}))", quote(pattern)).unwrap();
            }
            Op::Gt(n) => write!(self.output, ".gt({n})").unwrap(),
            Op::Gte(n) => write!(self.output, ".gte({n})").unwrap(),
            Op::Lt(n) => write!(self.output, ".lt({n})").unwrap(),
            Op::Lte(n) => write!(self.output, ".lte({n})").unwrap(),
            Op::Positive => self.output.push_str(".positive()"),
            Op::Nonnegative => self.output.push_str(".nonnegative()"),
            Op::Negative => self.output.push_str(".negative()"),
            Op::Nonpositive => self.output.push_str(".nonpositive()"),
            Op::MultipleOf(n) => write!(self.output, ".multipleOf({n})").unwrap(),
            Op::Default(value) => write!(self.output, ".default({value})").unwrap(),
            Op::Array => self.output.push_str(".array()"),
            Op::Optional => self.output.push_str(".optional()"),
            Op::Catchall(schema) => {
                self.output.push_str(".catchall(");
                self.write_expr(schema);
                self.output.push(')');
            }
            Op::MinKeys { count, message } => {
                write!(
                    self.output,
                    ".refine((value) => Object.keys(value).length >= {count}, {{ message: {} }})",
                    quote(message)
                )
                .unwrap();
            }
            Op::MaxKeys { count, message } => {
                write!(
                    self.output,
                    ".refine((value) => Object.keys(value).length <= {count}, {{ message: {} }})",
                    quote(message)
                )
                .unwrap();
            }
            Op::KeyCheck { key, known } => self.write_key_check(key, known),
        }
    }

    fn write_key_check(&mut self, key: &SchemaExpr, known: &[String]) {
        let known: Vec<String> = known.iter().map(|k| quote(k)).collect();
        self.output.push_str(".superRefine((value, ctx) => {\n");
        self.indent += 1;
        self.line(&format!(
            "const known = new Set<string>([{}]);",
            known.join(", ")
        ));
        self.line("for (const key of Object.keys(value)) {");
        self.indent += 1;
        self.line("if (known.has(key)) continue;");
        self.write_indent();
        self.output.push_str("const result = ");
        self.write_expr(key);
        self.output.push_str(".safeParse(key);\n");
        self.line("if (!result.success) {");
        self.indent += 1;
        self.line("ctx.addIssue({");
        self.indent += 1;
        self.line("code: z.ZodIssueCode.custom,");
        self.line("path: [key],");
        self.line(
            "message: result.error.issues.map((issue) => issue.message).join(\"; \"),",
        );
        self.indent -= 1;
        self.line("});");
        self.indent -= 1;
        self.line("}");
        self.indent -= 1;
        self.line("}");
        self.indent -= 1;
        self.write_indent();
        self.output.push_str("})");
    }

    fn line(&mut self, text: &str) {
        self.write_indent();
        self.output.push_str(text);
        self.output.push('\n');
    }
}

/// A JavaScript string literal.
fn quote(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

/// An object property key, quoted unless it is a plain identifier.
fn property(name: &str) -> String {
    let mut chars = name.chars();
    let plain = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if plain { name.to_string() } else { quote(name) }
}

//! C++ header emission: validated `HierarchySchema` in, source text out.
//!
//! Pure function of the schema — no timestamps, no hidden state, byte-stable
//! across runs. Emission proceeds in fixed stages (header, forward
//! declarations, visitor interface, base interface, variants, adapter), each
//! appending to the buffer in order. Variant and field order is exactly the
//! order supplied by the schema.

use rayon::prelude::*;

use crate::error::SchemaError;
use crate::schema::{FieldDef, HierarchySchema, VariantDef};

const INDENT: &str = "    ";

/// Marks every artifact as machine-generated.
const PROVENANCE: &str = "/* Autogenerated by astgen, DO NOT EDIT. */";

// ————————————————————————————————————————————————————————————————————————————
// EMITTER
// ————————————————————————————————————————————————————————————————————————————

/// Accumulates emitted source text for one artifact.
#[derive(Debug, Default)]
pub struct Emitter {
    out: String,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one full hierarchy in fixed stage order. The schema must
    /// already be validated; emission itself cannot fail.
    pub fn emit(&mut self, schema: &HierarchySchema) {
        self.header(schema);
        let namespaces = self.open_namespaces(schema);
        self.forward_decls(schema);
        self.visitor_interface(schema);
        self.base_interface(schema);
        for variant in &schema.variants {
            self.variant(schema, variant);
        }
        if schema.result_type.is_void() && schema.value_getter {
            self.value_getter();
        }
        self.close_namespaces(&namespaces);

        // exactly one trailing newline
        while self.out.ends_with("\n\n") {
            self.out.pop();
        }
    }

    pub fn into_string(self) -> String {
        self.out
    }

    fn line(&mut self, s: &str) {
        self.out.push_str(s);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    // Stage 1: provenance marker, pragma, verbatim imports in order.
    fn header(&mut self, schema: &HierarchySchema) {
        self.line(PROVENANCE);
        self.line("#pragma once");
        self.blank();
        if !schema.imports.is_empty() {
            for import in &schema.imports {
                self.line(import);
            }
            self.blank();
        }
    }

    fn open_namespaces(&mut self, schema: &HierarchySchema) -> Vec<String> {
        let segments: Vec<String> = schema
            .namespace
            .as_deref()
            .map(|ns| ns.split("::").map(str::to_string).collect())
            .unwrap_or_default();
        for segment in &segments {
            self.line(&format!("namespace {segment}"));
            self.line("{");
        }
        segments
    }

    fn close_namespaces(&mut self, segments: &[String]) {
        for segment in segments.iter().rev() {
            self.line(&format!("}} // end {segment}"));
        }
    }

    // Stage 2: one forward declaration per variant so the visitor interface
    // can reference variant types before their definitions.
    fn forward_decls(&mut self, schema: &HierarchySchema) {
        for variant in &schema.variants {
            self.line(&format!("class {};", variant.name));
        }
        self.blank();
    }

    // Stage 3: one pure-virtual operation per variant.
    fn visitor_interface(&mut self, schema: &HierarchySchema) {
        let visitor = visitor_name(schema);
        let param = schema.base_name.to_lowercase();
        let ret = schema.result_type.cpp();

        self.line(&format!("class {visitor}"));
        self.line("{");
        self.line("public:");
        for variant in &schema.variants {
            self.line(&format!(
                "{INDENT}virtual {ret} {visit}({name}& {param}) = 0;",
                visit = visit_method(schema, variant),
                name = variant.name,
            ));
        }
        self.line(&format!("}}; // end {visitor}"));
        self.blank();
    }

    // Stage 4: virtual destructor contract plus the abstract dispatch
    // operation every variant overrides.
    fn base_interface(&mut self, schema: &HierarchySchema) {
        let base = &schema.base_name;
        let visitor = visitor_name(schema);
        let ret = schema.result_type.cpp();

        self.line(&format!("class {base}"));
        self.line("{");
        self.line("public:");
        self.line(&format!("{INDENT}virtual ~{base}() = default;"));
        self.line(&format!("{INDENT}virtual {ret} accept({visitor}& visitor) = 0;"));
        self.line(&format!("}}; // end {base}"));
        self.blank();
    }

    // Stage 5: constructor, double-dispatch `accept`, member storage.
    fn variant(&mut self, schema: &HierarchySchema, variant: &VariantDef) {
        let visitor = visitor_name(schema);
        let ret = schema.result_type.cpp();

        self.line(&format!("class {} : public {}", variant.name, schema.base_name));
        self.line("{");
        self.line("public:");

        // Constructor binds each field to a same-named member, in declared
        // order. A field-less variant keeps its implicit default constructor
        // (an empty initializer list is ill-formed C++).
        if !variant.fields.is_empty() {
            let params = variant
                .fields
                .iter()
                .map(|f| format!("{} {}", member_type(schema, f), f.name))
                .collect::<Vec<_>>()
                .join(", ");
            self.line(&format!("{INDENT}{}({params}) :", variant.name));
            let inits = variant
                .fields
                .iter()
                .map(|f| format!("{INDENT}{INDENT}{0}({0})", f.name))
                .collect::<Vec<_>>()
                .join(",\n");
            self.line(&inits);
            self.line(&format!("{INDENT}{{"));
            self.line(&format!("{INDENT}}}"));
            self.blank();
        }

        self.line(&format!("{INDENT}{ret} accept({visitor}& visitor) final"));
        self.line(&format!("{INDENT}{{"));
        let dispatch = format!("visitor.{}(*this);", visit_method(schema, variant));
        if schema.result_type.is_void() {
            self.line(&format!("{INDENT}{INDENT}{dispatch}"));
        } else {
            self.line(&format!("{INDENT}{INDENT}return {dispatch}"));
        }
        self.line(&format!("{INDENT}}}"));

        if !variant.fields.is_empty() {
            self.blank();
            for field in &variant.fields {
                self.line(&format!("{INDENT}{} {};", member_type(schema, field), field.name));
            }
        }

        self.line(&format!("}}; // end {}", variant.name));
        self.blank();
    }

    // Stage 6: generic adapter letting a void dispatch interface still carry
    // a per-traversal result. The visitor implementation derives from this
    // and calls `returnValue` exactly once per visit.
    fn value_getter(&mut self) {
        self.line("template <typename VisitorImpl, typename VisitablePtr, typename ResultType>");
        self.line("class ValueGetter");
        self.line("{");
        self.line("public:");
        self.line(&format!("{INDENT}static ResultType getValue(VisitablePtr node)"));
        self.line(&format!("{INDENT}{{"));
        self.line(&format!("{INDENT}{INDENT}VisitorImpl visitor;"));
        self.line(&format!("{INDENT}{INDENT}node->accept(visitor);"));
        self.line(&format!("{INDENT}{INDENT}return visitor.value_;"));
        self.line(&format!("{INDENT}}}"));
        self.blank();
        self.line(&format!("{INDENT}void returnValue(ResultType value)"));
        self.line(&format!("{INDENT}{{"));
        self.line(&format!("{INDENT}{INDENT}value_ = value;"));
        self.line(&format!("{INDENT}}}"));
        self.blank();
        self.line("private:");
        self.line(&format!("{INDENT}ResultType value_;"));
        self.line("}; // end ValueGetter");
        self.blank();
    }
}

fn visitor_name(schema: &HierarchySchema) -> String {
    format!("{}Visitor", schema.base_name)
}

fn visit_method(schema: &HierarchySchema, variant: &VariantDef) -> String {
    format!("visit{}{}", variant.name, schema.base_name)
}

// A field typed as the base denotes a polymorphic child: shared ownership,
// never a raw pointer.
fn member_type(schema: &HierarchySchema, field: &FieldDef) -> String {
    if field.type_name == schema.base_name {
        format!("std::shared_ptr<{}>", schema.base_name)
    } else {
        field.type_name.clone()
    }
}

/// Emit one schema into a fresh buffer.
pub fn emit_header(schema: &HierarchySchema) -> String {
    let mut emitter = Emitter::new();
    emitter.emit(schema);
    emitter.into_string()
}

// ————————————————————————————————————————————————————————————————————————————
// BATCH
// ————————————————————————————————————————————————————————————————————————————

/// One emitted artifact, addressed by base type name.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: String,
    pub text: String,
}

/// Validate and emit every definition independently. Each element is its own
/// failure domain: one definition's `SchemaError` never blocks a sibling.
/// Results come back in input order.
pub fn emit_batch(schemas: &[HierarchySchema]) -> Vec<Result<Artifact, SchemaError>> {
    schemas
        .par_iter()
        .map(|schema| {
            schema.validate()?;
            Ok(Artifact {
                file_name: schema.artifact_name(),
                text: emit_header(schema),
            })
        })
        .collect()
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

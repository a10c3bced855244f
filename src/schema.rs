// Strongly-typed schema model for codegen. No serde_json::Value past this point.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::SchemaError;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// One hierarchy definition: an abstract root type plus its closed, ordered
/// set of record variants. Constructed fresh per run, immutable after
/// `validate`, discarded after emission.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HierarchySchema {
    /// Defaulted (not required) so a missing key surfaces as a `SchemaError`
    /// from `validate` rather than aborting the whole document parse.
    #[serde(default)]
    pub base_name: String,

    /// What every visit operation returns; `void` means the dispatch
    /// interface carries no value.
    #[serde(default)]
    pub result_type: ReturnType,

    /// Verbatim directive lines, emitted in order. Never deduplicated.
    #[serde(default)]
    pub imports: Vec<String>,

    /// Optional `::`-separated namespace path wrapping all declarations.
    #[serde(default)]
    pub namespace: Option<String>,

    /// Emit the `ValueGetter` adapter. Only takes effect while `resultType`
    /// is void; a typed result supersedes the adapter.
    #[serde(default = "default_true")]
    pub value_getter: bool,

    #[serde(default)]
    pub variants: Vec<VariantDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VariantDef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FieldDef {
    pub name: String,
    /// A C++ value type, or the hierarchy's `baseName` to denote a shared
    /// polymorphic child.
    pub type_name: String,
}

/// Return type of every visitor operation and `accept`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ReturnType {
    #[default]
    Void,
    Typed(String),
}

impl From<String> for ReturnType {
    fn from(s: String) -> Self {
        if s == "void" { ReturnType::Void } else { ReturnType::Typed(s) }
    }
}

impl ReturnType {
    pub fn is_void(&self) -> bool {
        matches!(self, ReturnType::Void)
    }

    /// The spelling used in emitted source.
    pub fn cpp(&self) -> &str {
        match self {
            ReturnType::Void => "void",
            ReturnType::Typed(t) => t,
        }
    }
}

/// An input document: a single hierarchy, or a batch emitted independently.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SchemaDocument {
    Batch { schemas: Vec<HierarchySchema> },
    Single(HierarchySchema),
}

impl SchemaDocument {
    /// Flatten to the definitions in declaration order.
    pub fn into_schemas(self) -> Vec<HierarchySchema> {
        match self {
            SchemaDocument::Batch { schemas } => schemas,
            SchemaDocument::Single(schema) => vec![schema],
        }
    }
}

fn default_true() -> bool {
    true
}

// ————————————————————————————————————————————————————————————————————————————
// VALIDATION
// ————————————————————————————————————————————————————————————————————————————

static IDENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

// Type positions also admit `::` qualification and a template argument list,
// e.g. `std::vector<Token>`.
static TYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(::[A-Za-z_][A-Za-z0-9_]*)*(<[A-Za-z0-9_:<>,&* ]+>)?$")
        .unwrap()
});

fn check_ident(field: String, value: &str) -> Result<(), SchemaError> {
    if IDENT_RE.is_match(value) {
        Ok(())
    } else {
        Err(SchemaError::InvalidIdentifier { field, value: value.to_string() })
    }
}

fn check_type(field: String, value: &str) -> Result<(), SchemaError> {
    if TYPE_RE.is_match(value) {
        Ok(())
    } else {
        Err(SchemaError::InvalidIdentifier { field, value: value.to_string() })
    }
}

impl HierarchySchema {
    /// Check every invariant. Runs before any text is produced; the first
    /// violation wins. Generation is all-or-nothing per hierarchy.
    pub fn validate(&self) -> Result<(), SchemaError> {
        // 1) baseName present and well-formed, resultType well-formed
        if self.base_name.is_empty() {
            return Err(SchemaError::MissingBaseName);
        }
        check_ident("baseName".into(), &self.base_name)?;
        if let ReturnType::Typed(t) = &self.result_type {
            check_type("resultType".into(), t)?;
        }

        // 2) something to visit
        if self.variants.is_empty() {
            return Err(SchemaError::NoVariants { base: self.base_name.clone() });
        }

        // 3) variant names: well-formed, distinct, disjoint from baseName
        let mut seen = HashSet::new();
        for (i, variant) in self.variants.iter().enumerate() {
            check_ident(format!("variants[{i}].name"), &variant.name)?;
            if variant.name == self.base_name {
                return Err(SchemaError::VariantShadowsBase { name: variant.name.clone() });
            }
            if !seen.insert(variant.name.as_str()) {
                return Err(SchemaError::DuplicateVariant {
                    base: self.base_name.clone(),
                    name: variant.name.clone(),
                });
            }

            // 4) field names unique within the variant; types well-formed
            let mut field_seen = HashSet::new();
            for (j, field) in variant.fields.iter().enumerate() {
                check_ident(format!("variants[{i}].fields[{j}].name"), &field.name)?;
                check_type(format!("variants[{i}].fields[{j}].typeName"), &field.type_name)?;
                if !field_seen.insert(field.name.as_str()) {
                    return Err(SchemaError::DuplicateField {
                        variant: variant.name.clone(),
                        field: field.name.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// One artifact per hierarchy, addressed by the base type name.
    pub fn artifact_name(&self) -> String {
        format!("{}.h", self.base_name)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

//! Load hierarchy definitions from disk.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::IoError;
use crate::schema::{HierarchySchema, SchemaDocument};

/// Deserialize with JSON-path context in error messages.
fn from_str_with_path<T: DeserializeOwned>(path: &Path, src: &str) -> Result<T, IoError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| IoError::Parse {
        path: path.to_path_buf(),
        pointer: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

/// Read one document and return its hierarchy definitions in declaration
/// order. Structural parse failures are fatal to the document; validation is
/// deliberately NOT run here so that batch members stay independent failure
/// domains.
pub fn load_document(path: &Path) -> Result<Vec<HierarchySchema>, IoError> {
    let src = std::fs::read_to_string(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let document: SchemaDocument = from_str_with_path(path, &src)?;
    Ok(document.into_schemas())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_doc(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_a_single_hierarchy_document() {
        let file = write_doc(
            r#"{
                "baseName": "Expr",
                "variants": [{"name": "Literal", "fields": [{"name": "value", "typeName": "string"}]}]
            }"#,
        );
        let schemas = load_document(file.path()).unwrap();
        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas[0].base_name, "Expr");
        assert_eq!(schemas[0].variants[0].fields[0].type_name, "string");
    }

    #[test]
    fn loads_a_batch_document_in_order() {
        let file = write_doc(
            r#"{"schemas": [
                {"baseName": "Expr", "variants": [{"name": "Literal", "fields": []}]},
                {"baseName": "Stmt", "variants": [{"name": "Print", "fields": []}]}
            ]}"#,
        );
        let schemas = load_document(file.path()).unwrap();
        assert_eq!(schemas.len(), 2);
        assert_eq!(schemas[0].base_name, "Expr");
        assert_eq!(schemas[1].base_name, "Stmt");
    }

    #[test]
    fn malformed_json_reports_parse_error_with_path() {
        let file = write_doc(r#"{"baseName": "Expr", "variants": ["#);
        match load_document(file.path()) {
            Err(IoError::Parse { path, .. }) => assert_eq!(path, file.path()),
            other => panic!("expected Parse error, got: {other:?}"),
        }
    }

    #[test]
    fn missing_file_reports_read_error() {
        let path = Path::new("/nonexistent/definitions.json");
        match load_document(path) {
            Err(IoError::Read { .. }) => {}
            other => panic!("expected Read error, got: {other:?}"),
        }
    }

    #[test]
    fn missing_base_name_is_deferred_to_validation() {
        // a structurally fine document with a missing baseName parses and
        // fails later in validate(), keeping sibling batch members alive
        let file = write_doc(r#"{"variants": [{"name": "Literal", "fields": []}]}"#);
        let schemas = load_document(file.path()).unwrap();
        assert!(schemas[0].validate().is_err());
    }
}

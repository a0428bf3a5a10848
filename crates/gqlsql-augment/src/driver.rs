//! Augmenter Driver (spec §4.6): loads schema source files, runs every augmenter's schema
//! pass then every augmenter's field pass, and writes the augmented schema back out as
//! canonical GraphQL text with a generation header. Grounded on
//! `bandicoot/internal/sqlgen/augmentors/generate.go`'s `Generate`/`loadSchemaFromPath`.

use std::path::Path;

use gqlsql_core::epoch::Epoch;
use gqlsql_core::introspect;
use gqlsql_core::schema::{ExtendedType, Schema};

use crate::error::SchemaError;
use crate::filters::synthesize_comparators;
use crate::{Aggregation, Augmenter, Filters, Ordering, Pagination};

/// The augmenter pipeline in the order the reference implementation runs it: Pagination,
/// then Filters, then Ordering, then Aggregation. Order matters only in that Aggregation's
/// schema pass adds fields Filters/Ordering never see — which is intentional (spec §4.6).
fn augmenters() -> Vec<Box<dyn Augmenter>> {
    vec![Box::new(Pagination), Box::new(Filters), Box::new(Ordering), Box::new(Aggregation)]
}

/// Recursively reads every file under `dir`, matching `loadSchemaFromPath`'s
/// `filepath.Walk`. Files that fail to read are skipped with a warning rather than
/// aborting, matching the Go original's `log.Print(err); continue`.
fn load_schema_sources(dir: &Path) -> Result<Vec<String>, SchemaError> {
    let mut sources = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        let entries = std::fs::read_dir(&current)
            .map_err(|source| SchemaError::Io { path: current.display().to_string(), source })?;
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(error = %err, "failed to read directory entry");
                    continue;
                }
            };
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(text) => sources.push(text),
                Err(err) => tracing::warn!(path = %path.display(), error = %err, "failed to read schema source"),
            }
        }
    }
    Ok(sources)
}

/// Parses every `.graphql` file under `input_dir` into a single schema, runs the full
/// augmenter pipeline, and writes the result to `output_path` as canonical GraphQL text
/// prefixed with a `# Code generated ... DO NOT EDIT` header. Aborts with no output
/// written on the first augmentation error, matching the Go original's `log.Fatalf`.
pub fn generate(input_dir: &Path, output_path: &Path) -> Result<(), SchemaError> {
    let sources = load_schema_sources(input_dir)?;
    let source_refs: Vec<&str> = sources.iter().map(String::as_str).collect();
    let mut schema = gqlsql_core::parse::parse_schema(&source_refs)?;
    synthesize_comparators(&mut schema);

    let passes = augmenters();
    for augmenter in &passes {
        augmenter.on_schema(&mut schema)?;
    }

    let type_names: Vec<String> = schema.types.keys().filter(|name| !introspect::is_internal_name(name)).cloned().collect();
    for type_name in type_names {
        let is_composite = schema.get(&type_name).map(ExtendedType::is_composite).unwrap_or(false);
        if !is_composite {
            continue;
        }
        let field_names: Vec<String> = match schema.get(&type_name).and_then(ExtendedType::fields) {
            Some(fields) => fields.keys().filter(|name| !introspect::is_internal_name(name)).cloned().collect(),
            None => continue,
        };
        for field_name in field_names {
            for augmenter in &passes {
                let Some(mut field) =
                    schema.get(&type_name).and_then(ExtendedType::fields).and_then(|fields| fields.get(&field_name)).cloned()
                else {
                    continue;
                };
                augmenter.on_field(&schema, &type_name, &mut field)?;
                if let Some(fields) = schema.get_mut(&type_name).and_then(ExtendedType::fields_mut) {
                    fields.insert(field_name.clone(), field);
                }
            }
        }
    }

    let generated_at = Epoch::from_system_time(std::time::SystemTime::now());
    let text = crate::printer::format_schema(&schema, generated_at);
    std::fs::write(output_path, text).map_err(|source| SchemaError::Io { path: output_path.display().to_string(), source })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_writes_augmented_schema_with_generation_header() {
        let dir = std::env::temp_dir().join(format!("gqlsql-augment-test-{:?}", std::thread::current().id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("schema.graphql"),
            r#"
            type Query {
                adapterDevices: [AdapterDevice!]!
            }
            type AdapterDevice @generateInputs(where: "adapter_device_bool_exp", orderBy: "adapter_device_order_by") {
                name: String!
            }
            "#,
        )
        .unwrap();
        let output = dir.join("augmented.graphql");
        generate(&dir, &output).unwrap();
        let written = std::fs::read_to_string(&output).unwrap();
        assert!(written.starts_with("# Code generated"));
        assert!(written.contains("adapter_device_bool_exp"));
        std::fs::remove_dir_all(&dir).ok();
    }
}

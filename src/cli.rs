//! Minimal CLI: load definitions → validate → emit headers → write.
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use crate::emit::{self, Artifact};
use crate::error::IoError;
use crate::load;
use crate::schema::HierarchySchema;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Generate C++ variant-hierarchy + visitor headers from JSON definitions.
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// load definitions and write one header per hierarchy
    Generate(GenerateOut),
    /// load and validate definitions without writing anything
    Check(CheckOnly),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more definition documents. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct GenerateOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// directory receiving one `<baseName>.h` per hierarchy
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(clap::Parser, Debug)]
struct CheckOnly {
    #[command(flatten)]
    input_settings: InputSettings,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    /// Resolve every input to paths and concatenate the loaded definitions,
    /// input order first, document order within each input.
    fn load_all(&self) -> anyhow::Result<Vec<HierarchySchema>> {
        let source_paths = resolve_file_path_patterns(&self.input)?;
        let mut schemas = Vec::new();
        for source_path in source_paths {
            let loaded = load::load_document(&source_path)
                .with_context(|| format!("loading `{}`", source_path.display()))?;
            schemas.extend(loaded);
        }
        Ok(schemas)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Generate(target) => {
                let schemas = target.input_settings.load_all()?;
                let results = emit::emit_batch(&schemas);

                let mut failures = 0usize;
                for (schema, result) in schemas.iter().zip(&results) {
                    match result {
                        Ok(artifact) => {
                            // SchemaError is per-hierarchy; a write fault is fatal to the run
                            let path = write_artifact(&target.out_dir, artifact)?;
                            eprintln!("{} {}", "✓".green(), path.display());
                        }
                        Err(error) => {
                            failures += 1;
                            eprintln!("{} {}: {error}", "✗".red(), display_name(schema));
                        }
                    }
                }
                if failures > 0 {
                    bail!("{failures} of {} hierarchy definitions failed", results.len());
                }
                Ok(())
            }
            Command::Check(target) => {
                let schemas = target.input_settings.load_all()?;
                let mut failures = 0usize;
                for schema in &schemas {
                    match schema.validate() {
                        Ok(()) => eprintln!("{} {}", "✓".green(), display_name(schema)),
                        Err(error) => {
                            failures += 1;
                            eprintln!("{} {}: {error}", "✗".red(), display_name(schema));
                        }
                    }
                }
                if failures > 0 {
                    bail!(
                        "{failures} of {} hierarchy definitions failed validation",
                        schemas.len()
                    );
                }
                Ok(())
            }
        }
    }
}

fn display_name(schema: &HierarchySchema) -> &str {
    if schema.base_name.is_empty() { "<unnamed>" } else { &schema.base_name }
}

/// Write one artifact under `out_dir`. The full text already exists before
/// the destination file is created.
fn write_artifact(out_dir: &Path, artifact: &Artifact) -> Result<PathBuf, IoError> {
    std::fs::create_dir_all(out_dir).map_err(|source| IoError::Write {
        path: out_dir.to_path_buf(),
        source,
    })?;
    let path = out_dir.join(&artifact.file_name);
    std::fs::write(&path, &artifact.text).map_err(|source| IoError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            // Treat as a literal path
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

//! Function file loading
//!
//! Function files live at `<functions_dir>/<namespace>/<path>.<extension>`
//! and hold one command per logical line.
//!
//! ## Format
//!
//! ```text
//! # comment
//! say hello $name$
//! tellraw @a \
//!     {"text":"joined"}
//! ```
//!
//! - Lines are trimmed; blank lines and `#` comments are skipped
//! - A trailing `\` joins the next line onto this one
//! - A file with any `$name$` placeholder becomes a template procedure
//! - Otherwise every line is validated now and the file is stored expanded

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::identifier::{Identifier, IdentifierError};
use crate::macros::placeholder::Segment;
use crate::macros::{ExpansionContext, GrammarError, MacroError};
use crate::procedure::{Procedure, RawActionTemplate, TemplateProcedure};
use crate::registry::ProcedureRegistry;

const CONTINUATION: char = '\\';
const COMMENT: char = '#';

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path:?}: {error}")]
    Io {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    #[error("Invalid function path {path:?}: {error}")]
    InvalidIdentifier {
        path: PathBuf,
        #[source]
        error: IdentifierError,
    },

    #[error("{id} line {line}: {error}")]
    InvalidCommand {
        id: Identifier,
        line: usize,
        #[source]
        error: GrammarError,
    },

    #[error(transparent)]
    Macro(#[from] MacroError),
}

/// Outcome of loading a functions directory
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Procedures added to the registry
    pub loaded: usize,
    /// Files skipped, with the reason
    pub failures: Vec<(PathBuf, LoadError)>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Split function source into logical lines
pub fn logical_lines(source: &str) -> Vec<RawActionTemplate> {
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (index, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if pending.is_none() && (line.is_empty() || line.starts_with(COMMENT)) {
            continue;
        }

        let (start, mut text) = pending.take().unwrap_or_else(|| (index + 1, String::new()));
        match line.strip_suffix(CONTINUATION) {
            Some(head) => {
                text.push_str(head);
                pending = Some((start, text));
            }
            None => {
                text.push_str(line);
                lines.push(RawActionTemplate::at_line(text, start));
            }
        }
    }

    // Continuation on the last line
    if let Some((start, text)) = pending {
        let text = text.trim_end();
        if !text.is_empty() {
            lines.push(RawActionTemplate::at_line(text, start));
        }
    }

    lines
}

/// Build a procedure from function source
pub fn parse_function(
    id: Identifier,
    source: &str,
    ctx: &ExpansionContext<'_>,
) -> Result<Procedure, LoadError> {
    let templates = logical_lines(source);
    let lines: Vec<usize> = templates.iter().map(RawActionTemplate::line).collect();

    let procedure = Procedure::from_templates(id, templates, ctx).map_err(|e| at_line(e, &lines))?;
    if let Procedure::Template(template) = &procedure {
        check_literal_lines(template, ctx)?;
    }
    Ok(procedure)
}

fn at_line(error: MacroError, lines: &[usize]) -> LoadError {
    match error {
        MacroError::InvalidExpansion {
            procedure,
            action_index,
            error,
        } => LoadError::InvalidCommand {
            id: procedure,
            line: lines.get(action_index).copied().unwrap_or_default(),
            error,
        },
        other => LoadError::Macro(other),
    }
}

/// Validate the placeholder-free lines of a template up front
fn check_literal_lines(template: &TemplateProcedure, ctx: &ExpansionContext<'_>) -> Result<(), LoadError> {
    for raw in template.templates() {
        let mut text = String::new();
        let mut literal = true;
        for segment in raw.tokenize() {
            match segment {
                Ok(Segment::Literal(part)) => text.push_str(part),
                Ok(Segment::Placeholder(_)) | Err(_) => {
                    literal = false;
                    break;
                }
            }
        }
        if !literal {
            continue;
        }

        ctx.validator
            .validate(&text, &ctx.source)
            .map_err(|error| LoadError::InvalidCommand {
                id: template.id().clone(),
                line: raw.line(),
                error,
            })?;
    }
    Ok(())
}

/// Load one function file under its identifier
pub fn load_function_file(
    id: Identifier,
    path: &Path,
    ctx: &ExpansionContext<'_>,
) -> Result<Procedure, LoadError> {
    let source = std::fs::read_to_string(path).map_err(|error| LoadError::Io {
        path: path.to_path_buf(),
        error,
    })?;
    parse_function(id, &source, ctx)
}

/// Load every function file under `dir`
///
/// Each top-level directory is a namespace. Files that fail to load are
/// logged and reported, not fatal. A missing `dir` yields an empty registry.
pub fn load_registry_from_dir(
    dir: &Path,
    extension: &str,
    ctx: &ExpansionContext<'_>,
) -> Result<(ProcedureRegistry, LoadReport), LoadError> {
    let mut registry = ProcedureRegistry::new();
    let mut report = LoadReport::default();

    if !dir.exists() {
        warn!("Functions directory not found: {:?}", dir);
        return Ok((registry, report));
    }

    let mut namespaces = sorted_entries(dir)?;
    namespaces.retain(|path| path.is_dir());

    let mut files = Vec::new();
    for namespace_dir in &namespaces {
        collect_files(namespace_dir, extension, &mut files)?;
    }

    info!("Loading {} function files from {:?}", files.len(), dir);

    for path in files {
        let id = match identifier_for(dir, &path) {
            Ok(id) => id,
            Err(e) => {
                warn!("Skipping function file {:?}: {}", path, e);
                report.failures.push((path, e));
                continue;
            }
        };

        match load_function_file(id, &path, ctx) {
            Ok(procedure) => {
                debug!(
                    "Loaded {} ({} actions, template: {}) from {:?}",
                    procedure.id(),
                    procedure.len(),
                    procedure.is_template(),
                    path.file_name()
                );
                registry.add(procedure);
                registry.add_source_file(path);
                report.loaded += 1;
            }
            Err(e) => {
                warn!("Failed to load function file {:?}: {}", path, e);
                report.failures.push((path, e));
            }
        }
    }

    info!(
        "Procedure registry loaded: {} procedures, {} failures",
        registry.len(),
        report.failures.len()
    );

    Ok((registry, report))
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let io_error = |error| LoadError::Io {
        path: dir.to_path_buf(),
        error,
    };
    let mut entries = std::fs::read_dir(dir)
        .map_err(io_error)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_error)?;
    entries.sort();
    Ok(entries)
}

fn collect_files(dir: &Path, extension: &str, files: &mut Vec<PathBuf>) -> Result<(), LoadError> {
    for path in sorted_entries(dir)? {
        if path.is_dir() {
            collect_files(&path, extension, files)?;
        } else if path.extension().is_some_and(|ext| ext == extension) {
            files.push(path);
        }
    }
    Ok(())
}

/// `<root>/<namespace>/<a>/<b>.<ext>` becomes `namespace:a/b`
fn identifier_for(root: &Path, path: &Path) -> Result<Identifier, LoadError> {
    let invalid_path = |error| LoadError::InvalidIdentifier {
        path: path.to_path_buf(),
        error,
    };

    let relative = path.strip_prefix(root).unwrap_or(path).with_extension("");
    let mut parts = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned());
    let namespace = parts.next().unwrap_or_default();
    let function_path = parts.collect::<Vec<_>>().join("/");

    Identifier::new(namespace, function_path).map_err(invalid_path)
}

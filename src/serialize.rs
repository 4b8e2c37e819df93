//! Document rendering and atomic output.

use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

use crate::enums::OutputFormat;
use crate::error::{ConvertError, Result};

/// Render a document as JSON with 4-space indentation.
///
/// Keys appear in declaration order. Output is UTF-8 with no byte-order mark
/// and ends with a newline.
pub fn to_json<T: Serialize>(doc: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    doc.serialize(&mut ser).map_err(|e| ConvertError::Serialize {
        what: "document".to_string(),
        message: format!("failed to render JSON: {}", e),
    })?;
    buf.push(b'\n');
    String::from_utf8(buf).map_err(|e| ConvertError::Serialize {
        what: "document".to_string(),
        message: e.to_string(),
    })
}

/// Render a document as YAML.
pub fn to_yaml<T: Serialize>(doc: &T) -> Result<String> {
    // Convert to serde_json::Value first for consistent field ordering
    let value = serde_json::to_value(doc).map_err(|e| ConvertError::Serialize {
        what: "document".to_string(),
        message: format!("failed to convert document to JSON value: {}", e),
    })?;
    serde_saphyr::to_string(&value).map_err(|e| ConvertError::Serialize {
        what: "document".to_string(),
        message: format!("failed to render YAML: {}", e),
    })
}

pub fn render<T: Serialize>(doc: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(doc),
        OutputFormat::Yaml => to_yaml(doc),
    }
}

/// Render and write one document. The file appears fully written or not at all.
pub fn write<T: Serialize>(doc: &T, path: &Path, format: OutputFormat) -> Result<()> {
    let content = render(doc, format)?;
    write_all(&[(path.to_path_buf(), content)])
}

/// Write several rendered documents.
///
/// Every file is staged to a temporary file beside its destination and synced
/// before any destination is replaced, so an I/O failure while writing leaves
/// the previous outputs in place.
pub fn write_all(outputs: &[(PathBuf, String)]) -> Result<()> {
    let mut staged = Vec::with_capacity(outputs.len());
    for (path, content) in outputs {
        staged.push((path, stage(path, content)?));
    }
    for (path, temp) in staged {
        temp.persist(path)
            .map_err(|e| ConvertError::io(path.as_path(), e.error))?;
        info!(path = %path.display(), "wrote document");
    }
    Ok(())
}

fn stage(path: &Path, content: &str) -> Result<NamedTempFile> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(parent).map_err(|e| ConvertError::io(parent, e))?;
    temp.write_all(content.as_bytes())
        .map_err(|e| ConvertError::io(temp.path(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| ConvertError::io(temp.path(), e))?;
    Ok(temp)
}

// Vellum - CAD document interchange library
//
// Copyright (c) 2026 Vellum contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Vellum - CAD document interchange
//!
//! Vellum parses the tag-structured DXF text/binary format into an
//! in-memory entity graph, validates and repairs that graph, and
//! re-serializes it losslessly.
//!
//! ## Quick Start
//!
//! ```rust
//! use vellum::{Document, DxfVersion, Entity, Point, TagValue};
//!
//! // Build a document and a line in model space.
//! let mut doc = Document::new(DxfVersion::R2000);
//! let mut line = Entity::new("LINE").unwrap();
//! line.set("end", TagValue::Point(Point::xyz(10.0, 0.0, 0.0))).unwrap();
//! let handle = doc.add_entity(line).unwrap();
//!
//! // Save and reload.
//! let text = vellum::write_string(&doc).unwrap();
//! let reloaded = vellum::parse(&text).unwrap();
//! let line = reloaded.entity(handle).unwrap();
//! assert_eq!(line.point("end").unwrap().x, 10.0);
//! ```
//!
//! ## Loading damaged files
//!
//! Strict loading never returns a half-built document. For input from
//! unreliable producers, [`recover`] skips localized damage, repairs
//! the graph and reports everything it did:
//!
//! ```rust
//! let damaged = "0\nSECTION\n2\nENTITIES\n0\nLINE\n8\nGhost\n0\nENDSEC\n0\nEOF\n";
//! let (doc, report) = vellum::recover(damaged).unwrap();
//! assert!(!report.audit.has_fatal_errors());
//! // The undefined layer "Ghost" was created with default properties.
//! assert!(doc.tables().layers().contains("Ghost"));
//! ```
//!
//! ## Modules
//!
//! - [`mod@audit`]: validation and repair
//! - [`mod@write`]: serialization
//! - [`mod@stream`]: one-entity-at-a-time reading for huge inputs

// Re-export core types
pub use vellum_core::{
    load_bytes,
    load_str,
    schema_for,
    AttrSpec,
    DefaultValue,
    Document,
    // Errors
    DxfError,
    DxfErrorKind,
    DxfResult,
    DxfVersion,
    Entity,
    EntityClass,
    EntityDatabase,
    EntityQuery,
    EntitySchema,
    Handle,
    HeaderSection,
    // Loader
    Limits,
    LoadOptions,
    LoadWarning,
    Point,
    ReadMode,
    Table,
    TableRole,
    Tables,
    Tag,
    TagValue,
};

// Error handling extensions
mod error_ext;
pub use error_ext::DxfResultExt;

// Re-export the tag layer
pub mod tag {
    //! Low-level tag stream utilities
    pub use vellum_core::tag::{
        is_binary, value_kind, BinaryTagLoader, Tag, TagCompiler, TagValue, TextTagLoader,
        ValueKind, BINARY_SENTINEL,
    };
}

// Re-export auditing
pub mod audit {
    //! Validation and repair utilities
    pub use vellum_audit::{
        audit, audit_with_config, AuditConfig, AuditEntry, AuditKind, AuditReport, AuditRule,
        Auditor, Severity,
    };
}

// Re-export serialization
pub mod write {
    //! Serialization utilities
    pub use vellum_write::{write_document, TagWriter, WriteConfig, WriteConfigBuilder};
}

// Re-export streaming
pub mod stream {
    //! Streaming reader for very large inputs
    pub use vellum_stream::{EntityStream, StreamEvent, StreamTagReader};
}

use std::path::Path;
use vellum_audit::AuditReport;
use vellum_write::WriteConfig;

/// What a recovery load did to the document.
#[derive(Debug, Clone, Default)]
pub struct RecoverReport {
    /// Tokenization and structure damage skipped during reading.
    pub warnings: Vec<LoadWarning>,
    /// Findings and repairs of the post-load audit.
    pub audit: AuditReport,
}

/// Parse a document strictly. Any structural damage aborts the load;
/// a failed parse never returns a half-built document.
pub fn parse(text: &str) -> DxfResult<Document> {
    let (doc, _) = vellum_core::load_str(text, &LoadOptions::default())?;
    Ok(doc)
}

/// Parse with explicit options, returning collected warnings.
pub fn parse_with_options(
    text: &str,
    options: &LoadOptions,
) -> DxfResult<(Document, Vec<LoadWarning>)> {
    vellum_core::load_str(text, options)
}

/// Load a damaged document: localized damage is skipped and collected,
/// then the auditor repairs the graph. Only unrecoverable structure
/// failures raise.
pub fn recover(text: &str) -> DxfResult<(Document, RecoverReport)> {
    let (mut doc, warnings) = vellum_core::load_str(text, &LoadOptions::recover())?;
    let audit = vellum_audit::audit(&mut doc);
    Ok((doc, RecoverReport { warnings, audit }))
}

/// Recovery load from raw bytes (text or binary, sniffed).
pub fn recover_bytes(data: &[u8]) -> DxfResult<(Document, RecoverReport)> {
    let (mut doc, warnings) = vellum_core::load_bytes(data, &LoadOptions::recover())?;
    let audit = vellum_audit::audit(&mut doc);
    Ok((doc, RecoverReport { warnings, audit }))
}

/// Serialize a document to text with default configuration.
pub fn write_string(doc: &Document) -> DxfResult<String> {
    vellum_write::write_document(doc, &WriteConfig::default())
}

/// Serialize with explicit configuration.
pub fn write_string_with_config(doc: &Document, config: &WriteConfig) -> DxfResult<String> {
    vellum_write::write_document(doc, config)
}

/// Read and strictly parse a file (text or binary, sniffed).
pub fn read_file(path: impl AsRef<Path>) -> DxfResult<Document> {
    let path = path.as_ref();
    let data = std::fs::read(path)
        .map_err(|err| DxfError::io(format!("failed to read {}: {}", path.display(), err)))?;
    let (doc, _) = vellum_core::load_bytes(&data, &LoadOptions::default())?;
    Ok(doc)
}

/// Write a document to a file with default configuration.
pub fn write_file(doc: &Document, path: impl AsRef<Path>) -> DxfResult<()> {
    let path = path.as_ref();
    let text = write_string(doc)?;
    std::fs::write(path, text)
        .map_err(|err| DxfError::io(format!("failed to write {}: {}", path.display(), err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_damage() {
        let err = parse("0\nSECTION\nboom").unwrap_err();
        assert_eq!(err.kind, DxfErrorKind::Structure);
    }

    #[test]
    fn test_parse_minimal() {
        let doc = parse("0\nSECTION\n2\nENTITIES\n0\nENDSEC\n0\nEOF\n").unwrap();
        assert_eq!(doc.version(), DxfVersion::R12);
    }

    #[test]
    fn test_recover_returns_document_and_report() {
        let damaged = "garbage\n0\nSECTION\n2\nENTITIES\n0\nLINE\n8\n0\n0\nENDSEC\n0\nEOF\n";
        let (doc, report) = recover(damaged).unwrap();
        assert_eq!(doc.entities_in(doc.modelspace()).len(), 1);
        assert!(!report.warnings.is_empty());
    }

    #[test]
    fn test_write_string_round_trips() {
        let doc = Document::new(DxfVersion::R2000);
        let text = write_string(&doc).unwrap();
        let reloaded = parse(&text).unwrap();
        assert_eq!(reloaded.version(), DxfVersion::R2000);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = std::env::temp_dir().join("vellum-facade-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("out.dxf");
        let doc = Document::new(DxfVersion::R2000);
        write_file(&doc, &path).unwrap();
        let reloaded = read_file(&path).unwrap();
        assert_eq!(reloaded.version(), DxfVersion::R2000);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_read_file_missing() {
        let err = read_file("/definitely/not/here.dxf").unwrap_err();
        assert_eq!(err.kind, DxfErrorKind::Io);
    }
}

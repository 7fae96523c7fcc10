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

//! Error types for DXF loading and saving.

use std::fmt;
use thiserror::Error;

/// The kind of error that occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DxfErrorKind {
    /// The byte stream cannot be tokenized into tags at all.
    Structure,
    /// Unsupported or incompatible DXF version.
    Version,
    /// Tag not declared for its entity type (recorded, rarely raised).
    Schema,
    /// Handle-valued attribute does not resolve.
    Reference,
    /// Handle collision or unresolvable ownership.
    Invariant,
    /// Security limit exceeded.
    Limit,
    /// I/O error (file operations).
    Io,
}

impl fmt::Display for DxfErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structure => write!(f, "StructureError"),
            Self::Version => write!(f, "VersionError"),
            Self::Schema => write!(f, "SchemaError"),
            Self::Reference => write!(f, "ReferenceError"),
            Self::Invariant => write!(f, "InvariantError"),
            Self::Limit => write!(f, "LimitError"),
            Self::Io => write!(f, "IOError"),
        }
    }
}

/// An error raised while loading or saving a DXF document.
#[derive(Debug, Clone, Error)]
#[error("{kind} at line {line}: {message}")]
pub struct DxfError {
    /// The kind of error.
    pub kind: DxfErrorKind,
    /// Human-readable error message.
    pub message: String,
    /// Line number in the tag stream (1-based, 0 when unknown).
    pub line: usize,
    /// Additional context (e.g. "in ENTITIES section").
    pub context: Option<String>,
}

impl DxfError {
    /// Create a new error.
    pub fn new(kind: DxfErrorKind, message: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            message: message.into(),
            line,
            context: None,
        }
    }

    /// Add context information.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    // Convenience constructors for each error kind
    pub fn structure(message: impl Into<String>, line: usize) -> Self {
        Self::new(DxfErrorKind::Structure, message, line)
    }

    pub fn version(message: impl Into<String>, line: usize) -> Self {
        Self::new(DxfErrorKind::Version, message, line)
    }

    pub fn schema(message: impl Into<String>, line: usize) -> Self {
        Self::new(DxfErrorKind::Schema, message, line)
    }

    pub fn reference(message: impl Into<String>, line: usize) -> Self {
        Self::new(DxfErrorKind::Reference, message, line)
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Self::new(DxfErrorKind::Invariant, message, 0)
    }

    pub fn limit(message: impl Into<String>, line: usize) -> Self {
        Self::new(DxfErrorKind::Limit, message, line)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(DxfErrorKind::Io, message, 0)
    }
}

/// Result type for DXF operations.
pub type DxfResult<T> = Result<T, DxfError>;

/// A non-fatal finding collected while loading in recovery mode.
///
/// Recovery mode downgrades localized structure errors to warnings and
/// keeps going; the caller receives the full ordered list together with
/// the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    /// Line number in the tag stream (1-based, 0 when unknown).
    pub line: usize,
    /// Human-readable description of what was skipped or substituted.
    pub message: String,
}

impl LoadWarning {
    /// Create a new warning.
    pub fn new(message: impl Into<String>, line: usize) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== DxfErrorKind Display tests ====================

    #[test]
    fn test_error_kind_display_structure() {
        assert_eq!(format!("{}", DxfErrorKind::Structure), "StructureError");
    }

    #[test]
    fn test_error_kind_display_version() {
        assert_eq!(format!("{}", DxfErrorKind::Version), "VersionError");
    }

    #[test]
    fn test_error_kind_display_schema() {
        assert_eq!(format!("{}", DxfErrorKind::Schema), "SchemaError");
    }

    #[test]
    fn test_error_kind_display_reference() {
        assert_eq!(format!("{}", DxfErrorKind::Reference), "ReferenceError");
    }

    #[test]
    fn test_error_kind_display_invariant() {
        assert_eq!(format!("{}", DxfErrorKind::Invariant), "InvariantError");
    }

    #[test]
    fn test_error_kind_display_limit() {
        assert_eq!(format!("{}", DxfErrorKind::Limit), "LimitError");
    }

    #[test]
    fn test_error_kind_equality() {
        assert_eq!(DxfErrorKind::Structure, DxfErrorKind::Structure);
        assert_ne!(DxfErrorKind::Structure, DxfErrorKind::Schema);
    }

    // ==================== DxfError tests ====================

    #[test]
    fn test_error_display() {
        let err = DxfError::new(DxfErrorKind::Structure, "bad group code", 42);
        let msg = format!("{}", err);
        assert!(msg.contains("StructureError"));
        assert!(msg.contains("line 42"));
        assert!(msg.contains("bad group code"));
    }

    #[test]
    fn test_error_with_context() {
        let err = DxfError::structure("error", 5).with_context("in ENTITIES section");
        assert_eq!(err.context, Some("in ENTITIES section".to_string()));
    }

    #[test]
    fn test_error_structure() {
        let err = DxfError::structure("test", 1);
        assert_eq!(err.kind, DxfErrorKind::Structure);
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_error_version() {
        let err = DxfError::version("test", 2);
        assert_eq!(err.kind, DxfErrorKind::Version);
    }

    #[test]
    fn test_error_schema() {
        let err = DxfError::schema("test", 3);
        assert_eq!(err.kind, DxfErrorKind::Schema);
    }

    #[test]
    fn test_error_reference() {
        let err = DxfError::reference("test", 4);
        assert_eq!(err.kind, DxfErrorKind::Reference);
    }

    #[test]
    fn test_error_invariant() {
        let err = DxfError::invariant("handle collision");
        assert_eq!(err.kind, DxfErrorKind::Invariant);
        assert_eq!(err.line, 0);
    }

    #[test]
    fn test_error_limit() {
        let err = DxfError::limit("too many tags", 9);
        assert_eq!(err.kind, DxfErrorKind::Limit);
    }

    #[test]
    fn test_error_io() {
        let err = DxfError::io("failed to read file");
        assert_eq!(err.kind, DxfErrorKind::Io);
        assert_eq!(err.line, 0);
    }

    #[test]
    fn test_error_is_std_error() {
        fn accepts_error<E: std::error::Error>(_: E) {}
        accepts_error(DxfError::structure("test", 1));
    }

    #[test]
    fn test_error_clone() {
        let original = DxfError::structure("message", 5).with_context("ctx");
        let cloned = original.clone();
        assert_eq!(original.kind, cloned.kind);
        assert_eq!(original.message, cloned.message);
        assert_eq!(original.line, cloned.line);
        assert_eq!(original.context, cloned.context);
    }

    // ==================== LoadWarning tests ====================

    #[test]
    fn test_warning_display() {
        let warning = LoadWarning::new("skipped malformed tag", 17);
        let display = format!("{}", warning);
        assert!(display.contains("line 17"));
        assert!(display.contains("skipped malformed tag"));
    }

    #[test]
    fn test_warning_equality() {
        let a = LoadWarning::new("msg", 1);
        let b = LoadWarning::new("msg", 1);
        assert_eq!(a, b);
    }

    #[test]
    fn test_warning_line_zero() {
        let warning = LoadWarning::new("no position", 0);
        assert_eq!(warning.line, 0);
    }
}

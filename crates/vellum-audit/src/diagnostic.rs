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

//! Audit findings and the report they accumulate in.

use vellum_core::Handle;

/// Severity of an audit finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Recorded only; the value passed through unchanged.
    Warning,
    /// Repaired with a documented default substitution; non-fatal.
    Repaired,
    /// Cannot be repaired; the entity is excluded from the usable
    /// graph.
    Fatal,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Repaired => write!(f, "repaired"),
            Self::Fatal => write!(f, "fatal"),
        }
    }
}

/// What kind of violation a finding reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditKind {
    /// A space list references a handle with no live entity.
    DanglingReference,
    /// Owner handle does not resolve to a block record.
    InvalidOwner,
    /// Lineweight outside the discrete valid set.
    InvalidLineweight,
    /// Color index outside the documented range.
    InvalidColor,
    /// Referenced layer has no table entry.
    UndefinedLayer,
    /// Referenced linetype has no table entry.
    UndefinedLinetype,
    /// Referenced text style has no table entry.
    UndefinedTextStyle,
    /// Block reference names a block that does not exist.
    UndefinedBlock,
    /// Block reference graph contains a cycle.
    BlockCycle,
    /// Degenerate geometry tolerated by the format.
    DegenerateGeometry,
    /// Attribute requires a newer format revision than declared.
    VersionMismatch,
    /// Custom rule finding.
    Custom(String),
}

/// One audit finding.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    severity: Severity,
    kind: AuditKind,
    handle: Option<Handle>,
    message: String,
    rule_id: String,
}

impl AuditEntry {
    pub fn warning(kind: AuditKind, message: impl Into<String>, rule_id: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            handle: None,
            message: message.into(),
            rule_id: rule_id.into(),
        }
    }

    pub fn repaired(
        kind: AuditKind,
        message: impl Into<String>,
        rule_id: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Repaired,
            kind,
            handle: None,
            message: message.into(),
            rule_id: rule_id.into(),
        }
    }

    pub fn fatal(kind: AuditKind, message: impl Into<String>, rule_id: impl Into<String>) -> Self {
        Self {
            severity: Severity::Fatal,
            kind,
            handle: None,
            message: message.into(),
            rule_id: rule_id.into(),
        }
    }

    /// Attach the offending entity's handle.
    pub fn with_handle(mut self, handle: Handle) -> Self {
        self.handle = Some(handle);
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn kind(&self) -> &AuditKind {
        &self.kind
    }

    pub fn handle(&self) -> Option<Handle> {
        self.handle
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn rule_id(&self) -> &str {
        &self.rule_id
    }
}

impl std::fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(handle) = self.handle {
            write!(f, "#{}: ", handle)?;
        }
        write!(f, "[{}] {}: {}", self.rule_id, self.severity, self.message)
    }
}

/// Ordered log of audit findings.
#[derive(Debug, Clone, Default)]
pub struct AuditReport {
    entries: Vec<AuditEntry>,
}

impl AuditReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: AuditEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Findings in detection order.
    pub fn iter(&self) -> impl Iterator<Item = &AuditEntry> {
        self.entries.iter()
    }

    /// True if any finding is fatal.
    pub fn has_fatal_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.severity() == Severity::Fatal)
    }

    /// Only the fatal findings.
    pub fn fatal(&self) -> impl Iterator<Item = &AuditEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.severity() == Severity::Fatal)
    }

    /// Only the repaired findings.
    pub fn repaired(&self) -> impl Iterator<Item = &AuditEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.severity() == Severity::Repaired)
    }
}

impl std::fmt::Display for AuditReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{}", entry)?;
        }
        Ok(())
    }
}

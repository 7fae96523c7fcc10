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

//! Post-load validation and repair for DXF documents.
//!
//! The auditor walks a loaded document, detects dangling references,
//! invalid enumerations and structural violations, and either repairs
//! them with a documented default substitution or records a fatal
//! finding. Findings are always collected into an [`AuditReport`] and
//! returned to the caller, never silently dropped; the caller decides
//! whether [`AuditReport::has_fatal_errors`] blocks further processing.
//!
//! # Quick Start
//!
//! ```rust
//! use vellum_core::{Document, DxfVersion};
//! use vellum_audit::{audit, Severity};
//!
//! let mut doc = Document::new(DxfVersion::R2000);
//! let report = audit(&mut doc);
//!
//! for entry in report.iter() {
//!     if entry.severity() == Severity::Fatal {
//!         eprintln!("{}", entry);
//!     }
//! }
//! ```
//!
//! # Custom Configuration
//!
//! ```rust
//! use vellum_audit::{audit_with_config, AuditConfig};
//! use vellum_core::{Document, DxfVersion};
//!
//! let mut doc = Document::new(DxfVersion::R2000);
//! let mut config = AuditConfig::new();
//! config.disable_rule("geometry");
//! let report = audit_with_config(&mut doc, config);
//! ```

mod diagnostic;
mod rules;
mod runner;

pub use diagnostic::{AuditEntry, AuditKind, AuditReport, Severity};
pub use rules::{default_rules, AuditRule};
pub use runner::{AuditConfig, Auditor};

use vellum_core::Document;

/// Run the built-in rule set on a document.
pub fn audit(doc: &mut Document) -> AuditReport {
    Auditor::default().run(doc)
}

/// Run with custom configuration.
pub fn audit_with_config(doc: &mut Document, config: AuditConfig) -> AuditReport {
    Auditor::new(config).run(doc)
}

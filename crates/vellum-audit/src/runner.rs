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

//! The auditor: runs the rule set in dependency order and accumulates
//! the report.

use crate::diagnostic::AuditReport;
use crate::rules::{default_rules, AuditRule};
use vellum_core::Document;

/// Auditor configuration.
#[derive(Debug, Clone, Default)]
pub struct AuditConfig {
    disabled_rules: Vec<String>,
}

impl AuditConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable a rule by its id.
    pub fn disable_rule(&mut self, rule_id: impl Into<String>) {
        self.disabled_rules.push(rule_id.into());
    }

    pub fn is_disabled(&self, rule_id: &str) -> bool {
        self.disabled_rules.iter().any(|id| id == rule_id)
    }
}

/// Runs audit rules against a document.
pub struct Auditor {
    config: AuditConfig,
    rules: Vec<Box<dyn AuditRule>>,
}

impl Auditor {
    /// An auditor with the built-in rule set.
    pub fn new(config: AuditConfig) -> Self {
        Self {
            config,
            rules: default_rules(),
        }
    }

    /// Append a custom rule; it runs after the built-in ones.
    pub fn add_rule(&mut self, rule: Box<dyn AuditRule>) {
        self.rules.push(rule);
    }

    /// Walk the document, repairing where possible, and return the
    /// ordered report. Rules run in dependency order: cheap structural
    /// checks before semantic checks.
    pub fn run(&self, doc: &mut Document) -> AuditReport {
        let mut report = AuditReport::new();
        for rule in &self.rules {
            if self.config.is_disabled(rule.id()) {
                continue;
            }
            for entry in rule.run(doc) {
                report.push(entry);
            }
        }
        report
    }
}

impl Default for Auditor {
    fn default() -> Self {
        Self::new(AuditConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::{AuditEntry, AuditKind};
    use vellum_core::{DxfVersion, Entity, TagValue};

    fn doc() -> Document {
        Document::new(DxfVersion::R2000)
    }

    // ==================== Run tests ====================

    #[test]
    fn test_clean_document_empty_report() {
        let mut doc = doc();
        let report = Auditor::default().run(&mut doc);
        assert!(report.is_empty());
        assert!(!report.has_fatal_errors());
    }

    #[test]
    fn test_rules_run_in_order() {
        let mut doc = doc();
        // One invalid lineweight (rule 3) and one missing layer (rule 4).
        let mut entity = Entity::new("LINE").unwrap();
        entity.set("layer", TagValue::Text("GHOST".into())).unwrap();
        entity.set("lineweight", TagValue::Integer(42)).unwrap();
        entity
            .set(
                "end",
                TagValue::Point(vellum_core::Point::xyz(1.0, 0.0, 0.0)),
            )
            .unwrap();
        doc.add_entity(entity).unwrap();
        let report = Auditor::default().run(&mut doc);
        let kinds: Vec<_> = report.iter().map(|entry| entry.kind().clone()).collect();
        assert_eq!(
            kinds,
            vec![AuditKind::InvalidLineweight, AuditKind::UndefinedLayer]
        );
    }

    #[test]
    fn test_disabled_rule_skipped() {
        let mut doc = doc();
        let mut entity = Entity::new("LINE").unwrap();
        entity.set("lineweight", TagValue::Integer(42)).unwrap();
        let handle = doc.add_entity(entity).unwrap();

        let mut config = AuditConfig::new();
        config.disable_rule("value-domains");
        config.disable_rule("geometry");
        let report = Auditor::new(config).run(&mut doc);
        assert!(report.is_empty());
        // The invalid value survives untouched.
        assert_eq!(doc.entity(handle).unwrap().integer("lineweight"), Some(42));
    }

    #[test]
    fn test_custom_rule_runs_last() {
        struct AlwaysWarn;
        impl AuditRule for AlwaysWarn {
            fn id(&self) -> &str {
                "always-warn"
            }
            fn description(&self) -> &str {
                "test rule"
            }
            fn run(&self, _doc: &mut Document) -> Vec<AuditEntry> {
                vec![AuditEntry::warning(
                    AuditKind::Custom("test".into()),
                    "custom finding",
                    "always-warn",
                )]
            }
        }
        let mut doc = doc();
        let mut auditor = Auditor::default();
        auditor.add_rule(Box::new(AlwaysWarn));
        let report = auditor.run(&mut doc);
        assert_eq!(report.len(), 1);
        assert_eq!(report.iter().next().unwrap().rule_id(), "always-warn");
    }

    #[test]
    fn test_repairs_converge() {
        // A second run after repairs finds nothing new.
        let mut doc = doc();
        let mut entity = Entity::new("LINE").unwrap();
        entity.set("layer", TagValue::Text("GHOST".into())).unwrap();
        entity
            .set(
                "end",
                TagValue::Point(vellum_core::Point::xyz(1.0, 0.0, 0.0)),
            )
            .unwrap();
        doc.add_entity(entity).unwrap();
        let first = Auditor::default().run(&mut doc);
        assert!(!first.is_empty());
        let second = Auditor::default().run(&mut doc);
        assert!(second.is_empty());
    }
}

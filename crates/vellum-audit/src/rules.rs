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

//! The built-in audit rules, in dependency order: cheap structural
//! checks before semantic checks.

use crate::diagnostic::{AuditEntry, AuditKind};
use std::collections::{HashMap, HashSet};
use vellum_core::schema::{COLOR_NONE, LINEWEIGHT_DEFAULT, VALID_LINEWEIGHTS};
use vellum_core::{Document, Handle, TagValue};

/// One audit check. Rules may repair the document while they run.
pub trait AuditRule {
    /// Stable identifier, usable to disable the rule.
    fn id(&self) -> &str;
    /// One-line description.
    fn description(&self) -> &str;
    /// Check (and possibly repair) the document.
    fn run(&self, doc: &mut Document) -> Vec<AuditEntry>;
}

/// The built-in rule set in execution order.
pub fn default_rules() -> Vec<Box<dyn AuditRule>> {
    vec![
        Box::new(DanglingReferences),
        Box::new(OwnerResolution),
        Box::new(ValueDomains),
        Box::new(NamedReferences),
        Box::new(DegenerateGeometry),
        Box::new(BlockCycles),
        Box::new(VersionFlags),
    ]
}

// ==================== Rule 1: dangling space references ====================

/// Space lists must reference live entities. A dangling entry means an
/// entity was removed from the database without being detached first,
/// which is a caller contract violation; it cannot be repaired without
/// guessing, so the reference is dropped and reported as fatal.
pub struct DanglingReferences;

impl AuditRule for DanglingReferences {
    fn id(&self) -> &str {
        "dangling-refs"
    }

    fn description(&self) -> &str {
        "space lists reference live entities"
    }

    fn run(&self, doc: &mut Document) -> Vec<AuditEntry> {
        let mut entries = Vec::new();
        let dangling: Vec<Handle> = doc
            .iter_spaces()
            .flat_map(|(_, handles)| handles.to_vec())
            .filter(|handle| doc.entity(*handle).is_none())
            .collect();
        for handle in dangling {
            doc.detach_entity(handle);
            entries.push(
                AuditEntry::fatal(
                    AuditKind::DanglingReference,
                    format!("entity {} is linked but not in the database", handle),
                    self.id(),
                )
                .with_handle(handle),
            );
        }
        entries
    }
}

// ==================== Rule 2: owner resolution ====================

/// Every linked graphical entity's owner must resolve to the block
/// record that actually holds it. A dangling owner is repaired by
/// reassigning to the well-known fallback container, the model space.
pub struct OwnerResolution;

impl AuditRule for OwnerResolution {
    fn id(&self) -> &str {
        "owner-check"
    }

    fn description(&self) -> &str {
        "owner handles resolve to an owning block record"
    }

    fn run(&self, doc: &mut Document) -> Vec<AuditEntry> {
        let mut entries = Vec::new();
        let memberships: Vec<(Handle, Vec<Handle>)> = doc
            .iter_spaces()
            .map(|(record, handles)| (record, handles.to_vec()))
            .collect();
        let valid_spaces: HashSet<Handle> =
            memberships.iter().map(|(record, _)| *record).collect();
        let modelspace = doc.modelspace();

        for (record, handles) in memberships {
            for handle in handles {
                let Some(entity) = doc.entity(handle) else {
                    continue;
                };
                match entity.owner() {
                    Some(owner) if owner == record => {}
                    Some(owner) if valid_spaces.contains(&owner) => {
                        // The owner is a real space but membership says
                        // otherwise; the owner tag wins.
                        let _ = doc.move_to_space(handle, owner);
                        entries.push(
                            AuditEntry::repaired(
                                AuditKind::InvalidOwner,
                                format!("entity {} relinked into its declared owner", handle),
                                self.id(),
                            )
                            .with_handle(handle),
                        );
                    }
                    Some(owner) => {
                        let _ = doc.move_to_space(handle, modelspace);
                        entries.push(
                            AuditEntry::repaired(
                                AuditKind::InvalidOwner,
                                format!(
                                    "entity {} owner {} does not resolve, reassigned to model space",
                                    handle, owner
                                ),
                                self.id(),
                            )
                            .with_handle(handle),
                        );
                    }
                    None => {
                        if let Some(entity) = doc.database_mut().get_mut(handle) {
                            entity.set_owner(Some(record));
                        }
                        entries.push(
                            AuditEntry::repaired(
                                AuditKind::InvalidOwner,
                                format!("entity {} had no owner, assigned its space", handle),
                                self.id(),
                            )
                            .with_handle(handle),
                        );
                    }
                }
            }
        }
        entries
    }
}

// ==================== Rule 3: enumerated value domains ====================

/// Lineweights must come from the fixed discrete set; invalid values
/// are repaired to the documented default, never to the nearest number.
/// Out-of-range color indices are passed through with a warning, since
/// silent correction would mask producer bugs.
pub struct ValueDomains;

impl AuditRule for ValueDomains {
    fn id(&self) -> &str {
        "value-domains"
    }

    fn description(&self) -> &str {
        "enumerated attributes stay within their declared sets"
    }

    fn run(&self, doc: &mut Document) -> Vec<AuditEntry> {
        let mut entries = Vec::new();
        let handles: Vec<Handle> = doc.database().handles().collect();
        for handle in handles {
            let Some(entity) = doc.entity(handle) else {
                continue;
            };
            let lineweight = entity
                .get_present("lineweight")
                .and_then(|value| value.as_i64());
            let color = entity.get_present("color").and_then(|value| value.as_i64());

            if let Some(weight) = lineweight {
                if !VALID_LINEWEIGHTS.contains(&weight) {
                    if let Some(entity) = doc.database_mut().get_mut(handle) {
                        let _ = entity.set("lineweight", TagValue::Integer(LINEWEIGHT_DEFAULT));
                    }
                    entries.push(
                        AuditEntry::repaired(
                            AuditKind::InvalidLineweight,
                            format!(
                                "lineweight {} is not a valid value, reset to default",
                                weight
                            ),
                            self.id(),
                        )
                        .with_handle(handle),
                    );
                }
            }
            if let Some(color) = color {
                if !(0..=COLOR_NONE).contains(&color) {
                    entries.push(
                        AuditEntry::warning(
                            AuditKind::InvalidColor,
                            format!("color index {} is outside the documented range", color),
                            self.id(),
                        )
                        .with_handle(handle),
                    );
                }
            }
        }
        entries
    }
}

// ==================== Rule 4: named references ====================

/// Layer, linetype and text style names must resolve to a table entry.
/// The format permits entities to reference resources that were never
/// defined, so a missing entry is auto-created with documented default
/// properties. A block reference naming a missing block cannot be
/// repaired and is fatal.
pub struct NamedReferences;

impl AuditRule for NamedReferences {
    fn id(&self) -> &str {
        "named-refs"
    }

    fn description(&self) -> &str {
        "named resource references resolve to table entries"
    }

    fn run(&self, doc: &mut Document) -> Vec<AuditEntry> {
        let mut entries = Vec::new();
        let mut layers: Vec<(Handle, String)> = Vec::new();
        let mut linetypes: Vec<(Handle, String)> = Vec::new();
        let mut styles: Vec<(Handle, String)> = Vec::new();
        let mut inserts: Vec<(Handle, String)> = Vec::new();

        let linked: Vec<Handle> = doc
            .iter_spaces()
            .flat_map(|(_, handles)| handles.to_vec())
            .collect();
        for handle in linked {
            let Some(entity) = doc.entity(handle) else {
                continue;
            };
            if entity.is_graphical() && !entity.is_passthrough() {
                layers.push((handle, entity.layer()));
                if let Some(name) = entity.text("linetype") {
                    linetypes.push((handle, name));
                }
                if let Some(name) = entity.text("style") {
                    styles.push((handle, name));
                }
                if entity.type_name() == "INSERT" {
                    if let Some(name) = entity.text("name") {
                        inserts.push((handle, name));
                    }
                }
            }
        }

        for (handle, name) in layers {
            if name.is_empty() || doc.tables().layers().contains(&name) {
                continue;
            }
            if doc.new_layer(&name).is_ok() {
                entries.push(
                    AuditEntry::repaired(
                        AuditKind::UndefinedLayer,
                        format!("created missing layer \"{}\" with default properties", name),
                        self.id(),
                    )
                    .with_handle(handle),
                );
            }
        }
        for (handle, name) in linetypes {
            if name.is_empty() || doc.tables().linetypes().contains(&name) {
                continue;
            }
            if doc.new_linetype(&name).is_ok() {
                entries.push(
                    AuditEntry::repaired(
                        AuditKind::UndefinedLinetype,
                        format!("created missing linetype \"{}\"", name),
                        self.id(),
                    )
                    .with_handle(handle),
                );
            }
        }
        for (handle, name) in styles {
            if name.is_empty() || doc.tables().styles().contains(&name) {
                continue;
            }
            if doc.new_textstyle(&name).is_ok() {
                entries.push(
                    AuditEntry::repaired(
                        AuditKind::UndefinedTextStyle,
                        format!("created missing text style \"{}\"", name),
                        self.id(),
                    )
                    .with_handle(handle),
                );
            }
        }
        for (handle, name) in inserts {
            if name.is_empty() || doc.block_record(&name).is_some() {
                continue;
            }
            doc.detach_entity(handle);
            entries.push(
                AuditEntry::fatal(
                    AuditKind::UndefinedBlock,
                    format!("block reference names undefined block \"{}\"", name),
                    self.id(),
                )
                .with_handle(handle),
            );
        }
        entries
    }
}

// ==================== Rule 5: degenerate geometry ====================

/// The format tolerates degenerate entities; downstream consumers may
/// not. They are logged, never rejected.
pub struct DegenerateGeometry;

impl AuditRule for DegenerateGeometry {
    fn id(&self) -> &str {
        "geometry"
    }

    fn description(&self) -> &str {
        "degenerate geometry is logged"
    }

    fn run(&self, doc: &mut Document) -> Vec<AuditEntry> {
        let mut entries = Vec::new();
        let linked: Vec<Handle> = doc
            .iter_spaces()
            .flat_map(|(_, handles)| handles.to_vec())
            .collect();
        for handle in linked {
            let Some(entity) = doc.entity(handle) else {
                continue;
            };
            match entity.type_name() {
                "CIRCLE" | "ARC" => {
                    let radius = entity.double("radius").unwrap_or(1.0);
                    if radius <= 0.0 {
                        entries.push(
                            AuditEntry::warning(
                                AuditKind::DegenerateGeometry,
                                format!("{} with radius {}", entity.type_name(), radius),
                                self.id(),
                            )
                            .with_handle(handle),
                        );
                    }
                }
                "LINE" => {
                    let start = entity.point("start").unwrap_or_default();
                    let end = entity.point("end").unwrap_or_default();
                    let dx = end.x - start.x;
                    let dy = end.y - start.y;
                    let dz = end.z_or_zero() - start.z_or_zero();
                    if dx == 0.0 && dy == 0.0 && dz == 0.0 {
                        entries.push(
                            AuditEntry::warning(
                                AuditKind::DegenerateGeometry,
                                "zero-length line",
                                self.id(),
                            )
                            .with_handle(handle),
                        );
                    }
                }
                _ => {}
            }
        }
        entries
    }
}

// ==================== Rule 6: block reference cycles ====================

/// A block must not (transitively) insert itself. Cyclic references
/// cannot be repaired meaningfully; the offending references are
/// excluded from the graph.
pub struct BlockCycles;

impl BlockCycles {
    fn reaches(
        edges: &HashMap<Handle, Vec<Handle>>,
        from: Handle,
        target: Handle,
        seen: &mut HashSet<Handle>,
    ) -> bool {
        if from == target {
            return true;
        }
        if !seen.insert(from) {
            return false;
        }
        edges
            .get(&from)
            .into_iter()
            .flatten()
            .any(|next| Self::reaches(edges, *next, target, seen))
    }
}

impl AuditRule for BlockCycles {
    fn id(&self) -> &str {
        "block-cycles"
    }

    fn description(&self) -> &str {
        "block reference graph is acyclic"
    }

    fn run(&self, doc: &mut Document) -> Vec<AuditEntry> {
        let mut entries = Vec::new();
        // (containing record, insert handle, target record)
        let mut references: Vec<(Handle, Handle, Handle)> = Vec::new();
        for (record, handles) in doc.iter_spaces() {
            for handle in handles {
                let Some(entity) = doc.entity(*handle) else {
                    continue;
                };
                if entity.type_name() != "INSERT" {
                    continue;
                }
                let Some(name) = entity.text("name") else {
                    continue;
                };
                if let Some(target) = doc.block_record(&name) {
                    references.push((record, *handle, target));
                }
            }
        }
        let mut edges: HashMap<Handle, Vec<Handle>> = HashMap::new();
        for (record, _, target) in &references {
            edges.entry(*record).or_default().push(*target);
        }
        for (record, insert, target) in references {
            let mut seen = HashSet::new();
            if Self::reaches(&edges, target, record, &mut seen) {
                doc.detach_entity(insert);
                entries.push(
                    AuditEntry::fatal(
                        AuditKind::BlockCycle,
                        format!("block reference {} closes a reference cycle", insert),
                        self.id(),
                    )
                    .with_handle(insert),
                );
            }
        }
        entries
    }
}

// ==================== Rule 7: version flags ====================

/// Attributes constructed from codes above the declared revision are
/// non-fatal on load; the writer refuses them unless the caller opts
/// into a lossy downgrade.
pub struct VersionFlags;

impl AuditRule for VersionFlags {
    fn id(&self) -> &str {
        "version-flags"
    }

    fn description(&self) -> &str {
        "attributes match the declared format revision"
    }

    fn run(&self, doc: &mut Document) -> Vec<AuditEntry> {
        let mut entries = Vec::new();
        let handles: Vec<Handle> = doc.database().handles().collect();
        for handle in handles {
            let Some(entity) = doc.entity(handle) else {
                continue;
            };
            if !entity.over_version_codes().is_empty() {
                entries.push(
                    AuditEntry::warning(
                        AuditKind::VersionMismatch,
                        format!(
                            "{} carries attributes newer than {} (codes {:?})",
                            entity.type_name(),
                            doc.version(),
                            entity.over_version_codes()
                        ),
                        self.id(),
                    )
                    .with_handle(handle),
                );
            }
        }
        entries
    }
}

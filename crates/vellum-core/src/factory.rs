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

//! The entity factory: structured record to typed entity.
//!
//! For registered types the record's tags are walked in order; declared
//! codes become typed attributes, undeclared codes are preserved as
//! extra tags with a recorded schema warning (the format evolves faster
//! than any fixed schema). Unregistered types become opaque passthrough
//! entities keeping the full original tag collection.

use crate::entity::Entity;
use crate::error::LoadWarning;
use crate::record::EntityRecord;
use crate::schema::{schema_for, EntityClass};
use crate::tag::SUBCLASS_CODE;
use crate::version::DxfVersion;

/// Build an entity from a structured record.
///
/// `version` is the document's declared format revision; attributes
/// that need a newer one are still constructed but flagged for the
/// auditor.
pub fn entity_from_record(
    record: EntityRecord,
    version: DxfVersion,
    warnings: &mut Vec<LoadWarning>,
) -> Entity {
    let Some(schema) = schema_for(&record.type_name) else {
        return passthrough_from_record(record);
    };

    let mut attrs = Vec::with_capacity(record.attrs.len());
    let mut extra = Vec::new();
    let mut over_version = Vec::new();

    for tag in record.attrs {
        if tag.code == SUBCLASS_CODE {
            // Subclass markers are structural scaffolding; the writer
            // regenerates them for the target revision.
            continue;
        }
        match schema.attr_by_code(tag.code) {
            Some(spec) => {
                if spec.min_version > version && !over_version.contains(&tag.code) {
                    over_version.push(tag.code);
                }
                attrs.push(tag);
            }
            None => {
                warnings.push(LoadWarning::new(
                    format!(
                        "group code {} not declared for {}, preserved as-is",
                        tag.code, record.type_name
                    ),
                    0,
                ));
                extra.push(tag);
            }
        }
    }

    Entity::from_parts(
        record.type_name,
        schema.class,
        record.handle,
        record.owner,
        attrs,
        extra,
        record.app_data,
        record.xdata,
        None,
        over_version,
    )
}

/// Opaque passthrough: retain the original tag collection verbatim.
/// Classified graphical if the record carries a layer signature.
fn passthrough_from_record(record: EntityRecord) -> Entity {
    let raw = record.raw.unwrap_or_default();
    let class = if raw.iter().any(|tag| tag.code == 8) {
        EntityClass::Graphical
    } else {
        EntityClass::Object
    };
    Entity::from_parts(
        record.type_name,
        class,
        record.handle,
        record.owner,
        Vec::new(),
        Vec::new(),
        record.app_data,
        record.xdata,
        Some(raw),
        Vec::new(),
    )
}

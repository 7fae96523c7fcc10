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

//! Serialization back to the flat tag format.
//!
//! Attributes are emitted in schema declaration order, not in-memory
//! insertion order; attributes equal to their schema default are
//! omitted. Repeating attribute groups (polyline vertices, dash
//! patterns) keep their original interleaved order as one region.
//! Passthrough entities serialize from their verbatim tag collection.
//!
//! Sections are written in one pass: header, classes, tables in
//! canonical order, blocks, entities (model space then paper space
//! layouts in tab order), objects. Loading needs two passes; writing
//! does not, since the in-memory graph already holds resolved
//! references.

use crate::config::WriteConfig;
use std::collections::{HashMap, HashSet};
use vellum_core::tag::encode_hex;
use vellum_core::{
    Document, DxfError, DxfResult, DxfVersion, Entity, EntityClass, Handle, Point, Tag, TagValue,
};

/// Serialize a document to the text tag format.
pub fn write_document(doc: &Document, config: &WriteConfig) -> DxfResult<String> {
    DocumentWriter::new(doc, config).write()
}

// ==================== Low-level tag formatting ====================

/// Formats tags as `%3d\n%s\n` code/value line pairs.
#[derive(Debug, Default)]
pub struct TagWriter {
    out: String,
}

impl TagWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_string(self) -> String {
        self.out
    }

    pub fn write_tag(&mut self, tag: &Tag) {
        match &tag.value {
            TagValue::Text(text) => self.write_str(tag.code, text),
            TagValue::Integer(value) => self.write_line(tag.code, &value.to_string()),
            TagValue::Double(value) => self.write_line(tag.code, &format_double(*value)),
            TagValue::Point(point) => self.write_point(tag.code, *point),
            TagValue::Binary(data) => self.write_line(tag.code, &encode_hex(data)),
        }
    }

    pub fn write_str(&mut self, code: u16, value: &str) {
        self.write_line(code, value);
    }

    pub fn write_int(&mut self, code: u16, value: i64) {
        self.write_line(code, &value.to_string());
    }

    pub fn write_double(&mut self, code: u16, value: f64) {
        self.write_line(code, &format_double(value));
    }

    /// A point expands back into its ordinate tags; the z ordinate is
    /// written only for 3D points.
    pub fn write_point(&mut self, code: u16, point: Point) {
        self.write_double(code, point.x);
        self.write_double(code + 10, point.y);
        if let Some(z) = point.z {
            self.write_double(code + 20, z);
        }
    }

    fn write_line(&mut self, code: u16, value: &str) {
        self.out.push_str(&format!("{:>3}\n{}\n", code, value));
    }
}

/// Shortest representation that still reads back exactly; whole numbers
/// keep one decimal place so floats stay recognizable as floats.
fn format_double(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

// ==================== Document writer ====================

struct DocumentWriter<'a> {
    doc: &'a Document,
    target: DxfVersion,
    lossy: bool,
    out: TagWriter,
}

impl<'a> DocumentWriter<'a> {
    fn new(doc: &'a Document, config: &WriteConfig) -> Self {
        Self {
            doc,
            target: config.resolve_target(doc.version()),
            lossy: config.lossy_downgrade,
            out: TagWriter::new(),
        }
    }

    fn write(mut self) -> DxfResult<String> {
        self.check_version_compatibility()?;
        self.write_header();
        self.write_classes();
        self.write_tables()?;
        self.write_blocks()?;
        self.write_entities()?;
        self.write_objects()?;
        self.write_extra_sections();
        self.out.write_str(0, "EOF");
        Ok(self.out.into_string())
    }

    /// Handles of every entity this writer will emit.
    fn written_entities(&self) -> Vec<Handle> {
        let mut handles: Vec<Handle> = Vec::new();
        for table in self.doc.tables().iter() {
            handles.extend(table.entries());
        }
        for (_, space) in self.doc.iter_spaces() {
            handles.extend(space);
        }
        if self.target >= DxfVersion::R13 {
            handles.extend(self.doc.objects());
        }
        handles
    }

    /// Version incompatibility always raises unless the caller opted
    /// into lossy downgrade. Block records and structural entities are
    /// representation artifacts and are exempt; the writer handles them
    /// per revision.
    fn check_version_compatibility(&self) -> DxfResult<()> {
        if self.lossy {
            return Ok(());
        }
        for handle in self.written_entities() {
            let Some(entity) = self.doc.entity(handle) else {
                continue;
            };
            let Some(schema) = entity.schema() else {
                continue; // passthrough is preserved opaquely
            };
            if schema.type_name == "BLOCK_RECORD" || schema.class == EntityClass::Structural {
                continue;
            }
            if schema.min_version > self.target {
                return Err(DxfError::version(
                    format!(
                        "{} requires {} but the target is {}",
                        schema.type_name,
                        schema.min_version,
                        self.target
                    ),
                    0,
                ));
            }
            for tag in entity.attr_tags() {
                if let Some(spec) = schema.attr_by_code(tag.code) {
                    if spec.min_version > self.target {
                        return Err(DxfError::version(
                            format!(
                                "attribute {} of {} requires {} but the target is {}",
                                spec.name,
                                schema.type_name,
                                spec.min_version,
                                self.target
                            ),
                            0,
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    // ==================== Sections ====================

    fn begin_section(&mut self, name: &str) {
        self.out.write_str(0, "SECTION");
        self.out.write_str(2, name);
    }

    fn end_section(&mut self) {
        self.out.write_str(0, "ENDSEC");
    }

    fn write_header(&mut self) {
        self.begin_section("HEADER");
        self.out.write_str(9, "$ACADVER");
        self.out.write_str(1, self.target.token());
        self.out.write_str(9, "$HANDSEED");
        self.out
            .write_str(5, &format!("{:X}", self.doc.database().handle_seed()));
        for (name, tags) in self.doc.header().iter() {
            if name == "$ACADVER" || name == "$HANDSEED" {
                continue;
            }
            self.out.write_str(9, name);
            for tag in tags {
                self.out.write_tag(tag);
            }
        }
        self.end_section();
    }

    fn write_classes(&mut self) {
        if self.doc.classes().is_empty() || self.target < DxfVersion::R13 {
            return;
        }
        self.begin_section("CLASSES");
        for record in self.doc.classes() {
            self.out.write_str(0, &record.type_name);
            for tag in &record.tags {
                self.out.write_tag(tag);
            }
        }
        self.end_section();
    }

    fn write_tables(&mut self) -> DxfResult<()> {
        self.begin_section("TABLES");
        for table in self.doc.tables().iter() {
            let name = table.role().table_name();
            if name == "BLOCK_RECORD" && self.target < DxfVersion::R13 {
                continue;
            }
            self.out.write_str(0, "TABLE");
            self.out.write_str(2, name);
            if let Some(handle) = table.handle() {
                self.out.write_str(5, &handle.to_hex());
            }
            if self.target >= DxfVersion::R13 {
                self.out.write_str(100, "AcDbSymbolTable");
            }
            self.out.write_int(70, table.entries().len() as i64);
            for handle in table.entries() {
                if let Some(entity) = self.doc.entity(*handle) {
                    self.write_entity(entity)?;
                }
            }
            self.out.write_str(0, "ENDTAB");
        }
        self.end_section();
        Ok(())
    }

    /// Block records whose entities live in the ENTITIES section.
    fn layout_records(&self) -> HashSet<Handle> {
        let mut records = HashSet::new();
        records.insert(self.doc.modelspace());
        for layout in self.doc.layouts() {
            if let Some(record) = self.doc.layout_block_record(*layout) {
                records.insert(record);
            }
        }
        for record in self.doc.blocks() {
            let name = self
                .doc
                .entity(*record)
                .and_then(|entity| entity.name())
                .unwrap_or_default()
                .to_lowercase();
            if name.starts_with("*model_space") || name.starts_with("*paper_space") {
                records.insert(*record);
            }
        }
        records
    }

    fn write_blocks(&mut self) -> DxfResult<()> {
        self.begin_section("BLOCKS");
        let layout_records = self.layout_records();
        for record in self.doc.blocks() {
            let Some(record_entity) = self.doc.entity(*record) else {
                continue;
            };
            let name = record_entity.name().unwrap_or_default();
            match self.doc.block_head(*record).and_then(|h| self.doc.entity(h)) {
                Some(head) => self.write_entity(head)?,
                None => self.write_synthesized_block_head(&name, *record),
            }
            if !layout_records.contains(record) {
                for handle in self.doc.entities_in(*record) {
                    if let Some(entity) = self.doc.entity(*handle) {
                        self.write_entity(entity)?;
                    }
                }
            }
            match self
                .doc
                .block_endblk(*record)
                .and_then(|h| self.doc.entity(h))
            {
                Some(endblk) => self.write_entity(endblk)?,
                None => {
                    self.out.write_str(0, "ENDBLK");
                    if self.target >= DxfVersion::R13 {
                        self.out.write_str(330, &record.to_hex());
                        self.out.write_str(100, "AcDbEntity");
                        self.out.write_str(8, "0");
                        self.out.write_str(100, "AcDbBlockEnd");
                    }
                }
            }
        }
        self.end_section();
        Ok(())
    }

    fn write_synthesized_block_head(&mut self, name: &str, record: Handle) {
        self.out.write_str(0, "BLOCK");
        if self.target >= DxfVersion::R13 {
            self.out.write_str(330, &record.to_hex());
            self.out.write_str(100, "AcDbEntity");
        }
        self.out.write_str(8, "0");
        if self.target >= DxfVersion::R13 {
            self.out.write_str(100, "AcDbBlockBegin");
        }
        self.out.write_str(2, name);
        self.out.write_int(70, 0);
        self.out.write_point(10, Point::xyz(0.0, 0.0, 0.0));
        self.out.write_str(3, name);
    }

    fn write_entities(&mut self) -> DxfResult<()> {
        self.begin_section("ENTITIES");
        let mut written: HashSet<Handle> = HashSet::new();
        let modelspace = self.doc.modelspace();
        self.write_space_entities(modelspace)?;
        written.insert(modelspace);
        for layout in self.doc.layouts().to_vec() {
            let Some(record) = self.doc.layout_block_record(layout) else {
                continue;
            };
            if written.insert(record) {
                self.write_space_entities(record)?;
            }
        }
        // Layout-like spaces without a layout object (legacy files).
        for record in self.layout_records() {
            if written.insert(record) {
                self.write_space_entities(record)?;
            }
        }
        self.end_section();
        Ok(())
    }

    fn write_space_entities(&mut self, record: Handle) -> DxfResult<()> {
        for handle in self.doc.entities_in(record).to_vec() {
            if let Some(entity) = self.doc.entity(handle) {
                self.write_entity(entity)?;
            }
        }
        Ok(())
    }

    fn write_objects(&mut self) -> DxfResult<()> {
        if self.target < DxfVersion::R13 || self.doc.objects().is_empty() {
            return Ok(());
        }
        self.begin_section("OBJECTS");
        for handle in self.doc.objects().to_vec() {
            let Some(entity) = self.doc.entity(handle) else {
                continue;
            };
            if self.lossy {
                if let Some(schema) = entity.schema() {
                    if schema.min_version > self.target {
                        continue;
                    }
                }
            }
            self.write_entity(entity)?;
        }
        self.end_section();
        Ok(())
    }

    fn write_extra_sections(&mut self) {
        for section in self.doc.extra_sections() {
            self.begin_section(&section.name);
            for record in &section.records {
                self.out.write_str(0, &record.type_name);
                for tag in &record.tags {
                    self.out.write_tag(tag);
                }
            }
            self.end_section();
        }
    }

    // ==================== Entity emission ====================

    fn write_entity(&mut self, entity: &Entity) -> DxfResult<()> {
        self.out.write_str(0, entity.type_name());

        // Passthrough entities reproduce their original tag sequence
        // byte-for-byte in content.
        if let Some(raw) = entity.raw_tags() {
            for tag in raw {
                self.out.write_tag(tag);
            }
            return Ok(());
        }

        let handle_code = if entity.type_name() == "DIMSTYLE" { 105 } else { 5 };
        if let Some(handle) = entity.handle() {
            self.out.write_str(handle_code, &handle.to_hex());
        }
        for block in entity.app_data() {
            self.out.write_str(102, &format!("{{{}", block.app_id));
            for tag in &block.tags {
                self.out.write_tag(tag);
            }
            self.out.write_str(102, "}");
        }
        if self.target >= DxfVersion::R13 {
            if let Some(owner) = entity.owner() {
                self.out.write_str(330, &owner.to_hex());
            }
        }

        let Some(schema) = entity.schema() else {
            // Known-typed entities always have a schema; this arm keeps
            // the writer total for hand-built edge cases.
            for tag in entity.attr_tags() {
                self.out.write_tag(tag);
            }
            return Ok(());
        };

        if self.target >= DxfVersion::R13 {
            match schema.class {
                EntityClass::Graphical | EntityClass::Structural => {
                    self.out.write_str(100, "AcDbEntity");
                }
                EntityClass::TableEntry => {
                    self.out.write_str(100, "AcDbSymbolTableRecord");
                }
                EntityClass::Object => {}
            }
        }

        // Codes occurring more than once form a repeating region that
        // keeps its original interleaved order (vertex/bulge pairing is
        // positional).
        let attrs = entity.attr_tags();
        let mut counts: HashMap<u16, usize> = HashMap::new();
        for tag in attrs {
            *counts.entry(tag.code).or_insert(0) += 1;
        }
        let repeated: HashSet<u16> = counts
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|(code, _)| *code)
            .collect();
        let mut region_written = false;
        let target = self.target;

        let emit_specs = |writer: &mut TagWriter,
                          specs: &[vellum_core::AttrSpec],
                          region_written: &mut bool| {
            for spec in specs {
                if spec.min_version > target {
                    continue; // reachable only under lossy downgrade
                }
                if repeated.contains(&spec.code) {
                    if !*region_written {
                        for tag in attrs.iter().filter(|tag| repeated.contains(&tag.code)) {
                            writer.write_tag(tag);
                        }
                        *region_written = true;
                    }
                    continue;
                }
                let Some(tag) = attrs.iter().find(|tag| tag.code == spec.code) else {
                    continue;
                };
                // Omit values equal to the schema default.
                if spec.default.to_value().as_ref() == Some(&tag.value) {
                    continue;
                }
                writer.write_tag(tag);
            }
        };

        emit_specs(&mut self.out, schema.common, &mut region_written);
        if self.target >= DxfVersion::R13 {
            if let Some(subclass) = schema.subclass {
                self.out.write_str(100, subclass);
            }
        }
        emit_specs(&mut self.out, schema.attrs, &mut region_written);

        for tag in entity.extra_tags() {
            self.out.write_tag(tag);
        }
        for block in entity.xdata() {
            self.out.write_str(1001, &block.app_id);
            for tag in &block.tags {
                self.out.write_tag(tag);
            }
        }
        Ok(())
    }
}

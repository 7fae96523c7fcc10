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

//! The document graph.
//!
//! Wires the header, tables, block spaces, layouts and objects together
//! over the entity database. All cross-entity links are handle values
//! resolved through the database, never owning pointers, so the
//! cyclic-looking ownership of the format (blocks contain entities,
//! entities point back at their block) needs no special treatment.
//!
//! There is no process-wide current document; every operation takes an
//! explicit `Document`. A single document is not thread-safe for
//! mutation; callers serialize access themselves.

use crate::database::EntityDatabase;
use crate::entity::Entity;
use crate::error::{DxfError, DxfResult};
use crate::handle::Handle;
use crate::header::HeaderSection;
use crate::query::EntityQuery;
use crate::record::RawRecord;
use crate::schema::{COLOR_BYBLOCK, COLOR_BYLAYER, LINEWEIGHT_BYBLOCK, LINEWEIGHT_BYLAYER, LINEWEIGHT_DEFAULT};
use crate::tables::{TableRole, Tables};
use crate::tag::TagValue;
use crate::version::DxfVersion;
use std::collections::HashMap;

/// Well-known name of the model space block record.
pub const MODELSPACE_NAME: &str = "*Model_Space";
/// Well-known name of the primary paper space block record.
pub const PAPERSPACE_NAME: &str = "*Paper_Space";

/// An unrecognized section preserved verbatim for round-trip.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSection {
    pub name: String,
    pub records: Vec<RawRecord>,
}

/// The in-memory document.
#[derive(Debug, Clone)]
pub struct Document {
    version: DxfVersion,
    header: HeaderSection,
    db: EntityDatabase,
    tables: Tables,
    /// Entity handles per block record, insertion order.
    spaces: HashMap<Handle, Vec<Handle>>,
    /// Block records in definition order.
    blocks: Vec<Handle>,
    /// BLOCK/ENDBLK head entities per block record, when present.
    block_heads: HashMap<Handle, (Option<Handle>, Option<Handle>)>,
    /// Layout objects in tab order.
    layouts: Vec<Handle>,
    /// Objects section in file order.
    objects: Vec<Handle>,
    /// CLASSES section, preserved verbatim.
    classes: Vec<RawRecord>,
    /// Unknown sections, preserved verbatim.
    extra_sections: Vec<RawSection>,
    modelspace: Handle,
}

impl Document {
    /// Create a new document with the baseline resources every valid
    /// file carries: layer "0", linetype "Continuous", text style
    /// "Standard", app id "ACAD", the model and paper space block
    /// records and their layouts.
    pub fn new(version: DxfVersion) -> Document {
        let mut doc = Document {
            version,
            header: HeaderSection::new(),
            db: EntityDatabase::new(),
            tables: Tables::new(),
            spaces: HashMap::new(),
            blocks: Vec::new(),
            block_heads: HashMap::new(),
            layouts: Vec::new(),
            objects: Vec::new(),
            classes: Vec::new(),
            extra_sections: Vec::new(),
            // Placeholder until the modelspace record exists.
            modelspace: Handle::new(1).unwrap(),
        };
        doc.header.set_version(version);

        // The layout dictionary owns the layout objects.
        let layout_dict = Entity::new("DICTIONARY").expect("registered type");
        let dict_handle = doc.db.add(layout_dict).expect("fresh database");
        doc.objects.push(dict_handle);

        let modelspace = doc
            .new_block(MODELSPACE_NAME)
            .expect("fresh document has no name collisions");
        doc.modelspace = modelspace;
        let paperspace = doc.new_block(PAPERSPACE_NAME).expect("fresh document");

        doc.new_layer("0").expect("fresh document");
        doc.new_linetype("ByBlock").expect("fresh document");
        doc.new_linetype("ByLayer").expect("fresh document");
        doc.new_linetype("Continuous").expect("fresh document");
        doc.new_textstyle("Standard").expect("fresh document");
        doc.new_appid("ACAD").expect("fresh document");

        doc.new_layout_for("Model", modelspace)
            .expect("fresh document");
        doc.new_layout_for("Layout1", paperspace)
            .expect("fresh document");
        doc
    }

    /// Assemble a document from loader parts; the loader guarantees the
    /// modelspace record exists.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        version: DxfVersion,
        header: HeaderSection,
        db: EntityDatabase,
        tables: Tables,
        spaces: HashMap<Handle, Vec<Handle>>,
        blocks: Vec<Handle>,
        block_heads: HashMap<Handle, (Option<Handle>, Option<Handle>)>,
        layouts: Vec<Handle>,
        objects: Vec<Handle>,
        classes: Vec<RawRecord>,
        extra_sections: Vec<RawSection>,
        modelspace: Handle,
    ) -> Document {
        Document {
            version,
            header,
            db,
            tables,
            spaces,
            blocks,
            block_heads,
            layouts,
            objects,
            classes,
            extra_sections,
            modelspace,
        }
    }

    // ==================== Plain accessors ====================

    pub fn version(&self) -> DxfVersion {
        self.version
    }

    pub fn set_version(&mut self, version: DxfVersion) {
        self.version = version;
        self.header.set_version(version);
    }

    pub fn header(&self) -> &HeaderSection {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut HeaderSection {
        &mut self.header
    }

    pub fn database(&self) -> &EntityDatabase {
        &self.db
    }

    /// Mutable database access. Deleting an entity that is still linked
    /// into a table or space leaves dangling references for the auditor
    /// to find; prefer the document-level mutation surface.
    pub fn database_mut(&mut self) -> &mut EntityDatabase {
        &mut self.db
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub fn tables_mut(&mut self) -> &mut Tables {
        &mut self.tables
    }

    /// Shorthand database lookup.
    pub fn entity(&self, handle: Handle) -> Option<&Entity> {
        self.db.get(handle)
    }

    pub fn classes(&self) -> &[RawRecord] {
        &self.classes
    }

    pub fn extra_sections(&self) -> &[RawSection] {
        &self.extra_sections
    }

    // ==================== Spaces and blocks ====================

    /// The model space block record.
    pub fn modelspace(&self) -> Handle {
        self.modelspace
    }

    /// The primary paper space block record, when present.
    pub fn paperspace(&self) -> Option<Handle> {
        self.tables.block_records().get(PAPERSPACE_NAME)
    }

    /// A block record by name (case-insensitive).
    pub fn block_record(&self, name: &str) -> Option<Handle> {
        self.tables.block_records().get(name)
    }

    /// Block records in definition order.
    pub fn blocks(&self) -> &[Handle] {
        &self.blocks
    }

    /// The BLOCK/ENDBLK head entities of a block record, when loaded
    /// from a file.
    pub fn block_head(&self, record: Handle) -> Option<Handle> {
        self.block_heads.get(&record).and_then(|(head, _)| *head)
    }

    pub fn block_endblk(&self, record: Handle) -> Option<Handle> {
        self.block_heads.get(&record).and_then(|(_, endblk)| *endblk)
    }

    /// Entities owned by a block record, in insertion order.
    pub fn entities_in(&self, record: Handle) -> &[Handle] {
        self.spaces
            .get(&record)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Resolve the entities of a block record against the database.
    pub fn iter_entities_in(&self, record: Handle) -> impl Iterator<Item = &Entity> {
        self.entities_in(record)
            .iter()
            .filter_map(move |handle| self.db.get(*handle))
    }

    /// All (block record, entity list) pairs.
    pub fn iter_spaces(&self) -> impl Iterator<Item = (Handle, &[Handle])> {
        self.blocks
            .iter()
            .map(move |record| (*record, self.entities_in(*record)))
    }

    /// The block record owning an entity, if it is linked anywhere.
    pub fn space_of(&self, entity: Handle) -> Option<Handle> {
        self.blocks
            .iter()
            .copied()
            .find(|record| self.entities_in(*record).contains(&entity))
    }

    // ==================== Layouts and objects ====================

    /// Layout objects in tab order.
    pub fn layouts(&self) -> &[Handle] {
        &self.layouts
    }

    /// A layout object by name.
    pub fn layout_by_name(&self, name: &str) -> Option<Handle> {
        self.layouts.iter().copied().find(|handle| {
            self.db
                .get(*handle)
                .and_then(|entity| entity.text("name"))
                .is_some_and(|layout_name| layout_name.eq_ignore_ascii_case(name))
        })
    }

    /// The block record a layout draws on. Resolves through the layout
    /// object's back-pointer, falling back to the block record's own
    /// layout attribute for files that carry only one direction.
    pub fn layout_block_record(&self, layout: Handle) -> Option<Handle> {
        if let Some(record) = self.db.get(layout).and_then(|entity| entity.handle_ref("block_record")) {
            return Some(record);
        }
        self.blocks.iter().copied().find(|record| {
            self.db
                .get(*record)
                .and_then(|entity| entity.handle_ref("layout"))
                == Some(layout)
        })
    }

    /// Objects section handles in file order.
    pub fn objects(&self) -> &[Handle] {
        &self.objects
    }

    // ==================== Mutation surface ====================

    /// Create a graphical entity inside a block record's space. The
    /// handle always exists before the entity is linked anywhere.
    pub fn add_entity_to(&mut self, record: Handle, entity: Entity) -> DxfResult<Handle> {
        if !self.spaces.contains_key(&record) {
            return Err(DxfError::reference(
                format!("no block record {} to own the entity", record),
                0,
            ));
        }
        let handle = self.db.add(entity)?;
        if let Some(stored) = self.db.get_mut(handle) {
            stored.set_owner(Some(record));
        }
        self.spaces.entry(record).or_default().push(handle);
        Ok(handle)
    }

    /// Create a graphical entity in model space.
    pub fn add_entity(&mut self, entity: Entity) -> DxfResult<Handle> {
        self.add_entity_to(self.modelspace, entity)
    }

    /// Delete an entity: detach from its space, then unlink from the
    /// database. The handle is never reused.
    pub fn remove_entity(&mut self, handle: Handle) -> DxfResult<Entity> {
        self.detach_entity(handle);
        self.db
            .remove(handle)
            .ok_or_else(|| DxfError::reference(format!("no entity {}", handle), 0))
    }

    /// Remove an entity from every space list without touching the
    /// database. Used by the auditor to exclude invalid entities.
    pub fn detach_entity(&mut self, handle: Handle) {
        for list in self.spaces.values_mut() {
            list.retain(|entry| *entry != handle);
        }
    }

    /// Relink an entity into another block record's space.
    pub fn move_to_space(&mut self, entity: Handle, record: Handle) -> DxfResult<()> {
        if !self.spaces.contains_key(&record) {
            return Err(DxfError::reference(
                format!("no block record {} to own the entity", record),
                0,
            ));
        }
        if !self.db.contains(entity) {
            return Err(DxfError::reference(format!("no entity {}", entity), 0));
        }
        self.detach_entity(entity);
        self.spaces.entry(record).or_default().push(entity);
        if let Some(stored) = self.db.get_mut(entity) {
            stored.set_owner(Some(record));
        }
        Ok(())
    }

    /// Register a table entry entity: database first, then the table's
    /// name index.
    pub fn add_table_entry(&mut self, role: TableRole, entity: Entity) -> DxfResult<Handle> {
        if entity.type_name() != role.table_name() {
            return Err(DxfError::invariant(format!(
                "entity type {} does not match table {}",
                entity.type_name(),
                role.table_name()
            )));
        }
        let name = entity
            .name()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| DxfError::invariant("table entry without a name"))?;
        let handle = self.db.add(entity)?;
        if let Err(err) = self.tables.by_role_mut(role).add_entry(&name, handle) {
            // Roll the entity back out; the handle stays burned.
            self.db.remove(handle);
            return Err(err);
        }
        Ok(handle)
    }

    /// Create a layer with documented default properties.
    pub fn new_layer(&mut self, name: &str) -> DxfResult<Handle> {
        let mut entity = Entity::new("LAYER")?;
        entity.set("name", TagValue::Text(name.to_string()))?;
        self.add_table_entry(TableRole::Layer, entity)
    }

    /// Create a linetype entry.
    pub fn new_linetype(&mut self, name: &str) -> DxfResult<Handle> {
        let mut entity = Entity::new("LTYPE")?;
        entity.set("name", TagValue::Text(name.to_string()))?;
        self.add_table_entry(TableRole::Linetype, entity)
    }

    /// Create a text style entry.
    pub fn new_textstyle(&mut self, name: &str) -> DxfResult<Handle> {
        let mut entity = Entity::new("STYLE")?;
        entity.set("name", TagValue::Text(name.to_string()))?;
        self.add_table_entry(TableRole::Textstyle, entity)
    }

    /// Create an application id entry.
    pub fn new_appid(&mut self, name: &str) -> DxfResult<Handle> {
        let mut entity = Entity::new("APPID")?;
        entity.set("name", TagValue::Text(name.to_string()))?;
        self.add_table_entry(TableRole::AppId, entity)
    }

    /// Create a block record and its empty entity space.
    pub fn new_block(&mut self, name: &str) -> DxfResult<Handle> {
        let mut entity = Entity::new("BLOCK_RECORD")?;
        entity.set("name", TagValue::Text(name.to_string()))?;
        let handle = self.add_table_entry(TableRole::BlockRecord, entity)?;
        self.spaces.insert(handle, Vec::new());
        self.blocks.push(handle);
        Ok(handle)
    }

    /// Create a new paper space layout: a fresh block record plus the
    /// layout object wired to it.
    pub fn new_layout(&mut self, name: &str) -> DxfResult<Handle> {
        let space_name = format!("*Paper_Space{}", self.layouts.len());
        let record = self.new_block(&space_name)?;
        self.new_layout_for(name, record)
    }

    fn new_layout_for(&mut self, name: &str, record: Handle) -> DxfResult<Handle> {
        let mut layout = Entity::new("LAYOUT")?;
        layout.set("name", TagValue::Text(name.to_string()))?;
        layout.set("tab_order", TagValue::Integer(self.layouts.len() as i64))?;
        layout.set("block_record", TagValue::Text(record.to_hex()))?;
        layout.set_owner(self.layout_dictionary());
        let handle = self.db.add(layout)?;
        if let Some(entity) = self.db.get_mut(record) {
            let _ = entity.set("layout", TagValue::Text(handle.to_hex()));
        }
        self.layouts.push(handle);
        self.objects.push(handle);
        Ok(handle)
    }

    /// The first dictionary in the objects collection, used as the
    /// owner of layout objects.
    fn layout_dictionary(&self) -> Option<Handle> {
        self.objects.iter().copied().find(|handle| {
            self.db
                .get(*handle)
                .is_some_and(|entity| entity.type_name() == "DICTIONARY")
        })
    }

    // ==================== Queries ====================

    /// Query over every graphical entity in every space.
    pub fn query(&self) -> EntityQuery<'_> {
        let entities = self
            .iter_spaces()
            .flat_map(|(_, handles)| handles.to_vec())
            .filter_map(|handle| self.db.get(handle))
            .collect();
        EntityQuery::new(entities)
    }

    /// Query over one block record's entities.
    pub fn query_space(&self, record: Handle) -> EntityQuery<'_> {
        EntityQuery::new(self.iter_entities_in(record).collect())
    }

    // ==================== Inherited attribute resolution ====================

    /// Resolve an entity's effective color index: the BYLAYER sentinel
    /// walks to the owning layer, BYBLOCK falls back to the documented
    /// default (7) outside a block reference context.
    pub fn resolved_color(&self, entity: &Entity) -> i64 {
        match entity.integer("color") {
            Some(COLOR_BYLAYER) | None => self
                .tables
                .layers()
                .get(&entity.layer())
                .and_then(|handle| self.db.get(handle))
                .and_then(|layer| layer.integer("color"))
                .unwrap_or(7),
            Some(COLOR_BYBLOCK) => 7,
            Some(color) => color,
        }
    }

    /// Resolve an entity's effective lineweight through the same
    /// inheritance chain.
    pub fn resolved_lineweight(&self, entity: &Entity) -> i64 {
        match entity.integer("lineweight") {
            Some(LINEWEIGHT_BYLAYER) | None => self
                .tables
                .layers()
                .get(&entity.layer())
                .and_then(|handle| self.db.get(handle))
                .and_then(|layer| layer.integer("lineweight"))
                .unwrap_or(LINEWEIGHT_DEFAULT),
            Some(LINEWEIGHT_BYBLOCK) => LINEWEIGHT_DEFAULT,
            Some(weight) => weight,
        }
    }

}

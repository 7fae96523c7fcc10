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

//! The entity: base unit of the document graph.
//!
//! An entity carries its immutable type name, an optional handle, the
//! owner handle, the declared attributes that were actually present
//! (appearance order, repeats allowed), undeclared-but-round-tripped
//! extra tags, application-data blocks and extended data. Declared
//! attributes absent from the file take their schema default lazily on
//! access; defaults are never stored.
//!
//! Entities of unregistered types keep their full original tag
//! collection verbatim and serialize from it unchanged.

use crate::error::{DxfError, DxfResult};
use crate::handle::Handle;
use crate::record::{AppData, Xdata};
use crate::schema::{schema_for, EntityClass, EntitySchema};
use crate::tag::{Point, Tag, TagValue};

/// A single entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    type_name: String,
    class: EntityClass,
    handle: Option<Handle>,
    owner: Option<Handle>,
    attrs: Vec<Tag>,
    extra: Vec<Tag>,
    app_data: Vec<AppData>,
    xdata: Vec<Xdata>,
    raw: Option<Vec<Tag>>,
    over_version: Vec<u16>,
}

impl Entity {
    /// Create an empty entity of a registered type.
    pub fn new(type_name: &str) -> DxfResult<Entity> {
        let schema = schema_for(type_name).ok_or_else(|| {
            DxfError::schema(format!("unregistered entity type {}", type_name), 0)
        })?;
        Ok(Entity {
            type_name: type_name.to_string(),
            class: schema.class,
            handle: None,
            owner: None,
            attrs: Vec::new(),
            extra: Vec::new(),
            app_data: Vec::new(),
            xdata: Vec::new(),
            raw: None,
            over_version: Vec::new(),
        })
    }

    /// Assemble an entity from factory parts.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        type_name: String,
        class: EntityClass,
        handle: Option<Handle>,
        owner: Option<Handle>,
        attrs: Vec<Tag>,
        extra: Vec<Tag>,
        app_data: Vec<AppData>,
        xdata: Vec<Xdata>,
        raw: Option<Vec<Tag>>,
        over_version: Vec<u16>,
    ) -> Entity {
        Entity {
            type_name,
            class,
            handle,
            owner,
            attrs,
            extra,
            app_data,
            xdata,
            raw,
            over_version,
        }
    }

    // ==================== Identity ====================

    /// The format type tag (LINE, CIRCLE, ...). Immutable.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Broad classification.
    pub fn class(&self) -> EntityClass {
        self.class
    }

    /// The registered schema, absent for passthrough entities.
    pub fn schema(&self) -> Option<&'static EntitySchema> {
        schema_for(&self.type_name)
    }

    pub fn is_graphical(&self) -> bool {
        self.class == EntityClass::Graphical
    }

    pub fn is_table_entry(&self) -> bool {
        self.class == EntityClass::TableEntry
    }

    pub fn is_object(&self) -> bool {
        self.class == EntityClass::Object
    }

    /// True for entities of unregistered types, preserved verbatim.
    pub fn is_passthrough(&self) -> bool {
        self.raw.is_some()
    }

    // ==================== Handle and owner ====================

    pub fn handle(&self) -> Option<Handle> {
        self.handle
    }

    pub(crate) fn set_handle(&mut self, handle: Handle) {
        self.handle = Some(handle);
    }

    pub fn owner(&self) -> Option<Handle> {
        self.owner
    }

    pub fn set_owner(&mut self, owner: Option<Handle>) {
        self.owner = owner;
    }

    // ==================== Attribute access ====================

    /// Get a declared attribute by name; substitutes the schema default
    /// when the attribute is absent. `None` for undeclared names and
    /// absent defaults.
    pub fn get(&self, name: &str) -> Option<TagValue> {
        let spec = self.schema()?.attr_by_name(name)?;
        if let Some(tag) = self.attrs.iter().find(|tag| tag.code == spec.code) {
            return Some(tag.value.clone());
        }
        spec.default.to_value()
    }

    /// Get a declared attribute only if it is actually present.
    pub fn get_present(&self, name: &str) -> Option<&TagValue> {
        let spec = self.schema()?.attr_by_name(name)?;
        self.attrs
            .iter()
            .find(|tag| tag.code == spec.code)
            .map(|tag| &tag.value)
    }

    /// All occurrences of a repeating attribute, in appearance order.
    pub fn get_all<'a>(&'a self, name: &str) -> Box<dyn Iterator<Item = &'a TagValue> + 'a> {
        let Some(spec) = self.schema().and_then(|schema| schema.attr_by_name(name)) else {
            return Box::new(std::iter::empty());
        };
        let code = spec.code;
        Box::new(
            self.attrs
                .iter()
                .filter(move |tag| tag.code == code)
                .map(|tag| &tag.value),
        )
    }

    pub fn text(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            TagValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.get(name)?.as_i64()
    }

    pub fn double(&self, name: &str) -> Option<f64> {
        self.get(name)?.as_f64()
    }

    pub fn point(&self, name: &str) -> Option<Point> {
        self.get(name)?.as_point()
    }

    /// A handle-valued attribute (hex text on the wire).
    pub fn handle_ref(&self, name: &str) -> Option<Handle> {
        self.get(name)?.as_handle()
    }

    /// The layer name, defaulted to "0".
    pub fn layer(&self) -> String {
        self.text("layer").unwrap_or_else(|| "0".to_string())
    }

    /// The table-entry or block name.
    pub fn name(&self) -> Option<String> {
        self.text("name")
    }

    /// Set a declared attribute, replacing the first occurrence.
    pub fn set(&mut self, name: &str, value: TagValue) -> DxfResult<()> {
        let spec = self
            .schema()
            .and_then(|schema| schema.attr_by_name(name))
            .ok_or_else(|| {
                DxfError::schema(
                    format!("attribute {} not declared for {}", name, self.type_name),
                    0,
                )
            })?;
        if let Some(tag) = self.attrs.iter_mut().find(|tag| tag.code == spec.code) {
            tag.value = value;
        } else {
            self.attrs.push(Tag::new(spec.code, value));
        }
        Ok(())
    }

    /// Append one occurrence of a repeating attribute.
    pub fn push(&mut self, name: &str, value: TagValue) -> DxfResult<()> {
        let spec = self
            .schema()
            .and_then(|schema| schema.attr_by_name(name))
            .ok_or_else(|| {
                DxfError::schema(
                    format!("attribute {} not declared for {}", name, self.type_name),
                    0,
                )
            })?;
        self.attrs.push(Tag::new(spec.code, value));
        Ok(())
    }

    /// Remove every occurrence of a declared attribute; access falls
    /// back to the schema default afterwards.
    pub fn unset(&mut self, name: &str) {
        if let Some(spec) = self.schema().and_then(|schema| schema.attr_by_name(name)) {
            self.attrs.retain(|tag| tag.code != spec.code);
        }
    }

    // ==================== Raw tag access ====================

    /// Declared attribute tags actually present, in appearance order.
    pub fn attr_tags(&self) -> &[Tag] {
        &self.attrs
    }

    /// Undeclared tags preserved for round-trip.
    pub fn extra_tags(&self) -> &[Tag] {
        &self.extra
    }

    /// Application-data blocks (102-bracketed), extension dictionary
    /// and reactors included.
    pub fn app_data(&self) -> &[AppData] {
        &self.app_data
    }

    /// Extended-data blocks by application id.
    pub fn xdata(&self) -> &[Xdata] {
        &self.xdata
    }

    /// The verbatim tag collection of a passthrough entity.
    pub fn raw_tags(&self) -> Option<&[Tag]> {
        self.raw.as_deref()
    }

    /// The extension dictionary handle, when present.
    pub fn extension_dict(&self) -> Option<Handle> {
        self.app_data
            .iter()
            .find(|block| block.app_id == "ACAD_XDICTIONARY")
            .and_then(|block| block.tags.first())
            .and_then(|tag| tag.value.as_handle())
    }

    /// Group codes whose attributes need a newer format revision than
    /// the loaded document declared. Flagged for the auditor.
    pub fn over_version_codes(&self) -> &[u16] {
        &self.over_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> Entity {
        Entity::new("LINE").unwrap()
    }

    // ==================== Construction tests ====================

    #[test]
    fn test_new_registered_type() {
        let entity = line();
        assert_eq!(entity.type_name(), "LINE");
        assert_eq!(entity.class(), EntityClass::Graphical);
        assert!(entity.is_graphical());
        assert!(!entity.is_passthrough());
        assert_eq!(entity.handle(), None);
    }

    #[test]
    fn test_new_unregistered_type_fails() {
        let err = Entity::new("ACME_WIDGET").unwrap_err();
        assert_eq!(err.kind, crate::error::DxfErrorKind::Schema);
    }

    #[test]
    fn test_new_table_entry() {
        let entity = Entity::new("LAYER").unwrap();
        assert!(entity.is_table_entry());
    }

    // ==================== Default substitution tests ====================

    #[test]
    fn test_absent_attr_yields_default() {
        let entity = line();
        assert_eq!(entity.text("layer"), Some("0".to_string()));
        assert_eq!(entity.integer("color"), Some(256));
        assert_eq!(entity.point("extrusion"), Some(Point::xyz(0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_default_substitution_deterministic() {
        // The documented default every time, not just the first time.
        let entity = Entity::new("LAYER").unwrap();
        for _ in 0..3 {
            assert_eq!(entity.integer("lineweight"), Some(-3));
        }
    }

    #[test]
    fn test_defaults_not_stored() {
        let entity = line();
        let _ = entity.integer("color");
        assert!(entity.attr_tags().is_empty());
        assert_eq!(entity.get_present("color"), None);
    }

    #[test]
    fn test_unset_default_yields_none() {
        let entity = line();
        assert_eq!(entity.get("true_color"), None);
    }

    #[test]
    fn test_undeclared_name_yields_none() {
        let entity = line();
        assert_eq!(entity.get("radius"), None);
    }

    // ==================== Set/get tests ====================

    #[test]
    fn test_set_and_get() {
        let mut entity = line();
        entity
            .set("start", TagValue::Point(Point::xyz(1.0, 2.0, 3.0)))
            .unwrap();
        assert_eq!(entity.point("start"), Some(Point::xyz(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_set_replaces_first_occurrence() {
        let mut entity = line();
        entity.set("layer", TagValue::Text("A".into())).unwrap();
        entity.set("layer", TagValue::Text("B".into())).unwrap();
        assert_eq!(entity.layer(), "B");
        assert_eq!(entity.attr_tags().len(), 1);
    }

    #[test]
    fn test_set_undeclared_fails() {
        let mut entity = line();
        let err = entity.set("radius", TagValue::Double(1.0)).unwrap_err();
        assert_eq!(err.kind, crate::error::DxfErrorKind::Schema);
    }

    #[test]
    fn test_unset_restores_default() {
        let mut entity = line();
        entity.set("color", TagValue::Integer(1)).unwrap();
        assert_eq!(entity.integer("color"), Some(1));
        entity.unset("color");
        assert_eq!(entity.integer("color"), Some(256));
    }

    #[test]
    fn test_push_repeating_attribute() {
        let mut entity = Entity::new("LWPOLYLINE").unwrap();
        entity
            .push("vertex", TagValue::Point(Point::xy(0.0, 0.0)))
            .unwrap();
        entity
            .push("vertex", TagValue::Point(Point::xy(1.0, 0.0)))
            .unwrap();
        let vertices: Vec<_> = entity.get_all("vertex").collect();
        assert_eq!(vertices.len(), 2);
    }

    #[test]
    fn test_get_all_empty_for_undeclared() {
        let entity = line();
        assert_eq!(entity.get_all("radius").count(), 0);
    }

    // ==================== Owner tests ====================

    #[test]
    fn test_set_owner() {
        let mut entity = line();
        let owner = Handle::new(0x1F).unwrap();
        entity.set_owner(Some(owner));
        assert_eq!(entity.owner(), Some(owner));
        entity.set_owner(None);
        assert_eq!(entity.owner(), None);
    }

    // ==================== Layer convenience tests ====================

    #[test]
    fn test_layer_defaults_to_zero() {
        assert_eq!(line().layer(), "0");
    }

    #[test]
    fn test_name_for_table_entry() {
        let mut entity = Entity::new("LAYER").unwrap();
        entity.set("name", TagValue::Text("Walls".into())).unwrap();
        assert_eq!(entity.name(), Some("Walls".to_string()));
    }
}

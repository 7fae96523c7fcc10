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

//! The schema registry: one descriptor per registered entity type.
//!
//! Schemas are process-wide constant tables, registered here at compile
//! time and immutable thereafter. A schema declares, per group code,
//! the attribute name, its documented default and the first format
//! revision that knows it. Types without a schema round-trip as opaque
//! passthrough entities.
//!
//! Attribute emission order on save is the declaration order below
//! (common attributes first, then type-specific ones), not in-memory
//! insertion order.

use crate::tag::{Point, TagValue};
use crate::version::DxfVersion;

/// Broad classification of registered types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntityClass {
    /// Has a spatial representation (LINE, CIRCLE, ...).
    Graphical,
    /// Non-graphical object (DICTIONARY, LAYOUT, ...).
    Object,
    /// Entry of a resource table (LAYER, LTYPE, ...).
    TableEntry,
    /// Structural record (BLOCK, ENDBLK, SEQEND).
    Structural,
}

/// The documented default of a declared attribute.
///
/// Defaults are substituted lazily on access, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    /// No default; access yields nothing when the attribute is absent.
    Unset,
    Text(&'static str),
    Integer(i64),
    Double(f64),
    Point2(f64, f64),
    Point3(f64, f64, f64),
}

impl DefaultValue {
    /// Materialize the default as a tag value.
    pub fn to_value(self) -> Option<TagValue> {
        match self {
            Self::Unset => None,
            Self::Text(s) => Some(TagValue::Text(s.to_string())),
            Self::Integer(n) => Some(TagValue::Integer(n)),
            Self::Double(f) => Some(TagValue::Double(f)),
            Self::Point2(x, y) => Some(TagValue::Point(Point::xy(x, y))),
            Self::Point3(x, y, z) => Some(TagValue::Point(Point::xyz(x, y, z))),
        }
    }
}

/// One declared attribute: group code, name, default, minimum version.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttrSpec {
    pub name: &'static str,
    pub code: u16,
    pub default: DefaultValue,
    pub min_version: DxfVersion,
}

impl AttrSpec {
    pub const fn new(name: &'static str, code: u16, default: DefaultValue) -> Self {
        Self {
            name,
            code,
            default,
            min_version: DxfVersion::R12,
        }
    }

    /// Restrict the attribute to `version` and newer.
    pub const fn since(mut self, version: DxfVersion) -> Self {
        self.min_version = version;
        self
    }
}

/// Schema descriptor for one registered type.
#[derive(Debug, Clone, Copy)]
pub struct EntitySchema {
    pub type_name: &'static str,
    pub class: EntityClass,
    /// Data subclass marker emitted for R13+ output (AcDb...).
    pub subclass: Option<&'static str>,
    /// First revision that knows this type.
    pub min_version: DxfVersion,
    /// Attributes shared with every type of the same class.
    pub common: &'static [AttrSpec],
    /// Type-specific attributes.
    pub attrs: &'static [AttrSpec],
}

impl EntitySchema {
    /// Declared attributes in emission order.
    pub fn iter_attrs(&self) -> impl Iterator<Item = &'static AttrSpec> {
        self.common.iter().chain(self.attrs.iter())
    }

    /// Look up a declared attribute by group code.
    pub fn attr_by_code(&self, code: u16) -> Option<&'static AttrSpec> {
        self.iter_attrs().find(|spec| spec.code == code)
    }

    /// Look up a declared attribute by name.
    pub fn attr_by_name(&self, name: &str) -> Option<&'static AttrSpec> {
        self.iter_attrs().find(|spec| spec.name == name)
    }
}

// ==================== Attribute value domains ====================

/// Color index meaning "inherit from block".
pub const COLOR_BYBLOCK: i64 = 0;
/// Color index meaning "inherit from layer".
pub const COLOR_BYLAYER: i64 = 256;
/// Color index meaning "entity is not plotted".
pub const COLOR_NONE: i64 = 257;

/// Lineweight sentinel meaning "inherit from layer".
pub const LINEWEIGHT_BYLAYER: i64 = -1;
/// Lineweight sentinel meaning "inherit from block".
pub const LINEWEIGHT_BYBLOCK: i64 = -2;
/// Lineweight sentinel meaning "use the application default".
pub const LINEWEIGHT_DEFAULT: i64 = -3;

/// The discrete set of valid lineweight values in 1/100 mm, sentinels
/// included. Any other value is invalid and repaired to the default.
pub const VALID_LINEWEIGHTS: &[i64] = &[
    -3, -2, -1, 0, 5, 9, 13, 15, 18, 20, 25, 30, 35, 40, 50, 53, 60, 70, 80, 90, 100, 106, 120,
    140, 158, 200, 211,
];

// ==================== Common attribute blocks ====================

const GRAPHICAL_COMMON: &[AttrSpec] = &[
    AttrSpec::new("layer", 8, DefaultValue::Text("0")),
    AttrSpec::new("linetype", 6, DefaultValue::Text("BYLAYER")),
    AttrSpec::new("color", 62, DefaultValue::Integer(COLOR_BYLAYER)),
    AttrSpec::new("lineweight", 370, DefaultValue::Integer(LINEWEIGHT_DEFAULT))
        .since(DxfVersion::R2000),
    AttrSpec::new("linetype_scale", 48, DefaultValue::Double(1.0)),
    AttrSpec::new("invisible", 60, DefaultValue::Integer(0)),
    AttrSpec::new("paperspace", 67, DefaultValue::Integer(0)),
    AttrSpec::new("true_color", 420, DefaultValue::Unset).since(DxfVersion::R2004),
    AttrSpec::new("transparency", 440, DefaultValue::Unset).since(DxfVersion::R2004),
];

const TABLE_ENTRY_COMMON: &[AttrSpec] = &[
    AttrSpec::new("name", 2, DefaultValue::Text("")),
    AttrSpec::new("flags", 70, DefaultValue::Integer(0)),
];

const NO_COMMON: &[AttrSpec] = &[];

// ==================== Graphical entity schemas ====================

const LINE_ATTRS: &[AttrSpec] = &[
    AttrSpec::new("start", 10, DefaultValue::Point3(0.0, 0.0, 0.0)),
    AttrSpec::new("end", 11, DefaultValue::Point3(0.0, 0.0, 0.0)),
    AttrSpec::new("thickness", 39, DefaultValue::Double(0.0)),
    AttrSpec::new("extrusion", 210, DefaultValue::Point3(0.0, 0.0, 1.0)),
];

const POINT_ATTRS: &[AttrSpec] = &[
    AttrSpec::new("location", 10, DefaultValue::Point3(0.0, 0.0, 0.0)),
    AttrSpec::new("thickness", 39, DefaultValue::Double(0.0)),
    AttrSpec::new("extrusion", 210, DefaultValue::Point3(0.0, 0.0, 1.0)),
];

const CIRCLE_ATTRS: &[AttrSpec] = &[
    AttrSpec::new("center", 10, DefaultValue::Point3(0.0, 0.0, 0.0)),
    AttrSpec::new("radius", 40, DefaultValue::Double(1.0)),
    AttrSpec::new("thickness", 39, DefaultValue::Double(0.0)),
    AttrSpec::new("extrusion", 210, DefaultValue::Point3(0.0, 0.0, 1.0)),
];

const ARC_ATTRS: &[AttrSpec] = &[
    AttrSpec::new("center", 10, DefaultValue::Point3(0.0, 0.0, 0.0)),
    AttrSpec::new("radius", 40, DefaultValue::Double(1.0)),
    AttrSpec::new("start_angle", 50, DefaultValue::Double(0.0)),
    AttrSpec::new("end_angle", 51, DefaultValue::Double(360.0)),
    AttrSpec::new("thickness", 39, DefaultValue::Double(0.0)),
    AttrSpec::new("extrusion", 210, DefaultValue::Point3(0.0, 0.0, 1.0)),
];

const ELLIPSE_ATTRS: &[AttrSpec] = &[
    AttrSpec::new("center", 10, DefaultValue::Point3(0.0, 0.0, 0.0)),
    AttrSpec::new("major_axis", 11, DefaultValue::Point3(1.0, 0.0, 0.0)),
    AttrSpec::new("ratio", 40, DefaultValue::Double(1.0)),
    AttrSpec::new("start_param", 41, DefaultValue::Double(0.0)),
    AttrSpec::new("end_param", 42, DefaultValue::Double(std::f64::consts::TAU)),
    AttrSpec::new("extrusion", 210, DefaultValue::Point3(0.0, 0.0, 1.0)),
];

const TEXT_ATTRS: &[AttrSpec] = &[
    AttrSpec::new("insert", 10, DefaultValue::Point3(0.0, 0.0, 0.0)),
    AttrSpec::new("height", 40, DefaultValue::Double(1.0)),
    AttrSpec::new("text", 1, DefaultValue::Text("")),
    AttrSpec::new("rotation", 50, DefaultValue::Double(0.0)),
    AttrSpec::new("width_factor", 41, DefaultValue::Double(1.0)),
    AttrSpec::new("oblique", 51, DefaultValue::Double(0.0)),
    AttrSpec::new("style", 7, DefaultValue::Text("Standard")),
    AttrSpec::new("generation_flags", 71, DefaultValue::Integer(0)),
    AttrSpec::new("halign", 72, DefaultValue::Integer(0)),
    AttrSpec::new("align_point", 11, DefaultValue::Unset),
    AttrSpec::new("valign", 73, DefaultValue::Integer(0)),
    AttrSpec::new("thickness", 39, DefaultValue::Double(0.0)),
    AttrSpec::new("extrusion", 210, DefaultValue::Point3(0.0, 0.0, 1.0)),
];

const INSERT_ATTRS: &[AttrSpec] = &[
    AttrSpec::new("name", 2, DefaultValue::Text("")),
    AttrSpec::new("insert", 10, DefaultValue::Point3(0.0, 0.0, 0.0)),
    AttrSpec::new("xscale", 41, DefaultValue::Double(1.0)),
    AttrSpec::new("yscale", 42, DefaultValue::Double(1.0)),
    AttrSpec::new("zscale", 43, DefaultValue::Double(1.0)),
    AttrSpec::new("rotation", 50, DefaultValue::Double(0.0)),
    AttrSpec::new("column_count", 70, DefaultValue::Integer(1)),
    AttrSpec::new("row_count", 71, DefaultValue::Integer(1)),
    AttrSpec::new("column_spacing", 44, DefaultValue::Double(0.0)),
    AttrSpec::new("row_spacing", 45, DefaultValue::Double(0.0)),
    AttrSpec::new("extrusion", 210, DefaultValue::Point3(0.0, 0.0, 1.0)),
];

const LWPOLYLINE_ATTRS: &[AttrSpec] = &[
    AttrSpec::new("count", 90, DefaultValue::Integer(0)),
    AttrSpec::new("flags", 70, DefaultValue::Integer(0)),
    AttrSpec::new("const_width", 43, DefaultValue::Double(0.0)),
    AttrSpec::new("elevation", 38, DefaultValue::Double(0.0)),
    AttrSpec::new("thickness", 39, DefaultValue::Double(0.0)),
    // Repeating group: one vertex per occurrence, widths and bulge
    // optionally interleaved.
    AttrSpec::new("vertex", 10, DefaultValue::Point2(0.0, 0.0)),
    AttrSpec::new("start_width", 40, DefaultValue::Double(0.0)),
    AttrSpec::new("end_width", 41, DefaultValue::Double(0.0)),
    AttrSpec::new("bulge", 42, DefaultValue::Double(0.0)),
    AttrSpec::new("extrusion", 210, DefaultValue::Point3(0.0, 0.0, 1.0)),
];

const SOLID_ATTRS: &[AttrSpec] = &[
    AttrSpec::new("corner1", 10, DefaultValue::Point3(0.0, 0.0, 0.0)),
    AttrSpec::new("corner2", 11, DefaultValue::Point3(0.0, 0.0, 0.0)),
    AttrSpec::new("corner3", 12, DefaultValue::Point3(0.0, 0.0, 0.0)),
    AttrSpec::new("corner4", 13, DefaultValue::Point3(0.0, 0.0, 0.0)),
    AttrSpec::new("thickness", 39, DefaultValue::Double(0.0)),
    AttrSpec::new("extrusion", 210, DefaultValue::Point3(0.0, 0.0, 1.0)),
];

// ==================== Table entry schemas ====================

const LAYER_ATTRS: &[AttrSpec] = &[
    AttrSpec::new("color", 62, DefaultValue::Integer(7)),
    AttrSpec::new("linetype", 6, DefaultValue::Text("Continuous")),
    AttrSpec::new("plot", 290, DefaultValue::Integer(1)).since(DxfVersion::R2000),
    AttrSpec::new("lineweight", 370, DefaultValue::Integer(LINEWEIGHT_DEFAULT))
        .since(DxfVersion::R2000),
    AttrSpec::new("plotstyle_handle", 390, DefaultValue::Unset).since(DxfVersion::R2000),
    AttrSpec::new("material_handle", 347, DefaultValue::Unset).since(DxfVersion::R2007),
];

const LTYPE_ATTRS: &[AttrSpec] = &[
    AttrSpec::new("description", 3, DefaultValue::Text("")),
    AttrSpec::new("alignment", 72, DefaultValue::Integer(65)),
    AttrSpec::new("pattern_count", 73, DefaultValue::Integer(0)),
    AttrSpec::new("pattern_length", 40, DefaultValue::Double(0.0)),
    // Repeating group: one dash length per pattern element.
    AttrSpec::new("dash_length", 49, DefaultValue::Double(0.0)),
];

const STYLE_ATTRS: &[AttrSpec] = &[
    AttrSpec::new("height", 40, DefaultValue::Double(0.0)),
    AttrSpec::new("width_factor", 41, DefaultValue::Double(1.0)),
    AttrSpec::new("oblique", 50, DefaultValue::Double(0.0)),
    AttrSpec::new("generation_flags", 71, DefaultValue::Integer(0)),
    AttrSpec::new("last_height", 42, DefaultValue::Double(2.5)),
    AttrSpec::new("font", 3, DefaultValue::Text("txt")),
    AttrSpec::new("bigfont", 4, DefaultValue::Text("")),
];

const DIMSTYLE_ATTRS: &[AttrSpec] = &[
    AttrSpec::new("dimscale", 40, DefaultValue::Double(1.0)),
    AttrSpec::new("dimasz", 41, DefaultValue::Double(2.5)),
    AttrSpec::new("dimexo", 42, DefaultValue::Double(0.625)),
    AttrSpec::new("dimexe", 44, DefaultValue::Double(1.25)),
    AttrSpec::new("dimtxt", 140, DefaultValue::Double(2.5)),
    AttrSpec::new("dimtxsty_handle", 340, DefaultValue::Unset).since(DxfVersion::R2000),
];

const APPID_ATTRS: &[AttrSpec] = &[];

const VIEW_ATTRS: &[AttrSpec] = &[
    AttrSpec::new("height", 40, DefaultValue::Double(1.0)),
    AttrSpec::new("width", 41, DefaultValue::Double(1.0)),
    AttrSpec::new("center", 10, DefaultValue::Point2(0.0, 0.0)),
    AttrSpec::new("direction", 11, DefaultValue::Point3(0.0, 0.0, 1.0)),
    AttrSpec::new("target", 12, DefaultValue::Point3(0.0, 0.0, 0.0)),
];

const VPORT_ATTRS: &[AttrSpec] = &[
    AttrSpec::new("lower_left", 10, DefaultValue::Point2(0.0, 0.0)),
    AttrSpec::new("upper_right", 11, DefaultValue::Point2(1.0, 1.0)),
    AttrSpec::new("center", 12, DefaultValue::Point2(0.0, 0.0)),
    AttrSpec::new("snap_base", 13, DefaultValue::Point2(0.0, 0.0)),
    AttrSpec::new("snap_spacing", 14, DefaultValue::Point2(10.0, 10.0)),
    AttrSpec::new("grid_spacing", 15, DefaultValue::Point2(10.0, 10.0)),
    AttrSpec::new("direction", 16, DefaultValue::Point3(0.0, 0.0, 1.0)),
    AttrSpec::new("target", 17, DefaultValue::Point3(0.0, 0.0, 0.0)),
    AttrSpec::new("height", 40, DefaultValue::Double(1.0)),
    AttrSpec::new("aspect_ratio", 41, DefaultValue::Double(1.0)),
];

const UCS_ATTRS: &[AttrSpec] = &[
    AttrSpec::new("origin", 10, DefaultValue::Point3(0.0, 0.0, 0.0)),
    AttrSpec::new("xaxis", 11, DefaultValue::Point3(1.0, 0.0, 0.0)),
    AttrSpec::new("yaxis", 12, DefaultValue::Point3(0.0, 1.0, 0.0)),
];

const BLOCK_RECORD_ATTRS: &[AttrSpec] = &[
    AttrSpec::new("layout", 340, DefaultValue::Unset),
    AttrSpec::new("units", 70, DefaultValue::Integer(0)).since(DxfVersion::R2007),
    AttrSpec::new("explodable", 280, DefaultValue::Integer(1)).since(DxfVersion::R2007),
    AttrSpec::new("scalable", 281, DefaultValue::Integer(0)).since(DxfVersion::R2007),
];

// ==================== Object schemas ====================

const DICTIONARY_ATTRS: &[AttrSpec] = &[
    AttrSpec::new("hard_owned", 280, DefaultValue::Integer(0)),
    AttrSpec::new("cloning_flags", 281, DefaultValue::Integer(1)),
    // Repeating group: entry name followed by entry handle.
    AttrSpec::new("entry_name", 3, DefaultValue::Unset),
    AttrSpec::new("entry_handle", 350, DefaultValue::Unset),
];

const LAYOUT_ATTRS: &[AttrSpec] = &[
    AttrSpec::new("name", 1, DefaultValue::Text("")),
    AttrSpec::new("flags", 70, DefaultValue::Integer(1)),
    AttrSpec::new("tab_order", 71, DefaultValue::Integer(0)),
    AttrSpec::new("min_limits", 10, DefaultValue::Point2(0.0, 0.0)),
    AttrSpec::new("max_limits", 11, DefaultValue::Point2(420.0, 297.0)),
    AttrSpec::new("insert_base", 12, DefaultValue::Point3(0.0, 0.0, 0.0)),
    AttrSpec::new("extents_min", 14, DefaultValue::Point3(0.0, 0.0, 0.0)),
    AttrSpec::new("extents_max", 15, DefaultValue::Point3(0.0, 0.0, 0.0)),
    // Second 330 in the record; the first is the owner and is split off
    // before attribute mapping.
    AttrSpec::new("block_record", 330, DefaultValue::Unset),
];

// ==================== Structural schemas ====================

const BLOCK_ATTRS: &[AttrSpec] = &[
    AttrSpec::new("layer", 8, DefaultValue::Text("0")),
    AttrSpec::new("name", 2, DefaultValue::Text("")),
    AttrSpec::new("flags", 70, DefaultValue::Integer(0)),
    AttrSpec::new("base", 10, DefaultValue::Point3(0.0, 0.0, 0.0)),
    AttrSpec::new("name2", 3, DefaultValue::Text("")),
    AttrSpec::new("xref_path", 1, DefaultValue::Text("")),
];

const ENDBLK_ATTRS: &[AttrSpec] = &[AttrSpec::new("layer", 8, DefaultValue::Text("0"))];

// ==================== Registry ====================

macro_rules! schema {
    ($name:literal, $class:expr, $subclass:expr, $common:expr, $attrs:expr) => {
        EntitySchema {
            type_name: $name,
            class: $class,
            subclass: $subclass,
            min_version: DxfVersion::R12,
            common: $common,
            attrs: $attrs,
        }
    };
    ($name:literal, $class:expr, $subclass:expr, $common:expr, $attrs:expr, $since:expr) => {
        EntitySchema {
            type_name: $name,
            class: $class,
            subclass: $subclass,
            min_version: $since,
            common: $common,
            attrs: $attrs,
        }
    };
}

static SCHEMAS: &[EntitySchema] = &[
    // Graphical entities
    schema!("LINE", EntityClass::Graphical, Some("AcDbLine"), GRAPHICAL_COMMON, LINE_ATTRS),
    schema!("POINT", EntityClass::Graphical, Some("AcDbPoint"), GRAPHICAL_COMMON, POINT_ATTRS),
    schema!("CIRCLE", EntityClass::Graphical, Some("AcDbCircle"), GRAPHICAL_COMMON, CIRCLE_ATTRS),
    schema!("ARC", EntityClass::Graphical, Some("AcDbArc"), GRAPHICAL_COMMON, ARC_ATTRS),
    schema!(
        "ELLIPSE",
        EntityClass::Graphical,
        Some("AcDbEllipse"),
        GRAPHICAL_COMMON,
        ELLIPSE_ATTRS,
        DxfVersion::R2000
    ),
    schema!("TEXT", EntityClass::Graphical, Some("AcDbText"), GRAPHICAL_COMMON, TEXT_ATTRS),
    schema!(
        "INSERT",
        EntityClass::Graphical,
        Some("AcDbBlockReference"),
        GRAPHICAL_COMMON,
        INSERT_ATTRS
    ),
    schema!(
        "LWPOLYLINE",
        EntityClass::Graphical,
        Some("AcDbPolyline"),
        GRAPHICAL_COMMON,
        LWPOLYLINE_ATTRS,
        DxfVersion::R2000
    ),
    schema!("SOLID", EntityClass::Graphical, Some("AcDbTrace"), GRAPHICAL_COMMON, SOLID_ATTRS),
    // Table entries
    schema!(
        "LAYER",
        EntityClass::TableEntry,
        Some("AcDbLayerTableRecord"),
        TABLE_ENTRY_COMMON,
        LAYER_ATTRS
    ),
    schema!(
        "LTYPE",
        EntityClass::TableEntry,
        Some("AcDbLinetypeTableRecord"),
        TABLE_ENTRY_COMMON,
        LTYPE_ATTRS
    ),
    schema!(
        "STYLE",
        EntityClass::TableEntry,
        Some("AcDbTextStyleTableRecord"),
        TABLE_ENTRY_COMMON,
        STYLE_ATTRS
    ),
    schema!(
        "DIMSTYLE",
        EntityClass::TableEntry,
        Some("AcDbDimStyleTableRecord"),
        TABLE_ENTRY_COMMON,
        DIMSTYLE_ATTRS
    ),
    schema!(
        "APPID",
        EntityClass::TableEntry,
        Some("AcDbRegAppTableRecord"),
        TABLE_ENTRY_COMMON,
        APPID_ATTRS
    ),
    schema!(
        "VIEW",
        EntityClass::TableEntry,
        Some("AcDbViewTableRecord"),
        TABLE_ENTRY_COMMON,
        VIEW_ATTRS
    ),
    schema!(
        "VPORT",
        EntityClass::TableEntry,
        Some("AcDbViewportTableRecord"),
        TABLE_ENTRY_COMMON,
        VPORT_ATTRS
    ),
    schema!(
        "UCS",
        EntityClass::TableEntry,
        Some("AcDbUCSTableRecord"),
        TABLE_ENTRY_COMMON,
        UCS_ATTRS
    ),
    schema!(
        "BLOCK_RECORD",
        EntityClass::TableEntry,
        Some("AcDbBlockTableRecord"),
        TABLE_ENTRY_COMMON,
        BLOCK_RECORD_ATTRS,
        DxfVersion::R13
    ),
    // Objects
    schema!(
        "DICTIONARY",
        EntityClass::Object,
        Some("AcDbDictionary"),
        NO_COMMON,
        DICTIONARY_ATTRS,
        DxfVersion::R13
    ),
    schema!(
        "LAYOUT",
        EntityClass::Object,
        Some("AcDbLayout"),
        NO_COMMON,
        LAYOUT_ATTRS,
        DxfVersion::R2000
    ),
    // Structural records
    schema!("BLOCK", EntityClass::Structural, Some("AcDbBlockBegin"), NO_COMMON, BLOCK_ATTRS),
    schema!("ENDBLK", EntityClass::Structural, Some("AcDbBlockEnd"), NO_COMMON, ENDBLK_ATTRS),
    schema!("SEQEND", EntityClass::Structural, None, NO_COMMON, NO_COMMON),
];

/// Look up the schema for a type name. `None` means the type is
/// unregistered and round-trips opaquely.
pub fn schema_for(type_name: &str) -> Option<&'static EntitySchema> {
    SCHEMAS.iter().find(|schema| schema.type_name == type_name)
}

/// True if the type has a registered schema.
pub fn is_registered(type_name: &str) -> bool {
    schema_for(type_name).is_some()
}

/// All registered type names.
pub fn registered_type_names() -> impl Iterator<Item = &'static str> {
    SCHEMAS.iter().map(|schema| schema.type_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Registry lookup tests ====================

    #[test]
    fn test_schema_for_known_types() {
        for name in ["LINE", "CIRCLE", "LAYER", "DICTIONARY", "BLOCK_RECORD"] {
            assert!(schema_for(name).is_some(), "{}", name);
        }
    }

    #[test]
    fn test_schema_for_unknown_type() {
        assert!(schema_for("ACME_WIDGET").is_none());
        assert!(schema_for("line").is_none()); // type names are case-sensitive
    }

    #[test]
    fn test_is_registered() {
        assert!(is_registered("LINE"));
        assert!(!is_registered("HATCH"));
    }

    #[test]
    fn test_registered_type_names_unique() {
        let names: Vec<_> = registered_type_names().collect();
        let mut deduped = names.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(names.len(), deduped.len());
    }

    // ==================== Attribute lookup tests ====================

    #[test]
    fn test_line_schema_attrs() {
        let schema = schema_for("LINE").unwrap();
        assert_eq!(schema.class, EntityClass::Graphical);
        assert_eq!(schema.attr_by_name("start").unwrap().code, 10);
        assert_eq!(schema.attr_by_name("end").unwrap().code, 11);
        assert_eq!(schema.attr_by_code(8).unwrap().name, "layer");
    }

    #[test]
    fn test_common_attrs_precede_specific() {
        let schema = schema_for("CIRCLE").unwrap();
        let names: Vec<_> = schema.iter_attrs().map(|spec| spec.name).collect();
        let layer_pos = names.iter().position(|n| *n == "layer").unwrap();
        let radius_pos = names.iter().position(|n| *n == "radius").unwrap();
        assert!(layer_pos < radius_pos);
    }

    #[test]
    fn test_layer_lineweight_default() {
        let schema = schema_for("LAYER").unwrap();
        let spec = schema.attr_by_name("lineweight").unwrap();
        assert_eq!(spec.default, DefaultValue::Integer(-3));
        assert_eq!(spec.min_version, DxfVersion::R2000);
    }

    #[test]
    fn test_graphical_color_default_is_bylayer() {
        let schema = schema_for("LINE").unwrap();
        let spec = schema.attr_by_name("color").unwrap();
        assert_eq!(spec.default, DefaultValue::Integer(COLOR_BYLAYER));
    }

    #[test]
    fn test_min_version_gates() {
        assert_eq!(schema_for("ELLIPSE").unwrap().min_version, DxfVersion::R2000);
        assert_eq!(schema_for("LINE").unwrap().min_version, DxfVersion::R12);
        let spec = schema_for("LINE").unwrap().attr_by_name("true_color").unwrap();
        assert_eq!(spec.min_version, DxfVersion::R2004);
    }

    // ==================== DefaultValue tests ====================

    #[test]
    fn test_default_value_materialization() {
        assert_eq!(DefaultValue::Unset.to_value(), None);
        assert_eq!(
            DefaultValue::Integer(256).to_value(),
            Some(TagValue::Integer(256))
        );
        assert_eq!(
            DefaultValue::Point3(0.0, 0.0, 1.0).to_value(),
            Some(TagValue::Point(Point::xyz(0.0, 0.0, 1.0)))
        );
    }

    #[test]
    fn test_default_materializes_fresh_each_time() {
        let spec = schema_for("LAYER").unwrap().attr_by_name("lineweight").unwrap();
        assert_eq!(spec.default.to_value(), spec.default.to_value());
    }

    // ==================== Lineweight domain tests ====================

    #[test]
    fn test_valid_lineweights_contains_sentinels() {
        assert!(VALID_LINEWEIGHTS.contains(&LINEWEIGHT_DEFAULT));
        assert!(VALID_LINEWEIGHTS.contains(&LINEWEIGHT_BYLAYER));
        assert!(VALID_LINEWEIGHTS.contains(&LINEWEIGHT_BYBLOCK));
        assert!(VALID_LINEWEIGHTS.contains(&211));
        assert!(!VALID_LINEWEIGHTS.contains(&42));
    }
}

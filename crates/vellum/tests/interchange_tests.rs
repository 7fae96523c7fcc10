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

//! Whole-pipeline scenarios through the facade.

use vellum::{parse, recover, write_string, Document, DxfVersion, Entity, Handle, Point, TagValue};

// ==================== Strict loading contract ====================

#[test]
fn test_strict_parse_never_returns_half_built_document() {
    // A corrupted record aborts the whole load.
    let text = "\
  0\nSECTION\n  2\nENTITIES\n\
  0\nLINE\n  5\n10\n  8\n0\n\
  0\nCIRCLE\n  5\n11\n1001\nACAD\n1002\n{\n\
  0\nENDSEC\n  0\nEOF\n";
    assert!(parse(text).is_err());
}

// ==================== Recovery tolerance ====================

#[test]
fn test_recovery_keeps_valid_entities_and_reports() {
    // One entity record carries an unterminated extended-data block;
    // recovery drops it, keeps all the others and does not raise.
    let text = "\
  0\nSECTION\n  2\nENTITIES\n\
  0\nLINE\n  5\n10\n  8\n0\n 11\n1.0\n 21\n0.0\n\
  0\nCIRCLE\n  5\n11\n  8\n0\n 40\n2.0\n1001\nACAD\n1002\n{\n\
  0\nTEXT\n  5\n12\n  8\n0\n  1\nhello\n\
  0\nENDSEC\n  0\nEOF\n";
    let (doc, report) = recover(text).unwrap();

    assert!(doc.entity(Handle::new(0x10).unwrap()).is_some());
    assert!(doc.entity(Handle::new(0x11).unwrap()).is_none());
    assert!(doc.entity(Handle::new(0x12).unwrap()).is_some());
    assert!(report
        .warnings
        .iter()
        .any(|warning| warning.message.contains("extended-data")));
}

#[test]
fn test_recovery_never_fabricates_type_names() {
    // The record with an unreadable type name is dropped and logged.
    let text = "\
  0\nSECTION\n  2\nENTITIES\n\
  0\n\n  8\n0\n\
  0\nLINE\n  5\n10\n  8\n0\n 11\n2.0\n 21\n0.0\n\
  0\nENDSEC\n  0\nEOF\n";
    let (doc, report) = recover(text).unwrap();
    assert_eq!(doc.entities_in(doc.modelspace()).len(), 1);
    assert!(report
        .warnings
        .iter()
        .any(|warning| warning.message.contains("type name")));
}

// ==================== Two-pass forward references ====================

#[test]
fn test_forward_reference_to_later_block_record() {
    // The graphical entity's owner is defined later in the stream; the
    // collect-then-resolve load still wires it correctly.
    let text = "\
  0\nSECTION\n  2\nENTITIES\n\
  0\nCIRCLE\n  5\n1A\n330\n2B\n  8\n0\n 40\n1.5\n\
  0\nENDSEC\n\
  0\nSECTION\n  2\nTABLES\n\
  0\nTABLE\n  2\nBLOCK_RECORD\n  5\n2A\n 70\n1\n\
  0\nBLOCK_RECORD\n  5\n2B\n  2\nLater\n\
  0\nENDTAB\n  0\nENDSEC\n  0\nEOF\n";
    let doc = parse(text).unwrap();
    let record = doc.block_record("Later").unwrap();
    let circle = Handle::new(0x1A).unwrap();
    assert_eq!(doc.entities_in(record), &[circle]);
    assert_eq!(doc.entity(circle).unwrap().owner(), Some(record));
}

// ==================== Full cycle: build, save, reload, audit ====================

#[test]
fn test_build_save_reload_audit_cycle() {
    let mut doc = Document::new(DxfVersion::R2000);
    doc.new_layer("Walls").unwrap();
    let block = doc.new_block("Window").unwrap();
    let mut pane = Entity::new("LINE").unwrap();
    pane.set("end", TagValue::Point(Point::xyz(0.0, 1.0, 0.0)))
        .unwrap();
    doc.add_entity_to(block, pane).unwrap();

    let mut insert = Entity::new("INSERT").unwrap();
    insert.set("name", TagValue::Text("Window".into())).unwrap();
    insert.set("layer", TagValue::Text("Walls".into())).unwrap();
    insert
        .set("insert", TagValue::Point(Point::xyz(4.0, 2.0, 0.0)))
        .unwrap();
    let insert_handle = doc.add_entity(insert).unwrap();

    let text = write_string(&doc).unwrap();
    let (reloaded, report) = recover(&text).unwrap();

    assert!(!report.audit.has_fatal_errors());
    let copy = reloaded.entity(insert_handle).unwrap();
    assert_eq!(copy.text("name").as_deref(), Some("Window"));
    assert_eq!(copy.layer(), "Walls");
    assert_eq!(copy.point("insert"), Some(Point::xyz(4.0, 2.0, 0.0)));
    let record = reloaded.block_record("Window").unwrap();
    assert_eq!(reloaded.entities_in(record).len(), 1);
}

// ==================== Streaming mode ====================

#[test]
fn test_streaming_matches_full_load_entity_set() {
    let mut doc = Document::new(DxfVersion::R2000);
    for index in 0..5 {
        let mut line = Entity::new("LINE").unwrap();
        line.set(
            "end",
            TagValue::Point(Point::xyz(index as f64, 0.0, 0.0)),
        )
        .unwrap();
        doc.add_entity(line).unwrap();
    }
    let text = write_string(&doc).unwrap();

    let streamed: Vec<_> = vellum::stream::EntityStream::new(std::io::Cursor::new(text.as_str()))
        .entities()
        .map(Result::unwrap)
        .collect();
    assert_eq!(streamed.len(), 5);
    let full = parse(&text).unwrap();
    assert_eq!(full.entities_in(full.modelspace()).len(), 5);
    for (entity, handle) in streamed.iter().zip(full.entities_in(full.modelspace())) {
        assert_eq!(entity.handle(), Some(*handle));
    }
}

// ==================== Version targeting ====================

#[test]
fn test_save_targets_exactly_one_version() {
    let doc = Document::new(DxfVersion::R2018);
    let config = vellum::write::WriteConfig::builder()
        .target_version(DxfVersion::R2004)
        .build();
    let text = vellum::write_string_with_config(&doc, &config).unwrap();
    assert!(text.contains("AC1018"));
    assert!(!text.contains("AC1032"));
    let reloaded = parse(&text).unwrap();
    assert_eq!(reloaded.version(), DxfVersion::R2004);
}

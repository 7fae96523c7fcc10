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

//! Property tests: values survive a write/read cycle bit-exactly.

use proptest::prelude::*;
use vellum_core::{load_str, Document, DxfVersion, Entity, LoadOptions, Point, Tag, TagValue};
use vellum_write::{write_document, TagWriter, WriteConfig};

/// Write a single tag and read it back through the text pipeline.
fn tag_round_trip(tag: Tag) -> Tag {
    let mut writer = TagWriter::new();
    writer.write_tag(&tag);
    let text = writer.into_string();
    let (tags, warnings) =
        vellum_core::tag::load_tags_str(&text, vellum_core::ReadMode::Strict, &Default::default())
            .unwrap();
    assert!(warnings.is_empty());
    assert_eq!(tags.len(), 1, "one tag in, one tag out");
    tags.into_iter().next().unwrap()
}

proptest! {
    // ==================== Scalar round trips ====================

    #[test]
    fn prop_double_round_trips_exactly(value in any::<f64>().prop_filter("finite", |v| v.is_finite())) {
        let tag = tag_round_trip(Tag::double(40, value));
        prop_assert_eq!(tag.value.as_f64(), Some(value));
    }

    #[test]
    fn prop_int16_round_trips(value in i16::MIN..=i16::MAX) {
        let tag = tag_round_trip(Tag::integer(70, value as i64));
        prop_assert_eq!(tag.value.as_i64(), Some(value as i64));
    }

    #[test]
    fn prop_int32_round_trips(value in i32::MIN..=i32::MAX) {
        let tag = tag_round_trip(Tag::integer(90, value as i64));
        prop_assert_eq!(tag.value.as_i64(), Some(value as i64));
    }

    #[test]
    fn prop_text_round_trips(value in "[ -~]*") {
        let tag = tag_round_trip(Tag::text(1, value.clone()));
        prop_assert_eq!(tag.value.as_str(), Some(value.as_str()));
    }

    #[test]
    fn prop_binary_round_trips(data in proptest::collection::vec(any::<u8>(), 0..64)) {
        let tag = tag_round_trip(Tag::new(310, TagValue::Binary(data.clone())));
        prop_assert_eq!(tag.value.as_bytes(), Some(data.as_slice()));
    }

    #[test]
    fn prop_point_round_trips(
        x in -1.0e9f64..1.0e9,
        y in -1.0e9f64..1.0e9,
        z in proptest::option::of(-1.0e9f64..1.0e9),
    ) {
        let point = Point { x, y, z };
        let tag = tag_round_trip(Tag::point(10, point));
        prop_assert_eq!(tag.value.as_point(), Some(point));
    }

    // ==================== Document-level round trips ====================

    #[test]
    fn prop_circle_geometry_survives_save_load(
        cx in -1.0e6f64..1.0e6,
        cy in -1.0e6f64..1.0e6,
        radius in 0.001f64..1.0e6,
    ) {
        let mut doc = Document::new(DxfVersion::R2000);
        let mut circle = Entity::new("CIRCLE").unwrap();
        circle.set("center", TagValue::Point(Point::xyz(cx, cy, 0.0))).unwrap();
        circle.set("radius", TagValue::Double(radius)).unwrap();
        let handle = doc.add_entity(circle).unwrap();

        let text = write_document(&doc, &WriteConfig::default()).unwrap();
        let (reloaded, _) = load_str(&text, &LoadOptions::default()).unwrap();
        let copy = reloaded.entity(handle).unwrap();
        prop_assert_eq!(copy.point("center"), Some(Point::xyz(cx, cy, 0.0)));
        prop_assert_eq!(copy.double("radius"), Some(radius));
    }

    #[test]
    fn prop_save_load_save_stabilizes(count in 1usize..6) {
        let mut doc = Document::new(DxfVersion::R2000);
        for index in 0..count {
            let mut line = Entity::new("LINE").unwrap();
            line.set("end", TagValue::Point(Point::xyz(index as f64 + 1.0, 0.0, 0.0))).unwrap();
            doc.add_entity(line).unwrap();
        }
        // The first cycle assigns handles to synthesized block heads;
        // from then on the output is byte-stable.
        let config = WriteConfig::default();
        let first = write_document(&doc, &config).unwrap();
        let (reloaded, _) = load_str(&first, &LoadOptions::default()).unwrap();
        let second = write_document(&reloaded, &config).unwrap();
        let (reloaded, _) = load_str(&second, &LoadOptions::default()).unwrap();
        let third = write_document(&reloaded, &config).unwrap();
        prop_assert_eq!(second, third);
    }
}

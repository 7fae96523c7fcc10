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

//! Structured records: one tag collection per logical entity.
//!
//! The compiled tag stream is segmented at code-0 tags into raw records,
//! then each record is split into handle, owner, application-data blocks
//! (code 102, brace-bracketed), extended-data blocks (code 1001 and the
//! 1000-range tags that follow), and the remaining attribute tags in
//! their original order. Attribute order is preserved because some
//! consumers parse positionally.

use crate::error::{DxfError, DxfResult, LoadWarning};
use crate::handle::Handle;
use crate::limits::Limits;
use crate::tag::{ReadMode, Tag, APP_DATA_CODE, DIMSTYLE_HANDLE_CODE, HANDLE_CODE, OWNER_CODE, XDATA_APPID_CODE};

/// A raw record: a type name and its content tags (the leading code-0
/// tag stripped).
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub type_name: String,
    pub tags: Vec<Tag>,
}

impl RawRecord {
    pub fn new(type_name: impl Into<String>, tags: Vec<Tag>) -> Self {
        Self {
            type_name: type_name.into(),
            tags,
        }
    }
}

/// Segment a compiled tag slice into records at code-0 boundaries.
///
/// Returns the tags preceding the first record (the prelude; non-empty
/// only for damaged input) and the records in stream order.
pub fn split_records(tags: Vec<Tag>) -> (Vec<Tag>, Vec<RawRecord>) {
    let mut prelude = Vec::new();
    let mut records: Vec<RawRecord> = Vec::new();
    for tag in tags {
        if tag.is_structure_tag() {
            let type_name = tag.value.as_str().unwrap_or_default().to_string();
            records.push(RawRecord::new(type_name, Vec::new()));
        } else if let Some(current) = records.last_mut() {
            current.tags.push(tag);
        } else {
            prelude.push(tag);
        }
    }
    (prelude, records)
}

/// An application-data block: `102 {APPID ... 102 }`.
#[derive(Debug, Clone, PartialEq)]
pub struct AppData {
    /// The application id (without the opening brace).
    pub app_id: String,
    /// The bracketed tags, opening and closing tags excluded.
    pub tags: Vec<Tag>,
}

/// An extended-data block: `1001 APPID` followed by 1000-range tags.
#[derive(Debug, Clone, PartialEq)]
pub struct Xdata {
    pub app_id: String,
    pub tags: Vec<Tag>,
}

/// A structured entity tag collection.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    pub type_name: String,
    pub handle: Option<Handle>,
    pub owner: Option<Handle>,
    /// Attribute tags in original order (handle, owner, app-data and
    /// xdata tags removed).
    pub attrs: Vec<Tag>,
    pub app_data: Vec<AppData>,
    pub xdata: Vec<Xdata>,
    /// Verbatim content tags, kept only when requested (opaque
    /// passthrough types).
    pub raw: Option<Vec<Tag>>,
}

impl EntityRecord {
    /// Split a raw record into its structured parts.
    ///
    /// Returns `Ok(None)` when recovery mode drops the record (damaged
    /// block structure); strict mode raises instead.
    pub fn from_raw(
        raw: RawRecord,
        mode: ReadMode,
        limits: &Limits,
        warnings: &mut Vec<LoadWarning>,
        keep_raw: bool,
    ) -> DxfResult<Option<EntityRecord>> {
        let RawRecord { type_name, tags } = raw;
        if type_name.is_empty() {
            // Never fabricate a type name: drop and log.
            match mode {
                ReadMode::Strict => {
                    return Err(DxfError::structure("record with empty type name", 0));
                }
                ReadMode::Recover => {
                    warnings.push(LoadWarning::new("dropped record with empty type name", 0));
                    return Ok(None);
                }
            }
        }

        let raw_copy = keep_raw.then(|| tags.clone());
        let handle_code = if type_name == "DIMSTYLE" {
            DIMSTYLE_HANDLE_CODE
        } else {
            HANDLE_CODE
        };

        let mut record = EntityRecord {
            type_name,
            handle: None,
            owner: None,
            attrs: Vec::new(),
            app_data: Vec::new(),
            xdata: Vec::new(),
            raw: raw_copy,
        };

        let mut iter = tags.into_iter().peekable();
        while let Some(tag) = iter.next() {
            if tag.code == APP_DATA_CODE {
                let content = tag.value.as_str().unwrap_or_default();
                if let Some(app_id) = content.strip_prefix('{') {
                    let app_id = app_id.to_string();
                    match collect_app_data(&mut iter, limits) {
                        Some(tags) => record.app_data.push(AppData { app_id, tags }),
                        None => {
                            return drop_or_fail(
                                mode,
                                warnings,
                                &record.type_name,
                                "unterminated application-data block",
                            );
                        }
                    }
                } else {
                    // Stray closing brace or malformed marker.
                    match mode {
                        ReadMode::Strict => {
                            return Err(DxfError::structure(
                                format!("unexpected application-data marker \"{}\"", content),
                                0,
                            ));
                        }
                        ReadMode::Recover => {
                            warnings.push(LoadWarning::new(
                                format!("skipped stray application-data marker \"{}\"", content),
                                0,
                            ));
                        }
                    }
                }
            } else if tag.code == XDATA_APPID_CODE {
                let app_id = tag.value.as_str().unwrap_or_default().to_string();
                let tags = collect_xdata(&mut iter, limits)?;
                if !braces_balanced(&tags) {
                    return drop_or_fail(
                        mode,
                        warnings,
                        &record.type_name,
                        "unterminated extended-data block",
                    );
                }
                record.xdata.push(Xdata { app_id, tags });
            } else if tag.code == handle_code && record.handle.is_none() {
                match tag.value.as_handle() {
                    Some(handle) => record.handle = Some(handle),
                    None => warnings.push(LoadWarning::new(
                        format!(
                            "ignored invalid handle \"{}\" on {}",
                            tag.value.as_str().unwrap_or_default(),
                            record.type_name
                        ),
                        0,
                    )),
                }
            } else if tag.code == OWNER_CODE && record.owner.is_none() {
                record.owner = tag.value.as_handle();
            } else {
                record.attrs.push(tag);
            }
        }
        Ok(Some(record))
    }

    /// True when the verbatim tag collection was kept for opaque
    /// round-trip.
    pub fn is_passthrough(&self) -> bool {
        self.raw.is_some()
    }
}

fn drop_or_fail(
    mode: ReadMode,
    warnings: &mut Vec<LoadWarning>,
    type_name: &str,
    message: &str,
) -> DxfResult<Option<EntityRecord>> {
    match mode {
        ReadMode::Strict => Err(DxfError::structure(
            format!("{} in {} record", message, type_name),
            0,
        )),
        ReadMode::Recover => {
            warnings.push(LoadWarning::new(
                format!("dropped {} record: {}", type_name, message),
                0,
            ));
            Ok(None)
        }
    }
}

/// Collect tags up to the matching `102 }`. Returns `None` when the
/// block never closes.
fn collect_app_data<I>(iter: &mut std::iter::Peekable<I>, limits: &Limits) -> Option<Vec<Tag>>
where
    I: Iterator<Item = Tag>,
{
    let mut depth = 1usize;
    let mut tags = Vec::new();
    for tag in iter.by_ref() {
        if tag.code == APP_DATA_CODE {
            let content = tag.value.as_str().unwrap_or_default();
            if content.starts_with('{') {
                depth += 1;
                if depth > limits.max_appdata_depth {
                    return None;
                }
            } else if content == "}" {
                depth -= 1;
                if depth == 0 {
                    return Some(tags);
                }
            }
        }
        tags.push(tag);
    }
    None
}

/// Collect the 1000-range tags belonging to one extended-data block.
fn collect_xdata<I>(iter: &mut std::iter::Peekable<I>, limits: &Limits) -> DxfResult<Vec<Tag>>
where
    I: Iterator<Item = Tag>,
{
    let mut tags = Vec::new();
    while let Some(tag) = iter.peek() {
        if tag.code < 1000 || tag.code == XDATA_APPID_CODE {
            break;
        }
        tags.push(iter.next().expect("peeked"));
        if tags.len() > limits.max_xdata_tags {
            return Err(DxfError::limit("extended-data block too large", 0));
        }
    }
    Ok(tags)
}

/// Control-string braces (code 1002) must balance within a block.
fn braces_balanced(tags: &[Tag]) -> bool {
    let mut depth = 0i64;
    for tag in tags {
        if tag.code == 1002 {
            match tag.value.as_str() {
                Some("{") => depth += 1,
                Some("}") => depth -= 1,
                _ => {}
            }
            if depth < 0 {
                return false;
            }
        }
    }
    depth == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::TagValue;

    fn structured(tags: Vec<Tag>) -> EntityRecord {
        let mut warnings = Vec::new();
        EntityRecord::from_raw(
            RawRecord::new("LINE", tags),
            ReadMode::Strict,
            &Limits::default(),
            &mut warnings,
            false,
        )
        .unwrap()
        .unwrap()
    }

    // ==================== split_records tests ====================

    #[test]
    fn test_split_records_basic() {
        let (prelude, records) = split_records(vec![
            Tag::text(0, "LINE"),
            Tag::text(8, "0"),
            Tag::text(0, "CIRCLE"),
            Tag::double(40, 1.0),
        ]);
        assert!(prelude.is_empty());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].type_name, "LINE");
        assert_eq!(records[0].tags, vec![Tag::text(8, "0")]);
        assert_eq!(records[1].type_name, "CIRCLE");
    }

    #[test]
    fn test_split_records_prelude() {
        let (prelude, records) = split_records(vec![Tag::text(8, "stray"), Tag::text(0, "LINE")]);
        assert_eq!(prelude.len(), 1);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_split_records_empty() {
        let (prelude, records) = split_records(vec![]);
        assert!(prelude.is_empty());
        assert!(records.is_empty());
    }

    // ==================== Handle/owner extraction tests ====================

    #[test]
    fn test_extracts_handle_and_owner() {
        let record = structured(vec![
            Tag::text(5, "1A"),
            Tag::text(330, "1F"),
            Tag::text(8, "0"),
        ]);
        assert_eq!(record.handle.unwrap().as_u64(), 0x1A);
        assert_eq!(record.owner.unwrap().as_u64(), 0x1F);
        assert_eq!(record.attrs, vec![Tag::text(8, "0")]);
    }

    #[test]
    fn test_missing_handle_is_none() {
        let record = structured(vec![Tag::text(8, "0")]);
        assert_eq!(record.handle, None);
        assert_eq!(record.owner, None);
    }

    #[test]
    fn test_invalid_handle_warns_and_continues() {
        let mut warnings = Vec::new();
        let record = EntityRecord::from_raw(
            RawRecord::new("LINE", vec![Tag::text(5, "ZZZ"), Tag::text(8, "0")]),
            ReadMode::Recover,
            &Limits::default(),
            &mut warnings,
            false,
        )
        .unwrap()
        .unwrap();
        assert_eq!(record.handle, None);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_dimstyle_handle_code_105() {
        let mut warnings = Vec::new();
        let record = EntityRecord::from_raw(
            RawRecord::new("DIMSTYLE", vec![Tag::text(105, "2C"), Tag::text(2, "Standard")]),
            ReadMode::Strict,
            &Limits::default(),
            &mut warnings,
            false,
        )
        .unwrap()
        .unwrap();
        assert_eq!(record.handle.unwrap().as_u64(), 0x2C);
    }

    #[test]
    fn test_second_owner_tag_stays_attr() {
        let record = structured(vec![Tag::text(330, "1F"), Tag::text(330, "2A")]);
        assert_eq!(record.owner.unwrap().as_u64(), 0x1F);
        assert_eq!(record.attrs, vec![Tag::text(330, "2A")]);
    }

    // ==================== App-data tests ====================

    #[test]
    fn test_app_data_block_captured() {
        let record = structured(vec![
            Tag::text(102, "{ACAD_REACTORS"),
            Tag::text(330, "D"),
            Tag::text(102, "}"),
            Tag::text(8, "0"),
        ]);
        assert_eq!(record.app_data.len(), 1);
        assert_eq!(record.app_data[0].app_id, "ACAD_REACTORS");
        assert_eq!(record.app_data[0].tags, vec![Tag::text(330, "D")]);
        // The 330 inside the block is not mistaken for the owner.
        assert_eq!(record.owner, None);
        assert_eq!(record.attrs, vec![Tag::text(8, "0")]);
    }

    #[test]
    fn test_unterminated_app_data_strict_fails() {
        let mut warnings = Vec::new();
        let result = EntityRecord::from_raw(
            RawRecord::new("LINE", vec![Tag::text(102, "{ACAD_XDICTIONARY"), Tag::text(360, "A")]),
            ReadMode::Strict,
            &Limits::default(),
            &mut warnings,
            false,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_unterminated_app_data_recover_drops_record() {
        let mut warnings = Vec::new();
        let result = EntityRecord::from_raw(
            RawRecord::new("LINE", vec![Tag::text(102, "{ACAD_XDICTIONARY"), Tag::text(360, "A")]),
            ReadMode::Recover,
            &Limits::default(),
            &mut warnings,
            false,
        )
        .unwrap();
        assert!(result.is_none());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("unterminated"));
    }

    // ==================== Xdata tests ====================

    #[test]
    fn test_xdata_block_captured() {
        let record = structured(vec![
            Tag::text(8, "0"),
            Tag::text(1001, "ACAD"),
            Tag::text(1000, "payload"),
            Tag::integer(1070, 7),
        ]);
        assert_eq!(record.xdata.len(), 1);
        assert_eq!(record.xdata[0].app_id, "ACAD");
        assert_eq!(record.xdata[0].tags.len(), 2);
        assert_eq!(record.attrs, vec![Tag::text(8, "0")]);
    }

    #[test]
    fn test_multiple_xdata_blocks() {
        let record = structured(vec![
            Tag::text(1001, "ACAD"),
            Tag::text(1000, "a"),
            Tag::text(1001, "OTHER"),
            Tag::text(1000, "b"),
        ]);
        assert_eq!(record.xdata.len(), 2);
        assert_eq!(record.xdata[1].app_id, "OTHER");
    }

    #[test]
    fn test_xdata_balanced_braces_ok() {
        let record = structured(vec![
            Tag::text(1001, "ACAD"),
            Tag::text(1002, "{"),
            Tag::text(1000, "inner"),
            Tag::text(1002, "}"),
        ]);
        assert_eq!(record.xdata[0].tags.len(), 3);
    }

    #[test]
    fn test_xdata_unbalanced_braces_recover_drops() {
        let mut warnings = Vec::new();
        let result = EntityRecord::from_raw(
            RawRecord::new(
                "LINE",
                vec![Tag::text(1001, "ACAD"), Tag::text(1002, "{"), Tag::text(1000, "x")],
            ),
            ReadMode::Recover,
            &Limits::default(),
            &mut warnings,
            false,
        )
        .unwrap();
        assert!(result.is_none());
        assert!(warnings[0].message.contains("extended-data"));
    }

    #[test]
    fn test_xdata_unbalanced_braces_strict_fails() {
        let mut warnings = Vec::new();
        let result = EntityRecord::from_raw(
            RawRecord::new("LINE", vec![Tag::text(1001, "ACAD"), Tag::text(1002, "{")]),
            ReadMode::Strict,
            &Limits::default(),
            &mut warnings,
            false,
        );
        assert!(result.is_err());
    }

    // ==================== Type name tests ====================

    #[test]
    fn test_empty_type_name_recover_drops() {
        let mut warnings = Vec::new();
        let result = EntityRecord::from_raw(
            RawRecord::new("", vec![Tag::text(8, "0")]),
            ReadMode::Recover,
            &Limits::default(),
            &mut warnings,
            false,
        )
        .unwrap();
        assert!(result.is_none());
        assert_eq!(warnings.len(), 1);
    }

    // ==================== Raw preservation tests ====================

    #[test]
    fn test_keep_raw_preserves_verbatim() {
        let tags = vec![
            Tag::text(5, "1A"),
            Tag::text(8, "0"),
            Tag::new(90, TagValue::Integer(3)),
        ];
        let mut warnings = Vec::new();
        let record = EntityRecord::from_raw(
            RawRecord::new("WEIRDTYPE", tags.clone()),
            ReadMode::Strict,
            &Limits::default(),
            &mut warnings,
            true,
        )
        .unwrap()
        .unwrap();
        assert!(record.is_passthrough());
        assert_eq!(record.raw.as_deref(), Some(&tags[..]));
        // Handle is still extracted so the database can key the entity.
        assert_eq!(record.handle.unwrap().as_u64(), 0x1A);
    }
}

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

//! Low-level tag stream layer.
//!
//! - [`types`]: tag/value types and the group-code classification table
//! - [`reader`]: lazy text loader (two-line code/value pairs)
//! - [`binary`]: lazy binary loader (sentinel + packed tags)
//! - [`compiler`]: point composition over either loader
//!
//! Both loaders are purely functional transformations of bytes to tags;
//! they never touch anything beyond their input cursor.

pub mod binary;
pub mod compiler;
pub mod reader;
pub mod types;

pub use binary::{is_binary, BinaryTagLoader, BINARY_SENTINEL};
pub use compiler::TagCompiler;
pub use reader::TextTagLoader;
pub use types::{
    coerce_value, encode_hex, is_binary_code, is_handle_code, is_point_start_code, value_kind,
    Point, Tag, TagValue, ValueKind, APP_DATA_CODE, COMMENT_CODE, DIMSTYLE_HANDLE_CODE,
    HANDLE_CODE, MAX_GROUP_CODE, OWNER_CODE, STRUCTURE_CODE, SUBCLASS_CODE, XDATA_APPID_CODE,
};

use crate::error::{DxfError, DxfResult, LoadWarning};
use crate::limits::Limits;

/// Tokenization error policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    /// Any structural damage aborts the whole load.
    #[default]
    Strict,
    /// Localized damage is skipped and collected as warnings.
    Recover,
}

/// Load and compile all tags from text input.
pub fn load_tags_str(
    input: &str,
    mode: ReadMode,
    limits: &Limits,
) -> DxfResult<(Vec<Tag>, Vec<LoadWarning>)> {
    if input.len() > limits.max_input_size {
        return Err(DxfError::limit("input exceeds maximum size", 0));
    }
    let loader = TextTagLoader::new(input, mode, limits.clone());
    collect_compiled(loader, mode)
}

/// Load and compile all tags from raw bytes, sniffing the binary
/// sentinel. Text input must be valid UTF-8 in strict mode; recovery
/// mode substitutes the replacement character and records a warning.
pub fn load_tags_bytes(
    data: &[u8],
    mode: ReadMode,
    limits: &Limits,
) -> DxfResult<(Vec<Tag>, Vec<LoadWarning>)> {
    if data.len() > limits.max_input_size {
        return Err(DxfError::limit("input exceeds maximum size", 0));
    }
    if is_binary(data) {
        let loader = BinaryTagLoader::new(data, mode, limits.clone())?;
        return collect_compiled(loader, mode);
    }
    match std::str::from_utf8(data) {
        Ok(text) => load_tags_str(text, mode, limits),
        Err(err) => match mode {
            ReadMode::Strict => Err(DxfError::structure(
                format!("input is not valid UTF-8 at byte {}", err.valid_up_to()),
                0,
            )),
            ReadMode::Recover => {
                let text = String::from_utf8_lossy(data);
                let (tags, mut warnings) = load_tags_str(&text, mode, limits)?;
                warnings.insert(
                    0,
                    LoadWarning::new("input is not valid UTF-8, decoded lossily", 0),
                );
                Ok((tags, warnings))
            }
        },
    }
}

fn collect_compiled<I>(loader: I, mode: ReadMode) -> DxfResult<(Vec<Tag>, Vec<LoadWarning>)>
where
    I: Iterator<Item = DxfResult<Tag>> + TagWarnings,
{
    let mut compiler = TagCompiler::new(loader, mode);
    let mut tags = Vec::new();
    for item in compiler.by_ref() {
        tags.push(item?);
    }
    let compiler_warnings = compiler.take_warnings();
    let mut loader = compiler.into_inner();
    // Loader warnings come first: they were detected earlier in the
    // stream than any composition issue that follows them.
    let mut all = loader.take_warnings();
    all.extend(compiler_warnings);
    Ok((tags, all))
}

/// Access to the warning list of a loader, so the compiled pipeline can
/// drain both layers.
pub trait TagWarnings {
    fn take_warnings(&mut self) -> Vec<LoadWarning>;
}

impl TagWarnings for TextTagLoader<'_> {
    fn take_warnings(&mut self) -> Vec<LoadWarning> {
        TextTagLoader::take_warnings(self)
    }
}

impl TagWarnings for BinaryTagLoader<'_> {
    fn take_warnings(&mut self) -> Vec<LoadWarning> {
        BinaryTagLoader::take_warnings(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== load_tags_str tests ====================

    #[test]
    fn test_load_tags_str_compiles_points() {
        let input = "0\nLINE\n10\n0.0\n20\n0.0\n30\n0.0\n";
        let (tags, warnings) = load_tags_str(input, ReadMode::Strict, &Limits::default()).unwrap();
        assert_eq!(tags.len(), 2);
        assert!(matches!(tags[1].value, TagValue::Point(_)));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_load_tags_str_input_size_limit() {
        let mut limits = Limits::default();
        limits.max_input_size = 4;
        let err = load_tags_str("0\nEOF\n", ReadMode::Strict, &limits).unwrap_err();
        assert_eq!(err.kind, crate::error::DxfErrorKind::Limit);
    }

    // ==================== load_tags_bytes tests ====================

    #[test]
    fn test_load_tags_bytes_sniffs_text() {
        let (tags, _) =
            load_tags_bytes(b"0\nEOF\n", ReadMode::Strict, &Limits::default()).unwrap();
        assert_eq!(tags, vec![Tag::text(0, "EOF")]);
    }

    #[test]
    fn test_load_tags_bytes_sniffs_binary() {
        let mut data = BINARY_SENTINEL.to_vec();
        data.push(0);
        data.extend_from_slice(b"EOF\0");
        let (tags, _) = load_tags_bytes(&data, ReadMode::Strict, &Limits::default()).unwrap();
        assert_eq!(tags, vec![Tag::text(0, "EOF")]);
    }

    #[test]
    fn test_load_tags_bytes_invalid_utf8_strict() {
        let err =
            load_tags_bytes(b"0\n\xFF\xFE\n", ReadMode::Strict, &Limits::default()).unwrap_err();
        assert_eq!(err.kind, crate::error::DxfErrorKind::Structure);
    }

    #[test]
    fn test_load_tags_bytes_invalid_utf8_recover() {
        let (tags, warnings) =
            load_tags_bytes(b"1\n\xFF\xFE\n0\nEOF\n", ReadMode::Recover, &Limits::default())
                .unwrap();
        assert_eq!(tags.len(), 2);
        assert!(warnings[0].message.contains("UTF-8"));
    }

    // ==================== Warning ordering tests ====================

    #[test]
    fn test_loader_warnings_precede_compiler_warnings() {
        // Invalid value first (loader warning), then a lone x ordinate
        // (compiler warning).
        let input = "70\nbad\n10\n1.0\n0\nEOF\n";
        let (tags, warnings) =
            load_tags_str(input, ReadMode::Recover, &Limits::default()).unwrap();
        assert_eq!(tags, vec![Tag::text(0, "EOF")]);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].message.contains("invalid integer"));
        assert!(warnings[1].message.contains("missing y"));
    }
}

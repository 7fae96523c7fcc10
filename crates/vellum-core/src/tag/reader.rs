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

//! Text tag loader.
//!
//! Reads the line-oriented text format two lines at a time: an integer
//! group code line, then a value line. The loader is lazy, forward-only
//! and single-pass. In recovery mode it skips malformed pairs, records a
//! warning for each, and resynchronizes at the next `0` code line.

use super::types::{coerce_value, Tag, COMMENT_CODE, MAX_GROUP_CODE, STRUCTURE_CODE};
use super::ReadMode;
use crate::error::{DxfError, DxfResult, LoadWarning};
use crate::limits::Limits;

/// Lazy iterator of tags over text input.
pub struct TextTagLoader<'a> {
    lines: std::str::Lines<'a>,
    line_no: usize,
    mode: ReadMode,
    limits: Limits,
    warnings: Vec<LoadWarning>,
    tags_read: usize,
    done: bool,
}

impl<'a> TextTagLoader<'a> {
    /// Create a loader over `input`.
    pub fn new(input: &'a str, mode: ReadMode, limits: Limits) -> Self {
        Self {
            lines: input.lines(),
            line_no: 0,
            mode,
            limits,
            warnings: Vec::new(),
            tags_read: 0,
            done: false,
        }
    }

    /// Warnings collected so far (recovery mode only).
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    /// Drain the collected warnings.
    pub fn take_warnings(&mut self) -> Vec<LoadWarning> {
        std::mem::take(&mut self.warnings)
    }

    fn next_line(&mut self) -> Option<&'a str> {
        let line = self.lines.next()?;
        self.line_no += 1;
        Some(line.strip_suffix('\r').unwrap_or(line))
    }

    fn fail(&mut self, err: DxfError) -> Option<DxfResult<Tag>> {
        self.done = true;
        Some(Err(err))
    }

    /// Skip forward to the next line that is exactly "0", then continue
    /// reading pairs from there. Never fabricates type names: if no
    /// resync point exists the stream simply ends.
    fn resync(&mut self) -> Option<u16> {
        while let Some(line) = self.next_line() {
            if line.trim() == "0" {
                return Some(STRUCTURE_CODE);
            }
        }
        None
    }
}

impl<'a> Iterator for TextTagLoader<'a> {
    type Item = DxfResult<Tag>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let code_line = self.next_line()?;
            let code_line_no = self.line_no;
            if code_line.len() > self.limits.max_line_length {
                return self.fail(DxfError::limit("line too long", code_line_no));
            }

            let code = match code_line.trim().parse::<u16>() {
                Ok(code) if code <= MAX_GROUP_CODE => code,
                _ => match self.mode {
                    ReadMode::Strict => {
                        return self.fail(DxfError::structure(
                            format!("invalid group code \"{}\"", code_line.trim()),
                            code_line_no,
                        ));
                    }
                    ReadMode::Recover => {
                        self.warnings.push(LoadWarning::new(
                            format!("skipped invalid group code \"{}\"", code_line.trim()),
                            code_line_no,
                        ));
                        match self.resync() {
                            Some(code) => code,
                            None => return None,
                        }
                    }
                },
            };

            let value_line = match self.next_line() {
                Some(line) => line,
                None => match self.mode {
                    ReadMode::Strict => {
                        return self.fail(DxfError::structure(
                            "premature end of stream after group code",
                            code_line_no,
                        ));
                    }
                    ReadMode::Recover => {
                        self.warnings.push(LoadWarning::new(
                            "premature end of stream after group code",
                            code_line_no,
                        ));
                        return None;
                    }
                },
            };
            if value_line.len() > self.limits.max_line_length {
                return self.fail(DxfError::limit("line too long", self.line_no));
            }

            if code == COMMENT_CODE {
                continue;
            }

            self.tags_read += 1;
            if self.tags_read > self.limits.max_tags {
                return self.fail(DxfError::limit("too many tags", self.line_no));
            }

            // Type names are the only values the format defines as
            // whitespace-insensitive.
            let raw = if code == STRUCTURE_CODE {
                value_line.trim()
            } else {
                value_line
            };

            match coerce_value(code, raw, self.line_no) {
                Ok(value) => return Some(Ok(Tag::new(code, value))),
                Err(err) => match self.mode {
                    ReadMode::Strict => return self.fail(err),
                    ReadMode::Recover => {
                        self.warnings
                            .push(LoadWarning::new(err.message.clone(), err.line));
                        continue;
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DxfErrorKind;

    fn strict(input: &str) -> TextTagLoader<'_> {
        TextTagLoader::new(input, ReadMode::Strict, Limits::default())
    }

    fn recover(input: &str) -> TextTagLoader<'_> {
        TextTagLoader::new(input, ReadMode::Recover, Limits::default())
    }

    // ==================== Basic reading tests ====================

    #[test]
    fn test_reads_code_value_pairs() {
        let tags: Vec<_> = strict("0\nLINE\n8\nWalls\n")
            .collect::<DxfResult<_>>()
            .unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0], Tag::text(0, "LINE"));
        assert_eq!(tags[1], Tag::text(8, "Walls"));
    }

    #[test]
    fn test_coerces_by_group_code() {
        let tags: Vec<_> = strict("70\n6\n40\n1.5\n")
            .collect::<DxfResult<_>>()
            .unwrap();
        assert_eq!(tags[0].value.as_i64(), Some(6));
        assert_eq!(tags[1].value.as_f64(), Some(1.5));
    }

    #[test]
    fn test_type_name_is_trimmed() {
        let tags: Vec<_> = strict("0\n  LINE  \n").collect::<DxfResult<_>>().unwrap();
        assert_eq!(tags[0].value.as_str(), Some("LINE"));
    }

    #[test]
    fn test_other_text_preserved_verbatim() {
        let tags: Vec<_> = strict("1\n  padded text \n")
            .collect::<DxfResult<_>>()
            .unwrap();
        assert_eq!(tags[0].value.as_str(), Some("  padded text "));
    }

    #[test]
    fn test_crlf_line_endings() {
        let tags: Vec<_> = strict("0\r\nLINE\r\n").collect::<DxfResult<_>>().unwrap();
        assert_eq!(tags[0].value.as_str(), Some("LINE"));
    }

    #[test]
    fn test_comments_skipped() {
        let tags: Vec<_> = strict("999\na comment\n0\nLINE\n")
            .collect::<DxfResult<_>>()
            .unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].value.as_str(), Some("LINE"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(strict("").count(), 0);
    }

    // ==================== Strict mode error tests ====================

    #[test]
    fn test_strict_invalid_group_code() {
        let result: DxfResult<Vec<_>> = strict("XX\nvalue\n").collect();
        let err = result.unwrap_err();
        assert_eq!(err.kind, DxfErrorKind::Structure);
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_strict_group_code_out_of_range() {
        let result: DxfResult<Vec<_>> = strict("1072\nvalue\n").collect();
        assert!(result.is_err());
    }

    #[test]
    fn test_strict_premature_eof() {
        let result: DxfResult<Vec<_>> = strict("0\nLINE\n8\n").collect();
        let err = result.unwrap_err();
        assert_eq!(err.kind, DxfErrorKind::Structure);
        assert!(err.message.contains("premature end"));
    }

    #[test]
    fn test_strict_invalid_value() {
        let result: DxfResult<Vec<_>> = strict("70\nnot-an-int\n").collect();
        assert!(result.is_err());
    }

    #[test]
    fn test_strict_stops_after_error() {
        let mut loader = strict("XX\nvalue\n0\nLINE\n");
        assert!(loader.next().unwrap().is_err());
        assert!(loader.next().is_none());
    }

    // ==================== Recovery mode tests ====================

    #[test]
    fn test_recover_skips_bad_code_and_resyncs() {
        let mut loader = recover("XX\njunk\ngarbage\n0\nLINE\n8\nWalls\n");
        let tags: Vec<_> = loader.by_ref().map(Result::unwrap).collect();
        // Resynchronized at the "0" line; the 0/LINE pair survives.
        assert_eq!(tags[0], Tag::text(0, "LINE"));
        assert_eq!(tags[1], Tag::text(8, "Walls"));
        assert_eq!(loader.warnings().len(), 1);
    }

    #[test]
    fn test_recover_skips_bad_value() {
        let mut loader = recover("70\nnot-an-int\n0\nLINE\n");
        let tags: Vec<_> = loader.by_ref().map(Result::unwrap).collect();
        assert_eq!(tags.len(), 1);
        assert_eq!(loader.warnings().len(), 1);
    }

    #[test]
    fn test_recover_premature_eof_is_warning() {
        let mut loader = recover("0\nLINE\n8\n");
        let tags: Vec<_> = loader.by_ref().map(Result::unwrap).collect();
        assert_eq!(tags.len(), 1);
        assert_eq!(loader.warnings().len(), 1);
    }

    #[test]
    fn test_recover_no_resync_point_ends_stream() {
        let mut loader = recover("XX\njunk\nmore\njunk\n");
        assert_eq!(loader.by_ref().count(), 0);
        assert_eq!(loader.warnings().len(), 1);
    }

    #[test]
    fn test_take_warnings_drains() {
        let mut loader = recover("XX\njunk\n");
        let _: Vec<_> = loader.by_ref().collect();
        assert_eq!(loader.take_warnings().len(), 1);
        assert!(loader.warnings().is_empty());
    }

    // ==================== Limit tests ====================

    #[test]
    fn test_max_tags_limit() {
        let mut limits = Limits::default();
        limits.max_tags = 2;
        let result: DxfResult<Vec<_>> = TextTagLoader::new(
            "1\na\n1\nb\n1\nc\n",
            ReadMode::Strict,
            limits,
        )
        .collect();
        let err = result.unwrap_err();
        assert_eq!(err.kind, DxfErrorKind::Limit);
    }

    #[test]
    fn test_max_line_length_limit() {
        let mut limits = Limits::default();
        limits.max_line_length = 8;
        let long = format!("1\n{}\n", "x".repeat(64));
        let result: DxfResult<Vec<_>> =
            TextTagLoader::new(&long, ReadMode::Strict, limits).collect();
        assert_eq!(result.unwrap_err().kind, DxfErrorKind::Limit);
    }
}

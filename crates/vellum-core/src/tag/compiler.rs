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

//! Tag compiler: point composition.
//!
//! Coordinates are stored as separate ordinate tags at a fixed offset
//! from a base code (x at `base`, y at `base + 10`, z at `base + 20`).
//! The compiler folds such runs into a single [`TagValue::Point`] tag.
//! The z ordinate is optional; its absence marks a 2D point. Strict mode
//! requires the documented x, y[, z] order; recovery mode accepts the
//! ordinates in any order and treats a missing y as a localized error
//! that drops only the point, not the record.

use super::types::{is_point_start_code, Point, Tag, TagValue};
use super::ReadMode;
use crate::error::{DxfError, DxfResult, LoadWarning};

/// Iterator adapter compiling ordinate runs into point tags.
pub struct TagCompiler<I>
where
    I: Iterator<Item = DxfResult<Tag>>,
{
    inner: I,
    pending: Option<Tag>,
    mode: ReadMode,
    warnings: Vec<LoadWarning>,
    // Approximate text line, advanced two lines per tag like the
    // original two-line wire format.
    line: usize,
}

impl<I> TagCompiler<I>
where
    I: Iterator<Item = DxfResult<Tag>>,
{
    /// Wrap a raw tag iterator.
    pub fn new(inner: I, mode: ReadMode) -> Self {
        Self {
            inner,
            pending: None,
            mode,
            warnings: Vec::new(),
            line: 0,
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

    /// Unwrap the compiler, returning the inner iterator.
    pub fn into_inner(self) -> I {
        self.inner
    }

    fn pull(&mut self) -> Option<DxfResult<Tag>> {
        if let Some(tag) = self.pending.take() {
            return Some(Ok(tag));
        }
        let item = self.inner.next()?;
        self.line += 2;
        Some(item)
    }

    /// Strict composition: y must immediately follow with `base + 10`,
    /// z may follow with `base + 20`; any other tag is pushed back.
    fn compile_point_strict(&mut self, x: f64, base: u16) -> DxfResult<Tag> {
        let y_tag = match self.pull() {
            Some(Ok(tag)) => tag,
            Some(Err(err)) => return Err(err),
            None => {
                return Err(DxfError::structure(
                    format!("missing required y coordinate near line {}", self.line),
                    self.line,
                ));
            }
        };
        if y_tag.code != base + 10 {
            return Err(DxfError::structure(
                format!("missing required y coordinate near line {}", self.line),
                self.line,
            ));
        }
        let y = y_tag.value.as_f64().unwrap_or_default();

        match self.pull() {
            Some(Ok(tag)) if tag.code == base + 20 => {
                let z = tag.value.as_f64().unwrap_or_default();
                Ok(Tag::point(base, Point::xyz(x, y, z)))
            }
            Some(Ok(tag)) => {
                self.pending = Some(tag);
                Ok(Tag::point(base, Point::xy(x, y)))
            }
            Some(Err(err)) => Err(err),
            None => Ok(Tag::point(base, Point::xy(x, y))),
        }
    }

    /// Recovery composition: collect y and z in any order; a missing y
    /// drops the point with a warning and leaves the stream aligned.
    /// Limit errors from the underlying loader still propagate.
    fn compile_point_recover(&mut self, x: f64, base: u16) -> DxfResult<Option<Tag>> {
        let mut y: Option<f64> = None;
        let mut z: Option<f64> = None;
        loop {
            match self.pull() {
                Some(Ok(tag)) if tag.code == base + 10 && y.is_none() => {
                    y = tag.value.as_f64();
                }
                Some(Ok(tag)) if tag.code == base + 20 && z.is_none() => {
                    z = tag.value.as_f64();
                }
                Some(Ok(tag)) => {
                    self.pending = Some(tag);
                    break;
                }
                Some(Err(err)) => return Err(err),
                None => break,
            }
        }
        match (y, z) {
            (Some(y), Some(z)) => Ok(Some(Tag::point(base, Point::xyz(x, y, z)))),
            (Some(y), None) => Ok(Some(Tag::point(base, Point::xy(x, y)))),
            (None, _) => {
                self.warnings.push(LoadWarning::new(
                    format!("malformed point for code {}, missing y ordinate", base),
                    self.line,
                ));
                Ok(None)
            }
        }
    }
}

impl<I> Iterator for TagCompiler<I>
where
    I: Iterator<Item = DxfResult<Tag>>,
{
    type Item = DxfResult<Tag>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let tag = match self.pull()? {
                Ok(tag) => tag,
                Err(err) => return Some(Err(err)),
            };
            if is_point_start_code(tag.code) {
                if let TagValue::Double(x) = tag.value {
                    match self.mode {
                        ReadMode::Strict => {
                            return Some(self.compile_point_strict(x, tag.code));
                        }
                        ReadMode::Recover => match self.compile_point_recover(x, tag.code) {
                            Ok(Some(point_tag)) => return Some(Ok(point_tag)),
                            Ok(None) => continue,
                            Err(err) => return Some(Err(err)),
                        },
                    }
                }
            }
            return Some(Ok(tag));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(tags: Vec<Tag>, mode: ReadMode) -> (Vec<Tag>, Vec<LoadWarning>) {
        let mut compiler = TagCompiler::new(tags.into_iter().map(Ok), mode);
        let compiled: Vec<_> = compiler.by_ref().map(Result::unwrap).collect();
        let warnings = compiler.take_warnings();
        (compiled, warnings)
    }

    fn compile_strict(tags: Vec<Tag>) -> DxfResult<Vec<Tag>> {
        TagCompiler::new(tags.into_iter().map(Ok), ReadMode::Strict).collect()
    }

    // ==================== Strict composition tests ====================

    #[test]
    fn test_compiles_3d_point() {
        let tags = compile_strict(vec![
            Tag::double(10, 1.0),
            Tag::double(20, 2.0),
            Tag::double(30, 3.0),
        ])
        .unwrap();
        assert_eq!(tags, vec![Tag::point(10, Point::xyz(1.0, 2.0, 3.0))]);
    }

    #[test]
    fn test_compiles_2d_point() {
        let tags = compile_strict(vec![
            Tag::double(10, 1.0),
            Tag::double(20, 2.0),
            Tag::integer(70, 0),
        ])
        .unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0], Tag::point(10, Point::xy(1.0, 2.0)));
        assert_eq!(tags[1], Tag::integer(70, 0));
    }

    #[test]
    fn test_compiles_2d_point_at_end_of_stream() {
        let tags = compile_strict(vec![Tag::double(11, 5.0), Tag::double(21, 6.0)]).unwrap();
        assert_eq!(tags, vec![Tag::point(11, Point::xy(5.0, 6.0))]);
    }

    #[test]
    fn test_multiple_points() {
        let tags = compile_strict(vec![
            Tag::double(10, 0.0),
            Tag::double(20, 0.0),
            Tag::double(30, 0.0),
            Tag::double(11, 10.0),
            Tag::double(21, 0.0),
            Tag::double(31, 0.0),
        ])
        .unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].code, 10);
        assert_eq!(tags[1].code, 11);
    }

    #[test]
    fn test_strict_missing_y_is_error() {
        let result = compile_strict(vec![Tag::double(10, 1.0), Tag::integer(70, 0)]);
        let err = result.unwrap_err();
        assert_eq!(err.kind, crate::error::DxfErrorKind::Structure);
        assert!(err.message.contains("y coordinate"));
    }

    #[test]
    fn test_strict_missing_y_at_eof_is_error() {
        assert!(compile_strict(vec![Tag::double(10, 1.0)]).is_err());
    }

    #[test]
    fn test_non_point_codes_pass_through() {
        let input = vec![Tag::text(0, "LINE"), Tag::double(40, 1.5), Tag::integer(70, 2)];
        let tags = compile_strict(input.clone()).unwrap();
        assert_eq!(tags, input);
    }

    #[test]
    fn test_xdata_point_codes() {
        let tags = compile_strict(vec![
            Tag::double(1010, 1.0),
            Tag::double(1020, 2.0),
            Tag::double(1030, 3.0),
        ])
        .unwrap();
        assert_eq!(tags, vec![Tag::point(1010, Point::xyz(1.0, 2.0, 3.0))]);
    }

    // ==================== Recovery composition tests ====================

    #[test]
    fn test_recover_out_of_order_ordinates() {
        let (tags, warnings) = compile(
            vec![
                Tag::double(10, 1.0),
                Tag::double(30, 3.0),
                Tag::double(20, 2.0),
            ],
            ReadMode::Recover,
        );
        assert_eq!(tags, vec![Tag::point(10, Point::xyz(1.0, 2.0, 3.0))]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_recover_missing_z_defaults_2d() {
        let (tags, _) = compile(
            vec![Tag::double(10, 1.0), Tag::double(20, 2.0), Tag::text(8, "0")],
            ReadMode::Recover,
        );
        assert_eq!(tags[0], Tag::point(10, Point::xy(1.0, 2.0)));
        assert_eq!(tags[0].value.as_point().unwrap().z_or_zero(), 0.0);
    }

    #[test]
    fn test_recover_missing_y_drops_point_keeps_record() {
        let (tags, warnings) = compile(
            vec![Tag::double(10, 1.0), Tag::integer(70, 4)],
            ReadMode::Recover,
        );
        assert_eq!(tags, vec![Tag::integer(70, 4)]);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("missing y"));
    }

    #[test]
    fn test_recover_never_fabricates_beyond_point() {
        // The following record tags survive untouched.
        let (tags, _) = compile(
            vec![
                Tag::double(10, 1.0),
                Tag::text(0, "CIRCLE"),
                Tag::double(40, 2.0),
            ],
            ReadMode::Recover,
        );
        assert_eq!(tags, vec![Tag::text(0, "CIRCLE"), Tag::double(40, 2.0)]);
    }

    // ==================== Error propagation tests ====================

    #[test]
    fn test_propagates_inner_error() {
        let items: Vec<DxfResult<Tag>> = vec![
            Ok(Tag::text(0, "LINE")),
            Err(DxfError::structure("boom", 3)),
        ];
        let result: DxfResult<Vec<_>> =
            TagCompiler::new(items.into_iter(), ReadMode::Strict).collect();
        assert!(result.is_err());
    }
}

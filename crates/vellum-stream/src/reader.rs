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

//! Incremental tag reading over any buffered reader.
//!
//! Unlike the in-memory text loader, this reader pulls two lines at a
//! time from an [`std::io::BufRead`] source, so arbitrarily large
//! inputs stream through constant memory.

use std::io::BufRead;
use vellum_core::tag::{coerce_value, Tag, COMMENT_CODE, MAX_GROUP_CODE, STRUCTURE_CODE};
use vellum_core::{DxfError, DxfResult, Limits, LoadWarning, ReadMode};

/// Lazy tag iterator over a buffered reader.
pub struct StreamTagReader<R: BufRead> {
    reader: R,
    line_no: usize,
    mode: ReadMode,
    limits: Limits,
    warnings: Vec<LoadWarning>,
    tags_read: usize,
    done: bool,
}

impl<R: BufRead> StreamTagReader<R> {
    pub fn new(reader: R, mode: ReadMode, limits: Limits) -> Self {
        Self {
            reader,
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

    fn next_line(&mut self) -> DxfResult<Option<String>> {
        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .map_err(|err| DxfError::io(format!("read error: {}", err)))?;
        if read == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        if line.len() > self.limits.max_line_length {
            return Err(DxfError::limit("line too long", self.line_no));
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    fn fail(&mut self, err: DxfError) -> Option<DxfResult<Tag>> {
        self.done = true;
        Some(Err(err))
    }

    fn resync(&mut self) -> DxfResult<bool> {
        loop {
            match self.next_line()? {
                Some(line) if line.trim() == "0" => return Ok(true),
                Some(_) => continue,
                None => return Ok(false),
            }
        }
    }
}

impl<R: BufRead> Iterator for StreamTagReader<R> {
    type Item = DxfResult<Tag>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let code_line = match self.next_line() {
                Ok(Some(line)) => line,
                Ok(None) => return None,
                Err(err) => return self.fail(err),
            };
            let code_line_no = self.line_no;

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
                            Ok(true) => STRUCTURE_CODE,
                            Ok(false) => return None,
                            Err(err) => return self.fail(err),
                        }
                    }
                },
            };

            let value_line = match self.next_line() {
                Ok(Some(line)) => line,
                Ok(None) => match self.mode {
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
                Err(err) => return self.fail(err),
            };

            if code == COMMENT_CODE {
                continue;
            }
            self.tags_read += 1;
            if self.tags_read > self.limits.max_tags {
                return self.fail(DxfError::limit("too many tags", self.line_no));
            }

            let raw = if code == STRUCTURE_CODE {
                value_line.trim()
            } else {
                value_line.as_str()
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

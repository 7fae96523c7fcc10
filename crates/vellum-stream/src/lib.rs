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

//! Streaming entity reader.
//!
//! Iterates a tag stream one entity at a time without building the
//! in-memory document graph. This is the degraded-capability mode for
//! inputs too large to hold in memory: handle-valued attributes stay
//! raw because the second resolution pass never runs, and there is no
//! audit. For everything else use the full loader in `vellum-core`.
//!
//! # Quick Start
//!
//! ```rust
//! use std::io::Cursor;
//! use vellum_stream::EntityStream;
//!
//! let text = "0\nSECTION\n2\nENTITIES\n0\nLINE\n8\nWalls\n0\nENDSEC\n0\nEOF\n";
//! let stream = EntityStream::new(Cursor::new(text));
//! for entity in stream.entities() {
//!     let entity = entity.unwrap();
//!     assert_eq!(entity.type_name(), "LINE");
//! }
//! ```

mod event;
mod reader;

pub use event::StreamEvent;
pub use reader::StreamTagReader;

use std::collections::VecDeque;
use std::io::BufRead;
use vellum_core::tag::TagCompiler;
use vellum_core::{
    entity_from_record, DxfResult, DxfVersion, Entity, EntityRecord, Limits, LoadWarning,
    RawRecord, ReadMode, Tag,
};

/// Forward-only, single-pass event stream over a buffered reader.
pub struct EntityStream<R: BufRead> {
    tags: TagCompiler<StreamTagReader<R>>,
    mode: ReadMode,
    limits: Limits,
    version: DxfVersion,
    warnings: Vec<LoadWarning>,
    queue: VecDeque<StreamEvent>,
    section: Option<String>,
    awaiting_section_name: bool,
    current: Option<RawRecord>,
    pending_acadver: bool,
    done: bool,
}

impl<R: BufRead> EntityStream<R> {
    /// Strict-mode stream with default limits.
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, ReadMode::Strict, Limits::default())
    }

    pub fn with_options(reader: R, mode: ReadMode, limits: Limits) -> Self {
        let tag_reader = StreamTagReader::new(reader, mode, limits.clone());
        Self {
            tags: TagCompiler::new(tag_reader, mode),
            mode,
            limits,
            version: DxfVersion::R12,
            warnings: Vec::new(),
            queue: VecDeque::new(),
            section: None,
            awaiting_section_name: false,
            current: None,
            pending_acadver: false,
            done: false,
        }
    }

    /// The format revision seen so far (`$ACADVER`, default R12).
    pub fn version(&self) -> DxfVersion {
        self.version
    }

    /// Warnings collected so far (recovery mode only).
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    /// Only the entities of the ENTITIES section.
    pub fn entities(mut self) -> impl Iterator<Item = DxfResult<Entity>> {
        let mut inside = false;
        std::iter::from_fn(move || loop {
            match self.next()? {
                Ok(StreamEvent::SectionStart(name)) => inside = name == "ENTITIES",
                Ok(StreamEvent::SectionEnd) => inside = false,
                Ok(StreamEvent::Entity(entity)) if inside => return Some(Ok(*entity)),
                Ok(StreamEvent::Entity(_)) => {}
                Err(err) => return Some(Err(err)),
            }
        })
    }

    fn flush_record(&mut self) -> DxfResult<()> {
        let Some(raw) = self.current.take() else {
            return Ok(());
        };
        let keep_raw = vellum_core::schema_for(&raw.type_name).is_none();
        let record =
            EntityRecord::from_raw(raw, self.mode, &self.limits, &mut self.warnings, keep_raw)?;
        if let Some(record) = record {
            let entity = entity_from_record(record, self.version, &mut self.warnings);
            self.queue.push_back(StreamEvent::Entity(Box::new(entity)));
        }
        Ok(())
    }

    fn handle_tag(&mut self, tag: Tag) -> DxfResult<()> {
        if self.awaiting_section_name {
            self.awaiting_section_name = false;
            if tag.code == 2 {
                let name = tag.value.as_str().unwrap_or_default().to_string();
                self.section = Some(name.clone());
                self.queue.push_back(StreamEvent::SectionStart(name));
                return Ok(());
            }
            self.section = Some(String::new());
            self.queue.push_back(StreamEvent::SectionStart(String::new()));
            // The tag itself still needs normal handling below.
        }

        if self.section.as_deref() == Some("HEADER") {
            // Track the declared revision; header variables are not
            // records and produce no events.
            if tag.code == 9 {
                self.pending_acadver = tag.value.as_str() == Some("$ACADVER");
            } else if self.pending_acadver {
                if let Some(token) = tag.value.as_str() {
                    if let Some(version) = DxfVersion::from_token(token) {
                        self.version = version;
                    }
                }
                self.pending_acadver = false;
            }
            if !tag.is_structure_tag() {
                return Ok(());
            }
        }

        if tag.is_structure_tag() {
            self.flush_record()?;
            match tag.value.as_str().unwrap_or_default() {
                "SECTION" => self.awaiting_section_name = true,
                "ENDSEC" => {
                    self.section = None;
                    self.queue.push_back(StreamEvent::SectionEnd);
                }
                "EOF" => self.done = true,
                "TABLE" | "ENDTAB" => {}
                name => self.current = Some(RawRecord::new(name, Vec::new())),
            }
        } else if let Some(record) = self.current.as_mut() {
            record.tags.push(tag);
        }
        Ok(())
    }
}

impl<R: BufRead> Iterator for EntityStream<R> {
    type Item = DxfResult<StreamEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.queue.pop_front() {
                return Some(Ok(event));
            }
            if self.done {
                return None;
            }
            match self.tags.next() {
                Some(Ok(tag)) => {
                    if let Err(err) = self.handle_tag(tag) {
                        self.done = true;
                        return Some(Err(err));
                    }
                }
                Some(Err(err)) => {
                    self.done = true;
                    return Some(Err(err));
                }
                None => {
                    self.done = true;
                    if let Err(err) = self.flush_record() {
                        return Some(Err(err));
                    }
                }
            }
        }
    }
}

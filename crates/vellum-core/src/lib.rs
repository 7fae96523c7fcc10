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

//! Core tag parser and entity model for DXF documents.
//!
//! This crate implements the load side of the interchange pipeline:
//! raw bytes are tokenized into tags ([`tag`]), grouped into structured
//! records, mapped to typed entities through the schema registry
//! ([`schema`]), stored in the entity database keyed by handle, and
//! wired into the document graph by the two-pass loader.
//!
//! The model is single-threaded and synchronous; a document instance
//! must be externally serialized for concurrent mutation.

mod database;
mod document;
mod entity;
mod error;
mod factory;
mod handle;
mod header;
mod limits;
mod loader;
mod query;
mod record;
pub mod schema;
pub mod tag;
mod tables;
mod version;

pub use database::EntityDatabase;
pub use document::{Document, RawSection, MODELSPACE_NAME, PAPERSPACE_NAME};
pub use entity::Entity;
pub use error::{DxfError, DxfErrorKind, DxfResult, LoadWarning};
pub use factory::entity_from_record;
pub use handle::{Handle, HandleAllocator};
pub use header::{HeaderSection, ACADVER, HANDSEED};
pub use limits::Limits;
pub use loader::{load_bytes, load_str, LoadOptions, LoadOptionsBuilder};
pub use query::EntityQuery;
pub use record::{AppData, EntityRecord, RawRecord, Xdata};
pub use schema::{schema_for, AttrSpec, DefaultValue, EntityClass, EntitySchema};
pub use tag::{Point, ReadMode, Tag, TagValue};
pub use tables::{Table, TableRole, Tables};
pub use version::DxfVersion;

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

//! Events produced by the streaming reader.

use vellum_core::Entity;

/// One streaming event.
///
/// Entities arrive with raw, unresolved handle attributes: the
/// streaming mode skips the second resolution pass by design.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A section begins (HEADER, TABLES, ENTITIES, ...).
    SectionStart(String),
    /// The current section ended.
    SectionEnd,
    /// One constructed entity (table entry, block content, graphical
    /// entity or object, in stream order).
    Entity(Box<Entity>),
}

impl StreamEvent {
    /// The entity, if this is an entity event.
    pub fn into_entity(self) -> Option<Entity> {
        match self {
            Self::Entity(entity) => Some(*entity),
            _ => None,
        }
    }

    pub fn is_entity(&self) -> bool {
        matches!(self, Self::Entity(_))
    }
}

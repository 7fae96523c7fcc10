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

//! The entity database: the single authoritative store of all entities,
//! keyed by handle.
//!
//! The database owns every entity exclusively; tables and block records
//! hold only handle references into it. Removal does not cascade and
//! never recycles the removed handle. Iteration order is deterministic
//! (ascending handle).

use crate::entity::Entity;
use crate::error::{DxfError, DxfResult};
use crate::handle::{Handle, HandleAllocator};
use std::collections::BTreeMap;

/// Key/entity store with a monotonic handle allocator.
#[derive(Debug, Clone, Default)]
pub struct EntityDatabase {
    entities: BTreeMap<Handle, Entity>,
    allocator: HandleAllocator,
}

impl EntityDatabase {
    /// An empty database numbering handles from 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty database continuing numbering after `seed` (the
    /// persisted `$HANDSEED` of a reopened document).
    pub fn with_seed(seed: u64) -> Self {
        Self {
            entities: BTreeMap::new(),
            allocator: HandleAllocator::with_seed(seed),
        }
    }

    /// Number of stored entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.entities.contains_key(&handle)
    }

    /// O(log n) lookup.
    pub fn get(&self, handle: Handle) -> Option<&Entity> {
        self.entities.get(&handle)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut Entity> {
        self.entities.get_mut(&handle)
    }

    /// Store an entity. Assigns a fresh handle if the entity has none;
    /// an already-set handle is kept and registered with the allocator
    /// so it is never handed out again. Never reassigns an existing
    /// handle: a collision is an invariant error.
    pub fn add(&mut self, mut entity: Entity) -> DxfResult<Handle> {
        let handle = match entity.handle() {
            Some(handle) => {
                if self.entities.contains_key(&handle) {
                    return Err(DxfError::invariant(format!(
                        "handle collision: {} already in database",
                        handle
                    )));
                }
                self.allocator.register(handle);
                handle
            }
            None => {
                let handle = self.allocator.next_handle();
                entity.set_handle(handle);
                handle
            }
        };
        self.entities.insert(handle, entity);
        Ok(handle)
    }

    /// Unlink an entity from the database. Does not cascade: callers
    /// must first detach the entity from its owner's child list. The
    /// handle is never reused afterwards.
    pub fn remove(&mut self, handle: Handle) -> Option<Entity> {
        self.entities.remove(&handle)
    }

    /// Allocate the next free handle without storing anything.
    pub fn next_handle(&mut self) -> Handle {
        self.allocator.next_handle()
    }

    /// The highest handle value handed out or seen, persisted as
    /// `$HANDSEED`.
    pub fn handle_seed(&self) -> u64 {
        self.allocator.seed()
    }

    /// Entities in ascending handle order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &Entity)> {
        self.entities.iter().map(|(handle, entity)| (*handle, entity))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle, &mut Entity)> {
        self.entities
            .iter_mut()
            .map(|(handle, entity)| (*handle, entity))
    }

    /// All live handles in ascending order.
    pub fn handles(&self) -> impl Iterator<Item = Handle> + '_ {
        self.entities.keys().copied()
    }
}

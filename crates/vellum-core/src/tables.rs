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

//! Resource tables: named, case-insensitive collections of table-entry
//! entities.
//!
//! Tables hold only handle references into the entity database, never
//! entities. Names are unique within a table with one exception: the
//! viewport table permits multiple entries sharing a name, grouped as
//! one multi-viewport configuration. Tables are created once with the
//! document and never destroyed while it exists.

use crate::error::{DxfError, DxfResult};
use crate::handle::Handle;
use std::collections::HashMap;

/// The fixed set of table roles, in canonical section emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TableRole {
    Viewport,
    Linetype,
    Layer,
    Textstyle,
    View,
    Ucs,
    AppId,
    DimStyle,
    BlockRecord,
}

impl TableRole {
    /// All roles in canonical emission order.
    pub const ALL: [TableRole; 9] = [
        TableRole::Viewport,
        TableRole::Linetype,
        TableRole::Layer,
        TableRole::Textstyle,
        TableRole::View,
        TableRole::Ucs,
        TableRole::AppId,
        TableRole::DimStyle,
        TableRole::BlockRecord,
    ];

    /// The table name in the file (also the entry type name).
    pub fn table_name(self) -> &'static str {
        match self {
            Self::Viewport => "VPORT",
            Self::Linetype => "LTYPE",
            Self::Layer => "LAYER",
            Self::Textstyle => "STYLE",
            Self::View => "VIEW",
            Self::Ucs => "UCS",
            Self::AppId => "APPID",
            Self::DimStyle => "DIMSTYLE",
            Self::BlockRecord => "BLOCK_RECORD",
        }
    }

    /// Map a file table name to its role.
    pub fn from_table_name(name: &str) -> Option<TableRole> {
        match name {
            "VPORT" => Some(Self::Viewport),
            "LTYPE" => Some(Self::Linetype),
            "LAYER" => Some(Self::Layer),
            "STYLE" => Some(Self::Textstyle),
            "VIEW" => Some(Self::View),
            "UCS" => Some(Self::Ucs),
            "APPID" => Some(Self::AppId),
            "DIMSTYLE" => Some(Self::DimStyle),
            "BLOCK_RECORD" => Some(Self::BlockRecord),
            _ => None,
        }
    }

    /// Whether duplicate names are allowed in this table.
    pub fn allows_duplicate_names(self) -> bool {
        matches!(self, Self::Viewport)
    }
}

/// One table: entry handles in insertion order plus a case-insensitive
/// name index.
#[derive(Debug, Clone)]
pub struct Table {
    role: TableRole,
    handle: Option<Handle>,
    entries: Vec<Handle>,
    index: HashMap<String, Vec<Handle>>,
}

impl Table {
    pub fn new(role: TableRole) -> Self {
        Self {
            role,
            handle: None,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn role(&self) -> TableRole {
        self.role
    }

    /// The table head's own handle from the file, if any.
    pub fn handle(&self) -> Option<Handle> {
        self.handle
    }

    pub fn set_handle(&mut self, handle: Option<Handle>) {
        self.handle = handle;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Register an entry under its name. Duplicate names fail unless
    /// the role permits them.
    pub fn add_entry(&mut self, name: &str, handle: Handle) -> DxfResult<()> {
        let key = name.to_lowercase();
        let bucket = self.index.entry(key).or_default();
        if !bucket.is_empty() && !self.role.allows_duplicate_names() {
            return Err(DxfError::invariant(format!(
                "duplicate {} entry name \"{}\"",
                self.role.table_name(),
                name
            )));
        }
        bucket.push(handle);
        self.entries.push(handle);
        Ok(())
    }

    /// First entry registered under `name` (case-insensitive).
    pub fn get(&self, name: &str) -> Option<Handle> {
        self.index
            .get(&name.to_lowercase())
            .and_then(|bucket| bucket.first())
            .copied()
    }

    /// Every entry registered under `name`; more than one only for the
    /// viewport table.
    pub fn get_all(&self, name: &str) -> &[Handle] {
        self.index
            .get(&name.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&name.to_lowercase())
    }

    /// Entry handles in insertion order.
    pub fn entries(&self) -> &[Handle] {
        &self.entries
    }

    /// Remove every entry registered under `name`, returning the
    /// removed handles. Callers detach the entities separately.
    pub fn remove_entry(&mut self, name: &str) -> Vec<Handle> {
        let Some(removed) = self.index.remove(&name.to_lowercase()) else {
            return Vec::new();
        };
        self.entries.retain(|handle| !removed.contains(handle));
        removed
    }
}

/// The aggregate of all nine tables.
#[derive(Debug, Clone)]
pub struct Tables {
    tables: Vec<Table>,
}

impl Default for Tables {
    fn default() -> Self {
        Self::new()
    }
}

impl Tables {
    pub fn new() -> Self {
        Self {
            tables: TableRole::ALL.iter().map(|role| Table::new(*role)).collect(),
        }
    }

    pub fn by_role(&self, role: TableRole) -> &Table {
        self.tables
            .iter()
            .find(|table| table.role() == role)
            .expect("all roles present")
    }

    pub fn by_role_mut(&mut self, role: TableRole) -> &mut Table {
        self.tables
            .iter_mut()
            .find(|table| table.role() == role)
            .expect("all roles present")
    }

    /// All tables in canonical emission order.
    pub fn iter(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter()
    }

    pub fn layers(&self) -> &Table {
        self.by_role(TableRole::Layer)
    }

    pub fn linetypes(&self) -> &Table {
        self.by_role(TableRole::Linetype)
    }

    pub fn styles(&self) -> &Table {
        self.by_role(TableRole::Textstyle)
    }

    pub fn block_records(&self) -> &Table {
        self.by_role(TableRole::BlockRecord)
    }
}

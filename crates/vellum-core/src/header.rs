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

//! The header section: ordered `$NAME` variables.
//!
//! Each variable is a name tag (code 9) followed by one or more value
//! tags. Unknown variables are preserved in order; the library itself
//! maintains only `$ACADVER` and `$HANDSEED`.

use crate::handle::Handle;
use crate::tag::{Tag, TagValue};
use crate::version::DxfVersion;
use std::collections::HashMap;

/// Header variable name for the format version token.
pub const ACADVER: &str = "$ACADVER";
/// Header variable name for the persisted handle seed.
pub const HANDSEED: &str = "$HANDSEED";

/// The ordered header variable map.
#[derive(Debug, Clone, Default)]
pub struct HeaderSection {
    vars: Vec<(String, Vec<Tag>)>,
    index: HashMap<String, usize>,
}

impl HeaderSection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// The value tags of a variable.
    pub fn get(&self, name: &str) -> Option<&[Tag]> {
        self.index
            .get(name)
            .map(|&position| self.vars[position].1.as_slice())
    }

    /// Set a variable, replacing in place or appending at the end.
    pub fn set(&mut self, name: &str, tags: Vec<Tag>) {
        match self.index.get(name) {
            Some(&position) => self.vars[position].1 = tags,
            None => {
                self.index.insert(name.to_string(), self.vars.len());
                self.vars.push((name.to_string(), tags));
            }
        }
    }

    /// Remove a variable.
    pub fn remove(&mut self, name: &str) {
        if let Some(position) = self.index.remove(name) {
            self.vars.remove(position);
            for value in self.index.values_mut() {
                if *value > position {
                    *value -= 1;
                }
            }
        }
    }

    /// Variables in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Tag])> {
        self.vars
            .iter()
            .map(|(name, tags)| (name.as_str(), tags.as_slice()))
    }

    // ==================== Library-maintained variables ====================

    /// The declared format revision, if readable.
    pub fn version(&self) -> Option<DxfVersion> {
        let tags = self.get(ACADVER)?;
        let token = tags.first()?.value.as_str()?;
        DxfVersion::from_token(token)
    }

    pub fn set_version(&mut self, version: DxfVersion) {
        self.set(ACADVER, vec![Tag::text(1, version.token())]);
    }

    /// The persisted handle seed, if readable.
    pub fn handle_seed(&self) -> Option<Handle> {
        let tags = self.get(HANDSEED)?;
        match &tags.first()?.value {
            TagValue::Text(s) => Handle::from_hex(s),
            _ => None,
        }
    }

    pub fn set_handle_seed(&mut self, seed: Handle) {
        self.set(HANDSEED, vec![Tag::text(5, seed.to_hex())]);
    }
}

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

//! Thin entity query layer.
//!
//! Convenience filtering over entity collections: type-name selection
//! plus simple attribute predicates combined with AND. Each filter
//! consumes the query and returns the narrowed one.

use crate::entity::Entity;
use crate::tag::TagValue;

/// A filterable snapshot of entity references.
#[derive(Debug, Clone)]
pub struct EntityQuery<'a> {
    entities: Vec<&'a Entity>,
}

impl<'a> EntityQuery<'a> {
    /// Wrap a collection of entity references.
    pub fn new(entities: Vec<&'a Entity>) -> Self {
        Self { entities }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Keep entities whose type name is in the space-separated list
    /// (e.g. `"LINE CIRCLE ARC"`).
    pub fn of_type(self, type_names: &str) -> Self {
        let names: Vec<&str> = type_names.split_whitespace().collect();
        self.filter(|entity| names.contains(&entity.type_name()))
    }

    /// Keep entities where `name` equals `value`.
    pub fn attr_eq(self, name: &str, value: impl Into<TagValue>) -> Self {
        let value = value.into();
        self.filter(move |entity| entity.get(name).as_ref() == Some(&value))
    }

    /// Keep entities where `name` differs from `value` (absent
    /// attributes count as different).
    pub fn attr_ne(self, name: &str, value: impl Into<TagValue>) -> Self {
        let value = value.into();
        self.filter(move |entity| entity.get(name).as_ref() != Some(&value))
    }

    /// Keep entities whose text attribute matches a shell-style pattern
    /// (`*` and `?` wildcards, case-insensitive).
    pub fn attr_matches(self, name: &str, pattern: &str) -> Self {
        let pattern = pattern.to_lowercase();
        self.filter(move |entity| match entity.get(name) {
            Some(TagValue::Text(text)) => wildcard_match(&pattern, &text.to_lowercase()),
            _ => false,
        })
    }

    /// Keep entities satisfying an arbitrary predicate.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Entity) -> bool,
    {
        self.entities.retain(|entity| predicate(entity));
        self
    }

    /// Iterate the remaining entities.
    pub fn iter(&self) -> impl Iterator<Item = &'a Entity> + '_ {
        self.entities.iter().copied()
    }

    /// First remaining entity.
    pub fn first(&self) -> Option<&'a Entity> {
        self.entities.first().copied()
    }
}

impl<'a> IntoIterator for EntityQuery<'a> {
    type Item = &'a Entity;
    type IntoIter = std::vec::IntoIter<&'a Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.into_iter()
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::Text(value.to_string())
    }
}

impl From<i64> for TagValue {
    fn from(value: i64) -> Self {
        TagValue::Integer(value)
    }
}

impl From<f64> for TagValue {
    fn from(value: f64) -> Self {
        TagValue::Double(value)
    }
}

/// Minimal `*`/`?` glob matching, no character classes.
fn wildcard_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    match_at(&pattern, &text)
}

fn match_at(pattern: &[char], text: &[char]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some((&'*', rest)) => {
            (0..=text.len()).any(|skip| match_at(rest, &text[skip..]))
        }
        Some((&'?', rest)) => match text.split_first() {
            Some((_, text_rest)) => match_at(rest, text_rest),
            None => false,
        },
        Some((ch, rest)) => match text.split_first() {
            Some((first, text_rest)) => ch == first && match_at(rest, text_rest),
            None => false,
        },
    }
}

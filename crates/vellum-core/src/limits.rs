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

//! Security limits for untrusted input.
//!
//! DXF files come from arbitrary third-party producers; the reader
//! enforces these limits to bound memory and time on hostile input.
//! All limits are configurable through [`crate::LoadOptions`].

/// Resource limits enforced while reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum input size in bytes (default: 1 GB).
    pub max_input_size: usize,
    /// Maximum length of a single text line (default: 1 MB).
    pub max_line_length: usize,
    /// Maximum number of tags in one document (default: 50M).
    pub max_tags: usize,
    /// Maximum number of entities in one document (default: 10M).
    pub max_entities: usize,
    /// Maximum nesting depth of 102 application-data blocks
    /// (default: 8; the format nests them at most one level in
    /// practice).
    pub max_appdata_depth: usize,
    /// Maximum number of tags in one extended-data block
    /// (default: 1M).
    pub max_xdata_tags: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_input_size: 1024 * 1024 * 1024,
            max_line_length: 1024 * 1024,
            max_tags: 50_000_000,
            max_entities: 10_000_000,
            max_appdata_depth: 8,
            max_xdata_tags: 1_000_000,
        }
    }
}

impl Limits {
    /// Conservative limits for clearly untrusted input.
    pub fn strict() -> Self {
        Self {
            max_input_size: 64 * 1024 * 1024,
            max_line_length: 64 * 1024,
            max_tags: 5_000_000,
            max_entities: 1_000_000,
            max_appdata_depth: 4,
            max_xdata_tags: 100_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Default limit tests ====================

    #[test]
    fn test_default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.max_input_size, 1024 * 1024 * 1024);
        assert_eq!(limits.max_line_length, 1024 * 1024);
        assert_eq!(limits.max_tags, 50_000_000);
        assert_eq!(limits.max_entities, 10_000_000);
        assert_eq!(limits.max_appdata_depth, 8);
        assert_eq!(limits.max_xdata_tags, 1_000_000);
    }

    #[test]
    fn test_strict_limits_are_tighter() {
        let default = Limits::default();
        let strict = Limits::strict();
        assert!(strict.max_input_size < default.max_input_size);
        assert!(strict.max_tags < default.max_tags);
        assert!(strict.max_entities < default.max_entities);
    }

    #[test]
    fn test_limits_clone_eq() {
        let limits = Limits::default();
        assert_eq!(limits.clone(), limits);
    }

    #[test]
    fn test_limits_customizable() {
        let mut limits = Limits::default();
        limits.max_tags = 100;
        assert_eq!(limits.max_tags, 100);
    }
}

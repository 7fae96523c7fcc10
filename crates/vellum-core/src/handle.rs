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

//! Entity handles and the monotonic handle allocator.
//!
//! A handle is a unique, process-lifetime-stable identifier stored in the
//! file as an uppercase hexadecimal string. Handle "0" is the DXF null
//! handle and never identifies a live entity.

use crate::error::{DxfError, DxfResult};

/// A unique entity identifier. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Handle(u64);

impl Handle {
    /// Create a handle from a raw value. Returns `None` for zero.
    pub fn new(value: u64) -> Option<Handle> {
        if value == 0 {
            None
        } else {
            Some(Handle(value))
        }
    }

    /// Parse an uppercase/lowercase hex string. Returns `None` for "0",
    /// the empty string, or non-hex input.
    pub fn from_hex(s: &str) -> Option<Handle> {
        let value = u64::from_str_radix(s.trim(), 16).ok()?;
        Handle::new(value)
    }

    /// The raw numeric value.
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Format as an uppercase hex string without prefix (file form).
    pub fn to_hex(self) -> String {
        format!("{:X}", self.0)
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:X}", self.0)
    }
}

/// Monotonic handle allocator.
///
/// Handles are never recycled within a document's lifetime, even across
/// deletion. The highest-seen value is persisted as `$HANDSEED` so a
/// reopened document continues numbering without collision.
#[derive(Debug, Clone, Default)]
pub struct HandleAllocator {
    seed: u64,
}

impl HandleAllocator {
    /// Start numbering from 1.
    pub fn new() -> Self {
        Self { seed: 0 }
    }

    /// Continue numbering after `seed` (the highest already-used value).
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    /// Allocate the next handle. Strictly increasing.
    pub fn next_handle(&mut self) -> Handle {
        self.seed += 1;
        Handle(self.seed)
    }

    /// Record an externally-assigned handle so future allocations stay
    /// above it.
    pub fn register(&mut self, handle: Handle) {
        if handle.as_u64() > self.seed {
            self.seed = handle.as_u64();
        }
    }

    /// The highest value handed out or registered so far.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// Validate a raw handle string from the file.
///
/// Used where a handle is mandatory; the null handle "0" is rejected.
pub fn parse_handle(s: &str, line: usize) -> DxfResult<Handle> {
    Handle::from_hex(s)
        .ok_or_else(|| DxfError::structure(format!("invalid handle \"{}\"", s), line))
}

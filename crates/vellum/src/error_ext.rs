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

//! Error context helpers.
//!
//! Extension trait for `Result<T, DxfError>` adding contextual
//! information as errors propagate through the call stack.
//!
//! # Examples
//!
//! ```rust
//! use vellum::{parse, DxfResultExt};
//!
//! fn load_template(name: &str, content: &str) -> Result<vellum::Document, vellum::DxfError> {
//!     parse(content).with_context(|| format!("while loading template {}", name))
//! }
//! ```

use vellum_core::DxfError;

/// Context helpers for DXF results.
pub trait DxfResultExt<T> {
    /// Attach a static context message to the error.
    fn context(self, message: impl Into<String>) -> Result<T, DxfError>;

    /// Attach a lazily computed context message to the error.
    fn with_context<F, S>(self, message: F) -> Result<T, DxfError>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> DxfResultExt<T> for Result<T, DxfError> {
    fn context(self, message: impl Into<String>) -> Result<T, DxfError> {
        self.map_err(|err| err.with_context(message))
    }

    fn with_context<F, S>(self, message: F) -> Result<T, DxfError>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|err| err.with_context(message()))
    }
}

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

//! Write configuration.

use vellum_core::DxfVersion;

/// Configuration for serializing a document.
#[derive(Debug, Clone, Default)]
pub struct WriteConfig {
    /// The format revision to target. `None` keeps the document's own
    /// declared revision.
    pub target_version: Option<DxfVersion>,
    /// Permit dropping attributes and entities that need a newer
    /// revision than the target. Without this, such content raises a
    /// version error; silently producing an invalid file is never an
    /// option.
    pub lossy_downgrade: bool,
}

impl WriteConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new builder.
    pub fn builder() -> WriteConfigBuilder {
        WriteConfigBuilder::new()
    }

    /// Resolve the effective target for a document-declared revision.
    pub fn resolve_target(&self, document_version: DxfVersion) -> DxfVersion {
        self.target_version.unwrap_or(document_version)
    }
}

/// Builder for [`WriteConfig`].
#[derive(Debug, Clone, Default)]
pub struct WriteConfigBuilder {
    config: WriteConfig,
}

impl WriteConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target a specific format revision.
    pub fn target_version(mut self, version: DxfVersion) -> Self {
        self.config.target_version = Some(version);
        self
    }

    /// Opt into lossy downgrade (default: off).
    pub fn lossy_downgrade(mut self, lossy: bool) -> Self {
        self.config.lossy_downgrade = lossy;
        self
    }

    pub fn build(self) -> WriteConfig {
        self.config
    }
}

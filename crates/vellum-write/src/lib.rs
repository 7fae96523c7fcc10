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

//! DXF serialization.
//!
//! Serializes a [`vellum_core::Document`] back to the flat text tag
//! format, targeting a caller-specified format revision. Attribute
//! emission follows schema order, default-valued optional attributes
//! are omitted, and passthrough entities reproduce their original tag
//! content unchanged.
//!
//! # Quick Start
//!
//! ```rust
//! use vellum_core::{Document, DxfVersion};
//! use vellum_write::{write_document, WriteConfig};
//!
//! let doc = Document::new(DxfVersion::R2000);
//! let text = write_document(&doc, &WriteConfig::default()).unwrap();
//! assert!(text.ends_with("EOF\n"));
//! ```
//!
//! # Targeting another revision
//!
//! ```rust
//! use vellum_core::{Document, DxfVersion};
//! use vellum_write::{write_document, WriteConfig};
//!
//! let doc = Document::new(DxfVersion::R2018);
//! let config = WriteConfig::builder()
//!     .target_version(DxfVersion::R12)
//!     .lossy_downgrade(true)
//!     .build();
//! let text = write_document(&doc, &config).unwrap();
//! ```

mod config;
mod writer;

pub use config::{WriteConfig, WriteConfigBuilder};
pub use writer::{write_document, TagWriter};

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

//! Tag types and the group-code classification table.
//!
//! A tag is an atomic (group code, value) pair. The group code decides
//! the value type per format convention; the table below follows the
//! published code ranges. Codes are context-free with one exception:
//! point ordinates share the double ranges and are compiled into
//! [`TagValue::Point`] by the tag compiler.

use crate::error::{DxfError, DxfResult};
use crate::handle::Handle;

/// Highest group code the format defines.
pub const MAX_GROUP_CODE: u16 = 1071;

/// Group code that starts a new record (type tag).
pub const STRUCTURE_CODE: u16 = 0;

/// Group code carrying an entity handle.
pub const HANDLE_CODE: u16 = 5;

/// Alternate handle code used by DIMSTYLE table entries.
pub const DIMSTYLE_HANDLE_CODE: u16 = 105;

/// Group code carrying the owner handle.
pub const OWNER_CODE: u16 = 330;

/// Group code bracketing application-data blocks.
pub const APP_DATA_CODE: u16 = 102;

/// Group code introducing an extended-data block (app id value).
pub const XDATA_APPID_CODE: u16 = 1001;

/// Subclass marker code.
pub const SUBCLASS_CODE: u16 = 100;

/// Comment code (ignored on read).
pub const COMMENT_CODE: u16 = 999;

/// The value type a group code carries on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Unicode text (also hex handle references).
    Text,
    /// 16-bit integer.
    Int16,
    /// 32-bit integer.
    Int32,
    /// 64-bit integer.
    Int64,
    /// Boolean stored as one byte.
    Bool,
    /// 64-bit float.
    Double,
    /// Binary chunk (hex-encoded in text files).
    Binary,
}

/// Classify a group code. Unknown codes within range default to text,
/// matching the permissive behavior real-world files require.
pub fn value_kind(code: u16) -> ValueKind {
    match code {
        10..=59 | 110..=149 | 210..=239 | 460..=469 | 1010..=1059 => ValueKind::Double,
        60..=79 | 170..=179 | 270..=289 | 370..=389 | 400..=409 | 1060..=1070 => ValueKind::Int16,
        90..=99 | 420..=429 | 440..=459 => ValueKind::Int32,
        1071 => ValueKind::Int32,
        160..=169 => ValueKind::Int64,
        290..=299 => ValueKind::Bool,
        310..=319 | 1004 => ValueKind::Binary,
        _ => ValueKind::Text,
    }
}

/// True for x-ordinate codes that start a point (y at code+10,
/// optional z at code+20).
pub fn is_point_start_code(code: u16) -> bool {
    matches!(code, 10..=18 | 110..=112 | 210..=213 | 1010..=1013)
}

/// True for codes whose text value is a hex handle reference.
pub fn is_handle_code(code: u16) -> bool {
    matches!(code, 5 | 105 | 320..=369 | 390..=399 | 480 | 481 | 1005)
}

/// True for binary-chunk codes.
pub fn is_binary_code(code: u16) -> bool {
    matches!(code, 310..=319 | 1004)
}

/// A point value; `z` is absent for 2D points so the writer can
/// reproduce the original dimensionality.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

impl Point {
    /// A 2D point.
    pub fn xy(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    /// A 3D point.
    pub fn xyz(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }

    /// Z ordinate, defaulting to 0 for 2D points.
    pub fn z_or_zero(&self) -> f64 {
        self.z.unwrap_or(0.0)
    }
}

/// A tag value, typed per the group-code table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TagValue {
    /// Text, including hex handle references.
    Text(String),
    /// Any integer width; the wire width comes from the group code.
    Integer(i64),
    /// 64-bit float.
    Double(f64),
    /// Compiled 2D/3D point.
    Point(Point),
    /// Binary chunk.
    Binary(Vec<u8>),
}

impl TagValue {
    /// Try to get the value as text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the value as an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get the value as a float (integers widen).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(n) => Some(*n),
            Self::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Try to get the value as a point.
    pub fn as_point(&self) -> Option<Point> {
        match self {
            Self::Point(p) => Some(*p),
            _ => None,
        }
    }

    /// Try to parse a text value as a hex handle.
    pub fn as_handle(&self) -> Option<Handle> {
        match self {
            Self::Text(s) => Handle::from_hex(s),
            _ => None,
        }
    }

    /// Try to get the value as a binary chunk.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(b) => Some(b),
            _ => None,
        }
    }
}

/// An atomic (group code, value) unit of the interchange format.
/// Immutable once read.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tag {
    pub code: u16,
    pub value: TagValue,
}

impl Tag {
    /// Create a tag.
    pub fn new(code: u16, value: TagValue) -> Self {
        Self { code, value }
    }

    /// Shorthand for a text tag.
    pub fn text(code: u16, value: impl Into<String>) -> Self {
        Self::new(code, TagValue::Text(value.into()))
    }

    /// Shorthand for an integer tag.
    pub fn integer(code: u16, value: i64) -> Self {
        Self::new(code, TagValue::Integer(value))
    }

    /// Shorthand for a double tag.
    pub fn double(code: u16, value: f64) -> Self {
        Self::new(code, TagValue::Double(value))
    }

    /// Shorthand for a point tag.
    pub fn point(code: u16, point: Point) -> Self {
        Self::new(code, TagValue::Point(point))
    }

    /// True if this tag starts a new record (code 0).
    pub fn is_structure_tag(&self) -> bool {
        self.code == STRUCTURE_CODE
    }
}

/// Coerce a raw text value per the group code's declared kind.
///
/// Integer codes tolerate float-formatted values with truncation; some
/// producers write "70.0" where an int is required. Binary chunks are
/// hex-encoded in text files.
pub fn coerce_value(code: u16, raw: &str, line: usize) -> DxfResult<TagValue> {
    match value_kind(code) {
        ValueKind::Text => Ok(TagValue::Text(raw.to_string())),
        ValueKind::Int16 | ValueKind::Int32 | ValueKind::Int64 | ValueKind::Bool => {
            let trimmed = raw.trim();
            match trimmed.parse::<i64>() {
                Ok(n) => Ok(TagValue::Integer(n)),
                Err(_) => match trimmed.parse::<f64>() {
                    Ok(f) => Ok(TagValue::Integer(f as i64)),
                    Err(_) => Err(DxfError::structure(
                        format!("invalid integer value \"{}\" for code {}", raw, code),
                        line,
                    )),
                },
            }
        }
        ValueKind::Double => raw
            .trim()
            .parse::<f64>()
            .map(TagValue::Double)
            .map_err(|_| {
                DxfError::structure(
                    format!("invalid floating point value \"{}\" for code {}", raw, code),
                    line,
                )
            }),
        ValueKind::Binary => decode_hex(raw.trim())
            .map(TagValue::Binary)
            .ok_or_else(|| {
                DxfError::structure(format!("invalid binary data for code {}", code), line)
            }),
    }
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    let mut out = Vec::with_capacity(s.len() / 2);
    let bytes = s.as_bytes();
    for pair in bytes.chunks_exact(2) {
        let hi = (pair[0] as char).to_digit(16)?;
        let lo = (pair[1] as char).to_digit(16)?;
        out.push((hi * 16 + lo) as u8);
    }
    Some(out)
}

/// Encode a binary chunk as uppercase hex (text file form).
pub fn encode_hex(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 2);
    for byte in data {
        out.push_str(&format!("{:02X}", byte));
    }
    out
}

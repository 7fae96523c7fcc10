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

//! Binary tag loader.
//!
//! Binary DXF starts with a fixed 22-byte sentinel, then packs the same
//! logical tag stream: a group code (two-byte little-endian, or the
//! legacy one-byte form with a 255 escape in R12 files) followed by a
//! value encoded per the code's kind. A stream whose sentinel does not
//! match is rejected, never misparsed.

use super::types::{value_kind, Tag, TagValue, ValueKind, COMMENT_CODE, MAX_GROUP_CODE};
use super::ReadMode;
use crate::error::{DxfError, DxfResult, LoadWarning};
use crate::limits::Limits;
use memchr::memchr;

/// The fixed magic header of a binary DXF stream.
pub const BINARY_SENTINEL: &[u8; 22] = b"AutoCAD Binary DXF\r\n\x1a\x00";

/// True if `data` carries the binary sentinel.
pub fn is_binary(data: &[u8]) -> bool {
    data.starts_with(BINARY_SENTINEL)
}

/// Lazy iterator of tags over binary input.
#[derive(Debug)]
pub struct BinaryTagLoader<'a> {
    data: &'a [u8],
    pos: usize,
    one_byte_codes: bool,
    utf8_text: bool,
    mode: ReadMode,
    limits: Limits,
    warnings: Vec<LoadWarning>,
    tags_read: usize,
    done: bool,
}

impl<'a> BinaryTagLoader<'a> {
    /// Create a loader. Fails with a `Structure` error if the sentinel
    /// does not match.
    pub fn new(data: &'a [u8], mode: ReadMode, limits: Limits) -> DxfResult<Self> {
        if !is_binary(data) {
            return Err(DxfError::structure("not a binary DXF data structure", 0));
        }
        let (one_byte_codes, utf8_text) = scan_params(data);
        Ok(Self {
            data,
            pos: BINARY_SENTINEL.len(),
            one_byte_codes,
            utf8_text,
            mode,
            limits,
            warnings: Vec::new(),
            tags_read: 0,
            done: false,
        })
    }

    /// Warnings collected so far (recovery mode only).
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    /// Drain the collected warnings.
    pub fn take_warnings(&mut self) -> Vec<LoadWarning> {
        std::mem::take(&mut self.warnings)
    }

    fn truncated(&mut self) -> Option<DxfResult<Tag>> {
        self.done = true;
        match self.mode {
            ReadMode::Strict => Some(Err(DxfError::structure(
                "unexpected end of binary stream",
                self.tags_read,
            ))),
            ReadMode::Recover => {
                self.warnings.push(LoadWarning::new(
                    "unexpected end of binary stream",
                    self.tags_read,
                ));
                None
            }
        }
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        if end > self.data.len() {
            return None;
        }
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Some(slice)
    }

    fn read_code(&mut self) -> Option<u16> {
        if self.one_byte_codes {
            let byte = *self.take(1)?.first()?;
            if byte == 255 {
                // Extended group code escape used by R12 binary files.
                let bytes = self.take(2)?;
                Some(u16::from_le_bytes([bytes[0], bytes[1]]))
            } else {
                Some(byte as u16)
            }
        } else {
            let bytes = self.take(2)?;
            Some(u16::from_le_bytes([bytes[0], bytes[1]]))
        }
    }

    fn decode_text(&mut self, bytes: &[u8], code: u16) -> DxfResult<TagValue> {
        if self.utf8_text {
            match std::str::from_utf8(bytes) {
                Ok(s) => Ok(TagValue::Text(s.to_string())),
                Err(_) => match self.mode {
                    ReadMode::Strict => {
                        self.done = true;
                        Err(DxfError::structure(
                            format!("non-UTF8 text value for code {}", code),
                            self.tags_read,
                        ))
                    }
                    ReadMode::Recover => {
                        self.warnings.push(LoadWarning::new(
                            format!("lossy decoding of text value for code {}", code),
                            self.tags_read,
                        ));
                        Ok(TagValue::Text(String::from_utf8_lossy(bytes).into_owned()))
                    }
                },
            }
        } else {
            // Pre-R2007 files use a single-byte code page; map bytes
            // one-to-one so the content survives a round trip.
            Ok(TagValue::Text(bytes.iter().map(|&b| b as char).collect()))
        }
    }
}

/// Detect the group-code packing and the text encoding by scanning the
/// first kilobyte for the `$ACADVER` header variable.
fn scan_params(data: &[u8]) -> (bool, bool) {
    let window = &data[..data.len().min(1024)];
    if let Some(found) = memchr::memmem::find(window, b"$ACADVER") {
        let mut start = found + b"$ACADVER".len() + 2;
        // Skip over the group code of the value tag (1 or 2 bytes).
        if data.get(start) != Some(&b'A') {
            start += 1;
        }
        if let Some(token) = data.get(start..start + 6) {
            let one_byte = token <= b"AC1009".as_slice();
            let utf8 = token >= b"AC1021".as_slice();
            return (one_byte, utf8);
        }
    }
    // No version variable: assume the legacy packing, like the original
    // format documentation prescribes for R12 binary files.
    (true, false)
}

impl<'a> Iterator for BinaryTagLoader<'a> {
    type Item = DxfResult<Tag>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done || self.pos >= self.data.len() {
                return None;
            }

            let code = match self.read_code() {
                Some(code) => code,
                None => return self.truncated(),
            };
            if code > MAX_GROUP_CODE {
                self.done = true;
                match self.mode {
                    ReadMode::Strict => {
                        return Some(Err(DxfError::structure(
                            format!("invalid group code {}", code),
                            self.tags_read,
                        )));
                    }
                    ReadMode::Recover => {
                        // Binary streams cannot be resynchronized; stop.
                        self.warnings.push(LoadWarning::new(
                            format!("invalid group code {}, rest of stream dropped", code),
                            self.tags_read,
                        ));
                        return None;
                    }
                }
            }

            self.tags_read += 1;
            if self.tags_read > self.limits.max_tags {
                self.done = true;
                return Some(Err(DxfError::limit("too many tags", self.tags_read)));
            }

            let value = match value_kind(code) {
                ValueKind::Int16 => match self.take(2) {
                    Some(b) => TagValue::Integer(i16::from_le_bytes([b[0], b[1]]) as i64),
                    None => return self.truncated(),
                },
                ValueKind::Int32 => match self.take(4) {
                    Some(b) => {
                        TagValue::Integer(i32::from_le_bytes([b[0], b[1], b[2], b[3]]) as i64)
                    }
                    None => return self.truncated(),
                },
                ValueKind::Int64 => match self.take(8) {
                    Some(b) => TagValue::Integer(i64::from_le_bytes([
                        b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
                    ])),
                    None => return self.truncated(),
                },
                ValueKind::Bool => match self.take(1) {
                    Some(b) => TagValue::Integer(b[0] as i64),
                    None => return self.truncated(),
                },
                ValueKind::Double => match self.take(8) {
                    Some(b) => TagValue::Double(f64::from_le_bytes([
                        b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
                    ])),
                    None => return self.truncated(),
                },
                ValueKind::Binary => {
                    let length = match self.take(1) {
                        Some(b) => b[0] as usize,
                        None => return self.truncated(),
                    };
                    match self.take(length) {
                        Some(b) => TagValue::Binary(b.to_vec()),
                        None => return self.truncated(),
                    }
                }
                ValueKind::Text => {
                    let rest = &self.data[self.pos..];
                    let end = match memchr(0, rest) {
                        Some(end) => end,
                        None => return self.truncated(),
                    };
                    let bytes = rest[..end].to_vec();
                    self.pos += end + 1;
                    match self.decode_text(&bytes, code) {
                        Ok(value) => value,
                        Err(err) => return Some(Err(err)),
                    }
                }
            };

            if code == COMMENT_CODE {
                continue;
            }
            return Some(Ok(Tag::new(code, value)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_r2000(tags: &[(u16, &[u8])]) -> Vec<u8> {
        let mut data = BINARY_SENTINEL.to_vec();
        for (code, payload) in tags {
            data.extend_from_slice(&code.to_le_bytes());
            data.extend_from_slice(payload);
        }
        data
    }

    fn load_all(data: &[u8]) -> DxfResult<Vec<Tag>> {
        BinaryTagLoader::new(data, ReadMode::Strict, Limits::default())?.collect()
    }

    // ==================== Sentinel tests ====================

    #[test]
    fn test_sentinel_detection() {
        assert!(is_binary(BINARY_SENTINEL));
        assert!(!is_binary(b"0\nSECTION\n"));
        assert!(!is_binary(b"AutoCAD Binary DXF"));
    }

    #[test]
    fn test_wrong_sentinel_rejected() {
        let err =
            BinaryTagLoader::new(b"AutoCAD Binary DWG\r\n\x1a\x00", ReadMode::Strict, Limits::default())
                .unwrap_err();
        assert_eq!(err.kind, crate::error::DxfErrorKind::Structure);
    }

    // ==================== Value decoding tests ====================

    #[test]
    fn test_decodes_text_value() {
        let data = encode_r2000(&[(0, b"SECTION\0")]);
        let tags = load_all(&data).unwrap();
        assert_eq!(tags, vec![Tag::text(0, "SECTION")]);
    }

    #[test]
    fn test_decodes_int16() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&70i16.to_le_bytes()); // value 70
        let data = encode_r2000(&[(70, &payload)]);
        let tags = load_all(&data).unwrap();
        assert_eq!(tags[0].value.as_i64(), Some(70));
    }

    #[test]
    fn test_decodes_int32() {
        let payload = 123456i32.to_le_bytes();
        let data = encode_r2000(&[(90, &payload)]);
        let tags = load_all(&data).unwrap();
        assert_eq!(tags[0].value.as_i64(), Some(123456));
    }

    #[test]
    fn test_decodes_int64() {
        let payload = (1i64 << 40).to_le_bytes();
        let data = encode_r2000(&[(160, &payload)]);
        let tags = load_all(&data).unwrap();
        assert_eq!(tags[0].value.as_i64(), Some(1 << 40));
    }

    #[test]
    fn test_decodes_bool_byte() {
        let data = encode_r2000(&[(290, &[1u8])]);
        let tags = load_all(&data).unwrap();
        assert_eq!(tags[0].value.as_i64(), Some(1));
    }

    #[test]
    fn test_decodes_double() {
        let payload = 2.5f64.to_le_bytes();
        let data = encode_r2000(&[(40, &payload)]);
        let tags = load_all(&data).unwrap();
        assert_eq!(tags[0].value.as_f64(), Some(2.5));
    }

    #[test]
    fn test_decodes_binary_chunk() {
        let data = encode_r2000(&[(310, &[3u8, 0xAA, 0xBB, 0xCC])]);
        let tags = load_all(&data).unwrap();
        assert_eq!(tags[0].value.as_bytes(), Some(&[0xAA, 0xBB, 0xCC][..]));
    }

    #[test]
    fn test_negative_int16() {
        let payload = (-3i16).to_le_bytes();
        let data = encode_r2000(&[(370, &payload)]);
        let tags = load_all(&data).unwrap();
        assert_eq!(tags[0].value.as_i64(), Some(-3));
    }

    // ==================== Truncation tests ====================

    #[test]
    fn test_truncated_double_strict() {
        let mut data = BINARY_SENTINEL.to_vec();
        data.extend_from_slice(&40u16.to_le_bytes());
        data.extend_from_slice(&[0u8; 4]); // half a double
        let result = load_all(&data);
        assert!(result.is_err());
    }

    #[test]
    fn test_truncated_recover_is_warning() {
        let mut data = BINARY_SENTINEL.to_vec();
        data.extend_from_slice(&40u16.to_le_bytes());
        data.extend_from_slice(&[0u8; 4]);
        let mut loader =
            BinaryTagLoader::new(&data, ReadMode::Recover, Limits::default()).unwrap();
        let tags: Vec<_> = loader.by_ref().map(Result::unwrap).collect();
        assert!(tags.is_empty());
        assert_eq!(loader.warnings().len(), 1);
    }

    #[test]
    fn test_unterminated_text_strict() {
        let mut data = BINARY_SENTINEL.to_vec();
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(b"no terminator");
        assert!(load_all(&data).is_err());
    }

    // ==================== R12 packing tests ====================

    #[test]
    fn test_one_byte_codes_without_acadver() {
        // No $ACADVER present: legacy packing assumed.
        let mut data = BINARY_SENTINEL.to_vec();
        data.push(0); // one-byte group code 0
        data.extend_from_slice(b"EOF\0");
        let tags = load_all(&data).unwrap();
        assert_eq!(tags, vec![Tag::text(0, "EOF")]);
    }

    #[test]
    fn test_one_byte_code_escape() {
        let mut data = BINARY_SENTINEL.to_vec();
        data.push(255); // escape: next two bytes are the real code
        data.extend_from_slice(&1001u16.to_le_bytes());
        data.extend_from_slice(b"ACAD\0");
        let tags = load_all(&data).unwrap();
        assert_eq!(tags[0], Tag::text(1001, "ACAD"));
    }

    #[test]
    fn test_two_byte_codes_with_modern_acadver() {
        let mut data = BINARY_SENTINEL.to_vec();
        // HEADER fragment declaring AC1015 with 2-byte codes.
        data.extend_from_slice(&9u16.to_le_bytes());
        data.extend_from_slice(b"$ACADVER\0");
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(b"AC1015\0");
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(b"EOF\0");
        let tags = load_all(&data).unwrap();
        assert_eq!(tags.len(), 3);
        assert_eq!(tags[1].value.as_str(), Some("AC1015"));
        assert_eq!(tags[2].value.as_str(), Some("EOF"));
    }
}

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

//! DXF format version tokens.
//!
//! Every document declares a version token in its header (`$ACADVER`).
//! The schema registry consults the token to decide which attributes are
//! legal to parse/emit for a given entity type.

/// A DXF format revision.
///
/// Ordering follows release order, so `v >= DxfVersion::R2000` asks
/// "does this document support R2000 features".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DxfVersion {
    /// AC1009 (R12)
    R12,
    /// AC1012 (R13)
    R13,
    /// AC1014 (R14)
    R14,
    /// AC1015 (R2000)
    R2000,
    /// AC1018 (R2004)
    R2004,
    /// AC1021 (R2007), first UTF-8 revision
    R2007,
    /// AC1024 (R2010)
    R2010,
    /// AC1027 (R2013)
    R2013,
    /// AC1032 (R2018)
    R2018,
}

impl DxfVersion {
    /// The newest revision this library can write.
    pub const LATEST: DxfVersion = DxfVersion::R2018;

    /// The header token for this revision (e.g. "AC1015").
    pub fn token(self) -> &'static str {
        match self {
            Self::R12 => "AC1009",
            Self::R13 => "AC1012",
            Self::R14 => "AC1014",
            Self::R2000 => "AC1015",
            Self::R2004 => "AC1018",
            Self::R2007 => "AC1021",
            Self::R2010 => "AC1024",
            Self::R2013 => "AC1027",
            Self::R2018 => "AC1032",
        }
    }

    /// Parse a header token. Returns `None` for unknown tokens.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "AC1009" => Some(Self::R12),
            // AC1010/AC1011 are pre-release R13 tokens, mapped to R13.
            "AC1010" | "AC1011" | "AC1012" => Some(Self::R13),
            "AC1014" => Some(Self::R14),
            "AC1015" => Some(Self::R2000),
            "AC1018" => Some(Self::R2004),
            "AC1021" => Some(Self::R2007),
            "AC1024" => Some(Self::R2010),
            "AC1027" => Some(Self::R2013),
            "AC1032" => Some(Self::R2018),
            _ => None,
        }
    }

    /// True if text content is UTF-8 encoded in this revision.
    ///
    /// Older revisions use the header code page; the reader treats them
    /// as Latin-ish single-byte text and preserves bytes lossily.
    pub fn is_utf8(self) -> bool {
        self >= Self::R2007
    }
}

impl std::fmt::Display for DxfVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Token round-trip tests ====================

    #[test]
    fn test_token_round_trip() {
        for version in [
            DxfVersion::R12,
            DxfVersion::R13,
            DxfVersion::R14,
            DxfVersion::R2000,
            DxfVersion::R2004,
            DxfVersion::R2007,
            DxfVersion::R2010,
            DxfVersion::R2013,
            DxfVersion::R2018,
        ] {
            assert_eq!(DxfVersion::from_token(version.token()), Some(version));
        }
    }

    #[test]
    fn test_from_token_unknown() {
        assert_eq!(DxfVersion::from_token("AC9999"), None);
        assert_eq!(DxfVersion::from_token(""), None);
        assert_eq!(DxfVersion::from_token("R2000"), None);
    }

    #[test]
    fn test_from_token_prerelease_r13() {
        assert_eq!(DxfVersion::from_token("AC1010"), Some(DxfVersion::R13));
        assert_eq!(DxfVersion::from_token("AC1011"), Some(DxfVersion::R13));
    }

    // ==================== Ordering tests ====================

    #[test]
    fn test_version_ordering() {
        assert!(DxfVersion::R12 < DxfVersion::R2000);
        assert!(DxfVersion::R2000 < DxfVersion::R2004);
        assert!(DxfVersion::R2018 > DxfVersion::R2013);
    }

    #[test]
    fn test_latest() {
        assert_eq!(DxfVersion::LATEST, DxfVersion::R2018);
        assert!(DxfVersion::R2013 < DxfVersion::LATEST);
    }

    // ==================== Encoding tests ====================

    #[test]
    fn test_is_utf8() {
        assert!(!DxfVersion::R12.is_utf8());
        assert!(!DxfVersion::R2004.is_utf8());
        assert!(DxfVersion::R2007.is_utf8());
        assert!(DxfVersion::R2018.is_utf8());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", DxfVersion::R2000), "AC1015");
        assert_eq!(format!("{}", DxfVersion::R12), "AC1009");
    }
}

//! Fixture loading and management for the base-12 codec conformance suite.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 digest of `bytes`, used to fingerprint an
/// on-disk fixture file the same way `frankenlibc-harness` fingerprints
/// evidence artifacts in its structured log (`ArtifactEntry::sha256`).
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// A single base-12 codec fixture case: a byte magnitude, a scale, and the
/// base-12 text it must encode to (and decode back from).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureCase {
    pub name: String,
    /// Big-endian magnitude bytes, each 0-255.
    pub bytes: Vec<u8>,
    pub scale: usize,
    pub expected_text: String,
}

/// A named collection of fixture cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    pub version: String,
    pub family: String,
    pub cases: Vec<FixtureCase>,
}

impl FixtureSet {
    /// Load a fixture set from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize a fixture set to a pretty JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load a fixture set from a file path.
    pub fn from_file(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    /// SHA-256 digest of a fixture file's raw bytes, for the harness to
    /// report alongside its results so a conformance run can be tied back
    /// to the exact fixture content that produced it.
    pub fn digest_file(path: &std::path::Path) -> std::io::Result<String> {
        let bytes = std::fs::read(path)?;
        Ok(sha256_hex(&bytes))
    }

    /// The base-12 fixture set built in to the harness: the spec.md §8
    /// scenarios 3 and 4, plus a handful of additional known encodings.
    #[must_use]
    pub fn builtin_base12() -> Self {
        Self {
            version: "1".to_string(),
            family: "base12".to_string(),
            cases: vec![
                FixtureCase {
                    name: "scenario-3-fixed-point".to_string(),
                    bytes: vec![0x01, 0x00],
                    scale: 2,
                    expected_text: "1.94".to_string(),
                },
                FixtureCase {
                    name: "scenario-4-u32-max".to_string(),
                    bytes: vec![0xFF, 0xFF, 0xFF, 0xFF],
                    scale: 0,
                    expected_text: "9ba461593".to_string(),
                },
                FixtureCase {
                    name: "zero".to_string(),
                    bytes: vec![0x00],
                    scale: 0,
                    expected_text: "0".to_string(),
                },
                FixtureCase {
                    name: "single-digit".to_string(),
                    bytes: vec![0x0b],
                    scale: 0,
                    expected_text: "b".to_string(),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_fixture_set_round_trips_through_json() {
        let set = FixtureSet::builtin_base12();
        let json = set.to_json().unwrap();
        let reparsed = FixtureSet::from_json(&json).unwrap();
        assert_eq!(reparsed.cases.len(), set.cases.len());
    }

    #[test]
    fn sha256_hex_is_stable_and_content_addressed() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b85"
        );
        assert_ne!(sha256_hex(b"a"), sha256_hex(b"b"));
    }

    #[test]
    fn builtin_fixtures_match_codec_output() {
        let set = FixtureSet::builtin_base12();
        for case in &set.cases {
            let encoded =
                trion_core::bytes_to_base12_scaled(&case.bytes, case.scale as i64).unwrap();
            assert_eq!(encoded, case.expected_text, "fixture {}", case.name);
        }
    }
}

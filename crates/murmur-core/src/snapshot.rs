use crate::error::CoreError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A SHA-256 checksum over a snapshot body, stored as 64 hex chars.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    pub fn of(data: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(data)))
    }

    /// Parse a full 64-char hex string.
    pub fn parse(hex_str: &str) -> Result<Self, CoreError> {
        let hex_str = hex_str.trim();
        if hex_str.len() != 64 || !hex_str.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CoreError::InvalidChecksum(hex_str.to_string()));
        }
        Ok(Self(hex_str.to_lowercase()))
    }

    pub fn hex(&self) -> &str {
        &self.0
    }

    pub fn short(&self) -> &str {
        &self.0[..8]
    }
}

impl fmt::Debug for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Checksum({})", self.short())
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short())
    }
}

/// Encode a snapshot as `<sha256 hex>\n<kind>\0<sorted json>`.
///
/// JSON object keys are sorted so that the same state always produces the
/// same bytes (and the same checksum).
pub fn encode(kind: &str, value: &impl Serialize) -> Result<Vec<u8>, CoreError> {
    let json_value = serde_json::to_value(value)?;
    let sorted_json = serde_json::to_string(&sort_value(json_value))?;

    let mut body = Vec::with_capacity(kind.len() + 1 + sorted_json.len());
    body.extend_from_slice(kind.as_bytes());
    body.push(0);
    body.extend_from_slice(sorted_json.as_bytes());

    let checksum = Checksum::of(&body);
    let mut buf = Vec::with_capacity(65 + body.len());
    buf.extend_from_slice(checksum.hex().as_bytes());
    buf.push(b'\n');
    buf.extend_from_slice(&body);
    Ok(buf)
}

/// Decode a snapshot written by [`encode`], verifying checksum and kind.
pub fn decode<T: DeserializeOwned>(expected_kind: &str, data: &[u8]) -> Result<T, CoreError> {
    let newline = data
        .iter()
        .position(|&b| b == b'\n')
        .ok_or_else(|| CoreError::InvalidChecksum("missing checksum header".into()))?;
    let header = std::str::from_utf8(&data[..newline])
        .map_err(|e| CoreError::InvalidChecksum(e.to_string()))?;
    let expected = Checksum::parse(header)?;
    let body = &data[newline + 1..];

    let actual = Checksum::of(body);
    if actual != expected {
        return Err(CoreError::Integrity {
            expected: expected.hex().to_string(),
            actual: actual.hex().to_string(),
        });
    }

    let null_pos = body
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| CoreError::UnknownKind("missing null separator".into()))?;
    let kind =
        std::str::from_utf8(&body[..null_pos]).map_err(|e| CoreError::UnknownKind(e.to_string()))?;
    if kind != expected_kind {
        return Err(CoreError::UnknownKind(kind.to_string()));
    }
    Ok(serde_json::from_slice(&body[null_pos + 1..])?)
}

fn sort_value(v: serde_json::Value) -> serde_json::Value {
    match v {
        serde_json::Value::Object(map) => {
            let sorted: serde_json::Map<String, serde_json::Value> = map
                .into_iter()
                .map(|(k, v)| (k, sort_value(v)))
                .collect::<std::collections::BTreeMap<_, _>>()
                .into_iter()
                .collect();
            serde_json::Value::Object(sorted)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(sort_value).collect())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        zebra: String,
        alpha: i32,
    }

    fn sample() -> Sample {
        Sample {
            zebra: "z".into(),
            alpha: 1,
        }
    }

    #[test]
    fn encode_sorts_keys() {
        let bytes = encode("sample", &sample()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let body = &text[65..];
        assert!(body.starts_with("sample\0"));
        let alpha_pos = body.find("\"alpha\"").unwrap();
        let zebra_pos = body.find("\"zebra\"").unwrap();
        assert!(alpha_pos < zebra_pos);
    }

    #[test]
    fn encode_is_deterministic() {
        let mut a = HashMap::new();
        a.insert("z_key".to_string(), 1);
        a.insert("a_key".to_string(), 2);
        let mut b = HashMap::new();
        b.insert("a_key".to_string(), 2);
        b.insert("z_key".to_string(), 1);
        assert_eq!(encode("map", &a).unwrap(), encode("map", &b).unwrap());
    }

    #[test]
    fn decode_restores_value() {
        let bytes = encode("sample", &sample()).unwrap();
        let restored: Sample = decode("sample", &bytes).unwrap();
        assert_eq!(restored, sample());
    }

    #[test]
    fn decode_detects_corruption() {
        let mut bytes = encode("sample", &sample()).unwrap();
        bytes.extend_from_slice(b"CORRUPTED");
        let err = decode::<Sample>("sample", &bytes).unwrap_err();
        assert!(err.to_string().contains("integrity"), "unexpected error: {err}");
    }

    #[test]
    fn decode_rejects_wrong_kind() {
        let bytes = encode("sample", &sample()).unwrap();
        assert!(matches!(
            decode::<Sample>("other", &bytes),
            Err(CoreError::UnknownKind(_))
        ));
    }

    #[test]
    fn checksum_parse_rejects_bad_input() {
        assert!(Checksum::parse("abcd").is_err());
        assert!(Checksum::parse(&"g".repeat(64)).is_err());
        let sum = Checksum::of(b"hello");
        assert_eq!(Checksum::parse(sum.hex()).unwrap(), sum);
        assert_eq!(format!("{}", sum).len(), 8);
    }
}

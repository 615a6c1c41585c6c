// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Undecoded item payloads.
//!
//! Result envelopes keep the stored JSON as bytes. Decoding into a caller type
//! happens only through [`RawValue::decode`], so items a caller skips are never
//! parsed.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Raw JSON payload of one stored item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawValue(Bytes);

impl RawValue {
    /// Wrap payload bytes as received.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// Payload bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Payload as text, if it is UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode the payload into `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.0).map_err(Error::Decode)
    }
}

impl From<Bytes> for RawValue {
    fn from(bytes: Bytes) -> Self {
        Self(bytes)
    }
}

impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Box::<serde_json::value::RawValue>::deserialize(deserializer)?;
        Ok(Self(Bytes::copy_from_slice(raw.get().as_bytes())))
    }
}

impl Serialize for RawValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::Error as _;

        let text = std::str::from_utf8(&self.0).map_err(S::Error::custom)?;
        let raw = serde_json::value::RawValue::from_string(text.trim_end().to_owned())
            .map_err(S::Error::custom)?;
        raw.serialize(serializer)
    }
}

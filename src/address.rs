//! Fixed-length ledger account identifiers
use std::fmt;
use std::str::FromStr;

use crate::error::ClientError;

pub const ADDRESS_LEN: usize = 20;

/// A 20-byte ledger account id. Text form is `0x` followed by 40 hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    pub fn from_hex(text: &str) -> Result<Self, ClientError> {
        let digits = text.strip_prefix("0x").unwrap_or(text);
        if digits.len() != ADDRESS_LEN * 2 {
            return Err(ClientError::InvalidArgument(format!(
                "address '{text}' must be {} hex digits",
                ADDRESS_LEN * 2
            )));
        }
        let bytes = hex::decode(digits)
            .map_err(|e| ClientError::InvalidArgument(format!("address '{text}': {e}")))?;
        let mut raw = [0u8; ADDRESS_LEN];
        raw.copy_from_slice(&bytes);
        Ok(Self(raw))
    }

    pub fn from_bytes(raw: [u8; ADDRESS_LEN]) -> Self {
        Self(raw)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl<C> minicbor::Encode<C> for Address {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        self.0.encode(e, ctx)
    }
}

impl<'b, C> minicbor::Decode<'b, C> for Address {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let raw: [u8; ADDRESS_LEN] = d.decode()?;
        Ok(Address(raw))
    }
}

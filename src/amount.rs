//! Conversion between decimal currency text and ledger minor units
use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
    USD,
    GBP,
    EUR,
    JPY,
}

impl Currency {
    /// Number of fractional digits the currency supports.
    pub fn decimals(&self) -> u32 {
        match self {
            Currency::USD | Currency::GBP | Currency::EUR => 2,
            Currency::JPY => 0,
        }
    }
}

/// An amount in the ledger's smallest indivisible unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MinorUnits(u128);

impl MinorUnits {
    pub const ZERO: MinorUnits = MinorUnits(0);

    pub fn new(value: u128) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: MinorUnits) -> Option<MinorUnits> {
        self.0.checked_add(other.0).map(MinorUnits)
    }
}

// Crosses the wire as a 16-byte big-endian array rather than a CBOR integer,
// since the full u128 range must survive the trip.
impl<C> minicbor::Encode<C> for MinorUnits {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        self.0.to_be_bytes().encode(e, ctx)
    }
}

impl<'b, C> minicbor::Decode<'b, C> for MinorUnits {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let raw: [u8; 16] = d.decode()?;
        Ok(MinorUnits(u128::from_be_bytes(raw)))
    }
}

/// Parse a non-negative decimal string into minor units.
///
/// Fails with [`ClientError::Precision`] when the input carries more
/// fractional digits than the currency supports, and with
/// [`ClientError::InvalidArgument`] on anything that is not a plain decimal
/// number. Never rounds.
pub fn to_minor_units(text: &str, currency: Currency) -> Result<MinorUnits, ClientError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ClientError::InvalidArgument("amount is empty".into()));
    }

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ClientError::InvalidArgument(format!(
            "'{text}' is not a non-negative decimal amount"
        )));
    }
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ClientError::InvalidArgument(format!(
            "'{text}' is not a non-negative decimal amount"
        )));
    }

    let max_decimals = currency.decimals();
    if fraction.len() as u32 > max_decimals {
        return Err(ClientError::Precision {
            input: text.to_owned(),
            max_decimals,
        });
    }

    let scale = 10u128.pow(max_decimals);
    let whole: u128 = whole
        .parse()
        .map_err(|_| ClientError::InvalidArgument(format!("'{text}' is out of range")))?;
    let mut fraction_units: u128 = if fraction.is_empty() {
        0
    } else {
        fraction
            .parse()
            .map_err(|_| ClientError::InvalidArgument(format!("'{text}' is out of range")))?
    };
    fraction_units *= 10u128.pow(max_decimals - fraction.len() as u32);

    whole
        .checked_mul(scale)
        .and_then(|units| units.checked_add(fraction_units))
        .map(MinorUnits)
        .ok_or_else(|| ClientError::InvalidArgument(format!("'{text}' is out of range")))
}

/// Render minor units as canonical decimal text: exactly `decimals()`
/// fractional digits, no decimal point for zero-decimal currencies.
///
/// Total inverse of [`to_minor_units`] over canonical text.
pub fn from_minor_units(units: MinorUnits, currency: Currency) -> String {
    let decimals = currency.decimals();
    if decimals == 0 {
        return units.0.to_string();
    }

    let scale = 10u128.pow(decimals);
    let whole = units.0 / scale;
    let fraction = units.0 % scale;
    format!("{whole}.{fraction:0width$}", width = decimals as usize)
}

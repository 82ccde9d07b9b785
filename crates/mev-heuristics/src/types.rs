//! Typed transaction records parsed from loosely-typed JSON input.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::error::{EngineError, EngineResult, FieldError};

/// Payload carried by a plain value transfer.
pub const EMPTY_PAYLOAD: &str = "0x";

/// Outcome of parsing one optional numeric field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    /// The field was missing or `null`.
    Absent,
    Value(T),
    /// The field was present but not parseable; holds the reason.
    Invalid(String),
}

impl<T: Copy> Field<T> {
    /// Resolve the field, substituting `default` when absent.
    pub fn resolve(&self, name: &'static str, default: T) -> Result<T, FieldError> {
        match self {
            Field::Absent => Ok(default),
            Field::Value(v) => Ok(*v),
            Field::Invalid(reason) => Err(FieldError::new(name, reason.clone())),
        }
    }
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Absent
    }
}

/// A transaction as seen by the detection engine.
///
/// Addresses are stored lowercased. Numeric fields keep their parse outcome
/// so each analyzer can decide how to treat a malformed value.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub tx_hash: String,
    pub from: String,
    pub to: String,
    /// Native-currency units (ETH).
    pub value: Field<Decimal>,
    /// Gwei.
    pub gas_price: Field<Decimal>,
    /// Gwei.
    pub max_fee_per_gas: Field<Decimal>,
    /// Gwei.
    pub max_priority_fee_per_gas: Field<Decimal>,
    pub gas_limit: Field<u64>,
    /// Hex-encoded call data, `0x` when empty.
    pub data: String,
    pub received_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Create a record with only the addresses set and every optional field absent.
    pub fn new(from: &str, to: &str, received_at: DateTime<Utc>) -> Self {
        Self {
            tx_hash: String::new(),
            from: from.to_lowercase(),
            to: to.to_lowercase(),
            value: Field::Absent,
            gas_price: Field::Absent,
            max_fee_per_gas: Field::Absent,
            max_priority_fee_per_gas: Field::Absent,
            gas_limit: Field::Absent,
            data: EMPTY_PAYLOAD.to_string(),
            received_at,
        }
    }

    /// Parse a record from a JSON object as received from callers.
    ///
    /// Numeric fields never fail here; their problems are recorded per field.
    /// String fields with the wrong JSON type make the record unusable.
    pub fn from_json(raw: &Value, received_at: DateTime<Utc>) -> EngineResult<Self> {
        let obj = raw.as_object().ok_or(EngineError::NotAnObject)?;

        Ok(Self {
            tx_hash: string_field(obj, "txHash")?.unwrap_or_default(),
            from: string_field(obj, "from")?.unwrap_or_default().to_lowercase(),
            to: string_field(obj, "to")?.unwrap_or_default().to_lowercase(),
            value: decimal_field(obj.get("value")),
            gas_price: decimal_field(obj.get("gasPrice")),
            max_fee_per_gas: decimal_field(obj.get("maxFeePerGas")),
            max_priority_fee_per_gas: decimal_field(obj.get("maxPriorityFeePerGas")),
            gas_limit: integer_field(obj.get("gasLimit")),
            data: string_field(obj, "data")?.unwrap_or_else(|| EMPTY_PAYLOAD.to_string()),
            received_at,
        })
    }
}

fn string_field(obj: &Map<String, Value>, name: &'static str) -> EngineResult<Option<String>> {
    match obj.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(EngineError::InvalidField {
            field: name,
            reason: format!("expected a string, got {}", other),
        }),
    }
}

/// Parse a decimal from a JSON number or numeric string.
pub fn decimal_field(raw: Option<&Value>) -> Field<Decimal> {
    match raw {
        None | Some(Value::Null) => Field::Absent,
        Some(Value::Number(n)) => parse_decimal(&n.to_string()),
        Some(Value::String(s)) => parse_decimal(s.trim()),
        Some(other) => Field::Invalid(format!("expected a number, got {}", other)),
    }
}

fn integer_field(raw: Option<&Value>) -> Field<u64> {
    match decimal_field(raw) {
        Field::Absent => Field::Absent,
        Field::Invalid(reason) => Field::Invalid(reason),
        Field::Value(d) if d.fract().is_zero() => match d.to_u64() {
            Some(v) => Field::Value(v),
            None if d.is_sign_positive() => Field::Value(u64::MAX),
            None => Field::Invalid(format!("{} is negative", d)),
        },
        Field::Value(d) => Field::Invalid(format!("{} is not an integer", d)),
    }
}

/// Well-formed numbers beyond `Decimal`'s range saturate instead of failing,
/// so they still clear every threshold.
fn parse_decimal(s: &str) -> Field<Decimal> {
    match Decimal::from_str(s).or_else(|_| Decimal::from_scientific(s)) {
        Ok(d) => Field::Value(d),
        Err(e) => match s.parse::<f64>() {
            Ok(f) if f.is_finite() => Field::Value(saturating_decimal(f)),
            _ => Field::Invalid(format!("{:?} is not numeric: {}", s, e)),
        },
    }
}

fn saturating_decimal(f: f64) -> Decimal {
    if f.abs() < 1.0 {
        Decimal::from_f64(f).unwrap_or(Decimal::ZERO)
    } else if f.is_sign_negative() {
        Decimal::from_f64(f).unwrap_or(Decimal::MIN)
    } else {
        Decimal::from_f64(f).unwrap_or(Decimal::MAX)
    }
}

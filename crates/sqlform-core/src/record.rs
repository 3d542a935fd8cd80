//! Record extraction.
//!
//! Turns entity instances, given as a map of field values, into the ordered
//! value tuples a table expects for insertion. The encoding of each column is
//! decided once, from the column's SQL type and the field's native type.

use crate::entity::EntityDef;
use crate::error::ExtractError;
use crate::native::{LiteralValue, NativeType};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use indexmap::IndexMap;
use sqlform_model::{DataType, Table};
use std::net::IpAddr;
use uuid::Uuid;

/// A runtime field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// Decimal number in its textual form.
    Decimal(String),
    /// UTF-8 string.
    String(String),
    /// Binary data.
    Bytes(Vec<u8>),
    /// UUID.
    Uuid(Uuid),
    /// IPv4 or IPv6 address.
    Ip(IpAddr),
    /// Calendar date.
    Date(NaiveDate),
    /// Time of day.
    Time(NaiveTime),
    /// Date and time.
    Timestamp(NaiveDateTime),
    /// Duration.
    Interval(TimeDelta),
    /// JSON document.
    Json(serde_json::Value),
    /// Enum member.
    Enum(LiteralValue),
    /// Sequence of values.
    List(Vec<Value>),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the value's shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Uuid(_) => "uuid",
            Value::Ip(_) => "ip",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::Timestamp(_) => "timestamp",
            Value::Interval(_) => "interval",
            Value::Json(_) => "json",
            Value::Enum(_) => "enum",
            Value::List(_) => "list",
        }
    }

    /// Convert to a JSON value.
    ///
    /// Binary data becomes a hex string, intervals become fractional seconds.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Decimal(s) | Value::String(s) => Json::String(s.clone()),
            Value::Bytes(b) => Json::String(hex::encode(b)),
            Value::Uuid(u) => Json::String(u.to_string()),
            Value::Ip(ip) => Json::String(ip.to_string()),
            Value::Date(d) => Json::String(d.to_string()),
            Value::Time(t) => Json::String(t.to_string()),
            Value::Timestamp(ts) => Json::String(ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
            Value::Interval(d) => {
                let seconds = d.num_seconds() as f64 + f64::from(d.subsec_nanos()) / 1e9;
                serde_json::Number::from_f64(seconds)
                    .map(Json::Number)
                    .unwrap_or(Json::Null)
            }
            Value::Json(j) => j.clone(),
            Value::Enum(LiteralValue::Str(s)) => Json::String(s.clone()),
            Value::Enum(LiteralValue::Int(i)) => Json::from(*i),
            Value::Enum(LiteralValue::Bool(b)) => Json::Bool(*b),
            Value::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Uuid> for Value {
    fn from(u: Uuid) -> Self {
        Value::Uuid(u)
    }
}

impl From<IpAddr> for Value {
    fn from(ip: IpAddr) -> Self {
        Value::Ip(ip)
    }
}

impl From<serde_json::Value> for Value {
    fn from(j: serde_json::Value) -> Self {
        Value::Json(j)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// An entity instance: field values by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field value.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Set a field value in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Get a field value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// How a field value is stored in its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueEncoding {
    /// Stored as given.
    Passthrough,
    /// UUIDs and IP addresses packed into raw bytes.
    Binary,
    /// Booleans stored as `0`/`1`.
    Integer,
    /// Lists and JSON documents serialized to text.
    JsonText,
}

impl ValueEncoding {
    /// Pick the encoding for a field of the given native type stored in a
    /// column of the given SQL type.
    pub fn for_column(data_type: &DataType, field_type: &NativeType) -> Self {
        let native = field_type.unadorned();
        match data_type {
            dt if dt.is_binary()
                && matches!(
                    native,
                    NativeType::Uuid | NativeType::Ipv4Addr | NativeType::Ipv6Addr
                ) =>
            {
                ValueEncoding::Binary
            }
            DataType::Integer { .. } if *native == NativeType::Bool => ValueEncoding::Integer,
            DataType::Json => ValueEncoding::JsonText,
            DataType::UserDefined(name) if is_json_type_name(&name.local_name()) => {
                ValueEncoding::JsonText
            }
            dt if dt.is_character()
                && matches!(
                    native,
                    NativeType::List(_) | NativeType::Json | NativeType::Ref(_)
                ) =>
            {
                ValueEncoding::JsonText
            }
            _ => ValueEncoding::Passthrough,
        }
    }
}

fn is_json_type_name(name: &str) -> bool {
    name.eq_ignore_ascii_case("json") || name.eq_ignore_ascii_case("jsonb")
}

#[derive(Debug, Clone)]
struct Slot {
    column: String,
    field: String,
    accepts_null: bool,
    encoding: ValueEncoding,
}

/// Extracts insertion tuples for one table from entity records.
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    slots: Vec<Slot>,
}

impl RecordExtractor {
    /// Bind the columns of a table to the fields of its entity.
    ///
    /// Every column must correspond to a field of the same name.
    pub fn new(table: &Table, entity: &EntityDef) -> Result<Self, ExtractError> {
        let slots = table
            .columns
            .values()
            .map(|column| {
                let field = entity.get_field(&column.name).ok_or_else(|| {
                    ExtractError::UnknownColumn {
                        entity: entity.name.clone(),
                        column: column.name.clone(),
                    }
                })?;
                Ok(Slot {
                    column: column.name.clone(),
                    field: field.name.clone(),
                    accepts_null: column.nullable || column.identity,
                    encoding: ValueEncoding::for_column(&column.data_type, &field.field_type),
                })
            })
            .collect::<Result<Vec<_>, ExtractError>>()?;
        Ok(Self { slots })
    }

    /// Column names, in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.column.as_str())
    }

    /// Encoding chosen for a column.
    pub fn encoding(&self, column: &str) -> Option<ValueEncoding> {
        self.slots
            .iter()
            .find(|s| s.column == column)
            .map(|s| s.encoding)
    }

    /// Produce the value tuple of a record, in column order.
    pub fn extract(&self, record: &Record) -> Result<Vec<Value>, ExtractError> {
        self.slots
            .iter()
            .map(|slot| match record.get(&slot.field) {
                Some(value) if !value.is_null() => encode(slot, value),
                _ if slot.accepts_null => Ok(Value::Null),
                _ => Err(ExtractError::MissingValue(slot.column.clone())),
            })
            .collect()
    }

    /// Extract many records.
    pub fn extract_all<'r>(
        &self,
        records: impl IntoIterator<Item = &'r Record>,
    ) -> Result<Vec<Vec<Value>>, ExtractError> {
        records.into_iter().map(|r| self.extract(r)).collect()
    }
}

fn encode(slot: &Slot, value: &Value) -> Result<Value, ExtractError> {
    let mismatch = |expected: &str| ExtractError::ValueMismatch {
        column: slot.column.clone(),
        expected: expected.to_string(),
        found: value.kind().to_string(),
    };

    // enum members are stored by value in every encoding
    if let Value::Enum(literal) = value {
        return match (slot.encoding, literal) {
            (ValueEncoding::Integer, LiteralValue::Bool(b)) => Ok(Value::Int(i64::from(*b))),
            (ValueEncoding::Binary, _) => Err(mismatch("binary data")),
            (_, LiteralValue::Str(s)) => Ok(Value::String(s.clone())),
            (_, LiteralValue::Int(i)) => Ok(Value::Int(*i)),
            (_, LiteralValue::Bool(b)) => Ok(Value::Bool(*b)),
        };
    }

    match slot.encoding {
        ValueEncoding::Passthrough => Ok(value.clone()),
        ValueEncoding::Binary => match value {
            Value::Uuid(u) => Ok(Value::Bytes(u.as_bytes().to_vec())),
            Value::Ip(IpAddr::V4(ip)) => Ok(Value::Bytes(ip.octets().to_vec())),
            Value::Ip(IpAddr::V6(ip)) => Ok(Value::Bytes(ip.octets().to_vec())),
            Value::Bytes(_) => Ok(value.clone()),
            _ => Err(mismatch("binary data")),
        },
        ValueEncoding::Integer => match value {
            Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
            Value::Int(_) => Ok(value.clone()),
            _ => Err(mismatch("integer")),
        },
        ValueEncoding::JsonText => match value {
            Value::List(_) | Value::Json(_) => {
                Ok(Value::String(serde_json::to_string(&value.to_json())?))
            }
            Value::String(_) => Ok(value.clone()),
            _ => Err(mismatch("JSON document")),
        },
    }
}

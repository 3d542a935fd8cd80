//! Random record generation.
//!
//! Populates entity records with random values derived from the same type
//! descriptions the converter reads, so generated records can be fed to a
//! [`RecordExtractor`](crate::record::RecordExtractor) of the matching table.
//! Useful for exercising value extraction and for load tests.

use crate::entity::{EntityDef, EnumDef, FieldDef, TypeDef};
use crate::error::{ConvertError, Result};
use crate::native::{Annotation, LiteralValue, NativeType};
use crate::record::{Record, Value};
use crate::registry::TypeRegistry;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use tracing::debug;
use uuid::Uuid;

/// Default maximum length of generated strings without a `MaxLength` annotation.
pub const DEFAULT_MAX_STRING_LENGTH: u32 = 1024;

/// Maximum number of items in a generated list.
pub const MAX_LIST_ITEMS: usize = 5;

/// Generates records whose fields are populated with random values,
/// recursively for structs and lists.
///
/// Integer primary keys are a shuffled permutation of `0..count`, so every
/// record of a sample gets a distinct key.
pub struct RandomGenerator<'r> {
    registry: &'r TypeRegistry,
    rng: StdRng,
    keys: Vec<i64>,
}

impl<'r> RandomGenerator<'r> {
    /// Create a generator for a sample of `count` records.
    pub fn new(registry: &'r TypeRegistry, count: usize) -> Self {
        Self::with_rng(registry, count, StdRng::from_entropy())
    }

    /// Create a reproducible generator.
    pub fn with_seed(registry: &'r TypeRegistry, count: usize, seed: u64) -> Self {
        Self::with_rng(registry, count, StdRng::seed_from_u64(seed))
    }

    fn with_rng(registry: &'r TypeRegistry, count: usize, mut rng: StdRng) -> Self {
        let mut keys: Vec<i64> = (0..count as i64).collect();
        keys.shuffle(&mut rng);
        Self {
            registry,
            rng,
            keys,
        }
    }

    /// Number of records in the sample.
    pub fn count(&self) -> usize {
        self.keys.len()
    }

    /// Generate the `index`-th record of an entity.
    pub fn record(&mut self, entity: &EntityDef, index: usize) -> Result<Record> {
        let mut record = Record::new();
        for field in &entity.fields {
            let value = if field.name == entity.primary_key {
                self.key(field, index)
            } else {
                self.field(field, index)
            }
            .map_err(|err| err.in_entity(&entity.name))?;
            record.set(field.name.clone(), value);
        }
        Ok(record)
    }

    /// Generate a full sample of records of an entity.
    pub fn records(&mut self, entity: &EntityDef) -> Result<Vec<Record>> {
        let records = (0..self.count())
            .map(|index| self.record(entity, index))
            .collect::<Result<Vec<_>>>()?;
        debug!(entity = %entity.name, count = records.len(), "Generated random records");
        Ok(records)
    }

    /// Generate a value of a native type.
    pub fn value(&mut self, typ: &NativeType, index: usize) -> Result<Value> {
        let value = match typ {
            NativeType::Bool => Value::Bool(random_bool(&mut self.rng)),
            NativeType::Int8 => Value::Int(self.rng.gen_range(0..=i64::from(i8::MAX))),
            NativeType::Int16 => Value::Int(self.rng.gen_range(0..=i64::from(i16::MAX))),
            NativeType::UInt8 => Value::Int(self.rng.gen_range(0..=i64::from(u8::MAX))),
            NativeType::UInt16 => Value::Int(self.rng.gen_range(0..=i64::from(u16::MAX))),
            NativeType::Int
            | NativeType::Int32
            | NativeType::Int64
            | NativeType::UInt32
            | NativeType::UInt64 => Value::Int(self.rng.gen_range(0..=1_000_000)),
            NativeType::Float | NativeType::Float32 | NativeType::Float64 => {
                Value::Float(self.rng.gen::<f64>())
            }
            NativeType::Decimal => {
                Value::Decimal(format!("{:.2}", self.rng.gen_range(0.0..1000.0)))
            }
            NativeType::String => Value::String(random_alphanumeric(
                &mut self.rng,
                0,
                DEFAULT_MAX_STRING_LENGTH as usize,
            )),
            NativeType::DateTime => {
                let start = epoch_start(typ)?;
                Value::Timestamp(random_datetime(&mut self.rng, start, Utc::now().naive_utc()))
            }
            NativeType::Date => {
                let start = epoch_start(typ)?.date();
                Value::Date(random_date(&mut self.rng, start, Utc::now().date_naive()))
            }
            NativeType::Time => Value::Time(random_time(&mut self.rng).ok_or_else(|| {
                ConvertError::unsupported(typ, "time of day out of range")
            })?),
            NativeType::TimeDelta => {
                Value::Interval(TimeDelta::seconds(self.rng.gen_range(0..86_400)))
            }
            NativeType::Uuid => Value::Uuid(random_uuid(&mut self.rng)),
            NativeType::Ipv4Addr => Value::Ip(IpAddr::V4(random_ipv4(&mut self.rng))),
            NativeType::Ipv6Addr => Value::Ip(IpAddr::V6(random_ipv6(&mut self.rng))),
            NativeType::Json => Value::Json(serde_json::json!({
                "value": self.rng.gen_range(0..1000),
            })),
            NativeType::Annotated { base, annotations } => {
                match (base.unadorned(), max_length(annotations)) {
                    (NativeType::String, Some(limit)) => {
                        Value::String(random_alphanumeric(&mut self.rng, 0, limit as usize))
                    }
                    _ => self.value(base, index)?,
                }
            }
            NativeType::Ref(name) | NativeType::Forward(name) => {
                let registry = self.registry;
                match registry.resolve(name)? {
                    TypeDef::Enum(enum_def) => self.enum_value(enum_def, typ)?,
                    TypeDef::Entity(entity) => {
                        // references hold the key of the referenced entity
                        let key = registry.primary_key_field(entity)?;
                        self.value(&key.field_type, index)?
                    }
                    TypeDef::Struct(def) => {
                        let mut object = serde_json::Map::new();
                        for field in &def.fields {
                            let value = self.field(field, index)?;
                            object.insert(field.name.clone(), value.to_json());
                        }
                        Value::Json(serde_json::Value::Object(object))
                    }
                }
            }
            NativeType::Literal(values) => match values.choose(&mut self.rng) {
                Some(value) => literal_value(value),
                None => return Err(ConvertError::unsupported(typ, "literal type without values")),
            },
            NativeType::List(item) => {
                let registry = self.registry;
                match registry.as_enum(item.unadorned()) {
                    Some(enum_def) => Value::List(
                        random_enum_subset(&mut self.rng, enum_def, MAX_LIST_ITEMS)
                            .into_iter()
                            .map(Value::Enum)
                            .collect(),
                    ),
                    None => {
                        let count = self.rng.gen_range(0..=MAX_LIST_ITEMS);
                        Value::List(
                            (0..count)
                                .map(|_| self.value(item, index))
                                .collect::<Result<Vec<_>>>()?,
                        )
                    }
                }
            }
            NativeType::Union(members) => {
                let registry = self.registry;
                if let Some(enum_def) = registry.as_extensible_enum(typ) {
                    self.enum_value(enum_def, typ)?
                } else {
                    let member = members.choose(&mut self.rng).ok_or_else(|| {
                        ConvertError::unsupported(typ, "union type without members")
                    })?;
                    self.value(member, index)?
                }
            }
            NativeType::Custom { .. } => {
                return Err(ConvertError::unsupported(
                    typ,
                    "no random value generator for opaque type",
                ))
            }
        };
        Ok(value)
    }

    fn key(&mut self, field: &FieldDef, index: usize) -> Result<Value> {
        match field.field_type.unadorned() {
            NativeType::Uuid => Ok(Value::Uuid(random_uuid(&mut self.rng))),
            NativeType::Int
            | NativeType::Int32
            | NativeType::Int64
            | NativeType::UInt32
            | NativeType::UInt64 => self.keys.get(index).map(|k| Value::Int(*k)).ok_or_else(|| {
                ConvertError::unsupported(
                    &field.field_type,
                    format!("record index {} exceeds sample size {}", index, self.keys.len()),
                )
            }),
            other => Err(ConvertError::unsupported(other, "unsupported primary key type")),
        }
    }

    fn field(&mut self, field: &FieldDef, index: usize) -> Result<Value> {
        if field.nullable && !random_bool(&mut self.rng) {
            return Ok(Value::Null);
        }
        self.value(&field.field_type, index)
    }

    fn enum_value(&mut self, enum_def: &EnumDef, typ: &NativeType) -> Result<Value> {
        random_enum(&mut self.rng, enum_def)
            .map(Value::Enum)
            .ok_or_else(|| ConvertError::unsupported(typ, "enumeration without members"))
    }
}

/// Generate `count` random records of a registered entity.
pub fn random_records(registry: &TypeRegistry, entity: &str, count: usize) -> Result<Vec<Record>> {
    match registry.resolve(entity)? {
        TypeDef::Entity(def) => RandomGenerator::new(registry, count).records(def),
        other => Err(ConvertError::unsupported(
            other.name(),
            "not an entity type; it has no primary key",
        )),
    }
}

/// A fair coin toss.
pub fn random_bool<R: Rng + ?Sized>(rng: &mut R) -> bool {
    rng.gen_bool(0.5)
}

/// A random instant between `start` (inclusive) and `end` (exclusive), with
/// whole-second resolution.
pub fn random_datetime<R: Rng + ?Sized>(
    rng: &mut R,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> NaiveDateTime {
    let seconds = (end - start).num_seconds().max(1);
    start + TimeDelta::seconds(rng.gen_range(0..seconds))
}

/// A random date between `start` (inclusive) and `end` (exclusive).
pub fn random_date<R: Rng + ?Sized>(rng: &mut R, start: NaiveDate, end: NaiveDate) -> NaiveDate {
    let days = (end - start).num_days().max(1);
    start + TimeDelta::days(rng.gen_range(0..days))
}

/// A random time of day with whole-second resolution.
pub fn random_time<R: Rng + ?Sized>(rng: &mut R) -> Option<NaiveTime> {
    NaiveTime::from_num_seconds_from_midnight_opt(rng.gen_range(0..86_400), 0)
}

/// A random member value of an enumeration.
pub fn random_enum<R: Rng + ?Sized>(rng: &mut R, enum_def: &EnumDef) -> Option<LiteralValue> {
    enum_def.members.choose(rng).map(|(_, value)| value.clone())
}

/// A random selection of distinct enum member values, at most `max_count`
/// of them, in random order.
pub fn random_enum_subset<R: Rng + ?Sized>(
    rng: &mut R,
    enum_def: &EnumDef,
    max_count: usize,
) -> Vec<LiteralValue> {
    let mut values: Vec<LiteralValue> = enum_def.members.iter().map(|(_, v)| v.clone()).collect();
    values.shuffle(rng);
    values.truncate(rng.gen_range(0..=max_count));
    values
}

/// A random IPv4 address.
pub fn random_ipv4<R: Rng + ?Sized>(rng: &mut R) -> Ipv4Addr {
    Ipv4Addr::from(rng.gen::<[u8; 4]>())
}

/// A random IPv6 address.
pub fn random_ipv6<R: Rng + ?Sized>(rng: &mut R) -> Ipv6Addr {
    Ipv6Addr::from(rng.gen::<[u8; 16]>())
}

/// A random version 4 UUID.
pub fn random_uuid<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    uuid::Builder::from_random_bytes(rng.gen()).into_uuid()
}

/// A random string of ASCII letters and digits, between `min_len` and
/// `max_len` characters long.
pub fn random_alphanumeric<R: Rng + ?Sized>(rng: &mut R, min_len: usize, max_len: usize) -> String {
    let len = rng.gen_range(min_len..=max_len.max(min_len));
    (0..len).map(|_| rng.sample(Alphanumeric) as char).collect()
}

fn max_length(annotations: &[Annotation]) -> Option<u32> {
    annotations.iter().rev().find_map(|a| match a {
        Annotation::MaxLength(limit) => Some(*limit),
        _ => None,
    })
}

fn literal_value(value: &LiteralValue) -> Value {
    match value {
        LiteralValue::Str(s) => Value::String(s.clone()),
        LiteralValue::Int(i) => Value::Int(*i),
        LiteralValue::Bool(b) => Value::Bool(*b),
    }
}

/// Lower bound of generated timestamps.
fn epoch_start(typ: &NativeType) -> Result<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1982, 10, 23)
        .and_then(|d| d.and_hms_opt(2, 30, 0))
        .ok_or_else(|| ConvertError::unsupported(typ, "invalid lower bound"))
}

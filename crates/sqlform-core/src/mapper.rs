//! Native type to SQL data type mapping.

use crate::converter::Converter;
use crate::entity::{EnumDef, TypeDef};
use crate::error::{ConvertError, Result};
use crate::native::{Annotation, LiteralValue, NativeType};
use crate::options::{ArrayMode, EnumMode, StructMode};
use sqlform_model::{compatible_type, DataType};
use tracing::trace;

/// Maximum length of an enumeration label.
pub const ENUM_NAME_LENGTH: u32 = 64;

/// Native type of enumeration labels.
pub fn enum_label_type() -> NativeType {
    NativeType::bounded_string(ENUM_NAME_LENGTH)
}

impl Converter<'_> {
    /// Map a type that needs no owning context: a primitive, an annotated
    /// type, or an enum.
    pub fn map_simple(&self, typ: &NativeType) -> Result<DataType> {
        if let Some(substitute) = self.options.substitutions.get(typ) {
            return Ok(substitute.clone());
        }

        let data_type = match typ {
            NativeType::Bool => DataType::Boolean,
            NativeType::Int => DataType::Integer { width: 8 },
            NativeType::Int8 => self.narrow_integer("int1", 2),
            NativeType::Int16 => DataType::Integer { width: 2 },
            NativeType::Int32 => DataType::Integer { width: 4 },
            NativeType::Int64 => DataType::Integer { width: 8 },
            NativeType::UInt8 => self.narrow_integer("uint1", 2),
            NativeType::UInt16 => self.narrow_integer("uint2", 2),
            NativeType::UInt32 => self.narrow_integer("uint4", 4),
            NativeType::UInt64 => self.narrow_integer("uint8", 8),
            NativeType::Float | NativeType::Float64 => DataType::Double,
            NativeType::Float32 => DataType::Real,
            NativeType::String => DataType::text(),
            NativeType::Decimal => DataType::decimal(),
            NativeType::DateTime => DataType::timestamp(),
            NativeType::Date => DataType::Date,
            NativeType::Time => DataType::time(),
            NativeType::TimeDelta => DataType::Interval,
            NativeType::Uuid => DataType::Uuid,
            NativeType::Json => DataType::Json,
            NativeType::Ipv4Addr => DataType::binary(4),
            NativeType::Ipv6Addr => DataType::binary(16),
            NativeType::Annotated { base, annotations } => {
                return self.map_annotated(typ, base, annotations)
            }
            NativeType::Ref(_) | NativeType::Forward(_) => match self.registry.as_enum(typ) {
                Some(enum_def) => return self.map_enum(enum_def),
                None => return Err(ConvertError::unsupported(typ, "not a simple type")),
            },
            NativeType::Literal(_)
            | NativeType::List(_)
            | NativeType::Union(_)
            | NativeType::Custom { .. } => {
                return Err(ConvertError::unsupported(typ, "not a simple type"))
            }
        };
        Ok(data_type)
    }

    /// Map the declared type of a field of `owner`.
    pub fn map_member(&self, typ: &NativeType, owner: &str) -> Result<DataType> {
        if let Some(substitute) = self.options.substitutions.get(typ) {
            return Ok(substitute.clone());
        }

        let data_type = match typ {
            NativeType::Annotated { base, annotations } => {
                if self.registry.is_simple(base) {
                    self.map_simple(typ)?
                } else if annotations
                    .iter()
                    .all(|a| self.options.skip_annotations.contains(&a.kind()))
                {
                    self.map_member(base, owner)?
                } else {
                    return Err(ConvertError::unsupported(
                        typ,
                        "annotations apply only to simple types",
                    ));
                }
            }
            NativeType::Ref(name) | NativeType::Forward(name) => {
                match self.registry.resolve(name)? {
                    TypeDef::Enum(enum_def) => self.map_enum(enum_def)?,
                    TypeDef::Entity(entity) => {
                        // many-to-one: the column holds the referenced key
                        let key = self.registry.primary_key_field(entity)?;
                        self.map_member(&key.field_type, &entity.name)?
                    }
                    TypeDef::Struct(def) => match self.options.struct_mode {
                        StructMode::Type => {
                            DataType::UserDefined(self.qualified_id(&def.module, &def.name)?)
                        }
                        StructMode::Json => self.map_member(&NativeType::Json, owner)?,
                    },
                }
            }
            NativeType::Literal(values) => self.map_literal(typ, values, owner)?,
            NativeType::List(item) => self.map_list(typ, item, owner)?,
            NativeType::Union(members) => self.map_union(typ, members, owner)?,
            NativeType::Custom { module, name } => {
                DataType::UserDefined(self.qualified_id(module, name)?)
            }
            primitive => self.map_simple(primitive)?,
        };

        trace!(owner, native = %typ, sql = %data_type, "Mapped member type");
        Ok(data_type)
    }

    /// Native type holding the values of an enum.
    pub fn enum_value_type(&self, enum_def: &EnumDef) -> Result<NativeType> {
        let mut value_type: Option<NativeType> = None;
        for (_, value) in &enum_def.members {
            let native = value.native_type();
            match &value_type {
                Some(existing) if existing != &native => {
                    return Err(ConvertError::unsupported(
                        &enum_def.name,
                        format!(
                            "inconsistent enumeration value types: {}, {}",
                            existing, native
                        ),
                    ))
                }
                Some(_) => {}
                None => value_type = Some(native),
            }
        }

        Ok(match value_type {
            Some(NativeType::String) | None => enum_label_type(),
            Some(other) => other,
        })
    }

    fn narrow_integer(&self, extra: &str, width: u8) -> DataType {
        if self.options.extra_numeric_types {
            DataType::user_defined(extra)
        } else {
            DataType::Integer { width }
        }
    }

    fn map_annotated(
        &self,
        typ: &NativeType,
        base: &NativeType,
        annotations: &[Annotation],
    ) -> Result<DataType> {
        // nested annotations apply innermost first
        let mut all = Vec::new();
        flatten_annotations(base, &mut all);
        all.extend(annotations.iter());
        let unadorned = typ.unadorned();

        let mut sql_type = match self.options.substitutions.get(unadorned) {
            Some(substitute) => Some(substitute.clone()),
            None => match unadorned {
                NativeType::String => Some(DataType::text()),
                NativeType::Float => Some(DataType::Float { precision: None }),
                NativeType::Decimal => Some(DataType::decimal()),
                NativeType::DateTime => Some(DataType::timestamp()),
                NativeType::Time => Some(DataType::time()),
                _ => None,
            },
        };

        for annotation in all {
            if self.options.skip_annotations.contains(&annotation.kind()) {
                continue;
            }
            let Some(target) = sql_type.as_mut() else {
                return Err(ConvertError::unsupported(typ, "unsupported annotated type"));
            };
            if !apply_annotation(target, annotation) {
                return Err(ConvertError::unsupported(
                    typ,
                    format!("annotation `{}` does not apply to `{}`", annotation, target),
                ));
            }
        }

        match sql_type {
            Some(data_type) => Ok(data_type),
            // only skipped annotations on a type without a refinable form
            None => self.map_simple(unadorned),
        }
    }

    pub(crate) fn map_enum(&self, enum_def: &EnumDef) -> Result<DataType> {
        if self.is_small_enum(enum_def) {
            return self.enum_key_type();
        }

        match self.options.enum_mode {
            EnumMode::Type => Ok(DataType::UserDefined(
                self.qualified_id(&enum_def.module, &enum_def.name)?,
            )),
            EnumMode::Inline => Ok(DataType::Enum {
                values: enum_def.value_labels(),
            }),
            EnumMode::Relation => self.enum_key_type(),
            EnumMode::Check => self.map_simple(&self.enum_value_type(enum_def)?),
        }
    }

    fn map_literal(
        &self,
        typ: &NativeType,
        values: &[LiteralValue],
        owner: &str,
    ) -> Result<DataType> {
        if values.is_empty() {
            return Err(ConvertError::unsupported(typ, "literal type without values"));
        }

        let types = if values.iter().all(|v| matches!(v, LiteralValue::Str(_))) {
            values
                .iter()
                // char(0) is not a valid column type
                .map(|v| DataType::fixed_char((v.label().chars().count() as u32).max(1)))
                .collect::<Vec<_>>()
        } else {
            values
                .iter()
                .map(|v| self.map_member(&v.native_type(), owner))
                .collect::<Result<Vec<_>>>()?
        };

        compatible_type(&types).map_err(|source| ConvertError::IncompatibleUnionTypes {
            union: typ.to_string(),
            source,
        })
    }

    fn map_list(&self, typ: &NativeType, item: &NativeType, owner: &str) -> Result<DataType> {
        if self.registry.is_simple(item) {
            return match self.options.array_mode {
                ArrayMode::Array => {
                    if let Some(enum_def) = self.registry.as_enum(item.unadorned()) {
                        if self.options.enum_mode == EnumMode::Relation {
                            return Err(ConvertError::unsupported(
                                typ,
                                "use a join table; cannot convert list of enumeration type to SQL array",
                            ));
                        }
                        if self.is_small_enum(enum_def) {
                            let value_type = self.enum_value_type(enum_def)?;
                            return Ok(DataType::array(self.map_simple(&value_type)?));
                        }
                    }
                    Ok(DataType::array(self.map_simple(item)?))
                }
                ArrayMode::Json => self.map_member(&NativeType::Json, owner),
            };
        }

        if self.registry.is_entity(item) {
            return Err(ConvertError::unsupported(
                typ,
                "use a join table; cannot convert list of entity type to SQL array",
            ));
        }

        let element = match item {
            NativeType::Ref(name) | NativeType::Forward(name) => {
                let def = self.registry.resolve(name)?;
                self.qualified_id(def.module(), def.name())?
            }
            NativeType::Custom { module, name } => self.qualified_id(module, name)?,
            _ => {
                return Err(ConvertError::unsupported(
                    typ,
                    format!("unsupported array item type `{}`", item),
                ))
            }
        };

        match self.options.array_mode {
            ArrayMode::Array => Ok(DataType::array(DataType::UserDefined(element))),
            ArrayMode::Json => self.map_member(&NativeType::Json, owner),
        }
    }

    fn map_union(&self, typ: &NativeType, members: &[NativeType], owner: &str) -> Result<DataType> {
        if self.registry.as_extensible_enum(typ).is_some() {
            return self.enum_key_type();
        }

        if !members.is_empty() && members.iter().all(|m| self.registry.is_entity(m)) {
            return self.map_discriminated(typ, members, owner);
        }

        let types = members
            .iter()
            .map(|m| self.map_member(m, owner))
            .collect::<Result<Vec<_>>>()?;

        compatible_type(&types).map_err(|source| ConvertError::IncompatibleUnionTypes {
            union: typ.to_string(),
            source,
        })
    }

    fn map_discriminated(
        &self,
        typ: &NativeType,
        members: &[NativeType],
        owner: &str,
    ) -> Result<DataType> {
        let mut key_types: Vec<&NativeType> = Vec::new();
        for entity in members.iter().filter_map(|m| self.registry.as_entity(m)) {
            let key = &self.registry.primary_key_field(entity)?.field_type;
            if !key_types.contains(&key) {
                key_types.push(key);
            }
        }

        match key_types.as_slice() {
            [common] => self.map_member(common, owner),
            _ => Err(ConvertError::InconsistentKeyTypes {
                union: typ.to_string(),
                key_types: key_types
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }
}

fn flatten_annotations<'t>(typ: &'t NativeType, out: &mut Vec<&'t Annotation>) {
    if let NativeType::Annotated { base, annotations } = typ {
        flatten_annotations(base, out);
        out.extend(annotations.iter());
    }
}

/// Refine a data type in place; false if the annotation does not apply.
fn apply_annotation(target: &mut DataType, annotation: &Annotation) -> bool {
    match (target, annotation) {
        (DataType::VariableCharacter { limit }, Annotation::MaxLength(n))
        | (DataType::FixedCharacter { limit }, Annotation::MaxLength(n)) => {
            *limit = Some(*n);
        }
        (
            DataType::Float { precision },
            Annotation::Precision {
                significant_digits, ..
            },
        ) => {
            *precision = Some(*significant_digits);
        }
        (
            DataType::Decimal { precision, scale },
            Annotation::Precision {
                significant_digits,
                decimal_digits,
            },
        ) => {
            *precision = Some(*significant_digits);
            *scale = *decimal_digits;
        }
        (DataType::Time { precision, .. }, Annotation::TimePrecision(n))
        | (DataType::Timestamp { precision, .. }, Annotation::TimePrecision(n)) => {
            *precision = Some(*n);
        }
        (DataType::Time { with_time_zone, .. }, Annotation::TimeZone)
        | (DataType::Timestamp { with_time_zone, .. }, Annotation::TimeZone) => {
            *with_time_zone = true;
        }
        (DataType::VariableBinary { storage }, Annotation::Storage(n))
        | (DataType::FixedBinary { storage }, Annotation::Storage(n)) => {
            *storage = Some(*n);
        }
        _ => return false,
    }
    true
}

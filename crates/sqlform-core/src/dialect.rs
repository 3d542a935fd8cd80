//! Dialect profiles.
//!
//! A dialect decides which option combinations it can render and which data
//! types it substitutes for native types. Invalid combinations are rejected
//! here, before any conversion starts.

use crate::error::{ConvertError, Result};
use crate::native::{AnnotationKind, NativeType};
use crate::options::{ArrayMode, ConverterOptions, EnumMode, NamespaceMapping, StructMode};
use serde::{Deserialize, Serialize};
use sqlform_model::DataType;
use std::collections::BTreeSet;
use std::fmt;

/// Largest `varchar` MySQL accepts for a row-stored string.
const MYSQL_TEXT_LIMIT: u32 = 16_777_215;

/// A supported target database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// PostgreSQL.
    #[serde(rename = "postgresql")]
    PostgreSql,
    /// MySQL.
    #[serde(rename = "mysql")]
    MySql,
    /// Delta Lake.
    Delta,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::PostgreSql => write!(f, "postgresql"),
            Dialect::MySql => write!(f, "mysql"),
            Dialect::Delta => write!(f, "delta"),
        }
    }
}

/// How an upsert refers to the values of the row being inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertSyntax {
    /// `ON DUPLICATE KEY UPDATE c = VALUES(c)`.
    ValuesFunction,
    /// `ON CONFLICT ... DO UPDATE SET c = EXCLUDED.c`.
    ExcludedAlias,
}

/// Options requested by the caller; unset modes take the dialect default.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Requested enum mode.
    pub enum_mode: Option<EnumMode>,
    /// Requested struct mode.
    pub struct_mode: Option<StructMode>,
    /// Requested array mode.
    pub array_mode: Option<ArrayMode>,
    /// Module to namespace entries, validated when the profile is applied.
    pub namespaces: Vec<(String, Option<String>)>,
    /// Emit optional foreign key constraints.
    pub foreign_constraints: bool,
    /// Annotation kinds ignored during refinement.
    pub skip_annotations: BTreeSet<AnnotationKind>,
    /// Requested upsert syntax.
    pub upsert: Option<UpsertSyntax>,
}

impl GeneratorOptions {
    /// Create options with every choice left to the dialect.
    pub fn new() -> Self {
        Self {
            enum_mode: None,
            struct_mode: None,
            array_mode: None,
            namespaces: Vec::new(),
            foreign_constraints: true,
            skip_annotations: BTreeSet::new(),
            upsert: None,
        }
    }

    /// Request an enum mode.
    pub fn with_enum_mode(mut self, mode: EnumMode) -> Self {
        self.enum_mode = Some(mode);
        self
    }

    /// Request a struct mode.
    pub fn with_struct_mode(mut self, mode: StructMode) -> Self {
        self.struct_mode = Some(mode);
        self
    }

    /// Request an array mode.
    pub fn with_array_mode(mut self, mode: ArrayMode) -> Self {
        self.array_mode = Some(mode);
        self
    }

    /// Map a module to a namespace (`None` for the default namespace).
    pub fn with_namespace(mut self, module: impl Into<String>, namespace: Option<&str>) -> Self {
        self.namespaces
            .push((module.into(), namespace.map(str::to_string)));
        self
    }

    /// Enable or disable optional foreign key constraints.
    pub fn with_foreign_constraints(mut self, enabled: bool) -> Self {
        self.foreign_constraints = enabled;
        self
    }

    /// Ignore an annotation kind.
    pub fn with_skip_annotation(mut self, kind: AnnotationKind) -> Self {
        self.skip_annotations.insert(kind);
        self
    }

    /// Request an upsert syntax.
    pub fn with_upsert(mut self, syntax: UpsertSyntax) -> Self {
        self.upsert = Some(syntax);
        self
    }
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Validated settings for a dialect renderer.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Target dialect.
    pub dialect: Dialect,
    /// Options to convert entity types with.
    pub converter: ConverterOptions,
    /// Upsert syntax for the renderer.
    pub upsert: UpsertSyntax,
}

impl Dialect {
    /// Validate requested options and build the full generator settings.
    pub fn generator_config(&self, options: &GeneratorOptions) -> Result<GeneratorConfig> {
        let converter = self.converter_options(options)?;
        let upsert = self.upsert_syntax(options.upsert)?;
        Ok(GeneratorConfig {
            dialect: *self,
            converter,
            upsert,
        })
    }

    /// Validate requested options and apply the dialect's defaults and
    /// substitutions.
    pub fn converter_options(&self, options: &GeneratorOptions) -> Result<ConverterOptions> {
        self.check_modes(options)?;

        let namespaces = NamespaceMapping::new(
            options
                .namespaces
                .iter()
                .map(|(module, namespace)| (module.clone(), namespace.clone())),
        )?;

        let mut converter = ConverterOptions::new()
            .with_namespaces(namespaces)
            .with_foreign_constraints(options.foreign_constraints);
        converter.skip_annotations = options.skip_annotations.clone();

        let converter = match self {
            Dialect::PostgreSql => converter
                .with_enum_mode(options.enum_mode.unwrap_or(EnumMode::Type))
                .with_struct_mode(options.struct_mode.unwrap_or(StructMode::Type))
                .with_array_mode(options.array_mode.unwrap_or(ArrayMode::Array))
                .with_substitution(NativeType::Json, DataType::user_defined("jsonb"))
                .with_substitution(NativeType::Ipv4Addr, DataType::user_defined("inet"))
                .with_substitution(NativeType::Ipv6Addr, DataType::user_defined("inet")),
            Dialect::MySql => converter
                .with_enum_mode(options.enum_mode.unwrap_or(EnumMode::Inline))
                .with_struct_mode(options.struct_mode.unwrap_or(StructMode::Json))
                .with_array_mode(options.array_mode.unwrap_or(ArrayMode::Json))
                .with_qualified_names(false)
                .with_substitution(NativeType::Bool, DataType::Integer { width: 1 })
                .with_substitution(NativeType::Uuid, DataType::binary(16))
                .with_substitution(NativeType::String, DataType::varchar(MYSQL_TEXT_LIMIT))
                .with_substitution(NativeType::Ipv4Addr, DataType::binary(4))
                .with_substitution(NativeType::Ipv6Addr, DataType::binary(16)),
            Dialect::Delta => converter
                .with_enum_mode(options.enum_mode.unwrap_or(EnumMode::Check))
                .with_struct_mode(options.struct_mode.unwrap_or(StructMode::Json))
                .with_array_mode(options.array_mode.unwrap_or(ArrayMode::Array))
                .with_foreign_constraints(false)
                .with_substitution(NativeType::Uuid, DataType::binary(16))
                .with_substitution(NativeType::Json, DataType::text())
                .with_substitution(NativeType::Ipv4Addr, DataType::binary(4))
                .with_substitution(NativeType::Ipv6Addr, DataType::binary(16)),
        };

        converter.validate()?;
        Ok(converter)
    }

    fn check_modes(&self, options: &GeneratorOptions) -> Result<()> {
        let enum_ok = match (self, options.enum_mode) {
            (_, None) => true,
            (Dialect::PostgreSql, Some(mode)) => mode != EnumMode::Inline,
            (Dialect::MySql, Some(mode)) => mode != EnumMode::Type,
            (Dialect::Delta, Some(mode)) => mode == EnumMode::Check,
        };
        if !enum_ok {
            return Err(self.unsupported("enum", options.enum_mode));
        }

        let struct_ok = match self {
            Dialect::PostgreSql => true,
            Dialect::MySql | Dialect::Delta => options.struct_mode != Some(StructMode::Type),
        };
        if !struct_ok {
            return Err(self.unsupported("struct", options.struct_mode));
        }

        if *self == Dialect::MySql && options.array_mode == Some(ArrayMode::Array) {
            return Err(self.unsupported("array", options.array_mode));
        }
        Ok(())
    }

    fn upsert_syntax(&self, requested: Option<UpsertSyntax>) -> Result<UpsertSyntax> {
        match (self, requested) {
            (Dialect::PostgreSql, None | Some(UpsertSyntax::ExcludedAlias)) => {
                Ok(UpsertSyntax::ExcludedAlias)
            }
            (Dialect::PostgreSql, Some(other)) => Err(ConvertError::Configuration(format!(
                "unsupported upsert syntax for {}: {:?}",
                self, other
            ))),
            (Dialect::MySql, requested) => Ok(requested.unwrap_or(UpsertSyntax::ValuesFunction)),
            // no upsert statement; the choice is carried but unused
            (Dialect::Delta, requested) => Ok(requested.unwrap_or(UpsertSyntax::ValuesFunction)),
        }
    }

    fn unsupported(&self, what: &str, mode: Option<impl fmt::Display>) -> ConvertError {
        let mode = mode.map(|m| m.to_string()).unwrap_or_default();
        ConvertError::Configuration(format!(
            "unsupported {} conversion mode for {}: {}",
            what, self, mode
        ))
    }
}

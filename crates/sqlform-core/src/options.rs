//! Converter configuration.

use crate::error::{ConvertError, Result};
use crate::factory::{DefaultObjectFactory, ObjectFactory};
use crate::native::{AnnotationKind, NativeType};
use serde::{Deserialize, Serialize};
use sqlform_model::DataType;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Default byte width of the key column of enum lookup tables.
pub const DEFAULT_ENUM_KEY_WIDTH: u8 = 4;

/// How enumeration types are represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnumMode {
    /// A native enumeration type referenced by name.
    #[default]
    Type,
    /// An inline enumeration carrying the labels.
    Inline,
    /// A lookup table with a foreign key.
    Relation,
    /// The value type with a check constraint.
    Check,
}

/// How embedded composite types are represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructMode {
    /// A native composite type referenced by name.
    #[default]
    Type,
    /// A JSON document.
    Json,
}

/// How lists of simple values are represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayMode {
    /// A native array type.
    #[default]
    Array,
    /// A JSON document.
    Json,
}

macro_rules! mode_strings {
    ($mode:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $mode {
            /// Lower-case name.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($mode::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $mode {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $mode {
            type Err = ConvertError;

            fn from_str(s: &str) -> Result<Self> {
                match s.to_ascii_lowercase().as_str() {
                    $($text => Ok($mode::$variant),)+
                    other => Err(ConvertError::Configuration(format!(
                        "unknown {}: {}",
                        stringify!($mode),
                        other
                    ))),
                }
            }
        }
    };
}

mode_strings!(EnumMode { Type => "type", Inline => "inline", Relation => "relation", Check => "check" });
mode_strings!(StructMode { Type => "type", Json => "json" });
mode_strings!(ArrayMode { Array => "array", Json => "json" });

/// Maps defining modules to target namespaces.
///
/// A target of `None` is the default namespace. The mapping is one-to-one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceMapping {
    modules: HashMap<String, Option<String>>,
}

impl NamespaceMapping {
    /// Create a mapping, rejecting repeated targets.
    pub fn new<M, N>(entries: impl IntoIterator<Item = (M, Option<N>)>) -> Result<Self>
    where
        M: Into<String>,
        N: Into<String>,
    {
        let mut modules = HashMap::new();
        let mut targets = HashSet::new();
        for (module, namespace) in entries {
            let namespace: Option<String> = namespace.map(Into::into);
            if !targets.insert(namespace.clone()) {
                return Err(ConvertError::DuplicateNamespaceTarget {
                    namespace: namespace.unwrap_or_default(),
                });
            }
            modules.insert(module.into(), namespace);
        }
        Ok(Self { modules })
    }

    /// Check if no module is mapped.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Target namespace of a module.
    ///
    /// An empty mapping sends every module to the default namespace.
    pub fn get(&self, module: &str) -> Result<Option<&str>> {
        if self.modules.is_empty() {
            return Ok(None);
        }
        self.modules
            .get(module)
            .map(Option::as_deref)
            .ok_or_else(|| ConvertError::UnmappedModule {
                module: module.to_string(),
            })
    }
}

/// Options controlling the conversion of entity types into a catalog.
#[derive(Debug, Clone)]
pub struct ConverterOptions {
    /// Representation of enumerations.
    pub enum_mode: EnumMode,
    /// Representation of embedded composites.
    pub struct_mode: StructMode,
    /// Representation of lists of simple values.
    pub array_mode: ArrayMode,
    /// Map narrow integers to dialect-native types (`int1`, `uint4`, ...).
    pub extra_numeric_types: bool,
    /// Fully qualified names when set, prefixed names otherwise.
    pub qualified_names: bool,
    /// Module to namespace mapping.
    pub namespaces: NamespaceMapping,
    /// Emit optional foreign key constraints between entity tables.
    pub foreign_constraints: bool,
    /// Per native type override of the produced data type.
    pub substitutions: HashMap<NativeType, DataType>,
    /// Annotation kinds ignored during refinement.
    pub skip_annotations: BTreeSet<AnnotationKind>,
    /// Constructs catalog objects.
    pub factory: Arc<dyn ObjectFactory>,
    /// Byte width of enum lookup table keys.
    pub enum_key_width: u8,
}

impl ConverterOptions {
    /// Create options with all defaults.
    pub fn new() -> Self {
        Self {
            enum_mode: EnumMode::default(),
            struct_mode: StructMode::default(),
            array_mode: ArrayMode::default(),
            extra_numeric_types: false,
            qualified_names: true,
            namespaces: NamespaceMapping::default(),
            foreign_constraints: true,
            substitutions: HashMap::new(),
            skip_annotations: BTreeSet::new(),
            factory: Arc::new(DefaultObjectFactory),
            enum_key_width: DEFAULT_ENUM_KEY_WIDTH,
        }
    }

    /// Set the enum mode.
    pub fn with_enum_mode(mut self, mode: EnumMode) -> Self {
        self.enum_mode = mode;
        self
    }

    /// Set the struct mode.
    pub fn with_struct_mode(mut self, mode: StructMode) -> Self {
        self.struct_mode = mode;
        self
    }

    /// Set the array mode.
    pub fn with_array_mode(mut self, mode: ArrayMode) -> Self {
        self.array_mode = mode;
        self
    }

    /// Enable or disable dialect-native narrow integer types.
    pub fn with_extra_numeric_types(mut self, enabled: bool) -> Self {
        self.extra_numeric_types = enabled;
        self
    }

    /// Choose fully qualified (`true`) or prefixed (`false`) names.
    pub fn with_qualified_names(mut self, enabled: bool) -> Self {
        self.qualified_names = enabled;
        self
    }

    /// Set the module to namespace mapping.
    pub fn with_namespaces(mut self, namespaces: NamespaceMapping) -> Self {
        self.namespaces = namespaces;
        self
    }

    /// Enable or disable optional foreign key constraints.
    pub fn with_foreign_constraints(mut self, enabled: bool) -> Self {
        self.foreign_constraints = enabled;
        self
    }

    /// Override the data type produced for a native type.
    pub fn with_substitution(mut self, native: NativeType, data_type: DataType) -> Self {
        self.substitutions.insert(native, data_type);
        self
    }

    /// Ignore an annotation kind.
    pub fn with_skip_annotation(mut self, kind: AnnotationKind) -> Self {
        self.skip_annotations.insert(kind);
        self
    }

    /// Set the object factory.
    pub fn with_factory(mut self, factory: Arc<dyn ObjectFactory>) -> Self {
        self.factory = factory;
        self
    }

    /// Set the byte width of enum lookup table keys.
    pub fn with_enum_key_width(mut self, width: u8) -> Self {
        self.enum_key_width = width;
        self
    }

    /// Check option values that can be wrong on their own.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.enum_key_width, 1 | 2 | 4 | 8) {
            return Err(ConvertError::Configuration(format!(
                "enum key width must be 1, 2, 4 or 8 bytes; got {}",
                self.enum_key_width
            )));
        }
        Ok(())
    }
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self::new()
    }
}

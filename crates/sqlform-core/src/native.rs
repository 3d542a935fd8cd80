//! Native (source-side) type vocabulary.
//!
//! A [`NativeType`] describes the declared type of an entity field. The set of
//! categories is closed, so the type mapper can match on it exhaustively.

use std::fmt;

/// The declared type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NativeType {
    /// Boolean.
    Bool,
    /// Unsized integer (stored in 8 bytes).
    Int,
    /// 1-byte signed integer.
    Int8,
    /// 2-byte signed integer.
    Int16,
    /// 4-byte signed integer.
    Int32,
    /// 8-byte signed integer.
    Int64,
    /// 1-byte unsigned integer.
    UInt8,
    /// 2-byte unsigned integer.
    UInt16,
    /// 4-byte unsigned integer.
    UInt32,
    /// 8-byte unsigned integer.
    UInt64,
    /// Unsized floating point (double precision).
    Float,
    /// Single precision floating point.
    Float32,
    /// Double precision floating point.
    Float64,
    /// Arbitrary-length string.
    String,
    /// Fixed-point decimal.
    Decimal,
    /// Date and time.
    DateTime,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Duration.
    TimeDelta,
    /// UUID.
    Uuid,
    /// Free-form JSON document.
    Json,
    /// IPv4 address.
    Ipv4Addr,
    /// IPv6 address.
    Ipv6Addr,
    /// A base type refined by metadata items, applied in order.
    Annotated {
        /// The unadorned type.
        base: Box<NativeType>,
        /// Refinements in declaration order.
        annotations: Vec<Annotation>,
    },
    /// Reference to a registered entity, struct or enum type.
    Ref(String),
    /// Deferred reference by name, resolved before mapping.
    Forward(String),
    /// One of a fixed set of literal values.
    Literal(Vec<LiteralValue>),
    /// Homogeneous list.
    List(Box<NativeType>),
    /// Union of member types.
    Union(Vec<NativeType>),
    /// Opaque named type without a registered definition.
    Custom {
        /// Defining module.
        module: String,
        /// Type name.
        name: String,
    },
}

impl NativeType {
    /// Reference a registered type by name.
    pub fn reference(name: impl Into<String>) -> Self {
        NativeType::Ref(name.into())
    }

    /// Forward reference by name.
    pub fn forward(name: impl Into<String>) -> Self {
        NativeType::Forward(name.into())
    }

    /// List of an item type.
    pub fn list(item: NativeType) -> Self {
        NativeType::List(Box::new(item))
    }

    /// Union of member types.
    pub fn union(members: impl IntoIterator<Item = NativeType>) -> Self {
        NativeType::Union(members.into_iter().collect())
    }

    /// Refine a base type with annotations.
    pub fn annotated(base: NativeType, annotations: impl IntoIterator<Item = Annotation>) -> Self {
        NativeType::Annotated {
            base: Box::new(base),
            annotations: annotations.into_iter().collect(),
        }
    }

    /// Literal string values.
    pub fn literal_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        NativeType::Literal(
            values
                .into_iter()
                .map(|v| LiteralValue::Str(v.into()))
                .collect(),
        )
    }

    /// String with a maximum length.
    pub fn bounded_string(max_length: u32) -> Self {
        Self::annotated(NativeType::String, [Annotation::MaxLength(max_length)])
    }

    /// Strip annotations.
    pub fn unadorned(&self) -> &NativeType {
        match self {
            NativeType::Annotated { base, .. } => base.unadorned(),
            other => other,
        }
    }

    /// Check if this is a built-in primitive.
    pub fn is_primitive(&self) -> bool {
        use NativeType::*;
        matches!(
            self,
            Bool | Int
                | Int8
                | Int16
                | Int32
                | Int64
                | UInt8
                | UInt16
                | UInt32
                | UInt64
                | Float
                | Float32
                | Float64
                | String
                | Decimal
                | DateTime
                | Date
                | Time
                | TimeDelta
                | Uuid
                | Json
                | Ipv4Addr
                | Ipv6Addr
        )
    }

    /// Name of the referenced type, for `Ref` and `Forward`.
    pub fn referenced_name(&self) -> Option<&str> {
        match self {
            NativeType::Ref(name) | NativeType::Forward(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use NativeType::*;
        match self {
            Bool => write!(f, "bool"),
            Int => write!(f, "int"),
            Int8 => write!(f, "i8"),
            Int16 => write!(f, "i16"),
            Int32 => write!(f, "i32"),
            Int64 => write!(f, "i64"),
            UInt8 => write!(f, "u8"),
            UInt16 => write!(f, "u16"),
            UInt32 => write!(f, "u32"),
            UInt64 => write!(f, "u64"),
            Float => write!(f, "float"),
            Float32 => write!(f, "f32"),
            Float64 => write!(f, "f64"),
            String => write!(f, "str"),
            Decimal => write!(f, "decimal"),
            DateTime => write!(f, "datetime"),
            Date => write!(f, "date"),
            Time => write!(f, "time"),
            TimeDelta => write!(f, "timedelta"),
            Uuid => write!(f, "uuid"),
            Json => write!(f, "json"),
            Ipv4Addr => write!(f, "ipv4"),
            Ipv6Addr => write!(f, "ipv6"),
            Annotated { base, annotations } => {
                write!(f, "annotated<{}", base)?;
                for annotation in annotations {
                    write!(f, ", {}", annotation)?;
                }
                write!(f, ">")
            }
            Ref(name) => write!(f, "{}", name),
            Forward(name) => write!(f, "'{}'", name),
            Literal(values) => {
                let values: Vec<std::string::String> =
                    values.iter().map(ToString::to_string).collect();
                write!(f, "literal<{}>", values.join(", "))
            }
            List(item) => write!(f, "list<{}>", item),
            Union(members) => {
                let members: Vec<std::string::String> =
                    members.iter().map(ToString::to_string).collect();
                write!(f, "union<{}>", members.join(", "))
            }
            Custom { module, name } => write!(f, "{}.{}", module, name),
        }
    }
}

/// A literal value in a literal type or an enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    /// String literal.
    Str(String),
    /// Integer literal.
    Int(i64),
    /// Boolean literal.
    Bool(bool),
}

impl LiteralValue {
    /// Native type of the value.
    pub fn native_type(&self) -> NativeType {
        match self {
            LiteralValue::Str(_) => NativeType::String,
            LiteralValue::Int(_) => NativeType::Int,
            LiteralValue::Bool(_) => NativeType::Bool,
        }
    }

    /// String label of the value.
    pub fn label(&self) -> String {
        match self {
            LiteralValue::Str(s) => s.clone(),
            LiteralValue::Int(i) => i.to_string(),
            LiteralValue::Bool(b) => b.to_string(),
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Str(s) => write!(f, "{:?}", s),
            LiteralValue::Int(i) => write!(f, "{}", i),
            LiteralValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Kind of an annotation, used to configure which annotations are skipped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnnotationKind {
    /// See [`Annotation::MaxLength`].
    MaxLength,
    /// See [`Annotation::Precision`].
    Precision,
    /// See [`Annotation::TimePrecision`].
    TimePrecision,
    /// See [`Annotation::Storage`].
    Storage,
    /// See [`Annotation::TimeZone`].
    TimeZone,
    /// Application-defined annotation kind.
    Other(String),
}

/// Metadata refining a base type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Annotation {
    /// Maximum length of a string.
    MaxLength(u32),
    /// Numeric precision.
    Precision {
        /// Significant digits.
        significant_digits: u8,
        /// Digits after the decimal point.
        decimal_digits: Option<u8>,
    },
    /// Fractional second digits.
    TimePrecision(u8),
    /// Storage size in bytes.
    Storage(u32),
    /// Value carries a time zone.
    TimeZone,
    /// Application-defined metadata with no built-in meaning.
    Other {
        /// Kind of the annotation.
        kind: String,
        /// Free-form payload.
        value: String,
    },
}

impl Annotation {
    /// Kind of this annotation.
    pub fn kind(&self) -> AnnotationKind {
        match self {
            Annotation::MaxLength(_) => AnnotationKind::MaxLength,
            Annotation::Precision { .. } => AnnotationKind::Precision,
            Annotation::TimePrecision(_) => AnnotationKind::TimePrecision,
            Annotation::Storage(_) => AnnotationKind::Storage,
            Annotation::TimeZone => AnnotationKind::TimeZone,
            Annotation::Other { kind, .. } => AnnotationKind::Other(kind.clone()),
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Annotation::MaxLength(n) => write!(f, "max_length={}", n),
            Annotation::Precision {
                significant_digits,
                decimal_digits,
            } => match decimal_digits {
                Some(d) => write!(f, "precision={},{}", significant_digits, d),
                None => write!(f, "precision={}", significant_digits),
            },
            Annotation::TimePrecision(n) => write!(f, "time_precision={}", n),
            Annotation::Storage(n) => write!(f, "storage={}", n),
            Annotation::TimeZone => write!(f, "time_zone"),
            Annotation::Other { kind, value } => write!(f, "{}={}", kind, value),
        }
    }
}

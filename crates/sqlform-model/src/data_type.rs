//! SQL data types (type descriptors).

use crate::error::FormationError;
use crate::literal::quote;
use crate::name::QualifiedName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A dialect-agnostic SQL data type.
///
/// Values are immutable once placed in a catalog; equality is structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Boolean.
    Boolean,
    /// Signed integer of the given byte width (1, 2, 4 or 8).
    Integer {
        /// Storage width in bytes.
        width: u8,
    },
    /// Single precision floating point.
    Real,
    /// Double precision floating point.
    Double,
    /// Floating point with an explicit binary precision.
    Float {
        /// Precision in base 2; `None` means the dialect default.
        precision: Option<u8>,
    },
    /// Fixed-point numeric.
    Decimal {
        /// Total number of base-10 digits.
        precision: Option<u8>,
        /// Digits after the decimal point.
        scale: Option<u8>,
    },
    /// Fixed-length binary string.
    FixedBinary {
        /// Length in bytes.
        storage: Option<u32>,
    },
    /// Variable-length binary string.
    VariableBinary {
        /// Maximum length in bytes; `None` is unbounded.
        storage: Option<u32>,
    },
    /// Fixed-length character string.
    FixedCharacter {
        /// Length in characters.
        limit: Option<u32>,
    },
    /// Variable-length character string.
    VariableCharacter {
        /// Maximum length in characters; `None` is unbounded.
        limit: Option<u32>,
    },
    /// Calendar date.
    Date,
    /// Time of day.
    Time {
        /// Fractional second digits.
        precision: Option<u8>,
        /// Whether the value carries a time zone.
        with_time_zone: bool,
    },
    /// Date and time.
    Timestamp {
        /// Fractional second digits.
        precision: Option<u8>,
        /// Whether the value carries a time zone.
        with_time_zone: bool,
    },
    /// Time interval.
    Interval,
    /// 128-bit universally unique identifier.
    Uuid,
    /// JSON document.
    Json,
    /// Array of an element type.
    Array(Box<DataType>),
    /// Inline enumeration of string labels.
    Enum {
        /// Allowed labels, in declaration order.
        values: Vec<String>,
    },
    /// Reference to a named type (native enum, composite, or dialect type).
    UserDefined(QualifiedName),
}

impl DataType {
    /// Unbounded variable-length character string.
    pub fn text() -> Self {
        DataType::VariableCharacter { limit: None }
    }

    /// Variable-length character string with a maximum length.
    pub fn varchar(limit: u32) -> Self {
        DataType::VariableCharacter { limit: Some(limit) }
    }

    /// Fixed-length character string.
    pub fn fixed_char(limit: u32) -> Self {
        DataType::FixedCharacter { limit: Some(limit) }
    }

    /// Fixed-length binary string.
    pub fn binary(storage: u32) -> Self {
        DataType::FixedBinary {
            storage: Some(storage),
        }
    }

    /// Timestamp without precision or time zone.
    pub fn timestamp() -> Self {
        DataType::Timestamp {
            precision: None,
            with_time_zone: false,
        }
    }

    /// Time of day without precision or time zone.
    pub fn time() -> Self {
        DataType::Time {
            precision: None,
            with_time_zone: false,
        }
    }

    /// Decimal without precision.
    pub fn decimal() -> Self {
        DataType::Decimal {
            precision: None,
            scale: None,
        }
    }

    /// Array of the given element type.
    pub fn array(element: DataType) -> Self {
        DataType::Array(Box::new(element))
    }

    /// Reference to a dialect-native type in the default namespace.
    pub fn user_defined(name: impl Into<String>) -> Self {
        DataType::UserDefined(QualifiedName::global(name))
    }

    /// Check if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Integer { .. }
                | DataType::Real
                | DataType::Double
                | DataType::Float { .. }
                | DataType::Decimal { .. }
        )
    }

    /// Check if this type stores character data.
    pub fn is_character(&self) -> bool {
        matches!(
            self,
            DataType::FixedCharacter { .. } | DataType::VariableCharacter { .. }
        )
    }

    /// Check if this type stores binary data.
    pub fn is_binary(&self) -> bool {
        matches!(
            self,
            DataType::FixedBinary { .. } | DataType::VariableBinary { .. }
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Boolean => write!(f, "boolean"),
            DataType::Integer { width } => match width {
                1 => write!(f, "tinyint"),
                2 => write!(f, "smallint"),
                4 => write!(f, "integer"),
                8 => write!(f, "bigint"),
                w => write!(f, "int{}", w),
            },
            DataType::Real => write!(f, "real"),
            DataType::Double => write!(f, "double precision"),
            DataType::Float { precision } => write!(f, "float({})", precision.unwrap_or(53)),
            DataType::Decimal { precision, scale } => match (precision, scale) {
                (Some(p), Some(s)) => write!(f, "decimal({}, {})", p, s),
                (Some(p), None) => write!(f, "decimal({})", p),
                _ => write!(f, "decimal"),
            },
            DataType::FixedBinary { storage } => match storage {
                Some(n) => write!(f, "binary({})", n),
                None => write!(f, "binary"),
            },
            DataType::VariableBinary { storage } => match storage {
                Some(n) => write!(f, "varbinary({})", n),
                None => write!(f, "blob"),
            },
            DataType::FixedCharacter { limit } => match limit {
                Some(n) => write!(f, "char({})", n),
                None => write!(f, "char"),
            },
            DataType::VariableCharacter { limit } => match limit {
                Some(n) => write!(f, "varchar({})", n),
                None => write!(f, "text"),
            },
            DataType::Date => write!(f, "date"),
            DataType::Time {
                precision,
                with_time_zone,
            } => write_temporal(f, "time", *precision, *with_time_zone),
            DataType::Timestamp {
                precision,
                with_time_zone,
            } => write_temporal(f, "timestamp", *precision, *with_time_zone),
            DataType::Interval => write!(f, "interval"),
            DataType::Uuid => write!(f, "uuid"),
            DataType::Json => write!(f, "json"),
            DataType::Array(element) => write!(f, "{} ARRAY", element),
            DataType::Enum { values } => {
                let values: Vec<String> = values.iter().map(|v| quote(v)).collect();
                write!(f, "ENUM ({})", values.join(", "))
            }
            DataType::UserDefined(name) => write!(f, "{}", name),
        }
    }
}

fn write_temporal(
    f: &mut fmt::Formatter<'_>,
    keyword: &str,
    precision: Option<u8>,
    with_time_zone: bool,
) -> fmt::Result {
    write!(f, "{}", keyword)?;
    if let Some(p) = precision {
        write!(f, "({})", p)?;
    }
    if with_time_zone {
        write!(f, " with time zone")?;
    }
    Ok(())
}

/// Returns the narrowest type every input can be converted into without loss.
///
/// The combination is commutative and associative, so the result does not
/// depend on the order of `types`.
pub fn compatible_type(types: &[DataType]) -> Result<DataType, FormationError> {
    let mut iter = types.iter();
    let first = iter.next().ok_or_else(|| FormationError::Incompatible {
        types: String::new(),
    })?;

    iter.try_fold(first.clone(), |acc, next| {
        compatible_pair(&acc, next).ok_or_else(|| FormationError::Incompatible {
            types: types
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        })
    })
}

fn compatible_pair(left: &DataType, right: &DataType) -> Option<DataType> {
    use DataType::*;

    if left == right {
        return Some(left.clone());
    }

    match (left, right) {
        (Integer { width: l }, Integer { width: r }) => Some(Integer { width: *l.max(r) }),

        (Real, Double) | (Double, Real) => Some(Double),

        (FixedCharacter { limit: l }, FixedCharacter { limit: r }) => Some(FixedCharacter {
            limit: max_or_none(*l, *r),
        }),
        (FixedCharacter { limit: l }, VariableCharacter { limit: r })
        | (VariableCharacter { limit: l }, FixedCharacter { limit: r })
        | (VariableCharacter { limit: l }, VariableCharacter { limit: r }) => {
            Some(VariableCharacter {
                limit: max_or_none(*l, *r),
            })
        }

        (FixedBinary { storage: l }, FixedBinary { storage: r }) => Some(FixedBinary {
            storage: max_or_none(*l, *r),
        }),
        (FixedBinary { storage: l }, VariableBinary { storage: r })
        | (VariableBinary { storage: l }, FixedBinary { storage: r })
        | (VariableBinary { storage: l }, VariableBinary { storage: r }) => Some(VariableBinary {
            storage: max_or_none(*l, *r),
        }),

        _ => None,
    }
}

/// An unbounded side wins.
fn max_or_none(left: Option<u32>, right: Option<u32>) -> Option<u32> {
    match (left, right) {
        (Some(l), Some(r)) => Some(l.max(r)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display() {
        assert_eq!(DataType::Integer { width: 8 }.to_string(), "bigint");
        assert_eq!(DataType::varchar(64).to_string(), "varchar(64)");
        assert_eq!(DataType::text().to_string(), "text");
        assert_eq!(
            DataType::Decimal {
                precision: Some(5),
                scale: Some(2)
            }
            .to_string(),
            "decimal(5, 2)"
        );
        assert_eq!(
            DataType::Timestamp {
                precision: Some(6),
                with_time_zone: true
            }
            .to_string(),
            "timestamp(6) with time zone"
        );
        assert_eq!(
            DataType::array(DataType::text()).to_string(),
            "text ARRAY"
        );
        assert_eq!(
            DataType::Enum {
                values: vec!["a".into(), "it's".into()]
            }
            .to_string(),
            "ENUM ('a', 'it''s')"
        );
    }

    #[test]
    fn test_compatible_integers_widen() {
        let result = compatible_type(&[
            DataType::Integer { width: 2 },
            DataType::Integer { width: 8 },
            DataType::Integer { width: 4 },
        ])
        .unwrap();
        assert_eq!(result, DataType::Integer { width: 8 });
    }

    #[test]
    fn test_compatible_characters() {
        let result = compatible_type(&[DataType::fixed_char(3), DataType::fixed_char(7)]).unwrap();
        assert_eq!(result, DataType::fixed_char(7));

        let result = compatible_type(&[DataType::fixed_char(3), DataType::varchar(2)]).unwrap();
        assert_eq!(result, DataType::varchar(3));

        let result = compatible_type(&[DataType::varchar(3), DataType::text()]).unwrap();
        assert_eq!(result, DataType::text());
    }

    #[test]
    fn test_compatible_is_order_independent() {
        let types = vec![
            DataType::fixed_char(4),
            DataType::varchar(10),
            DataType::fixed_char(12),
        ];
        let forward = compatible_type(&types).unwrap();
        let mut reversed = types.clone();
        reversed.reverse();
        assert_eq!(forward, compatible_type(&reversed).unwrap());
        assert_eq!(forward, DataType::varchar(12));
    }

    #[test]
    fn test_compatible_floats() {
        let result = compatible_type(&[DataType::Real, DataType::Double]).unwrap();
        assert_eq!(result, DataType::Double);
    }

    #[test]
    fn test_incompatible_types() {
        let err = compatible_type(&[DataType::text(), DataType::Integer { width: 4 }]).unwrap_err();
        assert!(matches!(err, FormationError::Incompatible { .. }));
        assert!(compatible_type(&[]).is_err());
    }
}

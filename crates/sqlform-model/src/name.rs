//! Namespace-scoped object names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between namespace and local name in prefixed style.
pub const PREFIX_SEPARATOR: &str = "__";

/// How a namespace is attached to an object name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameStyle {
    /// Namespace and local name kept distinct (`ns.name`).
    Qualified,
    /// Namespace folded into the local name (`ns__name`).
    Prefixed,
}

/// Identifies a table, struct or enum type within a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifiedName {
    /// Owning namespace; `None` is the default namespace.
    pub namespace: Option<String>,
    /// Object name local to the namespace.
    pub name: String,
    /// Addressing style.
    pub style: NameStyle,
}

impl QualifiedName {
    /// Create a fully qualified name.
    pub fn qualified(namespace: Option<impl Into<String>>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(Into::into),
            name: name.into(),
            style: NameStyle::Qualified,
        }
    }

    /// Create a prefixed name.
    pub fn prefixed(namespace: Option<impl Into<String>>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(Into::into),
            name: name.into(),
            style: NameStyle::Prefixed,
        }
    }

    /// Create a name in the default namespace.
    pub fn global(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
            style: NameStyle::Qualified,
        }
    }

    /// Create a name with an explicit style.
    pub fn with_style(
        style: NameStyle,
        namespace: Option<impl Into<String>>,
        name: impl Into<String>,
    ) -> Self {
        match style {
            NameStyle::Qualified => Self::qualified(namespace, name),
            NameStyle::Prefixed => Self::prefixed(namespace, name),
        }
    }

    /// The namespace a renderer should place this object in.
    ///
    /// Prefixed names always live in the default namespace.
    pub fn schema(&self) -> Option<&str> {
        match self.style {
            NameStyle::Qualified => self.namespace.as_deref(),
            NameStyle::Prefixed => None,
        }
    }

    /// The name local to [`Self::schema`].
    pub fn local_name(&self) -> String {
        match (self.style, &self.namespace) {
            (NameStyle::Prefixed, Some(ns)) => format!("{}{}{}", ns, PREFIX_SEPARATOR, self.name),
            _ => self.name.clone(),
        }
    }

    /// Single-string identifier, unquoted.
    pub fn compact(&self) -> String {
        match (self.style, &self.namespace) {
            (NameStyle::Qualified, Some(ns)) => format!("{}.{}", ns, self.name),
            _ => self.local_name(),
        }
    }

    /// Identifier usable as a prefix for derived object names.
    pub fn prefix(&self) -> String {
        self.compact().replace('.', "_")
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.compact())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_forms() {
        let name = QualifiedName::qualified(Some("sales"), "Order");
        assert_eq!(name.compact(), "sales.Order");
        assert_eq!(name.prefix(), "sales_Order");
        assert_eq!(name.schema(), Some("sales"));
        assert_eq!(name.local_name(), "Order");
    }

    #[test]
    fn test_prefixed_forms() {
        let name = QualifiedName::prefixed(Some("sales"), "Order");
        assert_eq!(name.compact(), "sales__Order");
        assert_eq!(name.prefix(), "sales__Order");
        assert_eq!(name.schema(), None);
    }

    #[test]
    fn test_default_namespace() {
        let q = QualifiedName::qualified(None::<String>, "Person");
        let p = QualifiedName::prefixed(None::<String>, "Person");
        assert_eq!(q.compact(), "Person");
        assert_eq!(p.compact(), "Person");
        assert_eq!(QualifiedName::global("Person"), q);
    }
}

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Device/backend descriptor a trial was measured against.
///
/// The textual form is a kind name followed by dash-prefixed attributes:
///
/// ```text
/// llvm -mcpu=skylake-avx512 -keys=cpu
/// cuda -arch=sm_80 -libs=cudnn
/// ```
///
/// Records are grouped and filtered by [`kind_name`](Self::kind_name); the
/// attributes are carried through unchanged.
///
/// # Example
///
/// ```
/// use tunelog_schema::Target;
///
/// let target: Target = "llvm -mcpu=skylake -fast-math".parse().unwrap();
/// assert_eq!(target.kind_name(), "llvm");
/// assert_eq!(target.attr("mcpu"), Some("skylake"));
/// assert!(target.has_flag("fast-math"));
/// assert_eq!(target.to_string(), "llvm -mcpu=skylake -fast-math");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    kind: String,
    attrs: Vec<TargetAttr>,
}

/// A single `-key=value` or `-flag` attribute of a [`Target`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetAttr {
    Flag(String),
    Value { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum TargetParseError {
    #[display("empty target descriptor")]
    Empty,
    #[display("target kind must not start with '-', got '{kind}'")]
    InvalidKind { kind: String },
    #[display("target attribute must look like '-key=value' or '-flag', got '{token}'")]
    InvalidAttr { token: String },
}

impl Target {
    /// Creates a target with the given kind name and no attributes.
    #[must_use]
    pub fn new<S>(kind: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            kind: kind.into(),
            attrs: vec![],
        }
    }

    /// Appends a `-key=value` attribute.
    #[must_use]
    pub fn with_attr<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.attrs.push(TargetAttr::Value {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Appends a bare `-flag` attribute.
    #[must_use]
    pub fn with_flag<S>(mut self, flag: S) -> Self
    where
        S: Into<String>,
    {
        self.attrs.push(TargetAttr::Flag(flag.into()));
        self
    }

    #[must_use]
    pub fn kind_name(&self) -> &str {
        &self.kind
    }

    #[must_use]
    pub fn attrs(&self) -> &[TargetAttr] {
        &self.attrs
    }

    /// Returns the value of the first `-key=value` attribute named `key`.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.iter().find_map(|attr| match attr {
            TargetAttr::Value { key: k, value } if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    #[must_use]
    pub fn has_flag(&self, flag: &str) -> bool {
        self.attrs
            .iter()
            .any(|attr| matches!(attr, TargetAttr::Flag(f) if f == flag))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.kind)?;
        for attr in &self.attrs {
            match attr {
                TargetAttr::Flag(flag) => write!(f, " -{flag}")?,
                TargetAttr::Value { key, value } => write!(f, " -{key}={value}")?,
            }
        }
        Ok(())
    }
}

impl FromStr for Target {
    type Err = TargetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace();
        let kind = tokens.next().ok_or(TargetParseError::Empty)?;
        if kind.starts_with('-') {
            return Err(TargetParseError::InvalidKind {
                kind: kind.to_owned(),
            });
        }

        let attrs = tokens
            .map(|token| -> Result<TargetAttr, TargetParseError> {
                let body = token
                    .strip_prefix('-')
                    .filter(|body| !body.is_empty() && !body.starts_with('='))
                    .ok_or_else(|| TargetParseError::InvalidAttr {
                        token: token.to_owned(),
                    })?;
                Ok(match body.split_once('=') {
                    Some((key, value)) => TargetAttr::Value {
                        key: key.to_owned(),
                        value: value.to_owned(),
                    },
                    None => TargetAttr::Flag(body.to_owned()),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            kind: kind.to_owned(),
            attrs,
        })
    }
}

impl Serialize for Target {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Target {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse()
            .map_err(|e| serde::de::Error::custom(format!("invalid target '{s}': {e}")))
    }
}

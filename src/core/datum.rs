use std::fmt::Display;

use enum_as_inner::EnumAsInner;

/// A single value bound to a catalog query or read back from one.
#[derive(Debug, Clone, PartialEq, Eq, EnumAsInner)]
pub enum Datum {
    Int(i64),
    String(String),

    Null,
}

impl Display for Datum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Datum::Int(v) => write!(f, "{}", v),
            Datum::String(v) => write!(f, "{}", v),
            Datum::Null => write!(f, "NULL"),
        }
    }
}

impl From<&str> for Datum {
    fn from(value: &str) -> Self {
        Datum::String(value.to_string())
    }
}

impl From<String> for Datum {
    fn from(value: String) -> Self {
        Datum::String(value)
    }
}

impl From<i64> for Datum {
    fn from(value: i64) -> Self {
        Datum::Int(value)
    }
}

impl<T: Into<Datum>> From<Option<T>> for Datum {
    fn from(value: Option<T>) -> Self {
        value.map_or(Datum::Null, Into::into)
    }
}

impl Datum {
    /// Loose equality used by catalog filters: a number and its decimal
    /// spelling compare equal, NULL equals nothing.
    pub fn matches(&self, other: &Datum) -> bool {
        if self.is_null() || other.is_null() {
            return false;
        }
        match (self, other) {
            (Datum::Int(l), Datum::Int(r)) => l == r,
            (Datum::String(l), Datum::String(r)) => l == r,
            (l, r) => l.to_string() == r.to_string(),
        }
    }

    /// Read the value as text, `None` for NULL.
    pub fn to_text(&self) -> Option<String> {
        match self.as_string() {
            Some(v) => Some(v.clone()),
            None if self.is_null() => None,
            None => Some(self.to_string()),
        }
    }

    /// Read the value as an unsigned number. Drivers report catalog numbers
    /// either as integers or as decimal strings.
    pub fn to_u64(&self) -> Option<u64> {
        match self.as_int() {
            Some(v) => u64::try_from(*v).ok(),
            None => self.as_string()?.trim().parse().ok(),
        }
    }
}

use std::{error::Error, fmt::Display};

#[derive(Clone, Debug)]
pub struct SQLError {
    pub kind: ErrorKind,
    pub message: String,
    /// The engine error this one wraps, if any.
    pub cause: Option<Box<SQLError>>,
}

#[allow(clippy::enum_variant_names)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The object is present on an exclusive-create path.
    AlreadyExists,
    /// The object is absent on an exclusive-drop path.
    NotExist,
    EmptyParameter,
    InvalidIdentifier,
    NoSelectedDatabase,
    UnsupportedFieldType,
    MalformedTagOption,
    CatalogQueryFailed,
    StatementExecutionFailed,

    ParseError,
    CatalogError,
    TypeError,
    RuntimeError,
}

impl ErrorKind {
    /// Errors caused by a malformed record description. These are bugs in the
    /// calling program, not conditions of the database.
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::UnsupportedFieldType | ErrorKind::MalformedTagOption
        )
    }
}

impl Error for SQLError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref().map(|e| e as &(dyn Error + 'static))
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::AlreadyExists => write!(f, "Already Exists"),
            ErrorKind::NotExist => write!(f, "Not Exist"),
            ErrorKind::EmptyParameter => write!(f, "Empty Parameter"),
            ErrorKind::InvalidIdentifier => write!(f, "Invalid Identifier"),
            ErrorKind::NoSelectedDatabase => write!(f, "No Selected Database"),
            ErrorKind::UnsupportedFieldType => write!(f, "Unsupported Field Type"),
            ErrorKind::MalformedTagOption => write!(f, "Malformed Tag Option"),
            ErrorKind::CatalogQueryFailed => write!(f, "Catalog Query Failed"),
            ErrorKind::StatementExecutionFailed => write!(f, "Statement Execution Failed"),
            ErrorKind::ParseError => write!(f, "Parse Error"),
            ErrorKind::CatalogError => write!(f, "Catalog Error"),
            ErrorKind::TypeError => write!(f, "Type Error"),
            ErrorKind::RuntimeError => write!(f, "Runtime Error"),
        }
    }
}

impl Display for SQLError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if let Some(cause) = &self.cause {
            write!(f, " ({})", cause)?;
        }
        Ok(())
    }
}

impl SQLError {
    pub fn new(kind: ErrorKind, message: impl AsRef<str>) -> Self {
        Self {
            kind,
            message: message.as_ref().to_string(),
            cause: None,
        }
    }

    /// Wrap an underlying engine error with context.
    pub fn wrap(kind: ErrorKind, message: impl AsRef<str>, cause: SQLError) -> Self {
        Self {
            kind,
            message: message.as_ref().to_string(),
            cause: Some(Box::new(cause)),
        }
    }

    pub fn empty_parameter(param: &str) -> Self {
        Self::new(ErrorKind::EmptyParameter, format!("param {} is empty", param))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn test_wrapped_error_exposes_cause() {
        let inner = SQLError::new(ErrorKind::CatalogError, "Unknown database 'db1'");
        let err = SQLError::wrap(ErrorKind::CatalogQueryFailed, "probe failed", inner);

        assert_eq!(
            err.to_string(),
            "Catalog Query Failed: probe failed (Catalog Error: Unknown database 'db1')"
        );
        let source = err.source().expect("wrapped error has a source");
        assert_eq!(source.to_string(), "Catalog Error: Unknown database 'db1'");
    }

    #[test]
    fn test_programming_error_classes() {
        assert!(ErrorKind::MalformedTagOption.is_programming_error());
        assert!(ErrorKind::UnsupportedFieldType.is_programming_error());
        assert!(!ErrorKind::AlreadyExists.is_programming_error());
        assert!(!ErrorKind::CatalogQueryFailed.is_programming_error());
    }
}

use std::fmt::Display;

use sqlparser::{
    ast::Value,
    dialect::MySqlDialect,
    tokenizer::{Token, Tokenizer},
};

use crate::core::{ErrorKind, SQLError, SqlType};

/// Longest identifier the engine accepts.
pub const MAX_IDENTIFIER_LEN: usize = 64;

/// Trim `raw` and check it is a usable identifier. `what` names the parameter
/// in error messages ("database", "column", ...).
pub fn required_identifier(what: &str, raw: &str) -> Result<String, SQLError> {
    let name = raw.trim();
    check_identifier(what, name)?;
    Ok(name.to_string())
}

/// Identifiers are concatenated into statements, so only
/// `[A-Za-z_][A-Za-z0-9_]*` is accepted.
pub fn check_identifier(what: &str, name: &str) -> Result<(), SQLError> {
    if name.is_empty() {
        return Err(SQLError::empty_parameter(what));
    }

    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid_start || !valid_rest || name.len() > MAX_IDENTIFIER_LEN {
        return Err(SQLError::new(
            ErrorKind::InvalidIdentifier,
            format!("invalid {} name: {:?}", what, name),
        ));
    }

    Ok(())
}

/// The value of a `DEFAULT` clause, rendered for its column type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefaultLiteral(String);

impl DefaultLiteral {
    /// Strings are single-quoted when the column type is a VARCHAR, anything
    /// else must already be a single literal (number, keyword, quoted string)
    /// and is emitted verbatim.
    pub fn format(sql_type: &SqlType, raw: &str) -> Result<Self, SQLError> {
        if raw.is_empty() {
            return Err(SQLError::new(
                ErrorKind::MalformedTagOption,
                "missing value for default",
            ));
        }

        if sql_type.quotes_default() {
            // The engine treats backslash as an escape inside string literals.
            if raw.contains('\\') {
                return Err(SQLError::new(
                    ErrorKind::MalformedTagOption,
                    format!("unsupported character in default value: {:?}", raw),
                ));
            }
            return Ok(Self(
                Value::SingleQuotedString(raw.to_string()).to_string(),
            ));
        }

        let literal = raw.trim();
        let tokens = Tokenizer::new(&MySqlDialect {}, literal)
            .tokenize()
            .map_err(|e| SQLError::new(ErrorKind::MalformedTagOption, e.to_string()))?;

        let is_literal = match tokens.as_slice() {
            [Token::Number(_, _)] | [Token::SingleQuotedString(_)] => true,
            [Token::Minus | Token::Plus, Token::Number(_, _)] => true,
            [Token::Word(word)] => word.quote_style.is_none(),
            _ => false,
        };
        if !is_literal {
            return Err(SQLError::new(
                ErrorKind::MalformedTagOption,
                format!("default value for {} is not a literal: {:?}", sql_type, raw),
            ));
        }

        Ok(Self(literal.to_string()))
    }

    pub fn as_sql(&self) -> &str {
        &self.0
    }
}

impl Display for DefaultLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BaseType;

    #[test]
    fn test_identifier_allow_list() {
        assert_eq!(required_identifier("table", "  users_2 ").unwrap(), "users_2");
        assert_eq!(required_identifier("column", "_id").unwrap(), "_id");

        let err = required_identifier("column", "   ").unwrap_err();
        assert_eq!(err.kind, ErrorKind::EmptyParameter);
        assert_eq!(err.message, "param column is empty");

        for name in ["1abc", "a-b", "a b", "t;DROP", "`t`", "ä"] {
            let err = check_identifier("table", name).unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidIdentifier, "name: {:?}", name);
        }

        let long = "x".repeat(MAX_IDENTIFIER_LEN + 1);
        assert!(check_identifier("table", &long[1..]).is_ok());
        assert!(check_identifier("table", &long).is_err());
    }

    #[test]
    fn test_default_quoted_for_varchar() {
        let varchar = SqlType::new(BaseType::Varchar).with_size(20);
        assert_eq!(
            DefaultLiteral::format(&varchar, "zhang").unwrap().as_sql(),
            "'zhang'"
        );
        assert_eq!(
            DefaultLiteral::format(&varchar, "o'neil").unwrap().as_sql(),
            "'o''neil'"
        );
        assert_eq!(
            DefaultLiteral::format(&varchar, "a\\").unwrap_err().kind,
            ErrorKind::MalformedTagOption
        );
    }

    #[test]
    fn test_default_verbatim_for_other_types() {
        let int = SqlType::new(BaseType::Int);
        assert_eq!(DefaultLiteral::format(&int, "0").unwrap().as_sql(), "0");
        assert_eq!(DefaultLiteral::format(&int, "-1").unwrap().as_sql(), "-1");
        assert_eq!(DefaultLiteral::format(&int, "NULL").unwrap().as_sql(), "NULL");

        let datetime = SqlType::new(BaseType::Datetime);
        assert_eq!(
            DefaultLiteral::format(&datetime, "CURRENT_TIMESTAMP")
                .unwrap()
                .as_sql(),
            "CURRENT_TIMESTAMP"
        );
        assert_eq!(
            DefaultLiteral::format(&datetime, "'2020-01-01 00:00:00'")
                .unwrap()
                .as_sql(),
            "'2020-01-01 00:00:00'"
        );

        for raw in ["", "1 2", "0) ; DROP TABLE t", "(SELECT 1)"] {
            let err = DefaultLiteral::format(&int, raw).unwrap_err();
            assert_eq!(err.kind, ErrorKind::MalformedTagOption, "raw: {:?}", raw);
        }
    }
}

use std::{fmt::Display, str::FromStr};

use sqlparser::{
    dialect::MySqlDialect,
    tokenizer::{Token, Tokenizer},
};

use super::{ErrorKind, SQLError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BaseType {
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Float,
    Double,

    Char,
    Varchar,
    Text,

    Date,
    Datetime,
    Timestamp,
}

impl BaseType {
    pub fn keyword(&self) -> &'static str {
        match self {
            BaseType::TinyInt => "TINYINT",
            BaseType::SmallInt => "SMALLINT",
            BaseType::Int => "INT",
            BaseType::BigInt => "BIGINT",
            BaseType::Float => "FLOAT",
            BaseType::Double => "DOUBLE",
            BaseType::Char => "CHAR",
            BaseType::Varchar => "VARCHAR",
            BaseType::Text => "TEXT",
            BaseType::Date => "DATE",
            BaseType::Datetime => "DATETIME",
            BaseType::Timestamp => "TIMESTAMP",
        }
    }

    fn from_keyword(keyword: &str) -> Option<Self> {
        let base = match keyword.to_ascii_uppercase().as_str() {
            "TINYINT" | "BOOL" | "BOOLEAN" => BaseType::TinyInt,
            "SMALLINT" => BaseType::SmallInt,
            "INT" | "INTEGER" => BaseType::Int,
            "BIGINT" => BaseType::BigInt,
            "FLOAT" => BaseType::Float,
            "DOUBLE" | "REAL" => BaseType::Double,
            "CHAR" => BaseType::Char,
            "VARCHAR" => BaseType::Varchar,
            "TEXT" => BaseType::Text,
            "DATE" => BaseType::Date,
            "DATETIME" => BaseType::Datetime,
            "TIMESTAMP" => BaseType::Timestamp,
            _ => return None,
        };
        Some(base)
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            BaseType::TinyInt | BaseType::SmallInt | BaseType::Int | BaseType::BigInt
        )
    }

    pub fn is_character(&self) -> bool {
        matches!(self, BaseType::Char | BaseType::Varchar | BaseType::Text)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            BaseType::Date | BaseType::Datetime | BaseType::Timestamp
        )
    }
}

/// A column type as written in DDL, e.g. `VARCHAR(20)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SqlType {
    pub base: BaseType,
    /// Display width or length, rendered as `(size)` after the keyword.
    pub size: Option<u32>,
}

impl SqlType {
    pub fn new(base: BaseType) -> Self {
        Self { base, size: None }
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    /// Defaults of this type are rendered as quoted strings.
    pub fn quotes_default(&self) -> bool {
        self.to_string().to_ascii_uppercase().contains("VARCHAR")
    }
}

impl Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.size {
            Some(size) => write!(f, "{}({})", self.base.keyword(), size),
            None => write!(f, "{}", self.base.keyword()),
        }
    }
}

impl FromStr for SqlType {
    type Err = SQLError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || SQLError::new(ErrorKind::TypeError, format!("Unknown data type: {}", s));

        let tokens = Tokenizer::new(&MySqlDialect {}, s)
            .tokenize()
            .map_err(|e| SQLError::new(ErrorKind::TypeError, e.to_string()))?
            .into_iter()
            .filter(|token| !matches!(token, Token::Whitespace(_)))
            .collect::<Vec<_>>();

        let sql_type = match tokens.as_slice() {
            [Token::Word(word)] if word.quote_style.is_none() => {
                SqlType::new(BaseType::from_keyword(&word.value).ok_or_else(unknown)?)
            }
            [Token::Word(word), Token::LParen, Token::Number(size, _), Token::RParen]
                if word.quote_style.is_none() =>
            {
                let base = BaseType::from_keyword(&word.value).ok_or_else(unknown)?;
                let size = size
                    .parse::<u32>()
                    .ok()
                    .filter(|size| *size > 0)
                    .ok_or_else(|| {
                        SQLError::new(ErrorKind::TypeError, format!("Invalid type size: {}", s))
                    })?;
                SqlType::new(base).with_size(size)
            }
            _ => return Err(unknown()),
        };

        Ok(sql_type)
    }
}

use sqlparser::{
    dialect::MySqlDialect,
    tokenizer::{Token, Tokenizer, Word},
};

use super::statement::{Filter, ObjectName, Operand, Projection, Select, Statement};
use crate::{
    catalog::defs::{ColumnDefinition, IndexDefinition},
    core::{Datum, ErrorKind, SQLError, SqlType},
};

/// Parse one statement. Returns the statement and the number of `?`
/// placeholders it holds.
pub fn parse_sql(sql_text: &str) -> Result<(Statement, usize), SQLError> {
    let tokens = Tokenizer::new(&MySqlDialect {}, sql_text)
        .tokenize()
        .map_err(|e| SQLError::new(ErrorKind::ParseError, e.to_string()))?
        .into_iter()
        .filter(|token| !matches!(token, Token::Whitespace(_) | Token::EOF))
        .collect::<Vec<_>>();

    let mut parser = Parser::new(tokens);
    let statement = parser.parse_statement()?;
    while parser.consume(&Token::SemiColon) {}
    if let Some(token) = parser.peek() {
        return Err(parse_error(format!("unexpected token: {}", token)));
    }

    Ok((statement, parser.placeholders))
}

fn parse_error(message: impl AsRef<str>) -> SQLError {
    SQLError::new(ErrorKind::ParseError, message)
}

struct Parser {
    tokens: Vec<Token>,
    index: usize,
    placeholders: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            index: 0,
            placeholders: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn next_token(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    fn unexpected(&self, expected: &str) -> SQLError {
        match self.peek() {
            Some(token) => parse_error(format!("expected {}, found: {}", expected, token)),
            None => parse_error(format!("expected {}, found end of statement", expected)),
        }
    }

    fn is_keyword(token: Option<&Token>, keyword: &str) -> bool {
        matches!(
            token,
            Some(Token::Word(Word { value, quote_style: None, .. }))
                if value.eq_ignore_ascii_case(keyword)
        )
    }

    fn parse_keyword(&mut self, keyword: &str) -> bool {
        if Self::is_keyword(self.peek(), keyword) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Consume all of `keywords` or none of them.
    fn parse_keywords(&mut self, keywords: &[&str]) -> bool {
        let matched = keywords
            .iter()
            .enumerate()
            .all(|(i, keyword)| Self::is_keyword(self.tokens.get(self.index + i), keyword));
        if matched {
            self.index += keywords.len();
        }
        matched
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), SQLError> {
        if self.parse_keyword(keyword) {
            Ok(())
        } else {
            Err(self.unexpected(keyword))
        }
    }

    fn consume(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> Result<(), SQLError> {
        if self.consume(token) {
            Ok(())
        } else {
            Err(self.unexpected(&token.to_string()))
        }
    }

    fn parse_identifier(&mut self) -> Result<String, SQLError> {
        match self.peek() {
            Some(Token::Word(word)) => {
                let value = word.value.clone();
                self.index += 1;
                Ok(value)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    fn parse_object_name(&mut self) -> Result<ObjectName, SQLError> {
        let first = self.parse_identifier()?;
        if self.consume(&Token::Period) {
            let name = self.parse_identifier()?;
            Ok(ObjectName {
                schema: Some(first),
                name,
            })
        } else {
            Ok(ObjectName {
                schema: None,
                name: first,
            })
        }
    }

    fn parse_statement(&mut self) -> Result<Statement, SQLError> {
        if self.parse_keyword("CREATE") {
            self.parse_create()
        } else if self.parse_keyword("DROP") {
            self.parse_drop()
        } else if self.parse_keyword("ALTER") {
            self.parse_alter()
        } else if self.parse_keyword("USE") {
            Ok(Statement::Use(self.parse_identifier()?))
        } else if self.parse_keyword("SELECT") {
            self.parse_select()
        } else {
            Err(self.unexpected("a statement"))
        }
    }

    fn parse_create(&mut self) -> Result<Statement, SQLError> {
        if self.parse_keyword("DATABASE") || self.parse_keyword("SCHEMA") {
            let if_not_exists = self.parse_keywords(&["IF", "NOT", "EXISTS"]);
            let name = self.parse_identifier()?;
            return Ok(Statement::CreateDatabase {
                name,
                if_not_exists,
            });
        }

        if self.parse_keyword("TABLE") {
            let if_not_exists = self.parse_keywords(&["IF", "NOT", "EXISTS"]);
            let name = self.parse_object_name()?;
            self.expect(&Token::LParen)?;
            let mut columns = vec![self.parse_column_definition()?];
            while self.consume(&Token::Comma) {
                columns.push(self.parse_column_definition()?);
            }
            self.expect(&Token::RParen)?;
            return Ok(Statement::CreateTable {
                name,
                if_not_exists,
                columns,
            });
        }

        let unique = self.parse_keyword("UNIQUE");
        let fulltext = self.parse_keyword("FULLTEXT");
        self.expect_keyword("INDEX")?;
        let index_name = self.parse_identifier()?;
        self.expect_keyword("ON")?;
        let table = self.parse_object_name()?;
        self.expect(&Token::LParen)?;
        let mut columns = vec![self.parse_identifier()?];
        while self.consume(&Token::Comma) {
            columns.push(self.parse_identifier()?);
        }
        self.expect(&Token::RParen)?;

        Ok(Statement::CreateIndex {
            table,
            index: IndexDefinition {
                name: index_name,
                columns,
                unique,
                fulltext,
            },
        })
    }

    fn parse_drop(&mut self) -> Result<Statement, SQLError> {
        if self.parse_keyword("DATABASE") || self.parse_keyword("SCHEMA") {
            let if_exists = self.parse_keywords(&["IF", "EXISTS"]);
            let name = self.parse_identifier()?;
            return Ok(Statement::DropDatabase { name, if_exists });
        }

        if self.parse_keyword("TABLE") {
            let if_exists = self.parse_keywords(&["IF", "EXISTS"]);
            let name = self.parse_object_name()?;
            return Ok(Statement::DropTable { name, if_exists });
        }

        self.expect_keyword("INDEX")?;
        let name = self.parse_identifier()?;
        self.expect_keyword("ON")?;
        let table = self.parse_object_name()?;
        Ok(Statement::DropIndex { table, name })
    }

    fn parse_alter(&mut self) -> Result<Statement, SQLError> {
        self.expect_keyword("TABLE")?;
        let table = self.parse_object_name()?;

        if self.parse_keyword("ADD") {
            self.parse_keyword("COLUMN");
            let column = self.parse_column_definition()?;
            Ok(Statement::AddColumn { table, column })
        } else if self.parse_keyword("DROP") {
            self.parse_keyword("COLUMN");
            let column = self.parse_identifier()?;
            Ok(Statement::DropColumn { table, column })
        } else {
            Err(self.unexpected("ADD or DROP"))
        }
    }

    /// `name TYPE[(n)] [PRIMARY KEY] [UNIQUE [KEY]] [AUTO_INCREMENT]
    /// [[NOT] NULL] [DEFAULT literal] [COMMENT 'text']` in any order.
    fn parse_column_definition(&mut self) -> Result<ColumnDefinition, SQLError> {
        let name = self.parse_identifier()?;
        let data_type = self.parse_data_type()?;
        let mut column = ColumnDefinition::new(name, data_type);

        loop {
            if self.parse_keywords(&["PRIMARY", "KEY"]) {
                column.primary_key = true;
            } else if self.parse_keyword("UNIQUE") {
                self.parse_keyword("KEY");
                column.unique = true;
            } else if self.parse_keyword("AUTO_INCREMENT") {
                column.auto_increment = true;
            } else if self.parse_keywords(&["NOT", "NULL"]) {
                column.not_null = true;
            } else if self.parse_keyword("NULL") {
                column.not_null = false;
            } else if self.parse_keyword("DEFAULT") {
                column.default = self.parse_default()?;
            } else if self.parse_keyword("COMMENT") {
                match self.next_token() {
                    Some(Token::SingleQuotedString(comment)) => column.comment = comment,
                    _ => return Err(parse_error("expected a string after COMMENT")),
                }
            } else {
                break;
            }
        }

        Ok(column)
    }

    fn parse_data_type(&mut self) -> Result<SqlType, SQLError> {
        let keyword = match self.next_token() {
            Some(Token::Word(word)) if word.quote_style.is_none() => word.value,
            _ => return Err(parse_error("expected a data type")),
        };

        let type_text = if self.consume(&Token::LParen) {
            let size = match self.next_token() {
                Some(Token::Number(size, _)) => size,
                _ => return Err(parse_error(format!("expected a size for {}", keyword))),
            };
            self.expect(&Token::RParen)?;
            format!("{}({})", keyword, size)
        } else {
            keyword
        };

        type_text
            .parse::<SqlType>()
            .map_err(|e| SQLError::new(ErrorKind::ParseError, e.message))
    }

    /// The stored default value, `None` for `DEFAULT NULL`.
    fn parse_default(&mut self) -> Result<Option<String>, SQLError> {
        let sign = if self.consume(&Token::Minus) {
            "-"
        } else {
            self.consume(&Token::Plus);
            ""
        };

        match self.next_token() {
            Some(Token::Number(number, _)) => Ok(Some(format!("{}{}", sign, number))),
            Some(Token::SingleQuotedString(value)) if sign.is_empty() => Ok(Some(value)),
            Some(Token::Word(word)) if sign.is_empty() && word.quote_style.is_none() => {
                if word.value.eq_ignore_ascii_case("NULL") {
                    Ok(None)
                } else {
                    Ok(Some(word.value))
                }
            }
            _ => Err(parse_error("expected a literal after DEFAULT")),
        }
    }

    fn parse_select(&mut self) -> Result<Statement, SQLError> {
        let projection = self.parse_projection()?;
        self.expect_keyword("FROM")?;
        let view = self.parse_object_name()?;

        let mut filters = vec![];
        if self.parse_keyword("WHERE") {
            filters.push(self.parse_filter()?);
            while self.parse_keyword("AND") {
                filters.push(self.parse_filter()?);
            }
        }

        Ok(Statement::Select(Select {
            projection,
            view,
            filters,
        }))
    }

    fn parse_projection(&mut self) -> Result<Projection, SQLError> {
        if self.consume(&Token::Mul) {
            return Ok(Projection::Wildcard);
        }

        if Self::is_keyword(self.peek(), "COUNT")
            && self.tokens.get(self.index + 1) == Some(&Token::LParen)
        {
            self.index += 2;
            match self.next_token() {
                Some(Token::Mul) | Some(Token::Number(_, _)) => {}
                _ => return Err(parse_error("expected * or a number in COUNT")),
            }
            self.expect(&Token::RParen)?;
            return Ok(Projection::Count);
        }

        let mut columns = vec![self.parse_identifier()?];
        while self.consume(&Token::Comma) {
            columns.push(self.parse_identifier()?);
        }
        Ok(Projection::Columns(columns))
    }

    fn parse_filter(&mut self) -> Result<Filter, SQLError> {
        let column = self.parse_identifier()?;
        self.expect(&Token::Eq)?;

        let operand = match self.next_token() {
            Some(Token::Placeholder(_)) => {
                let index = self.placeholders;
                self.placeholders += 1;
                Operand::Placeholder(index)
            }
            Some(Token::SingleQuotedString(value)) => Operand::Literal(Datum::String(value)),
            Some(Token::Number(number, _)) => {
                let value = number
                    .parse::<i64>()
                    .map_err(|_| parse_error(format!("unsupported number: {}", number)))?;
                Operand::Literal(Datum::Int(value))
            }
            Some(Token::Word(word))
                if word.quote_style.is_none() && word.value.eq_ignore_ascii_case("DATABASE") =>
            {
                self.expect(&Token::LParen)?;
                self.expect(&Token::RParen)?;
                Operand::CurrentDatabase
            }
            _ => return Err(parse_error(format!("unsupported operand for {}", column))),
        };

        Ok(Filter { column, operand })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BaseType;

    fn parse(sql: &str) -> Statement {
        parse_sql(sql).unwrap().0
    }

    #[test]
    fn test_parse_database_statements() {
        assert_eq!(
            parse("CREATE DATABASE IF NOT EXISTS app"),
            Statement::CreateDatabase {
                name: "app".to_string(),
                if_not_exists: true,
            }
        );
        assert_eq!(
            parse("drop schema app;"),
            Statement::DropDatabase {
                name: "app".to_string(),
                if_exists: false,
            }
        );
        assert_eq!(parse("USE app"), Statement::Use("app".to_string()));
    }

    #[test]
    fn test_parse_create_table() {
        let statement = parse(
            "CREATE TABLE IF NOT EXISTS app.users(id INT PRIMARY KEY AUTO_INCREMENT NOT NULL,\
             name VARCHAR(20) UNIQUE NOT NULL DEFAULT 'it''s',score INT DEFAULT -1);",
        );
        let (name, columns) = match statement {
            Statement::CreateTable {
                name,
                if_not_exists: true,
                columns,
            } => (name, columns),
            other => panic!("unexpected statement: {:?}", other),
        };

        assert_eq!(name.to_string(), "app.users");
        assert_eq!(columns.len(), 3);
        assert!(columns[0].primary_key && columns[0].auto_increment && columns[0].not_null);
        assert_eq!(
            columns[1].data_type,
            SqlType::new(BaseType::Varchar).with_size(20)
        );
        assert!(columns[1].unique);
        assert_eq!(columns[1].default.as_deref(), Some("it's"));
        assert_eq!(columns[2].default.as_deref(), Some("-1"));
    }

    #[test]
    fn test_parse_alter_and_index() {
        assert_eq!(
            parse("ALTER TABLE app.users DROP COLUMN age"),
            Statement::DropColumn {
                table: ObjectName {
                    schema: Some("app".to_string()),
                    name: "users".to_string(),
                },
                column: "age".to_string(),
            }
        );

        match parse("CREATE UNIQUE FULLTEXT INDEX idx ON users(a,b)") {
            Statement::CreateIndex { table, index } => {
                assert_eq!(table.schema, None);
                assert_eq!(index.columns, vec!["a".to_string(), "b".to_string()]);
                assert!(index.unique && index.fulltext);
            }
            other => panic!("unexpected statement: {:?}", other),
        }

        assert!(matches!(
            parse("DROP INDEX idx ON app.users"),
            Statement::DropIndex { .. }
        ));
    }

    #[test]
    fn test_parse_select() {
        let (statement, placeholders) = parse_sql(
            "SELECT COUNT(0) FROM information_schema.EVENTS WHERE EVENT_SCHEMA = ? AND STATUS = 'ENABLED'",
        )
        .unwrap();
        assert_eq!(placeholders, 1);

        let select = match statement {
            Statement::Select(select) => select,
            other => panic!("unexpected statement: {:?}", other),
        };
        assert_eq!(select.projection, Projection::Count);
        assert_eq!(select.view.name, "EVENTS");
        assert_eq!(select.filters[0].operand, Operand::Placeholder(0));
        assert_eq!(
            select.filters[1].operand,
            Operand::Literal(Datum::from("ENABLED"))
        );

        let (statement, _) = parse_sql(
            "SELECT SCHEMA_NAME FROM information_schema.SCHEMATA WHERE SCHEMA_NAME = DATABASE()",
        )
        .unwrap();
        match statement {
            Statement::Select(select) => {
                assert_eq!(select.filters[0].operand, Operand::CurrentDatabase)
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn test_parse_errors() {
        for sql in [
            "",
            "INSERT INTO t VALUES (1)",
            "CREATE TABLE t()",
            "CREATE TABLE t(a BLOB)",
            "DROP TABLE a.b.c",
            "SELECT a FROM t WHERE a > 1",
            "USE app extra",
        ] {
            let err = parse_sql(sql).unwrap_err();
            assert_eq!(err.kind, ErrorKind::ParseError, "{}", sql);
        }
    }
}

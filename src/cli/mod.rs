use std::io::{BufRead, Write};

use crate::{
    core::{ErrorKind, SQLError},
    schema::{DescribeColumn, SchemaManager},
    sql::{QueryResult, SQLKind, Session},
};

const HELP: &str = "\
SQL statements run against the in-memory server. Meta commands:
  \\exists database <db>
  \\exists table <schema>
  \\exists column <schema> <column>
  \\exists index <schema> <index>
  \\exists event <db> <event>
  \\describe <schema> <column>
  \\resolve <schema>
  \\status
  \\help
  \\q
";

enum Command {
    Quit,
    Output(String),
}

fn io_error(e: std::io::Error) -> SQLError {
    SQLError::new(ErrorKind::RuntimeError, e.to_string())
}

pub struct CliApp<I: BufRead, O: Write> {
    session: Session,

    input: I,
    output: O,
}

impl<I: BufRead, O: Write> CliApp<I, O> {
    pub fn new(session: Session, input: I, output: O) -> Self {
        Self {
            session,
            input,
            output,
        }
    }

    /// Read lines until `\q` or end of input.
    pub fn run(&mut self) -> Result<(), SQLError> {
        self.bootstrap()?;

        let mut line_buf = String::new();
        loop {
            self.prompt()?;
            line_buf.clear();
            if self.input.read_line(&mut line_buf).map_err(io_error)? == 0 {
                return Ok(());
            }
            match self.handle_line(line_buf.trim()) {
                Command::Quit => return Ok(()),
                Command::Output(result) => {
                    self.print(&result)?;
                    self.print("\n")?;
                }
            }
        }
    }

    fn bootstrap(&mut self) -> Result<(), SQLError> {
        let welcome = "Welcome to leischema! Type \\help for commands.\n";
        self.print(welcome)?;
        Ok(())
    }

    fn prompt(&mut self) -> Result<(), SQLError> {
        let database = self.session.current_schema()?.unwrap_or_default();
        self.print(&format!("{}> ", database))
    }

    fn handle_line(&mut self, line: &str) -> Command {
        if line.is_empty() {
            return Command::Output(String::new());
        }
        if line == "\\q" {
            return Command::Quit;
        }

        let result = match line.strip_prefix('\\') {
            Some(meta) => self.handle_meta(meta),
            None => self.session.execute(line).map(|result| format_result(&result)),
        };
        Command::Output(result.unwrap_or_else(|e| e.to_string()))
    }

    fn handle_meta(&self, meta: &str) -> Result<String, SQLError> {
        let args = meta.split_whitespace().collect::<Vec<_>>();
        let manager = SchemaManager::detect(&self.session)?;

        match args.as_slice() {
            ["help"] => Ok(HELP.to_string()),
            ["exists", "database", db] => manager.database_exists(db).map(yes_no),
            ["exists", "table", schema] => manager.table_exists(schema).map(yes_no),
            ["exists", "column", schema, column] => {
                manager.column_exists(schema, column).map(yes_no)
            }
            ["exists", "index", schema, index] => manager.index_exists(schema, index).map(yes_no),
            ["exists", "event", db, event] => manager.event_exists(db, event).map(yes_no),
            ["describe", schema, column] => manager
                .describe_column(schema, column)
                .map(|column| column.map_or_else(|| "no such column".to_string(), describe)),
            ["resolve", schema] => manager.resolve(schema).map(|r| r.to_string()),
            ["status"] => Ok(format!(
                "processes: {}\ntransactions: {}\nevents: {}",
                manager.num_process()?,
                manager.num_transaction()?,
                manager.num_events()?
            )),
            _ => Err(SQLError::new(
                ErrorKind::ParseError,
                format!("unknown command: \\{}", meta),
            )),
        }
    }

    fn print(&mut self, string: &str) -> Result<(), SQLError> {
        self.output.write_all(string.as_bytes()).map_err(io_error)?;
        self.output.flush().map_err(io_error)
    }
}

fn yes_no(exists: bool) -> String {
    if exists { "yes" } else { "no" }.to_string()
}

fn describe(column: DescribeColumn) -> String {
    format!(
        "#{} {} null={} key={} default={} extra={}",
        column.ordinal_position,
        column.column_type,
        if column.nullable { "YES" } else { "NO" },
        column.key.as_str(),
        column.default.as_deref().unwrap_or("NULL"),
        column.extra
    )
}

fn format_result(result: &QueryResult) -> String {
    match result.kind {
        SQLKind::Execute => "OK".to_string(),
        SQLKind::Query => {
            let mut lines = vec![result.fields.join(" | ")];
            lines.extend(result.data.iter().map(|row| {
                row.values
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(" | ")
            }));
            lines.push(format!("({} rows)", result.data.len()));
            lines.join("\n")
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::sql::Engine;

    fn run_script(script: &str) -> String {
        let engine = Engine::new();
        let mut output = vec![];
        let mut app = CliApp::new(
            engine.session().unwrap(),
            Cursor::new(script.as_bytes()),
            &mut output,
        );
        app.run().unwrap();
        drop(app);
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_sql_and_meta_commands() {
        let output = run_script(
            "CREATE DATABASE app\n\
             USE app\n\
             CREATE TABLE users(id INT PRIMARY KEY, name VARCHAR(20) DEFAULT 'x')\n\
             \\exists table users\n\
             \\exists column app.users age\n\
             \\resolve users\n\
             \\describe users id\n\
             \\q\n\
             \\exists table nothing_after_quit\n",
        );

        assert!(output.starts_with("Welcome to leischema!"));
        assert!(output.contains("app> "));
        assert!(output.contains("yes\n"));
        assert!(output.contains("no\n"));
        assert!(output.contains("app.users\n"));
        assert!(output.contains("#1 int null=NO key=PRI default=NULL extra="));
        assert!(!output.contains("nothing_after_quit"));
    }

    #[test]
    fn test_errors_are_printed() {
        let output = run_script(
            "\\exists table users\n\
             SELECT a FROM b\n\
             \\frobnicate\n",
        );

        assert!(output.contains("No Selected Database"));
        assert!(output.contains("doesn't exist"));
        assert!(output.contains("unknown command: \\frobnicate"));
    }

    #[test]
    fn test_query_output() {
        let output = run_script(
            "CREATE DATABASE app\n\
             SELECT SCHEMA_NAME FROM information_schema.SCHEMATA\n",
        );
        assert!(output.contains("SCHEMA_NAME\napp\n(1 rows)"));
    }
}

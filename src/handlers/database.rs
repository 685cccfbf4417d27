//! Relational database handler
//!
//! Inserts one row per record through a caller-supplied connection.
//! Concrete drivers stay outside the crate; the handler only needs the
//! driver tag for identifier quoting and an `execute` entry point with
//! positional parameters.

use crate::core::error::{FanlogError, Result};
use crate::core::handler::{Handler, HandlerCore, StreamHandler};
use crate::core::level::Level;
use crate::core::record::Record;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDriver {
    Mysql,
    Postgres,
    Sqlite,
}

impl SqlDriver {
    /// Identifier quote character: backtick for MySQL, double quote for
    /// PostgreSQL and SQLite.
    pub fn quote_char(&self) -> char {
        match self {
            SqlDriver::Mysql => '`',
            SqlDriver::Postgres | SqlDriver::Sqlite => '"',
        }
    }
}

/// Interface obligation for the caller-supplied connection. Placeholders
/// in the statement are `?`; adapters for drivers with numbered
/// placeholders translate on their side.
pub trait SqlConnection: Send {
    fn driver(&self) -> SqlDriver;
    fn execute(&mut self, sql: &str, params: &[Value]) -> std::result::Result<(), String>;
}

pub struct DatabaseHandler {
    core: HandlerCore,
    connection: Box<dyn SqlConnection>,
    table: String,
    quote_char: Option<char>,
}

impl DatabaseHandler {
    pub fn new(
        connection: Box<dyn SqlConnection>,
        table: &str,
        min_level: Level,
    ) -> Result<Self> {
        if table.is_empty() {
            return Err(FanlogError::config("DatabaseHandler", "empty table name"));
        }
        Ok(Self {
            core: HandlerCore::new("database", min_level),
            connection,
            table: table.to_string(),
            quote_char: None,
        })
    }

    /// Quote char is detected from the driver once and cached.
    fn quote_char(&mut self) -> char {
        let driver = self.connection.driver();
        *self
            .quote_char
            .get_or_insert_with(|| driver.quote_char())
    }

    fn quote_identifier(quote: char, identifier: &str) -> String {
        let doubled = identifier.replace(quote, &format!("{}{}", quote, quote));
        format!("{}{}{}", quote, doubled, quote)
    }

    /// `INSERT INTO <table> (<record keys>) VALUES (…)` with values in
    /// matching order; `data` is JSON-encoded.
    fn statement_for(&mut self, record: &Record) -> (String, Vec<Value>) {
        let quote = self.quote_char();

        let mut columns = vec!["context", "level", "message"];
        let field_names: Vec<&str> = record.fields.keys().map(String::as_str).collect();
        columns.extend(field_names);
        columns.push("data");

        let mut params: Vec<Value> = vec![
            Value::String(record.context.clone()),
            Value::String(record.level.as_str().to_string()),
            Value::String(record.message.clone()),
        ];
        params.extend(record.fields.values().cloned());
        params.push(Value::String(
            serde_json::to_string(&record.data).unwrap_or_else(|_| "{}".to_string()),
        ));

        let column_list: Vec<String> = columns
            .iter()
            .map(|column| Self::quote_identifier(quote, column))
            .collect();
        let placeholders: Vec<&str> = columns.iter().map(|_| "?").collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            Self::quote_identifier(quote, &self.table),
            column_list.join(", "),
            placeholders.join(", "),
        );
        (sql, params)
    }
}

impl Handler for DatabaseHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }

    fn kind(&self) -> &'static str {
        "database"
    }

    fn invoke(
        &mut self,
        level: Level,
        message: &str,
        call_context: &Map<String, Value>,
    ) -> Option<String> {
        let (record, payload) = self.core.prepare(level, message, call_context)?;

        if self.core.has_stream() {
            return self.core.write_stream(&payload).then_some(payload);
        }

        let (sql, params) = self.statement_for(&record);
        self.connection.execute(&sql, &params).ok()?;
        Some(payload)
    }
}

impl StreamHandler for DatabaseHandler {}

//! Named statement registry.
//!
//! Every query the adapter runs is declared once as a [`Statement`]
//! constant. The first time a name is used, [`StatementRegistry::ensure`]
//! prepares it on the pool (validating it against the server) and records
//! the text; subsequent uses are no-ops. Execution then goes through
//! sqlx's per-connection prepared statement cache.
//!
//! A name is bound to exactly one query text for the lifetime of the
//! registry. Registering a known name with different text fails with
//! [`STATEMENT_CONFLICT`] instead of silently running the old query.

use std::collections::HashMap;

use highscore_types::{AppError, ErrorTemplate};
use sqlx::{Executor, PgPool};
use tokio::sync::RwLock;

/// A statement name was reused with a different query text.
pub const STATEMENT_CONFLICT: ErrorTemplate = ErrorTemplate::new(
    "D003",
    "Statement name already registered with a different query",
);

/// A named, parameterized SQL statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statement {
    name: &'static str,
    sql: &'static str,
}

impl Statement {
    /// Declare a statement.
    pub const fn new(name: &'static str, sql: &'static str) -> Self {
        Self { name, sql }
    }

    /// The statement name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The query text.
    pub const fn sql(&self) -> &'static str {
        self.sql
    }
}

/// Tracks which statements have been prepared by one adapter instance.
#[derive(Debug, Default)]
pub struct StatementRegistry {
    prepared: RwLock<HashMap<&'static str, &'static str>>,
}

/// Whether `statement` still needs preparing given what is registered.
fn needs_prepare(
    prepared: &HashMap<&'static str, &'static str>,
    statement: &Statement,
) -> Result<bool, AppError> {
    match prepared.get(statement.name) {
        None => Ok(true),
        Some(sql) if *sql == statement.sql => Ok(false),
        Some(sql) => Err(STATEMENT_CONFLICT
            .error()
            .with_field("statement", statement.name)
            .with_internal(format!("registered: {sql}; requested: {}", statement.sql))),
    }
}

impl StatementRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare `statement` on `pool` unless it already has been.
    ///
    /// # Errors
    ///
    /// Returns [`STATEMENT_CONFLICT`] if the name is registered with
    /// different text, or a wrapped sqlx error if preparation fails.
    pub async fn ensure(&self, pool: &PgPool, statement: &Statement) -> Result<(), AppError> {
        if !needs_prepare(&*self.prepared.read().await, statement)? {
            return Ok(());
        }

        let mut prepared = self.prepared.write().await;
        // Another task may have won the race between the two locks.
        if !needs_prepare(&prepared, statement)? {
            return Ok(());
        }

        pool.prepare(statement.sql).await.map_err(|e| {
            AppError::wrap(&e).with_field("statement", statement.name)
        })?;
        prepared.insert(statement.name, statement.sql);
        tracing::debug!(statement = statement.name, "statement prepared");
        Ok(())
    }

    /// Number of distinct statements prepared so far.
    pub async fn len(&self) -> usize {
        self.prepared.read().await.len()
    }

    /// Whether nothing has been prepared yet.
    pub async fn is_empty(&self) -> bool {
        self.prepared.read().await.is_empty()
    }
}

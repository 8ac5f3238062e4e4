//! Render buffer and clause stack.

use std::fmt;

/// Clause currently being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    With,
    Select,
    From,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Offset,
    Fetch,
    Over,
    Partition,
    Filter,
    ForUpdate,
    Insert,
    Values,
    Set,
    Returning,
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Clause::With => "WITH",
            Clause::Select => "SELECT",
            Clause::From => "FROM",
            Clause::Where => "WHERE",
            Clause::GroupBy => "GROUP BY",
            Clause::Having => "HAVING",
            Clause::OrderBy => "ORDER BY",
            Clause::Offset => "OFFSET",
            Clause::Fetch => "FETCH",
            Clause::Over => "OVER",
            Clause::Partition => "PARTITION BY",
            Clause::Filter => "FILTER",
            Clause::ForUpdate => "FOR UPDATE",
            Clause::Insert => "INSERT",
            Clause::Values => "VALUES",
            Clause::Set => "SET",
            Clause::Returning => "RETURNING",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Default)]
pub struct ClauseStack {
    clauses: Vec<Clause>,
}

impl ClauseStack {
    pub fn push(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }

    pub fn pop(&mut self) -> Option<Clause> {
        self.clauses.pop()
    }

    pub fn current(&self) -> Option<Clause> {
        self.clauses.last().copied()
    }

    pub fn clear(&mut self) {
        self.clauses.clear();
    }
}

/// Accumulating SQL text sink.
#[derive(Debug, Default)]
pub struct SqlBuffer {
    sql: String,
}

impl SqlBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sql: String::with_capacity(capacity),
        }
    }

    pub fn push_str(&mut self, fragment: &str) {
        self.sql.push_str(fragment);
    }

    pub fn push(&mut self, c: char) {
        self.sql.push(c);
    }

    pub fn as_str(&self) -> &str {
        &self.sql
    }

    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.sql)
    }
}

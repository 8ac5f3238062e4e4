//! Dialect capability descriptor and built-in profiles.
//!
//! Every rendering decision that differs between databases is driven by a
//! field of [`Capabilities`]. Built-in profiles live in `transpiler::sql`;
//! custom profiles are TOML files naming a `base` dialect plus overrides:
//!
//! ```toml
//! base = "postgres"
//! pagination = "window_function"
//! row_values = false
//! ```

use crate::ast::SqlType;
use crate::error::{TranslateError, TranslateResult};
use crate::transpiler::sql;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How OFFSET/FETCH is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationStyle {
    /// `OFFSET n ROWS FETCH FIRST m ROWS ONLY`
    OffsetFetch,
    /// `LIMIT m OFFSET n`
    LimitOffset,
    /// `LIMIT n, m`
    CombinedLimit,
    /// `TOP (m)` before the select list; no skip primitive.
    Top,
    /// `TOP m START AT n+1`
    TopStartAt,
    /// `SKIP n FIRST m`
    SkipFirst,
    /// `FIRST m SKIP n`
    FirstSkip,
    /// `ROWS n+1 TO n+m`
    RowsTo,
    /// Always emulate with `row_number()`.
    WindowFunction,
    /// Nothing in SQL; the driver paginates.
    None,
}

impl PaginationStyle {
    /// Styles rendered between `SELECT [DISTINCT]` and the select list.
    pub fn is_prefix(self) -> bool {
        matches!(self, Self::Top | Self::TopStartAt | Self::SkipFirst | Self::FirstSkip)
    }

    /// Styles that can express the native with-ties/percent variants.
    fn supports_extended_fetch(self) -> bool {
        matches!(self, Self::OffsetFetch | Self::Top | Self::TopStartAt)
    }
}

/// How computed row counts (`fetch + offset`) are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitOperandStyle {
    /// `? + ?`
    Arithmetic,
    /// One placeholder whose binder adds the parts.
    SingleParameter,
    /// Values folded from bindings into literals.
    Literal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TupleEmulation {
    /// Broad prefix on the leading column plus a negated remainder.
    IndexOptimized,
    /// Plain lexicographic unrolling.
    Logical,
}

/// How scalar `IS [NOT] DISTINCT FROM` is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistinctFromStyle {
    Native,
    /// MySQL `<=>`
    NullSafeEquals,
    /// Oracle `decode(a, b, 0, 1)`
    Decode,
    /// `EXISTS (SELECT a INTERSECT SELECT b)`
    Intersect,
}

/// How locked rows are identified in `FOR UPDATE OF ..`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowLockStrategy {
    None,
    Table,
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderStyle {
    /// `?`
    Question,
    /// `$1`
    Dollar,
    /// `@p1`
    AtP,
    /// `:1`
    Colon,
}

impl PlaceholderStyle {
    /// Render the placeholder for a 1-based position.
    pub fn render(self, index: usize) -> String {
        match self {
            Self::Question => "?".to_string(),
            Self::Dollar => format!("${}", index),
            Self::AtP => format!("@p{}", index),
            Self::Colon => format!(":{}", index),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BooleanLiteralStyle {
    Keywords,
    Numeric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalLiteralStyle {
    /// `DATE '2024-01-31'`
    Ansi,
    /// `{d '2024-01-31'}`
    Jdbc,
    /// `'2024-01-31'`
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcatStyle {
    /// `a || b`
    Operator,
    /// `a + b`
    Plus,
    /// `concat(a, b)`
    Function,
}

/// Where the database sorts NULLs when no precedence is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullOrdering {
    Smallest,
    Greatest,
    First,
    Last,
}

/// Type names used in CAST targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeNames {
    pub boolean: String,
    pub integer: String,
    pub bigint: String,
    pub double: String,
    pub numeric: String,
    pub varchar: String,
    pub date: String,
    pub time: String,
    pub timestamp: String,
    pub uuid: String,
    pub binary: String,
}

impl Default for TypeNames {
    fn default() -> Self {
        Self {
            boolean: "boolean".into(),
            integer: "integer".into(),
            bigint: "bigint".into(),
            double: "double precision".into(),
            numeric: "numeric".into(),
            varchar: "varchar(255)".into(),
            date: "date".into(),
            time: "time".into(),
            timestamp: "timestamp".into(),
            uuid: "uuid".into(),
            binary: "varbinary(255)".into(),
        }
    }
}

impl TypeNames {
    pub fn name(&self, sql_type: SqlType) -> Option<&str> {
        let name = match sql_type {
            SqlType::Boolean => &self.boolean,
            SqlType::Integer => &self.integer,
            SqlType::BigInt => &self.bigint,
            SqlType::Double => &self.double,
            SqlType::Numeric => &self.numeric,
            SqlType::Varchar => &self.varchar,
            SqlType::Date => &self.date,
            SqlType::Time => &self.time,
            SqlType::Timestamp => &self.timestamp,
            SqlType::Uuid => &self.uuid,
            SqlType::Binary => &self.binary,
            SqlType::Unknown => return None,
        };
        Some(name)
    }
}

/// Fixed facts about a target database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    pub name: String,

    // Pagination
    pub pagination: PaginationStyle,
    pub offset_rows_keyword: bool,
    pub fetch_next: bool,
    pub fetch_requires_offset: bool,
    pub offset_fetch_requires_order_by: bool,
    pub supports_fetch_with_ties: bool,
    pub supports_fetch_percent: bool,
    pub top_parentheses: bool,
    pub limit_operands: LimitOperandStyle,
    pub supports_window_functions: bool,

    // Row values
    pub row_values: bool,
    pub row_values_in_in_list: bool,
    pub row_values_in_in_subquery: bool,
    pub row_values_in_quantified_predicates: bool,
    pub row_values_in_set: bool,
    pub tuple_emulation: TupleEmulation,

    // Set operations and comparisons
    pub supports_intersect: bool,
    pub supports_union_all: bool,
    pub distinct_from: DistinctFromStyle,

    // Locking
    pub for_update: String,
    pub for_share: String,
    pub for_update_with_clause: String,
    pub nowait: String,
    pub skip_locked: String,
    pub supports_nowait: bool,
    pub supports_skip_locked: bool,
    pub supports_wait: bool,
    pub supports_outer_join_for_update: bool,
    pub write_row_lock_strategy: RowLockStrategy,
    pub read_row_lock_strategy: RowLockStrategy,
    pub table_lock_hints: bool,

    // General rendering
    pub placeholder: PlaceholderStyle,
    pub boolean_literals: BooleanLiteralStyle,
    pub temporal_literals: TemporalLiteralStyle,
    pub concat: ConcatStyle,
    pub supports_ilike: bool,
    pub supports_filter_clause: bool,
    pub supports_ordinal_select_item_reference: bool,
    pub null_ordering: NullOrdering,
    pub supports_null_precedence: bool,
    pub cast_select_nulls_and_parameters: bool,
    pub table_alias_separator: String,
    /// Appended to a `SELECT` without FROM.
    pub from_dual_for_select_only: String,
    /// Appended to emulation sub-selects that need a FROM.
    pub from_dual: String,
    pub supports_returning: bool,
    pub supports_recursive_keyword: bool,
    pub supports_cte_search_cycle: bool,
    pub supports_cte_materialization: bool,
    pub type_names: TypeNames,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            name: "ansi".into(),
            pagination: PaginationStyle::OffsetFetch,
            offset_rows_keyword: true,
            fetch_next: false,
            fetch_requires_offset: false,
            offset_fetch_requires_order_by: false,
            supports_fetch_with_ties: true,
            supports_fetch_percent: true,
            top_parentheses: true,
            limit_operands: LimitOperandStyle::Arithmetic,
            supports_window_functions: true,
            row_values: true,
            row_values_in_in_list: true,
            row_values_in_in_subquery: true,
            row_values_in_quantified_predicates: true,
            row_values_in_set: true,
            tuple_emulation: TupleEmulation::IndexOptimized,
            supports_intersect: true,
            supports_union_all: true,
            distinct_from: DistinctFromStyle::Native,
            for_update: " FOR UPDATE".into(),
            for_share: " FOR UPDATE".into(),
            for_update_with_clause: String::new(),
            nowait: " NOWAIT".into(),
            skip_locked: " SKIP LOCKED".into(),
            supports_nowait: true,
            supports_skip_locked: true,
            supports_wait: false,
            supports_outer_join_for_update: true,
            write_row_lock_strategy: RowLockStrategy::None,
            read_row_lock_strategy: RowLockStrategy::None,
            table_lock_hints: false,
            placeholder: PlaceholderStyle::Question,
            boolean_literals: BooleanLiteralStyle::Keywords,
            temporal_literals: TemporalLiteralStyle::Ansi,
            concat: ConcatStyle::Operator,
            supports_ilike: false,
            supports_filter_clause: false,
            supports_ordinal_select_item_reference: true,
            null_ordering: NullOrdering::Greatest,
            supports_null_precedence: true,
            cast_select_nulls_and_parameters: false,
            table_alias_separator: " ".into(),
            from_dual_for_select_only: String::new(),
            from_dual: " FROM (VALUES (0)) dual".into(),
            supports_returning: false,
            supports_recursive_keyword: true,
            supports_cte_search_cycle: false,
            supports_cte_materialization: false,
            type_names: TypeNames::default(),
        }
    }
}

impl Capabilities {
    /// Whether native rendering can express this fetch type.
    pub fn supports_fetch_type(&self, fetch_type: crate::ast::FetchClauseType) -> bool {
        use crate::ast::FetchClauseType::*;
        if fetch_type == RowsOnly {
            return true;
        }
        if !self.pagination.supports_extended_fetch() {
            return false;
        }
        match fetch_type {
            RowsOnly => true,
            RowsWithTies => self.supports_fetch_with_ties,
            PercentOnly => self.supports_fetch_percent,
            PercentWithTies => self.supports_fetch_with_ties && self.supports_fetch_percent,
        }
    }

    /// Parse a TOML profile: `base = "<dialect>"` plus overridden keys.
    pub fn from_toml_str(text: &str) -> TranslateResult<Self> {
        let overrides: toml::Table = toml::from_str(text)?;
        let base = match overrides.get("base") {
            Some(toml::Value::String(name)) => Dialect::from_name(name)
                .ok_or_else(|| TranslateError::Config(format!("Unknown base dialect '{}'", name)))?
                .capabilities(),
            Some(other) => {
                return Err(TranslateError::Config(format!(
                    "'base' must be a dialect name, got {}",
                    other.type_str()
                )));
            }
            None => Capabilities::default(),
        };

        let mut merged = match toml::Value::try_from(&base) {
            Ok(toml::Value::Table(table)) => table,
            Ok(_) => return Err(TranslateError::Config("Profile is not a table".into())),
            Err(e) => return Err(TranslateError::Config(e.to_string())),
        };
        for (key, value) in overrides {
            if key != "base" {
                merged.insert(key, value);
            }
        }
        Ok(toml::Value::Table(merged).try_into()?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> TranslateResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> TranslateResult<String> {
        toml::to_string_pretty(self).map_err(|e| TranslateError::Config(e.to_string()))
    }
}

/// Built-in SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    Postgres,
    MySQL,
    MariaDB,
    SQLite,
    DuckDB,
    SqlServer,
    /// SQL Server 2005: TOP only, window functions for offsets.
    SqlServer2005,
    Oracle,
    /// Oracle 11g: no OFFSET/FETCH.
    Oracle11,
    Db2,
    H2,
    SybaseAse,
    SqlAnywhere,
    Informix,
    Firebird,
    /// Plain SQL:2008 capabilities.
    Ansi,
}

const ALL_DIALECTS: [Dialect; 16] = [
    Dialect::Postgres,
    Dialect::MySQL,
    Dialect::MariaDB,
    Dialect::SQLite,
    Dialect::DuckDB,
    Dialect::SqlServer,
    Dialect::SqlServer2005,
    Dialect::Oracle,
    Dialect::Oracle11,
    Dialect::Db2,
    Dialect::H2,
    Dialect::SybaseAse,
    Dialect::SqlAnywhere,
    Dialect::Informix,
    Dialect::Firebird,
    Dialect::Ansi,
];

impl Dialect {
    pub fn capabilities(&self) -> Capabilities {
        match self {
            Dialect::Postgres => sql::postgres::capabilities(),
            Dialect::MySQL => sql::mysql::capabilities(),
            Dialect::MariaDB => sql::mariadb::capabilities(),
            Dialect::SQLite => sql::sqlite::capabilities(),
            Dialect::DuckDB => sql::duckdb::capabilities(),
            Dialect::SqlServer => sql::sqlserver::capabilities(),
            Dialect::SqlServer2005 => sql::sqlserver::legacy_capabilities(),
            Dialect::Oracle => sql::oracle::capabilities(),
            Dialect::Oracle11 => sql::oracle::legacy_capabilities(),
            Dialect::Db2 => sql::db2::capabilities(),
            Dialect::H2 => sql::h2::capabilities(),
            Dialect::SybaseAse => sql::sybase::ase_capabilities(),
            Dialect::SqlAnywhere => sql::sybase::anywhere_capabilities(),
            Dialect::Informix => sql::informix::capabilities(),
            Dialect::Firebird => sql::firebird::capabilities(),
            Dialect::Ansi => Capabilities::default(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::MySQL => "mysql",
            Dialect::MariaDB => "mariadb",
            Dialect::SQLite => "sqlite",
            Dialect::DuckDB => "duckdb",
            Dialect::SqlServer => "sqlserver",
            Dialect::SqlServer2005 => "sqlserver2005",
            Dialect::Oracle => "oracle",
            Dialect::Oracle11 => "oracle11",
            Dialect::Db2 => "db2",
            Dialect::H2 => "h2",
            Dialect::SybaseAse => "sybase",
            Dialect::SqlAnywhere => "sqlanywhere",
            Dialect::Informix => "informix",
            Dialect::Firebird => "firebird",
            Dialect::Ansi => "ansi",
        }
    }

    pub fn from_name(name: &str) -> Option<Dialect> {
        let wanted = name.trim().to_ascii_lowercase();
        let alias = match wanted.as_str() {
            "postgresql" | "pg" => "postgres",
            "mssql" => "sqlserver",
            "sybasease" | "ase" => "sybase",
            other => other,
        };
        ALL_DIALECTS.iter().copied().find(|d| d.name() == alias)
    }

    pub fn all() -> &'static [Dialect] {
        &ALL_DIALECTS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_overrides_base() {
        let caps = Capabilities::from_toml_str(
            r#"
            base = "postgres"
            name = "pg-window"
            pagination = "window_function"
            row_values = false
            "#,
        )
        .unwrap();
        assert_eq!(caps.name, "pg-window");
        assert_eq!(caps.pagination, PaginationStyle::WindowFunction);
        assert!(!caps.row_values);
        assert_eq!(caps.placeholder, PlaceholderStyle::Dollar);
    }

    #[test]
    fn test_profile_round_trip_through_toml() {
        for dialect in Dialect::all() {
            let caps = dialect.capabilities();
            let text = caps.to_toml_string().unwrap();
            assert_eq!(Capabilities::from_toml_str(&text).unwrap(), caps, "{}", dialect.name());
        }
    }

    #[test]
    fn test_unknown_base_is_config_error() {
        let err = Capabilities::from_toml_str("base = \"nosuchdb\"").unwrap_err();
        assert!(matches!(err, TranslateError::Config(_)));
    }

    #[test]
    fn test_dialect_names() {
        assert_eq!(Dialect::from_name("PostgreSQL"), Some(Dialect::Postgres));
        assert_eq!(Dialect::from_name("mssql"), Some(Dialect::SqlServer));
        assert_eq!(Dialect::from_name("oracle11"), Some(Dialect::Oracle11));
        assert_eq!(Dialect::from_name("foo"), None);
    }
}

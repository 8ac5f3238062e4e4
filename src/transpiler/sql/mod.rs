//! Built-in capability profiles, one module per database family.

pub mod db2;
pub mod duckdb;
pub mod firebird;
pub mod h2;
pub mod informix;
pub mod mariadb;
pub mod mysql;
pub mod oracle;
pub mod postgres;
pub mod sqlite;
pub mod sqlserver;
pub mod sybase;

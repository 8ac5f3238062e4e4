//! Literal formatting.

use super::dialect::{BooleanLiteralStyle, Capabilities, TemporalLiteralStyle};
use super::params::ParameterBinder;
use super::translation::Translation;
use crate::ast::{Literal, Value};
use crate::error::TranslateResult;

/// Formats values as SQL literals for one dialect.
#[derive(Debug, Clone)]
pub struct LiteralFormatter {
    booleans: BooleanLiteralStyle,
    temporals: TemporalLiteralStyle,
}

impl LiteralFormatter {
    pub fn new(caps: &Capabilities) -> Self {
        Self {
            booleans: caps.boolean_literals,
            temporals: caps.temporal_literals,
        }
    }

    /// SQL text for `value`, or `None` when it has no literal form.
    pub fn format(&self, value: &Value) -> Option<String> {
        let text = match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => match (self.booleans, b) {
                (BooleanLiteralStyle::Keywords, true) => "TRUE".to_string(),
                (BooleanLiteralStyle::Keywords, false) => "FALSE".to_string(),
                (BooleanLiteralStyle::Numeric, true) => "1".to_string(),
                (BooleanLiteralStyle::Numeric, false) => "0".to_string(),
            },
            Value::Int(n) => n.to_string(),
            Value::Float(f) if f.is_finite() => format!("{:?}", f),
            Value::Float(_) | Value::Bytes(_) => return None,
            Value::String(s) => quote(s),
            Value::Date(d) => self.temporal("DATE", "d", &d.format("%Y-%m-%d").to_string()),
            Value::Time(t) => self.temporal("TIME", "t", &t.format("%H:%M:%S").to_string()),
            Value::Timestamp(ts) => self.temporal(
                "TIMESTAMP",
                "ts",
                &ts.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
            ),
            Value::Uuid(u) => quote(&u.to_string()),
        };
        Some(text)
    }

    fn temporal(&self, keyword: &str, escape: &str, text: &str) -> String {
        match self.temporals {
            TemporalLiteralStyle::Ansi => format!("{} '{}'", keyword, text),
            TemporalLiteralStyle::Jdbc => format!("{{{} '{}'}}", escape, text),
            TemporalLiteralStyle::Plain => format!("'{}'", text),
        }
    }
}

/// Single-quote a string, doubling embedded quotes.
pub fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

impl<'a> Translation<'a> {
    pub(crate) fn visit_literal(&mut self, literal: &'a Literal) -> TranslateResult<()> {
        self.render_value(&literal.value);
        Ok(())
    }

    /// Emit `value` as a literal, or as a bound placeholder when it has no SQL form.
    pub(crate) fn render_value(&mut self, value: &Value) {
        match self.literal_formatter().format(value) {
            Some(text) => self.append_sql(&text),
            None => {
                tracing::trace!(?value, "binding literal without SQL form");
                self.append_placeholder(ParameterBinder::Literal(value.clone()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transpiler::Dialect;
    use chrono::NaiveDate;

    #[test]
    fn test_literal_styles() {
        let pg = LiteralFormatter::new(&Dialect::Postgres.capabilities());
        let mssql = LiteralFormatter::new(&Dialect::SqlServer.capabilities());
        let date = Value::Date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());

        assert_eq!(pg.format(&Value::Bool(true)).unwrap(), "TRUE");
        assert_eq!(mssql.format(&Value::Bool(true)).unwrap(), "1");
        assert_eq!(pg.format(&date).unwrap(), "DATE '2024-01-31'");
        assert_eq!(mssql.format(&date).unwrap(), "{d '2024-01-31'}");
        assert_eq!(pg.format(&Value::String("O'Hara".into())).unwrap(), "'O''Hara'");
        assert_eq!(pg.format(&Value::Float(1.0)).unwrap(), "1.0");
    }

    #[test]
    fn test_values_without_literal_form() {
        let pg = LiteralFormatter::new(&Dialect::Postgres.capabilities());
        assert!(pg.format(&Value::Bytes(vec![1])).is_none());
        assert!(pg.format(&Value::Float(f64::NAN)).is_none());
    }
}

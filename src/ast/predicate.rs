use crate::ast::{ComparisonOperator, Expression, Nature, QueryPart, SelfRendering, SqlType, Value};
use serde::{Deserialize, Serialize};

/// A value bound to a pre-rendered filter fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterParameter {
    pub value: Value,
    #[serde(default)]
    pub sql_type: SqlType,
}

/// Opaque SQL fragment with `?` markers for its own parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterPredicate {
    pub fragment: String,
    #[serde(default)]
    pub parameters: Vec<FilterParameter>,
}

fn case_sensitive_default() -> bool {
    true
}

/// A boolean-valued node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Comparison {
        lhs: Expression,
        op: ComparisonOperator,
        rhs: Expression,
    },
    Between {
        expr: Expression,
        lower: Expression,
        upper: Expression,
        #[serde(default)]
        negated: bool,
    },
    Like {
        expr: Expression,
        pattern: Expression,
        #[serde(default)]
        escape: Option<Expression>,
        #[serde(default)]
        negated: bool,
        #[serde(default = "case_sensitive_default")]
        case_sensitive: bool,
    },
    InList {
        test: Expression,
        list: Vec<Expression>,
        #[serde(default)]
        negated: bool,
    },
    InSubQuery {
        test: Expression,
        query: Box<QueryPart>,
        #[serde(default)]
        negated: bool,
    },
    Exists {
        query: Box<QueryPart>,
        #[serde(default)]
        negated: bool,
    },
    Nullness {
        expr: Expression,
        #[serde(default)]
        negated: bool,
    },
    Negated(Box<Predicate>),
    Junction {
        nature: Nature,
        predicates: Vec<Predicate>,
    },
    Grouped(Box<Predicate>),
    Filter(FilterPredicate),
    #[serde(skip)]
    SelfRendering(SelfRendering),
}

impl Predicate {
    /// True when rendering would produce no text.
    pub fn is_empty(&self) -> bool {
        match self {
            Predicate::Junction { predicates, .. } => predicates.iter().all(Predicate::is_empty),
            Predicate::Grouped(inner) | Predicate::Negated(inner) => inner.is_empty(),
            _ => false,
        }
    }

    pub fn and(predicates: Vec<Predicate>) -> Self {
        Predicate::Junction {
            nature: Nature::And,
            predicates,
        }
    }

    pub fn or(predicates: Vec<Predicate>) -> Self {
        Predicate::Junction {
            nature: Nature::Or,
            predicates,
        }
    }

    /// Walk expressions of this predicate, not descending into sub-queries.
    pub fn any_expression(&self, check: &mut impl FnMut(&Expression) -> bool) -> bool {
        match self {
            Predicate::Comparison { lhs, rhs, .. } => lhs.any_node(check) || rhs.any_node(check),
            Predicate::Between {
                expr, lower, upper, ..
            } => expr.any_node(check) || lower.any_node(check) || upper.any_node(check),
            Predicate::Like { expr, pattern, .. } => {
                expr.any_node(check) || pattern.any_node(check)
            }
            Predicate::InList { test, list, .. } => {
                test.any_node(check) || list.iter().any(|e| e.any_node(check))
            }
            Predicate::InSubQuery { test, .. } => test.any_node(check),
            Predicate::Nullness { expr, .. } => expr.any_node(check),
            Predicate::Negated(inner) | Predicate::Grouped(inner) => inner.any_expression(check),
            Predicate::Junction { predicates, .. } => {
                predicates.iter().any(|p| p.any_expression(check))
            }
            Predicate::Exists { .. } | Predicate::Filter(_) | Predicate::SelfRendering(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_junctions() {
        let empty = Predicate::and(vec![Predicate::or(vec![])]);
        assert!(empty.is_empty());
        assert!(Predicate::Grouped(Box::new(empty)).is_empty());

        let filter = Predicate::Filter(FilterPredicate {
            fragment: "1=1".into(),
            parameters: vec![],
        });
        assert!(!Predicate::and(vec![filter]).is_empty());
    }
}

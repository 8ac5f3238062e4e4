use crate::transpiler::dialect::*;

/// Sybase ASE: `TOP n` with literals only, no window functions.
pub fn ase_capabilities() -> Capabilities {
    Capabilities {
        name: "sybase".into(),
        pagination: PaginationStyle::Top,
        top_parentheses: false,
        supports_fetch_with_ties: false,
        supports_fetch_percent: false,
        limit_operands: LimitOperandStyle::Literal,
        supports_window_functions: false,
        row_values: false,
        row_values_in_in_list: false,
        row_values_in_in_subquery: false,
        row_values_in_quantified_predicates: false,
        row_values_in_set: false,
        supports_intersect: false,
        distinct_from: DistinctFromStyle::Intersect,
        supports_nowait: false,
        supports_skip_locked: false,
        boolean_literals: BooleanLiteralStyle::Numeric,
        temporal_literals: TemporalLiteralStyle::Plain,
        concat: ConcatStyle::Plus,
        null_ordering: NullOrdering::Smallest,
        supports_null_precedence: false,
        from_dual: String::new(),
        supports_recursive_keyword: false,
        ..Capabilities::default()
    }
}

/// SAP SQL Anywhere: `TOP n START AT m`.
pub fn anywhere_capabilities() -> Capabilities {
    Capabilities {
        name: "sqlanywhere".into(),
        pagination: PaginationStyle::TopStartAt,
        top_parentheses: false,
        supports_fetch_with_ties: false,
        supports_fetch_percent: false,
        limit_operands: LimitOperandStyle::Arithmetic,
        supports_window_functions: true,
        supports_intersect: true,
        ..ase_capabilities()
    }
}

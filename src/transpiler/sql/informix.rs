use crate::transpiler::dialect::*;

pub fn capabilities() -> Capabilities {
    Capabilities {
        name: "informix".into(),
        pagination: PaginationStyle::SkipFirst,
        supports_fetch_with_ties: false,
        supports_fetch_percent: false,
        limit_operands: LimitOperandStyle::Literal,
        supports_window_functions: false,
        row_values: false,
        row_values_in_in_list: false,
        row_values_in_in_subquery: false,
        row_values_in_quantified_predicates: false,
        row_values_in_set: true,
        supports_intersect: true,
        distinct_from: DistinctFromStyle::Intersect,
        supports_nowait: false,
        supports_skip_locked: false,
        boolean_literals: BooleanLiteralStyle::Keywords,
        temporal_literals: TemporalLiteralStyle::Plain,
        from_dual_for_select_only: " FROM (SELECT 0 FROM systables WHERE tabid = 1) dual".into(),
        from_dual: " FROM (SELECT 0 FROM systables WHERE tabid = 1) dual".into(),
        supports_recursive_keyword: false,
        ..Capabilities::default()
    }
}

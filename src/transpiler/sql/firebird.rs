use crate::transpiler::dialect::*;

pub fn capabilities() -> Capabilities {
    Capabilities {
        name: "firebird".into(),
        pagination: PaginationStyle::RowsTo,
        supports_fetch_with_ties: false,
        supports_fetch_percent: false,
        // ROWS takes values, not expressions
        limit_operands: LimitOperandStyle::SingleParameter,
        row_values: false,
        row_values_in_in_list: false,
        row_values_in_in_subquery: false,
        row_values_in_quantified_predicates: false,
        row_values_in_set: false,
        for_update_with_clause: " WITH LOCK".into(),
        supports_nowait: false,
        write_row_lock_strategy: RowLockStrategy::Table,
        from_dual_for_select_only: " FROM rdb$database".into(),
        from_dual: " FROM rdb$database".into(),
        supports_returning: true,
        null_ordering: NullOrdering::Smallest,
        ..Capabilities::default()
    }
}

use crate::transpiler::dialect::*;

pub fn capabilities() -> Capabilities {
    Capabilities {
        name: "postgres".into(),
        // LIMIT/OFFSET keeps the plan cache friendly; WITH TIES goes through row numbering
        pagination: PaginationStyle::LimitOffset,
        supports_fetch_with_ties: false,
        supports_fetch_percent: false,
        placeholder: PlaceholderStyle::Dollar,
        supports_ilike: true,
        supports_filter_clause: true,
        for_share: " FOR SHARE".into(),
        supports_outer_join_for_update: false,
        write_row_lock_strategy: RowLockStrategy::Table,
        read_row_lock_strategy: RowLockStrategy::Table,
        from_dual: String::new(),
        supports_returning: true,
        supports_cte_search_cycle: true,
        supports_cte_materialization: true,
        type_names: TypeNames {
            binary: "bytea".into(),
            ..TypeNames::default()
        },
        ..Capabilities::default()
    }
}

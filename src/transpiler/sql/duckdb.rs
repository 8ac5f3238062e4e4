use crate::transpiler::dialect::*;

pub fn capabilities() -> Capabilities {
    Capabilities {
        name: "duckdb".into(),
        pagination: PaginationStyle::LimitOffset,
        supports_fetch_with_ties: false,
        supports_fetch_percent: false,
        placeholder: PlaceholderStyle::Dollar,
        supports_ilike: true,
        supports_filter_clause: true,
        for_update: String::new(),
        for_share: String::new(),
        supports_nowait: false,
        supports_skip_locked: false,
        null_ordering: NullOrdering::Last,
        from_dual: String::new(),
        supports_returning: true,
        supports_cte_materialization: true,
        ..Capabilities::default()
    }
}

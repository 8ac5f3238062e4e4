use crate::transpiler::dialect::*;

pub fn capabilities() -> Capabilities {
    Capabilities {
        name: "h2".into(),
        pagination: PaginationStyle::OffsetFetch,
        supports_fetch_percent: true,
        supports_fetch_with_ties: true,
        supports_ilike: true,
        supports_filter_clause: true,
        supports_skip_locked: false,
        write_row_lock_strategy: RowLockStrategy::None,
        null_ordering: NullOrdering::Smallest,
        cast_select_nulls_and_parameters: true,
        ..Capabilities::default()
    }
}

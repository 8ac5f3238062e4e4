use crate::transpiler::dialect::*;

pub fn capabilities() -> Capabilities {
    Capabilities {
        name: "mysql".into(),
        pagination: PaginationStyle::CombinedLimit,
        supports_fetch_with_ties: false,
        supports_fetch_percent: false,
        supports_intersect: false,
        distinct_from: DistinctFromStyle::NullSafeEquals,
        for_share: " FOR SHARE".into(),
        write_row_lock_strategy: RowLockStrategy::Table,
        read_row_lock_strategy: RowLockStrategy::Table,
        concat: ConcatStyle::Function,
        null_ordering: NullOrdering::Smallest,
        supports_null_precedence: false,
        from_dual: " FROM dual".into(),
        supports_cte_search_cycle: false,
        type_names: TypeNames {
            integer: "signed".into(),
            bigint: "signed".into(),
            double: "double".into(),
            numeric: "decimal".into(),
            varchar: "char".into(),
            timestamp: "datetime".into(),
            uuid: "char(36)".into(),
            binary: "binary".into(),
            ..TypeNames::default()
        },
        ..Capabilities::default()
    }
}

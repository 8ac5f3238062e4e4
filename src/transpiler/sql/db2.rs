use crate::transpiler::dialect::*;

pub fn capabilities() -> Capabilities {
    Capabilities {
        name: "db2".into(),
        pagination: PaginationStyle::OffsetFetch,
        supports_fetch_with_ties: false,
        supports_fetch_percent: false,
        row_values_in_quantified_predicates: false,
        for_update_with_clause: " WITH RS".into(),
        supports_nowait: false,
        skip_locked: " SKIP LOCKED DATA".into(),
        cast_select_nulls_and_parameters: true,
        from_dual_for_select_only: " FROM sysibm.dual".into(),
        from_dual: " FROM sysibm.dual".into(),
        supports_recursive_keyword: false,
        type_names: TypeNames {
            double: "double".into(),
            numeric: "decimal(31,0)".into(),
            uuid: "char(16) for bit data".into(),
            binary: "varchar(255) for bit data".into(),
            ..TypeNames::default()
        },
        ..Capabilities::default()
    }
}

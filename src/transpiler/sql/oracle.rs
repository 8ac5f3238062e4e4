use crate::transpiler::dialect::*;

/// Oracle 12c and later.
pub fn capabilities() -> Capabilities {
    Capabilities {
        name: "oracle".into(),
        pagination: PaginationStyle::OffsetFetch,
        // Row values only inside IN and UPDATE SET
        row_values: false,
        row_values_in_in_list: true,
        row_values_in_in_subquery: true,
        row_values_in_quantified_predicates: false,
        row_values_in_set: true,
        distinct_from: DistinctFromStyle::Decode,
        supports_wait: true,
        supports_outer_join_for_update: false,
        write_row_lock_strategy: RowLockStrategy::Column,
        read_row_lock_strategy: RowLockStrategy::Column,
        placeholder: PlaceholderStyle::Colon,
        boolean_literals: BooleanLiteralStyle::Numeric,
        supports_ordinal_select_item_reference: true,
        from_dual_for_select_only: " FROM dual".into(),
        from_dual: " FROM dual".into(),
        supports_recursive_keyword: false,
        supports_cte_search_cycle: true,
        type_names: TypeNames {
            boolean: "number(1,0)".into(),
            integer: "number(10,0)".into(),
            bigint: "number(19,0)".into(),
            double: "binary_double".into(),
            numeric: "number".into(),
            varchar: "varchar2(255 char)".into(),
            time: "date".into(),
            uuid: "raw(16)".into(),
            binary: "raw(255)".into(),
            ..TypeNames::default()
        },
        ..Capabilities::default()
    }
}

/// Oracle 11g: ROWNUM era, pagination through row numbering.
pub fn legacy_capabilities() -> Capabilities {
    Capabilities {
        name: "oracle11".into(),
        pagination: PaginationStyle::WindowFunction,
        supports_cte_search_cycle: false,
        ..capabilities()
    }
}

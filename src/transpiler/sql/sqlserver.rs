use crate::transpiler::dialect::*;

/// SQL Server 2012 and later.
pub fn capabilities() -> Capabilities {
    Capabilities {
        name: "sqlserver".into(),
        pagination: PaginationStyle::OffsetFetch,
        fetch_next: true,
        fetch_requires_offset: true,
        offset_fetch_requires_order_by: true,
        supports_fetch_with_ties: false,
        supports_fetch_percent: false,
        row_values: false,
        row_values_in_in_list: false,
        row_values_in_in_subquery: false,
        row_values_in_quantified_predicates: false,
        row_values_in_set: false,
        distinct_from: DistinctFromStyle::Intersect,
        for_update: String::new(),
        for_share: String::new(),
        table_lock_hints: true,
        placeholder: PlaceholderStyle::AtP,
        boolean_literals: BooleanLiteralStyle::Numeric,
        temporal_literals: TemporalLiteralStyle::Jdbc,
        concat: ConcatStyle::Plus,
        null_ordering: NullOrdering::Smallest,
        supports_null_precedence: false,
        from_dual: String::new(),
        supports_recursive_keyword: false,
        type_names: TypeNames {
            boolean: "bit".into(),
            double: "float".into(),
            timestamp: "datetime2".into(),
            uuid: "uniqueidentifier".into(),
            ..TypeNames::default()
        },
        ..Capabilities::default()
    }
}

/// SQL Server 2005/2008: TOP only, row numbering for offsets.
pub fn legacy_capabilities() -> Capabilities {
    Capabilities {
        name: "sqlserver2005".into(),
        pagination: PaginationStyle::Top,
        fetch_next: false,
        fetch_requires_offset: false,
        offset_fetch_requires_order_by: false,
        supports_fetch_with_ties: true,
        supports_fetch_percent: true,
        ..capabilities()
    }
}

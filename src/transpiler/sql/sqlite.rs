use crate::transpiler::dialect::*;

pub fn capabilities() -> Capabilities {
    Capabilities {
        name: "sqlite".into(),
        pagination: PaginationStyle::LimitOffset,
        supports_fetch_with_ties: false,
        supports_fetch_percent: false,
        row_values_in_quantified_predicates: false,
        boolean_literals: BooleanLiteralStyle::Numeric,
        temporal_literals: TemporalLiteralStyle::Plain,
        // No row locks at all
        for_update: String::new(),
        for_share: String::new(),
        supports_nowait: false,
        supports_skip_locked: false,
        null_ordering: NullOrdering::Smallest,
        from_dual: String::new(),
        supports_returning: true,
        ..Capabilities::default()
    }
}

use crate::transpiler::dialect::*;

/// MariaDB diverges from MySQL on LIMIT syntax, INTERSECT, WAIT and RETURNING.
pub fn capabilities() -> Capabilities {
    Capabilities {
        name: "mariadb".into(),
        pagination: PaginationStyle::LimitOffset,
        supports_intersect: true,
        supports_wait: true,
        for_share: " LOCK IN SHARE MODE".into(),
        write_row_lock_strategy: RowLockStrategy::None,
        read_row_lock_strategy: RowLockStrategy::None,
        supports_returning: true,
        ..super::mysql::capabilities()
    }
}

//! FROM clause nodes: table groups, references and joins.

use crate::ast::{JoinType, Predicate, QueryPart};
use serde::{Deserialize, Serialize};

/// A single rendered table source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableReference {
    Named {
        table: String,
        #[serde(default)]
        alias: Option<String>,
    },
    Derived {
        query: Box<QueryPart>,
        alias: String,
    },
}

impl TableReference {
    pub fn named(table: impl Into<String>, alias: Option<&str>) -> Self {
        TableReference::Named {
            table: table.into(),
            alias: alias.map(str::to_string),
        }
    }

    pub fn alias(&self) -> Option<&str> {
        match self {
            TableReference::Named { alias, .. } => alias.as_deref(),
            TableReference::Derived { alias, .. } => Some(alias),
        }
    }
}

/// Same-level join rendered inline after the primary reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableReferenceJoin {
    #[serde(default)]
    pub join_type: JoinType,
    pub reference: TableReference,
    #[serde(default)]
    pub predicate: Option<Predicate>,
}

/// Nested group join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableGroupJoin {
    #[serde(default)]
    pub join_type: JoinType,
    pub group: TableGroup,
    #[serde(default)]
    pub predicate: Option<Predicate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardTableGroup {
    #[serde(default)]
    pub source_alias: Option<String>,
    pub primary: TableReference,
    #[serde(default)]
    pub reference_joins: Vec<TableReferenceJoin>,
    #[serde(default)]
    pub group_joins: Vec<TableGroupJoin>,
    /// Backed by a mapped entity rather than a synthetic join target.
    #[serde(default)]
    pub real: bool,
    /// Extra table names touched through this group.
    #[serde(default)]
    pub query_spaces: Vec<String>,
    /// Key columns used for column-level row locking.
    #[serde(default)]
    pub key_columns: Vec<String>,
}

impl StandardTableGroup {
    pub fn new(primary: TableReference) -> Self {
        Self {
            source_alias: primary.alias().map(str::to_string),
            primary,
            reference_joins: Vec::new(),
            group_joins: Vec::new(),
            real: true,
            query_spaces: Vec::new(),
            key_columns: Vec::new(),
        }
    }
}

/// Aliasing wrapper; only its joins are rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualTableGroup {
    #[serde(default)]
    pub source_alias: Option<String>,
    #[serde(default)]
    pub group_joins: Vec<TableGroupJoin>,
}

/// Group that is rendered only once something resolved it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LazyTableGroup {
    #[serde(default)]
    pub source_alias: Option<String>,
    #[serde(default)]
    pub resolved: Option<Box<StandardTableGroup>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableGroup {
    Standard(StandardTableGroup),
    Virtual(VirtualTableGroup),
    Lazy(LazyTableGroup),
}

impl TableGroup {
    pub fn source_alias(&self) -> Option<&str> {
        match self {
            TableGroup::Standard(g) => g.source_alias.as_deref(),
            TableGroup::Virtual(g) => g.source_alias.as_deref(),
            TableGroup::Lazy(g) => g.source_alias.as_deref(),
        }
    }

    /// The group that actually renders, if any.
    pub fn realized(&self) -> Option<&StandardTableGroup> {
        match self {
            TableGroup::Standard(g) => Some(g),
            TableGroup::Virtual(_) => None,
            TableGroup::Lazy(g) => g.resolved.as_deref(),
        }
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self, TableGroup::Virtual(_))
    }

    /// Nested group joins, unwrapping lazy groups.
    pub fn group_joins(&self) -> &[TableGroupJoin] {
        match self {
            TableGroup::Standard(g) => &g.group_joins,
            TableGroup::Virtual(g) => &g.group_joins,
            TableGroup::Lazy(g) => g.resolved.as_deref().map_or(&[], |r| &r.group_joins),
        }
    }

    /// Visit this group and every group joined beneath it.
    pub fn visit_groups<'g>(&'g self, visitor: &mut impl FnMut(&'g TableGroup)) {
        visitor(self);
        for join in self.group_joins() {
            join.group.visit_groups(visitor);
        }
    }
}

impl From<StandardTableGroup> for TableGroup {
    fn from(group: StandardTableGroup) -> Self {
        TableGroup::Standard(group)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FromClause {
    pub roots: Vec<TableGroup>,
}

impl FromClause {
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn visit_groups<'g>(&'g self, visitor: &mut impl FnMut(&'g TableGroup)) {
        for root in &self.roots {
            root.visit_groups(visitor);
        }
    }

    /// Join types of every reference and group join in the clause.
    pub fn any_table_join(&self, check: &mut impl FnMut(JoinType, &TableGroup) -> bool) -> bool {
        let mut found = false;
        self.visit_groups(&mut |group| {
            if found {
                return;
            }
            if let Some(real) = group.realized() {
                found = real.reference_joins.iter().any(|j| check(j.join_type, group));
            }
            if !found {
                found = group
                    .group_joins()
                    .iter()
                    .any(|j| check(j.join_type, &j.group));
            }
        });
        found
    }
}

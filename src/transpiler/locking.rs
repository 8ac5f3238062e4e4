//! Pessimistic lock resolution: trailing `FOR UPDATE` clauses, table hints
//! and the fallback to follow-on locking.

use super::buffer::Clause;
use super::dialect::RowLockStrategy;
use super::translation::Translation;
use crate::ast::{
    FromClause, JoinType, LockMode, LockOptions, LockTimeout, QueryPart, QuerySpec,
    StandardTableGroup,
};
use crate::error::{TranslateError, TranslateResult};
use serde::Serialize;

/// How the requested locks are acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LockStrategy {
    /// Locked by a clause or table hints in the statement itself.
    Clause,
    /// Locked by the caller after the statement ran.
    FollowOn,
    #[default]
    None,
}

/// Lock accumulator of one query spec.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForUpdateClause {
    pub lock_mode: LockMode,
    pub timeout: LockTimeout,
    /// Aliases of the locked table references.
    pub aliases: Vec<String>,
    /// Items of the `OF` list.
    pub targets: Vec<String>,
}

impl ForUpdateClause {
    pub fn add_alias(&mut self, alias: &str) {
        if !self.aliases.iter().any(|a| a == alias) {
            self.aliases.push(alias.to_string());
        }
    }

    /// Fold the requested options in; `known` lists aliases present in the query.
    pub fn merge(&mut self, options: &LockOptions, known: &[&str]) {
        let requested = if options.has_alias_specific_lock_modes() {
            let mut strongest = LockMode::None;
            for (alias, mode) in &options.alias_specific {
                if !mode.exceeds_read() || !known.contains(&alias.as_str()) {
                    continue;
                }
                self.add_alias(alias);
                if mode.greater_than(strongest) {
                    strongest = *mode;
                }
            }
            strongest
        } else {
            options.lock_mode
        };
        if requested.greater_than(self.lock_mode) {
            self.lock_mode = requested;
        }
        self.timeout = options.timeout;
    }

    /// Build the `OF` list for the row lock strategy in effect.
    pub fn apply_aliases(
        &mut self,
        strategy: RowLockStrategy,
        from: &FromClause,
    ) -> TranslateResult<()> {
        self.targets.clear();
        match strategy {
            RowLockStrategy::None => {}
            RowLockStrategy::Table => self.targets = self.aliases.clone(),
            RowLockStrategy::Column => {
                let mut groups: Vec<&StandardTableGroup> = Vec::new();
                from.visit_groups(&mut |group| groups.extend(group.realized()));
                for alias in &self.aliases {
                    let Some(group) = groups.iter().find(|g| owns_alias(g, alias)) else {
                        continue;
                    };
                    if group.key_columns.is_empty() {
                        return Err(TranslateError::malformed(format!(
                            "Column-level locking of '{}' needs key columns",
                            alias
                        )));
                    }
                    for column in &group.key_columns {
                        self.targets.push(format!("{}.{}", alias, column));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Resolved lock clause pieces for one lock mode.
#[derive(Debug, Clone, Copy)]
struct LockClauseForm<'c> {
    text: &'c str,
    strategy: RowLockStrategy,
    timeout: LockTimeout,
}

fn owns_alias(group: &StandardTableGroup, alias: &str) -> bool {
    group.source_alias.as_deref() == Some(alias) || group.primary.alias() == Some(alias)
}

/// Aliases introduced by the FROM clause.
fn known_aliases(from: &FromClause) -> Vec<&str> {
    let mut aliases = Vec::new();
    from.visit_groups(&mut |group| {
        aliases.extend(group.source_alias());
        if let Some(real) = group.realized() {
            aliases.extend(real.primary.alias());
            aliases.extend(real.reference_joins.iter().filter_map(|j| j.reference.alias()));
        }
    });
    aliases
}

impl<'a> Translation<'a> {
    /// Lock mode applying to a table group with `source_alias` in the current part.
    pub(crate) fn effective_lock_mode(&self, source_alias: Option<&str>) -> Option<LockMode> {
        let options = self.lock_options.as_ref()?;
        if options.follow_on_locking == Some(true) {
            return None;
        }
        source_alias
            .and_then(|alias| options.alias_lock_mode(alias))
            .or_else(|| {
                self.current_part()
                    .is_some_and(QueryPart::is_root)
                    .then_some(options.lock_mode)
            })
    }

    /// Lock a rendered table reference by hint or by adding it to the accumulator.
    pub(crate) fn lock_table_reference(&mut self, alias: &str, mode: LockMode) {
        if !mode.exceeds_read() {
            return;
        }
        if self.caps.table_lock_hints {
            self.render_table_lock_hint(mode);
        } else {
            self.for_update.get_or_insert_with(Default::default).add_alias(alias);
        }
    }

    fn render_table_lock_hint(&mut self, mode: LockMode) {
        let lock = match mode {
            LockMode::PessimisticRead => "HOLDLOCK",
            LockMode::Write
            | LockMode::UpgradeNoWait
            | LockMode::UpgradeSkipLocked
            | LockMode::PessimisticWrite
            | LockMode::PessimisticForceIncrement => "UPDLOCK",
            _ => return,
        };
        let timeout = self
            .lock_options
            .as_ref()
            .map(|o| o.timeout)
            .unwrap_or_default();
        self.append_sql(" WITH (");
        self.append_sql(lock);
        self.append_sql(", ROWLOCK");
        if mode == LockMode::UpgradeNoWait || timeout == LockTimeout::NoWait {
            self.append_sql(", NOWAIT");
        } else if mode == LockMode::UpgradeSkipLocked || timeout == LockTimeout::SkipLocked {
            self.append_sql(", READPAST");
        }
        self.push(')');
        if self.current_part().is_some_and(QueryPart::is_root) {
            self.lock_strategy = LockStrategy::Clause;
        }
    }

    /// Resolve and render the lock clause at the end of a query spec.
    pub(crate) fn visit_for_update(
        &mut self,
        part: &'a QueryPart,
        spec: &'a QuerySpec,
    ) -> TranslateResult<()> {
        if part.is_root() {
            self.visit_root_for_update(spec)
        } else {
            self.visit_subquery_for_update(spec)
        }
    }

    fn visit_root_for_update(&mut self, spec: &'a QuerySpec) -> TranslateResult<()> {
        let Some(options) = self.lock_options.clone() else {
            return Ok(());
        };
        if options.is_empty() || self.caps.table_lock_hints {
            return Ok(());
        }
        if options.follow_on_locking == Some(true) {
            tracing::trace!("follow-on locking requested");
            self.lock_options = None;
            self.lock_strategy = LockStrategy::FollowOn;
            return Ok(());
        }

        let mut clause = self.for_update.take().unwrap_or_default();
        clause.merge(&options, &known_aliases(&spec.from));
        if !clause.lock_mode.exceeds_read() {
            return Ok(());
        }
        self.lock_strategy = self.determine_lock_strategy(spec, &clause, options.follow_on_locking)?;
        if self.lock_strategy != LockStrategy::Clause {
            if self.lock_strategy == LockStrategy::FollowOn {
                self.lock_options = None;
            }
            return Ok(());
        }
        match self.lock_clause_form(clause.lock_mode, clause.timeout) {
            None => {
                self.lock_strategy = LockStrategy::None;
                Ok(())
            }
            Some(form) if form.text.is_empty() => {
                if options.follow_on_locking == Some(false) {
                    return Err(TranslateError::LockingNotSupported {
                        clause: "FOR UPDATE",
                    });
                }
                tracing::trace!(
                    dialect = %self.caps.name,
                    "no lock clause, falling back to follow-on locking"
                );
                self.lock_strategy = LockStrategy::FollowOn;
                self.lock_options = None;
                Ok(())
            }
            Some(form) => self.render_for_update_clause(spec, &mut clause, form),
        }
    }

    fn visit_subquery_for_update(&mut self, spec: &'a QuerySpec) -> TranslateResult<()> {
        let Some(mut clause) = self.for_update.take() else {
            return Ok(());
        };
        let Some(options) = self.lock_options.as_ref() else {
            return Ok(());
        };
        clause.merge(options, &known_aliases(&spec.from));
        if !clause.lock_mode.exceeds_read() {
            return Ok(());
        }
        if self.determine_lock_strategy(spec, &clause, None)? != LockStrategy::Clause {
            return Err(TranslateError::unsupported(
                "Follow-on locking for subqueries is not supported",
            ));
        }
        let Some(form) = self.lock_clause_form(clause.lock_mode, clause.timeout) else {
            return Ok(());
        };
        if form.text.is_empty() {
            return Err(TranslateError::unsupported(format!(
                "{} cannot lock rows of a subquery",
                self.caps.name
            )));
        }
        self.render_for_update_clause(spec, &mut clause, form)
    }

    /// Clause text, `OF` strategy and timeout for a pessimistic mode; `None` when
    /// the mode needs no row lock.
    fn lock_clause_form(&self, mode: LockMode, timeout: LockTimeout) -> Option<LockClauseForm<'a>> {
        let caps = self.caps;
        let (text, strategy, timeout) = match mode {
            LockMode::PessimisticWrite => (&caps.for_update, caps.write_row_lock_strategy, timeout),
            LockMode::PessimisticRead => (&caps.for_share, caps.read_row_lock_strategy, timeout),
            LockMode::UpgradeNoWait | LockMode::PessimisticForceIncrement => {
                (&caps.for_update, caps.write_row_lock_strategy, LockTimeout::NoWait)
            }
            LockMode::UpgradeSkipLocked => {
                (&caps.for_update, caps.write_row_lock_strategy, LockTimeout::SkipLocked)
            }
            _ => return None,
        };
        Some(LockClauseForm {
            text,
            strategy,
            timeout,
        })
    }

    /// `Clause` unless a construct rules out `FOR UPDATE` on this query.
    fn determine_lock_strategy(
        &self,
        spec: &QuerySpec,
        clause: &ForUpdateClause,
        follow_on_locking: Option<bool>,
    ) -> TranslateResult<LockStrategy> {
        let outer_joined = !self.caps.supports_outer_join_for_update
            && spec.from.any_table_join(&mut |join_type, group| {
                !matches!(join_type, JoinType::Inner | JoinType::Cross)
                    && !group.is_virtual()
                    && (clause.aliases.is_empty()
                        || group
                            .realized()
                            .is_some_and(|g| clause.aliases.iter().any(|a| owns_alias(g, a))))
            });
        let disqualifiers = [
            ("GROUP BY", spec.has_group_by()),
            ("HAVING", spec.has_having()),
            ("DISTINCT", spec.select.distinct),
            ("OUTER joins", outer_joined),
            ("aggregate functions", spec.has_aggregate_functions()),
        ];
        for (clause_name, present) in disqualifiers {
            if !present {
                continue;
            }
            if follow_on_locking == Some(false) {
                return Err(TranslateError::LockingNotSupported {
                    clause: clause_name,
                });
            }
            tracing::trace!(clause = clause_name, "falling back to follow-on locking");
            return Ok(LockStrategy::FollowOn);
        }
        Ok(LockStrategy::Clause)
    }

    fn render_for_update_clause(
        &mut self,
        spec: &'a QuerySpec,
        clause: &mut ForUpdateClause,
        form: LockClauseForm<'a>,
    ) -> TranslateResult<()> {
        let caps = self.caps;
        let LockClauseForm {
            text,
            strategy,
            timeout,
        } = form;
        clause.apply_aliases(strategy, &spec.from)?;

        self.in_clause(Clause::ForUpdate, |t| {
            t.append_sql(text);
            if !clause.targets.is_empty() {
                t.append_sql(" OF ");
                t.append_sql(&clause.targets.join(", "));
            }
            t.append_sql(&caps.for_update_with_clause);
            match timeout {
                LockTimeout::WaitForever => {}
                LockTimeout::NoWait if caps.supports_nowait => t.append_sql(&caps.nowait),
                LockTimeout::SkipLocked if caps.supports_skip_locked => {
                    t.append_sql(&caps.skip_locked)
                }
                LockTimeout::Millis(ms) if caps.supports_wait => {
                    t.append_sql(&format!(" WAIT {}", (ms + 500) / 1000));
                }
                unsupported => {
                    tracing::debug!(
                        dialect = %caps.name,
                        timeout = ?unsupported,
                        "dropping unsupported lock timeout"
                    );
                }
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_takes_strongest_alias_mode() {
        let options = LockOptions::new(LockMode::Read)
            .with_alias("a", LockMode::PessimisticRead)
            .with_alias("b", LockMode::PessimisticWrite)
            .with_alias("z", LockMode::PessimisticForceIncrement);
        let mut clause = ForUpdateClause::default();
        clause.merge(&options, &["a", "b"]);
        assert_eq!(clause.lock_mode, LockMode::PessimisticWrite);
        assert_eq!(clause.aliases, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_merge_global_mode() {
        let mut clause = ForUpdateClause::default();
        clause.add_alias("t");
        clause.add_alias("t");
        clause.merge(
            &LockOptions::new(LockMode::PessimisticWrite).with_timeout(LockTimeout::NoWait),
            &["t"],
        );
        assert_eq!(clause.lock_mode, LockMode::PessimisticWrite);
        assert_eq!(clause.timeout, LockTimeout::NoWait);
        assert_eq!(clause.aliases.len(), 1);
    }
}

use sqlx::{Postgres, QueryBuilder};

use crate::access::{
    filter::{VisitCountPredicate, VisitDatePredicate},
    ScopeFilter,
};

// ---
// Helper: traduz o filtro do motor de acesso para cláusulas SQL
// ---
/// Acrescenta `AND ...` ao builder. A query base precisa terminar em
/// `WHERE TRUE` (ou outra condição).
pub(crate) fn push_scope_filter(
    qb: &mut QueryBuilder<'_, Postgres>,
    filter: &ScopeFilter,
    owner_column: &str,
) {
    if filter.match_nothing {
        qb.push(" AND FALSE");
        return;
    }

    if let Some(zone) = &filter.zone {
        qb.push(" AND zone = ").push_bind(zone.clone());
    }
    if let Some(branch) = &filter.branch {
        qb.push(" AND branch = ").push_bind(branch.clone());
    }
    if let Some(owner) = filter.owner {
        qb.push(format!(" AND {owner_column} = ")).push_bind(owner);
    }
    if let Some(ids) = &filter.owner_in {
        qb.push(format!(" AND {owner_column} = ANY(")).push_bind(ids.clone()).push(")");
    }

    if let Some(roles) = &filter.roles {
        if roles.is_empty() {
            qb.push(" AND FALSE");
        } else {
            qb.push(" AND role IN (");
            let mut separated = qb.separated(", ");
            for role in roles {
                separated.push_bind(*role);
            }
            separated.push_unseparated(")");
        }
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }

    match &filter.next_visit {
        VisitDatePredicate::Any => {}
        VisitDatePredicate::Present => {
            qb.push(" AND next_visit_date IS NOT NULL");
        }
        VisitDatePredicate::Absent => {
            qb.push(" AND next_visit_date IS NULL");
        }
        VisitDatePredicate::Between { from, to } => {
            qb.push(" AND next_visit_date IS NOT NULL");
            if let Some(from) = from {
                qb.push(" AND next_visit_date >= ").push_bind(*from);
            }
            if let Some(to) = to {
                qb.push(" AND next_visit_date <= ").push_bind(*to);
            }
        }
    }

    match filter.visits {
        VisitCountPredicate::Any => {}
        VisitCountPredicate::Positive => {
            qb.push(" AND visits > 0");
        }
        VisitCountPredicate::Zero => {
            qb.push(" AND visits = 0");
        }
    }
}

// Escapa curingas do ILIKE para a busca por nome ser literal
pub(crate) fn like_pattern(fragment: &str) -> String {
    let escaped = fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

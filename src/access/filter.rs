// src/access/filter.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    auth::{Account, AccountListQuery, AccountStatus, Role},
    records::{FieldRecord, RecordListQuery},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("data inválida em '{field}': {value}")]
    InvalidDate { field: &'static str, value: String },
}

// Predicado sobre `nextVisitDate`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VisitDatePredicate {
    #[default]
    Any,
    Present,
    Absent,
    Between {
        from: Option<NaiveDateTime>,
        to: Option<NaiveDateTime>,
    },
}

// Predicado sobre o contador `visits`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisitCountPredicate {
    #[default]
    Any,
    Positive,
    Zero,
}

/// Descrição do filtro entregue ao store. Todas as condições são combinadas
/// com AND; `None` significa "sem restrição".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScopeFilter {
    pub match_nothing: bool,
    pub zone: Option<String>,
    pub branch: Option<String>,
    pub owner: Option<Uuid>,
    pub owner_in: Option<Vec<Uuid>>,
    pub roles: Option<Vec<Role>>,
    pub status: Option<AccountStatus>,
    pub next_visit: VisitDatePredicate,
    pub visits: VisitCountPredicate,
}

impl ScopeFilter {
    pub fn everything() -> Self {
        Self::default()
    }

    pub fn nothing() -> Self {
        Self { match_nothing: true, ..Self::default() }
    }

    /// Avalia o filtro em memória sobre um Lead/Job.
    pub fn matches_record<R: FieldRecord>(&self, record: &R) -> bool {
        if self.match_nothing {
            return false;
        }
        if !matches_anchor(self.zone.as_deref(), record.zone())
            || !matches_anchor(self.branch.as_deref(), record.branch())
        {
            return false;
        }
        if self.owner.is_some_and(|owner| owner != record.owner()) {
            return false;
        }
        if let Some(ids) = &self.owner_in {
            if !ids.contains(&record.owner()) {
                return false;
            }
        }
        let date_ok = match &self.next_visit {
            VisitDatePredicate::Any => true,
            VisitDatePredicate::Present => record.next_visit_date().is_some(),
            VisitDatePredicate::Absent => record.next_visit_date().is_none(),
            VisitDatePredicate::Between { from, to } => match record.next_visit_date() {
                Some(date) => from.is_none_or(|f| date >= f) && to.is_none_or(|t| date <= t),
                None => false,
            },
        };
        let visits_ok = match self.visits {
            VisitCountPredicate::Any => true,
            VisitCountPredicate::Positive => record.visits() > 0,
            VisitCountPredicate::Zero => record.visits() == 0,
        };
        date_ok && visits_ok
    }

    /// Avalia o filtro em memória sobre uma conta.
    pub fn matches_account(&self, account: &Account) -> bool {
        if self.match_nothing {
            return false;
        }
        matches_anchor(self.zone.as_deref(), account.zone.as_deref())
            && matches_anchor(self.branch.as_deref(), account.branch.as_deref())
            && self.owner.is_none_or(|id| id == account.id)
            && self.roles.as_ref().is_none_or(|roles| roles.contains(&account.role))
            && self.status.is_none_or(|status| status == account.status)
    }
}

fn matches_anchor(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match wanted {
        Some(wanted) => actual == Some(wanted),
        None => true,
    }
}

/// Dicas opcionais enviadas pelo chamador, já interpretadas.
#[derive(Debug, Clone, Default)]
pub struct ListHints {
    pub zone: Option<String>,
    pub branch: Option<String>,
    /// Donos encontrados pela busca por nome (já resolvidos pelo serviço).
    pub owner_ids: Option<Vec<Uuid>>,
    pub role: Option<Role>,
    pub status: Option<AccountStatus>,
    pub next_visit: Option<bool>,
    pub has_visit: Option<bool>,
    pub date_from: Option<NaiveDateTime>,
    pub date_to: Option<NaiveDateTime>,
}

impl ListHints {
    pub fn from_record_query(query: &RecordListQuery) -> Result<Self, FilterError> {
        Ok(Self {
            zone: non_empty(query.zone.as_deref()),
            branch: non_empty(query.branch.as_deref()),
            owner_ids: None,
            role: None,
            status: None,
            next_visit: query.next_visit.as_deref().and_then(parse_flag),
            has_visit: query.has_visit.as_deref().and_then(parse_flag),
            date_from: non_empty(query.date_from.as_deref())
                .map(|v| parse_date_from(&v))
                .transpose()?,
            date_to: non_empty(query.date_to.as_deref())
                .map(|v| parse_date_to(&v))
                .transpose()?,
        })
    }

    pub fn from_account_query(query: &AccountListQuery) -> Self {
        Self {
            zone: non_empty(query.zone.as_deref()),
            branch: non_empty(query.branch.as_deref()),
            role: query.role,
            status: query.status,
            ..Self::default()
        }
    }

    /// O intervalo de datas substitui por completo o predicado de existência:
    /// com `dateFrom`/`dateTo` presentes, `nextVisit` é descartado.
    pub fn visit_date_predicate(&self) -> VisitDatePredicate {
        if self.date_from.is_some() || self.date_to.is_some() {
            return VisitDatePredicate::Between { from: self.date_from, to: self.date_to };
        }
        match self.next_visit {
            Some(true) => VisitDatePredicate::Present,
            Some(false) => VisitDatePredicate::Absent,
            None => VisitDatePredicate::Any,
        }
    }

    pub fn visit_count_predicate(&self) -> VisitCountPredicate {
        match self.has_visit {
            Some(true) => VisitCountPredicate::Positive,
            Some(false) => VisitCountPredicate::Zero,
            None => VisitCountPredicate::Any,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_owned)
}

pub fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Data de visita: `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS[.f]` ou RFC 3339 com
/// fuso (`...Z`, `...+05:30`), este último convertido para UTC sem fuso.
pub fn parse_visit_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN));
    }
    if let Ok(date_time) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(date_time);
    }
    DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.naive_utc())
}

fn parse_date_time(field: &'static str, value: &str) -> Result<NaiveDateTime, FilterError> {
    parse_visit_date(value).ok_or_else(|| FilterError::InvalidDate { field, value: value.to_string() })
}

pub fn parse_date_from(value: &str) -> Result<NaiveDateTime, FilterError> {
    parse_date_time("dateFrom", value)
}

/// `dateTo` é inclusivo até 23:59:59.999 do dia informado.
pub fn parse_date_to(value: &str) -> Result<NaiveDateTime, FilterError> {
    let parsed = parse_date_time("dateTo", value)?;
    let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    Ok(parsed.date().and_time(end_of_day))
}

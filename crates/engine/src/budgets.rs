//! Budgets: a spending limit for one category over a period.
//!
//! `spent_minor` accumulates expense amounts booked against the category
//! while a transaction falls inside `[start_date, end_date]`.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Budget {
    pub id: Uuid,
    pub owner_id: String,
    pub category: String,
    pub amount_minor: i64,
    pub spent_minor: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    /// Budgeted amount left; negative once overspent.
    pub fn remaining_minor(&self) -> i64 {
        self.amount_minor - self.spent_minor
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_id: String,
    pub category: String,
    pub amount_minor: i64,
    pub spent_minor: i64,
    pub start_date: DateTimeUtc,
    pub end_date: DateTimeUtc,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    fn covers(&self, at: DateTime<Utc>) -> bool {
        self.start_date <= at && at <= self.end_date
    }
}

impl TryFrom<Model> for Budget {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "budget")?,
            owner_id: model.owner_id,
            category: model.category,
            amount_minor: model.amount_minor,
            spent_minor: model.spent_minor,
            start_date: model.start_date,
            end_date: model.end_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Picks the budget a transaction at `at` is booked against.
///
/// Only budgets whose period contains `at` qualify. Among those the latest
/// `start_date` wins, then the latest `created_at`, then the id, so the
/// choice never depends on row order.
pub(crate) fn select_budget(candidates: Vec<Model>, at: DateTime<Utc>) -> Option<Model> {
    candidates
        .into_iter()
        .filter(|budget| budget.covers(at))
        .max_by(|a, b| {
            a.start_date
                .cmp(&b.start_date)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        })
}

/// Turns a calendar period into inclusive UTC bounds
/// (`start 00:00:00.000` .. `end 23:59:59.999`).
pub(crate) fn period_bounds(
    start: NaiveDate,
    end: NaiveDate,
) -> ResultEngine<(DateTime<Utc>, DateTime<Utc>)> {
    if end < start {
        return Err(EngineError::Validation(
            "end_date must not be before start_date".to_string(),
        ));
    }
    let last_milli = NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
        .ok_or_else(|| EngineError::Validation("invalid end_date".to_string()))?;
    Ok((
        start.and_time(NaiveTime::MIN).and_utc(),
        end.and_time(last_milli).and_utc(),
    ))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn budget(id: &str, start: DateTime<Utc>, end: DateTime<Utc>, created: DateTime<Utc>) -> Model {
        Model {
            id: id.to_string(),
            owner_id: "alice".to_string(),
            category: "Groceries".to_string(),
            amount_minor: 50_000,
            spent_minor: 0,
            start_date: start,
            end_date: end,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn ignores_budgets_outside_the_period() {
        let january = budget("jan", day(2026, 1, 1), day(2026, 1, 31), day(2026, 1, 1));
        assert_eq!(select_budget(vec![january], day(2026, 2, 10)), None);
    }

    #[test]
    fn prefers_the_most_recent_overlapping_period() {
        let yearly = budget("year", day(2026, 1, 1), day(2026, 12, 31), day(2026, 1, 1));
        let march = budget("march", day(2026, 3, 1), day(2026, 3, 31), day(2025, 12, 1));
        let picked = select_budget(vec![march.clone(), yearly.clone()], day(2026, 3, 15));
        assert_eq!(picked.map(|b| b.id), Some("march".to_string()));

        let picked = select_budget(vec![march, yearly], day(2026, 4, 15));
        assert_eq!(picked.map(|b| b.id), Some("year".to_string()));
    }

    #[test]
    fn same_period_falls_back_to_newest_row() {
        let start = day(2026, 5, 1);
        let end = day(2026, 5, 31);
        let older = budget("a", start, end, start);
        let newer = budget("b", start, end, start + Duration::hours(1));
        let picked = select_budget(vec![newer, older], day(2026, 5, 2));
        assert_eq!(picked.map(|b| b.id), Some("b".to_string()));
    }

    #[test]
    fn period_bounds_cover_whole_days() {
        let start = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 10, 31).unwrap();
        let (from, to) = period_bounds(start, end).unwrap();
        assert_eq!(from, Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap());
        assert!(to > Utc.with_ymd_and_hms(2026, 10, 31, 23, 59, 59).unwrap());
        assert!(period_bounds(end, start).is_err());
    }
}

//! The module contains `Account` struct and its storage model.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

/// An account.
///
/// An account is anything money is kept in: a bank account, a card, cash.
/// `balance_minor` is denormalized from the transactions booked against the
/// account and is only changed through deltas or by the reconciler.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    /// Free-form account type tag ("bank", "cash", "card", ...).
    pub kind: String,
    /// Masked account number (`****1234`).
    pub account_number: String,
    pub balance_minor: i64,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(
        owner_id: String,
        name: String,
        kind: String,
        account_number: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name,
            kind,
            account_number,
            balance_minor: 0,
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub kind: String,
    pub account_number: String,
    pub balance_minor: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(value: &Account) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            owner_id: ActiveValue::Set(value.owner_id.clone()),
            name: ActiveValue::Set(value.name.clone()),
            kind: ActiveValue::Set(value.kind.clone()),
            account_number: ActiveValue::Set(value.account_number.clone()),
            balance_minor: ActiveValue::Set(value.balance_minor),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "account")?,
            owner_id: model.owner_id,
            name: model.name,
            kind: model.kind,
            account_number: model.account_number,
            balance_minor: model.balance_minor,
            created_at: model.created_at,
        })
    }
}

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, prelude::*, sea_query::OnConflict,
};
use uuid::Uuid;

use crate::{Category, EngineError, ResultEngine, TransactionKind, categories, util::parse_uuid};

use super::Engine;

impl Engine {
    /// Finds or creates the category `(user_id, name, kind)` and returns its id.
    ///
    /// The insert is an upsert against the unique `(owner_id, name, kind)`
    /// index, so two units racing on the same first use end up sharing one
    /// row instead of creating a duplicate.
    pub(super) async fn resolve_category(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        name: &str,
        kind: TransactionKind,
    ) -> ResultEngine<Uuid> {
        if let Some(model) = find_category(db_tx, user_id, name, kind).await? {
            return parse_uuid(&model.id, "category");
        }

        let active = categories::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            owner_id: ActiveValue::Set(user_id.to_string()),
            name: ActiveValue::Set(name.to_string()),
            kind: ActiveValue::Set(kind.as_str().to_string()),
        };
        let inserted = categories::Entity::insert(active)
            .on_conflict(
                OnConflict::columns([
                    categories::Column::OwnerId,
                    categories::Column::Name,
                    categories::Column::Kind,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db_tx)
            .await?;
        if inserted == 0 {
            tracing::debug!("category '{name}' ({}) created concurrently", kind.as_str());
        }

        let model = find_category(db_tx, user_id, name, kind)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;
        parse_uuid(&model.id, "category")
    }

    /// Lists the categories of a user, ordered by kind then name.
    pub async fn categories(&self, user_id: &str) -> ResultEngine<Vec<Category>> {
        categories::Entity::find()
            .filter(categories::Column::OwnerId.eq(user_id))
            .order_by_asc(categories::Column::Kind)
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Category::try_from)
            .collect()
    }
}

async fn find_category(
    db_tx: &DatabaseTransaction,
    user_id: &str,
    name: &str,
    kind: TransactionKind,
) -> ResultEngine<Option<categories::Model>> {
    Ok(categories::Entity::find()
        .filter(categories::Column::OwnerId.eq(user_id))
        .filter(categories::Column::Name.eq(name))
        .filter(categories::Column::Kind.eq(kind.as_str()))
        .one(db_tx)
        .await?)
}

//! Provider registry: CRUD plus client counts.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, SqlErr,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use models::{client, provider};

use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderInput {
    pub name: String,
}

/// Provider row with the number of clients attached to it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderWithCount {
    #[serde(flatten)]
    pub provider: provider::Model,
    pub client_count: u64,
}

/// Provider row with its full client list (detail view).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDetail {
    #[serde(flatten)]
    pub provider: provider::Model,
    pub clients: Vec<client::Model>,
    pub client_count: u64,
}

fn normalized_name(input: &str) -> Result<String, ServiceError> {
    let name = input.trim();
    if name.is_empty() {
        return Err(ServiceError::Validation("provider name is required".into()));
    }
    Ok(name.to_string())
}

/// All providers, alphabetical, each with its client count.
#[instrument(skip(db))]
pub async fn list_providers(db: &DatabaseConnection) -> Result<Vec<ProviderWithCount>, ServiceError> {
    let providers = provider::Entity::find()
        .order_by_asc(provider::Column::Name)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;

    let counts: Vec<(Uuid, i64)> = client::Entity::find()
        .select_only()
        .column(client::Column::ProviderId)
        .column_as(client::Column::Id.count(), "count")
        .group_by(client::Column::ProviderId)
        .into_tuple()
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    let counts: HashMap<Uuid, i64> = counts.into_iter().collect();

    Ok(providers
        .into_iter()
        .map(|p| {
            let client_count = counts.get(&p.id).copied().unwrap_or(0) as u64;
            ProviderWithCount { provider: p, client_count }
        })
        .collect())
}

pub async fn get_provider(db: &DatabaseConnection, id: Uuid) -> Result<ProviderDetail, ServiceError> {
    let provider = provider::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("provider"))?;
    let clients = client::Entity::find()
        .filter(client::Column::ProviderId.eq(id))
        .order_by_desc(client::Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    let client_count = clients.len() as u64;
    Ok(ProviderDetail { provider, clients, client_count })
}

/// Create a provider. Name uniqueness is the storage constraint's job;
/// a duplicate surfaces as `Conflict`.
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_provider(
    db: &DatabaseConnection,
    input: ProviderInput,
) -> Result<provider::Model, ServiceError> {
    let name = normalized_name(&input.name)?;
    let am = provider::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| ServiceError::from_db("provider name", e))
}

#[instrument(skip(db, input))]
pub async fn update_provider(
    db: &DatabaseConnection,
    id: Uuid,
    input: ProviderInput,
) -> Result<provider::Model, ServiceError> {
    let name = normalized_name(&input.name)?;
    let existing = provider::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("provider"))?;
    let mut am: provider::ActiveModel = existing.into();
    am.name = Set(name);
    am.update(db).await.map_err(|e| ServiceError::from_db("provider name", e))
}

/// Delete a provider. Forbidden while any client still references it;
/// the FK RESTRICT rule backstops the check under races.
#[instrument(skip(db))]
pub async fn delete_provider(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let referencing = client::Entity::find()
        .filter(client::Column::ProviderId.eq(id))
        .count(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    if referencing > 0 {
        return Err(ServiceError::Conflict(format!(
            "provider is still referenced by {} client(s)",
            referencing
        )));
    }
    let res = provider::Entity::delete_by_id(id)
        .exec(db)
        .await
        .map_err(|e| ServiceError::from_db("provider", e))?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("provider"));
    }
    Ok(())
}

/// Find a provider by exact name or create it. Used by the bulk import
/// path; loses gracefully if another row wins the insert race.
pub async fn upsert_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<provider::Model, ServiceError> {
    let name = normalized_name(name)?;
    if let Some(existing) = provider::Entity::find()
        .filter(provider::Column::Name.eq(name.as_str()))
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
    {
        return Ok(existing);
    }
    let am = provider::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.clone()),
        created_at: Set(Utc::now().into()),
    };
    match am.insert(db).await {
        Ok(created) => Ok(created),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            provider::Entity::find()
                .filter(provider::Column::Name.eq(name.as_str()))
                .one(db)
                .await
                .map_err(|e| ServiceError::Db(e.to_string()))?
                .ok_or_else(|| ServiceError::Db("provider vanished after conflict".into()))
        }
        Err(e) => Err(ServiceError::Db(e.to_string())),
    }
}

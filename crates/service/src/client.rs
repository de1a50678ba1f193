//! Client listing, filtering and CRUD.
//!
//! The filter is parsed leniently: malformed fragments (bad uuid, bad
//! number, unknown status, unparseable list) are dropped while the valid
//! fragments still apply. Query parameters never fail a request.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use models::{client, provider, validation};

use crate::errors::ServiceError;
use crate::pagination::{PageMeta, Pagination};

/// Which timestamp column a date range applies to. The business `date` is
/// the default; `createdAt` is selectable per request via `dateField`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateField {
    #[default]
    BusinessDate,
    CreatedAt,
}

impl DateField {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "date" | "businessDate" => Some(Self::BusinessDate),
            "createdAt" | "created_at" => Some(Self::CreatedAt),
            _ => None,
        }
    }

    fn column(self) -> client::Column {
        match self {
            Self::BusinessDate => client::Column::Date,
            Self::CreatedAt => client::Column::CreatedAt,
        }
    }
}

/// Raw query-string view of the list/export filters. Everything is a
/// string so that bad values can be dropped instead of failing
/// deserialization.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawClientFilter {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub provider_id: Option<String>,
    pub provider_names: Option<String>,
    /// Legacy alias for `provider_names`.
    pub providers: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub date_field: Option<String>,
    /// Export-only keys; ignored by the list endpoint.
    pub format: Option<String>,
    pub fields: Option<String>,
}

/// Parsed filter over the client set.
#[derive(Debug, Clone, Default)]
pub struct ClientFilter {
    pub search: Option<String>,
    pub status: Option<&'static str>,
    pub provider_id: Option<Uuid>,
    pub provider_names: Vec<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub date_field: DateField,
}

impl ClientFilter {
    pub fn from_raw(raw: &RawClientFilter) -> Self {
        let search = raw
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && s.len() <= 100)
            .map(str::to_owned);
        let status = raw.status.as_deref().and_then(validation::parse_status);
        let provider_id = raw.provider_id.as_deref().and_then(|s| Uuid::parse_str(s.trim()).ok());
        let provider_names = raw
            .provider_names
            .as_deref()
            .or(raw.providers.as_deref())
            .map(parse_name_list)
            .unwrap_or_default();
        Self {
            search,
            status,
            provider_id,
            provider_names,
            min_price: raw.min_price.as_deref().and_then(parse_price),
            max_price: raw.max_price.as_deref().and_then(parse_price),
            start_date: raw.start_date.as_deref().and_then(parse_date),
            end_date: raw.end_date.as_deref().and_then(parse_date),
            date_field: raw.date_field.as_deref().and_then(DateField::parse).unwrap_or_default(),
        }
    }

    pub fn pagination(raw: &RawClientFilter) -> Pagination {
        let parse = |v: &Option<String>| v.as_deref().and_then(|s| s.trim().parse::<u64>().ok());
        Pagination {
            page: parse(&raw.page).unwrap_or(1),
            limit: parse(&raw.limit).unwrap_or(10),
        }
    }

    /// Everything except the provider-name axis, which needs lookups.
    pub fn base_condition(&self) -> Condition {
        let mut cond = Condition::all();
        if let Some(term) = &self.search {
            let pat = like_pattern(term);
            cond = cond.add(
                Condition::any()
                    .add(Expr::col((client::Entity, client::Column::Name)).ilike(pat.clone()))
                    .add(Expr::col((client::Entity, client::Column::Email)).ilike(pat.clone()))
                    .add(Expr::col((client::Entity, client::Column::Phone)).ilike(pat.clone()))
                    .add(Expr::col((client::Entity, client::Column::Company)).ilike(pat)),
            );
        }
        if let Some(status) = self.status {
            cond = cond.add(client::Column::Status.eq(status));
        }
        if let Some(id) = self.provider_id {
            cond = cond.add(client::Column::ProviderId.eq(id));
        }
        if let Some(min) = self.min_price {
            cond = cond.add(client::Column::Price.gte(min));
        }
        if let Some(max) = self.max_price {
            cond = cond.add(client::Column::Price.lte(max));
        }
        let date_col = self.date_field.column();
        if let Some(start) = self.start_date {
            cond = cond.add(date_col.gte(day_start(start)));
        }
        if let Some(end) = self.end_date {
            cond = cond.add(date_col.lte(day_end(end)));
        }
        cond
    }

    /// Full predicate. Provider names are substring-matched against the
    /// provider registry; if none resolve, the predicate is impossible
    /// (empty result set), never "filter ignored".
    pub async fn condition(&self, db: &DatabaseConnection) -> Result<Condition, ServiceError> {
        let mut cond = self.base_condition();
        if !self.provider_names.is_empty() {
            let mut by_name = Condition::any();
            for name in &self.provider_names {
                by_name = by_name.add(Expr::col(provider::Column::Name).ilike(like_pattern(name)));
            }
            let ids: Vec<Uuid> = provider::Entity::find()
                .filter(by_name)
                .all(db)
                .await
                .map_err(|e| ServiceError::Db(e.to_string()))?
                .into_iter()
                .map(|p| p.id)
                .collect();
            cond = cond.add(client::Column::ProviderId.is_in(ids));
        }
        Ok(cond)
    }
}

fn like_pattern(term: &str) -> String {
    format!("%{}%", term.trim())
}

fn parse_price(input: &str) -> Option<f64> {
    input.trim().parse::<f64>().ok().filter(|p| p.is_finite())
}

/// `YYYY-MM-DD`, with full RFC 3339 accepted for compatibility.
fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(input).ok().map(|dt| dt.date_naive()))
}

/// JSON-encoded array or comma-separated list; both shapes occur in the
/// wild. Malformed JSON falls back to comma splitting.
fn parse_name_list(input: &str) -> Vec<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if trimmed.starts_with('[') {
        if let Ok(serde_json::Value::Array(items)) = serde_json::from_str(trimmed) {
            return items
                .into_iter()
                .filter_map(|v| v.as_str().map(str::trim).map(str::to_owned))
                .filter(|s| !s.is_empty())
                .collect();
        }
    }
    trimmed
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

fn day_end(date: NaiveDate) -> DateTime<Utc> {
    let end = chrono::NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
        .unwrap_or(chrono::NaiveTime::MIN);
    date.and_time(end).and_utc()
}

/// A client row joined with its provider.
#[derive(Debug, Clone, Serialize)]
pub struct ClientWithProvider {
    #[serde(flatten)]
    pub client: client::Model,
    pub provider: Option<provider::Model>,
}

#[derive(Debug, Serialize)]
pub struct ClientPage {
    pub clients: Vec<ClientWithProvider>,
    pub pagination: PageMeta,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    pub provider_id: Uuid,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateClientInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub status: Option<String>,
    pub provider_id: Option<Uuid>,
    pub price: Option<f64>,
    pub date: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub notes: Option<String>,
}

/// List clients matching `filter`, newest first, paginated.
#[instrument(skip(db, filter))]
pub async fn list_clients(
    db: &DatabaseConnection,
    filter: &ClientFilter,
    pagination: Pagination,
) -> Result<ClientPage, ServiceError> {
    let (page, limit, offset) = pagination.normalize();
    let cond = filter.condition(db).await?;

    let total = client::Entity::find()
        .filter(cond.clone())
        .count(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;

    let rows = client::Entity::find()
        .filter(cond)
        .find_also_related(provider::Entity)
        .order_by_desc(client::Column::CreatedAt)
        .order_by_desc(client::Column::Id)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;

    let clients = rows
        .into_iter()
        .map(|(client, provider)| ClientWithProvider { client, provider })
        .collect();
    Ok(ClientPage { clients, pagination: PageMeta::new(total, page, limit) })
}

/// All clients matching `filter`, newest first, unpaginated (export path).
pub async fn find_filtered(
    db: &DatabaseConnection,
    filter: &ClientFilter,
) -> Result<Vec<ClientWithProvider>, ServiceError> {
    let cond = filter.condition(db).await?;
    let rows = client::Entity::find()
        .filter(cond)
        .find_also_related(provider::Entity)
        .order_by_desc(client::Column::CreatedAt)
        .order_by_desc(client::Column::Id)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(rows
        .into_iter()
        .map(|(client, provider)| ClientWithProvider { client, provider })
        .collect())
}

pub async fn get_client_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<ClientWithProvider, ServiceError> {
    let found = client::Entity::find_by_id(id)
        .find_also_related(provider::Entity)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    match found {
        Some((client, provider)) => Ok(ClientWithProvider { client, provider }),
        None => Err(ServiceError::not_found("client")),
    }
}

/// Create a client. Duplicate emails are rejected by the storage unique
/// constraint and surfaced as `Conflict`.
#[instrument(skip(db, input), fields(email = %input.email))]
pub async fn create_client(
    db: &DatabaseConnection,
    input: CreateClientInput,
) -> Result<ClientWithProvider, ServiceError> {
    if input.name.trim().is_empty() {
        return Err(ServiceError::Validation("name is required".into()));
    }
    validation::validate_email(&input.email)?;
    let status = match input.status.as_deref() {
        None => client::STATUS_ACTIVE,
        Some(s) => validation::parse_status(s)
            .ok_or_else(|| ServiceError::Validation(format!("invalid status: {}", s)))?,
    };
    provider::Entity::find_by_id(input.provider_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("provider"))?;

    let now = Utc::now();
    let date = input
        .date
        .as_deref()
        .and_then(parse_date)
        .map(day_start)
        .unwrap_or(now);
    let am = client::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name.trim().to_string()),
        email: Set(input.email.trim().to_string()),
        phone: Set(input.phone),
        company: Set(input.company),
        status: Set(status.to_string()),
        price: Set(input.price.unwrap_or(0.0)),
        date: Set(date.into()),
        address: Set(input.address),
        city: Set(input.city),
        country: Set(input.country),
        notes: Set(input.notes),
        provider_id: Set(input.provider_id),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };
    let created = am.insert(db).await.map_err(|e| ServiceError::from_db("client email", e))?;
    get_client_by_id(db, created.id).await
}

/// Patch a client; checks apply only to the fields actually supplied.
#[instrument(skip(db, input))]
pub async fn update_client(
    db: &DatabaseConnection,
    id: Uuid,
    input: UpdateClientInput,
) -> Result<ClientWithProvider, ServiceError> {
    let existing = client::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("client"))?;
    let mut am: client::ActiveModel = existing.into();

    if let Some(name) = input.name {
        if name.trim().is_empty() {
            return Err(ServiceError::Validation("name is required".into()));
        }
        am.name = Set(name.trim().to_string());
    }
    if let Some(email) = input.email {
        validation::validate_email(&email)?;
        am.email = Set(email.trim().to_string());
    }
    if let Some(status) = input.status {
        let status = validation::parse_status(&status)
            .ok_or_else(|| ServiceError::Validation(format!("invalid status: {}", status)))?;
        am.status = Set(status.to_string());
    }
    if let Some(provider_id) = input.provider_id {
        provider::Entity::find_by_id(provider_id)
            .one(db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?
            .ok_or_else(|| ServiceError::not_found("provider"))?;
        am.provider_id = Set(provider_id);
    }
    if let Some(phone) = input.phone {
        am.phone = Set(Some(phone));
    }
    if let Some(company) = input.company {
        am.company = Set(Some(company));
    }
    if let Some(price) = input.price {
        am.price = Set(price);
    }
    if let Some(date) = input.date.as_deref().and_then(parse_date) {
        am.date = Set(day_start(date).into());
    }
    if let Some(address) = input.address {
        am.address = Set(Some(address));
    }
    if let Some(city) = input.city {
        am.city = Set(Some(city));
    }
    if let Some(country) = input.country {
        am.country = Set(Some(country));
    }
    if let Some(notes) = input.notes {
        am.notes = Set(Some(notes));
    }
    am.updated_at = Set(Utc::now().into());

    let updated = am.update(db).await.map_err(|e| ServiceError::from_db("client email", e))?;
    get_client_by_id(db, updated.id).await
}

pub async fn delete_client(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let res = client::Entity::delete_by_id(id)
        .exec(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("client"));
    }
    Ok(())
}

/// Delete every listed id that exists; missing ids are tolerated. Returns
/// the number of rows actually removed.
#[instrument(skip(db), fields(requested = ids.len()))]
pub async fn delete_many_clients(db: &DatabaseConnection, ids: &[Uuid]) -> Result<u64, ServiceError> {
    if ids.is_empty() {
        return Ok(0);
    }
    let res = client::Entity::delete_many()
        .filter(client::Column::Id.is_in(ids.to_vec()))
        .exec(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(res.rows_affected)
}

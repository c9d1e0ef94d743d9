use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::{Date, OffsetDateTime};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "group_block_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GroupBlockStatus {
    Planned,
    Definite,
    Tentative,
    Cancelled,
    Open,
}

/// An optional reporting label grouping reservations (a wedding block,
/// a conference allotment). Its status never cascades to members.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct GroupBlock {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    pub status: GroupBlockStatus,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub company: Option<String>,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewGroupBlock {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    pub status: Option<GroupBlockStatus>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub company: Option<String>,
    pub notes: Option<String>,
}

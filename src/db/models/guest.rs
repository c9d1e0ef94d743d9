use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;
use validator::Validate;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Guest {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub name: String,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub nationality: Option<String>,
    pub gender: Option<String>,
    pub age: Option<i32>,
    pub address: Option<String>,
    pub id_type: Option<String>,
    pub id_number: Option<String>,
    pub relation: String,
    pub is_main: bool,
    pub created_at: OffsetDateTime,
}

impl Guest {
    /// A guest counts toward the capture gate once name and mobile are on file.
    pub fn has_identity(&self) -> bool {
        !self.name.trim().is_empty()
            && self.mobile.as_deref().is_some_and(|m| !m.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewGuest {
    #[validate(length(min = 1, message = "Guest name must not be empty"))]
    pub name: String,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub nationality: Option<String>,
    pub gender: Option<String>,
    #[validate(range(min = 0, max = 150, message = "Age must be plausible"))]
    pub age: Option<i32>,
    pub address: Option<String>,
    pub id_type: Option<String>,
    pub id_number: Option<String>,
    pub relation: Option<String>,
    #[serde(default)]
    pub main: bool,
}

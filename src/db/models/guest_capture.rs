use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "capture_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CaptureKind {
    Face,
    IdFront,
    IdBack,
}

impl CaptureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CaptureKind::Face => "face",
            CaptureKind::IdFront => "id_front",
            CaptureKind::IdBack => "id_back",
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct GuestCapture {
    pub id: Uuid,
    pub guest_id: Uuid,
    pub kind: CaptureKind,
    pub image_ref: String,
    pub captured_at: OffsetDateTime,
}

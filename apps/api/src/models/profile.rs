use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const USER_TYPE_PROFESSIONAL: &str = "professional";
pub const USER_TYPE_BUSINESS: &str = "business";

/// A professional or business record as stored by the external backend.
/// `skills` is one comma-separated free-text field, never normalized at rest.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub user_type: String,
    pub display_name: Option<String>,
    pub skills: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileRow {
    pub fn is_business(&self) -> bool {
        self.user_type.eq_ignore_ascii_case(USER_TYPE_BUSINESS)
    }

    pub fn has_known_user_type(&self) -> bool {
        self.is_business() || self.user_type.eq_ignore_ascii_case(USER_TYPE_PROFESSIONAL)
    }
}

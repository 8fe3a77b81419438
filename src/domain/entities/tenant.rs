use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

/// A tenant as seen by the billing engine.
///
/// The directory owning this record is external; the engine reads contact and
/// limit info and writes only the `is_active` flag, through
/// `TenantDirectoryTrait::set_active`.
#[derive(Debug, Clone, Serialize)]
pub struct TenantProfile {
    pub id: Uuid,
    pub name: String,
    pub unit_name: String,
    pub phone_number: String,
    pub bandwidth_limit_kbps: Option<i32>,
    pub is_active: bool,
    pub created_at: Option<NaiveDateTime>,
}

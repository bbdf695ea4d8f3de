//! Clinic settings, staff accounts and the audit trail.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use kenko_auth::Role;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::validation::{require, validate_email, validate_id, Validate, ValidationError};

const ORGANIZATION: &str = "/organization";
const ORGANIZATION_USERS: &str = "/organization/users";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningHours {
    pub open: String,
    pub close: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganizationProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub logo_url: Option<String>,
    pub operating_hours: BTreeMap<String, OpeningHours>,
    pub specialties: Vec<String>,
    pub status: String,
    pub created_at: String,
}

/// Partial update; only the fields that are set are sent.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_hours: Option<BTreeMap<String, OpeningHours>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialties: Option<Vec<String>>,
}

impl Validate for OrganizationUpdate {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            require("name", name)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        Ok(())
    }
}

/// A staff or patient account created by the clinic administrator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrgUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Validate for NewOrgUser {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_email(&self.email)?;
        require("firstName", &self.first_name)?;
        require("lastName", &self.last_name)?;
        if self.role == Role::Administrator {
            return Err(ValidationError::new(
                "role",
                "administrators are created at registration",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct BulkUsers<'a> {
    users: &'a [NewOrgUser],
}

impl Validate for BulkUsers<'_> {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.users.is_empty() {
            return Err(ValidationError::new("users", "must not be empty"));
        }
        self.users.validate()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgUser {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub role: Role,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedUser {
    pub user: OrgUser,
    pub temp_password: String,
    #[serde(default)]
    pub email_sent: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BulkCreated {
    pub created: u32,
    pub failed: u32,
    pub users: Vec<CreatedUser>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PasswordReset {
    pub temp_password: String,
    pub email_sent: bool,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    CreateUser,
    UpdatePassword,
    ResetPassword,
    UpdateProfile,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditStatus {
    Success,
    Failed,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: i64,
    pub action: AuditAction,
    pub user_id: i64,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub target_user_id: Option<i64>,
    #[serde(default)]
    pub target_user_name: Option<String>,
    pub timestamp: String,
    #[serde(default)]
    pub ip_address: String,
    pub status: AuditStatus,
    #[serde(default)]
    pub details: Option<BTreeMap<String, Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuditLogPage {
    pub content: Vec<AuditLogEntry>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub current_page: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditLogFilter {
    pub action: Option<AuditAction>,
    pub user_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuditLogQuery {
    page: u32,
    size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<AuditAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_date: Option<NaiveDate>,
}

pub struct Organization<'a> {
    client: &'a ApiClient,
}

impl<'a> Organization<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn get(&self) -> ApiResult<OrganizationProfile> {
        self.client.get(ORGANIZATION).await
    }

    pub async fn update(&self, update: &OrganizationUpdate) -> ApiResult<OrganizationProfile> {
        self.client.put(ORGANIZATION, update).await
    }

    pub async fn create_user(&self, user: &NewOrgUser) -> ApiResult<CreatedUser> {
        self.client.post(ORGANIZATION_USERS, user).await
    }

    pub async fn create_bulk_users(&self, users: &[NewOrgUser]) -> ApiResult<BulkCreated> {
        self.client
            .post("/organization/bulk-users", &BulkUsers { users })
            .await
    }

    pub async fn users(&self) -> ApiResult<Vec<OrgUser>> {
        self.client.get_list(ORGANIZATION_USERS).await
    }

    pub async fn reset_password(&self, user_id: i64) -> ApiResult<PasswordReset> {
        validate_id("userId", user_id)?;
        self.client
            .post_empty(&format!("{ORGANIZATION_USERS}/{user_id}/reset-password"))
            .await
    }

    /// One page of the audit trail, zero-based.
    pub async fn audit_log(
        &self,
        page: u32,
        size: u32,
        filter: &AuditLogFilter,
    ) -> ApiResult<AuditLogPage> {
        if size == 0 {
            return Err(ValidationError::new("size", "must be at least 1").into());
        }
        if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
            if start > end {
                return Err(ValidationError::new("startDate", "must not be after endDate").into());
            }
        }

        let query = AuditLogQuery {
            page,
            size,
            action: filter.action,
            user_id: filter.user_id,
            start_date: filter.start_date,
            end_date: filter.end_date,
        };
        self.client
            .get_query("/organization/audit-log", &query)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn staff(role: Role) -> NewOrgUser {
        NewOrgUser {
            email: "staff@clinic.test".into(),
            first_name: "Pia".into(),
            last_name: "Lara".into(),
            role,
            phone: None,
        }
    }

    #[test]
    fn administrators_cannot_be_added_as_staff() {
        assert!(staff(Role::Doctor).validate().is_ok());
        assert_eq!(
            staff(Role::Administrator).validate().unwrap_err().field,
            "role"
        );
    }

    #[test]
    fn bulk_request_wraps_users() {
        let users = vec![staff(Role::Receptionist), staff(Role::Patient)];
        let body = BulkUsers { users: &users };
        assert!(body.validate().is_ok());

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["users"][0]["role"], "RECEPTIONIST");
        assert!(value["users"][0].get("phone").is_none());

        assert!(BulkUsers { users: &[] }.validate().is_err());
    }

    #[test]
    fn audit_query_skips_unset_filters() {
        let query = AuditLogQuery {
            page: 0,
            size: 10,
            action: Some(AuditAction::ResetPassword),
            user_id: None,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: None,
        };
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({"page": 0, "size": 10, "action": "RESET_PASSWORD", "startDate": "2024-01-01"})
        );
    }

    #[test]
    fn audit_entries_tolerate_new_actions() {
        let entry: AuditLogEntry = serde_json::from_value(json!({
            "id": 1,
            "action": "DELETE_PATIENT",
            "userId": 2,
            "timestamp": "2024-05-01T10:00:00",
            "status": "SUCCESS"
        }))
        .unwrap();
        assert_eq!(entry.action, AuditAction::Other);
        assert_eq!(entry.status, AuditStatus::Success);
    }
}

//! Login, organisation sign-up and identity lookup.

use anyhow::Context;
use async_trait::async_trait;
use kenko_auth::{IdentityVerifier, Profile, Role, Session};
use serde::de::Error as _;
use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::validation::{require, validate_email, validate_new_password, Validate, ValidationError};

const LOGIN: &str = "/auth/login";
const REGISTER_ORGANIZATION: &str = "/auth/register-organization";
const ME: &str = "/auth/me";

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl Validate for Credentials {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err(ValidationError::new("password", "must not be empty"));
        }
        Ok(())
    }
}

/// Sign-up form for a new clinic and its administrator.
///
/// Serialized with the backend's field names (`orgName`, `adminFirstName`,
/// `adminLastName`).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationRegistration {
    #[serde(rename = "orgName")]
    pub organization_name: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "adminFirstName")]
    pub first_name: String,
    #[serde(rename = "adminLastName")]
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
}

impl Validate for OrganizationRegistration {
    fn validate(&self) -> Result<(), ValidationError> {
        require("organizationName", &self.organization_name)?;
        require("firstName", &self.first_name)?;
        require("lastName", &self.last_name)?;
        validate_email(&self.email)?;
        validate_new_password("password", &self.password)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    #[serde(default)]
    pub org_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationRef {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

/// Login and registration answer.
///
/// Older deployments send the profile flat next to the token, newer ones nest
/// it under `user` with the tenant under `organization`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub org_id: Option<i64>,
    #[serde(default)]
    pub user: Option<AuthUser>,
    #[serde(default)]
    pub organization: Option<OrganizationRef>,
}

impl AuthResponse {
    /// Collapse either layout into a [`Session`].
    pub fn into_session(self) -> ApiResult<Session> {
        if self.access_token.is_empty() {
            return Err(missing("accessToken"));
        }

        let profile = match self.user {
            Some(user) => Profile {
                id: user.id,
                email: user.email,
                first_name: user.first_name,
                last_name: user.last_name,
                role: user.role,
                org_id: user
                    .org_id
                    .or(self.organization.as_ref().map(|org| org.id))
                    .ok_or_else(|| missing("orgId"))?,
            },
            None => Profile {
                id: self.user_id.ok_or_else(|| missing("userId"))?,
                email: self.email.ok_or_else(|| missing("email"))?,
                first_name: self.first_name.ok_or_else(|| missing("firstName"))?,
                last_name: self.last_name.ok_or_else(|| missing("lastName"))?,
                role: self.role.ok_or_else(|| missing("role"))?,
                org_id: self.org_id.ok_or_else(|| missing("orgId"))?,
            },
        };

        Ok(Session::new(self.access_token, profile))
    }
}

fn missing(field: &'static str) -> ApiError {
    ApiError::Decode(serde_json::Error::missing_field(field))
}

pub struct Auth<'a> {
    client: &'a ApiClient,
}

impl<'a> Auth<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, credentials: &Credentials) -> ApiResult<Session> {
        let response: AuthResponse = self.client.post(LOGIN, credentials).await?;
        response.into_session()
    }

    pub async fn register_organization(
        &self,
        registration: &OrganizationRegistration,
    ) -> ApiResult<Session> {
        let response: AuthResponse = self
            .client
            .post(REGISTER_ORGANIZATION, registration)
            .await?;
        response.into_session()
    }

    pub async fn me(&self) -> ApiResult<Profile> {
        self.client.get(ME).await
    }
}

#[async_trait]
impl IdentityVerifier for ApiClient {
    async fn verify(&self, session: &Session) -> anyhow::Result<Profile> {
        let profile = self
            .get_as(ME, &session.token)
            .await
            .context("identity check against /auth/me failed")?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> AuthResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn flat_response_becomes_session() {
        let session = parse(json!({
            "accessToken": "t1",
            "userId": 1,
            "email": "admin@clinic.test",
            "firstName": "Ana",
            "lastName": "Ruiz",
            "role": "ADMIN",
            "orgId": 9
        }))
        .into_session()
        .unwrap();

        assert_eq!(session.token, "t1");
        assert_eq!(session.profile.org_id, 9);
        assert_eq!(session.landing_path(), "/admin/dashboard");
    }

    #[test]
    fn nested_response_falls_back_to_organization_id() {
        let session = parse(json!({
            "accessToken": "t2",
            "user": {
                "id": 4,
                "email": "dr@clinic.test",
                "firstName": "Luis",
                "lastName": "Mora",
                "role": "MEDICO"
            },
            "organization": {"id": 12, "name": "Clínica Norte"}
        }))
        .into_session()
        .unwrap();

        assert_eq!(session.profile.role, Role::Doctor);
        assert_eq!(session.profile.org_id, 12);
    }

    #[test]
    fn nested_response_without_any_org_is_rejected() {
        let err = parse(json!({
            "accessToken": "t3",
            "user": {
                "id": 4,
                "email": "p@clinic.test",
                "firstName": "Eva",
                "lastName": "Sol",
                "role": "PATIENT"
            }
        }))
        .into_session()
        .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
        assert!(err.to_string().contains("orgId"));
    }

    #[test]
    fn incomplete_flat_response_is_rejected() {
        let err = parse(json!({"accessToken": "t4", "userId": 2}))
            .into_session()
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn registration_uses_backend_field_names() {
        let form = OrganizationRegistration {
            organization_name: "Clínica Sur".into(),
            email: "admin@sur.test".into(),
            password: "Seguro123".into(),
            first_name: "Rosa".into(),
            last_name: "Vega".into(),
            ..Default::default()
        };
        assert!(form.validate().is_ok());

        let body = serde_json::to_value(&form).unwrap();
        assert_eq!(body["orgName"], "Clínica Sur");
        assert_eq!(body["adminFirstName"], "Rosa");
        assert_eq!(body["adminLastName"], "Vega");
        assert!(body.get("organizationName").is_none());
    }

    #[test]
    fn registration_requires_long_password() {
        let form = OrganizationRegistration {
            organization_name: "Clínica Sur".into(),
            email: "admin@sur.test".into(),
            password: "corta".into(),
            first_name: "Rosa".into(),
            last_name: "Vega".into(),
            ..Default::default()
        };
        assert_eq!(form.validate().unwrap_err().field, "password");
    }

    #[test]
    fn credentials_need_email_and_password() {
        assert!(Credentials::new("a@clinic.test", "x").validate().is_ok());
        assert!(Credentials::new("nope", "x").validate().is_err());
        assert!(Credentials::new("a@clinic.test", "").validate().is_err());
    }
}

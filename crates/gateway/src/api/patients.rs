use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::validation::{require, validate_email, Validate, ValidationError};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Patient {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(alias = "dateOfBirth")]
    pub birth_date: Option<String>,
    pub document_type: Option<String>,
    pub document_number: Option<String>,
    pub gender: Option<String>,
    pub blood_type: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub medical_history: Option<String>,
    pub allergies: Option<String>,
    pub current_medications: Option<String>,
    pub org_id: Option<i64>,
    pub created_at: Option<String>,
    pub status: Option<String>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Body for creating or updating a patient. Unset fields are left out.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientInput {
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allergies: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_medications: Option<String>,
}

impl Validate for PatientInput {
    fn validate(&self) -> Result<(), ValidationError> {
        require("firstName", &self.first_name)?;
        require("lastName", &self.last_name)?;
        match self.email.as_deref() {
            Some(email) if !email.is_empty() => validate_email(email),
            _ => Ok(()),
        }
    }
}

pub struct Patients<'a> {
    client: &'a ApiClient,
}

impl<'a> Patients<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    fn item(&self, id: i64) -> String {
        format!("{}/{id}", self.client.patients_path())
    }

    pub async fn list(&self) -> ApiResult<Vec<Patient>> {
        self.client.get_list(self.client.patients_path()).await
    }

    pub async fn get(&self, id: i64) -> ApiResult<Patient> {
        self.client.get(&self.item(id)).await
    }

    pub async fn create(&self, patient: &PatientInput) -> ApiResult<Patient> {
        self.client.post(self.client.patients_path(), patient).await
    }

    pub async fn update(&self, id: i64, patient: &PatientInput) -> ApiResult<Patient> {
        self.client.put(&self.item(id), patient).await
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        self.client.delete(&self.item(id)).await
    }
}

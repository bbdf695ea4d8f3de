use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::validation::{require, validate_id, Validate, ValidationError};

const MEDICAL_RECORDS: &str = "/medical-records";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicalRecord {
    pub id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub org_id: i64,
    pub appointment_id: Option<i64>,
    pub reason_for_consultation: String,
    pub physical_examination: String,
    pub diagnosis: String,
    pub treatment_plan: String,
    pub internal_notes: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecordInput {
    pub patient_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<i64>,
    pub reason_for_consultation: String,
    pub physical_examination: String,
    pub diagnosis: String,
    pub treatment_plan: String,
    pub internal_notes: String,
}

impl Validate for MedicalRecordInput {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_id("patientId", self.patient_id)?;
        if let Some(appointment) = self.appointment_id {
            validate_id("appointmentId", appointment)?;
        }
        require("reasonForConsultation", &self.reason_for_consultation)
    }
}

pub struct MedicalRecords<'a> {
    client: &'a ApiClient,
}

impl<'a> MedicalRecords<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ApiResult<Vec<MedicalRecord>> {
        self.client.get_list(MEDICAL_RECORDS).await
    }

    pub async fn for_patient(&self, patient_id: i64) -> ApiResult<Vec<MedicalRecord>> {
        self.client
            .get_list(&format!("{MEDICAL_RECORDS}/patient/{patient_id}"))
            .await
    }

    pub async fn get(&self, id: i64) -> ApiResult<MedicalRecord> {
        self.client.get(&format!("{MEDICAL_RECORDS}/{id}")).await
    }

    pub async fn create(&self, record: &MedicalRecordInput) -> ApiResult<MedicalRecord> {
        self.client.post(MEDICAL_RECORDS, record).await
    }

    pub async fn update(&self, id: i64, record: &MedicalRecordInput) -> ApiResult<MedicalRecord> {
        self.client
            .put(&format!("{MEDICAL_RECORDS}/{id}"), record)
            .await
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        self.client.delete(&format!("{MEDICAL_RECORDS}/{id}")).await
    }
}

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::validation::{require, validate_id, validate_time, Validate, ValidationError};

const APPOINTMENTS: &str = "/appointments";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    CheckedIn,
    Completed,
    Cancelled,
    NoShow,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AppointmentStatus::Pending => "PENDING",
            AppointmentStatus::Confirmed => "CONFIRMED",
            AppointmentStatus::CheckedIn => "CHECKED_IN",
            AppointmentStatus::Completed => "COMPLETED",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::NoShow => "NO_SHOW",
            AppointmentStatus::Unknown => "UNKNOWN",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: i64,
    #[serde(default)]
    pub patient_id: i64,
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub doctor_id: i64,
    #[serde(default)]
    pub doctor_name: String,
    pub appointment_date: String,
    #[serde(default)]
    pub appointment_time: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    /// `CONSULTATION`, `CHECKUP`, `PROCEDURE` or `TREATMENT`.
    #[serde(rename = "type")]
    pub kind: String,
    pub notes: String,
}

impl Validate for NewAppointment {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_id("patientId", self.patient_id)?;
        validate_id("doctorId", self.doctor_id)?;
        validate_time("appointmentTime", &self.appointment_time)?;
        require("type", &self.kind)
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
struct StatusChange {
    status: AppointmentStatus,
}

impl Validate for StatusChange {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.status == AppointmentStatus::Unknown {
            return Err(ValidationError::new("status", "unknown status"));
        }
        Ok(())
    }
}

pub struct Appointments<'a> {
    client: &'a ApiClient,
}

impl<'a> Appointments<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ApiResult<Vec<Appointment>> {
        self.client.get_list(APPOINTMENTS).await
    }

    pub async fn create(&self, appointment: &NewAppointment) -> ApiResult<Appointment> {
        self.client.post(APPOINTMENTS, appointment).await
    }

    pub async fn update_status(
        &self,
        id: i64,
        status: AppointmentStatus,
    ) -> ApiResult<Appointment> {
        self.client
            .patch(&format!("{APPOINTMENTS}/{id}"), &StatusChange { status })
            .await
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        self.client.delete(&format!("{APPOINTMENTS}/{id}")).await
    }

    /// The signed-in doctor's appointments for today.
    pub async fn doctor_agenda_today(&self) -> ApiResult<Vec<Appointment>> {
        self.client
            .get_list("/appointments/doctor/agenda/today")
            .await
    }

    /// The signed-in patient's own appointments.
    pub async fn my_appointments(&self) -> ApiResult<Vec<Appointment>> {
        self.client
            .get_list("/appointments/patient/my-appointments")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_status_does_not_fail_decoding() {
        let appointment: Appointment = serde_json::from_value(json!({
            "id": 3,
            "appointmentDate": "2024-06-01",
            "status": "RESCHEDULED"
        }))
        .unwrap();
        assert_eq!(appointment.status, AppointmentStatus::Unknown);
    }

    #[test]
    fn new_appointment_serializes_for_backend() {
        let appointment = NewAppointment {
            patient_id: 1,
            doctor_id: 2,
            appointment_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            appointment_time: "09:30".into(),
            kind: "CONSULTATION".into(),
            notes: String::new(),
        };
        assert!(appointment.validate().is_ok());

        let body = serde_json::to_value(&appointment).unwrap();
        assert_eq!(body["appointmentDate"], "2024-06-01");
        assert_eq!(body["type"], "CONSULTATION");
    }

    #[test]
    fn status_change_rejects_unknown() {
        assert!(StatusChange {
            status: AppointmentStatus::Unknown
        }
        .validate()
        .is_err());
        assert_eq!(
            serde_json::to_value(StatusChange {
                status: AppointmentStatus::CheckedIn
            })
            .unwrap(),
            json!({"status": "CHECKED_IN"})
        );
    }
}

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::client::ApiClient;
use crate::error::ApiResult;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TodayAppointment {
    pub id: i64,
    pub patient_name: String,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpcomingAppointment {
    pub id: i64,
    pub patient_name: String,
    pub date: String,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Per-user summary from `/dashboard/{userId}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub total_patients: u64,
    pub total_pending_appointments: u64,
    pub appointments_today: Vec<TodayAppointment>,
    pub upcoming_appointments: Vec<UpcomingAppointment>,
}

/// Clinic-wide figures. Both the English and the Spanish field sets are sent
/// depending on backend version; every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminDashboard {
    pub total_patients: Option<u64>,
    pub total_doctors: Option<u64>,
    pub total_appointments: Option<u64>,
    pub total_pending_appointments: Option<u64>,
    pub total_users: Option<u64>,
    pub monthly_revenue: Option<f64>,
    pub appointments_today: Vec<Value>,
    pub recent_activity: Vec<Value>,
    #[serde(rename = "ingresosMes")]
    pub revenue_this_month: Option<f64>,
    #[serde(rename = "totalCitas")]
    pub appointment_count: Option<u64>,
    #[serde(rename = "totalPacientes")]
    pub patient_count: Option<u64>,
    #[serde(rename = "tasaAusentismo")]
    pub no_show_rate: Option<f64>,
    #[serde(rename = "citasHoy")]
    pub appointments_today_count: Option<u64>,
    #[serde(rename = "totalProfesionales")]
    pub professional_count: Option<u64>,
    #[serde(rename = "citasPorEstado")]
    pub appointments_by_status: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DoctorDashboard {
    pub total_patients_today: Option<u64>,
    pub next_appointment: Option<Value>,
    pub today_appointments: Vec<Value>,
    pub total_patients_attended: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReceptionistDashboard {
    pub total_appointments_today: Option<u64>,
    pub pending_appointments: Option<u64>,
    pub checked_in_patients: Option<u64>,
    pub today_appointments: Vec<Value>,
}

pub struct Dashboard<'a> {
    client: &'a ApiClient,
}

impl<'a> Dashboard<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn stats(&self, user_id: i64) -> ApiResult<DashboardStats> {
        self.client.get(&format!("/dashboard/{user_id}")).await
    }

    pub async fn admin(&self) -> ApiResult<AdminDashboard> {
        self.client.get("/dashboard/admin").await
    }

    pub async fn doctor(&self) -> ApiResult<DoctorDashboard> {
        self.client.get("/dashboard/doctor").await
    }

    pub async fn receptionist(&self) -> ApiResult<ReceptionistDashboard> {
        self.client.get("/dashboard/receptionist").await
    }
}

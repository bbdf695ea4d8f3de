//! Client-side paths referenced outside the route table.

pub const HOME: &str = "/";
pub const LOGIN: &str = "/login";
pub const REGISTER: &str = "/registro";
pub const UNAUTHORIZED: &str = "/unauthorized";
pub const NOT_FOUND: &str = "/404";
pub const DASHBOARD: &str = "/dashboard";

pub const ONBOARDING: &str = "/onboarding";
pub const PROFESSIONALS: &str = "/profesionales";
pub const REPORTS: &str = "/reportes";
pub const AUDIT_LOG: &str = "/audit-log";
pub const TELEMEDICINE_ROOM: &str = "/telemedicina/sala/:appointmentId";

pub const PATIENTS: &str = "/pacientes";
pub const APPOINTMENTS: &str = "/citas";
pub const MEDICAL_HISTORIES: &str = "/historias";
pub const DOCUMENTS: &str = "/documentos";
pub const PROFILE: &str = "/perfil";
pub const SETTINGS: &str = "/settings";

pub use kenko_auth::role::{
    ADMIN_DASHBOARD, CAREGIVER_DASHBOARD, DOCTOR_DASHBOARD, PATIENT_DASHBOARD,
    RECEPTIONIST_DASHBOARD,
};

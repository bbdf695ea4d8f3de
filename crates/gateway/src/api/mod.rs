//! Typed bindings for the backend's REST resources.

pub mod appointments;
pub mod auth;
pub mod dashboard;
pub mod medical_records;
pub mod organization;
pub mod patients;
pub mod users;

use crate::client::ApiClient;

pub use appointments::Appointments;
pub use auth::Auth;
pub use dashboard::Dashboard;
pub use medical_records::MedicalRecords;
pub use organization::Organization;
pub use patients::Patients;
pub use users::Users;

impl ApiClient {
    pub fn auth(&self) -> Auth<'_> {
        Auth::new(self)
    }

    pub fn dashboard(&self) -> Dashboard<'_> {
        Dashboard::new(self)
    }

    pub fn patients(&self) -> Patients<'_> {
        Patients::new(self)
    }

    pub fn appointments(&self) -> Appointments<'_> {
        Appointments::new(self)
    }

    pub fn medical_records(&self) -> MedicalRecords<'_> {
        MedicalRecords::new(self)
    }

    pub fn organization(&self) -> Organization<'_> {
        Organization::new(self)
    }

    pub fn users(&self) -> Users<'_> {
        Users::new(self)
    }
}

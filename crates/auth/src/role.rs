//! The closed catalogue of portal roles.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const ADMIN_DASHBOARD: &str = "/admin/dashboard";
pub const DOCTOR_DASHBOARD: &str = "/doctor/dashboard";
pub const RECEPTIONIST_DASHBOARD: &str = "/receptionist/dashboard";
pub const PATIENT_DASHBOARD: &str = "/patient/dashboard";
pub const CAREGIVER_DASHBOARD: &str = "/caregiver/dashboard";

/// Every identity a session can carry.
///
/// The backend spells roles in upper case. Older tenants still send the
/// Spanish or organisation-scoped spellings, which are accepted as aliases
/// and normalised on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ADMIN", alias = "ORGANIZATION_ADMIN")]
    Administrator,
    #[serde(rename = "DOCTOR", alias = "MEDICO")]
    Doctor,
    #[serde(rename = "RECEPTIONIST", alias = "RECEPCIONISTA")]
    Receptionist,
    #[serde(rename = "PATIENT", alias = "PACIENTE")]
    Patient,
    #[serde(rename = "CAREGIVER", alias = "CUIDADOR")]
    Caregiver,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Administrator,
        Role::Doctor,
        Role::Receptionist,
        Role::Patient,
        Role::Caregiver,
    ];

    /// Wire name used by the backend.
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Administrator => "ADMIN",
            Role::Doctor => "DOCTOR",
            Role::Receptionist => "RECEPTIONIST",
            Role::Patient => "PATIENT",
            Role::Caregiver => "CAREGIVER",
        }
    }

    /// The dashboard a session of this role lands on after login.
    pub const fn landing_path(self) -> &'static str {
        match self {
            Role::Administrator => ADMIN_DASHBOARD,
            Role::Doctor => DOCTOR_DASHBOARD,
            Role::Receptionist => RECEPTIONIST_DASHBOARD,
            Role::Patient => PATIENT_DASHBOARD,
            Role::Caregiver => CAREGIVER_DASHBOARD,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_role_has_a_distinct_landing_path() {
        let mut paths: Vec<_> = Role::ALL.iter().map(|role| role.landing_path()).collect();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), Role::ALL.len());
    }

    #[test]
    fn administrator_lands_on_admin_dashboard() {
        assert_eq!(Role::Administrator.landing_path(), "/admin/dashboard");
    }

    #[test]
    fn deserializes_canonical_names_and_aliases() {
        let role: Role = serde_json::from_str("\"ADMIN\"").unwrap();
        assert_eq!(role, Role::Administrator);

        let role: Role = serde_json::from_str("\"ORGANIZATION_ADMIN\"").unwrap();
        assert_eq!(role, Role::Administrator);

        let role: Role = serde_json::from_str("\"MEDICO\"").unwrap();
        assert_eq!(role, Role::Doctor);

        let role: Role = serde_json::from_str("\"CUIDADOR\"").unwrap();
        assert_eq!(role, Role::Caregiver);
    }

    #[test]
    fn serializes_canonical_wire_name() {
        let json = serde_json::to_string(&Role::Receptionist).unwrap();
        assert_eq!(json, "\"RECEPTIONIST\"");
    }

    #[test]
    fn rejects_unknown_role() {
        assert!(serde_json::from_str::<Role>("\"JANITOR\"").is_err());
        assert!(serde_json::from_str::<Role>("\"ADMINISTRATOR\"").is_err());
    }
}

use serde::{Deserialize, Serialize};

use crate::role::Role;

/// Identity of the signed-in user as returned by `/auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub org_id: i64,
}

impl Profile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// A bearer token together with the profile it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub profile: Profile,
}

impl Session {
    pub fn new(token: impl Into<String>, profile: Profile) -> Self {
        Self {
            token: token.into(),
            profile,
        }
    }

    pub fn role(&self) -> Role {
        self.profile.role
    }

    pub fn landing_path(&self) -> &'static str {
        self.profile.role.landing_path()
    }
}

use std::collections::{BTreeMap, HashSet};

use kenko_auth::Role;
use thiserror::Error;

use crate::guard::{Access, RoleSet};
use crate::paths;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteTableError {
    #[error("route {0} is restricted to an empty role set")]
    EmptyRoleSet(String),
    #[error("route {0} is registered twice")]
    DuplicateRoute(String),
    #[error("route pattern {0} must start with '/'")]
    InvalidPattern(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

#[derive(Debug, Clone)]
pub struct RouteRule {
    pattern: String,
    segments: Vec<Segment>,
    access: Access,
}

impl RouteRule {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn access(&self) -> &Access {
        &self.access
    }

    fn capture(&self, parts: &[&str]) -> Option<BTreeMap<String, String>> {
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Static(expected) if expected.as_str() == *part => {}
                Segment::Static(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), (*part).to_string());
                }
            }
        }
        Some(params)
    }
}

/// Outcome of looking a path up in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub pattern: &'a str,
    pub access: &'a Access,
    pub params: BTreeMap<String, String>,
    /// `false` when the path fell through to the catch-all.
    pub found: bool,
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
    fallback: Access,
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// The portal's route surface.
    pub fn kenko() -> Self {
        use Role::*;

        Self::builder()
            .public(paths::HOME)
            .public(paths::UNAUTHORIZED)
            .public(paths::NOT_FOUND)
            .guest(paths::LOGIN)
            .guest(paths::REGISTER)
            .role_redirect(paths::DASHBOARD)
            .restricted(Administrator.landing_path(), [Administrator])
            .restricted(Doctor.landing_path(), [Doctor])
            .restricted(Receptionist.landing_path(), [Receptionist])
            .restricted(Patient.landing_path(), [Patient])
            .restricted(Caregiver.landing_path(), [Caregiver])
            .restricted(paths::ONBOARDING, [Administrator])
            .restricted(paths::PROFESSIONALS, [Administrator])
            .restricted(paths::REPORTS, [Administrator])
            .restricted(paths::AUDIT_LOG, [Administrator])
            .restricted(paths::TELEMEDICINE_ROOM, [Doctor, Patient])
            .authenticated(paths::PATIENTS)
            .authenticated(paths::APPOINTMENTS)
            .authenticated(paths::MEDICAL_HISTORIES)
            .authenticated(paths::DOCUMENTS)
            .authenticated(paths::PROFILE)
            .authenticated(paths::SETTINGS)
            .build()
            .expect("built-in route table is valid")
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    pub fn resolve(&self, path: &str) -> RouteMatch<'_> {
        let parts = split_path(path);

        for rule in &self.rules {
            if let Some(params) = rule.capture(&parts) {
                return RouteMatch {
                    pattern: &rule.pattern,
                    access: &rule.access,
                    params,
                    found: true,
                };
            }
        }

        RouteMatch {
            pattern: paths::NOT_FOUND,
            access: &self.fallback,
            params: BTreeMap::new(),
            found: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    entries: Vec<(String, PendingAccess)>,
}

#[derive(Debug)]
enum PendingAccess {
    Ready(Access),
    Restricted(Vec<Role>),
}

impl RouteTableBuilder {
    pub fn public(self, pattern: &str) -> Self {
        self.push(pattern, PendingAccess::Ready(Access::Public))
    }

    pub fn guest(self, pattern: &str) -> Self {
        self.push(pattern, PendingAccess::Ready(Access::Guest))
    }

    pub fn authenticated(self, pattern: &str) -> Self {
        self.push(pattern, PendingAccess::Ready(Access::Authenticated))
    }

    pub fn role_redirect(self, pattern: &str) -> Self {
        self.push(pattern, PendingAccess::Ready(Access::RoleRedirect))
    }

    pub fn restricted(self, pattern: &str, roles: impl IntoIterator<Item = Role>) -> Self {
        self.push(
            pattern,
            PendingAccess::Restricted(roles.into_iter().collect()),
        )
    }

    fn push(mut self, pattern: &str, access: PendingAccess) -> Self {
        self.entries.push((pattern.to_string(), access));
        self
    }

    pub fn build(self) -> Result<RouteTable, RouteTableError> {
        let mut seen = HashSet::new();
        let mut rules = Vec::with_capacity(self.entries.len());

        for (pattern, access) in self.entries {
            if !pattern.starts_with('/') {
                return Err(RouteTableError::InvalidPattern(pattern));
            }

            let segments: Vec<Segment> = split_path(&pattern)
                .into_iter()
                .map(|part| match part.strip_prefix(':') {
                    Some(name) => Segment::Param(name.to_string()),
                    None => Segment::Static(part.to_string()),
                })
                .collect();

            let shape = segments
                .iter()
                .map(|segment| match segment {
                    Segment::Static(value) => value.as_str(),
                    Segment::Param(_) => ":",
                })
                .collect::<Vec<_>>()
                .join("/");
            if !seen.insert(shape) {
                return Err(RouteTableError::DuplicateRoute(pattern));
            }

            let access = match access {
                PendingAccess::Ready(access) => access,
                PendingAccess::Restricted(roles) => match RoleSet::new(roles) {
                    Some(set) => Access::Roles(set),
                    None => return Err(RouteTableError::EmptyRoleSet(pattern)),
                },
            };

            rules.push(RouteRule {
                pattern,
                segments,
                access,
            });
        }

        Ok(RouteTable {
            rules,
            fallback: Access::Public,
        })
    }
}

fn split_path(path: &str) -> Vec<&str> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').filter(|part| !part.is_empty()).collect()
}

//! # Actors
//!
//! Who is asking for a transition. Identity comes from the external auth
//! provider; the engine trusts the `(id, role)` pair it is handed and only uses it
//! for permission checks and the audit trail.
//!
//! Admins additionally carry a [`CapabilitySet`]: an explicit list of the
//! operations their admin role grants.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Acting role attached to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Va,
    PrintCenter,
    Admin,
    /// Automated callers such as the payment processor.
    System,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Va => "va",
            Self::PrintCenter => "print_center",
            Self::Admin => "admin",
            Self::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Self::Student),
            "va" => Ok(Self::Va),
            "print_center" => Ok(Self::PrintCenter),
            "admin" => Ok(Self::Admin),
            "system" => Ok(Self::System),
            _ => Err(format!("Invalid role: {s}")),
        }
    }
}

/// Operation an admin role may be granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Approve, reject and complete submitted tasks.
    ModerateTasks,
    /// Assign tasks to VAs, quote on their behalf and reassign declined work.
    AssignTasks,
    /// Cancel any print job.
    ManagePrintJobs,
    /// Settle VA payouts.
    ManagePayouts,
    /// Cancel any task.
    CancelAny,
}

impl Capability {
    pub const ALL: [Self; 5] = [
        Self::ModerateTasks,
        Self::AssignTasks,
        Self::ManagePrintJobs,
        Self::ManagePayouts,
        Self::CancelAny,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ModerateTasks => "moderate_tasks",
            Self::AssignTasks => "assign_tasks",
            Self::ManagePrintJobs => "manage_print_jobs",
            Self::ManagePayouts => "manage_payouts",
            Self::CancelAny => "cancel_any",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit set of capabilities held by an admin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every capability; the super-admin set.
    pub fn all() -> Self {
        Capability::ALL.into_iter().collect()
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    pub fn with(mut self, capability: Capability) -> Self {
        self.0.insert(capability);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The `(id, role)` pair behind a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub role: Role,
    #[serde(default)]
    pub capabilities: CapabilitySet,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
            capabilities: CapabilitySet::empty(),
        }
    }

    pub fn student(id: impl Into<String>) -> Self {
        Self::new(id, Role::Student)
    }

    pub fn va(id: impl Into<String>) -> Self {
        Self::new(id, Role::Va)
    }

    pub fn print_center(id: impl Into<String>) -> Self {
        Self::new(id, Role::PrintCenter)
    }

    pub fn admin(id: impl Into<String>, capabilities: CapabilitySet) -> Self {
        Self {
            id: id.into(),
            role: Role::Admin,
            capabilities,
        }
    }

    /// Admin holding every capability.
    pub fn super_admin(id: impl Into<String>) -> Self {
        Self::admin(id, CapabilitySet::all())
    }

    pub fn system(id: impl Into<String>) -> Self {
        Self::new(id, Role::System)
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.role == Role::Admin && self.capabilities.contains(capability)
    }
}

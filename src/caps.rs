//! Role × operation capability table

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{ALL, CREATE, DELETE, EXPORT, LIST, READ_ONLY, REMOVE_SUB, RETRIEVE, UPDATE};

/// Roles a principal can hold towards the partner resource family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Anonymous,
    EndUser,
    PartnerEmployee,
    PartnerOwner,
}

/// Operations the service exposes on banners, widget apps and widgets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    List,
    Retrieve,
    Export,
    Create,
    Update,
    Delete,
    RemoveSubResource,
}

impl Operation {
    pub const EVERY: [Operation; 7] = [
        Operation::List,
        Operation::Retrieve,
        Operation::Export,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
        Operation::RemoveSubResource,
    ];

    /// Capability bit required to perform this operation
    pub fn bit(self) -> u64 {
        match self {
            Operation::List => LIST,
            Operation::Retrieve => RETRIEVE,
            Operation::Export => EXPORT,
            Operation::Create => CREATE,
            Operation::Update => UPDATE,
            Operation::Delete => DELETE,
            Operation::RemoveSubResource => REMOVE_SUB,
        }
    }

    pub fn is_read(self) -> bool {
        self.bit() & READ_ONLY != 0
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::List => "list",
            Operation::Retrieve => "retrieve",
            Operation::Export => "export",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::RemoveSubResource => "remove_sub_resource",
        };
        f.write_str(name)
    }
}

const ROLE_MASKS: &[(Role, u64)] = &[
    (Role::Anonymous, 0),
    (Role::EndUser, 0),
    (Role::PartnerEmployee, READ_ONLY),
    (Role::PartnerOwner, ALL),
];

/// Capability mask granted to a role
pub fn role_mask(role: Role) -> u64 {
    ROLE_MASKS
        .iter()
        .find(|(r, _)| *r == role)
        .map(|(_, m)| *m)
        .unwrap_or(0)
}

/// Check a role against an operation
#[inline]
pub fn allows(role: Role, op: Operation) -> bool {
    let required = op.bit();
    (role_mask(role) & required) == required
}

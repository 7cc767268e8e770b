//! Acting principals

use uuid::Uuid;

use crate::caps::Role;

/// Who is making a request, as resolved by the directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Principal {
    Anonymous,
    EndUser { id: Uuid },
    Employee { id: Uuid, partner: Uuid },
    Owner { id: Uuid, partner: Uuid },
}

impl Principal {
    pub fn role(&self) -> Role {
        match self {
            Principal::Anonymous => Role::Anonymous,
            Principal::EndUser { .. } => Role::EndUser,
            Principal::Employee { .. } => Role::PartnerEmployee,
            Principal::Owner { .. } => Role::PartnerOwner,
        }
    }

    pub fn id(&self) -> Option<Uuid> {
        match self {
            Principal::Anonymous => None,
            Principal::EndUser { id } | Principal::Employee { id, .. } | Principal::Owner { id, .. } => {
                Some(*id)
            }
        }
    }

    /// Partner the principal belongs to, if any
    pub fn partner(&self) -> Option<Uuid> {
        match self {
            Principal::Employee { partner, .. } | Principal::Owner { partner, .. } => Some(*partner),
            _ => None,
        }
    }
}

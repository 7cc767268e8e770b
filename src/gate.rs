//! Role gate - every operation passes through `require` before touching storage

use tracing::debug;
use uuid::Uuid;

use crate::caps::{self, Operation};
use crate::error::{Result, WidgetError};
use crate::model::ResourceKind;
use crate::principal::Principal;

/// What a principal that passed the gate is allowed to see and touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    pub actor: Uuid,
    pub partner: Uuid,
}

impl Scope {
    /// Ownership filter: does a record owned by `partner` fall inside this scope
    #[inline]
    pub fn owns(&self, partner: Uuid) -> bool {
        self.partner == partner
    }
}

/// Check that the principal may perform `op` on `kind` and return its scope
pub fn require(principal: &Principal, kind: ResourceKind, op: Operation) -> Result<Scope> {
    let actor = match principal.id() {
        Some(id) => id,
        None => return Err(WidgetError::Unauthenticated),
    };
    if !caps::allows(principal.role(), op) {
        debug!(%actor, role = ?principal.role(), %op, kind = kind.label(), "denied by role gate");
        return Err(WidgetError::Forbidden);
    }
    // Only partner roles hold capabilities, so a partner is always present here
    let partner = principal.partner().ok_or(WidgetError::Forbidden)?;
    Ok(Scope { actor, partner })
}

/// Parse a path id. A malformed id is as absent as an unknown one.
pub fn target(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| WidgetError::NotFound)
}

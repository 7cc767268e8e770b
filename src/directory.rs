//! Directory: users, partners and their members, image registration
//!
//! These are the collaborators the resource service trusts for role
//! resolution and image metadata. They carry no role gate of their own.

use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::constants::{MSG_ALREADY_MEMBER, MSG_BLANK, MSG_UNKNOWN_USER};
use crate::error::{Result, WidgetError};
use crate::model::{Image, Partner, User};
use crate::principal::Principal;
use crate::read::{get_partner, get_user, partner_of};
use crate::tx::{transact, Tx};
use crate::validate::field_error;

/// Image metadata declared by the upload collaborator
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageUpload {
    pub owner: Uuid,
    pub name: String,
    pub file: String,
    pub file_size: u64,
    pub width: u32,
    pub height: u32,
    pub extension: String,
}

fn existing_user(tx: &mut Tx, id: &Uuid, field: &str) -> Result<User> {
    tx.user(id)?.ok_or_else(|| field_error(field, MSG_UNKNOWN_USER))
}

/// Create a user
pub fn create_user(name: &str) -> Result<User> {
    if name.trim().is_empty() {
        return Err(field_error("name", MSG_BLANK));
    }
    let user = User { id: Uuid::new_v4(), name: name.trim().to_string(), created_at: Utc::now() };
    transact(|tx| tx.put_user(&user))?;
    info!(user = %user.id, "user created");
    Ok(user)
}

/// Create a partner owned by an existing user that belongs to no partner yet
pub fn create_partner(name: &str, owner: &Uuid) -> Result<Partner> {
    if name.trim().is_empty() {
        return Err(field_error("name", MSG_BLANK));
    }
    let partner = transact(|tx| {
        existing_user(tx, owner, "owner")?;
        if tx.membership(owner)?.is_some() {
            return Err(field_error("owner", MSG_ALREADY_MEMBER));
        }
        let p = Partner {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            owner: *owner,
            employees: Vec::new(),
            created_at: Utc::now(),
        };
        tx.put_partner(&p)?;
        tx.set_membership(owner, &p.id)?;
        Ok(p)
    })?;
    info!(partner = %partner.id, owner = %owner, "partner created");
    Ok(partner)
}

/// Make a user an employee of a partner
pub fn add_employee(partner: &Uuid, user: &Uuid) -> Result<()> {
    transact(|tx| {
        let mut p = tx.partner(partner)?.ok_or(WidgetError::NotFound)?;
        existing_user(tx, user, "user")?;
        if tx.membership(user)?.is_some() {
            return Err(field_error("user", MSG_ALREADY_MEMBER));
        }
        p.employees.push(*user);
        tx.put_partner(&p)?;
        tx.set_membership(user, partner)
    })?;
    info!(%partner, %user, "employee added");
    Ok(())
}

/// Remove an employee; returns false when the user was not one
pub fn remove_employee(partner: &Uuid, user: &Uuid) -> Result<bool> {
    let removed = transact(|tx| {
        let mut p = tx.partner(partner)?.ok_or(WidgetError::NotFound)?;
        let before = p.employees.len();
        p.employees.retain(|e| e != user);
        if p.employees.len() == before {
            return Ok(false);
        }
        tx.put_partner(&p)?;
        tx.clear_membership(user)?;
        Ok(true)
    })?;
    if removed {
        info!(%partner, %user, "employee removed");
    }
    Ok(removed)
}

/// Record uploaded image metadata. Bytes are never decoded.
pub fn register_image(upload: ImageUpload) -> Result<Image> {
    let image = transact(|tx| {
        existing_user(tx, &upload.owner, "owner")?;
        let image = Image {
            id: Uuid::new_v4(),
            owner: upload.owner,
            name: upload.name.clone(),
            file: upload.file.clone(),
            file_size: upload.file_size,
            width: upload.width,
            height: upload.height,
            extension: upload.extension.trim_start_matches('.').to_lowercase(),
            created_at: Utc::now(),
        };
        tx.put_image(&image)?;
        Ok(image)
    })?;
    info!(image = %image.id, owner = %image.owner, "image registered");
    Ok(image)
}

/// Resolve a user into the principal it acts as
pub fn principal_for(user: &Uuid) -> Result<Principal> {
    if get_user(user)?.is_none() {
        return Err(WidgetError::NotFound);
    }
    let partner = match partner_of(user)? {
        Some(p) => p,
        None => return Ok(Principal::EndUser { id: *user }),
    };
    match get_partner(&partner)? {
        Some(p) if p.owner == *user => Ok(Principal::Owner { id: *user, partner }),
        Some(p) if p.has_member(*user) => Ok(Principal::Employee { id: *user, partner }),
        _ => Ok(Principal::EndUser { id: *user }),
    }
}

//! Read operations (no role checks, direct LMDB access)

use heed::RoTxn;
use uuid::Uuid;

use crate::db::{get_row, read, Dbs};
use crate::error::{err, Result};
use crate::model::{Image, LinkedRecord, Partner, ResourceKind, User, Widget};
use crate::validate::Lookup;

/// Lookup over an open transaction; writes validate through their own `RwTxn`
pub struct StoreLookup<'a, 't> {
    d: &'a Dbs,
    tx: &'a RoTxn<'t>,
}

impl<'a, 't> StoreLookup<'a, 't> {
    pub fn new(d: &'a Dbs, tx: &'a RoTxn<'t>) -> Self {
        StoreLookup { d, tx }
    }
}

impl Lookup for StoreLookup<'_, '_> {
    fn partner(&self, id: &Uuid) -> Result<Option<Partner>> {
        get_row(&self.d.partners, self.tx, id)
    }

    fn partner_of(&self, user: &Uuid) -> Result<Option<Uuid>> {
        get_row(&self.d.members, self.tx, user)
    }

    fn image(&self, id: &Uuid) -> Result<Option<Image>> {
        get_row(&self.d.images, self.tx, id)
    }

    fn linked(&self, kind: ResourceKind, id: &Uuid) -> Result<Option<LinkedRecord>> {
        self.d.owned(kind).get(self.tx, id)
    }
}

/// Banners or widget apps owned by a partner, unordered
pub(crate) fn linked_for(d: &Dbs, tx: &RoTxn, kind: ResourceKind, partner: &Uuid) -> Result<Vec<LinkedRecord>> {
    d.owned(kind).list_for(tx, partner)
}

pub(crate) fn widgets_for(d: &Dbs, tx: &RoTxn, partner: &Uuid) -> Result<Vec<Widget>> {
    d.widgets.list_for(tx, partner)
}

/// Resolve ids to records, skipping any that vanished
pub(crate) fn linked_many(d: &Dbs, tx: &RoTxn, kind: ResourceKind, ids: &[Uuid]) -> Result<Vec<LinkedRecord>> {
    let mut r = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(rec) = d.owned(kind).get(tx, id)? {
            r.push(rec);
        }
    }
    Ok(r)
}

pub(crate) fn image_in(d: &Dbs, tx: &RoTxn, id: &Uuid) -> Result<Option<Image>> {
    get_row(&d.images, tx, id)
}

/// Get a user
pub fn get_user(id: &Uuid) -> Result<Option<User>> {
    read(|d, tx| get_row(&d.users, tx, id))
}

/// Get a partner
pub fn get_partner(id: &Uuid) -> Result<Option<Partner>> {
    read(|d, tx| get_row(&d.partners, tx, id))
}

/// Get the partner a user belongs to
pub fn partner_of(user: &Uuid) -> Result<Option<Uuid>> {
    read(|d, tx| get_row(&d.members, tx, user))
}

/// Get image metadata
pub fn get_image(id: &Uuid) -> Result<Option<Image>> {
    read(|d, tx| image_in(d, tx, id))
}

/// User a token digest was issued to
pub(crate) fn token_user(digest: &str) -> Result<Option<Uuid>> {
    read(|d, tx| match d.tokens.get(tx, digest).map_err(err)? {
        Some(bytes) => Uuid::from_slice(bytes).map(Some).map_err(err),
        None => Ok(None),
    })
}

/// Count records of a kind across every partner
pub fn count_all(kind: ResourceKind) -> Result<u64> {
    read(|d, tx| d.owned(kind).rows.len(tx).map_err(err))
}

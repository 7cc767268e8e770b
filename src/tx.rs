//! Transaction wrapper for atomic writes

use heed::{RoTxn, RwTxn};
use uuid::Uuid;

use crate::db::{dbs, env, get_row, put_row, Dbs};
use crate::error::{err, Result, WidgetError};
use crate::model::{Image, LinkedRecord, Partner, ResourceKind, User, Widget};
use crate::read::StoreLookup;

/// Transaction wrapper: everything done through one `Tx` commits or aborts together
pub struct Tx {
    txn: Option<RwTxn<'static>>,
    dbs: &'static Dbs,
}

impl Tx {
    #[inline]
    pub(crate) fn new() -> Result<Self> {
        Ok(Tx {
            txn: Some(env()?.write_txn().map_err(err)?),
            dbs: dbs()?,
        })
    }

    #[inline]
    pub(crate) fn tx(&mut self) -> &mut RwTxn<'static> {
        // Only `commit` takes the transaction, and it consumes `self`
        match self.txn.as_mut() {
            Some(t) => t,
            None => unreachable!("transaction used after commit"),
        }
    }

    #[inline]
    pub(crate) fn dbs(&self) -> &'static Dbs {
        self.dbs
    }

    #[inline]
    pub(crate) fn commit(mut self) -> Result<()> {
        match self.txn.take() {
            Some(t) => t.commit().map_err(err),
            None => Err(WidgetError::Storage("transaction already committed".into())),
        }
    }

    /// Validation lookup that sees this transaction's uncommitted writes
    pub(crate) fn lookup(&mut self) -> StoreLookup<'_, 'static> {
        let d = self.dbs;
        let t: &RoTxn<'static> = self.tx();
        StoreLookup::new(d, t)
    }

    /// Next insertion sequence number
    pub fn next_seq(&mut self) -> Result<u64> {
        let d = self.dbs;
        let seq = d.meta.get(self.tx(), "next_seq").map_err(err)?.unwrap_or(1);
        d.meta.put(self.tx(), "next_seq", &(seq + 1)).map_err(err)?;
        Ok(seq)
    }

    // Directory records

    pub fn user(&mut self, id: &Uuid) -> Result<Option<User>> {
        let d = self.dbs;
        get_row(&d.users, self.tx(), id)
    }

    pub fn put_user(&mut self, user: &User) -> Result<()> {
        let d = self.dbs;
        put_row(&d.users, self.tx(), &user.id, user)
    }

    pub fn partner(&mut self, id: &Uuid) -> Result<Option<Partner>> {
        let d = self.dbs;
        get_row(&d.partners, self.tx(), id)
    }

    pub fn put_partner(&mut self, partner: &Partner) -> Result<()> {
        let d = self.dbs;
        put_row(&d.partners, self.tx(), &partner.id, partner)
    }

    /// Partner a user belongs to
    pub fn membership(&mut self, user: &Uuid) -> Result<Option<Uuid>> {
        let d = self.dbs;
        get_row(&d.members, self.tx(), user)
    }

    pub fn set_membership(&mut self, user: &Uuid, partner: &Uuid) -> Result<()> {
        let d = self.dbs;
        put_row(&d.members, self.tx(), user, partner)
    }

    pub fn clear_membership(&mut self, user: &Uuid) -> Result<bool> {
        let d = self.dbs;
        d.members.delete(self.tx(), user.as_bytes()).map_err(err)
    }

    pub fn put_image(&mut self, image: &Image) -> Result<()> {
        let d = self.dbs;
        put_row(&d.images, self.tx(), &image.id, image)
    }

    pub fn put_token(&mut self, digest: &str, user: &Uuid) -> Result<()> {
        let d = self.dbs;
        d.tokens.put(self.tx(), digest, user.as_bytes()).map_err(err)
    }

    pub fn delete_token(&mut self, digest: &str) -> Result<bool> {
        let d = self.dbs;
        d.tokens.delete(self.tx(), digest).map_err(err)
    }

    // Partner-owned resources

    pub fn linked(&mut self, kind: ResourceKind, id: &Uuid) -> Result<Option<LinkedRecord>> {
        let d = self.dbs;
        d.owned(kind).get(self.tx(), id)
    }

    pub fn put_linked(&mut self, kind: ResourceKind, record: &LinkedRecord) -> Result<()> {
        let d = self.dbs;
        d.owned(kind).put(self.tx(), &record.partner, &record.id, record)
    }

    pub fn delete_linked(&mut self, kind: ResourceKind, record: &LinkedRecord) -> Result<bool> {
        let d = self.dbs;
        d.owned(kind).del(self.tx(), &record.partner, &record.id)
    }

    pub fn widget(&mut self, id: &Uuid) -> Result<Option<Widget>> {
        let d = self.dbs;
        d.widgets.get(self.tx(), id)
    }

    pub fn put_widget(&mut self, widget: &Widget) -> Result<()> {
        let d = self.dbs;
        d.widgets.put(self.tx(), &widget.partner, &widget.id, widget)
    }

    pub fn delete_widget(&mut self, widget: &Widget) -> Result<bool> {
        let d = self.dbs;
        d.widgets.del(self.tx(), &widget.partner, &widget.id)
    }

    pub fn widgets_of(&mut self, partner: &Uuid) -> Result<Vec<Widget>> {
        let d = self.dbs;
        d.widgets.list_for(self.tx(), partner)
    }

    /// Drop a banner or widget app from every widget of its partner.
    /// Returns the ids of the widgets that changed.
    pub fn detach_everywhere(&mut self, kind: ResourceKind, record: &LinkedRecord) -> Result<Vec<Uuid>> {
        let mut changed = Vec::new();
        for mut w in self.widgets_of(&record.partner)? {
            let list = match kind {
                ResourceKind::Banner => &mut w.banners,
                ResourceKind::WidgetApp => &mut w.applications,
                ResourceKind::Widget => continue,
            };
            let before = list.len();
            list.retain(|id| *id != record.id);
            if list.len() != before {
                self.put_widget(&w)?;
                changed.push(w.id);
            }
        }
        Ok(changed)
    }
}

/// Run multiple operations in a single transaction
#[inline]
pub fn transact<T, F: FnOnce(&mut Tx) -> Result<T>>(f: F) -> Result<T> {
    let mut tx = Tx::new()?;
    let r = f(&mut tx)?;
    tx.commit()?;
    Ok(r)
}

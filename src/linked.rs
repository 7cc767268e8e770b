//! Operations shared by banners and widget apps
//!
//! Both are partner-owned image cards with a link; they differ only in the
//! image size they accept. `banners` and `widget_apps` fix the kind.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::caps::Operation;
use crate::db::read;
use crate::dispatch::{notify, Notification};
use crate::error::{Result, WidgetError};
use crate::export::{select_columns, to_csv};
use crate::gate::{require, target, Scope};
use crate::listing::{ListQuery, Page};
use crate::model::{LinkedRecord, ResourceKind};
use crate::principal::Principal;
use crate::read::linked_for;
use crate::tx::{transact, Tx};
use crate::validate::{linked_fields, LinkedPayload, Mode};
use crate::views::{linked_view, LinkedView, LinkedWritten};

/// Owned records of `kind`, filtered and ordered by the query
fn scoped(kind: ResourceKind, scope: &Scope, q: &ListQuery) -> Result<Vec<LinkedRecord>> {
    let all = read(|d, tx| linked_for(d, tx, kind, &scope.partner))?;
    Ok(q.apply(all))
}

/// Fetch a record inside the caller's partner, NotFound otherwise
fn owned(tx: &mut Tx, kind: ResourceKind, scope: &Scope, id: &Uuid) -> Result<LinkedRecord> {
    tx.linked(kind, id)?
        .filter(|r| scope.owns(r.partner))
        .ok_or(WidgetError::NotFound)
}

pub(crate) fn list(principal: &Principal, kind: ResourceKind, query: &str) -> Result<Page<LinkedView>> {
    let scope = require(principal, kind, Operation::List)?;
    let q = ListQuery::parse(query)?;
    let page = read(|d, tx| {
        let page = q.paginate(q.apply(linked_for(d, tx, kind, &scope.partner)?));
        page.try_map(|r| linked_view(d, tx, r))
    })?;
    debug!(actor = %scope.actor, kind = kind.label(), count = page.count, "listed");
    Ok(page)
}

pub(crate) fn retrieve(principal: &Principal, kind: ResourceKind, id: &str) -> Result<LinkedView> {
    let scope = require(principal, kind, Operation::Retrieve)?;
    let id = target(id)?;
    read(|d, tx| {
        let rec = d
            .owned(kind)
            .get::<LinkedRecord>(tx, &id)?
            .filter(|r| scope.owns(r.partner))
            .ok_or(WidgetError::NotFound)?;
        linked_view(d, tx, rec)
    })
}

pub(crate) fn create(principal: &Principal, kind: ResourceKind, payload: &LinkedPayload) -> Result<LinkedWritten> {
    let scope = require(principal, kind, Operation::Create)?;
    let rec = transact(|tx| {
        let f = linked_fields(kind, payload, Mode::Create, scope.partner, &tx.lookup())?;
        let (image, name, link) = match (f.image, f.name, f.link) {
            (Some(i), Some(n), Some(l)) => (i, n, l),
            // Create mode reports every missing field as an error
            _ => return Err(WidgetError::Storage("incomplete validated payload".into())),
        };
        let rec = LinkedRecord {
            id: Uuid::new_v4(),
            partner: scope.partner,
            image,
            name,
            link,
            created_at: Utc::now(),
            seq: tx.next_seq()?,
        };
        tx.put_linked(kind, &rec)?;
        Ok(rec)
    })?;
    info!(actor = %scope.actor, id = %rec.id, kind = kind.label(), "created");
    Ok(LinkedWritten::from(&rec))
}

/// Full (`partial == false`) or partial update. `id`, `partner` and `created_at` never change.
pub(crate) fn update(
    principal: &Principal,
    kind: ResourceKind,
    id: &str,
    payload: &LinkedPayload,
    partial: bool,
) -> Result<LinkedWritten> {
    let scope = require(principal, kind, Operation::Update)?;
    let id = target(id)?;
    let mode = if partial { Mode::Patch } else { Mode::Replace };
    let rec = transact(|tx| {
        let mut rec = owned(tx, kind, &scope, &id)?;
        let f = linked_fields(kind, payload, mode, scope.partner, &tx.lookup())?;
        if let Some(image) = f.image {
            rec.image = image;
        }
        if let Some(name) = f.name {
            rec.name = name;
        }
        if let Some(link) = f.link {
            rec.link = link;
        }
        tx.put_linked(kind, &rec)?;
        Ok(rec)
    })?;
    info!(actor = %scope.actor, id = %rec.id, kind = kind.label(), partial, "updated");
    notify([Notification::for_kind(kind, rec.id)]);
    Ok(LinkedWritten::from(&rec))
}

/// Delete a record and detach it from every widget holding it; each changed widget is notified
pub(crate) fn delete(principal: &Principal, kind: ResourceKind, id: &str) -> Result<()> {
    let scope = require(principal, kind, Operation::Delete)?;
    let id = target(id)?;
    let detached = transact(|tx| {
        let rec = owned(tx, kind, &scope, &id)?;
        tx.delete_linked(kind, &rec)?;
        tx.detach_everywhere(kind, &rec)
    })?;
    info!(actor = %scope.actor, %id, kind = kind.label(), widgets = detached.len(), "deleted");
    notify(detached.into_iter().map(Notification::Widget));
    Ok(())
}

pub(crate) fn export(principal: &Principal, kind: ResourceKind, query: &str) -> Result<String> {
    let scope = require(principal, kind, Operation::Export)?;
    let q = ListQuery::parse(query)?;
    let columns = select_columns::<LinkedRecord>(&q.columns)?;
    let rows = scoped(kind, &scope, &q)?;
    debug!(actor = %scope.actor, kind = kind.label(), rows = rows.len(), "exported");
    to_csv(&rows, &columns)
}

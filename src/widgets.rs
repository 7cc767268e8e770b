//! Widgets: a logo, a rotation interval and ordered banner/app collections
//!
//! Updates only ever append to `banners` and `applications`; ids leave a
//! widget through `remove_banners` / `remove_applications` or when the
//! banner or app itself is deleted.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::caps::Operation;
use crate::constants::DEFAULT_CHANGE_FREQUENCY_SECS;
use crate::db::read;
use crate::dispatch::{notify, Notification};
use crate::error::{Result, WidgetError};
use crate::export::{select_columns, to_csv};
use crate::gate::{require, target, Scope};
use crate::listing::{ListQuery, Page};
use crate::model::{ResourceKind, Widget};
use crate::principal::Principal;
use crate::read::widgets_for;
use crate::tx::{transact, Tx};
use crate::validate::{parse_ref, widget_fields, Mode, WidgetPayload};
use crate::views::{widget_view, WidgetView, WidgetWritten};

const KIND: ResourceKind = ResourceKind::Widget;

fn owned(tx: &mut Tx, scope: &Scope, id: &Uuid) -> Result<Widget> {
    tx.widget(id)?
        .filter(|w| scope.owns(w.partner))
        .ok_or(WidgetError::NotFound)
}

/// Append ids not already present, keeping attachment order
fn append(list: &mut Vec<Uuid>, new: Vec<Uuid>) {
    for id in new {
        if !list.contains(&id) {
            list.push(id);
        }
    }
}

pub fn list(principal: &Principal, query: &str) -> Result<Page<WidgetView>> {
    let scope = require(principal, KIND, Operation::List)?;
    let q = ListQuery::parse(query)?;
    let page = read(|d, tx| {
        let page = q.paginate(q.apply(widgets_for(d, tx, &scope.partner)?));
        page.try_map(|w| widget_view(d, tx, w))
    })?;
    debug!(actor = %scope.actor, kind = KIND.label(), count = page.count, "listed");
    Ok(page)
}

pub fn retrieve(principal: &Principal, id: &str) -> Result<WidgetView> {
    let scope = require(principal, KIND, Operation::Retrieve)?;
    let id = target(id)?;
    read(|d, tx| {
        let w = d
            .widgets
            .get::<Widget>(tx, &id)?
            .filter(|w| scope.owns(w.partner))
            .ok_or(WidgetError::NotFound)?;
        widget_view(d, tx, w)
    })
}

/// Create a widget; `change_frequency` defaults to one minute
pub fn create(principal: &Principal, payload: &WidgetPayload) -> Result<WidgetWritten> {
    let scope = require(principal, KIND, Operation::Create)?;
    let w = transact(|tx| {
        let f = widget_fields(payload, Mode::Create, scope.partner, &tx.lookup())?;
        let (logo, name) = match (f.logo, f.name) {
            (Some(l), Some(n)) => (l, n),
            _ => return Err(WidgetError::Storage("incomplete validated payload".into())),
        };
        let w = Widget {
            id: Uuid::new_v4(),
            partner: scope.partner,
            logo,
            name,
            change_frequency_secs: f.change_frequency_secs.unwrap_or(DEFAULT_CHANGE_FREQUENCY_SECS),
            banners: f.banners,
            applications: f.applications,
            created_at: Utc::now(),
            seq: tx.next_seq()?,
        };
        tx.put_widget(&w)?;
        Ok(w)
    })?;
    info!(actor = %scope.actor, id = %w.id, kind = KIND.label(), "created");
    Ok(WidgetWritten::from(&w))
}

fn apply_update(principal: &Principal, id: &str, payload: &WidgetPayload, mode: Mode) -> Result<WidgetWritten> {
    let scope = require(principal, KIND, Operation::Update)?;
    let id = target(id)?;
    let w = transact(|tx| {
        let mut w = owned(tx, &scope, &id)?;
        let f = widget_fields(payload, mode, scope.partner, &tx.lookup())?;
        if let Some(logo) = f.logo {
            w.logo = logo;
        }
        if let Some(name) = f.name {
            w.name = name;
        }
        append(&mut w.banners, f.banners);
        append(&mut w.applications, f.applications);
        tx.put_widget(&w)?;
        Ok(w)
    })?;
    info!(actor = %scope.actor, id = %w.id, kind = KIND.label(), ?mode, "updated");
    notify([Notification::Widget(w.id)]);
    Ok(WidgetWritten::from(&w))
}

/// Full update. `banners` and `applications` are appended, never replaced.
pub fn update(principal: &Principal, id: &str, payload: &WidgetPayload) -> Result<WidgetWritten> {
    apply_update(principal, id, payload, Mode::Replace)
}

pub fn partial_update(principal: &Principal, id: &str, payload: &WidgetPayload) -> Result<WidgetWritten> {
    apply_update(principal, id, payload, Mode::Patch)
}

pub fn delete(principal: &Principal, id: &str) -> Result<()> {
    let scope = require(principal, KIND, Operation::Delete)?;
    let id = target(id)?;
    transact(|tx| {
        let w = owned(tx, &scope, &id)?;
        tx.delete_widget(&w)
    })?;
    info!(actor = %scope.actor, %id, kind = KIND.label(), "deleted");
    Ok(())
}

fn detach(principal: &Principal, id: &str, query: &str, sub: ResourceKind) -> Result<()> {
    let scope = require(principal, KIND, Operation::RemoveSubResource)?;
    let id = target(id)?;
    let q = ListQuery::parse(query)?;
    let ids: Vec<Uuid> = q.ids.iter().filter_map(|raw| parse_ref(raw)).collect();
    let removed = transact(|tx| {
        let mut w = owned(tx, &scope, &id)?;
        let list = match sub {
            ResourceKind::Banner => &mut w.banners,
            _ => &mut w.applications,
        };
        let before = list.len();
        list.retain(|x| !ids.contains(x));
        let removed = before - list.len();
        if removed > 0 {
            tx.put_widget(&w)?;
        }
        Ok(removed)
    })?;
    info!(actor = %scope.actor, %id, sub = sub.label(), removed, "detached");
    if removed > 0 {
        notify([Notification::Widget(id)]);
    }
    Ok(())
}

/// Detach the banners named by `ids` in `query`. Unknown ids are a no-op.
pub fn remove_banners(principal: &Principal, id: &str, query: &str) -> Result<()> {
    detach(principal, id, query, ResourceKind::Banner)
}

/// Detach the widget apps named by `ids` in `query`
pub fn remove_applications(principal: &Principal, id: &str, query: &str) -> Result<()> {
    detach(principal, id, query, ResourceKind::WidgetApp)
}

pub fn export(principal: &Principal, query: &str) -> Result<String> {
    let scope = require(principal, KIND, Operation::Export)?;
    let q = ListQuery::parse(query)?;
    let columns = select_columns::<Widget>(&q.columns)?;
    let rows = q.apply(read(|d, tx| widgets_for(d, tx, &scope.partner))?);
    debug!(actor = %scope.actor, kind = KIND.label(), rows = rows.len(), "exported");
    to_csv(&rows, &columns)
}

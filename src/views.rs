//! Outward representations: nested for reads, ids for writes

use chrono::{DateTime, Utc};
use heed::RoTxn;
use serde::Serialize;
use uuid::Uuid;

use crate::db::Dbs;
use crate::duration;
use crate::error::{Result, WidgetError};
use crate::model::{Image, LinkedRecord, ResourceKind, Widget};
use crate::read::{image_in, linked_many};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageView {
    pub id: Uuid,
    pub owner: Uuid,
    pub name: String,
    pub image: String,
    pub file_size: u64,
    pub created_at: DateTime<Utc>,
}

impl From<Image> for ImageView {
    fn from(i: Image) -> Self {
        ImageView {
            id: i.id,
            owner: i.owner,
            name: i.name,
            image: i.file,
            file_size: i.file_size,
            created_at: i.created_at,
        }
    }
}

/// Banner or widget app as listed and retrieved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkedView {
    pub id: Uuid,
    pub partner: Uuid,
    pub image: ImageView,
    pub name: String,
    pub link: String,
    pub created_at: DateTime<Utc>,
}

/// Banner or widget app as returned by create and update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkedWritten {
    pub id: Uuid,
    pub partner: Uuid,
    pub image: Uuid,
    pub name: String,
    pub link: String,
    pub created_at: DateTime<Utc>,
}

impl From<&LinkedRecord> for LinkedWritten {
    fn from(r: &LinkedRecord) -> Self {
        LinkedWritten {
            id: r.id,
            partner: r.partner,
            image: r.image,
            name: r.name.clone(),
            link: r.link.clone(),
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetView {
    pub id: Uuid,
    pub partner: Uuid,
    pub logo: ImageView,
    pub name: String,
    pub change_frequency: String,
    pub banners: Vec<LinkedView>,
    pub applications: Vec<LinkedView>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetWritten {
    pub id: Uuid,
    pub partner: Uuid,
    pub logo: Uuid,
    pub name: String,
    pub change_frequency: String,
    pub banners: Vec<Uuid>,
    pub applications: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<&Widget> for WidgetWritten {
    fn from(w: &Widget) -> Self {
        WidgetWritten {
            id: w.id,
            partner: w.partner,
            logo: w.logo,
            name: w.name.clone(),
            change_frequency: duration::to_api(w.change_frequency_secs),
            banners: w.banners.clone(),
            applications: w.applications.clone(),
            created_at: w.created_at,
        }
    }
}

fn image_view(d: &Dbs, tx: &RoTxn, id: &Uuid) -> Result<ImageView> {
    image_in(d, tx, id)?
        .map(ImageView::from)
        .ok_or_else(|| WidgetError::Storage(format!("dangling image reference {}", id)))
}

pub(crate) fn linked_view(d: &Dbs, tx: &RoTxn, r: LinkedRecord) -> Result<LinkedView> {
    Ok(LinkedView {
        image: image_view(d, tx, &r.image)?,
        id: r.id,
        partner: r.partner,
        name: r.name,
        link: r.link,
        created_at: r.created_at,
    })
}

pub(crate) fn widget_view(d: &Dbs, tx: &RoTxn, w: Widget) -> Result<WidgetView> {
    let nested = |kind: ResourceKind, ids: &[Uuid]| -> Result<Vec<LinkedView>> {
        linked_many(d, tx, kind, ids)?
            .into_iter()
            .map(|r| linked_view(d, tx, r))
            .collect()
    };
    Ok(WidgetView {
        logo: image_view(d, tx, &w.logo)?,
        banners: nested(ResourceKind::Banner, &w.banners)?,
        applications: nested(ResourceKind::WidgetApp, &w.applications)?,
        change_frequency: duration::to_api(w.change_frequency_secs),
        id: w.id,
        partner: w.partner,
        name: w.name,
        created_at: w.created_at,
    })
}

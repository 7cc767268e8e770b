//! Stored records and resource kinds

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{
    ALLOWED_IMAGE_EXTENSIONS, APP_IMAGE_HEIGHT, APP_IMAGE_WIDTH, BANNER_IMAGE_HEIGHT,
    BANNER_IMAGE_WIDTH,
};

/// A registered user; its role comes from partner membership
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub id: Uuid,
    pub name: String,
    pub owner: Uuid,
    pub employees: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Partner {
    pub fn has_member(&self, user: Uuid) -> bool {
        self.owner == user || self.employees.contains(&user)
    }
}

/// Image metadata as declared by the storage collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: Uuid,
    pub owner: Uuid,
    pub name: String,
    /// Storage path or URL of the file
    pub file: String,
    pub file_size: u64,
    pub width: u32,
    pub height: u32,
    pub extension: String,
    pub created_at: DateTime<Utc>,
}

/// Banner or widget application: an image card pointing at a link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedRecord {
    pub id: Uuid,
    pub partner: Uuid,
    pub image: Uuid,
    pub name: String,
    pub link: String,
    pub created_at: DateTime<Utc>,
    /// Insertion sequence, breaks created_at ties
    pub seq: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub id: Uuid,
    pub partner: Uuid,
    pub logo: Uuid,
    pub name: String,
    pub change_frequency_secs: u64,
    /// Attachment order, newest last
    pub banners: Vec<Uuid>,
    pub applications: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub seq: u64,
}

/// Fields every partner-owned record exposes to listing and export
pub trait Owned {
    fn id(&self) -> Uuid;
    fn partner(&self) -> Uuid;
    fn name(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
    fn seq(&self) -> u64;
}

impl Owned for LinkedRecord {
    fn id(&self) -> Uuid {
        self.id
    }
    fn partner(&self) -> Uuid {
        self.partner
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn seq(&self) -> u64 {
        self.seq
    }
}

impl Owned for Widget {
    fn id(&self) -> Uuid {
        self.id
    }
    fn partner(&self) -> Uuid {
        self.partner
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn seq(&self) -> u64 {
        self.seq
    }
}

/// Required pixel size and extensions for an image slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSpec {
    pub width: u32,
    pub height: u32,
    pub extensions: &'static [&'static str],
}

pub const BANNER_IMAGE: ImageSpec = ImageSpec {
    width: BANNER_IMAGE_WIDTH,
    height: BANNER_IMAGE_HEIGHT,
    extensions: ALLOWED_IMAGE_EXTENSIONS,
};

pub const APP_IMAGE: ImageSpec = ImageSpec {
    width: APP_IMAGE_WIDTH,
    height: APP_IMAGE_HEIGHT,
    extensions: ALLOWED_IMAGE_EXTENSIONS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Banner,
    WidgetApp,
    Widget,
}

impl ResourceKind {
    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Banner => "banner",
            ResourceKind::WidgetApp => "widget_app",
            ResourceKind::Widget => "widget",
        }
    }

    /// Requirements on the resource's image field (`None` for widget logos)
    pub fn image_spec(self) -> Option<ImageSpec> {
        match self {
            ResourceKind::Banner => Some(BANNER_IMAGE),
            ResourceKind::WidgetApp => Some(APP_IMAGE),
            ResourceKind::Widget => None,
        }
    }
}

//! Partner widgets - access-scoped banners, widget apps and widgets
//!
//! Every operation takes the acting [`Principal`], passes the role gate,
//! then only ever sees records owned by the principal's partner.

pub mod auth;
pub mod banners;
pub mod caps;
pub mod config;
pub mod constants;
pub mod db;
pub mod directory;
pub mod dispatch;
pub mod duration;
pub mod error;
pub mod export;
pub mod gate;
mod linked;
pub mod listing;
pub mod logging;
pub mod model;
pub mod principal;
pub mod read;
pub mod tx;
pub mod validate;
pub mod views;
pub mod widget_apps;
pub mod widgets;

#[cfg(feature = "server")]
pub mod server;

pub use caps::{Operation, Role};
pub use db::{backdate, clear_all, init, init_with, test_lock};
pub use dispatch::{set_sink, Notification, NotificationSink};
pub use error::{ErrorEnvelope, FieldErrors, Result, WidgetError};
pub use listing::Page;
pub use model::{Image, LinkedRecord, Partner, ResourceKind, User, Widget};
pub use principal::Principal;
pub use validate::{LinkedPayload, WidgetPayload};

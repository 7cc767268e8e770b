//! Notification dispatcher - fire and forget push notifications
//!
//! Writes enqueue a notification after commit; a background thread hands it to
//! the installed sink. Sink failures are logged and never reach the caller.

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, RwLock};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::db::dispatcher;
use crate::error::{Result, WidgetError};
use crate::model::ResourceKind;

/// One push notification, keyed by the changed top-level resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notification {
    Banner(Uuid),
    WidgetApp(Uuid),
    Widget(Uuid),
}

impl Notification {
    pub fn for_kind(kind: ResourceKind, id: Uuid) -> Self {
        match kind {
            ResourceKind::Banner => Notification::Banner(id),
            ResourceKind::WidgetApp => Notification::WidgetApp(id),
            ResourceKind::Widget => Notification::Widget(id),
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Notification::Banner(id) | Notification::WidgetApp(id) | Notification::Widget(id) => *id,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Notification::Banner(_) => ResourceKind::Banner,
            Notification::WidgetApp(_) => ResourceKind::WidgetApp,
            Notification::Widget(_) => ResourceKind::Widget,
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind().label(), self.id())
    }
}

/// Push transport. Delivery errors are reported as plain strings.
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, notification: &Notification) -> std::result::Result<(), String>;
}

/// Default sink: records the notification in the log
pub struct LogSink;

impl NotificationSink for LogSink {
    fn deliver(&self, notification: &Notification) -> std::result::Result<(), String> {
        debug!(%notification, "push notification");
        Ok(())
    }
}

static SINK: RwLock<Option<Arc<dyn NotificationSink>>> = RwLock::new(None);

/// Install the sink notifications are delivered to
pub fn set_sink(sink: Arc<dyn NotificationSink>) {
    let mut slot = SINK.write().unwrap_or_else(|p| p.into_inner());
    *slot = Some(sink);
}

/// Restore the default log sink
pub fn reset_sink() {
    let mut slot = SINK.write().unwrap_or_else(|p| p.into_inner());
    *slot = None;
}

fn current_sink() -> Arc<dyn NotificationSink> {
    let slot = SINK.read().unwrap_or_else(|p| p.into_inner());
    match slot.as_ref() {
        Some(s) => Arc::clone(s),
        None => Arc::new(LogSink),
    }
}

/// The dispatcher - fire and forget notifications
pub struct Dispatcher {
    tx: Mutex<Sender<Notification>>,
    #[allow(dead_code)]
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel::<Notification>();

        let handle = thread::spawn(move || {
            delivery_loop(rx);
        });

        Dispatcher {
            tx: Mutex::new(tx),
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Submit a notification - fire and forget
    #[inline]
    pub fn submit(&self, notification: Notification) -> Result<()> {
        let tx = self.tx.lock().unwrap_or_else(|p| p.into_inner());
        tx.send(notification)
            .map_err(|_| WidgetError::Storage("Dispatcher closed".into()))
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn delivery_loop(rx: Receiver<Notification>) {
    while let Ok(notification) = rx.recv() {
        if let Err(e) = current_sink().deliver(&notification) {
            warn!(%notification, error = %e, "notification delivery failed");
        }
    }
}

/// Enqueue notifications for committed changes. Never fails the caller.
pub fn notify(notifications: impl IntoIterator<Item = Notification>) {
    let d = match dispatcher() {
        Ok(d) => d,
        Err(e) => {
            warn!(error = %e, "no dispatcher, dropping notifications");
            return;
        }
    };
    for n in notifications {
        if let Err(e) = d.submit(n) {
            warn!(notification = %n, error = %e, "notification not enqueued");
        }
    }
}

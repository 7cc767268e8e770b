//! Shared fixtures: one temp LMDB per test binary, tenants, images, a recording sink
#![allow(dead_code)]

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::time::{Duration, Instant};

use partner_widgets::directory::{self, ImageUpload};
use partner_widgets::views::{LinkedWritten, WidgetWritten};
use partner_widgets::{
    banners, clear_all, init, set_sink, test_lock, widget_apps, widgets, Image, LinkedPayload,
    Notification, NotificationSink, Partner, Principal, WidgetPayload,
};
use tempfile::TempDir;
use uuid::Uuid;

static DIR: OnceLock<TempDir> = OnceLock::new();

pub fn setup() -> MutexGuard<'static, ()> {
    let lock = test_lock();
    let dir = DIR.get_or_init(|| TempDir::new().unwrap());
    init(dir.path().to_str().unwrap()).unwrap();
    clear_all().unwrap();
    lock
}

// ============================================================================
// Tenants
// ============================================================================

/// A partner with one owner and one employee
pub struct Tenant {
    pub partner: Partner,
    pub owner_id: Uuid,
    pub employee_id: Uuid,
    pub owner: Principal,
    pub employee: Principal,
}

pub fn tenant(name: &str) -> Tenant {
    let owner = directory::create_user(&format!("{} owner", name)).unwrap();
    let employee = directory::create_user(&format!("{} employee", name)).unwrap();
    let partner = directory::create_partner(name, &owner.id).unwrap();
    directory::add_employee(&partner.id, &employee.id).unwrap();
    Tenant {
        owner: directory::principal_for(&owner.id).unwrap(),
        employee: directory::principal_for(&employee.id).unwrap(),
        owner_id: owner.id,
        employee_id: employee.id,
        partner,
    }
}

pub fn end_user() -> Principal {
    let user = directory::create_user("end user").unwrap();
    directory::principal_for(&user.id).unwrap()
}

// ============================================================================
// Images and resources
// ============================================================================

pub fn image(owner: &Uuid, width: u32, height: u32, extension: &str) -> Image {
    directory::register_image(ImageUpload {
        owner: *owner,
        name: "upload".into(),
        file: format!("images/{}.{}", Uuid::new_v4(), extension),
        file_size: 1024,
        width,
        height,
        extension: extension.into(),
    })
    .unwrap()
}

pub fn banner_image(owner: &Uuid) -> Image {
    image(owner, 1248, 412, "png")
}

pub fn app_image(owner: &Uuid) -> Image {
    image(owner, 512, 512, "png")
}

pub fn linked_payload(t: &Tenant, image: &Image, name: &str) -> LinkedPayload {
    LinkedPayload {
        partner: Some(t.partner.id.to_string()),
        image: Some(image.id.to_string()),
        name: Some(name.into()),
        link: Some(format!("https://{}.example.com", Uuid::new_v4())),
    }
}

pub fn banner(t: &Tenant, name: &str) -> LinkedWritten {
    let img = banner_image(&t.owner_id);
    banners::create(&t.owner, &linked_payload(t, &img, name)).unwrap()
}

pub fn widget_app(t: &Tenant, name: &str) -> LinkedWritten {
    let img = app_image(&t.owner_id);
    widget_apps::create(&t.owner, &linked_payload(t, &img, name)).unwrap()
}

pub fn widget_payload(t: &Tenant, name: &str, banners: &[Uuid], apps: &[Uuid]) -> WidgetPayload {
    let logo = app_image(&t.owner_id);
    WidgetPayload {
        partner: Some(t.partner.id.to_string()),
        logo: Some(logo.id.to_string()),
        name: Some(name.into()),
        change_frequency: None,
        banners: Some(banners.iter().map(Uuid::to_string).collect()),
        applications: Some(apps.iter().map(Uuid::to_string).collect()),
    }
}

pub fn widget(t: &Tenant, name: &str, banners: &[Uuid], apps: &[Uuid]) -> WidgetWritten {
    widgets::create(&t.owner, &widget_payload(t, name, banners, apps)).unwrap()
}

// ============================================================================
// Notifications
// ============================================================================

struct Recorder(Mutex<Sender<Notification>>);

impl NotificationSink for Recorder {
    fn deliver(&self, n: &Notification) -> Result<(), String> {
        let _ = self.0.lock().unwrap().send(*n);
        Ok(())
    }
}

/// Route notifications into a channel
pub fn record() -> Receiver<Notification> {
    let (tx, rx) = mpsc::channel();
    set_sink(Arc::new(Recorder(Mutex::new(tx))));
    rx
}

/// Every notification delivered within `wait`
pub fn collect(rx: &Receiver<Notification>, wait: Duration) -> Vec<Notification> {
    let deadline = Instant::now() + wait;
    let mut seen = Vec::new();
    while let Some(left) = deadline.checked_duration_since(Instant::now()) {
        match rx.recv_timeout(left) {
            Ok(n) => seen.push(n),
            Err(_) => break,
        }
    }
    seen
}

/// How many times `n` was delivered within half a second
pub fn count_of(rx: &Receiver<Notification>, n: Notification) -> usize {
    collect(rx, Duration::from_millis(500)).into_iter().filter(|x| *x == n).count()
}

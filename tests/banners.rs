//! Banner lifecycle and validation tests

mod common;

use common::*;
use partner_widgets::constants::*;
use partner_widgets::{banners, read, widgets, LinkedPayload, Notification, ResourceKind, WidgetError};
use uuid::Uuid;

fn field<'a>(e: &'a WidgetError, name: &str) -> &'a str {
    e.field_errors()
        .and_then(|f| f.first(name))
        .unwrap_or_else(|| panic!("no error on {name}: {e:?}"))
}

// ============================================================================
// CRUD
// ============================================================================

#[test]
fn create_then_retrieve_nests_the_image() {
    let _lock = setup();
    let t = tenant("acme");
    let img = banner_image(&t.owner_id);
    let payload = linked_payload(&t, &img, "Spring sale");

    let written = banners::create(&t.owner, &payload).unwrap();
    assert_eq!(written.partner, t.partner.id);
    assert_eq!(written.image, img.id);
    assert_eq!(written.name, "Spring sale");

    let view = banners::retrieve(&t.owner, &written.id.to_string()).unwrap();
    assert_eq!(view.id, written.id);
    assert_eq!(read::get_image(&img.id).unwrap().unwrap(), img);
    assert_eq!(view.image.id, img.id);
    assert_eq!(view.image.image, img.file);
    assert_eq!(view.link, payload.link.unwrap());
    assert_eq!(view.created_at, written.created_at);
}

#[test]
fn full_update_replaces_fields_and_keeps_protected_ones() {
    let _lock = setup();
    let t = tenant("acme");
    let other = tenant("rival");
    let b = banner(&t, "old");
    let img = banner_image(&t.owner_id);

    let mut payload = linked_payload(&t, &img, "new");
    payload.partner = Some(other.partner.id.to_string());
    let written = banners::update(&t.owner, &b.id.to_string(), &payload).unwrap();

    assert_eq!(written.id, b.id);
    assert_eq!(written.partner, t.partner.id);
    assert_eq!(written.created_at, b.created_at);
    assert_eq!(written.name, "new");
    assert_eq!(written.image, img.id);
}

#[test]
fn full_update_requires_every_field() {
    let _lock = setup();
    let t = tenant("acme");
    let b = banner(&t, "old");

    let payload = LinkedPayload { name: Some("only name".into()), ..Default::default() };
    let e = banners::update(&t.owner, &b.id.to_string(), &payload).unwrap_err();
    assert_eq!(field(&e, "image"), MSG_REQUIRED);
    assert_eq!(field(&e, "link"), MSG_REQUIRED);
    // Protected on update, so never required
    assert!(!e.field_errors().unwrap().has("partner"));
}

#[test]
fn partial_update_touches_only_given_fields() {
    let _lock = setup();
    let t = tenant("acme");
    let b = banner(&t, "old");

    let payload = LinkedPayload { name: Some("renamed".into()), ..Default::default() };
    let written = banners::partial_update(&t.owner, &b.id.to_string(), &payload).unwrap();
    assert_eq!(written.name, "renamed");
    assert_eq!(written.link, b.link);
    assert_eq!(written.image, b.image);
}

#[test]
fn delete_then_retrieve_is_not_found() {
    let _lock = setup();
    let t = tenant("acme");
    let b = banner(&t, "gone");

    assert_eq!(read::count_all(ResourceKind::Banner).unwrap(), 1);
    banners::delete(&t.owner, &b.id.to_string()).unwrap();
    assert_eq!(read::count_all(ResourceKind::Banner).unwrap(), 0);
    let r = banners::retrieve(&t.owner, &b.id.to_string());
    assert!(matches!(r, Err(WidgetError::NotFound)));
    let r = banners::delete(&t.owner, &b.id.to_string());
    assert!(matches!(r, Err(WidgetError::NotFound)));
}

#[test]
fn malformed_id_is_not_found() {
    let _lock = setup();
    let t = tenant("acme");
    assert!(matches!(banners::retrieve(&t.owner, "42"), Err(WidgetError::NotFound)));
    assert!(matches!(banners::delete(&t.owner, "nope"), Err(WidgetError::NotFound)));
}

#[test]
fn deleting_a_banner_detaches_it_from_widgets() {
    let _lock = setup();
    let t = tenant("acme");
    let keep = banner(&t, "keep");
    let gone = banner(&t, "gone");
    let w = widget(&t, "main", &[keep.id, gone.id], &[]);

    banners::delete(&t.owner, &gone.id.to_string()).unwrap();

    let view = widgets::retrieve(&t.owner, &w.id.to_string()).unwrap();
    let ids: Vec<Uuid> = view.banners.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![keep.id]);
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn create_requires_every_field() {
    let _lock = setup();
    let t = tenant("acme");

    let e = banners::create(&t.owner, &LinkedPayload::default()).unwrap_err();
    for name in ["partner", "image", "name", "link"] {
        assert_eq!(field(&e, name), MSG_REQUIRED, "{name}");
    }
}

#[test]
fn wrong_dimensions_are_rejected() {
    let _lock = setup();
    let t = tenant("acme");
    let img = image(&t.owner_id, 512, 512, "png");

    let e = banners::create(&t.owner, &linked_payload(&t, &img, "x")).unwrap_err();
    assert_eq!(field(&e, "image"), "Image size must be 1248x412px.");
}

#[test]
fn wrong_extension_is_reported_before_dimensions() {
    let _lock = setup();
    let t = tenant("acme");
    let img = image(&t.owner_id, 100, 100, "JPG");

    let e = banners::create(&t.owner, &linked_payload(&t, &img, "x")).unwrap_err();
    assert_eq!(
        field(&e, "image"),
        "File extension “jpg” is not allowed. Allowed extensions are: png."
    );
}

#[test]
fn foreign_image_does_not_exist() {
    let _lock = setup();
    let t = tenant("acme");
    let other = tenant("rival");
    let img = banner_image(&other.owner_id);

    let e = banners::create(&t.owner, &linked_payload(&t, &img, "x")).unwrap_err();
    assert_eq!(field(&e, "image"), msg_does_not_exist(&img.id.to_string()));
}

#[test]
fn image_uploaded_by_an_employee_is_usable() {
    let _lock = setup();
    let t = tenant("acme");
    let img = banner_image(&t.employee_id);
    assert!(banners::create(&t.owner, &linked_payload(&t, &img, "x")).is_ok());
}

#[test]
fn foreign_partner_does_not_exist() {
    let _lock = setup();
    let t = tenant("acme");
    let other = tenant("rival");
    let img = banner_image(&t.owner_id);

    let mut payload = linked_payload(&t, &img, "x");
    payload.partner = Some(other.partner.id.to_string());
    let e = banners::create(&t.owner, &payload).unwrap_err();
    assert_eq!(field(&e, "partner"), msg_does_not_exist(&other.partner.id.to_string()));
}

#[test]
fn blank_and_long_names_are_rejected() {
    let _lock = setup();
    let t = tenant("acme");
    let img = banner_image(&t.owner_id);

    let e = banners::create(&t.owner, &linked_payload(&t, &img, "   ")).unwrap_err();
    assert_eq!(field(&e, "name"), MSG_BLANK);

    let long = "n".repeat(NAME_MAX_LEN + 1);
    let e = banners::create(&t.owner, &linked_payload(&t, &img, &long)).unwrap_err();
    assert_eq!(field(&e, "name"), msg_name_too_long(NAME_MAX_LEN));

    let exact = "n".repeat(NAME_MAX_LEN);
    assert!(banners::create(&t.owner, &linked_payload(&t, &img, &exact)).is_ok());
}

#[test]
fn bad_links_are_rejected() {
    let _lock = setup();
    let t = tenant("acme");
    let img = banner_image(&t.owner_id);

    for link in ["not a url", "mailto:someone@example.com", "https://", "javascript:alert(1)"] {
        let mut payload = linked_payload(&t, &img, "x");
        payload.link = Some(link.into());
        let e = banners::create(&t.owner, &payload).unwrap_err();
        assert_eq!(field(&e, "link"), MSG_INVALID_URL, "{link}");
    }
}

#[test]
fn every_invalid_field_is_reported_together() {
    let _lock = setup();
    let t = tenant("acme");
    let img = image(&t.owner_id, 1, 1, "png");

    let mut payload = linked_payload(&t, &img, "");
    payload.link = Some("nope".into());
    let e = banners::create(&t.owner, &payload).unwrap_err();
    let f = e.field_errors().unwrap();
    assert!(f.has("image") && f.has("name") && f.has("link"));
    assert_eq!(e.status(), 400);
}

#[test]
fn failed_create_stores_nothing() {
    let _lock = setup();
    let t = tenant("acme");
    let _ = banners::create(&t.owner, &LinkedPayload::default());
    assert_eq!(banners::list(&t.owner, "").unwrap().count, 0);
}

// ============================================================================
// Notifications
// ============================================================================

#[test]
fn update_notifies_once_with_the_banner_id() {
    let _lock = setup();
    let rx = record();
    let t = tenant("acme");
    let b = banner(&t, "old");

    let payload = LinkedPayload { name: Some("new".into()), ..Default::default() };
    banners::partial_update(&t.owner, &b.id.to_string(), &payload).unwrap();
    assert_eq!(count_of(&rx, Notification::Banner(b.id)), 1);
}

#[test]
fn create_delete_and_failed_update_do_not_notify() {
    let _lock = setup();
    let rx = record();
    let t = tenant("acme");
    let b = banner(&t, "old");

    let bad = LinkedPayload { link: Some("nope".into()), ..Default::default() };
    assert!(banners::partial_update(&t.owner, &b.id.to_string(), &bad).is_err());
    banners::delete(&t.owner, &b.id.to_string()).unwrap();
    assert_eq!(count_of(&rx, Notification::Banner(b.id)), 0);
}

#[test]
fn delete_notifies_each_widget_it_was_detached_from() {
    let _lock = setup();
    let rx = record();
    let t = tenant("acme");
    let b = banner(&t, "gone");
    let holder = widget(&t, "holder", &[b.id], &[]);
    let bystander = widget(&t, "bystander", &[], &[]);

    banners::delete(&t.owner, &b.id.to_string()).unwrap();
    let seen = collect(&rx, std::time::Duration::from_millis(500));
    assert_eq!(seen.iter().filter(|n| **n == Notification::Widget(holder.id)).count(), 1);
    assert!(!seen.contains(&Notification::Widget(bystander.id)));
    assert!(!seen.contains(&Notification::Banner(b.id)));
}

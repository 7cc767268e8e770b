//! Role gate tests
//!
//! Anonymous callers are unauthenticated everywhere, end users are forbidden
//! everywhere, employees read but never write, owners do everything.

mod common;

use common::*;
use partner_widgets::{banners, widget_apps, widgets, LinkedPayload, Principal, WidgetError, WidgetPayload};
use uuid::Uuid;

/// Run every operation of every resource family as `p`
fn every_operation(p: &Principal, id: &str) -> Vec<(&'static str, Result<(), WidgetError>)> {
    let lp = LinkedPayload::default();
    let wp = WidgetPayload::default();
    vec![
        ("banners::list", banners::list(p, "").map(|_| ())),
        ("banners::retrieve", banners::retrieve(p, id).map(|_| ())),
        ("banners::export", banners::export(p, "").map(|_| ())),
        ("banners::create", banners::create(p, &lp).map(|_| ())),
        ("banners::update", banners::update(p, id, &lp).map(|_| ())),
        ("banners::partial_update", banners::partial_update(p, id, &lp).map(|_| ())),
        ("banners::delete", banners::delete(p, id)),
        ("widget_apps::list", widget_apps::list(p, "").map(|_| ())),
        ("widget_apps::retrieve", widget_apps::retrieve(p, id).map(|_| ())),
        ("widget_apps::export", widget_apps::export(p, "").map(|_| ())),
        ("widget_apps::create", widget_apps::create(p, &lp).map(|_| ())),
        ("widget_apps::update", widget_apps::update(p, id, &lp).map(|_| ())),
        ("widget_apps::partial_update", widget_apps::partial_update(p, id, &lp).map(|_| ())),
        ("widget_apps::delete", widget_apps::delete(p, id)),
        ("widgets::list", widgets::list(p, "").map(|_| ())),
        ("widgets::retrieve", widgets::retrieve(p, id).map(|_| ())),
        ("widgets::export", widgets::export(p, "").map(|_| ())),
        ("widgets::create", widgets::create(p, &wp).map(|_| ())),
        ("widgets::update", widgets::update(p, id, &wp).map(|_| ())),
        ("widgets::partial_update", widgets::partial_update(p, id, &wp).map(|_| ())),
        ("widgets::delete", widgets::delete(p, id)),
        ("widgets::remove_banners", widgets::remove_banners(p, id, &format!("ids={}", Uuid::new_v4()))),
        ("widgets::remove_applications", widgets::remove_applications(p, id, &format!("ids={}", Uuid::new_v4()))),
    ]
}

// ============================================================================
// Anonymous
// ============================================================================

#[test]
fn anonymous_is_unauthenticated_everywhere() {
    let _lock = setup();
    let t = tenant("acme");
    let w = widget(&t, "main", &[], &[]);

    for (name, r) in every_operation(&Principal::Anonymous, &w.id.to_string()) {
        assert!(matches!(r, Err(WidgetError::Unauthenticated)), "{name}: {r:?}");
    }
}

// ============================================================================
// End users
// ============================================================================

#[test]
fn end_user_is_forbidden_everywhere() {
    let _lock = setup();
    let t = tenant("acme");
    let w = widget(&t, "main", &[], &[]);
    let user = end_user();

    for (name, r) in every_operation(&user, &w.id.to_string()) {
        assert!(matches!(r, Err(WidgetError::Forbidden)), "{name}: {r:?}");
    }
}

// ============================================================================
// Employees
// ============================================================================

#[test]
fn employee_reads_succeed() {
    let _lock = setup();
    let t = tenant("acme");
    let b = banner(&t, "spring");
    let a = widget_app(&t, "shop");
    let w = widget(&t, "main", &[b.id], &[a.id]);

    assert_eq!(banners::list(&t.employee, "").unwrap().count, 1);
    assert_eq!(banners::retrieve(&t.employee, &b.id.to_string()).unwrap().id, b.id);
    assert!(banners::export(&t.employee, "").unwrap().contains(&b.id.to_string()));
    assert_eq!(widget_apps::list(&t.employee, "").unwrap().count, 1);
    assert_eq!(widget_apps::retrieve(&t.employee, &a.id.to_string()).unwrap().id, a.id);
    let view = widgets::retrieve(&t.employee, &w.id.to_string()).unwrap();
    assert_eq!(view.banners[0].id, b.id);
    assert_eq!(widgets::list(&t.employee, "").unwrap().count, 1);
}

#[test]
fn employee_writes_are_forbidden() {
    let _lock = setup();
    let t = tenant("acme");
    let w = widget(&t, "main", &[], &[]);

    for (name, r) in every_operation(&t.employee, &w.id.to_string()) {
        let is_read = name.ends_with("list") || name.ends_with("retrieve") || name.ends_with("export");
        if is_read {
            continue;
        }
        assert!(matches!(r, Err(WidgetError::Forbidden)), "{name}: {r:?}");
    }
    // Nothing was changed by the rejected writes
    assert_eq!(widgets::retrieve(&t.owner, &w.id.to_string()).unwrap().name, "main");
}

#[test]
fn gate_answers_before_lookup() {
    let _lock = setup();
    let t = tenant("acme");
    let missing = Uuid::new_v4().to_string();

    let r = banners::update(&t.employee, &missing, &LinkedPayload::default());
    assert!(matches!(r, Err(WidgetError::Forbidden)));
    let r = widgets::delete(&t.employee, &missing);
    assert!(matches!(r, Err(WidgetError::Forbidden)));
    let r = banners::retrieve(&Principal::Anonymous, "not-a-uuid");
    assert!(matches!(r, Err(WidgetError::Unauthenticated)));
}

// ============================================================================
// Owners
// ============================================================================

#[test]
fn owner_can_do_everything() {
    let _lock = setup();
    let t = tenant("acme");
    let b = banner(&t, "spring");
    let a = widget_app(&t, "shop");
    let w = widget(&t, "main", &[b.id], &[a.id]);
    let wid = w.id.to_string();

    assert!(widgets::remove_banners(&t.owner, &wid, &format!("ids={}", b.id)).is_ok());
    assert!(widgets::remove_applications(&t.owner, &wid, &format!("ids={}", a.id)).is_ok());
    assert!(widgets::delete(&t.owner, &wid).is_ok());
    assert!(banners::delete(&t.owner, &b.id.to_string()).is_ok());
    assert!(widget_apps::delete(&t.owner, &a.id.to_string()).is_ok());
}

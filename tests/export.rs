//! CSV export tests

mod common;

use chrono::{TimeZone, Utc};
use common::*;
use partner_widgets::constants::msg_bad_column;
use partner_widgets::{backdate, banners, widget_apps, widgets, ResourceKind};

fn rows(csv: &str) -> Vec<Vec<String>> {
    let mut r = csv::Reader::from_reader(csv.as_bytes());
    let mut out = vec![r.headers().unwrap().iter().map(String::from).collect()];
    for rec in r.records() {
        out.push(rec.unwrap().iter().map(String::from).collect());
    }
    out
}

#[test]
fn banner_export_has_every_column_by_default() {
    let _lock = setup();
    let t = tenant("acme");
    let b = banner(&t, "Spring, sale");

    let table = rows(&banners::export(&t.owner, "").unwrap());
    assert_eq!(table[0], vec!["id", "partner_id", "name", "image_id", "link", "created_at"]);
    assert_eq!(table.len(), 2);
    assert_eq!(table[1][0], b.id.to_string());
    assert_eq!(table[1][1], t.partner.id.to_string());
    // Quoted by the writer, intact after reading back
    assert_eq!(table[1][2], "Spring, sale");
    assert_eq!(table[1][3], b.image.to_string());
}

#[test]
fn column_selection_keeps_default_order() {
    let _lock = setup();
    let t = tenant("acme");
    widget_app(&t, "shop");

    let table = rows(&widget_apps::export(&t.owner, "column=link&column=name").unwrap());
    assert_eq!(table[0], vec!["name", "link"]);
    assert_eq!(table[1][0], "shop");

    let table = rows(&widget_apps::export(&t.owner, "column=id,name").unwrap());
    assert_eq!(table[0], vec!["id", "name"]);
}

#[test]
fn unknown_column_is_rejected() {
    let _lock = setup();
    let t = tenant("acme");
    let e = banners::export(&t.owner, "column=secret").unwrap_err();
    assert_eq!(
        e.field_errors().unwrap().first("column"),
        Some(msg_bad_column("secret").as_str())
    );
}

#[test]
fn widget_export_renders_tabular_duration() {
    let _lock = setup();
    let t = tenant("acme");
    let mut payload = widget_payload(&t, "main", &[], &[]);
    payload.change_frequency = Some("1 01:00:00".into());
    let w = widgets::create(&t.owner, &payload).unwrap();

    let table = rows(&widgets::export(&t.owner, "").unwrap());
    assert_eq!(table[0], vec!["id", "partner_id", "name", "logo_id", "change_frequency", "created_at"]);
    assert_eq!(table[1][3], w.logo.to_string());
    assert_eq!(table[1][4], "1 day, 1:00:00");
}

#[test]
fn export_honors_filters_without_pagination() {
    let _lock = setup();
    let t = tenant("acme");
    for n in ["a", "b", "c"] {
        banner(&t, n);
    }
    let old = banner(&t, "old");
    backdate(ResourceKind::Banner, &old.id, Utc.with_ymd_and_hms(2019, 5, 1, 0, 0, 0).unwrap()).unwrap();

    // limit does not apply to exports
    assert_eq!(rows(&banners::export(&t.owner, "limit=1").unwrap()).len(), 5);

    let table = rows(&banners::export(&t.owner, "created_at__date__lte=2019-12-31").unwrap());
    assert_eq!(table.len(), 2);
    assert_eq!(table[1][2], "old");
}

//! Field and cross-entity validation
//!
//! Everything here is a pure function of the payload, the acting partner and a
//! [`Lookup`]. Writes call it inside their transaction through
//! [`crate::read::StoreLookup`]; unit tests use an in-memory lookup.

use serde::Deserialize;
use uuid::Uuid;

use crate::constants::{
    msg_bad_dimensions, msg_bad_extension, msg_does_not_exist, msg_name_too_long, MSG_BLANK,
    MSG_INVALID_URL, MSG_REQUIRED, NAME_MAX_LEN, VALID_URL_SCHEMES,
};
use crate::duration;
use crate::error::{FieldErrors, Result, WidgetError};
use crate::model::{Image, ImageSpec, LinkedRecord, Partner, ResourceKind};

/// Read access validation needs; implemented over LMDB and in memory
pub trait Lookup {
    fn partner(&self, id: &Uuid) -> Result<Option<Partner>>;
    /// Partner a user belongs to, as owner or employee
    fn partner_of(&self, user: &Uuid) -> Result<Option<Uuid>>;
    fn image(&self, id: &Uuid) -> Result<Option<Image>>;
    fn linked(&self, kind: ResourceKind, id: &Uuid) -> Result<Option<LinkedRecord>>;
}

/// How much of a payload must be present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Every required field, `partner` included
    Create,
    /// Full update: every required field except the protected `partner`
    Replace,
    /// Partial update: only the fields present are checked
    Patch,
}

impl Mode {
    fn requires_all(self) -> bool {
        !matches!(self, Mode::Patch)
    }
}

/// Incoming banner or widget-app fields. Unknown and protected keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LinkedPayload {
    pub partner: Option<String>,
    pub image: Option<String>,
    pub name: Option<String>,
    pub link: Option<String>,
}

/// Incoming widget fields
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WidgetPayload {
    pub partner: Option<String>,
    pub logo: Option<String>,
    pub name: Option<String>,
    pub change_frequency: Option<String>,
    pub banners: Option<Vec<String>>,
    pub applications: Option<Vec<String>>,
}

/// Validated banner or widget-app changes; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkedFields {
    pub image: Option<Uuid>,
    pub name: Option<String>,
    pub link: Option<String>,
}

/// Validated widget changes. `banners` and `applications` are to be appended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetFields {
    pub logo: Option<Uuid>,
    pub name: Option<String>,
    pub change_frequency_secs: Option<u64>,
    pub banners: Vec<Uuid>,
    pub applications: Vec<Uuid>,
}

/// Validate a banner or widget-app payload for `partner`
pub fn linked_fields<L: Lookup + ?Sized>(
    kind: ResourceKind,
    payload: &LinkedPayload,
    mode: Mode,
    partner: Uuid,
    lookup: &L,
) -> Result<LinkedFields> {
    let mut errors = FieldErrors::new();
    if mode == Mode::Create {
        check_partner(payload.partner.as_deref(), partner, lookup, &mut errors)?;
    }
    let mut out = LinkedFields::default();
    match payload.image.as_deref() {
        Some(raw) => {
            if let Some(image) = owned_image(raw, partner, lookup, "image", &mut errors)? {
                if let Some(spec) = kind.image_spec() {
                    if let Err(m) = check_image(&image, &spec) {
                        errors.add("image", m);
                    }
                }
                out.image = Some(image.id);
            }
        }
        None if mode.requires_all() => errors.add("image", MSG_REQUIRED),
        None => {}
    }
    out.name = check_name(payload.name.as_deref(), mode, &mut errors);
    match payload.link.as_deref() {
        Some(raw) => match check_link(raw) {
            Ok(link) => out.link = Some(link),
            Err(m) => errors.add("link", m),
        },
        None if mode.requires_all() => errors.add("link", MSG_REQUIRED),
        None => {}
    }
    errors.into_result()?;
    Ok(out)
}

/// Validate a widget payload for `partner`. `change_frequency` is only read on create.
pub fn widget_fields<L: Lookup + ?Sized>(
    payload: &WidgetPayload,
    mode: Mode,
    partner: Uuid,
    lookup: &L,
) -> Result<WidgetFields> {
    let mut errors = FieldErrors::new();
    if mode == Mode::Create {
        check_partner(payload.partner.as_deref(), partner, lookup, &mut errors)?;
    }
    let mut out = WidgetFields::default();
    match payload.logo.as_deref() {
        Some(raw) => out.logo = owned_image(raw, partner, lookup, "logo", &mut errors)?.map(|i| i.id),
        None if mode.requires_all() => errors.add("logo", MSG_REQUIRED),
        None => {}
    }
    out.name = check_name(payload.name.as_deref(), mode, &mut errors);
    if mode == Mode::Create {
        if let Some(raw) = payload.change_frequency.as_deref() {
            match duration::parse(raw) {
                Ok(secs) => out.change_frequency_secs = Some(secs),
                Err(m) => errors.add("change_frequency", m),
            }
        }
    }
    if let Some(raws) = &payload.banners {
        out.banners = owned_refs(ResourceKind::Banner, raws, partner, lookup, "banners", &mut errors)?;
    }
    if let Some(raws) = &payload.applications {
        out.applications =
            owned_refs(ResourceKind::WidgetApp, raws, partner, lookup, "applications", &mut errors)?;
    }
    errors.into_result()?;
    Ok(out)
}

/// Parse a primary key reference; anything that is not a UUID does not exist
pub fn parse_ref(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

fn check_partner<L: Lookup + ?Sized>(
    raw: Option<&str>,
    partner: Uuid,
    lookup: &L,
    errors: &mut FieldErrors,
) -> Result<()> {
    let raw = match raw {
        Some(r) => r,
        None => {
            errors.add("partner", MSG_REQUIRED);
            return Ok(());
        }
    };
    let found = match parse_ref(raw) {
        Some(id) if id == partner => lookup.partner(&id)?.is_some(),
        _ => false,
    };
    if !found {
        errors.add("partner", msg_does_not_exist(raw));
    }
    Ok(())
}

/// Resolve an image owned by a member of `partner`, recording an error otherwise
fn owned_image<L: Lookup + ?Sized>(
    raw: &str,
    partner: Uuid,
    lookup: &L,
    field: &str,
    errors: &mut FieldErrors,
) -> Result<Option<Image>> {
    if let Some(id) = parse_ref(raw) {
        if let Some(image) = lookup.image(&id)? {
            if lookup.partner_of(&image.owner)? == Some(partner) {
                return Ok(Some(image));
            }
        }
    }
    errors.add(field, msg_does_not_exist(raw));
    Ok(None)
}

fn owned_refs<L: Lookup + ?Sized>(
    kind: ResourceKind,
    raws: &[String],
    partner: Uuid,
    lookup: &L,
    field: &str,
    errors: &mut FieldErrors,
) -> Result<Vec<Uuid>> {
    let mut ids = Vec::with_capacity(raws.len());
    for raw in raws {
        let owned = match parse_ref(raw) {
            Some(id) => lookup.linked(kind, &id)?.filter(|r| r.partner == partner),
            None => None,
        };
        match owned {
            Some(r) if !ids.contains(&r.id) => ids.push(r.id),
            Some(_) => {}
            None => {
                // First failure wins per field
                if !errors.has(field) {
                    errors.add(field, msg_does_not_exist(raw));
                }
            }
        }
    }
    Ok(ids)
}

/// Extension first, then exact dimensions
pub fn check_image(image: &Image, spec: &ImageSpec) -> std::result::Result<(), String> {
    let ext = image.extension.trim_start_matches('.').to_lowercase();
    if !spec.extensions.contains(&ext.as_str()) {
        return Err(msg_bad_extension(&ext, spec.extensions));
    }
    if image.width != spec.width || image.height != spec.height {
        return Err(msg_bad_dimensions(spec.width, spec.height));
    }
    Ok(())
}

fn check_name(raw: Option<&str>, mode: Mode, errors: &mut FieldErrors) -> Option<String> {
    match raw {
        Some(name) if name.trim().is_empty() => errors.add("name", MSG_BLANK),
        Some(name) if name.chars().count() > NAME_MAX_LEN => {
            errors.add("name", msg_name_too_long(NAME_MAX_LEN))
        }
        Some(name) => return Some(name.trim().to_string()),
        None if mode.requires_all() => errors.add("name", MSG_REQUIRED),
        None => {}
    }
    None
}

/// Absolute URL with an allowed scheme and a host
pub fn check_link(raw: &str) -> std::result::Result<String, &'static str> {
    let raw = raw.trim();
    let url = url::Url::parse(raw).map_err(|_| MSG_INVALID_URL)?;
    if !VALID_URL_SCHEMES.contains(&url.scheme()) {
        return Err(MSG_INVALID_URL);
    }
    match url.host_str() {
        Some(h) if !h.is_empty() => Ok(raw.to_string()),
        _ => Err(MSG_INVALID_URL),
    }
}

/// Turn a lone field message into a validation error
pub fn field_error(field: &str, message: impl Into<String>) -> WidgetError {
    WidgetError::Validation(FieldErrors::single(field, message))
}

//! HTTP surface (feature `server`)
//!
//! Thin axum layer over the library: authenticate the `Authorization`
//! header, hand the raw query string and JSON body to the resource
//! operations, map `WidgetError` to a status and error envelope.

use axum::{
    body::Bytes,
    extract::{Path, RawQuery},
    http::{
        header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE, WWW_AUTHENTICATE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::auth::{authenticate_header, SCHEME};
use crate::caps::Operation;
use crate::constants::NON_FIELD_ERRORS;
use crate::error::{FieldErrors, Result, WidgetError};
use crate::gate::require;
use crate::listing::Page;
use crate::model::ResourceKind;
use crate::principal::Principal;
use crate::validate::{LinkedPayload, WidgetPayload};
use crate::views::{LinkedView, LinkedWritten, WidgetView, WidgetWritten};
use crate::{banners, widget_apps, widgets};

impl IntoResponse for WidgetError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        let mut res = (status, Json(self.envelope())).into_response();
        if status == StatusCode::UNAUTHORIZED {
            res.headers_mut().insert(WWW_AUTHENTICATE, HeaderValue::from_static(SCHEME));
        }
        res
    }
}

/// One resource family as seen by the router
trait Resource: Send + Sync + 'static {
    /// Path segment under `/api/`
    const BASE: &'static str;
    const KIND: ResourceKind;
    type Payload: DeserializeOwned + Default + Send;
    type View: Serialize;
    type Written: Serialize;

    fn list(p: &Principal, query: &str) -> Result<Page<Self::View>>;
    fn retrieve(p: &Principal, id: &str) -> Result<Self::View>;
    fn create(p: &Principal, payload: &Self::Payload) -> Result<Self::Written>;
    fn update(p: &Principal, id: &str, payload: &Self::Payload) -> Result<Self::Written>;
    fn partial_update(p: &Principal, id: &str, payload: &Self::Payload) -> Result<Self::Written>;
    fn delete(p: &Principal, id: &str) -> Result<()>;
    fn export(p: &Principal, query: &str) -> Result<String>;
}

struct Banners;
struct WidgetApps;
struct Widgets;

macro_rules! linked_resource {
    ($ty:ident, $module:ident, $kind:expr, $base:literal) => {
        impl Resource for $ty {
            const BASE: &'static str = $base;
            const KIND: ResourceKind = $kind;
            type Payload = LinkedPayload;
            type View = LinkedView;
            type Written = LinkedWritten;

            fn list(p: &Principal, query: &str) -> Result<Page<LinkedView>> {
                $module::list(p, query)
            }
            fn retrieve(p: &Principal, id: &str) -> Result<LinkedView> {
                $module::retrieve(p, id)
            }
            fn create(p: &Principal, payload: &LinkedPayload) -> Result<LinkedWritten> {
                $module::create(p, payload)
            }
            fn update(p: &Principal, id: &str, payload: &LinkedPayload) -> Result<LinkedWritten> {
                $module::update(p, id, payload)
            }
            fn partial_update(p: &Principal, id: &str, payload: &LinkedPayload) -> Result<LinkedWritten> {
                $module::partial_update(p, id, payload)
            }
            fn delete(p: &Principal, id: &str) -> Result<()> {
                $module::delete(p, id)
            }
            fn export(p: &Principal, query: &str) -> Result<String> {
                $module::export(p, query)
            }
        }
    };
}

linked_resource!(Banners, banners, ResourceKind::Banner, "banners");
linked_resource!(WidgetApps, widget_apps, ResourceKind::WidgetApp, "widget-apps");

impl Resource for Widgets {
    const BASE: &'static str = "widgets";
    const KIND: ResourceKind = ResourceKind::Widget;
    type Payload = WidgetPayload;
    type View = WidgetView;
    type Written = WidgetWritten;

    fn list(p: &Principal, query: &str) -> Result<Page<WidgetView>> {
        widgets::list(p, query)
    }
    fn retrieve(p: &Principal, id: &str) -> Result<WidgetView> {
        widgets::retrieve(p, id)
    }
    fn create(p: &Principal, payload: &WidgetPayload) -> Result<WidgetWritten> {
        widgets::create(p, payload)
    }
    fn update(p: &Principal, id: &str, payload: &WidgetPayload) -> Result<WidgetWritten> {
        widgets::update(p, id, payload)
    }
    fn partial_update(p: &Principal, id: &str, payload: &WidgetPayload) -> Result<WidgetWritten> {
        widgets::partial_update(p, id, payload)
    }
    fn delete(p: &Principal, id: &str) -> Result<()> {
        widgets::delete(p, id)
    }
    fn export(p: &Principal, query: &str) -> Result<String> {
        widgets::export(p, query)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn principal(headers: &HeaderMap) -> Result<Principal> {
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    authenticate_header(header)
}

/// Empty body is an empty object; malformed JSON is a non-field error
fn payload<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        WidgetError::Validation(FieldErrors::single(NON_FIELD_ERRORS, format!("JSON parse error - {}", e)))
    })
}

fn reply<T: Serialize>(status: StatusCode, r: Result<T>) -> Response {
    match r {
        Ok(v) => (status, Json(v)).into_response(),
        Err(e) => e.into_response(),
    }
}

fn no_content(r: Result<()>) -> Response {
    match r {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

// ============================================================================
// Handlers
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn list<R: Resource>(headers: HeaderMap, RawQuery(q): RawQuery) -> Response {
    let q = q.unwrap_or_default();
    reply(StatusCode::OK, principal(&headers).and_then(|p| R::list(&p, &q)))
}

async fn create<R: Resource>(headers: HeaderMap, body: Bytes) -> Response {
    let r = principal(&headers).and_then(|p| {
        // The gate answers before the body is judged
        require(&p, R::KIND, Operation::Create)?;
        R::create(&p, &payload::<R::Payload>(&body)?)
    });
    reply(StatusCode::CREATED, r)
}

async fn retrieve<R: Resource>(headers: HeaderMap, Path(id): Path<String>) -> Response {
    reply(StatusCode::OK, principal(&headers).and_then(|p| R::retrieve(&p, &id)))
}

async fn update<R: Resource>(headers: HeaderMap, Path(id): Path<String>, body: Bytes) -> Response {
    let r = principal(&headers).and_then(|p| {
        require(&p, R::KIND, Operation::Update)?;
        R::update(&p, &id, &payload::<R::Payload>(&body)?)
    });
    reply(StatusCode::OK, r)
}

async fn partial_update<R: Resource>(headers: HeaderMap, Path(id): Path<String>, body: Bytes) -> Response {
    let r = principal(&headers).and_then(|p| {
        require(&p, R::KIND, Operation::Update)?;
        R::partial_update(&p, &id, &payload::<R::Payload>(&body)?)
    });
    reply(StatusCode::OK, r)
}

async fn destroy<R: Resource>(headers: HeaderMap, Path(id): Path<String>) -> Response {
    no_content(principal(&headers).and_then(|p| R::delete(&p, &id)))
}

async fn export<R: Resource>(headers: HeaderMap, RawQuery(q): RawQuery) -> Response {
    let q = q.unwrap_or_default();
    match principal(&headers).and_then(|p| R::export(&p, &q)) {
        Ok(csv) => {
            let disposition = format!("attachment; filename=\"{}.csv\"", R::BASE);
            (
                StatusCode::OK,
                [(CONTENT_TYPE, "text/csv; charset=utf-8".to_string()), (CONTENT_DISPOSITION, disposition)],
                csv,
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

async fn remove_banners(headers: HeaderMap, Path(id): Path<String>, RawQuery(q): RawQuery) -> Response {
    let q = q.unwrap_or_default();
    no_content(principal(&headers).and_then(|p| widgets::remove_banners(&p, &id, &q)))
}

async fn remove_widget_apps(headers: HeaderMap, Path(id): Path<String>, RawQuery(q): RawQuery) -> Response {
    let q = q.unwrap_or_default();
    no_content(principal(&headers).and_then(|p| widgets::remove_applications(&p, &id, &q)))
}

fn routes<R: Resource>(app: Router) -> Router {
    let base = format!("/api/{}", R::BASE);
    app.route(&format!("{}/", base), get(list::<R>).post(create::<R>))
        .route(&format!("{}/export-tabular/", base), get(export::<R>))
        .route(
            &format!("{}/:id/", base),
            get(retrieve::<R>)
                .put(update::<R>)
                .patch(partial_update::<R>)
                .delete(destroy::<R>),
        )
}

/// The full application router. Storage must be initialized first.
pub fn router() -> Router {
    let app = Router::new().route("/health", get(health));
    let app = routes::<Widgets>(routes::<WidgetApps>(routes::<Banners>(app)));
    app.route("/api/widgets/:id/remove-banners/", delete(remove_banners))
        .route("/api/widgets/:id/remove-widget-apps/", delete(remove_widget_apps))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

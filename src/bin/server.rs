//! Partner widgets REST API server
//!
//! Run with: cargo run --features server --bin partner-widgets-server [config.toml]
//!
//! Settings come from `config/widgets.*` (or the file given as the first
//! argument) and `WIDGETS__*` environment variables.
//!
//! Endpoints (all under `Authorization: Token <token>`):
//!   GET    /health
//!   GET    /api/{banners,widget-apps,widgets}/                   - List
//!   POST   /api/{banners,widget-apps,widgets}/                   - Create
//!   GET    /api/{banners,widget-apps,widgets}/export-tabular/    - CSV export
//!   GET    /api/{banners,widget-apps,widgets}/:id/               - Retrieve
//!   PUT    /api/{banners,widget-apps,widgets}/:id/               - Update
//!   PATCH  /api/{banners,widget-apps,widgets}/:id/               - Partial update
//!   DELETE /api/{banners,widget-apps,widgets}/:id/               - Delete
//!   DELETE /api/widgets/:id/remove-banners/?ids=...              - Detach banners
//!   DELETE /api/widgets/:id/remove-widget-apps/?ids=...          - Detach apps

use std::path::Path;

use partner_widgets::config::Settings;
use partner_widgets::logging::init_logging;
use partner_widgets::{init_with, server};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load_from(Path::new(&path))?,
        None => Settings::load()?,
    };
    init_logging(&settings.log_filter, settings.log_json);

    init_with(&settings.db_path, settings.map_size)?;

    let app = server::router();
    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %settings.bind_addr,
        db = %settings.db_path,
        "partner-widgets-server listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}

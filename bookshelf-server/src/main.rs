use actix_web::{middleware, web, App, HttpServer};
use bookshelf::{build_schema, BookshelfSchema, Store};
use std::sync::Arc;

mod handlers;

/// Shared application state
pub struct AppState {
    pub schema: BookshelfSchema,
    /// Serve the GraphiQL IDE on `GET /graphql` without a query.
    pub graphiql: bool,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();
    log::info!("Starting bookshelf server");

    let database =
        std::env::var("BOOKSHELF_DATABASE").unwrap_or_else(|_| "bookshelf.db".to_string());
    let host = std::env::var("BOOKSHELF_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("BOOKSHELF_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(5000);
    let graphiql = parse_flag(std::env::var("BOOKSHELF_GRAPHIQL").ok().as_deref(), true);

    log::info!("Opening store at: {database}");
    let store = Store::open(&database).map_err(std::io::Error::other)?;

    let state = web::Data::new(AppState {
        schema: build_schema(Arc::new(store)),
        graphiql,
    });

    log::info!("Listening on http://{host}:{port}/graphql");
    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(handlers::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}

/// Interpret a boolean environment value; unset or unrecognised values fall
/// back to `default`.
fn parse_flag(value: Option<&str>, default: bool) -> bool {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("1" | "true" | "yes" | "on") => true,
        Some("0" | "false" | "no" | "off") => false,
        _ => default,
    }
}

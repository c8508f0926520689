use actix_web::{guard, web, Either, HttpResponse};
use async_graphql::http::GraphiQLSource;
use async_graphql::parser::{
    self,
    types::{DocumentOperations, OperationType},
};
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse};

use crate::AppState;

const GRAPHQL_PATH: &str = "/graphql";

/// Configure all routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index)).service(
        web::resource(GRAPHQL_PATH)
            .route(web::post().to(graphql_post))
            .route(
                web::get()
                    .guard(guard::fn_guard(|ctx| {
                        ctx.head().uri.query().map_or(true, str::is_empty)
                    }))
                    .to(graphiql),
            )
            .route(web::get().to(graphql_get)),
    );
}

// ── Helpers ─────────────────────────────────────────────────────────

fn error_json(mut builder: actix_web::HttpResponseBuilder, message: &str) -> HttpResponse {
    builder.json(serde_json::json!({ "errors": [{ "message": message }] }))
}

/// Whether the operation `request` would run is a mutation.
fn is_mutation(request: &async_graphql::Request) -> bool {
    let Ok(document) = parser::parse_query(&request.query) else {
        // Unparseable documents are reported by the executor.
        return false;
    };
    match &document.operations {
        DocumentOperations::Single(op) => matches!(op.node.ty, OperationType::Mutation),
        DocumentOperations::Multiple(ops) => ops.iter().any(|(name, op)| {
            let selected = request
                .operation_name
                .as_deref()
                .map_or(true, |wanted| name.as_str() == wanted);
            selected && matches!(op.node.ty, OperationType::Mutation)
        }),
    }
}

async fn execute(state: &AppState, request: async_graphql::Request) -> GraphQLResponse {
    let response = state.schema.execute(request).await;
    if response.is_err() {
        log::debug!("GraphQL response carries {} error(s)", response.errors.len());
    }
    response.into()
}

// ── Liveness ────────────────────────────────────────────────────────

async fn index() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Hello World",
        "success": true
    }))
}

// ── GraphQL ─────────────────────────────────────────────────────────

async fn graphql_post(state: web::Data<AppState>, request: GraphQLRequest) -> GraphQLResponse {
    execute(&state, request.into_inner()).await
}

async fn graphql_get(
    state: web::Data<AppState>,
    request: GraphQLRequest,
) -> Either<GraphQLResponse, HttpResponse> {
    let request = request.into_inner();
    if is_mutation(&request) {
        let mut builder = HttpResponse::MethodNotAllowed();
        builder.insert_header(("Allow", "POST"));
        return Either::Right(error_json(
            builder,
            "Can only perform a mutation operation from a POST request.",
        ));
    }
    Either::Left(execute(&state, request).await)
}

async fn graphiql(state: web::Data<AppState>) -> HttpResponse {
    if state.graphiql {
        HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(GraphiQLSource::build().endpoint(GRAPHQL_PATH).finish())
    } else {
        error_json(HttpResponse::BadRequest(), "Must provide query string.")
    }
}

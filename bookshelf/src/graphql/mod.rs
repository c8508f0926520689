//! GraphQL schema for books and authors.
//!
//! The store handle is injected as schema data and read back by each
//! resolver, so a schema can be built around any [`Store`] (in tests, an
//! in-memory one).
//!
//! Root and relationship fields are nullable: a failing field resolves to
//! `null` with an entry in `errors`, and its siblings still resolve.

mod mutation;
mod query;
mod types;

pub use mutation::MutationRoot;
pub use query::QueryRoot;

use crate::error::StoreError;
use crate::store::Store;
use async_graphql::{Context, EmptySubscription, ErrorExtensions, Schema};
use std::sync::Arc;

pub type BookshelfSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the executable schema around a store handle.
pub fn build_schema(store: Arc<Store>) -> BookshelfSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(store)
        .finish()
}

/// Run a store operation for a nullable field.
///
/// A failure is recorded in the response's `errors` at this field's path and
/// the field resolves to `null`, leaving sibling fields untouched.
fn resolve<T>(
    ctx: &Context<'_>,
    op: impl FnOnce(&Store) -> crate::Result<Option<T>>,
) -> Option<T> {
    let result = ctx
        .data::<Arc<Store>>()
        .and_then(|store| op(store.as_ref()).map_err(|e| e.extend()));
    match result {
        Ok(value) => value,
        Err(e) => {
            ctx.add_error(ctx.set_error_path(e.into_server_error(ctx.item.pos)));
            None
        }
    }
}

impl ErrorExtensions for StoreError {
    fn extend(&self) -> async_graphql::Error {
        let message = match self {
            StoreError::UnknownColumn { .. } | StoreError::Sqlite(_) => {
                log::error!("Internal error: {self}");
                "Internal error".to_string()
            }
            _ => self.to_string(),
        };
        async_graphql::Error::new(message)
            .extend_with(|_, e| e.set("code", self.code().to_string()))
    }
}

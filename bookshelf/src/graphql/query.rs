use super::resolve;
use crate::model::{Author, Book};
use async_graphql::{Context, Object};

#[derive(Default)]
pub struct QueryRoot;

/// Root Query
#[Object(name = "Query")]
impl QueryRoot {
    /// A Single Book
    async fn book(&self, ctx: &Context<'_>, id: i32) -> Option<Book> {
        resolve(ctx, |store| store.find_unique(id))
    }

    /// A list of books
    async fn books(&self, ctx: &Context<'_>) -> Option<Vec<Book>> {
        resolve(ctx, |store| store.find_many(None).map(Some))
    }

    /// A Single Author
    async fn author(&self, ctx: &Context<'_>, id: i32) -> Option<Author> {
        resolve(ctx, |store| store.find_unique(id))
    }

    /// A list of authors
    async fn authors(&self, ctx: &Context<'_>) -> Option<Vec<Author>> {
        resolve(ctx, |store| store.find_many(None).map(Some))
    }
}

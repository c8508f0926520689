use super::resolve;
use crate::model::{Author, Book, NewAuthor, NewBook};
use async_graphql::{Context, Object};

#[derive(Default)]
pub struct MutationRoot;

/// Root Mutation
#[Object(name = "Mutation", rename_args = "snake_case")]
impl MutationRoot {
    /// Add a book
    async fn add_book(
        &self,
        ctx: &Context<'_>,
        title: String,
        genre: String,
        author_id: i32,
    ) -> Option<Book> {
        let new_book = NewBook {
            title,
            genre,
            author_id,
        };
        resolve(ctx, |store| store.create(&new_book).map(Some))
    }

    /// Add an Author
    async fn add_author(
        &self,
        ctx: &Context<'_>,
        name: String,
        date_of_birth: String,
        country: String,
    ) -> Option<Author> {
        resolve(ctx, |store| {
            // Parsed before the store is touched.
            let new_author = NewAuthor::parse(name, &date_of_birth, country)?;
            store.create(&new_author).map(Some)
        })
    }
}

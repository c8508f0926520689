use super::resolve;
use crate::model::{Author, Book};
use crate::store::Filter;
use async_graphql::{Context, Object};

/// This represents a book written by an author
#[Object(rename_fields = "snake_case")]
impl Book {
    async fn id(&self) -> i32 {
        self.id
    }

    async fn title(&self) -> &str {
        &self.title
    }

    async fn genre(&self) -> &str {
        &self.genre
    }

    async fn author_id(&self) -> i32 {
        self.author_id
    }

    async fn author(&self, ctx: &Context<'_>) -> Option<Author> {
        resolve(ctx, |store| store.find_one(&Filter::eq("id", self.author_id)))
    }
}

/// A list of all the authors
#[Object(rename_fields = "snake_case")]
impl Author {
    async fn id(&self) -> i32 {
        self.id
    }

    async fn name(&self) -> &str {
        &self.name
    }

    async fn date_of_birth(&self) -> String {
        self.date_of_birth_string()
    }

    async fn country(&self) -> &str {
        &self.country
    }

    async fn books(&self, ctx: &Context<'_>) -> Option<Vec<Book>> {
        resolve(ctx, |store| {
            store
                .find_many(Some(&Filter::eq("author_id", self.id)))
                .map(Some)
        })
    }
}

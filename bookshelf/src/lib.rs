pub mod error;
pub mod graphql;
pub mod model;
pub mod store;

pub use error::{Result, StoreError};
pub use graphql::{build_schema, BookshelfSchema};
pub use model::{Author, Book, NewAuthor, NewBook};
pub use store::{Filter, Store};

mod author;
mod book;

pub use author::{parse_date_of_birth, Author, NewAuthor};
pub use book::{Book, NewBook};

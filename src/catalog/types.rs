//! Core data types for the Shelfmark catalog
//!
//! - `Book`: One catalog record
//! - `BookPatch`: A partial update carrying only the fields to change
//! - `User`: A registered borrower
//! - `UserPatch`: A partial update for a user

use crate::catalog::{CatalogError, CatalogResult};
use crate::store::Patch;
use serde::{Deserialize, Serialize};

/// A single catalog record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Book {
    /// Unique identifier; the ISBN index keys on it exactly
    pub isbn: String,
    pub title: String,
    pub author: String,
    /// Publication year, the ordinal the year statistics track
    pub year: i32,
    pub genre: String,
    /// False while the book is lent out
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl Book {
    /// Create an available book
    pub fn new(
        isbn: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        year: i32,
        genre: impl Into<String>,
    ) -> Self {
        Self {
            isbn: isbn.into(),
            title: title.into(),
            author: author.into(),
            year,
            genre: genre.into(),
            available: true,
        }
    }
}

impl std::fmt::Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = if self.available { "available" } else { "on loan" };
        write!(
            f,
            "ISBN: {}, Title: {}, Author: {}, Year: {}, Genre: {}, Status: {}",
            self.isbn, self.title, self.author, self.year, self.genre, status
        )
    }
}

/// The five books every fresh sample catalog starts with
pub fn sample_books() -> Vec<Book> {
    vec![
        Book::new("978-0142437230", "1984", "George Orwell", 1949, "Science Fiction"),
        Book::new("978-0061120084", "To Kill a Mockingbird", "Harper Lee", 1960, "Fiction"),
        Book::new("978-0544003415", "The Hobbit", "J.R.R. Tolkien", 1937, "Fantasy"),
        Book::new("978-0451524935", "The Great Gatsby", "F. Scott Fitzgerald", 1925, "Fiction"),
        Book::new("978-0141439518", "Pride and Prejudice", "Jane Austen", 1813, "Romance"),
    ]
}

/// Partial update for a [`Book`]
///
/// Only fields set to `Some` are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookPatch {
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub available: Option<bool>,
}

impl BookPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builder method: set author
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Builder method: set ISBN
    pub fn isbn(mut self, isbn: impl Into<String>) -> Self {
        self.isbn = Some(isbn.into());
        self
    }

    /// Builder method: set publication year
    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Builder method: set genre
    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    /// Builder method: set availability
    pub fn available(mut self, available: bool) -> Self {
        self.available = Some(available);
        self
    }

    /// Build from `name=value` style pairs
    ///
    /// Names that are not book fields are skipped. A known field with a
    /// value that does not parse is an error.
    pub fn from_fields<'a, I>(fields: I) -> CatalogResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut patch = Self::default();

        for (name, value) in fields {
            match name {
                "isbn" => patch.isbn = Some(value.to_string()),
                "title" => patch.title = Some(value.to_string()),
                "author" => patch.author = Some(value.to_string()),
                "genre" => patch.genre = Some(value.to_string()),
                "year" => {
                    let year = value.trim().parse().map_err(|_| CatalogError::InvalidField {
                        field: name.to_string(),
                        value: value.to_string(),
                    })?;
                    patch.year = Some(year);
                }
                "available" => {
                    let available = value.trim().parse().map_err(|_| CatalogError::InvalidField {
                        field: name.to_string(),
                        value: value.to_string(),
                    })?;
                    patch.available = Some(available);
                }
                other => tracing::debug!(field = other, "ignoring unknown book field"),
            }
        }

        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether applying this patch can change a key some index derives
    pub fn touches_keys(&self) -> bool {
        self.isbn.is_some() || self.title.is_some() || self.author.is_some()
    }
}

impl Patch<Book> for BookPatch {
    fn apply_to(&self, book: &mut Book) {
        if let Some(isbn) = &self.isbn {
            book.isbn = isbn.clone();
        }
        if let Some(title) = &self.title {
            book.title = title.clone();
        }
        if let Some(author) = &self.author {
            book.author = author.clone();
        }
        if let Some(year) = self.year {
            book.year = year;
        }
        if let Some(genre) = &self.genre {
            book.genre = genre.clone();
        }
        if let Some(available) = self.available {
            book.available = available;
        }
    }
}

/// A registered borrower
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Unique identifier, e.g. `U001`
    pub id: String,
    pub name: String,
    /// Email, phone or address
    pub contact: String,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>, contact: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            contact: contact.into(),
        }
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ID: {}, Name: {}, Contact: {}", self.id, self.name, self.contact)
    }
}

/// The four users every fresh sample catalog starts with
pub fn sample_users() -> Vec<User> {
    vec![
        User::new("U001", "Juan Pérez", "juan@email.com"),
        User::new("U002", "María García", "maria@email.com"),
        User::new("U003", "Carlos Rodríguez", "carlos@email.com"),
        User::new("U004", "Ana López", "ana@email.com"),
    ]
}

/// Partial update for a [`User`]; the id is fixed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
}

impl UserPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = Some(contact.into());
        self
    }
}

impl Patch<User> for UserPatch {
    fn apply_to(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(contact) = &self.contact {
            user.contact = contact.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hobbit() -> Book {
        Book::new("978-0544003415", "The Hobbit", "J.R.R. Tolkien", 1937, "Fantasy")
    }

    #[test]
    fn test_new_book_is_available() {
        let mut book = hobbit();
        assert!(book.available);
        book.available = false;
        assert!(!book.available);
        assert!(book.to_string().contains("on loan"));
    }

    #[test]
    fn test_patch_applies_only_present_fields() {
        let mut book = hobbit();
        BookPatch::new().genre("Classic").year(1938).apply_to(&mut book);

        assert_eq!(book.genre, "Classic");
        assert_eq!(book.year, 1938);
        assert_eq!(book.title, "The Hobbit");
        assert_eq!(book.author, "J.R.R. Tolkien");
    }

    #[test]
    fn test_patch_from_fields_ignores_unknown() {
        let patch = BookPatch::from_fields([("title", "Dune"), ("pages", "412"), ("year", "1965")])
            .unwrap();
        assert_eq!(patch.title.as_deref(), Some("Dune"));
        assert_eq!(patch.year, Some(1965));
        assert!(patch.author.is_none());
    }

    #[test]
    fn test_patch_from_fields_rejects_bad_values() {
        let err = BookPatch::from_fields([("year", "nineteen")]).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidField { .. }));

        assert!(BookPatch::from_fields([("available", "maybe")]).is_err());
    }

    #[test]
    fn test_touches_keys() {
        assert!(!BookPatch::new().year(2000).genre("x").touches_keys());
        assert!(BookPatch::new().title("x").touches_keys());
        assert!(BookPatch::new().author("x").touches_keys());
        assert!(BookPatch::new().isbn("x").touches_keys());
        assert!(BookPatch::new().is_empty());
    }

    #[test]
    fn test_book_serde_defaults_available() {
        let json = r#"{"isbn":"1","title":"t","author":"a","year":2000,"genre":"g"}"#;
        let book: Book = serde_json::from_str(json).unwrap();
        assert!(book.available);
    }

    #[test]
    fn test_user_patch_keeps_id() {
        let mut user = User::new("U001", "Juan Pérez", "juan@email.com");
        UserPatch::new().contact("juan@example.org").apply_to(&mut user);

        assert_eq!(user.id, "U001");
        assert_eq!(user.name, "Juan Pérez");
        assert_eq!(user.contact, "juan@example.org");
        assert_eq!(user.to_string(), "ID: U001, Name: Juan Pérez, Contact: juan@example.org");
    }

    #[test]
    fn test_sample_users() {
        let users = sample_users();
        assert_eq!(users.len(), 4);
        assert_eq!(users[3].id, "U004");
    }

    #[test]
    fn test_sample_books() {
        let books = sample_books();
        assert_eq!(books.len(), 5);
        assert!(books.iter().all(|b| b.available));
    }
}

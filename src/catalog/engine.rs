//! Catalog - coordinates the record store and every index
//!
//! Owns the canonical [`LinkedStore`] of books plus three [`KeyedIndex`]es
//! (ISBN, title, author) and one [`RangeStatsTree`] over publication years.
//! Users live in a second store with a name index; loans are kept in
//! issue order and never deleted.
//!
//! # Mutation Path
//!
//! ```text
//! add_book:    store.append → each index.insert → stats.update(year, +1, 0)
//! update_book: store.update_first_matching → stats move if year changed
//!              → rebuild indexes if a key field changed
//! remove_book: no active loan → stats.update(year, -1, 0) → store.remove
//!              → rebuild indexes
//! lend:        book available, user known → new Loan
//!              → book.available = false → stats.update(loan year, 0, +1)
//! return_loan: loan closed → book.available = true
//! remove_user: no active loan → users.remove → rebuild name index
//! ```
//!
//! Indexes never delete nodes. Any removal or key-affecting change discards
//! them and reinserts every surviving record from the store.

use crate::catalog::{
    Book, BookPatch, CatalogError, CatalogResult, Loan, LoanId, User, UserPatch,
};
use crate::config::CatalogConfig;
use crate::index::{KeyRule, KeyedIndex, RangeStatsTree, RangeTotals};
use crate::store::{LinkedStore, Patch, RecordId};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::ops::RangeInclusive;

fn isbn_rule() -> KeyRule<Book> {
    KeyRule::exact("isbn", |book: &Book| book.isbn.clone())
}

fn title_rule() -> KeyRule<Book> {
    KeyRule::case_insensitive("title", |book: &Book| book.title.clone())
}

fn author_rule() -> KeyRule<Book> {
    KeyRule::case_insensitive("author", |book: &Book| book.author.clone())
}

fn user_name_rule() -> KeyRule<User> {
    KeyRule::case_insensitive("user_name", |user: &User| user.name.clone())
}

/// Summary counters for display
#[derive(Debug, Clone, Serialize)]
pub struct CatalogStats {
    pub total_books: usize,
    pub available: usize,
    pub on_loan: usize,
    pub users: usize,
    pub active_loans: usize,
    /// Books whose year falls inside the tracked domain
    pub tracked_books: i64,
    pub total_loans: i64,
    pub first_year: i32,
    pub last_year: i32,
    pub isbn_index_height: u32,
    pub title_index_height: u32,
    pub author_index_height: u32,
}

impl std::fmt::Display for CatalogStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} books ({} available, {} on loan), {} users, {} active loans, {} tracked in {}-{}, {} loans",
            self.total_books,
            self.available,
            self.on_loan,
            self.users,
            self.active_loans,
            self.tracked_books,
            self.first_year,
            self.last_year,
            self.total_loans
        )
    }
}

/// In-memory book catalog
#[derive(Debug)]
pub struct Catalog {
    books: LinkedStore<Book>,
    by_isbn: KeyedIndex<Book>,
    by_title: KeyedIndex<Book>,
    by_author: KeyedIndex<Book>,
    years: RangeStatsTree,
    users: LinkedStore<User>,
    by_user_name: KeyedIndex<User>,
    loans: Vec<Loan>,
    next_loan: u32,
}

impl Catalog {
    /// Create an empty catalog tracking the configured year range
    pub fn new(config: &CatalogConfig) -> CatalogResult<Self> {
        let years = RangeStatsTree::from_range(config.first_year..=config.last_year)?;

        Ok(Self {
            books: LinkedStore::new(),
            by_isbn: KeyedIndex::new(isbn_rule()),
            by_title: KeyedIndex::new(title_rule()),
            by_author: KeyedIndex::new(author_rule()),
            years,
            users: LinkedStore::new(),
            by_user_name: KeyedIndex::new(user_name_rule()),
            loans: Vec::new(),
            next_loan: 1,
        })
    }

    /// Create a catalog holding the given books
    pub fn from_books<I>(config: &CatalogConfig, books: I) -> CatalogResult<Self>
    where
        I: IntoIterator<Item = Book>,
    {
        let mut catalog = Self::new(config)?;
        for book in books {
            catalog.add_book(book)?;
        }
        tracing::info!(books = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    /// Create a catalog holding the built-in sample books and users
    pub fn with_sample_data(config: &CatalogConfig) -> CatalogResult<Self> {
        let mut catalog = Self::from_books(config, crate::catalog::sample_books())?;
        for user in crate::catalog::sample_users() {
            catalog.add_user(user)?;
        }
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Publication years the statistics track
    pub fn year_domain(&self) -> RangeInclusive<i32> {
        self.years.domain()
    }

    // ==================== Mutation ====================

    /// Add a book, rejecting a duplicate ISBN
    pub fn add_book(&mut self, book: Book) -> CatalogResult<RecordId> {
        if self.by_isbn.find_exact(&book.isbn).is_some() {
            return Err(CatalogError::DuplicateIsbn(book.isbn));
        }

        let year = book.year;
        let id = self.books.append(book);
        self.index_record(id);
        self.years.update(year, 1, 0);

        tracing::debug!(record = %id, year, "book added");
        Ok(id)
    }

    /// Apply a patch to the book with this ISBN
    ///
    /// Moves the book's year contribution when the year changes and rebuilds
    /// the indexes when the patch touches a key field.
    pub fn update_book(&mut self, isbn: &str, patch: &BookPatch) -> CatalogResult<&Book> {
        let id = self
            .by_isbn
            .find_exact(isbn)
            .ok_or_else(|| CatalogError::BookNotFound(isbn.to_string()))?;

        if let Some(new_isbn) = &patch.isbn {
            if new_isbn != isbn && self.by_isbn.find_exact(new_isbn).is_some() {
                return Err(CatalogError::DuplicateIsbn(new_isbn.clone()));
            }
        }

        let old_year = self.book_at(id)?.year;
        self.books.update_first_matching(|book| book.isbn == isbn, patch);
        let new_year = self.book_at(id)?.year;

        if new_year != old_year {
            self.years.update(old_year, -1, 0);
            self.years.update(new_year, 1, 0);
        }

        if patch.touches_keys() {
            self.rebuild_indexes();
        }

        tracing::debug!(record = %id, rebuilt = patch.touches_keys(), "book updated");
        self.book_at(id)
    }

    /// Remove the book with this ISBN and hand it back
    ///
    /// Refused while the book has an active loan.
    pub fn remove_book(&mut self, isbn: &str) -> CatalogResult<Book> {
        if !self.active_loans_by_book(isbn).is_empty() {
            return Err(CatalogError::BookOnLoan(isbn.to_string()));
        }

        let removed = self
            .books
            .take_first_matching(|book| book.isbn == isbn)
            .ok_or_else(|| CatalogError::BookNotFound(isbn.to_string()))?;

        self.years.update(removed.year, -1, 0);
        self.rebuild_indexes();

        tracing::debug!(isbn, "book removed");
        Ok(removed)
    }

    /// Lend a book to a user on `lent_on`
    ///
    /// Counts one loan event against the year of `lent_on`; a date outside
    /// the tracked years still records the loan but is not counted.
    pub fn lend(&mut self, isbn: &str, user_id: &str, lent_on: NaiveDate) -> CatalogResult<LoanId> {
        let book = self.get_mut(isbn)?;
        if !book.available {
            return Err(CatalogError::BookUnavailable(isbn.to_string()));
        }
        if self.find_user(user_id).is_none() {
            return Err(CatalogError::UserNotFound(user_id.to_string()));
        }

        let id = LoanId(self.next_loan);
        self.next_loan += 1;
        self.get_mut(isbn)?.available = false;
        self.loans.push(Loan::new(id, isbn, user_id, lent_on));
        self.years.update(lent_on.year(), 0, 1);

        tracing::debug!(loan = %id, isbn, user_id, %lent_on, "book lent");
        Ok(id)
    }

    /// Close an active loan and make its book available again
    pub fn return_loan(&mut self, id: LoanId, returned_on: NaiveDate) -> CatalogResult<&Loan> {
        let pos = self
            .loans
            .iter()
            .position(|loan| loan.id == id && loan.is_active())
            .ok_or_else(|| CatalogError::LoanNotFound(id.to_string()))?;

        self.loans[pos].close(returned_on);
        let isbn = self.loans[pos].isbn.clone();
        if let Ok(book) = self.get_mut(&isbn) {
            BookPatch::new().available(true).apply_to(book);
        }

        let loan = &self.loans[pos];
        tracing::debug!(loan = %id, %returned_on, overdue = loan.days_overdue(), "loan returned");
        Ok(loan)
    }

    /// Register a user, rejecting a duplicate id
    pub fn add_user(&mut self, user: User) -> CatalogResult<RecordId> {
        if self.find_user(&user.id).is_some() {
            return Err(CatalogError::DuplicateUser(user.id));
        }

        let id = self.users.append(user);
        if let Some(user) = self.users.get(id) {
            self.by_user_name.insert(id, user);
        }

        tracing::debug!(record = %id, "user added");
        Ok(id)
    }

    /// Apply a patch to the user with this id
    pub fn update_user(&mut self, user_id: &str, patch: &UserPatch) -> CatalogResult<&User> {
        let id = self
            .users
            .find_first_id(|user| user.id == user_id)
            .ok_or_else(|| CatalogError::UserNotFound(user_id.to_string()))?;
        if let Some(user) = self.users.get_mut(id) {
            patch.apply_to(user);
        }

        if patch.name.is_some() {
            self.by_user_name.rebuild(self.users.iter());
        }

        tracing::debug!(record = %id, "user updated");
        self.users
            .get(id)
            .ok_or_else(|| CatalogError::UserNotFound(user_id.to_string()))
    }

    /// Remove the user with this id and hand it back
    ///
    /// Refused while the user has active loans.
    pub fn remove_user(&mut self, user_id: &str) -> CatalogResult<User> {
        if !self.active_loans_by_user(user_id).is_empty() {
            return Err(CatalogError::UserHasLoans(user_id.to_string()));
        }

        let removed = self
            .users
            .take_first_matching(|user| user.id == user_id)
            .ok_or_else(|| CatalogError::UserNotFound(user_id.to_string()))?;
        self.by_user_name.rebuild(self.users.iter());

        tracing::debug!(user_id, "user removed");
        Ok(removed)
    }

    /// Discard every index and reinsert all books from the store
    pub fn rebuild_indexes(&mut self) {
        self.by_isbn.rebuild(self.books.iter());
        self.by_title.rebuild(self.books.iter());
        self.by_author.rebuild(self.books.iter());

        debug_assert!(self.by_isbn.check_invariants().is_ok());
        debug_assert!(self.by_title.check_invariants().is_ok());
        debug_assert!(self.by_author.check_invariants().is_ok());
    }

    // ==================== User & Loan Queries ====================

    pub fn find_user(&self, user_id: &str) -> Option<&User> {
        self.users.find_first_matching(|user| user.id == user_id)
    }

    /// Users whose name starts with `prefix`, ignoring case
    pub fn search_users(&self, prefix: &str) -> Vec<&User> {
        self.by_user_name
            .find_by_prefix(prefix)
            .into_iter()
            .filter_map(|id| self.users.get(id))
            .collect()
    }

    /// Every user in registration order
    pub fn list_users(&self) -> Vec<&User> {
        self.users.to_sequence()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn get_loan(&self, id: LoanId) -> Option<&Loan> {
        self.loans.iter().find(|loan| loan.id == id)
    }

    /// Every loan ever issued, oldest first
    pub fn loans(&self) -> &[Loan] {
        &self.loans
    }

    pub fn active_loans(&self) -> Vec<&Loan> {
        self.loans.iter().filter(|loan| loan.is_active()).collect()
    }

    pub fn active_loans_by_user(&self, user_id: &str) -> Vec<&Loan> {
        self.loans
            .iter()
            .filter(|loan| loan.is_active() && loan.user_id == user_id)
            .collect()
    }

    pub fn active_loans_by_book(&self, isbn: &str) -> Vec<&Loan> {
        self.loans
            .iter()
            .filter(|loan| loan.is_active() && loan.isbn == isbn)
            .collect()
    }

    // ==================== Query Methods ====================

    /// Exact ISBN lookup
    pub fn get(&self, isbn: &str) -> Option<&Book> {
        self.by_isbn
            .find_exact(isbn)
            .and_then(|id| self.books.get(id))
    }

    /// Books whose title starts with `prefix`, ignoring case
    pub fn search_title(&self, prefix: &str) -> Vec<&Book> {
        self.resolve(self.by_title.find_by_prefix(prefix))
    }

    /// Books whose author starts with `prefix`, ignoring case
    pub fn search_author(&self, prefix: &str) -> Vec<&Book> {
        self.resolve(self.by_author.find_by_prefix(prefix))
    }

    /// Books published in `[from, to]`, in catalog order
    ///
    /// Linear scan; unlike the statistics this sees every year.
    pub fn books_in_years(&self, from: i32, to: i32) -> Vec<&Book> {
        self.books
            .iter()
            .map(|(_, book)| book)
            .filter(|book| (from..=to).contains(&book.year))
            .collect()
    }

    /// Every book in insertion order
    pub fn list_books(&self) -> Vec<&Book> {
        self.books.to_sequence()
    }

    /// Books not currently on loan
    pub fn available_books(&self) -> Vec<&Book> {
        self.books
            .iter()
            .map(|(_, book)| book)
            .filter(|book| book.available)
            .collect()
    }

    /// Book and loan counts for publication and loan years in `[from, to]`
    pub fn year_stats(&self, from: i32, to: i32) -> RangeTotals {
        self.years.query(from, to)
    }

    /// The `limit` earliest-published books
    pub fn oldest(&self, limit: usize) -> Vec<&Book> {
        let mut books = self.books.to_sequence();
        books.sort_by_key(|book| book.year);
        books.truncate(limit);
        books
    }

    /// The `limit` most recently published books
    pub fn newest(&self, limit: usize) -> Vec<&Book> {
        let mut books = self.books.to_sequence();
        books.sort_by(|a, b| b.year.cmp(&a.year));
        books.truncate(limit);
        books
    }

    pub fn stats(&self) -> CatalogStats {
        let available = self.available_books().len();
        let totals = self.years.totals();
        let domain = self.years.domain();

        CatalogStats {
            total_books: self.len(),
            available,
            on_loan: self.len() - available,
            users: self.users.len(),
            active_loans: self.active_loans().len(),
            tracked_books: totals.records,
            total_loans: totals.events,
            first_year: *domain.start(),
            last_year: *domain.end(),
            isbn_index_height: self.by_isbn.height(),
            title_index_height: self.by_title.height(),
            author_index_height: self.by_author.height(),
        }
    }

    // ==================== Internals ====================

    fn index_record(&mut self, id: RecordId) {
        if let Some(book) = self.books.get(id) {
            self.by_isbn.insert(id, book);
            self.by_title.insert(id, book);
            self.by_author.insert(id, book);
        }
    }

    fn book_at(&self, id: RecordId) -> CatalogResult<&Book> {
        self.books
            .get(id)
            .ok_or_else(|| CatalogError::BookNotFound(id.to_string()))
    }

    fn get_mut(&mut self, isbn: &str) -> CatalogResult<&mut Book> {
        let id = self
            .by_isbn
            .find_exact(isbn)
            .ok_or_else(|| CatalogError::BookNotFound(isbn.to_string()))?;
        self.books
            .get_mut(id)
            .ok_or_else(|| CatalogError::BookNotFound(isbn.to_string()))
    }

    fn resolve(&self, ids: Vec<RecordId>) -> Vec<&Book> {
        ids.into_iter().filter_map(|id| self.books.get(id)).collect()
    }
}

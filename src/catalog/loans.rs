//! Loan records
//!
//! A [`Loan`] ties one book to one user from the day it is lent until the
//! day it comes back. Loans are never deleted; a returned loan stays as
//! history with its return date.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Days a book may be kept before a return counts as overdue
pub const LOAN_PERIOD_DAYS: i64 = 15;

/// Sequential loan identifier, shown as `P001`, `P002`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoanId(pub(crate) u32);

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{:03}", self.0)
    }
}

impl FromStr for LoanId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix('P')
            .or_else(|| s.strip_prefix('p'))
            .and_then(|digits| digits.parse().ok())
            .map(LoanId)
            .ok_or_else(|| format!("not a loan id: {:?}", s))
    }
}

impl Serialize for LoanId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One lending of a book to a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Loan {
    pub id: LoanId,
    pub isbn: String,
    pub user_id: String,
    pub lent_on: NaiveDate,
    /// Set once the book comes back
    pub returned_on: Option<NaiveDate>,
}

impl Loan {
    pub(crate) fn new(
        id: LoanId,
        isbn: impl Into<String>,
        user_id: impl Into<String>,
        lent_on: NaiveDate,
    ) -> Self {
        Self {
            id,
            isbn: isbn.into(),
            user_id: user_id.into(),
            lent_on,
            returned_on: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.returned_on.is_none()
    }

    /// Last day the book may be returned without being overdue
    pub fn due_on(&self) -> NaiveDate {
        self.lent_on + chrono::Duration::days(LOAN_PERIOD_DAYS)
    }

    pub(crate) fn close(&mut self, returned_on: NaiveDate) {
        self.returned_on = Some(returned_on);
    }

    /// Days past the due date at return; 0 while still active
    pub fn days_overdue(&self) -> i64 {
        match self.returned_on {
            Some(returned_on) => (returned_on - self.due_on()).num_days().max(0),
            None => 0,
        }
    }
}

impl fmt::Display for Loan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {}, Book: {}, User: {}, Lent: {}",
            self.id, self.isbn, self.user_id, self.lent_on
        )?;
        match self.returned_on {
            Some(returned_on) => write!(f, ", Returned: {}, Status: closed", returned_on),
            None => write!(f, ", Status: active"),
        }
    }
}

//! Remote collaborator contracts for the expense-splitting half.
//!
//! # Responsibility
//! - Define the session provider and document store interfaces the core
//!   consumes; hosted backends implement them outside this crate.
//! - Provide in-memory implementations and the ledger facade built on them.
//!
//! # Invariants
//! - Every remote call can fail with a `RemoteError` carrying a
//!   human-readable message; retries are the caller's concern.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod ledger;
pub mod memory;

pub type RemoteResult<T> = Result<T, RemoteError>;
pub type DocumentFields = Map<String, Value>;

/// Generic remote failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    pub message: String,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for RemoteError {}

/// Authenticated account as reported by the session provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub id: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub account_id: String,
}

/// Sign-up form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Stored document with server-assigned metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub collection: String,
    pub created_at: DateTime<Utc>,
    pub fields: DocumentFields,
}

impl Document {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

/// Id to create a document under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewDocumentId {
    /// Let the store assign a unique id.
    Unique,
    Custom(String),
}

/// List predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentQuery {
    /// Field equals `value`; for array fields, the array contains `value`.
    Equal { field: String, value: Value },
    /// Newest documents first.
    OrderDescCreatedAt,
}

impl DocumentQuery {
    pub fn equal(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Equal {
            field: field.into(),
            value: value.into(),
        }
    }
}

pub trait SessionProvider {
    /// Account of the active session, or `None` when signed out.
    fn current_user(&self) -> RemoteResult<Option<AccountInfo>>;
    fn sign_in(&self, email: &str, password: &str) -> RemoteResult<Session>;
    fn sign_out(&self) -> RemoteResult<()>;
    fn create_account(&self, account: &NewAccount) -> RemoteResult<AccountInfo>;
}

pub trait DocumentStore {
    fn create_document(
        &self,
        collection: &str,
        id: NewDocumentId,
        fields: DocumentFields,
    ) -> RemoteResult<Document>;
    fn list_documents(
        &self,
        collection: &str,
        queries: &[DocumentQuery],
    ) -> RemoteResult<Vec<Document>>;
    fn get_document(&self, collection: &str, id: &str) -> RemoteResult<Document>;
    fn delete_document(&self, collection: &str, id: &str) -> RemoteResult<()>;
}

//! In-memory implementations of the remote contracts.
//!
//! Used by tests and offline demos. Both types can be switched offline to
//! exercise failure paths.

use super::{
    AccountInfo, Document, DocumentFields, DocumentQuery, DocumentStore, NewAccount,
    NewDocumentId, RemoteError, RemoteResult, Session, SessionProvider,
};
use chrono::Utc;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

const OFFLINE_MESSAGE: &str = "network request failed: backend unreachable";

fn lock<T>(mutex: &Mutex<T>) -> RemoteResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| RemoteError::new("in-memory backend lock poisoned"))
}

#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<BTreeMap<String, Vec<Document>>>,
    offline: AtomicBool,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every call fails with a `RemoteError`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> RemoteResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::new(OFFLINE_MESSAGE));
        }
        Ok(())
    }
}

fn matches(document: &Document, query: &DocumentQuery) -> bool {
    match query {
        DocumentQuery::Equal { field, value } => match document.field(field) {
            Some(Value::Array(items)) => items.contains(value),
            Some(found) => found == value,
            None => false,
        },
        DocumentQuery::OrderDescCreatedAt => true,
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn create_document(
        &self,
        collection: &str,
        id: NewDocumentId,
        fields: DocumentFields,
    ) -> RemoteResult<Document> {
        self.ensure_online()?;
        let mut collections = lock(&self.collections)?;
        let documents = collections.entry(collection.to_string()).or_default();

        let id = match id {
            NewDocumentId::Unique => Uuid::new_v4().simple().to_string(),
            NewDocumentId::Custom(id) => id,
        };
        if documents.iter().any(|document| document.id == id) {
            return Err(RemoteError::new(format!(
                "document with the requested id already exists: {id}"
            )));
        }

        let document = Document {
            id,
            collection: collection.to_string(),
            created_at: Utc::now(),
            fields,
        };
        documents.push(document.clone());
        Ok(document)
    }

    fn list_documents(
        &self,
        collection: &str,
        queries: &[DocumentQuery],
    ) -> RemoteResult<Vec<Document>> {
        self.ensure_online()?;
        let collections = lock(&self.collections)?;
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let newest_first = queries.contains(&DocumentQuery::OrderDescCreatedAt);
        let mut listed: Vec<Document> = documents
            .iter()
            .filter(|document| queries.iter().all(|query| matches(document, query)))
            .cloned()
            .collect();
        if newest_first {
            // Reverse first so equal timestamps still come out newest first.
            listed.reverse();
            listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        Ok(listed)
    }

    fn get_document(&self, collection: &str, id: &str) -> RemoteResult<Document> {
        self.ensure_online()?;
        let collections = lock(&self.collections)?;
        collections
            .get(collection)
            .and_then(|documents| documents.iter().find(|document| document.id == id))
            .cloned()
            .ok_or_else(|| RemoteError::new(format!("document not found: {collection}/{id}")))
    }

    fn delete_document(&self, collection: &str, id: &str) -> RemoteResult<()> {
        self.ensure_online()?;
        let mut collections = lock(&self.collections)?;
        let documents = collections
            .get_mut(collection)
            .ok_or_else(|| RemoteError::new(format!("document not found: {collection}/{id}")))?;
        let before = documents.len();
        documents.retain(|document| document.id != id);
        if documents.len() == before {
            return Err(RemoteError::new(format!(
                "document not found: {collection}/{id}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct SessionState {
    accounts: Vec<(AccountInfo, String)>,
    active: Option<Session>,
}

#[derive(Debug, Default)]
pub struct MemorySessionProvider {
    state: Mutex<SessionState>,
    offline: AtomicBool,
}

impl MemorySessionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> RemoteResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::new(OFFLINE_MESSAGE));
        }
        Ok(())
    }
}

impl SessionProvider for MemorySessionProvider {
    fn current_user(&self) -> RemoteResult<Option<AccountInfo>> {
        self.ensure_online()?;
        let state = lock(&self.state)?;
        let Some(session) = state.active.as_ref() else {
            return Ok(None);
        };
        Ok(state
            .accounts
            .iter()
            .find(|(account, _)| account.id == session.account_id)
            .map(|(account, _)| account.clone()))
    }

    fn sign_in(&self, email: &str, password: &str) -> RemoteResult<Session> {
        self.ensure_online()?;
        let mut state = lock(&self.state)?;
        let account_id = state
            .accounts
            .iter()
            .find(|(account, secret)| account.email == email && secret == password)
            .map(|(account, _)| account.id.clone())
            .ok_or_else(|| RemoteError::new("invalid credentials: check the email and password"))?;

        let session = Session {
            id: Uuid::new_v4().simple().to_string(),
            account_id,
        };
        state.active = Some(session.clone());
        Ok(session)
    }

    fn sign_out(&self) -> RemoteResult<()> {
        self.ensure_online()?;
        let mut state = lock(&self.state)?;
        if state.active.take().is_none() {
            return Err(RemoteError::new("no active session"));
        }
        Ok(())
    }

    fn create_account(&self, account: &NewAccount) -> RemoteResult<AccountInfo> {
        self.ensure_online()?;
        let mut state = lock(&self.state)?;
        if state
            .accounts
            .iter()
            .any(|(existing, _)| existing.email.eq_ignore_ascii_case(&account.email))
        {
            return Err(RemoteError::new(
                "a user with the same email already exists",
            ));
        }

        let info = AccountInfo {
            id: Uuid::new_v4().simple().to_string(),
            email: account.email.clone(),
            name: account.name.clone(),
        };
        state.accounts.push((info.clone(), account.password.clone()));
        Ok(info)
    }
}

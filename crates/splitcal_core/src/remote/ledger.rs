//! Expense ledger facade over the remote contracts.
//!
//! # Responsibility
//! - Provide account, group, expense, settlement and friend operations.
//! - Validate expense input before any remote call.
//!
//! # Invariants
//! - Remote failures are logged with the operation name and propagated.
//! - Expense and settlement documents carry a creation timestamp from the
//!   ledger clock.

use super::{
    AccountInfo, Document, DocumentFields, DocumentQuery, DocumentStore, NewAccount,
    NewDocumentId, RemoteError, RemoteResult, Session, SessionProvider,
};
use crate::config::RemoteCollections;
use crate::model::event::format_event_date;
use crate::service::clock::{Clock, SystemClock};
use log::{error, info, warn};
use serde_json::{json, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type LedgerResult<T> = Result<T, LedgerError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Input rejected before contacting the backend.
    Validation(String),
    /// A lookup by a natural key found nothing.
    NotFound(String),
    Remote(RemoteError),
}

impl Display for LedgerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "{message}"),
            Self::NotFound(what) => write!(f, "{what} not found"),
            Self::Remote(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LedgerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Remote(err) => Some(err),
            Self::Validation(_) | Self::NotFound(_) => None,
        }
    }
}

impl From<RemoteError> for LedgerError {
    fn from(value: RemoteError) -> Self {
        Self::Remote(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroup {
    pub creator_id: String,
    pub group_name: String,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    pub description: String,
    pub paid_by: String,
    pub group: String,
    pub split_members: Vec<String>,
    /// Amount as entered; stored verbatim.
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSettlement {
    pub payer_id: String,
    pub receiver_id: String,
    pub amount: f64,
}

pub struct ExpenseLedger<D: DocumentStore, P: SessionProvider, C: Clock = SystemClock> {
    documents: D,
    session: P,
    collections: RemoteCollections,
    clock: C,
}

impl<D: DocumentStore, P: SessionProvider> ExpenseLedger<D, P, SystemClock> {
    pub fn new(documents: D, session: P, collections: RemoteCollections) -> Self {
        Self::with_clock(documents, session, collections, SystemClock)
    }
}

impl<D: DocumentStore, P: SessionProvider, C: Clock> ExpenseLedger<D, P, C> {
    pub fn with_clock(documents: D, session: P, collections: RemoteCollections, clock: C) -> Self {
        Self {
            documents,
            session,
            collections,
            clock,
        }
    }

    pub fn documents(&self) -> &D {
        &self.documents
    }

    pub fn session(&self) -> &P {
        &self.session
    }

    /// Creates the account, its user document and an empty friends list.
    pub fn create_user_account(&self, account: &NewAccount) -> LedgerResult<Document> {
        let created: AccountInfo = logged("create_account", self.session.create_account(account))?;
        let user = logged(
            "save_user",
            self.documents.create_document(
                &self.collections.users,
                NewDocumentId::Unique,
                fields(json!({
                    "UserName": account.username,
                    "email": created.email,
                    "accountId": created.id,
                    "name": created.name,
                })),
            ),
        )?;
        logged(
            "create_friends_list",
            self.documents.create_document(
                &self.collections.friends,
                NewDocumentId::Unique,
                fields(json!({ "CollectionId": user.id })),
            ),
        )?;
        info!("event=account_create module=ledger status=ok");
        Ok(user)
    }

    pub fn sign_in(&self, email: &str, password: &str) -> LedgerResult<Session> {
        logged("sign_in", self.session.sign_in(email, password))
    }

    pub fn sign_out(&self) -> LedgerResult<()> {
        logged("sign_out", self.session.sign_out())
    }

    /// User document of the signed-in account.
    ///
    /// Any failure, including a missing session, reads as `None`.
    pub fn current_user(&self) -> Option<Document> {
        let account = match self.session.current_user() {
            Ok(Some(account)) => account,
            Ok(None) => return None,
            Err(err) => {
                warn!("event=ledger_call module=ledger status=error op=current_account error={err}");
                return None;
            }
        };
        match self.documents.list_documents(
            &self.collections.users,
            &[DocumentQuery::equal("accountId", account.id)],
        ) {
            Ok(users) => users.into_iter().next(),
            Err(err) => {
                warn!("event=ledger_call module=ledger status=error op=current_user error={err}");
                None
            }
        }
    }

    pub fn create_group(&self, group: &NewGroup) -> LedgerResult<Document> {
        logged(
            "create_group",
            self.documents.create_document(
                &self.collections.groups,
                NewDocumentId::Unique,
                fields(json!({
                    "Creator": group.creator_id,
                    "groupName": group.group_name,
                    "Members": group.members,
                })),
            ),
        )
    }

    pub fn create_expense(&self, expense: &NewExpense) -> LedgerResult<Document> {
        require(&expense.description, "Description is required.")?;
        require(&expense.paid_by, "PaidBy is required.")?;
        require(&expense.group, "Group is required.")?;
        if expense.split_members.is_empty() {
            return Err(LedgerError::Validation(
                "SplitMember is required and should be a non-empty list.".to_string(),
            ));
        }
        require(&expense.amount, "Amount is required.")?;

        logged(
            "create_expense",
            self.documents.create_document(
                &self.collections.activity,
                NewDocumentId::Unique,
                fields(json!({
                    "Desc": expense.description,
                    "PaidBy": expense.paid_by,
                    "Group": expense.group,
                    "Time": format_event_date(&self.clock.now()),
                    "splitMember": expense.split_members,
                    "Amount": expense.amount,
                })),
            ),
        )
    }

    pub fn make_settlement(&self, settlement: &NewSettlement) -> LedgerResult<Document> {
        logged(
            "make_settlement",
            self.documents.create_document(
                &self.collections.transactions,
                NewDocumentId::Unique,
                fields(json!({
                    "payerId": settlement.payer_id,
                    "receiverId": settlement.receiver_id,
                    "Amount": settlement.amount.to_string(),
                    "Time": format_event_date(&self.clock.now()),
                })),
            ),
        )
    }

    /// Settlements filtered by payer and/or receiver; no filter lists all.
    pub fn settlements(
        &self,
        payer_id: Option<&str>,
        receiver_id: Option<&str>,
    ) -> LedgerResult<Vec<Document>> {
        let mut queries = Vec::new();
        if let Some(payer_id) = payer_id {
            queries.push(DocumentQuery::equal("payerId", payer_id));
        }
        if let Some(receiver_id) = receiver_id {
            queries.push(DocumentQuery::equal("receiverId", receiver_id));
        }
        logged(
            "list_settlements",
            self.documents
                .list_documents(&self.collections.transactions, &queries),
        )
    }

    pub fn delete_activity(&self, activity_id: &str) -> LedgerResult<()> {
        require(activity_id, "Activity ID is required")?;
        logged(
            "delete_activity",
            self.documents
                .delete_document(&self.collections.activity, activity_id),
        )
    }

    pub fn delete_group(&self, group_id: &str) -> LedgerResult<()> {
        require(group_id, "Group ID is required")?;
        logged(
            "delete_group",
            self.documents
                .delete_document(&self.collections.groups, group_id),
        )
    }

    /// All groups, newest first.
    pub fn groups(&self) -> LedgerResult<Vec<Document>> {
        logged(
            "list_groups",
            self.documents.list_documents(
                &self.collections.groups,
                &[DocumentQuery::OrderDescCreatedAt],
            ),
        )
    }

    /// All expenses, newest first.
    pub fn activity(&self) -> LedgerResult<Vec<Document>> {
        logged(
            "list_activity",
            self.documents.list_documents(
                &self.collections.activity,
                &[DocumentQuery::OrderDescCreatedAt],
            ),
        )
    }

    /// Expenses recorded against one group, newest first.
    pub fn group_activity(&self, group_id: &str) -> LedgerResult<Vec<Document>> {
        logged(
            "list_group_activity",
            self.documents.list_documents(
                &self.collections.activity,
                &[
                    DocumentQuery::equal("Group", group_id),
                    DocumentQuery::OrderDescCreatedAt,
                ],
            ),
        )
    }

    /// Friends-list documents owned by `user_id`. A blank id lists nothing.
    pub fn friends(&self, user_id: &str) -> LedgerResult<Vec<Document>> {
        if user_id.trim().is_empty() {
            return Ok(Vec::new());
        }
        logged(
            "list_friends",
            self.documents.list_documents(
                &self.collections.friends,
                &[DocumentQuery::equal("CollectionId", user_id)],
            ),
        )
    }

    pub fn users(&self) -> LedgerResult<Vec<Document>> {
        logged(
            "list_users",
            self.documents.list_documents(&self.collections.users, &[]),
        )
    }

    pub fn user_by_id(&self, user_id: &str) -> LedgerResult<Document> {
        logged(
            "get_user",
            self.documents.get_document(&self.collections.users, user_id),
        )
    }

    pub fn group_by_id(&self, group_id: &str) -> LedgerResult<Document> {
        logged(
            "get_group",
            self.documents.get_document(&self.collections.groups, group_id),
        )
    }

    pub fn user_by_username(&self, username: &str) -> LedgerResult<Document> {
        let users = logged(
            "find_user",
            self.documents.list_documents(
                &self.collections.users,
                &[DocumentQuery::equal("UserName", username)],
            ),
        )?;
        users
            .into_iter()
            .next()
            .ok_or_else(|| LedgerError::NotFound("user".to_string()))
    }
}

fn fields(value: Value) -> DocumentFields {
    match value {
        Value::Object(map) => map,
        _ => DocumentFields::new(),
    }
}

fn require(value: &str, message: &str) -> LedgerResult<()> {
    if value.trim().is_empty() {
        return Err(LedgerError::Validation(message.to_string()));
    }
    Ok(())
}

fn logged<T>(op: &'static str, result: RemoteResult<T>) -> LedgerResult<T> {
    result.map_err(|err| {
        error!("event=ledger_call module=ledger status=error op={op} error={err}");
        LedgerError::Remote(err)
    })
}

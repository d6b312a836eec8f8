//! Single-writer mailbox for calendar mutations.
//!
//! # Responsibility
//! - Move one `EventService` onto a dedicated worker thread.
//! - Serialize every request through one in-order channel.
//!
//! # Invariants
//! - Only the worker thread touches the service; "read current list,
//!   derive next list, persist" never interleaves between two requests.
//! - Handles fail only with `MailboxError::Closed` once the worker is gone.

use crate::calendar::grid::{CalendarDay, ViewMode};
use crate::model::event::{CalendarEvent, EventId, EventPatch, NewEvent};
use crate::service::clock::Clock;
use crate::service::event_service::{EventResult, EventService};
use crate::storage::KeyValueStore;
use chrono::NaiveDate;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

const WORKER_THREAD_NAME: &str = "splitcal-calendar";

#[derive(Debug)]
pub enum MailboxError {
    /// Worker thread could not be started.
    Spawn(std::io::Error),
    /// Worker has stopped; the request was not processed.
    Closed,
}

impl Display for MailboxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spawn(err) => write!(f, "failed to start calendar worker: {err}"),
            Self::Closed => write!(f, "calendar worker is not running"),
        }
    }
}

impl Error for MailboxError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Spawn(err) => Some(err),
            Self::Closed => None,
        }
    }
}

pub type MailboxResult<T> = Result<T, MailboxError>;

enum Command {
    Add {
        draft: NewEvent,
        reply: Sender<EventResult<CalendarEvent>>,
    },
    Update {
        id: EventId,
        patch: EventPatch,
        reply: Sender<EventResult<CalendarEvent>>,
    },
    Delete {
        id: EventId,
        reply: Sender<bool>,
    },
    Get {
        id: EventId,
        reply: Sender<Option<CalendarEvent>>,
    },
    List {
        reply: Sender<Vec<CalendarEvent>>,
    },
    Grid {
        reference: NaiveDate,
        mode: ViewMode,
        reply: Sender<Vec<CalendarDay>>,
    },
    Upcoming {
        reply: Sender<Vec<CalendarEvent>>,
    },
    Shutdown,
}

/// Cloneable sender side of the mailbox.
#[derive(Clone)]
pub struct CalendarHandle {
    tx: Sender<Command>,
}

impl CalendarHandle {
    pub fn add_event(&self, draft: NewEvent) -> MailboxResult<EventResult<CalendarEvent>> {
        self.request(|reply| Command::Add { draft, reply })
    }

    pub fn update_event(
        &self,
        id: EventId,
        patch: EventPatch,
    ) -> MailboxResult<EventResult<CalendarEvent>> {
        self.request(|reply| Command::Update { id, patch, reply })
    }

    pub fn delete_event(&self, id: EventId) -> MailboxResult<bool> {
        self.request(|reply| Command::Delete { id, reply })
    }

    pub fn get_event_by_id(&self, id: EventId) -> MailboxResult<Option<CalendarEvent>> {
        self.request(|reply| Command::Get { id, reply })
    }

    pub fn events(&self) -> MailboxResult<Vec<CalendarEvent>> {
        self.request(|reply| Command::List { reply })
    }

    pub fn grid(&self, reference: NaiveDate, mode: ViewMode) -> MailboxResult<Vec<CalendarDay>> {
        self.request(|reply| Command::Grid {
            reference,
            mode,
            reply,
        })
    }

    pub fn upcoming(&self) -> MailboxResult<Vec<CalendarEvent>> {
        self.request(|reply| Command::Upcoming { reply })
    }

    fn request<T>(&self, build: impl FnOnce(Sender<T>) -> Command) -> MailboxResult<T> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(build(reply_tx))
            .map_err(|_| MailboxError::Closed)?;
        reply_rx.recv().map_err(|_| MailboxError::Closed)
    }
}

/// Owner of the worker thread. Dropping it stops the worker.
pub struct CalendarWorker {
    handle: CalendarHandle,
    join: Option<JoinHandle<()>>,
}

impl CalendarWorker {
    /// Starts the worker; the service is loaded on the worker thread before
    /// the first request is served.
    pub fn spawn<S, C>(service: EventService<S, C>) -> MailboxResult<Self>
    where
        S: KeyValueStore + Send + 'static,
        C: Clock + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let join = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || run_worker(service, rx))
            .map_err(|err| {
                error!("event=worker_start module=runtime status=error error={err}");
                MailboxError::Spawn(err)
            })?;

        Ok(Self {
            handle: CalendarHandle { tx },
            join: Some(join),
        })
    }

    pub fn handle(&self) -> CalendarHandle {
        self.handle.clone()
    }

    /// Stops the worker after queued requests drain and waits for it.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let Some(join) = self.join.take() else {
            return;
        };
        let _ = self.handle.tx.send(Command::Shutdown);
        if join.join().is_err() {
            error!("event=worker_stop module=runtime status=error error_code=worker_panicked");
        }
    }
}

impl Drop for CalendarWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker<S: KeyValueStore, C: Clock>(mut service: EventService<S, C>, rx: Receiver<Command>) {
    service.load();
    info!(
        "event=worker_start module=runtime status=ok count={}",
        service.events().len()
    );

    // Send errors mean the caller stopped waiting; the mutation still stands.
    while let Ok(command) = rx.recv() {
        match command {
            Command::Add { draft, reply } => {
                let _ = reply.send(service.add_event(draft));
            }
            Command::Update { id, patch, reply } => {
                let _ = reply.send(service.update_event(&id, patch));
            }
            Command::Delete { id, reply } => {
                let _ = reply.send(service.delete_event(&id));
            }
            Command::Get { id, reply } => {
                let _ = reply.send(service.get_event_by_id(&id).cloned());
            }
            Command::List { reply } => {
                let _ = reply.send(service.events().to_vec());
            }
            Command::Grid {
                reference,
                mode,
                reply,
            } => {
                let _ = reply.send(service.grid(reference, mode));
            }
            Command::Upcoming { reply } => {
                let _ = reply.send(service.upcoming().into_iter().cloned().collect());
            }
            Command::Shutdown => break,
        }
    }

    info!("event=worker_stop module=runtime status=ok");
}

//! Threaded runtime around the calendar service.

pub mod mailbox;

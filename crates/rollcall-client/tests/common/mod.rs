//! Scripted `ContactsApi` for form controller tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rollcall_client::{ContactsApi, Error, Health, Result, Submission};
use rollcall_core::{Contact, ContactId, ContactInput, DuplicateField};
use tokio::sync::Notify;

/// What the next `submit` call answers.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Store the submitted input.
    Created,
    /// 409 for `field`, with an optional server message.
    Duplicate(DuplicateField, Option<String>),
    /// Any other status.
    Rejected(u16, Option<String>),
    /// Transport failure.
    Offline,
}

/// In-memory API double.
#[derive(Default)]
pub struct MockApi {
    replies: Mutex<VecDeque<Reply>>,
    submitted: Mutex<Vec<ContactInput>>,
    count: Mutex<Option<u64>>,
    count_calls: AtomicUsize,
    sheet_url: Mutex<Option<String>>,
    gate: Option<Arc<Notify>>,
}

impl MockApi {
    /// Every submit succeeds and the count starts at `count`.
    pub fn new(count: u64) -> Self {
        Self {
            count: Mutex::new(Some(count)),
            sheet_url: Mutex::new(Some(
                "https://docs.google.com/spreadsheets/d/sheet-123".to_string(),
            )),
            ..Self::default()
        }
    }

    /// Queue replies for upcoming submits. Once empty, submits succeed.
    pub fn with_replies(self, replies: impl IntoIterator<Item = Reply>) -> Self {
        self.replies.lock().unwrap().extend(replies);
        self
    }

    /// Hold every submit until `gate` is notified.
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// `None` makes `count` fail.
    pub fn set_count(&self, count: Option<u64>) {
        *self.count.lock().unwrap() = count;
    }

    /// `None` makes `sheet_url` fail.
    pub fn set_sheet_url(&self, url: Option<&str>) {
        *self.sheet_url.lock().unwrap() = url.map(String::from);
    }

    /// Inputs received by `submit`, in order.
    pub fn submitted(&self) -> Vec<ContactInput> {
        self.submitted.lock().unwrap().clone()
    }

    /// Number of `count` calls.
    pub fn count_calls(&self) -> usize {
        self.count_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContactsApi for MockApi {
    async fn submit(&self, input: &ContactInput) -> Result<Submission> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.submitted.lock().unwrap().push(input.clone());

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Reply::Created);
        match reply {
            Reply::Created => {
                let contact = input.validate().unwrap();
                if let Some(count) = self.count.lock().unwrap().as_mut() {
                    *count += 1;
                }
                Ok(Submission::Created(Contact {
                    id: ContactId::from_millis(1_736_591_400_000),
                    name: contact.name,
                    email: contact.email,
                    phone: contact.phone,
                    timestamp: "01/11/2026, 10:30:00 AM".to_string(),
                }))
            }
            Reply::Duplicate(field, message) => Ok(Submission::Duplicate {
                field: Some(field),
                message,
            }),
            Reply::Rejected(status, message) => Ok(Submission::Rejected { status, message }),
            Reply::Offline => Err(Error::Decode("connection refused".to_string())),
        }
    }

    async fn count(&self) -> Result<u64> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        self.count.lock().unwrap().ok_or(Error::Status {
            status: 500,
            message: "Error counting contacts".to_string(),
        })
    }

    async fn sheet_url(&self) -> Result<String> {
        self.sheet_url
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::Decode("url missing from response".to_string()))
    }

    async fn health(&self) -> Result<Health> {
        Ok(Health {
            status: "OK".to_string(),
            message: "Rollcall API is running".to_string(),
            timestamp: "2026-01-11T10:30:00.000Z".to_string(),
        })
    }
}

//! Outbound sync command queue with retry and failure reporting.
//!
//! The store enqueues a command after every mutation; a delivery worker
//! drains commands, pushes them to the persistence API or calendar, and
//! reports back. Failed deliveries are retried up to `max_attempts`, after
//! which the command is parked in `failed()` instead of being dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::task::TimeSlot;

/// What the remote side should do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyncCommandKind {
    UpsertTask {
        task_id: String,
    },
    DeleteTask {
        task_id: String,
    },
    UpsertCalendarEvent {
        task_id: String,
        slot: TimeSlot,
    },
    DeleteCalendarEvent {
        task_id: String,
        google_event_id: String,
    },
}

impl SyncCommandKind {
    pub fn task_id(&self) -> &str {
        match self {
            Self::UpsertTask { task_id }
            | Self::DeleteTask { task_id }
            | Self::UpsertCalendarEvent { task_id, .. }
            | Self::DeleteCalendarEvent { task_id, .. } => task_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCommand {
    pub id: String,
    #[serde(flatten)]
    pub kind: SyncCommandKind,
    pub enqueued_at: DateTime<Utc>,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub last_error: Option<String>,
}

/// Sync queue for outbound persistence and calendar commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncQueue {
    pending: VecDeque<SyncCommand>,
    /// Handed out by `drain_ready`, awaiting acknowledge/failure.
    #[serde(default)]
    in_flight: Vec<SyncCommand>,
    #[serde(default)]
    failed: Vec<SyncCommand>,
    max_attempts: u32,
}

impl SyncQueue {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            pending: VecDeque::new(),
            in_flight: Vec::new(),
            failed: Vec::new(),
            max_attempts: max_attempts.max(1),
        }
    }

    /// Enqueue a command and return its id.
    ///
    /// An upsert for a task that already has a pending upsert is coalesced
    /// into the existing one. A task delete supersedes its pending upserts.
    pub fn enqueue(&mut self, kind: SyncCommandKind) -> String {
        if let SyncCommandKind::UpsertTask { task_id } = &kind {
            if let Some(existing) = self.pending.iter().find(|c| {
                matches!(&c.kind, SyncCommandKind::UpsertTask { task_id: t } if t == task_id)
            }) {
                return existing.id.clone();
            }
        }
        if let SyncCommandKind::DeleteTask { task_id } = &kind {
            self.pending.retain(|c| {
                !matches!(&c.kind, SyncCommandKind::UpsertTask { task_id: t } if t == task_id)
            });
        }

        let command = SyncCommand {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            enqueued_at: Utc::now(),
            attempts: 0,
            last_error: None,
        };
        let id = command.id.clone();
        tracing::debug!(command_id = %id, task_id = command.kind.task_id(), "sync command enqueued");
        self.pending.push_back(command);
        id
    }

    /// Hand out up to `n` commands in enqueue order.
    pub fn drain_ready(&mut self, n: usize) -> Vec<SyncCommand> {
        let take = n.min(self.pending.len());
        let batch: Vec<SyncCommand> = self.pending.drain(..take).collect();
        self.in_flight.extend(batch.iter().cloned());
        batch
    }

    /// Mark a delivered command as done.
    pub fn acknowledge(&mut self, id: &str) -> bool {
        let before = self.in_flight.len();
        self.in_flight.retain(|c| c.id != id);
        self.in_flight.len() != before
    }

    /// Record a failed delivery. The command is retried at the back of the
    /// queue until it has used up its attempts, then parked as failed.
    pub fn report_failure(&mut self, id: &str, message: impl Into<String>) -> bool {
        let Some(pos) = self.in_flight.iter().position(|c| c.id == id) else {
            return false;
        };
        let mut command = self.in_flight.remove(pos);
        command.attempts += 1;
        command.last_error = Some(message.into());

        if command.attempts >= self.max_attempts {
            tracing::warn!(
                command_id = %command.id,
                task_id = command.kind.task_id(),
                attempts = command.attempts,
                error = command.last_error.as_deref().unwrap_or_default(),
                "sync command gave up"
            );
            self.failed.push(command);
        } else {
            self.pending.push_back(command);
        }
        true
    }

    /// Put every in-flight command back at the front of the queue, e.g. after
    /// a restart interrupted delivery.
    pub fn requeue_in_flight(&mut self) {
        for command in self.in_flight.drain(..).rev() {
            self.pending.push_front(command);
        }
    }

    /// Give parked commands a fresh set of attempts.
    pub fn retry_failed(&mut self) -> usize {
        let n = self.failed.len();
        for mut command in self.failed.drain(..) {
            command.attempts = 0;
            self.pending.push_back(command);
        }
        n
    }

    pub fn pending(&self) -> impl Iterator<Item = &SyncCommand> {
        self.pending.iter()
    }

    pub fn in_flight(&self) -> &[SyncCommand] {
        &self.in_flight
    }

    pub fn failed(&self) -> &[SyncCommand] {
        &self.failed
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn set_max_attempts(&mut self, max_attempts: u32) {
        self.max_attempts = max_attempts.max(1);
    }
}

impl Default for SyncQueue {
    fn default() -> Self {
        Self::new(5)
    }
}

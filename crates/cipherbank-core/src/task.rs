//! Task management - the create → complete → publish workflow
//!
//! A user addresses a task to a bank. Only that exact bank may complete it,
//! and only the owning user may publish a signature over the result.
//!
//! # State Machine
//!
//! ```text
//! Created ──complete_task──▶ Completed ──publish_task_result──▶ Published
//! ```
//!
//! No back-transitions and no skipping. `result` and `signature` are
//! write-once.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use cipherbank_types::{Principal, RegistryError, RegistryEvent, Result, Role, TaskId};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::access::RoleAuthority;
use crate::events::EventBus;

/// Lifecycle state of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Created,
    Completed,
    Published,
}

impl TaskState {
    /// The allowed-transition table
    pub fn can_transition_to(self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (TaskState::Created, TaskState::Completed)
                | (TaskState::Completed, TaskState::Published)
        )
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Completed => write!(f, "completed"),
            Self::Published => write!(f, "published"),
        }
    }
}

/// A unit of work between one user and one bank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: TaskId,
    /// The bank the task is addressed to
    pub bank: Principal,
    /// The creator and owner
    pub user: Principal,
    pub description: String,
    pub is_completed: bool,
    #[serde(with = "hex::serde")]
    pub result: Vec<u8>,
    pub is_published: bool,
    #[serde(with = "hex::serde")]
    pub signature: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn state(&self) -> TaskState {
        match (self.is_completed, self.is_published) {
            (true, true) => TaskState::Published,
            (true, false) => TaskState::Completed,
            _ => TaskState::Created,
        }
    }

    fn check_transition(&self, next: TaskState) -> Result<()> {
        let current = self.state();
        if !current.can_transition_to(next) {
            return Err(RegistryError::InvalidState {
                task_id: self.task_id,
                expected: required_source(next).to_string(),
                actual: current.to_string(),
            });
        }
        Ok(())
    }
}

fn required_source(next: TaskState) -> TaskState {
    match next {
        TaskState::Completed => TaskState::Created,
        TaskState::Published | TaskState::Created => TaskState::Completed,
    }
}

#[derive(Debug)]
struct TaskBook {
    tasks: BTreeMap<TaskId, Task>,
    next_id: TaskId,
}

impl TaskBook {
    fn get_mut(&mut self, task_id: TaskId) -> Result<&mut Task> {
        self.tasks
            .get_mut(&task_id)
            .ok_or_else(|| RegistryError::not_found(format!("task {task_id}")))
    }
}

/// The task workflow engine
#[derive(Clone)]
pub struct TaskManagement {
    access: Arc<dyn RoleAuthority>,
    events: EventBus,
    book: Arc<RwLock<TaskBook>>,
}

impl TaskManagement {
    pub fn new(access: Arc<dyn RoleAuthority>, events: EventBus) -> Self {
        Self {
            access,
            events,
            book: Arc::new(RwLock::new(TaskBook {
                tasks: BTreeMap::new(),
                next_id: 1,
            })),
        }
    }

    /// Create a task addressed to `bank`, owned by the caller
    pub async fn create_task(
        &self,
        caller: &Principal,
        bank: Principal,
        description: impl Into<String>,
    ) -> Result<TaskId> {
        let description = description.into();

        self.access
            .authorize(caller, Role::User, "create a task")
            .await?;
        if !self.access.has_role(&bank, Role::Bank).await {
            tracing::warn!(%caller, %bank, "task addressed to a non-bank");
            return Err(RegistryError::unauthorized(
                *caller,
                format!("address a task to {bank}, which is not a bank"),
            ));
        }

        let mut book = self.book.write().await;
        let task_id = book.next_id;
        book.next_id += 1;

        let created_at = Utc::now();
        book.tasks.insert(
            task_id,
            Task {
                task_id,
                bank,
                user: *caller,
                description: description.clone(),
                is_completed: false,
                result: Vec::new(),
                is_published: false,
                signature: Vec::new(),
                created_at,
                completed_at: None,
                published_at: None,
            },
        );

        tracing::info!(task_id, user = %caller, %bank, "task created");
        self.events
            .emit(RegistryEvent::TaskCreated {
                task_id,
                bank,
                user: *caller,
                description,
                timestamp: created_at,
            })
            .await;

        Ok(task_id)
    }

    /// Supply a result. Only the task's designated bank may call this.
    pub async fn complete_task(
        &self,
        caller: &Principal,
        task_id: TaskId,
        result: Vec<u8>,
    ) -> Result<()> {
        let mut book = self.book.write().await;
        let task = book.get_mut(task_id)?;

        if task.bank != *caller {
            tracing::warn!(
                task_id,
                %caller,
                bank = %task.bank,
                "completion by non-designated bank"
            );
            return Err(RegistryError::unauthorized(
                *caller,
                format!("complete task {task_id}"),
            ));
        }
        task.check_transition(TaskState::Completed)?;
        if result.is_empty() {
            return Err(RegistryError::empty("result"));
        }

        let now = Utc::now();
        task.is_completed = true;
        task.result = result.clone();
        task.completed_at = Some(now);

        tracing::info!(task_id, bank = %caller, result_len = result.len(), "task completed");
        self.events
            .emit(RegistryEvent::TaskCompleted {
                task_id,
                result,
                timestamp: now,
            })
            .await;

        Ok(())
    }

    /// Publish a signature over the result. Only the owning user may call this.
    pub async fn publish_task_result(
        &self,
        caller: &Principal,
        task_id: TaskId,
        signature: Vec<u8>,
    ) -> Result<()> {
        let mut book = self.book.write().await;
        let task = book.get_mut(task_id)?;

        if task.user != *caller {
            tracing::warn!(task_id, %caller, user = %task.user, "publication by non-owner");
            return Err(RegistryError::unauthorized(
                *caller,
                format!("publish task {task_id}"),
            ));
        }
        task.check_transition(TaskState::Published)?;
        if signature.is_empty() {
            return Err(RegistryError::empty("signature"));
        }

        let now = Utc::now();
        task.is_published = true;
        task.signature = signature.clone();
        task.published_at = Some(now);

        tracing::info!(task_id, user = %caller, "task result published");
        self.events
            .emit(RegistryEvent::TaskPublished {
                task_id,
                signature,
                timestamp: now,
            })
            .await;

        Ok(())
    }

    /// Look up a task
    pub async fn get_task(&self, task_id: TaskId) -> Result<Task> {
        self.book
            .read()
            .await
            .tasks
            .get(&task_id)
            .cloned()
            .ok_or_else(|| RegistryError::not_found(format!("task {task_id}")))
    }

    /// Tasks owned by a user, ordered by id
    pub async fn tasks_for_user(&self, user: &Principal) -> Vec<Task> {
        self.filtered(|t| t.user == *user).await
    }

    /// Tasks addressed to a bank, ordered by id
    pub async fn tasks_for_bank(&self, bank: &Principal) -> Vec<Task> {
        self.filtered(|t| t.bank == *bank).await
    }

    pub async fn task_count(&self) -> usize {
        self.book.read().await.tasks.len()
    }

    async fn filtered(&self, keep: impl Fn(&Task) -> bool) -> Vec<Task> {
        self.book
            .read()
            .await
            .tasks
            .values()
            .filter(|t| keep(t))
            .cloned()
            .collect()
    }
}

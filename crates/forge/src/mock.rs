//! `MockWorkflowService` — an in-memory test double for `WorkflowService`.
//!
//! Behaves like the dashboard backend: sequential numeric ids, create-only
//! saves, stub execution ids. Every call is recorded for assertions.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;

use crate::error::ServiceError;
use crate::service::{ExecutionAck, SaveRequest, SavedWorkflow, WorkflowRef, WorkflowService};

#[derive(Default)]
struct State {
    next_id: u64,
    stored: HashMap<WorkflowRef, SavedWorkflow>,
    saves: Vec<SaveRequest>,
    executed: Vec<WorkflowRef>,
    fail_next: Option<ServiceError>,
}

#[derive(Default)]
pub struct MockWorkflowService {
    state: Mutex<State>,
}

impl MockWorkflowService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call (of any kind) fail with `err`.
    pub fn fail_next(&self, err: ServiceError) {
        self.state.lock().unwrap().fail_next = Some(err);
    }

    /// Every save request received, in call order.
    pub fn saves(&self) -> Vec<SaveRequest> {
        self.state.lock().unwrap().saves.clone()
    }

    /// Every workflow id passed to `execute`, in call order.
    pub fn executed(&self) -> Vec<WorkflowRef> {
        self.state.lock().unwrap().executed.clone()
    }

    /// Seed a stored workflow, as if saved earlier.
    pub fn insert(&self, saved: SavedWorkflow) {
        self.state.lock().unwrap().stored.insert(saved.id.clone(), saved);
    }
}

#[async_trait]
impl WorkflowService for MockWorkflowService {
    async fn save(&self, request: &SaveRequest) -> Result<SavedWorkflow, ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.saves.push(request.clone());
        if let Some(err) = state.fail_next.take() {
            return Err(err);
        }

        state.next_id += 1;
        let now = Utc::now();
        let saved = SavedWorkflow {
            id: WorkflowRef::new(state.next_id.to_string()),
            name: request.name.clone(),
            description: request.description.clone(),
            trigger_type: request.trigger_type.clone(),
            cron_sched: request.cron_sched.clone(),
            definition: request.definition.clone(),
            is_active: request.is_active,
            created_at: Some(now),
            updated_at: Some(now),
        };
        state.stored.insert(saved.id.clone(), saved.clone());
        Ok(saved)
    }

    async fn load(&self, id: &WorkflowRef) -> Result<SavedWorkflow, ServiceError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.fail_next.take() {
            return Err(err);
        }
        state.stored.get(id).cloned().ok_or_else(|| ServiceError::Rejected {
            status: 404,
            message: "Workflow not found".into(),
        })
    }

    async fn execute(&self, id: &WorkflowRef) -> Result<ExecutionAck, ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.executed.push(id.clone());
        if let Some(err) = state.fail_next.take() {
            return Err(err);
        }
        Ok(ExecutionAck {
            message: "Workflow execution started".into(),
            execution_id: Some(format!("exec_{id}_stub")),
        })
    }
}

//! The remote workflow service boundary: save, load, execute.
//!
//! Only the contract lives here. The HTTP implementation is in the `client`
//! crate; tests use [`MockWorkflowService`](crate::mock::MockWorkflowService).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{error, info, instrument};

use crate::editor::Notification;
use crate::error::{ForgeError, ServiceError};
use crate::models::Workflow;
use crate::serializer;

// ---------------------------------------------------------------------------
// Trigger
// ---------------------------------------------------------------------------

/// How a saved workflow is started.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Trigger {
    /// Started on demand through the execute call.
    #[default]
    Manual,
    /// Started on a cron schedule.
    Cron {
        /// Standard cron expression (5 fields).
        expression: String,
    },
    /// Started by an incoming webhook.
    Webhook,
}

impl Trigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Cron { .. } => "cron",
            Self::Webhook => "webhook",
        }
    }

    /// Inverse of `as_str` + `schedule`. Unknown kinds read as manual.
    pub fn from_wire(trigger_type: &str, cron_sched: &str) -> Self {
        match trigger_type {
            "cron" => Self::Cron {
                expression: cron_sched.to_owned(),
            },
            "webhook" => Self::Webhook,
            _ => Self::Manual,
        }
    }

    /// Value of the `cron_sched` field; empty for non-cron triggers.
    pub fn schedule(&self) -> &str {
        match self {
            Self::Cron { expression } => expression,
            _ => "",
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Identifier the service assigned to a saved workflow.
///
/// The service hands out numbers; anything string-like is accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct WorkflowRef(String);

impl WorkflowRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WorkflowRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for WorkflowRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Self(n.to_string()),
            Raw::Text(s) => Self(s),
        })
    }
}

/// Body of the save call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRequest {
    pub name: String,
    pub description: String,
    pub trigger_type: String,
    pub cron_sched: String,
    /// JSON text of the serialized definition.
    pub definition: String,
    pub is_active: bool,
}

impl SaveRequest {
    /// Snapshot `workflow` as it is right now.
    pub fn for_workflow(workflow: &Workflow, trigger: &Trigger) -> Result<Self, ForgeError> {
        Ok(Self {
            name: workflow.name.clone(),
            description: format!("Auto-generated flow with {} nodes", workflow.nodes.len()),
            trigger_type: trigger.as_str().to_owned(),
            cron_sched: trigger.schedule().to_owned(),
            definition: serializer::to_json_string(workflow)?,
            is_active: true,
        })
    }
}

/// A workflow as the service stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedWorkflow {
    pub id: WorkflowRef,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub trigger_type: String,
    #[serde(default)]
    pub cron_sched: String,
    /// JSON text of the definition.
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Acknowledgement of an execute call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExecutionAck {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub execution_id: Option<String>,
}

// ---------------------------------------------------------------------------
// WorkflowService
// ---------------------------------------------------------------------------

#[async_trait]
pub trait WorkflowService: Send + Sync {
    /// Create a workflow. No upsert: every call creates a new record.
    async fn save(&self, request: &SaveRequest) -> Result<SavedWorkflow, ServiceError>;

    async fn load(&self, id: &WorkflowRef) -> Result<SavedWorkflow, ServiceError>;

    /// Ask the engine to run a saved workflow. Fire-and-acknowledge.
    async fn execute(&self, id: &WorkflowRef) -> Result<ExecutionAck, ServiceError>;
}

/// Run a saved workflow once and turn the outcome into a notification.
///
/// Single best-effort call, no retry; errors are passed through as text.
#[instrument(skip(service))]
pub async fn trigger_execution(service: &dyn WorkflowService, id: &WorkflowRef) -> Notification {
    match service.execute(id).await {
        Ok(ack) => {
            info!("execution of workflow {id} accepted: {:?}", ack.execution_id);
            let message = match ack.execution_id {
                Some(execution_id) => format!("Execution {execution_id} started"),
                None if !ack.message.is_empty() => ack.message,
                None => "Execution started".to_owned(),
            };
            Notification::Success(message)
        }
        Err(e) => {
            error!("execution of workflow {id} failed: {e}");
            Notification::Error(format!("Failed to execute workflow: {e}"))
        }
    }
}

//! `HttpClient`: reqwest implementation of the catalog source and the
//! workflow service.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use catalog::{CatalogError, CatalogSource};
use forge::service::ExecutionAck;
use forge::{SaveRequest, SavedWorkflow, ServiceError, WorkflowRef, WorkflowService};

use crate::{ClientConfig, ClientError};

pub const PRIMITIVES_PATH: &str = "modules/engine/primitives";

#[derive(Debug, Clone)]
pub struct HttpClient {
    http: Client,
    config: ClientConfig,
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match self.config.token {
            Some(ref token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let resp = self.authorized(req).send().await?;
        let resp = check_status(resp).await?;
        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Raw primitive listing from the engine.
    #[instrument(skip(self))]
    pub async fn primitives(&self) -> Result<Value, ClientError> {
        let url = self.config.endpoint(PRIMITIVES_PATH);
        debug!("GET {url}");
        self.send(self.http.get(&url)).await
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_workflow(&self, request: &SaveRequest) -> Result<SavedWorkflow, ClientError> {
        let url = self.config.endpoint("workflows");
        debug!("POST {url}");
        self.send(self.http.post(&url).json(request)).await
    }

    #[instrument(skip(self))]
    pub async fn get_workflow(&self, id: &WorkflowRef) -> Result<SavedWorkflow, ClientError> {
        let url = self.config.endpoint(&format!("workflows/{id}"));
        debug!("GET {url}");
        self.send(self.http.get(&url)).await
    }

    #[instrument(skip(self))]
    pub async fn run_workflow(&self, id: &WorkflowRef) -> Result<ExecutionAck, ClientError> {
        let url = self.config.endpoint(&format!("workflows/{id}/run"));
        debug!("POST {url}");
        self.send(self.http.post(&url)).await
    }
}

/// Turn a non-2xx response into [`ClientError::Status`].
async fn check_status(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or(body);
    warn!("request failed with {status}: {message}");
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl CatalogSource for HttpClient {
    async fn fetch(&self) -> Result<Value, CatalogError> {
        Ok(self.primitives().await?)
    }
}

#[async_trait]
impl WorkflowService for HttpClient {
    async fn save(&self, request: &SaveRequest) -> Result<SavedWorkflow, ServiceError> {
        Ok(self.create_workflow(request).await?)
    }

    async fn load(&self, id: &WorkflowRef) -> Result<SavedWorkflow, ServiceError> {
        Ok(self.get_workflow(id).await?)
    }

    async fn execute(&self, id: &WorkflowRef) -> Result<ExecutionAck, ServiceError> {
        Ok(self.run_workflow(id).await?)
    }
}

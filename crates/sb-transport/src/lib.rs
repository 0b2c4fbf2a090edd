//! Task Transport (C5): dispatches `message/send`, polls `tasks/get` to a
//! terminal state, and extracts the agent's reply text.

use sb_domain::config::TransportConfig;
use sb_domain::{Error, Result};
use sb_protocol::{JsonRpcRequest, JsonRpcResponse, SendResult, Task, TaskState};
use std::time::{Duration, Instant};

/// Result of a completed (non-timed-out) send-and-poll cycle.
#[derive(Debug, Clone)]
pub struct TransportOutcome {
    pub text: String,
    pub terminal_state: TaskState,
    pub poll_attempts: u32,
}

/// Owns one shared, pooled `reqwest::Client` used for both `message/send`
/// (60s default timeout) and `tasks/get` polls (5s per-request timeout
/// override), matching the provider adapters' build-once-reuse pattern.
pub struct TaskTransport {
    client: reqwest::Client,
}

impl TaskTransport {
    pub fn new(send_timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(send_timeout_secs))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self { client })
    }

    /// Sends `payload_text` to `endpoint` as a `message/send` call, then
    /// polls `tasks/get` (if the response is a Task, not a direct
    /// Message) until a terminal state or the polling budget is
    /// exhausted.
    pub async fn send_and_poll(
        &self,
        endpoint: &str,
        payload_text: &str,
        session_id: &str,
        config: &TransportConfig,
    ) -> Result<TransportOutcome> {
        let endpoint = endpoint.trim_end_matches('/');
        let task_id = uuid::Uuid::new_v4().to_string();
        let message_id = uuid::Uuid::new_v4().to_string();

        let params = serde_json::json!({
            "id": task_id,
            "message": {
                "role": "user",
                "messageId": message_id,
                "contextId": session_id,
                "parts": [{"type": "text", "text": payload_text}],
            },
            "configuration": {"acceptedOutputModes": ["text"]},
        });
        let request = JsonRpcRequest::new(serde_json::json!(1), "message/send", params);

        let send_result = self.call(endpoint, &request).await?;

        let send_result: SendResult = serde_json::from_value(send_result)
            .map_err(|e| Error::Transport {
                endpoint: endpoint.to_string(),
                message: format!("MALFORMED_RESPONSE: {e}"),
            })?;

        let task = match send_result {
            SendResult::Message(message) => {
                let outcome = TransportOutcome {
                    text: message.text(),
                    terminal_state: TaskState::Completed,
                    poll_attempts: 0,
                };
                emit_dispatched(endpoint, &task_id, &outcome);
                return Ok(outcome);
            }
            SendResult::Task(task) => task,
        };

        if task.status.state.is_terminal() {
            let outcome = extract_outcome(&task, 0);
            emit_dispatched(endpoint, &task_id, &outcome);
            return Ok(outcome);
        }

        let outcome = self.poll_until_terminal(endpoint, &task.id, config).await?;
        emit_dispatched(endpoint, &task_id, &outcome);
        Ok(outcome)
    }

    async fn poll_until_terminal(
        &self,
        endpoint: &str,
        task_id: &str,
        config: &TransportConfig,
    ) -> Result<TransportOutcome> {
        let deadline = Instant::now() + Duration::from_secs(config.poll_timeout_secs);
        let interval = Duration::from_secs(config.poll_interval_secs);

        let mut attempts: u32 = 0;
        let mut last_task: Option<Task> = None;

        loop {
            attempts += 1;
            let params = serde_json::json!({"id": task_id});
            let request = JsonRpcRequest::new(serde_json::json!(attempts), "tasks/get", params);

            match self.call_with_timeout(endpoint, &request, config.poll_http_timeout_secs).await {
                Ok(result) => match serde_json::from_value::<Task>(result) {
                    Ok(task) => {
                        let terminal = task.status.state.is_terminal();
                        last_task = Some(task.clone());
                        if terminal {
                            return Ok(extract_outcome(&task, attempts));
                        }
                    }
                    Err(e) => {
                        tracing::warn!(endpoint, error = %e, "malformed tasks/get response; continuing to poll");
                    }
                },
                Err(e) => {
                    tracing::warn!(endpoint, error = %e, "transient poll failure; continuing to poll");
                }
            }

            if Instant::now() >= deadline {
                let observed = last_task
                    .map(|t| format!("{:?}", t.status.state))
                    .unwrap_or_else(|| "unknown".into());
                return Err(Error::Timeout(format!(
                    "polling budget exhausted after {attempts} attempt(s); last observed state: {observed}"
                )));
            }

            tokio::time::sleep(interval).await;
        }
    }

    async fn call(&self, endpoint: &str, request: &JsonRpcRequest) -> Result<serde_json::Value> {
        self.call_with_timeout(endpoint, request, 0).await
    }

    async fn call_with_timeout(
        &self,
        endpoint: &str,
        request: &JsonRpcRequest,
        timeout_override_secs: u64,
    ) -> Result<serde_json::Value> {
        let mut builder = self
            .client
            .post(endpoint)
            .header("Content-Type", "application/json")
            .json(request);
        if timeout_override_secs > 0 {
            builder = builder.timeout(Duration::from_secs(timeout_override_secs));
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout(format!("{endpoint}: {e}"))
            } else {
                Error::Transport {
                    endpoint: endpoint.to_string(),
                    message: format!("CONNECT_FAILED: {e}"),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Transport {
                endpoint: endpoint.to_string(),
                message: format!("HTTP_ERROR({status})"),
            });
        }

        let rpc_response: JsonRpcResponse = response.json().await.map_err(|e| Error::Transport {
            endpoint: endpoint.to_string(),
            message: format!("MALFORMED_RESPONSE: {e}"),
        })?;

        if let Some(err) = rpc_response.error {
            return Err(Error::Transport {
                endpoint: endpoint.to_string(),
                message: format!("JSON_RPC_ERROR: {} (code {})", err.message, err.code),
            });
        }

        rpc_response.result.ok_or_else(|| Error::Transport {
            endpoint: endpoint.to_string(),
            message: "MALFORMED_RESPONSE: missing result".to_string(),
        })
    }
}

fn emit_dispatched(endpoint: &str, task_id: &str, outcome: &TransportOutcome) {
    sb_domain::trace::TraceEvent::TransportDispatched {
        endpoint: endpoint.to_string(),
        task_id: task_id.to_string(),
        terminal_state: format!("{:?}", outcome.terminal_state),
        poll_attempts: outcome.poll_attempts,
    }
    .emit();
}

fn extract_outcome(task: &Task, poll_attempts: u32) -> TransportOutcome {
    let text = match task.status.state {
        TaskState::Completed => {
            let extracted = task.artifact_text();
            if extracted.is_empty() {
                "no response text found.".to_string()
            } else {
                extracted
            }
        }
        TaskState::Failed => format!("Agent reported failure: {}", task.status_message_text()),
        TaskState::InputRequired => task.status_message_text(),
        TaskState::Pending | TaskState::Working => String::new(),
    };

    TransportOutcome {
        text,
        terminal_state: task.status.state,
        poll_attempts,
    }
}

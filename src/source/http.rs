//! HTTP data source.
//!
//! Each request runs as its own task on a tokio runtime and reports back
//! over a channel that [`DataSource::poll`] drains without blocking.

use nodewatch_client::{ClientError, MonitoringClient};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, error};

use super::{DataSource, Payload, Request, Response};

/// A data source backed by the monitoring API.
///
/// Requests are single attempt. A failure is logged and delivered as
/// [`Payload::Failed`]; whether it is still current is up to the caller.
#[derive(Debug)]
pub struct HttpSource {
    client: MonitoringClient,
    runtime: Handle,
    sender: mpsc::UnboundedSender<Response>,
    receiver: mpsc::UnboundedReceiver<Response>,
    description: String,
}

impl HttpSource {
    /// Create a source that spawns its requests on `runtime`.
    pub fn new(client: MonitoringClient, runtime: Handle) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let description = format!("api: {}", client.endpoint());
        Self {
            client,
            runtime,
            sender,
            receiver,
            description,
        }
    }
}

async fn fetch(client: &MonitoringClient, request: Request) -> Result<Payload, ClientError> {
    Ok(match request {
        Request::Overview(range) => Payload::Overview(client.cluster_overview(&range).await?),
        Request::NodeDetail { node_id, range } => {
            let details = client.node_details(&node_id, &range).await?;
            Payload::NodeDetail { node_id, details }
        }
        Request::Insights(range) => Payload::Insights(client.cluster_insights(&range).await?),
    })
}

impl DataSource for HttpSource {
    fn request(&mut self, seq: u64, request: Request) {
        let client = self.client.clone();
        let sender = self.sender.clone();
        let kind = request.kind();
        debug!(%kind, seq, "Spawning request");

        self.runtime.spawn(async move {
            let payload = match fetch(&client, request).await {
                Ok(payload) => payload,
                Err(e) => {
                    error!(%kind, seq, error = %e, "Fetch failed");
                    Payload::Failed {
                        message: e.to_string(),
                    }
                }
            };
            // receiver gone means the dashboard is shutting down
            let _ = sender.send(Response { kind, seq, payload });
        });
    }

    fn poll(&mut self) -> Option<Response> {
        self.receiver.try_recv().ok()
    }

    fn description(&self) -> &str {
        &self.description
    }
}

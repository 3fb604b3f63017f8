// WHY: the settings collaborator the highlighter talks to asynchronously
// Messages keep the JSON shapes of the browser extension's runtime messages

use std::collections::HashMap;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::highlight::{Formatting, FormattingPatch};

const REQUEST_QUEUE: usize = 64;
const NOTIFICATION_QUEUE: usize = 64;

/// Browser tab the page lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TabId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum HostRequest {
    GetTabEnabled,
    SetTabEnabled { enabled: bool },
    GetTabFormatting,
    SetTabFormatting { formatting: FormattingPatch },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HostResponse {
    Enabled {
        enabled: bool,
    },
    Formatting {
        formatting: Formatting,
    },
    Status {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl HostResponse {
    pub fn ok() -> Self {
        Self::Status {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self::Status {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Unsolicited state changes pushed to the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum HostNotification {
    UpdateTabEnabled { enabled: bool },
    UpdateTabFormatting { formatting: FormattingPatch },
    ApplyFormatting { formatting: FormattingPatch },
}

/// A notification addressed to one tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabNotification {
    pub tab: TabId,
    pub notification: HostNotification,
}

/// Request in flight to the host, with the channel for its answer
#[derive(Debug)]
pub struct Envelope {
    pub tab: TabId,
    pub request: HostRequest,
    pub reply: oneshot::Sender<HostResponse>,
}

/// Page-side handle for one tab's requests
#[derive(Debug, Clone)]
pub struct HostClient {
    tab: TabId,
    sender: mpsc::Sender<Envelope>,
}

impl HostClient {
    pub fn new(tab: TabId, sender: mpsc::Sender<Envelope>) -> Self {
        Self { tab, sender }
    }

    pub fn tab(&self) -> TabId {
        self.tab
    }

    pub async fn request(&self, request: HostRequest) -> Result<HostResponse> {
        let (reply, response) = oneshot::channel();
        debug!(tab = self.tab.0, ?request, "Sending host request");
        self.sender
            .send(Envelope {
                tab: self.tab,
                request,
                reply,
            })
            .await
            .map_err(|_| anyhow!("Host is not running"))?;
        response.await.context("Host dropped the request without answering")
    }

    pub async fn get_enabled(&self) -> Result<bool> {
        match self.request(HostRequest::GetTabEnabled).await? {
            HostResponse::Enabled { enabled } => Ok(enabled),
            other => Err(unexpected(other)),
        }
    }

    pub async fn get_formatting(&self) -> Result<Formatting> {
        match self.request(HostRequest::GetTabFormatting).await? {
            HostResponse::Formatting { formatting } => Ok(formatting),
            other => Err(unexpected(other)),
        }
    }

    pub async fn set_enabled(&self, enabled: bool) -> Result<()> {
        let response = self.request(HostRequest::SetTabEnabled { enabled }).await?;
        expect_success(response)
    }

    pub async fn set_formatting(&self, formatting: FormattingPatch) -> Result<()> {
        let response = self.request(HostRequest::SetTabFormatting { formatting }).await?;
        expect_success(response)
    }
}

fn expect_success(response: HostResponse) -> Result<()> {
    match response {
        HostResponse::Status { success: true, .. } => Ok(()),
        HostResponse::Status { error, .. } => {
            bail!("Host rejected request: {}", error.unwrap_or_else(|| "Unknown error".to_string()))
        }
        other => Err(unexpected(other)),
    }
}

fn unexpected(response: HostResponse) -> anyhow::Error {
    match response {
        HostResponse::Status {
            success: false,
            error,
        } => anyhow!("Host rejected request: {}", error.unwrap_or_else(|| "Unknown error".to_string())),
        other => anyhow!("Unexpected host response: {:?}", other),
    }
}

#[derive(Debug, Clone, Default)]
struct TabState {
    enabled: bool,
    formatting: Formatting,
}

/// In-memory per-tab settings service.
///
/// Runs as a tokio task; every successful set is broadcast to subscribers.
#[derive(Debug, Clone)]
pub struct TabStateHost {
    sender: mpsc::Sender<Envelope>,
    notifications: broadcast::Sender<TabNotification>,
}

impl TabStateHost {
    /// Start the service on the current tokio runtime
    pub fn spawn() -> Self {
        let (sender, receiver) = mpsc::channel(REQUEST_QUEUE);
        let (notifications, _) = broadcast::channel(NOTIFICATION_QUEUE);
        tokio::spawn(serve(receiver, notifications.clone()));
        info!("Tab state host started");
        Self { sender, notifications }
    }

    pub fn client(&self, tab: TabId) -> HostClient {
        HostClient::new(tab, self.sender.clone())
    }

    /// Notifications for `tab` only
    pub fn subscribe(&self, tab: TabId) -> TabSubscription {
        TabSubscription {
            tab,
            receiver: self.notifications.subscribe(),
        }
    }

    /// Push a notification as if another surface had changed the state
    pub fn notify(&self, tab: TabId, notification: HostNotification) {
        if self
            .notifications
            .send(TabNotification { tab, notification })
            .is_err()
        {
            debug!(tab = tab.0, "No subscribers for notification");
        }
    }
}

async fn serve(mut receiver: mpsc::Receiver<Envelope>, notifications: broadcast::Sender<TabNotification>) {
    let mut tabs: HashMap<TabId, TabState> = HashMap::new();

    while let Some(Envelope { tab, request, reply }) = receiver.recv().await {
        let state = tabs.entry(tab).or_default();
        let (response, notification) = match request {
            HostRequest::GetTabEnabled => (HostResponse::Enabled { enabled: state.enabled }, None),
            HostRequest::GetTabFormatting => (
                HostResponse::Formatting {
                    formatting: state.formatting.clone(),
                },
                None,
            ),
            HostRequest::SetTabEnabled { enabled } => {
                state.enabled = enabled;
                (HostResponse::ok(), Some(HostNotification::UpdateTabEnabled { enabled }))
            }
            HostRequest::SetTabFormatting { formatting } => {
                state.formatting.apply(&formatting);
                (
                    HostResponse::ok(),
                    Some(HostNotification::UpdateTabFormatting { formatting }),
                )
            }
        };

        // Subscribers hear about a change before the requester sees its reply
        if let Some(notification) = notification {
            let _ = notifications.send(TabNotification { tab, notification });
        }
        if reply.send(response).is_err() {
            debug!(tab = tab.0, "Requester went away before the reply");
        }
    }
    info!("Tab state host stopped");
}

/// Receiver that filters the broadcast down to one tab
#[derive(Debug)]
pub struct TabSubscription {
    tab: TabId,
    receiver: broadcast::Receiver<TabNotification>,
}

impl TabSubscription {
    /// Next notification for this tab; `None` once the host is gone
    pub async fn recv(&mut self) -> Option<HostNotification> {
        loop {
            match self.receiver.recv().await {
                Ok(TabNotification { tab, notification }) if tab == self.tab => return Some(notification),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(tab = self.tab.0, skipped, "Missed host notifications");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

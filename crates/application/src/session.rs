use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use domain::{PageDescriptor, Viewport};

use crate::tag::{
    CloseOptions, Disclosure, JourneyData, OverlayKind, SubmitOptions, TagDispatcher,
    UserInputOptions, ViewOptions,
};
use crate::view_tags::{TagOptions, ViewTags};

fn default_true() -> bool {
    true
}

/// A tagging request as sent by the host application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TagCommand {
    LoadStart {
        name: PageDescriptor,
    },
    PageView {
        name: PageDescriptor,
    },
    PageNameUpdate {
        name: PageDescriptor,
    },
    Open {
        kind: OverlayKind,
        #[serde(default)]
        name: PageDescriptor,
    },
    Close {
        kind: OverlayKind,
        #[serde(default = "default_true")]
        is_returning: bool,
    },
    Message {
        kind: String,
        text: String,
        #[serde(default)]
        cause: String,
    },
    Interaction {
        kind: String,
        label: String,
    },
    Reveal {
        label: String,
        #[serde(default)]
        hiding: bool,
    },
    UserInput(UserInputOptions),
    Submit(SubmitOptions),
    RecordValues {
        values: Map<String, Value>,
    },
    Update {
        property: String,
        value: Value,
        #[serde(default = "default_true")]
        apply_defaults: bool,
    },
    SetViewport {
        width: u32,
        height: u32,
    },
    ApplicationRoute {
        route: String,
    },
    Journey(JourneyData),
    ViewTag {
        name: String,
        #[serde(default)]
        options: TagOptions,
    },
    ForgetHelpLabels,
}

impl TagCommand {
    /// Apply the command synchronously
    pub fn apply(&self, dispatcher: &mut TagDispatcher, view_tags: &ViewTags) {
        match self {
            Self::LoadStart { name } => {
                dispatcher.load_start(name);
            }
            Self::PageView { name } => dispatcher.page_view(&ViewOptions::named(name.clone())),
            Self::PageNameUpdate { name } => dispatcher.page_name_update_view(name),
            Self::Open { kind, name } => {
                dispatcher.open(*kind, &ViewOptions::named(name.clone()));
            }
            Self::Close { kind, is_returning } => {
                let options = CloseOptions {
                    is_returning: *is_returning,
                    ..Default::default()
                };
                dispatcher.close(*kind, &options);
            }
            Self::Message { kind, text, cause } => {
                dispatcher.message(kind, text, cause);
            }
            Self::Interaction { kind, label } => {
                dispatcher.interaction(kind, label);
            }
            Self::Reveal { label, hiding } => {
                dispatcher.reveal_interaction(label, Disclosure::from_hiding(*hiding));
            }
            Self::UserInput(options) => dispatcher.user_input(options),
            Self::Submit(options) => {
                dispatcher.submit_with_validation(options);
            }
            Self::RecordValues { values } => dispatcher.record_field_values(values),
            Self::Update {
                property,
                value,
                apply_defaults,
            } => dispatcher
                .data_layer_mut()
                .update(property, value.clone(), *apply_defaults),
            Self::SetViewport { width, height } => {
                dispatcher.set_viewport(Viewport::new(*width, *height))
            }
            Self::ApplicationRoute { route } => dispatcher.set_user_application_route(route),
            Self::Journey(journey) => dispatcher.set_journey_data(journey),
            Self::ViewTag { name, options } => {
                view_tags.call(name, dispatcher, options.clone());
            }
            Self::ForgetHelpLabels => dispatcher.forget_help_labels(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("tag session closed")]
    Closed,
}

enum Request {
    Command(TagCommand),
    Snapshot(oneshot::Sender<Value>),
}

/// Cloneable sender side of a [`TagSession`]
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Request>,
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Command(command) => f.debug_tuple("Command").field(command).finish(),
            Self::Snapshot(_) => f.write_str("Snapshot"),
        }
    }
}

impl SessionHandle {
    pub async fn send(&self, command: TagCommand) -> Result<(), SessionError> {
        self.tx
            .send(Request::Command(command))
            .await
            .map_err(|_| SessionError::Closed)
    }

    /// DigitalData once every command sent before this call has settled,
    /// deferred continuations included
    pub async fn digital_data(&self) -> Result<Value, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Request::Snapshot(reply_tx))
            .await
            .map_err(|_| SessionError::Closed)?;
        reply_rx.await.map_err(|_| SessionError::Closed)
    }
}

/// Actor owning a dispatcher.
///
/// Commands are applied in arrival order. Once the queued batch is drained
/// the pending deferred continuations run, so updates sent right after a
/// close land before its refresh.
pub struct TagSession {
    dispatcher: TagDispatcher,
    view_tags: ViewTags,
    rx: mpsc::Receiver<Request>,
}

impl TagSession {
    pub fn new(
        dispatcher: TagDispatcher,
        view_tags: ViewTags,
        capacity: usize,
    ) -> (Self, SessionHandle) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let session = Self {
            dispatcher,
            view_tags,
            rx,
        };
        (session, SessionHandle { tx })
    }

    /// Spawn the session on the current runtime.
    ///
    /// The task ends when every handle is dropped and yields the dispatcher.
    pub fn spawn(
        dispatcher: TagDispatcher,
        view_tags: ViewTags,
        capacity: usize,
    ) -> (SessionHandle, JoinHandle<TagDispatcher>) {
        let (session, handle) = Self::new(dispatcher, view_tags, capacity);
        (handle, tokio::spawn(session.run()))
    }

    pub async fn run(mut self) -> TagDispatcher {
        info!(view_tags = self.view_tags.len(), "🏷️ Tag session started");

        while let Some(request) = self.rx.recv().await {
            let mut replies = Vec::new();
            self.handle(request, &mut replies);
            while let Ok(request) = self.rx.try_recv() {
                self.handle(request, &mut replies);
            }

            self.dispatcher.run_pending();
            for reply in replies {
                // Requester may have given up waiting
                let _ = reply.send(self.dispatcher.digital_data().clone());
            }
        }

        self.dispatcher.run_pending();
        info!("🏷️ Tag session channel closed. Session shutting down.");
        self.dispatcher
    }

    fn handle(&mut self, request: Request, replies: &mut Vec<oneshot::Sender<Value>>) {
        match request {
            Request::Command(command) => {
                debug!(command = ?command, "Applying tag command");
                command.apply(&mut self.dispatcher, &self.view_tags);
            }
            Request::Snapshot(reply) => replies.push(reply),
        }
    }
}

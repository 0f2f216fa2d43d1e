use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Sleep;

use crate::core::error::{AppError, Result};
use crate::features::app::models::AppSnapshot;
use crate::features::app::state::{AppEvent, AppState, Effect, Intent};
use crate::features::reports::models::{Report, ReportPatch};
use crate::features::reports::ReportStore;
use crate::features::session::models::Identity;
use crate::features::session::IdentityProvider;
use crate::shared::constants::SUCCESS_DISPLAY_DURATION;
use crate::shared::subscription::Subscription;

/// Capacity of the intent queue between HTTP handlers and the event loop
const COMMAND_BUFFER: usize = 64;

enum Command {
    Intent(Intent, oneshot::Sender<AppSnapshot>),
    Shutdown(oneshot::Sender<()>),
}

/// Cloneable handle used by HTTP handlers to talk to the running app
#[derive(Clone)]
pub struct AppShellHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<AppSnapshot>,
}

impl AppShellHandle {
    /// Apply an intent and return the state right after it was handled
    pub async fn dispatch(&self, intent: Intent) -> Result<AppSnapshot> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Intent(intent, reply))
            .await
            .map_err(|_| AppError::Unavailable("App runtime has stopped".to_string()))?;
        response
            .await
            .map_err(|_| AppError::Unavailable("App runtime has stopped".to_string()))
    }

    /// Latest published snapshot
    pub fn current(&self) -> AppSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver that observes every published snapshot
    pub fn watch(&self) -> watch::Receiver<AppSnapshot> {
        self.snapshots.clone()
    }

    /// Tear down subscriptions and the success timer, then stop the loop
    pub async fn shutdown(&self) {
        let (ack, done) = oneshot::channel();
        if self.commands.send(Command::Shutdown(ack)).await.is_ok() {
            let _ = done.await;
        }
    }
}

/// One step of the event loop
enum Step {
    Event(AppEvent),
    Intent(Intent, oneshot::Sender<AppSnapshot>),
    IdentityStreamEnded,
    FeedStreamEnded,
    Shutdown(Option<oneshot::Sender<()>>),
}

/// The single event-processing task that owns `AppState`.
///
/// Identity events, feed snapshots, write completions, the success timer and
/// user intents are all serialized through one `select!` loop, so state is
/// only ever touched from this task.
pub struct AppShell {
    state: AppState,
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn ReportStore>,
    collection: String,
    commands: mpsc::Receiver<Command>,
    completions_tx: mpsc::UnboundedSender<AppEvent>,
    completions: mpsc::UnboundedReceiver<AppEvent>,
    snapshots: watch::Sender<AppSnapshot>,
    identity_changes: Option<Subscription<Option<Identity>>>,
    feed: Option<Subscription<Vec<Report>>>,
    success_timer: Option<Pin<Box<Sleep>>>,
}

impl AppShell {
    /// Start the event loop on the current runtime
    pub fn spawn(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn ReportStore>,
        collection: impl Into<String>,
    ) -> (AppShellHandle, JoinHandle<()>) {
        let state = AppState::new();
        let (snapshots, snapshot_rx) = watch::channel(state.snapshot());
        let (commands_tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let (completions_tx, completions) = mpsc::unbounded_channel();

        let shell = Self {
            state,
            identity,
            store,
            collection: collection.into(),
            commands,
            completions_tx,
            completions,
            snapshots,
            identity_changes: None,
            feed: None,
            success_timer: None,
        };

        let task = tokio::spawn(shell.run());
        let handle = AppShellHandle {
            commands: commands_tx,
            snapshots: snapshot_rx,
        };

        (handle, task)
    }

    async fn run(mut self) {
        tracing::info!("App runtime started (collection: '{}')", self.collection);

        self.identity_changes = Some(self.identity.on_identity_change());
        self.apply(AppEvent::Started);

        loop {
            let step = tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Intent(intent, reply)) => Step::Intent(intent, reply),
                    Some(Command::Shutdown(ack)) => Step::Shutdown(Some(ack)),
                    None => Step::Shutdown(None),
                },
                identity = next_item(&mut self.identity_changes) => match identity {
                    Some(identity) => Step::Event(AppEvent::IdentityChanged(identity)),
                    None => Step::IdentityStreamEnded,
                },
                reports = next_item(&mut self.feed) => match reports {
                    Some(reports) => Step::Event(AppEvent::Snapshot(reports)),
                    None => Step::FeedStreamEnded,
                },
                Some(event) = self.completions.recv() => Step::Event(event),
                _ = wait_timer(&mut self.success_timer) => {
                    Step::Event(AppEvent::SuccessWindowElapsed)
                }
            };

            match step {
                Step::Event(event) => {
                    if matches!(event, AppEvent::SuccessWindowElapsed) {
                        self.success_timer = None;
                    }
                    self.apply(event);
                }
                Step::Intent(intent, reply) => {
                    self.apply(AppEvent::Intent(intent));
                    let _ = reply.send(self.state.snapshot());
                }
                Step::IdentityStreamEnded => {
                    tracing::warn!("Identity provider closed its change stream");
                    self.identity_changes = None;
                }
                Step::FeedStreamEnded => {
                    tracing::warn!("Report store closed the feed subscription");
                    self.feed = None;
                }
                Step::Shutdown(ack) => {
                    self.teardown();
                    if let Some(ack) = ack {
                        let _ = ack.send(());
                    }
                    break;
                }
            }
        }

        tracing::info!("App runtime stopped");
    }

    /// Run one transition, execute its effects, publish the new snapshot
    fn apply(&mut self, event: AppEvent) {
        for effect in self.state.handle(event) {
            self.execute(effect);
        }
        self.snapshots.send_replace(self.state.snapshot());
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::SignIn => {
                let identity = Arc::clone(&self.identity);
                let done = self.completions_tx.clone();
                tokio::spawn(async move {
                    if let Err(e) = identity.sign_in_anonymously().await {
                        tracing::error!("Anonymous sign-in failed: {}", e);
                        let _ = done.send(AppEvent::SignInFailed(e.to_string()));
                    }
                });
            }
            Effect::OpenFeed => {
                tracing::debug!("Opening report feed");
                self.feed = Some(self.store.subscribe(&self.collection));
            }
            Effect::CloseFeed => {
                tracing::debug!("Closing report feed");
                self.feed = None;
            }
            Effect::CreateReport(report) => {
                let store = Arc::clone(&self.store);
                let collection = self.collection.clone();
                let done = self.completions_tx.clone();
                tokio::spawn(async move {
                    let event = match store.create(&collection, report).await {
                        Ok(id) => AppEvent::ReportCreated(id),
                        Err(e) => {
                            tracing::error!("Failed to submit report: {}", e);
                            AppEvent::CreateFailed(e.to_string())
                        }
                    };
                    let _ = done.send(event);
                });
            }
            Effect::ArmSuccessTimer => {
                self.success_timer = Some(Box::pin(tokio::time::sleep(SUCCESS_DISPLAY_DURATION)));
            }
            Effect::ResolveReport(id) => {
                let store = Arc::clone(&self.store);
                let collection = self.collection.clone();
                let done = self.completions_tx.clone();
                tokio::spawn(async move {
                    let event = match store.update(&collection, &id, ReportPatch::Resolve).await {
                        Ok(()) => AppEvent::ReportResolved(id),
                        Err(e) => {
                            tracing::error!("Failed to resolve report {}: {}", id, e);
                            AppEvent::ResolveFailed {
                                id,
                                message: e.to_string(),
                            }
                        }
                    };
                    let _ = done.send(event);
                });
            }
        }
    }

    /// Release everything that could push state after the loop ends
    fn teardown(&mut self) {
        self.feed = None;
        self.identity_changes = None;
        self.success_timer = None;
        tracing::debug!("Released feed subscription, identity subscription and success timer");
    }
}

async fn next_item<T>(subscription: &mut Option<Subscription<T>>) -> Option<T> {
    match subscription {
        Some(subscription) => subscription.next().await,
        None => std::future::pending().await,
    }
}

async fn wait_timer(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(sleep) => sleep.as_mut().await,
        None => std::future::pending().await,
    }
}

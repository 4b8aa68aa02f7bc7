//! # List Controller
//!
//! Drives a list view for one entity resource: fetch on init, refresh when the
//! resource's list-modification event fires, release the subscription on
//! teardown.
//!
//! Network calls run as tasks owned by the controller, and invalidations
//! arrive over a channel, so the controller itself is only ever mutated by its
//! owner. `poll` handles whatever is ready; `settle` waits until every task
//! has finished. A task that dies without reporting back (a panic or a
//! cancellation) is handled like a failed call.
//!
//! Queries are sequenced: only the response to the most recently issued query
//! is applied, so a slow stale response cannot overwrite fresher data.
//!
//! Tasks are spawned on the Tokio runtime that was current when the
//! controller was created, or on the one given to `with_runtime`.

use crate::client::events::{AppEvent, EventManager, Subscription};
use crate::client::models::{Account, RequestOptions, Reserva, RestEntity};
use crate::client::services::{
    AccountService, AlertService, EntityArrayResponse, EntityService, HttpError, HttpTransport,
};
use std::collections::HashMap;
use std::future::Future;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::{Id, JoinError, JoinSet};

/// Lifecycle of the displayed list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    Uninitialized,
    Loading,
    Loaded,
    Error,
}

/// Output of a spawned call
#[derive(Debug)]
enum CallOutcome<E> {
    Query {
        sequence: u64,
        result: Result<EntityArrayResponse<E>, HttpError>,
    },
    Identity(Result<Option<Account>, HttpError>),
}

/// What a running task is doing, kept to interpret a task that dies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingCall {
    Query(u64),
    Identity,
}

type Joined<E> = Result<(Id, CallOutcome<E>), JoinError>;

/// List controller for reservations
pub type ReservaListController<T> = ListController<Reserva, T>;

pub struct ListController<E: RestEntity, T: HttpTransport + 'static> {
    service: EntityService<E, T>,
    account_service: AccountService<T>,
    alerts: AlertService,
    event_manager: EventManager,
    query_options: Option<RequestOptions>,
    runtime: Option<Handle>,

    state: ListState,
    items: Vec<E>,
    current_account: Option<Account>,
    event_subscriber: Option<Subscription>,
    destroyed: bool,

    /// Sequence number of the latest issued query
    latest_query: u64,
    tasks: JoinSet<CallOutcome<E>>,
    pending: HashMap<Id, PendingCall>,

    invalidation_sender: mpsc::UnboundedSender<AppEvent>,
    invalidations: mpsc::UnboundedReceiver<AppEvent>,
}

impl<E: RestEntity, T: HttpTransport + 'static> ListController<E, T> {
    pub fn new(
        service: EntityService<E, T>,
        account_service: AccountService<T>,
        alerts: AlertService,
        event_manager: EventManager,
    ) -> Self {
        let (invalidation_sender, invalidations) = mpsc::unbounded_channel();
        Self {
            service,
            account_service,
            alerts,
            event_manager,
            query_options: None,
            runtime: Handle::try_current().ok(),
            state: ListState::Uninitialized,
            items: Vec::new(),
            current_account: None,
            event_subscriber: None,
            destroyed: false,
            latest_query: 0,
            tasks: JoinSet::new(),
            pending: HashMap::new(),
            invalidation_sender,
            invalidations,
        }
    }

    /// Send `options` with every query instead of loading the whole collection
    pub fn with_query_options(mut self, options: RequestOptions) -> Self {
        self.query_options = Some(options);
        self
    }

    /// Spawn request tasks on `runtime`
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Start loading, resolve the current account and listen for invalidations.
    ///
    /// Without a Tokio runtime the load fails with an error alert instead of
    /// panicking.
    pub fn init(&mut self) {
        if self.destroyed {
            tracing::warn!("{} list controller initialized after teardown", E::NAME);
            return;
        }
        tracing::info!("Initializing {} list", E::NAME);
        self.load_all();
        self.request_identity();
        self.register_change_listener();
    }

    /// Issue a full query; its result replaces the list
    pub fn load_all(&mut self) {
        if self.destroyed {
            return;
        }
        self.latest_query += 1;
        let sequence = self.latest_query;
        self.state = ListState::Loading;
        tracing::debug!("Loading {} list (query #{})", E::NAME, sequence);

        let service = self.service.clone();
        let options = self.query_options.clone();
        let spawned = self.spawn_call(PendingCall::Query(sequence), async move {
            let result = service.query(options.as_ref()).await;
            CallOutcome::Query { sequence, result }
        });
        if !spawned {
            self.on_error(format!("Cannot load {} list: no Tokio runtime available", E::NAME));
        }
    }

    fn request_identity(&mut self) {
        let account_service = self.account_service.clone();
        let spawned = self.spawn_call(PendingCall::Identity, async move {
            CallOutcome::Identity(account_service.identity(false).await)
        });
        if !spawned {
            tracing::warn!("Cannot resolve current account: no Tokio runtime available");
        }
    }

    fn spawn_call<F>(&mut self, call: PendingCall, task: F) -> bool
    where
        F: Future<Output = CallOutcome<E>> + Send + 'static,
    {
        let Some(runtime) = self.runtime.as_ref() else {
            return false;
        };
        let handle = self.tasks.spawn_on(task, runtime);
        self.pending.insert(handle.id(), call);
        true
    }

    fn register_change_listener(&mut self) {
        if self.event_subscriber.is_some() {
            return;
        }
        let sender = self.invalidation_sender.clone();
        let subscription = self
            .event_manager
            .subscribe(E::LIST_MODIFICATION, move |event| {
                // receiver is gone once the controller is dropped
                let _ = sender.send(event.clone());
            });
        self.event_subscriber = Some(subscription);
    }

    /// Release the event subscription, abort running calls and stop handling results
    pub fn destroy(&mut self) {
        if let Some(subscription) = self.event_subscriber.take() {
            tracing::info!("Tearing down {} list", E::NAME);
            subscription.unsubscribe();
        }
        self.tasks.abort_all();
        self.destroyed = true;
    }

    /// Handle every invalidation and finished call that is ready without
    /// waiting; returns how many were handled
    pub fn poll(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.invalidations.try_recv() {
            self.on_invalidated(event);
            handled += 1;
        }
        while let Some(joined) = self.tasks.try_join_next_with_id() {
            self.on_joined(joined);
            handled += 1;
        }
        handled
    }

    /// Wait until every running call and queued invalidation has been handled
    pub async fn settle(&mut self) {
        loop {
            self.poll();
            match self.tasks.join_next_with_id().await {
                Some(joined) => self.on_joined(joined),
                None => break,
            }
        }
    }

    fn on_invalidated(&mut self, event: AppEvent) {
        if self.destroyed {
            return;
        }
        tracing::debug!("{} received: {}", event.kind(), event.content());
        self.load_all();
    }

    fn on_joined(&mut self, joined: Joined<E>) {
        match joined {
            Ok((id, outcome)) => {
                self.pending.remove(&id);
                self.on_outcome(outcome);
            }
            Err(error) => {
                let call = self.pending.remove(&error.id());
                if self.destroyed {
                    return;
                }
                match call {
                    Some(PendingCall::Query(sequence)) if sequence == self.latest_query => {
                        self.on_error(format!("Request to {} failed: {}", E::RESOURCE_PATH, error));
                    }
                    Some(PendingCall::Query(sequence)) => {
                        tracing::debug!("Stale {} query #{} failed: {}", E::NAME, sequence, error);
                    }
                    Some(PendingCall::Identity) | None => {
                        tracing::warn!("Could not resolve current account: {}", error);
                    }
                }
            }
        }
    }

    fn on_outcome(&mut self, outcome: CallOutcome<E>) {
        if self.destroyed {
            return;
        }
        match outcome {
            CallOutcome::Query { sequence, result } => {
                if sequence != self.latest_query {
                    tracing::debug!(
                        "Discarding stale {} query #{} (latest #{})",
                        E::NAME,
                        sequence,
                        self.latest_query
                    );
                    return;
                }
                self.on_query_result(result);
            }
            CallOutcome::Identity(result) => match result {
                Ok(account) => self.current_account = account,
                Err(e) => tracing::warn!("Could not resolve current account: {}", e),
            },
        }
    }

    fn on_query_result(&mut self, result: Result<EntityArrayResponse<E>, HttpError>) {
        match result {
            Ok(response) if response.ok() => {
                self.items = response.body.unwrap_or_default();
                self.state = ListState::Loaded;
                tracing::debug!("Loaded {} {} item(s)", self.items.len(), E::NAME);
            }
            Ok(response) => {
                let error = HttpError::Status {
                    url: response.url,
                    status: response.status,
                    status_text: response.status_text,
                    body: None,
                };
                self.on_error(error.message());
            }
            Err(e) => self.on_error(e.message()),
        }
    }

    fn on_error(&mut self, message: String) {
        self.state = ListState::Error;
        self.alerts.error(message);
    }

    /// Stable key for rendering `item`
    pub fn track_id(&self, _index: usize, item: &E) -> Option<i64> {
        item.id()
    }

    pub fn state(&self) -> ListState {
        self.state
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn current_account(&self) -> Option<&Account> {
        self.current_account.as_ref()
    }

    pub fn alerts(&self) -> &AlertService {
        &self.alerts
    }

    pub fn is_subscribed(&self) -> bool {
        self.event_subscriber.is_some()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl<E: RestEntity, T: HttpTransport + 'static> Drop for ListController<E, T> {
    fn drop(&mut self) {
        self.destroy();
    }
}

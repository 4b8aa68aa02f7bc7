use cucumber::World;
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;

use weblioteca::client::controllers::ReservaListController;
use weblioteca::client::events::{AppEvent, EventKind, EventManager};
use weblioteca::client::services::{
    AccountService, AlertService, ApiResponse, EntityService, HttpError, MockTransport,
    ACCOUNT_PATH,
};

/// Resource path of the reservation collection
pub const RESERVAS_PATH: &str = "api/reservas";

/// Application state for the list controller scenarios
#[derive(World)]
#[world(init = Self::new)]
pub struct ListWorld {
    /// Scripted server
    pub transport: Arc<MockTransport>,

    /// Event manager shared with the controller, as in the composition root
    pub events: EventManager,

    /// Alerts raised by the controller
    pub alerts: AlertService,

    /// Real controller under test
    pub controller: Option<ReservaListController<MockTransport>>,
}

impl std::fmt::Debug for ListWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListWorld")
            .field("requests", &self.transport.requests().len())
            .field("alerts", &self.alerts.alerts())
            .field("controller", &self.controller.as_ref().map(|c| c.state()))
            .finish()
    }
}

impl ListWorld {
    pub fn new() -> Self {
        Self {
            transport: Arc::new(MockTransport::new()),
            events: EventManager::new(),
            alerts: AlertService::new(),
            controller: None,
        }
    }

    /// Build the controller on first use
    pub fn controller(&mut self) -> &mut ReservaListController<MockTransport> {
        let transport = Arc::clone(&self.transport);
        let alerts = self.alerts.clone();
        let events = self.events.clone();
        self.controller.get_or_insert_with(|| {
            ReservaListController::new(
                EntityService::new(Arc::clone(&transport)),
                AccountService::new(transport),
                alerts,
                events,
            )
        })
    }

    pub fn reply_with_account(&self, login: &str) {
        self.transport.on(
            Method::GET,
            ACCOUNT_PATH,
            Ok(ApiResponse::json(json!({"login": login, "activated": true}))),
        );
    }

    pub fn reply_with_reservas(&self, ids: &[i64]) {
        let body: Vec<Value> = ids.iter().map(|id| json!({"id": id})).collect();
        self.transport.on(
            Method::GET,
            RESERVAS_PATH,
            Ok(ApiResponse::json(Value::Array(body))),
        );
    }

    pub fn fail_reserva_queries(&self, message: &str) {
        self.transport.on(
            Method::GET,
            RESERVAS_PATH,
            Err(HttpError::Transport {
                url: RESERVAS_PATH.to_string(),
                message: message.to_string(),
            }),
        );
    }

    pub fn broadcast(&self, kind: EventKind) -> usize {
        let event = AppEvent::list_modification(kind, "changed elsewhere");
        self.events.broadcast(event)
    }

    pub fn reserva_query_count(&self) -> usize {
        self.transport.request_count(&Method::GET, RESERVAS_PATH)
    }

    /// Let spawned requests finish and their handlers run
    pub async fn settle(&mut self) {
        if let Some(controller) = self.controller.as_mut() {
            controller.settle().await;
        }
    }
}

/// Parse a comma separated id list such as `1,2`
pub fn parse_ids(ids: &str) -> Vec<i64> {
    ids.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| id.parse().expect("numeric id"))
        .collect()
}

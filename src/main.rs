//! # Weblioteca Main Entry Point
//!
//! Command line client for the Weblioteca REST API. `main` is the composition
//! root: it builds the transport, the event manager and the shared services,
//! then hands them to the command being run.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::io::{self, Write};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use weblioteca::cmd_args::{Command, CommandLineArgs, Resource};
use weblioteca::config::{self, ConnectionProfile, IniProfileStore};
use weblioteca::{
    AccountService, AlertService, AppEvent, Emprestimo, EntityService, EventManager,
    ListController, ListState, Livro, ReqwestTransport, Reserva, RestEntity,
};

/// Shared services handed to every command
struct AppContext {
    transport: Arc<ReqwestTransport>,
    events: EventManager,
    alerts: AlertService,
    accounts: AccountService<ReqwestTransport>,
}

impl AppContext {
    fn new(transport: ReqwestTransport) -> Self {
        let transport = Arc::new(transport);
        Self {
            accounts: AccountService::new(Arc::clone(&transport)),
            transport,
            events: EventManager::new(),
            alerts: AlertService::new(),
        }
    }

    fn service<E: RestEntity>(&self) -> EntityService<E, ReqwestTransport> {
        EntityService::new(Arc::clone(&self.transport))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CommandLineArgs::parse();
    init_tracing(args.verbose());

    let profile_path = config::get_profile_path();
    let profile = load_profile(args.profile(), &profile_path)?;
    let transport =
        ReqwestTransport::new(&profile).context("Failed to create HTTP client from profile")?;
    let context = AppContext::new(transport);

    let result = match args.command().resource() {
        Resource::Emprestimos => run::<Emprestimo>(&context, args.command()).await,
        Resource::Reservas => run::<Reserva>(&context, args.command()).await,
        Resource::Livros => run::<Livro>(&context, args.command()).await,
    };
    report_alerts(&context.alerts, &mut io::stderr())?;
    result
}

/// Initialize tracing; `RUST_LOG` wins over the weblioteca log level variable
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose {
            "debug".to_string()
        } else {
            std::env::var(config::LOG_LEVEL_ENV_VAR)
                .map(|level| level.to_lowercase())
                .unwrap_or_else(|_| "warn".to_string())
        };
        EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("warn"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load profile from INI file or return blank profile if not found
fn load_profile(profile_name: &str, profile_path: &str) -> Result<ConnectionProfile> {
    tracing::debug!("Loading profile '{}' from '{}'", profile_name, profile_path);

    let store = IniProfileStore::new(profile_path);
    let profile = match store.get_profile(profile_name)? {
        Some(p) => {
            tracing::debug!("Profile loaded successfully, server: {}", p.server());
            p
        }
        None => {
            tracing::debug!("Profile '{}' not found, using blank profile", profile_name);
            ConnectionProfile::blank()
        }
    };
    Ok(profile)
}

async fn run<E: RestEntity>(context: &AppContext, command: &Command) -> Result<()> {
    let service = context.service::<E>();

    match command {
        Command::List { .. } => {
            let mut controller = ListController::new(
                service,
                context.accounts.clone(),
                context.alerts.clone(),
                context.events.clone(),
            );
            if let Some(options) = command.request_options() {
                controller = controller.with_query_options(options);
            }
            controller.init();
            controller.settle().await;

            if controller.state() == ListState::Error {
                bail!("Failed to list {}", E::RESOURCE_PATH);
            }
            print_json(controller.items())?;
            controller.destroy();
        }
        Command::Get { id, .. } => {
            let response = service.find(*id).await?;
            print_json(&response.body)?;
        }
        Command::Create { json, .. } => {
            let entity: E = serde_json::from_str(json).context("Invalid entity JSON")?;
            let response = service.create(&entity).await?;
            notify::<E>(context, "Created", response.body.as_ref().and_then(|e| e.id()));
            print_json(&response.body)?;
        }
        Command::Update { json, .. } => {
            let entity: E = serde_json::from_str(json).context("Invalid entity JSON")?;
            if entity.id().is_none() {
                bail!("Updating a {} requires an id", E::NAME);
            }
            let response = service.update(&entity).await?;
            notify::<E>(context, "Updated", entity.id());
            print_json(&response.body)?;
        }
        Command::Delete { id, .. } => {
            service.delete(*id).await?;
            notify::<E>(context, "Deleted", Some(*id));
        }
    }
    Ok(())
}

/// Announce a mutation so list views of the resource reload
fn notify<E: RestEntity>(context: &AppContext, action: &str, id: Option<i64>) {
    let content = match id {
        Some(id) => format!("{action} {} {id}", E::NAME),
        None => format!("{action} {}", E::NAME),
    };
    context.alerts.success(content.clone());
    context
        .events
        .broadcast(AppEvent::list_modification(E::LIST_MODIFICATION, content));
}

/// Drain pending alerts to `out`, one `severity: message` line each
fn report_alerts(alerts: &AlertService, out: &mut impl Write) -> io::Result<()> {
    for alert in alerts.take() {
        writeln!(out, "{}: {}", alert.severity, alert.message)?;
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

use std::ffi::OsString;

use crate::client::models::RequestOptions;
pub use clap::Parser;
use clap::{Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct ClapArgs {
    /// Profile name
    /// Profile to read the server connection from. Default is 'default'.
    /// If the profile is not configured, the local development server is used.
    #[clap(short = 'p', long, default_value = "default", help = "profile name")]
    profile: String,

    #[clap(short = 'v', long, help = "log requests and responses")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// REST resources reachable from the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Emprestimos,
    Reservas,
    Livros,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List a resource
    List {
        resource: Resource,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        size: Option<u32>,
        /// Sort entry such as `id,desc`; repeatable
        #[arg(long = "sort")]
        sort: Vec<String>,
        /// Filter as `key=value`; repeatable
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },
    /// Show one record
    Get { resource: Resource, id: i64 },
    /// Create a record from a JSON document
    Create { resource: Resource, json: String },
    /// Update a record from a JSON document carrying its id
    Update { resource: Resource, json: String },
    /// Delete one record
    Delete { resource: Resource, id: i64 },
}

impl Command {
    pub fn resource(&self) -> Resource {
        match self {
            Self::List { resource, .. }
            | Self::Get { resource, .. }
            | Self::Create { resource, .. }
            | Self::Update { resource, .. }
            | Self::Delete { resource, .. } => *resource,
        }
    }

    /// Query options of a `list` command; `None` when none were given
    pub fn request_options(&self) -> Option<RequestOptions> {
        let Self::List {
            page,
            size,
            sort,
            filters,
            ..
        } = self
        else {
            return None;
        };

        let options = RequestOptions {
            page: *page,
            size: *size,
            sort: sort.clone(),
            filters: filters.iter().cloned().collect(),
        };
        (options != RequestOptions::default()).then_some(options)
    }
}

fn parse_filter(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((key, val)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), val.trim().to_string()))
        }
        _ => Err(format!("expected key=value, got '{value}'")),
    }
}

#[derive(Debug, Clone)]
pub struct CommandLineArgs {
    profile: String,
    verbose: bool,
    command: Command,
}

impl CommandLineArgs {
    pub fn parse() -> Self {
        Self::from_clap(ClapArgs::parse())
    }

    pub fn parse_from<I, T>(itr: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::from_clap(ClapArgs::parse_from(itr))
    }

    fn from_clap(args: ClapArgs) -> Self {
        Self {
            profile: args.profile,
            verbose: args.verbose,
            command: args.command,
        }
    }

    pub fn profile(&self) -> &String {
        &self.profile
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

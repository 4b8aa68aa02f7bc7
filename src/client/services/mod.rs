//! # Services Layer
//!
//! Services wrap the HTTP transport and other shared resources for the
//! controllers:
//! - Entity services issue CRUD calls for one REST resource
//! - The account service resolves the signed-in identity
//! - The alert service collects user-visible notifications

pub mod account;
pub mod alert;
pub mod entity;
pub mod http;
pub mod mock;

// Re-export service types
pub use account::{AccountService, ACCOUNT_PATH};
pub use alert::{Alert, AlertService, AlertSeverity};
pub use entity::{
    EmprestimoService, EntityArrayResponse, EntityResponse, EntityService, LivroService,
    ReservaService, TOTAL_COUNT_HEADER,
};
pub use http::{ApiRequest, ApiResponse, HttpError, HttpTransport, ReqwestTransport};
pub use mock::MockTransport;

//! Recipe edit workflow for Recipebox.
//!
//! Ties the pieces together on top of an [`AggregateStore`]:
//! - [`identity`]: resolving the calling tenant
//! - [`gate`]: ownership checks before mutations
//! - [`reconcile`]: position-keyed reconciliation of steps and ingredients
//! - [`service`]: the list/view/edit/update/delete/create operations
//! - [`config`], [`store`], [`observability`]: bootstrapping
//!
//! # Example
//!
//! ```ignore
//! use recipebox_service::{RecipeService, Session, SessionResolver};
//!
//! let service = RecipeService::new(recipebox_db_memory::create_store(), SessionResolver);
//! let session = Session::authenticated(tenant_id);
//! let nav = service.create(&session).await?;
//! ```
//!
//! [`AggregateStore`]: recipebox_storage::AggregateStore

pub mod config;
pub mod error;
pub mod gate;
pub mod identity;
pub mod observability;
pub mod reconcile;
pub mod service;
pub mod store;

pub use config::{AppConfig, ConfigError, LoggingConfig, StorageBackend, StorageSettings};
pub use error::ServiceError;
pub use gate::AuthorizationGate;
pub use identity::{IdentityResolver, Session, SessionResolver};
pub use reconcile::{ReconcileOutcome, ReconciliationEngine};
pub use service::{Navigation, RecipeForm, RecipeService};
pub use store::create_store;

//! # Domain Entities
//!
//! Records persisted by the authentication backend.
//!
//! ## Entities
//!
//! - **User**: account with credentials and contact email
//! - **Session**: bearer token issued at login
//! - **AccessToken**: administratively managed bearer token
//! - **Log**: immutable trace of one operation, shipped to the log collector
//!
//! ## Store Traits
//!
//! The generic [`Store`] trait is defined next to the [`Entity`] capability.
//! These traits are implemented in the infrastructure layer, following the
//! dependency inversion principle.

mod access_token;
mod entity;
mod log;
mod session;
mod token;
mod user;

pub use access_token::AccessToken;
pub use entity::{Entity, EntityFilter, Store, UNASSIGNED_ID};
pub use log::{Log, LogLevel, OperationKind};
pub use session::Session;
pub use token::{TokenFilter, TokenParts, TokenRecord};
pub use user::{User, UserFilter, UserStore};

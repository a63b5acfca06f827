//! # Domain Layer
//!
//! The domain layer contains the core records of the authentication backend
//! and the contracts the outer layers implement.
//!
//! ## Structure
//!
//! - **entities**: Persisted records (User, Session, AccessToken), the
//!   `Entity` capability, the generic `Store` trait and the `Log` value
//! - **ports**: Traits for external collaborators (OTP cache, email,
//!   captcha, log shipping)
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Store and port traits define data access contracts
//! - Entities expose identity and the active flag through one capability

pub mod entities;
pub mod ports;

// Re-export commonly used types
pub use entities::*;
pub use ports::*;

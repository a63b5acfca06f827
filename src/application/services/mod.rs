//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **EntityService**: Validated CRUD and activation over any entity
//! - **UserService**: Login, passcode login, password reset, paged search
//! - **OtpService**: One-time passcode generation and checking
//! - **TokenService**: Bearer token issue and decode

pub mod entity_service;
pub mod otp_service;
pub mod password;
pub mod token_service;
pub mod user_service;

pub use entity_service::{EntityOperations, EntityService, MISSING_DATA};
pub use otp_service::{OtpService, OtpServiceImpl};
pub use token_service::{Claims, IssuedToken, TokenService};
pub use user_service::{UserService, UserServiceImpl};

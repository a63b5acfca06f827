//! # Auth Backend Library
//!
//! This crate provides a user authentication backend with:
//! - RESTful HTTP API endpoints answering with a uniform result envelope
//! - Password login, one-time passcode login and password reset
//! - Generic validated CRUD over users, sessions and access tokens
//! - PostgreSQL or in-memory storage, Redis or in-memory passcode cache
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Entities, store traits and collaborator ports
//! - **Application Layer**: Services, the validation gate and DTOs
//! - **Infrastructure Layer**: Database, cache, and external service implementations
//! - **Presentation Layer**: HTTP handlers and middleware
//!
//! ## Module Structure
//!
//! ```text
//! auth_backend/
//! +-- config/         Configuration management
//! +-- domain/         Entities, store traits and ports
//! +-- application/    Services, validators and DTOs
//! +-- infrastructure/ Stores, passcode cache, HTTP clients, metrics
//! +-- presentation/   HTTP routes and middleware
//! +-- shared/         Result envelope, errors, validation rules
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;

//! REST API endpoint tests, driven through the router over in-memory stores.

mod auth_tests;
mod health_tests;
mod session_tests;
mod user_tests;

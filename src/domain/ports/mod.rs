//! Ports to external collaborators.
//!
//! Each trait describes one outside service the application layer talks to.
//! Adapters live in `infrastructure`; unit tests use the `mockall` mocks
//! generated here.

mod captcha_verifier;
mod email_sender;
mod log_sink;
mod otp_store;

pub use captcha_verifier::CaptchaVerifier;
pub use email_sender::EmailSender;
pub use log_sink::LogSink;
pub use otp_store::OtpStore;

#[cfg(test)]
pub use captcha_verifier::MockCaptchaVerifier;
#[cfg(test)]
pub use email_sender::MockEmailSender;
#[cfg(test)]
pub use log_sink::MockLogSink;
#[cfg(test)]
pub use otp_store::MockOtpStore;

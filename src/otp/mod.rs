// Core architecture components
mod code;
mod config;
mod error;
mod issuer;
mod service;
mod service_builder;
mod time_utils;
mod verifier;

// Collaborator seams
pub mod notifier;
pub mod store;

// SMTP delivery (optional feature)
#[cfg(feature = "smtp-notifier")]
pub mod smtp;

// Core components exports
pub use code::CodeGeneratorFn;
pub use config::{ConfigPreset, OtpConfig};
pub use error::AuthError;
pub use service::OtpAuth;
pub use service_builder::OtpAuthBuilder;
pub use time_utils::ClockFn;

// Collaborator exports
pub use notifier::Notifier;
pub use store::{MemoryStore, NewUser, OtpRecord, OtpStore, UserRecord, UserStore};

#[cfg(feature = "sqlite-storage")]
pub use store::SqliteStore;

// SMTP delivery exports (optional feature)
#[cfg(feature = "smtp-notifier")]
pub use smtp::{SmtpConfig, SmtpNotifier};

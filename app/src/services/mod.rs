// app/src/services/mod.rs

//! Adapters to the outside world: mail provider, archival export,
//! app attestation and admin credentials.

pub mod attestation;
pub mod auth_service;
pub mod exporter;
pub mod mailer;

pub use attestation::AttestationVerifier;
pub use exporter::{backup_prefix, DatabaseExporter, ExportError, ExportReport, SnapshotExporter};
pub use mailer::{LogMailer, MailError, Mailer, MessageId, OutgoingEmail, SendGridMailer};

//! Asynchronous extraction-job lifecycle: submit, list, poll, cancel,
//! acknowledge, and artifact download.

pub mod client;
pub mod types;

pub use client::JobClient;
pub use types::{Job, JobStatus, StatusReport, SubmitParameters};

//! Keywork — client SDK for a keyword-extraction service.
//!
//! Authenticates a service account against the service's OAuth2 token
//! endpoint, keeps the session alive across access-token expiry, and drives
//! the asynchronous extraction-job lifecycle: submit a spreadsheet, poll or
//! cancel the job, download the finished workbook.
//!
//! # Quick start
//!
//! ```no_run
//! use keywork::prelude::*;
//!
//! # async fn example() -> keywork::error::Result<()> {
//! let config = Config::new(
//!     "https://extract.example.com",
//!     ClientIdentity::new("client-id", "client-secret"),
//! );
//! let client = KeyworkClient::new(config);
//! client.session().login("ops@example.com", "password").await?;
//!
//! let contents = std::fs::read("keywords.xlsx")?;
//! let id = client
//!     .jobs()
//!     .submit("keywords.xlsx", contents, &SubmitParameters::default())
//!     .await?;
//! let report = client.jobs().status(id).await?;
//! println!("job {id}: {}", report.status_code);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod jobs;
pub mod prelude;
pub mod users;

pub use client::KeyworkClient;

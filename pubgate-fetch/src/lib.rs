//! # pubgate-fetch
//!
//! Produces the payload a run fingerprints and publishes: one string per
//! line. [`OriginCertFetcher`] downloads a PEM certificate bundle and turns it
//! into certificate thumbprints; [`LinesFileSource`] reads a prepared file.

pub mod cert;
pub mod error;
pub mod source;

pub use cert::{thumbprint, thumbprints_from_pem};
pub use error::FetchError;
pub use source::{LinesFileSource, OriginCertFetcher, SourceFetcher};

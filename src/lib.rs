//! Resolve descriptive attributes of a block device (removable flag, vendor, model) through
//! macOS Disk Arbitration.
//!
//! Every query opens its own Disk Arbitration session, looks up the disk by BSD name, copies its
//! description and releases everything again. Nothing is cached and nothing is retried.
//!
//! # Platform Support
//!
//! - MacOS
//!
//! Types are available everywhere so callers can name them from platform independent code.
//!
//! # Features
//!
//! - `serde`: `Serialize` for the public result types.
//! - `cli`: `bb-disk-attributes` command line tool.
//!
//! # Usage
//!
//! ```no_run
//! # #[cfg(target_os = "macos")]
//! # fn main() -> Result<(), bb_disk_attributes::Error> {
//! use bb_disk_attributes::Lookup;
//!
//! match bb_disk_attributes::query(c"disk2")? {
//!     Lookup::Described(attrs) => println!("{:?} {:?}", attrs.vendor, attrs.model),
//!     Lookup::NotFound => println!("disk2 is gone"),
//!     Lookup::Unavailable => println!("Disk Arbitration is not reachable"),
//! }
//! # Ok(())
//! # }
//! # #[cfg(not(target_os = "macos"))]
//! # fn main() {}
//! ```
#![cfg_attr(not(any(test, target_os = "macos")), allow(dead_code))]

use std::{io, str::Utf8Error, time::Duration};

use thiserror::Error;

mod description;
mod disk;
#[cfg(test)]
mod fake;
pub mod geometry;
mod guard;
mod native;
mod pal;
mod query;
mod session;

pub use geometry::SectorSize;
pub use native::Key;
pub use query::{DiskAttributes, Lookup};

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
/// Errors for this crate
///
/// Expected absences (no session, no disk, no description, missing key) are never errors, see
/// [`Lookup`] and [`DiskAttributes`].
pub enum Error {
    /// Disk Arbitration returned a value whose type contradicts its key.
    #[error("Value of {key} is not a {expected}")]
    UnexpectedType { key: Key, expected: &'static str },
    #[error("Failed to convert value of {key} to a UTF-8 string")]
    StringConversion { key: Key },
    #[error("Value of {key} is not valid UTF-8: {source}")]
    InvalidUtf8 {
        key: Key,
        #[source]
        source: Utf8Error,
    },
    #[error("Query for {name} did not finish within {timeout:?}")]
    Timeout { name: String, timeout: Duration },
    #[error("Query worker exited without a result")]
    WorkerLost,
    #[error("Failed to spawn query worker: {0}")]
    Spawn(io::Error),
}

/// Resolve the removable flag, vendor and model of the disk with BSD name `bsd_name`
/// (e.g. `disk2`).
///
/// The name is passed to Disk Arbitration unmodified. Blocks until the service answers.
#[cfg(target_os = "macos")]
pub fn query(bsd_name: &std::ffi::CStr) -> Result<Lookup> {
    query::query_with(&pal::DiskArbitration, bsd_name)
}

/// [`query`] with an upper bound on the time spent waiting.
///
/// The query runs on a worker thread. On timeout the worker is abandoned, not interrupted, and
/// may keep the native call running in the background.
#[cfg(target_os = "macos")]
pub fn query_timeout(bsd_name: &std::ffi::CStr, timeout: Duration) -> Result<Lookup> {
    let name = bsd_name.to_owned();
    query::run_detached(bsd_name, timeout, move || query(&name))
}

use std::ffi::CStr;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use crate::native::{Arbitration, Key};
use crate::session::Session;
use crate::{Error, Result};

/// Descriptive attributes of a disk. `None` marks an attribute the disk does not report.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DiskAttributes {
    /// Media is removable from the running system
    pub removable: Option<bool>,
    pub vendor: Option<String>,
    pub model: Option<String>,
}

/// Outcome of a disk query.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "status", content = "attributes", rename_all = "snake_case"))]
pub enum Lookup {
    /// The disk exists. Attributes it cannot describe are `None`.
    Described(DiskAttributes),
    /// No disk with that name exists at query time.
    NotFound,
    /// Disk Arbitration could not be reached, no disk was looked up.
    Unavailable,
}

impl Lookup {
    /// Collapse a missing disk into empty attributes. `None` only if the service is unavailable.
    pub fn into_attributes(self) -> Option<DiskAttributes> {
        match self {
            Self::Described(attrs) => Some(attrs),
            Self::NotFound => Some(DiskAttributes::default()),
            Self::Unavailable => None,
        }
    }
}

fn trim_end(s: Option<String>) -> Option<String> {
    s.map(|mut s| {
        s.truncate(s.trim_end().len());
        s
    })
}

/// Resolve the attributes of `bsd_name` with a fresh session.
///
/// References are released in reverse order of acquisition (dictionary, disk, session) on every
/// return path, including errors.
pub(crate) fn query_with<A: Arbitration>(api: &A, bsd_name: &CStr) -> Result<Lookup> {
    let Some(session) = Session::open(api) else {
        return Ok(Lookup::Unavailable);
    };
    let Some(disk) = session.resolve(bsd_name) else {
        return Ok(Lookup::NotFound);
    };
    let Some(description) = disk.describe() else {
        return Ok(Lookup::Described(DiskAttributes::default()));
    };

    let attrs = DiskAttributes {
        removable: description.boolean(Key::MediaRemovable)?,
        vendor: trim_end(description.text(Key::DeviceVendor)?),
        model: trim_end(description.text(Key::DeviceModel)?),
    };
    tracing::debug!(?bsd_name, ?attrs, "Resolved disk attributes");

    Ok(Lookup::Described(attrs))
}

/// Run `job` on a detached worker thread and wait at most `timeout` for its result.
///
/// A worker that does not finish in time is abandoned, not interrupted. It keeps running until
/// the native call returns and its result is dropped.
pub(crate) fn run_detached<F>(name: &CStr, timeout: Duration, job: F) -> Result<Lookup>
where
    F: FnOnce() -> Result<Lookup> + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel(1);

    std::thread::Builder::new()
        .name("disk-query".to_string())
        .spawn(move || {
            // Receiver is gone once the caller timed out.
            let _ = tx.send(job());
        })
        .map_err(Error::Spawn)?;

    match rx.recv_timeout(timeout) {
        Ok(res) => res,
        Err(RecvTimeoutError::Timeout) => {
            let name = name.to_string_lossy().into_owned();
            tracing::warn!(%name, ?timeout, "Disk query timed out, abandoning worker");
            Err(Error::Timeout { name, timeout })
        }
        Err(RecvTimeoutError::Disconnected) => Err(Error::WorkerLost),
    }
}

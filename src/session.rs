use crate::guard::Owned;
use crate::native::Arbitration;

/// Query session with the Disk Arbitration service.
///
/// Disks resolved through a session borrow it, so the session is always released last.
#[derive(Debug)]
pub(crate) struct Session<'a, A: Arbitration> {
    pub(crate) inner: Owned<'a, A>,
}

impl<'a, A: Arbitration> Session<'a, A> {
    /// `None` when the service is not reachable from this process, e.g. inside a sandbox.
    pub(crate) fn open(api: &'a A) -> Option<Self> {
        let Some(inner) = Owned::adopt(api, api.create_session()) else {
            tracing::debug!("Disk Arbitration session unavailable");
            return None;
        };
        Some(Self { inner })
    }
}

use std::ffi::CStr;

use crate::guard::Owned;
use crate::native::Arbitration;
use crate::session::Session;

/// Handle of a single disk, alive at most as long as the [`Session`] it came from.
#[derive(Debug)]
pub(crate) struct Disk<'s, A: Arbitration> {
    pub(crate) inner: Owned<'s, A>,
}

impl<A: Arbitration> Session<'_, A> {
    /// Look up a disk by BSD name (`disk2`, `disk2s1`, ...). The name is passed through as is.
    ///
    /// `None` if no such disk exists right now, which includes disks removed since they were
    /// enumerated.
    pub(crate) fn resolve<'s>(&'s self, bsd_name: &CStr) -> Option<Disk<'s, A>> {
        let api = self.inner.api();
        let Some(inner) = Owned::adopt(api, api.create_disk(self.inner.as_raw(), bsd_name)) else {
            tracing::debug!(?bsd_name, "No such disk");
            return None;
        };
        Some(Disk { inner })
    }
}

use crate::native::Arbitration;

/// Single owner of one counted native reference.
///
/// Only built from a successful creation call, so there is never a null reference to release.
/// The reference is released when the guard is dropped. Moving the guard moves ownership, it is
/// neither `Clone` nor `Copy`.
pub(crate) struct Owned<'a, A: Arbitration> {
    api: &'a A,
    raw: A::Ref,
}

impl<'a, A: Arbitration> Owned<'a, A> {
    /// Take ownership of the result of a `create_*` or `copy_*` call.
    pub(crate) fn adopt(api: &'a A, created: Option<A::Ref>) -> Option<Self> {
        created.map(|raw| {
            tracing::trace!(?raw, "Acquired native reference");
            Self { api, raw }
        })
    }

    pub(crate) const fn api(&self) -> &'a A {
        self.api
    }

    /// Underlying reference, valid while `self` is alive.
    pub(crate) fn as_raw(&self) -> A::Ref {
        self.raw
    }
}

impl<A: Arbitration> Drop for Owned<'_, A> {
    fn drop(&mut self) {
        tracing::trace!(raw = ?self.raw, "Releasing native reference");
        self.api.release(self.raw);
    }
}

impl<A: Arbitration> std::fmt::Debug for Owned<'_, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Owned").field(&self.raw).finish()
    }
}

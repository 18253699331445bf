use std::ffi::CStr;

use crate::disk::Disk;
use crate::guard::Owned;
use crate::native::{Arbitration, Key};
use crate::{Error, Result};

/// Description dictionary of a disk.
///
/// Owned independently of the [`Disk`] that produced it.
#[derive(Debug)]
pub(crate) struct Description<'a, A: Arbitration> {
    inner: Owned<'a, A>,
}

impl<'s, A: Arbitration> Disk<'s, A> {
    /// `None` if the service cannot describe the disk right now, e.g. while it is still being
    /// probed.
    pub(crate) fn describe(&self) -> Option<Description<'s, A>> {
        let api = self.inner.api();
        let Some(inner) = Owned::adopt(api, api.copy_description(self.inner.as_raw())) else {
            tracing::debug!("Disk has no description");
            return None;
        };
        Some(Description { inner })
    }
}

impl<A: Arbitration> Description<'_, A> {
    fn value(&self, key: Key) -> Option<A::Ref> {
        self.inner.api().value(self.inner.as_raw(), key)
    }

    /// Read a boolean entry. `Ok(None)` if `key` is missing.
    pub(crate) fn boolean(&self, key: Key) -> Result<Option<bool>> {
        let Some(value) = self.value(key) else {
            return Ok(None);
        };

        self.inner
            .api()
            .boolean(value)
            .map(Some)
            .ok_or(Error::UnexpectedType {
                key,
                expected: "boolean",
            })
    }

    /// Read a string entry as UTF-8. `Ok(None)` if `key` is missing.
    pub(crate) fn text(&self, key: Key) -> Result<Option<String>> {
        let Some(value) = self.value(key) else {
            return Ok(None);
        };
        let api = self.inner.api();

        // The value is borrowed from the dictionary, it is copied out and never released here.
        let length = api.string_length(value).ok_or(Error::UnexpectedType {
            key,
            expected: "string",
        })?;

        let max_size = api.max_size_for_encoding(length);
        let Ok(max_size) = usize::try_from(max_size) else {
            return Err(Error::StringConversion { key });
        };

        let mut buffer = vec![0u8; max_size + 1];
        if !api.copy_c_string(value, &mut buffer) {
            return Err(Error::StringConversion { key });
        }

        let text = CStr::from_bytes_until_nul(&buffer)
            .map_err(|_| Error::StringConversion { key })?
            .to_str()
            .map_err(|source| Error::InvalidUtf8 { key, source })?;

        Ok(Some(text.to_owned()))
    }
}

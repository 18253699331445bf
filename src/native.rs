//! Seam between the resolver and the native Disk Arbitration / CoreFoundation runtime.

use std::ffi::CStr;
use std::fmt;

/// Well-known keys of a disk description dictionary consumed by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Boolean, `true` for removable media.
    MediaRemovable,
    /// Text, vendor reported by the device.
    DeviceVendor,
    /// Text, model reported by the device.
    DeviceModel,
}

impl Key {
    /// Value of the framework constant backing this key.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MediaRemovable => "DAMediaRemovable",
            Self::DeviceVendor => "DADeviceVendor",
            Self::DeviceModel => "DADeviceModel",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Native calls needed to resolve disk attributes.
///
/// Every `create_*` / `copy_*` call hands out one counted reference that must be passed to
/// [`Arbitration::release`] exactly once. Use [`crate::guard::Owned`] instead of calling
/// `release` by hand.
///
/// References passed back into any method must have been produced by the same implementation
/// and must still be alive. Borrowed references returned by [`Arbitration::value`] are alive for
/// as long as the dictionary they were read from.
pub(crate) trait Arbitration {
    type Ref: Copy + fmt::Debug;

    /// Open a session with the default allocator. `None` if the service is unavailable.
    fn create_session(&self) -> Option<Self::Ref>;

    /// `None` if no disk with that BSD name exists right now.
    fn create_disk(&self, session: Self::Ref, bsd_name: &CStr) -> Option<Self::Ref>;

    /// `None` if the disk cannot be described at the moment.
    fn copy_description(&self, disk: Self::Ref) -> Option<Self::Ref>;

    /// Borrowed lookup, never to be released. `None` if the key is absent.
    fn value(&self, dictionary: Self::Ref, key: Key) -> Option<Self::Ref>;

    /// `None` if `value` is not a boolean.
    fn boolean(&self, value: Self::Ref) -> Option<bool>;

    /// Length in UTF-16 code units, `None` if `value` is not a string.
    fn string_length(&self, value: Self::Ref) -> Option<isize>;

    /// Worst case number of UTF-8 bytes for `length` code units, negative if it overflows.
    fn max_size_for_encoding(&self, length: isize) -> isize;

    /// Copy `value` as a NUL terminated UTF-8 string into `buffer`.
    fn copy_c_string(&self, value: Self::Ref, buffer: &mut [u8]) -> bool;

    fn release(&self, reference: Self::Ref);
}

use core::ffi::c_void;
use std::ffi::{CStr, c_char};
use std::ptr::NonNull;

use objc2_core_foundation::{
    CFBoolean, CFDictionary, CFIndex, CFRetained, CFString, CFStringBuiltInEncodings, CFType, kCFAllocatorDefault,
};
use objc2_disk_arbitration::{
    DADisk, DASession, kDADiskDescriptionDeviceModelKey, kDADiskDescriptionDeviceVendorKey,
    kDADiskDescriptionMediaRemovableKey,
};

use crate::native::{Arbitration, Key};

const ENCODING_UTF8: u32 = CFStringBuiltInEncodings::EncodingUTF8.0;

fn key_string(key: Key) -> &'static CFString {
    // SAFETY: Framework constants, initialized by the loader and never mutated.
    unsafe {
        match key {
            Key::MediaRemovable => kDADiskDescriptionMediaRemovableKey,
            Key::DeviceVendor => kDADiskDescriptionDeviceVendorKey,
            Key::DeviceModel => kDADiskDescriptionDeviceModelKey,
        }
    }
}

fn into_raw<T: objc2_core_foundation::Type>(obj: CFRetained<T>) -> NonNull<CFType> {
    CFRetained::into_raw(obj).cast()
}

/// Disk Arbitration and CoreFoundation, called directly.
///
/// References handed out are `CFRetained` objects turned into raw pointers, so
/// [`Arbitration::release`] is a plain `CFRelease`.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct DiskArbitration;

impl Arbitration for DiskArbitration {
    type Ref = NonNull<CFType>;

    fn create_session(&self) -> Option<Self::Ref> {
        unsafe { DASession::new(kCFAllocatorDefault) }.map(into_raw)
    }

    fn create_disk(&self, session: Self::Ref, bsd_name: &CStr) -> Option<Self::Ref> {
        // SAFETY: `session` is a live DASession owned by a guard.
        let session = unsafe { session.cast::<DASession>().as_ref() };
        let name = NonNull::new(bsd_name.as_ptr() as *mut c_char)?;

        // SAFETY: `name` is NUL terminated and only read for the duration of the call.
        unsafe { DADisk::from_bsd_name(kCFAllocatorDefault, session, name) }.map(into_raw)
    }

    fn copy_description(&self, disk: Self::Ref) -> Option<Self::Ref> {
        // SAFETY: `disk` is a live DADisk owned by a guard.
        let disk = unsafe { disk.cast::<DADisk>().as_ref() };
        unsafe { disk.description() }.map(into_raw)
    }

    fn value(&self, dictionary: Self::Ref, key: Key) -> Option<Self::Ref> {
        // SAFETY: `dictionary` is a live CFDictionary owned by a guard.
        let dictionary = unsafe { dictionary.cast::<CFDictionary>().as_ref() };
        let key = key_string(key);

        // Get rule: the value belongs to the dictionary.
        let value = unsafe { dictionary.value(key as *const CFString as *const c_void) };
        NonNull::new(value as *mut CFType)
    }

    fn boolean(&self, value: Self::Ref) -> Option<bool> {
        // SAFETY: `value` is borrowed from a live dictionary.
        let value = unsafe { value.as_ref() };
        value.downcast_ref::<CFBoolean>().map(CFBoolean::as_bool)
    }

    fn string_length(&self, value: Self::Ref) -> Option<isize> {
        // SAFETY: `value` is borrowed from a live dictionary.
        let value = unsafe { value.as_ref() };
        value.downcast_ref::<CFString>().map(|s| s.length())
    }

    fn max_size_for_encoding(&self, length: isize) -> isize {
        CFString::maximum_size_for_encoding(length, ENCODING_UTF8)
    }

    fn copy_c_string(&self, value: Self::Ref, buffer: &mut [u8]) -> bool {
        // SAFETY: `value` is borrowed from a live dictionary.
        let value = unsafe { value.as_ref() };
        let Some(string) = value.downcast_ref::<CFString>() else {
            return false;
        };
        let Ok(size) = CFIndex::try_from(buffer.len()) else {
            return false;
        };

        // SAFETY: CoreFoundation writes at most `size` bytes into `buffer`.
        unsafe { string.c_string(buffer.as_mut_ptr().cast::<c_char>(), size, ENCODING_UTF8) }
    }

    fn release(&self, reference: Self::Ref) {
        // SAFETY: Only guards call this, once per reference obtained from a create or copy call.
        drop(unsafe { CFRetained::from_raw(reference) });
    }
}

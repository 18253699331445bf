//! Size and sector geometry of raw disk devices.

/// Logical and physical sector size of a disk in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SectorSize {
    pub logical: u32,
    pub physical: u32,
}

#[cfg(target_os = "macos")]
mod dkio {
    // See <sys/disk.h>
    nix::ioctl_read!(get_block_size, b'd', 24, u32);
    nix::ioctl_read!(get_block_count, b'd', 25, u64);
    nix::ioctl_read!(get_physical_block_size, b'd', 77, u32);
}

#[cfg(target_os = "macos")]
pub use darwin::{device_sector_size, device_size, reread_partition_table};

#[cfg(target_os = "macos")]
mod darwin {
    use std::io;
    use std::os::fd::AsRawFd;

    use super::{SectorSize, dkio};

    /// Size of the block device behind `fd` in bytes.
    pub fn device_size(fd: &impl AsRawFd) -> io::Result<u64> {
        let mut block_size = 0u32;
        let mut block_count = 0u64;

        // SAFETY: Both ioctls write a single integer of the declared width.
        unsafe {
            dkio::get_block_size(fd.as_raw_fd(), &mut block_size)?;
            dkio::get_block_count(fd.as_raw_fd(), &mut block_count)?;
        }

        u64::from(block_size)
            .checked_mul(block_count)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "Device size overflows u64"))
    }

    /// Logical and physical sector size of the block device behind `fd`.
    pub fn device_sector_size(fd: &impl AsRawFd) -> io::Result<SectorSize> {
        let mut logical = 0u32;
        let mut physical = 0u32;

        // SAFETY: Both ioctls write a single u32.
        unsafe {
            dkio::get_block_size(fd.as_raw_fd(), &mut logical)?;
            dkio::get_physical_block_size(fd.as_raw_fd(), &mut physical)?;
        }

        Ok(SectorSize { logical, physical })
    }

    /// Make the OS pick up a rewritten partition table.
    ///
    /// Disk Arbitration re-probes media on its own, so there is nothing to do here.
    pub fn reread_partition_table(_fd: &impl AsRawFd) -> io::Result<()> {
        Ok(())
    }

}

use std::ffi::{CStr, c_void};
use std::fmt;
use std::fs::File;
use std::io;
use std::mem::ManuallyDrop;
use std::num::NonZeroUsize;
use std::path::Path;
use std::ptr::NonNull;

use nix::errno::Errno;
use nix::sys::mman::{MapFlags, ProtFlags, mmap, mmap_anonymous, munmap};
use nix::unistd::{SysconfVar, sysconf};

use crate::{Error, Result};

/// System page size.
pub fn page_size() -> Result<usize> {
    match sysconf(SysconfVar::PAGE_SIZE) {
        Ok(Some(size)) => usize::try_from(size)
            .ok()
            .filter(|size| size.is_power_of_two())
            .ok_or(Error::PageSize),
        _ => Err(Error::PageSize),
    }
}

/// Sizes of a file mapping, computed before anything is mapped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapLayout {
    pub file_len:   usize,
    pub mapped_len: usize,
    pub guard_len:  usize,
}

impl MapLayout {
    /// Returns `None` when `file_size` cannot be rounded to a page boundary
    /// without overflowing, or when `page_size` is not a power of two.
    ///
    /// A guard page is added only when `file_size` is a multiple of the page
    /// size: otherwise the zero-filled tail of the last page already holds
    /// the terminator.
    pub fn new(file_size: u64, page_size: usize) -> Option<Self> {
        if !page_size.is_power_of_two() || file_size > isize::MAX as u64 - 1 {
            return None;
        }
        let file_len = usize::try_from(file_size).ok()?;
        let mask = page_size - 1;
        let mapped_len = file_len.checked_add(mask)? & !mask;
        let guard_len = if file_len & mask == 0 { page_size } else { 0 };
        mapped_len.checked_add(guard_len)?;

        Some(Self {
            file_len,
            mapped_len,
            guard_len,
        })
    }

    pub fn has_guard(&self) -> bool { self.guard_len != 0 }

    /// Total address space reserved, guard page included.
    pub fn reserved_len(&self) -> usize { self.mapped_len + self.guard_len }
}

/// A private, read-only mapping of a whole file.
///
/// The byte at `file_len()` is always readable, so [`as_bytes_with_nul`]
/// never reads past the mapping. The region is released on drop or through
/// [`unmap`] with exactly the lengths recorded at mapping time.
///
/// [`as_bytes_with_nul`]: MappedFile::as_bytes_with_nul
/// [`unmap`]: MappedFile::unmap
pub struct MappedFile {
    base:   NonNull<c_void>,
    layout: MapLayout,
}

// SAFETY: the region is mapped read-only and privately, and is never handed
// out mutably.
unsafe impl Send for MappedFile {}
unsafe impl Sync for MappedFile {}

impl MappedFile {
    /// File contents as they were at mapping time.
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: `file_len <= mapped_len` bytes are mapped readable at `base`.
        unsafe { std::slice::from_raw_parts(self.base.as_ptr().cast::<u8>(), self.layout.file_len) }
    }

    /// File contents followed by the terminator byte.
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        // SAFETY: either `file_len < mapped_len`, or `file_len == mapped_len`
        // and a guard page follows the file pages.
        unsafe {
            std::slice::from_raw_parts(self.base.as_ptr().cast::<u8>(), self.layout.file_len + 1)
        }
    }

    /// Contents up to the first NUL byte.
    ///
    /// `None` only if the file grew after mapping and overwrote the
    /// zero-filled tail.
    pub fn as_c_str(&self) -> Option<&CStr> {
        CStr::from_bytes_until_nul(self.as_bytes_with_nul()).ok()
    }

    pub fn file_len(&self) -> usize { self.layout.file_len }

    /// Page-rounded length of the file mapping, excluding the guard page.
    pub fn mapped_len(&self) -> usize { self.layout.mapped_len }

    pub fn has_guard_page(&self) -> bool { self.layout.has_guard() }

    pub fn layout(&self) -> MapLayout { self.layout }

    /// Release the mapping, reporting failures instead of ignoring them.
    pub fn unmap(self) -> Result<()> {
        let this = ManuallyDrop::new(self);
        // SAFETY: `base` and the reserved length are exactly what was mapped,
        // and `this` is never used again.
        unsafe { munmap(this.base, this.layout.reserved_len()) }
            .map_err(|errno| Error::Unmap(io::Error::from(errno)))
    }
}

impl Drop for MappedFile {
    fn drop(&mut self) {
        // SAFETY: see `unmap`.
        if let Err(errno) = unsafe { munmap(self.base, self.layout.reserved_len()) } {
            tracing::warn!(%errno, len = self.layout.reserved_len(), "munmap failed");
        }
    }
}

impl AsRef<[u8]> for MappedFile {
    fn as_ref(&self) -> &[u8] { self.as_bytes() }
}

impl fmt::Debug for MappedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappedFile")
            .field("base", &self.base)
            .field("file_len", &self.layout.file_len)
            .field("mapped_len", &self.layout.mapped_len)
            .field("guard", &self.layout.has_guard())
            .finish()
    }
}

/// Map `path` read-only, NUL-terminated one byte past its logical length.
pub fn map_file(path: impl AsRef<Path>) -> Result<MappedFile> {
    let path = path.as_ref();

    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let size = file
        .metadata()
        .map_err(|source| Error::Stat {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    let layout = MapLayout::new(size, page_size()?).ok_or_else(|| Error::TooLarge {
        path: path.to_path_buf(),
        size,
    })?;

    let mapped = map_layout(&file, &layout);
    drop(file);
    let base = mapped.map_err(|errno| Error::Map {
        path: path.to_path_buf(),
        source: io::Error::from(errno),
    })?;

    tracing::debug!(
        path = %path.display(),
        file_len = layout.file_len,
        mapped_len = layout.mapped_len,
        guard = layout.has_guard(),
        "mapped file"
    );

    Ok(MappedFile { base, layout })
}

fn map_layout(file: &File, layout: &MapLayout) -> nix::Result<NonNull<c_void>> {
    let prot = ProtFlags::PROT_READ;
    let reserved = NonZeroUsize::new(layout.reserved_len()).ok_or(Errno::EINVAL)?;

    if !layout.has_guard() {
        // SAFETY: fresh private read-only mapping, no existing memory aliased.
        return unsafe { mmap(None, reserved, prot, MapFlags::MAP_PRIVATE, file, 0) };
    }

    // Reserve file pages plus an anonymous zero page, then map the file over
    // the front. Touching file pages past EOF would fault; the guard cannot.
    // SAFETY: fresh anonymous mapping.
    let base = unsafe { mmap_anonymous(None, reserved, prot, MapFlags::MAP_PRIVATE) }?;
    let Some(file_pages) = NonZeroUsize::new(layout.mapped_len) else {
        return Ok(base);
    };

    let addr = NonZeroUsize::new(base.as_ptr() as usize);
    // SAFETY: MAP_FIXED only replaces pages inside the reservation made above.
    let fixed = unsafe {
        mmap(
            addr,
            file_pages,
            prot,
            MapFlags::MAP_PRIVATE | MapFlags::MAP_FIXED,
            file,
            0,
        )
    };
    match fixed {
        Ok(_) => Ok(base),
        Err(errno) => {
            // SAFETY: releases the reservation made above, nothing else refers to it.
            let _ = unsafe { munmap(base, reserved.get()) };
            Err(errno)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: usize = 4096;

    #[test]
    fn test_layout_page_aligned_adds_guard() {
        let layout = MapLayout::new(PAGE as u64, PAGE).unwrap();
        assert_eq!(layout.mapped_len, PAGE);
        assert_eq!(layout.guard_len, PAGE);
        assert_eq!(layout.reserved_len(), 2 * PAGE);
    }

    #[test]
    fn test_layout_unaligned_has_no_guard() {
        let layout = MapLayout::new(PAGE as u64 - 1, PAGE).unwrap();
        assert_eq!(layout.mapped_len, PAGE);
        assert!(!layout.has_guard());

        let layout = MapLayout::new(PAGE as u64 + 1, PAGE).unwrap();
        assert_eq!(layout.mapped_len, 2 * PAGE);
        assert!(!layout.has_guard());
    }

    #[test]
    fn test_layout_empty_file_is_guard_only() {
        let layout = MapLayout::new(0, PAGE).unwrap();
        assert_eq!(layout.mapped_len, 0);
        assert_eq!(layout.reserved_len(), PAGE);
    }

    #[test]
    fn test_layout_rejects_oversized() {
        assert_eq!(MapLayout::new(u64::MAX, PAGE), None);
        assert_eq!(MapLayout::new(isize::MAX as u64, PAGE), None);
    }

    #[test]
    fn test_layout_rejects_bad_page_size() {
        assert_eq!(MapLayout::new(10, 0), None);
        assert_eq!(MapLayout::new(10, 3000), None);
    }

    #[test]
    fn test_page_size_is_power_of_two() {
        assert!(page_size().unwrap().is_power_of_two());
    }
}

/*
    MIT License

    Copyright (c) 2026 The charter developers

    Permission is hereby granted, free of charge, to any person obtaining a copy
    of this software and associated documentation files (the "Software"), to deal
    in the Software without restriction, including without limitation the rights
    to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
    copies of the Software, and to permit persons to whom the Software is
    furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in all
    copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
    OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
    SOFTWARE.
*/

//! Append-only buffer over a virtual memory reservation

use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ptr::{self, NonNull};
use std::slice;

/// Errors of the reserved buffer.
///
/// The recognizer propagates these unchanged, so they double as the error
/// type of a parse.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Error {
    /// The virtual memory reservation could not be made.
    Oom,

    /// An append would exceed the reservation made at construction.
    OutOfCapacity,
}

/// Type alias for Results with Errors
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Oom => write!(f, "virtual memory reservation failed"),
            Error::OutOfCapacity => write!(f, "reserved item capacity exhausted"),
        }
    }
}

impl std::error::Error for Error {}

/// Append-only typed buffer backed by one anonymous virtual memory
/// reservation.
///
/// The full capacity is reserved with `mmap` at construction and released as
/// one unit when the buffer is dropped. Pages are committed by the kernel on
/// first touch, so a generous capacity costs address space, not memory.
///
/// Because the backing range never moves, references to live elements stay
/// valid for the lifetime of the buffer. Appending goes through `&self`: the
/// only mutation is a write past the current end, which no outstanding
/// reference can observe. This is what lets the recognizer iterate a state
/// set while it is still being extended.
///
/// `T: Copy` because the buffer never runs element destructors.
#[derive(Debug)]
pub struct ReservedVec<T: Copy> {
    /// First element of the reservation.
    base: NonNull<T>,

    /// Number of live elements.
    len: Cell<usize>,

    /// Maximum number of elements, fixed at construction.
    capacity: usize,

    /// Page-rounded size of the reservation, needed to release it.
    reserved_bytes: usize,

    _marker: PhantomData<T>,
}

impl<T: Copy> ReservedVec<T> {
    /// Reserve address space for `capacity` elements.
    ///
    /// Returns [Error::Oom] if the address space cannot be reserved.
    pub fn new(capacity: usize) -> Result<Self> {
        let page = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as usize;
        debug_assert!(mem::align_of::<T>() <= page);
        let bytes = capacity.checked_mul(mem::size_of::<T>()).ok_or(Error::Oom)?;
        let reserved_bytes = bytes
            .checked_add(page - 1)
            .ok_or(Error::Oom)?
            / page
            * page;
        // A capacity of zero still reserves one page so that `base` is a real
        // mapping.
        let reserved_bytes = reserved_bytes.max(page);

        let addr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                reserved_bytes,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS | libc::MAP_NORESERVE,
                -1,
                0,
            )
        };
        if addr == libc::MAP_FAILED {
            return Err(Error::Oom);
        }

        Ok(Self {
            base: unsafe { NonNull::new_unchecked(addr as *mut T) },
            len: Cell::new(0),
            capacity,
            reserved_bytes,
            _marker: PhantomData,
        })
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.len.get()
    }

    pub fn is_empty(&self) -> bool {
        self.len.get() == 0
    }

    /// Maximum number of elements as given to [new](ReservedVec::new).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append an element and return a reference to its final location.
    ///
    /// Returns [Error::OutOfCapacity] if the reservation is exhausted.
    pub fn push(&self, value: T) -> Result<&T> {
        let len = self.len.get();
        if len == self.capacity {
            return Err(Error::OutOfCapacity);
        }
        unsafe {
            let slot = self.base.as_ptr().add(len);
            ptr::write(slot, value);
            self.len.set(len + 1);
            Ok(&*slot)
        }
    }

    /// Append every element of an iterator.
    pub fn append<I>(&self, iter: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        for value in iter {
            self.push(value)?;
        }
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        if index < self.len.get() {
            unsafe { Some(&*self.base.as_ptr().add(index)) }
        } else {
            None
        }
    }

    /// The live elements as a slice.
    ///
    /// The slice length is fixed at the time of the call; elements appended
    /// later are not part of it but do not invalidate it.
    pub fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.base.as_ptr(), self.len.get()) }
    }

    pub fn iter(&self) -> slice::Iter<T> {
        self.as_slice().iter()
    }
}

impl<T: Copy> std::ops::Index<usize> for ReservedVec<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.as_slice()[index]
    }
}

impl<T: Copy> Drop for ReservedVec<T> {
    fn drop(&mut self) {
        // Elements are Copy, so releasing the mapping is all the cleanup
        // there is.
        unsafe {
            libc::munmap(self.base.as_ptr() as *mut libc::c_void, self.reserved_bytes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_matches::assert_matches;

    #[test]
    fn push_and_get() {
        let buf = ReservedVec::<u32>::new(16).unwrap();
        assert!(buf.is_empty());
        assert_eq!(*buf.push(3).unwrap(), 3);
        assert_eq!(*buf.push(1).unwrap(), 1);
        assert_eq!(*buf.push(4).unwrap(), 4);
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.get(0), Some(&3));
        assert_eq!(buf.get(2), Some(&4));
        assert_eq!(buf.get(3), None);
        assert_eq!(buf[1], 1);
        assert_eq!(buf.as_slice(), &[3, 1, 4]);
    }

    #[test]
    fn append_iter() {
        let buf = ReservedVec::<u32>::new(8).unwrap();
        buf.append(0..5).unwrap();
        assert_eq!(buf.as_slice(), &[0, 1, 2, 3, 4]);
        // Exhausting the capacity in the middle of an append fails.
        assert_matches!(buf.append(0..10), Err(Error::OutOfCapacity));
        assert_eq!(buf.len(), 8);
    }

    #[test]
    fn out_of_capacity() {
        let buf = ReservedVec::<u64>::new(1).unwrap();
        buf.push(42).unwrap();
        assert_matches!(buf.push(43), Err(Error::OutOfCapacity));
        assert_eq!(buf.as_slice(), &[42]);
    }

    #[test]
    fn zero_capacity() {
        let buf = ReservedVec::<u64>::new(0).unwrap();
        assert_matches!(buf.push(1), Err(Error::OutOfCapacity));
    }

    /// References to early elements survive any number of later appends.
    #[test]
    fn stable_addresses() {
        let buf = ReservedVec::<u32>::new(100_000).unwrap();
        let first = buf.push(7).unwrap();
        let first_addr = first as *const u32;
        for i in 0..99_999 {
            buf.push(i).unwrap();
        }
        assert_eq!(*first, 7);
        assert!(ptr::eq(first_addr, buf.get(0).unwrap()));
    }

    #[test]
    fn oom_on_overflowing_reservation() {
        assert_matches!(
            ReservedVec::<u64>::new(std::usize::MAX / 8),
            Err(Error::Oom)
        );
    }

    /// A reservation beyond the addressable range is rejected by the kernel.
    #[cfg(target_pointer_width = "64")]
    #[test]
    fn oom_on_unmappable_reservation() {
        assert_matches!(ReservedVec::<u8>::new(1usize << 57), Err(Error::Oom));
    }
}

//! Size-class quantization for pooled buffers
//!
//! Requested sizes are rounded up to a block boundary so that buffers of
//! similar size share a class and can be reused for each other:
//!
//! | requested size   | block size |
//! |------------------|-----------:|
//! | `< 1024`         |        512 |
//! | `1024 ..< 2048`  |       1024 |
//! | `2048 ..< 4096`  |       2048 |
//! | `>= 4096`        |       4096 |
//!
//! A size that is already a multiple of its block is kept as is.

/// Smallest size class; also the class of a zero-length request.
pub const MIN_SIZE_CLASS: usize = 512;

/// Block size of the tier `size` falls into
#[inline]
pub const fn block_size(size: usize) -> usize {
    if size < 1024 {
        512
    } else if size < 2048 {
        1024
    } else if size < 4096 {
        2048
    } else {
        4096
    }
}

/// Round `size` up to its size class
///
/// Guarantees `size_class(n) >= n` and is monotonically non-decreasing.
/// Sizes so close to `usize::MAX` that rounding would overflow are returned
/// unchanged.
#[inline]
pub const fn size_class(size: usize) -> usize {
    if size == 0 {
        return MIN_SIZE_CLASS;
    }
    match size.checked_next_multiple_of(block_size(size)) {
        Some(class) => class,
        None => size,
    }
}

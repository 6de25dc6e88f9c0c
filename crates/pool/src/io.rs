//! Stream helpers that run on pooled scratch buffers

use std::io::{self, ErrorKind, Read, Write};

use bytes::BufMut;

#[cfg(feature = "logging")]
use tracing::trace;

use crate::fixed::FixedPool;
use crate::registry::global;
use crate::sized::SizedPool;

/// Block size used by [`copy`]
pub const DEFAULT_BLOCK_SIZE: usize = 8192;

/// Copy everything from `reader` into `writer` using a buffer from the
/// global byte buffer pool
///
/// Returns the number of bytes copied.
pub fn copy<R, W>(reader: &mut R, writer: &mut W) -> io::Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let pool = global().byte_buffers()?;
    copy_with(&pool, reader, writer, DEFAULT_BLOCK_SIZE)
}

/// Copy everything from `reader` into `writer` through a buffer of at least
/// `block_size` bytes taken from `pool`
///
/// The buffer goes back to `pool` whether the copy succeeds or fails.
pub fn copy_with<R, W>(
    pool: &SizedPool<Vec<u8>>,
    reader: &mut R,
    writer: &mut W,
    block_size: usize,
) -> io::Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buffer = pool.get(block_size);
    let capacity = buffer.capacity();
    buffer.resize(capacity, 0);

    let mut total = 0_u64;
    loop {
        let read = match reader.read(buffer.as_mut_slice()) {
            Ok(0) => break,
            Ok(read) => read,
            Err(error) if error.kind() == ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        };
        writer.write_all(&buffer[..read])?;
        total += read as u64;
    }

    #[cfg(feature = "logging")]
    trace!(bytes = total, block = capacity, "copied stream");

    Ok(total)
}

/// Read `reader` to the end through a pooled output stream
pub fn read_all<R>(pool: &FixedPool<bytes::BytesMut>, reader: &mut R) -> io::Result<Vec<u8>>
where
    R: Read + ?Sized,
{
    pool.for_instance(|stream| -> io::Result<Vec<u8>> {
        let mut writer = stream.writer();
        io::copy(reader, &mut writer)?;
        Ok(writer.into_inner().to_vec())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolConfig;

    struct FailingReader {
        remaining: usize,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.remaining == 0 {
                return Err(io::Error::other("connection reset"));
            }
            let len = buf.len().min(self.remaining);
            buf[..len].fill(b'x');
            self.remaining -= len;
            Ok(len)
        }
    }

    #[test]
    fn test_copy_roundtrip() {
        let data: Vec<u8> = (0..50_000_u32).map(|i| (i % 251) as u8).collect();
        let mut output = Vec::new();
        let copied = copy(&mut data.as_slice(), &mut output).unwrap();
        assert_eq!(copied, data.len() as u64);
        assert_eq!(output, data);
    }

    #[test]
    fn test_copy_with_returns_buffer() {
        let pool = SizedPool::<Vec<u8>>::new();
        let mut output = Vec::new();
        copy_with(&pool, &mut &b"hello"[..], &mut output, 1000).unwrap();
        assert_eq!(output, b"hello");
        assert_eq!(pool.size(), 1);
        assert_eq!(pool.pooled_lengths(), vec![1024]);
    }

    #[test]
    fn test_copy_with_frees_buffer_on_error() {
        let pool = SizedPool::<Vec<u8>>::with_config(PoolConfig::default()).unwrap();
        let mut reader = FailingReader { remaining: 3000 };
        let mut output = Vec::new();

        let error = copy_with(&pool, &mut reader, &mut output, 512).unwrap_err();
        assert_eq!(error.to_string(), "connection reset");
        assert_eq!(output.len(), 3000);
        assert_eq!(pool.size(), 1);

        // The reused buffer comes back empty
        assert!(pool.allocate(512).is_empty());
    }

    #[test]
    fn test_empty_input() {
        let pool = SizedPool::<Vec<u8>>::new();
        let mut output = Vec::new();
        assert_eq!(copy_with(&pool, &mut io::empty(), &mut output, 0).unwrap(), 0);
        assert!(output.is_empty());
    }

    #[test]
    fn test_read_all_reuses_stream() {
        let pool = FixedPool::new(bytes::BytesMut::new);
        assert_eq!(read_all(&pool, &mut &b"first"[..]).unwrap(), b"first");
        assert_eq!(read_all(&pool, &mut &b"second"[..]).unwrap(), b"second");
        assert_eq!(pool.size(), 1);
        assert_eq!(pool.stats().hits, 1);
    }
}

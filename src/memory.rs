//! Byte sources which supply firmware memory to the decoders.

use std::fs;
use std::io;
use std::io::prelude::*;
use std::path::{Path, PathBuf};

use crate::{Error, ErrorKind, Result};

/// Supplies a contiguous, owned copy of physical memory.
pub trait ByteSource {
    /// Reads exactly `len` bytes starting at physical address `base`.
    fn read(&mut self, base: u64, len: usize) -> Result<Vec<u8>>;
}

/// Reads physical memory through a character device such as /dev/mem, or
/// through any regular file laid out the same way.
pub struct DevMem {
    path: PathBuf,
    file: fs::File,
}

impl DevMem {
    /// Opens the memory device at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = fs::File::open(&path).map_err(Error::Io)?;

        Ok(DevMem { path, file })
    }
}

impl ByteSource for DevMem {
    fn read(&mut self, base: u64, len: usize) -> Result<Vec<u8>> {
        debug!("reading {} bytes at {:#x} from {}", len, base, self.path.display());

        self.file
            .seek(io::SeekFrom::Start(base))
            .map_err(Error::Io)?;

        let mut buf = Vec::with_capacity(len);
        let got = (&mut self.file)
            .take(len as u64)
            .read_to_end(&mut buf)
            .map_err(Error::Io)?;

        if got != len {
            return Err(Error::Internal(ErrorKind::ShortRead { wanted: len, got }));
        }

        Ok(buf)
    }
}

/// An in-memory copy of a physical address window starting at `base`.
#[derive(Debug, Clone)]
pub struct MemoryImage {
    base: u64,
    bytes: Vec<u8>,
}

impl MemoryImage {
    /// Creates an image whose first byte lives at physical address `base`.
    pub fn new(base: u64, bytes: Vec<u8>) -> Self {
        MemoryImage { base, bytes }
    }
}

impl ByteSource for MemoryImage {
    fn read(&mut self, base: u64, len: usize) -> Result<Vec<u8>> {
        let short = || Error::Internal(ErrorKind::ShortRead { wanted: len, got: 0 });

        let start = base.checked_sub(self.base).ok_or_else(short)? as usize;
        let end = start.checked_add(len).ok_or_else(short)?;

        match self.bytes.get(start..end) {
            Some(buf) => Ok(buf.to_vec()),
            None => Err(Error::Internal(ErrorKind::ShortRead {
                wanted: len,
                got: self.bytes.len().saturating_sub(start),
            })),
        }
    }
}

/// Reads at most `max_len` bytes from `path` starting at `offset`.
///
/// Unlike a ByteSource, the returned buffer may be shorter than requested:
/// sysfs exports the table with its real size, which firmware sometimes
/// overstates in the entry point.
pub fn read_file<P: AsRef<Path>>(path: P, offset: u64, max_len: usize) -> Result<Vec<u8>> {
    let mut file = fs::File::open(path.as_ref()).map_err(Error::Io)?;

    file.seek(io::SeekFrom::Start(offset)).map_err(Error::Io)?;

    let mut buf = Vec::with_capacity(max_len);
    file.take(max_len as u64)
        .read_to_end(&mut buf)
        .map_err(Error::Io)?;

    debug!("read {} bytes from {}", buf.len(), path.as_ref().display());

    Ok(buf)
}

/// Writes `data` at `offset` into the dump file at `path`.
///
/// The first write of a dump (`append == false`) creates or truncates the
/// file; later writes patch it in place.
pub fn write_dump<P: AsRef<Path>>(path: P, offset: u64, data: &[u8], append: bool) -> Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(!append)
        .truncate(!append)
        .open(path.as_ref())
        .map_err(Error::Io)?;

    file.seek(io::SeekFrom::Start(offset)).map_err(Error::Io)?;
    file.write_all(data).map_err(Error::Io)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_image_read_ok() {
        let mut mem = MemoryImage::new(0xf_0000, (0..32).collect());

        let buf = mem.read(0xf_0010, 4).expect("expected read within image");
        assert_eq!(buf, vec![16, 17, 18, 19]);
    }

    #[test]
    fn memory_image_read_short() {
        let mut mem = MemoryImage::new(0xf_0000, vec![0; 16]);

        match mem.read(0xf_0008, 16) {
            Err(Error::Internal(ErrorKind::ShortRead { wanted, got })) => {
                assert_eq!((wanted, got), (16, 8));
            }
            other => panic!("expected short read, got {:?}", other),
        }

        mem.read(0xe_0000, 1)
            .expect_err("expected read below image to fail");
    }

    #[test]
    fn dump_file_round_trip() {
        let path = std::env::temp_dir().join(format!("dmidecode-dump-{}", std::process::id()));

        write_dump(&path, 32, &[0xaa; 8], false).expect("expected table write");
        write_dump(&path, 0, b"_SM_", true).expect("expected entry point write");

        let head = read_file(&path, 0, 4).expect("expected entry point read");
        assert_eq!(head, b"_SM_");

        // The file holds 40 bytes; asking for more returns what exists.
        let table = read_file(&path, 32, 64).expect("expected table read");
        assert_eq!(table, vec![0xaa; 8]);

        let mut dev = DevMem::open(&path).expect("expected dump file to open");
        dev.read(32, 64).expect_err("expected short read through DevMem");

        let _ = fs::remove_file(&path);
    }
}

use std::io::{self, Write};

/// Little-endian writer. Fixed-width fields are zero-padded when the
/// source is short and truncated when it is long.
pub struct LittleEndianWriter<W> {
    inner: W,
    written: u64,
}

impl<W: Write> LittleEndianWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn write_u8(&mut self, value: u8) -> io::Result<()> {
        self.put(&[value])
    }

    pub fn write_u32(&mut self, value: u32) -> io::Result<()> {
        self.put(&value.to_le_bytes())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.put(bytes)
    }

    pub fn write_fixed(&mut self, bytes: &[u8], width: usize) -> io::Result<()> {
        let take = bytes.len().min(width);
        self.put(&bytes[..take])?;
        if take < width {
            self.put(&vec![0u8; width - take])?;
        }
        Ok(())
    }

    pub fn write_grid(&mut self, grid: &[Vec<u8>], rows: usize, cols: usize) -> io::Result<()> {
        for row in 0..rows {
            match grid.get(row) {
                Some(cells) => self.write_fixed(cells, cols)?,
                None => self.write_fixed(&[], cols)?,
            }
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    fn put(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.inner.write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }
}

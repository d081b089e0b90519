use std::io::{self, Read};

/// Forward-only little-endian reader over a project byte stream.
pub struct LittleEndianReader<R> {
    inner: R,
    consumed: u64,
}

impl<R: Read> LittleEndianReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, consumed: 0 }
    }

    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    pub fn read_u8(&mut self) -> io::Result<u8> {
        let mut buf = [0u8; 1];
        self.fill(&mut buf)?;
        Ok(buf[0])
    }

    pub fn read_u32(&mut self) -> io::Result<u32> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    pub fn read_array<const N: usize>(&mut self) -> io::Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    pub fn read_bytes(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    /// Read `rows * cols` bytes as row-major rows.
    pub fn read_grid(&mut self, rows: usize, cols: usize) -> io::Result<Vec<Vec<u8>>> {
        let mut grid = Vec::with_capacity(rows);
        for _ in 0..rows {
            grid.push(self.read_bytes(cols)?);
        }
        Ok(grid)
    }

    /// Read a fixed-width field, dropping trailing NUL padding.
    pub fn read_padded(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let mut bytes = self.read_bytes(n)?;
        let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        bytes.truncate(end);
        Ok(bytes)
    }

    fn fill(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.inner.read_exact(buf)?;
        self.consumed += buf.len() as u64;
        Ok(())
    }
}

use crate::{AsepriteParseError, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use flate2::read::ZlibDecoder;
use std::io::{self, Cursor, Read};

/// Forward-only little-endian reader over the Aseprite byte stream.
///
/// Keeps a running count of consumed bytes so that frame and chunk readers
/// can check how far they got relative to a declared record length.
pub(crate) struct AseReader<T: Read> {
    input: T,
    position: u64,
}

impl<'a> AseReader<Cursor<&'a [u8]>> {
    pub(crate) fn new(data: &'a [u8]) -> AseReader<Cursor<&'a [u8]>> {
        AseReader::with(Cursor::new(data))
    }
}

impl<T: Read> AseReader<T> {
    pub(crate) fn with(input: T) -> Self {
        Self { input, position: 0 }
    }

    /// Number of bytes consumed so far.
    pub(crate) fn position(&self) -> u64 {
        self.position
    }

    fn advance<V>(&mut self, width: u64, value: std::io::Result<V>) -> Result<V> {
        let value = value?;
        self.position += width;
        Ok(value)
    }

    pub(crate) fn byte(&mut self) -> Result<u8> {
        let v = self.input.read_u8();
        self.advance(1, v)
    }

    pub(crate) fn word(&mut self) -> Result<u16> {
        let v = self.input.read_u16::<LittleEndian>();
        self.advance(2, v)
    }

    pub(crate) fn short(&mut self) -> Result<i16> {
        let v = self.input.read_i16::<LittleEndian>();
        self.advance(2, v)
    }

    pub(crate) fn dword(&mut self) -> Result<u32> {
        let v = self.input.read_u32::<LittleEndian>();
        self.advance(4, v)
    }

    pub(crate) fn long(&mut self) -> Result<i32> {
        let v = self.input.read_i32::<LittleEndian>();
        self.advance(4, v)
    }

    // FIXED: 32-bit 16.16 fixed point.
    pub(crate) fn fixed(&mut self) -> Result<f64> {
        let raw = self.long()?;
        Ok(raw as f64 / 65536.0)
    }

    pub(crate) fn string(&mut self) -> Result<String> {
        let str_len = self.word()?;
        let mut str_bytes = vec![0_u8; str_len as usize];
        self.read_exact(&mut str_bytes)?;
        let s = String::from_utf8(str_bytes)?;
        Ok(s)
    }

    pub(crate) fn read_exact(&mut self, buffer: &mut [u8]) -> Result<()> {
        let v = self.input.read_exact(buffer);
        self.advance(buffer.len() as u64, v)
    }

    /// Read `count` bytes into a new buffer. The buffer grows with the data
    /// actually read, so a bogus length fails on end of input instead of
    /// allocating up front.
    pub(crate) fn bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let read = (&mut self.input)
            .take(count as u64)
            .read_to_end(&mut output)?;
        self.position += read as u64;
        if read != count {
            return Err(AsepriteParseError::IoError(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("Expected {} bytes, got {}", count, read),
            )));
        }
        Ok(output)
    }

    pub(crate) fn skip_reserved(&mut self, count: usize) -> Result<()> {
        let skipped = io::copy(&mut (&mut self.input).take(count as u64), &mut io::sink())?;
        self.position += skipped;
        if skipped != count as u64 {
            return Err(AsepriteParseError::IoError(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("Expected to skip {} bytes, got {}", count, skipped),
            )));
        }
        Ok(())
    }

    pub(crate) fn take_bytes(self, limit: usize) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.input.take(limit as u64).read_to_end(&mut output)?;
        if output.len() != limit {
            Err(AsepriteParseError::InvalidInput(format!(
                "Invalid data size. Expected: {}, Actual: {}",
                limit,
                output.len()
            )))
        } else {
            Ok(output)
        }
    }

    pub(crate) fn unzip(self, expected_output_size: usize) -> Result<Vec<u8>> {
        let decoder = ZlibDecoder::new(self.input);
        let mut buffer = Vec::new();
        decoder
            .take(expected_output_size as u64)
            .read_to_end(&mut buffer)?;
        if buffer.len() < expected_output_size {
            return Err(AsepriteParseError::InvalidInput(format!(
                "Compressed cel too short. Expected: {}, Actual: {}",
                expected_output_size,
                buffer.len()
            )));
        }
        buffer.truncate(expected_output_size);
        Ok(buffer)
    }
}

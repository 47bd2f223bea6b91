//! Fixed-width little-endian binary buffer used for pond and spawner records.

/// Error raised while reading a binary record.
///
/// The first violation aborts the whole load; callers never install
/// partially read state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The buffer ended before the record did.
    UnexpectedEnd { needed: usize, remaining: usize },
    /// A value was read but lies outside its documented range.
    OutOfRange { field: &'static str, value: u32 },
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatError::UnexpectedEnd { needed, remaining } => write!(
                f,
                "Unexpected end of buffer: needed {} bytes, {} remaining",
                needed, remaining
            ),
            FormatError::OutOfRange { field, value } => {
                write!(f, "Value {} out of range for {}", value, field)
            }
        }
    }
}

impl std::error::Error for FormatError {}

/// Growable byte buffer with a read cursor.
#[derive(Debug, Clone, Default)]
pub struct BinBuffer {
    bytes: Vec<u8>,
    cursor: usize,
}

impl BinBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap existing bytes for reading from the start.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes, cursor: 0 }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.cursor
    }

    pub fn write_u8(&mut self, value: u8) {
        self.bytes.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], FormatError> {
        if self.remaining() < N {
            return Err(FormatError::UnexpectedEnd {
                needed: N,
                remaining: self.remaining(),
            });
        }

        let mut out = [0; N];
        out.copy_from_slice(&self.bytes[self.cursor..self.cursor + N]);
        self.cursor += N;

        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, FormatError> {
        Ok(self.take::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, FormatError> {
        Ok(u16::from_le_bytes(self.take()?))
    }
}

/// Quantize a value in `[0, 1]` into the full `u16` range.
pub fn quantize_unit(value: f32) -> u16 {
    (value.clamp(0.0, 1.0) * u16::MAX as f32).round() as u16
}

/// Inverse of [`quantize_unit`].
pub fn dequantize_unit(value: u16) -> f32 {
    value as f32 / u16::MAX as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_width_layout() {
        let mut buffer = BinBuffer::new();
        buffer.write_u8(7);
        buffer.write_u16(0x0102);
        buffer.write_u16(0x0A0B);

        assert_eq!(buffer.as_bytes(), &[7, 0x02, 0x01, 0x0B, 0x0A]);
    }

    #[test]
    fn test_read_back() {
        let mut buffer = BinBuffer::new();
        buffer.write_u16(513);
        buffer.write_u8(200);

        let mut reader = BinBuffer::from_bytes(buffer.into_bytes());
        assert_eq!(reader.read_u16(), Ok(513));
        assert_eq!(reader.read_u8(), Ok(200));
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_underrun_is_an_error() {
        let mut reader = BinBuffer::from_bytes(vec![1]);
        assert_eq!(
            reader.read_u16(),
            Err(FormatError::UnexpectedEnd {
                needed: 2,
                remaining: 1
            })
        );
    }

    #[test]
    fn test_quantize_unit() {
        assert_eq!(quantize_unit(0.0), 0);
        assert_eq!(quantize_unit(1.0), u16::MAX);
        assert_eq!(quantize_unit(2.0), u16::MAX);
        assert!((dequantize_unit(quantize_unit(0.3)) - 0.3).abs() < 1e-4);
    }
}

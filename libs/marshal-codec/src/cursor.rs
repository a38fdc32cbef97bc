//! Bounds-checked byte cursors. Every multi-byte field goes through here,
//! so the configured byte order is applied in exactly one place.

use marshal_api::{ByteOrder, MarshalError};

/// Forward reader over a borrowed buffer.
///
/// A read either consumes its full width or fails without moving the
/// position.
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
    order: ByteOrder,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8], order: ByteOrder) -> Self {
        Self { buf, pos: 0, order }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    /// Next byte without consuming it.
    pub fn peek_u8(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    /// Consume exactly `n` bytes, borrowed from the underlying buffer.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], MarshalError> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(MarshalError::UnexpectedEof { needed: n, remaining });
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], MarshalError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, MarshalError> {
        Ok(self.take_array::<1>()?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32, MarshalError> {
        let bytes = self.take_array()?;
        Ok(self.order.u32_from_bytes(bytes))
    }

    pub fn read_i32(&mut self) -> Result<i32, MarshalError> {
        let bytes = self.take_array()?;
        Ok(self.order.i32_from_bytes(bytes))
    }

    pub fn read_f64(&mut self) -> Result<f64, MarshalError> {
        let bytes = self.take_array()?;
        Ok(self.order.f64_from_bytes(bytes))
    }

    /// 8-byte integer stored as two 4-byte halves, low word first, each
    /// half in the configured byte order.
    pub fn read_i64_halves(&mut self) -> Result<i64, MarshalError> {
        let bytes = self.take_array::<8>()?;
        let mut half = ByteReader::new(&bytes, self.order);
        let low = half.read_u32()?;
        let high = half.read_i32()?;
        Ok(((high as i64) << 32) | low as i64)
    }

    /// Length-prefixed UTF-8 text. A bad payload is reported at the offset
    /// where its bytes start.
    pub fn read_str(&mut self) -> Result<&'a str, MarshalError> {
        let offset = self.pos + 4;
        let bytes = self.read_prefixed()?;
        std::str::from_utf8(bytes).map_err(|source| MarshalError::InvalidEncoding { offset, source })
    }

    /// 4-byte length prefix followed by that many bytes.
    ///
    /// The prefix is only consumed when the payload is fully present too.
    pub fn read_prefixed(&mut self) -> Result<&'a [u8], MarshalError> {
        let start = self.pos;
        let len = self.read_u32()? as usize;
        self.take(len).inspect_err(|_| self.pos = start)
    }
}

/// Growable writer. Output grows as needed; the only failure is a length
/// that cannot be expressed in a 4-byte prefix.
pub struct ByteWriter {
    buf: Vec<u8>,
    order: ByteOrder,
}

impl ByteWriter {
    pub fn new(order: ByteOrder) -> Self {
        Self::with_capacity(order, 64)
    }

    pub fn with_capacity(order: ByteOrder, capacity: usize) -> Self {
        Self { buf: Vec::with_capacity(capacity), order }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_u8(&mut self, n: u8) {
        self.buf.push(n);
    }

    pub fn write_u32(&mut self, n: u32) {
        self.buf.extend_from_slice(&self.order.u32_to_bytes(n));
    }

    pub fn write_i32(&mut self, n: i32) {
        self.buf.extend_from_slice(&self.order.i32_to_bytes(n));
    }

    pub fn write_f64(&mut self, n: f64) {
        self.buf.extend_from_slice(&self.order.f64_to_bytes(n));
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Length or count prefix.
    pub fn write_len(&mut self, len: usize) -> Result<(), MarshalError> {
        let n = u32::try_from(len).map_err(|_| MarshalError::LengthOverflow { len })?;
        self.write_u32(n);
        Ok(())
    }

    pub fn write_prefixed(&mut self, bytes: &[u8]) -> Result<(), MarshalError> {
        self.write_len(bytes.len())?;
        self.write_bytes(bytes);
        Ok(())
    }

    /// Overwrite a previously written 4-byte field at `offset`.
    pub fn patch_u32(&mut self, offset: usize, n: u32) {
        self.buf[offset..offset + 4].copy_from_slice(&self.order.u32_to_bytes(n));
    }

    pub fn truncate(&mut self, len: usize) {
        self.buf.truncate(len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_read_fails_without_consuming() {
        let data = [1u8, 2, 3];
        let mut r = ByteReader::new(&data, ByteOrder::Native);
        assert_eq!(
            r.read_u32(),
            Err(MarshalError::UnexpectedEof { needed: 4, remaining: 3 })
        );
        assert_eq!(r.position(), 0);
        assert_eq!(r.read_u8(), Ok(1));
        assert_eq!(r.remaining(), 2);
    }

    #[test]
    fn prefixed_read_is_all_or_nothing() {
        let order = ByteOrder::little_endian();
        let data = [5u8, 0, 0, 0, b'a', b'b'];
        let mut r = ByteReader::new(&data, order);
        assert_eq!(
            r.read_prefixed(),
            Err(MarshalError::UnexpectedEof { needed: 5, remaining: 2 })
        );
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn writer_and_reader_agree_on_order() {
        for order in [ByteOrder::Native, ByteOrder::Reversed] {
            let mut w = ByteWriter::new(order);
            w.write_i32(-123456);
            w.write_f64(1.23);
            w.write_prefixed(b"xyz").unwrap();
            let bytes = w.into_bytes();

            let mut r = ByteReader::new(&bytes, order);
            assert_eq!(r.read_i32(), Ok(-123456));
            assert_eq!(r.read_f64(), Ok(1.23));
            assert_eq!(r.read_prefixed(), Ok(&b"xyz"[..]));
            assert!(r.is_empty());
        }
    }

    #[test]
    fn i64_halves_are_low_word_first() {
        let data = [0xfeu8, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 1, 0, 0, 0, 0, 0, 0x20, 0];
        let mut r = ByteReader::new(&data, ByteOrder::little_endian());
        assert_eq!(r.read_i64_halves(), Ok(-2));
        assert_eq!(r.read_i64_halves(), Ok((1i64 << 53) + 1));

        let data = [0u8, 0, 0, 1, 0, 0, 0, 0];
        let mut r = ByteReader::new(&data, ByteOrder::big_endian());
        assert_eq!(r.read_i64_halves(), Ok(1));
    }

    #[test]
    fn str_read_reports_payload_offset() {
        let data = [2u8, 0, 0, 0, 0xc3, 0x28];
        let mut r = ByteReader::new(&data, ByteOrder::little_endian());
        assert!(matches!(r.read_str(), Err(MarshalError::InvalidEncoding { offset: 4, .. })));

        let data = [2u8, 0, 0, 0, b'o', b'k'];
        let mut r = ByteReader::new(&data, ByteOrder::little_endian());
        assert_eq!(r.read_str(), Ok("ok"));
    }

    #[test]
    fn patch_rewrites_placeholder() {
        let mut w = ByteWriter::new(ByteOrder::big_endian());
        w.write_u8(b'[');
        w.write_u32(0);
        w.patch_u32(1, 3);
        assert_eq!(w.as_slice(), &[b'[', 0, 0, 0, 3]);
    }
}

//! Modbus RTU frame codec
//!
//! A [`Frame`] is assembled front to back while encoding (`push`, then `finalize` to append
//! the CRC) and taken apart back to front while decoding (`validate`, then `pop`). Response
//! frames mix fixed header fields with variable payloads, but their total length is known
//! up front from the expected register/record counts, so the fields next to the CRC are
//! consumed first and the address/function header last.
use crate::consts::{CRC_LEN, EXCEPTION_FRAME_LEN, MAX_FRAME_LEN, MODBUS_EXCEPTION_FLAG};
use crate::{calc_crc16, ErrorKind, ExceptionCode, FrameBuf, VectorTrait};
use tracing::{debug, trace};

/// Fixed-size numeric field of a frame, multi-byte fields are big endian on the wire
pub trait FrameField: Copy + Into<u32> {
    const SIZE: usize;
    fn write_be<V: VectorTrait<u8>>(self, raw: &mut V) -> Result<(), ErrorKind>;
    /// `bytes` is exactly `SIZE` long
    fn read_be(bytes: &[u8]) -> Self;
}

impl FrameField for u8 {
    const SIZE: usize = 1;
    #[inline]
    fn write_be<V: VectorTrait<u8>>(self, raw: &mut V) -> Result<(), ErrorKind> {
        raw.push(self)
    }
    #[inline]
    fn read_be(bytes: &[u8]) -> Self {
        bytes[0]
    }
}

impl FrameField for u16 {
    const SIZE: usize = 2;
    #[inline]
    fn write_be<V: VectorTrait<u8>>(self, raw: &mut V) -> Result<(), ErrorKind> {
        raw.extend(&self.to_be_bytes())
    }
    #[inline]
    fn read_be(bytes: &[u8]) -> Self {
        u16::from_be_bytes([bytes[0], bytes[1]])
    }
}

/// Compare a decoded field against the value the request implies
pub fn check_value<A: Into<u32>, E: Into<u32>>(
    field: &'static str,
    actual: A,
    expected: E,
) -> Result<(), ErrorKind> {
    let actual = actual.into();
    let expected = expected.into();
    if actual == expected {
        Ok(())
    } else {
        debug!(field, expected, actual, "response field mismatch");
        Err(ErrorKind::BadResponse {
            field,
            expected,
            actual,
        })
    }
}

fn check_crc(bytes: &[u8]) -> Result<(), ErrorKind> {
    let l = bytes.len() - CRC_LEN;
    let computed = calc_crc16(&bytes[..l]);
    let received = u16::from_le_bytes([bytes[l], bytes[l + 1]]);
    if computed == received {
        Ok(())
    } else {
        debug!(computed, received, "frame crc mismatch");
        Err(ErrorKind::FrameCRCError { computed, received })
    }
}

/// One RTU ADU: `[addr][func][payload][crc lo][crc hi]`
#[derive(Debug, Clone, Default)]
pub struct Frame<V: VectorTrait<u8> = FrameBuf> {
    raw: V,
    /// total length a received frame must have, CRC included
    expected_len: usize,
    /// end of the not yet popped region while decoding
    tail: usize,
}

impl<V: VectorTrait<u8> + Default> Frame<V> {
    pub fn new() -> Self {
        Self {
            raw: V::default(),
            expected_len: 0,
            tail: 0,
        }
    }

    /// Frame for decoding a response of a known total length
    pub fn with_expected_len(expected_len: usize) -> Self {
        Self {
            raw: V::default(),
            expected_len,
            tail: 0,
        }
    }
}

impl<V: VectorTrait<u8>> Frame<V> {
    #[inline]
    pub fn expected_len(&self) -> usize {
        self.expected_len
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.raw.as_slice()
    }

    pub fn clear(&mut self) {
        self.raw.clear();
        self.tail = 0;
    }

    /// Append a field while encoding
    #[inline]
    pub fn push<T: FrameField>(&mut self, value: T) -> Result<(), ErrorKind> {
        value.write_be(&mut self.raw)
    }

    /// Append register words, each big endian
    pub fn push_regs(&mut self, regs: &[u16]) -> Result<(), ErrorKind> {
        for r in regs {
            self.push(*r)?;
        }
        Ok(())
    }

    /// Append raw payload bytes as they are
    #[inline]
    pub fn extend(&mut self, data: &[u8]) -> Result<(), ErrorKind> {
        self.raw.extend(data)
    }

    /// Overwrite an already pushed byte (for back-patched byte counts)
    pub fn replace(&mut self, index: usize, value: u8) -> Result<(), ErrorKind> {
        if index >= self.raw.len() {
            return Err(ErrorKind::OOB);
        }
        self.raw.replace(index, value);
        Ok(())
    }

    /// Append the CRC16 of everything pushed so far, low byte first
    ///
    /// Must be the last encoding step.
    pub fn finalize(&mut self) -> Result<(), ErrorKind> {
        let crc = calc_crc16(self.raw.as_slice());
        self.raw.extend(&crc.to_le_bytes())?;
        trace!(frame = ?self.raw.as_slice(), "frame encoded");
        Ok(())
    }

    /// Replace the frame contents with received bytes
    ///
    /// Nothing longer than a Modbus ADU is ever expected, such input is a length error.
    pub fn load(&mut self, buf: &[u8]) -> Result<(), ErrorKind> {
        self.clear();
        if buf.len() > MAX_FRAME_LEN {
            debug!(expected = self.expected_len, actual = buf.len(), "oversized frame");
            return Err(ErrorKind::FrameLength {
                expected: self.expected_len,
                actual: buf.len(),
            });
        }
        self.raw.extend(buf)
    }

    /// Check length and CRC of a received frame and arm it for popping
    ///
    /// Must run before any field is popped. A CRC-valid exception response is reported as
    /// [`ErrorKind::Exception`], an exception-shaped frame failing its CRC is just a frame
    /// of the wrong length.
    pub fn validate(&mut self) -> Result<(), ErrorKind> {
        let bytes = self.raw.as_slice();
        let actual = bytes.len();
        trace!(frame = ?bytes, expected = self.expected_len, "validating frame");
        if actual == EXCEPTION_FRAME_LEN
            && self.expected_len != EXCEPTION_FRAME_LEN
            && bytes[1] & MODBUS_EXCEPTION_FLAG != 0
            && check_crc(bytes).is_ok()
        {
            return Err(ErrorKind::Exception {
                function: bytes[1] & !MODBUS_EXCEPTION_FLAG,
                code: ExceptionCode::from_modbus_error(bytes[2]),
            });
        }
        if actual != self.expected_len || actual < CRC_LEN {
            debug!(expected = self.expected_len, actual, "frame length mismatch");
            return Err(ErrorKind::FrameLength {
                expected: self.expected_len,
                actual,
            });
        }
        check_crc(bytes)?;
        self.tail = actual - CRC_LEN;
        Ok(())
    }

    /// Bytes left between the frame head and the last popped field
    #[inline]
    pub fn remaining(&self) -> usize {
        self.tail
    }

    fn take_tail(&mut self, field: &'static str, size: usize) -> Result<&[u8], ErrorKind> {
        if size > self.tail {
            return Err(ErrorKind::Underflow(field));
        }
        let end = self.tail;
        self.tail -= size;
        Ok(&self.raw.as_slice()[self.tail..end])
    }

    /// Remove a field from the tail of the unread region
    pub fn pop<T: FrameField>(&mut self, field: &'static str) -> Result<T, ErrorKind> {
        let value = T::read_be(self.take_tail(field, T::SIZE)?);
        trace!(field, value = Into::<u32>::into(value), "field popped");
        Ok(value)
    }

    /// Remove `regs.len()` words from the tail, filling `regs` in wire order
    pub fn pop_regs(&mut self, field: &'static str, regs: &mut [u16]) -> Result<(), ErrorKind> {
        let bytes = self.take_tail(field, regs.len() * 2)?;
        for (r, pair) in regs.iter_mut().zip(bytes.chunks_exact(2)) {
            *r = u16::from_be_bytes([pair[0], pair[1]]);
        }
        trace!(field, regs = ?regs, "registers popped");
        Ok(())
    }
}

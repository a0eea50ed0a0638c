//! Modbus RTU command codec and register data model for rack monitoring
//!
//! The crate covers two halves of a register-monitoring agent:
//!
//! * [`client`] builds wire-exact request frames for the commands the agent issues and
//!   validates the matching responses field by field, on top of the [`frame::Frame`] codec
//! * [`regmap`] turns raw register words into typed values using register map descriptors,
//!   and keeps a fixed-depth history per register
//!
//! Serial transport, polling and scheduling are left to the caller: one exchange is one
//! `encode`, one round trip over the line, one `decode`.
//!
//! ```
//! use rackmon::client::{ReadHoldingRegistersReq, ReadHoldingRegistersResp, Request, Response};
//!
//! let mut req = ReadHoldingRegistersReq::new(0x11, 0x006b, 3);
//! req.encode().unwrap();
//! assert_eq!(req.as_bytes(), &[0x11, 0x03, 0x00, 0x6b, 0x00, 0x03, 0x76, 0x87]);
//!
//! let resp = ReadHoldingRegistersResp::new(0x11, 3).unwrap();
//! assert_eq!(resp.expected_len(), 11);
//! ```

pub mod client;
pub mod consts;
pub mod frame;
pub mod regmap;

mod vector;
pub use vector::VectorTrait;

mod error;
pub use error::{ErrorKind, ExceptionCode};

#[cfg(test)]
mod tests;

/// Standard Modbus RTU frame buffer
///
/// As max length of a Modbus RTU ADU is 256 bytes, frames are kept in a fixed-capacity
/// vector and never allocate.
pub type FrameBuf = heapless::Vec<u8, { consts::MAX_FRAME_LEN }>;

/// Modbus CRC16 (poly 0xA001 reflected, init 0xFFFF) over the whole slice
///
/// The result goes on the wire low byte first.
pub fn calc_crc16(frame: &[u8]) -> u16 {
    let mut crc: u16 = 0xffff;
    for i in frame {
        crc ^= u16::from(*i);
        for _ in (0..8).rev() {
            if (crc & 0x0001) == 0 {
                crc >>= 1;
            } else {
                crc >>= 1;
                crc ^= 0xA001;
            }
        }
    }
    crc
}

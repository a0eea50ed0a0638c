mod test_frame;

use crc16::{State, MODBUS};

/// Append a CRC computed independently of the crate
pub(crate) fn rtu_frame(data: &[u8]) -> Vec<u8> {
    let mut frame = data.to_vec();
    frame.extend_from_slice(&State::<MODBUS>::calculate(data).to_le_bytes());
    frame
}

//! MODBUS Constants

// MODBUS Functions
pub const MODBUS_GET_HOLDINGS: u8 = 0x03;
pub const MODBUS_SET_HOLDING: u8 = 0x06;
pub const MODBUS_SET_HOLDINGS_BULK: u8 = 0x10;
pub const MODBUS_READ_FILE_RECORD: u8 = 0x14;

/// Set on the function byte of an exception response
pub const MODBUS_EXCEPTION_FLAG: u8 = 0x80;

/// The only reference type defined for file record access
pub const MODBUS_FILE_REFERENCE_TYPE: u8 = 0x06;

// Frame sizes
pub const MAX_FRAME_LEN: usize = 256;
pub const CRC_LEN: usize = 2;
/// addr(1), func(1), code(1), crc(2)
pub const EXCEPTION_FRAME_LEN: usize = 5;
/// addr(1), func(1), reg(2), value/count(2), crc(2)
pub const WRITE_RESPONSE_LEN: usize = 8;
/// 123 registers, the most a single write multiple request carries
pub const MAX_WRITE_DATA_LEN: usize = 246;

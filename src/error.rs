use thiserror::Error;

#[allow(clippy::module_name_repetitions)]
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    #[error("OUT OF BUFFER")]
    OOB,
    #[error("FRAME LENGTH ERROR: expected {expected} bytes, got {actual}")]
    FrameLength { expected: usize, actual: usize },
    #[error("FRAME CRC ERROR: computed {computed:#06x}, received {received:#06x}")]
    FrameCRCError { computed: u16, received: u16 },
    #[error("BAD RESPONSE: {field} expected {expected:#x}, got {actual:#x}")]
    BadResponse {
        field: &'static str,
        expected: u32,
        actual: u32,
    },
    #[error("UNDERFLOW: {0}")]
    Underflow(&'static str),
    #[error("MODBUS EXCEPTION ON FUNCTION {function:#04x}: {code}")]
    Exception { function: u8, code: ExceptionCode },
    #[error("NO REGISTER MAP FOR ADDRESS {0:#04x}")]
    AddressNotFound(u8),
    #[error("REGISTER {0:#06x} NOT IN REGISTER MAP")]
    RegisterNotFound(u16),
    #[error("CONFIG ERROR: {0}")]
    Config(String),
}

/// Exception codes a slave may answer with instead of a regular response
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExceptionCode {
    IllegalFunction,
    IllegalDataAddress,
    IllegalDataValue,
    SlaveDeviceFailure,
    Acknowledge,
    SlaveDeviceBusy,
    NegativeAcknowledge,
    MemoryParityError,
    GatewayPathUnavailable,
    GatewayTargetFailed,
    Unknown(u8),
}

impl ExceptionCode {
    pub fn from_modbus_error(code: u8) -> Self {
        match code {
            0x01 => ExceptionCode::IllegalFunction,
            0x02 => ExceptionCode::IllegalDataAddress,
            0x03 => ExceptionCode::IllegalDataValue,
            0x04 => ExceptionCode::SlaveDeviceFailure,
            0x05 => ExceptionCode::Acknowledge,
            0x06 => ExceptionCode::SlaveDeviceBusy,
            0x07 => ExceptionCode::NegativeAcknowledge,
            0x08 => ExceptionCode::MemoryParityError,
            0x0A => ExceptionCode::GatewayPathUnavailable,
            0x0B => ExceptionCode::GatewayTargetFailed,
            other => ExceptionCode::Unknown(other),
        }
    }
}

impl core::fmt::Display for ExceptionCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg: &str = match self {
            ExceptionCode::IllegalFunction => "MODBUS ERROR CODE 01 - ILLEGAL FUNCTION",
            ExceptionCode::IllegalDataAddress => "MODBUS ERROR CODE 02 - ILLEGAL DATA ADDRESS",
            ExceptionCode::IllegalDataValue => "MODBUS ERROR CODE 03 - ILLEGAL DATA VALUE",
            ExceptionCode::SlaveDeviceFailure => "MODBUS ERROR CODE 04 - SLAVE DEVICE FAILURE",
            ExceptionCode::Acknowledge => "MODBUS ERROR CODE 05 - ACKNOWLEDGE",
            ExceptionCode::SlaveDeviceBusy => "MODBUS ERROR CODE 06 - SLAVE DEVICE BUSY",
            ExceptionCode::NegativeAcknowledge => "MODBUS ERROR CODE 07 - NEGATIVE ACKNOWLEDGE",
            ExceptionCode::MemoryParityError => "MODBUS ERROR CODE 08 - MEMORY PARITY ERROR",
            ExceptionCode::GatewayPathUnavailable => {
                "MODBUS ERROR CODE 10 - GATEWAY PATH UNAVAILABLE"
            }
            ExceptionCode::GatewayTargetFailed => {
                "MODBUS ERROR CODE 11 - GATEWAY TARGET DEVICE FAILED TO RESPOND"
            }
            ExceptionCode::Unknown(code) => {
                return write!(f, "UNKNOWN MODBUS ERROR CODE {:02X}", code);
            }
        };
        write!(f, "{}", msg)
    }
}

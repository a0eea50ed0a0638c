//! Modbus RTU commands issued by the monitoring agent
//!
//! Every command is a request/response pair. A request is encoded once and handed to the
//! transport as [`Request::as_bytes`]. A response object is built from what the request
//! expects back (register count, record sizes), which fixes its total frame length; the
//! received bytes are then validated and decoded field by field from the frame tail
//! towards the head.
use crate::consts::{
    CRC_LEN, MAX_FRAME_LEN, MAX_WRITE_DATA_LEN, MODBUS_FILE_REFERENCE_TYPE, MODBUS_GET_HOLDINGS,
    MODBUS_READ_FILE_RECORD, MODBUS_SET_HOLDING, MODBUS_SET_HOLDINGS_BULK, WRITE_RESPONSE_LEN,
};
use crate::frame::{check_value, Frame};
use crate::ErrorKind;

pub trait Request {
    /// Build the frame, CRC included
    fn encode(&mut self) -> Result<(), ErrorKind>;
    fn frame(&self) -> &Frame;
    /// Device address the request is sent to
    fn addr(&self) -> u8;
    /// Encoded frame, empty until [`Request::encode`] is called
    fn as_bytes(&self) -> &[u8] {
        self.frame().as_bytes()
    }
}

pub trait Response {
    /// Total length of a well-formed response, CRC included
    fn expected_len(&self) -> usize;
    /// Validate and decode the received bytes
    ///
    /// The frame either fully validates or is rejected as a whole.
    fn decode(&mut self, buf: &[u8]) -> Result<(), ErrorKind>;
}

fn response_len(len: usize) -> Result<usize, ErrorKind> {
    if len > MAX_FRAME_LEN {
        Err(ErrorKind::OOB)
    } else {
        Ok(len)
    }
}

/// Read holding registers (0x03)
#[derive(Debug, Clone)]
pub struct ReadHoldingRegistersReq {
    pub dev_addr: u8,
    pub starting_addr: u16,
    pub reg_count: u16,
    frame: Frame,
}

impl ReadHoldingRegistersReq {
    pub fn new(dev_addr: u8, starting_addr: u16, reg_count: u16) -> Self {
        Self {
            dev_addr,
            starting_addr,
            reg_count,
            frame: Frame::new(),
        }
    }
}

impl Request for ReadHoldingRegistersReq {
    fn encode(&mut self) -> Result<(), ErrorKind> {
        self.frame.clear();
        self.frame.push(self.dev_addr)?;
        self.frame.push(MODBUS_GET_HOLDINGS)?;
        self.frame.push(self.starting_addr)?;
        self.frame.push(self.reg_count)?;
        self.frame.finalize()
    }
    fn frame(&self) -> &Frame {
        &self.frame
    }
    fn addr(&self) -> u8 {
        self.dev_addr
    }
}

#[derive(Debug, Clone)]
pub struct ReadHoldingRegistersResp {
    dev_addr: u8,
    regs: Vec<u16>,
    frame: Frame,
}

impl ReadHoldingRegistersResp {
    /// Response to a read of `reg_count` registers from `dev_addr`
    pub fn new(dev_addr: u8, reg_count: u16) -> Result<Self, ErrorKind> {
        if reg_count == 0 {
            return Err(ErrorKind::Underflow("Response too small"));
        }
        // addr(1), func(1), bytecount(1), <2 * count regs>, crc(2)
        let len = response_len(5 + 2 * usize::from(reg_count))?;
        Ok(Self {
            dev_addr,
            regs: vec![0; usize::from(reg_count)],
            frame: Frame::with_expected_len(len),
        })
    }

    /// Register words, valid after a successful decode
    pub fn regs(&self) -> &[u16] {
        &self.regs
    }

    pub fn into_regs(self) -> Vec<u16> {
        self.regs
    }
}

impl Response for ReadHoldingRegistersResp {
    fn expected_len(&self) -> usize {
        self.frame.expected_len()
    }

    fn decode(&mut self, buf: &[u8]) -> Result<(), ErrorKind> {
        self.frame.load(buf)?;
        self.frame.validate()?;
        let mut regs = vec![0; self.regs.len()];
        self.frame.pop_regs("regs", &mut regs)?;
        let byte_count: u8 = self.frame.pop("byte_count")?;
        let function: u8 = self.frame.pop("function")?;
        let dev_addr: u8 = self.frame.pop("dev_addr")?;
        check_value("function", function, MODBUS_GET_HOLDINGS)?;
        check_value("byte_count", byte_count, (regs.len() * 2) as u32)?;
        check_value("dev_addr", dev_addr, self.dev_addr)?;
        self.regs = regs;
        Ok(())
    }
}

/// Write single register (0x06)
#[derive(Debug, Clone)]
pub struct WriteSingleRegisterReq {
    pub dev_addr: u8,
    pub reg_off: u16,
    pub value: u16,
    frame: Frame,
}

impl WriteSingleRegisterReq {
    pub fn new(dev_addr: u8, reg_off: u16, value: u16) -> Self {
        Self {
            dev_addr,
            reg_off,
            value,
            frame: Frame::new(),
        }
    }
}

impl Request for WriteSingleRegisterReq {
    fn encode(&mut self) -> Result<(), ErrorKind> {
        self.frame.clear();
        self.frame.push(self.dev_addr)?;
        self.frame.push(MODBUS_SET_HOLDING)?;
        self.frame.push(self.reg_off)?;
        self.frame.push(self.value)?;
        self.frame.finalize()
    }
    fn frame(&self) -> &Frame {
        &self.frame
    }
    fn addr(&self) -> u8 {
        self.dev_addr
    }
}

#[derive(Debug, Clone)]
pub struct WriteSingleRegisterResp {
    dev_addr: u8,
    expected_reg_off: u16,
    expected_value: Option<u16>,
    value: u16,
    frame: Frame,
}

impl WriteSingleRegisterResp {
    /// Response whose echoed value is not checked
    pub fn new(dev_addr: u8, reg_off: u16) -> Self {
        Self {
            dev_addr,
            expected_reg_off: reg_off,
            expected_value: None,
            value: 0,
            frame: Frame::with_expected_len(WRITE_RESPONSE_LEN),
        }
    }

    /// Response that must echo `value` back
    pub fn with_value(dev_addr: u8, reg_off: u16, value: u16) -> Self {
        Self {
            expected_value: Some(value),
            ..Self::new(dev_addr, reg_off)
        }
    }

    /// Value echoed by the device
    pub fn value(&self) -> u16 {
        self.value
    }
}

impl Response for WriteSingleRegisterResp {
    fn expected_len(&self) -> usize {
        self.frame.expected_len()
    }

    fn decode(&mut self, buf: &[u8]) -> Result<(), ErrorKind> {
        self.frame.load(buf)?;
        self.frame.validate()?;
        let value: u16 = self.frame.pop("value")?;
        let reg_off: u16 = self.frame.pop("reg_off")?;
        let function: u8 = self.frame.pop("function")?;
        let dev_addr: u8 = self.frame.pop("dev_addr")?;
        check_value("dev_addr", dev_addr, self.dev_addr)?;
        check_value("function", function, MODBUS_SET_HOLDING)?;
        check_value("reg_off", reg_off, self.expected_reg_off)?;
        if let Some(expected) = self.expected_value {
            check_value("value", value, expected)?;
        }
        self.value = value;
        Ok(())
    }
}

/// Write multiple registers (0x10)
///
/// Data is appended after construction, the register count is derived from it at encode
/// time.
#[derive(Debug, Clone)]
pub struct WriteMultipleRegistersReq {
    pub dev_addr: u8,
    pub starting_addr: u16,
    data: Vec<u8>,
    frame: Frame,
}

impl WriteMultipleRegistersReq {
    pub fn new(dev_addr: u8, starting_addr: u16) -> Self {
        Self {
            dev_addr,
            starting_addr,
            data: Vec::new(),
            frame: Frame::new(),
        }
    }

    /// Append one register value
    pub fn push(&mut self, value: u16) -> Result<(), ErrorKind> {
        self.extend(&value.to_be_bytes())
    }

    /// Append raw payload bytes
    pub fn extend(&mut self, data: &[u8]) -> Result<(), ErrorKind> {
        if self.data.len() + data.len() > MAX_WRITE_DATA_LEN {
            return Err(ErrorKind::OOB);
        }
        self.data.extend_from_slice(data);
        Ok(())
    }

    /// Registers the request writes (an odd trailing byte counts as a whole register)
    #[allow(clippy::cast_possible_truncation)]
    pub fn reg_count(&self) -> u16 {
        ((self.data.len() + 1) / 2) as u16
    }
}

impl Request for WriteMultipleRegistersReq {
    #[allow(clippy::cast_possible_truncation)]
    fn encode(&mut self) -> Result<(), ErrorKind> {
        if self.data.is_empty() {
            return Err(ErrorKind::Underflow("No registers to write"));
        }
        // pad so the payload fills whole registers
        if self.data.len() % 2 != 0 {
            self.data.push(0);
        }
        let data_len = self.data.len() as u8;
        self.frame.clear();
        self.frame.push(self.dev_addr)?;
        self.frame.push(MODBUS_SET_HOLDINGS_BULK)?;
        self.frame.push(self.starting_addr)?;
        self.frame.push(self.reg_count())?;
        self.frame.push(data_len)?;
        self.frame.extend(&self.data)?;
        self.frame.finalize()
    }
    fn frame(&self) -> &Frame {
        &self.frame
    }
    fn addr(&self) -> u8 {
        self.dev_addr
    }
}

#[derive(Debug, Clone)]
pub struct WriteMultipleRegistersResp {
    expected_dev_addr: u8,
    expected_starting_addr: u16,
    expected_reg_count: u16,
    frame: Frame,
}

impl WriteMultipleRegistersResp {
    pub fn new(dev_addr: u8, starting_addr: u16, reg_count: u16) -> Self {
        Self {
            expected_dev_addr: dev_addr,
            expected_starting_addr: starting_addr,
            expected_reg_count: reg_count,
            // addr(1), func(1), reg_off(2), reg_count(2), crc(2)
            frame: Frame::with_expected_len(WRITE_RESPONSE_LEN),
        }
    }
}

impl Response for WriteMultipleRegistersResp {
    fn expected_len(&self) -> usize {
        self.frame.expected_len()
    }

    fn decode(&mut self, buf: &[u8]) -> Result<(), ErrorKind> {
        self.frame.load(buf)?;
        self.frame.validate()?;
        let reg_count: u16 = self.frame.pop("reg_count")?;
        let starting_addr: u16 = self.frame.pop("starting_addr")?;
        let function: u8 = self.frame.pop("function")?;
        let dev_addr: u8 = self.frame.pop("dev_addr")?;
        check_value("dev_addr", dev_addr, self.expected_dev_addr)?;
        check_value("function", function, MODBUS_SET_HOLDINGS_BULK)?;
        check_value("starting_addr", starting_addr, self.expected_starting_addr)?;
        check_value("reg_count", reg_count, self.expected_reg_count)
    }
}

/// One record of a read file record exchange
///
/// The length of `data` is the number of words requested; a response fills it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub file_num: u16,
    pub record_num: u16,
    pub data: Vec<u16>,
}

impl FileRecord {
    pub fn new(file_num: u16, record_num: u16, words: usize) -> Self {
        Self {
            file_num,
            record_num,
            data: vec![0; words],
        }
    }
}

/// Read file record (0x14)
#[derive(Debug, Clone)]
pub struct ReadFileRecordReq {
    pub dev_addr: u8,
    records: Vec<FileRecord>,
    frame: Frame,
}

impl ReadFileRecordReq {
    pub fn new(dev_addr: u8, records: &[FileRecord]) -> Self {
        Self {
            dev_addr,
            records: records.to_vec(),
            frame: Frame::new(),
        }
    }
}

impl Request for ReadFileRecordReq {
    #[allow(clippy::cast_possible_truncation)]
    fn encode(&mut self) -> Result<(), ErrorKind> {
        if self.records.is_empty() {
            return Err(ErrorKind::Underflow("No records to read"));
        }
        self.frame.clear();
        self.frame.push(self.dev_addr)?;
        self.frame.push(MODBUS_READ_FILE_RECORD)?;
        // byte count, patched once all records are in
        self.frame.push(0u8)?;
        for rec in &self.records {
            if rec.data.len() > usize::from(u16::MAX) {
                return Err(ErrorKind::OOB);
            }
            self.frame.push(MODBUS_FILE_REFERENCE_TYPE)?;
            self.frame.push(rec.file_num)?;
            self.frame.push(rec.record_num)?;
            self.frame.push(rec.data.len() as u16)?;
        }
        let bytes = self.frame.len() - 3;
        self.frame.replace(2, bytes as u8)?;
        self.frame.finalize()
    }
    fn frame(&self) -> &Frame {
        &self.frame
    }
    fn addr(&self) -> u8 {
        self.dev_addr
    }
}

#[derive(Debug, Clone)]
pub struct ReadFileRecordResp {
    dev_addr: u8,
    records: Vec<FileRecord>,
    frame: Frame,
}

impl ReadFileRecordResp {
    /// Response carrying `records`, each sized to the words requested
    pub fn new(dev_addr: u8, records: Vec<FileRecord>) -> Result<Self, ErrorKind> {
        if records.is_empty() {
            return Err(ErrorKind::Underflow("Response too small"));
        }
        // addr(1), func(1), bytes(1) ... crc(2)
        // and per record: len(1), type(1), data(N * 2)
        let len = records
            .iter()
            .fold(5, |len, rec| len + 2 + 2 * rec.data.len());
        Ok(Self {
            dev_addr,
            records,
            frame: Frame::with_expected_len(response_len(len)?),
        })
    }

    /// Records with their data, valid after a successful decode
    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<FileRecord> {
        self.records
    }
}

impl Response for ReadFileRecordResp {
    fn expected_len(&self) -> usize {
        self.frame.expected_len()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn decode(&mut self, buf: &[u8]) -> Result<(), ErrorKind> {
        self.frame.load(buf)?;
        self.frame.validate()?;
        // everything but addr, func and the byte count itself
        let bytes_exp = self.frame.expected_len() - CRC_LEN - 3;
        // popped last record first, so this is in reverse order
        let mut received: Vec<Vec<u16>> = Vec::with_capacity(self.records.len());
        for rec in self.records.iter().rev() {
            let mut data = vec![0; rec.data.len()];
            self.frame.pop_regs("record_data", &mut data)?;
            let reference: u8 = self.frame.pop("reference")?;
            let field_size: u8 = self.frame.pop("field_size")?;
            check_value("reference", reference, MODBUS_FILE_REFERENCE_TYPE)?;
            check_value("field_size", field_size, (1 + data.len() * 2) as u32)?;
            received.push(data);
        }
        let data_len: u8 = self.frame.pop("data_len")?;
        let function: u8 = self.frame.pop("function")?;
        let dev_addr: u8 = self.frame.pop("dev_addr")?;
        check_value("data_len", data_len, bytes_exp as u32)?;
        check_value("function", function, MODBUS_READ_FILE_RECORD)?;
        check_value("dev_addr", dev_addr, self.dev_addr)?;
        check_value("length", self.frame.remaining() as u32, 0u32)?;
        for (rec, data) in self.records.iter_mut().zip(received.into_iter().rev()) {
            rec.data = data;
        }
        Ok(())
    }
}

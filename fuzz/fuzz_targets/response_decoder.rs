#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rackmon::client::{
    FileRecord, ReadFileRecordResp, ReadHoldingRegistersResp, Response,
    WriteMultipleRegistersResp, WriteSingleRegisterResp,
};
use std::vec::Vec;

#[derive(Debug, Arbitrary)]
enum FuzzCommand {
    ReadHoldings { reg_count: u16 },
    WriteSingle { reg_off: u16, value: Option<u16> },
    WriteMultiple { starting_addr: u16, reg_count: u16 },
    ReadFileRecord { sizes: Vec<u8> },
}

#[derive(Debug, Arbitrary)]
struct FuzzInput<'a> {
    dev_addr: u8,
    command: FuzzCommand,
    response_buf: &'a [u8],
}

fuzz_target!(|data: FuzzInput| {
    // we only care about panics so we can ignore results
    let _ = fuzz_response(data);
});

fn fuzz_response(input: FuzzInput) -> Result<(), rackmon::ErrorKind> {
    let mut response: Box<dyn Response> = match input.command {
        FuzzCommand::ReadHoldings { reg_count } => {
            Box::new(ReadHoldingRegistersResp::new(input.dev_addr, reg_count)?)
        }
        FuzzCommand::WriteSingle { reg_off, value } => Box::new(match value {
            Some(v) => WriteSingleRegisterResp::with_value(input.dev_addr, reg_off, v),
            None => WriteSingleRegisterResp::new(input.dev_addr, reg_off),
        }),
        FuzzCommand::WriteMultiple {
            starting_addr,
            reg_count,
        } => Box::new(WriteMultipleRegistersResp::new(
            input.dev_addr,
            starting_addr,
            reg_count,
        )),
        FuzzCommand::ReadFileRecord { sizes } => {
            let records = sizes
                .iter()
                .enumerate()
                .map(|(i, s)| FileRecord::new(1, i as u16, usize::from(*s)))
                .collect();
            Box::new(ReadFileRecordResp::new(input.dev_addr, records)?)
        }
    };
    response.decode(input.response_buf)
}

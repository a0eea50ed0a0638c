use super::rtu_frame;
use crate::consts::MAX_FRAME_LEN;
use crate::frame::{check_value, Frame};
use crate::*;
use crc16::{State, MODBUS};
use rand::Rng;

#[test]
fn test_crc16_matches_reference() {
    let mut rng = rand::thread_rng();
    assert_eq!(calc_crc16(&[]), 0xffff);
    for _ in 0..200 {
        let len = rng.gen_range(1, 254);
        let data: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
        assert_eq!(calc_crc16(&data), State::<MODBUS>::calculate(&data));
    }
}

#[test]
fn test_finalize_appends_crc_low_byte_first() {
    let mut frame: Frame = Frame::new();
    frame.push(0x11u8).unwrap();
    frame.push(0x03u8).unwrap();
    frame.push(0x006bu16).unwrap();
    frame.push(0x0003u16).unwrap();
    frame.finalize().unwrap();
    assert_eq!(
        frame.as_bytes(),
        &[0x11, 0x03, 0x00, 0x6b, 0x00, 0x03, 0x76, 0x87]
    );
    assert_eq!(frame.as_bytes(), rtu_frame(&[0x11, 0x03, 0x00, 0x6b, 0x00, 0x03]));
}

#[test]
fn test_frame_small_buffer() {
    let mut frame: Frame<heapless::Vec<u8, 9>> = Frame::new();
    frame.push(0x01u8).unwrap();
    frame.push(0x14u8).unwrap();
    frame.push(0u8).unwrap();
    frame.push_regs(&[0x0600, 0x0400]).unwrap();
    frame.replace(2, 4).unwrap();
    assert_eq!(frame.replace(10, 4), Err(ErrorKind::OOB));
    frame.finalize().unwrap();
    assert_eq!(frame.as_bytes(), rtu_frame(&[0x01, 0x14, 0x04, 0x06, 0x00, 0x04, 0x00]));
    assert_eq!(frame.push(0u8), Err(ErrorKind::OOB));
}

#[test]
fn test_frame_capacity() {
    let mut frame: Frame = Frame::new();
    frame.extend(&[0u8; MAX_FRAME_LEN]).unwrap();
    assert_eq!(frame.push(0u8), Err(ErrorKind::OOB));
    let mut frame: Frame = Frame::with_expected_len(8);
    frame.load(&[0u8; MAX_FRAME_LEN]).unwrap();
    assert_eq!(frame.len(), MAX_FRAME_LEN);
}

#[test]
fn test_pop_walks_backwards() {
    let raw = rtu_frame(&[0x01, 0x02, 0x03, 0x04, 0xaa, 0xbb, 0xcc, 0xdd]);
    let mut frame: Frame = Frame::with_expected_len(raw.len());
    frame.load(&raw).unwrap();
    frame.validate().unwrap();
    assert_eq!(frame.remaining(), 8);
    let mut regs = [0u16; 2];
    frame.pop_regs("regs", &mut regs).unwrap();
    assert_eq!(regs, [0xaabb, 0xccdd]);
    assert_eq!(frame.pop::<u16>("value").unwrap(), 0x0304);
    assert_eq!(frame.pop::<u8>("function").unwrap(), 0x02);
    assert_eq!(frame.pop::<u8>("addr").unwrap(), 0x01);
    assert_eq!(frame.remaining(), 0);
    assert_eq!(frame.pop::<u8>("extra"), Err(ErrorKind::Underflow("extra")));
}

#[test]
fn test_validate_errors() {
    let raw = rtu_frame(&[0x11, 0x06, 0x00, 0x01, 0x00, 0x03]);
    let mut frame: Frame = Frame::with_expected_len(8);

    let mut corrupted = raw.clone();
    corrupted[7] ^= 0xff;
    frame.load(&corrupted).unwrap();
    assert!(matches!(
        frame.validate(),
        Err(ErrorKind::FrameCRCError { .. })
    ));

    frame.load(&raw[..7]).unwrap();
    assert_eq!(
        frame.validate(),
        Err(ErrorKind::FrameLength {
            expected: 8,
            actual: 7
        })
    );

    frame.load(&raw).unwrap();
    frame.validate().unwrap();

    let exception = rtu_frame(&[0x11, 0x86, 0x02]);
    frame.load(&exception).unwrap();
    assert_eq!(
        frame.validate(),
        Err(ErrorKind::Exception {
            function: 0x06,
            code: ExceptionCode::IllegalDataAddress
        })
    );
    // an exception-shaped frame with a broken CRC is not trusted
    let mut broken = exception.clone();
    broken[4] ^= 0x01;
    frame.load(&broken).unwrap();
    assert_eq!(
        frame.validate(),
        Err(ErrorKind::FrameLength {
            expected: 8,
            actual: 5
        })
    );

    assert_eq!(
        frame.load(&[0u8; 300]),
        Err(ErrorKind::FrameLength {
            expected: 8,
            actual: 300
        })
    );
    assert!(frame.is_empty());

    frame.load(&[]).unwrap();
    assert!(matches!(
        frame.validate(),
        Err(ErrorKind::FrameLength { actual: 0, .. })
    ));
}

#[test]
fn test_check_value() {
    check_value("function", 0x03u8, 0x03u8).unwrap();
    assert_eq!(
        check_value("reg_count", 4u16, 2u16),
        Err(ErrorKind::BadResponse {
            field: "reg_count",
            expected: 2,
            actual: 4
        })
    );
    let msg = check_value("dev_addr", 0x12u8, 0x11u8)
        .unwrap_err()
        .to_string();
    assert!(msg.contains("dev_addr"));
}

#[test]
fn test_exception_codes() {
    assert_eq!(
        ExceptionCode::from_modbus_error(0x01),
        ExceptionCode::IllegalFunction
    );
    assert_eq!(
        ExceptionCode::from_modbus_error(0x0B),
        ExceptionCode::GatewayTargetFailed
    );
    assert_eq!(
        ExceptionCode::from_modbus_error(0x42),
        ExceptionCode::Unknown(0x42)
    );
    assert_eq!(
        ExceptionCode::IllegalDataValue.to_string(),
        "MODBUS ERROR CODE 03 - ILLEGAL DATA VALUE"
    );
}

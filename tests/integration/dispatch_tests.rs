//! Bytes in, response frames out, on one thread.
//!
//! Drives a `Reader` over a scripted byte source, then drains the queue
//! through a `Processor` into a capturing sink.

use std::collections::VecDeque;
use std::sync::Arc;

use zeroclaw::error::Status;
use zeroclaw::link::crc::checksum;
use zeroclaw::link::framer::ResponseFramer;
use zeroclaw::link::io_task::{LinkShared, Processor, Reader};
use zeroclaw::link::packet::{MAGIC_BYTES, MAX_CMD_DATA, ResponsePacket, encode_command};
use zeroclaw::link::transport::{ByteSink, ByteSource};
use zeroclaw::ports::SensorValue;

use crate::mock_peripherals::{MockBoard, PeripheralCall};

// ── Scripted link ─────────────────────────────────────────────

struct Script(VecDeque<u8>);

impl ByteSource for Script {
    type Error = ();

    fn read_byte(&mut self) -> Result<Option<u8>, ()> {
        self.0.pop_front().map(Some).ok_or(())
    }
}

#[derive(Default)]
struct Capture(Vec<Vec<u8>>);

impl ByteSink for Capture {
    type Error = ();

    fn write_frame(&mut self, frame: &[u8]) -> Result<(), ()> {
        self.0.push(frame.to_vec());
        Ok(())
    }
}

/// Run `input` through reader then processor; return decoded responses.
fn exchange(board: MockBoard, input: &[u8]) -> (Vec<ResponsePacket>, Arc<LinkShared>) {
    let shared = Arc::new(LinkShared::new());
    let reader = Reader::new(Script(input.iter().copied().collect()), Arc::clone(&shared), None);
    let _ = reader.run();

    let mut processor = Processor::new(board, Capture::default(), Arc::clone(&shared));
    processor.drain();

    let mut framer = ResponseFramer::new();
    let mut out = Vec::new();
    for frame in &processor.responder().sink().0 {
        framer.feed(frame, |r| out.push(r.unwrap()));
    }
    (out, shared)
}

/// Hand-assemble a frame from header bytes, appending a valid CRC.
fn raw_frame(after_magic: &[u8]) -> Vec<u8> {
    let mut f = MAGIC_BYTES.to_vec();
    f.extend_from_slice(after_magic);
    let crc = checksum(&f);
    f.extend_from_slice(&crc.to_be_bytes());
    f
}

// ── Worked scenarios ──────────────────────────────────────────

#[test]
fn gpio_write_scenario() {
    let board = MockBoard::new();
    let (resp, _) = exchange(board.clone(), &raw_frame(&[0x02, 0x00, 0x02, 0x05, 0x01]));

    assert_eq!(board.calls(), vec![PeripheralCall::GpioWrite { pin: 5, value: 1 }]);
    assert_eq!(resp.len(), 1);
    assert_eq!(resp[0].status, 0);
    assert_eq!(resp[0].data_len(), 0);
}

#[test]
fn health_check_scenario() {
    let (resp, _) = exchange(MockBoard::new(), &raw_frame(&[0x05, 0x00, 0x00]));
    assert_eq!(resp.len(), 1);
    assert_eq!(resp[0].status, 0);
    assert_eq!(resp[0].data.as_slice(), &[0x01]);
}

#[test]
fn unknown_type_scenario() {
    let (resp, _) = exchange(MockBoard::new(), &raw_frame(&[0xFF, 0x00, 0x00]));
    assert_eq!(resp.len(), 1);
    assert_eq!(resp[0].status(), Some(Status::Unsupported));
    assert_eq!(resp[0].data_len(), 0);
}

// ── Failure mapping ───────────────────────────────────────────

#[test]
fn short_gpio_write_is_invalid_and_silent_on_hardware() {
    let board = MockBoard::new();
    let (resp, _) = exchange(board.clone(), &encode_command(0x02, &[5]).unwrap());
    assert_eq!(resp[0].status(), Some(Status::InvalidArgument));
    assert!(board.calls().is_empty());
}

#[test]
fn sensor_read_makes_one_call() {
    let board = MockBoard::new().with_sensor(SensorValue::new(23, 125_000));
    let (resp, _) = exchange(board.clone(), &encode_command(0x03, &[]).unwrap());
    assert_eq!(board.calls(), vec![PeripheralCall::SensorRead]);
    assert_eq!(
        SensorValue::from_le_bytes(&resp[0].data),
        Some(SensorValue::new(23, 125_000))
    );
}

#[test]
fn missing_sensor_still_gets_a_reply() {
    let (resp, _) = exchange(MockBoard::new(), &encode_command(0x03, &[]).unwrap());
    assert_eq!(resp.len(), 1);
    assert_eq!(resp[0].status(), Some(Status::DeviceUnavailable));
}

#[test]
fn device_info_reports_board() {
    let (resp, _) = exchange(MockBoard::new(), &encode_command(0x04, &[]).unwrap());
    assert_eq!(resp[0].data.as_slice(), b"qemu_cortex_m3");
}

// ── Framing faults never reach the board ──────────────────────

#[test]
fn corrupted_frame_gets_no_response() {
    let board = MockBoard::new();
    let mut frame = encode_command(0x02, &[1, 1]).unwrap().to_vec();
    frame[8] ^= 0x10;
    let (resp, shared) = exchange(board.clone(), &frame);

    assert!(resp.is_empty());
    assert!(board.calls().is_empty());
    assert_eq!(shared.stats.snapshot().checksum_errors, 1);
}

#[test]
fn oversize_length_is_dropped_then_link_recovers() {
    let mut input = MAGIC_BYTES.to_vec();
    input.push(0x01);
    input.extend_from_slice(&((MAX_CMD_DATA as u16) + 1).to_be_bytes());
    input.extend_from_slice(&encode_command(0x05, &[]).unwrap());

    let (resp, shared) = exchange(MockBoard::new(), &input);
    assert_eq!(resp.len(), 1);
    assert_eq!(resp[0].data.as_slice(), &[0x01]);
    assert_eq!(shared.stats.snapshot().malformed_headers, 1);
}

#[test]
fn noise_between_frames_is_skipped() {
    let mut input = vec![0xAA, 0x5A, 0x45, 0x00];
    input.extend_from_slice(&encode_command(0x01, &[3]).unwrap());
    input.extend_from_slice(&[0x5A, 0x5A, 0x45, 0x52]);
    input.extend_from_slice(&encode_command(0x05, &[]).unwrap());

    let board = MockBoard::new();
    let (resp, _) = exchange(board.clone(), &input);
    assert_eq!(resp.len(), 2);
    assert_eq!(board.calls(), vec![PeripheralCall::GpioRead { pin: 3 }]);
}

#[test]
fn queue_overflow_drops_newest_and_keeps_order() {
    let mut input = Vec::new();
    for pin in 0..11u8 {
        input.extend_from_slice(&encode_command(0x01, &[pin % 8]).unwrap());
    }
    let board = MockBoard::new();
    let (resp, shared) = exchange(board.clone(), &input);

    assert_eq!(resp.len(), 10);
    assert_eq!(shared.stats.snapshot().queue_full_drops, 1);
    let pins: Vec<u8> = board
        .calls()
        .into_iter()
        .map(|c| match c {
            PeripheralCall::GpioRead { pin } => pin,
            other => panic!("unexpected call {other:?}"),
        })
        .collect();
    assert_eq!(pins, vec![0, 1, 2, 3, 4, 5, 6, 7, 0, 1]);
}

//! Full threaded link: reader and processor on their own threads, talking
//! to a host over in-memory channels.

use std::time::Duration;

use zeroclaw::config::LinkConfig;
use zeroclaw::error::Status;
use zeroclaw::link::io_task::{ReaderExit, spawn};
use zeroclaw::link::packet::encode_command;

use crate::mock_peripherals::{MockBoard, PeripheralCall, serial_pair};

const WAIT: Duration = Duration::from_secs(2);

#[test]
fn request_response_over_threads() {
    let (mut host, source, sink) = serial_pair();
    let board = MockBoard::new();
    let link = spawn(&LinkConfig::default(), source, board.clone(), sink).unwrap();

    host.send(&encode_command(0x02, &[5, 1]).unwrap());
    let resp = host.recv(WAIT).expect("GPIO_WRITE reply");
    assert_eq!(resp.status(), Some(Status::Ok));

    host.send(&encode_command(0x01, &[5]).unwrap());
    let resp = host.recv(WAIT).expect("GPIO_READ reply");
    assert_eq!(resp.data.as_slice(), &[1]);

    assert_eq!(
        board.calls(),
        vec![
            PeripheralCall::GpioWrite { pin: 5, value: 1 },
            PeripheralCall::GpioRead { pin: 5 },
        ]
    );

    host.hang_up();
    let exit = link.join().unwrap();
    assert!(matches!(exit, ReaderExit::Closed(_)));
}

#[test]
fn frame_split_across_chunks() {
    let (mut host, source, sink) = serial_pair();
    let link = spawn(&LinkConfig::default(), source, MockBoard::new(), sink).unwrap();

    let frame = encode_command(0x05, &[]).unwrap();
    host.send(&frame[..3]);
    host.send(&frame[3..8]);
    host.send(&frame[8..]);

    let resp = host.recv(WAIT).expect("HEALTH_CHECK reply");
    assert_eq!(resp.data.as_slice(), &[0x01]);

    host.hang_up();
    link.join().unwrap();
}

#[test]
fn stalled_partial_frame_times_out() {
    let (mut host, source, sink) = serial_pair();
    let config = LinkConfig {
        frame_timeout_ms: 20,
        ..LinkConfig::default()
    };
    let link = spawn(&config, source, MockBoard::new(), sink).unwrap();

    let frame = encode_command(0x05, &[]).unwrap();
    host.send(&frame[..6]);
    std::thread::sleep(Duration::from_millis(100));
    host.send(&frame);

    let resp = host.recv(WAIT).expect("reply after resync");
    assert_eq!(resp.data.as_slice(), &[0x01]);
    assert_eq!(link.stats().frame_timeouts, 1);

    host.hang_up();
    link.join().unwrap();
}

#[test]
fn pending_commands_drain_before_shutdown() {
    let (mut host, source, sink) = serial_pair();
    let board = MockBoard::new();
    let link = spawn(&LinkConfig::default(), source, board.clone(), sink).unwrap();

    let mut burst = Vec::new();
    for pin in 0..4u8 {
        burst.extend_from_slice(&encode_command(0x01, &[pin]).unwrap());
    }
    host.send(&burst);
    host.hang_up();
    link.join().unwrap();

    assert_eq!(board.calls().len(), 4);
    for _ in 0..4 {
        assert!(host.recv(WAIT).is_some());
    }
}

#[test]
fn stop_ends_both_tasks() {
    let (_host, source, sink) = serial_pair();
    let link = spawn(&LinkConfig::default(), source, MockBoard::new(), sink).unwrap();
    link.stop();
    let exit = link.join().unwrap();
    assert!(matches!(exit, ReaderExit::Stopped));
}

//! Fuzz target: `CommandFramer::feed`
//!
//! Drives arbitrary byte sequences into the streaming framer and asserts
//! that it never panics, never yields an oversize payload, and that every
//! frame it accepts re-encodes to bytes it accepts again.
//!
//! cargo fuzz run fuzz_framer

#![no_main]

use libfuzzer_sys::fuzz_target;
use zeroclaw::link::framer::CommandFramer;
use zeroclaw::link::packet::{MAX_CMD_DATA, encode_command};

fuzz_target!(|data: &[u8]| {
    let mut framer = CommandFramer::new();
    let mut accepted = Vec::new();

    framer.feed(data, |r| {
        if let Ok(cmd) = r {
            assert!(cmd.data.len() <= MAX_CMD_DATA, "payload exceeds MAX_CMD_DATA");
            accepted.push(cmd);
        }
    });

    // Whatever was accepted must survive a re-encode through a fresh framer.
    for cmd in accepted {
        let frame = encode_command(cmd.cmd_type, &cmd.data).expect("bounded payload");
        let mut again = CommandFramer::new();
        let mut n = 0;
        again.feed(&frame, |r| {
            assert_eq!(r.as_ref().ok(), Some(&cmd));
            n += 1;
        });
        assert_eq!(n, 1);
    }

    // After a reset the framer must accept bytes cleanly again.
    framer.reset();
    assert!(framer.is_idle());
    framer.feed(data, |_| {});
});

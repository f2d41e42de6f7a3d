//! Receiver bring-up sequences.
//!
//! Recovered from captures of a working host. Most of the words are
//! opaque configuration; only the receiver-state and NMEA-output
//! commands have known meaning. The whole module is replaceable
//! configuration, not protocol.

use std::io::{Read, Write};
use std::time::Duration;

use ai2lib::protocol::commands::{
    HostCommand, RawCommand, ReceiverState, SetNmeaMode, SetReceiverState,
};
use ai2lib::Client;

/// Gap between bring-up frames. The receiver offers no acknowledgment
/// handshake for these, so the pause is load-bearing.
pub const COMMAND_GAP: Duration = Duration::from_millis(200);

/// One frame of the bring-up stream.
#[derive(Debug, Clone)]
pub struct InitStep {
    pub class: u8,
    pub commands: Vec<HostCommand<&'static [u8]>>,
}

fn step(class: u8, commands: Vec<HostCommand<&'static [u8]>>) -> InitStep {
    InitStep { class, commands }
}

fn raw(command: u8, body: &'static [u8]) -> HostCommand<&'static [u8]> {
    HostCommand::Raw(RawCommand { command, body })
}

fn state(state: ReceiverState) -> HostCommand<&'static [u8]> {
    HostCommand::ReceiverState(SetReceiverState { state })
}

/// Bring the receiver up in binary reporting mode.
pub fn binary_sequence() -> Vec<InitStep> {
    vec![
        step(0x00, vec![raw(0xf5, &[0x01])]),
        step(0x01, vec![raw(0xf1, &[0x05])]),
        step(0x01, vec![raw(0xf0, &[])]),
        step(0x01, vec![state(ReceiverState::Idle)]),
        step(0x01, vec![raw(0xed, &[0x00])]),
        step(
            0x01,
            vec![raw(
                0x06,
                &[
                    0x01, 0x0e, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
                ],
            )],
        ),
        step(0x01, vec![state(ReceiverState::On)]),
    ]
}

/// Bring the receiver up with NMEA passthrough enabled.
///
/// The third frame batches the rate and mask configuration together
/// with the receiver-on command, under one checksum.
pub fn nmea_sequence() -> Vec<InitStep> {
    vec![
        step(0x00, vec![raw(0xf5, &[0x01])]),
        step(0x01, vec![raw(0xf1, &[0x05])]),
        step(
            0x01,
            vec![
                raw(
                    0x08,
                    &[
                        0x00, 0x01, 0x3c, 0x01, 0x00, 0x01, 0x04, 0x83, 0x03, 0x70, 0x17, 0xa0,
                        0x0f, 0x07, 0x1e, 0x07, 0x1e, 0x01, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00,
                    ],
                ),
                raw(
                    0x06,
                    &[
                        0x01, 0x00, 0x00, 0x00, 0x00, 0xff, 0x01, 0x00, 0x00, 0x01, 0x00, 0x00,
                        0x00,
                    ],
                ),
                raw(0x20, &[0x00, 0x00, 0x00, 0x00, 0x57, 0x02, 0x00, 0x00, 0x01]),
                raw(0xe5, &[0x3f, 0x00, 0x00, 0x00]),
                state(ReceiverState::On),
            ],
        ),
        step(0x00, vec![HostCommand::NmeaMode(SetNmeaMode { enable: true })]),
    ]
}

/// Send a bring-up sequence with the fixed inter-frame gap.
pub fn run<F>(client: &mut Client<F>, steps: &[InitStep]) -> anyhow::Result<()>
where
    F: Read + Write,
{
    for (i, step) in steps.iter().enumerate() {
        client.write_many(step.class, &step.commands)?;
        log::debug!(
            "sent init step {}/{} (class {:#04x}, {} command(s))",
            i + 1,
            steps.len(),
            step.class,
            step.commands.len()
        );
        if i + 1 < steps.len() {
            std::thread::sleep(COMMAND_GAP);
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use ai2lib::protocol::checksum::Sum16;
    use ai2lib::protocol::encode_many_to_vec;

    use super::*;

    fn frames(steps: &[InitStep]) -> Vec<Vec<u8>> {
        steps
            .iter()
            .map(|s| encode_many_to_vec(&Sum16, s.class, &s.commands))
            .collect()
    }

    // the expected bytes are the captured bring-up stream of a working
    // host, checksums included

    #[test]
    fn binary_sequence_matches_captures() {
        let expected: [&[u8]; 7] = [
            &[0x10, 0x00, 0xf5, 0x01, 0x00, 0x01, 0x07, 0x01, 0x10, 0x03],
            &[0x10, 0x01, 0xf1, 0x01, 0x00, 0x05, 0x08, 0x01, 0x10, 0x03],
            &[0x10, 0x01, 0xf0, 0x00, 0x00, 0x01, 0x01, 0x10, 0x03],
            &[0x10, 0x01, 0x02, 0x01, 0x00, 0x02, 0x16, 0x00, 0x10, 0x03],
            &[0x10, 0x01, 0xed, 0x01, 0x00, 0x00, 0xff, 0x00, 0x10, 0x03],
            &[
                0x10, 0x01, 0x06, 0x0d, 0x00, 0x01, 0x0e, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00,
                0x00, 0x00, 0x00, 0x00, 0x00, 0x34, 0x00, 0x10, 0x03,
            ],
            &[0x10, 0x01, 0x02, 0x01, 0x00, 0x03, 0x17, 0x00, 0x10, 0x03],
        ];

        assert_eq!(frames(&binary_sequence()), expected);
    }

    #[test]
    fn nmea_sequence_matches_captures() {
        let expected: [&[u8]; 4] = [
            &[0x10, 0x00, 0xf5, 0x01, 0x00, 0x01, 0x07, 0x01, 0x10, 0x03],
            &[0x10, 0x01, 0xf1, 0x01, 0x00, 0x05, 0x08, 0x01, 0x10, 0x03],
            &[
                0x10, 0x01, 0x08, 0x18, 0x00, 0x00, 0x01, 0x3c, 0x01, 0x00, 0x01, 0x04, 0x83,
                0x03, 0x70, 0x17, 0xa0, 0x0f, 0x07, 0x1e, 0x07, 0x1e, 0x01, 0x00, 0x00, 0x00,
                0x00, 0x01, 0x00, 0x06, 0x0d, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0xff, 0x01,
                0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x20, 0x09, 0x00, 0x00, 0x00, 0x00, 0x00,
                0x57, 0x02, 0x00, 0x00, 0x01, 0xe5, 0x04, 0x00, 0x3f, 0x00, 0x00, 0x00, 0x02,
                0x01, 0x00, 0x03, 0x42, 0x05, 0x10, 0x03,
            ],
            &[0x10, 0x00, 0x22, 0x01, 0x00, 0x01, 0x34, 0x00, 0x10, 0x03],
        ];

        assert_eq!(frames(&nmea_sequence()), expected);
    }
}

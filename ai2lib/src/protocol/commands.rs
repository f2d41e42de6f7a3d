//! Outgoing host-to-receiver commands.
//!
//! Only the opcodes whose meaning is known get a typed struct; the
//! bring-up stream also carries opaque configuration words, sent as
//! [RawCommand].

use super::serialize::{CommandSerialize, Serializer};

/// A command with statically-known opcode.
pub trait CommandOpcode {
    const COMMAND: u8;
}

/// An arbitrary command: opcode plus raw body bytes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawCommand<I> {
    pub command: u8,
    pub body: I,
}

impl<I> RawCommand<I> {
    pub fn map<F, J>(self, f: F) -> RawCommand<J>
    where
        F: FnOnce(I) -> J,
    {
        RawCommand {
            command: self.command,
            body: f(self.body),
        }
    }

    pub fn map_ref<'a, F, J>(&'a self, f: F) -> RawCommand<J>
    where
        F: FnOnce(&'a I) -> J,
    {
        RawCommand {
            command: self.command,
            body: f(&self.body),
        }
    }
}

impl<I> CommandSerialize for RawCommand<I>
where
    I: AsRef<[u8]>,
{
    fn command(&self) -> u8 {
        self.command
    }

    fn command_body<S>(&self, ser: &mut S) -> Result<(), S::Error>
    where
        S: Serializer,
    {
        ser.write_bytes(self.body.as_ref())
    }
}

/// Receiver engine states selectable over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReceiverState {
    Off,
    Idle,
    On,
}

impl ReceiverState {
    pub fn code(&self) -> u8 {
        match self {
            Self::Off => 0x01,
            Self::Idle => 0x02,
            Self::On => 0x03,
        }
    }
}

/// 0x02 Set Receiver State.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SetReceiverState {
    pub state: ReceiverState,
}

impl CommandOpcode for SetReceiverState {
    const COMMAND: u8 = 0x02;
}

impl CommandSerialize for SetReceiverState {
    fn command(&self) -> u8 {
        Self::COMMAND
    }

    fn command_body<S>(&self, ser: &mut S) -> Result<(), S::Error>
    where
        S: Serializer,
    {
        ser.write_u8(self.state.code())
    }
}

/// 0x22 Set NMEA Output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SetNmeaMode {
    pub enable: bool,
}

impl CommandOpcode for SetNmeaMode {
    const COMMAND: u8 = 0x22;
}

impl CommandSerialize for SetNmeaMode {
    fn command(&self) -> u8 {
        Self::COMMAND
    }

    fn command_body<S>(&self, ser: &mut S) -> Result<(), S::Error>
    where
        S: Serializer,
    {
        ser.write_u8(self.enable as u8)
    }
}

/// Any command a host can put in a frame.
///
/// Lets heterogeneous commands share one multi-sub-packet frame.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HostCommand<I> {
    ReceiverState(SetReceiverState),
    NmeaMode(SetNmeaMode),
    Raw(RawCommand<I>),
}

impl<I> CommandSerialize for HostCommand<I>
where
    I: AsRef<[u8]>,
{
    fn command(&self) -> u8 {
        match self {
            Self::ReceiverState(c) => c.command(),
            Self::NmeaMode(c) => c.command(),
            Self::Raw(c) => c.command(),
        }
    }

    fn command_body<S>(&self, ser: &mut S) -> Result<(), S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::ReceiverState(c) => c.command_body(ser),
            Self::NmeaMode(c) => c.command_body(ser),
            Self::Raw(c) => c.command_body(ser),
        }
    }
}

#[cfg(test)]
mod test {
    use quickcheck::{Arbitrary, Gen};

    use super::super::checksum::Sum16;
    use super::super::{encode_many_to_vec, encode_to_vec};
    use super::*;

    impl Arbitrary for RawCommand<Vec<u8>> {
        fn arbitrary(g: &mut Gen) -> Self {
            Self {
                command: u8::arbitrary(g),
                body: Vec::arbitrary(g),
            }
        }
    }

    // expected frames below are the receiver's documented bring-up
    // stream, byte for byte

    #[test]
    fn receiver_idle_frame() {
        let wire = encode_to_vec(
            &Sum16,
            0x01,
            &SetReceiverState {
                state: ReceiverState::Idle,
            },
        );
        assert_eq!(
            wire,
            vec![0x10, 0x01, 0x02, 0x01, 0x00, 0x02, 0x16, 0x00, 0x10, 0x03]
        );
    }

    #[test]
    fn receiver_on_frame() {
        let wire = encode_to_vec(
            &Sum16,
            0x01,
            &SetReceiverState {
                state: ReceiverState::On,
            },
        );
        assert_eq!(
            wire,
            vec![0x10, 0x01, 0x02, 0x01, 0x00, 0x03, 0x17, 0x00, 0x10, 0x03]
        );
    }

    #[test]
    fn nmea_on_frame() {
        let wire = encode_to_vec(&Sum16, 0x00, &SetNmeaMode { enable: true });
        assert_eq!(
            wire,
            vec![0x10, 0x00, 0x22, 0x01, 0x00, 0x01, 0x34, 0x00, 0x10, 0x03]
        );
    }

    #[test]
    fn zero_length_command_frame() {
        let wire = encode_to_vec(
            &Sum16,
            0x01,
            &RawCommand {
                command: 0xf0,
                body: b"".as_ref(),
            },
        );
        assert_eq!(
            wire,
            vec![0x10, 0x01, 0xf0, 0x00, 0x00, 0x01, 0x01, 0x10, 0x03]
        );
    }

    #[test]
    fn long_raw_command_frame() {
        let wire = encode_to_vec(
            &Sum16,
            0x01,
            &RawCommand {
                command: 0x06,
                body: [
                    0x01, 0x0e, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
                ]
                .as_ref(),
            },
        );
        assert_eq!(
            wire,
            vec![
                0x10, 0x01, 0x06, 0x0d, 0x00, 0x01, 0x0e, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00,
                0x00, 0x00, 0x00, 0x00, 0x00, 0x34, 0x00, 0x10, 0x03
            ]
        );
    }

    #[test]
    fn mixed_commands_share_one_frame_and_checksum() {
        let commands = [
            HostCommand::Raw(RawCommand {
                command: 0xe5,
                body: b"\x3f\x00\x00\x00".as_ref(),
            }),
            HostCommand::ReceiverState(SetReceiverState {
                state: ReceiverState::On,
            }),
        ];
        let wire = encode_many_to_vec(&Sum16, 0x01, &commands);
        assert_eq!(
            wire,
            vec![
                0x10, 0x01, // marker, class
                0xe5, 0x04, 0x00, 0x3f, 0x00, 0x00, 0x00, // first sub-packet
                0x02, 0x01, 0x00, 0x03, // second sub-packet
                0x3f, 0x01, // one shared checksum
                0x10, 0x03,
            ]
        );
    }

    #[test]
    fn marker_bytes_in_body_are_doubled() {
        let wire = encode_to_vec(
            &Sum16,
            0x01,
            &RawCommand {
                command: 0x42,
                body: [0x10].as_ref(),
            },
        );
        assert_eq!(
            wire,
            vec![0x10, 0x01, 0x42, 0x01, 0x00, 0x10, 0x10, 0x64, 0x00, 0x10, 0x03]
        );
    }
}

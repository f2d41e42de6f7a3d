use std::io::{Read, Write};

use crate::protocol;
use crate::protocol::checksum::{ChecksumStyle, Sum16};
use crate::protocol::framer::{Deframer, FramerEvent};
use crate::protocol::serialize::SerializerWrap;
use crate::protocol::{CommandSerialize, Decoded, FrameError};

/// An error type for [Client].
#[derive(Debug)]
pub enum ClientError {
    /// EOF in underlying stream.
    UnexpectedEof,
    /// Other IO error in underlying stream.
    Io(std::io::Error),
}

impl std::error::Error for ClientError {}

impl core::fmt::Display for ClientError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::UnexpectedEof => write!(f, "unexpected eof"),
            Self::Io(e) => write!(f, "io error: {}", e),
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(other: std::io::Error) -> Self {
        Self::Io(other)
    }
}

/// How many bytes to pull from the port per read call.
const READ_CHUNK: usize = 256;

/// A host-side client for the AI2 serial protocol.
///
/// Owns the port and the deframer state; decoding and encoding use the
/// incoming and outgoing checksum styles respectively (both the plain
/// 16-bit sum unless overridden).
#[derive(Debug)]
pub struct Client<F, InC = Sum16, OutC = Sum16> {
    port: F,
    deframer: Deframer,
    chunk: [u8; READ_CHUNK],
    in_sum: InC,
    out_sum: OutC,
}

impl<F> Client<F> {
    /// Create a new client with the standard checksums.
    pub fn new(port: F) -> Self {
        Self::new_checksum(Sum16, Sum16, port)
    }
}

impl<F, InC, OutC> Client<F, InC, OutC>
where
    InC: ChecksumStyle,
    OutC: ChecksumStyle,
{
    /// Create a new client with the provided incoming and outgoing
    /// checksum styles.
    pub fn new_checksum(in_sum: InC, out_sum: OutC, port: F) -> Self {
        Self {
            port,
            deframer: Deframer::new(),
            chunk: [0; READ_CHUNK],
            in_sum,
            out_sum,
        }
    }

    /// Release the underlying port.
    pub fn free(self) -> F {
        self.port
    }

    /// Get the underlying port.
    pub fn port(&self) -> &F {
        &self.port
    }

    /// Get the underlying port, mutably.
    ///
    /// Using this won't confuse the client, but it might cause you to
    /// miss frames if you are not careful.
    pub fn port_mut(&mut self) -> &mut F {
        &mut self.port
    }

    /// Get the incoming checksum style.
    pub fn in_checksum(&self) -> &InC {
        &self.in_sum
    }

    /// Get the outgoing checksum style.
    pub fn out_checksum(&self) -> &OutC {
        &self.out_sum
    }

    /// Pull one chunk of bytes from the port and run the deframer over
    /// it. Blocks until the port produces something; an empty read is
    /// end-of-stream.
    pub fn read(&mut self) -> Result<Vec<FramerEvent>, ClientError>
    where
        F: Read,
    {
        let amt = self.port.read(&mut self.chunk)?;
        if amt == 0 {
            return Err(ClientError::UnexpectedEof);
        }
        Ok(self.deframer.push_slice(&self.chunk[..amt]))
    }

    /// Decode one deframed buffer with the incoming checksum style.
    pub fn decode<'a>(&self, raw: &'a [u8]) -> Result<Decoded<&'a [u8]>, FrameError> {
        protocol::decode(&self.in_sum, raw)
    }

    /// Encode one command frame and flush it to the port.
    pub fn write<M>(&mut self, class: u8, command: &M) -> Result<(), ClientError>
    where
        F: Write,
        M: CommandSerialize,
    {
        let mut ser = SerializerWrap::new(&mut self.port);
        protocol::encode(&self.out_sum, &mut ser, class, command)?;
        self.port.flush()?;
        Ok(())
    }

    /// Encode several commands into one frame and flush it to the port.
    pub fn write_many<M>(&mut self, class: u8, commands: &[M]) -> Result<(), ClientError>
    where
        F: Write,
        M: CommandSerialize,
    {
        let mut ser = SerializerWrap::new(&mut self.port);
        protocol::encode_many(&self.out_sum, &mut ser, class, commands)?;
        self.port.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::protocol::commands::RawCommand;
    use crate::protocol::Report;

    #[test]
    fn read_deframes_a_noisy_stream() {
        let mut stream = b"junk".to_vec();
        stream.extend_from_slice(&protocol::encode_to_vec(
            &Sum16,
            0x05,
            &RawCommand {
                command: 0x99,
                body: b"\xaa".as_ref(),
            },
        ));
        let mut client = Client::new(std::io::Cursor::new(stream));

        let mut frames = Vec::new();
        loop {
            match client.read() {
                Ok(events) => {
                    for event in events {
                        if let FramerEvent::Frame(buf) = event {
                            frames.push(buf);
                        }
                    }
                }
                Err(ClientError::UnexpectedEof) => break,
                Err(e) => panic!("io error: {}", e),
            }
        }

        assert_eq!(frames.len(), 1);
        let Decoded::Reports(frame) = client.decode(&frames[0]).unwrap() else {
            panic!("not a report frame");
        };
        assert_eq!(frame.class, 0x05);
        assert!(matches!(frame.reports[..], [Report::Unknown(_)]));
    }

    #[test]
    fn write_emits_one_full_frame() {
        let mut client = Client::new(std::io::Cursor::new(Vec::new()));
        let command = RawCommand {
            command: 0xf0,
            body: b"".as_ref(),
        };
        client.write(0x01, &command).unwrap();
        assert_eq!(
            client.free().into_inner(),
            protocol::encode_to_vec(&Sum16, 0x01, &command)
        );
    }
}

use super::{FRAME_MARK, FRAME_TERM, MAX_FRAME_SIZE};

/// Something the [Deframer] noticed about the byte stream.
///
/// Every error variant leaves the deframer idle again; a later
/// well-formed frame always decodes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FramerEvent {
    /// A byte seen between frames that is not a frame marker.
    Noise(u8),
    /// Terminator directly after the frame marker.
    UnexpectedEnd,
    /// The frame exceeded [MAX_FRAME_SIZE] without terminating; its
    /// buffer was discarded.
    Overlong,
    /// A complete, un-escaped frame buffer: marker byte, class byte,
    /// body and trailing checksum. Not yet validated.
    Frame(Vec<u8>),
}

/// Incremental frame extractor for the receiver's byte stream.
///
/// `0x10` doubles as the escape introducer and the terminator prefix:
/// inside a frame it is always consumed, and only the byte after it
/// decides — `0x03` ends the frame, anything else (including a second
/// `0x10`) is stored literally.
#[derive(Debug, Clone)]
pub struct Deframer {
    buf: Vec<u8>,
    escaping: bool,
}

impl Deframer {
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(MAX_FRAME_SIZE),
            escaping: false,
        }
    }

    /// True between frames.
    pub fn is_idle(&self) -> bool {
        self.buf.is_empty()
    }

    /// Feed one byte.
    pub fn push(&mut self, byte: u8) -> Option<FramerEvent> {
        if self.buf.is_empty() {
            self.escaping = false;
            if byte != FRAME_MARK {
                return Some(FramerEvent::Noise(byte));
            }
            // the marker is kept; it is part of the checksummed range
            self.buf.push(byte);
            return None;
        }

        // a terminator before any body byte, checked ahead of the
        // escape logic exactly as the receiver expects
        if self.buf.len() == 1 && byte == FRAME_TERM {
            self.buf.clear();
            return Some(FramerEvent::UnexpectedEnd);
        }

        if !self.escaping && byte == FRAME_MARK {
            self.escaping = true;
            return None;
        }

        if self.escaping && byte == FRAME_TERM {
            self.escaping = false;
            let frame = core::mem::replace(&mut self.buf, Vec::with_capacity(MAX_FRAME_SIZE));
            return Some(FramerEvent::Frame(frame));
        }
        self.escaping = false;

        if self.buf.len() >= MAX_FRAME_SIZE {
            self.buf.clear();
            return Some(FramerEvent::Overlong);
        }
        self.buf.push(byte);
        None
    }

    /// Feed a chunk and collect everything of note.
    pub fn push_slice(&mut self, bytes: &[u8]) -> Vec<FramerEvent> {
        bytes.iter().filter_map(|b| self.push(*b)).collect()
    }
}

impl Default for Deframer {
    fn default() -> Self {
        Self::new()
    }
}

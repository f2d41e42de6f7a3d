use super::checksum::{ChecksumDigest, ChecksumStyle};
use super::{InputParse, CLASS_ACK};

/// Why a completed frame buffer was rejected outright.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FrameError {
    /// Too short to carry a class byte and a checksum.
    Runt { len: usize },
    /// The declared and computed sums disagree.
    ChecksumMismatch { expected: u16, computed: u16 },
}

impl std::error::Error for FrameError {}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::Runt { len } => write!(f, "frame too short ({} bytes)", len),
            Self::ChecksumMismatch { expected, computed } => {
                write!(f, "checksum mismatch {:04x} != {:04x}", expected, computed)
            }
        }
    }
}

/// A sub-packet header declared more bytes than the frame has left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CutOff;

/// A checksum-validated frame: the class byte plus the sub-packet
/// stream, with the leading marker and the trailing sum stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame<I> {
    pub class: u8,
    body: I,
}

/// Little-endian u16 out of an element iterator.
fn read_le_u16(iter: &mut impl Iterator<Item = u8>) -> Option<u16> {
    Some((iter.next()? as u16) | ((iter.next()? as u16) << 8))
}

impl<I> Frame<I>
where
    I: InputParse,
{
    /// Validate a raw frame buffer as produced by the deframer.
    ///
    /// The computed sum covers every byte before the trailing checksum,
    /// the stored marker and class byte included.
    pub fn parse<C>(checksum: &C, raw: I) -> Result<Self, FrameError>
    where
        C: ChecksumStyle,
    {
        let len = raw.input_len();
        if len < 4 {
            return Err(FrameError::Runt { len });
        }

        let (trailer, content) = raw.take_split(len - 2);
        let expected = match read_le_u16(&mut trailer.iter_elements()) {
            Some(v) => v,
            None => return Err(FrameError::Runt { len }),
        };

        let mut digest = checksum.digest();
        for chunk in content.iter_slices() {
            digest.update(chunk);
        }
        let computed = digest.finalize();

        if !checksum.validate(computed, expected) {
            return Err(FrameError::ChecksumMismatch { expected, computed });
        }

        // content[0] is the retained marker byte
        let class = match content.iter_elements().nth(1) {
            Some(class) => class,
            None => return Err(FrameError::Runt { len }),
        };

        Ok(Frame {
            class,
            body: content.slice(2..),
        })
    }

    /// Acknowledgment frames carry no sub-packet stream.
    pub fn is_ack(&self) -> bool {
        self.class == CLASS_ACK
    }

    pub fn body(&self) -> &I {
        &self.body
    }

    /// Iterate the length-prefixed sub-packets.
    ///
    /// Meaningless on an acknowledgment frame; check [Self::is_ack]
    /// first.
    pub fn subpackets(&self) -> SubPackets<I> {
        SubPackets {
            rest: self.body.clone(),
            stopped: false,
        }
    }
}

/// One length-prefixed unit of a frame body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubPacket<I> {
    pub typ: u8,
    pub payload: I,
}

/// Iterator over a frame body. Yields `Err(CutOff)` once and stops if a
/// declared length overruns the remaining bytes; sub-packets already
/// yielded stay valid.
#[derive(Debug, Clone)]
pub struct SubPackets<I> {
    rest: I,
    stopped: bool,
}

impl<I> Iterator for SubPackets<I>
where
    I: InputParse,
{
    type Item = Result<SubPacket<I>, CutOff>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.stopped || self.rest.input_len() < 3 {
            return None;
        }

        let header: nom::IResult<I, (u8, u16)> = nom::sequence::tuple((
            nom::number::complete::u8,
            nom::number::complete::le_u16,
        ))(self.rest.clone());
        let (after, (typ, sublen)) = match header {
            Ok(parsed) => parsed,
            // three bytes are known to remain
            Err(_) => return None,
        };

        if after.input_len() < sublen as usize {
            self.stopped = true;
            return Some(Err(CutOff));
        }

        let (rest, payload) = after.take_split(sublen as usize);
        self.rest = rest;
        Some(Ok(SubPacket { typ, payload }))
    }
}

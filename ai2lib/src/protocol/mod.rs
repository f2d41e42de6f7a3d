//! Codec for the AI2 framed binary protocol spoken by TI GNSS receivers.

/// Frame marker. Doubles as the escape introducer inside a frame body.
pub const FRAME_MARK: u8 = 0x10;

/// Terminator byte. Only meaningful directly after an unescaped [FRAME_MARK].
pub const FRAME_TERM: u8 = 0x03;

/// Class byte carried by acknowledgment frames.
pub const CLASS_ACK: u8 = 0x02;

/// Receive buffer size. Matches the receiver's own frame limit.
pub const MAX_FRAME_SIZE: usize = 1024;

pub mod checksum;

pub mod framer;
pub use framer::{Deframer, FramerEvent};

pub mod frame;
pub use frame::{CutOff, Frame, FrameError, SubPacket, SubPackets};

pub mod reports;
pub use reports::{Report, ReportParse, ReportType};

pub mod serialize;
pub use serialize::{CommandSerialize, Serializer};

pub mod commands;

use checksum::{ChecksumDigest, ChecksumStyle};

/// A whole bundle of nom input traits the codec parsers need, plus
/// iterating over slice chunks.
pub trait InputParse:
    nom::InputLength
    + nom::InputIter<Item = u8>
    + nom::InputTake
    + nom::Slice<core::ops::Range<usize>>
    + nom::Slice<core::ops::RangeFrom<usize>>
    + nom::Slice<core::ops::RangeTo<usize>>
    + Clone
    + PartialEq
{
    /// Iterate over chunks of byte slices.
    ///
    /// Used to speed up checksum digests.
    fn iter_slices(&self) -> impl Iterator<Item = &[u8]>;
}

impl<'a> InputParse for &'a [u8] {
    fn iter_slices(&self) -> impl Iterator<Item = &[u8]> {
        core::iter::once(*self)
    }
}

/// A sub-packet that failed its decoder's length precondition.
///
/// Surfaced as a diagnostic; the rest of the frame still decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Skipped {
    pub typ: u8,
    pub len: usize,
}

/// Everything one validated non-ack frame decoded to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameReports<I> {
    pub class: u8,
    pub reports: Vec<Report<I>>,
    pub skipped: Vec<Skipped>,
    /// A sub-packet declared more bytes than the frame had left; the
    /// remainder of the frame was abandoned.
    pub cut_off: bool,
}

impl<I> FrameReports<I> {
    pub fn map<F, J>(self, mut f: F) -> FrameReports<J>
    where
        F: FnMut(I) -> J,
    {
        FrameReports {
            class: self.class,
            reports: self
                .reports
                .into_iter()
                .map(|r| r.map(|i| f(i)))
                .collect(),
            skipped: self.skipped,
            cut_off: self.cut_off,
        }
    }
}

/// Result of [decode] on a checksum-validated frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded<I> {
    /// Acknowledgment frame. Carries no sub-packets.
    Ack,
    Reports(FrameReports<I>),
}

impl<I> Decoded<I> {
    pub fn map<F, J>(self, f: F) -> Decoded<J>
    where
        F: FnMut(I) -> J,
    {
        match self {
            Self::Ack => Decoded::Ack,
            Self::Reports(r) => Decoded::Reports(r.map(f)),
        }
    }
}

/// Decode one complete frame buffer, as produced by the [Deframer].
///
/// Validates the trailing checksum, detects acknowledgment frames, and
/// runs every sub-packet through the report parsers. Sub-packets that
/// fail their decoder's length precondition end up in
/// [FrameReports::skipped]; a sub-packet whose declared length overruns
/// the frame sets [FrameReports::cut_off] and abandons the remainder.
pub fn decode<C, I>(checksum: &C, raw: I) -> Result<Decoded<I>, FrameError>
where
    C: ChecksumStyle,
    I: InputParse,
{
    let frame = Frame::parse(checksum, raw)?;
    if frame.is_ack() {
        return Ok(Decoded::Ack);
    }

    let mut reports = Vec::new();
    let mut skipped = Vec::new();
    let mut cut_off = false;
    for sub in frame.subpackets() {
        match sub {
            Ok(sp) => {
                let len = sp.payload.input_len();
                let mut parser = nom::combinator::all_consuming(Report::parse_body(sp.typ));
                match parser(sp.payload.clone()) {
                    Ok((_, report)) => reports.push(report),
                    Err(_) => skipped.push(Skipped { typ: sp.typ, len }),
                }
            }
            Err(CutOff) => {
                cut_off = true;
            }
        }
    }

    Ok(Decoded::Reports(FrameReports {
        class: frame.class,
        reports,
        skipped,
        cut_off,
    }))
}

/// Serialize one command into a full frame: marker, class, escaped
/// sub-packet and checksum, terminator.
pub fn encode<C, S, M>(checksum: &C, ser: &mut S, class: u8, command: &M) -> Result<(), S::Error>
where
    C: ChecksumStyle,
    S: Serializer,
    M: CommandSerialize,
{
    encode_many(checksum, ser, class, core::slice::from_ref(command))
}

/// Serialize several commands into a single frame with one shared
/// checksum. The receiver's bring-up stream uses such frames.
pub fn encode_many<C, S, M>(
    checksum: &C,
    ser: &mut S,
    class: u8,
    commands: &[M],
) -> Result<(), S::Error>
where
    C: ChecksumStyle,
    S: Serializer,
    M: CommandSerialize,
{
    // marker and class go out raw; the class byte is never escaped,
    // even when it collides with the marker value
    ser.write_bytes(&[FRAME_MARK, class])?;

    // both raw leading bytes still count toward the checksum
    let mut digest = checksum.digest();
    digest.update(&[FRAME_MARK, class]);

    // the digest sees logical bytes, the wire sees escaped bytes
    let escaped = serialize::SerializerEscaped::new(&mut *ser);
    let mut summed = serialize::SerializerSum::with_digest(digest, escaped);
    for command in commands {
        command.subpacket(&mut summed)?;
    }
    let (sum, mut escaped) = summed.finalize();
    escaped.write_le_u16(sum)?;

    let ser = escaped.done();
    ser.write_bytes(&[FRAME_MARK, FRAME_TERM])
}

/// [encode] into a fresh buffer.
pub fn encode_to_vec<C, M>(checksum: &C, class: u8, command: &M) -> Vec<u8>
where
    C: ChecksumStyle,
    M: CommandSerialize,
{
    encode_many_to_vec(checksum, class, core::slice::from_ref(command))
}

/// [encode_many] into a fresh buffer.
pub fn encode_many_to_vec<C, M>(checksum: &C, class: u8, commands: &[M]) -> Vec<u8>
where
    C: ChecksumStyle,
    M: CommandSerialize,
{
    use void::ResultVoidExt;

    let mut ser = serialize::SerializerVec::new();
    encode_many(checksum, &mut ser, class, commands).void_unwrap();
    ser.done()
}

use super::checksum::{ChecksumDigest, ChecksumStyle};
use super::FRAME_MARK;

/// A sink for serialized command bytes.
pub trait Serializer {
    type Error;

    fn write_u8(&mut self, val: u8) -> Result<(), Self::Error>;

    // everything else can be written in terms of write_u8
    // (although they probably should be specialized in some impls)

    fn write_bytes(&mut self, val: &[u8]) -> Result<(), Self::Error> {
        for b in val.iter() {
            self.write_u8(*b)?;
        }
        Ok(())
    }

    fn write_le_u16(&mut self, val: u16) -> Result<(), Self::Error> {
        self.write_bytes(&[(val & 0xff) as u8, (val >> 8) as u8])
    }

    fn write_le_u32(&mut self, val: u32) -> Result<(), Self::Error> {
        self.write_bytes(&[
            (val & 0xff) as u8,
            ((val >> 8) & 0xff) as u8,
            ((val >> 16) & 0xff) as u8,
            ((val >> 24) & 0xff) as u8,
        ])
    }
}

impl<S> Serializer for &mut S
where
    S: Serializer,
{
    type Error = S::Error;

    fn write_u8(&mut self, val: u8) -> Result<(), Self::Error> {
        (*self).write_u8(val)
    }

    fn write_bytes(&mut self, val: &[u8]) -> Result<(), Self::Error> {
        (*self).write_bytes(val)
    }

    fn write_le_u16(&mut self, val: u16) -> Result<(), Self::Error> {
        (*self).write_le_u16(val)
    }

    fn write_le_u32(&mut self, val: u32) -> Result<(), Self::Error> {
        (*self).write_le_u32(val)
    }
}

/// Wrap an [std::io::Write] to become a [Serializer].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializerWrap<T> {
    inner: T,
}

impl<T> SerializerWrap<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn done(self) -> T {
        self.inner
    }
}

impl<T> Serializer for SerializerWrap<T>
where
    T: std::io::Write,
{
    type Error = std::io::Error;

    fn write_u8(&mut self, val: u8) -> Result<(), Self::Error> {
        self.inner.write_all(&[val])
    }

    fn write_bytes(&mut self, val: &[u8]) -> Result<(), Self::Error> {
        self.inner.write_all(val)
    }
}

/// A serializer into a growable buffer. Cannot fail.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SerializerVec {
    data: Vec<u8>,
}

impl SerializerVec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn done(self) -> Vec<u8> {
        self.data
    }
}

impl Serializer for SerializerVec {
    type Error = void::Void;

    fn write_u8(&mut self, val: u8) -> Result<(), Self::Error> {
        self.data.push(val);
        Ok(())
    }

    fn write_bytes(&mut self, val: &[u8]) -> Result<(), Self::Error> {
        self.data.extend_from_slice(val);
        Ok(())
    }
}

/// A serializer that only counts bytes written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SerializerLength {
    len: usize,
}

impl SerializerLength {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Serializer for SerializerLength {
    type Error = void::Void;

    fn write_u8(&mut self, _val: u8) -> Result<(), Self::Error> {
        self.len += 1;
        Ok(())
    }

    fn write_bytes(&mut self, val: &[u8]) -> Result<(), Self::Error> {
        self.len += val.len();
        Ok(())
    }

    fn write_le_u16(&mut self, _val: u16) -> Result<(), Self::Error> {
        self.len += 2;
        Ok(())
    }

    fn write_le_u32(&mut self, _val: u32) -> Result<(), Self::Error> {
        self.len += 4;
        Ok(())
    }
}

/// A serializer that also feeds a checksum digest on the side.
///
/// The digest sees the bytes as written here, before any escaping
/// applied by the wrapped serializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializerSum<D, T> {
    digest: D,
    inner: T,
}

impl<D, T> SerializerSum<D, T>
where
    D: ChecksumDigest,
{
    pub fn new<C>(checksum: &C, inner: T) -> Self
    where
        C: ChecksumStyle<Digest = D>,
    {
        Self::with_digest(checksum.digest(), inner)
    }

    /// Continue an already-seeded digest.
    pub fn with_digest(digest: D, inner: T) -> Self {
        Self { digest, inner }
    }

    pub fn finalize(self) -> (u16, T) {
        (self.digest.finalize(), self.inner)
    }
}

impl<D, T> Serializer for SerializerSum<D, T>
where
    D: ChecksumDigest,
    T: Serializer,
{
    type Error = T::Error;

    fn write_u8(&mut self, val: u8) -> Result<(), Self::Error> {
        self.digest.update(&[val]);
        self.inner.write_u8(val)
    }

    fn write_bytes(&mut self, val: &[u8]) -> Result<(), Self::Error> {
        self.digest.update(val);
        self.inner.write_bytes(val)
    }
}

/// A serializer that doubles every marker byte so the deframer's escape
/// logic reconstructs it as one literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializerEscaped<T> {
    inner: T,
}

impl<T> SerializerEscaped<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn done(self) -> T {
        self.inner
    }
}

impl<T> Serializer for SerializerEscaped<T>
where
    T: Serializer,
{
    type Error = T::Error;

    fn write_u8(&mut self, val: u8) -> Result<(), Self::Error> {
        if val == FRAME_MARK {
            self.inner.write_bytes(&[FRAME_MARK, FRAME_MARK])
        } else {
            self.inner.write_u8(val)
        }
    }
}

/// A trait for serializing outgoing commands.
pub trait CommandSerialize {
    /// The command opcode.
    fn command(&self) -> u8;

    /// Serialize just the command body.
    ///
    /// For this to work correctly, it *must* perform the same actions
    /// every time it is called with the same command. That means no
    /// IO, no funny business.
    fn command_body<S>(&self, ser: &mut S) -> Result<(), S::Error>
    where
        S: Serializer;

    /// Serialize the command as a frame sub-packet, with opcode and
    /// length header.
    fn subpacket<S>(&self, ser: &mut S) -> Result<(), S::Error>
    where
        S: Serializer,
    {
        use void::ResultVoidExt;

        // run it once to get a length
        let mut len_ser = SerializerLength::new();
        self.command_body(&mut len_ser).void_unwrap();

        ser.write_u8(self.command())?;
        ser.write_le_u16(len_ser.len() as u16)?;
        self.command_body(ser)
    }
}

impl<M> CommandSerialize for &M
where
    M: CommandSerialize,
{
    fn command(&self) -> u8 {
        (*self).command()
    }

    fn command_body<S>(&self, ser: &mut S) -> Result<(), S::Error>
    where
        S: Serializer,
    {
        (*self).command_body(ser)
    }
}

//! General parsing utilities shared by the report decoders.

use crate::protocol::InputParse;

/// Parse a statically-sized array with a parser.
pub fn parse_array<I, P, A, const LEN: usize>(
    parser: P,
) -> impl FnMut(I) -> nom::IResult<I, [A; LEN]>
where
    I: InputParse,
    P: Fn(I) -> nom::IResult<I, A>,
    A: Default + Copy,
{
    move |input| {
        let mut data = [A::default(); LEN];
        let (input, _) = nom::multi::fill(&parser, &mut data[..])(input)?;
        Ok((input, data))
    }
}

/// Reserved wire bytes nobody has decoded yet. Kept, not interpreted.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Padding<const LEN: usize>([u8; LEN]);

impl<const LEN: usize> Padding<LEN> {
    pub fn new() -> Self {
        Self([0; LEN])
    }

    pub fn new_data(data: [u8; LEN]) -> Self {
        Self(data)
    }

    pub fn data(&self) -> &[u8; LEN] {
        &self.0
    }

    pub fn parse<I>(input: I) -> nom::IResult<I, Self>
    where
        I: InputParse,
    {
        let (input, data) = parse_array(nom::number::complete::u8)(input)?;
        Ok((input, Self::new_data(data)))
    }
}

impl<const LEN: usize> Default for Padding<LEN> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const LEN: usize> core::fmt::Debug for Padding<LEN> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> Result<(), core::fmt::Error> {
        if self.0.iter().all(|b| *b == 0) {
            f.debug_tuple("Padding").finish()
        } else {
            f.debug_tuple("Padding").field(&self.0).finish()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_keeps_bytes() {
        let (rest, pad) = Padding::<3>::parse(b"\x01\x02\x03\x04".as_ref()).unwrap();
        assert_eq!(pad.data(), &[1, 2, 3]);
        assert_eq!(rest, b"\x04");
    }

    #[test]
    fn parse_short_input_fails() {
        assert!(Padding::<4>::parse(b"\x01\x02".as_ref()).is_err());
    }
}

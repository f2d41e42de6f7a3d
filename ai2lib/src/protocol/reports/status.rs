//! NMEA passthrough, async engine events, receiver errors, and the
//! unknown-type fallback.

use nom::{error::Error, Parser};

use crate::protocol::InputParse;

use super::{ReportParse, ReportType};

/// 0xd3 NMEA passthrough. The sentence bytes are not reinterpreted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NmeaReport<I> {
    /// Milliseconds since the receiver started reporting.
    pub fcount: u32,
    /// Raw sentence bytes, possibly empty.
    pub text: I,
}

impl<I> ReportType for NmeaReport<I> {
    const TYPE: u8 = 0xd3;
}

impl<I> NmeaReport<I> {
    pub fn map<F, J>(self, f: F) -> NmeaReport<J>
    where
        F: FnOnce(I) -> J,
    {
        NmeaReport {
            fcount: self.fcount,
            text: f(self.text),
        }
    }

    pub fn map_ref<'a, F, J>(&'a self, f: F) -> NmeaReport<J>
    where
        F: FnOnce(&'a I) -> J,
    {
        NmeaReport {
            fcount: self.fcount,
            text: f(&self.text),
        }
    }
}

impl<I> ReportParse<I> for NmeaReport<I>
where
    I: InputParse,
{
    fn parse_body(typ: u8) -> impl Parser<I, Self, Error<I>> {
        move |input| {
            let input = if typ != Self::TYPE {
                nom::combinator::fail::<_, (), _>(input)?.0
            } else {
                input
            };

            let (input, fcount) = nom::number::complete::le_u32(input)?;
            let (input, text) = nom::combinator::rest(input)?;
            Ok((input, NmeaReport { fcount, text }))
        }
    }
}

/// 0xe1 asynchronous engine event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AsyncEvent {
    EngineIdle,
    EngineOff,
    Unknown(u8),
}

impl ReportType for AsyncEvent {
    const TYPE: u8 = 0xe1;
}

impl AsyncEvent {
    pub fn from_code(code: u8) -> Self {
        match code {
            0x07 => Self::EngineIdle,
            0x01 => Self::EngineOff,
            code => Self::Unknown(code),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Self::EngineIdle => 0x07,
            Self::EngineOff => 0x01,
            Self::Unknown(code) => *code,
        }
    }
}

impl<I> ReportParse<I> for AsyncEvent
where
    I: InputParse,
{
    fn parse_body(typ: u8) -> impl Parser<I, Self, Error<I>> {
        move |input| {
            let input = if typ != Self::TYPE {
                nom::combinator::fail::<_, (), _>(input)?.0
            } else {
                input
            };

            let (input, code) = nom::number::complete::u8(input)?;
            // trailing bytes carry no known meaning
            let (input, _) = nom::combinator::rest(input)?;
            Ok((input, AsyncEvent::from_code(code)))
        }
    }
}

/// 0xf5 receiver-side error report. Always exactly two payload bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ErrorReport {
    pub code: u16,
}

impl ReportType for ErrorReport {
    const TYPE: u8 = 0xf5;
}

impl ErrorReport {
    /// Code the receiver sends back when a host frame fails its checksum.
    pub const INVALID_CHECKSUM: u16 = 0x02ff;

    pub fn is_invalid_checksum(&self) -> bool {
        self.code == Self::INVALID_CHECKSUM
    }
}

impl<I> ReportParse<I> for ErrorReport
where
    I: InputParse,
{
    fn parse_body(typ: u8) -> impl Parser<I, Self, Error<I>> {
        move |input| {
            let input = if typ != Self::TYPE {
                nom::combinator::fail::<_, (), _>(input)?.0
            } else {
                input
            };

            let (input, code) = nom::number::complete::le_u16(input)?;
            let (input, _) = nom::combinator::eof(input)?;
            Ok((input, ErrorReport { code }))
        }
    }
}

/// Fallback for sub-packet types nothing here recognizes.
///
/// Always surfaced, never dropped.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnknownReport<I> {
    pub typ: u8,
    pub data: I,
}

impl<I> UnknownReport<I> {
    pub fn map<F, J>(self, f: F) -> UnknownReport<J>
    where
        F: FnOnce(I) -> J,
    {
        UnknownReport {
            typ: self.typ,
            data: f(self.data),
        }
    }

    pub fn map_ref<'a, F, J>(&'a self, f: F) -> UnknownReport<J>
    where
        F: FnOnce(&'a I) -> J,
    {
        UnknownReport {
            typ: self.typ,
            data: f(&self.data),
        }
    }
}

impl<I> ReportParse<I> for UnknownReport<I>
where
    I: InputParse,
{
    fn parse_body(typ: u8) -> impl Parser<I, Self, Error<I>> {
        move |input| {
            let (input, data) = nom::combinator::rest(input)?;
            Ok((input, UnknownReport { typ, data }))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn nmea_bytes_pass_through_verbatim() {
        let mut payload = 12u32.to_le_bytes().to_vec();
        payload.extend_from_slice(b"$GPGGA,172814.0,3723.46587704,N*66\r\n");
        let (rest, report) = NmeaReport::parse_body(0xd3)
            .parse(payload.as_slice())
            .unwrap();
        assert!(rest.is_empty());
        assert_eq!(report.fcount, 12);
        assert_eq!(report.text, &payload[4..]);
    }

    #[test]
    fn nmea_with_no_text_is_valid() {
        let payload = 5u32.to_le_bytes();
        let (_, report) = NmeaReport::parse_body(0xd3).parse(&payload[..]).unwrap();
        assert_eq!(report.fcount, 5);
        assert_eq!(report.text, b"".as_ref());
    }

    #[test]
    fn async_event_codes() {
        for (code, event) in [
            (0x07, AsyncEvent::EngineIdle),
            (0x01, AsyncEvent::EngineOff),
            (0x55, AsyncEvent::Unknown(0x55)),
        ] {
            let payload = [code];
            let (_, parsed) = AsyncEvent::parse_body(0xe1).parse(&payload[..]).unwrap();
            assert_eq!(parsed, event);
            assert_eq!(parsed.code(), code);
        }
    }

    #[test]
    fn async_event_needs_a_byte() {
        assert!(AsyncEvent::parse_body(0xe1).parse(b"".as_ref()).is_err());
    }

    #[test]
    fn error_code_little_endian() {
        let (_, report) = ErrorReport::parse_body(0xf5)
            .parse(b"\xff\x02".as_ref())
            .unwrap();
        assert_eq!(report.code, 0x02ff);
        assert!(report.is_invalid_checksum());
    }

    #[test]
    fn error_report_rejects_other_lengths() {
        assert!(ErrorReport::parse_body(0xf5).parse(b"\xff".as_ref()).is_err());
        assert!(ErrorReport::parse_body(0xf5)
            .parse(b"\xff\x02\x00".as_ref())
            .is_err());
    }

    #[test]
    fn unknown_keeps_exact_bytes() {
        let (_, report) = UnknownReport::parse_body(0x99)
            .parse(b"\xaa\xbb".as_ref())
            .unwrap();
        assert_eq!(report.typ, 0x99);
        assert_eq!(report.data, b"\xaa\xbb".as_ref());
    }
}

//! Report types carried by receiver frames, keyed by sub-packet type.

use nom::{error::Error, Parser};

use crate::protocol::InputParse;

pub mod measurement;
pub mod position;
pub mod status;
pub mod util;

pub use measurement::{MeasurementReport, SvMeasurement};
pub use position::{PositionExtReport, PositionReport, SvId};
pub use status::{AsyncEvent, ErrorReport, NmeaReport, UnknownReport};

/// A trait for reports with statically-known sub-packet types.
pub trait ReportType {
    const TYPE: u8;
}

/// A trait for parseable report payloads.
pub trait ReportParse<I>: Sized
where
    I: InputParse,
{
    /// Parse the payload of a sub-packet, given its type byte.
    fn parse_body(typ: u8) -> impl Parser<I, Self, Error<I>>;
}

/// Any report a receiver frame can carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report<I> {
    /// 0x08 tracking measurements.
    Measurement(MeasurementReport),
    /// 0x06 position fix.
    Position(PositionReport),
    /// 0xd5 extended position fix.
    PositionExt(PositionExtReport),
    /// 0xd3 NMEA passthrough.
    Nmea(NmeaReport<I>),
    /// 0xe1 asynchronous engine event.
    Async(AsyncEvent),
    /// 0xf5 receiver error.
    Error(ErrorReport),
    /// Anything else, surfaced raw.
    Unknown(UnknownReport<I>),
}

impl<I> Report<I> {
    pub fn map<F, J>(self, f: F) -> Report<J>
    where
        F: FnOnce(I) -> J,
    {
        match self {
            Self::Measurement(o) => Report::Measurement(o),
            Self::Position(o) => Report::Position(o),
            Self::PositionExt(o) => Report::PositionExt(o),
            Self::Nmea(o) => Report::Nmea(o.map(f)),
            Self::Async(o) => Report::Async(o),
            Self::Error(o) => Report::Error(o),
            Self::Unknown(o) => Report::Unknown(o.map(f)),
        }
    }

    pub fn map_ref<'a, F, J>(&'a self, f: F) -> Report<J>
    where
        F: FnOnce(&'a I) -> J,
    {
        match self {
            Self::Measurement(o) => Report::Measurement(o.clone()),
            Self::Position(o) => Report::Position(o.clone()),
            Self::PositionExt(o) => Report::PositionExt(o.clone()),
            Self::Nmea(o) => Report::Nmea(o.map_ref(f)),
            Self::Async(o) => Report::Async(*o),
            Self::Error(o) => Report::Error(*o),
            Self::Unknown(o) => Report::Unknown(o.map_ref(f)),
        }
    }
}

impl<I> ReportParse<I> for Report<I>
where
    I: InputParse,
{
    fn parse_body(typ: u8) -> impl Parser<I, Self, Error<I>> {
        move |input| match typ {
            MeasurementReport::TYPE => MeasurementReport::parse_body(typ)
                .map(Self::Measurement)
                .parse(input),
            PositionReport::TYPE => PositionReport::parse_body(typ)
                .map(Self::Position)
                .parse(input),
            PositionExtReport::TYPE => PositionExtReport::parse_body(typ)
                .map(Self::PositionExt)
                .parse(input),
            NmeaReport::<()>::TYPE => NmeaReport::parse_body(typ).map(Self::Nmea).parse(input),
            AsyncEvent::TYPE => AsyncEvent::parse_body(typ).map(Self::Async).parse(input),
            ErrorReport::TYPE => ErrorReport::parse_body(typ).map(Self::Error).parse(input),

            // everything else is surfaced raw, never dropped
            _ => UnknownReport::parse_body(typ)
                .map(Self::Unknown)
                .parse(input),
        }
    }
}

//! Position fix reports, plain and extended.

use nom::{error::Error, Parser};

use crate::protocol::InputParse;

use super::{util, ReportParse, ReportType};

/// Divisor for the signed 32-bit angle fields: degrees = scale * raw / 2^31.
const ANGLE_DIVISOR: f64 = 2147483648.0;

/// One per-satellite record trailing a position report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SvId {
    pub sv: u8,
    pub _pad: util::Padding<5>,
}

impl SvId {
    /// Wire size of one record.
    pub const SIZE: usize = 6;

    fn parse<I>(input: I) -> nom::IResult<I, Self>
    where
        I: InputParse,
    {
        let (input, sv) = nom::number::complete::u8(input)?;
        let (input, _pad) = util::Padding::parse(input)?;
        Ok((input, SvId { sv, _pad }))
    }
}

/// As many whole satellite records as the payload still holds.
///
/// A trailing partial record is ignored.
fn parse_sv_records<I>(input: I) -> nom::IResult<I, Vec<SvId>>
where
    I: InputParse,
{
    let n = input.input_len() / SvId::SIZE;
    let (input, sv) = nom::multi::count(SvId::parse, n)(input)?;
    let (input, _) = nom::combinator::rest(input)?;
    Ok((input, sv))
}

/// 0x06 position report: fix plus the satellites used for it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PositionReport {
    /// Milliseconds since the receiver started reporting.
    pub fcount: u32,
    pub _pad1: util::Padding<2>,
    /// Latitude, as a signed fraction of a quarter turn.
    pub lat: i32,
    /// Longitude, as a signed fraction of a half turn.
    pub lon: i32,
    /// Altitude in half meters.
    pub altitude: i16,
    pub _pad2: util::Padding<15>,
    pub sv: Vec<SvId>,
}

impl ReportType for PositionReport {
    const TYPE: u8 = 0x06;
}

impl PositionReport {
    pub fn lat_deg(&self) -> f64 {
        90.0 * self.lat as f64 / ANGLE_DIVISOR
    }

    pub fn lon_deg(&self) -> f64 {
        180.0 * self.lon as f64 / ANGLE_DIVISOR
    }

    pub fn altitude_m(&self) -> f64 {
        self.altitude as f64 / 2.0
    }

    pub fn sv_ids(&self) -> impl Iterator<Item = u8> + '_ {
        self.sv.iter().map(|s| s.sv)
    }
}

impl<I> ReportParse<I> for PositionReport
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
            let (input, _pad1) = util::Padding::parse(input)?;
            let (input, lat) = nom::number::complete::le_i32(input)?;
            let (input, lon) = nom::number::complete::le_i32(input)?;
            let (input, altitude) = nom::number::complete::le_i16(input)?;
            let (input, _pad2) = util::Padding::parse(input)?;
            let (input, sv) = parse_sv_records(input)?;

            Ok((
                input,
                PositionReport {
                    fcount,
                    _pad1,
                    lat,
                    lon,
                    altitude,
                    _pad2,
                    sv,
                },
            ))
        }
    }
}

/// 0xd5 extended position report. Larger opaque header, no altitude.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PositionExtReport {
    /// Milliseconds since the receiver started reporting.
    pub fcount: u32,
    pub _pad1: util::Padding<2>,
    pub lat: i32,
    pub lon: i32,
    pub _pad2: util::Padding<47>,
    pub sv: Vec<SvId>,
}

impl ReportType for PositionExtReport {
    const TYPE: u8 = 0xd5;
}

impl PositionExtReport {
    pub fn lat_deg(&self) -> f64 {
        90.0 * self.lat as f64 / ANGLE_DIVISOR
    }

    pub fn lon_deg(&self) -> f64 {
        180.0 * self.lon as f64 / ANGLE_DIVISOR
    }

    pub fn sv_ids(&self) -> impl Iterator<Item = u8> + '_ {
        self.sv.iter().map(|s| s.sv)
    }
}

impl<I> ReportParse<I> for PositionExtReport
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
            let (input, _pad1) = util::Padding::parse(input)?;
            let (input, lat) = nom::number::complete::le_i32(input)?;
            let (input, lon) = nom::number::complete::le_i32(input)?;
            let (input, _pad2) = util::Padding::parse(input)?;
            let (input, sv) = parse_sv_records(input)?;

            Ok((
                input,
                PositionExtReport {
                    fcount,
                    _pad1,
                    lat,
                    lon,
                    _pad2,
                    sv,
                },
            ))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Header plus `sv` satellite records, all padding zeroed.
    fn position_payload(lat: i32, lon: i32, altitude: i16, sv: &[u8]) -> Vec<u8> {
        let mut payload = Vec::new();
        payload.extend_from_slice(&1000u32.to_le_bytes());
        payload.extend_from_slice(&[0; 2]);
        payload.extend_from_slice(&lat.to_le_bytes());
        payload.extend_from_slice(&lon.to_le_bytes());
        payload.extend_from_slice(&altitude.to_le_bytes());
        payload.extend_from_slice(&[0; 15]);
        for id in sv {
            payload.push(*id);
            payload.extend_from_slice(&[0; 5]);
        }
        payload
    }

    fn parse(payload: &[u8]) -> PositionReport {
        let (rest, report) = PositionReport::parse_body(PositionReport::TYPE)
            .parse(payload)
            .unwrap();
        assert!(rest.is_empty());
        report
    }

    #[test]
    fn quarter_scale_decodes_to_45_degrees() {
        let report = parse(&position_payload(1 << 30, 0, 20, &[]));
        assert_eq!(report.fcount, 1000);
        assert_eq!(report.lat_deg(), 45.0);
        assert_eq!(report.lon_deg(), 0.0);
        assert_eq!(report.altitude_m(), 10.0);
    }

    #[test]
    fn southern_latitudes_are_negative() {
        let report = parse(&position_payload(-(1 << 30), -(1 << 30), -3, &[]));
        assert_eq!(report.lat_deg(), -45.0);
        assert_eq!(report.lon_deg(), -90.0);
        assert_eq!(report.altitude_m(), -1.5);
    }

    #[test]
    fn satellite_ids_collected_in_order() {
        let report = parse(&position_payload(0, 0, 0, &[5, 12, 31]));
        assert_eq!(report.sv_ids().collect::<Vec<_>>(), vec![5, 12, 31]);
    }

    #[test]
    fn trailing_partial_record_ignored() {
        let mut payload = position_payload(0, 0, 0, &[7]);
        payload.extend_from_slice(&[9, 9, 9]);
        let report = parse(&payload);
        assert_eq!(report.sv_ids().collect::<Vec<_>>(), vec![7]);
    }

    #[test]
    fn short_header_fails() {
        let payload = position_payload(0, 0, 0, &[]);
        assert!(PositionReport::parse_body(PositionReport::TYPE)
            .parse(&payload[..30])
            .is_err());
    }

    #[test]
    fn extended_variant_has_no_altitude_field() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&77u32.to_le_bytes());
        payload.extend_from_slice(&[0; 2]);
        payload.extend_from_slice(&(1i32 << 30).to_le_bytes());
        payload.extend_from_slice(&0i32.to_le_bytes());
        payload.extend_from_slice(&[0; 47]);
        payload.push(3);
        payload.extend_from_slice(&[0; 5]);

        let (rest, report) = PositionExtReport::parse_body(PositionExtReport::TYPE)
            .parse(payload.as_slice())
            .unwrap();
        assert!(rest.is_empty());
        assert_eq!(report.fcount, 77);
        assert_eq!(report.lat_deg(), 45.0);
        assert_eq!(report.sv_ids().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn wrong_type_refused() {
        let payload = position_payload(0, 0, 0, &[]);
        assert!(PositionReport::parse_body(0x07)
            .parse(payload.as_slice())
            .is_err());
    }
}

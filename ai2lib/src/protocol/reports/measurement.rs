//! Raw tracking measurements, one record per satellite.

use nom::{error::Error, Parser};

use crate::protocol::InputParse;

use super::{util, ReportParse, ReportType};

/// One 28-byte satellite measurement record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SvMeasurement {
    pub sv: u8,
    /// Signal-to-noise ratio in tenths of a dB.
    pub snr: u16,
    /// Carrier-to-noise density in tenths of a dB-Hz.
    pub cno: u16,
    pub _pad: util::Padding<23>,
}

impl SvMeasurement {
    /// Wire size of one record.
    pub const SIZE: usize = 28;

    pub fn snr(&self) -> f64 {
        self.snr as f64 / 10.0
    }

    pub fn cno(&self) -> f64 {
        self.cno as f64 / 10.0
    }

    fn parse<I>(input: I) -> nom::IResult<I, Self>
    where
        I: InputParse,
    {
        let (input, sv) = nom::number::complete::u8(input)?;
        let (input, snr) = nom::number::complete::le_u16(input)?;
        let (input, cno) = nom::number::complete::le_u16(input)?;
        let (input, _pad) = util::Padding::parse(input)?;
        Ok((input, SvMeasurement { sv, snr, cno, _pad }))
    }
}

/// 0x08 measurement report.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MeasurementReport {
    /// Milliseconds since the receiver started reporting.
    pub fcount: u32,
    pub sv: Vec<SvMeasurement>,
    /// Count of trailing bytes that did not form a whole record.
    /// Nonzero means the payload carried excess data.
    pub excess: usize,
}

impl ReportType for MeasurementReport {
    const TYPE: u8 = 0x08;
}

impl<I> ReportParse<I> for MeasurementReport
where
    I: InputParse,
{
    fn parse_body(typ: u8) -> impl Parser<I, Self, Error<I>> {
        move |input: I| {
            let input = if typ != Self::TYPE {
                nom::combinator::fail::<_, (), _>(input)?.0
            } else {
                input
            };

            let (input, fcount) = nom::number::complete::le_u32(input)?;
            let n = input.input_len() / SvMeasurement::SIZE;
            let excess = input.input_len() % SvMeasurement::SIZE;
            let (input, sv) = nom::multi::count(SvMeasurement::parse, n)(input)?;
            let (input, _) = nom::combinator::rest(input)?;

            Ok((input, MeasurementReport { fcount, sv, excess }))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn record(sv: u8, snr: u16, cno: u16) -> Vec<u8> {
        let mut bytes = vec![sv];
        bytes.extend_from_slice(&snr.to_le_bytes());
        bytes.extend_from_slice(&cno.to_le_bytes());
        bytes.extend_from_slice(&[0; 23]);
        bytes
    }

    fn parse(payload: &[u8]) -> MeasurementReport {
        let (rest, report) = MeasurementReport::parse_body(MeasurementReport::TYPE)
            .parse(payload)
            .unwrap();
        assert!(rest.is_empty());
        report
    }

    #[test]
    fn tenth_scaling_on_snr_and_cno() {
        let mut payload = 42u32.to_le_bytes().to_vec();
        payload.extend_from_slice(&record(9, 305, 412));
        let report = parse(&payload);
        assert_eq!(report.fcount, 42);
        assert_eq!(report.sv.len(), 1);
        assert_eq!(report.sv[0].sv, 9);
        assert_eq!(report.sv[0].snr(), 30.5);
        assert_eq!(report.sv[0].cno(), 41.2);
        assert_eq!(report.excess, 0);
    }

    #[test]
    fn excess_bytes_counted_and_whole_records_kept() {
        let mut payload = 7u32.to_le_bytes().to_vec();
        for sv in [1, 2, 3] {
            payload.extend_from_slice(&record(sv, 100, 200));
        }
        payload.extend_from_slice(&[0xaa; 5]);
        let report = parse(&payload);
        assert_eq!(report.sv.len(), 3);
        assert_eq!(
            report.sv.iter().map(|s| s.sv).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(report.excess, 5);
    }

    #[test]
    fn fcount_alone_is_a_valid_report() {
        let payload = 9u32.to_le_bytes();
        let report = parse(&payload);
        assert_eq!(report.fcount, 9);
        assert!(report.sv.is_empty());
        assert_eq!(report.excess, 0);
    }

    #[test]
    fn shorter_than_fcount_fails() {
        assert!(MeasurementReport::parse_body(MeasurementReport::TYPE)
            .parse(b"\x01\x02\x03".as_ref())
            .is_err());
    }
}

use std::io::Write;

use ai2lib::protocol::{Decoded, FrameError, FrameReports, Report};

/// Output routing, fixed at startup and shared by value.
///
/// In NMEA mode the sentences own stdout and everything else moves to
/// stderr, so the output can be piped straight into an NMEA consumer.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputMode {
    pub nmea: bool,
    pub raw: bool,
}

/// One decode outcome on its way to the user.
#[derive(Debug, Clone)]
pub enum SinkEvent {
    Decoded(Decoded<Vec<u8>>),
    Raw {
        class: u8,
        packets: Vec<(u8, Vec<u8>)>,
        cut_off: bool,
    },
    Rejected(FrameError),
}

/// Renders decoded reports as text.
#[derive(Debug, Clone, Copy)]
pub struct Sink {
    mode: OutputMode,
}

impl Sink {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    fn info(&self, line: &str) {
        if self.mode.nmea {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    pub fn render(&self, event: &SinkEvent) {
        match event {
            SinkEvent::Decoded(Decoded::Ack) => self.info("decoded ack"),
            SinkEvent::Decoded(Decoded::Reports(frame)) => self.frame(frame),
            SinkEvent::Raw {
                class,
                packets,
                cut_off,
            } => {
                for (typ, payload) in packets {
                    let hex: String = payload.iter().map(|b| format!("{:02x}", b)).collect();
                    self.info(&format!("{:02x}, {:02x}, {}", class, typ, hex));
                }
                if *cut_off {
                    log::warn!("packet cut off");
                }
            }
            SinkEvent::Rejected(FrameError::Runt { len }) => {
                log::debug!("discarding runt frame ({} bytes)", len);
            }
            SinkEvent::Rejected(e @ FrameError::ChecksumMismatch { .. }) => {
                log::warn!("{}", e);
            }
        }
    }

    fn frame(&self, frame: &FrameReports<Vec<u8>>) {
        for report in &frame.reports {
            self.report(report);
        }
        for skipped in &frame.skipped {
            log::warn!(
                "sub-packet type {:#04x} too short to decode ({} bytes)",
                skipped.typ,
                skipped.len
            );
        }
        if frame.cut_off {
            log::warn!("packet cut off");
        }
    }

    fn report(&self, report: &Report<Vec<u8>>) {
        match report {
            Report::Position(p) => {
                let sv: Vec<String> = p.sv_ids().map(|id| id.to_string()).collect();
                self.info(&format!(
                    "position: fcount: {}, lat: {:.6} lon: {:.6} altitude: {:.1} sv: {}",
                    p.fcount,
                    p.lat_deg(),
                    p.lon_deg(),
                    p.altitude_m(),
                    sv.join(" ")
                ));
            }
            Report::PositionExt(p) => {
                let sv: Vec<String> = p.sv_ids().map(|id| id.to_string()).collect();
                self.info(&format!(
                    "position: fcount: {}, lat: {:.6} lon: {:.6} sv: {}",
                    p.fcount,
                    p.lat_deg(),
                    p.lon_deg(),
                    sv.join(" ")
                ));
            }
            Report::Measurement(m) => {
                self.info(&format!(
                    "measurement: fcount: {}, sats: {}",
                    m.fcount,
                    m.sv.len()
                ));
                if m.excess > 0 {
                    log::warn!("measurement: excess data ({} bytes)", m.excess);
                }
                for sv in &m.sv {
                    self.info(&format!(
                        "SV: {} SNR: {:.1} CNo: {:.1}",
                        sv.sv,
                        sv.snr(),
                        sv.cno()
                    ));
                }
            }
            Report::Nmea(n) => {
                self.info(&format!("nmea: fcount: {}", n.fcount));
                // sentence bytes go to stdout verbatim in every mode
                let stdout = std::io::stdout();
                let mut stdout = stdout.lock();
                let _ = stdout.write_all(&n.text);
                let _ = stdout.flush();
            }
            Report::Async(event) => {
                use ai2lib::protocol::reports::AsyncEvent;
                match event {
                    AsyncEvent::EngineIdle => self.info("async event: engine idle"),
                    AsyncEvent::EngineOff => self.info("async event: engine off"),
                    AsyncEvent::Unknown(code) => {
                        self.info(&format!("async event: unknown code {:#04x}", code))
                    }
                }
            }
            Report::Error(e) => {
                if e.is_invalid_checksum() {
                    log::warn!("receiver rejected a command frame: invalid checksum");
                } else {
                    log::warn!("receiver error code {:#06x}", e.code);
                }
            }
            Report::Unknown(u) => {
                self.info(&format!(
                    "unknown packet type {:#04x} len: {}",
                    u.typ,
                    u.data.len()
                ));
                if self.mode.nmea {
                    crate::hexdump::ehexdump_prefix("  ", &u.data);
                } else {
                    crate::hexdump::hexdump_prefix("  ", &u.data);
                }
            }
        }
    }
}

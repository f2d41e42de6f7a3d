use ai2lib::protocol::checksum::Sum16;
use ai2lib::protocol::{decode, Deframer, FramerEvent};

use crate::sink::{OutputMode, Sink, SinkEvent};

#[derive(clap::Args, Debug)]
pub struct ParseDumpOpts {
    /// Capture file holding raw AI2 bytes.
    dump: String,

    /// Treat the capture as hex text instead of raw bytes.
    #[arg(long)]
    hex: bool,
}

impl crate::ToolRun for ParseDumpOpts {
    fn run(&self) -> anyhow::Result<()> {
        let data = if self.hex {
            crate::common::parse_hex(&std::fs::read_to_string(&self.dump)?)?
        } else {
            std::fs::read(&self.dump)?
        };

        let sink = Sink::new(OutputMode::default());
        let mut deframer = Deframer::new();
        let mut noise = 0usize;
        let mut frames = 0usize;

        for event in deframer.push_slice(&data) {
            match event {
                FramerEvent::Noise(_) => noise += 1,
                FramerEvent::UnexpectedEnd => log::warn!("unexpected end of packet"),
                FramerEvent::Overlong => log::warn!("overlong packet, throwing away"),
                FramerEvent::Frame(buf) => {
                    frames += 1;
                    match decode(&Sum16, buf.as_slice()) {
                        Ok(decoded) => {
                            sink.render(&SinkEvent::Decoded(decoded.map(|i: &[u8]| i.to_vec())))
                        }
                        Err(e) => {
                            log::warn!("{}", e);
                            crate::hexdump::ehexdump_prefix("!!! ", &buf);
                        }
                    }
                }
            }
        }

        if noise > 0 {
            log::info!("skipped {} bytes outside frames", noise);
        }
        if !deframer.is_idle() {
            log::warn!("capture ends inside a frame");
        }
        log::info!("{} frame(s) in capture", frames);
        Ok(())
    }
}

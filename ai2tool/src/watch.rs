use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

use ai2lib::protocol::{Frame, FramerEvent};
use ai2lib::{Client, ClientError};

use crate::common::DevicePort;
use crate::sink::{OutputMode, Sink, SinkEvent};

#[derive(clap::Args, Debug)]
pub struct WatchOpts {
    #[command(flatten)]
    port: crate::common::DeviceArgs,

    /// Pass NMEA sentences through on stdout; everything else moves to
    /// stderr. Pairs with the NMEA bring-up sequence.
    #[arg(long)]
    nmea: bool,

    /// Skip the receiver bring-up sequence.
    #[arg(long)]
    no_init: bool,

    /// Print raw sub-packets instead of decoding them. Implies
    /// --no-init.
    #[arg(long)]
    raw: bool,

    /// Stop after this many frames.
    #[arg(short = 'n', long)]
    count: Option<u64>,
}

impl crate::ToolRun for WatchOpts {
    fn run(&self) -> anyhow::Result<()> {
        let mode = OutputMode {
            nmea: self.nmea,
            raw: self.raw,
        };

        let port = self.port.open()?;
        let reader_port = port.try_clone()?;
        let mut writer = Client::new(port);

        let stop = AtomicBool::new(false);
        let (tx, rx) = mpsc::channel();

        std::thread::scope(|s| -> anyhow::Result<()> {
            let reader = s.spawn(|| read_loop(Client::new(reader_port), tx, &stop, mode));

            if !self.no_init && !self.raw {
                let steps = if self.nmea {
                    crate::init::nmea_sequence()
                } else {
                    crate::init::binary_sequence()
                };
                crate::init::run(&mut writer, &steps)?;
            }

            let sink = Sink::new(mode);
            let mut frames = 0u64;
            for event in rx.iter() {
                sink.render(&event);
                frames += 1;
                if Some(frames) == self.count {
                    break;
                }
            }
            stop.store(true, Ordering::Relaxed);

            match reader.join() {
                Ok(result) => result,
                Err(_) => Err(anyhow::anyhow!("reader thread panicked")),
            }
        })
    }
}

/// Pull bytes, deframe, decode, and hand everything frame-shaped to the
/// sink loop. Framing diagnostics only get logged; they are too chatty
/// for the channel.
fn read_loop(
    mut client: Client<DevicePort>,
    tx: mpsc::Sender<SinkEvent>,
    stop: &AtomicBool,
    mode: OutputMode,
) -> anyhow::Result<()> {
    loop {
        if stop.load(Ordering::Relaxed) {
            return Ok(());
        }

        let events = match client.read() {
            Ok(events) => events,
            // end of stream: the channel closed underneath us
            Err(ClientError::UnexpectedEof) => return Ok(()),
            Err(ClientError::Io(e))
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
                ) =>
            {
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        for event in events {
            let buf = match event {
                FramerEvent::Noise(byte) => {
                    log::trace!("discarding stray byte {:#04x}", byte);
                    continue;
                }
                FramerEvent::UnexpectedEnd => {
                    log::warn!("unexpected end of packet");
                    continue;
                }
                FramerEvent::Overlong => {
                    log::warn!("overlong packet, throwing away");
                    continue;
                }
                FramerEvent::Frame(buf) => buf,
            };

            let event = if mode.raw {
                raw_event(&client, &buf)
            } else {
                decoded_event(&client, &buf)
            };
            if tx.send(event).is_err() {
                // sink loop is gone; nothing left to report to
                return Ok(());
            }
        }
    }
}

fn decoded_event(client: &Client<DevicePort>, buf: &[u8]) -> SinkEvent {
    match client.decode(buf) {
        Ok(decoded) => SinkEvent::Decoded(decoded.map(|i: &[u8]| i.to_vec())),
        Err(e) => SinkEvent::Rejected(e),
    }
}

/// Validate and split only, keeping the payload bytes uninterpreted.
fn raw_event(client: &Client<DevicePort>, buf: &[u8]) -> SinkEvent {
    match Frame::parse(client.in_checksum(), buf) {
        Ok(frame) => {
            let mut packets = Vec::new();
            let mut cut_off = false;
            for sub in frame.subpackets() {
                match sub {
                    Ok(sp) => packets.push((sp.typ, sp.payload.to_vec())),
                    Err(_) => cut_off = true,
                }
            }
            SinkEvent::Raw {
                class: frame.class,
                packets,
                cut_off,
            }
        }
        Err(e) => SinkEvent::Rejected(e),
    }
}

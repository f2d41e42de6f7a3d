use std::io::{Read, Write};

#[derive(clap::Args, Debug, Clone)]
pub struct DeviceArgs {
    /// Device path, e.g. /dev/gnss0 (or host:port with --tcp).
    device: Option<String>,

    /// Open through the serial-port stack instead of as a plain
    /// character device.
    #[arg(long)]
    serial: bool,

    /// Baud rate for --serial.
    #[arg(short, long, default_value_t = 115200)]
    baud: u32,

    /// Connect to a TCP bench rig instead of a local device.
    #[arg(long, conflicts_with = "serial")]
    tcp: bool,
}

#[derive(Debug)]
pub enum DevicePort {
    File(std::fs::File),
    Serial(Box<dyn serialport::SerialPort>),
    Tcp(std::net::TcpStream),
}

impl DeviceArgs {
    pub fn open(&self) -> anyhow::Result<DevicePort> {
        let device = self
            .device
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("no device path given"))?;

        if self.tcp {
            let port = std::net::TcpStream::connect(device)?;
            port.set_read_timeout(Some(std::time::Duration::from_secs(1)))?;
            Ok(DevicePort::Tcp(port))
        } else if self.serial {
            let mut port = serialport::new(device, self.baud).open()?;
            port.set_timeout(std::time::Duration::from_secs(1))?;
            Ok(DevicePort::Serial(port))
        } else {
            let port = std::fs::File::options()
                .read(true)
                .write(true)
                .open(device)
                .map_err(|e| anyhow::anyhow!("cannot open {}: {}", device, e))?;
            Ok(DevicePort::File(port))
        }
    }
}

impl DevicePort {
    /// A second handle on the same device, so one side can read while
    /// the other writes.
    pub fn try_clone(&self) -> std::io::Result<Self> {
        match self {
            Self::File(port) => port.try_clone().map(Self::File),
            Self::Serial(port) => port
                .try_clone()
                .map(Self::Serial)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e)),
            Self::Tcp(port) => port.try_clone().map(Self::Tcp),
        }
    }
}

impl Read for DevicePort {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Self::File(port) => port.read(buf),
            Self::Serial(port) => port.read(buf),
            Self::Tcp(port) => port.read(buf),
        }
    }
}

impl Write for DevicePort {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Self::File(port) => port.write(buf),
            Self::Serial(port) => port.write(buf),
            Self::Tcp(port) => port.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Self::File(port) => port.flush(),
            Self::Serial(port) => port.flush(),
            Self::Tcp(port) => port.flush(),
        }
    }
}

/// Parse loose hex text: whitespace- or comma-separated groups, with or
/// without 0x prefixes.
pub fn parse_hex(text: &str) -> anyhow::Result<Vec<u8>> {
    let mut out = Vec::new();
    for token in text.split(|c: char| c.is_whitespace() || c == ',') {
        let token = token.trim_start_matches("0x");
        if token.is_empty() {
            continue;
        }
        anyhow::ensure!(token.is_ascii(), "bad hex group {:?}", token);
        anyhow::ensure!(token.len() % 2 == 0, "odd-length hex group {:?}", token);
        for i in (0..token.len()).step_by(2) {
            let byte = u8::from_str_radix(&token[i..i + 2], 16)
                .map_err(|_| anyhow::anyhow!("bad hex group {:?}", token))?;
            out.push(byte);
        }
    }
    Ok(out)
}

/// Parse a single byte value, decimal or 0x-prefixed hex.
pub fn parse_byte(text: &str) -> anyhow::Result<u8> {
    let text = text.trim();
    let byte = match text.strip_prefix("0x") {
        Some(hex) => u8::from_str_radix(hex, 16)?,
        None => text.parse()?,
    };
    Ok(byte)
}

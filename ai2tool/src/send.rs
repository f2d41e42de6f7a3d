use ai2lib::protocol::checksum::Sum16;
use ai2lib::protocol::commands::RawCommand;
use ai2lib::protocol::encode_to_vec;
use ai2lib::Client;

#[derive(clap::Args, Debug)]
pub struct SendOpts {
    #[command(flatten)]
    port: crate::common::DeviceArgs,

    /// Command opcode, decimal or 0x-prefixed hex.
    #[arg(long, default_value = "0x02")]
    command: String,

    /// Frame class byte.
    #[arg(long, default_value = "0x01")]
    class: String,

    /// Payload bytes as hex, e.g. "01 0e 00".
    #[arg(long, default_value = "")]
    payload: String,

    /// Print the encoded frame instead of writing it to the device.
    #[arg(long)]
    dry_run: bool,
}

impl crate::ToolRun for SendOpts {
    fn run(&self) -> anyhow::Result<()> {
        let class = crate::common::parse_byte(&self.class)?;
        let command = RawCommand {
            command: crate::common::parse_byte(&self.command)?,
            body: crate::common::parse_hex(&self.payload)?,
        };

        if self.dry_run {
            let wire = encode_to_vec(&Sum16, class, &command);
            crate::hexdump::hexdump_prefix("", &wire);
            return Ok(());
        }

        let mut client = Client::new(self.port.open()?);
        client.write(class, &command)?;
        log::info!(
            "sent command {:#04x} (class {:#04x}, {} payload byte(s))",
            command.command,
            class,
            command.body.len()
        );
        Ok(())
    }
}

use clap::Parser;

mod common;
mod hexdump;
mod init;
mod parsedump;
mod send;
mod sink;
mod watch;

trait ToolRun {
    fn run(&self) -> anyhow::Result<()>;
}

#[derive(clap::Parser, Debug)]
#[command(version, about = "Talk to AI2 GNSS receivers")]
struct ToolArgs {
    #[command(subcommand)]
    command: ToolCommand,
}

#[derive(clap::Subcommand, Debug)]
enum ToolCommand {
    /// Initialize the receiver and stream decoded reports.
    Watch(watch::WatchOpts),
    /// Encode a single command frame and send it.
    Send(send::SendOpts),
    /// Decode a captured AI2 byte stream from a file.
    ParseDump(parsedump::ParseDumpOpts),
}

impl ToolRun for ToolCommand {
    fn run(&self) -> anyhow::Result<()> {
        use ToolCommand::*;
        match self {
            Watch(o) => o.run(),
            Send(o) => o.run(),
            ParseDump(o) => o.run(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    ToolArgs::parse().command.run()
}

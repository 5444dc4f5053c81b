use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use rhizome_frame::consts::{CMD_SEND, OBJ_DELIVERY};
use rhizome_frame::{PayloadEncoding, ACK_PLCY_NO_REPLY, ACK_PLCY_ON_SENT};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod listen;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a single object.
    Send(SendArgs),
    /// Listen, print received objects and acknowledge them.
    Listen(ListenArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum AckPolicyArg {
    /// Fire and forget.
    NoReply,
    /// Ask the receiver to reply once the object is accepted.
    OnSent,
}

impl AckPolicyArg {
    pub fn tag(self) -> u8 {
        match self {
            AckPolicyArg::NoReply => ACK_PLCY_NO_REPLY,
            AckPolicyArg::OnSent => ACK_PLCY_ON_SENT,
        }
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Address to connect to (host:port).
    #[arg(env = "RHIZOME_ADDR")]
    pub addr: String,
    /// Object UID.
    #[arg(long)]
    pub uid: String,
    /// Object type tag.
    #[arg(long, default_value_t = OBJ_DELIVERY)]
    pub obj_type: u8,
    /// Command type tag.
    #[arg(long, default_value_t = CMD_SEND)]
    pub cmd_type: u8,
    /// Acknowledgement policy.
    #[arg(long, value_enum, default_value = "no-reply")]
    pub ack_policy: AckPolicyArg,
    #[arg(long, default_value = "")]
    pub arg1: String,
    #[arg(long, default_value = "")]
    pub arg2: String,
    #[arg(long, default_value = "")]
    pub arg3: String,
    #[arg(long, default_value = "")]
    pub arg4: String,
    /// Payload encoding name (json, xml, ...) or numeric tag.
    #[arg(long, value_parser = parse_encoding)]
    pub encoding: Option<PayloadEncoding>,
    /// JSON payload.
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub json: Option<String>,
    /// Raw string payload.
    #[arg(long, conflicts_with_all = ["json", "file"])]
    pub data: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with_all = ["json", "data"])]
    pub file: Option<PathBuf>,
    /// Maximum time to wait for the response when the ack policy asks for one (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub wait_timeout: String,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Address to bind (host:port, port 0 for any).
    #[arg(env = "RHIZOME_ADDR")]
    pub addr: String,
    /// Exit after receiving N objects.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

fn parse_encoding(input: &str) -> Result<PayloadEncoding, String> {
    if let Some(encoding) = PayloadEncoding::from_name(input) {
        return Ok(encoding);
    }
    input
        .parse::<u8>()
        .map(PayloadEncoding::from_tag)
        .map_err(|_| format!("unknown payload encoding: {input}"))
}

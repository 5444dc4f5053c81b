use std::fs;
use std::time::Duration;

use rhizome_frame::{FrameConfig, FrameWriter, Object, PayloadEncoding, ResponseReader};
use rhizome_transport::TcpTransport;
use tracing::debug;

use crate::cmd::SendArgs;
use crate::exit::{frame_error, transport_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_response, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let wait_timeout = parse_duration(&args.wait_timeout)?;
    let obj = build_object(&args)?;

    let stream =
        TcpTransport::connect(&args.addr).map_err(|err| transport_error("connect failed", err))?;
    let read_half = stream
        .try_clone()
        .map_err(|err| crate::exit::io_error("connect failed", err))?;

    let config = FrameConfig {
        read_timeout: Some(wait_timeout),
        write_timeout: Some(wait_timeout),
        ..FrameConfig::default()
    };
    let mut writer = FrameWriter::with_config_tcp(stream, config.clone())
        .map_err(|err| frame_error("send failed", err))?;
    writer
        .send(&obj)
        .map_err(|err| frame_error("send failed", err))?;
    debug!(uid = %obj.uid, addr = %args.addr, "object sent");

    if obj.wants_reply() {
        let mut responses = ResponseReader::with_config_tcp(read_half, &config)
            .map_err(|err| frame_error("receive failed", err))?;
        let response = responses
            .read_response()
            .map_err(|err| frame_error("receive failed", err))?;
        print_response(&response, format);
    }

    Ok(SUCCESS)
}

fn build_object(args: &SendArgs) -> CliResult<Object> {
    if args.uid.is_empty() {
        return Err(CliError::new(USAGE, "--uid must not be empty"));
    }

    let payload = resolve_payload(args)?;
    let encoding = args.encoding.unwrap_or(if args.json.is_some() {
        PayloadEncoding::Json
    } else {
        PayloadEncoding::Na
    });

    Ok(Object::new(args.uid.as_str())
        .with_types(args.obj_type, args.cmd_type)
        .with_ack_policy(args.ack_policy.tag())
        .with_args(
            args.arg1.as_str(),
            args.arg2.as_str(),
            args.arg3.as_str(),
            args.arg4.as_str(),
        )
        .with_payload(encoding, payload))
}

fn resolve_payload(args: &SendArgs) -> CliResult<Vec<u8>> {
    if let Some(json) = &args.json {
        serde_json::from_str::<serde_json::Value>(json)
            .map_err(|err| CliError::new(USAGE, format!("--json is not valid JSON: {err}")))?;
        return Ok(json.as_bytes().to_vec());
    }
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(path) = &args.file {
        return fs::read(path).map_err(|err| {
            crate::exit::io_error(&format!("failed reading {}", path.display()), err)
        });
    }
    Ok(Vec::new())
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

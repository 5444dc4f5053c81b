use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use rhizome_frame::consts::{
    CMD_ADD, CMD_REMOVE, CMD_SEND, CMD_SIGTERM, CMD_UPDATE, OBJ_ACTION, OBJ_CHANNEL,
    OBJ_DELIVERY, OBJ_GLOBALS, OBJ_SUBSCRIBER, OBJ_TRANSFORMER,
};
use rhizome_frame::{ack_name, ack_policy_name, Object, Response};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ObjectOutput<'a> {
    version: u8,
    obj_type: u8,
    obj_type_name: &'static str,
    cmd_type: u8,
    cmd_type_name: &'static str,
    ack_policy: &'static str,
    uid: &'a str,
    args: [&'a str; 4],
    payload_encoding: String,
    payload_size: usize,
    payload: String,
    remote: Option<String>,
    timestamp: String,
}

#[derive(Serialize)]
struct ResponseOutput<'a> {
    uid: &'a str,
    ack: u8,
    ack_name: &'static str,
}

pub fn print_object(obj: &Object, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ObjectOutput {
                version: obj.version,
                obj_type: obj.obj_type,
                obj_type_name: obj_type_name(obj.obj_type),
                cmd_type: obj.cmd_type,
                cmd_type_name: cmd_type_name(obj.cmd_type),
                ack_policy: ack_policy_name(obj.ack_policy),
                uid: &obj.uid,
                args: obj.args(),
                payload_encoding: obj.payload_encoding.to_string(),
                payload_size: obj.payload.len(),
                payload: payload_preview(&obj.payload),
                remote: obj.remote_address(),
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["UID", "OBJ", "CMD", "ACK", "ARGS", "ENC", "PAYLOAD"])
                .add_row(vec![
                    obj.uid.clone(),
                    obj_type_name(obj.obj_type).to_string(),
                    cmd_type_name(obj.cmd_type).to_string(),
                    ack_policy_name(obj.ack_policy).to_string(),
                    obj.args().join(" "),
                    obj.payload_encoding.to_string(),
                    payload_preview(&obj.payload),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("{}", obj.summary());
        }
        OutputFormat::Raw => {
            print_raw(&obj.payload);
        }
    }
}

pub fn print_response(response: &Response, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ResponseOutput {
                uid: &response.uid,
                ack: response.ack,
                ack_name: ack_name(response.ack),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["UID", "ACK", "NAME"])
                .add_row(vec![
                    response.uid.clone(),
                    response.ack.to_string(),
                    ack_name(response.ack).to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "uid={} ack={} ({})",
                response.uid,
                response.ack,
                ack_name(response.ack)
            );
        }
        OutputFormat::Raw => {
            print_raw(&[response.ack]);
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

pub fn obj_type_name(obj_type: u8) -> &'static str {
    match obj_type {
        OBJ_DELIVERY => "DELIVERY",
        OBJ_TRANSFORMER => "TRANSFORMER",
        OBJ_SUBSCRIBER => "SUBSCRIBER",
        OBJ_CHANNEL => "CHANNEL",
        OBJ_GLOBALS => "GLOBALS",
        OBJ_ACTION => "ACTION",
        _ => "UNKNOWN",
    }
}

pub fn cmd_type_name(cmd_type: u8) -> &'static str {
    match cmd_type {
        CMD_SEND => "SEND",
        CMD_ADD => "ADD",
        CMD_REMOVE => "REMOVE",
        CMD_UPDATE => "UPDATE",
        CMD_SIGTERM => "SIGTERM",
        _ => "UNKNOWN",
    }
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

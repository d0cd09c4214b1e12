use std::io::{IsTerminal, Write};
use std::net::SocketAddr;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use ddpkit_proto::{id_name, Packet};
use serde::Serialize;

/// Payload bytes shown in previews before eliding the rest.
const PREVIEW_BYTES: usize = 24;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
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
struct FlagsOutput {
    timecode: bool,
    storage: bool,
    reply: bool,
    query: bool,
    push: bool,
}

#[derive(Serialize)]
struct PacketOutput<'a> {
    from: String,
    id: u8,
    id_name: &'a str,
    sequence: u8,
    pixel_format: String,
    offset: u32,
    length: u16,
    flags: FlagsOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    timecode: Option<u32>,
    payload_size: usize,
    payload: String,
    timestamp: String,
}

impl<'a> PacketOutput<'a> {
    fn new(packet: &'a Packet, from: SocketAddr) -> Self {
        let header = &packet.header;
        Self {
            from: from.to_string(),
            id: header.destination_id,
            id_name: id_name(header.destination_id),
            sequence: header.sequence_number,
            pixel_format: format!("0x{:02X}", header.pixel_format.to_byte()),
            offset: header.offset,
            length: header.length,
            flags: FlagsOutput {
                timecode: header.flags.timecode,
                storage: header.flags.storage,
                reply: header.flags.reply,
                query: header.flags.query,
                push: header.flags.push,
            },
            timecode: header.flags.timecode.then_some(header.timecode),
            payload_size: packet.payload.len(),
            payload: hex_preview(&packet.payload),
            timestamp: now_unix_seconds(),
        }
    }
}

pub fn print_packet(packet: &Packet, from: SocketAddr, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = PacketOutput::new(packet, from);
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let header = &packet.header;
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ID", "FROM", "SEQ", "OFFSET", "SIZE", "PAYLOAD"])
                .add_row(vec![
                    format!("{} ({})", header.destination_id, id_name(header.destination_id)),
                    from.to_string(),
                    header.sequence_number.to_string(),
                    header.offset.to_string(),
                    packet.payload.len().to_string(),
                    hex_preview(&packet.payload),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let header = &packet.header;
            println!(
                "id={} ({}) from={} seq={} offset={} size={} payload={}",
                header.destination_id,
                id_name(header.destination_id),
                from,
                header.sequence_number,
                header.offset,
                packet.payload.len(),
                hex_preview(&packet.payload)
            );
        }
        OutputFormat::Raw => {
            print_raw(&packet.payload);
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

/// Lowercase hex of the first bytes, with the remainder counted.
pub fn hex_preview(payload: &[u8]) -> String {
    let shown = payload.len().min(PREVIEW_BYTES);
    let mut text = hex::encode(&payload[..shown]);
    if payload.len() > shown {
        text.push_str(&format!("...(+{})", payload.len() - shown));
    }
    text
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

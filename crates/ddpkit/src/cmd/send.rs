use std::fs;
use std::thread;
use std::time::Duration;

use ddpkit_peer::Controller;
use ddpkit_proto::{timecode, PixelFormat};
use tracing::debug;

use crate::cmd::SendArgs;
use crate::exit::{io_error, peer_error, CliError, CliResult, SUCCESS};

pub fn run(args: SendArgs) -> CliResult<i32> {
    let payload = resolve_payload(&args)?;
    let delay = args
        .timecode_delay
        .as_deref()
        .map(parse_duration)
        .transpose()?;
    let interval = parse_duration(&args.interval)?;
    if args.repeat == 0 {
        return Err(CliError::usage("--repeat must be at least 1"));
    }

    let mut controller =
        Controller::connect(&args.addr).map_err(|err| peer_error("connect failed", err))?;
    controller
        .set_destination(args.id)
        .map_err(|err| peer_error("invalid --id", err))?;
    controller.set_offset(args.offset);
    if let Some(sequence) = args.sequence {
        controller.set_sequence_number(sequence);
    }
    if let Some(byte) = args.pixel_format {
        controller.set_pixel_format(PixelFormat::from_byte(byte));
    }
    if args.no_push {
        let mut flags = controller.header().flags;
        flags.push = false;
        controller.set_flags(flags);
    }

    let mut total = 0usize;
    for round in 0..args.repeat {
        if round > 0 {
            thread::sleep(interval);
        }
        if let Some(delay) = delay {
            controller.enable_timecode(timecode::from_delay(delay));
        }
        let written = controller
            .write(&payload)
            .map_err(|err| peer_error("send failed", err))?;
        debug!(
            addr = %args.addr,
            sequence = controller.header().sequence_number,
            written,
            "sent"
        );
        total += written;
    }

    println!("{total}");
    Ok(SUCCESS)
}

fn resolve_payload(args: &SendArgs) -> CliResult<Vec<u8>> {
    if let Some(hex) = &args.hex {
        return parse_hex(hex);
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    if let Some(rgb) = &args.fill {
        if rgb.len() != 3 {
            return Err(CliError::usage(format!(
                "--fill needs R,G,B (got {} components)",
                rgb.len()
            )));
        }
        return Ok(rgb.repeat(args.pixels));
    }
    Ok(Vec::new())
}

/// Decode hex digits, ignoring whitespace, `:` and `,` separators.
fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let digits: String = input
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && *c != ':' && *c != ',')
        .collect();
    hex::decode(&digits).map_err(|err| CliError::usage(format!("invalid --hex: {err}")))
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::usage("duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::usage(format!("invalid duration value: {input}")))?;

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

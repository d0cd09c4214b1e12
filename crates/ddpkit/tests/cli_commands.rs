#![cfg(feature = "cli")]

use std::net::UdpSocket;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

fn ddpkit() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ddpkit"));
    cmd.env_remove("DDPKIT_ADDR").arg("--log-level").arg("error");
    cmd
}

fn receiver() -> UdpSocket {
    let socket = UdpSocket::bind("127.0.0.1:0").expect("receiver should bind");
    socket
        .set_read_timeout(Some(Duration::from_secs(3)))
        .expect("read timeout");
    socket
}

#[test]
fn send_fill_produces_expected_datagram() {
    let socket = receiver();
    let addr = socket.local_addr().expect("local addr").to_string();

    let output = ddpkit()
        .args(["send", addr.as_str(), "--fill", "255,0,0", "--pixels", "2"])
        .args(["--id", "3", "--offset", "6", "--sequence", "4"])
        .output()
        .expect("send should run");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "16");

    let mut buf = [0u8; 64];
    let (n, _) = socket.recv_from(&mut buf).expect("datagram should arrive");
    assert_eq!(
        &buf[..n],
        &[0x41, 5, 0x0D, 3, 0, 0, 0, 6, 0, 6, 255, 0, 0, 255, 0, 0]
    );
}

#[test]
fn send_hex_with_timecode_and_no_push() {
    let socket = receiver();
    let addr = socket.local_addr().expect("local addr").to_string();

    let output = ddpkit()
        .args(["send", addr.as_str(), "--hex", "0a0b0c", "--timecode-delay", "100ms", "--no-push"])
        .output()
        .expect("send should run");
    assert!(output.status.success());

    let mut buf = [0u8; 64];
    let (n, _) = socket.recv_from(&mut buf).expect("datagram should arrive");
    assert_eq!(n, 17);
    assert_eq!(buf[0], 0x50, "version + timecode, push cleared");
    assert_eq!(&buf[8..10], &[0, 3]);
    assert_eq!(&buf[14..17], &[0x0A, 0x0B, 0x0C]);
}

#[test]
fn send_addr_from_environment() {
    let socket = receiver();
    let addr = socket.local_addr().expect("local addr").to_string();

    let status = ddpkit()
        .env("DDPKIT_ADDR", &addr)
        .args(["send", "--hex", "ff"])
        .stdout(Stdio::null())
        .status()
        .expect("send should run");
    assert!(status.success());

    let mut buf = [0u8; 64];
    let (n, _) = socket.recv_from(&mut buf).expect("datagram should arrive");
    assert_eq!(&buf[10..n], &[0xFF]);
}

#[test]
fn send_reserved_id_is_usage_error() {
    let socket = receiver();
    let addr = socket.local_addr().expect("local addr").to_string();

    let output = ddpkit()
        .args(["send", addr.as_str(), "--hex", "ff", "--id", "0"])
        .output()
        .expect("send should run");
    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("reserved"));
}

#[test]
fn send_fill_with_two_components_is_usage_error() {
    let socket = receiver();
    let addr = socket.local_addr().expect("local addr").to_string();

    let output = ddpkit()
        .args(["send", addr.as_str(), "--fill", "255,0"])
        .output()
        .expect("send should run");
    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("R,G,B"));
}

#[test]
fn send_oversized_payload_is_data_invalid() {
    let socket = receiver();
    let addr = socket.local_addr().expect("local addr").to_string();

    let output = ddpkit()
        .args(["send", addr.as_str(), "--fill", "1,2,3", "--pixels", "481"])
        .output()
        .expect("send should run");
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn listen_prints_json_and_exits_after_count() {
    let port = {
        let probe = UdpSocket::bind("127.0.0.1:0").expect("probe should bind");
        probe.local_addr().expect("probe addr").port()
    };
    let listen_addr = format!("127.0.0.1:{port}");

    let mut child = ddpkit()
        .args(["--format", "json", "listen", listen_addr.as_str(), "--id", "1", "--count", "1"])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("listen should start");

    // The listener may not be bound yet; keep sending until it exits.
    let sender = UdpSocket::bind("127.0.0.1:0").expect("sender should bind");
    let datagram = [0x41, 1, 0x0D, 1, 0, 0, 0, 0, 0, 3, 9, 8, 7];
    let ignored = [0x41, 1, 0x0D, 2, 0, 0, 0, 0, 0, 0];
    let start = Instant::now();
    let status = loop {
        let _ = sender.send_to(&ignored, &listen_addr);
        let _ = sender.send_to(&datagram, &listen_addr);
        if let Some(status) = child.try_wait().expect("try_wait") {
            break status;
        }
        if start.elapsed() > Duration::from_secs(5) {
            let _ = child.kill();
            panic!("listen did not exit after one packet");
        }
        thread::sleep(Duration::from_millis(50));
    };
    assert!(status.success());

    let output = child.wait_with_output().expect("collect output");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let first = stdout.lines().next().expect("one json line");
    assert!(first.contains("\"id\":1"), "got {first}");
    assert!(first.contains("\"payload\":\"090807\""), "got {first}");
    assert!(!stdout.contains("\"id\":2"));
}

#[test]
fn version_prints_name() {
    let output = ddpkit()
        .arg("version")
        .output()
        .expect("version should run");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("ddpkit "));
}

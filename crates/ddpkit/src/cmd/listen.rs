use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ddpkit_peer::{HandlerResult, Server, ShutdownHandle};
use ddpkit_proto::Packet;
use tracing::info;

use crate::cmd::ListenArgs;
use crate::exit::{peer_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_packet, OutputFormat};

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let server = Server::new();
    let shutdown = server.shutdown_handle();
    let printer = Arc::new(Printer {
        format,
        limit: args.count,
        printed: AtomicUsize::new(0),
        shutdown: shutdown.clone(),
    });

    match &args.id {
        Some(ids) => {
            for &id in ids {
                let printer = Arc::clone(&printer);
                server.register_handler(id, move |packet, from| printer.print(packet, from));
            }
            server.register_default_handler(|_packet, _from| Ok(()));
        }
        None => {
            let printer = Arc::clone(&printer);
            server.register_default_handler(move |packet, from| printer.print(packet, from));
        }
    }

    let local = server
        .bind(args.addr.as_deref().unwrap_or(""))
        .map_err(|err| peer_error("bind failed", err))?;
    info!(%local, "listening for ddp packets");
    install_ctrlc_handler(shutdown)?;

    server
        .serve()
        .map_err(|err| peer_error("receive failed", err))?;
    Ok(SUCCESS)
}

struct Printer {
    format: OutputFormat,
    limit: Option<usize>,
    printed: AtomicUsize,
    shutdown: ShutdownHandle,
}

impl Printer {
    fn print(&self, packet: &Packet, from: SocketAddr) -> HandlerResult {
        let seen = self.printed.fetch_add(1, Ordering::SeqCst);
        if let Some(limit) = self.limit {
            if seen >= limit {
                return Ok(());
            }
            if seen + 1 == limit {
                print_packet(packet, from, self.format);
                self.shutdown.close();
                return Ok(());
            }
        }
        print_packet(packet, from, self.format);
        Ok(())
    }
}

fn install_ctrlc_handler(shutdown: ShutdownHandle) -> CliResult<()> {
    ctrlc::set_handler(move || shutdown.close()).map_err(|err| {
        CliError::new(INTERNAL, format!("signal handler setup failed: {err}"))
    })
}

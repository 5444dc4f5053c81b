use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rhizome_frame::{FrameConfig, FrameError, FrameReader, Object, ACK_SENT};
use rhizome_transport::{TcpTransport, TransportError};
use tracing::{debug, info, warn};

use crate::cmd::ListenArgs;
use crate::exit::{transport_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_object, OutputFormat};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// What connection threads hand to the printing loop.
enum Event {
    Object(Box<Object>),
    AcceptFailed(TransportError),
}

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let listener =
        TcpTransport::bind(&args.addr).map_err(|err| transport_error("bind failed", err))?;
    info!(
        transport = listener.transport_name(),
        addr = %listener.local_addr(),
        "ready for connections"
    );
    eprintln!("listening on {}", listener.local_addr());

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let (tx, rx) = mpsc::channel::<Event>();
    let accept_running = running.clone();
    thread::spawn(move || accept_loop(|| listener.accept(), &tx, &accept_running));

    let mut printed = 0usize;
    while running.load(Ordering::SeqCst) {
        let obj = match rx.recv_timeout(POLL_INTERVAL) {
            Ok(Event::Object(obj)) => obj,
            Ok(Event::AcceptFailed(err)) => return Err(transport_error("accept failed", err)),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        print_object(&obj, format);
        printed = printed.saturating_add(1);

        if let Some(count) = args.count {
            if printed >= count {
                return Ok(SUCCESS);
            }
        }
    }

    Ok(SUCCESS)
}

/// Spawn a connection thread per accepted stream. The first accept error
/// ends the loop and is forwarded to the printing loop.
fn accept_loop<A>(mut accept: A, tx: &Sender<Event>, running: &AtomicBool)
where
    A: FnMut() -> Result<TcpStream, TransportError>,
{
    while running.load(Ordering::SeqCst) {
        let stream = match accept() {
            Ok(stream) => stream,
            Err(err) => {
                let _ = tx.send(Event::AcceptFailed(err));
                return;
            }
        };

        let tx = tx.clone();
        thread::spawn(move || {
            if let Err(err) = serve_connection(stream, &tx) {
                warn!(error = %err, "connection ended with error");
            }
        });
    }
}

/// Decode objects until the peer hangs up, acknowledging those that ask for it.
fn serve_connection(stream: TcpStream, tx: &Sender<Event>) -> Result<(), FrameError> {
    let mut reader = FrameReader::with_config_tcp(stream, FrameConfig::default())?;
    let remote = reader
        .responder()
        .map(|responder| responder.remote_address())
        .unwrap_or_default();
    info!(%remote, "connection opened");

    loop {
        let mut obj = match reader.read_object() {
            Ok(obj) => obj,
            Err(FrameError::Decode(_)) => continue,
            Err(FrameError::ConnectionClosed) => {
                debug!(%remote, "connection closed");
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        if obj.wants_reply() {
            if let Err(err) = obj.respond_with_ack(ACK_SENT) {
                warn!(uid = %obj.uid, error = %err, "failed to acknowledge object");
            }
        }

        if tx.send(Event::Object(Box::new(obj))).is_err() {
            return Ok(());
        }
    }
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

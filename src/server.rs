use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::signal;
use tokio::task;
use tokio::time::{self, Duration};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, instrument, warn, Span};

use crate::config::Config;
use crate::connection::Connection;
use crate::handlers::Dispatcher;
use crate::message::Message;
use crate::reply::Reply;
use crate::store::Store;
use crate::Error;

const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Binds the configured address and serves until Ctrl-C.
pub async fn run(config: Config) -> Result<(), Error> {
    let _ = tracing_subscriber::fmt()
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    let store = Store::open(&config.data_dir)?;
    let listener = TcpListener::bind((config.host, config.port)).await?;

    info!(
        data_dir = %store.data_dir().display(),
        "Boutique server listening on {}",
        listener.local_addr()?
    );

    serve(listener, store, config.max_message_size, signal::ctrl_c()).await
}

/// Accepts connections until `shutdown` completes, then cancels every open connection and waits
/// for all of them to finish.
pub async fn serve(
    listener: TcpListener,
    store: Store,
    max_message_size: usize,
    shutdown: impl Future,
) -> Result<(), Error> {
    let dispatcher = Arc::new(Dispatcher::new());
    let tracker = TaskTracker::new();
    let token = CancellationToken::new();

    tokio::pin!(shutdown);

    loop {
        let (socket, client_address) = tokio::select! {
            res = listener.accept() => match backoff_on_error(res).await {
                Some(accepted) => accepted,
                None => continue,
            },
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
        };

        info!("Accepted connection from {:?}", client_address);

        let store = store.clone();
        let dispatcher = dispatcher.clone();
        let token = token.clone();

        tracker.spawn(async move {
            if let Err(e) = handle_connection(
                socket,
                client_address,
                max_message_size,
                store,
                dispatcher,
                token,
            )
            .await
            {
                error!("Connection error: {}", e);
            }
        });
    }

    token.cancel();
    tracker.close();
    tracker.wait().await;

    info!("All connections closed");
    Ok(())
}

// A failed accept (EMFILE, ENFILE) usually fails again immediately, so pause before retrying.
async fn backoff_on_error<T>(res: io::Result<T>) -> Option<T> {
    match res {
        Ok(accepted) => Some(accepted),
        Err(e) => {
            error!("Failed to accept connection: {}", e);
            time::sleep(ACCEPT_BACKOFF).await;
            None
        }
    }
}

#[instrument(
    name = "connection",
    skip(stream, client_address, max_message_size, store, dispatcher, token),
    fields(connection_id, client_address)
)]
async fn handle_connection(
    stream: TcpStream,
    client_address: SocketAddr,
    max_message_size: usize,
    store: Store,
    dispatcher: Arc<Dispatcher>,
    token: CancellationToken,
) -> Result<(), Error> {
    let mut conn = Connection::new(stream, client_address, max_message_size);

    Span::current()
        .record("connection_id", conn.id.to_string())
        .record("client_address", client_address.to_string());

    loop {
        let frame = tokio::select! {
            res = conn.read_message() => res?,
            _ = token.cancelled() => {
                info!("Closing connection for shutdown");
                break;
            }
        };

        let Some(frame) = frame else {
            break;
        };

        let reply = match Message::parse(&frame) {
            Ok(message) => {
                info!(request_type = message.kind, "Received request");

                // Handlers block on the store lock and on file I/O.
                let store = store.clone();
                let dispatcher = dispatcher.clone();
                let span = Span::current();
                task::spawn_blocking(move || {
                    span.in_scope(|| dispatcher.dispatch(&message, &store))
                })
                .await?
            }
            Err(e) => {
                warn!("Malformed message: {}", e);
                Reply::Error(e.to_string())
            }
        };

        debug!("Sending response to client: {}", reply);
        conn.write_reply(reply).await?;
    }

    info!("Connection closed");
    Ok(())
}

//! TCP Server
//!
//! Accepts connections and dispatches them to worker threads.
//!
//! The acceptor polls a non-blocking listener so it can notice the shutdown
//! flag, and sweeps expired keys every `purge_interval_ms`. Accepted streams
//! go through a bounded crossbeam channel to a fixed pool of workers.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver};

use crate::config::Config;
use crate::engine::Engine;
use crate::error::{LeaseError, Result};
use crate::network::Connection;

/// How long the acceptor sleeps when no connection is pending
const ACCEPT_POLL: Duration = Duration::from_millis(10);

/// Cloneable handle that stops a running [`Server`]
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// TCP server for the store
pub struct Server {
    config: Config,
    engine: Arc<Engine>,
    listener: TcpListener,
    shutdown: ShutdownHandle,
    active: Arc<AtomicUsize>,
}

impl Server {
    /// Bind the listen address
    pub fn bind(config: Config, engine: Arc<Engine>) -> Result<Self> {
        config.validate()?;
        let listener = TcpListener::bind(&config.listen_addr).map_err(|e| {
            LeaseError::Network(format!("bind {} failed: {}", config.listen_addr, e))
        })?;
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            engine,
            listener,
            shutdown: ShutdownHandle::default(),
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle for stopping the server from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.shutdown();
    }

    /// Number of connections currently queued or being served
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Serve until shutdown (blocking)
    ///
    /// Workers finish their current connection before `run` returns.
    pub fn run(&self) -> Result<()> {
        tracing::info!(
            "Listening on {} ({} workers, max {} connections)",
            self.local_addr()?,
            self.config.worker_threads,
            self.config.max_connections
        );

        let (sender, receiver) = channel::bounded::<TcpStream>(self.config.max_connections);
        let workers = self.spawn_workers(receiver)?;

        let purge_interval = Duration::from_millis(self.config.purge_interval_ms.max(1));
        let mut last_purge = Instant::now();

        while !self.shutdown.is_shutdown() {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    if self.active.load(Ordering::SeqCst) >= self.config.max_connections {
                        tracing::warn!("Rejecting {}: connection limit reached", peer);
                        drop(stream);
                        continue;
                    }
                    self.active.fetch_add(1, Ordering::SeqCst);
                    if sender.send(stream).is_err() {
                        self.active.fetch_sub(1, Ordering::SeqCst);
                        tracing::error!("Worker pool is gone, stopping");
                        break;
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => thread::sleep(ACCEPT_POLL),
                Err(e) => tracing::warn!("Accept failed: {}", e),
            }

            if last_purge.elapsed() >= purge_interval {
                let purged = self.engine.purge_expired();
                if purged > 0 {
                    tracing::debug!("Purged {} expired keys", purged);
                }
                last_purge = Instant::now();
            }
        }

        tracing::info!("Shutting down, waiting for workers");
        drop(sender);
        for worker in workers {
            if worker.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }
        Ok(())
    }

    fn spawn_workers(&self, receiver: Receiver<TcpStream>) -> Result<Vec<JoinHandle<()>>> {
        (0..self.config.worker_threads)
            .map(|id| {
                let receiver = receiver.clone();
                let engine = Arc::clone(&self.engine);
                let active = Arc::clone(&self.active);
                let (read_ms, write_ms) = (self.config.read_timeout_ms, self.config.write_timeout_ms);

                thread::Builder::new()
                    .name(format!("leasekv-worker-{}", id))
                    .spawn(move || {
                        for stream in receiver.iter() {
                            if let Err(e) = serve(stream, &engine, read_ms, write_ms) {
                                tracing::warn!("Connection ended with error: {}", e);
                            }
                            active.fetch_sub(1, Ordering::SeqCst);
                        }
                    })
                    .map_err(LeaseError::from)
            })
            .collect()
    }
}

fn serve(stream: TcpStream, engine: &Arc<Engine>, read_ms: u64, write_ms: u64) -> Result<()> {
    // Accepted sockets inherit non-blocking mode from the listener on some platforms
    stream.set_nonblocking(false)?;
    let mut connection = Connection::new(stream, Arc::clone(engine))?;
    connection.set_timeouts(read_ms, write_ms)?;
    connection.handle()
}

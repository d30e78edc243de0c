//! leasekv CLI Client
//!
//! Command-line interface for talking to a leasekv server.

use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use leasekv::{KeyValueStore, LimiterConfig, LockManager, RateLimiter, RemoteStore};
use tracing_subscriber::{fmt, EnvFilter};

/// leasekv CLI
#[derive(Parser, Debug)]
#[command(name = "leasekv-cli")]
#[command(about = "CLI for the leasekv store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:6379")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key only if it is absent
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,

        /// Optional TTL in seconds
        #[arg(long)]
        ttl: Option<u64>,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Ping the server
    Ping,

    /// Acquire a lock, hold it, then release it
    Lock {
        /// Resource name
        resource: String,

        /// Lease duration in milliseconds
        #[arg(long, default_value = "2000")]
        duration_ms: u64,

        /// How long to wait for the lock in milliseconds
        #[arg(long, default_value = "5000")]
        wait_ms: u64,

        /// How long to hold the lock before releasing, in milliseconds
        #[arg(long, default_value = "1000")]
        hold_ms: u64,
    },

    /// Fire admission checks at the rate limiter and report the outcome
    Limit {
        /// Number of requests
        #[arg(short = 'n', long, default_value = "100")]
        requests: u32,

        /// Admissions per second
        #[arg(short, long, default_value = "10")]
        limit: u64,

        /// Pause for `pause_ms` before this request index
        #[arg(long, default_value = "30")]
        pause_at: u32,

        /// Pause length in milliseconds
        #[arg(long, default_value = "1500")]
        pause_ms: u64,
    },
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_target(false).init();

    let args = Args::parse();

    let store = match RemoteStore::connect(&args.server) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(store, args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(store: Arc<RemoteStore>, command: Commands) -> leasekv::Result<()> {
    match command {
        Commands::Get { key } => match store.get(&key)? {
            Some(value) => println!("{}", value),
            None => println!("(nil)"),
        },
        Commands::Set { key, value, ttl } => {
            let set = match ttl {
                Some(secs) => store.set_if_absent_ex(&key, &value, secs)?,
                None => store.set_if_absent(&key, &value)?,
            };
            println!("{}", if set { "OK" } else { "(exists)" });
        }
        Commands::Del { key } => println!("(integer) {}", store.delete(&key)?),
        Commands::Ping => {
            if store.ping()? {
                println!("PONG");
            }
        }
        Commands::Lock {
            resource,
            duration_ms,
            wait_ms,
            hold_ms,
        } => {
            let locks = LockManager::new(store);
            let started = Instant::now();
            if locks.acquire(&resource, duration_ms, wait_ms) {
                println!("acquired '{}' after {:?}", resource, started.elapsed());
                thread::sleep(Duration::from_millis(hold_ms));
                locks.release(&resource);
                println!("released '{}'", resource);
            } else {
                println!("gave up on '{}' after {:?}", resource, started.elapsed());
            }
        }
        Commands::Limit {
            requests,
            limit,
            pause_at,
            pause_ms,
        } => {
            let limiter = RateLimiter::new(store).with_config(LimiterConfig::default().limit(limit));
            let (mut admitted, mut rejected) = (0u32, 0u32);
            for i in 0..requests {
                if i == pause_at {
                    thread::sleep(Duration::from_millis(pause_ms));
                }
                let ok = limiter.try_admit();
                println!("{:>4} {}", i, ok);
                if ok {
                    admitted += 1;
                } else {
                    rejected += 1;
                }
            }
            println!("admitted {} rejected {}", admitted, rejected);
        }
    }
    Ok(())
}

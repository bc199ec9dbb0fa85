use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use mapping_core::config::AppConfig;
use mapping_core::protocol::{self, Session};
use mapping_core::services::fetch::{HttpMappingSource, MappingSource, StaticMappingSource};
use tracing::{error, info};

const IDLE_WAIT: Duration = Duration::from_secs(3600);

fn main() {
    if let Err(e) = mapping_core::logging::init() {
        eprintln!("failed to initialise logging: {e}");
    }

    let cfg = AppConfig::from_env();
    let source: Box<dyn MappingSource> = match HttpMappingSource::new(&cfg) {
        Ok(s) => {
            info!(endpoint = %s.endpoint(), "mapping source ready");
            Box::new(s)
        }
        Err(e) => {
            // Every fetch then yields nothing, same as a failed request.
            error!(error = %e, "mapping source unavailable");
            Box::new(StaticMappingSource::new())
        }
    };

    let mut session = Session::new(&cfg, source);

    let (tx, rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { continue };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut stdout = io::stdout();

    loop {
        if let Some(notification) = session.tick(Instant::now()) {
            if emit(&mut stdout, &notification).is_err() {
                break;
            }
        }

        let wait = session
            .widget()
            .debouncer()
            .time_until_due(Instant::now())
            .unwrap_or(IDLE_WAIT);

        let line = match rx.recv_timeout(wait) {
            Ok(line) => line,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        if line.trim().is_empty() {
            continue;
        }

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            protocol::handle(&mut session, &line, Instant::now())
        }));

        let response = match result {
            Ok(resp) => resp,
            Err(_) => serde_json::json!({
                "status": "error",
                "message": "internal core error"
            })
            .to_string(),
        };

        if emit(&mut stdout, &response).is_err() {
            break;
        }
    }
}

fn emit(stdout: &mut io::Stdout, line: &str) -> io::Result<()> {
    writeln!(stdout, "{line}")?;
    stdout.flush()
}

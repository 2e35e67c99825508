use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use engine_logging::{engine_error, engine_info};
use follow_core::RunRequest;

use crate::fetch::ChannelProgressSink;
use crate::pipeline::{check_session, run_export, RunConfig};
use crate::EngineEvent;

enum EngineCommand {
    ValidateSession { cookies_path: PathBuf },
    Run { request: RunRequest },
}

/// Handle to the single background worker. Commands are executed one at a
/// time in arrival order; events are polled with [`EngineHandle::try_recv`].
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(config: RunConfig) -> std::io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;

        thread::Builder::new()
            .name("export-worker".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    runtime.block_on(handle_command(&config, command, &event_tx));
                }
            })?;

        Ok(Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        })
    }

    pub fn validate_session(&self, cookies_path: PathBuf) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::ValidateSession { cookies_path });
    }

    pub fn run(&self, request: RunRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Run { request });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }
}

async fn handle_command(
    config: &RunConfig,
    command: EngineCommand,
    event_tx: &mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::ValidateSession { cookies_path } => {
            let result = check_session(&cookies_path, &config.client).await;
            let _ = event_tx.send(EngineEvent::SessionChecked(result));
        }
        EngineCommand::Run { request } => {
            engine_info!("Starting export run into {:?}", request.output_dir);
            let sink = ChannelProgressSink::new(event_tx.clone());
            let result = run_export(&request, config, &sink).await;
            if let Err(err) = &result {
                engine_error!("Run failed ({}): {}", err.kind, err.message);
            }
            let _ = event_tx.send(EngineEvent::RunCompleted(result));
        }
    }
}

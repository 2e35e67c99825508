use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use chrono::Local;
use engine_logging::{engine_info, engine_warn};
use follow_core::{Effect, Msg, RunOutcome};
use follow_engine::{EngineEvent, EngineHandle, RunConfig};

/// Runs effects on the engine worker and feeds engine events back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(msg_tx: mpsc::Sender<Msg>) -> std::io::Result<Self> {
        let config = RunConfig::new(Arc::new(|| Local::now().format("%Y%m%d_%H%M%S").to_string()));
        let engine = EngineHandle::new(config)?;
        let runner = Self { engine };
        runner.spawn_event_loop(msg_tx);
        Ok(runner)
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ValidateSession { cookies_path } => {
                    engine_info!("ValidateSession cookies={:?}", cookies_path);
                    self.engine.validate_session(cookies_path);
                }
                Effect::StartRun { request } => {
                    engine_info!(
                        "StartRun output={:?} target={:?} details={} thumbnails={}",
                        request.output_dir,
                        request.target,
                        request.fetch_details,
                        request.embed_thumbnails
                    );
                    self.engine.run(request);
                }
            }
        }
    }

    fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            if let Some(event) = engine.try_recv() {
                if msg_tx.send(event_to_msg(event)).is_err() {
                    break;
                }
            } else {
                thread::sleep(Duration::from_millis(20));
            }
        });
    }
}

fn event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Log(line) => Msg::LogLine(line),
        EngineEvent::Progress(progress) => Msg::RunProgress {
            stage: progress.stage,
            fetched: progress.fetched,
            enriched: progress.enriched,
        },
        EngineEvent::SessionChecked(Ok(status)) => Msg::SessionChecked {
            valid: status.valid,
            username: status.username,
        },
        EngineEvent::SessionChecked(Err(err)) => {
            engine_warn!("Session check failed ({}): {}", err.kind, err.message);
            Msg::SessionCheckFailed(err.message)
        }
        EngineEvent::RunCompleted(Ok(report)) => Msg::RunDone(RunOutcome::Success(report)),
        EngineEvent::RunCompleted(Err(err)) => {
            engine_warn!("Run failed ({}): {}", err.kind, err.message);
            Msg::RunDone(RunOutcome::Failed(err.message))
        }
    }
}

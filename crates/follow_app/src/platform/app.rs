use std::process::ExitCode;
use std::sync::mpsc;

use anyhow::Context;
use clap::Parser;
use follow_core::{update, AppState, Msg, RunOutcome};

use super::cli::Cli;
use super::effects::EffectRunner;
use super::ui::render::{render, RenderCursor};
use super::{logging, persistence};

pub fn run_app() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    logging::initialize(cli.log.into(), cli.verbose);

    let settings_dir = std::env::current_dir().context("cannot determine the working directory")?;
    let settings = cli
        .command
        .merge(persistence::load_settings(&settings_dir));
    persistence::save_settings(&settings_dir, &settings);

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(msg_tx).context("cannot start the export worker")?;
    let mut app = App::new(runner);

    for msg in cli.command.messages(&settings) {
        app.dispatch(msg);
    }
    while app.state.activity().is_busy() {
        let msg = msg_rx
            .recv()
            .context("export worker stopped before reporting a result")?;
        app.dispatch(msg);
    }

    Ok(if app.succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

struct App {
    state: AppState,
    runner: EffectRunner,
    cursor: RenderCursor,
    succeeded: bool,
}

impl App {
    fn new(runner: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            runner,
            cursor: RenderCursor::default(),
            succeeded: false,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        match &msg {
            Msg::SessionChecked { valid, .. } => self.succeeded = *valid,
            Msg::RunDone(RunOutcome::Success(_)) => self.succeeded = true,
            _ => {}
        }

        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            for line in render(&state.view(), &mut self.cursor) {
                println!("{line}");
            }
        }
        self.state = state;
        self.runner.enqueue(effects);
    }
}

use crate::{Activity, AppState, Effect, Msg, RunOption, RunOutcome, RunRequest};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::CookiesPathChanged(path) => {
            state.form_mut().cookies_path = path;
            Vec::new()
        }
        Msg::OutputDirChanged(dir) => {
            state.form_mut().output_dir = dir;
            Vec::new()
        }
        Msg::TargetChanged(target) => {
            state.form_mut().target = target
                .map(|t| t.trim().trim_start_matches('@').to_string())
                .filter(|t| !t.is_empty());
            Vec::new()
        }
        Msg::OptionToggled { option, enabled } => {
            let form = state.form_mut();
            match option {
                RunOption::VerifiedOnly => form.filters.verified_only = enabled,
                RunOption::PrivateOnly => form.filters.private_only = enabled,
                RunOption::FetchDetails => form.fetch_details = enabled,
                RunOption::EmbedThumbnails => form.embed_thumbnails = enabled,
            }
            Vec::new()
        }
        Msg::ValidateClicked => {
            // One worker: nothing new starts while a job is in flight.
            if state.activity().is_busy() {
                return (state, Vec::new());
            }
            if state.form().cookies_path.as_os_str().is_empty() {
                state.push_log("[!] Select a cookies.txt file first.");
                return (state, Vec::new());
            }
            state.begin(Activity::Validating);
            state.push_log("[•] Validating session…");
            vec![Effect::ValidateSession {
                cookies_path: state.form().cookies_path.clone(),
            }]
        }
        Msg::RunClicked => {
            if state.activity().is_busy() {
                return (state, Vec::new());
            }
            if let Some(problem) = missing_input(state.form()) {
                state.push_log(format!("[!] {problem}"));
                return (state, Vec::new());
            }
            state.begin(Activity::Running);
            vec![Effect::StartRun {
                request: state.form().clone(),
            }]
        }
        Msg::SessionChecked { valid, username } => {
            if state.activity() != Activity::Validating {
                return (state, Vec::new());
            }
            let line = match (valid, username.as_deref()) {
                (true, Some(name)) => format!("[+] Session is valid. Logged in as: @{name}"),
                (true, None) => "[+] Session is valid (current_user OK).".to_string(),
                (false, _) => {
                    "[!] Session invalid or expired. Export the cookies from the browser again."
                        .to_string()
                }
            };
            state.apply_session(valid, username);
            state.push_log(line);
            Vec::new()
        }
        Msg::SessionCheckFailed(message) => {
            if state.activity() != Activity::Validating {
                return (state, Vec::new());
            }
            state.apply_session(false, None);
            state.push_log(format!("[!] Validation error: {message}"));
            Vec::new()
        }
        Msg::LogLine(line) => {
            state.push_log(line);
            Vec::new()
        }
        Msg::RunProgress {
            stage,
            fetched,
            enriched,
        } => {
            state.apply_progress(stage, fetched, enriched);
            Vec::new()
        }
        Msg::RunDone(outcome) => {
            if state.activity() != Activity::Running {
                return (state, Vec::new());
            }
            if let RunOutcome::Failed(message) = &outcome {
                state.push_log(format!("[!] Error: {message}"));
            }
            state.finish(outcome);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn missing_input(form: &RunRequest) -> Option<&'static str> {
    if form.cookies_path.as_os_str().is_empty() {
        return Some("Select a cookies.txt file first.");
    }
    if form.output_dir.as_os_str().is_empty() {
        return Some("Select an output folder first.");
    }
    None
}

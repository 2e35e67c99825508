use follow_core::{Activity, AppViewModel, ReportView, Stage};

/// Enrichment progress is printed every this many profiles.
const DETAIL_PROGRESS_STEP: usize = 25;

/// Tracks what has already been printed so a render only emits new output.
#[derive(Debug, Default)]
pub struct RenderCursor {
    log_lines: usize,
    enriched: usize,
    summary_shown: bool,
}

/// Terminal lines for everything new in `view` since the last call.
pub fn render(view: &AppViewModel, cursor: &mut RenderCursor) -> Vec<String> {
    let mut lines: Vec<String> = view.log.iter().skip(cursor.log_lines).cloned().collect();
    cursor.log_lines = view.log.len();

    if view.activity == Activity::Running && view.stage == Stage::Enriching {
        let step_reached = view.enriched >= cursor.enriched + DETAIL_PROGRESS_STEP;
        let finished = view.enriched == view.fetched && view.enriched > cursor.enriched;
        if step_reached || finished {
            lines.push(format!("    details {}/{}", view.enriched, view.fetched));
            cursor.enriched = view.enriched;
        }
    }

    if view.activity == Activity::Finished && !cursor.summary_shown {
        if let Some(report) = &view.report {
            lines.extend(summary_lines(report));
            cursor.summary_shown = true;
        }
    }
    lines
}

fn summary_lines(report: &ReportView) -> Vec<String> {
    let mut lines = vec![format!(
        "Exported {} followings of @{}.",
        format_with_commas(report.exported as u64),
        report.account
    )];
    match (report.added, report.removed) {
        (Some(added), Some(removed)) => {
            lines.push(format!("Changes since last run: +{added} / -{removed}"));
        }
        _ => lines.push("No previous snapshot; change tracking starts with this run.".to_string()),
    }
    for (label, path) in &report.files {
        if matches!(*label, "ADD " | "DEL ") {
            lines.push(format!("    {label}: {}", path.display()));
        }
    }
    if !report.rich_spreadsheet {
        lines.push("Spreadsheet written without links or thumbnails.".to_string());
    }
    lines
}

fn format_with_commas(value: u64) -> String {
    let mut out = String::new();
    for (i, ch) in value.to_string().chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use pretty_assertions::assert_eq;

    fn view(activity: Activity, log: &[&str]) -> AppViewModel {
        AppViewModel {
            activity,
            log: log.iter().map(|l| l.to_string()).collect(),
            ..AppViewModel::default()
        }
    }

    #[test]
    fn only_new_log_lines_are_printed() {
        let mut cursor = RenderCursor::default();
        assert_eq!(
            render(&view(Activity::Running, &["a", "b"]), &mut cursor),
            vec!["a", "b"]
        );
        assert_eq!(
            render(&view(Activity::Running, &["a", "b", "c"]), &mut cursor),
            vec!["c"]
        );
        assert!(render(&view(Activity::Running, &["a", "b", "c"]), &mut cursor).is_empty());
    }

    #[test]
    fn enrichment_progress_is_stepped() {
        let mut cursor = RenderCursor::default();
        let mut v = view(Activity::Running, &[]);
        v.stage = Stage::Enriching;
        v.fetched = 30;

        v.enriched = 10;
        assert!(render(&v, &mut cursor).is_empty());
        v.enriched = 25;
        assert_eq!(render(&v, &mut cursor), vec!["    details 25/30"]);
        v.enriched = 30;
        assert_eq!(render(&v, &mut cursor), vec!["    details 30/30"]);
        assert!(render(&v, &mut cursor).is_empty());
    }

    #[test]
    fn summary_is_printed_once() {
        let mut cursor = RenderCursor::default();
        let mut v = view(Activity::Finished, &[]);
        v.report = Some(ReportView {
            account: "me".to_string(),
            exported: 1234,
            files: vec![
                ("CSV ", PathBuf::from("out/f.csv")),
                ("ADD ", PathBuf::from("out/added.csv")),
            ],
            added: Some(1),
            removed: Some(0),
            rich_spreadsheet: false,
        });

        let lines = render(&v, &mut cursor);
        assert_eq!(
            lines,
            vec![
                "Exported 1,234 followings of @me.".to_string(),
                "Changes since last run: +1 / -0".to_string(),
                format!("    ADD : {}", PathBuf::from("out/added.csv").display()),
                "Spreadsheet written without links or thumbnails.".to_string(),
            ]
        );
        assert!(render(&v, &mut cursor).is_empty());
    }
}

use filecutter::app::mover::BatchSummary;
use filecutter::cli::{render_report, render_summary};
use filecutter::domain::model::{MoveOutcome, MoveReport};
use insta::assert_snapshot;

fn report(source: &str, outcome: MoveOutcome) -> MoveReport {
    let name = source.rsplit('/').next().unwrap_or(source);
    MoveReport {
        source: source.into(),
        destination: Some(format!("/Users/a/Archive/{name}").into()),
        outcome,
    }
}

#[test]
fn paste_batch_renders() {
    let reports = vec![
        report("/Users/a/doc.txt", MoveOutcome::Moved),
        report("/Users/a/gone.txt", MoveOutcome::SourceMissing),
        report("/Users/a/report.txt", MoveOutcome::DestinationConflict),
        report(
            "/Users/a/locked.txt",
            MoveOutcome::Failed("Permission denied (os error 13)".into()),
        ),
    ];

    let mut lines: Vec<String> = reports.iter().map(render_report).collect();
    lines.push(render_summary(&BatchSummary::from_reports(&reports)));

    assert_snapshot!(lines.join("\n"), @r"
    moved: /Users/a/doc.txt -> /Users/a/Archive/doc.txt
    source missing: /Users/a/gone.txt
    destination exists: /Users/a/report.txt
    failed: /Users/a/locked.txt (Permission denied (os error 13))
    1 moved, 1 missing, 1 already at destination, 1 failed
    ");
}

use std::sync::Arc;

use studentdesk::feedback::{AutoConfirm, Decision, LogNotifier};
use studentdesk::{telemetry, App, View};

/// Prints the view for a path (default `/`) against `API_BASE_URL`.
/// Nothing is ever confirmed, so this never mutates the backend.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "/".to_string());
    let app = App::init(
        Arc::new(LogNotifier),
        Arc::new(AutoConfirm(Decision::Cancelled)),
    )?;

    let (view, outcome) = app.navigate(&path).await;
    tracing::debug!(?outcome, "navigation finished");

    match view {
        View::Directory(snap) => {
            println!(
                "{} students, page {} of {}",
                snap.total_records, snap.query.page, snap.total_pages
            );
            for s in &snap.rows {
                println!(
                    "{:<8} {:<32} std {:>2}  roll {:>4}  {}",
                    s.student_card_id, s.name, s.standard, s.roll_number, s.email
                );
            }
        }
        View::Marks(snap) => {
            if let Some(summary) = &snap.summary {
                println!(
                    "{} (roll {}, std {}): {} subjects, average {}",
                    summary.student_name,
                    summary.roll_number,
                    summary.standard,
                    summary.total_subjects,
                    summary.average
                );
            }
            for row in &snap.rows {
                let updated = row
                    .updated_on
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<24} {:>3}  {}  {}",
                    row.mark.subject_name, row.mark.subject_mark, row.grade, updated
                );
            }
        }
        View::NotFound => {
            tracing::warn!(%path, "no such page");
            anyhow::bail!("no view at {path}");
        }
    }

    Ok(())
}

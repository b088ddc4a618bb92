//! `chatkeep sweep` - one manual auto-clear pass.

use chatkeep_core::retention::SweepReport;

use crate::state::AppState;

pub async fn run_sweep(state: &AppState, json: bool) -> anyhow::Result<()> {
    let report = state.retention.sweep_auto_clear().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", format_report(&report));
    }
    Ok(())
}

fn format_report(report: &SweepReport) -> String {
    format!(
        "Auto-clear: {} chats deleted ({} users processed, {} skipped, {} failed)",
        report.chats_deleted, report.processed, report.skipped, report.failed
    )
}

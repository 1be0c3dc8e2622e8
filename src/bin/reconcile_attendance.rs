//! Re-derives attendance labels for every stored day and persists the ones
//! that drifted. Meant to run from cron after the working day ends.

use anyhow::Context;
use tracing::info;

use activity_tracker::attendance::sweep::run_sweep;
use activity_tracker::config::Config;
use activity_tracker::db::init_db;
use activity_tracker::repository::activity_store::MySqlActivityStore;
use activity_tracker::telemetry;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    telemetry::init_console_logging();

    let pool = init_db(&config.database_url)
        .await
        .context("Failed to connect to the database")?;
    let store = MySqlActivityStore::new(pool);

    let report = run_sweep(&store, &config.classifier())
        .await
        .context("Attendance sweep failed")?;

    for correction in &report.corrections {
        println!("{correction}");
    }
    println!("{}", report.summary());

    info!(
        examined = report.examined,
        updated = report.updated,
        conflicts = report.conflicts,
        failed = report.failed,
        "Sweep finished"
    );

    Ok(())
}

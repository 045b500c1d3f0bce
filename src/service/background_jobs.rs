// service/background_jobs.rs
use std::sync::Arc;
use std::time::Duration;

use crate::service::earnings_service::EarningsService;

/// Periodically flips due pending earnings to available. The ledger itself is
/// clock-free; this job supplies the clock.
pub async fn start_earnings_release_job(earnings_service: Arc<EarningsService>) {
    let mut interval = tokio::time::interval(Duration::from_secs(15 * 60));

    loop {
        interval.tick().await;
        match earnings_service.release_due_earnings().await {
            Ok(0) => {}
            Ok(released) => {
                tracing::info!("Earnings release job: {} earnings released", released);
            }
            Err(e) => {
                tracing::error!("Earnings release job failed: {}", e);
            }
        }
    }
}

use chrono::Duration;
use food_order_engine::{
    traits::{OrderBackend, PaymentProvider},
    OrderFlowApi,
};
use log::*;
use tokio::task::JoinHandle;

const SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);

/// Starts the provisional order worker. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// Every minute, online orders that have been waiting for payment for longer than `recheck_after` are reconciled
/// against the payment provider. Orders whose charge failed are discarded, as are orders that are still unpaid after
/// `discard_after`.
pub fn start_reconcile_worker<B, P>(
    api: OrderFlowApi<B, P>,
    recheck_after: Duration,
    discard_after: Duration,
) -> JoinHandle<()>
where
    B: OrderBackend + 'static,
    P: PaymentProvider + 'static,
{
    actix_web::rt::spawn(async move {
        let mut timer = tokio::time::interval(SWEEP_INTERVAL);
        info!(
            "🕰️ Provisional order worker started. Recheck after {} min, discard after {} min",
            recheck_after.num_minutes(),
            discard_after.num_minutes()
        );
        loop {
            timer.tick().await;
            debug!("🕰️ Running provisional order sweep");
            match api.sweep_provisional_orders(recheck_after, discard_after).await {
                Ok(sweep) if sweep.examined == 0 => trace!("🕰️ No provisional orders to reconcile"),
                Ok(sweep) => {
                    info!(
                        "🕰️ {} provisional orders examined. {} paid, {} discarded, {} still pending, {} errors",
                        sweep.examined, sweep.paid, sweep.discarded, sweep.still_pending, sweep.errors
                    );
                },
                Err(e) => {
                    error!("🕰️ Error running the provisional order sweep: {e}");
                },
            }
        }
    })
}

use crate::domain::payout::{Payout, PayoutStatus};
use crate::domain::ports::{PaymentProcessor, PaymentProcessorRef, PayoutStoreRef, SettlementOutcome};
use crate::error::{MarketError, Result};
use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::{error, info};

/// Stand-in for a payment-processor integration: every payout settles.
#[derive(Debug, Default, Clone)]
pub struct SimulatedProcessor;

#[async_trait]
impl PaymentProcessor for SimulatedProcessor {
    async fn settle(&self, payout: &Payout) -> Result<SettlementOutcome> {
        info!(payout_id = %payout.id, amount = %payout.amount, "simulated settlement");
        Ok(SettlementOutcome::Completed)
    }
}

/// Receives the terminal state of a background settlement.
///
/// Dropping the handle detaches the settlement; it still runs to completion.
#[derive(Debug)]
pub struct SettlementHandle {
    rx: oneshot::Receiver<Result<Payout>>,
}

impl SettlementHandle {
    /// Waits for the settlement task and returns the payout in its terminal state.
    pub async fn outcome(self) -> Result<Payout> {
        self.rx.await.map_err(|_| {
            MarketError::store("settlement task ended without reporting an outcome")
        })?
    }
}

/// Starts settling a payout that is already persisted as `processing`.
///
/// The returned handle resolves once the terminal status is written.
pub fn spawn_settlement(
    store: PayoutStoreRef,
    processor: PaymentProcessorRef,
    payout: Payout,
) -> SettlementHandle {
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let result = settle(store, processor, payout).await;
        // The caller may have dropped the handle; the result is already logged.
        let _ = tx.send(result);
    });
    SettlementHandle { rx }
}

async fn settle(
    store: PayoutStoreRef,
    processor: PaymentProcessorRef,
    payout: Payout,
) -> Result<Payout> {
    let next = match processor.settle(&payout).await {
        Ok(SettlementOutcome::Completed) => PayoutStatus::Completed,
        Ok(SettlementOutcome::Failed { reason }) => {
            error!(payout_id = %payout.id, %reason, "payout declined by processor");
            PayoutStatus::Failed
        }
        Err(e) => {
            error!(payout_id = %payout.id, error = %e, "payment processor call failed");
            PayoutStatus::Failed
        }
    };

    match store
        .transition_payout_status(payout.id, PayoutStatus::Processing, next)
        .await
    {
        Ok(settled) => {
            info!(payout_id = %settled.id, status = %settled.status, "payout settled");
            Ok(settled)
        }
        Err(e) => {
            error!(payout_id = %payout.id, error = %e, "failed to record settlement");
            Err(e)
        }
    }
}

//! Async roll coordination
//!
//! Wraps a [`BettingEngine`] with a [`RollSource`] so a caller can run a full
//! roll (validate, fetch, settle) with one call. The engine lock is only held
//! for the synchronous state transitions, never across the provider request.

use crate::{
    client::RollSource,
    config::EngineConfig,
    errors::{EngineError, ProviderError},
    games::{
        engine::{BettingEngine, RollTicket, SessionSnapshot},
        types::{BetPreset, RollOutcome, RollRecord, SessionStats},
    },
};
use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use tracing::{info, warn};

pub struct DiceTable {
    engine: Arc<Mutex<BettingEngine>>,
    source: Arc<dyn RollSource>,
    roll_timeout: Duration,
}

impl DiceTable {
    pub fn new(defaults: EngineConfig, source: Arc<dyn RollSource>, roll_timeout: Duration) -> Self {
        Self {
            engine: Arc::new(Mutex::new(BettingEngine::new(defaults))),
            source,
            roll_timeout,
        }
    }

    fn engine(&self) -> MutexGuard<'_, BettingEngine> {
        // Engine transitions never panic midway, so a poisoned lock holds consistent state.
        self.engine.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Roll with an explicit stake.
    ///
    /// Provider failures (transport, non-200, malformed body, timeout) and
    /// out-of-range values release the busy latch without settling the bet.
    /// Dropping the returned future mid-flight releases it the same way.
    pub async fn roll(&self, amount: i64) -> Result<RollRecord, EngineError> {
        let ticket = self.engine().place_bet(amount)?;
        let mut in_flight = InFlight {
            table: self,
            ticket: Some(ticket),
        };

        let fetched = match tokio::time::timeout(self.roll_timeout, self.source.get_roll()).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout {
                timeout_ms: self.roll_timeout.as_millis() as u64,
            }),
        };

        let ticket = in_flight.ticket.take().ok_or(EngineError::UnknownRoll)?;
        match fetched {
            Ok(value) => self.engine().settle(ticket, value),
            Err(e) => {
                warn!("Roll provider failed: {}", e);
                self.engine().abort(ticket)?;
                Err(e.into())
            }
        }
    }

    /// Roll the currently selected bet amount.
    pub async fn roll_current(&self) -> Result<RollRecord, EngineError> {
        let amount = self.engine().bet_amount();
        self.roll(amount).await
    }

    pub fn set_bet_amount(&self, amount: i64) -> Result<(), EngineError> {
        self.engine().set_bet_amount(amount)
    }

    pub fn apply_preset(&self, preset: BetPreset) -> Result<i64, EngineError> {
        self.engine().apply_preset(preset)
    }

    pub fn reset(&self) -> Result<(), EngineError> {
        self.engine().reset()?;
        info!("Table reset");
        Ok(())
    }

    pub fn balance(&self) -> i64 {
        self.engine().balance()
    }

    pub fn bet_amount(&self) -> i64 {
        self.engine().bet_amount()
    }

    pub fn is_busy(&self) -> bool {
        self.engine().is_busy()
    }

    pub fn last_result(&self) -> Option<RollOutcome> {
        self.engine().last_result()
    }

    pub fn can_roll(&self) -> bool {
        self.engine().can_roll()
    }

    pub fn is_pristine(&self) -> bool {
        self.engine().is_pristine()
    }

    pub fn stats(&self) -> SessionStats {
        self.engine().stats()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.engine().snapshot()
    }
}

/// Holds the ticket while the provider request is pending; aborts it if
/// the roll future is dropped before settlement.
struct InFlight<'a> {
    table: &'a DiceTable,
    ticket: Option<RollTicket>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            warn!("Roll cancelled before the provider answered");
            if let Err(e) = self.table.engine().abort(ticket) {
                warn!("Failed to release cancelled roll: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::{collections::VecDeque, sync::Mutex as StdMutex};
    use tokio::sync::Notify;

    /// Replays a fixed script of provider answers.
    struct ScriptedSource {
        answers: StdMutex<VecDeque<Result<i64, ProviderError>>>,
    }

    impl ScriptedSource {
        fn new(answers: Vec<Result<i64, ProviderError>>) -> Arc<Self> {
            Arc::new(Self {
                answers: StdMutex::new(answers.into()),
            })
        }
    }

    #[async_trait]
    impl RollSource for ScriptedSource {
        async fn get_roll(&self) -> Result<i64, ProviderError> {
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .expect("script exhausted")
        }
    }

    /// Holds every request until released.
    struct GatedSource {
        gate: Notify,
        value: i64,
    }

    #[async_trait]
    impl RollSource for GatedSource {
        async fn get_roll(&self) -> Result<i64, ProviderError> {
            self.gate.notified().await;
            Ok(self.value)
        }
    }

    struct NeverSource;

    #[async_trait]
    impl RollSource for NeverSource {
        async fn get_roll(&self) -> Result<i64, ProviderError> {
            std::future::pending().await
        }
    }

    fn table(source: Arc<dyn RollSource>) -> DiceTable {
        DiceTable::new(EngineConfig::default(), source, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_roll_win_scenario() {
        let table = table(ScriptedSource::new(vec![Ok(5)]));

        let record = table.roll(100).await.unwrap();
        assert_eq!(record.outcome, RollOutcome::Win);
        assert_eq!(record.balance_change, 100);

        let snapshot = table.snapshot();
        assert_eq!(snapshot.balance, 1100);
        assert_eq!(snapshot.last_result, Some(RollOutcome::Win));
        assert_eq!(snapshot.history.len(), 1);
        assert!(!snapshot.busy);
    }

    #[tokio::test]
    async fn test_roll_lose_all_scenario() {
        let table = table(ScriptedSource::new(vec![Ok(2)]));

        table.roll(1000).await.unwrap();
        assert_eq!(table.balance(), 0);
        assert_eq!(table.last_result(), Some(RollOutcome::Lose));
        assert_eq!(table.snapshot().history[0].balance_change, -1000);
        assert!(!table.can_roll());
    }

    #[tokio::test]
    async fn test_roll_current_uses_selected_bet() {
        let table = table(ScriptedSource::new(vec![Ok(6)]));
        table.set_bet_amount(40).unwrap();

        let record = table.roll_current().await.unwrap();
        assert_eq!(record.bet, 40);
        assert_eq!(table.balance(), 1040);
    }

    #[tokio::test]
    async fn test_validation_errors_skip_provider() {
        // Empty script: any provider call would panic.
        let table = table(ScriptedSource::new(vec![]));

        assert!(matches!(table.roll(0).await, Err(EngineError::InvalidBet(_))));
        assert!(matches!(table.roll(-5).await, Err(EngineError::InvalidBet(_))));
        assert!(matches!(
            table.roll(1001).await,
            Err(EngineError::InsufficientBalance { .. })
        ));
        assert!(table.is_pristine());
    }

    #[tokio::test]
    async fn test_provider_failure_recovers() {
        let table = table(ScriptedSource::new(vec![
            Err(ProviderError::Failed(reqwest::StatusCode::INTERNAL_SERVER_ERROR)),
            Ok(4),
        ]));

        let err = table.roll(100).await.unwrap_err();
        assert!(matches!(err, EngineError::ProviderUnavailable(_)));
        assert!(!table.is_busy());
        assert_eq!(table.balance(), 1000);
        assert!(table.snapshot().history.is_empty());

        // Retry succeeds on the same session.
        table.roll(100).await.unwrap();
        assert_eq!(table.balance(), 1100);
    }

    #[tokio::test]
    async fn test_invalid_roll_value_recovers() {
        let table = table(ScriptedSource::new(vec![Ok(0), Ok(7)]));

        assert_eq!(table.roll(10).await, Err(EngineError::InvalidRollValue(0)));
        assert_eq!(table.roll(10).await, Err(EngineError::InvalidRollValue(7)));
        assert!(!table.is_busy());
        assert!(table.is_pristine());
    }

    #[tokio::test]
    async fn test_timeout_recovers() {
        let table = DiceTable::new(
            EngineConfig::default(),
            Arc::new(NeverSource),
            Duration::from_millis(20),
        );

        let err = table.roll(10).await.unwrap_err();
        assert_eq!(
            err,
            EngineError::ProviderUnavailable("timed out after 20ms".to_string())
        );
        assert!(!table.is_busy());
        assert_eq!(table.balance(), 1000);
    }

    #[tokio::test]
    async fn test_dropped_roll_releases_latch() {
        let table = DiceTable::new(
            EngineConfig::default(),
            Arc::new(NeverSource),
            Duration::from_secs(60),
        );

        // Caller gives up long before the provider timeout.
        let outer = tokio::time::timeout(Duration::from_millis(20), table.roll(100)).await;
        assert!(outer.is_err());

        assert!(!table.is_busy());
        assert_eq!(table.balance(), 1000);
        assert!(table.snapshot().history.is_empty());
        assert_eq!(table.reset(), Ok(()));
    }

    #[tokio::test]
    async fn test_aborted_task_releases_latch() {
        let source = Arc::new(GatedSource {
            gate: Notify::new(),
            value: 6,
        });
        let table = Arc::new(table(source));

        let in_flight = {
            let table = table.clone();
            tokio::spawn(async move { table.roll(100).await })
        };
        while !table.is_busy() {
            tokio::task::yield_now().await;
        }

        in_flight.abort();
        assert!(in_flight.await.unwrap_err().is_cancelled());

        assert!(!table.is_busy());
        assert!(table.can_roll());
        assert_eq!(table.balance(), 1000);
    }

    #[tokio::test]
    async fn test_concurrent_roll_rejected_while_busy() {
        let source = Arc::new(GatedSource {
            gate: Notify::new(),
            value: 6,
        });
        let table = Arc::new(table(source.clone()));

        let in_flight = {
            let table = table.clone();
            tokio::spawn(async move { table.roll(100).await })
        };

        // Wait until the first roll has taken the latch.
        while !table.is_busy() {
            tokio::task::yield_now().await;
        }

        assert_eq!(table.roll(50).await, Err(EngineError::EngineBusy));
        assert_eq!(table.reset(), Err(EngineError::EngineBusy));
        assert_eq!(table.set_bet_amount(20), Err(EngineError::EngineBusy));

        source.gate.notify_one();
        let record = in_flight.await.unwrap().unwrap();
        assert_eq!(record.bet, 100);
        assert_eq!(table.balance(), 1100);
        assert_eq!(table.snapshot().history.len(), 1);
    }

    #[tokio::test]
    async fn test_reset_after_play() {
        let table = table(ScriptedSource::new(vec![Ok(1), Ok(6), Ok(3)]));
        for _ in 0..3 {
            table.roll(10).await.unwrap();
        }
        assert_eq!(table.stats().rolls, 3);

        table.reset().unwrap();
        table.reset().unwrap();
        let snapshot = table.snapshot();
        assert_eq!(snapshot.balance, 1000);
        assert_eq!(snapshot.bet_amount, 10);
        assert_eq!(snapshot.last_result, None);
        assert!(snapshot.history.is_empty());
    }
}

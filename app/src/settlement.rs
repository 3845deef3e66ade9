//! Settlement creation and its externally driven state machine.
//!
//! ```text
//!          ┌─► Submitted ─► Confirmed
//! Pending ─┤
//!          └──────────────────────────► Failed (also from Submitted)
//! ```
//!
//! Replays of the same mark are accepted; the unique constraint on
//! `session_id` keeps settlement creation idempotent.

use {
    crate::{Application, Dependencies},
    cpms_shared::{Error, Result},
    cpms_storage::{
        ChargerRepository, SessionRepository, Settlement, SettlementRepository, SettlementStatus,
    },
    uuid::Uuid,
};

impl<D: Dependencies> Application<D> {
    /// Creates the `Pending` settlement for a priced session, or touches the
    /// existing one. A no-op unless cost fields are set and the charger has
    /// a site.
    pub async fn create_pending_from_session(&self, session_id: Uuid) -> Result<()> {
        let Some(session) = self.sessions.get(session_id).await? else {
            return Ok(());
        };
        let (Some(amount), Some(currency)) =
            (session.cost_amount, session.cost_currency.as_deref())
        else {
            return Ok(());
        };
        let Some(site_id) = self.chargers.site_id(&session.charge_point_id).await? else {
            return Ok(());
        };

        let settlement_id = self
            .settlements
            .upsert_pending(session_id, site_id, amount, currency)
            .await?;
        tracing::debug!(%session_id, %settlement_id, "pending settlement recorded");
        Ok(())
    }

    pub async fn mark_settlement_submitted(
        &self,
        settlement_id: Uuid,
        chain: &str,
        tx_hash: &str,
        external_ref: Option<&str>,
    ) -> Result<()> {
        if chain.is_empty() || tx_hash.is_empty() {
            return Err(Error::invalid_input("chain and txHash are required"));
        }
        let settlement = self.settlement_for_update(settlement_id).await?;
        match settlement.status.parse::<SettlementStatus>()? {
            SettlementStatus::Pending | SettlementStatus::Submitted => {
                self.settlements
                    .mark_submitted(settlement_id, chain, tx_hash, external_ref)
                    .await
            }
            status => Err(Error::state_conflict(format!(
                "settlement in status {} cannot be submitted",
                status.as_str()
            ))),
        }
    }

    pub async fn mark_settlement_confirmed(&self, settlement_id: Uuid) -> Result<()> {
        let settlement = self.settlement_for_update(settlement_id).await?;
        match settlement.status.parse::<SettlementStatus>()? {
            SettlementStatus::Submitted | SettlementStatus::Confirmed => {
                self.settlements.mark_confirmed(settlement_id).await
            }
            status => Err(Error::state_conflict(format!(
                "settlement in status {} cannot be confirmed",
                status.as_str()
            ))),
        }
    }

    /// `Failed` is reachable from any non-terminal state; `Confirmed` stays
    /// final.
    pub async fn mark_settlement_failed(&self, settlement_id: Uuid, error: &str) -> Result<()> {
        let settlement = self.settlement_for_update(settlement_id).await?;
        match settlement.status.parse::<SettlementStatus>()? {
            SettlementStatus::Confirmed => Err(Error::state_conflict(
                "settlement in status Confirmed cannot be failed".to_owned(),
            )),
            _ => self.settlements.mark_failed(settlement_id, error).await,
        }
    }

    async fn settlement_for_update(&self, settlement_id: Uuid) -> Result<Settlement> {
        self.settlements
            .get(settlement_id)
            .await?
            .ok_or(Error::NotFound("settlement"))
    }
}

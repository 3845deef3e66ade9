// Safety: Unwraps allowed here because
// (1) the in-memory backend is only used in tests
// (2) all unwraps come from `RwLock` poisoning, which should never happen
// if the rest of the code does not panic.
#![allow(clippy::unwrap_used)]

use {
    super::{Settlement, SettlementRepository, SettlementStatus},
    async_trait::async_trait,
    chrono::Utc,
    cpms_shared::Result,
    rust_decimal::Decimal,
    std::sync::{Arc, RwLock},
    uuid::Uuid,
};

#[derive(Debug, Clone, Default)]
pub struct InMemorySettlementRepository {
    settlements: Arc<RwLock<Vec<Settlement>>>,
}

impl InMemorySettlementRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.settlements.read().unwrap().len()
    }
}

#[async_trait]
impl SettlementRepository for InMemorySettlementRepository {
    async fn upsert_pending(
        &self,
        session_id: Uuid,
        site_id: Uuid,
        amount: Decimal,
        currency: &str,
    ) -> Result<Uuid> {
        let mut settlements = self.settlements.write().unwrap();
        if let Some(existing) = settlements.iter_mut().find(|s| s.session_id == session_id) {
            existing.updated_at = Utc::now();
            return Ok(existing.settlement_id);
        }
        let settlement_id = Uuid::new_v4();
        let now = Utc::now();
        settlements.push(Settlement {
            settlement_id,
            session_id,
            site_id,
            amount,
            currency: currency.to_owned(),
            status: SettlementStatus::Pending.as_str().to_owned(),
            chain: None,
            tx_hash: None,
            external_ref: None,
            error: None,
            created_at: now,
            updated_at: now,
        });
        Ok(settlement_id)
    }

    async fn get(&self, settlement_id: Uuid) -> Result<Option<Settlement>> {
        Ok(self
            .settlements
            .read()
            .unwrap()
            .iter()
            .find(|s| s.settlement_id == settlement_id)
            .cloned())
    }

    async fn get_by_session(&self, session_id: Uuid) -> Result<Option<Settlement>> {
        Ok(self
            .settlements
            .read()
            .unwrap()
            .iter()
            .find(|s| s.session_id == session_id)
            .cloned())
    }

    async fn list(&self, status: Option<&str>, limit: i64) -> Result<Vec<Settlement>> {
        let mut settlements: Vec<Settlement> = self
            .settlements
            .read()
            .unwrap()
            .iter()
            .filter(|s| status.is_none_or(|wanted| s.status == wanted))
            .cloned()
            .collect();
        match status {
            Some(_) => settlements.sort_by_key(|s| s.created_at),
            None => settlements.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
        settlements.truncate(limit.max(0) as usize);
        Ok(settlements)
    }

    async fn mark_submitted(
        &self,
        settlement_id: Uuid,
        chain: &str,
        tx_hash: &str,
        external_ref: Option<&str>,
    ) -> Result<()> {
        if let Some(settlement) = self
            .settlements
            .write()
            .unwrap()
            .iter_mut()
            .find(|s| s.settlement_id == settlement_id)
        {
            settlement.status = SettlementStatus::Submitted.as_str().to_owned();
            settlement.chain = Some(chain.to_owned());
            settlement.tx_hash = Some(tx_hash.to_owned());
            settlement.external_ref = external_ref.map(str::to_owned);
            settlement.error = None;
            settlement.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn mark_confirmed(&self, settlement_id: Uuid) -> Result<()> {
        if let Some(settlement) = self
            .settlements
            .write()
            .unwrap()
            .iter_mut()
            .find(|s| s.settlement_id == settlement_id)
        {
            settlement.status = SettlementStatus::Confirmed.as_str().to_owned();
            settlement.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn mark_failed(&self, settlement_id: Uuid, error: &str) -> Result<()> {
        if let Some(settlement) = self
            .settlements
            .write()
            .unwrap()
            .iter_mut()
            .find(|s| s.settlement_id == settlement_id)
        {
            settlement.status = SettlementStatus::Failed.as_str().to_owned();
            settlement.error = Some(error.to_owned());
            settlement.updated_at = Utc::now();
        }
        Ok(())
    }
}

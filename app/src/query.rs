//! Thin read projections and the operator-facing site/tariff writes.

use {
    crate::{Application, Dependencies},
    cpms_shared::{Error, Result},
    cpms_storage::{
        Charger, ChargerRepository, ConnectorState, ConnectorStateRepository, Session,
        SessionRepository, Settlement, SettlementRepository, SiteRepository, TariffRepository,
    },
    rust_decimal::Decimal,
    uuid::Uuid,
};

const DEFAULT_LIST_LIMIT: i64 = 50;
const MAX_LIST_LIMIT: i64 = 200;

fn clamp_limit(limit: Option<i64>) -> i64 {
    match limit {
        Some(limit) if limit > 0 && limit <= MAX_LIST_LIMIT => limit,
        _ => DEFAULT_LIST_LIMIT,
    }
}

impl<D: Dependencies> Application<D> {
    pub async fn charger(&self, charge_point_id: &str) -> Result<Charger> {
        self.chargers
            .get(charge_point_id)
            .await?
            .ok_or(Error::NotFound("charger"))
    }

    pub async fn list_connectors(&self, charge_point_id: &str) -> Result<Vec<ConnectorState>> {
        self.connectors.list(charge_point_id).await
    }

    pub async fn session(&self, session_id: Uuid) -> Result<Session> {
        self.sessions
            .get(session_id)
            .await?
            .ok_or(Error::NotFound("session"))
    }

    pub async fn sessions_by_charger(
        &self,
        charge_point_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Session>> {
        self.sessions
            .list_by_charger(charge_point_id, clamp_limit(limit))
            .await
    }

    pub async fn settlements_list(
        &self,
        status: Option<&str>,
        limit: Option<i64>,
    ) -> Result<Vec<Settlement>> {
        self.settlements.list(status, clamp_limit(limit)).await
    }

    pub async fn create_site(&self, name: &str) -> Result<Uuid> {
        if name.is_empty() {
            return Err(Error::invalid_input("missing name"));
        }
        self.sites.create(name).await
    }

    pub async fn set_site_wallet(&self, site_id: Uuid, wallet: &str) -> Result<()> {
        if wallet.is_empty() {
            return Err(Error::invalid_input("missing wallet"));
        }
        self.sites.set_payout_wallet(site_id, wallet).await
    }

    /// Installs a new active tariff, deactivating any predecessor.
    pub async fn upsert_site_tariff(
        &self,
        site_id: Uuid,
        price_per_kwh: Decimal,
        currency: &str,
    ) -> Result<Uuid> {
        if price_per_kwh <= Decimal::ZERO {
            return Err(Error::invalid_input("pricePerKwh must be positive"));
        }
        self.tariffs
            .upsert_active_for_site(site_id, price_per_kwh, currency)
            .await
    }

    pub async fn settlement(&self, settlement_id: Uuid) -> Result<Settlement> {
        self.settlements
            .get(settlement_id)
            .await?
            .ok_or(Error::NotFound("settlement"))
    }
}

#[cfg(test)]
mod tests {
    use {super::clamp_limit, test_case::test_case};

    #[test_case(None, 50 ; "absent limit defaults")]
    #[test_case(Some(0), 50 ; "zero limit defaults")]
    #[test_case(Some(-3), 50 ; "negative limit defaults")]
    #[test_case(Some(500), 50 ; "oversized limit defaults")]
    #[test_case(Some(25), 25 ; "in range limit kept")]
    fn test_clamp_limit(limit: Option<i64>, expected: i64) {
        assert_eq!(clamp_limit(limit), expected);
    }
}

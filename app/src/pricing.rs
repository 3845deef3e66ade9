//! Per-kWh pricing against the active site tariff.

use {
    crate::{Application, Dependencies},
    cpms_shared::Result,
    cpms_storage::{ChargerRepository, SessionRepository, TariffRepository},
    rust_decimal::{Decimal, RoundingStrategy},
    uuid::Uuid,
};

const COST_SCALE: u32 = 4;

impl<D: Dependencies> Application<D> {
    /// Writes `cost = round4((energy_wh / 1000) × price_per_kwh)` together
    /// with the applied tariff and currency.
    ///
    /// A no-op unless the session has an energy figure, the charger belongs
    /// to a site and that site has an active tariff. Deterministic: the same
    /// inputs always produce the same stored cost.
    pub async fn price_session_per_kwh(&self, session_id: Uuid) -> Result<()> {
        let Some(session) = self.sessions.get(session_id).await? else {
            return Ok(());
        };
        let Some(energy_wh) = session.energy_wh else {
            return Ok(());
        };
        let Some(site_id) = self.chargers.site_id(&session.charge_point_id).await? else {
            return Ok(());
        };
        let Some(tariff) = self.tariffs.active_for_site(site_id).await? else {
            return Ok(());
        };

        let kwh = Decimal::from(energy_wh) / Decimal::from(1000);
        let mut cost = (kwh * tariff.price_per_kwh)
            .round_dp_with_strategy(COST_SCALE, RoundingStrategy::MidpointAwayFromZero);
        cost.rescale(COST_SCALE);

        self.sessions
            .set_pricing(session_id, tariff.tariff_id, cost, &tariff.currency)
            .await
    }
}

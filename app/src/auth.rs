//! Charger authentication at the gateway trust boundary.

use {
    crate::{Application, Dependencies},
    chrono::Utc,
    cpms_shared::{Error, Result, secrets},
    cpms_storage::ChargerRepository,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargerAuth {
    pub ocpp_version: String,
}

impl<D: Dependencies> Application<D> {
    /// Allows a charger when it is active and the SHA-256 digest of the
    /// presented secret matches the stored one under constant-time
    /// comparison. Success touches `last_seen_at`.
    pub async fn authenticate_charger(
        &self,
        charge_point_id: &str,
        presented_secret: &str,
    ) -> Result<ChargerAuth> {
        let Some(charger) = self.chargers.get(charge_point_id).await? else {
            return Err(Error::AuthFailure);
        };
        if !charger.is_active || charger.secret_hash.is_empty() {
            return Err(Error::AuthFailure);
        }

        let presented_hash = secrets::hash_secret(presented_secret);
        if !secrets::constant_time_eq_hex(&charger.secret_hash, &presented_hash) {
            return Err(Error::AuthFailure);
        }

        self.chargers.touch_last_seen(charge_point_id, Utc::now()).await?;
        Ok(ChargerAuth { ocpp_version: charger.ocpp_version })
    }
}

//! Session energy finalization: a prioritized fallback over meter data.

use {
    crate::{Application, Dependencies},
    cpms_shared::Result,
    cpms_storage::{EnergySource, Finalization, Session, SessionRepository},
    uuid::Uuid,
};

impl<D: Dependencies> Application<D> {
    /// Computes `energy_wh` and stamps `finalized_at`. A no-op when the
    /// session is unknown or already finalized.
    pub async fn finalize_with_fallback(&self, session_id: Uuid) -> Result<()> {
        self.finalize_session(session_id, false).await
    }

    /// Re-runs the fallback even on a finalized session. Operator surface
    /// only.
    pub async fn finalize_forced(&self, session_id: Uuid) -> Result<()> {
        self.finalize_session(session_id, true).await
    }

    async fn finalize_session(&self, session_id: Uuid, force: bool) -> Result<()> {
        let Some(session) = self.sessions.get(session_id).await? else {
            return Ok(());
        };
        if !force && session.finalized_at.is_some() {
            return Ok(());
        }
        let outcome = self.energy_fallback(&session).await?;
        tracing::debug!(
            %session_id,
            source = outcome.source.as_str(),
            energy_wh = outcome.energy_wh,
            "finalizing session"
        );
        self.sessions.finalize(session_id, &outcome).await
    }

    /// First rule that produces a value wins:
    ///
    /// 1. `meter_stop_wh - meter_start_wh` when both markers are present.
    /// 2. Latest `Energy.Active.Import.Register` reading minus
    ///    `meter_start_wh`, backfilling `meter_stop_wh`.
    /// 3. Sum of `Energy.Active.Import.Interval` readings when strictly
    ///    positive.
    /// 4. Nothing usable: `energy_wh` stays NULL and the session is marked
    ///    estimated.
    ///
    /// Negative derived energies clamp to zero.
    async fn energy_fallback(&self, session: &Session) -> Result<Finalization> {
        if let (Some(start), Some(stop)) = (session.meter_start_wh, session.meter_stop_wh) {
            return Ok(Finalization {
                energy_wh: Some((stop - start).max(0)),
                source: EnergySource::StopTransaction,
                is_estimated: false,
                backfill_meter_stop_wh: None,
            });
        }

        if let Some(start) = session.meter_start_wh {
            if let Some(last_register) = self.sessions.last_register_wh(session.session_id).await? {
                return Ok(Finalization {
                    energy_wh: Some((last_register - start).max(0)),
                    source: EnergySource::Register,
                    is_estimated: false,
                    backfill_meter_stop_wh: Some(last_register),
                });
            }
        }

        let interval_sum = self.sessions.interval_sum_wh(session.session_id).await?;
        if interval_sum > 0 {
            return Ok(Finalization {
                energy_wh: Some(interval_sum),
                source: EnergySource::Interval,
                is_estimated: false,
                backfill_meter_stop_wh: None,
            });
        }

        Ok(Finalization {
            energy_wh: None,
            source: EnergySource::Missing,
            is_estimated: true,
            backfill_meter_stop_wh: None,
        })
    }
}

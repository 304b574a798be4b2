//! Trip anonymization pipeline

use chrono::Utc;
use rayon::prelude::*;
use secrecy::{ExposeSecret, SecretString};
use traveal_core::config::AnonymizationConfig;
use traveal_core::{AnonymizationLevel, TravealError, TravealResult};

use crate::location::{to_area, DEFAULT_NOISE_UNITS};
use crate::pseudonym::{anonymous_trip_id, chained_hash};
use crate::record::{AnonymizedTripRecord, RawTripRecord, TripTime};

/// Turns raw trip records into [`AnonymizedTripRecord`]s.
///
/// Pseudonyms are keyed by the master secret; location noise is drawn
/// fresh on every call.
pub struct Anonymizer {
    secret: SecretString,
    noise_units: u32,
}

impl Anonymizer {
    pub fn new(secret: SecretString) -> TravealResult<Self> {
        if secret.expose_secret().is_empty() {
            return Err(TravealError::MissingSecret);
        }
        Ok(Self {
            secret,
            noise_units: DEFAULT_NOISE_UNITS,
        })
    }

    pub fn from_config(config: &AnonymizationConfig, secret: SecretString) -> TravealResult<Self> {
        Ok(Self::new(secret)?.with_noise_units(config.noise_units))
    }

    /// Noise bound in thousandths of a degree.
    pub fn with_noise_units(mut self, noise_units: u32) -> Self {
        self.noise_units = noise_units;
        self
    }

    pub fn noise_units(&self) -> u32 {
        self.noise_units
    }

    /// Pseudonym for `identifier` at `level`.
    pub fn pseudonym(&self, identifier: &str, level: AnonymizationLevel) -> String {
        chained_hash(identifier, level, &self.secret)
    }

    pub fn anonymous_trip_id(&self, trip_id: &str) -> String {
        anonymous_trip_id(trip_id, &self.secret)
    }

    /// Anonymize one record.
    ///
    /// Only the recognised analytic fields survive; everything captured in
    /// `RawTripRecord::other` is dropped. Fails only when the OS random
    /// source is unavailable.
    pub fn anonymize(
        &self,
        record: &RawTripRecord,
        level: AnonymizationLevel,
    ) -> TravealResult<AnonymizedTripRecord> {
        let user_hash = record
            .user_id
            .as_deref()
            .map(|id| self.pseudonym(id, level));

        let start_area = match record.start_location {
            Some(loc) => to_area(loc, self.noise_units)?,
            None => None,
        };
        let end_area = match record.end_location {
            Some(loc) => to_area(loc, self.noise_units)?,
            None => None,
        };

        if !record.other.is_empty() {
            tracing::trace!(dropped = record.other.len(), "unrecognised fields dropped");
        }

        Ok(AnonymizedTripRecord {
            user_hash,
            distance: record.distance,
            duration: record.duration,
            mode: record.mode.clone(),
            purpose: record.purpose.clone(),
            companions: record.companions,
            weather: record.weather.clone(),
            time_of_day: record.time_of_day.clone(),
            start_area,
            end_area,
            start_hour: record.start_time.and_then(TripTime::truncate_to_hour),
            anonymized_at: Utc::now(),
            anonymization_level: level,
        })
    }

    /// Anonymize `records` in parallel, preserving order. Stops at the
    /// first error.
    pub fn anonymize_batch(
        &self,
        records: &[RawTripRecord],
        level: AnonymizationLevel,
    ) -> TravealResult<Vec<AnonymizedTripRecord>> {
        let out = records
            .par_iter()
            .map(|record| self.anonymize(record, level))
            .collect::<TravealResult<Vec<_>>>()?;
        tracing::info!(count = out.len(), level = %level, "anonymized trip batch");
        Ok(out)
    }
}

impl std::fmt::Debug for Anonymizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Anonymizer")
            .field("secret", &"[REDACTED]")
            .field("noise_units", &self.noise_units)
            .finish()
    }
}

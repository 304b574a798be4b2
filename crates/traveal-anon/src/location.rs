//! Location coarsening
//!
//! A coordinate is truncated to three decimal places (~110 m of latitude),
//! then shifted by a uniform random offset of up to `noise_units`
//! thousandths of a degree.

use traveal_core::TravealResult;
use traveal_crypto::random::random_offset;

use crate::record::Area;

/// Zones per degree
pub const ZONE_SCALE: f64 = 1000.0;

/// Default noise: ±0.1 degree
pub const DEFAULT_NOISE_UNITS: u32 = 100;

/// Integer zone index of a coordinate, truncated toward zero.
pub fn quantize(coord: f64) -> i64 {
    (coord * ZONE_SCALE).trunc() as i64
}

/// Quantize `coord` and add a fresh noise offset in `[-noise_units, noise_units]`.
pub fn zone(coord: f64, noise_units: u32) -> TravealResult<f64> {
    let noisy = quantize(coord).saturating_add(random_offset(noise_units)?);
    Ok(noisy as f64 / ZONE_SCALE)
}

/// Coarsen a `(lat, lng)` pair. Input that is not a coordinate on Earth
/// (non-finite, |lat| > 90, |lng| > 180) yields `None`.
pub fn to_area(location: (f64, f64), noise_units: u32) -> TravealResult<Option<Area>> {
    let (lat, lng) = location;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        tracing::debug!("dropping out-of-range location");
        return Ok(None);
    }
    Ok(Some(Area {
        lat_zone: zone(lat, noise_units)?,
        lng_zone: zone(lng, noise_units)?,
    }))
}

//! Fallible draws from the OS CSPRNG
//!
//! Every random value in this crate comes through here so that an
//! unavailable entropy source surfaces as `EntropyUnavailable` instead of
//! a panic or a silently weaker generator.

use rand::rngs::OsRng;
use rand::RngCore;
use traveal_core::{TravealError, TravealResult};

/// Fill `buf` from the OS random source.
pub fn fill_random(buf: &mut [u8]) -> TravealResult<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| TravealError::EntropyUnavailable(e.to_string()))
}

/// A fixed-size array of random bytes.
pub fn random_bytes<const N: usize>() -> TravealResult<[u8; N]> {
    let mut bytes = [0u8; N];
    fill_random(&mut bytes)?;
    Ok(bytes)
}

pub fn random_u32() -> TravealResult<u32> {
    Ok(u32::from_be_bytes(random_bytes::<4>()?))
}

fn random_u64() -> TravealResult<u64> {
    Ok(u64::from_be_bytes(random_bytes::<8>()?))
}

/// Uniform integer in `[-bound, bound]`, by rejection sampling.
pub fn random_offset(bound: u32) -> TravealResult<i64> {
    let span = 2 * u64::from(bound) + 1;
    let limit = (u64::MAX / span) * span;
    loop {
        let v = random_u64()?;
        if v < limit {
            return Ok((v % span) as i64 - i64::from(bound));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_bytes_differ() {
        let a = random_bytes::<32>().unwrap();
        let b = random_bytes::<32>().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_offset_zero_bound() {
        for _ in 0..16 {
            assert_eq!(random_offset(0).unwrap(), 0);
        }
    }

    #[test]
    fn test_offset_within_bound_and_covers_both_signs() {
        let mut saw_negative = false;
        let mut saw_positive = false;
        for _ in 0..2000 {
            let v = random_offset(100).unwrap();
            assert!((-100..=100).contains(&v), "offset {v} out of range");
            saw_negative |= v < 0;
            saw_positive |= v > 0;
        }
        assert!(saw_negative && saw_positive);
    }

    #[test]
    fn test_offset_reaches_extremes() {
        let mut saw_min = false;
        let mut saw_max = false;
        for _ in 0..500 {
            match random_offset(1).unwrap() {
                -1 => saw_min = true,
                1 => saw_max = true,
                _ => {}
            }
        }
        assert!(saw_min && saw_max);
    }
}

use crate::catalog::{self, NO_FILTER, RANDOM_FILTER};
use rand::Rng;
use rand::seq::SliceRandom;

pub const BRIGHTNESS_SPAN: f64 = 0.1;
pub const CONTRAST_RANGE: (f64, f64) = (0.8, 1.2);
pub const SATURATION_RANGE: (f64, f64) = (0.8, 1.2);
pub const HUE_SPAN_DEG: f64 = 30.0;

/// Parameters of the "Random color shift" effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorShift {
    pub brightness: f64,
    pub contrast: f64,
    pub saturation: f64,
    pub hue: f64,
}

impl ColorShift {
    pub fn neutral() -> Self {
        Self {
            brightness: 0.0,
            contrast: 1.0,
            saturation: 1.0,
            hue: 0.0,
        }
    }

    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            brightness: rng.gen_range(-BRIGHTNESS_SPAN..=BRIGHTNESS_SPAN),
            contrast: rng.gen_range(CONTRAST_RANGE.0..=CONTRAST_RANGE.1),
            saturation: rng.gen_range(SATURATION_RANGE.0..=SATURATION_RANGE.1),
            hue: rng.gen_range(-HUE_SPAN_DEG..=HUE_SPAN_DEG),
        }
    }
}

/// Uniform pick among `pool` minus the no-op and the sentinel.
pub fn pick_from<'a, R: Rng + ?Sized>(pool: &[&'a str], rng: &mut R) -> &'a str {
    let candidates: Vec<&'a str> = pool
        .iter()
        .copied()
        .filter(|n| *n != NO_FILTER && *n != RANDOM_FILTER)
        .collect();
    candidates.choose(rng).copied().unwrap_or(NO_FILTER)
}

pub fn pick_random_effect<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    let pool: Vec<&'static str> = catalog::names().collect();
    pick_from(&pool, rng)
}

/// Replaces every sentinel occurrence with an independently drawn effect.
pub fn resolve_random<S, R>(names: &[S], rng: &mut R) -> Vec<String>
where
    S: AsRef<str>,
    R: Rng + ?Sized,
{
    names
        .iter()
        .map(|n| {
            let n = n.as_ref();
            if n == RANDOM_FILTER {
                pick_random_effect(rng).to_string()
            } else {
                n.to_string()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use regex::Regex;

    #[test]
    fn test_pick_never_returns_sentinel_or_noop() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2_000 {
            let n = pick_random_effect(&mut rng);
            assert_ne!(n, RANDOM_FILTER);
            assert_ne!(n, NO_FILTER);
            assert!(catalog::lookup(n).is_some());
        }
    }

    #[test]
    fn test_pick_falls_back_to_noop_on_empty_pool() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(pick_from(&[], &mut rng), NO_FILTER);
        assert_eq!(pick_from(&[NO_FILTER, RANDOM_FILTER], &mut rng), NO_FILTER);
        assert_eq!(pick_from(&[RANDOM_FILTER, "VHS"], &mut rng), "VHS");
    }

    #[test]
    fn test_color_shift_within_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..5_000 {
            let p = ColorShift::sample(&mut rng);
            assert!((-0.1..=0.1).contains(&p.brightness), "{p:?}");
            assert!((0.8..=1.2).contains(&p.contrast), "{p:?}");
            assert!((0.8..=1.2).contains(&p.saturation), "{p:?}");
            assert!((-30.0..=30.0).contains(&p.hue), "{p:?}");
        }
    }

    #[test]
    fn test_color_shift_text_has_two_decimals() {
        let re = Regex::new(
            r"^eq=brightness=(-?0\.\d{2}):contrast=([01]\.\d{2}):saturation=([01]\.\d{2}),hue=h=(-?\d{1,2}\.\d{2})$",
        )
        .unwrap();
        let effect = catalog::lookup("Random color shift").unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..2_000 {
            let text = effect.render(&ColorShift::sample(&mut rng));
            let caps = re
                .captures(&text)
                .unwrap_or_else(|| panic!("unexpected shape: {text}"));
            let br: f64 = caps[1].parse().unwrap();
            let ct: f64 = caps[2].parse().unwrap();
            let sat: f64 = caps[3].parse().unwrap();
            let hue: f64 = caps[4].parse().unwrap();
            assert!((-0.1..=0.1).contains(&br), "{text}");
            assert!((0.8..=1.2).contains(&ct), "{text}");
            assert!((0.8..=1.2).contains(&sat), "{text}");
            assert!((-30.0..=30.0).contains(&hue), "{text}");
        }
    }

    #[test]
    fn test_resolve_random_keeps_order_and_other_names() {
        let mut rng = StdRng::seed_from_u64(3);
        let out = resolve_random(
            &["Black and white", RANDOM_FILTER, "Bogus", RANDOM_FILTER],
            &mut rng,
        );
        assert_eq!(out.len(), 4);
        assert_eq!(out[0], "Black and white");
        assert_eq!(out[2], "Bogus");
        for picked in [&out[1], &out[3]] {
            assert_ne!(picked, RANDOM_FILTER);
            assert_ne!(picked, NO_FILTER);
        }
    }

    #[test]
    fn test_draws_are_not_shared_between_calls() {
        let mut rng = StdRng::seed_from_u64(9);
        let a = ColorShift::sample(&mut rng);
        let b = ColorShift::sample(&mut rng);
        assert_ne!(a, b);
    }
}

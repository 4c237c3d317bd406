use rand::rngs::SmallRng;
use rand::SeedableRng;

/// 有种子时可复现（测试、回放），否则取系统熵。
pub fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    }
}

#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
pub fn set_panic_hook() {}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn seeded_rngs_agree() {
        let mut first = make_rng(Some(17));
        let mut second = make_rng(Some(17));
        let a: Vec<u32> = (0..8).map(|_| first.gen()).collect();
        let b: Vec<u32> = (0..8).map(|_| second.gen()).collect();
        assert_eq!(a, b);
    }
}

use std::hash::Hasher;

use fnv::FnvHasher;

/// The moniker length limit enforced by the staking module.
pub const MAX_MONIKER_LENGTH: usize = 70;

/// Fit a moniker into the character limit the staking module enforces.
///
/// If the moniker already fits, it is returned unmodified. Otherwise the
/// middle is truncated and a 32-bit hash of the full input, formatted in
/// base36, is appended in case the only distinguishing data was in the
/// truncated middle.
pub fn condense_moniker(m: &str) -> String {
    if m.len() <= MAX_MONIKER_LENGTH {
        return m.to_string();
    }

    let mut h = FnvHasher::default();
    h.write(m.as_bytes());
    let suffix = format!("-{}", to_base36(h.finish() as u32));

    let want_len = MAX_MONIKER_LENGTH - suffix.len();

    // Half of the want length, minus 2 to account for half of the ... we
    // add in the middle.
    let keep_len = (want_len / 2) - 2;

    format!("{}...{}{}", &m[..keep_len], &m[m.len() - keep_len..], suffix)
}

fn to_base36(mut n: u32) -> String {
    const ALPHABET: &[char] = &[
        '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h',
        'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
    ];
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(ALPHABET[(n % 36) as usize]);
        n /= 36;
    }
    out.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_monikers_pass_through() {
        assert_eq!(condense_moniker("juno-val-0"), "juno-val-0");
    }

    #[test]
    fn long_monikers_fit_the_limit() {
        let long = "a".repeat(3 * MAX_MONIKER_LENGTH);
        assert!(condense_moniker(&long).len() <= MAX_MONIKER_LENGTH);
    }

    #[test]
    fn middles_stay_distinguishable() {
        // Identical except for one character in the truncated middle.
        let m1 = format!("{}1{}", "a".repeat(MAX_MONIKER_LENGTH), "z".repeat(MAX_MONIKER_LENGTH));
        let m2 = format!("{}2{}", "a".repeat(MAX_MONIKER_LENGTH), "z".repeat(MAX_MONIKER_LENGTH));

        let c1 = condense_moniker(&m1);
        let c2 = condense_moniker(&m2);

        assert_ne!(c1, c2);
        assert!(c1.len() <= MAX_MONIKER_LENGTH);
        assert!(c2.len() <= MAX_MONIKER_LENGTH);
    }

    #[test]
    fn condense_is_deterministic() {
        let m = "b".repeat(200);
        assert_eq!(condense_moniker(&m), condense_moniker(&m));
    }
}

use rand::Rng;

/// Random `u32` used for uniquely-named test runs and data directories.
pub fn random_u32() -> u32 {
    rand::thread_rng().gen()
}

/// Random lowercase-letter string, used to give one-shot job containers
/// unique names.
pub fn rand_lower_case_string(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| rng.gen_range(b'a'..=b'z') as char).collect()
}

/// Sanitize a test name into a form accepted by Docker for container
/// names: `[a-zA-Z0-9][a-zA-Z0-9_.-]*`.
pub fn sanitize_container_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, c) in name.chars().enumerate() {
        let valid = c.is_ascii_alphanumeric() || (i > 0 && (c == '_' || c == '.' || c == '-'));
        out.push(if valid { c } else { '-' });
    }
    out
}

/// Condense a hostname to the 63-character DNS label limit, keeping the
/// head and tail of the original name.
pub fn condense_host_name(name: &str) -> String {
    const MAX: usize = 63;
    if name.len() <= MAX {
        return name.to_string();
    }
    format!("{}_{}", &name[..30], &name[name.len() - 30..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_slashes_in_test_names() {
        assert_eq!(
            sanitize_container_name("TestIbc/Transfer#1"),
            "TestIbc-Transfer-1"
        );
    }

    #[test]
    fn rand_string_has_requested_length() {
        for len in [1, 4, 16] {
            let s = rand_lower_case_string(len);
            assert_eq!(s.len(), len);
            assert!(s.chars().all(|c| c.is_ascii_lowercase()));
        }
    }

    #[test]
    fn condensed_host_names_fit_dns_label() {
        let long = "c".repeat(120);
        assert!(condense_host_name(&long).len() <= 63);
        assert_eq!(condense_host_name("node-1"), "node-1");
    }
}

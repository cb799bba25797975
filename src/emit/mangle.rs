use sha2::{Digest, Sha256};

use crate::sema::types::DataType;

/// Deterministically mangles an overloaded routine's name so the target
/// does not have to reproduce Pascal's own overload-resolution rules:
/// every call site is resolved to a concrete overload during analysis,
/// and the emitter just needs the same name both times it writes one.
/// A routine with exactly one overload keeps its bare (lowercased) name.
pub fn mangled_name(base_name: &str, params: &[DataType], overload_count: usize) -> String {
    let base = base_name.to_ascii_lowercase();
    if overload_count <= 1 {
        return base;
    }
    let signature = params
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let mut hasher = Sha256::new();
    hasher.update(base.as_bytes());
    hasher.update(b"(");
    hasher.update(signature.as_bytes());
    hasher.update(b")");
    let digest = hasher.finalize();
    format!("{base}_{:x}", digest)[..base.len() + 9].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_overload_keeps_bare_name() {
        assert_eq!(mangled_name("Foo", &[DataType::Integer], 1), "foo");
    }

    #[test]
    fn distinct_signatures_mangle_deterministically_and_differently() {
        let a = mangled_name("Foo", &[DataType::Integer], 2);
        let b = mangled_name("Foo", &[DataType::Real], 2);
        assert_ne!(a, b);
        assert_eq!(a, mangled_name("Foo", &[DataType::Integer], 2));
    }
}

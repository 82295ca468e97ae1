use crate::style::owned_css::OwnedDeclaration;
use std::collections::HashMap;

/// True iff both lists hold the same multiset of (property, value, important)
/// triples. Order is ignored and repeats are counted, not collapsed.
pub fn equal_as_sets(a: &[OwnedDeclaration], b: &[OwnedDeclaration]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut counts: HashMap<&OwnedDeclaration, isize> = HashMap::new();
    for decl in a {
        *counts.entry(decl).or_default() += 1;
    }
    for decl in b {
        *counts.entry(decl).or_default() -= 1;
    }
    counts.values().all(|count| *count == 0)
}

/// Multiset intersection of `a` and `b`, in `a`'s order. Each declaration of
/// `b` can be matched at most once.
pub fn common_ordered_subset(
    a: &[OwnedDeclaration],
    b: &[OwnedDeclaration],
) -> Vec<OwnedDeclaration> {
    let mut available: HashMap<&OwnedDeclaration, usize> = HashMap::new();
    for decl in b {
        *available.entry(decl).or_default() += 1;
    }
    a.iter()
        .filter(|decl| match available.get_mut(decl) {
            Some(left) if *left > 0 => {
                *left -= 1;
                true
            }
            _ => false,
        })
        .cloned()
        .collect()
}

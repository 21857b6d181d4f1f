//! Determinism utilities: stable ordering for everything that ends up in a
//! user-facing message, so two runs over the same inputs print the same bytes.

use std::collections::{BTreeMap, BTreeSet};

/// Lexicographically sorted, de-duplicated first `n` items.
pub fn sorted_sample<'a, I>(items: I, n: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let set: BTreeSet<&str> = items.into_iter().collect();
    set.into_iter().take(n).map(str::to_owned).collect()
}

/// Items occurring more than once, sorted, each listed once.
pub fn sorted_duplicates<'a, I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for it in items {
        *counts.entry(it).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|&(_, c)| c > 1)
        .map(|(k, _)| k.to_owned())
        .collect()
}

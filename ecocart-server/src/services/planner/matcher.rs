//! Shopping-list name resolution against the catalog
//!
//! Order of attempts: exact (case-sensitive), catalog name containing the
//! entry (case-insensitive), then closest edit distance within
//! `max(1, len / 5)`. Anything else is dropped; names are never invented.

use shared::models::Product;

pub fn resolve<'a>(entry: &str, catalog: &'a [Product]) -> Option<&'a Product> {
    let entry = entry.trim();
    if entry.is_empty() {
        return None;
    }

    if let Some(p) = catalog.iter().find(|p| p.name == entry) {
        return Some(p);
    }

    let needle = entry.to_lowercase();
    if let Some(p) = catalog
        .iter()
        .find(|p| p.name.to_lowercase().contains(&needle))
    {
        return Some(p);
    }

    let max_distance = (needle.chars().count() / 5).max(1);
    let mut best: Option<(usize, &Product)> = None;
    for product in catalog {
        let distance = edit_distance(&needle, &product.name.to_lowercase());
        if distance > max_distance {
            continue;
        }
        // Strict `<` keeps the first product in catalog order on ties
        if best.is_none_or(|(d, _)| distance < d) {
            best = Some((distance, product));
        }
    }
    best.map(|(_, p)| p)
}

/// Levenshtein distance over chars
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

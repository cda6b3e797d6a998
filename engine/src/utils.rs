// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use std::collections::HashMap;
use std::hash::Hash;

// Walk the shorter map and probe the longer one, so the number of lookups
// is bounded by the smaller row. Which side lands in the first slot follows
// the walk; the symmetric correlation math never notices.
pub(crate) fn common_keys_iter<'a, K, V>(
    a: &'a HashMap<K, V>,
    b: &'a HashMap<K, V>,
) -> impl Iterator<Item = (&'a V, &'a V)>
where
    K: Hash + Eq,
{
    let (shortest, longest) = if a.len() > b.len() { (b, a) } else { (a, b) };

    shortest
        .iter()
        .filter_map(move |(key, x)| longest.get(key).map(|y| (x, y)))
}

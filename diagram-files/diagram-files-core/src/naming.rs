//! Default names for files that have never been saved.

pub const DEFAULT_NAME_PREFIX: &str = "Untitled";

/// First `Untitled (n)` name, counting from 1, that is not in `existing`.
///
/// Only the given listing is consulted. A listing that is stale relative to
/// the store can produce a name that is already taken there.
pub fn default_file_name(existing: &[String]) -> String {
    let mut n: u64 = 1;
    loop {
        let candidate = format!("{} ({})", DEFAULT_NAME_PREFIX, n);
        if !existing.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

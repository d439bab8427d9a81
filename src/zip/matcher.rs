//! Knuth-Morris-Pratt byte pattern search.
//!
//! Used to find the end-of-central-directory signature inside the tail
//! window of a remote archive. Runs in O(|haystack| + |needle|).

/// Find the first occurrence of `needle` in `haystack`.
///
/// Returns the lowest starting index, or `None` when `haystack` is empty
/// or contains no occurrence.
pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if haystack.is_empty() || needle.is_empty() {
        return None;
    }

    let failure = failure_table(needle);
    let mut j = 0;

    for (i, &byte) in haystack.iter().enumerate() {
        while j > 0 && needle[j] != byte {
            j = failure[j - 1];
        }
        if needle[j] == byte {
            j += 1;
        }
        if j == needle.len() {
            return Some(i + 1 - needle.len());
        }
    }

    None
}

/// Compute the KMP failure function by matching the pattern against itself.
fn failure_table(needle: &[u8]) -> Vec<usize> {
    let mut failure = vec![0usize; needle.len()];
    let mut j = 0;

    for i in 1..needle.len() {
        while j > 0 && needle[j] != needle[i] {
            j = failure[j - 1];
        }
        if needle[j] == needle[i] {
            j += 1;
        }
        failure[i] = j;
    }

    failure
}

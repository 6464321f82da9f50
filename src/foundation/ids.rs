/// Deterministic clip id source owned by one editor instance.
///
/// Ids have the form `<prefix>-<n>`. The counter only moves forward, so an id is never handed
/// out twice by the same generator even after the clip it named is removed.
#[derive(Clone, Debug, Default)]
pub struct ClipIdGen {
    counter: u64,
}

impl ClipIdGen {
    /// Create a generator starting at `1`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the next id for `prefix` that `is_taken` does not reject.
    pub fn next(&mut self, prefix: &str, is_taken: impl Fn(&str) -> bool) -> String {
        loop {
            self.counter += 1;
            let id = format!("{prefix}-{}", self.counter);
            if !is_taken(&id) {
                return id;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/ids.rs"]
mod tests;

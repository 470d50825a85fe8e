/// Cyclic sequence over the parts `0..num_parts`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Robin {
    num_parts: usize,
}

impl Robin {
    pub(crate) fn new(num_parts: usize) -> Self {
        Self { num_parts }
    }

    /// Every part except `from_part`, starting right after it and wrapping
    /// around.
    pub(crate) fn exclude(&self, from_part: usize) -> impl Iterator<Item = usize> {
        debug_assert!(from_part < self.num_parts);
        let num_parts = self.num_parts;
        (1..num_parts).map(move |step| (from_part + step) % num_parts)
    }
}

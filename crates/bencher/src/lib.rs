//! Shared fixtures for the micro-http-client benchmarks.

/// A named raw response used as benchmark input.
#[derive(Debug, Copy, Clone)]
pub struct Fixture {
    name: &'static str,
    size: FixtureSize,
    content: &'static str,
}

impl Fixture {
    pub const fn new(name: &'static str, size: FixtureSize, content: &'static str) -> Self {
        Self { name, size, content }
    }

    pub const fn small(name: &'static str, content: &'static str) -> Self {
        Self::new(name, FixtureSize::Small, content)
    }

    pub const fn large(name: &'static str, content: &'static str) -> Self {
        Self::new(name, FixtureSize::Large, content)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn size(&self) -> FixtureSize {
        self.size
    }

    pub fn content(&self) -> &'static str {
        self.content
    }

    /// Byte count of the whole response, head and body.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FixtureSize {
    Small,
    Large,
}

//! Runtime capability detection.

use std::fmt;

/// Answers whether optional runtimes are usable in this process.
pub trait CapabilityProbe: Send + Sync + fmt::Debug {
    /// Whether the embedded expression interpreter can be used.
    fn embedded_runtime_available(&self) -> bool;
}

/// Capability set decided at build time, overridable at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    embedded_runtime: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::detect()
    }
}

impl Capabilities {
    /// Capabilities compiled into this build.
    pub fn detect() -> Self {
        Self {
            embedded_runtime: cfg!(feature = "embedded-el"),
        }
    }

    /// No optional runtimes.
    pub fn none() -> Self {
        Self {
            embedded_runtime: false,
        }
    }

    /// Override embedded runtime availability.
    ///
    /// Enabling it in a build without the `embedded-el` feature has no
    /// effect: preparation still reports the runtime as unavailable.
    pub fn with_embedded_runtime(mut self, available: bool) -> Self {
        self.embedded_runtime = available;
        self
    }
}

impl CapabilityProbe for Capabilities {
    fn embedded_runtime_available(&self) -> bool {
        self.embedded_runtime
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_follows_feature() {
        assert_eq!(
            Capabilities::detect().embedded_runtime_available(),
            cfg!(feature = "embedded-el")
        );
    }

    #[test]
    fn test_override() {
        let caps = Capabilities::default().with_embedded_runtime(false);
        assert!(!caps.embedded_runtime_available());
        assert_eq!(caps, Capabilities::none());
    }
}

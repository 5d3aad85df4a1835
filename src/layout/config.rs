//! Layout configuration and fixed geometry bounds.
//!
//! There is no process-wide state in this crate: every layout pass receives its
//! [`LayoutConfig`] explicitly, so two domains with different reference widths can be laid out
//! side by side.

use crate::{schema::DEFAULT_REFERENCE_WIDTH, validation::ValidationConfig, Error, Result};

/// Largest block an entity level may occupy, in bytes
pub const MAX_BLOCK_LENGTH: u32 = 1024;

/// Largest single field (and vector total), in bytes
pub const MAX_FIELD_LENGTH: u32 = 1024;

/// Smallest fixed length override for string and binary members
pub const MIN_FIXED_LENGTH: u32 = 4;

/// Deepest class height a structure code can describe
pub const MAX_CLASS_HEIGHT: u32 = 15;

/// Configuration of one layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutConfig {
    /// Width of an indirect reference (string, binary and entity-reference members)
    pub reference_width: u32,

    /// Validate entities on the `rayon` thread pool
    pub parallel: bool,

    /// Which validation passes run after layout
    pub validation: ValidationConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            reference_width: DEFAULT_REFERENCE_WIDTH,
            parallel: true,
            validation: ValidationConfig::default(),
        }
    }
}

impl LayoutConfig {
    /// Creates the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the reference width
    #[must_use]
    pub fn with_reference_width(mut self, reference_width: u32) -> Self {
        self.reference_width = reference_width;
        self
    }

    /// Sets the validation configuration
    #[must_use]
    pub fn with_validation(mut self, validation: ValidationConfig) -> Self {
        self.validation = validation;
        self
    }

    /// Validates entities on the calling thread only
    #[must_use]
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Checks that the configuration can produce valid layouts.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] if the reference width is not a power of two within
    /// [`MIN_FIXED_LENGTH`]..=[`MAX_FIELD_LENGTH`].
    pub fn validate(&self) -> Result<()> {
        if !self.reference_width.is_power_of_two()
            || !(MIN_FIXED_LENGTH..=MAX_FIELD_LENGTH).contains(&self.reference_width)
        {
            return Err(Error::InvalidConfig(format!(
                "reference width {} must be a power of two between {} and {}",
                self.reference_width, MIN_FIXED_LENGTH, MAX_FIELD_LENGTH
            )));
        }

        Ok(())
    }
}

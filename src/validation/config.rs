//! Validation configuration for the layout pass
//!
//! Every check category can be switched off independently. Layout itself always runs; the
//! switches only decide which defects get reported.

/// Configuration of the validation that follows a layout pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ValidationConfig {
    /// Enable entity-level checks (layout declaration, block length, class height, base chain)
    pub enable_entity_validation: bool,

    /// Enable member-level checks (nullability, offsets, lengths, capacities, sequences)
    pub enable_member_validation: bool,

    /// Enable the whole-block check (bounds, alignment and overlap against the ownership map)
    pub enable_block_validation: bool,

    /// Enable entity identifier checks, including domain-wide uniqueness
    pub enable_id_validation: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enable_entity_validation: true,
            enable_member_validation: true,
            enable_block_validation: true,
            enable_id_validation: true,
        }
    }
}

impl ValidationConfig {
    /// Creates a disabled validation configuration
    ///
    /// **Warning**: layouts are reported valid whatever they contain. Use only for declarations
    /// that were validated before.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enable_entity_validation: false,
            enable_member_validation: false,
            enable_block_validation: false,
            enable_id_validation: false,
        }
    }

    /// Creates a minimal validation configuration
    ///
    /// Only the whole-block check runs, which still guarantees that no two members overlap and
    /// that every member lies inside its block.
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            enable_entity_validation: false,
            enable_member_validation: false,
            enable_block_validation: true,
            enable_id_validation: false,
        }
    }

    /// Creates a comprehensive validation configuration with every check enabled
    #[must_use]
    pub fn comprehensive() -> Self {
        Self::default()
    }

    /// Returns true if at least one check category is enabled
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enable_entity_validation
            || self.enable_member_validation
            || self.enable_block_validation
            || self.enable_id_validation
    }
}

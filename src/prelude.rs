//! # blocklayout Prelude
//!
//! This module provides a convenient prelude for the most commonly used types of the
//! blocklayout library. Import it to declare a domain, lay it out and inspect the result.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all blocklayout operations
pub use crate::Error;

/// The result type used throughout blocklayout
pub use crate::Result;

// ================================================================================================
// Declarations
// ================================================================================================

/// The entity registry of one generation run
pub use crate::schema::Domain;

/// Entity declarations and their attributes
pub use crate::schema::{Entity, EntityId, EntityRc, EntityRef, LayoutMethod};

/// Member declarations and their types
pub use crate::schema::{Endianness, Member, MemberKind, MemberType, ScalarType};

/// Declaration positions for diagnostics
pub use crate::schema::SourceLocation;

// ================================================================================================
// Layout
// ================================================================================================

/// Running a layout pass
pub use crate::layout::{layout_domain, DomainLayout, LayoutConfig};

/// Layout results
pub use crate::layout::{EntityLayout, MemberLayout};

/// Structure codes
pub use crate::layout::{StructureCode, StructureCodeBuilder};

// ================================================================================================
// Validation and Diagnostics
// ================================================================================================

/// Validation switches
pub use crate::validation::ValidationConfig;

/// Diagnostics of a layout pass
pub use crate::diagnostics::{
    Diagnostic, DiagnosticCategory, DiagnosticCode, DiagnosticSeverity, Diagnostics,
};

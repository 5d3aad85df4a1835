//! # Declaration Model
//!
//! The types a front end fills in while it visits entity and member declarations, and the
//! [`Domain`] registry that owns them.
//!
//! ## Overview
//!
//! - [`ScalarType`], [`MemberType`] and [`MemberKind`] describe what a member stores, with
//!   [`ScalarType::width`] acting as the field width table
//! - [`Member`] is one field declaration: sequence, type, nullability and the optional
//!   fixed-length, capacity, offset and endianness overrides
//! - [`Entity`] is one record type: identifier, layout method, declared block length, base
//!   link and its members
//! - [`Domain`] is the registry holding every entity of one generation run
//!
//! ## Registration
//!
//! Everything in this module is built for incremental, concurrent registration. Entities and
//! members are created with get-or-create semantics and never overwritten; declaration
//! attributes are set once. Nothing here computes geometry, that is the job of
//! [`crate::layout`], which runs once the domain is complete.
//!
//! ## Examples
//!
//! ```rust
//! use blocklayout::{Domain, LayoutMethod, Member, MemberType, ScalarType};
//!
//! let domain = Domain::new("Demo");
//! let person = domain.get_or_create("Demo", "Person");
//! person.set_id(1)?;
//! person.set_layout(LayoutMethod::Linear)?;
//! person.add_member(Member::new("age", 1, ScalarType::Int32))?;
//! person.add_member(Member::new("name", 2, MemberType::String).nullable())?;
//!
//! assert_eq!(person.member_count(), 2);
//! # Ok::<(), blocklayout::Error>(())
//! ```

mod entity;
mod member;
mod primitives;
mod registry;

use std::fmt;

pub use entity::{Entity, EntityId, EntityRc, EntityRef, LayoutMethod};
pub use member::{Endianness, Member, MemberRc};
pub use primitives::{MemberKind, MemberType, ScalarType, DEFAULT_REFERENCE_WIDTH};
pub use registry::{Ancestry, Domain, DEFAULT_MAX_INHERITANCE_DEPTH};

/// Position of a declaration in the user's sources.
///
/// Attached to diagnostics so a host can report them as compiler errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// Path of the source file
    pub file: String,
    /// 1-based line
    pub line: u32,
    /// 1-based column
    pub column: u32,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        SourceLocation {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

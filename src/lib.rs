// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # blocklayout
//!
//! Fixed, self-describing binary block layouts for hierarchies of entity record types.
//!
//! Front ends declare entities (single inheritance, a layout method, an identifier) and their
//! members (sequence, type, nullability and size overrides). `blocklayout` then assigns every
//! member a byte offset and length inside a power-of-two block, encodes the block sizes of the
//! whole inheritance chain into one integer, the structure code, and validates the result so
//! that generated accessors can read and write members directly at their offsets.
//!
//! ## Features
//!
//! - **Concurrent registration** - Entities and members are registered get-or-create from any
//!   number of threads, never overwritten
//! - **Two layout methods** - Linear (automatic, naturally aligned, order preserving) and
//!   explicit (caller supplied offsets)
//! - **Structure codes** - One `u64` describes the block length of every level of an
//!   inheritance chain, bit-exact with the block header wire format
//! - **Complete diagnostics** - Every defect of every entity is reported in one pass, with
//!   stable codes and source locations; valid sibling entities stay usable
//!
//! ## Quick Start
//!
//! ```rust
//! use blocklayout::prelude::*;
//!
//! let domain = Domain::new("Shop");
//!
//! let item = domain.get_or_create("Shop", "Item");
//! item.set_id(1)?;
//! item.set_layout(LayoutMethod::Linear)?;
//! item.add_member(Member::new("price", 1, ScalarType::Decimal))?;
//! item.add_member(Member::new("name", 2, MemberType::String).nullable())?;
//!
//! let book = domain.get_or_create("Shop", "Book");
//! book.set_id(2)?;
//! book.set_layout(LayoutMethod::Linear)?;
//! book.set_base(&item)?;
//! book.add_member(Member::new("pages", 1, ScalarType::Int32))?;
//!
//! let result = layout_domain(&domain, &LayoutConfig::default())?;
//! assert!(result.is_valid());
//!
//! let book = result.get("Shop.Book").expect("laid out");
//! assert_eq!(book.class_height, Some(2));
//! assert_eq!(book.structure_code.block_length(1), 64);
//! assert_eq!(book.structure_code.block_length(2), 4);
//! # Ok::<(), blocklayout::Error>(())
//! ```
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade and never installs a logger: `debug` per laid out
//! entity, `trace` per member placement, `warn` for entities with layout errors and an `info`
//! summary per domain.
//!
//! ## Error Handling
//!
//! API misuse (conflicting re-declarations, an invalid configuration, checked structure code
//! composition) returns [`Result<T, Error>`](Result). Defects in the declarations themselves
//! are never errors; they are collected as [`diagnostics::Diagnostic`]s:
//!
//! ```rust
//! use blocklayout::prelude::*;
//!
//! let domain = Domain::new("Demo");
//! let broken = domain.get_or_create("Demo", "Broken");
//! broken.set_id(1)?;
//! broken.set_layout(LayoutMethod::Explicit)?;
//! broken.set_block_length(8)?;
//! broken.add_member(Member::new("a", 1, ScalarType::Int64).with_offset(4))?;
//!
//! let result = layout_domain(&domain, &LayoutConfig::default())?;
//! for diagnostic in result.diagnostics().iter() {
//!     println!("{diagnostic}");
//! }
//! assert!(!result.is_valid());
//! # Ok::<(), blocklayout::Error>(())
//! ```
#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust
/// use blocklayout::prelude::*;
///
/// let domain = Domain::new("Demo");
/// let result = layout_domain(&domain, &LayoutConfig::default())?;
/// assert!(result.is_empty());
/// # Ok::<(), blocklayout::Error>(())
/// ```
pub mod prelude;

/// Diagnostics produced by the validation of a layout pass.
///
/// See [`diagnostics::Diagnostics`] for the thread-safe container and
/// [`diagnostics::DiagnosticCode`] for the stable check identifiers.
pub mod diagnostics;

/// Declaration model: entities, members, member types and the domain registry.
pub mod schema;

/// The layout engine: member placement, block lengths and structure codes.
pub mod layout;

/// Validators for computed layouts and the orchestrator that runs them.
pub mod validation;

/// `blocklayout` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always
/// [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `blocklayout` Error type
///
/// The main error type for all operations of this crate. See [`Error`] for the variants.
pub use error::Error;

pub use layout::{
    layout_domain, DomainLayout, EntityLayout, LayoutConfig, MemberLayout, StructureCode,
    StructureCodeBuilder,
};
pub use schema::{
    Domain, Endianness, Entity, EntityId, EntityRc, LayoutMethod, Member, MemberKind, MemberType,
    ScalarType, SourceLocation,
};
pub use validation::ValidationConfig;

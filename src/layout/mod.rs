//! # Layout Engine
//!
//! Computes the binary block layout of every entity in a [`crate::Domain`]: member offsets and
//! lengths, the power-of-two block length, and the structure code describing the block sizes
//! of the whole inheritance chain.
//!
//! ## Pipeline
//!
//! 1. [`layout_domain`] orders the entities by class height (ancestors first)
//! 2. [`EntityLayout::auto_layout_members`] places the members of one entity, either
//!    [`layout_members_linear`] or [`layout_members_explicit`], and composes its
//!    [`StructureCode`]
//! 3. [`crate::validation::Orchestrator`] checks every result and collects diagnostics
//!
//! ## Linear Layout
//!
//! Members are placed in sequence order. Each member is aligned to a multiple of its total
//! length and the block doubles until it covers every member, so the block length is the
//! smallest power of two that fits:
//!
//! ```text
//! #1 double  -> [0, 8)
//! #2 bool    -> [8, 9)
//! #3 long    -> [16, 24)   (skips 9..16 for alignment)
//! block length 32
//! ```
//!
//! ## Examples
//!
//! ```rust
//! use blocklayout::{layout_domain, Domain, LayoutConfig, LayoutMethod, Member, ScalarType};
//!
//! let domain = Domain::new("Demo");
//! let sample = domain.get_or_create("Demo", "Sample");
//! sample.set_id(1)?;
//! sample.set_layout(LayoutMethod::Linear)?;
//! sample.add_member(Member::new("value", 1, ScalarType::Double))?;
//! sample.add_member(Member::new("flag", 2, ScalarType::Bool))?;
//! sample.add_member(Member::new("count", 3, ScalarType::Int64))?;
//!
//! let result = layout_domain(&domain, &LayoutConfig::default())?;
//! let layout = result.get("Demo.Sample").expect("laid out");
//!
//! assert!(result.is_valid());
//! assert_eq!(layout.block_length, 32);
//! assert_eq!(layout.member("count").map(|m| m.field_offset), Some(16));
//! # Ok::<(), blocklayout::Error>(())
//! ```

mod config;
mod domain;
mod entity;
mod member;
mod structure;

pub use config::{
    LayoutConfig, MAX_BLOCK_LENGTH, MAX_CLASS_HEIGHT, MAX_FIELD_LENGTH, MIN_FIXED_LENGTH,
};
pub use domain::{layout_domain, DomainLayout};
pub use entity::EntityLayout;
pub use member::{
    field_length, layout_members_explicit, layout_members_linear, LinearLayout, MemberLayout,
};
pub use structure::{
    block_size_code, block_size_from_code, StructureCode, StructureCodeBuilder, BLOCK_SIZES,
    MAX_BLOCK_SIZE_CODE,
};

//! Member declarations.
//!
//! A [`Member`] is one field of an entity as the front end declared it. Members are immutable
//! once registered; computed geometry lives in [`crate::layout::MemberLayout`].

use std::{fmt, sync::Arc};

use crate::schema::{MemberKind, MemberType, SourceLocation};

/// A reference-counted member declaration
pub type MemberRc = Arc<Member>;

/// Byte order an accessor should use for a member.
///
/// The layout engine does not read or write bytes; the value is carried through for emitters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Endianness {
    /// Least significant byte first
    #[default]
    Little,
    /// Most significant byte first
    Big,
}

/// A member declaration, exclusively owned by its entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Name, unique within the owning entity
    pub name: String,
    /// 1-based position; the members of an entity form a contiguous 1..N run
    pub sequence: u32,
    /// The declared type; for vectors the element type
    pub ty: MemberType,
    /// Whether the member may hold no value
    pub nullable: bool,
    /// Width override for string and binary members
    pub fixed_length: Option<u32>,
    /// Element count; makes the member a vector
    pub array_capacity: Option<u32>,
    /// Caller supplied offset, used by explicit layout
    pub offset: Option<i32>,
    /// Byte order requested for the accessor
    pub endianness: Endianness,
    /// Where the member was declared
    pub location: Option<SourceLocation>,
}

impl Member {
    /// Create a new member declaration with default attributes.
    ///
    /// ## Arguments
    /// * `name`     - Name of the member
    /// * `sequence` - 1-based sequence number
    /// * `ty`       - The declared type
    pub fn new(name: impl Into<String>, sequence: u32, ty: impl Into<MemberType>) -> Self {
        Member {
            name: name.into(),
            sequence,
            ty: ty.into(),
            nullable: false,
            fixed_length: None,
            array_capacity: None,
            offset: None,
            endianness: Endianness::Little,
            location: None,
        }
    }

    /// Marks the member as nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Sets the fixed length override.
    #[must_use]
    pub fn with_fixed_length(mut self, fixed_length: u32) -> Self {
        self.fixed_length = Some(fixed_length);
        self
    }

    /// Sets the array capacity, turning the member into a vector.
    #[must_use]
    pub fn with_array_capacity(mut self, capacity: u32) -> Self {
        self.array_capacity = Some(capacity);
        self
    }

    /// Sets the explicit offset.
    #[must_use]
    pub fn with_offset(mut self, offset: i32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Sets the byte order.
    #[must_use]
    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    /// Sets the declaration's source location.
    #[must_use]
    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Kind of the member, given its resolved type.
    ///
    /// A member with an array capacity is a [`MemberKind::Vector`] whatever its element type.
    #[must_use]
    pub fn kind_of(&self, resolved: &MemberType) -> MemberKind {
        if self.array_capacity.is_some() {
            MemberKind::Vector
        } else {
            resolved.kind()
        }
    }

    /// Kind of the member using its declared type.
    #[must_use]
    pub fn kind(&self) -> MemberKind {
        self.kind_of(&self.ty)
    }

    /// Compares the declared attributes, ignoring the source location.
    ///
    /// The same declaration may be visited more than once by the front end; only a differing
    /// declaration is a conflict.
    #[must_use]
    pub fn same_declaration(&self, other: &Member) -> bool {
        self.name == other.name
            && self.sequence == other.sequence
            && self.ty == other.ty
            && self.nullable == other.nullable
            && self.fixed_length == other.fixed_length
            && self.array_capacity == other.array_capacity
            && self.offset == other.offset
            && self.endianness == other.endianness
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}: {}", self.sequence, self.name, self.ty)?;
        if let Some(capacity) = self.array_capacity {
            write!(f, "[{capacity}]")?;
        }
        if self.nullable {
            write!(f, "?")?;
        }
        Ok(())
    }
}

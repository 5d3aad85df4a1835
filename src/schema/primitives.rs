//! Member types and the field width table.
//!
//! [`ScalarType`] lists the native types a member can store inline, and
//! [`ScalarType::width`] is the fixed table mapping each of them to its natural width.
//! String, binary and entity-reference members never store their payload inline: they hold an
//! indirect reference of a fixed width (see [`crate::LayoutConfig::reference_width`]), which a
//! member may widen for strings and blobs with a fixed length override.
//!
//! [`MemberType`] is what a declaration names; after resolution against the domain it yields
//! a [`MemberKind`], the classification the layout and validation code work with.

use std::fmt;

use strum::{EnumCount, EnumIter, IntoEnumIterator};

/// Default width of an indirect reference, in bytes (a 256-bit content address).
pub const DEFAULT_REFERENCE_WIDTH: u32 = 32;

/// Native types with a fixed inline width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumCount)]
pub enum ScalarType {
    /// `bool` - 1 byte
    Bool,
    /// `u8` - 1 byte
    Byte,
    /// `i8` - 1 byte
    SByte,
    /// UTF-16 code unit - 2 bytes
    Char,
    /// `i16` - 2 bytes
    Int16,
    /// `u16` - 2 bytes
    UInt16,
    /// IEEE half precision - 2 bytes
    Half,
    /// `i32` - 4 bytes
    Int32,
    /// `u32` - 4 bytes
    UInt32,
    /// `f32` - 4 bytes
    Single,
    /// `i64` - 8 bytes
    Int64,
    /// `u64` - 8 bytes
    UInt64,
    /// `f64` - 8 bytes
    Double,
    /// Tick based timestamp - 8 bytes
    DateTime,
    /// Tick based duration - 8 bytes
    TimeSpan,
    /// `i128` - 16 bytes
    Int128,
    /// `u128` - 16 bytes
    UInt128,
    /// 128-bit GUID - 16 bytes
    Guid,
    /// 128-bit decimal - 16 bytes
    Decimal,
}

impl ScalarType {
    /// Natural width of the type in bytes.
    #[must_use]
    pub fn width(&self) -> u32 {
        match self {
            ScalarType::Bool | ScalarType::Byte | ScalarType::SByte => 1,
            ScalarType::Char | ScalarType::Int16 | ScalarType::UInt16 | ScalarType::Half => 2,
            ScalarType::Int32 | ScalarType::UInt32 | ScalarType::Single => 4,
            ScalarType::Int64
            | ScalarType::UInt64
            | ScalarType::Double
            | ScalarType::DateTime
            | ScalarType::TimeSpan => 8,
            ScalarType::Int128 | ScalarType::UInt128 | ScalarType::Guid | ScalarType::Decimal => {
                16
            }
        }
    }

    /// Canonical name of the type.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::Bool => "Boolean",
            ScalarType::Byte => "Byte",
            ScalarType::SByte => "SByte",
            ScalarType::Char => "Char",
            ScalarType::Int16 => "Int16",
            ScalarType::UInt16 => "UInt16",
            ScalarType::Half => "Half",
            ScalarType::Int32 => "Int32",
            ScalarType::UInt32 => "UInt32",
            ScalarType::Single => "Single",
            ScalarType::Int64 => "Int64",
            ScalarType::UInt64 => "UInt64",
            ScalarType::Double => "Double",
            ScalarType::DateTime => "DateTime",
            ScalarType::TimeSpan => "TimeSpan",
            ScalarType::Int128 => "Int128",
            ScalarType::UInt128 => "UInt128",
            ScalarType::Guid => "Guid",
            ScalarType::Decimal => "Decimal",
        }
    }

    /// Maps a declared type name onto a scalar type.
    ///
    /// Accepts the canonical names (optionally `System.` qualified) and the usual keyword
    /// spellings (`bool`, `int`, `long`, `double`, `i64`, ...). Returns `None` for anything
    /// else, including `string` and `Octets`, which are not scalars.
    #[must_use]
    pub fn from_name(name: &str) -> Option<ScalarType> {
        let name = name.strip_prefix("System.").unwrap_or(name);
        let scalar = match name {
            "bool" => ScalarType::Bool,
            "byte" | "u8" => ScalarType::Byte,
            "sbyte" | "i8" => ScalarType::SByte,
            "char" => ScalarType::Char,
            "short" | "i16" => ScalarType::Int16,
            "ushort" | "u16" => ScalarType::UInt16,
            "half" | "f16" => ScalarType::Half,
            "int" | "i32" => ScalarType::Int32,
            "uint" | "u32" => ScalarType::UInt32,
            "float" | "f32" => ScalarType::Single,
            "long" | "i64" => ScalarType::Int64,
            "ulong" | "u64" => ScalarType::UInt64,
            "double" | "f64" => ScalarType::Double,
            "i128" => ScalarType::Int128,
            "u128" => ScalarType::UInt128,
            "decimal" => ScalarType::Decimal,
            _ => return ScalarType::iter().find(|scalar| scalar.name() == name),
        };
        Some(scalar)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The type a member declaration names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MemberType {
    /// A native type stored inline
    Scalar(ScalarType),
    /// Text payload, stored behind a reference
    String,
    /// Binary blob ("Octets"), stored behind a reference
    Binary,
    /// Reference to another entity of the domain, by name
    Entity(String),
    /// A type name the front end could not classify; resolved against the domain
    Named(String),
}

impl MemberType {
    /// Parses a declared type name.
    ///
    /// Scalars, `string` and `Octets` are recognised directly, anything else becomes
    /// [`MemberType::Named`] and is resolved once all entities are known.
    #[must_use]
    pub fn parse(name: &str) -> MemberType {
        if let Some(scalar) = ScalarType::from_name(name) {
            return MemberType::Scalar(scalar);
        }

        match name.strip_prefix("System.").unwrap_or(name) {
            "string" | "String" => MemberType::String,
            "Octets" | "octets" | "bytes" | "byte[]" => MemberType::Binary,
            _ => MemberType::Named(name.to_string()),
        }
    }

    /// The kind this type stands for when it is not a vector.
    ///
    /// Unresolved names classify as entity references, which is what they become when the
    /// domain knows them. Unknown names are reported by validation through their zero width.
    #[must_use]
    pub fn kind(&self) -> MemberKind {
        match self {
            MemberType::Scalar(_) => MemberKind::Scalar,
            MemberType::String => MemberKind::String,
            MemberType::Binary => MemberKind::Binary,
            MemberType::Entity(_) | MemberType::Named(_) => MemberKind::EntityRef,
        }
    }

    /// Width of one element of this type, before any fixed length override.
    ///
    /// Unresolved names have no width and return 0.
    #[must_use]
    pub fn width(&self, reference_width: u32) -> u32 {
        match self {
            MemberType::Scalar(scalar) => scalar.width(),
            MemberType::String | MemberType::Binary | MemberType::Entity(_) => reference_width,
            MemberType::Named(_) => 0,
        }
    }

    /// Returns true for types stored behind a reference.
    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            MemberType::String | MemberType::Binary | MemberType::Entity(_)
        )
    }
}

impl From<ScalarType> for MemberType {
    fn from(scalar: ScalarType) -> Self {
        MemberType::Scalar(scalar)
    }
}

impl fmt::Display for MemberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberType::Scalar(scalar) => write!(f, "{scalar}"),
            MemberType::String => write!(f, "String"),
            MemberType::Binary => write!(f, "Octets"),
            MemberType::Entity(name) | MemberType::Named(name) => write!(f, "{name}"),
        }
    }
}

/// Classification of a member for layout purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum MemberKind {
    /// Native value stored inline
    Scalar,
    /// Reference to a text payload
    String,
    /// Reference to a binary payload
    Binary,
    /// Reference to another entity
    EntityRef,
    /// Fixed capacity array of elements
    Vector,
}

impl MemberKind {
    /// Returns true if members of this kind may be declared nullable.
    #[must_use]
    pub fn allows_null(&self) -> bool {
        matches!(
            self,
            MemberKind::String | MemberKind::Binary | MemberKind::EntityRef
        )
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::Scalar => write!(f, "Scalar"),
            MemberKind::String => write!(f, "String"),
            MemberKind::Binary => write!(f, "Binary"),
            MemberKind::EntityRef => write!(f, "EntityRef"),
            MemberKind::Vector => write!(f, "Vector"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_widths() {
        assert_eq!(ScalarType::Bool.width(), 1);
        assert_eq!(ScalarType::Byte.width(), 1);
        assert_eq!(ScalarType::Char.width(), 2);
        assert_eq!(ScalarType::Half.width(), 2);
        assert_eq!(ScalarType::Int32.width(), 4);
        assert_eq!(ScalarType::Single.width(), 4);
        assert_eq!(ScalarType::Int64.width(), 8);
        assert_eq!(ScalarType::Double.width(), 8);
        assert_eq!(ScalarType::DateTime.width(), 8);
        assert_eq!(ScalarType::Guid.width(), 16);
        assert_eq!(ScalarType::Decimal.width(), 16);
    }

    #[test]
    fn test_all_widths_are_natural() {
        for scalar in ScalarType::iter() {
            let width = scalar.width();
            assert!(
                width.is_power_of_two() && width <= 16,
                "{scalar} has width {width}"
            );
        }
    }

    #[test]
    fn test_scalar_from_name() {
        assert_eq!(ScalarType::from_name("double"), Some(ScalarType::Double));
        assert_eq!(ScalarType::from_name("bool"), Some(ScalarType::Bool));
        assert_eq!(ScalarType::from_name("long"), Some(ScalarType::Int64));
        assert_eq!(ScalarType::from_name("System.Int64"), Some(ScalarType::Int64));
        assert_eq!(ScalarType::from_name("Guid"), Some(ScalarType::Guid));
        assert_eq!(ScalarType::from_name("u16"), Some(ScalarType::UInt16));
        assert_eq!(ScalarType::from_name("string"), None);
        assert_eq!(ScalarType::from_name("Customer"), None);
    }

    #[test]
    fn test_canonical_names_roundtrip() {
        for scalar in ScalarType::iter() {
            assert_eq!(ScalarType::from_name(scalar.name()), Some(scalar));
        }
        assert_eq!(ScalarType::COUNT, 19);
    }

    #[test]
    fn test_member_type_parse() {
        assert_eq!(
            MemberType::parse("double"),
            MemberType::Scalar(ScalarType::Double)
        );
        assert_eq!(MemberType::parse("string"), MemberType::String);
        assert_eq!(MemberType::parse("System.String"), MemberType::String);
        assert_eq!(MemberType::parse("Octets"), MemberType::Binary);
        assert_eq!(
            MemberType::parse("Customer"),
            MemberType::Named("Customer".to_string())
        );
    }

    #[test]
    fn test_reference_width() {
        assert_eq!(MemberType::String.width(DEFAULT_REFERENCE_WIDTH), 32);
        assert_eq!(MemberType::Binary.width(DEFAULT_REFERENCE_WIDTH), 32);
        assert_eq!(
            MemberType::Entity("Node".to_string()).width(DEFAULT_REFERENCE_WIDTH),
            32
        );
        assert_eq!(MemberType::String.width(16), 16);
        assert_eq!(MemberType::Named("Nope".to_string()).width(32), 0);
    }

    #[test]
    fn test_kinds_and_nullability() {
        assert_eq!(MemberType::String.kind(), MemberKind::String);
        assert_eq!(MemberType::Binary.kind(), MemberKind::Binary);
        assert_eq!(
            MemberType::Entity("Node".to_string()).kind(),
            MemberKind::EntityRef
        );
        assert!(MemberKind::String.allows_null());
        assert!(MemberKind::EntityRef.allows_null());
        assert!(!MemberKind::Scalar.allows_null());
        assert!(!MemberKind::Vector.allows_null());
    }
}

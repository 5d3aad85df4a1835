use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Layout defects found in user declarations (overlapping members, bad sizes, broken inheritance
/// chains) are *not* reported through this type. Those are collected as
/// [`crate::diagnostics::Diagnostic`] entries so that a single pass can surface every problem at
/// once. `Error` covers misuse of the API itself: conflicting re-declarations, invalid
/// configuration, and checked structure-code composition.
///
/// # Error Categories
///
/// ## Registration Errors
/// - [`Error::DeclarationConflict`] - A second declaration disagrees with the registered one
/// - [`Error::EntityNotFound`] - Lookup of an entity that was never registered
///
/// ## Structure Code Errors
/// - [`Error::StructureLevelOverlap`] - A class-height level was written twice
/// - [`Error::ClassHeightOutOfRange`] - A class height that has no nibble in the code
///
/// ## General Errors
/// - [`Error::Malformed`] - Internal inconsistency, carries the source location
/// - [`Error::InvalidConfig`] - A [`crate::LayoutConfig`] failed validation
///
/// # Examples
///
/// ```rust
/// use blocklayout::{Error, StructureCodeBuilder};
///
/// let mut builder = StructureCodeBuilder::new();
/// builder.add_inner_block(1, 16)?;
///
/// match builder.add_inner_block(1, 64) {
///     Err(Error::StructureLevelOverlap(height)) => assert_eq!(height, 1),
///     other => panic!("unexpected result: {other:?}"),
/// }
/// # Ok::<(), blocklayout::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// Internal data is inconsistent.
    ///
    /// The error includes the source location where the malformation was detected for
    /// debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An entity or member was declared twice with different attributes.
    ///
    /// Registration is get-or-create: the first declaration wins and is never overwritten.
    /// Repeating an identical declaration is accepted silently, a differing one ends up here.
    #[error("Conflicting declaration of '{name}': {message}")]
    DeclarationConflict {
        /// Full name of the entity, or `Entity.member` for members
        name: String,
        /// What differs between the two declarations
        message: String,
    },

    /// No entity with the given full name is registered in the domain.
    #[error("Entity '{0}' is not registered")]
    EntityNotFound(String),

    /// A structure-code level was composed twice.
    ///
    /// Each class-height nibble of a structure code is written exactly once, from root to
    /// leaf. The associated value is the offending class height.
    #[error("Structure code level {0} is already set")]
    StructureLevelOverlap(u8),

    /// The class height has no nibble in a structure code (valid heights are 1..=15).
    #[error("Class height {0} is outside of the structure code range")]
    ClassHeightOutOfRange(u32),

    /// The supplied layout configuration is unusable.
    #[error("Invalid layout configuration - {0}")]
    InvalidConfig(String),
}

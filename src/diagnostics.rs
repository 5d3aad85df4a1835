//! Diagnostics collection for the layout pass.
//!
//! Every defect the layout engine finds in a declaration is reported as a [`Diagnostic`]
//! instead of aborting the pass. A malformed entity can carry several diagnostics at once,
//! while valid sibling entities are laid out and remain usable for code generation.
//!
//! # Architecture
//!
//! The [`Diagnostics`] container uses `boxcar::Vec` for thread-safe, lock-free append
//! operations, so per-entity validation running on a `rayon` pool can report without
//! synchronization. Each entry carries:
//! - a stable [`DiagnosticCode`] (`BL001`..) a host can match on
//! - its [`DiagnosticSeverity`] and [`DiagnosticCategory`]
//! - the entity / member it belongs to and the declaration's [`SourceLocation`]
//!
//! Individual checks do not build diagnostics directly. They return a [`Violation`] (code and
//! message, created with the `violation!` macro) and the validation orchestrator attaches the
//! context.
//!
//! # Usage Examples
//!
//! ```rust
//! use blocklayout::diagnostics::{Diagnostic, DiagnosticCode, Diagnostics};
//!
//! let diagnostics = Diagnostics::new();
//! diagnostics.push(
//!     Diagnostic::from_code(DiagnosticCode::Overlap, "member 'b' overlaps member #1")
//!         .with_entity("Demo.Point")
//!         .with_member("b"),
//! );
//!
//! assert!(diagnostics.has_errors());
//! for entry in diagnostics.iter() {
//!     println!("{entry}");
//! }
//! ```
//!
//! # Thread Safety
//!
//! All types in this module are [`Send`] and [`Sync`].

use std::fmt::{self, Write};

use strum::{EnumCount, EnumIter};

use crate::schema::SourceLocation;

/// Severity level of a diagnostic entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiagnosticSeverity {
    /// Informational message, not indicating a problem.
    Info,

    /// Suspicious but usable declaration; code can still be generated.
    Warning,

    /// The declaration is invalid. A host should not generate code for the affected entity.
    Error,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Info => write!(f, "INFO"),
            DiagnosticSeverity::Warning => write!(f, "WARN"),
            DiagnosticSeverity::Error => write!(f, "ERROR"),
        }
    }
}

/// Category indicating the kind of defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    /// Missing or invalid declarations.
    ///
    /// Examples: no layout method, missing member offset, duplicate entity id.
    Declaration,

    /// Invalid sizes and offsets.
    ///
    /// Examples: negative offset, non power-of-two field length, oversized block.
    Geometry,

    /// Members colliding with each other or with the block boundaries.
    Overlap,

    /// Problems with the shape of the inheritance tree.
    ///
    /// Examples: class height out of range, dangling or cyclic base reference.
    Structural,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Declaration => write!(f, "Declaration"),
            DiagnosticCategory::Geometry => write!(f, "Geometry"),
            DiagnosticCategory::Overlap => write!(f, "Overlap"),
            DiagnosticCategory::Structural => write!(f, "Structural"),
        }
    }
}

/// Stable identifiers for every check the validator performs.
///
/// The string form returned by [`DiagnosticCode::code`] never changes between releases, so
/// hosts can use it to suppress or map diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum DiagnosticCode {
    /// The entity has no layout declaration.
    MissingLayout,
    /// The layout method is neither explicit nor linear.
    UnsupportedLayoutMethod,
    /// Block length is not 0 or a power of two up to 1024.
    InvalidBlockLength,
    /// Class height outside of [1,15].
    InvalidClassHeight,
    /// The entity has no identifier.
    MissingEntityId,
    /// The identifier is zero / nil.
    InvalidEntityId,
    /// Two entities of the domain share an identifier.
    DuplicateEntityId,
    /// The base entity does not resolve to a declared entity.
    InvalidBase,
    /// The base chain loops back onto itself.
    CyclicInheritance,
    /// Nullability on a kind that cannot be null.
    IllegalNullable,
    /// Explicit layout without an offset on the member.
    MissingOffset,
    /// Offset below zero.
    NegativeOffset,
    /// Field length is not a power of two in [1,1024].
    InvalidFieldLength,
    /// Fixed length override is not a power of two in [4,1024], or used on the wrong kind.
    InvalidFixedLength,
    /// Array capacity is not a power of two in [1,1024], or used on the wrong kind.
    InvalidArrayCapacity,
    /// Vector total length is not a power of two in [1,1024].
    InvalidTotalLength,
    /// Member sequence numbers do not form a contiguous 1..N run.
    MissingSequence,
    /// Two members share a sequence number.
    DuplicateSequence,
    /// Member starts before the beginning of the block.
    BeforeBlockStart,
    /// Member extends past the end of the block.
    PastBlockEnd,
    /// Member offset is not a multiple of its total length.
    Misaligned,
    /// Member overlaps bytes claimed by an earlier member.
    Overlap,
    /// The member type maps to no known width.
    UnmappedType,
}

impl DiagnosticCode {
    /// The stable string code, e.g. `BL012`.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticCode::MissingLayout => "BL001",
            DiagnosticCode::UnsupportedLayoutMethod => "BL002",
            DiagnosticCode::InvalidBlockLength => "BL003",
            DiagnosticCode::InvalidClassHeight => "BL004",
            DiagnosticCode::MissingEntityId => "BL005",
            DiagnosticCode::InvalidEntityId => "BL006",
            DiagnosticCode::DuplicateEntityId => "BL007",
            DiagnosticCode::InvalidBase => "BL008",
            DiagnosticCode::CyclicInheritance => "BL009",
            DiagnosticCode::IllegalNullable => "BL010",
            DiagnosticCode::MissingOffset => "BL011",
            DiagnosticCode::NegativeOffset => "BL012",
            DiagnosticCode::InvalidFieldLength => "BL013",
            DiagnosticCode::InvalidFixedLength => "BL014",
            DiagnosticCode::InvalidArrayCapacity => "BL015",
            DiagnosticCode::InvalidTotalLength => "BL016",
            DiagnosticCode::MissingSequence => "BL017",
            DiagnosticCode::DuplicateSequence => "BL018",
            DiagnosticCode::BeforeBlockStart => "BL019",
            DiagnosticCode::PastBlockEnd => "BL020",
            DiagnosticCode::Misaligned => "BL021",
            DiagnosticCode::Overlap => "BL022",
            DiagnosticCode::UnmappedType => "BL023",
        }
    }

    /// The category this check belongs to.
    #[must_use]
    pub fn category(&self) -> DiagnosticCategory {
        match self {
            DiagnosticCode::MissingLayout
            | DiagnosticCode::UnsupportedLayoutMethod
            | DiagnosticCode::MissingEntityId
            | DiagnosticCode::InvalidEntityId
            | DiagnosticCode::DuplicateEntityId
            | DiagnosticCode::IllegalNullable
            | DiagnosticCode::MissingOffset
            | DiagnosticCode::MissingSequence
            | DiagnosticCode::DuplicateSequence
            | DiagnosticCode::UnmappedType => DiagnosticCategory::Declaration,
            DiagnosticCode::InvalidBlockLength
            | DiagnosticCode::NegativeOffset
            | DiagnosticCode::InvalidFieldLength
            | DiagnosticCode::InvalidFixedLength
            | DiagnosticCode::InvalidArrayCapacity
            | DiagnosticCode::InvalidTotalLength => DiagnosticCategory::Geometry,
            DiagnosticCode::BeforeBlockStart
            | DiagnosticCode::PastBlockEnd
            | DiagnosticCode::Misaligned
            | DiagnosticCode::Overlap => DiagnosticCategory::Overlap,
            DiagnosticCode::InvalidClassHeight
            | DiagnosticCode::InvalidBase
            | DiagnosticCode::CyclicInheritance => DiagnosticCategory::Structural,
        }
    }

    /// Default severity for this check.
    ///
    /// Everything is an error except an unmapped type, which is reported as a warning next to
    /// the `InvalidFieldLength` error it causes.
    #[must_use]
    pub fn severity(&self) -> DiagnosticSeverity {
        match self {
            DiagnosticCode::UnmappedType => DiagnosticSeverity::Warning,
            _ => DiagnosticSeverity::Error,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The first rule a single check found broken.
///
/// Check functions return `Result<(), Violation>`; see the `violation!` macro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Which check failed
    pub code: DiagnosticCode,
    /// Human-readable description
    pub message: String,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A single diagnostic entry with context information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity level of this diagnostic.
    pub severity: DiagnosticSeverity,

    /// Category of the defect.
    pub category: DiagnosticCategory,

    /// Stable code of the check that produced this entry.
    pub code: DiagnosticCode,

    /// Human-readable description of the issue.
    pub message: String,

    /// Full name of the entity the diagnostic belongs to.
    pub entity: Option<String>,

    /// Name of the member the diagnostic belongs to.
    pub member: Option<String>,

    /// Location of the originating declaration.
    pub location: Option<SourceLocation>,
}

impl Diagnostic {
    /// Creates a new diagnostic entry.
    ///
    /// # Arguments
    ///
    /// * `severity` - Severity level of the diagnostic
    /// * `code` - The check that produced it, also determines the category
    /// * `message` - Human-readable description
    pub fn new(
        severity: DiagnosticSeverity,
        code: DiagnosticCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category: code.category(),
            code,
            message: message.into(),
            entity: None,
            member: None,
            location: None,
        }
    }

    /// Creates a diagnostic with the default severity of `code`.
    pub fn from_code(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(code.severity(), code, message)
    }

    /// Adds the owning entity.
    #[must_use]
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Adds the owning member.
    #[must_use]
    pub fn with_member(mut self, member: impl Into<String>) -> Self {
        self.member = Some(member.into());
        self
    }

    /// Adds the declaration's source location, if there is one.
    #[must_use]
    pub fn with_location(mut self, location: Option<SourceLocation>) -> Self {
        self.location = location;
        self
    }
}

impl From<Violation> for Diagnostic {
    fn from(violation: Violation) -> Self {
        Diagnostic::from_code(violation.code, violation.message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}: {}",
            self.severity, self.code, self.category, self.message
        )?;

        match (&self.entity, &self.member) {
            (Some(entity), Some(member)) => write!(f, " ({entity}.{member})")?,
            (Some(entity), None) => write!(f, " ({entity})")?,
            _ => {}
        }

        if let Some(location) = &self.location {
            write!(f, " at {location}")?;
        }

        Ok(())
    }
}

/// Thread-safe container for collecting diagnostic entries.
///
/// Uses `boxcar::Vec` internally for lock-free concurrent append operations.
#[derive(Debug)]
pub struct Diagnostics {
    entries: boxcar::Vec<Diagnostic>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagnostics {
    /// Creates a new empty diagnostics container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: boxcar::Vec::new(),
        }
    }

    /// Adds an informational diagnostic.
    pub fn info(&self, code: DiagnosticCode, message: impl Into<String>) {
        self.push(Diagnostic::new(DiagnosticSeverity::Info, code, message));
    }

    /// Adds a warning diagnostic.
    pub fn warning(&self, code: DiagnosticCode, message: impl Into<String>) {
        self.push(Diagnostic::new(DiagnosticSeverity::Warning, code, message));
    }

    /// Adds an error diagnostic.
    pub fn error(&self, code: DiagnosticCode, message: impl Into<String>) {
        self.push(Diagnostic::new(DiagnosticSeverity::Error, code, message));
    }

    /// Adds a diagnostic entry directly.
    pub fn push(&self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Adds every entry of `diagnostics`, keeping their order.
    pub fn extend(&self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.push(diagnostic);
        }
    }

    /// Returns true if any diagnostics have been collected.
    pub fn has_any(&self) -> bool {
        self.entries.count() > 0
    }

    /// Returns true if any error-level diagnostics have been collected.
    pub fn has_errors(&self) -> bool {
        self.iter().any(|d| d.severity == DiagnosticSeverity::Error)
    }

    /// Returns true if any warning-level diagnostics have been collected.
    pub fn has_warnings(&self) -> bool {
        self.iter().any(|d| d.severity == DiagnosticSeverity::Warning)
    }

    /// Returns the total number of diagnostics.
    pub fn count(&self) -> usize {
        self.entries.count()
    }

    /// Returns the number of diagnostics with the given severity.
    pub fn count_severity(&self, severity: DiagnosticSeverity) -> usize {
        self.iter().filter(|d| d.severity == severity).count()
    }

    /// Returns the number of error-level diagnostics.
    pub fn error_count(&self) -> usize {
        self.count_severity(DiagnosticSeverity::Error)
    }

    /// Returns the number of warning-level diagnostics.
    pub fn warning_count(&self) -> usize {
        self.count_severity(DiagnosticSeverity::Warning)
    }

    /// Returns the number of info-level diagnostics.
    pub fn info_count(&self) -> usize {
        self.count_severity(DiagnosticSeverity::Info)
    }

    /// Returns an iterator over all diagnostics in insertion order.
    ///
    /// Note: boxcar's iterator yields `(index, &Diagnostic)` tuples, the index is dropped here.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().map(|(_, d)| d)
    }

    /// Returns all errors as a vector.
    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.iter()
            .filter(|d| d.severity == DiagnosticSeverity::Error)
            .collect()
    }

    /// Returns all warnings as a vector.
    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.iter()
            .filter(|d| d.severity == DiagnosticSeverity::Warning)
            .collect()
    }

    /// Returns diagnostics filtered by category.
    pub fn by_category(&self, category: DiagnosticCategory) -> Vec<&Diagnostic> {
        self.iter().filter(|d| d.category == category).collect()
    }

    /// Returns diagnostics filtered by code.
    pub fn by_code(&self, code: DiagnosticCode) -> Vec<&Diagnostic> {
        self.iter().filter(|d| d.code == code).collect()
    }

    /// Returns all diagnostics reported against the entity with the given full name,
    /// including those of its members.
    pub fn for_entity(&self, entity: &str) -> Vec<&Diagnostic> {
        self.iter()
            .filter(|d| d.entity.as_deref() == Some(entity))
            .collect()
    }

    /// Returns the diagnostics of one member.
    pub fn for_member(&self, entity: &str, member: &str) -> Vec<&Diagnostic> {
        self.iter()
            .filter(|d| d.entity.as_deref() == Some(entity) && d.member.as_deref() == Some(member))
            .collect()
    }

    /// Returns true if the entity (or one of its members) has an error-level diagnostic.
    pub fn entity_has_errors(&self, entity: &str) -> bool {
        self.iter().any(|d| {
            d.severity == DiagnosticSeverity::Error && d.entity.as_deref() == Some(entity)
        })
    }

    /// Formats a summary of all diagnostics for display.
    pub fn summary(&self) -> String {
        let mut output = String::new();

        let error_count = self.error_count();
        let warning_count = self.warning_count();
        let info_count = self.info_count();

        let _ = writeln!(
            output,
            "Diagnostics: {error_count} error(s), {warning_count} warning(s), {info_count} info(s)"
        );

        if error_count > 0 {
            output.push_str("\nErrors:\n");
            for diag in self.errors() {
                let _ = writeln!(output, "  {diag}");
            }
        }

        if warning_count > 0 {
            output.push_str("\nWarnings:\n");
            for diag in self.warnings() {
                let _ = writeln!(output, "  {diag}");
            }
        }

        output
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;
    use strum::IntoEnumIterator;

    #[test]
    fn test_diagnostic_creation() {
        let diag = Diagnostic::from_code(DiagnosticCode::NegativeOffset, "offset -1");

        assert_eq!(diag.severity, DiagnosticSeverity::Error);
        assert_eq!(diag.category, DiagnosticCategory::Geometry);
        assert_eq!(diag.code, DiagnosticCode::NegativeOffset);
        assert_eq!(diag.message, "offset -1");
        assert!(diag.entity.is_none());
        assert!(diag.member.is_none());
        assert!(diag.location.is_none());
    }

    #[test]
    fn test_diagnostic_with_context() {
        let diag = Diagnostic::from_code(DiagnosticCode::Overlap, "collision")
            .with_entity("Demo.Point")
            .with_member("y")
            .with_location(Some(SourceLocation::new("point.rs", 12, 5)));

        assert_eq!(diag.entity.as_deref(), Some("Demo.Point"));
        assert_eq!(diag.member.as_deref(), Some("y"));
        assert_eq!(diag.location.as_ref().map(|l| l.line), Some(12));
    }

    #[test]
    fn test_codes_are_unique_and_stable() {
        let codes: HashSet<_> = DiagnosticCode::iter().map(|c| c.code()).collect();
        assert_eq!(codes.len(), DiagnosticCode::COUNT);
        assert_eq!(DiagnosticCode::MissingLayout.code(), "BL001");
        assert_eq!(DiagnosticCode::UnmappedType.code(), "BL023");
        assert!(codes.iter().all(|c| c.starts_with("BL") && c.len() == 5));
    }

    #[test]
    fn test_code_categories() {
        assert_eq!(
            DiagnosticCode::DuplicateEntityId.category(),
            DiagnosticCategory::Declaration
        );
        assert_eq!(
            DiagnosticCode::InvalidTotalLength.category(),
            DiagnosticCategory::Geometry
        );
        assert_eq!(
            DiagnosticCode::Misaligned.category(),
            DiagnosticCategory::Overlap
        );
        assert_eq!(
            DiagnosticCode::CyclicInheritance.category(),
            DiagnosticCategory::Structural
        );
        assert_eq!(
            DiagnosticCode::UnmappedType.severity(),
            DiagnosticSeverity::Warning
        );
    }

    #[test]
    fn test_diagnostics_container() {
        let diagnostics = Diagnostics::new();

        diagnostics.info(DiagnosticCode::MissingLayout, "Info message");
        diagnostics.warning(DiagnosticCode::UnmappedType, "Warning message");
        diagnostics.error(DiagnosticCode::Overlap, "Error message");

        assert_eq!(diagnostics.count(), 3);
        assert_eq!(diagnostics.error_count(), 1);
        assert_eq!(diagnostics.warning_count(), 1);
        assert_eq!(diagnostics.info_count(), 1);
        assert!(diagnostics.has_errors());
        assert!(diagnostics.has_warnings());
        assert!(diagnostics.has_any());
    }

    #[test]
    fn test_diagnostics_thread_safety() {
        let diagnostics = Arc::new(Diagnostics::new());
        let mut handles = vec![];

        for i in 0..10 {
            let diag_clone = Arc::clone(&diagnostics);
            handles.push(thread::spawn(move || {
                diag_clone.error(DiagnosticCode::Overlap, format!("Thread {i} overlap"));
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(diagnostics.count(), 10);
    }

    #[test]
    fn test_diagnostics_filters() {
        let diagnostics = Diagnostics::new();

        diagnostics.push(
            Diagnostic::from_code(DiagnosticCode::Overlap, "a").with_entity("Demo.A"),
        );
        diagnostics.push(
            Diagnostic::from_code(DiagnosticCode::NegativeOffset, "b")
                .with_entity("Demo.A")
                .with_member("x"),
        );
        diagnostics.push(
            Diagnostic::from_code(DiagnosticCode::UnmappedType, "c")
                .with_entity("Demo.B")
                .with_member("y"),
        );

        assert_eq!(diagnostics.for_entity("Demo.A").len(), 2);
        assert_eq!(diagnostics.for_member("Demo.A", "x").len(), 1);
        assert_eq!(diagnostics.by_code(DiagnosticCode::Overlap).len(), 1);
        assert_eq!(
            diagnostics.by_category(DiagnosticCategory::Declaration).len(),
            1
        );
        assert!(diagnostics.entity_has_errors("Demo.A"));
        assert!(!diagnostics.entity_has_errors("Demo.B"));
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::from_code(DiagnosticCode::PastBlockEnd, "ends at 40 > 32")
            .with_entity("Demo.Point")
            .with_member("z")
            .with_location(Some(SourceLocation::new("point.rs", 7, 1)));

        let display = format!("{diag}");
        assert!(display.contains("ERROR"));
        assert!(display.contains("BL020"));
        assert!(display.contains("Overlap"));
        assert!(display.contains("Demo.Point.z"));
        assert!(display.contains("point.rs:7:1"));
    }

    #[test]
    fn test_summary() {
        let diagnostics = Diagnostics::new();
        diagnostics.error(DiagnosticCode::InvalidClassHeight, "height 16");

        let summary = diagnostics.summary();
        assert!(summary.contains("1 error(s)"));
        assert!(summary.contains("height 16"));
    }
}

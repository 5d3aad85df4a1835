//! Member offset assignment.
//!
//! Two strategies place the members of an entity inside its block:
//!
//! - **Explicit**: offsets come from the declarations; only field and total lengths are
//!   computed here. Whether the declared placement is sound is left to validation.
//! - **Linear**: members are placed in ascending sequence order. Each one is aligned to a
//!   multiple of its own total length (skipping ahead over the gap), and the block grows by
//!   doubling until it covers the end of the last member. Members are never reordered.
//!
//! String, binary and entity-reference members are never inlined; they occupy the reference
//! width (widened by a fixed length override for strings and blobs). That keeps the layout of
//! recursive entity graphs finite.
//!
//! All arithmetic saturates. A declaration that produces absurd sizes yields absurd, but
//! well-defined, numbers that validation then reports.

use log::trace;

use crate::{
    schema::{Domain, Member, MemberKind, MemberRc, MemberType},
    LayoutConfig,
};

/// Computed placement of one member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberLayout {
    /// Name of the member
    pub name: String,
    /// Sequence number of the member
    pub sequence: u32,
    /// Kind after type resolution
    pub kind: MemberKind,
    /// Type after resolution against the domain (element type for vectors)
    pub ty: MemberType,
    /// Whether the member is declared nullable
    pub nullable: bool,
    /// Offset from the start of the entity's own block; may be negative for bad declarations
    pub field_offset: i32,
    /// Width of a single element
    pub field_length: u32,
    /// Bytes occupied: `field_length * array_capacity` for vectors, else `field_length`
    pub total_length: u32,
    /// Element count of vectors
    pub array_capacity: Option<u32>,
    /// The declaration this layout was computed from
    pub declaration: MemberRc,
}

impl MemberLayout {
    /// Measures a member, taking the offset from its declaration (0 when none is declared).
    ///
    /// ## Arguments
    /// * `member`          - The member declaration
    /// * `resolved`        - The declared type, resolved against the domain
    /// * `reference_width` - Width of an indirect reference
    pub fn measure(member: &MemberRc, resolved: MemberType, reference_width: u32) -> MemberLayout {
        let field_length = field_length(member, &resolved, reference_width);
        let total_length = match member.array_capacity {
            Some(capacity) => field_length.saturating_mul(capacity),
            None => field_length,
        };

        MemberLayout {
            name: member.name.clone(),
            sequence: member.sequence,
            kind: member.kind_of(&resolved),
            ty: resolved,
            nullable: member.nullable,
            field_offset: member.offset.unwrap_or(0),
            field_length,
            total_length,
            array_capacity: member.array_capacity,
            declaration: member.clone(),
        }
    }

    /// The byte range the member occupies, `None` if it starts before the block
    #[must_use]
    pub fn range(&self) -> Option<std::ops::Range<u64>> {
        let start = u64::try_from(self.field_offset).ok()?;
        Some(start..start + u64::from(self.total_length))
    }

    /// First byte after the member (saturating at 0 for negative offsets)
    #[must_use]
    pub fn end_offset(&self) -> u64 {
        self.range().map_or(0, |range| range.end)
    }
}

/// Width of one element of `member`, given its resolved type.
///
/// - entity references always take the reference width
/// - strings and blobs take their fixed length override, or the reference width
/// - scalars take their natural width, unresolved types 0
#[must_use]
pub fn field_length(member: &Member, resolved: &MemberType, reference_width: u32) -> u32 {
    match resolved {
        MemberType::Entity(_) => reference_width,
        MemberType::String | MemberType::Binary => member
            .fixed_length
            .filter(|&fixed| fixed != 0)
            .unwrap_or(reference_width),
        other => other.width(reference_width),
    }
}

fn sorted(members: &[MemberRc]) -> Vec<MemberRc> {
    let mut members = members.to_vec();
    members.sort_by(|a, b| a.sequence.cmp(&b.sequence).then_with(|| a.name.cmp(&b.name)));
    members
}

/// Explicit layout: computes lengths, keeps the declared offsets.
///
/// Members without a declared offset are placed at 0; validation reports them.
pub fn layout_members_explicit(
    members: &[MemberRc],
    domain: &Domain,
    config: &LayoutConfig,
) -> Vec<MemberLayout> {
    sorted(members)
        .iter()
        .map(|member| {
            let layout = MemberLayout::measure(
                member,
                domain.resolve_member_type(&member.ty),
                config.reference_width,
            );
            trace!(
                "explicit #{} '{}' at {} ({} bytes)",
                layout.sequence,
                layout.name,
                layout.field_offset,
                layout.total_length
            );
            layout
        })
        .collect()
}

/// Result of a linear layout
#[derive(Debug, Clone)]
pub struct LinearLayout {
    /// Placed members, in sequence order
    pub members: Vec<MemberLayout>,
    /// Smallest power of two (or 0) covering every member
    pub block_length: u32,
}

/// Linear layout: places members in sequence order with natural alignment.
pub fn layout_members_linear(
    members: &[MemberRc],
    domain: &Domain,
    config: &LayoutConfig,
) -> LinearLayout {
    let mut cursor: u64 = 0;
    let mut block_length: u64 = 0;
    let mut placed = Vec::with_capacity(members.len());

    for member in sorted(members) {
        let mut layout = MemberLayout::measure(
            &member,
            domain.resolve_member_type(&member.ty),
            config.reference_width,
        );

        let total = u64::from(layout.total_length);
        if total > 0 {
            let misalignment = cursor % total;
            if misalignment != 0 {
                cursor = cursor.saturating_add(total - misalignment);
            }
        }

        layout.field_offset = i32::try_from(cursor).unwrap_or(i32::MAX);
        cursor = cursor.saturating_add(total);

        while block_length < cursor {
            block_length = if block_length == 0 {
                1
            } else {
                block_length.saturating_mul(2)
            };
        }

        trace!(
            "linear #{} '{}' at {} ({} bytes)",
            layout.sequence,
            layout.name,
            layout.field_offset,
            layout.total_length
        );
        placed.push(layout);
    }

    LinearLayout {
        members: placed,
        block_length: u32::try_from(block_length).unwrap_or(u32::MAX),
    }
}

//! Whole-block validation
//!
//! Replays the members of one entity, in sequence order, onto a byte-indexed ownership map of
//! the block. A member must start inside the block, end inside the block, sit at a multiple of
//! its total length, and claim no byte another member already owns. The first violation is
//! reported.

use crate::{
    diagnostics::DiagnosticCode,
    layout::{MemberLayout, MAX_BLOCK_LENGTH},
    validation::CheckResult,
};

/// Byte ownership of one block; `None` marks a free byte, `Some` the owner's sequence
enum Ownership {
    Map(Vec<Option<u32>>),
    // blocks above the cap are already rejected, overlap is tracked by range only
    Ranges(Vec<(u64, u64, u32)>),
}

impl Ownership {
    fn new(block_length: u32) -> Self {
        if block_length <= MAX_BLOCK_LENGTH {
            Ownership::Map(vec![None; block_length as usize])
        } else {
            Ownership::Ranges(Vec::new())
        }
    }

    /// Claims `start..end` for `owner`; returns the sequence of a previous owner on conflict
    fn claim(&mut self, start: u64, end: u64, owner: u32) -> Option<u32> {
        if start >= end {
            return None;
        }

        match self {
            Ownership::Map(bytes) => {
                let range = usize::try_from(start).ok()?..usize::try_from(end).ok()?;
                if let Some(taken) = bytes[range.clone()].iter().find_map(|&byte| byte) {
                    return Some(taken);
                }
                bytes[range].fill(Some(owner));
                None
            }
            Ownership::Ranges(claimed) => {
                if let Some(&(_, _, taken)) = claimed
                    .iter()
                    .find(|&&(from, to, _)| start < to && from < end)
                {
                    return Some(taken);
                }
                claimed.push((start, end, owner));
                None
            }
        }
    }
}

/// Validator for the placement of all members inside a block
pub struct BlockValidator;

impl BlockValidator {
    /// Validates bounds, alignment and overlap of every member
    ///
    /// # Arguments
    /// * `block_length` - Length of the entity's own block
    /// * `members` - Placed members; checked in sequence order
    ///
    /// # Errors
    /// - [`DiagnosticCode::BeforeBlockStart`] for a negative offset
    /// - [`DiagnosticCode::PastBlockEnd`] for a member ending after the block
    /// - [`DiagnosticCode::Misaligned`] for an offset that is not a multiple of the total length
    /// - [`DiagnosticCode::Overlap`] for a member claiming bytes of an earlier one, naming the
    ///   earlier member's sequence
    pub fn validate_block(block_length: u32, members: &[MemberLayout]) -> CheckResult {
        let mut ordered: Vec<&MemberLayout> = members.iter().collect();
        ordered.sort_by(|a, b| a.sequence.cmp(&b.sequence).then_with(|| a.name.cmp(&b.name)));

        let mut ownership = Ownership::new(block_length);

        for member in ordered {
            let Some(range) = member.range() else {
                return Err(violation!(
                    DiagnosticCode::BeforeBlockStart,
                    "member '{}' starts at {}, before the start of the block",
                    member.name,
                    member.field_offset
                ));
            };

            if range.end > u64::from(block_length) {
                return Err(violation!(
                    DiagnosticCode::PastBlockEnd,
                    "member '{}' ends at {}, past the block length {}",
                    member.name,
                    range.end,
                    block_length
                ));
            }

            let total = u64::from(member.total_length);
            if total > 0 && range.start % total != 0 {
                return Err(violation!(
                    DiagnosticCode::Misaligned,
                    "member '{}' at offset {} is not aligned to its length {}",
                    member.name,
                    range.start,
                    total
                ));
            }

            if let Some(earlier) = ownership.claim(range.start, range.end, member.sequence) {
                return Err(violation!(
                    DiagnosticCode::Overlap,
                    "member '{}' overlaps member #{}",
                    member.name,
                    earlier
                ));
            }
        }

        Ok(())
    }
}

//! Member-level validation
//!
//! Each check looks at one attribute of one member and reports its first violation. The
//! orchestrator runs all of them, so a single member can carry several diagnostics.

use crate::{
    diagnostics::DiagnosticCode,
    layout::{MemberLayout, MAX_FIELD_LENGTH, MIN_FIXED_LENGTH},
    schema::{LayoutMethod, MemberKind, MemberType},
    validation::CheckResult,
};

fn in_power_of_two_range(value: u32, min: u32, max: u32) -> bool {
    value.is_power_of_two() && (min..=max).contains(&value)
}

/// Validator for member declarations and their computed layout
pub struct MemberValidator;

impl MemberValidator {
    /// Validates that only reference kinds are nullable
    ///
    /// # Errors
    /// Returns [`DiagnosticCode::IllegalNullable`] for nullable scalars and vectors.
    pub fn validate_nullable(member: &MemberLayout) -> CheckResult {
        if member.nullable && !member.kind.allows_null() {
            return Err(violation!(
                DiagnosticCode::IllegalNullable,
                "{} member '{}' cannot be nullable",
                member.kind,
                member.name
            ));
        }

        Ok(())
    }

    /// Validates that members of non-linear entities declare their offset
    ///
    /// # Errors
    /// Returns [`DiagnosticCode::MissingOffset`] if the offset declaration is missing.
    pub fn validate_offset_declared(method: LayoutMethod, member: &MemberLayout) -> CheckResult {
        if method != LayoutMethod::Linear && member.declaration.offset.is_none() {
            return Err(violation!(
                DiagnosticCode::MissingOffset,
                "member '{}' needs an explicit offset in {} layout",
                member.name,
                method
            ));
        }

        Ok(())
    }

    /// Validates that the offset is not negative
    ///
    /// # Errors
    /// Returns [`DiagnosticCode::NegativeOffset`] for offsets below 0.
    pub fn validate_offset(member: &MemberLayout) -> CheckResult {
        if member.field_offset < 0 {
            return Err(violation!(
                DiagnosticCode::NegativeOffset,
                "member '{}' has negative offset {}",
                member.name,
                member.field_offset
            ));
        }

        Ok(())
    }

    /// Validates the single-element width
    ///
    /// # Errors
    /// Returns [`DiagnosticCode::InvalidFieldLength`] unless the length is a power of two in
    /// `1..=1024`.
    pub fn validate_field_length(member: &MemberLayout) -> CheckResult {
        if !in_power_of_two_range(member.field_length, 1, MAX_FIELD_LENGTH) {
            return Err(violation!(
                DiagnosticCode::InvalidFieldLength,
                "member '{}' has field length {}, expected a power of two up to {}",
                member.name,
                member.field_length,
                MAX_FIELD_LENGTH
            ));
        }

        Ok(())
    }

    /// Validates the fixed length override
    ///
    /// The override only applies to string and binary elements and must be a power of two in
    /// `4..=1024` when it is non-zero.
    ///
    /// # Errors
    /// Returns [`DiagnosticCode::InvalidFixedLength`] if either rule is broken.
    pub fn validate_fixed_length(member: &MemberLayout) -> CheckResult {
        let Some(fixed) = member.declaration.fixed_length.filter(|&fixed| fixed != 0) else {
            return Ok(());
        };

        if !matches!(member.ty, MemberType::String | MemberType::Binary) {
            return Err(violation!(
                DiagnosticCode::InvalidFixedLength,
                "member '{}' of type {} cannot have a fixed length",
                member.name,
                member.ty
            ));
        }

        if !in_power_of_two_range(fixed, MIN_FIXED_LENGTH, MAX_FIELD_LENGTH) {
            return Err(violation!(
                DiagnosticCode::InvalidFixedLength,
                "member '{}' has fixed length {}, expected a power of two between {} and {}",
                member.name,
                fixed,
                MIN_FIXED_LENGTH,
                MAX_FIELD_LENGTH
            ));
        }

        Ok(())
    }

    /// Validates the array capacity of vectors
    ///
    /// # Errors
    /// Returns [`DiagnosticCode::InvalidArrayCapacity`] unless the capacity is a power of two in
    /// `1..=1024`.
    pub fn validate_array_capacity(member: &MemberLayout) -> CheckResult {
        match member.array_capacity {
            Some(capacity) if !in_power_of_two_range(capacity, 1, MAX_FIELD_LENGTH) => {
                Err(violation!(
                    DiagnosticCode::InvalidArrayCapacity,
                    "member '{}' has capacity {}, expected a power of two up to {}",
                    member.name,
                    capacity,
                    MAX_FIELD_LENGTH
                ))
            }
            _ => Ok(()),
        }
    }

    /// Validates the total length of vectors
    ///
    /// # Errors
    /// Returns [`DiagnosticCode::InvalidTotalLength`] unless the total is a power of two in
    /// `1..=1024`.
    pub fn validate_total_length(member: &MemberLayout) -> CheckResult {
        if member.kind == MemberKind::Vector
            && !in_power_of_two_range(member.total_length, 1, MAX_FIELD_LENGTH)
        {
            return Err(violation!(
                DiagnosticCode::InvalidTotalLength,
                "vector '{}' spans {} bytes, expected a power of two up to {}",
                member.name,
                member.total_length,
                MAX_FIELD_LENGTH
            ));
        }

        Ok(())
    }

    /// Validates that the member type resolved to something with a width
    ///
    /// # Errors
    /// Returns [`DiagnosticCode::UnmappedType`] for names that are neither a scalar nor an
    /// entity of the domain.
    pub fn validate_type_mapped(member: &MemberLayout) -> CheckResult {
        if let MemberType::Named(name) = &member.ty {
            return Err(violation!(
                DiagnosticCode::UnmappedType,
                "type '{}' of member '{}' is not mapped to a scalar or an entity",
                name,
                member.name
            ));
        }

        Ok(())
    }

    /// Validates that sequence numbers form the contiguous run `1..=N`
    ///
    /// # Arguments
    /// * `members` - The members of one entity, in any order
    ///
    /// # Errors
    /// - [`DiagnosticCode::DuplicateSequence`] if two members share a sequence number
    /// - [`DiagnosticCode::MissingSequence`] for the first gap in the run
    pub fn validate_sequences(members: &[MemberLayout]) -> CheckResult {
        let mut sequences: Vec<(u32, &str)> = members
            .iter()
            .map(|member| (member.sequence, member.name.as_str()))
            .collect();
        sequences.sort_unstable();

        for pair in sequences.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(violation!(
                    DiagnosticCode::DuplicateSequence,
                    "members '{}' and '{}' share sequence {}",
                    pair[0].1,
                    pair[1].1,
                    pair[0].0
                ));
            }
        }

        for (expected, (sequence, name)) in (1u32..).zip(sequences.iter()) {
            if *sequence != expected {
                return Err(violation!(
                    DiagnosticCode::MissingSequence,
                    "sequence {} is missing, member '{}' has sequence {}",
                    expected,
                    name,
                    sequence
                ));
            }
        }

        Ok(())
    }
}

//! Entity-level validation
//!
//! Checks of the declaration attributes of a single entity, plus the domain-wide identifier
//! uniqueness check. Each check returns its first violation only.

use std::collections::HashMap;

use crate::{
    diagnostics::{DiagnosticCode, Violation},
    layout::{MAX_BLOCK_LENGTH, MAX_CLASS_HEIGHT},
    schema::{Ancestry, Domain, Entity, EntityId, LayoutMethod},
    validation::CheckResult,
};

/// Validator for entity declarations
pub struct EntityValidator;

impl EntityValidator {
    /// Validates that a supported layout method was declared
    ///
    /// # Errors
    /// - [`DiagnosticCode::MissingLayout`] if the entity has no layout declaration
    /// - [`DiagnosticCode::UnsupportedLayoutMethod`] if the declared method is neither
    ///   explicit nor linear
    pub fn validate_layout_declaration(layout: Option<LayoutMethod>) -> CheckResult {
        match layout {
            None => Err(violation!(
                DiagnosticCode::MissingLayout,
                "entity has no layout declaration"
            )),
            Some(LayoutMethod::Undefined) => Err(violation!(
                DiagnosticCode::UnsupportedLayoutMethod,
                "layout method must be Explicit or Linear"
            )),
            Some(LayoutMethod::Explicit | LayoutMethod::Linear) => Ok(()),
        }
    }

    /// Validates the block length of an entity
    ///
    /// Explicit layout requires a declared block length; for every method the length must be
    /// 0 or a power of two not above [`MAX_BLOCK_LENGTH`].
    ///
    /// # Arguments
    /// * `method` - The layout method the entity was laid out with
    /// * `declared` - The declared block length
    /// * `block_length` - The block length used by the layout
    ///
    /// # Errors
    /// Returns [`DiagnosticCode::InvalidBlockLength`] for a missing or out of range length.
    pub fn validate_block_length(
        method: LayoutMethod,
        declared: Option<u32>,
        block_length: u32,
    ) -> CheckResult {
        if method == LayoutMethod::Explicit && declared.is_none() {
            return Err(violation!(
                DiagnosticCode::InvalidBlockLength,
                "explicit layout requires a declared block length"
            ));
        }

        if block_length != 0
            && (!block_length.is_power_of_two() || block_length > MAX_BLOCK_LENGTH)
        {
            return Err(violation!(
                DiagnosticCode::InvalidBlockLength,
                "block length {} must be 0 or a power of two up to {}",
                block_length,
                MAX_BLOCK_LENGTH
            ));
        }

        Ok(())
    }

    /// Validates that a class height fits a structure code nibble
    ///
    /// # Errors
    /// Returns [`DiagnosticCode::InvalidClassHeight`] for heights outside `1..=15`.
    pub fn validate_class_height(class_height: u32) -> CheckResult {
        if !(1..=MAX_CLASS_HEIGHT).contains(&class_height) {
            return Err(violation!(
                DiagnosticCode::InvalidClassHeight,
                "class height {} is outside of 1..={}",
                class_height,
                MAX_CLASS_HEIGHT
            ));
        }

        Ok(())
    }

    /// Validates that the entity carries a usable identifier
    ///
    /// # Errors
    /// - [`DiagnosticCode::MissingEntityId`] if no identifier was declared
    /// - [`DiagnosticCode::InvalidEntityId`] for 0 or the nil GUID
    pub fn validate_entity_id(id: Option<EntityId>) -> CheckResult {
        match id {
            None => Err(violation!(
                DiagnosticCode::MissingEntityId,
                "entity has no identifier"
            )),
            Some(id) if !id.is_valid() => Err(violation!(
                DiagnosticCode::InvalidEntityId,
                "entity identifier {} is not valid",
                id
            )),
            Some(_) => Ok(()),
        }
    }

    /// Validates the base chain of an entity
    ///
    /// # Errors
    /// - [`DiagnosticCode::InvalidBase`] if a base link does not resolve to a declared entity
    /// - [`DiagnosticCode::CyclicInheritance`] if the chain loops back onto itself
    /// - [`DiagnosticCode::InvalidClassHeight`] if the chain is deeper than the domain's depth
    ///   limit
    pub fn validate_inheritance(domain: &Domain, entity: &Entity) -> CheckResult {
        match domain.ancestry(entity) {
            Ancestry::Resolved(_) => Ok(()),
            Ancestry::Broken { entity: owner } => Err(violation!(
                DiagnosticCode::InvalidBase,
                "base of '{}' does not resolve to a declared entity",
                owner
            )),
            Ancestry::Cyclic { entity: repeated } => Err(violation!(
                DiagnosticCode::CyclicInheritance,
                "base chain is cyclic at '{}'",
                repeated
            )),
            Ancestry::TooDeep { entity: last, limit } => Err(violation!(
                DiagnosticCode::InvalidClassHeight,
                "base chain is deeper than {} levels at '{}'",
                limit,
                last
            )),
        }
    }

    /// Validates that identifiers are unique across a domain
    ///
    /// Entities are visited in the given order; every entity reusing an identifier already
    /// seen is reported, naming the first holder.
    ///
    /// # Arguments
    /// * `entities` - `(full name, identifier)` pairs of all entities of the domain
    ///
    /// # Returns
    /// The violations, keyed by the full name of the offending entity.
    pub fn validate_unique_ids(entities: &[(String, Option<EntityId>)]) -> Vec<(String, Violation)> {
        let mut first_holders: HashMap<EntityId, &str> = HashMap::new();
        let mut violations = Vec::new();

        for (name, id) in entities {
            let Some(id) = id else {
                continue;
            };
            if !id.is_valid() {
                continue;
            }

            match first_holders.get(id) {
                Some(holder) => violations.push((
                    name.clone(),
                    violation!(
                        DiagnosticCode::DuplicateEntityId,
                        "entity identifier {} is already used by '{}'",
                        id,
                        holder
                    ),
                )),
                None => {
                    first_holders.insert(*id, name.as_str());
                }
            }
        }

        violations
    }
}

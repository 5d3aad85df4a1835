//! # Validation Orchestration
//!
//! Runs every check of [`crate::validation`] over the layouts of a domain pass and turns
//! violations into [`Diagnostic`]s with severity, owning entity / member and source location.
//!
//! ## Execution
//!
//! - **Per entity**: entity, identifier, member and whole-block checks only read the entity,
//!   its members and its base chain, so entities are validated independently, on the
//!   [`rayon`] pool when [`LayoutConfig::parallel`] is set
//! - **Domain-wide**: identifier uniqueness has to see every entity and runs afterwards
//!
//! Checks never short-circuit each other: every check reports its first violation and all
//! of them run, so one malformed entity can carry several diagnostics. Diagnostics are
//! gathered per entity and appended in entity order, which keeps the output deterministic
//! regardless of scheduling.

use std::collections::BTreeMap;

use log::warn;
use rayon::prelude::*;

use crate::{
    diagnostics::{Diagnostic, DiagnosticSeverity, Diagnostics},
    layout::{EntityLayout, MemberLayout},
    schema::{Domain, Entity, EntityRc, SourceLocation},
    validation::{
        BlockValidator, CheckResult, EntityValidator, MemberValidator, ValidationConfig,
    },
    LayoutConfig,
};

/// Collects the violations of one entity together with their context
struct Report {
    entity: String,
    location: Option<SourceLocation>,
    diagnostics: Vec<Diagnostic>,
}

impl Report {
    fn new(entity: &Entity) -> Self {
        Report {
            entity: entity.fullname(),
            location: entity.location(),
            diagnostics: Vec::new(),
        }
    }

    fn entity(&mut self, result: CheckResult) {
        if let Err(violation) = result {
            self.diagnostics.push(
                Diagnostic::from(violation)
                    .with_entity(self.entity.clone())
                    .with_location(self.location.clone()),
            );
        }
    }

    fn member(&mut self, member: &MemberLayout, result: CheckResult) {
        if let Err(violation) = result {
            let location = member
                .declaration
                .location
                .clone()
                .or_else(|| self.location.clone());
            self.diagnostics.push(
                Diagnostic::from(violation)
                    .with_entity(self.entity.clone())
                    .with_member(member.name.clone())
                    .with_location(location),
            );
        }
    }
}

/// Central coordinator of the validation that follows a layout pass.
///
/// Stateless; all inputs are read only.
pub struct Orchestrator;

impl Orchestrator {
    /// Validates every entity layout of a domain.
    ///
    /// # Arguments
    /// * `domain` - The domain the layouts were computed from
    /// * `layouts` - Entity layouts keyed by full name
    /// * `config` - The configuration of the layout pass
    ///
    /// # Returns
    /// All diagnostics, grouped by entity in full-name order, followed by the domain-wide
    /// identifier violations.
    pub fn validate_domain(
        domain: &Domain,
        layouts: &BTreeMap<String, EntityLayout>,
        config: &LayoutConfig,
    ) -> Diagnostics {
        let diagnostics = Diagnostics::new();
        let validation = config.validation;
        if !validation.is_enabled() {
            return diagnostics;
        }

        let entities: Vec<(EntityRc, &EntityLayout)> = domain
            .entities()
            .into_iter()
            .filter_map(|entity| {
                let layout = layouts.get(&entity.fullname())?;
                Some((entity, layout))
            })
            .collect();

        let per_entity: Vec<Vec<Diagnostic>> = if config.parallel {
            entities
                .par_iter()
                .map(|(entity, layout)| Self::validate_entity(domain, entity, layout, &validation))
                .collect()
        } else {
            entities
                .iter()
                .map(|(entity, layout)| Self::validate_entity(domain, entity, layout, &validation))
                .collect()
        };

        for ((entity, _), entries) in entities.iter().zip(per_entity) {
            let errors = entries
                .iter()
                .filter(|d| d.severity == DiagnosticSeverity::Error)
                .count();
            if errors > 0 {
                warn!(
                    "entity '{}' has {} layout error(s)",
                    entity.fullname(),
                    errors
                );
            }
            diagnostics.extend(entries);
        }

        if validation.enable_id_validation {
            let ids: Vec<_> = entities
                .iter()
                .map(|(entity, layout)| (entity.fullname(), layout.id))
                .collect();
            for (name, violation) in EntityValidator::validate_unique_ids(&ids) {
                let location = domain.get(&name).and_then(|entity| entity.location());
                diagnostics.push(
                    Diagnostic::from(violation)
                        .with_entity(name)
                        .with_location(location),
                );
            }
        }

        diagnostics
    }

    /// Runs every enabled per-entity check on one entity.
    ///
    /// # Arguments
    /// * `domain` - The domain, for the base chain
    /// * `entity` - The entity declaration
    /// * `layout` - Its computed layout
    /// * `config` - Which checks to run
    pub fn validate_entity(
        domain: &Domain,
        entity: &Entity,
        layout: &EntityLayout,
        config: &ValidationConfig,
    ) -> Vec<Diagnostic> {
        let mut report = Report::new(entity);

        if config.enable_entity_validation {
            report.entity(EntityValidator::validate_layout_declaration(
                entity.layout_declaration(),
            ));
            report.entity(EntityValidator::validate_block_length(
                layout.method,
                entity.declared_block_length(),
                layout.block_length,
            ));
            if let Some(height) = layout.class_height {
                report.entity(EntityValidator::validate_class_height(height));
            }
            report.entity(EntityValidator::validate_inheritance(domain, entity));
        }

        if config.enable_id_validation {
            report.entity(EntityValidator::validate_entity_id(layout.id));
        }

        if config.enable_member_validation {
            report.entity(MemberValidator::validate_sequences(&layout.members));

            for member in &layout.members {
                report.member(member, MemberValidator::validate_type_mapped(member));
                report.member(member, MemberValidator::validate_nullable(member));
                report.member(
                    member,
                    MemberValidator::validate_offset_declared(layout.method, member),
                );
                report.member(member, MemberValidator::validate_offset(member));
                report.member(member, MemberValidator::validate_field_length(member));
                report.member(member, MemberValidator::validate_fixed_length(member));
                report.member(member, MemberValidator::validate_array_capacity(member));
                report.member(member, MemberValidator::validate_total_length(member));
            }
        }

        if config.enable_block_validation {
            report.entity(BlockValidator::validate_block(
                layout.block_length,
                &layout.members,
            ));
        }

        report.diagnostics
    }
}

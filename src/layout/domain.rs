//! The layout pass over a complete domain.

use std::collections::BTreeMap;

use log::info;

use crate::{
    diagnostics::Diagnostics, layout::EntityLayout, schema::Domain, validation::Orchestrator,
    LayoutConfig, Result,
};

/// Layouts and diagnostics of one domain pass.
#[derive(Debug)]
pub struct DomainLayout {
    entities: BTreeMap<String, EntityLayout>,
    diagnostics: Diagnostics,
}

impl DomainLayout {
    /// Layout of the entity with the given full name
    pub fn get(&self, fullname: &str) -> Option<&EntityLayout> {
        self.entities.get(fullname)
    }

    /// All entity layouts, ordered by full name
    pub fn iter(&self) -> impl Iterator<Item = &EntityLayout> {
        self.entities.values()
    }

    /// Number of laid out entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the domain had no entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Everything validation reported
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Returns true if no error-level diagnostic was reported
    pub fn is_valid(&self) -> bool {
        !self.diagnostics.has_errors()
    }

    /// Layouts of the entities without error-level diagnostics.
    ///
    /// Hosts emit code for these and skip the broken ones.
    pub fn valid_entities(&self) -> Vec<&EntityLayout> {
        self.entities
            .values()
            .filter(|layout| !self.diagnostics.entity_has_errors(&layout.fullname))
            .collect()
    }
}

/// Lays out and validates every entity of `domain`.
///
/// Must run after registration is complete. Entities are processed in ascending class height
/// so that ancestors are available when their descendants compose structure codes; entities
/// with a broken or cyclic base chain come first. Defects in declarations never abort the
/// pass, they end up in [`DomainLayout::diagnostics`].
///
/// # Errors
/// Returns [`crate::Error::InvalidConfig`] if `config` fails [`LayoutConfig::validate`].
pub fn layout_domain(domain: &Domain, config: &LayoutConfig) -> Result<DomainLayout> {
    config.validate()?;

    let mut entities: Vec<_> = domain
        .entities()
        .into_iter()
        .map(|entity| (domain.class_height(&entity).unwrap_or(0), entity))
        .collect();
    entities.sort_by_key(|(height, _)| *height);

    let mut layouts = BTreeMap::new();
    for (_, entity) in &entities {
        let layout = EntityLayout::auto_layout_members(entity, domain, config, &layouts);
        layouts.insert(layout.fullname.clone(), layout);
    }

    let diagnostics = Orchestrator::validate_domain(domain, &layouts, config);

    info!(
        "domain '{}': {} entities laid out, {} error(s), {} warning(s)",
        domain.name,
        layouts.len(),
        diagnostics.error_count(),
        diagnostics.warning_count()
    );

    Ok(DomainLayout {
        entities: layouts,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        diagnostics::DiagnosticCode,
        schema::{LayoutMethod, Member, ScalarType},
        Error,
    };

    #[test]
    fn test_layout_domain() {
        let domain = Domain::new("Demo");
        let base = domain.get_or_create("Demo", "Base");
        base.set_id(1).unwrap();
        base.set_layout(LayoutMethod::Linear).unwrap();
        base.add_member(Member::new("a", 1, ScalarType::Int32)).unwrap();

        let derived = domain.get_or_create("Demo", "Derived");
        derived.set_id(2).unwrap();
        derived.set_layout(LayoutMethod::Linear).unwrap();
        derived.set_base(&base).unwrap();
        derived.add_member(Member::new("b", 1, ScalarType::Int64)).unwrap();

        let result = layout_domain(&domain, &LayoutConfig::default()).unwrap();
        assert!(result.is_valid(), "{}", result.diagnostics());
        assert_eq!(result.len(), 2);
        assert!(!result.is_empty());
        assert_eq!(result.valid_entities().len(), 2);

        let derived = result.get("Demo.Derived").unwrap();
        assert_eq!(derived.structure_code.block_length(1), 4);
        assert_eq!(derived.structure_code.block_length(2), 8);
        let names: Vec<_> = result.iter().map(|l| l.fullname.as_str()).collect();
        assert_eq!(names, ["Demo.Base", "Demo.Derived"]);
    }

    #[test]
    fn test_invalid_entities_do_not_stop_the_pass() {
        let domain = Domain::new("Demo");
        let good = domain.get_or_create("Demo", "Good");
        good.set_id(1).unwrap();
        good.set_layout(LayoutMethod::Linear).unwrap();
        good.add_member(Member::new("a", 1, ScalarType::Int32)).unwrap();

        let bad = domain.get_or_create("Demo", "Bad");
        bad.set_id(2).unwrap();
        bad.set_layout(LayoutMethod::Explicit).unwrap();
        bad.set_block_length(8).unwrap();
        bad.add_member(Member::new("a", 1, ScalarType::Int64).with_offset(4))
            .unwrap();

        let result = layout_domain(&domain, &LayoutConfig::default()).unwrap();
        assert!(!result.is_valid());
        let valid: Vec<_> = result
            .valid_entities()
            .iter()
            .map(|l| l.fullname.clone())
            .collect();
        assert_eq!(valid, ["Demo.Good"]);
        assert!(!result
            .diagnostics()
            .by_code(DiagnosticCode::PastBlockEnd)
            .is_empty());
    }

    #[test]
    fn test_full_height_chain() {
        let domain = crate::test::create_domain();
        let chain = crate::test::create_inheritance_chain(&domain, 15);

        let result = layout_domain(&domain, &LayoutConfig::default()).unwrap();
        assert!(result.is_valid(), "{}", result.diagnostics());

        let leaf = result.get(&chain[14].fullname()).unwrap();
        assert_eq!(leaf.class_height, Some(15));
        for (height, length) in leaf.structure_code.levels() {
            let level = result.get(&format!("Test.Level{height}")).unwrap();
            assert_eq!(level.block_length, length);
        }
        assert_eq!(leaf.structure_code.levels().len(), 15);
    }

    #[test]
    fn test_sixteenth_level_is_rejected() {
        let domain = crate::test::create_domain();
        crate::test::create_inheritance_chain(&domain, 16);

        let result = layout_domain(&domain, &LayoutConfig::default()).unwrap();
        let errors: Vec<_> = result
            .diagnostics()
            .by_code(DiagnosticCode::InvalidClassHeight)
            .iter()
            .map(|d| d.entity.clone())
            .collect();
        assert_eq!(errors, [Some("Test.Level16".to_string())]);
    }

    #[test]
    fn test_chain_past_depth_limit_is_not_cyclic() {
        let domain = crate::test::create_domain();
        crate::test::create_inheritance_chain(&domain, 70);

        let result = layout_domain(&domain, &LayoutConfig::default()).unwrap();
        assert!(result
            .diagnostics()
            .by_code(DiagnosticCode::CyclicInheritance)
            .is_empty());

        let mut too_high: Vec<_> = result
            .diagnostics()
            .by_code(DiagnosticCode::InvalidClassHeight)
            .iter()
            .filter_map(|d| d.entity.clone())
            .collect();
        too_high.sort();
        let mut expected: Vec<_> = (16..=70).map(|level| format!("Test.Level{level}")).collect();
        expected.sort();
        assert_eq!(too_high, expected);

        assert_eq!(result.get("Test.Level65").unwrap().class_height, Some(65));
        assert_eq!(result.get("Test.Level70").unwrap().class_height, None);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let domain = Domain::new("Demo");
        let config = LayoutConfig::default().with_reference_width(3);
        assert!(matches!(
            layout_domain(&domain, &config),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_empty_domain() {
        let domain = Domain::new("Demo");
        let result = layout_domain(&domain, &LayoutConfig::default()).unwrap();
        assert!(result.is_empty());
        assert!(result.is_valid());
    }
}

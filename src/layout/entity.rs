//! Per-entity layout.
//!
//! [`EntityLayout::auto_layout_members`] picks the member strategy from the entity's layout
//! method, determines the block length and composes the structure code over the whole base
//! chain. Ancestors are taken from the layouts computed so far, or laid out on demand.

use std::collections::BTreeMap;

use log::debug;

use crate::{
    layout::{layout_members_explicit, layout_members_linear, MemberLayout, StructureCode},
    schema::{Domain, Entity, EntityId, LayoutMethod},
    LayoutConfig,
};

/// Computed layout of one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityLayout {
    /// Full name of the entity
    pub fullname: String,
    /// Declared identifier
    pub id: Option<EntityId>,
    /// Layout method the members were placed with
    pub method: LayoutMethod,
    /// Depth in the inheritance chain, `None` if the chain is broken or cyclic
    pub class_height: Option<u32>,
    /// Length of the entity's own block (computed for linear, declared for explicit)
    pub block_length: u32,
    /// Block sizes of every level of the inheritance chain
    pub structure_code: StructureCode,
    /// Member placements, in sequence order
    pub members: Vec<MemberLayout>,
}

impl EntityLayout {
    /// Lays out the members of `entity` and composes its structure code.
    ///
    /// Linear entities are placed automatically; every other method keeps the declared
    /// offsets and uses the declared block length (0 when none was declared). The returned
    /// layout is not validated.
    ///
    /// ## Arguments
    /// * `entity`   - The entity to lay out
    /// * `domain`   - The domain, for type resolution and the base chain
    /// * `config`   - Layout configuration
    /// * `computed` - Layouts already computed in this pass, keyed by full name
    pub fn auto_layout_members(
        entity: &Entity,
        domain: &Domain,
        config: &LayoutConfig,
        computed: &BTreeMap<String, EntityLayout>,
    ) -> EntityLayout {
        let method = entity.layout_method();
        let members = entity.members();

        let (members, block_length) = match method {
            LayoutMethod::Linear => {
                let linear = layout_members_linear(&members, domain, config);
                (linear.members, linear.block_length)
            }
            LayoutMethod::Explicit | LayoutMethod::Undefined => (
                layout_members_explicit(&members, domain, config),
                entity.declared_block_length().unwrap_or(0),
            ),
        };

        let class_height = domain.class_height(entity);
        let structure_code = match class_height {
            Some(height) => {
                let mut code = StructureCode::new(height, block_length);
                let mut level = height;
                for ancestor in domain.ancestors(entity) {
                    level = level.saturating_sub(1);
                    let ancestor_length = match computed.get(&ancestor.fullname()) {
                        Some(layout) => layout.block_length,
                        None => {
                            Self::auto_layout_members(&ancestor, domain, config, computed)
                                .block_length
                        }
                    };
                    code = code.add_inner_block(level, ancestor_length);
                }
                code
            }
            None => StructureCode::default(),
        };

        debug!(
            "{} '{}': {} members, block {} bytes, height {:?}, structure {}",
            method,
            entity.fullname(),
            members.len(),
            block_length,
            class_height,
            structure_code
        );

        EntityLayout {
            fullname: entity.fullname(),
            id: entity.id(),
            method,
            class_height,
            block_length,
            structure_code,
            members,
        }
    }

    /// Look up a member placement by name
    pub fn member(&self, name: &str) -> Option<&MemberLayout> {
        self.members.iter().find(|member| member.name == name)
    }

    /// First byte after the last member
    pub fn end_offset(&self) -> u64 {
        self.members
            .iter()
            .map(MemberLayout::end_offset)
            .max()
            .unwrap_or(0)
    }
}

//! Factories for declared domains and entities.

use crate::schema::{Domain, EntityRc, LayoutMethod, Member, ScalarType};

/// Creates an empty domain named `Test`
pub fn create_domain() -> Domain {
    Domain::new("Test")
}

/// Registers a linear entity in namespace `Test` with the given members
pub fn create_linear_entity(domain: &Domain, name: &str, id: u32, members: Vec<Member>) -> EntityRc {
    let entity = domain.get_or_create("Test", name);
    entity.set_id(id).unwrap();
    entity.set_layout(LayoutMethod::Linear).unwrap();
    for member in members {
        entity.add_member(member).unwrap();
    }
    entity
}

/// Registers an explicit entity in namespace `Test` with a declared block length
pub fn create_explicit_entity(
    domain: &Domain,
    name: &str,
    id: u32,
    block_length: u32,
    members: Vec<Member>,
) -> EntityRc {
    let entity = domain.get_or_create("Test", name);
    entity.set_id(id).unwrap();
    entity.set_layout(LayoutMethod::Explicit).unwrap();
    entity.set_block_length(block_length).unwrap();
    for member in members {
        entity.add_member(member).unwrap();
    }
    entity
}

/// Creates `Level1` (root) through `Level{depth}`, each deriving from the previous one.
///
/// Level `n` holds one `Int64` vector of capacity `2^((n - 1) % 8)`, so neighbouring levels
/// have different block lengths. Returns the entities root first.
pub fn create_inheritance_chain(domain: &Domain, depth: u32) -> Vec<EntityRc> {
    let mut chain: Vec<EntityRc> = Vec::new();
    for level in 1..=depth {
        let capacity = 1u32 << ((level - 1) % 8);
        let entity = create_linear_entity(
            domain,
            &format!("Level{level}"),
            level,
            vec![Member::new("payload", 1, ScalarType::Int64).with_array_capacity(capacity)],
        );
        if let Some(parent) = chain.last() {
            entity.set_base(parent).unwrap();
        }
        chain.push(entity);
    }
    chain
}

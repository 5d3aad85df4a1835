//! Central entity registry of a domain.
//!
//! The [`Domain`] owns every [`Entity`] of one generation run. Front ends register entities
//! and members incrementally while they visit declarations, possibly from several threads at
//! once; the layout pass runs afterwards over the complete set.
//!
//! # Registry Architecture
//!
//! - **Full-name storage**: a `SkipMap` keyed by `Namespace.Name`, so iteration order is
//!   deterministic regardless of registration order
//! - **Name index**: a `DashMap` from simple name to full names, used to resolve member types
//!   that name an entity without its namespace
//!
//! # Thread Safety
//!
//! Registration is get-or-create: [`Domain::get_or_create`] is atomic, an entity registered
//! under a name is never replaced, and concurrent callers all receive the same instance.
//!
//! # Inheritance Queries
//!
//! Entities only store a weak link to their base. Class heights, ancestor chains and derived
//! entities are computed on demand from the registry, so nothing has to be kept in sync when
//! entities are added.
//!
//! # Examples
//!
//! ```rust
//! use blocklayout::{Domain, LayoutMethod, Member, ScalarType};
//!
//! let domain = Domain::new("Demo");
//! let shape = domain.get_or_create("Demo", "Shape");
//! shape.set_layout(LayoutMethod::Linear)?;
//! shape.add_member(Member::new("area", 1, ScalarType::Double))?;
//!
//! let circle = domain.get_or_create("Demo", "Circle");
//! circle.set_base(&shape)?;
//!
//! assert_eq!(domain.class_height(&circle), Some(2));
//! assert_eq!(domain.derived_entities(&shape).len(), 1);
//! # Ok::<(), blocklayout::Error>(())
//! ```

use std::{collections::HashSet, sync::Arc};

use crossbeam_skiplist::SkipMap;
use dashmap::DashMap;

use crate::{
    schema::{entity::fullname, Entity, EntityRc, MemberType},
    Error, Result,
};

/// Default limit on base-chain walks; longer chains stop at [`Ancestry::TooDeep`].
pub const DEFAULT_MAX_INHERITANCE_DEPTH: usize = 64;

/// Result of walking an entity's base chain.
#[derive(Debug, Clone)]
pub enum Ancestry {
    /// The chain ends at a root; ancestors listed nearest first
    Resolved(Vec<EntityRc>),
    /// A base link could not be followed (dropped entity or never declared)
    Broken {
        /// Full name of the entity whose base link is broken
        entity: String,
    },
    /// The chain loops back onto an entity already visited
    Cyclic {
        /// Full name of the first entity seen twice
        entity: String,
    },
    /// The chain has no cycle but runs past the registry's depth limit
    TooDeep {
        /// Full name of the ancestor at which the walk stopped
        entity: String,
        /// The depth limit that was exceeded
        limit: usize,
    },
}

/// Registry of all entities of one domain.
pub struct Domain {
    /// Name of the domain, used in log output
    pub name: String,
    entities: SkipMap<String, EntityRc>,
    names: DashMap<String, Vec<String>>,
    max_depth: usize,
}

impl Domain {
    /// Create a new, empty domain.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_max_depth(name, DEFAULT_MAX_INHERITANCE_DEPTH)
    }

    /// Create a domain with a custom base-chain walk limit.
    pub fn with_max_depth(name: impl Into<String>, max_depth: usize) -> Self {
        Domain {
            name: name.into(),
            entities: SkipMap::new(),
            names: DashMap::new(),
            max_depth,
        }
    }

    /// Returns the entity registered under `namespace.name`, creating it if needed.
    ///
    /// Safe under concurrent callers: exactly one instance is ever created per full name.
    pub fn get_or_create(&self, namespace: &str, name: &str) -> EntityRc {
        let key = fullname(namespace, name);
        if let Some(existing) = self.entities.get(&key) {
            return existing.value().clone();
        }

        let entry = self
            .entities
            .get_or_insert_with(key.clone(), || Arc::new(Entity::new(namespace, name)));
        let entity = entry.value().clone();

        let mut fullnames = self.names.entry(name.to_string()).or_default();
        if !fullnames.contains(&key) {
            fullnames.push(key);
        }

        entity
    }

    /// Look up an entity by full name
    pub fn get(&self, fullname: &str) -> Option<EntityRc> {
        self.entities.get(fullname).map(|entry| entry.value().clone())
    }

    /// Look up an entity by full name, failing if it is not registered.
    ///
    /// # Errors
    /// Returns [`Error::EntityNotFound`] if no such entity exists.
    pub fn require(&self, fullname: &str) -> Result<EntityRc> {
        self.get(fullname)
            .ok_or_else(|| Error::EntityNotFound(fullname.to_string()))
    }

    /// Find an entity by full name, or by simple name if that is unambiguous.
    pub fn find(&self, name: &str) -> Option<EntityRc> {
        if let Some(entity) = self.get(name) {
            return Some(entity);
        }

        let fullnames = self.names.get(name)?;
        match fullnames.as_slice() {
            [only] => self.get(only),
            _ => None,
        }
    }

    /// Count of entities in the domain
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if the domain is empty
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns an iterator over all entities, ordered by full name
    pub fn iter(&self) -> crossbeam_skiplist::map::Iter<'_, String, EntityRc> {
        self.entities.iter()
    }

    /// All entities, ordered by full name
    pub fn entities(&self) -> Vec<EntityRc> {
        self.entities
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Walks the base chain of `entity`.
    ///
    /// A base that is no longer alive, or that was only referenced and never declared with a
    /// layout, breaks the chain. Revisiting an entity reports a cycle; a chain with more ancestors
    /// than the depth limit stops at [`Ancestry::TooDeep`].
    pub fn ancestry(&self, entity: &Entity) -> Ancestry {
        let mut ancestors = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(entity.fullname());

        let mut current_ref = entity.base_ref().cloned();
        let mut current_name = entity.fullname();

        while let Some(base_ref) = current_ref {
            let Some(base) = base_ref.upgrade() else {
                return Ancestry::Broken {
                    entity: current_name,
                };
            };
            if base.layout_declaration().is_none() {
                return Ancestry::Broken {
                    entity: current_name,
                };
            }

            let base_name = base.fullname();
            if !seen.insert(base_name.clone()) {
                return Ancestry::Cyclic { entity: base_name };
            }
            if ancestors.len() >= self.max_depth {
                return Ancestry::TooDeep {
                    entity: base_name,
                    limit: self.max_depth,
                };
            }

            current_ref = base.base_ref().cloned();
            current_name = base_name;
            ancestors.push(base);
        }

        Ancestry::Resolved(ancestors)
    }

    /// The ancestors of `entity`, nearest first; empty unless the chain resolves.
    pub fn ancestors(&self, entity: &Entity) -> Vec<EntityRc> {
        match self.ancestry(entity) {
            Ancestry::Resolved(ancestors) => ancestors,
            Ancestry::Broken { .. } | Ancestry::Cyclic { .. } | Ancestry::TooDeep { .. } => {
                Vec::new()
            }
        }
    }

    /// Depth of `entity` in its inheritance chain (root = 1).
    ///
    /// `None` if the chain is broken, cyclic or deeper than the depth limit.
    pub fn class_height(&self, entity: &Entity) -> Option<u32> {
        match self.ancestry(entity) {
            Ancestry::Resolved(ancestors) => u32::try_from(ancestors.len() + 1).ok(),
            Ancestry::Broken { .. } | Ancestry::Cyclic { .. } | Ancestry::TooDeep { .. } => None,
        }
    }

    /// Every entity whose ancestor chain contains `entity`.
    ///
    /// Computed on demand, so there is no back-reference list to maintain.
    pub fn derived_entities(&self, entity: &Entity) -> Vec<EntityRc> {
        let target = entity.fullname();
        self.entities
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|candidate| {
                self.ancestors(candidate)
                    .iter()
                    .any(|ancestor| ancestor.fullname() == target)
            })
            .collect()
    }

    /// Entities deriving directly from `entity`.
    pub fn direct_derived_entities(&self, entity: &Entity) -> Vec<EntityRc> {
        let target = entity.fullname();
        self.entities
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|candidate| {
                candidate
                    .base_ref()
                    .and_then(|base| base.fullname())
                    .is_some_and(|name| name == target)
            })
            .collect()
    }

    /// Resolves a declared member type against the domain.
    ///
    /// Names of registered entities become [`MemberType::Entity`] (with the full name). Any
    /// other name is read as a built-in type name, so scalars, strings and octet blobs resolve
    /// the same way [`MemberType::parse`] would. Unknown names stay [`MemberType::Named`].
    pub fn resolve_member_type(&self, ty: &MemberType) -> MemberType {
        match ty {
            MemberType::Named(name) | MemberType::Entity(name) => {
                if let Some(entity) = self.find(name) {
                    MemberType::Entity(entity.fullname())
                } else {
                    MemberType::parse(name)
                }
            }
            other => other.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{LayoutMethod, ScalarType};
    use std::thread;

    fn declared(domain: &Domain, name: &str) -> EntityRc {
        let entity = domain.get_or_create("Demo", name);
        entity.set_layout(LayoutMethod::Linear).unwrap();
        entity
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let domain = Domain::new("Demo");
        let first = domain.get_or_create("Demo", "Point");
        let second = domain.get_or_create("Demo", "Point");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(domain.len(), 1);
        assert!(!domain.is_empty());
    }

    #[test]
    fn test_concurrent_get_or_create() {
        let domain = Arc::new(Domain::new("Demo"));
        let mut handles = vec![];

        for _ in 0..8 {
            let domain = Arc::clone(&domain);
            handles.push(thread::spawn(move || domain.get_or_create("Demo", "Shared")));
        }

        let created: Vec<EntityRc> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(created.iter().all(|e| Arc::ptr_eq(e, &created[0])));
        assert_eq!(domain.len(), 1);
        assert_eq!(domain.find("Shared").map(|e| e.fullname()).as_deref(), Some("Demo.Shared"));
    }

    #[test]
    fn test_lookup() {
        let domain = Domain::new("Demo");
        domain.get_or_create("Demo", "Point");
        domain.get_or_create("Other", "Point");
        domain.get_or_create("Other", "Line");

        assert!(domain.get("Demo.Point").is_some());
        assert!(domain.require("Demo.Missing").is_err());
        assert!(domain.find("Line").is_some());
        // ambiguous simple name
        assert!(domain.find("Point").is_none());
        assert!(domain.find("Other.Point").is_some());

        let names: Vec<_> = domain.entities().iter().map(|e| e.fullname()).collect();
        assert_eq!(names, ["Demo.Point", "Other.Line", "Other.Point"]);

        let keys: Vec<_> = domain.iter().map(|entry| entry.key().clone()).collect();
        assert_eq!(keys, names);
    }

    #[test]
    fn test_class_height_and_ancestors() {
        let domain = Domain::new("Demo");
        let root = declared(&domain, "Root");
        let middle = declared(&domain, "Middle");
        let leaf = declared(&domain, "Leaf");
        middle.set_base(&root).unwrap();
        leaf.set_base(&middle).unwrap();

        assert_eq!(domain.class_height(&root), Some(1));
        assert_eq!(domain.class_height(&middle), Some(2));
        assert_eq!(domain.class_height(&leaf), Some(3));

        let ancestors: Vec<_> = domain.ancestors(&leaf).iter().map(|e| e.name.clone()).collect();
        assert_eq!(ancestors, ["Middle", "Root"]);
    }

    #[test]
    fn test_derived_entities() {
        let domain = Domain::new("Demo");
        let root = declared(&domain, "Root");
        let middle = declared(&domain, "Middle");
        let leaf = declared(&domain, "Leaf");
        let sibling = declared(&domain, "Sibling");
        middle.set_base(&root).unwrap();
        leaf.set_base(&middle).unwrap();
        sibling.set_base(&root).unwrap();

        let mut derived: Vec<_> = domain
            .derived_entities(&root)
            .iter()
            .map(|e| e.name.clone())
            .collect();
        derived.sort();
        assert_eq!(derived, ["Leaf", "Middle", "Sibling"]);

        let direct: Vec<_> = domain
            .direct_derived_entities(&root)
            .iter()
            .map(|e| e.name.clone())
            .collect();
        assert_eq!(direct, ["Middle", "Sibling"]);
        assert!(domain.derived_entities(&leaf).is_empty());
    }

    #[test]
    fn test_deep_chain() {
        let domain = crate::test::create_domain();
        let chain = crate::test::create_inheritance_chain(&domain, 15);

        assert_eq!(domain.class_height(&chain[14]), Some(15));
        assert_eq!(domain.ancestors(&chain[14]).len(), 14);
        assert_eq!(domain.derived_entities(&chain[0]).len(), 14);

        let shallow = Domain::with_max_depth("Shallow", 4);
        let chain = crate::test::create_inheritance_chain(&shallow, 6);
        assert_eq!(shallow.class_height(&chain[4]), Some(5));
        match shallow.ancestry(&chain[5]) {
            Ancestry::TooDeep { entity, limit } => {
                assert_eq!(entity, "Test.Level1");
                assert_eq!(limit, 4);
            }
            other => panic!("unexpected ancestry {other:?}"),
        }
        assert_eq!(shallow.class_height(&chain[5]), None);
    }

    #[test]
    fn test_cycle_beyond_depth_limit_is_cyclic() {
        let shallow = Domain::with_max_depth("Shallow", 2);
        let a = declared(&shallow, "A");
        let b = declared(&shallow, "B");
        a.set_base(&b).unwrap();
        b.set_base(&a).unwrap();

        assert!(matches!(shallow.ancestry(&a), Ancestry::Cyclic { .. }));
    }

    #[test]
    fn test_cycle_detection() {
        let domain = Domain::new("Demo");
        let a = declared(&domain, "A");
        let b = declared(&domain, "B");
        a.set_base(&b).unwrap();
        b.set_base(&a).unwrap();

        assert!(matches!(domain.ancestry(&a), Ancestry::Cyclic { .. }));
        assert_eq!(domain.class_height(&a), None);
        assert!(domain.ancestors(&a).is_empty());
    }

    #[test]
    fn test_undeclared_base_breaks_chain() {
        let domain = Domain::new("Demo");
        let derived = declared(&domain, "Derived");
        let phantom = domain.get_or_create("Demo", "Phantom");
        derived.set_base(&phantom).unwrap();

        match domain.ancestry(&derived) {
            Ancestry::Broken { entity } => assert_eq!(entity, "Demo.Derived"),
            other => panic!("unexpected ancestry {other:?}"),
        }
    }

    #[test]
    fn test_resolve_member_type() {
        let domain = Domain::new("Demo");
        declared(&domain, "Node");

        assert_eq!(
            domain.resolve_member_type(&MemberType::Named("Node".into())),
            MemberType::Entity("Demo.Node".into())
        );
        assert_eq!(
            domain.resolve_member_type(&MemberType::Named("Int32".into())),
            MemberType::Scalar(ScalarType::Int32)
        );
        assert_eq!(
            domain.resolve_member_type(&MemberType::Named("string".into())),
            MemberType::String
        );
        assert_eq!(
            domain.resolve_member_type(&MemberType::Named("System.String".into())),
            MemberType::String
        );
        assert_eq!(
            domain.resolve_member_type(&MemberType::Named("Octets".into())),
            MemberType::Binary
        );
        assert_eq!(
            domain.resolve_member_type(&MemberType::Named("bytes".into())),
            MemberType::Binary
        );
        assert_eq!(
            domain.resolve_member_type(&MemberType::Named("Unknown".into())),
            MemberType::Named("Unknown".into())
        );
        assert_eq!(
            domain.resolve_member_type(&MemberType::String),
            MemberType::String
        );
    }
}

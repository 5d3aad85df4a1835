//! Entity declarations.
//!
//! An [`Entity`] is created once per distinct full name, possibly before the front end has
//! seen its declaration (for example when another entity names it as base). Its declaration
//! attributes are therefore filled in later, each exactly once, through `OnceLock` cells.
//! Members are registered into a concurrent map with get-or-create semantics, so declaration
//! visitors running on several threads can register the same entity safely.

use std::{
    fmt,
    sync::{Arc, OnceLock, Weak},
};

use dashmap::DashMap;
use uguid::Guid;

use crate::{
    schema::{Member, MemberRc, SourceLocation},
    Error, Result,
};

/// A reference-counted entity
pub type EntityRc = Arc<Entity>;

/// How the members of an entity are placed inside its block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LayoutMethod {
    /// Declared without choosing a method
    #[default]
    Undefined,
    /// Every member carries a caller supplied offset
    Explicit,
    /// Members are placed automatically in sequence order
    Linear,
}

impl fmt::Display for LayoutMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutMethod::Undefined => write!(f, "Undefined"),
            LayoutMethod::Explicit => write!(f, "Explicit"),
            LayoutMethod::Linear => write!(f, "Linear"),
        }
    }
}

/// Identifier of an entity, unique within its domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityId {
    /// A positive integer identifier
    Number(u32),
    /// An externally assigned GUID
    External(Guid),
}

impl EntityId {
    /// Returns true if the identifier can be used (non-zero number, non-nil GUID).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            EntityId::Number(number) => *number > 0,
            EntityId::External(guid) => *guid != Guid::ZERO,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Number(number) => write!(f, "{number}"),
            EntityId::External(guid) => write!(f, "{{{guid}}}"),
        }
    }
}

impl From<u32> for EntityId {
    fn from(value: u32) -> Self {
        EntityId::Number(value)
    }
}

impl From<Guid> for EntityId {
    fn from(value: Guid) -> Self {
        EntityId::External(value)
    }
}

/// A non-owning link to an entity.
///
/// Used for the base link so that the inheritance tree never keeps entities alive on its
/// own; the domain registry is the single owner.
#[derive(Clone, Debug)]
pub struct EntityRef {
    weak_ref: Weak<Entity>,
}

impl EntityRef {
    /// Create a new `EntityRef` from a strong reference
    pub fn new(strong_ref: &EntityRc) -> Self {
        Self {
            weak_ref: Arc::downgrade(strong_ref),
        }
    }

    /// Get a strong reference to the entity, returning None if it has been dropped
    #[must_use]
    pub fn upgrade(&self) -> Option<EntityRc> {
        self.weak_ref.upgrade()
    }

    /// Check if the referenced entity is still alive
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.weak_ref.strong_count() > 0
    }

    /// Get the full name of the referenced entity (if still alive)
    #[must_use]
    pub fn fullname(&self) -> Option<String> {
        self.upgrade().map(|e| e.fullname())
    }
}

impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.weak_ref, &other.weak_ref)
    }
}

impl From<&EntityRc> for EntityRef {
    fn from(strong_ref: &EntityRc) -> Self {
        Self::new(strong_ref)
    }
}

/// An entity record type of a domain.
pub struct Entity {
    /// Namespace (can be empty)
    pub namespace: String,
    /// Name, unique within the namespace
    pub name: String,
    id: OnceLock<EntityId>,
    layout: OnceLock<LayoutMethod>,
    block_length: OnceLock<u32>,
    base: OnceLock<EntityRef>,
    location: OnceLock<SourceLocation>,
    members: DashMap<String, MemberRc>,
}

impl Entity {
    /// Create a new, undeclared entity
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Entity {
            namespace: namespace.into(),
            name: name.into(),
            id: OnceLock::new(),
            layout: OnceLock::new(),
            block_length: OnceLock::new(),
            base: OnceLock::new(),
            location: OnceLock::new(),
            members: DashMap::new(),
        }
    }

    /// Returns the full name (Namespace.Name) of the entity
    pub fn fullname(&self) -> String {
        fullname(&self.namespace, &self.name)
    }

    /// The identifier, if declared
    pub fn id(&self) -> Option<EntityId> {
        self.id.get().copied()
    }

    /// The declared layout method, `None` when the entity has no layout declaration at all
    pub fn layout_declaration(&self) -> Option<LayoutMethod> {
        self.layout.get().copied()
    }

    /// The layout method, [`LayoutMethod::Undefined`] when not declared
    pub fn layout_method(&self) -> LayoutMethod {
        self.layout_declaration().unwrap_or_default()
    }

    /// The caller declared block length (explicit layout)
    pub fn declared_block_length(&self) -> Option<u32> {
        self.block_length.get().copied()
    }

    /// Where the entity was declared
    pub fn location(&self) -> Option<SourceLocation> {
        self.location.get().cloned()
    }

    /// The base link, if one was declared
    pub fn base_ref(&self) -> Option<&EntityRef> {
        self.base.get()
    }

    /// Access the base entity of this entity, if it exists and is still alive
    pub fn base(&self) -> Option<EntityRc> {
        self.base.get().and_then(EntityRef::upgrade)
    }

    /// Sets the identifier.
    ///
    /// # Errors
    /// Returns [`Error::DeclarationConflict`] if a different identifier is already set.
    pub fn set_id(&self, id: impl Into<EntityId>) -> Result<()> {
        set_once(&self.id, id.into(), &self.fullname(), "entity id")
    }

    /// Sets the layout method.
    ///
    /// # Errors
    /// Returns [`Error::DeclarationConflict`] if a different method is already set.
    pub fn set_layout(&self, method: LayoutMethod) -> Result<()> {
        set_once(&self.layout, method, &self.fullname(), "layout method")
    }

    /// Sets the caller declared block length.
    ///
    /// # Errors
    /// Returns [`Error::DeclarationConflict`] if a different length is already set.
    pub fn set_block_length(&self, block_length: u32) -> Result<()> {
        set_once(
            &self.block_length,
            block_length,
            &self.fullname(),
            "block length",
        )
    }

    /// Sets the base entity.
    ///
    /// # Errors
    /// Returns [`Error::DeclarationConflict`] if a different base is already set.
    pub fn set_base(&self, base: &EntityRc) -> Result<()> {
        set_once(&self.base, EntityRef::new(base), &self.fullname(), "base")
    }

    /// Sets the source location; the first location wins, later ones are ignored.
    pub fn set_location(&self, location: SourceLocation) {
        let _ = self.location.set(location);
    }

    /// Registers a member, or returns the already registered one of the same name.
    ///
    /// A registered member is never overwritten. Registering an identical declaration again
    /// is a no-op.
    ///
    /// # Errors
    /// Returns [`Error::DeclarationConflict`] if a member of that name exists with a
    /// different declaration.
    pub fn add_member(&self, member: Member) -> Result<MemberRc> {
        let entry = self
            .members
            .entry(member.name.clone())
            .or_insert_with(|| Arc::new(member.clone()));
        let existing = entry.value().clone();
        drop(entry);

        if existing.same_declaration(&member) {
            Ok(existing)
        } else {
            Err(Error::DeclarationConflict {
                name: format!("{}.{}", self.fullname(), member.name),
                message: format!("already declared as '{existing}', now as '{member}'"),
            })
        }
    }

    /// Look up a member by name
    pub fn member(&self, name: &str) -> Option<MemberRc> {
        self.members.get(name).map(|entry| entry.value().clone())
    }

    /// All members, ordered by sequence (ties broken by name)
    pub fn members(&self) -> Vec<MemberRc> {
        let mut members: Vec<MemberRc> = self
            .members
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        members.sort_by(|a, b| a.sequence.cmp(&b.sequence).then_with(|| a.name.cmp(&b.name)));
        members
    }

    /// Number of registered members
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("fullname", &self.fullname())
            .field("id", &self.id())
            .field("layout", &self.layout_declaration())
            .field("block_length", &self.declared_block_length())
            .field("base", &self.base_ref().and_then(EntityRef::fullname))
            .field("members", &self.member_count())
            .finish()
    }
}

/// Joins namespace and name the way entities are keyed in a domain.
pub(crate) fn fullname(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}.{name}")
    }
}

fn set_once<T: PartialEq + fmt::Debug>(
    cell: &OnceLock<T>,
    value: T,
    owner: &str,
    what: &str,
) -> Result<()> {
    match cell.set(value) {
        Ok(()) => Ok(()),
        Err(value) => match cell.get() {
            Some(existing) if *existing == value => Ok(()),
            Some(existing) => Err(Error::DeclarationConflict {
                name: owner.to_string(),
                message: format!("{what} already declared as {existing:?}, now {value:?}"),
            }),
            None => Err(malformed_error!("{} of '{}' vanished after set", what, owner)),
        },
    }
}

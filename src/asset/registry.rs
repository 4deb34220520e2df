//! Store of discovered entities for one document pass.

use rustc_hash::FxHashMap;

use super::{AssetResult, Category, Entity, TagId};

/// Entities keyed by category (discovery order), by URI (last write wins)
/// and, for the production coalescing pass, by deferred tag id.
///
/// Created fresh for every document and mode, so staging and production
/// never see each other's entities.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: Vec<Entity>,
    by_category: FxHashMap<Category, Vec<usize>>,
    by_uri: FxHashMap<String, usize>,
    by_tag: FxHashMap<TagId, usize>,
    deferred: FxHashMap<TagId, usize>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next unused tag id for a category.
    pub fn next_tag_id(&self, category: Category) -> AssetResult<TagId> {
        TagId::new(category, self.count(category))
    }

    /// Register an entity under its (fresh) tag id.
    pub fn register(&mut self, entity: Entity) -> TagId {
        let tag_id = entity.tag_id;
        debug_assert!(!self.by_tag.contains_key(&tag_id), "tag id reused: {tag_id}");

        let index = self.entities.len();
        self.by_category
            .entry(tag_id.category)
            .or_default()
            .push(index);
        self.by_uri.insert(entity.original_uri.clone(), index);
        self.by_tag.insert(tag_id, index);
        self.entities.push(entity);
        tag_id
    }

    pub fn get(&self, tag_id: TagId) -> Option<&Entity> {
        self.by_tag.get(&tag_id).map(|&i| &self.entities[i])
    }

    pub fn get_mut(&mut self, tag_id: TagId) -> Option<&mut Entity> {
        self.by_tag.get(&tag_id).map(|&i| &mut self.entities[i])
    }

    /// Most recently registered entity for a reference string.
    pub fn by_uri(&self, uri: &str) -> Option<&Entity> {
        self.by_uri.get(uri).map(|&i| &self.entities[i])
    }

    /// Tag ids of a category in discovery order.
    pub fn ids(&self, category: Category) -> Vec<TagId> {
        self.by_category
            .get(&category)
            .map(|indices| indices.iter().map(|&i| self.entities[i].tag_id).collect())
            .unwrap_or_default()
    }

    pub fn count(&self, category: Category) -> usize {
        self.by_category.get(&category).map_or(0, Vec::len)
    }

    /// All entities in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Record an entity for the coalescing pass instead of rewriting it now.
    pub fn defer(&mut self, tag_id: TagId) {
        if let Some(&index) = self.by_tag.get(&tag_id) {
            self.deferred.insert(tag_id, index);
        }
    }

    /// Deferred entity for a tag id, if it was deferred.
    pub fn deferred(&self, tag_id: TagId) -> Option<&Entity> {
        self.deferred.get(&tag_id).map(|&i| &self.entities[i])
    }
}

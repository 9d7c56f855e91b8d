//! Category hierarchy service for MongoDB
//!
//! Owns every read-modify-write sequence on category documents. The
//! interesting part is path maintenance: reparenting a category rewrites
//! its materialized ancestor path and then cascades the rewrite through
//! all descendants, one document at a time. The cascade is not
//! transactional; a failure partway through leaves the remaining
//! descendants with stale paths. The cycle guard on reparent is the sole
//! defense against infinite recursion and must never be bypassed.

use crate::db::{collections, MongoDb};
use crate::error::{CatalogError, CatalogResult};
use crate::models::{Category, CategoryTreeNode, DeleteAck, DeleteOutcome};
use chrono::Utc;
use futures::future::BoxFuture;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use std::collections::{HashMap, HashSet};

pub struct CategoryService {
    db: MongoDb,
}

impl CategoryService {
    pub fn new(db: MongoDb) -> Self {
        Self { db }
    }

    fn categories(&self) -> mongodb::Collection<Category> {
        self.db.collection(collections::CATEGORIES)
    }

    /// Create a category, optionally under a parent. The new category's
    /// path is the parent's path plus the parent's own id; roots get an
    /// empty path. Creation always yields an active category.
    pub async fn create(&self, name: &str, parent_id: Option<&str>) -> CatalogResult<Category> {
        let coll = self.categories();

        let (parent_oid, path) = match parent_id {
            Some(pid) => {
                let oid = parse_id(pid)?;
                let parent = coll
                    .find_one(doc! { "_id": oid }, None)
                    .await?
                    .ok_or_else(|| CatalogError::ParentNotFound(pid.to_string()))?;
                (Some(oid), child_path(&parent))
            }
            None => (None, Vec::new()),
        };

        let now = Utc::now();
        let category = Category {
            id: None,
            name: name.to_string(),
            parent_id: parent_oid,
            path,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let result = coll.insert_one(&category, None).await?;
        let mut category = category;
        category.id = result.inserted_id.as_object_id();
        tracing::info!(category_id = %category.id_hex(), "created category");
        Ok(category)
    }

    /// Fetch all active categories and assemble them into a tree.
    pub async fn find_tree(&self) -> CatalogResult<Vec<CategoryTreeNode>> {
        let cursor = self
            .categories()
            .find(doc! { "is_active": true }, None)
            .await?;
        let categories: Vec<Category> = cursor.try_collect().await?;
        Ok(build_tree(categories))
    }

    /// Update a category's name and/or parent. A reparent happens only
    /// when `parent_id` is explicitly present in the request (tri-state:
    /// absent leaves the parent alone, `Some(None)` detaches to root)
    /// and differs from the stored parent. Reparenting recomputes this
    /// category's path and cascades the rewrite to all descendants.
    ///
    /// `isActive` in the update body is accepted by the API contract but
    /// intentionally not applied here; soft delete goes through `remove`.
    pub async fn update(
        &self,
        id: &str,
        name: Option<String>,
        parent_id: Option<Option<String>>,
    ) -> CatalogResult<Category> {
        let oid = parse_id(id)?;
        let coll = self.categories();

        let mut category = coll
            .find_one(doc! { "_id": oid }, None)
            .await?
            .ok_or_else(|| CatalogError::CategoryNotFound(id.to_string()))?;

        let mut reparented = false;
        if let Some(new_parent) = parent_id {
            // Parse before comparing: ObjectId hex is case-insensitive on
            // input, so two spellings of the same id must be treated as
            // the same parent.
            let new_parent_oid = new_parent.as_deref().map(parse_id).transpose()?;
            if new_parent_oid != category.parent_id {
                match new_parent_oid {
                    Some(parent_oid) => {
                        let parent = coll
                            .find_one(doc! { "_id": parent_oid }, None)
                            .await?
                            .ok_or_else(|| CatalogError::ParentNotFound(parent_oid.to_hex()))?;

                        // A descendant cannot become the parent of its own
                        // ancestor; the stored document stays untouched.
                        if creates_cycle(parent_oid, &parent.path, oid) {
                            return Err(CatalogError::CircularReference);
                        }

                        category.parent_id = Some(parent_oid);
                        category.path = child_path(&parent);
                    }
                    None => {
                        // Detach to root
                        category.parent_id = None;
                        category.path = Vec::new();
                    }
                }
                reparented = true;
            }
        }

        if let Some(n) = name {
            category.name = n;
        }
        category.updated_at = Utc::now();

        coll.replace_one(doc! { "_id": oid }, &category, None)
            .await?;

        // Descendant paths are derived from the stored parent document,
        // so the cascade runs after the reparented category is persisted.
        if reparented {
            tracing::info!(category_id = %id, "reparented category, cascading path updates");
            self.update_children_paths(id.to_string()).await?;
        }

        Ok(category)
    }

    /// Recursively rewrite the paths of all descendants of `parent_id`.
    ///
    /// Fetches direct children regardless of `is_active`, rewrites each
    /// child's path from the parent's stored path, then recurses into the
    /// child. Per-node sequential writes; termination is guaranteed by
    /// the acyclic parent relation.
    fn update_children_paths(&self, parent_id: String) -> BoxFuture<'_, CatalogResult<()>> {
        Box::pin(async move {
            let oid = parse_id(&parent_id)?;
            let coll = self.categories();

            let parent = coll
                .find_one(doc! { "_id": oid }, None)
                .await?
                .ok_or_else(|| CatalogError::CategoryNotFound(parent_id.clone()))?;
            let new_path = child_path(&parent);

            let cursor = coll.find(doc! { "parent_id": oid }, None).await?;
            let children: Vec<Category> = cursor.try_collect().await?;

            for child in children {
                let child_id = match child.id {
                    Some(cid) => cid,
                    None => continue,
                };
                coll.update_one(
                    doc! { "_id": child_id },
                    doc! { "$set": { "path": new_path.clone() } },
                    None,
                )
                .await?;
                self.update_children_paths(child_id.to_hex()).await?;
            }

            Ok(())
        })
    }

    /// Soft delete: mark the category inactive. Refused while any active
    /// child exists.
    pub async fn remove(&self, id: &str) -> CatalogResult<Category> {
        let oid = parse_id(id)?;
        let coll = self.categories();

        let active_children = coll
            .count_documents(doc! { "parent_id": oid, "is_active": true }, None)
            .await?;
        if active_children > 0 {
            return Err(CatalogError::ActiveChildren);
        }

        let mut category = coll
            .find_one(doc! { "_id": oid }, None)
            .await?
            .ok_or_else(|| CatalogError::CategoryNotFound(id.to_string()))?;

        category.is_active = false;
        category.updated_at = Utc::now();
        coll.replace_one(doc! { "_id": oid }, &category, None)
            .await?;
        tracing::info!(category_id = %id, "soft-deleted category");
        Ok(category)
    }

    /// Hard delete: remove the document permanently. Refused while any
    /// active child exists.
    pub async fn permanent_remove(&self, id: &str) -> CatalogResult<DeleteAck> {
        let oid = parse_id(id)?;
        let coll = self.categories();

        let active_children = coll
            .count_documents(doc! { "parent_id": oid, "is_active": true }, None)
            .await?;
        if active_children > 0 {
            return Err(CatalogError::ActiveChildren);
        }

        let result = coll.delete_one(doc! { "_id": oid }, None).await?;
        if result.deleted_count == 0 {
            return Err(CatalogError::CategoryNotFound(id.to_string()));
        }

        tracing::info!(category_id = %id, "permanently deleted category");
        Ok(DeleteAck {
            message: format!("category deleted successfully for ID: {}", id),
            status_code: 200,
            response: DeleteOutcome {
                deleted_count: result.deleted_count,
                acknowledged: true,
            },
        })
    }
}

fn parse_id(id: &str) -> CatalogResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| CatalogError::InvalidId(id.to_string()))
}

/// Path for a child of `parent`: the parent's own ancestry plus the
/// parent itself.
pub(crate) fn child_path(parent: &Category) -> Vec<String> {
    let mut path = parent.path.clone();
    if let Some(id) = parent.id {
        path.push(id.to_hex());
    }
    path
}

/// Would making `candidate_parent` the parent of `id` create a cycle?
/// True when the candidate is the category itself or any of its
/// descendants (i.e. the candidate's ancestry already contains `id`).
/// Takes parsed ids so case-variant hex spellings of the same id cannot
/// slip past the comparison; stored path entries are lowercase
/// `to_hex()` output.
pub(crate) fn creates_cycle(
    candidate_parent: ObjectId,
    candidate_path: &[String],
    id: ObjectId,
) -> bool {
    candidate_parent == id || candidate_path.contains(&id.to_hex())
}

/// Assemble active categories into a forest of tree nodes.
///
/// Two passes: record every category, then hang each one under its
/// parent when the parent is present in the batch. A category whose
/// parent is absent (inactive or deleted) is promoted to a root rather
/// than dropped. Sibling order follows fetch order and is not
/// guaranteed stable across storage backends.
pub(crate) fn build_tree(categories: Vec<Category>) -> Vec<CategoryTreeNode> {
    let ids: HashSet<String> = categories.iter().map(|c| c.id_hex()).collect();

    let mut children_of: HashMap<String, Vec<usize>> = HashMap::new();
    let mut roots: Vec<usize> = Vec::new();
    for (i, category) in categories.iter().enumerate() {
        match category.parent_id.map(|p| p.to_hex()) {
            Some(parent) if ids.contains(&parent) => {
                children_of.entry(parent).or_default().push(i)
            }
            _ => roots.push(i),
        }
    }

    fn assemble(
        i: usize,
        categories: &[Category],
        children_of: &HashMap<String, Vec<usize>>,
    ) -> CategoryTreeNode {
        let category = &categories[i];
        let id = category.id_hex();
        let children = children_of
            .get(&id)
            .map(|indices| {
                indices
                    .iter()
                    .map(|&j| assemble(j, categories, children_of))
                    .collect()
            })
            .unwrap_or_default();
        CategoryTreeNode {
            id,
            name: category.name.clone(),
            children,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }

    roots
        .iter()
        .map(|&i| assemble(i, &categories, &children_of))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: ObjectId, name: &str, parent: Option<&Category>) -> Category {
        let now = Utc::now();
        Category {
            id: Some(id),
            name: name.to_string(),
            parent_id: parent.and_then(|p| p.id),
            path: parent.map(child_path).unwrap_or_default(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_child_path_of_root() {
        let root = category(ObjectId::new(), "Electronics", None);
        assert!(root.path.is_empty());
        assert_eq!(child_path(&root), vec![root.id_hex()]);
    }

    #[test]
    fn test_child_path_accumulates_ancestry() {
        let root = category(ObjectId::new(), "Electronics", None);
        let phones = category(ObjectId::new(), "Phones", Some(&root));
        assert_eq!(phones.path, vec![root.id_hex()]);
        assert_eq!(
            child_path(&phones),
            vec![root.id_hex(), phones.id_hex()]
        );
    }

    #[test]
    fn test_detached_category_has_empty_path() {
        // Reparenting to null resets the ancestry entirely.
        let root = category(ObjectId::new(), "Electronics", None);
        let mut phones = category(ObjectId::new(), "Phones", Some(&root));
        phones.parent_id = None;
        phones.path = Vec::new();
        assert!(phones.path.is_empty());
        assert_eq!(child_path(&phones), vec![phones.id_hex()]);
    }

    #[test]
    fn test_cycle_guard_rejects_descendant_as_parent() {
        let a = category(ObjectId::new(), "A", None);
        let b = category(ObjectId::new(), "B", Some(&a));
        let c = category(ObjectId::new(), "C", Some(&b));
        // C's path contains A, so A cannot be moved under C.
        assert!(creates_cycle(c.id.unwrap(), &c.path, a.id.unwrap()));
        // B under C is equally a cycle.
        assert!(creates_cycle(c.id.unwrap(), &c.path, b.id.unwrap()));
    }

    #[test]
    fn test_cycle_guard_rejects_self_parent() {
        let a = category(ObjectId::new(), "A", None);
        assert!(creates_cycle(a.id.unwrap(), &a.path, a.id.unwrap()));
    }

    #[test]
    fn test_cycle_guard_allows_unrelated_parent() {
        let a = category(ObjectId::new(), "A", None);
        let b = category(ObjectId::new(), "B", None);
        assert!(!creates_cycle(b.id.unwrap(), &b.path, a.id.unwrap()));
    }

    #[test]
    fn test_cycle_guard_sees_through_mixed_case_ids() {
        // ObjectId hex parsing is case-insensitive, so an uppercase
        // spelling of an id addresses the same document as the stored
        // lowercase form and must hit the guard all the same.
        let a = category(ObjectId::new(), "A", None);
        let b = category(ObjectId::new(), "B", Some(&a));

        let a_upper = a.id_hex().to_uppercase();
        let reparsed = ObjectId::parse_str(&a_upper).unwrap();
        assert_eq!(reparsed, a.id.unwrap());

        // Self-parent via the uppercase spelling.
        assert!(creates_cycle(reparsed, &a.path, a.id.unwrap()));
        // Descendant-as-parent where the moved category arrived with an
        // uppercase id while b's stored path holds lowercase hex.
        assert!(creates_cycle(b.id.unwrap(), &b.path, reparsed));
    }

    #[test]
    fn test_cascade_recomputes_descendant_paths_transitively() {
        // Chain A -> B -> C -> D, then A is moved under a new root R.
        // The per-node recomputation the cascade performs must propagate
        // R through every descendant's path.
        let r = category(ObjectId::new(), "R", None);
        let mut a = category(ObjectId::new(), "A", None);
        let mut b = category(ObjectId::new(), "B", Some(&a));
        let mut c = category(ObjectId::new(), "C", Some(&b));
        let mut d = category(ObjectId::new(), "D", Some(&c));

        a.parent_id = r.id;
        a.path = child_path(&r);
        b.path = child_path(&a);
        c.path = child_path(&b);
        d.path = child_path(&c);

        assert_eq!(b.path, vec![r.id_hex(), a.id_hex()]);
        assert_eq!(c.path, vec![r.id_hex(), a.id_hex(), b.id_hex()]);
        assert_eq!(
            d.path,
            vec![r.id_hex(), a.id_hex(), b.id_hex(), c.id_hex()]
        );
        // No document's path may contain its own id.
        for cat in [&a, &b, &c, &d] {
            assert!(!cat.path.contains(&cat.id_hex()));
        }
    }

    #[test]
    fn test_build_tree_nests_children_under_parents() {
        let r = category(ObjectId::new(), "R", None);
        let a = category(ObjectId::new(), "A", Some(&r));
        let b = category(ObjectId::new(), "B", Some(&a));

        let tree = build_tree(vec![r.clone(), a.clone(), b.clone()]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, r.id_hex());
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].id, a.id_hex());
        assert_eq!(tree[0].children[0].children.len(), 1);
        assert_eq!(tree[0].children[0].children[0].id, b.id_hex());
        assert!(tree[0].children[0].children[0].children.is_empty());
    }

    #[test]
    fn test_build_tree_excludes_absent_categories() {
        // The tree query filters inactive categories before build_tree
        // runs; an inactive B must not show up under A.
        let r = category(ObjectId::new(), "R", None);
        let a = category(ObjectId::new(), "A", Some(&r));
        let b = category(ObjectId::new(), "B", Some(&a));

        let tree = build_tree(vec![r.clone(), a.clone()]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children.len(), 1);
        assert!(tree[0].children[0].children.is_empty());

        fn contains(nodes: &[CategoryTreeNode], id: &str) -> bool {
            nodes
                .iter()
                .any(|n| n.id == id || contains(&n.children, id))
        }
        assert!(!contains(&tree, &b.id_hex()));
    }

    #[test]
    fn test_build_tree_promotes_orphans_to_roots() {
        // A child whose parent is missing from the active batch (parent
        // inactive or deleted) becomes a root rather than disappearing.
        let r = category(ObjectId::new(), "R", None);
        let a = category(ObjectId::new(), "A", Some(&r));
        let b = category(ObjectId::new(), "B", Some(&a));

        // R and B active, A not fetched: B is orphaned.
        let tree = build_tree(vec![r.clone(), b.clone()]);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].id, r.id_hex());
        assert_eq!(tree[1].id, b.id_hex());
    }

    #[test]
    fn test_build_tree_preserves_fetch_order_among_siblings() {
        let r = category(ObjectId::new(), "R", None);
        let a = category(ObjectId::new(), "A", Some(&r));
        let b = category(ObjectId::new(), "B", Some(&r));
        let c = category(ObjectId::new(), "C", Some(&r));

        let tree = build_tree(vec![r.clone(), a.clone(), b.clone(), c.clone()]);
        let names: Vec<&str> = tree[0].children.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_build_tree_empty_input() {
        assert!(build_tree(Vec::new()).is_empty());
    }
}

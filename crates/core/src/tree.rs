//! Parent/child derivation over the flat working set.
//!
//! All traversals are iterative and track visited ids, so a cyclic parent
//! relation surfaces as [`Error::CycleDetected`] instead of unbounded recursion.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::notes::{Error, Note, Result};

/// Hierarchical view of a note, without its body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub id: i64,
    pub title: String,
    pub parent_id: Option<i64>,
    pub children: Vec<TreeNode>,
}

/// Maps each parent id (`None` for roots) to its children, sorted by id.
fn children_by_parent(notes: &[Note]) -> HashMap<Option<i64>, Vec<&Note>> {
    let mut map: HashMap<Option<i64>, Vec<&Note>> = HashMap::new();
    for note in notes {
        map.entry(note.parent_id).or_default().push(note);
    }
    for children in map.values_mut() {
        children.sort_by_key(|note| note.id);
    }
    map
}

fn parent_map(notes: &[Note]) -> HashMap<i64, Option<i64>> {
    notes.iter().map(|note| (note.id, note.parent_id)).collect()
}

/// Walks up from `id`; true if an id repeats before reaching a root or a missing parent.
fn ancestry_loops(parents: &HashMap<i64, Option<i64>>, id: i64) -> bool {
    let mut seen = HashSet::new();
    let mut current = Some(id);
    while let Some(ancestor) = current {
        if !seen.insert(ancestor) {
            return true;
        }
        current = match parents.get(&ancestor) {
            Some(parent) => *parent,
            None => return false,
        };
    }
    false
}

/// Builds the forest of all notes whose parent is `None`.
///
/// Fails with `CycleDetected` when a note is reachable twice or its ancestry
/// loops back on itself. Notes below a missing parent are not part of any tree.
pub fn build_forest(notes: &[Note]) -> Result<Vec<TreeNode>> {
    let children = children_by_parent(notes);
    let mut visited: HashSet<i64> = HashSet::with_capacity(notes.len());

    // Pre-order walk to validate and fix the visiting order
    let mut order: Vec<&Note> = Vec::with_capacity(notes.len());
    let mut stack: Vec<&Note> = children
        .get(&None)
        .map(|roots| roots.iter().rev().copied().collect())
        .unwrap_or_default();

    while let Some(note) = stack.pop() {
        if !visited.insert(note.id) {
            return Err(Error::CycleDetected(note.id));
        }
        order.push(note);
        if let Some(kids) = children.get(&Some(note.id)) {
            stack.extend(kids.iter().rev().copied());
        }
    }

    // Unreached notes either hang below a missing parent (left out, as they
    // are unreachable from any root) or sit on a loop
    let parents = parent_map(notes);
    if let Some(stray) = notes
        .iter()
        .filter(|note| !visited.contains(&note.id))
        .find(|note| ancestry_loops(&parents, note.id))
    {
        return Err(Error::CycleDetected(stray.id));
    }

    // Assemble bottom-up: reverse pre-order guarantees children are built first
    let mut built: HashMap<i64, TreeNode> = HashMap::with_capacity(order.len());
    for note in order.iter().rev() {
        let kids: Vec<TreeNode> = children
            .get(&Some(note.id))
            .map(|kids| {
                kids.iter()
                    .filter_map(|kid| built.remove(&kid.id))
                    .collect()
            })
            .unwrap_or_default();
        built.insert(
            note.id,
            TreeNode {
                id: note.id,
                title: note.title.clone(),
                parent_id: note.parent_id,
                children: kids,
            },
        );
    }

    Ok(children
        .get(&None)
        .map(|roots| {
            roots
                .iter()
                .filter_map(|root| built.remove(&root.id))
                .collect()
        })
        .unwrap_or_default())
}

/// Returns `id` and all of its descendants, children before their parents.
pub fn collect_subtree(notes: &[Note], id: i64) -> Result<Vec<i64>> {
    let children = children_by_parent(notes);
    let mut visited = HashSet::new();
    let mut pre_order = Vec::new();
    let mut stack = vec![id];

    while let Some(current) = stack.pop() {
        if !visited.insert(current) {
            return Err(Error::CycleDetected(current));
        }
        pre_order.push(current);
        if let Some(kids) = children.get(&Some(current)) {
            stack.extend(kids.iter().map(|kid| kid.id));
        }
    }

    pre_order.reverse();
    Ok(pre_order)
}

/// True when placing `id` under `new_parent` would close a loop.
pub fn would_create_cycle(notes: &[Note], id: i64, new_parent: i64) -> bool {
    if id == new_parent {
        return true;
    }

    let parents = parent_map(notes);
    let mut seen = HashSet::new();
    let mut current = Some(new_parent);

    while let Some(ancestor) = current {
        if ancestor == id {
            return true;
        }
        if !seen.insert(ancestor) {
            // Pre-existing loop above new_parent that does not include id
            return false;
        }
        current = parents.get(&ancestor).copied().flatten();
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: i64, parent_id: Option<i64>) -> Note {
        Note {
            id,
            title: format!("Note {}", id),
            content: String::new(),
            parent_id,
            created: String::new(),
            modified: String::new(),
        }
    }

    fn sample() -> Vec<Note> {
        vec![
            note(1, None),
            note(2, Some(1)),
            note(3, Some(1)),
            note(4, Some(2)),
        ]
    }

    #[test]
    fn test_build_forest_nests_children() {
        let forest = build_forest(&sample()).unwrap();

        assert_eq!(forest.len(), 1);
        let root = &forest[0];
        assert_eq!(root.id, 1);
        assert_eq!(root.parent_id, None);
        assert_eq!(
            root.children.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![2, 3]
        );
        assert_eq!(root.children[0].children.len(), 1);
        assert_eq!(root.children[0].children[0].id, 4);
        assert_eq!(root.children[0].children[0].parent_id, Some(2));
        assert!(root.children[1].children.is_empty());
    }

    #[test]
    fn test_build_forest_sorts_siblings_by_id() {
        let notes = vec![note(9, None), note(5, Some(9)), note(2, None), note(3, Some(9))];
        let forest = build_forest(&notes).unwrap();

        assert_eq!(forest.iter().map(|n| n.id).collect::<Vec<_>>(), vec![2, 9]);
        assert_eq!(
            forest[1].children.iter().map(|n| n.id).collect::<Vec<_>>(),
            vec![3, 5]
        );
    }

    #[test]
    fn test_build_forest_empty() {
        assert!(build_forest(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_build_forest_detects_cycle() {
        let notes = vec![note(1, None), note(2, Some(3)), note(3, Some(2))];
        assert!(matches!(
            build_forest(&notes),
            Err(Error::CycleDetected(_))
        ));

        let self_loop = vec![note(1, Some(1))];
        assert!(matches!(
            build_forest(&self_loop),
            Err(Error::CycleDetected(1))
        ));
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let mut notes = vec![note(1, None)];
        for id in 2..=5_000 {
            notes.push(note(id, Some(id - 1)));
        }

        let forest = build_forest(&notes).unwrap();
        assert_eq!(forest.len(), 1);
        assert_eq!(collect_subtree(&notes, 1).unwrap().len(), 5_000);

        // Drop nested nodes iteratively to keep the test's own stack shallow
        let mut pending = forest;
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }

    #[test]
    fn test_build_forest_skips_dangling_branch() {
        let notes = vec![note(1, None), note(2, Some(99)), note(3, Some(2))];
        let forest = build_forest(&notes).unwrap();

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id, 1);
    }

    #[test]
    fn test_collect_subtree_children_first() {
        let ids = collect_subtree(&sample(), 1).unwrap();

        assert_eq!(ids.len(), 4);
        assert_eq!(*ids.last().unwrap(), 1);
        let pos = |id: i64| ids.iter().position(|x| *x == id).unwrap();
        assert!(pos(4) < pos(2));
        assert!(pos(2) < pos(1));
        assert!(pos(3) < pos(1));
    }

    #[test]
    fn test_collect_subtree_leaf() {
        assert_eq!(collect_subtree(&sample(), 3).unwrap(), vec![3]);
    }

    #[test]
    fn test_collect_subtree_detects_cycle() {
        let notes = vec![note(1, Some(2)), note(2, Some(1))];
        assert!(matches!(
            collect_subtree(&notes, 1),
            Err(Error::CycleDetected(1))
        ));
    }

    #[test]
    fn test_would_create_cycle() {
        let notes = sample();

        assert!(would_create_cycle(&notes, 1, 1));
        assert!(would_create_cycle(&notes, 1, 4));
        assert!(would_create_cycle(&notes, 2, 4));
        assert!(!would_create_cycle(&notes, 4, 3));
        assert!(!would_create_cycle(&notes, 3, 2));
    }
}

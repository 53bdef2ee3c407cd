use notegraph_core::{build_hierarchy, HierarchyNode, Lang, Note, TreeOptions};
use std::collections::HashMap;

fn summary(nodes: &[HierarchyNode]) -> Vec<(&str, usize)> {
    nodes
        .iter()
        .map(|node| (node.id.as_str(), node.depth))
        .collect()
}

fn assert_tree_invariants(nodes: &[HierarchyNode]) {
    let roots: Vec<&HierarchyNode> = nodes.iter().filter(|node| node.parent_id.is_none()).collect();
    assert_eq!(roots.len(), 1, "exactly one root expected");
    assert_eq!(roots[0].depth, 0);

    let positions: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(index, node)| (node.id.as_str(), index))
        .collect();
    for (index, node) in nodes.iter().enumerate() {
        assert_eq!(node.path.last().map(String::as_str), Some(node.id.as_str()));
        assert_eq!(node.path.len(), node.depth + 1);
        if let Some(parent_id) = node.parent_id.as_deref() {
            let parent = &nodes[positions[parent_id]];
            assert_eq!(node.depth, parent.depth + 1);
            assert!(positions[parent_id] < index, "parent must precede child");
            assert_eq!(&node.path[..node.path.len() - 1], parent.path.as_slice());
        }
    }
}

#[test]
fn single_root_needs_no_synthetic_root() {
    let notes = vec![
        Note::with_id("c", "c").under("a"),
        Note::with_id("b", "b").under("root"),
        Note::with_id("root", "top"),
        Note::with_id("a", "a").under("root"),
    ];

    let hierarchy = build_hierarchy(&notes, &TreeOptions::default()).unwrap();

    assert_eq!(hierarchy.synthetic_root, None);
    assert_eq!(
        summary(&hierarchy.nodes),
        vec![("root", 0), ("a", 1), ("c", 2), ("b", 1)]
    );
    assert_eq!(hierarchy.nodes[2].path, vec!["root", "a", "c"]);
    assert_tree_invariants(&hierarchy.nodes);
}

#[test]
fn two_roots_get_a_synthetic_root() {
    let notes = vec![Note::with_id("y", "y"), Note::with_id("x", "x")];

    let hierarchy = build_hierarchy(&notes, &TreeOptions::default()).unwrap();

    assert_eq!(hierarchy.synthetic_root.as_deref(), Some("root"));
    assert_eq!(summary(&hierarchy.nodes), vec![("root", 0), ("x", 1), ("y", 1)]);
    assert!(hierarchy.nodes[0].synthetic);
    assert_eq!(hierarchy.nodes[1].parent_id.as_deref(), Some("root"));
    assert_eq!(hierarchy.nodes[2].path, vec!["root", "y"]);
    assert_tree_invariants(&hierarchy.nodes);
}

#[test]
fn original_roots_move_to_depth_one_and_descendants_shift() {
    let notes = vec![
        Note::with_id("x", "x"),
        Note::with_id("x1", "x1").under("x"),
        Note::with_id("x2", "x2").under("x1"),
        Note::with_id("y", "y"),
    ];

    let hierarchy = build_hierarchy(&notes, &TreeOptions::default()).unwrap();

    assert_eq!(
        summary(&hierarchy.nodes),
        vec![("root", 0), ("x", 1), ("x1", 2), ("x2", 3), ("y", 1)]
    );
    assert_eq!(hierarchy.get("x2").unwrap().path, vec!["root", "x", "x1", "x2"]);
    assert_eq!(hierarchy.max_depth(), 3);
    assert_tree_invariants(&hierarchy.nodes);
}

#[test]
fn dangling_parent_is_treated_as_root_and_reported() {
    let notes = vec![
        Note::with_id("a", "a"),
        Note::with_id("orphan", "orphan").under("ghost"),
        Note::with_id("kid", "kid").under("orphan"),
    ];

    let hierarchy = build_hierarchy(&notes, &TreeOptions::default()).unwrap();

    assert_eq!(hierarchy.synthetic_root.as_deref(), Some("root"));
    assert_eq!(hierarchy.dangling_parents.len(), 1);
    assert_eq!(hierarchy.dangling_parents[0].note_id, "orphan");
    assert_eq!(hierarchy.dangling_parents[0].missing_parent_id, "ghost");
    let orphan = hierarchy.get("orphan").unwrap();
    assert_eq!(orphan.parent_id.as_deref(), Some("root"));
    assert_eq!(orphan.depth, 1);
    assert_eq!(hierarchy.get("kid").unwrap().depth, 2);
    assert_tree_invariants(&hierarchy.nodes);
}

#[test]
fn single_dangling_root_keeps_null_parent() {
    let notes = vec![
        Note::with_id("a", "a").under("missing"),
        Note::with_id("b", "b").under("a"),
    ];

    let hierarchy = build_hierarchy(&notes, &TreeOptions::default()).unwrap();

    assert_eq!(hierarchy.synthetic_root, None);
    assert_eq!(hierarchy.nodes[0].id, "a");
    assert_eq!(hierarchy.nodes[0].parent_id, None);
    assert_tree_invariants(&hierarchy.nodes);
}

#[test]
fn empty_store_yields_only_the_synthetic_root() {
    let hierarchy = build_hierarchy(&[], &TreeOptions::default()).unwrap();

    assert_eq!(summary(&hierarchy.nodes), vec![("root", 0)]);
    assert!(hierarchy.nodes[0].synthetic);
}

#[test]
fn parent_cycle_terminates_and_keeps_every_note() {
    let notes = vec![
        Note::with_id("top", "top"),
        Note::with_id("a", "a").under("b"),
        Note::with_id("b", "b").under("a"),
        Note::with_id("c", "c").under("a"),
    ];

    let hierarchy = build_hierarchy(&notes, &TreeOptions::default()).unwrap();

    assert_eq!(hierarchy.cycle_breaks, vec!["a".to_string()]);
    assert_eq!(hierarchy.nodes.len(), 5);
    assert_eq!(
        summary(&hierarchy.nodes),
        vec![("root", 0), ("a", 1), ("b", 2), ("c", 2), ("top", 1)]
    );
    assert_tree_invariants(&hierarchy.nodes);
}

#[test]
fn synthetic_root_id_avoids_collision_with_real_note() {
    let notes = vec![
        Note::with_id("root", "real root"),
        Note::with_id("other", "other"),
    ];

    let hierarchy = build_hierarchy(&notes, &TreeOptions::default()).unwrap();

    assert_eq!(hierarchy.synthetic_root.as_deref(), Some("root_"));
    let real = hierarchy.get("root").unwrap();
    assert!(!real.synthetic);
    assert_eq!(real.parent_id.as_deref(), Some("root_"));
    assert_tree_invariants(&hierarchy.nodes);
}

#[test]
fn lang_selects_secondary_content_when_present() {
    let notes = vec![
        Note::with_id("a", "apple").with_content_zh("苹果"),
        Note::with_id("b", "banana").under("a"),
    ];
    let options = TreeOptions {
        lang: Lang::Zh,
        ..TreeOptions::default()
    };

    let hierarchy = build_hierarchy(&notes, &options).unwrap();

    assert_eq!(hierarchy.get("a").unwrap().content, "苹果");
    assert_eq!(hierarchy.get("b").unwrap().content, "banana");
}

#[test]
fn wide_and_deep_tree_keeps_preorder() {
    let mut notes = vec![Note::with_id("n", "n")];
    for branch in 0..5 {
        let branch_id = format!("n{branch}");
        notes.push(Note::with_id(branch_id.clone(), "branch").under("n"));
        let mut parent = branch_id;
        for level in 0..6 {
            let id = format!("{parent}-{level}");
            notes.push(Note::with_id(id.clone(), "leaf").under(parent.clone()));
            parent = id;
        }
    }

    let hierarchy = build_hierarchy(&notes, &TreeOptions::default()).unwrap();

    assert_eq!(hierarchy.nodes.len(), notes.len());
    assert_eq!(hierarchy.max_depth(), 7);
    assert_tree_invariants(&hierarchy.nodes);
}

use notegraph_core::tree::descendants::collect_descendants;
use notegraph_core::{filter_descendants, Lang, Link, Note, NoteId, TreeError, TreeOptions};

fn options() -> TreeOptions {
    TreeOptions {
        max_depth: 64,
        ..TreeOptions::default()
    }
}

fn seeds(ids: &[&str]) -> Vec<NoteId> {
    ids.iter().map(|id| id.to_string()).collect()
}

/// root -> a -> c -> d
/// root -> b -> c (c has a single parent `a`; `b` also reaches `e`)
fn fixture() -> Vec<Note> {
    vec![
        Note::with_id("root", "root"),
        Note::with_id("a", "a").under("root"),
        Note::with_id("b", "b").under("root"),
        Note::with_id("c", "c").under("a"),
        Note::with_id("d", "d").under("c"),
        Note::with_id("e", "e").under("b"),
    ]
}

#[test]
fn single_seed_collects_subtree_with_local_depth() {
    let nodes = collect_descendants(&fixture(), &seeds(&["a"]), &options()).unwrap();

    let summary: Vec<(&str, usize, Option<&str>)> = nodes
        .iter()
        .map(|node| (node.id.as_str(), node.depth, node.parent_id.as_deref()))
        .collect();
    assert_eq!(
        summary,
        vec![("a", 0, None), ("c", 1, Some("a")), ("d", 2, Some("c"))]
    );
    assert!(nodes.iter().all(|node| node.root_id == "a"));
    assert_eq!(nodes[2].path, vec!["a", "c", "d"]);
}

#[test]
fn shared_descendant_appears_once_owned_by_first_seed() {
    // `c` is reachable from both `root` and `a`.
    let nodes = collect_descendants(&fixture(), &seeds(&["a", "root"]), &options()).unwrap();

    let c_entries: Vec<_> = nodes.iter().filter(|node| node.id == "c").collect();
    assert_eq!(c_entries.len(), 1);
    assert_eq!(c_entries[0].root_id, "a");
    assert_eq!(c_entries[0].depth, 1);

    let ids: Vec<&str> = nodes.iter().map(|node| node.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c", "d", "root", "b", "e"]);
    let b = nodes.iter().find(|node| node.id == "b").unwrap();
    assert_eq!(b.root_id, "root");
    assert_eq!(b.depth, 1);
}

#[test]
fn seed_inside_earlier_seed_subtree_is_not_duplicated() {
    let nodes = collect_descendants(&fixture(), &seeds(&["root", "c"]), &options()).unwrap();

    assert_eq!(nodes.len(), 6);
    let c = nodes.iter().find(|node| node.id == "c").unwrap();
    assert_eq!(c.root_id, "root");
    assert_eq!(c.depth, 2);
}

#[test]
fn missing_seed_is_skipped_when_another_resolves() {
    let nodes = collect_descendants(&fixture(), &seeds(&["ghost", "b"]), &options()).unwrap();

    let ids: Vec<&str> = nodes.iter().map(|node| node.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "e"]);
}

#[test]
fn empty_seed_list_is_malformed() {
    let err = collect_descendants(&fixture(), &[], &options()).unwrap_err();
    assert!(matches!(err, TreeError::MalformedInput(_)));

    let err = collect_descendants(&fixture(), &seeds(&["  "]), &options()).unwrap_err();
    assert!(matches!(err, TreeError::MalformedInput(_)));
}

#[test]
fn unknown_seeds_are_not_found() {
    let err = collect_descendants(&fixture(), &seeds(&["nonexistent"]), &options()).unwrap_err();
    assert_eq!(err, TreeError::NotFound(seeds(&["nonexistent"])));
}

#[test]
fn cyclic_parents_terminate() {
    let notes = vec![
        Note::with_id("a", "a").under("b"),
        Note::with_id("b", "b").under("a"),
    ];

    let nodes = collect_descendants(&notes, &seeds(&["a"]), &options()).unwrap();
    let ids: Vec<&str> = nodes.iter().map(|node| node.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[test]
fn depth_ceiling_is_enforced() {
    let shallow = TreeOptions {
        max_depth: 1,
        ..TreeOptions::default()
    };
    let err = collect_descendants(&fixture(), &seeds(&["root"]), &shallow).unwrap_err();
    assert!(matches!(err, TreeError::DepthLimitExceeded { limit: 1, .. }));
}

#[test]
fn links_touching_either_endpoint_are_kept() {
    let links = vec![
        Link::new("a", "c", 10.0),
        Link::new("d", "e", 20.0),
        Link::new("b", "root", 30.0),
        Link::new("root", "d", 40.0),
    ];

    let view = filter_descendants(&fixture(), &links, &seeds(&["a"]), &options()).unwrap();

    let weights: Vec<f64> = view.links.iter().map(|link| link.weight).collect();
    assert_eq!(weights, vec![10.0, 20.0, 40.0]);
    assert_eq!(view.root_ids, seeds(&["a"]));
}

#[test]
fn content_follows_requested_language() {
    let notes = vec![
        Note::with_id("a", "hello").with_content_zh("你好"),
        Note::with_id("b", "world").with_content_zh("世界").under("a"),
        Note::with_id("c", "plain").under("a"),
    ];
    let zh = TreeOptions {
        lang: Lang::Zh,
        ..options()
    };

    let nodes = collect_descendants(&notes, &seeds(&["a"]), &zh).unwrap();
    let contents: Vec<&str> = nodes.iter().map(|node| node.content.as_str()).collect();
    assert_eq!(contents, vec!["你好", "世界", "plain"]);

    let nodes = collect_descendants(&notes, &seeds(&["a"]), &options()).unwrap();
    let contents: Vec<&str> = nodes.iter().map(|node| node.content.as_str()).collect();
    assert_eq!(contents, vec!["hello", "world", "plain"]);
}

#[test]
fn seed_ids_are_matched_exactly() {
    let err = collect_descendants(&fixture(), &seeds(&[" a"]), &options()).unwrap_err();
    assert_eq!(err, TreeError::NotFound(seeds(&[" a"])));
}

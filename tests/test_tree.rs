use betadiv::model::{BranchLength, PhyloTree, TreeError, Vertex};
use betadiv::newick::parse_str;

fn vertex_tag(vertex: &Vertex) -> &str {
    vertex.label().or(vertex.name()).unwrap_or("")
}

// ============= Building =============
#[test]
fn test_building_tree() {
    let mut tree = PhyloTree::new(3);
    let index_l1 = tree.add_leaf(Some(BranchLength::new(1.0)), "Tui".to_string());
    let index_l2 = tree.add_leaf(Some(BranchLength::new(1.0)), "Bellbird".to_string());
    let index_l3 = tree.add_leaf(Some(BranchLength::new(0.5)), "Stitchbird".to_string());
    let index_i1 = tree.add_internal(vec![index_l1, index_l2], Some(BranchLength::new(1.5)), None);
    let index_root = tree.add_root(vec![index_l3, index_i1], None, None);

    assert_eq!(tree.num_leaves(), 3);
    assert_eq!(tree.num_internal(), 1);
    assert_eq!(tree.num_vertices(), 5);
    assert!(tree.is_valid());

    let root = tree.root();
    assert_eq!(root.index(), index_root);
    assert!(root.is_root());
    assert_eq!(root.children().unwrap(), [index_l3, index_i1]);

    let l2 = &tree[index_l2];
    assert!(l2.is_leaf());
    assert_eq!(l2.label(), Some("Bellbird"));
    assert_eq!(l2.parent(), Some(index_i1));

    let internal = &tree[index_i1];
    assert!(internal.is_internal());
    assert_eq!(internal.branch_length(), Some(BranchLength::new(1.5)));
    assert_eq!(internal.parent(), Some(index_root));
}

#[test]
fn test_tree_without_root_is_invalid() {
    let mut tree = PhyloTree::new(2);
    tree.add_leaf(None, "A".to_string());
    assert!(!tree.is_root_set());
    assert!(!tree.is_valid());
}

#[test]
#[should_panic]
fn test_get_vertex_out_of_bounds() {
    let tree = PhyloTree::new(2);
    let _ = &tree[55];
}

// ============= Branch lengths =============
#[test]
#[should_panic]
fn test_negative_branch_length_panics() {
    BranchLength::new(-1.0);
}

#[test]
fn test_try_new_rejects_invalid_lengths() {
    assert_eq!(BranchLength::try_new(-0.5), None);
    assert_eq!(BranchLength::try_new(f64::NAN), None);
    assert_eq!(BranchLength::try_new(f64::INFINITY), None);
    assert_eq!(*BranchLength::try_new(0.25).unwrap(), 0.25);
}

#[test]
fn test_join_branch_lengths() {
    let one = Some(BranchLength::new(1.0));
    let two = Some(BranchLength::new(2.0));
    assert_eq!(BranchLength::join(one, two), Some(BranchLength::new(3.0)));
    assert_eq!(BranchLength::join(None, two), two);
    assert_eq!(BranchLength::join(None, None), None);
}

#[test]
fn test_distances_to_root() {
    let tree = parse_str("((A:1,B:2):3,C:4);").unwrap();
    let distances = tree.distances_to_root();
    let leaves = tree.leaf_index_map();

    assert_eq!(distances[leaves["A"]], 4.0);
    assert_eq!(distances[leaves["B"]], 5.0);
    assert_eq!(distances[leaves["C"]], 4.0);
    assert_eq!(distances[tree.root_index()], 0.0);
}

#[test]
fn test_total_branch_length_ignores_root_branch() {
    let tree = parse_str("((A:1,B:2):3,C:4):100;").unwrap();
    assert_eq!(tree.total_branch_length(), 10.0);
}

// ============= Traversal =============
#[test]
fn test_post_order_visits_children_first() {
    let tree = parse_str("((A,B)X,C)R;").unwrap();
    let order: Vec<&str> = tree.post_order_iter().map(vertex_tag).collect();
    assert_eq!(order, ["A", "B", "X", "C", "R"]);
}

#[test]
fn test_pre_order_visits_parents_first() {
    let tree = parse_str("((A,B)X,C)R;").unwrap();
    let order: Vec<&str> = tree.pre_order_iter().map(vertex_tag).collect();
    assert_eq!(order, ["R", "X", "A", "B", "C"]);
}

#[test]
fn test_deep_caterpillar_tree_traversal() {
    let depth = 200;
    let mut newick = "(".repeat(depth);
    newick.push_str("L0");
    for i in 1..=depth {
        newick.push_str(&format!(",L{i}:1)"));
    }
    newick.push(';');

    let tree = parse_str(&newick).unwrap();
    assert_eq!(tree.num_leaves(), depth + 1);
    assert_eq!(tree.post_order_iter().count(), tree.num_vertices());
}

// ============= Sub-tree =============
#[test]
fn test_sub_tree_collapses_unary_vertices() {
    let tree = parse_str("((A:1,B:2):3,(C:4,D:5):6);").unwrap();
    let sub = tree.sub_tree(&["A", "C", "D"], false).unwrap();

    assert_eq!(sub.to_newick(), "(A:4,(C:4,D:5):6);");
    assert!(sub.is_valid());
}

#[test]
fn test_sub_tree_promotes_single_internal_child_to_root() {
    let tree = parse_str("((A:1,B:1)inner:1,C:1)top;").unwrap();
    let sub = tree.sub_tree(&["A", "B"], false).unwrap();

    assert_eq!(sub.to_newick(), "(A:1,B:1)inner;");
    assert!(sub.root().is_root());
    assert!(sub.is_valid());
}

#[test]
fn test_sub_tree_keeps_root_above_single_leaf() {
    let tree = parse_str("((A:1,B:2):3,C:4);").unwrap();
    let sub = tree.sub_tree(&["A"], false).unwrap();

    assert_eq!(sub.num_leaves(), 1);
    assert_eq!(sub.to_newick(), "(A:4);");
    assert!(sub.is_valid());
}

#[test]
fn test_sub_tree_keeps_multifurcation() {
    let tree = parse_str("(A:1,B:1,C:1,D:1);").unwrap();
    let sub = tree.sub_tree(&["A", "C", "D"], false).unwrap();
    assert_eq!(sub.to_newick(), "(A:1,C:1,D:1);");
}

#[test]
fn test_sub_tree_ignores_missing_names_on_request() {
    let tree = parse_str("((A:1,B:2):3,C:4);").unwrap();
    let sub = tree.sub_tree(&["A", "B", "OTU_404"], true).unwrap();
    assert_eq!(sub.leaf_labels(), ["A", "B"]);
}

#[test]
fn test_sub_tree_missing_name_is_error() {
    let tree = parse_str("((A:1,B:2):3,C:4);").unwrap();
    let err = tree.sub_tree(&["A", "OTU_404"], false).unwrap_err();
    assert_eq!(err, TreeError::MissingLeaf("OTU_404".to_string()));
}

#[test]
fn test_sub_tree_without_leaves_is_error() {
    let tree = parse_str("((A:1,B:2):3,C:4);").unwrap();
    let err = tree.sub_tree(&["X", "Y"], true).unwrap_err();
    assert_eq!(err, TreeError::EmptySubTree);

    let none: [&str; 0] = [];
    assert_eq!(tree.sub_tree(&none, true).unwrap_err(), TreeError::EmptySubTree);
}

#[test]
fn test_sub_tree_with_all_leaves_is_same_topology() {
    let newick = "((A:1,B:2):3,(C:4,D:5):6);";
    let tree = parse_str(newick).unwrap();
    let sub = tree.sub_tree(&["A", "B", "C", "D"], false).unwrap();
    assert_eq!(sub.to_newick(), newick);
}

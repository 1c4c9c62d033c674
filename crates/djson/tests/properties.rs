//! Property tests over the whole detect/render pipeline.

use djson::{
    build_tree, detect, escape_string, render, resolve_path, DisplayNode, Map, NodeValue,
    PathComponent, RenderOptions, Value,
};
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;

/// A generated document whose root is always a composite, as the detector
/// requires.
#[derive(Debug, Clone)]
struct ArbDocument(Value);

fn gen_number(g: &mut Gen) -> f64 {
    let mut value = f64::arbitrary(g);
    while !value.is_finite() {
        value = f64::arbitrary(g);
    }
    value
}

fn gen_value(g: &mut Gen, depth: usize) -> Value {
    let kinds = if depth == 0 { 4 } else { 6 };
    match usize::arbitrary(g) % kinds {
        0 => Value::Null,
        1 => Value::Boolean(bool::arbitrary(g)),
        2 => Value::Number(gen_number(g)),
        3 => Value::String(String::arbitrary(g)),
        _ => gen_composite(g, depth - 1),
    }
}

fn gen_composite(g: &mut Gen, depth: usize) -> Value {
    let len = usize::arbitrary(g) % 4;
    if bool::arbitrary(g) {
        let mut arr = Vec::with_capacity(len);
        for _ in 0..len {
            arr.push(gen_value(g, depth));
        }
        Value::Array(arr)
    } else {
        let mut map = Map::new();
        for _ in 0..len {
            map.insert(String::arbitrary(g), gen_value(g, depth));
        }
        Value::Object(map)
    }
}

impl Arbitrary for ArbDocument {
    fn arbitrary(g: &mut Gen) -> Self {
        let depth = usize::arbitrary(g) % 3;
        Self(gen_composite(g, depth))
    }
}

#[quickcheck]
fn detect_round_trips_serialized_documents(doc: ArbDocument) -> bool {
    let text = doc.0.to_string();
    let payload = detect(&text).unwrap();
    payload.wrapper_function_name.is_none()
        && payload.valid_source_text == text
        && payload.value == doc.0
}

#[quickcheck]
fn jsonp_wrapping_is_detected(doc: ArbDocument) -> bool {
    let text = format!("cb({});", doc.0);
    let payload = detect(&text).unwrap();
    payload.wrapper_function_name.as_deref() == Some("cb")
        && payload.valid_source_text == doc.0.to_string()
        && payload.value == doc.0
}

#[quickcheck]
fn render_is_deterministic(
    doc: ArbDocument,
    start_collapsed: bool,
    show_line_numbers: bool,
) -> bool {
    let options = RenderOptions {
        start_collapsed,
        show_line_numbers,
    };
    let first = render(&doc.0, Some("cb"), &options);
    let second = render(&doc.0, Some("cb"), &options);
    first == second
}

#[quickcheck]
fn non_root_composites_collapse_when_asked(doc: ArbDocument) -> bool {
    let options = RenderOptions {
        start_collapsed: true,
        show_line_numbers: false,
    };
    let tree = build_tree(&doc.0, None, &options);
    fn check(node: &DisplayNode, is_root: bool) -> bool {
        let expected = !is_root
            && node.child_count > 0
            && matches!(node.value, NodeValue::Array | NodeValue::Object);
        node.start_collapsed == expected && node.children.iter().all(|c| check(c, false))
    }
    !tree.root.start_collapsed && tree.root.children.iter().all(|c| check(c, false))
}

/// Walks every leaf of the display tree, reconstructs its path from the
/// property/array-element tagging, and resolves that path against the
/// original value.
fn leaves_resolve(node: &DisplayNode, path: &mut Vec<PathComponent>, root: &Value) -> bool {
    match &node.value {
        NodeValue::Array | NodeValue::Object => node.children.iter().enumerate().all(|(i, child)| {
            match &child.key {
                Some(k) => path.push(PathComponent::Key(k.clone())),
                None => path.push(PathComponent::Index(i)),
            }
            let ok = leaves_resolve(child, path, root);
            path.pop();
            ok
        }),
        leaf => match (leaf, resolve_path(root, path)) {
            (NodeValue::Null, Some(Value::Null)) => true,
            (NodeValue::Boolean(b), Some(Value::Boolean(v))) => b == v,
            (NodeValue::Number(n), Some(Value::Number(v))) => n == v,
            (NodeValue::String { escaped, .. }, Some(Value::String(s))) => {
                *escaped == escape_string(s)
            }
            _ => false,
        },
    }
}

#[quickcheck]
fn leaf_paths_resolve_to_original_values(doc: ArbDocument) -> bool {
    let tree = build_tree(&doc.0, None, &RenderOptions::default());
    let mut path = Vec::new();
    leaves_resolve(&tree.root, &mut path, &doc.0)
}

#[quickcheck]
fn child_counts_match_tree_composites(doc: ArbDocument) -> bool {
    let tree = build_tree(&doc.0, None, &RenderOptions::default());
    fn collect(node: &DisplayNode, counts: &mut std::collections::BTreeSet<usize>) {
        if node.child_count > 0 {
            counts.insert(node.child_count);
        }
        for child in &node.children {
            collect(child, counts);
        }
    }
    let mut expected = std::collections::BTreeSet::new();
    collect(&tree.root, &mut expected);
    tree.child_counts == expected
}

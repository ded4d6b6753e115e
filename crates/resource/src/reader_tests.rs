// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

use super::*;
use std::io::Write;

const INVENTORY: &str = r#"
[cluster]
name = "tiny"

[[node]]
name = "head"
cores = 2

[[node]]
name = "work"
count = 3
cores = 4
gpus = 2
"#;

#[test]
fn parse_inventory_builds_hierarchy() {
    let pool = parse_inventory(INVENTORY).unwrap();

    assert_eq!(pool.get(pool.root()).name, "tiny");
    let nodes = pool.of_kind(ResourceKind::Node);
    assert_eq!(nodes.len(), 4);

    let names: Vec<&str> = nodes.iter().map(|id| pool.get(*id).name.as_str()).collect();
    assert_eq!(names, vec!["head", "work0", "work1", "work2"]);

    // head: 2 cores, no gpus; workers: 4 cores + 2 gpus
    assert_eq!(pool.get(nodes[0]).children.len(), 2);
    assert_eq!(pool.get(nodes[1]).children.len(), 6);
}

#[test]
fn parse_inventory_rejects_empty() {
    let err = parse_inventory("[cluster]\nname = \"x\"\n").unwrap_err();
    assert!(matches!(err, ResourceError::Invalid(_)));
}

#[test]
fn parse_inventory_rejects_zero_count() {
    let text = "[cluster]\nname = \"x\"\n[[node]]\nname = \"n\"\ncount = 0\ncores = 1\n";
    let err = parse_inventory(text).unwrap_err();
    assert!(matches!(err, ResourceError::Invalid(_)));
}

#[test]
fn parse_inventory_rejects_bad_toml() {
    let err = parse_inventory("not = [toml").unwrap_err();
    assert!(matches!(err, ResourceError::Parse(_)));
}

#[test]
fn load_file_round_trip() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(INVENTORY.as_bytes()).unwrap();

    let pool = load_file(file.path()).unwrap();
    assert_eq!(pool.of_kind(ResourceKind::Node).len(), 4);
}

#[test]
fn load_file_missing_path_is_io_error() {
    let err = load_file(std::path::Path::new("/nonexistent/inventory.toml")).unwrap_err();
    assert!(matches!(err, ResourceError::Io(_)));
}

#[test]
fn from_topology_signs_nodes() {
    let blobs = vec![
        (TopologyBlob { hostname: "a".into(), cores: 2, gpus: 0 }, "d-a".to_string()),
        (TopologyBlob { hostname: "b".into(), cores: 2, gpus: 1 }, "d-b".to_string()),
    ];
    let pool = from_topology("c", &blobs);

    let nodes = pool.of_kind(ResourceKind::Node);
    assert_eq!(nodes.len(), 2);
    assert_eq!(pool.get(nodes[0]).digest.as_deref(), Some("d-a"));
    assert_eq!(pool.get(nodes[1]).digest.as_deref(), Some("d-b"));
    assert_eq!(pool.get(nodes[1]).children.len(), 3);
}

#[test]
fn link_ranks_signs_matching_nodes() {
    let mut pool = parse_inventory(INVENTORY).unwrap();
    let signatures: Vec<(String, String)> = ["head", "work0", "work1", "work2"]
        .iter()
        .map(|h| (h.to_string(), format!("sig-{h}")))
        .collect();

    link_ranks(&mut pool, &signatures).unwrap();

    for id in pool.of_kind(ResourceKind::Node) {
        let node = pool.get(id);
        assert_eq!(node.digest.as_deref(), Some(&format!("sig-{}", node.name)[..]));
    }
}

#[test]
fn link_ranks_reports_the_unlinked_node() {
    let mut pool = parse_inventory(INVENTORY).unwrap();
    let signatures = vec![("head".to_string(), "sig".to_string())];

    match link_ranks(&mut pool, &signatures) {
        Err(ResourceError::UnlinkedNode(name)) => assert_eq!(name, "work0"),
        other => panic!("expected UnlinkedNode, got {other:?}"),
    }
}

#[test]
fn topology_blob_serde_round_trip() {
    let blob = TopologyBlob { hostname: "n0".into(), cores: 8, gpus: 2 };
    let json = serde_json::to_string(&blob).unwrap();
    let parsed: TopologyBlob = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, blob);
}

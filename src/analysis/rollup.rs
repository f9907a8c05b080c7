//! Taxonomy roll-up: tree construction and bottom-up weighted averages.
//!
//! Records are grouped by their full four-level path. Each group becomes
//! a level-4 leaf carrying the group's mean score and job count. Internal
//! nodes are then reduced depth-first into the job-count-weighted mean of
//! everything beneath them.
//!
//! A path stops at the first absent name. The group's jobs are then
//! attributed directly to the deepest node that does exist, so they still
//! count towards every ancestor above the gap.

use super::round1;
use crate::models::{JobRecord, TaxonomyLevel};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Name of the synthetic root node.
pub const ROOT_NAME: &str = "All Occupations";

/// A rolled-up taxonomy node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxonomyNode {
    pub name: String,
    pub value: f64,
    pub job_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TaxonomyNode>,
}

/// Mean automation score and job count of one distinct taxonomy path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathGroup {
    pub path: [Option<String>; 4],
    pub mean_score: f64,
    pub job_count: usize,
}

/// Group records by full taxonomy path, in path order.
pub fn group_by_path(records: &[&JobRecord]) -> Vec<PathGroup> {
    let mut groups: BTreeMap<[Option<&str>; 4], (f64, usize)> = BTreeMap::new();

    for record in records {
        let key = TaxonomyLevel::ALL.map(|level| record.level_name(level));
        let entry = groups.entry(key).or_insert((0.0, 0));
        entry.0 += record.auto_score;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|(path, (sum, count))| PathGroup {
            path: path.map(|name| name.map(String::from)),
            mean_score: sum / count as f64,
            job_count: count,
        })
        .collect()
}

/// Build the rolled-up tree for a view.
pub fn build_hierarchy(records: &[&JobRecord]) -> TaxonomyNode {
    build_tree(&group_by_path(records))
}

/// Build the tree from grouped rows and roll scores up to the root.
pub fn build_tree(groups: &[PathGroup]) -> TaxonomyNode {
    let mut builder = TreeBuilder::new();
    for group in groups {
        builder.insert(group);
    }
    builder.reduce(TreeBuilder::ROOT).node
}

/// Node under construction. Leaves carry their group's values; other
/// nodes may carry jobs whose path ended at them.
#[derive(Debug, Default)]
struct PendingNode {
    name: String,
    children: Vec<usize>,
    leaf: Option<(f64, usize)>,
    direct_sum: f64,
    direct_count: usize,
}

/// Arena of pending nodes, indexed by full path.
struct TreeBuilder {
    nodes: Vec<PendingNode>,
    by_path: HashMap<Vec<String>, usize>,
}

/// A reduced subtree plus its weighted score sum and weight.
struct Reduced {
    node: TaxonomyNode,
    score_sum: f64,
    weight: usize,
}

impl TreeBuilder {
    const ROOT: usize = 0;

    fn new() -> Self {
        Self {
            nodes: vec![PendingNode {
                name: ROOT_NAME.to_string(),
                ..PendingNode::default()
            }],
            by_path: HashMap::new(),
        }
    }

    fn insert(&mut self, group: &PathGroup) {
        let mut path: Vec<String> = Vec::with_capacity(4);
        let mut parent = Self::ROOT;

        for name in group.path[..3].iter() {
            let Some(name) = name else {
                self.attach_direct(parent, group);
                return;
            };
            path.push(name.clone());
            parent = self.child(parent, &path);
        }

        match &group.path[3] {
            Some(name) => {
                path.push(name.clone());
                let leaf = self.child(parent, &path);
                self.nodes[leaf].leaf = Some((group.mean_score, group.job_count));
            }
            None => self.attach_direct(parent, group),
        }
    }

    /// Index of the node at `path`, created under `parent` if missing.
    fn child(&mut self, parent: usize, path: &[String]) -> usize {
        if let Some(&idx) = self.by_path.get(path) {
            return idx;
        }

        let idx = self.nodes.len();
        self.nodes.push(PendingNode {
            name: path.last().cloned().unwrap_or_default(),
            ..PendingNode::default()
        });
        self.nodes[parent].children.push(idx);
        self.by_path.insert(path.to_vec(), idx);
        idx
    }

    fn attach_direct(&mut self, idx: usize, group: &PathGroup) {
        let node = &mut self.nodes[idx];
        node.direct_sum += group.mean_score * group.job_count as f64;
        node.direct_count += group.job_count;
    }

    /// Depth-first reduction; children are resolved before their parent.
    fn reduce(&self, idx: usize) -> Reduced {
        let pending = &self.nodes[idx];

        if let Some((mean, count)) = pending.leaf {
            return Reduced {
                node: TaxonomyNode {
                    name: pending.name.clone(),
                    value: round1(mean),
                    job_count: count,
                    children: Vec::new(),
                },
                score_sum: mean * count as f64,
                weight: count,
            };
        }

        let mut score_sum = pending.direct_sum;
        let mut weight = pending.direct_count;
        let mut children = Vec::with_capacity(pending.children.len());

        for &child in &pending.children {
            let reduced = self.reduce(child);
            score_sum += reduced.score_sum;
            weight += reduced.weight;
            children.push(reduced.node);
        }

        let value = if weight == 0 {
            0.0
        } else {
            round1(score_sum / weight as f64)
        };

        Reduced {
            node: TaxonomyNode {
                name: pending.name.clone(),
                value,
                job_count: weight,
                children,
            },
            score_sum,
            weight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaxonomyEntry;

    fn group(path: [Option<&str>; 4], mean_score: f64, job_count: usize) -> PathGroup {
        PathGroup {
            path: path.map(|n| n.map(String::from)),
            mean_score,
            job_count,
        }
    }

    fn record(path: [Option<&str>; 4], auto_score: f64) -> JobRecord {
        JobRecord {
            title: "job".to_string(),
            description: String::new(),
            taxonomy: path.map(|n| TaxonomyEntry {
                name: n.map(String::from),
                code: None,
            }),
            auto_score,
            manual_score: 0.0,
            sector: None,
            tasks: Vec::new(),
        }
    }

    #[test]
    fn test_weighted_rollup_is_not_unweighted_mean() {
        let tree = build_tree(&[
            group([Some("S"), Some("O"), Some("C"), Some("A")], 80.0, 10),
            group([Some("S"), Some("O"), Some("C"), Some("B")], 20.0, 5),
        ]);

        let level3 = &tree.children[0].children[0].children[0];
        assert_eq!(level3.name, "C");
        assert_eq!(level3.value, 60.0);
        assert_eq!(level3.job_count, 15);
        assert_eq!(level3.children.len(), 2);

        // Every ancestor sees the same weighted aggregate.
        assert_eq!(tree.name, ROOT_NAME);
        assert_eq!(tree.value, 60.0);
        assert_eq!(tree.job_count, 15);
    }

    #[test]
    fn test_parents_weight_unrounded_child_means() {
        let tree = build_tree(&[
            group([Some("S"), Some("O"), Some("C"), Some("A")], 0.04, 3),
            group([Some("S"), Some("O"), Some("C"), Some("B")], 0.14, 1),
        ]);

        let level3 = &tree.children[0].children[0].children[0];
        assert_eq!(level3.children[0].value, 0.0);
        assert_eq!(level3.children[1].value, 0.1);
        // (0.04 * 3 + 0.14) / 4 = 0.065, not (0.0 * 3 + 0.1) / 4 = 0.025.
        assert_eq!(level3.value, 0.1);
        assert_eq!(tree.value, 0.1);
    }

    #[test]
    fn test_siblings_with_shared_names_do_not_merge() {
        let tree = build_tree(&[
            group([Some("A"), Some("Shared"), Some("X"), Some("L1")], 10.0, 1),
            group([Some("B"), Some("Shared"), Some("X"), Some("L1")], 90.0, 3),
        ]);

        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[0].children[0].name, "Shared");
        assert_eq!(tree.children[0].children[0].value, 10.0);
        assert_eq!(tree.children[1].children[0].value, 90.0);
        assert_eq!(tree.value, 70.0);
    }

    #[test]
    fn test_missing_level_stops_the_branch_but_counts_above() {
        let tree = build_tree(&[
            group([Some("A"), Some("B"), Some("C"), Some("D")], 40.0, 2),
            group([Some("A"), None, Some("Orphan"), Some("Leaf")], 100.0, 2),
        ]);

        let level1 = &tree.children[0];
        assert_eq!(level1.children.len(), 1);
        assert_eq!(level1.children[0].name, "B");
        assert_eq!(level1.children[0].value, 40.0);
        assert_eq!(level1.value, 70.0);
        assert_eq!(level1.job_count, 4);
    }

    #[test]
    fn test_missing_level4_adds_no_leaf() {
        let tree = build_tree(&[group([Some("A"), Some("B"), Some("C"), None], 50.0, 3)]);
        let level3 = &tree.children[0].children[0].children[0];

        assert!(level3.children.is_empty());
        assert_eq!(level3.value, 50.0);
        assert_eq!(level3.job_count, 3);
    }

    #[test]
    fn test_empty_tree_is_zero() {
        let tree = build_tree(&[]);
        assert_eq!(tree.name, ROOT_NAME);
        assert_eq!(tree.value, 0.0);
        assert_eq!(tree.job_count, 0);
        assert!(tree.children.is_empty());
    }

    #[test]
    fn test_group_by_path_means() {
        let records = vec![
            record([Some("A"), Some("B"), Some("C"), Some("D")], 10.0),
            record([Some("A"), Some("B"), Some("C"), Some("D")], 20.0),
            record([Some("A"), Some("B"), Some("C"), Some("E")], 33.33),
        ];
        let view: Vec<&JobRecord> = records.iter().collect();
        let groups = group_by_path(&view);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].mean_score, 15.0);
        assert_eq!(groups[0].job_count, 2);

        let tree = build_hierarchy(&view);
        let leaves = &tree.children[0].children[0].children[0].children;
        assert_eq!(leaves[1].value, 33.3);
        assert_eq!(tree.job_count, 3);
        assert_eq!(tree.value, 21.1);
    }
}

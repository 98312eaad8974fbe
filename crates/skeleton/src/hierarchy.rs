//! Joint hierarchy
//!
//! Parent links form a tree rooted at a single joint. Children are derived from
//! the parent links and kept in joint id order, so every traversal is
//! deterministic.

use std::collections::VecDeque;

use contracts::JointId;
use tracing::debug;

use crate::SkeletonError;

/// One joint definition.
#[derive(Debug, Clone, PartialEq)]
pub struct JointNode {
    pub name: String,
    /// `None` only for the root
    pub parent: Option<JointId>,
    /// Third joint used to build the orientation frame
    pub helper: Option<JointId>,
}

impl JointNode {
    pub fn new(name: impl Into<String>, parent: Option<JointId>, helper: Option<JointId>) -> Self {
        Self {
            name: name.into(),
            parent,
            helper,
        }
    }

    pub fn root(name: impl Into<String>) -> Self {
        Self::new(name, None, None)
    }
}

/// Validated, immutable joint tree.
#[derive(Debug, Clone)]
pub struct JointHierarchy {
    nodes: Vec<JointNode>,
    children: Vec<Vec<JointId>>,
    root: JointId,
    /// Breadth-first order from the root
    order: Vec<JointId>,
}

impl JointHierarchy {
    /// Build and validate a hierarchy.
    ///
    /// # Errors
    /// Fails on an empty table, zero or multiple roots, references outside the
    /// table, and parent links that do not reach the root.
    pub fn new(nodes: Vec<JointNode>) -> Result<Self, SkeletonError> {
        if nodes.is_empty() {
            return Err(SkeletonError::Empty);
        }
        let max = u16::MAX as usize;
        if nodes.len() > max {
            return Err(SkeletonError::TooManyJoints {
                count: nodes.len(),
                max,
            });
        }

        let len = nodes.len();
        let mut roots = Vec::new();
        let mut children = vec![Vec::new(); len];

        for (index, node) in nodes.iter().enumerate() {
            let id = JointId::new(index as u16);
            if let Some(helper) = node.helper {
                if helper.index() >= len {
                    return Err(SkeletonError::UndefinedHelper {
                        joint: node.name.clone(),
                        helper,
                    });
                }
            }
            match node.parent {
                None => roots.push(id),
                Some(parent) if parent.index() >= len => {
                    return Err(SkeletonError::UndefinedParent {
                        joint: node.name.clone(),
                        parent,
                    });
                }
                Some(parent) if parent == id => {
                    return Err(SkeletonError::Cycle {
                        joints: vec![node.name.clone()],
                    });
                }
                Some(parent) => children[parent.index()].push(id),
            }
        }

        let root = match roots.as_slice() {
            [] => return Err(SkeletonError::NoRoot),
            [root] => *root,
            _ => {
                return Err(SkeletonError::MultipleRoots {
                    roots: roots.iter().map(|r| nodes[r.index()].name.clone()).collect(),
                });
            }
        };

        let order = breadth_first(root, &children);
        if order.len() != len {
            // Every non-root joint has a parent, so anything unreachable sits on a cycle.
            let mut seen = vec![false; len];
            for id in &order {
                seen[id.index()] = true;
            }
            let joints = nodes
                .iter()
                .zip(seen)
                .filter(|(_, seen)| !seen)
                .map(|(node, _)| node.name.clone())
                .collect();
            return Err(SkeletonError::Cycle { joints });
        }

        debug!(joints = len, root = %nodes[root.index()].name, "joint hierarchy built");

        Ok(Self {
            nodes,
            children,
            root,
            order,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> JointId {
        self.root
    }

    pub fn contains(&self, joint: JointId) -> bool {
        joint.index() < self.nodes.len()
    }

    pub fn node(&self, joint: JointId) -> &JointNode {
        &self.nodes[joint.index()]
    }

    pub fn name_of(&self, joint: JointId) -> &str {
        &self.nodes[joint.index()].name
    }

    pub fn parent_of(&self, joint: JointId) -> Option<JointId> {
        self.nodes[joint.index()].parent
    }

    pub fn helper_of(&self, joint: JointId) -> Option<JointId> {
        self.nodes[joint.index()].helper
    }

    /// Direct children, in joint id order.
    pub fn children_of(&self, joint: JointId) -> &[JointId] {
        &self.children[joint.index()]
    }

    /// All joint ids in table order.
    pub fn ids(&self) -> impl Iterator<Item = JointId> + '_ {
        (0..self.nodes.len()).map(|i| JointId::new(i as u16))
    }

    /// Breadth-first order from the root; each joint appears exactly once.
    pub fn topological_order(&self) -> &[JointId] {
        &self.order
    }

    /// `joint` and all of its descendants, parent before children.
    pub fn subtree(&self, joint: JointId) -> Vec<JointId> {
        let mut out = Vec::new();
        let mut stack = vec![joint];
        while let Some(current) = stack.pop() {
            out.push(current);
            // Reverse so children are visited in id order.
            stack.extend(self.children[current.index()].iter().rev().copied());
        }
        out
    }

    /// Whether `ancestor` lies on the parent chain of `joint` (or is `joint`).
    pub fn is_ancestor(&self, ancestor: JointId, joint: JointId) -> bool {
        let mut current = Some(joint);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent_of(id);
        }
        false
    }
}

fn breadth_first(root: JointId, children: &[Vec<JointId>]) -> Vec<JointId> {
    let mut order = Vec::with_capacity(children.len());
    let mut queue = VecDeque::from([root]);
    while let Some(id) = queue.pop_front() {
        order.push(id);
        queue.extend(children[id.index()].iter().copied());
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn j(index: u16) -> JointId {
        JointId::new(index)
    }

    fn chain() -> Vec<JointNode> {
        // R -> A -> B, plus C under R
        vec![
            JointNode::root("R"),
            JointNode::new("A", Some(j(0)), Some(j(2))),
            JointNode::new("B", Some(j(1)), None),
            JointNode::new("C", Some(j(0)), None),
        ]
    }

    #[test]
    fn test_children_derived_in_id_order() {
        let h = JointHierarchy::new(chain()).unwrap();
        assert_eq!(h.root(), j(0));
        assert_eq!(h.children_of(j(0)), &[j(1), j(3)]);
        assert_eq!(h.children_of(j(1)), &[j(2)]);
        assert!(h.children_of(j(2)).is_empty());
        assert_eq!(h.helper_of(j(1)), Some(j(2)));
        assert_eq!(h.name_of(j(3)), "C");
    }

    #[test]
    fn test_topological_order_visits_each_joint_once() {
        let h = JointHierarchy::new(chain()).unwrap();
        assert_eq!(h.topological_order(), &[j(0), j(1), j(3), j(2)]);
    }

    #[test]
    fn test_subtree_is_preorder() {
        let h = JointHierarchy::new(chain()).unwrap();
        assert_eq!(h.subtree(j(0)), vec![j(0), j(1), j(2), j(3)]);
        assert_eq!(h.subtree(j(1)), vec![j(1), j(2)]);
        assert_eq!(h.subtree(j(2)), vec![j(2)]);
    }

    #[test]
    fn test_parent_after_child_is_accepted() {
        // B's parent A is defined later in the table
        let nodes = vec![
            JointNode::root("R"),
            JointNode::new("B", Some(j(2)), None),
            JointNode::new("A", Some(j(0)), None),
        ];
        let h = JointHierarchy::new(nodes).unwrap();
        assert_eq!(h.topological_order(), &[j(0), j(2), j(1)]);
        assert!(h.is_ancestor(j(2), j(1)));
        assert!(!h.is_ancestor(j(1), j(2)));
    }

    #[test]
    fn test_rejects_empty_and_rootless() {
        assert_eq!(JointHierarchy::new(vec![]).unwrap_err(), SkeletonError::Empty);

        let nodes = vec![
            JointNode::new("A", Some(j(1)), None),
            JointNode::new("B", Some(j(0)), None),
        ];
        assert_eq!(JointHierarchy::new(nodes).unwrap_err(), SkeletonError::NoRoot);
    }

    #[test]
    fn test_rejects_multiple_roots() {
        let nodes = vec![JointNode::root("R1"), JointNode::root("R2")];
        assert!(matches!(
            JointHierarchy::new(nodes),
            Err(SkeletonError::MultipleRoots { roots }) if roots == vec!["R1", "R2"]
        ));
    }

    #[test]
    fn test_rejects_undefined_references() {
        let nodes = vec![JointNode::root("R"), JointNode::new("A", Some(j(7)), None)];
        assert!(matches!(
            JointHierarchy::new(nodes),
            Err(SkeletonError::UndefinedParent { parent, .. }) if parent == j(7)
        ));

        let nodes = vec![JointNode::root("R"), JointNode::new("A", Some(j(0)), Some(j(9)))];
        assert!(matches!(
            JointHierarchy::new(nodes),
            Err(SkeletonError::UndefinedHelper { helper, .. }) if helper == j(9)
        ));
    }

    #[test]
    fn test_rejects_cycles() {
        let nodes = vec![JointNode::root("R"), JointNode::new("A", Some(j(1)), None)];
        assert!(matches!(JointHierarchy::new(nodes), Err(SkeletonError::Cycle { .. })));

        let nodes = vec![
            JointNode::root("R"),
            JointNode::new("A", Some(j(2)), None),
            JointNode::new("B", Some(j(1)), None),
        ];
        assert!(matches!(
            JointHierarchy::new(nodes),
            Err(SkeletonError::Cycle { joints }) if joints == vec!["A", "B"]
        ));
    }
}

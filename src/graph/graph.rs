use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use serde::Serialize;

use crate::ast::ast::Program;

/// Outgoing edges per node, in the order they were added.
pub type Adjacency<'a> = HashMap<&'a str, Vec<&'a str>>;

pub fn adjacency<'a>(edges: impl IntoIterator<Item = (&'a str, &'a str)>) -> Adjacency<'a> {
    let mut adjacency: Adjacency<'a> = HashMap::new();
    for (source, target) in edges {
        adjacency.entry(source).or_default().push(target);
    }
    adjacency
}

/// Every node reachable from `root`, `root` included.
pub fn reachable_from<'a>(edges: &Adjacency<'a>, root: &'a str) -> HashSet<&'a str> {
    let mut seen = HashSet::from([root]);
    let mut queue = VecDeque::from([root]);

    while let Some(node) = queue.pop_front() {
        for &next in edges.get(node).map(Vec::as_slice).unwrap_or(&[]) {
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }

    seen
}

/// Strongly connected components that contain a cycle: more than one node,
/// or a single node with an edge to itself. Tarjan's algorithm, run from each
/// root in turn without recursion.
pub fn cyclic_components<'a>(roots: &[&'a str], edges: &Adjacency<'a>) -> Vec<Vec<&'a str>> {
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut lowlink: HashMap<&'a str, usize> = HashMap::new();
    let mut stack: Vec<&'a str> = vec![];
    let mut on_stack: HashSet<&'a str> = HashSet::new();
    let mut components = vec![];

    for &root in roots {
        if index.contains_key(root) {
            continue;
        }

        let mut frames = vec![(root, 0usize)];
        index.insert(root, index.len());
        lowlink.insert(root, index[root]);
        stack.push(root);
        on_stack.insert(root);

        while let Some(&(node, position)) = frames.last() {
            let neighbors = edges.get(node).map(Vec::as_slice).unwrap_or(&[]);

            if let Some(&next) = neighbors.get(position) {
                if let Some(frame) = frames.last_mut() {
                    frame.1 += 1;
                }

                if !index.contains_key(next) {
                    index.insert(next, index.len());
                    lowlink.insert(next, index[next]);
                    stack.push(next);
                    on_stack.insert(next);
                    frames.push((next, 0));
                } else if on_stack.contains(next) {
                    let low = lowlink[node].min(index[next]);
                    lowlink.insert(node, low);
                }
                continue;
            }

            frames.pop();
            if let Some(&(parent, _)) = frames.last() {
                let low = lowlink[parent].min(lowlink[node]);
                lowlink.insert(parent, low);
            }

            if lowlink[node] == index[node] {
                let mut component = vec![];
                while let Some(member) = stack.pop() {
                    on_stack.remove(member);
                    component.push(member);
                    if member == node {
                        break;
                    }
                }

                if component.len() > 1 || neighbors.contains(&node) {
                    components.push(component);
                }
            }
        }
    }

    components
}

/// Shortest cycle from `node` back to itself using only nodes in `within`,
/// e.g. `[a, b, a]`.
pub fn cycle_through<'a>(node: &'a str, within: &HashSet<&'a str>, edges: &Adjacency<'a>) -> Option<Vec<&'a str>> {
    let mut parents: HashMap<&'a str, &'a str> = HashMap::new();
    let mut queue = VecDeque::from([node]);

    while let Some(current) = queue.pop_front() {
        for &next in edges.get(current).map(Vec::as_slice).unwrap_or(&[]) {
            if next == node {
                let mut path = vec![current];
                while let Some(&parent) = parents.get(path[path.len() - 1]) {
                    path.push(parent);
                }
                if path[path.len() - 1] != node {
                    path.push(node);
                }
                path.reverse();
                path.push(node);
                return Some(path);
            }

            if next != node && within.contains(next) && !parents.contains_key(next) {
                parents.insert(next, current);
                queue.push_back(next);
            }
        }
    }

    None
}

/// Cycle paths that together cover every node lying on a cycle. Each path
/// starts and ends with the same node, the one listed earliest in `roots`,
/// e.g. `[a, b, a]`. Nodes are covered in `roots` order, and a node already
/// on an earlier path does not start a new one.
pub fn find_cycles<'a>(roots: &[&'a str], edges: &Adjacency<'a>) -> Vec<Vec<&'a str>> {
    let order: HashMap<&'a str, usize> = roots
        .iter()
        .enumerate()
        .map(|(position, &root)| (root, position))
        .collect();
    let rank = |node: &str| order.get(node).copied().unwrap_or(usize::MAX);

    let mut components = cyclic_components(roots, edges);
    for component in &mut components {
        component.sort_by_key(|&node| rank(node));
    }
    components.sort_by_key(|component| rank(component[0]));

    let mut cycles = vec![];
    for component in components {
        let within: HashSet<&'a str> = component.iter().copied().collect();
        let mut covered: HashSet<&'a str> = HashSet::new();

        for &node in &component {
            if covered.contains(node) {
                continue;
            }
            let Some(mut cycle) = cycle_through(node, &within, edges) else {
                continue;
            };

            cycle.pop();
            let first = (0..cycle.len()).min_by_key(|&i| rank(cycle[i])).unwrap_or(0);
            cycle.rotate_left(first);
            cycle.push(cycle[0]);

            covered.extend(cycle.iter().copied());
            cycles.push(cycle);
        }
    }

    cycles
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub source: String,
    pub target: String,
}

/// Node-to-node view of a program for visualisation. Nodes include every
/// defined node and every referenced target.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DialogueGraph {
    pub nodes: BTreeSet<String>,
    pub links: Vec<Link>,
}

impl DialogueGraph {
    pub fn from_program(program: &Program) -> Self {
        let mut graph = DialogueGraph::default();

        for node in &program.nodes {
            graph.nodes.insert(node.id.clone());

            for statement in &node.statements {
                if let Some((target, _)) = statement.target() {
                    graph.nodes.insert(target.to_string());
                    graph.links.push(Link {
                        source: node.id.clone(),
                        target: target.to_string(),
                    });
                }
            }
        }

        graph
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lexer::lexer::tokenize, parser::parser::parse};

    #[test]
    fn test_reachable_from_follows_edges() {
        let edges = adjacency([("start", "a"), ("a", "b"), ("c", "start")]);
        let reached = reachable_from(&edges, "start");

        assert!(reached.contains("start"));
        assert!(reached.contains("a"));
        assert!(reached.contains("b"));
        assert!(!reached.contains("c"));
    }

    #[test]
    fn test_find_cycles_reports_path() {
        let edges = adjacency([("a", "b"), ("b", "a")]);
        let cycles = find_cycles(&["a", "b"], &edges);

        assert_eq!(cycles, vec![vec!["a", "b", "a"]]);
    }

    #[test]
    fn test_find_cycles_self_loop() {
        let edges = adjacency([("a", "a")]);
        assert_eq!(find_cycles(&["a"], &edges), vec![vec!["a", "a"]]);
    }

    #[test]
    fn test_find_cycles_covers_cycle_through_second_predecessor() {
        let edges = adjacency([("start", "a"), ("start", "c"), ("a", "start"), ("c", "a")]);
        let cycles = find_cycles(&["start", "a", "c"], &edges);

        assert_eq!(
            cycles,
            vec![vec!["start", "a", "start"], vec!["start", "c", "a", "start"]]
        );
    }

    #[test]
    fn test_cyclic_components() {
        let edges = adjacency([("a", "b"), ("b", "a"), ("b", "c"), ("d", "d"), ("e", "a")]);
        let mut components = cyclic_components(&["a", "b", "c", "d", "e"], &edges);
        for component in &mut components {
            component.sort();
        }
        components.sort();

        assert_eq!(components, vec![vec!["a", "b"], vec!["d"]]);
    }

    #[test]
    fn test_find_cycles_acyclic() {
        let edges = adjacency([("a", "b"), ("b", "c"), ("a", "c")]);
        assert!(find_cycles(&["a", "b", "c"], &edges).is_empty());
    }

    #[test]
    fn test_find_cycles_handles_long_chains() {
        let names: Vec<String> = (0..10_000).map(|i| format!("n{}", i)).collect();
        let edges = adjacency(
            names
                .windows(2)
                .map(|pair| (pair[0].as_str(), pair[1].as_str()))
                .chain([(names[9_999].as_str(), names[0].as_str())]),
        );

        let cycles = find_cycles(&[names[0].as_str()], &edges);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), 10_001);
    }

    #[test]
    fn test_graph_from_program() {
        let source = "node start\n  choice \"Go\", :a\n  goto :missing\nend\nnode a\n  goto :start\nend\n";
        let program = parse(tokenize(source).unwrap()).value.unwrap();
        let graph = DialogueGraph::from_program(&program);

        let nodes: Vec<&str> = graph.nodes.iter().map(String::as_str).collect();
        assert_eq!(nodes, vec!["a", "missing", "start"]);
        assert_eq!(graph.links.len(), 3);
        assert_eq!(
            graph.links[0],
            Link {
                source: String::from("start"),
                target: String::from("a")
            }
        );
    }

    #[test]
    fn test_graph_json_shape() {
        let program = parse(tokenize("node start\n  goto :end_node\nend\n").unwrap())
            .value
            .unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&DialogueGraph::from_program(&program).to_json().unwrap())
                .unwrap();

        assert_eq!(json["nodes"], serde_json::json!(["end_node", "start"]));
        assert_eq!(
            json["links"],
            serde_json::json!([{ "source": "start", "target": "end_node" }])
        );
    }
}

use crate::model::{Node, NodeRole};

const MIN_NODE_FIELDS: usize = 6;

/// Parses `kubectl get nodes -o wide --no-headers` output into nodes.
///
/// Rows with fewer than six whitespace separated fields are dropped. The role is
/// taken from the whole line rather than the ROLES column.
pub fn parse_nodes(output: &str) -> Vec<Node> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(parse_node_line)
        .collect()
}

fn parse_node_line(line: &str) -> Option<Node> {
    let fields = line.split_whitespace().collect::<Vec<_>>();
    if fields.len() < MIN_NODE_FIELDS {
        return None;
    }

    Some(Node {
        name: fields[0].to_string(),
        role: detect_role(line),
        status: fields[1].to_string(),
        age: fields[3].to_string(),
        version: fields[4].to_string(),
        internal_ip: fields[5].to_string(),
    })
}

fn detect_role(line: &str) -> NodeRole {
    if line.contains("control-plane") || line.contains("master") {
        NodeRole::ControlPlane
    } else {
        NodeRole::Worker
    }
}

#[cfg(test)]
mod tests {
    use super::parse_nodes;
    use crate::model::NodeRole;

    const THREE_NODES: &str = "\
demo-control-plane   Ready    control-plane   12m   v1.31.0   172.18.0.3   <none>   Debian GNU/Linux 12 (bookworm)   6.8.0   containerd://1.7.18
demo-worker          Ready    <none>          11m   v1.31.0   172.18.0.2   <none>   Debian GNU/Linux 12 (bookworm)   6.8.0   containerd://1.7.18
demo-worker2         Ready    <none>          11m   v1.31.0   172.18.0.4   <none>   Debian GNU/Linux 12 (bookworm)   6.8.0   containerd://1.7.18
";

    #[test]
    fn parses_rows_in_order() {
        let nodes = parse_nodes(THREE_NODES);
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].name, "demo-control-plane");
        assert_eq!(nodes[0].role, NodeRole::ControlPlane);
        assert_eq!(nodes[1].name, "demo-worker");
        assert_eq!(nodes[1].role, NodeRole::Worker);
        assert_eq!(nodes[2].name, "demo-worker2");
        assert_eq!(nodes[2].role, NodeRole::Worker);
    }

    #[test]
    fn maps_positional_fields() {
        let nodes = parse_nodes("node-a NotReady <none> 3d v1.29.2 10.0.0.7");
        assert_eq!(nodes.len(), 1);
        let node = &nodes[0];
        assert_eq!(node.name, "node-a");
        assert_eq!(node.status, "NotReady");
        assert_eq!(node.age, "3d");
        assert_eq!(node.version, "v1.29.2");
        assert_eq!(node.internal_ip, "10.0.0.7");
    }

    #[test]
    fn role_comes_from_whole_line() {
        let nodes = parse_nodes("legacy Ready <none> 1h v1.20.0 10.0.0.1 master-os-image");
        assert_eq!(nodes[0].role, NodeRole::ControlPlane);

        let nodes = parse_nodes("old-master Ready worker 1h v1.20.0 10.0.0.2");
        assert_eq!(nodes[0].role, NodeRole::ControlPlane);
    }

    #[test]
    fn empty_and_short_input_yield_nothing() {
        assert!(parse_nodes("").is_empty());
        assert!(parse_nodes("   \n\n  ").is_empty());
        assert!(parse_nodes("incomplete line").is_empty());
    }

    #[test]
    fn short_rows_are_dropped_between_valid_rows() {
        let output = "\
a Ready control-plane 1m v1.30.0 172.18.0.2
garbage row here
b Ready <none> 1m v1.30.0 172.18.0.3
";
        let nodes = parse_nodes(output);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].name, "a");
        assert_eq!(nodes[1].name, "b");
    }
}

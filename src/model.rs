use chrono::{DateTime, Local};
use std::fmt::{Display, Formatter};

pub const DEFAULT_CLUSTER_NAME: &str = "kind";

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Cluster {
    pub name: String,
    pub status: String,
    pub nodes: Vec<Node>,
    pub kube_version: Option<String>,
}

impl Cluster {
    pub fn running(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: "running".to_string(),
            nodes: Vec::new(),
            kube_version: None,
        }
    }

    /// Attaches a node snapshot; the first node's version becomes the cluster version.
    pub fn with_nodes(mut self, nodes: Vec<Node>) -> Self {
        self.kube_version = nodes.first().map(|node| node.version.clone());
        self.nodes = nodes;
        self
    }

    pub fn summary(&self) -> String {
        let mut out = format!("Status: {} | Nodes: {}", self.status, self.nodes.len());
        if let Some(version) = self.kube_version.as_deref()
            && !version.is_empty()
        {
            out.push_str(&format!(" | K8s: {version}"));
        }
        out
    }
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash)]
pub enum NodeRole {
    ControlPlane,
    #[default]
    Worker,
}

impl NodeRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ControlPlane => "control-plane",
            Self::Worker => "worker",
        }
    }
}

impl Display for NodeRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Node {
    pub name: String,
    pub role: NodeRole,
    pub status: String,
    pub age: String,
    pub version: String,
    pub internal_ip: String,
}

impl Node {
    pub fn summary(&self) -> String {
        format!(
            "Role: {} | Status: {} | Age: {} | IP: {}",
            self.role, self.status, self.age, self.internal_ip
        )
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum View {
    MainMenu,
    ClusterList,
    ClusterDetail,
    NodeList,
    CreateCluster,
    LoadImage,
    BuildImage,
    ExportLogs,
    DeleteConfirm,
}

impl View {
    pub fn is_text_entry(self) -> bool {
        matches!(
            self,
            Self::CreateCluster | Self::LoadImage | Self::BuildImage | Self::ExportLogs
        )
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::MainMenu => "Menu",
            Self::ClusterList => "KIND Clusters",
            Self::ClusterDetail => "Cluster Detail",
            Self::NodeList => "Cluster Nodes",
            Self::CreateCluster => "Create Cluster",
            Self::LoadImage => "Load Docker Image",
            Self::BuildImage => "Build Node Image",
            Self::ExportLogs => "Export Logs",
            Self::DeleteConfirm => "Delete Cluster",
        }
    }
}

/// Operation a pending text entry will trigger once confirmed.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum InputAction {
    Create,
    LoadImage,
    Build,
    ExportLogs,
}

impl InputAction {
    pub fn view(self) -> View {
        match self {
            Self::Create => View::CreateCluster,
            Self::LoadImage => View::LoadImage,
            Self::Build => View::BuildImage,
            Self::ExportLogs => View::ExportLogs,
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            Self::Create => "cluster-name",
            Self::LoadImage => "nginx:latest",
            Self::Build => "/path/to/kubernetes/source",
            Self::ExportLogs => "./logs",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum DeleteChoice {
    #[default]
    Yes,
    No,
}

impl DeleteChoice {
    pub fn toggled(self) -> Self {
        match self {
            Self::Yes => Self::No,
            Self::No => Self::Yes,
        }
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct InputContext {
    pub prompt: String,
    pub action: Option<InputAction>,
    pub selected_cluster: String,
    pub cluster_pending_deletion: String,
    pub delete_choice: DeleteChoice,
}

impl InputContext {
    pub fn begin(&mut self, action: InputAction, prompt: impl Into<String>, cluster: String) {
        self.action = Some(action);
        self.prompt = prompt.into();
        self.selected_cluster = cluster;
    }

    pub fn reset_entry(&mut self) {
        self.action = None;
        self.prompt.clear();
        self.selected_cluster.clear();
    }

    pub fn reset_deletion(&mut self) {
        self.cluster_pending_deletion.clear();
        self.delete_choice = DeleteChoice::Yes;
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StatusKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Success,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Error,
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Info,
        }
    }

    /// Successful cluster mutations make the cluster list stale.
    pub fn refreshes_clusters(&self) -> bool {
        self.kind == StatusKind::Success && self.text.contains("Cluster")
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum MenuEntry {
    ListClusters,
    CreateCluster,
    LoadImage,
    BuildImage,
    ExportLogs,
}

impl MenuEntry {
    pub const ALL: [Self; 5] = [
        Self::ListClusters,
        Self::CreateCluster,
        Self::LoadImage,
        Self::BuildImage,
        Self::ExportLogs,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::ListClusters => "List Clusters",
            Self::CreateCluster => "Create Cluster",
            Self::LoadImage => "Load Docker Image",
            Self::BuildImage => "Build Node Image",
            Self::ExportLogs => "Export Logs",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::ListClusters => "View and delete KIND clusters",
            Self::CreateCluster => "Create a new KIND cluster",
            Self::LoadImage => "Load a Docker image into a KIND cluster",
            Self::BuildImage => "Build a custom KIND node image from source",
            Self::ExportLogs => "Export cluster logs for debugging",
        }
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ListItem {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct ListData {
    pub items: Vec<ListItem>,
    pub selected: usize,
    pub last_refreshed: Option<DateTime<Local>>,
}

impl ListData {
    pub fn set_items(&mut self, items: Vec<ListItem>, refreshed_at: DateTime<Local>) {
        self.items = items;
        self.last_refreshed = Some(refreshed_at);
        self.selected = self.selected.min(self.items.len().saturating_sub(1));
    }

    pub fn selected_item(&self) -> Option<&ListItem> {
        self.items.get(self.selected)
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.items.is_empty() {
            self.selected = 0;
            return;
        }
        let last = self.items.len() - 1;
        self.selected = self.selected.saturating_add_signed(delta).min(last);
    }
}

#[cfg(test)]
mod tests {
    use super::{Cluster, DeleteChoice, ListData, ListItem, Node, StatusMessage};
    use chrono::Local;

    #[test]
    fn delete_choice_flips_between_two_states() {
        let choice = DeleteChoice::default();
        assert_eq!(choice, DeleteChoice::Yes);
        assert_eq!(choice.toggled(), DeleteChoice::No);
        assert_eq!(choice.toggled().toggled(), DeleteChoice::Yes);
    }

    #[test]
    fn cluster_summary_includes_version_when_known() {
        let node = Node {
            name: "demo-control-plane".to_string(),
            version: "v1.31.0".to_string(),
            ..Node::default()
        };
        let cluster = Cluster::running("demo").with_nodes(vec![node]);
        assert_eq!(cluster.summary(), "Status: running | Nodes: 1 | K8s: v1.31.0");
        assert_eq!(
            Cluster::running("bare").summary(),
            "Status: running | Nodes: 0"
        );
    }

    #[test]
    fn only_successful_cluster_messages_trigger_refresh() {
        assert!(StatusMessage::success("Cluster 'a' created successfully!").refreshes_clusters());
        assert!(!StatusMessage::success("Image 'nginx' loaded successfully!").refreshes_clusters());
        assert!(!StatusMessage::error("Cluster 'a' failed").refreshes_clusters());
    }

    #[test]
    fn list_selection_is_clamped() {
        let mut list = ListData::default();
        list.move_selection(3);
        assert_eq!(list.selected, 0);

        let items = (0..3)
            .map(|idx| ListItem {
                title: format!("item-{idx}"),
                description: String::new(),
            })
            .collect::<Vec<_>>();
        list.set_items(items, Local::now());
        list.move_selection(10);
        assert_eq!(list.selected, 2);
        list.move_selection(-1);
        assert_eq!(list.selected, 1);

        list.set_items(Vec::new(), Local::now());
        assert_eq!(list.selected, 0);
        assert!(list.selected_item().is_none());
    }
}

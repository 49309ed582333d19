use crate::input::Action;
use crate::model::{
    Cluster, DEFAULT_CLUSTER_NAME, DeleteChoice, InputAction, InputContext, ListData, ListItem,
    MenuEntry, Node, StatusKind, StatusMessage, View,
};
use chrono::Local;

const INPUT_CHAR_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    None,
    ListClusters,
    ListNodes {
        cluster: String,
    },
    ClusterDetail {
        cluster: String,
    },
    CreateCluster {
        name: String,
    },
    DeleteCluster {
        name: String,
    },
    LoadImage {
        image: String,
        cluster: String,
    },
    BuildNodeImage {
        source_path: String,
    },
    ExportLogs {
        cluster: String,
        output_path: String,
    },
    Notify(StatusMessage),
    ScheduleStatusClear {
        generation: u64,
    },
}

impl AppCommand {
    /// Whether the command runs an external tool.
    pub fn is_gateway_call(&self) -> bool {
        !matches!(
            self,
            Self::None | Self::Notify(_) | Self::ScheduleStatusClear { .. }
        )
    }
}

/// Payload delivered back to the session when a gateway task completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultMessage {
    ClusterList(Vec<Cluster>),
    NodeList(Vec<Node>),
    ClusterDetail(Cluster),
    Status(StatusMessage),
}

type ViewHandler = fn(&mut App, Action) -> AppCommand;

fn view_handler(view: View) -> ViewHandler {
    match view {
        View::MainMenu => App::handle_main_menu,
        View::ClusterList => App::handle_cluster_list,
        View::ClusterDetail => App::handle_cluster_detail,
        View::NodeList => App::handle_node_list,
        View::DeleteConfirm => App::handle_delete_confirm,
        View::CreateCluster | View::LoadImage | View::BuildImage | View::ExportLogs => {
            App::handle_text_entry
        }
    }
}

pub struct App {
    running: bool,
    view: View,
    show_help: bool,
    menu_selected: usize,
    clusters: Vec<Cluster>,
    cluster_list: ListData,
    nodes: Vec<Node>,
    node_list: ListData,
    node_list_title: String,
    nodes_pending: bool,
    current_cluster: Option<Cluster>,
    context: InputContext,
    input: String,
    status: Option<StatusMessage>,
    status_generation: u64,
    in_flight: usize,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            running: true,
            view: View::MainMenu,
            show_help: false,
            menu_selected: 0,
            clusters: Vec::new(),
            cluster_list: ListData::default(),
            nodes: Vec::new(),
            node_list: ListData::default(),
            node_list_title: View::NodeList.title().to_string(),
            nodes_pending: false,
            current_cluster: None,
            context: InputContext::default(),
            input: String::new(),
            status: None,
            status_generation: 0,
            in_flight: 0,
        }
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn menu_selected(&self) -> usize {
        self.menu_selected
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn cluster_list(&self) -> &ListData {
        &self.cluster_list
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_list(&self) -> &ListData {
        &self.node_list
    }

    pub fn node_list_title(&self) -> &str {
        &self.node_list_title
    }

    /// True between a node listing request and its result or failure.
    pub fn nodes_pending(&self) -> bool {
        self.nodes_pending
    }

    pub fn current_cluster(&self) -> Option<&Cluster> {
        self.current_cluster.as_ref()
    }

    pub fn input_context(&self) -> &InputContext {
        &self.context
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn note_dispatched(&mut self) {
        self.in_flight += 1;
    }

    pub fn note_completed(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    pub fn apply_action(&mut self, action: Action) -> AppCommand {
        if self.show_help && !matches!(action, Action::ToggleHelp) {
            self.show_help = false;
        }

        match action {
            Action::Quit => {
                self.running = false;
                AppCommand::None
            }
            Action::ToggleHelp => {
                self.show_help = !self.show_help;
                AppCommand::None
            }
            Action::Back => {
                self.step_back();
                AppCommand::None
            }
            action => view_handler(self.view)(self, action),
        }
    }

    /// Applies a completed task's payload regardless of the view on screen.
    pub fn apply_result(&mut self, message: ResultMessage) -> Vec<AppCommand> {
        match message {
            ResultMessage::ClusterList(clusters) => {
                let items = clusters
                    .iter()
                    .map(|cluster| ListItem {
                        title: cluster.name.clone(),
                        description: cluster.summary(),
                    })
                    .collect();
                self.cluster_list.set_items(items, Local::now());
                self.clusters = clusters;
                Vec::new()
            }
            ResultMessage::NodeList(nodes) => {
                let items = nodes
                    .iter()
                    .map(|node| ListItem {
                        title: node.name.clone(),
                        description: node.summary(),
                    })
                    .collect();
                self.node_list.set_items(items, Local::now());
                self.nodes = nodes;
                self.nodes_pending = false;
                Vec::new()
            }
            ResultMessage::ClusterDetail(cluster) => {
                self.current_cluster = Some(cluster);
                Vec::new()
            }
            ResultMessage::Status(message) => {
                if message.kind == StatusKind::Error {
                    self.nodes_pending = false;
                }
                let refresh = message.refreshes_clusters();
                self.status = Some(message);
                self.status_generation += 1;
                let mut commands = vec![AppCommand::ScheduleStatusClear {
                    generation: self.status_generation,
                }];
                if refresh {
                    commands.push(AppCommand::ListClusters);
                }
                commands
            }
        }
    }

    /// Clears the status line if `generation` still names the latest message.
    pub fn expire_status(&mut self, generation: u64) -> bool {
        if generation != self.status_generation || self.status.is_none() {
            return false;
        }
        self.status = None;
        true
    }

    fn step_back(&mut self) {
        match self.view {
            View::MainMenu => {}
            View::DeleteConfirm => {
                self.context.reset_deletion();
                self.view = View::ClusterList;
            }
            _ => {
                self.input.clear();
                self.context.reset_entry();
                self.view = View::MainMenu;
            }
        }
    }

    fn begin_entry(&mut self, action: InputAction, prompt: impl Into<String>, cluster: String) {
        self.context.begin(action, prompt, cluster);
        self.input.clear();
        self.view = action.view();
    }

    fn selected_cluster_name(&self) -> Option<String> {
        self.cluster_list
            .selected_item()
            .map(|item| item.title.clone())
    }

    fn handle_main_menu(&mut self, action: Action) -> AppCommand {
        match action {
            Action::Up => {
                self.menu_selected = self.menu_selected.saturating_sub(1);
                AppCommand::None
            }
            Action::Down => {
                self.menu_selected = (self.menu_selected + 1).min(MenuEntry::ALL.len() - 1);
                AppCommand::None
            }
            Action::Select => match MenuEntry::ALL[self.menu_selected] {
                MenuEntry::ListClusters => {
                    self.view = View::ClusterList;
                    AppCommand::ListClusters
                }
                MenuEntry::CreateCluster => {
                    self.begin_entry(
                        InputAction::Create,
                        format!("Enter cluster name (leave empty for '{DEFAULT_CLUSTER_NAME}'):"),
                        String::new(),
                    );
                    AppCommand::None
                }
                MenuEntry::LoadImage => {
                    self.begin_entry(
                        InputAction::LoadImage,
                        "Enter Docker image name:",
                        String::new(),
                    );
                    AppCommand::None
                }
                MenuEntry::BuildImage => {
                    self.begin_entry(
                        InputAction::Build,
                        "Enter Kubernetes source path (leave empty for default):",
                        String::new(),
                    );
                    AppCommand::None
                }
                MenuEntry::ExportLogs => {
                    self.begin_entry(
                        InputAction::ExportLogs,
                        "Enter output directory (leave empty for current dir):",
                        String::new(),
                    );
                    AppCommand::None
                }
            },
            Action::Create => {
                self.begin_entry(InputAction::Create, "Enter cluster name:", String::new());
                AppCommand::None
            }
            Action::Build => {
                self.begin_entry(
                    InputAction::Build,
                    "Enter Kubernetes source path (leave empty for default):",
                    String::new(),
                );
                AppCommand::None
            }
            Action::Refresh => AppCommand::ListClusters,
            _ => AppCommand::None,
        }
    }

    fn handle_cluster_list(&mut self, action: Action) -> AppCommand {
        match action {
            Action::Up => {
                self.cluster_list.move_selection(-1);
                AppCommand::None
            }
            Action::Down => {
                self.cluster_list.move_selection(1);
                AppCommand::None
            }
            Action::Refresh => AppCommand::ListClusters,
            Action::Create => {
                self.begin_entry(InputAction::Create, "Enter cluster name:", String::new());
                AppCommand::None
            }
            Action::Select | Action::Detail => {
                let Some(cluster) = self.selected_cluster_name() else {
                    return AppCommand::None;
                };
                self.current_cluster = None;
                self.view = View::ClusterDetail;
                AppCommand::ClusterDetail { cluster }
            }
            Action::Nodes => {
                let Some(cluster) = self.selected_cluster_name() else {
                    return AppCommand::None;
                };
                self.node_list_title = format!("Nodes - {cluster}");
                self.nodes.clear();
                self.node_list.set_items(Vec::new(), Local::now());
                self.nodes_pending = true;
                self.view = View::NodeList;
                AppCommand::ListNodes { cluster }
            }
            Action::Delete => {
                let Some(cluster) = self.selected_cluster_name() else {
                    return AppCommand::None;
                };
                self.context.cluster_pending_deletion = cluster;
                self.context.delete_choice = DeleteChoice::Yes;
                self.view = View::DeleteConfirm;
                AppCommand::None
            }
            Action::Load => {
                let Some(cluster) = self.selected_cluster_name() else {
                    return AppCommand::None;
                };
                let prompt = format!("Enter Docker image name to load into '{cluster}':");
                self.begin_entry(InputAction::LoadImage, prompt, cluster);
                AppCommand::None
            }
            Action::Logs => {
                let Some(cluster) = self.selected_cluster_name() else {
                    return AppCommand::None;
                };
                let prompt = format!("Enter output directory for '{cluster}' logs:");
                self.begin_entry(InputAction::ExportLogs, prompt, cluster);
                AppCommand::None
            }
            _ => AppCommand::None,
        }
    }

    fn handle_cluster_detail(&mut self, _action: Action) -> AppCommand {
        AppCommand::None
    }

    fn handle_node_list(&mut self, action: Action) -> AppCommand {
        match action {
            Action::Up => self.node_list.move_selection(-1),
            Action::Down => self.node_list.move_selection(1),
            _ => {}
        }
        AppCommand::None
    }

    fn handle_delete_confirm(&mut self, action: Action) -> AppCommand {
        match action {
            Action::Toggle => {
                self.context.delete_choice = self.context.delete_choice.toggled();
                AppCommand::None
            }
            Action::Select => match self.context.delete_choice {
                DeleteChoice::Yes => self.confirm_delete(),
                DeleteChoice::No => self.cancel_delete(),
            },
            Action::ConfirmYes => self.confirm_delete(),
            Action::ConfirmNo => self.cancel_delete(),
            _ => AppCommand::None,
        }
    }

    fn confirm_delete(&mut self) -> AppCommand {
        let name = std::mem::take(&mut self.context.cluster_pending_deletion);
        self.context.reset_deletion();
        self.view = View::ClusterList;
        if name.is_empty() {
            return AppCommand::None;
        }
        AppCommand::DeleteCluster { name }
    }

    fn cancel_delete(&mut self) -> AppCommand {
        self.context.reset_deletion();
        self.view = View::ClusterList;
        AppCommand::None
    }

    fn handle_text_entry(&mut self, action: Action) -> AppCommand {
        match action {
            Action::InputChar(c) => {
                if self.input.chars().count() < INPUT_CHAR_LIMIT {
                    self.input.push(c);
                }
                AppCommand::None
            }
            Action::Backspace => {
                self.input.pop();
                AppCommand::None
            }
            Action::Submit => self.submit_entry(),
            _ => AppCommand::None,
        }
    }

    fn submit_entry(&mut self) -> AppCommand {
        let value = self.input.trim().to_string();
        let cluster = std::mem::take(&mut self.context.selected_cluster);
        let action = self.context.action;
        self.input.clear();
        self.context.reset_entry();
        self.view = View::MainMenu;

        match action {
            Some(InputAction::Create) => AppCommand::CreateCluster {
                name: if value.is_empty() {
                    DEFAULT_CLUSTER_NAME.to_string()
                } else {
                    value
                },
            },
            Some(InputAction::LoadImage) if value.is_empty() => {
                AppCommand::Notify(StatusMessage::error("Image name cannot be empty"))
            }
            Some(InputAction::LoadImage) => AppCommand::LoadImage {
                image: value,
                cluster,
            },
            Some(InputAction::Build) => AppCommand::BuildNodeImage { source_path: value },
            Some(InputAction::ExportLogs) => AppCommand::ExportLogs {
                cluster,
                output_path: value,
            },
            None => AppCommand::None,
        }
    }
}

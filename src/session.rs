use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, warn};

use crate::app::{App, AppCommand, ResultMessage};
use crate::gateway::{ClusterGateway, GatewayError, expand_home};
use crate::input::Action;
use crate::model::StatusMessage;

/// Everything that can arrive in the session inbox besides key presses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Completed(ResultMessage),
    StatusExpired { generation: u64 },
}

/// Drives [`App`] from user actions and completed gateway tasks.
///
/// Every gateway call runs on the blocking pool and posts exactly one
/// [`AppEvent::Completed`] back to the inbox. Tasks are never cancelled.
pub struct Session {
    app: App,
    gateway: Arc<dyn ClusterGateway>,
    inbox_tx: mpsc::UnboundedSender<AppEvent>,
    inbox_rx: mpsc::UnboundedReceiver<AppEvent>,
    status_clear_after: Duration,
    status_timer: Option<JoinHandle<()>>,
}

impl Session {
    pub fn new(gateway: Arc<dyn ClusterGateway>, status_clear_after: Duration) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        Self {
            app: App::new(),
            gateway,
            inbox_tx,
            inbox_rx,
            status_clear_after,
            status_timer: None,
        }
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn refresh_clusters(&mut self) {
        self.execute(AppCommand::ListClusters);
    }

    pub fn notify(&mut self, message: StatusMessage) {
        self.execute(AppCommand::Notify(message));
    }

    pub fn handle_action(&mut self, action: Action) {
        let command = self.app.apply_action(action);
        self.execute(command);
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Completed(message) => {
                self.app.note_completed();
                self.apply(message);
            }
            AppEvent::StatusExpired { generation } => {
                if self.app.expire_status(generation) {
                    debug!("status cleared (generation {generation})");
                }
            }
        }
    }

    pub async fn next_event(&mut self) -> Option<AppEvent> {
        self.inbox_rx.recv().await
    }

    fn apply(&mut self, message: ResultMessage) {
        for command in self.app.apply_result(message) {
            self.execute(command);
        }
    }

    fn execute(&mut self, command: AppCommand) {
        match command {
            AppCommand::Notify(message) => self.apply(ResultMessage::Status(message)),
            AppCommand::ScheduleStatusClear { generation } => {
                self.schedule_status_clear(generation)
            }
            command if command.is_gateway_call() => self.spawn_gateway_task(command),
            _ => {}
        }
    }

    fn spawn_gateway_task(&mut self, command: AppCommand) {
        debug!("dispatch {command:?}");
        self.app.note_dispatched();
        let gateway = Arc::clone(&self.gateway);
        let tx = self.inbox_tx.clone();
        let task =
            tokio::task::spawn_blocking(move || run_gateway_command(gateway.as_ref(), command));
        tokio::spawn(async move {
            let message = match task.await {
                Ok(Some(message)) => message,
                Ok(None) => return,
                Err(error) => {
                    warn!("gateway task failed: {error}");
                    ResultMessage::Status(StatusMessage::error(format!(
                        "gateway task failed: {error}"
                    )))
                }
            };
            let _ = tx.send(AppEvent::Completed(message));
        });
    }

    fn schedule_status_clear(&mut self, generation: u64) {
        if let Some(timer) = self.status_timer.take() {
            timer.abort();
        }
        let tx = self.inbox_tx.clone();
        let delay = self.status_clear_after;
        self.status_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(AppEvent::StatusExpired { generation });
        }));
    }
}

fn run_gateway_command(
    gateway: &dyn ClusterGateway,
    command: AppCommand,
) -> Option<ResultMessage> {
    let message = match command {
        AppCommand::ListClusters => match gateway.list_clusters() {
            Ok(clusters) => ResultMessage::ClusterList(clusters),
            Err(error) => failure(error),
        },
        AppCommand::ListNodes { cluster } => match gateway.list_nodes(&cluster) {
            Ok(nodes) => ResultMessage::NodeList(nodes),
            Err(error) => failure(error),
        },
        AppCommand::ClusterDetail { cluster } => match gateway.cluster_detail(&cluster) {
            Ok(cluster) => ResultMessage::ClusterDetail(cluster),
            Err(error) => failure(error),
        },
        AppCommand::CreateCluster { name } => outcome(
            gateway.create_cluster(&name),
            format!("Cluster '{name}' created successfully!"),
        ),
        AppCommand::DeleteCluster { name } => outcome(
            gateway.delete_cluster(&name),
            format!("Cluster '{name}' deleted successfully!"),
        ),
        AppCommand::LoadImage { image, cluster } => outcome(
            gateway.load_image(&image, &cluster),
            format!("Image '{image}' loaded successfully!"),
        ),
        AppCommand::BuildNodeImage { source_path } => outcome(
            gateway.build_node_image(&source_path),
            "Node image built successfully!".to_string(),
        ),
        AppCommand::ExportLogs {
            cluster,
            output_path,
        } => {
            let output_path = expand_home(&output_path);
            let shown = if output_path.is_empty() {
                "current directory"
            } else {
                output_path.as_str()
            };
            outcome(
                gateway.export_logs(&cluster, &output_path),
                format!("Logs exported to {shown} successfully!"),
            )
        }
        AppCommand::None | AppCommand::Notify(_) | AppCommand::ScheduleStatusClear { .. } => {
            return None;
        }
    };
    Some(message)
}

fn outcome(result: Result<(), GatewayError>, success: String) -> ResultMessage {
    match result {
        Ok(()) => ResultMessage::Status(StatusMessage::success(success)),
        Err(error) => failure(error),
    }
}

fn failure(error: GatewayError) -> ResultMessage {
    ResultMessage::Status(StatusMessage::error(error.to_string()))
}

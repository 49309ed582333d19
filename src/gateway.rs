use std::path::PathBuf;
use std::process::{Command, ExitStatus, Output};

use thiserror::Error;
use tracing::debug;

use crate::model::{Cluster, DEFAULT_CLUSTER_NAME, Node};
use crate::parser::parse_nodes;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to {operation}: {status}{}", render_output(.output))]
    Process {
        operation: &'static str,
        status: ExitStatus,
        output: String,
    },
}

fn render_output(output: &str) -> String {
    let output = output.trim_end();
    if output.is_empty() {
        String::new()
    } else {
        format!("\n{output}")
    }
}

/// Cluster lifecycle and inspection operations backing the session.
pub trait ClusterGateway: Send + Sync {
    fn list_clusters(&self) -> Result<Vec<Cluster>, GatewayError>;
    fn list_nodes(&self, cluster: &str) -> Result<Vec<Node>, GatewayError>;
    fn cluster_detail(&self, cluster: &str) -> Result<Cluster, GatewayError>;
    fn create_cluster(&self, name: &str) -> Result<(), GatewayError>;
    fn delete_cluster(&self, name: &str) -> Result<(), GatewayError>;
    fn load_image(&self, image: &str, cluster: &str) -> Result<(), GatewayError>;
    fn build_node_image(&self, source_path: &str) -> Result<(), GatewayError>;
    fn export_logs(&self, cluster: &str, output_path: &str) -> Result<(), GatewayError>;
}

/// Gateway that shells out to `kind` and `kubectl`.
#[derive(Debug, Clone)]
pub struct KindGateway {
    kind_bin: String,
    kubectl_bin: String,
}

impl KindGateway {
    pub fn new(kind_bin: impl Into<String>, kubectl_bin: impl Into<String>) -> Self {
        Self {
            kind_bin: kind_bin.into(),
            kubectl_bin: kubectl_bin.into(),
        }
    }

    pub fn kind_bin(&self) -> &str {
        &self.kind_bin
    }

    fn enrich(&self, cluster: Cluster) -> Cluster {
        match self.list_nodes(&cluster.name) {
            Ok(nodes) => cluster.with_nodes(nodes),
            Err(error) => {
                debug!("node enrichment skipped for {}: {error}", cluster.name);
                cluster
            }
        }
    }

    fn run_kind_mutation(
        &self,
        operation: &'static str,
        args: Vec<String>,
    ) -> Result<(), GatewayError> {
        let output = run(&self.kind_bin, &args)?;
        if output.status.success() {
            return Ok(());
        }
        Err(GatewayError::Process {
            operation,
            status: output.status,
            output: combined_output(&output),
        })
    }
}

impl ClusterGateway for KindGateway {
    fn list_clusters(&self) -> Result<Vec<Cluster>, GatewayError> {
        let output = run(&self.kind_bin, &list_clusters_args())?;
        if !output.status.success() {
            return Err(GatewayError::Process {
                operation: "get clusters",
                status: output.status,
                output: combined_output(&output),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|name| self.enrich(Cluster::running(name)))
            .collect())
    }

    fn list_nodes(&self, cluster: &str) -> Result<Vec<Node>, GatewayError> {
        let output = run(&self.kubectl_bin, &list_nodes_args(cluster))?;
        if !output.status.success() {
            return Err(GatewayError::Process {
                operation: "get nodes",
                status: output.status,
                output: combined_output(&output),
            });
        }
        Ok(parse_nodes(&String::from_utf8_lossy(&output.stdout)))
    }

    fn cluster_detail(&self, cluster: &str) -> Result<Cluster, GatewayError> {
        Ok(self.enrich(Cluster::running(cluster)))
    }

    fn create_cluster(&self, name: &str) -> Result<(), GatewayError> {
        self.run_kind_mutation("create cluster", create_cluster_args(name))
    }

    fn delete_cluster(&self, name: &str) -> Result<(), GatewayError> {
        self.run_kind_mutation("delete cluster", delete_cluster_args(name))
    }

    fn load_image(&self, image: &str, cluster: &str) -> Result<(), GatewayError> {
        self.run_kind_mutation("load image", load_image_args(image, cluster))
    }

    fn build_node_image(&self, source_path: &str) -> Result<(), GatewayError> {
        self.run_kind_mutation("build node image", build_node_image_args(source_path))
    }

    fn export_logs(&self, cluster: &str, output_path: &str) -> Result<(), GatewayError> {
        self.run_kind_mutation("export logs", export_logs_args(cluster, output_path))
    }
}

fn run(program: &str, args: &[String]) -> Result<Output, GatewayError> {
    debug!("exec {program} {}", args.join(" "));
    Command::new(program)
        .args(args)
        .output()
        .map_err(|source| GatewayError::Spawn {
            program: program.to_string(),
            source,
        })
}

fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    if stderr.trim().is_empty() {
        stdout.to_string()
    } else if stdout.trim().is_empty() {
        stderr.to_string()
    } else {
        format!("{stdout}{stderr}")
    }
}

/// Maps a cluster name to the kubeconfig context kind writes for it.
pub fn context_name(cluster: &str) -> String {
    if cluster == DEFAULT_CLUSTER_NAME {
        cluster.to_string()
    } else {
        format!("kind-{cluster}")
    }
}

/// Expands a leading `~/` against `$HOME`; other paths pass through untouched.
pub fn expand_home(path: &str) -> String {
    let Some(rest) = path.strip_prefix("~/") else {
        return path.to_string();
    };
    match std::env::var("HOME") {
        Ok(home) if !home.is_empty() => PathBuf::from(home).join(rest).display().to_string(),
        _ => path.to_string(),
    }
}

fn list_clusters_args() -> Vec<String> {
    vec!["get".to_string(), "clusters".to_string()]
}

fn list_nodes_args(cluster: &str) -> Vec<String> {
    [
        "get",
        "nodes",
        "--context",
        &context_name(cluster),
        "-o",
        "wide",
        "--no-headers",
    ]
    .iter()
    .map(|arg| arg.to_string())
    .collect()
}

fn create_cluster_args(name: &str) -> Vec<String> {
    let mut args = vec!["create".to_string(), "cluster".to_string()];
    if !name.is_empty() {
        args.extend(["--name".to_string(), name.to_string()]);
    }
    args
}

fn delete_cluster_args(name: &str) -> Vec<String> {
    vec![
        "delete".to_string(),
        "cluster".to_string(),
        "--name".to_string(),
        name.to_string(),
    ]
}

fn load_image_args(image: &str, cluster: &str) -> Vec<String> {
    let mut args = vec![
        "load".to_string(),
        "docker-image".to_string(),
        image.to_string(),
    ];
    if !cluster.is_empty() {
        args.extend(["--name".to_string(), cluster.to_string()]);
    }
    args
}

fn build_node_image_args(source_path: &str) -> Vec<String> {
    let mut args = vec!["build".to_string(), "node-image".to_string()];
    if !source_path.is_empty() {
        args.push(source_path.to_string());
    }
    args
}

fn export_logs_args(cluster: &str, output_path: &str) -> Vec<String> {
    let mut args = vec!["export".to_string(), "logs".to_string()];
    if !cluster.is_empty() {
        args.extend(["--name".to_string(), cluster.to_string()]);
    }
    if !output_path.is_empty() {
        args.push(output_path.to_string());
    }
    args
}

//! 基于 `docker` 命令行的服务管理实现。

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::spec::ServiceSpec;
use crate::{DaemonError, EnsureOutcome, ServiceManager};

pub struct DockerCliManager {
    program: String,
    logs_dir: PathBuf,
}

impl DockerCliManager {
    pub fn new(logs_dir: impl Into<PathBuf>) -> Self {
        Self::with_program("docker", logs_dir)
    }

    /// 指定 docker 可执行文件（测试或非标准安装）。
    pub fn with_program(program: impl Into<String>, logs_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            logs_dir: logs_dir.into(),
        }
    }

    async fn run(&self, args: &[String]) -> Result<String, DaemonError> {
        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| DaemonError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(DaemonError::Command {
                command: format!("{} {}", self.program, args.join(" ")),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// 查询容器运行状态与镜像；容器不存在时返回 None。
    async fn inspect(&self, name: &str) -> Result<Option<(bool, String)>, DaemonError> {
        let args = [
            "inspect".to_string(),
            "--type".to_string(),
            "container".to_string(),
            "--format".to_string(),
            "{{.State.Running}} {{.Config.Image}}".to_string(),
            name.to_string(),
        ];
        match self.run(&args).await {
            Ok(stdout) => {
                let (running, image) = stdout.split_once(' ').unwrap_or((stdout.as_str(), ""));
                Ok(Some((running == "true", image.to_string())))
            }
            // 其余失败（如 docker 守护进程不可达）原样上抛
            Err(DaemonError::Command { stderr, .. }) if stderr.contains("No such") => {
                debug!(target: "radius.daemon", name = %name, stderr = %stderr, "container_not_found");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// 将容器日志持续追加到 `{logs_dir}/{name}.log`。
    ///
    /// 返回的任务被 abort 时子进程随之结束。
    pub async fn follow_logs(
        &self,
        name: &str,
    ) -> Result<tokio::task::JoinHandle<()>, DaemonError> {
        tokio::fs::create_dir_all(&self.logs_dir)
            .await
            .map_err(DaemonError::Logs)?;
        let path = self.logs_dir.join(format!("{name}.log"));
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(DaemonError::Logs)?;
        let stderr = file.try_clone().map_err(DaemonError::Logs)?;
        let mut child = Command::new(&self.program)
            .args(["logs", "--follow", "--since", "0s", name])
            .stdin(Stdio::null())
            .stdout(Stdio::from(file))
            .stderr(Stdio::from(stderr))
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| DaemonError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        info!(target: "radius.daemon", name = %name, path = %path.display(), "container_logs_following");

        let name = name.to_string();
        Ok(tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => {
                    warn!(target: "radius.daemon", name = %name, status = %status, "container_logs_ended")
                }
                Err(err) => {
                    warn!(target: "radius.daemon", name = %name, error = %err, "container_logs_failed")
                }
            }
        }))
    }
}

#[async_trait]
impl ServiceManager for DockerCliManager {
    async fn ensure_service(&self, spec: &ServiceSpec) -> Result<EnsureOutcome, DaemonError> {
        spec.validate()?;
        if let Some((running, image)) = self.inspect(&spec.name).await? {
            if running && image == spec.image {
                info!(target: "radius.daemon", name = %spec.name, image = %image, "container_already_running");
                return Ok(EnsureOutcome::AlreadyRunning);
            }
            info!(
                target: "radius.daemon",
                name = %spec.name,
                running = running,
                current_image = %image,
                desired_image = %spec.image,
                "container_recreating"
            );
            self.run(&["rm".to_string(), "-f".to_string(), spec.name.clone()])
                .await?;
        }

        let container_id = self.run(&spec.run_args()).await?;
        info!(
            target: "radius.daemon",
            name = %spec.name,
            image = %spec.image,
            container_id = %container_id,
            "container_started"
        );
        Ok(EnsureOutcome::Started)
    }
}

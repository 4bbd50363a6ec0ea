//! Scan script collaborator
//!
//! A scan script is a user-provided executable living in the `scripts/`
//! subdirectory of the config dir. It receives the target and management
//! credentials through its environment and prints an [`ObservedSnapshot`] as
//! JSON on stdout.

use std::fmt;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use invsync_exec::local::ensure_executable;
use invsync_exec::{CommandExecutor, CommandSpec};
use tracing::{debug, info, instrument, warn};

use crate::error::InventoryError;
use crate::snapshot::ObservedSnapshot;

/// Environment variables owned by invsync; inherited values are dropped
pub const MANAGED_ENV_VARS: [&str; 3] = [
    "MANAGEMENT_USER_NAME",
    "MANAGEMENT_USER_PASSWORD",
    "IP_TO_SCAN",
];

/// Host to scan
///
/// Keeps the address as given (an IP literal or a host name) alongside the
/// IP it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTarget {
    raw: String,
    ip: IpAddr,
}

impl ScanTarget {
    /// Validate `raw` as an IP address or a resolvable host name
    ///
    /// # Errors
    /// Returns `InventoryError::InvalidTarget` if it is neither.
    #[instrument]
    pub async fn resolve(raw: &str) -> Result<Self, InventoryError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(InventoryError::InvalidTarget("empty address".to_string()));
        }

        if let Ok(ip) = raw.parse::<IpAddr>() {
            return Ok(Self {
                raw: raw.to_string(),
                ip,
            });
        }

        // Dotted quads that failed to parse (e.g. 10.20.30.257) are not host names.
        if raw.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return Err(InventoryError::InvalidTarget(raw.to_string()));
        }

        let mut addrs = tokio::net::lookup_host((raw, 0))
            .await
            .map_err(|e| InventoryError::InvalidTarget(format!("{raw}: {e}")))?;
        let ip = addrs
            .next()
            .map(|addr| addr.ip())
            .ok_or_else(|| InventoryError::InvalidTarget(format!("{raw}: no addresses")))?;

        debug!(host = raw, %ip, "resolved scan target");
        Ok(Self {
            raw: raw.to_string(),
            ip,
        })
    }

    /// Build a target from an IP address
    #[must_use]
    pub fn from_ip(ip: IpAddr) -> Self {
        Self {
            raw: ip.to_string(),
            ip,
        }
    }

    /// The address as given on the command line
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Resolved IP, used for store lookups
    #[must_use]
    pub fn ip(&self) -> IpAddr {
        self.ip
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Credentials handed to the script for the host's management controller
#[derive(Clone)]
pub struct ManagementCredentials {
    pub user_name: String,
    pub password: String,
}

impl fmt::Debug for ManagementCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagementCredentials")
            .field("user_name", &self.user_name)
            .field("password", &"***")
            .finish()
    }
}

/// A located, executable scan script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanScript {
    pub name: String,
    pub path: PathBuf,
}

impl ScanScript {
    /// Find `name` under `<config_dir>/scripts`
    ///
    /// # Errors
    /// Returns `InventoryError::Exec` if the file is missing or its owner
    /// cannot execute it.
    pub fn locate(name: &str, config_dir: &Path) -> Result<Self, InventoryError> {
        let path = config_dir.join("scripts").join(name);
        ensure_executable(&path)?;
        Ok(Self {
            name: name.to_string(),
            path,
        })
    }
}

/// Environment for the script: `old_env` without the managed variables, plus
/// fresh values for them.
#[must_use]
pub fn prepare_env<I>(
    old_env: I,
    target: &ScanTarget,
    credentials: &ManagementCredentials,
) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut env: Vec<(String, String)> = old_env
        .into_iter()
        .filter(|(key, _)| !MANAGED_ENV_VARS.contains(&key.as_str()))
        .collect();
    env.push((
        "MANAGEMENT_USER_NAME".to_string(),
        credentials.user_name.clone(),
    ));
    env.push((
        "MANAGEMENT_USER_PASSWORD".to_string(),
        credentials.password.clone(),
    ));
    env.push(("IP_TO_SCAN".to_string(), target.as_str().to_string()));
    env
}

/// Runs scan scripts through a [`CommandExecutor`]
pub struct ScanRunner {
    executor: Arc<dyn CommandExecutor>,
    timeout: Duration,
}

impl ScanRunner {
    /// Default time a script may run
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            executor,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run `script` against `target` and parse its output
    ///
    /// # Errors
    /// Returns `InventoryError::Exec` if the script cannot be launched or
    /// times out, `ScanFailed` on a non-zero exit and `ScanOutput` if stdout
    /// is not a snapshot.
    #[instrument(skip(self, script, target, credentials), fields(script = %script.name, host = %target))]
    pub async fn run(
        &self,
        script: &ScanScript,
        target: &ScanTarget,
        credentials: &ManagementCredentials,
    ) -> Result<ObservedSnapshot, InventoryError> {
        info!(executor = self.executor.executor_type(), "running scan script");

        // Non UTF-8 variables are not passed on.
        let inherited = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)));
        let spec =
            CommandSpec::new(&script.path).env(prepare_env(inherited, target, credentials));
        let result = self.executor.run_with_timeout(&spec, self.timeout).await?;

        if !result.success() {
            warn!(status = result.status, "scan script failed");
            return Err(InventoryError::ScanFailed {
                status: result.status,
                stderr: result.stderr.trim().to_string(),
            });
        }

        let snapshot = ObservedSnapshot::from_json(&result.stdout)?;
        info!(
            components = snapshot.component_count(),
            duration = ?result.duration,
            "scan completed"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use async_trait::async_trait;
    use invsync_exec::{CommandResult, ExecError};

    use super::*;

    fn credentials() -> ManagementCredentials {
        ManagementCredentials {
            user_name: "some_user".to_string(),
            password: "some_password".to_string(),
        }
    }

    fn target() -> ScanTarget {
        ScanTarget::from_ip(IpAddr::V4(Ipv4Addr::new(10, 20, 30, 40)))
    }

    struct MockExecutor {
        status: i32,
        stdout: &'static str,
    }

    #[async_trait]
    impl CommandExecutor for MockExecutor {
        async fn run(&self, spec: &CommandSpec) -> Result<CommandResult, ExecError> {
            assert!(spec.env.contains(&("IP_TO_SCAN".to_string(), "10.20.30.40".to_string())));
            Ok(CommandResult {
                status: self.status,
                stdout: self.stdout.to_string(),
                stderr: "boom\n".to_string(),
                duration: Duration::from_millis(5),
            })
        }

        async fn run_with_timeout(
            &self,
            spec: &CommandSpec,
            _timeout: Duration,
        ) -> Result<CommandResult, ExecError> {
            self.run(spec).await
        }

        fn executor_type(&self) -> &'static str {
            "mock"
        }
    }

    fn script() -> ScanScript {
        ScanScript {
            name: "idrac.py".to_string(),
            path: PathBuf::from("/nonexistent/idrac.py"),
        }
    }

    #[test]
    fn test_prepare_env_replaces_managed_vars() {
        let old = vec![
            ("PATH".to_string(), "/usr/bin".to_string()),
            ("MANAGEMENT_USER_NAME".to_string(), "old_user".to_string()),
            ("MANAGEMENT_USER_PASSWORD".to_string(), "old_password".to_string()),
            ("IP_TO_SCAN".to_string(), "11.22.33.44".to_string()),
        ];
        let env = prepare_env(old, &target(), &credentials());
        assert_eq!(
            env,
            vec![
                ("PATH".to_string(), "/usr/bin".to_string()),
                ("MANAGEMENT_USER_NAME".to_string(), "some_user".to_string()),
                ("MANAGEMENT_USER_PASSWORD".to_string(), "some_password".to_string()),
                ("IP_TO_SCAN".to_string(), "10.20.30.40".to_string()),
            ]
        );
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let rendered = format!("{:?}", credentials());
        assert!(!rendered.contains("some_password"));
    }

    #[tokio::test]
    async fn test_resolve_ip_literals() {
        let t = ScanTarget::resolve("10.20.30.40").await.unwrap();
        assert_eq!(t.as_str(), "10.20.30.40");
        assert!(ScanTarget::resolve("0.0.0.0").await.is_ok());
        assert!(ScanTarget::resolve("255.255.255.255").await.is_ok());
    }

    #[tokio::test]
    async fn test_resolve_rejects_bad_addresses() {
        for raw in ["", "10.20.30.40.50", "10.20.30.257"] {
            assert!(
                matches!(
                    ScanTarget::resolve(raw).await,
                    Err(InventoryError::InvalidTarget(_))
                ),
                "{raw} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_resolve_localhost() {
        let t = ScanTarget::resolve("localhost").await.unwrap();
        assert_eq!(t.as_str(), "localhost");
        assert!(t.ip().is_loopback());
    }

    #[tokio::test]
    async fn test_run_parses_snapshot() {
        let runner = ScanRunner::new(Arc::new(MockExecutor {
            status: 0,
            stdout: r#"{"serial_number": "SN1", "memory": [{"model_name": "DIMM", "size": 1024, "speed": 1333}]}"#,
        }));
        let snapshot = runner.run(&script(), &target(), &credentials()).await.unwrap();
        assert_eq!(snapshot.serial_number, "SN1");
        assert_eq!(snapshot.memory.len(), 1);
    }

    #[tokio::test]
    async fn test_run_reports_failure() {
        let runner = ScanRunner::new(Arc::new(MockExecutor {
            status: 2,
            stdout: "",
        }));
        let err = runner.run(&script(), &target(), &credentials()).await.unwrap_err();
        match err {
            InventoryError::ScanFailed { status, stderr } => {
                assert_eq!(status, 2);
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_locate_requires_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let scripts = dir.path().join("scripts");
        std::fs::create_dir(&scripts).unwrap();
        let path = scripts.join("scan.sh");
        std::fs::write(&path, "#!/bin/sh\n").unwrap();

        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        assert!(matches!(
            ScanScript::locate("scan.sh", dir.path()),
            Err(InventoryError::Exec(ExecError::NotExecutable(_)))
        ));

        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o744)).unwrap();
        let script = ScanScript::locate("scan.sh", dir.path()).unwrap();
        assert_eq!(script.path, path);
    }
}

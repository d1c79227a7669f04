use crate::errors::ScanError;
use crate::model::{Camera, Host};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Persistence collaborator for discovered hosts.
/// The aggregator is the only consumer; implementations live outside the
/// scanning core.
#[async_trait]
pub trait HostStore: Send + Sync {
    async fn find_host_by_ip(&self, ip: &str) -> Result<Option<Host>, ScanError>;
    async fn create_host(&self, host: &Host) -> Result<(), ScanError>;
    async fn update_host(&self, host: &Host) -> Result<(), ScanError>;
    async fn add_camera_to_host(&self, camera: &Camera) -> Result<(), ScanError>;
}

/// Counts of what the merge did per host
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeOutcome {
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
}

/// Group confirmed cameras by host IP: one Host per distinct IP with all
/// its cameras attached, deduped by port (first seen wins)
pub fn group_by_host(confirmed: &[Camera]) -> Vec<Host> {
    let mut hosts: Vec<Host> = Vec::new();

    for camera in confirmed {
        match hosts.iter_mut().find(|h| h.ip_address == camera.host.ip) {
            Some(host) => {
                host.add_camera(camera.clone());
                if camera.last_pinged > host.last_pinged {
                    host.last_pinged = camera.last_pinged;
                }
            }
            None => {
                let mut host = Host::new(&camera.host, camera.found_on);
                host.last_pinged = camera.last_pinged;
                host.add_camera(camera.clone());
                hosts.push(host);
            }
        }
    }

    hosts
}

/// Reconcile grouped hosts against previously persisted state. One host
/// failing to save never stops the remaining hosts from being processed.
pub async fn merge_into_store(hosts: &[Host], store: &dyn HostStore) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    for host in hosts {
        match merge_one(host, store).await {
            Ok(true) => outcome.created += 1,
            Ok(false) => outcome.updated += 1,
            Err(err) => {
                outcome.failed += 1;
                let ports: Vec<String> =
                    host.cameras.iter().map(|c| c.port.to_string()).collect();
                eprintln!(
                    "Failed to save host {} (cameras on {}): {}",
                    host.ip_address,
                    ports.join(", "),
                    err
                );
            }
        }
    }

    outcome
}

/// Returns true when the host was newly created, false when an existing
/// record was updated
async fn merge_one(host: &Host, store: &dyn HostStore) -> Result<bool, ScanError> {
    match store.find_host_by_ip(&host.ip_address).await? {
        None => {
            store.create_host(host).await?;
            Ok(true)
        }
        Some(mut existing) => {
            for camera in &host.cameras {
                // A port already on the persisted host keeps its stored
                // credentials and description untouched on rescan
                if existing.has_port(camera.port) {
                    continue;
                }
                store.add_camera_to_host(camera).await?;
                existing.add_camera(camera.clone());
            }

            existing.last_pinged = host.last_pinged;
            store.update_host(&existing).await?;
            Ok(false)
        }
    }
}

/// In-memory host store backing tests and the default binary wiring
pub struct MemoryHostStore {
    hosts: Mutex<HashMap<String, Host>>,
}

impl MemoryHostStore {
    pub fn new() -> Self {
        Self {
            hosts: Mutex::new(HashMap::new()),
        }
    }

    /// Snapshot of every stored host, ordered by IP
    pub async fn all_hosts(&self) -> Vec<Host> {
        let hosts = self.hosts.lock().await;
        let mut all: Vec<Host> = hosts.values().cloned().collect();
        all.sort_by(|a, b| a.ip_address.cmp(&b.ip_address));
        all
    }
}

impl Default for MemoryHostStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostStore for MemoryHostStore {
    async fn find_host_by_ip(&self, ip: &str) -> Result<Option<Host>, ScanError> {
        Ok(self.hosts.lock().await.get(ip).cloned())
    }

    async fn create_host(&self, host: &Host) -> Result<(), ScanError> {
        let mut hosts = self.hosts.lock().await;
        if hosts.contains_key(&host.ip_address) {
            return Err(ScanError::Store(format!(
                "host {} already exists",
                host.ip_address
            )));
        }
        hosts.insert(host.ip_address.clone(), host.clone());
        Ok(())
    }

    async fn update_host(&self, host: &Host) -> Result<(), ScanError> {
        let mut hosts = self.hosts.lock().await;
        if !hosts.contains_key(&host.ip_address) {
            return Err(ScanError::Store(format!(
                "host {} does not exist",
                host.ip_address
            )));
        }
        hosts.insert(host.ip_address.clone(), host.clone());
        Ok(())
    }

    async fn add_camera_to_host(&self, camera: &Camera) -> Result<(), ScanError> {
        let mut hosts = self.hosts.lock().await;
        match hosts.get_mut(&camera.host.ip) {
            Some(host) => {
                host.add_camera(camera.clone());
                Ok(())
            }
            None => Err(ScanError::Store(format!(
                "host {} does not exist",
                camera.host.ip
            ))),
        }
    }
}

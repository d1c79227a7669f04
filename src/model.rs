use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;

/// Immutable reference data describing one camera brand/family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraType {
    pub name: String,
    /// Factory-default credentials tried during probing
    pub default_username: String,
    pub default_password: String,
    /// URL path that serves video when the device really is this camera
    pub stream_path: String,
    /// Query term used against the upstream search provider
    pub search_term: String,
    /// Substring that must appear in the Server response header, when the
    /// vendor is known to always send one
    pub server_header_marker: Option<String>,
}

/// Identity and location of a scanned host, shared by its cameras
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRef {
    pub ip: String,
    pub city: String,
    pub country: String,
}

/// A camera recorded on one port of one host
#[derive(Debug, Clone)]
pub struct Camera {
    pub host: Arc<HostRef>,
    pub port: u16,
    pub camera_type: Arc<CameraType>,
    pub username: String,
    pub password: String,
    pub active: bool,
    pub found_on: DateTime<Utc>,
    pub last_pinged: DateTime<Utc>,
}

impl Camera {
    /// Create a camera on `host:port` with the type's default credentials
    pub fn with_defaults(
        host: Arc<HostRef>,
        port: u16,
        camera_type: Arc<CameraType>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            host,
            port,
            username: camera_type.default_username.clone(),
            password: camera_type.default_password.clone(),
            camera_type,
            active: true,
            found_on: now,
            last_pinged: now,
        }
    }

    /// Identity key: a host never holds two cameras on the same port
    pub fn key(&self) -> (String, u16) {
        (self.host.ip.clone(), self.port)
    }
}

/// A discovered host and the cameras found on it.
/// Identity key is the IP address; two records with the same IP merge.
#[derive(Debug, Clone)]
pub struct Host {
    pub ip_address: String,
    pub country: String,
    pub city: String,
    pub active: bool,
    pub found_on: DateTime<Utc>,
    pub last_pinged: DateTime<Utc>,
    pub cameras: Vec<Camera>,
}

impl Host {
    pub fn new(host: &HostRef, now: DateTime<Utc>) -> Self {
        Self {
            ip_address: host.ip.clone(),
            country: host.country.clone(),
            city: host.city.clone(),
            active: true,
            found_on: now,
            last_pinged: now,
            cameras: Vec::new(),
        }
    }

    pub fn has_port(&self, port: u16) -> bool {
        self.cameras.iter().any(|c| c.port == port)
    }

    /// Append a camera unless its port is already taken (first seen wins).
    /// Returns whether the camera was added.
    pub fn add_camera(&mut self, camera: Camera) -> bool {
        if self.has_port(camera.port) {
            return false;
        }
        self.cameras.push(camera);
        true
    }
}

/// An unverified (host, port, type) tuple awaiting probing. Transient:
/// created and destroyed within one scan run, promoted into a Camera only
/// when the prober confirms it.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub host: Arc<HostRef>,
    pub port: u16,
    pub camera_type: Arc<CameraType>,
    pub username: String,
    pub password: String,
}

impl Candidate {
    /// Create a candidate with credentials seeded from the type defaults
    pub fn new(host: Arc<HostRef>, port: u16, camera_type: Arc<CameraType>) -> Self {
        Self {
            host,
            port,
            username: camera_type.default_username.clone(),
            password: camera_type.default_password.clone(),
            camera_type,
        }
    }

    /// Dedup identity: (ip, port)
    pub fn key(&self) -> (String, u16) {
        (self.host.ip.clone(), self.port)
    }

    /// Promote a confirmed candidate into a camera record
    pub fn confirm(&self, now: DateTime<Utc>) -> Camera {
        Camera {
            host: self.host.clone(),
            port: self.port,
            camera_type: self.camera_type.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            active: true,
            found_on: now,
            last_pinged: now,
        }
    }

    /// Flatten gathered hosts into probe candidates, cameras ordered by
    /// port within each host
    pub fn from_hosts(hosts: &[Host]) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        for host in hosts {
            let host_ref = Arc::new(HostRef {
                ip: host.ip_address.clone(),
                city: host.city.clone(),
                country: host.country.clone(),
            });

            let mut cameras: Vec<&Camera> = host.cameras.iter().collect();
            cameras.sort_by_key(|c| c.port);

            for camera in cameras {
                candidates.push(Candidate {
                    host: host_ref.clone(),
                    port: camera.port,
                    camera_type: camera.camera_type.clone(),
                    username: camera.username.clone(),
                    password: camera.password.clone(),
                });
            }
        }
        candidates
    }
}

/// One candidate record from a search result page or an import line.
/// Provider envelopes carry many more fields; only these four matter.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceRecord {
    pub ip_str: String,
    pub port: u16,
    #[serde(default)]
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceLocation {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
}

/// Fold source records into host records: one Host per distinct IP, one
/// Camera per distinct (ip, port)
pub fn fold_into_hosts(records: Vec<SourceRecord>, camera_type: &Arc<CameraType>) -> Vec<Host> {
    let now = Utc::now();
    let mut hosts: Vec<Host> = Vec::new();

    for record in records {
        let host_ref = Arc::new(HostRef {
            ip: record.ip_str.clone(),
            city: record.location.city.clone().unwrap_or_default(),
            country: record.location.country_code.clone().unwrap_or_default(),
        });

        let camera = Camera::with_defaults(host_ref.clone(), record.port, camera_type.clone(), now);

        match hosts.iter_mut().find(|h| h.ip_address == record.ip_str) {
            Some(host) => {
                host.add_camera(camera);
            }
            None => {
                let mut host = Host::new(&host_ref, now);
                host.add_camera(camera);
                hosts.push(host);
            }
        }
    }

    hosts
}

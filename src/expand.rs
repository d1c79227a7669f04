use crate::model::Candidate;
use std::collections::HashSet;

/// Port expansion policy applied around candidates
#[derive(Debug, Clone, Default)]
pub struct ExpandPolicy {
    /// Ports on either side of the candidate's port to emit
    pub adjacent_depth: u16,
    /// Well-known ports always emitted for the host, when enabled
    pub common_ports: Option<Vec<u16>>,
}

/// Produce the sibling candidates implied by the expansion policy,
/// deduplicated against the supplied already-known (ip, port) set and
/// against the expansion itself. Ports falling outside 1–65535 are
/// skipped.
pub fn expand(
    candidate: &Candidate,
    policy: &ExpandPolicy,
    known: &HashSet<(String, u16)>,
) -> Vec<Candidate> {
    let mut siblings = Vec::new();
    let mut emitted: HashSet<u16> = HashSet::new();
    emitted.insert(candidate.port);

    for i in 1..=i32::from(policy.adjacent_depth) {
        let center = i32::from(candidate.port);
        for port in [center - i, center + i] {
            if !(1..=i32::from(u16::MAX)).contains(&port) {
                continue;
            }
            let port = port as u16;
            if emitted.contains(&port) || known.contains(&(candidate.host.ip.clone(), port)) {
                continue;
            }
            emitted.insert(port);
            siblings.push(sibling(candidate, port));
        }
    }

    if let Some(common) = &policy.common_ports {
        for &port in common {
            if emitted.contains(&port) || known.contains(&(candidate.host.ip.clone(), port)) {
                continue;
            }
            emitted.insert(port);
            siblings.push(sibling(candidate, port));
        }
    }

    siblings
}

fn sibling(candidate: &Candidate, port: u16) -> Candidate {
    Candidate {
        host: candidate.host.clone(),
        port,
        camera_type: candidate.camera_type.clone(),
        username: candidate.username.clone(),
        password: candidate.password.clone(),
    }
}

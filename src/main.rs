// ==========================================================
//  camscout  — internet-wide IP camera discovery tool
// ==========================================================

use camscout::config::{ScanConfig, ScanMode};
use camscout::db::registry;
use camscout::engine::{ConsoleProgress, ScanEngine};
use camscout::errors::ScanError;
use camscout::import::import_hosts;
use camscout::merge::{group_by_host, merge_into_store, MemoryHostStore};
use camscout::model::{Camera, Candidate};
use camscout::search::{gather_hosts, ShodanSearch};
use camscout::table::render_hosts;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), ScanError> {
    let raw_args: Vec<String> = std::env::args().collect();
    let mut args = raw_args.iter().skip(1);

    let mut config = ScanConfig::default();
    let mut mode = None;

    // Parse command line arguments
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--mode" | "-m" => mode = args.next().cloned(),
            "--camera-type" | "-c" => {
                if let Some(value) = args.next() {
                    config.camera_type = value.clone();
                }
            }
            "--api-key" | "-k" => config.api_key = args.next().cloned(),
            "--country" | "-n" => config.country = args.next().cloned(),
            "--ports" | "-p" => {
                if let Some(value) = args.next() {
                    config.ports = Some(parse_port_list(value)?);
                }
            }
            "--pages" | "-P" => {
                config.pages = parse_number(args.next(), "pages")?;
            }
            "--input" | "-i" => config.input_file = args.next().map(PathBuf::from),
            "--log" | "-l" => config.log_file = args.next().map(PathBuf::from),
            "--workers" | "-t" => {
                config.workers = parse_number(args.next(), "workers")?;
            }
            "--adjacent-ports" | "-A" => {
                config.adjacent_depth = parse_number(args.next(), "adjacent-ports")?;
            }
            "--common" | "-C" => config.common_ports = true,
            "--optimistic" | "-O" => config.optimistic = true,
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            other => {
                return Err(ScanError::Config(format!("unknown argument '{}'", other)));
            }
        }
    }

    // Scan mode is decided exactly once, here
    config.mode = match mode.as_deref().map(str::to_lowercase).as_deref() {
        None | Some("search") => ScanMode::Search,
        Some("import") => ScanMode::Import,
        Some(other) => {
            return Err(ScanError::Config(format!(
                "invalid scan mode '{}' (expected search or import)",
                other
            )));
        }
    };

    // API key flag falls back to the environment
    if config.api_key.is_none() {
        config.api_key = std::env::var("SHODAN_API_KEY").ok();
    }

    config.validate()?;

    let camera_type = registry::lookup(&config.camera_type)?;

    let hosts = match config.mode {
        ScanMode::Search => {
            println!("Searching for cameras. Please wait...");
            let api_key = config
                .api_key
                .clone()
                .ok_or_else(|| ScanError::Config("search mode requires an API key".to_string()))?;
            let provider = ShodanSearch::new(api_key)?;
            gather_hosts(
                &provider,
                &camera_type,
                config.country.as_deref(),
                config.ports.as_deref(),
                config.pages,
            )
            .await
        }
        ScanMode::Import => {
            println!("Getting hosts from input file. Please wait...");
            let path = config.input_file.as_ref().ok_or_else(|| {
                ScanError::Config("import mode requires an input file".to_string())
            })?;
            import_hosts(path, &camera_type)?
        }
    };

    let candidates = Candidate::from_hosts(&hosts);
    println!("{}", scan_banner(&config, candidates.len()));

    let engine = ScanEngine::from_config(&config)?;
    let report = engine.run(candidates, Arc::new(ConsoleProgress)).await;

    println!();
    println!("Scan completed in {:.2} seconds", report.elapsed.as_secs_f64());

    if let Some(path) = &config.log_file {
        write_log_file(path, &report.confirmed)?;
    }

    let grouped = group_by_host(&report.confirmed);
    let store = MemoryHostStore::new();
    let outcome = merge_into_store(&grouped, &store).await;

    if !grouped.is_empty() {
        println!("{}", render_hosts(&grouped));
    }
    println!(
        "Found {} open cameras on {} hosts ({} new, {} updated, {} failed to save)",
        report.confirmed.len(),
        grouped.len(),
        outcome.created,
        outcome.updated,
        outcome.failed
    );
    println!("Done");

    Ok(())
}

fn parse_port_list(value: &str) -> Result<Vec<u16>, ScanError> {
    let mut ports = Vec::new();
    for part in value.split(',') {
        let part = part.trim();
        let port: u16 = part
            .parse()
            .map_err(|_| ScanError::Config(format!("'{}' is not a valid port number", part)))?;
        ports.push(port);
    }
    Ok(ports)
}

fn parse_number<T: std::str::FromStr>(
    value: Option<&String>,
    name: &str,
) -> Result<T, ScanError> {
    value
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| ScanError::Config(format!("invalid value for --{}", name)))
}

/// One-line description of what is about to be scanned
fn scan_banner(config: &ScanConfig, candidate_count: usize) -> String {
    let expanding = config.adjacent_depth > 0 || config.common_ports;

    let mut banner = format!("Scanning {}", candidate_count);
    if expanding {
        banner.push_str(" possible");
    }
    banner.push_str(" cameras");

    if config.adjacent_depth > 0 && config.common_ports {
        banner.push_str(" with adjacent and common ports");
    } else if config.adjacent_depth > 0 {
        banner.push_str(" with adjacent ports");
    } else if config.common_ports {
        banner.push_str(" with common ports");
    }

    if expanding && config.optimistic {
        banner.push_str(" (optimistic)");
    }

    banner.push_str("...");
    banner
}

/// Flat text log of confirmed cameras, sorted by (IP, port) ascending
fn write_log_file(path: &Path, confirmed: &[Camera]) -> Result<(), ScanError> {
    let mut cameras: Vec<&Camera> = confirmed.iter().collect();
    cameras.sort_by_key(|c| (ip_sort_key(&c.host.ip), c.port));

    let mut out = String::from("IP\n");
    for camera in cameras {
        out.push_str(&format!("http://{}:{}\n", camera.host.ip, camera.port));
    }

    std::fs::write(path, out)?;
    Ok(())
}

fn ip_sort_key(ip: &str) -> u32 {
    ip.parse::<std::net::Ipv4Addr>().map(u32::from).unwrap_or(0)
}

fn print_usage() {
    println!("Usage: camscout [OPTIONS]");
    println!("Options:");
    println!("  -m, --mode <search|import>   candidate source (default: search)");
    println!(
        "  -c, --camera-type <NAME>     camera type to scan for (default: foscam; known: {})",
        registry::known_names().join(", ")
    );
    println!("  -k, --api-key <KEY>          search provider API key (or SHODAN_API_KEY)");
    println!("  -n, --country <CC>           2-letter country code to search in");
    println!("  -p, --ports <P1,P2,...>      explicit ports to search");
    println!("  -P, --pages <N>              result pages per search query (default: 1)");
    println!("  -i, --input <FILE>           provider export file (import mode)");
    println!("  -l, --log <FILE>             write confirmed cameras to a flat text file");
    println!("  -t, --workers <N>            concurrent scan workers (default: 5)");
    println!("  -A, --adjacent-ports <N>     adjacent ports to crawl around hits");
    println!("  -C, --common                 crawl common camera ports on hits");
    println!("  -O, --optimistic             expand all candidates before probing");
    println!("  -h, --help                   show this help message");
}

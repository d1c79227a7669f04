use crate::model::Host;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

/// Render confirmed hosts as a summary table
pub fn render_hosts(hosts: &[Host]) -> Table {
    let mut table = Table::new();

    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);

    table.set_header(vec!["IP", "Country", "City", "Open Ports"]);

    for host in hosts {
        let mut ports: Vec<u16> = host.cameras.iter().map(|c| c.port).collect();
        ports.sort_unstable();
        let ports = ports
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<String>>()
            .join(", ");

        table.add_row(vec![
            host.ip_address.clone(),
            host.country.clone(),
            host.city.clone(),
            ports,
        ]);
    }

    table
}

//! Zone command handlers.

use std::sync::Arc;

use tabled::Tabled;

use dnsdeck_core::{Console, Zone};

use crate::cli::{GlobalOpts, ZonesArgs, ZonesCommand};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ZoneRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    zone_type: String,
    #[tabled(rename = "Records")]
    records: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
}

impl From<&Arc<Zone>> for ZoneRow {
    fn from(z: &Arc<Zone>) -> Self {
        Self {
            id: z.id,
            name: z.name.clone(),
            zone_type: z.zone_type.clone().unwrap_or_default(),
            records: z.record_count.map(|c| c.to_string()).unwrap_or_default(),
            enabled: if z.enabled { "yes" } else { "no" }.into(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    console: &Console,
    args: ZonesArgs,
    global: &GlobalOpts,
    profile: &str,
) -> Result<(), CliError> {
    match args.command {
        ZonesCommand::List => {
            let zones = console
                .load_zones()
                .await
                .map_err(|e| CliError::from_core(e, profile))?;
            let out = output::render_list(
                &global.output,
                &zones,
                |z| ZoneRow::from(z),
                |z| z.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

//! Config subcommand handlers.

use serde::Serialize;
use tabled::Tabled;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

#[derive(Clone, Serialize, Tabled)]
struct ProfileEntry {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "API URL")]
    api_url: String,
    #[tabled(rename = "Default")]
    #[serde(rename = "default")]
    is_default: bool,
}

fn profile_entries(cfg: &Config) -> Vec<ProfileEntry> {
    let default = cfg.default_profile.as_deref().unwrap_or("default");
    cfg.profiles
        .iter()
        .map(|(name, profile)| ProfileEntry {
            name: name.clone(),
            api_url: profile.api_url.clone(),
            is_default: name == default,
        })
        .collect()
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let rendered = toml::to_string_pretty(&cfg)
                .map_err(|e| CliError::Internal(format!("failed to render config: {e}")))?;
            output::print_output(rendered.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config()?;
            let entries = profile_entries(&cfg);
            if entries.is_empty() {
                if !global.quiet {
                    eprintln!(
                        "No profiles configured; commands use the built-in default profile.\n\
                         Config file: {}",
                        config::config_path().display()
                    );
                }
                return Ok(());
            }
            let out = output::render_list(
                &global.output,
                &entries,
                ProfileEntry::clone,
                |e| e.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

//! Config subcommand handlers.
//!
//! These run before the hub exists; `show` prints the merged settings
//! (defaults, file, environment) so overrides can be checked quickly.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output::{self, RenderCtx};

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let settings = netnest_config::load_settings(global.config.as_deref())?;
            let ctx = RenderCtx::resolve(global, &settings.defaults);
            let out = match ctx.format {
                OutputFormat::Json => output::render_json_pretty(&settings),
                OutputFormat::JsonCompact => output::render_json_compact(&settings),
                OutputFormat::Table | OutputFormat::Plain => {
                    toml::to_string_pretty(&settings).map_err(netnest_config::ConfigError::from)?
                }
            };
            output::print_output(out.trim_end(), ctx.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            let path = global
                .config
                .clone()
                .unwrap_or_else(netnest_config::config_path);
            println!("{}", path.display());
            Ok(())
        }
    }
}

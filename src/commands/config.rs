use crate::cli::ConfigAction;
use crate::config::Config;
use anyhow::Result;
use colored::*;

pub async fn execute(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("{}  Current Configuration:", "⚙️".cyan());

            let config = Config::load()?;

            println!(
                "\n  {} {}",
                "API Endpoint:".white().bold(),
                config.api_endpoint.yellow()
            );
            println!(
                "  {} {}",
                "Default Format:".white().bold(),
                config.default_format.yellow()
            );
            println!(
                "  {} {}",
                "Color Output:".white().bold(),
                if config.color_output {
                    "enabled".green()
                } else {
                    "disabled".red()
                }
            );
            println!(
                "  {} {}",
                "Verbose:".white().bold(),
                if config.verbose {
                    "true".green()
                } else {
                    "false".white()
                }
            );

            println!("\n  {}", "Providers:".white().bold());
            println!(
                "    {} {} ({})",
                "ollama".cyan(),
                config.providers.ollama.base_url.yellow(),
                config.providers.ollama.model
            );
            println!(
                "    {} {} ({})",
                "claude".cyan(),
                config.providers.claude.base_url.yellow(),
                config.providers.claude.model
            );
            println!(
                "    {} {} ({})",
                "openai".cyan(),
                config.providers.openai.base_url.yellow(),
                config.providers.openai.model
            );

            println!("\n  {}", "Orchestrator:".white().bold());
            println!(
                "    {} {}",
                "api_base_url:".white(),
                config.orchestrator.api_base_url.yellow()
            );
            println!(
                "    {} {}",
                "max_workers:".white(),
                config.orchestrator.max_workers.to_string().yellow()
            );
            println!(
                "    {} {}",
                "batch_size:".white(),
                config.orchestrator.batch_size.to_string().yellow()
            );
            println!(
                "    {} {}",
                "rate_limit_per_minute:".white(),
                config.orchestrator.rate_limit_per_minute.to_string().yellow()
            );

            println!(
                "\n  Config file: {}",
                Config::get_config_path()?.display().to_string().blue()
            );
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;

            match key.as_str() {
                "api_endpoint" => config.api_endpoint = value.clone(),
                "default_format" => config.default_format = value.clone(),
                "color_output" => config.color_output = value.parse()?,
                "verbose" => config.verbose = value.parse()?,
                "providers.ollama.base_url" => config.providers.ollama.base_url = value.clone(),
                "providers.ollama.model" => config.providers.ollama.model = value.clone(),
                "providers.claude.base_url" => config.providers.claude.base_url = value.clone(),
                "providers.claude.model" => config.providers.claude.model = value.clone(),
                "providers.claude.api_key" => config.providers.claude.api_key = Some(value.clone()),
                "providers.openai.base_url" => config.providers.openai.base_url = value.clone(),
                "providers.openai.model" => config.providers.openai.model = value.clone(),
                "providers.openai.api_key" => config.providers.openai.api_key = Some(value.clone()),
                "orchestrator.api_base_url" => config.orchestrator.api_base_url = value.clone(),
                "orchestrator.max_workers" => config.orchestrator.max_workers = value.parse()?,
                "orchestrator.batch_size" => config.orchestrator.batch_size = value.parse()?,
                "orchestrator.rate_limit_per_minute" => {
                    config.orchestrator.rate_limit_per_minute = value.parse()?
                }
                _ => anyhow::bail!("Unknown configuration key: {}", key),
            }

            config.save()?;
            println!(
                "{}  Configuration updated: {} = {}",
                "✓".green(),
                key.cyan(),
                value.yellow()
            );
        }
        ConfigAction::Reset => {
            Config::reset()?;
            println!("{}  Configuration reset to defaults", "✓".green());
        }
    }

    Ok(())
}

//! Information display handlers (status, config)

use crate::cli::output::print_config;
use crate::cli::output::print_status;
use crate::AppConfig;
use crate::FaqService;
use crate::Result;

pub fn handle_status_command(service: &FaqService, json: bool) -> Result<()> {
    let status = service.status()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        print_status(&status);
    }
    Ok(())
}

pub fn handle_config_command(config: &AppConfig) -> Result<()> {
    print_config(config);
    Ok(())
}

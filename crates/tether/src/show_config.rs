// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tether config` command implementation.

use tether_config::TetherConfig;
use tether_core::TetherError;

const REDACTED: &str = "[redacted]";

/// Print the effective configuration as TOML.
pub fn run_config(config: &TetherConfig) -> Result<(), TetherError> {
    print!("{}", render(config)?);
    Ok(())
}

fn render(config: &TetherConfig) -> Result<String, TetherError> {
    let mut shown = config.clone();
    if let Some(token) = shown.telegram.bot_token.as_mut() {
        *token = REDACTED.to_string();
    }
    toml::to_string_pretty(&shown)
        .map_err(|e| TetherError::Internal(format!("failed to render configuration: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_redacted() {
        let config =
            tether_config::load_and_validate_str("[telegram]\nbot_token = \"123:secret\"\n").unwrap();
        let out = render(&config).unwrap();
        assert!(!out.contains("123:secret"));
        assert!(out.contains(REDACTED));
    }

    #[test]
    fn rendered_config_reloads() {
        let config = tether_config::load_and_validate_str("[server]\nport = 4100\n").unwrap();
        let out = render(&config).unwrap();
        let reloaded = tether_config::load_and_validate_str(&out).unwrap();
        assert_eq!(reloaded.server.port, 4100);
        assert_eq!(reloaded.storage.queue_path, config.storage.queue_path);
    }
}

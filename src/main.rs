use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;

use sigil::cli::{CliArgs, StartupMode};
use sigil::config::SurfaceConfig;
use sigil::replay::{self, ReplayOutcome};
use sigil::signal::SessionState;

fn main() -> Result<()> {
    sigil::tracing::init();

    let startup = CliArgs::parse()
        .into_config()
        .map_err(anyhow::Error::msg)?;

    let config = match &startup.config_path {
        Some(path) => SurfaceConfig::load_from(path),
        None => SurfaceConfig::load(),
    };

    match startup.mode {
        StartupMode::Replay { script, json } => {
            let source = std::fs::read_to_string(&script)
                .with_context(|| format!("failed to read {}", script.display()))?;
            let outcome = replay::run_script(config, &source)
                .with_context(|| format!("replay of {} failed", script.display()))?;
            print_outcome(&outcome, json)?;
        }
        StartupMode::ShowConfig => {
            match startup.config_path.or_else(sigil::config_paths::config_file) {
                Some(path) => println!("# {}", path.display()),
                None => println!("# no config directory available"),
            }
            print!("{}", serde_yaml::to_string(&config)?);
        }
    }

    Ok(())
}

fn print_outcome(outcome: &ReplayOutcome, as_json: bool) -> Result<()> {
    if as_json {
        let session = match &outcome.state {
            SessionState::Idle => json!(null),
            SessionState::Active {
                id, signal, kind, ..
            } => json!({ "id": id, "signal": signal, "type": kind }),
        };
        let value = json!({
            "content": outcome.html,
            "tokens": outcome.tokens,
            "session": session,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", outcome.html);
    for token in &outcome.tokens {
        println!("{} {} {}", token.kind, token.content, token.props);
    }
    if let SessionState::Active { kind, signal, .. } = &outcome.state {
        println!("(session still open: {} {})", signal, kind);
    }
    Ok(())
}

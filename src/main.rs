//! Quizmaster page simulator
//!
//! Loads a rendered quiz page, attaches the page behaviors and replays a
//! script of user interactions, printing what the page did as JSON.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fs;

    use anyhow::Context;
    use tracing::info;

    use quizmaster_page::{
        config::Config,
        dom::memory::{MemoryPage, PageFixture},
        markup::Markup,
        simulator::{parse_script, Simulation},
        utils::shutdown_signal,
    };

    #[tokio::main(flavor = "current_thread")]
    pub async fn main() -> anyhow::Result<()> {
        let config = Config::parse();

        // Logs go to stderr so stdout carries only the transcript
        tracing_subscriber::fmt()
            .with_env_filter(format!("quizmaster_page={}", config.log_level()))
            .with_writer(std::io::stderr)
            .init();

        info!("Starting quizmaster-page simulator v0.1.0");

        let fixture: PageFixture = serde_json::from_str(
            &fs::read_to_string(&config.page)
                .with_context(|| format!("failed to read page {}", config.page.display()))?,
        )
        .with_context(|| format!("invalid page fixture {}", config.page.display()))?;

        let markup = match &config.markup {
            Some(path) => Markup::from_json(
                &fs::read_to_string(path)
                    .with_context(|| format!("failed to read markup {}", path.display()))?,
            )
            .with_context(|| format!("invalid markup overrides {}", path.display()))?,
            None => Markup::default(),
        };

        let steps = match &config.script {
            Some(path) => parse_script(
                &fs::read_to_string(path)
                    .with_context(|| format!("failed to read script {}", path.display()))?,
            )
            .with_context(|| format!("invalid script {}", path.display()))?,
            None => Vec::new(),
        };

        let mut page = MemoryPage::from_fixture(&fixture);
        page.set_default_confirm_response(!config.decline);

        let mut simulation = Simulation::start(page, &markup, config.tick())
            .context("failed to attach page behaviors")?;
        info!(
            "Replaying {} step(s), timer tick {}ms",
            steps.len(),
            config.tick_ms
        );

        let interrupted = tokio::select! {
            result = async {
                simulation.run_script(&steps).await?;
                if config.wait_for_timer {
                    simulation.wait_for_timer().await?;
                }
                anyhow::Ok(())
            } => {
                result?;
                false
            }
            _ = shutdown_signal() => {
                info!("Shutdown signal received");
                true
            }
        };

        let transcript = simulation.finish().await?;
        let json = if config.pretty {
            serde_json::to_string_pretty(&transcript)?
        } else {
            serde_json::to_string(&transcript)?
        };
        println!("{json}");

        if interrupted {
            info!("Simulation interrupted");
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::main()
}

#[cfg(target_arch = "wasm32")]
fn main() {}

//! `freightcheck scenario` command handler

use std::io::Write;

use freightcheck_core::transport::Transport;
use freightcheck_core::workflow::{ScenarioReport, WorkflowState};

use crate::cli::ScenarioArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};
use crate::scenarios::{self, ScenarioEnv, ScenarioOptions};

/// Execute the `scenario` command.
pub async fn execute<T: Transport>(
    args: ScenarioArgs,
    env: &ScenarioEnv<T>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let options = ScenarioOptions {
        role: args.role.map(Into::into),
        count: args.count,
    };
    let report = scenarios::run(args.name, env, &options).await?;
    writer.render(&report)?;
    Ok(())
}

impl Render for ScenarioReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let state = match &self.final_state {
            WorkflowState::Terminal(s) => s.green().bold(),
            other => other.to_string().red().bold(),
        };

        writeln!(w, "Scenario: {}", self.name.bold())?;
        writeln!(w, "  Role:        {}", self.role.key())?;
        writeln!(w, "  Key:         {}", self.correlation_key)?;
        writeln!(w, "  Final state: {state}")?;
        writeln!(w, "  Elapsed:     {}ms", self.elapsed_ms)?;

        if self.entities.is_empty() {
            writeln!(w, "  Entities:    (none)")?;
        } else {
            writeln!(w, "  Entities:")?;
            for entity in &self.entities {
                writeln!(w, "    - {entity}")?;
            }
        }
        Ok(())
    }
}

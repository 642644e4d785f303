//! Sequential, fail-fast quality gates.
//!
//! Gates share the build directory, so they never run concurrently.

use log::{debug, info};

use crate::domain::{Gate, GateResult};
use crate::error::{ReleaseError, Result};
use crate::toolchain::CommandRunner;
use crate::ui;

pub struct QualityGateRunner<'a> {
    gates: &'a [Gate],
    runner: &'a dyn CommandRunner,
}

impl<'a> QualityGateRunner<'a> {
    pub fn new(gates: &'a [Gate], runner: &'a dyn CommandRunner) -> Self {
        QualityGateRunner { gates, runner }
    }

    /// Run one gate. A command that cannot be started counts as a failure.
    pub fn run_gate(&self, gate: &Gate) -> GateResult {
        let Some((program, args)) = gate.command.split_first() else {
            return GateResult::failed(&gate.name, "gate has an empty command");
        };

        debug!("gate '{}': {}", gate.name, gate.command_line());
        match self.runner.run(program, args) {
            Ok(output) if output.success => GateResult::passed(&gate.name),
            Ok(output) => GateResult::failed(&gate.name, output.diagnostic()),
            Err(e) => GateResult::failed(&gate.name, e.to_string()),
        }
    }

    /// Run gates in order, stopping at the first failure.
    ///
    /// Every gate that ran is appended to `results`; gates after a failure
    /// are never attempted.
    pub fn run_all(&self, results: &mut Vec<GateResult>) -> Result<()> {
        for gate in self.gates {
            ui::display_status(&format!("{} ({})", gate.name, gate.command_line()));
            let result = self.run_gate(gate);
            ui::display_gate_result(&result);

            let failed = !result.passed;
            let diagnostic = result.message.clone();
            results.push(result);

            if failed {
                return Err(ReleaseError::gate(&gate.name, diagnostic));
            }
        }

        info!("all {} quality gates passed", self.gates.len());
        Ok(())
    }
}

//! Step execution.

use std::collections::BTreeMap;
use std::time::Instant;

use dratt_domain::{
    ExpectationReport, Outcome, PlannedStep, RequestSpec, ResponseSpec, Step, StepReport,
    VariableValue, Variables,
};
use tracing::{debug, warn};

use super::TestRunner;
use crate::error::OperationalResult;
use crate::expectations::{all_met, check_expectations};
use crate::ports::{HttpClient, Reporter};
use crate::variable_resolver::{
    substitute_variables_in_expectations, substitute_variables_in_request,
};

/// Parts of a step report filled in as execution progresses.
#[derive(Debug, Default)]
struct StepDraft {
    request: Option<RequestSpec>,
    response: Option<ResponseSpec>,
    expectations: Vec<ExpectationReport>,
    variables_set: BTreeMap<String, VariableValue>,
}

impl StepDraft {
    fn finish(self, planned: &PlannedStep<'_>, outcome: Outcome, started: Instant) -> StepReport {
        StepReport {
            description: planned.step.description.clone(),
            phase: planned.phase,
            seeder: planned.seeder.map(str::to_string),
            request: self.request,
            response: self.response,
            expectations: self.expectations,
            variables_set: self.variables_set,
            outcome,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }
}

impl<C: HttpClient> TestRunner<C> {
    /// Runs one step against the current test scope.
    ///
    /// The request is substituted, sent and its response checked. The
    /// after-step hook runs when every expectation is met, or when
    /// `continue_after_failure` is set. Operational failures at any stage
    /// produce an errored outcome; they are never reported as failures.
    pub async fn run_step<R: Reporter + ?Sized>(
        &self,
        planned: &PlannedStep<'_>,
        variables: &mut Variables<'_>,
        continue_after_failure: bool,
        reporter: &mut R,
    ) -> StepReport {
        reporter.step_started(planned.step, planned.phase, planned.progress);
        let started = Instant::now();
        let mut draft = StepDraft::default();

        let outcome = match self
            .execute_step(planned.step, variables, continue_after_failure, &mut draft, reporter)
            .await
        {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(step = %planned.step.description, kind = ?error.kind(), "{error}");
                error.into_outcome()
            }
        };

        draft.finish(planned, outcome, started)
    }

    async fn execute_step<R: Reporter + ?Sized>(
        &self,
        step: &Step,
        variables: &mut Variables<'_>,
        continue_after_failure: bool,
        draft: &mut StepDraft,
        reporter: &mut R,
    ) -> OperationalResult<Outcome> {
        let combined = variables.combined();

        let request = substitute_variables_in_request(&combined, &step.request)?;
        reporter.request_sent(&request);
        draft.request = Some(request.clone());

        let response = self.requests.execute(&request).await?;
        draft.response = Some(response.clone());

        let expectations = substitute_variables_in_expectations(&combined, &step.expectations)?;
        let reports = check_expectations(&request, &response, &expectations, &combined);
        let met = all_met(&reports);
        draft.expectations = reports;

        if let Some(hook) = step.after_step.as_ref().filter(|_| met || continue_after_failure) {
            let mut setter = variables.setter();
            let hook_result = hook.call(&mut setter, &response);
            for (name, value) in setter.assigned() {
                debug!(variable = %name, value = %value, "setting variable");
                reporter.variable_set(name, value);
            }
            draft.variables_set = setter.assigned().clone();
            let finished = setter.finish();
            hook_result?;
            finished?;
        }

        Ok(if met {
            Outcome::Succeeded
        } else {
            Outcome::Failed
        })
    }
}

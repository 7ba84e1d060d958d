//! Suite file to domain mapping
//!
//! Validates file entries and builds [`Suite`] definitions. Errors carry the
//! location of the offending entry, e.g. `tests[0].steps[2].expect[1]`.

use std::str::FromStr;

use dratt_domain::{DataSeeder, Expectation, HttpMethod, RequestSpec, Step, Suite, Test};

use super::SuiteFileError;
use super::types::{ExpectEntry, SeederEntry, StepEntry, SuiteFile, TestEntry};

/// Maps a parsed suite file to a suite definition.
///
/// # Errors
///
/// Returns [`SuiteFileError::Invalid`] for unsupported methods, malformed
/// expectations and invalid capture pointers.
pub fn map_suite(file: SuiteFile) -> Result<Suite, SuiteFileError> {
    let tests = file
        .tests
        .into_iter()
        .enumerate()
        .map(|(i, test)| map_test(test, &format!("tests[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Suite {
        name: file.name,
        tests,
        variables: file.variables,
        ignore_failed_tests: file.ignore_failed_tests,
    })
}

fn map_test(entry: TestEntry, location: &str) -> Result<Test, SuiteFileError> {
    let data_seeders = entry
        .data_seeders
        .into_iter()
        .enumerate()
        .map(|(i, seeder)| map_seeder(seeder, &format!("{location}.dataSeeders[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Test {
        name: entry.name,
        description: entry.description,
        data_seeders,
        steps: map_steps(entry.steps, &format!("{location}.steps"))?,
        continue_after_failed_steps: entry.continue_after_failed_steps,
    })
}

fn map_seeder(entry: SeederEntry, location: &str) -> Result<DataSeeder, SuiteFileError> {
    Ok(DataSeeder {
        name: entry.name,
        setup: map_steps(entry.setup, &format!("{location}.setup"))?,
        teardown: map_steps(entry.teardown, &format!("{location}.teardown"))?,
    })
}

fn map_steps(entries: Vec<StepEntry>, location: &str) -> Result<Vec<Step>, SuiteFileError> {
    entries
        .into_iter()
        .enumerate()
        .map(|(i, step)| map_step(step, &format!("{location}[{i}]")))
        .collect()
}

fn map_step(entry: StepEntry, location: &str) -> Result<Step, SuiteFileError> {
    let method = HttpMethod::from_str(&entry.request.method)
        .map_err(|e| SuiteFileError::invalid(format!("{location}.request.method"), e))?;

    if entry.request.body.is_some() && !method.has_body() {
        return Err(SuiteFileError::invalid(
            format!("{location}.request.body"),
            format!("{method} requests cannot carry a body"),
        ));
    }

    let expectations = entry
        .expect
        .into_iter()
        .enumerate()
        .map(|(i, expect)| map_expectation(expect, &format!("{location}.expect[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    let mut step = Step::new(
        entry.description,
        RequestSpec {
            method,
            url: entry.request.url,
            body: entry.request.body,
        },
    );
    step.expectations = expectations;

    if entry.capture.is_empty() {
        return Ok(step);
    }

    for (name, pointer) in &entry.capture {
        if !pointer.is_empty() && !pointer.starts_with('/') {
            return Err(SuiteFileError::invalid(
                format!("{location}.capture.{name}"),
                format!("'{pointer}' is not a JSON pointer; it must be empty or start with '/'"),
            ));
        }
    }

    let captures: Vec<(String, String)> = entry.capture.into_iter().collect();
    Ok(step.after_step(move |variables, response| {
        captures.iter().try_for_each(|(name, pointer)| {
            variables.set_from_json(name.as_str(), response.pointer(pointer))
        })
    }))
}

fn map_expectation(entry: ExpectEntry, location: &str) -> Result<Expectation, SuiteFileError> {
    match entry {
        ExpectEntry {
            status: Some(status),
            body: None,
            body_includes: None,
        } => Ok(Expectation::status(status)),
        ExpectEntry {
            status: None,
            body: Some(body),
            body_includes: None,
        } => Ok(Expectation::body_equals(body)),
        ExpectEntry {
            status: None,
            body: None,
            body_includes: Some(body),
        } => Ok(Expectation::body_includes(body)),
        _ => Err(SuiteFileError::invalid(
            location,
            "an expectation needs exactly one of 'status', 'body' or 'bodyIncludes'",
        )),
    }
}

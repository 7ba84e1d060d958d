//! Suite file type definitions
//!
//! These types mirror the on-disk YAML/JSON layout. They are mapped to the
//! domain definitions by [`super::mapper`]; nothing here is executable.

#![allow(missing_docs)]

use std::collections::BTreeMap;

use dratt_domain::{Template, VariableValue};
use serde::{Deserialize, Serialize};

/// Root of a suite file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SuiteFile {
    pub name: String,
    #[serde(default)]
    pub ignore_failed_tests: bool,
    #[serde(default)]
    pub variables: BTreeMap<String, VariableValue>,
    #[serde(default)]
    pub tests: Vec<TestEntry>,
}

/// One test.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TestEntry {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub continue_after_failed_steps: bool,
    #[serde(default)]
    pub data_seeders: Vec<SeederEntry>,
    #[serde(default)]
    pub steps: Vec<StepEntry>,
}

/// A named group of setup and teardown steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SeederEntry {
    pub name: String,
    #[serde(default)]
    pub setup: Vec<StepEntry>,
    #[serde(default)]
    pub teardown: Vec<StepEntry>,
}

/// One step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StepEntry {
    pub description: String,
    pub request: RequestEntry,
    #[serde(default)]
    pub expect: Vec<ExpectEntry>,
    /// Variable name to JSON pointer into the response body.
    #[serde(default)]
    pub capture: BTreeMap<String, String>,
}

/// Request template.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RequestEntry {
    #[serde(default = "default_method")]
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub body: Option<Template>,
}

fn default_method() -> String {
    "GET".to_string()
}

/// One expectation; exactly one field must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExpectEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Template>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_includes: Option<Template>,
}

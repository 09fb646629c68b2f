//! Script executor for running parsed commands.

use std::collections::HashMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use courier_application::{
    DispatchError, DispatchResult, ScriptExecutor, ScriptOutcome, ScriptParams,
};
use regex::{Captures, Regex};
use serde_json::Value;

use super::parser::{ScriptCommand, parse_script};

#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*(\$?[\w.\-]+)\s*\}\}").expect("valid regex")
});

/// Values a script can read.
#[derive(Debug, Clone, Default)]
struct ScriptContext {
    variables: HashMap<String, String>,
    status: u16,
    body: String,
    headers: Vec<(String, String)>,
    url: String,
    method: String,
}

impl ScriptContext {
    fn from_params(params: &ScriptParams) -> Self {
        let mut variables = HashMap::new();
        if let Some(env) = &params.environment {
            for kv in env.values.iter().filter(|kv| kv.enabled) {
                variables.entry(kv.key.clone()).or_insert_with(|| kv.value.clone());
            }
        }
        for (key, value) in &params.globals {
            variables.entry(key.clone()).or_insert_with(|| value.clone());
        }
        Self {
            variables,
            status: params.response.status_code,
            body: params.response.body.clone(),
            headers: params
                .response
                .headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            url: params.request.url.clone(),
            method: params.request.method.clone(),
        }
    }

    fn lookup(&self, name: &str) -> Option<String> {
        match name {
            "$status" => Some(self.status.to_string()),
            "$body" => Some(self.body.clone()),
            "$url" => Some(self.url.clone()),
            "$method" => Some(self.method.clone()),
            _ => match name.strip_prefix("$header.") {
                Some(header) => self
                    .headers
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(header))
                    .map(|(_, v)| v.clone()),
                None => self.variables.get(name).cloned(),
            },
        }
    }

    /// Replaces every known placeholder; unknown ones stay verbatim.
    fn resolve(&self, template: &str) -> String {
        PLACEHOLDER
            .replace_all(template, |caps: &Captures<'_>| {
                self.lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    fn evaluate(&self, condition: &str) -> bool {
        let condition = condition.trim();

        if let Some((left, right)) = condition.split_once("==") {
            return self.resolve(left.trim()) == self.resolve(right.trim());
        }
        if let Some((left, right)) = condition.split_once("!=") {
            return self.resolve(left.trim()) != self.resolve(right.trim());
        }
        if let Some((left, right)) = condition.split_once(">=") {
            return self.compare(left, right, |a, b| a >= b);
        }
        if let Some((left, right)) = condition.split_once("<=") {
            return self.compare(left, right, |a, b| a <= b);
        }
        if let Some((left, right)) = condition.split_once('>') {
            return self.compare(left, right, |a, b| a > b);
        }
        if let Some((left, right)) = condition.split_once('<') {
            return self.compare(left, right, |a, b| a < b);
        }

        let resolved = self.resolve(condition);
        !resolved.is_empty() && resolved != "false" && resolved != "0"
    }

    fn compare(&self, left: &str, right: &str, cmp: impl Fn(f64, f64) -> bool) -> bool {
        match (
            self.resolve(left.trim()).parse::<f64>(),
            self.resolve(right.trim()).parse::<f64>(),
        ) {
            (Ok(l), Ok(r)) => cmp(l, r),
            _ => false,
        }
    }
}

/// Runs the line-oriented DSL.
///
/// Variables written by `set` are visible to later commands of the same run.
#[derive(Debug, Clone, Copy, Default)]
pub struct DslScriptExecutor;

impl DslScriptExecutor {
    /// Create a new script executor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn run(commands: &[ScriptCommand], context: &mut ScriptContext) -> DispatchResult<ScriptOutcome> {
        let mut outcome = ScriptOutcome::default();

        for command in commands {
            match command {
                ScriptCommand::Set { name, value } => {
                    let value = context.resolve(value);
                    context.variables.insert(name.clone(), value.clone());
                    outcome
                        .set_environments
                        .insert(name.clone(), Value::String(value));
                }
                ScriptCommand::Log { message } => {
                    outcome.prints.push(context.resolve(message));
                }
                ScriptCommand::Assert { condition, message } => {
                    if !context.evaluate(condition) {
                        let reason = message.as_ref().map_or_else(
                            || format!("assertion failed: {condition}"),
                            |m| context.resolve(m),
                        );
                        return Err(DispatchError::ScriptExecution(reason));
                    }
                }
            }
        }

        Ok(outcome)
    }
}

#[async_trait]
impl ScriptExecutor for DslScriptExecutor {
    async fn execute(&self, script: &str, params: ScriptParams) -> DispatchResult<ScriptOutcome> {
        let commands = parse_script(script)?;
        let mut context = ScriptContext::from_params(&params);
        Self::run(&commands, &mut context)
    }
}

//! Runs configured checks against a built call index.
//!
//! Each check expands its target list, issues one `find_calls` query, and
//! classifies the relevant arguments of every matched record. Argument
//! classification is precedence-ordered: an immediately-passed tainted input
//! outranks an immediate model reference, which outranks taint reached only
//! transitively; a record with none of those still warns at low confidence.

use crate::checks::config::{CheckConfig, ResolvedMethods};
use crate::checks::registry::{CheckRegistry, ModelRegistry};
use crate::checks::warning::{Confidence, Warning};
use crate::error::Result;
use crate::index::{CallIndex, CallRecord, Expr};
use crate::query::CallQuery;

/// Drives registered checks over one analysis pass.
pub struct CheckRunner<'a> {
    index: &'a CallIndex,
    models: &'a ModelRegistry,
}

impl<'a> CheckRunner<'a> {
    pub fn new(index: &'a CallIndex, models: &'a ModelRegistry) -> Self {
        Self { index, models }
    }

    /// Runs every registered check, in registry order.
    pub fn run_all(&self, registry: &CheckRegistry) -> Result<Vec<Warning>> {
        let mut warnings = Vec::new();
        for check in registry.iter() {
            warnings.extend(self.run_check(check)?);
        }
        Ok(warnings)
    }

    /// Runs one check: one query, one warning per matched record.
    pub fn run_check(&self, check: &CheckConfig) -> Result<Vec<Warning>> {
        let methods = check.methods()?;
        let targets = check.resolve_targets(self.models);

        let mut query = CallQuery::new().with_methods(methods.names());
        if !targets.is_empty() {
            query = query.with_targets(targets);
        }

        let calls = self.index.find_calls(&query);
        tracing::debug!(
            "Check `{}` matched {} call(s)",
            check.label(),
            calls.len(),
        );

        calls
            .iter()
            .map(|call| self.warn(check, call, &methods))
            .collect()
    }

    fn warn(
        &self,
        check: &CheckConfig,
        call: &CallRecord,
        methods: &ResolvedMethods,
    ) -> Result<Warning> {
        let confidence = self.classify_arguments(call, methods);
        Ok(Warning {
            check: check.name()?.to_string(),
            warning_type: check.warning_type()?.to_string(),
            code: check.warning_code()?,
            message: format!("{} in call to `{}`", check.description()?, call.describe()),
            confidence,
            file: call.file.clone(),
            line: call.line,
        })
    }

    /// Classifies the arguments of interest by precedence.
    fn classify_arguments(&self, call: &CallRecord, methods: &ResolvedMethods) -> Confidence {
        let args = relevant_args(call, methods);

        if args.iter().any(|arg| is_immediate_user_input(arg)) {
            Confidence::High
        } else if args.iter().any(|arg| is_immediate_model(arg, self.models))
            || args.iter().any(|arg| contains_user_input(arg))
        {
            Confidence::Medium
        } else {
            Confidence::Weak
        }
    }
}

/// The arguments a check inspects: all of them, or only the configured
/// 1-based positions for this method.
fn relevant_args<'c>(call: &'c CallRecord, methods: &ResolvedMethods) -> Vec<&'c Expr> {
    match methods.positions_for(&call.method) {
        Some(positions) => positions
            .iter()
            .filter_map(|&position| call.args.get(position.saturating_sub(1)))
            .collect(),
        None => call.args.iter().collect(),
    }
}

/// True when the expression is itself tainted input, or a call chain rooted
/// in tainted input (`params[:id].to_s`).
fn is_immediate_user_input(expr: &Expr) -> bool {
    match expr {
        Expr::UserInput(_) => true,
        Expr::Call {
            target: Some(target),
            ..
        } => is_immediate_user_input(target),
        _ => false,
    }
}

/// True when the expression directly references a known model class, or is
/// a call chain rooted in one (`User.find(...)`).
fn is_immediate_model(expr: &Expr, models: &ModelRegistry) -> bool {
    match expr {
        Expr::Name(name) => models.contains(name),
        Expr::Call {
            target: Some(target),
            ..
        } => is_immediate_model(target, models),
        _ => false,
    }
}

/// True when tainted input appears anywhere inside the expression.
fn contains_user_input(expr: &Expr) -> bool {
    match expr {
        Expr::UserInput(_) => true,
        Expr::Call { target, args, .. } => {
            target.as_deref().is_some_and(contains_user_input)
                || args.iter().any(contains_user_input)
        }
        _ => false,
    }
}

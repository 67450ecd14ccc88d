use crate::types::{AttributePath, Diagnostic, Dynamic};

#[derive(Debug, Clone)]
pub struct PlanModifyRequest {
    pub state: Dynamic,
    pub plan: Dynamic,
    pub config: Dynamic,
    pub attribute_path: AttributePath,
}

#[derive(Debug, Clone)]
pub struct PlanModifyResponse {
    pub plan_value: Dynamic,
    pub requires_replace: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl PlanModifyResponse {
    fn unchanged(request: PlanModifyRequest) -> Self {
        Self {
            plan_value: request.plan,
            requires_replace: false,
            diagnostics: Vec::new(),
        }
    }
}

/// Trait for modifying terraform plan behavior
///
/// Plan modifiers run on update plans, after computed attributes have been
/// marked unknown, and can:
/// - Modify the planned value
/// - Mark an attribute as requiring replacement
pub trait PlanModifier: Send + Sync {
    fn modify_plan(&self, request: PlanModifyRequest) -> PlanModifyResponse;
}

/// Marks the resource for replacement whenever the attribute changes
///
/// An unknown planned value counts as a change, since it cannot be shown
/// to equal the prior state.
pub struct RequiresReplace;

impl PlanModifier for RequiresReplace {
    fn modify_plan(&self, request: PlanModifyRequest) -> PlanModifyResponse {
        // Nothing to replace on create
        if request.state.is_null() {
            return PlanModifyResponse::unchanged(request);
        }

        let requires_replace = !values_equal(&request.state, &request.plan);
        PlanModifyResponse {
            plan_value: request.plan,
            requires_replace,
            diagnostics: Vec::new(),
        }
    }
}

/// Copies the prior state value into the plan when the planned value is unknown
///
/// Meant for computed attributes that never change after create, such as ids.
pub struct UseStateForUnknown;

impl PlanModifier for UseStateForUnknown {
    fn modify_plan(&self, request: PlanModifyRequest) -> PlanModifyResponse {
        if request.state.is_null() || !request.plan.is_unknown() || request.config.is_unknown() {
            return PlanModifyResponse::unchanged(request);
        }

        PlanModifyResponse {
            plan_value: request.state.clone(),
            requires_replace: false,
            diagnostics: Vec::new(),
        }
    }
}

/// Structural equality with unknowns never equal to anything
pub fn values_equal(a: &Dynamic, b: &Dynamic) -> bool {
    match (a, b) {
        (Dynamic::Null, Dynamic::Null) => true,
        (Dynamic::Bool(a), Dynamic::Bool(b)) => a == b,
        (Dynamic::Number(a), Dynamic::Number(b)) => (a - b).abs() < f64::EPSILON,
        (Dynamic::String(a), Dynamic::String(b)) => a == b,
        (Dynamic::List(a), Dynamic::List(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| values_equal(x, y))
        }
        (Dynamic::Map(a), Dynamic::Map(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, v)| b.get(k).is_some_and(|v2| values_equal(v, v2)))
        }
        _ => false,
    }
}

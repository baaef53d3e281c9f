//! Template-callable helper functions.
//!
//! | Helper        | Arguments                 | Result                      |
//! |---------------|---------------------------|-----------------------------|
//! | `EscapeNode`  | string                    | `.` and `:` replaced by `_` |
//! | `IntRange`    | count, initial, step      | `count` integers, bounded   |
//! | `ServerNames` | service, domain           | server name objects         |
//! | `ToLower`     | string                    | lower case                  |
//! | `ToUpper`     | string                    | upper case                  |
//! | `Add`         | integers...               | sum, 0 without arguments    |
//! | `Label`       | port or service           | config section label        |

use std::sync::Arc;

use handlebars::{
    handlebars_helper, Context, Handlebars, Helper, HelperDef, RenderContext, RenderError,
    RenderErrorReason, ScopedJson,
};
use serde_json::Value as Json;

use crate::render::names::ServerNameTemplates;
use crate::topology::{PortSpec, ServiceInformation};

/// Make a host name or address usable as an identifier token.
pub fn escape_node(node: &str) -> String {
    node.replace(['.', ':'], "_")
}

/// Sum of all arguments.
pub fn add(values: &[i64]) -> i64 {
    values.iter().sum()
}

/// Finite arithmetic sequence `initial, initial + step, ...` of `count` values.
///
/// Each instance is consumed once; build a new one to iterate again.
#[derive(Debug, Clone)]
pub struct IntRange {
    remaining: i64,
    next: i64,
    step: i64,
}

impl IntRange {
    pub fn new(count: i64, initial: i64, step: i64) -> Self {
        Self {
            remaining: count.max(0),
            next: initial,
            step,
        }
    }
}

impl Iterator for IntRange {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let value = self.next;
        self.next = self.next.wrapping_add(self.step);
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (n, Some(n))
    }
}

handlebars_helper!(escape_node_helper: |node: str| escape_node(node));
handlebars_helper!(to_lower_helper: |s: str| s.to_lowercase());
handlebars_helper!(to_upper_helper: |s: str| s.to_uppercase());

/// Largest sequence `IntRange` will materialize in a template.
pub const MAX_INT_RANGE: i64 = 65_536;

fn helper_error(helper: &str, message: impl std::fmt::Display) -> RenderError {
    RenderErrorReason::Other(format!("{}: {}", helper, message)).into()
}

fn int_param(h: &Helper<'_>, helper: &str, index: usize) -> Result<i64, RenderError> {
    h.param(index)
        .and_then(|p| p.value().as_i64())
        .ok_or_else(|| helper_error(helper, format!("argument {} must be an integer", index)))
}

/// `IntRange count initial step`, bounded by [`MAX_INT_RANGE`].
struct IntRangeHelper;

impl HelperDef for IntRangeHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        let count = int_param(h, "IntRange", 0)?;
        let initial = int_param(h, "IntRange", 1)?;
        let step = int_param(h, "IntRange", 2)?;
        if count > MAX_INT_RANGE {
            return Err(helper_error(
                "IntRange",
                format!("count {} exceeds the limit of {}", count, MAX_INT_RANGE),
            ));
        }
        let values: Vec<Json> = IntRange::new(count, initial, step).map(Json::from).collect();
        Ok(ScopedJson::Derived(Json::Array(values)))
    }
}

/// `Add` takes any number of integer arguments.
struct AddHelper;

impl HelperDef for AddHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        let mut values = Vec::with_capacity(h.params().len());
        for (i, param) in h.params().iter().enumerate() {
            let n = param
                .value()
                .as_i64()
                .ok_or_else(|| helper_error("Add", format!("argument {} is not an integer", i)))?;
            values.push(n);
        }
        Ok(ScopedJson::Derived(Json::from(add(&values))))
    }
}

/// `ServerNames service domain` expands the configured naming templates.
struct ServerNamesHelper {
    templates: Arc<ServerNameTemplates>,
}

impl HelperDef for ServerNamesHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        let service = h
            .param(0)
            .ok_or_else(|| helper_error("ServerNames", "missing service argument"))?;
        let domain = h
            .param(1)
            .and_then(|p| p.value().as_str())
            .ok_or_else(|| helper_error("ServerNames", "missing domain argument"))?;

        let service: ServiceInformation = serde_json::from_value(service.value().clone())
            .map_err(|e| helper_error("ServerNames", e))?;

        let names = self.templates.generate(&service, domain)?;
        let names = serde_json::to_value(names).map_err(|e| helper_error("ServerNames", e))?;
        Ok(ScopedJson::Derived(names))
    }
}

/// `Label value` renders the section label of a service or a port.
struct LabelHelper;

impl HelperDef for LabelHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        let value = h
            .param(0)
            .map(|p| p.value())
            .ok_or_else(|| helper_error("Label", "missing argument"))?;

        // Services carry a namespace, ports do not.
        let label = if value.get("Namespace").is_some() {
            serde_json::from_value::<ServiceInformation>(value.clone())
                .map(|s| s.to_string())
        } else {
            serde_json::from_value::<PortSpec>(value.clone()).map(|p| p.to_string())
        }
        .map_err(|e| helper_error("Label", e))?;

        Ok(ScopedJson::Derived(Json::String(label)))
    }
}

/// Register every helper on a registry.
pub fn register_helpers(registry: &mut Handlebars<'_>, templates: Arc<ServerNameTemplates>) {
    registry.register_helper("EscapeNode", Box::new(escape_node_helper));
    registry.register_helper("IntRange", Box::new(IntRangeHelper));
    registry.register_helper("ServerNames", Box::new(ServerNamesHelper { templates }));
    registry.register_helper("ToLower", Box::new(to_lower_helper));
    registry.register_helper("ToUpper", Box::new(to_upper_helper));
    registry.register_helper("Add", Box::new(AddHelper));
    registry.register_helper("Label", Box::new(LabelHelper));
}

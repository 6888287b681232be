use crate::ConfigValue;

/// Storage side effects requested by the route-state logic.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Effect {
    WriteRouteState { blob: String },
    ClearRouteState,
}

impl Effect {
    pub fn value(&self) -> ConfigValue {
        match self {
            Effect::WriteRouteState { blob } => ConfigValue::text(blob.clone()),
            Effect::ClearRouteState => ConfigValue::empty(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Effect::WriteRouteState { .. } => "write_route_state",
            Effect::ClearRouteState => "clear_route_state",
        }
    }
}

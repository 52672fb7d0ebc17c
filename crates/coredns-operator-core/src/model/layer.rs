// ── Process supervision layers ──
//
// A layer is a named set of service definitions. Layers stack in the
// order they were added; the plan is their combination. Combining follows
// each service's `override`: `replace` swaps the whole definition, `merge`
// only overwrites the fields the newer layer sets.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::corefile::COREFILE_PATH;
use crate::error::CoreError;

/// Name of the supervised CoreDNS service.
pub const SERVICE_NAME: &str = "coredns";
/// Label of the layer the reconciler installs.
pub const LAYER_LABEL: &str = "coredns";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Override {
    #[default]
    Merge,
    Replace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Startup {
    Enabled,
    #[default]
    Disabled,
}

/// Definition of one supervised service within a layer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceSpec {
    #[serde(rename = "override")]
    pub override_mode: Override,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub command: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub startup: Option<Startup>,
}

impl ServiceSpec {
    /// Effective startup mode; unset means disabled.
    pub fn startup(&self) -> Startup {
        self.startup.unwrap_or_default()
    }

    fn apply(&mut self, newer: &ServiceSpec) {
        if newer.override_mode == Override::Replace {
            *self = newer.clone();
            return;
        }
        self.override_mode = newer.override_mode;
        if !newer.summary.is_empty() {
            self.summary.clone_from(&newer.summary);
        }
        if !newer.command.is_empty() {
            self.command.clone_from(&newer.command);
        }
        if newer.startup.is_some() {
            self.startup = newer.startup;
        }
    }
}

/// A set of service definitions added under one label.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Layer {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default)]
    pub services: IndexMap<String, ServiceSpec>,
}

impl Layer {
    fn combine(&mut self, newer: &Layer) {
        if !newer.summary.is_empty() {
            self.summary.clone_from(&newer.summary);
        }
        if !newer.description.is_empty() {
            self.description.clone_from(&newer.description);
        }
        for (name, spec) in &newer.services {
            match self.services.get_mut(name) {
                Some(existing) => existing.apply(spec),
                None => {
                    self.services.insert(name.clone(), spec.clone());
                }
            }
        }
    }
}

/// The layer that runs CoreDNS against the rendered Corefile.
pub fn coredns_layer() -> Layer {
    let mut services = IndexMap::new();
    services.insert(
        SERVICE_NAME.to_owned(),
        ServiceSpec {
            override_mode: Override::Replace,
            summary: "CoreDNS".into(),
            command: format!("/coredns -conf {COREFILE_PATH}"),
            startup: Some(Startup::Enabled),
        },
    );
    Layer {
        summary: "CoreDNS layer".into(),
        description: "pebble config layer for CoreDNS".into(),
        services,
    }
}

// ── Layer stack / plan ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledLayer {
    pub label: String,
    pub layer: Layer,
}

/// Ordered layers as held by a workload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LayerStack {
    layers: Vec<LabeledLayer>,
}

impl LayerStack {
    /// Add `layer` under `label`.
    ///
    /// With `combine`, an existing layer of the same label absorbs the new
    /// one. Without it, reusing a label fails.
    pub fn add(&mut self, label: &str, layer: &Layer, combine: bool) -> Result<(), CoreError> {
        match self.layers.iter_mut().find(|l| l.label == label) {
            Some(existing) if combine => existing.layer.combine(layer),
            Some(_) => {
                return Err(CoreError::LayerExists {
                    label: label.into(),
                });
            }
            None => self.layers.push(LabeledLayer {
                label: label.into(),
                layer: layer.clone(),
            }),
        }
        Ok(())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|l| l.label.as_str())
    }

    /// Combine all layers in order into the effective plan.
    pub fn plan(&self) -> Plan {
        let mut merged = Layer::default();
        for labeled in &self.layers {
            merged.combine(&labeled.layer);
        }
        Plan {
            services: merged.services,
        }
    }
}

/// Effective service definitions after combining every layer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub services: IndexMap<String, ServiceSpec>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn merge_spec(command: &str) -> ServiceSpec {
        ServiceSpec {
            override_mode: Override::Merge,
            command: command.into(),
            ..ServiceSpec::default()
        }
    }

    fn single(name: &str, spec: ServiceSpec) -> Layer {
        Layer {
            services: IndexMap::from([(name.to_owned(), spec)]),
            ..Layer::default()
        }
    }

    #[test]
    fn coredns_plan_matches_expected_yaml() {
        let mut stack = LayerStack::default();
        stack.add(LAYER_LABEL, &coredns_layer(), true).unwrap();
        let yaml = serde_yaml::to_string(&stack.plan()).unwrap();
        insta::assert_snapshot!(yaml, @r"
        services:
          coredns:
            override: replace
            summary: CoreDNS
            command: /coredns -conf /etc/coredns/Corefile
            startup: enabled
        ");
    }

    #[test]
    fn adding_existing_label_without_combine_fails() {
        let mut stack = LayerStack::default();
        stack.add("base", &coredns_layer(), false).unwrap();
        let err = stack.add("base", &coredns_layer(), false).unwrap_err();
        assert!(matches!(err, CoreError::LayerExists { label } if label == "base"));
    }

    #[test]
    fn combining_same_layer_is_idempotent() {
        let mut stack = LayerStack::default();
        stack.add(LAYER_LABEL, &coredns_layer(), true).unwrap();
        let before = stack.plan();
        stack.add(LAYER_LABEL, &coredns_layer(), true).unwrap();
        assert_eq!(stack.plan(), before);
        assert_eq!(stack.labels().count(), 1);
    }

    #[test]
    fn merge_keeps_unset_fields() {
        let mut stack = LayerStack::default();
        stack.add(LAYER_LABEL, &coredns_layer(), true).unwrap();
        stack
            .add("tuning", &single(SERVICE_NAME, merge_spec("/coredns -dns.port 1053")), true)
            .unwrap();

        let plan = stack.plan();
        let spec = &plan.services[SERVICE_NAME];
        assert_eq!(spec.command, "/coredns -dns.port 1053");
        assert_eq!(spec.summary, "CoreDNS");
        assert_eq!(spec.startup(), Startup::Enabled);
    }

    #[test]
    fn replace_drops_previous_fields() {
        let mut stack = LayerStack::default();
        stack.add(LAYER_LABEL, &coredns_layer(), true).unwrap();
        let replacement = ServiceSpec {
            override_mode: Override::Replace,
            command: "/coredns".into(),
            ..ServiceSpec::default()
        };
        stack
            .add("override", &single(SERVICE_NAME, replacement), true)
            .unwrap();

        let plan = stack.plan();
        let spec = &plan.services[SERVICE_NAME];
        assert_eq!(spec.summary, "");
        assert_eq!(spec.startup(), Startup::Disabled);
    }
}

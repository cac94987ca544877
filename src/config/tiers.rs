//! Tier-based composition of configuration nodes.
//!
//! Each organizational tier (core, core-ag, themes, sites, apps, applets)
//! inherits the URL trees of the tier below it and adds its own entries. Tiers
//! are composed strictly bottom-up; every composed node keeps a reference to
//! the lower tiers it was built from in `others`.

use super::template::format_template;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Embedded default tier definitions.
pub const DEFAULT_TIERS_YAML: &str = include_str!("../../config/tiers.yaml");

/// Organizational tier, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    Core,
    CoreAg,
    Themes,
    Sites,
    Apps,
    Applets,
}

impl Tier {
    /// All tiers in composition order.
    pub const ALL: [Tier; 6] = [
        Tier::Core,
        Tier::CoreAg,
        Tier::Themes,
        Tier::Sites,
        Tier::Apps,
        Tier::Applets,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Core => "core",
            Tier::CoreAg => "core-ag",
            Tier::Themes => "themes",
            Tier::Sites => "sites",
            Tier::Apps => "apps",
            Tier::Applets => "applets",
        }
    }

    /// Tiers that must be composed before this one.
    pub fn ancestors(&self) -> &'static [Tier] {
        let index = *self as usize;
        &Self::ALL[..index]
    }

    /// The tier directly below this one, if any.
    pub fn parent(&self) -> Option<Tier> {
        self.ancestors().last().copied()
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalize = |value: &str| value.replace(['-', '_'], "").to_ascii_lowercase();
        let wanted = normalize(s);
        Tier::ALL
            .into_iter()
            .find(|tier| normalize(tier.as_str()) == wanted)
            .ok_or_else(|| ConfigError::UnknownTier(s.to_string()))
    }
}

/// A node in a URL tree: either a URL fragment or a nested group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UrlNode {
    Leaf(String),
    Branch(UrlTree),
}

/// Nested, string-valued tree of URLs, asset paths, or routes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UrlTree(BTreeMap<String, UrlNode>);

impl UrlTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn insert(&mut self, key: impl Into<String>, node: UrlNode) {
        self.0.insert(key.into(), node);
    }

    /// Look up a leaf by dotted path.
    pub fn get(&self, path: &str) -> Option<&str> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut node = self.0.get(first)?;
        for segment in segments {
            match node {
                UrlNode::Branch(tree) => node = tree.0.get(segment)?,
                UrlNode::Leaf(_) => return None,
            }
        }
        match node {
            UrlNode::Leaf(value) => Some(value),
            UrlNode::Branch(_) => None,
        }
    }

    /// Substitute every leaf template with `args`.
    pub fn substitute(&self, args: &[String]) -> Result<UrlTree, ConfigError> {
        let mut out = BTreeMap::new();
        for (key, node) in &self.0 {
            let resolved = match node {
                UrlNode::Leaf(template) => UrlNode::Leaf(format_template(template, args)?),
                UrlNode::Branch(tree) => UrlNode::Branch(tree.substitute(args)?),
            };
            out.insert(key.clone(), resolved);
        }
        Ok(UrlTree(out))
    }

    /// Layer `own` entries over `self`, rejecting any entry that changes an
    /// inherited leaf into a group or the reverse. `prefix` names the path for
    /// error messages.
    fn inherit(&self, own: UrlTree, prefix: &str) -> Result<UrlTree, String> {
        let mut merged = self.0.clone();
        for (key, node) in own.0 {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", prefix, key)
            };
            let combined = match (merged.remove(&key), node) {
                (Some(UrlNode::Branch(lower)), UrlNode::Branch(upper)) => {
                    UrlNode::Branch(lower.inherit(upper, &path)?)
                }
                (Some(UrlNode::Leaf(_)), UrlNode::Branch(_))
                | (Some(UrlNode::Branch(_)), UrlNode::Leaf(_)) => return Err(path),
                (_, node) => node,
            };
            merged.insert(key, combined);
        }
        Ok(UrlTree(merged))
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Object(Map::new()))
    }
}

/// API, asset, and resource path trees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constants {
    #[serde(default)]
    pub apis: UrlTree,
    #[serde(default)]
    pub assets: UrlTree,
    #[serde(default)]
    pub resources: UrlTree,
}

/// The shape every tier shares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseConfig {
    pub constants: Constants,
    pub navigation: UrlTree,
}

/// Fields a tier adds on top of [`BaseConfig`].
///
/// `extras` holds ad hoc named URL fragments that have no fixed schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierExtensions {
    pub extras: BTreeMap<String, String>,
}

/// Values substituted into tier templates alongside the tier path.
///
/// Templates see `{0}` = tier path, `{1}` = `api_url`, `{2}` = `asset_root`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub asset_root: String,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            asset_root: String::new(),
        }
    }
}

fn default_api_url() -> String {
    "http://localhost:8080".to_string()
}

/// Declarative input for one tier, as authored in `tiers.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierDefinition {
    pub tier: Tier,

    /// Tier name; becomes the node id.
    pub name: String,

    /// Path segment substituted as `{0}`. Defaults to the tier's own name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default)]
    pub constants: Constants,

    #[serde(default)]
    pub navigation: UrlTree,

    #[serde(default)]
    pub extras: BTreeMap<String, String>,
}

impl TierDefinition {
    fn template_args(&self, env: &Environment) -> Vec<String> {
        vec![
            self.path.clone().unwrap_or_else(|| self.tier.as_str().to_string()),
            env.api_url.clone(),
            env.asset_root.clone(),
        ]
    }
}

/// Document holding every tier definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TierDefinitions {
    #[serde(default)]
    pub tiers: Vec<TierDefinition>,
}

impl TierDefinitions {
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// The definitions compiled into the binary.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_yaml(DEFAULT_TIERS_YAML)
    }
}

/// One tier's fully composed configuration.
#[derive(Debug, Clone)]
pub struct ConfigurationNode {
    pub id: String,
    pub tier: Tier,
    pub base: BaseConfig,
    pub extensions: TierExtensions,
    /// Lower tiers by name, shared rather than re-derived.
    pub others: BTreeMap<String, Arc<ConfigurationNode>>,
}

impl ConfigurationNode {
    pub fn apis(&self) -> &UrlTree {
        &self.base.constants.apis
    }

    pub fn assets(&self) -> &UrlTree {
        &self.base.constants.assets
    }

    pub fn resources(&self) -> &UrlTree {
        &self.base.constants.resources
    }

    pub fn navigation(&self) -> &UrlTree {
        &self.base.navigation
    }

    /// Look up a lower tier by name.
    pub fn other(&self, name: &str) -> Option<&Arc<ConfigurationNode>> {
        self.others.get(name)
    }

    fn own_value(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("id".into(), Value::String(self.id.clone()));
        map.insert("tier".into(), Value::String(self.tier.as_str().into()));
        map.insert(
            "constants".into(),
            json!({
                "apis": self.apis().to_value(),
                "assets": self.assets().to_value(),
                "resources": self.resources().to_value(),
            }),
        );
        map.insert("navigation".into(), self.navigation().to_value());
        map.insert(
            "extras".into(),
            serde_json::to_value(&self.extensions.extras).unwrap_or_default(),
        );
        map
    }

    /// Project the node into a JSON tree. Lower tiers appear under `others`
    /// without their own `others`, which would only repeat the same data.
    pub fn to_value(&self) -> Value {
        let mut map = self.own_value();
        let others: Map<String, Value> = self
            .others
            .iter()
            .map(|(name, node)| (name.clone(), Value::Object(node.own_value())))
            .collect();
        map.insert("others".into(), Value::Object(others));
        Value::Object(map)
    }
}

/// Compose one tier from its definition and the already-composed lower tiers.
///
/// Fails when the name is empty, when any lower tier is missing from
/// `ancestors`, when a template needs more arguments than exist, or when the
/// tier retypes an inherited path.
pub fn compose_tier(
    definition: &TierDefinition,
    env: &Environment,
    ancestors: &TierSet,
) -> Result<ConfigurationNode, ConfigError> {
    if definition.name.trim().is_empty() {
        return Err(ConfigError::EmptyTierName);
    }

    let mut others = BTreeMap::new();
    for ancestor in definition.tier.ancestors() {
        let node = ancestors
            .get(*ancestor)
            .ok_or_else(|| ConfigError::MissingAncestor {
                tier: definition.name.clone(),
                missing: ancestor.as_str().to_string(),
            })?;
        others.insert(node.id.clone(), Arc::clone(node));
    }

    let args = definition.template_args(env);
    let own = BaseConfig {
        constants: Constants {
            apis: definition.constants.apis.substitute(&args)?,
            assets: definition.constants.assets.substitute(&args)?,
            resources: definition.constants.resources.substitute(&args)?,
        },
        navigation: definition.navigation.substitute(&args)?,
    };
    let mut own_extras = BTreeMap::new();
    for (key, template) in &definition.extras {
        own_extras.insert(key.clone(), format_template(template, &args)?);
    }

    let parent = definition.tier.parent().and_then(|tier| ancestors.get(tier));
    let (base, extensions) = match parent {
        Some(parent) => {
            let retyped = |path: String| ConfigError::Retyped {
                tier: definition.name.clone(),
                path,
            };
            let lower = &parent.base;
            let base = BaseConfig {
                constants: Constants {
                    apis: lower
                        .constants
                        .apis
                        .inherit(own.constants.apis, "constants.apis")
                        .map_err(retyped)?,
                    assets: lower
                        .constants
                        .assets
                        .inherit(own.constants.assets, "constants.assets")
                        .map_err(retyped)?,
                    resources: lower
                        .constants
                        .resources
                        .inherit(own.constants.resources, "constants.resources")
                        .map_err(retyped)?,
                },
                navigation: lower
                    .navigation
                    .inherit(own.navigation, "navigation")
                    .map_err(retyped)?,
            };
            let mut extras = parent.extensions.extras.clone();
            extras.extend(own_extras);
            (base, TierExtensions { extras })
        }
        None => (own, TierExtensions { extras: own_extras }),
    };

    debug!(tier = %definition.tier, name = %definition.name, others = others.len(), "Composed tier");

    Ok(ConfigurationNode {
        id: definition.name.clone(),
        tier: definition.tier,
        base,
        extensions,
        others,
    })
}

/// The composed tiers, in order.
#[derive(Debug, Clone, Default)]
pub struct TierSet {
    nodes: BTreeMap<Tier, Arc<ConfigurationNode>>,
}

impl TierSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compose every definition in order.
    pub fn compose_all(
        definitions: &TierDefinitions,
        env: &Environment,
    ) -> Result<Self, ConfigError> {
        let mut set = Self::new();
        for definition in &definitions.tiers {
            set.compose_next(definition, env)?;
        }
        Ok(set)
    }

    /// Compose the next tier. It must sit above every tier already composed.
    pub fn compose_next(
        &mut self,
        definition: &TierDefinition,
        env: &Environment,
    ) -> Result<Arc<ConfigurationNode>, ConfigError> {
        if let Some(top) = self.top()
            && top.tier >= definition.tier
        {
            return Err(ConfigError::OutOfOrder {
                tier: definition.tier.as_str().to_string(),
                previous: top.tier.as_str().to_string(),
            });
        }
        let node = Arc::new(compose_tier(definition, env, self)?);
        self.nodes.insert(definition.tier, Arc::clone(&node));
        Ok(node)
    }

    pub fn get(&self, tier: Tier) -> Option<&Arc<ConfigurationNode>> {
        self.nodes.get(&tier)
    }

    /// Highest composed tier.
    pub fn top(&self) -> Option<&Arc<ConfigurationNode>> {
        self.nodes.values().next_back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ConfigurationNode>> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(s: &str) -> UrlNode {
        UrlNode::Leaf(s.to_string())
    }

    fn definition(tier: Tier) -> TierDefinition {
        TierDefinition {
            tier,
            name: tier.as_str().to_string(),
            path: None,
            constants: Constants::default(),
            navigation: UrlTree::new(),
            extras: BTreeMap::new(),
        }
    }

    #[test]
    fn test_tier_order_and_ancestors() {
        assert!(Tier::Core < Tier::Applets);
        assert!(Tier::Core.ancestors().is_empty());
        assert_eq!(Tier::Themes.ancestors(), &[Tier::Core, Tier::CoreAg]);
        assert_eq!(Tier::Apps.parent(), Some(Tier::Sites));
        assert_eq!("core-ag".parse::<Tier>().unwrap(), Tier::CoreAg);
        assert_eq!("CoreAg".parse::<Tier>().unwrap(), Tier::CoreAg);
        assert!("nope".parse::<Tier>().is_err());
    }

    #[test]
    fn test_core_substitutes_templates() {
        let mut core = definition(Tier::Core);
        core.constants.assets.insert("images", leaf("/assets/{0}/deployed/"));
        core.constants.apis.insert("users", leaf("{1}/api/{0}/users/"));

        let node = compose_tier(&core, &Environment::default(), &TierSet::new()).unwrap();
        assert_eq!(node.assets().get("images"), Some("/assets/core/deployed/"));
        assert_eq!(
            node.apis().get("users"),
            Some("http://localhost:8080/api/core/users/")
        );
        assert!(node.others.is_empty());
    }

    #[test]
    fn test_missing_ancestor_is_dependency_error() {
        let themes = definition(Tier::Themes);
        let err = compose_tier(&themes, &Environment::default(), &TierSet::new()).unwrap_err();
        match err {
            ConfigError::MissingAncestor { tier, missing } => {
                assert_eq!(tier, "themes");
                assert_eq!(missing, "core");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut core = definition(Tier::Core);
        core.name = "  ".to_string();
        let err = compose_tier(&core, &Environment::default(), &TierSet::new()).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyTierName));
    }

    #[test]
    fn test_template_arity_error() {
        let mut core = definition(Tier::Core);
        core.navigation.insert("bad", leaf("/{3}/"));
        let err = compose_tier(&core, &Environment::default(), &TierSet::new()).unwrap_err();
        assert!(matches!(err, ConfigError::TemplateArity { expected: 4, supplied: 3, .. }));
    }

    #[test]
    fn test_higher_tier_inherits_and_overrides() {
        let env = Environment::default();
        let mut core = definition(Tier::Core);
        core.navigation.insert("home", leaf("/"));
        core.navigation.insert("login", leaf("/login"));
        core.extras.insert("logo".to_string(), "/assets/{0}/logo.svg".to_string());

        let mut core_ag = definition(Tier::CoreAg);
        core_ag.navigation.insert("login", leaf("/{0}/login"));
        core_ag.navigation.insert("grid", leaf("/{0}/grid"));

        let mut set = TierSet::new();
        set.compose_next(&core, &env).unwrap();
        let node = set.compose_next(&core_ag, &env).unwrap();

        assert_eq!(node.navigation().get("home"), Some("/"));
        assert_eq!(node.navigation().get("login"), Some("/core-ag/login"));
        assert_eq!(node.navigation().get("grid"), Some("/core-ag/grid"));
        assert_eq!(
            node.extensions.extras.get("logo").map(String::as_str),
            Some("/assets/core/logo.svg")
        );
        assert_eq!(node.other("core").unwrap().navigation().get("login"), Some("/login"));
    }

    #[test]
    fn test_retyping_inherited_path_rejected() {
        let env = Environment::default();
        let mut core = definition(Tier::Core);
        core.navigation.insert("spike", leaf("/spike"));

        let mut nested = UrlTree::new();
        nested.insert("browse", leaf("/spike"));
        let mut core_ag = definition(Tier::CoreAg);
        core_ag.navigation.insert("spike", UrlNode::Branch(nested));

        let mut set = TierSet::new();
        set.compose_next(&core, &env).unwrap();
        let err = set.compose_next(&core_ag, &env).unwrap_err();
        match err {
            ConfigError::Retyped { path, .. } => assert_eq!(path, "navigation.spike"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_out_of_order_rejected() {
        let env = Environment::default();
        let mut set = TierSet::new();
        set.compose_next(&definition(Tier::Core), &env).unwrap();
        set.compose_next(&definition(Tier::CoreAg), &env).unwrap();
        let err = set.compose_next(&definition(Tier::Core), &env).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfOrder { .. }));
    }

    #[test]
    fn test_embedded_defaults_compose() {
        let definitions = TierDefinitions::embedded().unwrap();
        let set = TierSet::compose_all(&definitions, &Environment::default()).unwrap();
        assert_eq!(set.len(), Tier::ALL.len());

        let top = set.top().unwrap();
        assert_eq!(top.tier, Tier::Applets);
        assert_eq!(top.others.len(), 5);
        assert!(top.apis().get("spike").is_some());

        let value = top.to_value();
        assert_eq!(value["id"], "applets");
        assert!(value["others"]["core"]["constants"]["apis"].is_object());
        assert!(value["others"]["core"].get("others").is_none());
    }
}

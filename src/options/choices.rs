//! Settings Choices
//!
//! Provider and model selection lists for the settings menu.

use crate::config::Catalog;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Special provider ID for ChatGPT subscription auth
pub const CHATGPT_PROVIDER_ID: &str = "chatgpt-subscription";

/// Display label of the ChatGPT subscription provider
pub const CHATGPT_PROVIDER_LABEL: &str = "ChatGPT Subscription";

/// One entry of a selection list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SelectOption {
    /// Text shown in the menu
    pub label: String,

    /// Value stored when the entry is chosen
    pub id: String,
}

pub type ProviderOption = SelectOption;
pub type ModelOption = SelectOption;

impl SelectOption {
    pub fn new(label: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            id: id.into(),
        }
    }

    /// Option whose label is its identifier
    pub fn same(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            id: name,
        }
    }
}

impl From<SelectOption> for (String, String) {
    fn from(option: SelectOption) -> Self {
        (option.label, option.id)
    }
}

/// Builds selection lists from a catalog
#[derive(Debug, Clone, Copy)]
pub struct OptionBuilder<'a> {
    catalog: &'a Catalog,
}

impl<'a> OptionBuilder<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Available LLM providers.
    ///
    /// The subscription provider comes first. Verified providers are always
    /// listed, even ones the provider registry does not know (such as a
    /// custom gateway); unverified keys are kept only when they are known
    /// providers, since that table also carries vendor names.
    pub fn provider_options(&self) -> Vec<ProviderOption> {
        let verified = self.catalog.verified.keys();
        let valid_unverified = self
            .catalog
            .unverified
            .keys()
            .filter(|provider| self.catalog.is_known_provider(provider));

        let providers: BTreeSet<&String> = verified.chain(valid_unverified).collect();

        std::iter::once(SelectOption::new(CHATGPT_PROVIDER_LABEL, CHATGPT_PROVIDER_ID))
            .chain(providers.into_iter().map(|p| SelectOption::same(p.as_str())))
            .collect()
    }

    /// Models for a provider, sorted; empty for an unknown provider
    pub fn model_options(&self, provider: &str) -> Vec<ModelOption> {
        if is_subscription_provider(Some(provider)) {
            return self.subscription_model_options();
        }

        let models = self
            .catalog
            .verified_models(provider)
            .iter()
            .chain(self.catalog.unverified_models(provider));
        sorted_unique(models)
    }

    /// Models available through the ChatGPT subscription
    pub fn subscription_model_options(&self) -> Vec<ModelOption> {
        sorted_unique(self.catalog.subscription_models.iter())
    }
}

fn sorted_unique<'s>(names: impl Iterator<Item = &'s String>) -> Vec<SelectOption> {
    names
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|name| SelectOption::same(name.as_str()))
        .collect()
}

/// Check if the given provider is the ChatGPT subscription provider
pub fn is_subscription_provider(provider: Option<&str>) -> bool {
    provider == Some(CHATGPT_PROVIDER_ID)
}

static PROVIDER_OPTIONS: OnceLock<Vec<ProviderOption>> = OnceLock::new();

/// Provider options of the global catalog, computed once
pub fn provider_options() -> &'static [ProviderOption] {
    PROVIDER_OPTIONS.get_or_init(|| OptionBuilder::new(Catalog::global()).provider_options())
}

/// Model options of the global catalog
pub fn model_options(provider: &str) -> Vec<ModelOption> {
    OptionBuilder::new(Catalog::global()).model_options(provider)
}

/// Subscription model options of the global catalog
pub fn subscription_model_options() -> Vec<ModelOption> {
    OptionBuilder::new(Catalog::global()).subscription_model_options()
}

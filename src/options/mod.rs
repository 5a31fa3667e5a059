//! Options Module
//!
//! Selection lists for the settings menu.

pub mod choices;

pub use choices::{
    is_subscription_provider, model_options, provider_options, subscription_model_options,
    ModelOption, OptionBuilder, ProviderOption, SelectOption, CHATGPT_PROVIDER_ID,
    CHATGPT_PROVIDER_LABEL,
};

//! Host view helpers.
//!
//! A [`ViewContext`] is the trusted side of delegation: the sandbox forwards a call
//! here only after finding its name among the registry's helpers. The host decides
//! what each helper returns.

use std::collections::BTreeMap;

use crate::ast::Value;
use crate::config::ViewConfig;
use crate::methods::helpers::{expect_arity, reject_kwargs, token};
use crate::runtime::eval::Invocation;
use crate::{runtime_err, TrellisError};

pub trait ViewContext {
    fn call_helper(&self, call: &Invocation<'_>) -> Result<Value, TrellisError>;
}

/// A self-contained view with a translation table and an asset host.
#[derive(Debug, Clone, Default)]
pub struct StaticViewContext {
    asset_host: String,
    translations: BTreeMap<String, String>,
}

impl StaticViewContext {
    pub fn new(asset_host: impl Into<String>) -> Self {
        Self {
            asset_host: asset_host.into().trim_end_matches('/').to_string(),
            translations: BTreeMap::new(),
        }
    }

    pub fn from_config(config: &ViewConfig) -> Self {
        let mut view = Self::new(config.asset_host.clone());
        view.translations = config.translations.clone();
        view
    }

    pub fn with_translation(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.translations.insert(key.into(), text.into());
        self
    }

    fn asset_url(&self, dir: &str, call: &Invocation<'_>) -> Result<Value, TrellisError> {
        expect_arity(call, 1, 1)?;
        reject_kwargs(call)?;
        let path = token(&call.args[0], call.span)?;
        if path.split('/').any(|segment| segment == "..") || path.contains("://") {
            return Err(runtime_err!(
                ArgumentError,
                call.span,
                "invalid asset path '{}'",
                path
            ));
        }
        Ok(Value::String(format!(
            "{}/{}/{}",
            self.asset_host,
            dir,
            path.trim_start_matches('/')
        )))
    }
}

impl ViewContext for StaticViewContext {
    fn call_helper(&self, call: &Invocation<'_>) -> Result<Value, TrellisError> {
        match call.method {
            "t" => {
                expect_arity(call, 1, 1)?;
                reject_kwargs(call)?;
                let key = token(&call.args[0], call.span)?;
                // Missing keys render as the key itself.
                Ok(Value::String(
                    self.translations.get(&key).cloned().unwrap_or(key),
                ))
            }
            "asset_path" => self.asset_url("assets", call),
            "image_path" => self.asset_url("images", call),
            other => Err(runtime_err!(
                NoMethodError,
                call.span,
                "undefined helper '{}' for view",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Kwargs;
    use crate::syntax::Span;

    fn call(method: &'static str, arg: &str) -> Invocation<'static> {
        Invocation {
            method,
            args: vec![Value::String(arg.to_string())],
            kwargs: Kwargs::new(),
            block: None,
            span: Span::default(),
        }
    }

    #[test]
    fn translations_fall_back_to_key() {
        let view = StaticViewContext::default().with_translation("hello", "Bonjour");
        assert_eq!(view.call_helper(&call("t", "hello")).unwrap(), Value::String("Bonjour".into()));
        assert_eq!(view.call_helper(&call("t", "bye")).unwrap(), Value::String("bye".into()));
    }

    #[test]
    fn asset_paths_join_host() {
        let view = StaticViewContext::new("https://cdn.test/");
        assert_eq!(
            view.call_helper(&call("image_path", "logo.png")).unwrap(),
            Value::String("https://cdn.test/images/logo.png".into())
        );
        assert!(view.call_helper(&call("asset_path", "../secrets")).is_err());
    }
}

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::backend::{BackendOptions, Event};
use crate::error::ReporterError;
use crate::types::Breadcrumb;

use super::{BreadcrumbOptions, Dsn, SentryConfig, DEFAULT_SAMPLE_RATE};

#[must_use]
#[derive(Default)]
pub struct SentryConfigBuilder {
    dsn: Option<String>,
    release: Option<String>,
    environment: Option<String>,
    enabled: Option<bool>,
    sample_rate: Option<f32>,
    breadcrumbs: Option<BreadcrumbOptions>,
    tags: BTreeMap<String, String>,
    before_init: Option<super::BeforeInit>,
    before_send: Option<super::BeforeSend>,
    before_breadcrumb: Option<super::BeforeBreadcrumb>,
}

impl std::fmt::Debug for SentryConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentryConfigBuilder")
            .field("dsn", &self.dsn)
            .field("release", &self.release)
            .field("environment", &self.environment)
            .field("enabled", &self.enabled)
            .field("sample_rate", &self.sample_rate)
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}

impl SentryConfigBuilder {
    pub fn dsn(mut self, dsn: impl Into<String>) -> Self {
        self.dsn = Some(dsn.into());
        self
    }

    pub fn release(mut self, release: impl Into<String>) -> Self {
        self.release = Some(release.into());
        self
    }

    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn sample_rate(mut self, rate: f32) -> Self {
        self.sample_rate = Some(rate);
        self
    }

    pub fn breadcrumbs(mut self, options: BreadcrumbOptions) -> Self {
        self.breadcrumbs = Some(options);
        self
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn tags<K, V>(mut self, tags: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.tags
            .extend(tags.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn before_init<F>(mut self, hook: F) -> Self
    where
        F: Fn(BackendOptions) -> BackendOptions + Send + Sync + 'static,
    {
        self.before_init = Some(Arc::new(hook));
        self
    }

    pub fn before_send<F>(mut self, hook: F) -> Self
    where
        F: Fn(Event) -> Option<Event> + Send + Sync + 'static,
    {
        self.before_send = Some(Arc::new(hook));
        self
    }

    pub fn before_breadcrumb<F>(mut self, hook: F) -> Self
    where
        F: Fn(Breadcrumb) -> Option<Breadcrumb> + Send + Sync + 'static,
    {
        self.before_breadcrumb = Some(Arc::new(hook));
        self
    }

    pub fn build(self) -> Result<SentryConfig, ReporterError> {
        let dsn = self
            .dsn
            .ok_or_else(|| ReporterError::Config("dsn is required".to_string()))?;
        let dsn = Dsn::parse(&dsn)?;

        let sample_rate = self.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE);
        if !(0.0..=1.0).contains(&sample_rate) {
            return Err(ReporterError::Config(format!(
                "sample_rate must be within [0, 1], got: {}",
                sample_rate
            )));
        }

        Ok(SentryConfig {
            dsn,
            release: self.release,
            environment: self.environment,
            enabled: self.enabled.unwrap_or(true),
            sample_rate,
            breadcrumbs: self.breadcrumbs.unwrap_or_default(),
            tags: self.tags,
            before_init: self.before_init,
            before_send: self.before_send,
            before_breadcrumb: self.before_breadcrumb,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DSN: &str = "https://key@sentry.example.com/1";

    #[test]
    fn test_builder_default_values() {
        let config = SentryConfig::builder().dsn(DSN).build().unwrap();

        assert!(config.enabled());
        assert_eq!(config.sample_rate(), 1.0);
        assert_eq!(config.breadcrumbs(), &BreadcrumbOptions::default());
        assert!(config.release().is_none());
        assert!(config.environment().is_none());
        assert!(config.tags().is_empty());
        assert!(config.before_init().is_none());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = SentryConfig::builder()
            .dsn(DSN)
            .release("2.3.1")
            .environment("pre")
            .enabled(false)
            .sample_rate(0.25)
            .tag("platform", "wechat")
            .tags([("app", "shop"), ("channel", "store")])
            .before_init(|options| options)
            .build()
            .unwrap();

        assert!(!config.enabled());
        assert_eq!(config.release(), Some("2.3.1"));
        assert_eq!(config.environment(), Some("pre"));
        assert_eq!(config.sample_rate(), 0.25);
        assert_eq!(config.tags().len(), 3);
        assert!(config.before_init().is_some());
    }

    #[test]
    fn test_missing_dsn() {
        let result = SentryConfig::builder().release("1.0.0").build();
        assert!(matches!(result, Err(ReporterError::Config(_))));
    }

    #[test]
    fn test_invalid_dsn() {
        let result = SentryConfig::builder().dsn("not a dsn").build();
        assert!(matches!(result, Err(ReporterError::Dsn(_))));
    }

    #[test]
    fn test_sample_rate_out_of_range() {
        for rate in [-0.1, 1.5, f32::NAN] {
            let result = SentryConfig::builder().dsn(DSN).sample_rate(rate).build();
            assert!(result.is_err(), "rate {} should be rejected", rate);
        }
    }

    #[test]
    fn test_sample_rate_bounds_accepted() {
        for rate in [0.0, 1.0] {
            assert!(SentryConfig::builder().dsn(DSN).sample_rate(rate).build().is_ok());
        }
    }

    #[test]
    fn test_debug_hides_hooks() {
        let builder = SentryConfig::builder()
            .dsn(DSN)
            .before_send(|event| Some(event));
        let rendered = format!("{:?}", builder);
        assert!(rendered.contains("SentryConfigBuilder"));

        let config = builder.build().unwrap();
        assert!(format!("{:?}", config).contains("before_send: Some(\"..\")"));
    }
}

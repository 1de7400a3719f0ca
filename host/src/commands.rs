//! Subcommand implementations

use crate::config::HostConfig;
use anyhow::{bail, Context, Result};
use fw_discovery::{
    DiscoveryReport, DiscoveryService, ExtensionSource, FileStatus, HttpExtensionSource,
    StaticExtensionSource,
};
use fw_registry::{
    PropsData, SharedRegistry, WidgetProps, WidgetRegistration, WidgetRegistry, WidgetResolver,
    WIDGET_DIRECTIVE,
};
use fw_sandbox::SandboxEvaluator;
use serde_json::{json, Map, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Build the extension source named by the configuration, if any
fn extension_source(config: &HostConfig) -> Result<Option<Arc<dyn ExtensionSource>>> {
    let discovery = &config.discovery;
    if let Some(path) = &discovery.fixtures {
        let source = StaticExtensionSource::from_file(path)
            .with_context(|| format!("failed to load fixtures from {}", path.display()))?;
        return Ok(Some(Arc::new(source)));
    }
    if let Some(base_url) = &discovery.base_url {
        let source = HttpExtensionSource::with_timeout(base_url, discovery.request_timeout())?;
        return Ok(Some(Arc::new(source)));
    }
    Ok(None)
}

fn discovery_service(
    config: &HostConfig,
    registry: SharedRegistry,
) -> Result<Option<DiscoveryService>> {
    Ok(extension_source(config)?.map(|source| {
        DiscoveryService::new(registry, source)
            .with_evaluator(SandboxEvaluator::new(config.sandbox.clone()))
    }))
}

/// Core widgets plus, when a source is configured, every extension widget
async fn populated_registry(config: &HostConfig) -> Result<SharedRegistry> {
    let registry = WidgetRegistry::with_core_widgets().shared();
    if let Some(service) = discovery_service(config, Arc::clone(&registry))? {
        let report = service.load_all_extension_widgets().await?;
        if !report.is_clean() {
            warn!(failed = report.failed().len(), "some extension widgets did not load");
        }
    }
    Ok(registry)
}

fn registration_json(registration: &WidgetRegistration) -> Value {
    json!({
        "name": registration.name(),
        "source": registration.source(),
        "extensionId": registration.info.extension_id,
        "metadata": registration.info.metadata,
        "kind": format!("{:?}", registration.component.kind()),
    })
}

pub(crate) async fn list(config: &HostConfig, as_json: bool) -> Result<()> {
    let registry = populated_registry(config).await?;
    let widgets = registry.get_all_widgets();
    let mut entries: Vec<(&String, &WidgetRegistration)> = widgets.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    if as_json {
        let entries: Vec<Value> = entries.iter().map(|(_, r)| registration_json(r)).collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for (name, registration) in entries {
        let origin = match &registration.info.extension_id {
            Some(ext) => format!("{} ({ext})", registration.source()),
            None => registration.source().to_string(),
        };
        let display = registration
            .info
            .metadata
            .display_name
            .as_deref()
            .unwrap_or("");
        println!("{name:<20} {origin:<24} {display}");
    }
    Ok(())
}

fn parse_props(props_json: Option<&str>) -> Result<PropsData> {
    let raw = props_json.unwrap_or(r#"{ "id": "field" }"#);
    serde_json::from_str(raw).context("props must be a JSON object with at least an \"id\"")
}

fn with_widget_directive(mut ui_schema: Value, widget: &str) -> Value {
    if !ui_schema.is_object() {
        ui_schema = Value::Object(Map::new());
    }
    if let Value::Object(map) = &mut ui_schema {
        map.insert(WIDGET_DIRECTIVE.to_string(), Value::String(widget.to_string()));
    }
    ui_schema
}

pub(crate) async fn render(config: &HostConfig, widget: &str, props_json: Option<&str>) -> Result<()> {
    let registry = populated_registry(config).await?;
    if !registry.has_widget(widget) {
        bail!("no widget named '{widget}' (try `fw-host list`)");
    }

    let mut data = parse_props(props_json)?;
    data.ui_schema = with_widget_directive(data.ui_schema, widget);
    let props = WidgetProps::from_data(data)
        .on_change(|value| info!(%value, "widget reported change"))
        .on_blur(|id, value| info!(field = id, %value, "widget reported blur"))
        .on_focus(|id, value| info!(field = id, %value, "widget reported focus"));

    let element = WidgetResolver::new(registry).render_field(&props);
    println!("{}", element.to_html());
    Ok(())
}

pub(crate) fn check(config: &HostConfig, path: &Path) -> Result<()> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read widget source {}", path.display()))?;
    let evaluator = SandboxEvaluator::new(config.sandbox.clone());

    match evaluator.try_evaluate(&source) {
        Ok(_) => {
            println!("{}: ok", path.display());
            Ok(())
        }
        Err(e) if e.is_rejection() => bail!("{}: rejected: {e}", path.display()),
        Err(e) => bail!("{}: failed to load: {e}", path.display()),
    }
}

fn print_report(report: &DiscoveryReport, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    for outcome in &report.outcomes {
        match &outcome.status {
            FileStatus::Registered { widget } => {
                println!("registered  {}/{} -> {widget}", outcome.extension_id, outcome.file);
            }
            FileStatus::Failed { stage, reason } => {
                println!("failed      {}/{} at {stage}: {reason}", outcome.extension_id, outcome.file);
            }
        }
    }
    for failure in &report.failed_extensions {
        println!("unavailable {}: {}", failure.extension_id, failure.reason);
    }
    println!(
        "{} registered, {} failed, {} cleared",
        report.registered().len(),
        report.failed().len() + report.failed_extensions.len(),
        report.cleared
    );
    Ok(())
}

pub(crate) async fn discover(config: &HostConfig, extension: Option<&str>, as_json: bool) -> Result<bool> {
    let registry = WidgetRegistry::with_core_widgets().shared();
    let Some(service) = discovery_service(config, registry)? else {
        bail!("no extension source configured (set --base-url, --fixtures or [discovery] in the config file)");
    };

    let report = match extension {
        Some(id) => service.load_extension_widgets(id).await?,
        None => service.load_all_extension_widgets().await?,
    };
    print_report(&report, as_json)?;
    Ok(report.is_clean())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn directive_is_added_to_any_ui_schema() {
        assert_eq!(
            with_widget_directive(Value::Null, "select"),
            json!({ "ui:widget": "select" })
        );
        assert_eq!(
            with_widget_directive(json!({ "ui:options": { "rows": 3 } }), "textarea"),
            json!({ "ui:options": { "rows": 3 }, "ui:widget": "textarea" })
        );
    }

    #[test]
    fn props_default_to_bare_field() {
        let data = parse_props(None).unwrap();
        assert_eq!(data.id, "field");
        assert!(parse_props(Some("[1, 2]")).is_err());
    }

    #[test]
    fn no_source_without_configuration() {
        assert!(extension_source(&HostConfig::default()).unwrap().is_none());
        let config = HostConfig::default().with_base_url("http://localhost:7000/api/");
        assert!(extension_source(&config).unwrap().is_some());
    }

    fn demo_config() -> HostConfig {
        HostConfig::default().with_fixtures(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/fixtures/demo-widgets.json"
        ))
    }

    #[tokio::test]
    async fn demo_fixtures_load_with_one_rejection() {
        let registry = populated_registry(&demo_config()).await.unwrap();
        assert!(registry.has_widget("currency"));
        assert!(registry.has_widget("rating"));
        assert!(!registry.has_widget("cookie-jar"));
        assert!(registry.has_widget("text"));

        let clean = discover(&demo_config(), None, true).await.unwrap();
        assert!(!clean);
    }
}

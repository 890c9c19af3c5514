//! Packaging of the floating widget into a self-contained script.
//!
//! The generated script injects a mount point into the host page, loads
//! its CDN dependencies one after another, then mounts the widget once the
//! last one has loaded. A failed load is reported to the browser console
//! and the widget is not mounted.

use serde::Serialize;

use crate::error::BundleError;
use crate::state::Variant;
use crate::widget::ChatWidget;

/// Browser driver binding to the markup produced by `render_html`.
pub const WIDGET_SCRIPT: &str = include_str!("../assets/widget.js");

pub const WIDGET_STYLE: &str = include_str!("../assets/widget.css");

/// Id of the element the standalone script injects into `<body>`.
pub const MOUNT_ID: &str = "chatbot-container";

/// A script fetched from a public CDN before the widget mounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    pub name: String,
    pub src: String,
}

impl Dependency {
    pub fn new(name: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            src: src.into(),
        }
    }

    fn validate(&self) -> Result<(), BundleError> {
        if self.src.starts_with("https://") || self.src.starts_with("http://") {
            Ok(())
        } else {
            Err(BundleError::InvalidDependency(self.src.clone()))
        }
    }
}

/// Icon set used by the widget markup (`data-feather` placeholders).
pub fn default_dependencies() -> Vec<Dependency> {
    vec![Dependency::new(
        "feather-icons",
        "https://unpkg.com/feather-icons@4.29.2/dist/feather.min.js",
    )]
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MountConfig<'a> {
    relay_origin: &'a str,
    variant: &'a str,
}

/// Builder for the standalone floating-widget script.
///
/// ```
/// use chatbot_widget::bootstrap::StandaloneBundle;
///
/// let script = StandaloneBundle::new("https://chat.example.com").render().unwrap();
/// assert!(script.contains("chatbot-container"));
/// ```
#[derive(Debug, Clone)]
pub struct StandaloneBundle {
    relay_origin: String,
    dependencies: Vec<Dependency>,
}

impl StandaloneBundle {
    /// `relay_origin` is prefixed to `/api/chat`; empty means same origin.
    pub fn new(relay_origin: impl Into<String>) -> Self {
        Self {
            relay_origin: relay_origin.into().trim_end_matches('/').to_owned(),
            dependencies: default_dependencies(),
        }
    }

    /// Append a dependency; it loads after every dependency added before it.
    pub fn dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn without_dependencies(mut self) -> Self {
        self.dependencies.clear();
        self
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn relay_origin(&self) -> &str {
        &self.relay_origin
    }

    /// Produce the script source.
    pub fn render(&self) -> Result<String, BundleError> {
        for dependency in &self.dependencies {
            dependency.validate()?;
        }

        let config = serde_json::to_string(&MountConfig {
            relay_origin: &self.relay_origin,
            variant: Variant::Floating.as_ref(),
        })?;
        let dependencies = serde_json::to_string(&self.dependencies)?;
        let markup = serde_json::to_string(&ChatWidget::new(Variant::Floating).render_html())?;
        let style = serde_json::to_string(WIDGET_STYLE)?;
        let mount_id = serde_json::to_string(MOUNT_ID)?;

        Ok(format!(
            r#"(function () {{
  "use strict";

  var MOUNT_ID = {mount_id};
  if (document.getElementById(MOUNT_ID)) {{
    return;
  }}

  var config = {config};
  var dependencies = {dependencies};

{widget}
  function loadDependency(dependency) {{
    return new Promise(function (resolve, reject) {{
      var script = document.createElement("script");
      script.src = dependency.src;
      script.onload = resolve;
      script.onerror = function () {{
        reject(new Error("failed to load " + dependency.name + " from " + dependency.src));
      }};
      document.head.appendChild(script);
    }});
  }}

  function loadInOrder(list) {{
    return list.reduce(function (chain, dependency) {{
      return chain.then(function () {{
        return loadDependency(dependency);
      }});
    }}, Promise.resolve());
  }}

  function start() {{
    var container = document.createElement("div");
    container.id = MOUNT_ID;
    document.body.appendChild(container);

    loadInOrder(dependencies)
      .then(function () {{
        var style = document.createElement("style");
        style.textContent = {style};
        document.head.appendChild(style);
        container.innerHTML = {markup};
        window.ChatbotWidget.mount(container, config);
      }})
      .catch(function (err) {{
        console.error("[chatbot]", err);
      }});
  }}

  if (document.body) {{
    start();
  }} else {{
    document.addEventListener("DOMContentLoaded", start);
  }}
}})();
"#,
            mount_id = mount_id,
            config = config,
            dependencies = dependencies,
            widget = WIDGET_SCRIPT,
            style = style,
            markup = markup,
        ))
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

//! Email template rendering engine.
//!
//! Handlebars templates for the fixed set of transactional emails. A request
//! that names a template and carries template data gets its body rendered
//! here; anything else is sent with the literal body.

use crate::error::{EmailError, EmailResult};
use handlebars::Handlebars;
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::{debug, warn};

/// Templates the service knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum EmailTemplate {
    /// Account created. Uses `user_name`.
    Welcome,
    /// Invitation to join a project. Uses `user_name`, `inviter_name`,
    /// `project_name`, `required_skills`.
    ProjectInvitation,
    /// Task assignment. Uses `user_name`, `project_name`, `task_title`,
    /// `task_description`.
    TaskAssigned,
}

impl EmailTemplate {
    fn source(&self) -> &'static str {
        match self {
            Self::Welcome => WELCOME_TEMPLATE,
            Self::ProjectInvitation => PROJECT_INVITATION_TEMPLATE,
            Self::TaskAssigned => TASK_ASSIGNED_TEMPLATE,
        }
    }
}

/// Template engine for rendering email bodies.
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with all templates registered.
    pub fn new() -> EmailResult<Self> {
        let mut handlebars = Handlebars::new();

        for template in EmailTemplate::iter() {
            handlebars
                .register_template_string(template.as_ref(), template.source())
                .map_err(|e| {
                    EmailError::Template(format!("Failed to register {}: {}", template, e))
                })?;
        }

        Ok(Self { handlebars })
    }

    /// Render a known template with the given data.
    pub fn render(
        &self,
        template: EmailTemplate,
        data: &HashMap<String, Value>,
    ) -> EmailResult<String> {
        debug!(template = %template, "Rendering email template");
        self.handlebars
            .render(template.as_ref(), data)
            .map_err(|e| EmailError::Template(e.to_string()))
    }

    /// Resolve the body to send.
    ///
    /// Renders when both a template name and data are given and the name is
    /// a known template. An unknown name or a render failure falls back to
    /// `body`.
    pub fn resolve_body(
        &self,
        template_name: Option<&str>,
        data: Option<&HashMap<String, Value>>,
        body: &str,
    ) -> String {
        let (Some(name), Some(data)) = (template_name, data) else {
            return body.to_string();
        };

        let Ok(template) = EmailTemplate::from_str(name) else {
            debug!(template = name, "Unknown email template, sending literal body");
            return body.to_string();
        };

        match self.render(template, data) {
            Ok(rendered) => rendered,
            Err(e) => {
                warn!(
                    template = name,
                    error = %e,
                    "Template rendering failed, sending literal body"
                );
                body.to_string()
            }
        }
    }
}

const WELCOME_TEMPLATE: &str = r#"<html>
<body>
    <h1>¡Bienvenido a Colabora!</h1>
    <p>Hola {{user_name}},</p>
    <p>Tu cuenta ha sido creada exitosamente.</p>
    <p>Puedes comenzar a explorar proyectos y conectar con otros artistas.</p>
</body>
</html>"#;

const PROJECT_INVITATION_TEMPLATE: &str = r#"<html>
<body>
    <h1>¡Invitación a Proyecto!</h1>
    <p>Hola {{user_name}},</p>
    <p>{{inviter_name}} te ha invitado al proyecto "{{project_name}}"</p>
    <p>Los skills necesarios son: {{required_skills}}</p>
</body>
</html>"#;

const TASK_ASSIGNED_TEMPLATE: &str = r#"<html>
<body>
    <h1>Nueva Tarea Asignada</h1>
    <p>Hola {{user_name}},</p>
    <p>Te han asignado una tarea en el proyecto "{{project_name}}"</p>
    <p>Título: {{task_title}}</p>
    <p>Descripción: {{task_description}}</p>
</body>
</html>"#;

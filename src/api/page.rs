//! HTML page rendering
//!
//! Templates are `.html`, so minijinja escapes every interpolated value;
//! model output can never inject markup.

use crate::view::ChatView;
use minijinja::{context, Environment};

const CHAT_TEMPLATE: &str = include_str!("templates/chat.html");

pub struct PageRenderer {
    env: Environment<'static>,
    title: String,
    model_id: String,
}

impl PageRenderer {
    pub fn new(
        title: impl Into<String>,
        model_id: impl Into<String>,
    ) -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("chat.html", CHAT_TEMPLATE)?;
        Ok(Self {
            env,
            title: title.into(),
            model_id: model_id.into(),
        })
    }

    pub fn render_chat(&self, view: &ChatView) -> Result<String, minijinja::Error> {
        self.env.get_template("chat.html")?.render(context! {
            title => &self.title,
            model_id => &self.model_id,
            view => view,
        })
    }
}

use crate::core::{Result, SentimentLabel};
use minijinja::{context, Environment};

const INDEX: &str = "index.html";

/// HTML templates for the form page. The `.html` name turns on auto-escaping,
/// so echoed user text cannot inject markup.
pub struct Pages {
    env: Environment<'static>,
}

impl Pages {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template(INDEX, include_str!("../../templates/index.html"))?;
        Ok(Self { env })
    }

    pub fn index(&self, text: &str, sentiment: Option<SentimentLabel>) -> Result<String> {
        let template = self.env.get_template(INDEX)?;
        Ok(template.render(context! {
            text => text,
            sentiment => sentiment.map(|label| label.as_str()),
        })?)
    }
}

//! Interactive prompts for `tank init`.

use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Input};

pub struct InitAnswers {
    pub name: String,
    pub description: String,
}

/// Prompt for whichever of `name`/`description` wasn't supplied on the
/// command line.
pub fn collect_init_answers(
    prefilled_name: Option<String>,
    prefilled_description: Option<String>,
) -> Result<InitAnswers> {
    let theme = ColorfulTheme::default();

    let name = match prefilled_name {
        Some(name) => name,
        None => Input::with_theme(&theme).with_prompt("Skill name").interact_text()?,
    };

    let description = match prefilled_description {
        Some(description) => description,
        None => Input::with_theme(&theme)
            .with_prompt("Description")
            .default(String::new())
            .allow_empty(true)
            .interact_text()?,
    };

    Ok(InitAnswers { name, description })
}

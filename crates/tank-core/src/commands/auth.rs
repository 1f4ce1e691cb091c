//! `tank login` / `logout` / `whoami`: bearer token lifecycle. The actual
//! auth flow is an external collaborator (§1) — this module only persists
//! or clears the token in `config.json`.

use crate::config::ConfigFile;
use crate::context::Context;

pub fn login(ctx: &Context, token: &str, user: Option<&str>) -> anyhow::Result<()> {
    let mut config = ConfigFile::load(&ctx.config_dir)?;
    config.token = Some(token.to_string());
    config.user = user.map(str::to_string);
    config.save(&ctx.config_dir)?;
    tracing::info!("logged in");
    Ok(())
}

pub fn logout(ctx: &Context) -> anyhow::Result<()> {
    let mut config = ConfigFile::load(&ctx.config_dir)?;
    config.token = None;
    config.user = None;
    config.save(&ctx.config_dir)?;
    tracing::info!("logged out");
    Ok(())
}

pub fn whoami(ctx: &Context) -> anyhow::Result<Option<String>> {
    let config = ConfigFile::load(&ctx.config_dir)?;
    Ok(config.user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn login_then_whoami_round_trips() {
        let home = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        let ctx = Context::for_test(home.path().to_path_buf(), project.path().to_path_buf(), Utc::now());

        login(&ctx, "secret-token", Some("alice")).unwrap();
        assert_eq!(whoami(&ctx).unwrap(), Some("alice".to_string()));

        logout(&ctx).unwrap();
        assert_eq!(whoami(&ctx).unwrap(), None);
    }
}

//! `reflecto daily`: fold a user-day into snapshot, streak, avatar and identity.

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::Args;

use crate::cli::context::AppContext;
use crate::cli::output::{output, table, CommandOutput};
use crate::domain::models::Config;
use crate::services::DailyUpdateReport;

#[derive(Args, Debug)]
pub struct DailyArgs {
    /// User to update
    pub user_id: String,
    /// Day to fold, as YYYY-MM-DD
    pub day: String,
}

impl CommandOutput for DailyUpdateReport {
    fn to_human(&self) -> String {
        let update = &self.update;
        let avatar = &update.avatar_state;
        let mut lines = vec![
            format!("Daily update for {}", update.day),
            format!("  Meaningful events: {}", update.snapshot.meaningful_events),
            format!("  Streak:            {} day(s)", update.streak),
            format!("  Avatar mood:       {}", avatar.mood),
        ];

        if !update.snapshot.skills.is_empty() {
            let mut t = table(&["Skill", "Level"]);
            for (skill, level) in &update.snapshot.skills {
                t.add_row(vec![skill.clone(), level.to_string()]);
            }
            lines.push(String::new());
            lines.push(t.to_string());
        }

        let traits: Vec<String> = update
            .identity
            .traits
            .iter()
            .filter(|(_, labels)| !labels.is_empty())
            .map(|(category, labels)| format!("  {category}: {}", labels.join(", ")))
            .collect();
        if !traits.is_empty() {
            lines.push("\nIdentity:".to_string());
            lines.extend(traits);
        }

        if let Some(reflection) = &self.reflection {
            lines.push(format!("\nReflection:\n{reflection}"));
        }
        if let Some(path) = &self.avatar_image {
            lines.push(format!("\nAvatar image: {path}"));
        }
        lines.join("\n")
    }
}

pub async fn execute(args: DailyArgs, config: &Config, json_mode: bool) -> Result<()> {
    if NaiveDate::parse_from_str(&args.day, "%Y-%m-%d").is_err() {
        bail!("Invalid day {:?}: expected YYYY-MM-DD", args.day);
    }

    let ctx = AppContext::open(config).await?;
    let service = ctx.daily_update()?;

    let spinner = crate::cli::output::spinner("Running daily update...", json_mode);
    let report = service.run(&args.user_id, &args.day).await;
    spinner.finish_and_clear();

    output(&report?, json_mode);
    Ok(())
}

use clap::Subcommand;
use hydrate_core::notify::notifier_from_env;
use hydrate_core::Config;

#[derive(Subcommand)]
pub enum NotifyAction {
    /// Send the configured reminder message right away
    Test {
        /// Request system notification permission first
        #[arg(long)]
        system: bool,
    },
    /// Request system notification permission and print the result
    Permission,
}

pub fn run(action: NotifyAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let mut notifier = notifier_from_env(&config.notifications);

    match action {
        NotifyAction::Test { system } => {
            if system {
                notifier.request_permission();
            }
            notifier.notify(&config.reminder.message);
            let out = serde_json::json!({
                "sent": config.reminder.message,
                "permission": notifier.permission(),
            });
            println!("{out}");
        }
        NotifyAction::Permission => {
            let permission = notifier.request_permission();
            println!("{}", serde_json::json!({ "permission": permission }));
        }
    }
    Ok(())
}

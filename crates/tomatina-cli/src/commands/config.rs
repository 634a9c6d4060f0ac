use clap::Subcommand;
use tomatina_core::SettingsStore;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "timer_duration")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = SettingsStore::open()?;
    match action {
        ConfigAction::Get { key } => {
            match store.read().get(&key) {
                Some(value) => println!("{value}"),
                None => {
                    eprintln!("unset or unknown key: {key}");
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut settings = store.read();
            settings.set(&key, &value)?;
            store.write(&settings)?;
            println!("ok");
        }
        ConfigAction::List => {
            let json = serde_json::to_string_pretty(&store.read())?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            store.write(&Default::default())?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}

//! CLI commands

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::core::AppState;
use crate::website::{Read, WebsiteRecord};

#[derive(Parser)]
#[command(name = "zukii")]
#[command(about = "Turn websites into embeddable voice agents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (default: ~/.zukii/config.yml)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Backend API base URL, overrides the config file
    #[arg(long, global = true)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, default_value = "")]
        password: String,
    },

    /// Create an account
    Signup {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long, default_value = "")]
        password: String,
    },

    /// Sign in with Google
    LoginGoogle,

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami,

    /// List websites
    List {
        /// Show the locally stored list without contacting the backend
        #[arg(long)]
        cached: bool,
    },

    /// Add a website
    Add {
        /// Website URL
        url: String,

        /// Display name (default: the URL's host)
        #[arg(long, default_value = "")]
        name: String,

        /// Keep polling until the website is ready or failed
        #[arg(long)]
        wait: bool,
    },

    /// Show a website
    Show {
        /// Website ID
        id: String,
    },

    /// Show the agent for a website
    Agent {
        /// Website ID
        id: String,
    },

    /// Re-scrape a website
    Rescrape {
        /// Website ID
        id: String,
    },

    /// Delete a website
    Remove {
        /// Website ID
        id: String,
    },

    /// Poll websites until they are ready or failed
    Watch {
        /// Website ID (default: every pending website)
        id: Option<String>,
    },

    /// Print the resolved configuration
    Config,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(api_url) = cli.api_url {
        config.api_base_url = api_url;
    }
    let command = cli.command;

    if let Commands::Config = command {
        print!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    // Create a multi-threaded runtime for CLI operations
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    rt.block_on(async move {
        let app = AppState::open(config).await?;

        match command {
            Commands::Login { email, password } => {
                let user = app.auth.login(&email, &password).await?;
                println!("Signed in as {} <{}>", user.name, user.email);
                Ok(())
            }

            Commands::Signup { name, email, password } => {
                let user = app.auth.signup(&name, &email, &password).await?;
                println!("Created account for {} <{}>", user.name, user.email);
                Ok(())
            }

            Commands::LoginGoogle => {
                let user = app.auth.login_with_google().await?;
                println!("Signed in as {} <{}>", user.name, user.email);
                Ok(())
            }

            Commands::Logout => {
                app.auth.logout().await;
                println!("Signed out");
                Ok(())
            }

            Commands::Whoami => {
                match app.auth.current_user().await {
                    Some(user) => println!("{} <{}>", user.name, user.email),
                    None => println!("Not signed in"),
                }
                Ok(())
            }

            command => {
                require_login(&app).await?;
                run_website_command(&app, command).await
            }
        }
    })
}

async fn require_login(app: &AppState) -> Result<()> {
    if !app.auth.is_authenticated().await {
        anyhow::bail!("Not signed in. Run `zukii login --email <email>` first");
    }
    Ok(())
}

async fn run_website_command(app: &AppState, command: Commands) -> Result<()> {
    match command {
        Commands::List { cached } => {
            let websites = if cached {
                app.websites.records().await
            } else {
                match app.websites.list_all().await {
                    Ok(websites) => websites,
                    Err(e) => {
                        eprintln!("Could not refresh websites ({}), showing saved list", e);
                        app.websites.records().await
                    }
                }
            };

            if websites.is_empty() {
                println!("No websites yet");
            } else {
                for website in &websites {
                    print_website(website);
                }
            }
            Ok(())
        }

        Commands::Add { url, name, wait } => {
            let website = app.add_website(&name, &url).await?;
            println!("Added website: {} ({})", website.name, website.id);

            if wait {
                wait_for(app, &website.id).await?;
            }
            Ok(())
        }

        Commands::Show { id } => {
            let found = app
                .websites
                .read(&id, |read| match read {
                    Read::Stale(record) => {
                        print!("(saved) ");
                        print_website(&record);
                    }
                    Read::Fresh(record) => print_website(&record),
                })
                .await;

            match found {
                Ok(Some(_)) => Ok(()),
                Ok(None) => anyhow::bail!("Website not found: {}", id),
                Err(e) => {
                    eprintln!("Could not refresh website: {}", e);
                    Ok(())
                }
            }
        }

        Commands::Agent { id } => {
            let agent = app
                .websites
                .agent_for(&id)
                .await
                .with_context(|| format!("Agent not found for website {}", id))?;

            println!("{} - {}", agent.website_name, agent.website_url);
            println!("Agent: {}", agent.agent_id);
            println!("Status: {}", agent.status.label());
            match agent.copyable_snippet() {
                Some(snippet) => println!("Embed code:\n{}", snippet),
                None => {
                    println!("Embed code (preview):\n{}", agent.embed_snippet);
                    println!(
                        "Your agent is still being prepared. The embed code will work once the status changes to \"Ready\"."
                    );
                }
            }
            Ok(())
        }

        Commands::Rescrape { id } => {
            let website = app.rescrape_website(&id).await?;
            println!("Re-scraping {} ({})", website.name, website.id);
            wait_for(app, &website.id).await
        }

        Commands::Remove { id } => {
            app.remove_website(&id).await?;
            println!("Deleted website: {}", id);
            Ok(())
        }

        Commands::Watch { id } => {
            if let Err(e) = app.websites.list_all().await {
                eprintln!("Could not refresh websites ({}), watching saved list", e);
            }

            match id {
                Some(id) => wait_for(app, &id).await,
                None => {
                    let started = app.poller.track_all().await;
                    if started == 0 {
                        println!("Nothing to watch");
                        return Ok(());
                    }
                    println!("Watching {} websites", started);

                    for id in app.poller.polling_ids() {
                        wait_for(app, &id).await?;
                    }
                    Ok(())
                }
            }
        }

        Commands::Login { .. }
        | Commands::Signup { .. }
        | Commands::LoginGoogle
        | Commands::Logout
        | Commands::Whoami
        | Commands::Config => anyhow::bail!("Not a website command"),
    }
}

/// Poll one website until it settles or the user interrupts
async fn wait_for(app: &AppState, id: &str) -> Result<()> {
    app.poller.start(id).await;

    if app.poller.is_polling(id) {
        tokio::select! {
            _ = app.poller.wait(id) => {}
            _ = tokio::signal::ctrl_c() => {
                app.poller.stop_all();
                println!("Stopped watching");
                return Ok(());
            }
        }
    }

    match app.websites.get(id).await {
        Some(website) => print_website(&website),
        None => println!("Website {} is gone", id),
    }
    Ok(())
}

fn print_website(website: &WebsiteRecord) {
    println!(
        "[{}] {} - {} ({})",
        website.id.chars().take(8).collect::<String>(),
        website.name,
        website.url,
        website.status.label()
    );
}

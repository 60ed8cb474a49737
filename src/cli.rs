use clap::{Parser, Subcommand};

use crate::{
    AppState,
    controllers::{alerts_controller, auth_controller, realtime_controller, user_controller},
    error::Result,
    models::{AlertKind, Condition},
};

/// Stock alerts for B3 tickers, from the terminal.
#[derive(Parser, Debug)]
#[command(name = "gatilho")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create a new account
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Stats, active alerts and history at once
    Dashboard,
    /// Manage alerts
    #[command(subcommand)]
    Alerts(AlertsCommand),
    /// View or edit your profile
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Change your password
    Password {
        #[arg(long)]
        current: String,
        #[arg(long = "new")]
        new_password: String,
    },
    /// Delete your account and all alerts
    DeleteAccount {
        #[arg(long)]
        yes: bool,
    },
    /// Trigger statistics
    Analytics {
        #[arg(long, default_value_t = 30)]
        days: u32,
    },
    /// Suggestions based on other users' alerts
    #[command(subcommand)]
    Suggest(SuggestCommand),
    /// Listen for triggered alerts until Ctrl-C
    Watch {
        /// Log notifications instead of printing them
        #[arg(long)]
        quiet: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum AlertsCommand {
    /// List active alerts
    List {
        /// Include deleted and triggered alerts
        #[arg(long)]
        all: bool,
    },
    /// Alerts that already fired
    History,
    /// Alert counters
    Stats,
    /// Create an alert
    Create {
        #[arg(long)]
        ticker: String,
        /// price, percentage or volume
        #[arg(long, value_parser = parse_kind)]
        kind: AlertKind,
        /// >, <, >= or <= (gt, lt, gte, lte also work)
        #[arg(long, value_parser = parse_condition)]
        condition: Condition,
        #[arg(long)]
        value: String,
    },
    /// Delete an alert
    Delete { id: i64 },
    /// Popular B3 stocks, optionally filtered
    Popular { query: Option<String> },
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    Show,
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SuggestCommand {
    /// Most watched tickers
    Tickers,
    /// Targets other users picked for a ticker
    Values {
        #[arg(long)]
        ticker: String,
        #[arg(long, value_parser = parse_kind)]
        kind: AlertKind,
    },
}

fn parse_kind(s: &str) -> std::result::Result<AlertKind, String> {
    s.parse().map_err(|e: crate::error::GatilhoError| e.to_string())
}

fn parse_condition(s: &str) -> std::result::Result<Condition, String> {
    s.parse().map_err(|e: crate::error::GatilhoError| e.to_string())
}

pub async fn dispatch(state: &AppState, command: Command) -> Result<String> {
    match command {
        Command::Login { email, password } => auth_controller::login(state, &email, &password).await,
        Command::Signup {
            name,
            email,
            password,
        } => auth_controller::signup(state, &name, &email, &password).await,
        Command::Logout => auth_controller::logout(state),
        Command::Dashboard => alerts_controller::dashboard(state).await,
        Command::Alerts(cmd) => match cmd {
            AlertsCommand::List { all } => alerts_controller::list(state, all).await,
            AlertsCommand::History => alerts_controller::history(state).await,
            AlertsCommand::Stats => alerts_controller::stats(state).await,
            AlertsCommand::Create {
                ticker,
                kind,
                condition,
                value,
            } => alerts_controller::create(state, &ticker, kind, condition, &value).await,
            AlertsCommand::Delete { id } => alerts_controller::delete(state, id).await,
            AlertsCommand::Popular { query } => Ok(alerts_controller::popular(query.as_deref())),
        },
        Command::Profile(cmd) => match cmd {
            ProfileCommand::Show => user_controller::show_profile(state).await,
            ProfileCommand::Update { name, email } => {
                user_controller::update_profile(state, name, email).await
            }
        },
        Command::Password {
            current,
            new_password,
        } => user_controller::change_password(state, &current, &new_password).await,
        Command::DeleteAccount { yes } => user_controller::delete_account(state, yes).await,
        Command::Analytics { days } => user_controller::analytics(state, days).await,
        Command::Suggest(cmd) => match cmd {
            SuggestCommand::Tickers => alerts_controller::suggest_tickers(state).await,
            SuggestCommand::Values { ticker, kind } => {
                alerts_controller::suggest_values(state, &ticker, kind).await
            }
        },
        Command::Watch { quiet } => {
            let stop = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("failed to listen for Ctrl-C: {}", e);
                    std::future::pending::<()>().await;
                }
            };
            realtime_controller::watch(state, quiet, stop).await
        }
    }
}

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use kenko_auth::{Role, SessionState};
use kenko_config::load as load_config;
use kenko_gateway::api::auth::OrganizationRegistration;
use kenko_gateway::{Notice, Notifier};
use kenko_routing::{paths, HistoryNavigator};
use kenko_runtime::{telemetry, Portal};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "kenko")]
#[command(about = "Kenkō clinic portal from the terminal")]
#[command(version)]
struct Cli {
    /// Backend base URL, overriding configuration
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Register a clinic and sign in as its administrator
    Register {
        #[arg(long)]
        organization: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long, default_value = "")]
        city: String,
        #[arg(long, default_value = "")]
        country: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Resolve a portal path through the route guard
    Visit { path: String },
    /// List patients
    Patients,
    /// List appointments
    Appointments {
        /// Only today's agenda (doctors)
        #[arg(long)]
        today: bool,
    },
    /// List medical records
    Records {
        #[arg(long)]
        patient: Option<i64>,
    },
    /// List the clinic's user accounts
    OrgUsers,
    /// Change the signed-in user's password
    ChangePassword {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
    },
}

struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        eprintln!("{} {}", "!".yellow().bold(), notice.message().yellow());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    telemetry::init_tracing("warn").context("failed to initialise tracing")?;

    let mut config = load_config().context("failed to load configuration")?;
    if let Some(api_url) = cli.api_url {
        config.api.base_url = api_url;
    }

    let navigator = Arc::new(HistoryNavigator::new());
    let portal = Portal::initialise(&config, navigator, Arc::new(ConsoleNotifier))
        .context("failed to initialise portal services")?;

    let state = portal.start_verified().await;
    debug!(authenticated = state.is_authenticated(), "session restored");

    run(&portal, cli.command).await
}

async fn run(portal: &Portal, command: Commands) -> Result<()> {
    match command {
        Commands::Login { email, password } => {
            let landing = portal.login(&email, &password).await?;
            print_signed_in(portal, landing);
        }
        Commands::Register {
            organization,
            email,
            password,
            first_name,
            last_name,
            phone,
            address,
            city,
            country,
        } => {
            let registration = OrganizationRegistration {
                organization_name: organization,
                email,
                password,
                first_name,
                last_name,
                phone,
                address,
                city,
                country,
            };
            let landing = portal.register_organization(&registration).await?;
            print_signed_in(portal, landing);
        }
        Commands::Logout => {
            portal.logout()?;
            println!("{}", "Signed out".green());
        }
        Commands::Whoami => match portal.session.state() {
            SessionState::Verified(session) | SessionState::Pending(session) => {
                let profile = &session.profile;
                println!("{} <{}>", profile.full_name().bold(), profile.email);
                println!("  role:         {}", profile.role.to_string().cyan());
                println!("  organization: {}", profile.org_id);
                println!("  home:         {}", session.landing_path());
            }
            SessionState::Loading | SessionState::Anonymous => {
                println!("{}", "Not signed in".yellow());
            }
        },
        Commands::Visit { path } => {
            let visit = portal.visit(&path).await?;
            for hop in &visit.redirects {
                println!("{} {}", "->".dimmed(), hop);
            }
            println!("{} ({})", visit.location.bold(), visit.pattern);
            for (name, value) in &visit.params {
                println!("  {name} = {value}");
            }
        }
        Commands::Patients => {
            if !open(portal, paths::PATIENTS).await? {
                return Ok(());
            }
            let patients = portal.client.patients().list().await?;
            println!("{} patients", patients.len().to_string().yellow());
            for patient in patients {
                println!(
                    "  {:>5}  {:<30} {:<30} {}",
                    patient.id,
                    patient.full_name(),
                    patient.email,
                    patient.phone
                );
            }
        }
        Commands::Appointments { today } => {
            if !open(portal, paths::APPOINTMENTS).await? {
                return Ok(());
            }
            let appointments = portal.client.appointments();
            let list = match (today, portal.session.state().role()) {
                (_, Some(Role::Patient)) => appointments.my_appointments().await?,
                (true, Some(Role::Doctor)) => appointments.doctor_agenda_today().await?,
                _ => appointments.list().await?,
            };
            println!("{} appointments", list.len().to_string().yellow());
            for appointment in list {
                println!(
                    "  {:>5}  {} {:<8} {:<12} {:<24} {}",
                    appointment.id,
                    appointment.appointment_date,
                    appointment.appointment_time.as_deref().unwrap_or("-"),
                    appointment.status.to_string(),
                    appointment.patient_name,
                    appointment.doctor_name
                );
            }
        }
        Commands::Records { patient } => {
            if !open(portal, paths::MEDICAL_HISTORIES).await? {
                return Ok(());
            }
            let records = portal.client.medical_records();
            let list = match patient {
                Some(patient_id) => records.for_patient(patient_id).await?,
                None => records.list().await?,
            };
            println!("{} records", list.len().to_string().yellow());
            for record in list {
                println!(
                    "  {:>5}  {:<24} {:<30} {}",
                    record.id, record.patient_name, record.diagnosis, record.created_at
                );
            }
        }
        Commands::OrgUsers => {
            if !open(portal, paths::PROFESSIONALS).await? {
                return Ok(());
            }
            let users = portal.client.organization().users().await?;
            println!("{} users", users.len().to_string().yellow());
            for user in users {
                println!(
                    "  {:>5}  {:<14} {} {} <{}>",
                    user.id,
                    user.role.to_string(),
                    user.first_name,
                    user.last_name,
                    user.email
                );
            }
        }
        Commands::ChangePassword { current, new } => {
            if !open(portal, paths::SETTINGS).await? {
                return Ok(());
            }
            let Some(session) = portal.session.session() else {
                println!("{}", "Not signed in".yellow());
                return Ok(());
            };
            let outcome = portal
                .client
                .users()
                .change_password(session.profile.id, &current, &new)
                .await?;
            if outcome.message.is_empty() {
                println!("{}", "Password changed".green());
            } else {
                println!("{}", outcome.message.green());
            }
        }
    }

    Ok(())
}

/// Run the route guard for `path`; `false` when it sent us elsewhere.
async fn open(portal: &Portal, path: &str) -> Result<bool> {
    let visit = portal.visit(path).await?;
    if visit.redirected() {
        println!(
            "{} {} {} {}",
            "Cannot open".red(),
            path,
            "->".dimmed(),
            visit.location
        );
        return Ok(false);
    }
    Ok(true)
}

fn print_signed_in(portal: &Portal, landing: &str) {
    if let Some(session) = portal.session.session() {
        println!(
            "{} {} ({})",
            "Signed in as".green(),
            session.profile.full_name().bold(),
            session.role()
        );
    }
    println!("  home: {landing}");
}

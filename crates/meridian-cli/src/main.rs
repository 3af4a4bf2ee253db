//! Meridian network driver binary.
//!
//! # Usage
//!
//! ```bash
//! # Build the office mesh from a roster and report its shape
//! meridian --roster roster.csv mesh
//!
//! # Filter the roster by intake preferences
//! meridian --roster roster.csv filter --credential PhD --jurisdiction CA
//!
//! # Record a client intake, encrypting the stored record
//! meridian intake --records records.csv --name "Ada Quinn" \
//!     --jurisdiction ON --date-of-birth 04/12/91 \
//!     --email ada@example.com --phone 555-0101 --primes 101,103,107
//! ```

use clap::{Parser, Subcommand};
use meridian_core::{ClientProfile, Network, RosterStore};
use meridian_crypto::{KeyPair, encrypt_record, generate_key_pair};
use meridian_directory::{Attribute, CsvStore, Preference, PreferenceTree};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Provider routing network driver
#[derive(Parser, Debug)]
#[command(name = "meridian")]
#[command(about = "Provider network roster and routing driver")]
#[command(version)]
struct Args {
    /// Path to the roster CSV
    #[arg(short, long, default_value = "roster.csv")]
    roster: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the fully connected office mesh and report its shape
    Mesh,

    /// Filter the roster by intake preferences
    Filter {
        /// Required credential (e.g. PhD, LCSW)
        #[arg(long)]
        credential: Option<String>,

        /// Required specialization
        #[arg(long)]
        specialization: Option<String>,

        /// Required jurisdiction
        #[arg(long)]
        jurisdiction: Option<String>,
    },

    /// Record a client intake, optionally encrypting the stored record
    Intake {
        /// Path the record is appended to
        #[arg(long, default_value = "records.csv")]
        records: String,

        /// Client full name
        #[arg(long)]
        name: String,

        /// Jurisdiction of residence
        #[arg(long)]
        jurisdiction: String,

        /// Date of birth (MM/DD/YY)
        #[arg(long)]
        date_of_birth: String,

        /// Preferred language
        #[arg(long, default_value = "English")]
        language: String,

        /// Contact email
        #[arg(long)]
        email: String,

        /// Contact phone number
        #[arg(long)]
        phone: String,

        /// Prime pool for record encryption; the record is stored in
        /// plaintext when omitted
        #[arg(long, value_delimiter = ',')]
        primes: Vec<u64>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    match args.command {
        Command::Mesh => run_mesh(&args.roster),
        Command::Filter { credential, specialization, jurisdiction } => {
            run_filter(&args.roster, credential, specialization, jurisdiction)
        },
        Command::Intake {
            records,
            name,
            jurisdiction,
            date_of_birth,
            language,
            email,
            phone,
            primes,
        } => {
            let profile =
                ClientProfile { name, jurisdiction, date_of_birth, language, email, phone };
            run_intake(&args.roster, &records, profile, &primes)
        },
    }
}

fn run_mesh(roster_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = CsvStore::new(roster_path, "records.csv");
    let roster = store.load_roster()?;
    let network = Network::from_roster(roster)?;

    tracing::info!(
        offices = network.office_count(),
        channels = network.channel_count(),
        "mesh built"
    );
    for (office_id, office) in network.offices() {
        let professional = network.professional(office.professional())?;
        tracing::info!(%office_id, name = %professional.name, "office");
    }
    Ok(())
}

fn run_filter(
    roster_path: &str,
    credential: Option<String>,
    specialization: Option<String>,
    jurisdiction: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = CsvStore::new(roster_path, "records.csv");
    let mut tree = PreferenceTree::new(store.load_roster()?);

    let mut preferences = Vec::new();
    if let Some(value) = credential {
        preferences.push(Preference::new(Attribute::Credential, value));
    }
    if let Some(value) = specialization {
        preferences.push(Preference::new(Attribute::Specialization, value));
    }
    if let Some(value) = jurisdiction {
        preferences.push(Preference::new(Attribute::Jurisdiction, value));
    }

    let matched = tree.query(&preferences);
    tracing::info!(count = matched.len(), "professionals matched");
    for professional in matched {
        tracing::info!(
            id = %professional.id,
            name = %professional.name,
            credential = %professional.credential,
            specialization = %professional.specialization,
            jurisdiction = %professional.jurisdiction,
            "match"
        );
    }
    Ok(())
}

fn run_intake(
    roster_path: &str,
    records_path: &str,
    profile: ClientProfile,
    primes: &[u64],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = CsvStore::new(roster_path, records_path);

    let stored = if primes.is_empty() {
        tracing::warn!("no prime pool given, storing record in plaintext");
        profile
    } else {
        let pair = generate_key_pair(primes, &mut rand::thread_rng())?;
        tracing::info!(n = pair.public.n, e = pair.public.e, "record key generated");
        tracing::info!(
            p = pair.private.p,
            q = pair.private.q,
            d = pair.private.d,
            "keep the private key to recover the record"
        );
        encrypt_profile(&profile, &pair)?
    };

    store.append_record(&stored)?;
    tracing::info!(path = records_path, "intake record stored");
    Ok(())
}

/// Encrypt each field of the profile with the pair's public key.
fn encrypt_profile(
    profile: &ClientProfile,
    pair: &KeyPair,
) -> Result<ClientProfile, meridian_crypto::CipherError> {
    Ok(ClientProfile {
        name: encrypt_record(&profile.name, &pair.public)?,
        jurisdiction: encrypt_record(&profile.jurisdiction, &pair.public)?,
        date_of_birth: encrypt_record(&profile.date_of_birth, &pair.public)?,
        language: encrypt_record(&profile.language, &pair.public)?,
        email: encrypt_record(&profile.email, &pair.public)?,
        phone: encrypt_record(&profile.phone, &pair.public)?,
    })
}

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use directory_core::{
    backend_from_config, core_config_from_env_values, DirectoryStore, InsuranceSet,
    Organization, OrganizationDraft, Provider, ProviderDraft, RecordId, SnapshotSource,
};
use directory_registry::{
    proxy::DEFAULT_PROXY_URL, registry_url_from_env_value, CandidateSource, DebouncedLookup,
    LookupUpdate, NpiRegistryClient, ProviderLookup, ProxyClient, RegistryCandidate,
    DEBOUNCE_DELAY,
};

#[derive(Parser)]
#[command(name = "directory")]
#[command(about = "Healthcare provider directory CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List every organization and independent provider
    List,
    /// Search organizations and providers
    Search {
        /// Free text; every word must match some field
        query: String,
    },
    /// List the insurance names that can be selected
    Insurances,
    /// Add an organization
    AddOrganization(OrganizationArgs),
    /// Add a provider
    AddProvider {
        /// Organization the provider belongs to; independent when omitted
        #[arg(long)]
        organization: Option<String>,
        /// Pre-fill from the first NPI registry candidate for the name
        #[arg(long)]
        prefill: bool,
        #[command(flatten)]
        fields: ProviderArgs,
    },
    /// Update an organization; omitted fields keep their current value
    UpdateOrganization {
        id: String,
        #[command(flatten)]
        fields: OrganizationArgs,
        /// Insurance to remove (repeatable)
        #[arg(long = "remove-insurance")]
        remove_insurances: Vec<String>,
    },
    /// Update a provider; omitted fields keep their current value
    UpdateProvider {
        id: String,
        #[command(flatten)]
        fields: ProviderArgs,
        /// Insurance to remove (repeatable)
        #[arg(long = "remove-insurance")]
        remove_insurances: Vec<String>,
    },
    /// Delete an organization and its providers
    DeleteOrganization { id: String },
    /// Delete a provider
    DeleteProvider { id: String },
    /// Look up a provider name in the NPI registry
    Lookup { name: String },
    /// Read names from stdin, one per line, and show registry candidates as you type
    Watch {
        /// Query the registry directly instead of the search-provider endpoint
        #[arg(long)]
        direct: bool,
        /// Quiet period in milliseconds before a lookup is issued
        #[arg(long, default_value_t = DEBOUNCE_DELAY.as_millis() as u64)]
        delay_ms: u64,
    },
}

#[derive(Args)]
struct OrganizationArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    npi: Option<String>,
    /// Insurance accepted (repeatable); unknown names are added to the catalog
    #[arg(long = "insurance")]
    insurances: Vec<String>,
}

#[derive(Args)]
struct ProviderArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    specialty: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    npi: Option<String>,
    /// Insurance accepted (repeatable); unknown names are added to the catalog
    #[arg(long = "insurance")]
    insurances: Vec<String>,
}

impl OrganizationArgs {
    fn apply(self, draft: &mut OrganizationDraft) -> Vec<String> {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(phone) = self.phone {
            draft.phone = phone;
        }
        if let Some(address) = self.address {
            draft.address = address;
        }
        if let Some(npi) = self.npi {
            draft.npi = Some(npi);
        }
        self.insurances
    }
}

impl ProviderArgs {
    fn apply(self, draft: &mut ProviderDraft) -> Vec<String> {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(specialty) = self.specialty {
            draft.specialty = specialty;
        }
        if let Some(phone) = self.phone {
            draft.phone = phone;
        }
        if let Some(address) = self.address {
            draft.address = address;
        }
        if let Some(npi) = self.npi {
            draft.npi = Some(npi);
        }
        self.insurances
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("directory=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("Use 'directory --help' for commands");
        return Ok(());
    };

    match command {
        Commands::Lookup { name } => lookup(&name).await,
        Commands::Watch { direct, delay_ms } => watch(direct, Duration::from_millis(delay_ms)).await,
        command => {
            let store = open_store().await?;
            run_store_command(store, command).await
        }
    }
}

async fn open_store() -> anyhow::Result<DirectoryStore> {
    let cfg = core_config_from_env_values(
        std::env::var("DATASTORE_URL").ok(),
        std::env::var("DATASTORE_ACCESS_KEY").ok(),
    );
    let backend = backend_from_config(&cfg)?;
    let store = DirectoryStore::initialise(backend).await;
    if store.source() == SnapshotSource::DemoFallback {
        eprintln!("Datastore unavailable; showing demo data.");
    }
    Ok(store)
}

fn registry_lookup() -> anyhow::Result<ProviderLookup> {
    let url = registry_url_from_env_value(std::env::var("NPI_REGISTRY_URL").ok());
    let client = NpiRegistryClient::new(url)?;
    Ok(ProviderLookup::new(Arc::new(client)))
}

async fn run_store_command(mut store: DirectoryStore, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::List => {
            let state = store.state();
            if state.organizations().is_empty() && state.independent_providers().is_empty() {
                println!("No organizations or providers found.");
            }
            for organization in state.organizations() {
                print_organization(organization, false);
            }
            for provider in state.independent_providers() {
                print_provider(provider, "");
            }
        }
        Commands::Search { query } => {
            let results = store.search(&query);
            println!("{} result(s)", results.total());
            for hit in &results.organizations {
                print_organization(&hit.organization, hit.highlighted);
            }
            for provider in &results.independent_providers {
                print_provider(provider, "");
            }
        }
        Commands::Insurances => {
            for name in store.available_insurances() {
                println!("{name}");
            }
        }
        Commands::AddOrganization(fields) => {
            let mut draft = OrganizationDraft::default();
            let insurances = fields.apply(&mut draft);
            select_insurances(&mut store, &mut draft.insurances, &insurances);
            let organization = store.create_organization(draft).await?;
            println!("Added organization {} ({})", organization.name, organization.id);
        }
        Commands::AddProvider {
            organization,
            prefill,
            fields,
        } => {
            let mut draft = ProviderDraft::default();
            if prefill {
                let name = fields.name.clone().unwrap_or_default();
                prefill_draft(&mut draft, &name).await?;
            }
            let insurances = fields.apply(&mut draft);
            select_insurances(&mut store, &mut draft.insurances, &insurances);
            let provider = store
                .create_provider(organization.map(RecordId::new), draft)
                .await?;
            println!("Added provider {} ({})", provider.name, provider.id);
        }
        Commands::UpdateOrganization {
            id,
            fields,
            remove_insurances,
        } => {
            let id = RecordId::new(id);
            let mut draft = store
                .state()
                .organization(&id)
                .map(OrganizationDraft::from_record)
                .with_context(|| format!("organization {id} not found"))?;
            let insurances = fields.apply(&mut draft);
            select_insurances(&mut store, &mut draft.insurances, &insurances);
            for name in &remove_insurances {
                draft.insurances.remove(name);
            }
            store.update_organization(id.clone(), draft).await?;
            println!("Updated organization {id}");
        }
        Commands::UpdateProvider {
            id,
            fields,
            remove_insurances,
        } => {
            let id = RecordId::new(id);
            let mut draft = store
                .state()
                .provider(&id)
                .map(ProviderDraft::from_record)
                .with_context(|| format!("provider {id} not found"))?;
            let insurances = fields.apply(&mut draft);
            select_insurances(&mut store, &mut draft.insurances, &insurances);
            for name in &remove_insurances {
                draft.insurances.remove(name);
            }
            store.update_provider(id.clone(), draft).await?;
            println!("Updated provider {id}");
        }
        Commands::DeleteOrganization { id } => {
            let id = RecordId::new(id);
            store.delete_organization(id.clone()).await?;
            println!("Deleted organization {id}");
        }
        Commands::DeleteProvider { id } => {
            let id = RecordId::new(id);
            store.delete_provider(id.clone()).await?;
            println!("Deleted provider {id}");
        }
        Commands::Lookup { .. } | Commands::Watch { .. } => {}
    }

    Ok(())
}

fn select_insurances(store: &mut DirectoryStore, selection: &mut InsuranceSet, names: &[String]) {
    for name in names {
        store.add_custom_insurance(selection, name);
    }
}

async fn prefill_draft(draft: &mut ProviderDraft, name: &str) -> anyhow::Result<()> {
    let lookup = registry_lookup()?;
    match lookup.candidates(name).await?.into_iter().next() {
        Some(candidate) => {
            eprintln!("Pre-filling from {} (NPI {})", candidate.name, candidate.npi);
            candidate.apply_to(draft);
        }
        None => eprintln!("No NPI records found for \"{name}\"; using the given fields."),
    }
    Ok(())
}

async fn lookup(name: &str) -> anyhow::Result<()> {
    let lookup = registry_lookup()?;
    let candidates = match lookup.candidates(name).await {
        Ok(candidates) if candidates.is_empty() => vec![RegistryCandidate::no_results(name)],
        Ok(candidates) => candidates,
        Err(e) => vec![RegistryCandidate::lookup_failed(name, &e.to_string())],
    };
    for candidate in &candidates {
        print_candidate(candidate);
    }
    Ok(())
}

async fn watch(direct: bool, delay: Duration) -> anyhow::Result<()> {
    let source: Arc<dyn CandidateSource> = if direct {
        Arc::new(registry_lookup()?)
    } else {
        let url =
            std::env::var("DIRECTORY_PROXY_URL").unwrap_or_else(|_| DEFAULT_PROXY_URL.into());
        Arc::new(ProxyClient::new(&url)?)
    };

    let (mut debounced, mut updates) = DebouncedLookup::new(source, delay);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;
    let mut pending = false;

    while input_open || pending {
        tokio::select! {
            line = lines.next_line(), if input_open => match line? {
                Some(name) => {
                    debounced.submit(name);
                    pending = true;
                }
                None => input_open = false,
            },
            update = updates.recv(), if pending => match update {
                Some(update) if debounced.is_current(&update) => {
                    pending = false;
                    print_update(&update);
                }
                Some(_) => {}
                None => pending = false,
            },
        }
    }

    Ok(())
}

fn print_update(update: &LookupUpdate) {
    if update.candidates.is_empty() {
        println!("-- \"{}\": keep typing", update.name);
        return;
    }
    println!("-- \"{}\":", update.name);
    for candidate in &update.candidates {
        print_candidate(candidate);
    }
}

fn print_organization(organization: &Organization, highlighted: bool) {
    let marker = if highlighted { "*" } else { " " };
    println!(
        "{marker} [{}] {} | {} | {}",
        organization.id, organization.name, organization.phone, organization.address
    );
    print_insurances("    ", &organization.insurances);
    for provider in &organization.providers {
        print_provider(provider, "    ");
    }
}

fn print_provider(provider: &Provider, indent: &str) {
    println!(
        "{indent}  [{}] {} ({}) | {} | NPI {}",
        provider.id,
        provider.name,
        provider.specialty,
        provider.phone,
        provider.npi.as_deref().unwrap_or("-")
    );
    print_insurances(&format!("{indent}    "), &provider.insurances);
}

fn print_insurances(indent: &str, insurances: &InsuranceSet) {
    if !insurances.is_empty() {
        println!(
            "{indent}insurances: {}",
            insurances.iter().collect::<Vec<_>>().join(", ")
        );
    }
}

fn print_candidate(candidate: &RegistryCandidate) {
    println!(
        "  {} | {} | {} | {} | NPI {} [{}]",
        candidate.name,
        candidate.specialty,
        candidate.phone,
        candidate.address,
        candidate.npi,
        candidate.source
    );
}

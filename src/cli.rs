//! CLI definitions and command routing.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use crate::config::{AppPaths, Config, HostsLocation};
use crate::merge::{merge, MergeMode};
use crate::model::{BackupInfo, HostsDocument};
use crate::platform::{self, FileHostsStore, HostsStore, Prober, Resolver};
use crate::profile::{ProfileBook, SsidRules};
use crate::remote::{HttpFetcher, RemoteSourceList};
use crate::store::{self, FileSettingsStore};
use crate::{codec, conflicts, doctor, filter, hosts, interchange, logging, rawedit, validate};

#[derive(Parser)]
#[command(name = "easyhosts")]
#[command(about = "Edit the hosts file with backups, profiles and remote lists")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List entries (numbered, as used by enable/disable/remove)
    List {
        /// Only entries whose domain, IP or comment contains this text
        #[arg(long, short)]
        query: Option<String>,
        /// Only entries carrying this tag (repeatable; untagged entries are "etc")
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Print matching entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add an entry
    Add {
        ip: String,
        #[arg(required = true, num_args = 1..)]
        domains: Vec<String>,
        #[arg(long)]
        comment: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        /// Add the entry commented out
        #[arg(long)]
        disabled: bool,
    },

    /// Enable entry number N
    Enable { index: usize },

    /// Disable (comment out) entry number N
    Disable { index: usize },

    /// Remove entry number N
    Remove { index: usize },

    /// Show domains mapped to more than one address
    Dups,

    /// List all tags in use
    Tags,

    /// Print the hosts file as it would be written
    Raw,

    /// Replace the hosts file with an edited copy, showing the diff first
    Apply {
        file: PathBuf,
        /// Only show the diff
        #[arg(long)]
        dry_run: bool,
    },

    /// Export entries and sections
    Export {
        #[arg(long, value_enum, default_value_t = Format::Hosts)]
        format: Format,
        /// Write here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Import a JSON export or hosts-format file
    Import {
        file: PathBuf,
        /// merge (append) or replace; defaults to config default_merge_mode
        #[arg(long)]
        mode: Option<MergeMode>,
    },

    /// Manage backups (list, restore, delete)
    Backup {
        #[command(subcommand)]
        cmd: BackupCmd,
    },

    /// Manage saved profiles (list, save, activate, delete)
    Profile {
        #[command(subcommand)]
        cmd: ProfileCmd,
    },

    /// Manage remote hosts lists (list, add, remove, toggle, apply)
    Remote {
        #[command(subcommand)]
        cmd: RemoteCmd,
    },

    /// Map network names to profiles (list, set, remove, switch)
    Ssid {
        #[command(subcommand)]
        cmd: SsidCmd,
    },

    /// Resolve a domain through the system resolver
    Lookup { domain: String },

    /// Check whether a domain accepts TCP connections
    Ping {
        domain: String,
        #[arg(long, default_value_t = 80)]
        port: u16,
    },

    /// Overwrite the hosts file with the platform default (backed up first)
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },

    /// Check hosts file access, conflicts and backups
    Doctor,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Format {
    /// Hosts file text
    Hosts,
    /// JSON envelope with version and export time
    Json,
}

#[derive(Subcommand)]
pub enum BackupCmd {
    /// List backups, newest first
    List,
    /// Restore a backup by filename (current content is backed up first)
    Restore { name: String },
    /// Delete a backup by filename
    Delete { name: String },
}

#[derive(Subcommand)]
pub enum ProfileCmd {
    /// List saved profiles
    List,
    /// Save the current hosts file as a profile
    Save {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Replace the hosts file with a profile (by id or name)
    Activate { name: String },
    /// Delete a profile (by id or name)
    Delete { name: String },
}

#[derive(Subcommand)]
pub enum RemoteCmd {
    /// List remote sources
    List,
    /// Subscribe to an http(s) hosts list
    Add { name: String, url: String },
    /// Remove a source (by id or name)
    Remove { name: String },
    /// Enable or disable a source (by id or name)
    Toggle { name: String },
    /// Fetch a source and merge it into the hosts file
    Apply {
        name: String,
        #[arg(long)]
        mode: Option<MergeMode>,
    },
}

#[derive(Subcommand)]
pub enum SsidCmd {
    /// List SSID rules
    List,
    /// Switch to PROFILE when on network SSID
    Set { ssid: String, profile: String },
    /// Remove the rule for SSID
    Remove { ssid: String },
    /// Activate the profile mapped to SSID
    Switch { ssid: String },
}

/// Everything a command needs: resolved paths, config and the hosts store.
struct Session {
    paths: AppPaths,
    config: Config,
    location: HostsLocation,
    store: FileHostsStore,
}

impl Session {
    fn open(paths: AppPaths, config: Config) -> Self {
        let location = config.hosts_location();
        let store = FileHostsStore::new(&location.hosts_path, &location.backup_dir);
        Self {
            paths,
            config,
            location,
            store,
        }
    }

    fn settings(&self) -> FileSettingsStore {
        FileSettingsStore::open(&self.paths)
    }

    fn load(&self) -> Result<HostsDocument> {
        hosts::load_document(&self.store)
            .with_context(|| format!("reading {}", self.location.hosts_path.display()))
    }

    fn require_write(&self) -> Result<()> {
        if self.location.overridden || platform::default_privilege().is_elevated() {
            return Ok(());
        }
        bail!(
            "writing {} requires elevated privileges (run as root or administrator)",
            self.location.hosts_path.display()
        )
    }

    fn commit(&self, doc: &HostsDocument) -> Result<()> {
        self.require_write()?;
        let backup = hosts::save_document(&self.store, doc)?;
        println!(
            "Saved {} (backup: {})",
            self.location.hosts_path.display(),
            backup.display()
        );
        Ok(())
    }

    fn find_backup(&self, name: &str) -> Result<BackupInfo> {
        let backups = self.store.list_backups()?;
        backups
            .into_iter()
            .find(|b| b.filename == name || b.path == Path::new(name))
            .with_context(|| format!("no backup named {name}"))
    }
}

/// Run CLI and dispatch to handlers.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let paths = AppPaths::default_paths();
    let config = store::load_config(&paths)?;
    logging::init(config.log_filter.as_deref());
    let session = Session::open(paths, config);

    match cli.command {
        Commands::List { query, tags, json } => cmd_list(&session, query, tags, json),
        Commands::Add {
            ip,
            domains,
            comment,
            tags,
            disabled,
        } => cmd_add(&session, &ip, &domains, comment, tags, disabled),
        Commands::Enable { index } => cmd_set_enabled(&session, index, true),
        Commands::Disable { index } => cmd_set_enabled(&session, index, false),
        Commands::Remove { index } => cmd_remove(&session, index),
        Commands::Dups => cmd_dups(&session),
        Commands::Tags => {
            for tag in filter::all_tags(&session.load()?) {
                println!("{tag}");
            }
            Ok(())
        }
        Commands::Raw => {
            print!("{}", rawedit::raw_text(&session.load()?));
            Ok(())
        }
        Commands::Apply { file, dry_run } => cmd_apply(&session, &file, dry_run),
        Commands::Export { format, output } => cmd_export(&session, format, output),
        Commands::Import { file, mode } => cmd_import(&session, &file, mode),
        Commands::Backup { cmd } => cmd_backup(&session, cmd),
        Commands::Profile { cmd } => cmd_profile(&session, cmd),
        Commands::Remote { cmd } => cmd_remote(&session, cmd),
        Commands::Ssid { cmd } => cmd_ssid(&session, cmd),
        Commands::Lookup { domain } => {
            let ip = platform::SystemResolver.lookup_address(&domain)?;
            println!("{ip}");
            Ok(())
        }
        Commands::Ping { domain, port } => {
            let prober = platform::TcpProber {
                port,
                ..Default::default()
            };
            let result = prober.ping(&domain);
            println!("{}", result.message);
            if !result.success {
                bail!("{domain} is not reachable on port {port}");
            }
            Ok(())
        }
        Commands::Reset { yes } => {
            if !yes {
                bail!("reset overwrites the hosts file; pass --yes to confirm");
            }
            session.require_write()?;
            let backup = hosts::reset_to_default(&session.store)?;
            println!("Reset {} (backup: {})", session.location.hosts_path.display(), backup.display());
            Ok(())
        }
        Commands::Doctor => cmd_doctor(&session),
    }
}

/// 1-based index as printed by `list`.
fn entry_index(doc: &HostsDocument, n: usize) -> Result<usize> {
    if n == 0 || n > doc.entries.len() {
        bail!("no entry #{n} (there are {})", doc.entries.len());
    }
    Ok(n - 1)
}

fn cmd_list(session: &Session, query: Option<String>, tags: Vec<String>, json: bool) -> Result<()> {
    let doc = session.load()?;
    let matches = filter::filter_entries(&doc, query.as_deref().unwrap_or(""), &tags);
    if json {
        let entries: Vec<_> = matches.iter().map(|&i| &doc.entries[i]).collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    for i in matches {
        let e = &doc.entries[i];
        let mark = if e.enabled { "on " } else { "off" };
        let mut line = format!("{:>3}  {mark}  {}\t{}", i + 1, e.ip, e.domains.join(" "));
        if let Some(c) = &e.comment {
            line.push_str(&format!("  # {c}"));
        }
        line.push_str(&format!("  [{}]", e.effective_tags().join(", ")));
        println!("{line}");
    }
    Ok(())
}

fn cmd_add(
    session: &Session,
    ip: &str,
    domains: &[String],
    comment: Option<String>,
    tags: Option<String>,
    disabled: bool,
) -> Result<()> {
    let mut entry =
        validate::entry_from_input(ip, &domains.join(" "), comment.as_deref(), tags.as_deref())?;
    entry.enabled = !disabled;
    let doc = session.load()?;
    let next = doc
        .upsert_entry(None, entry)
        .context("entry could not be added")?;
    session.commit(&next)?;
    println!("Added entry #{}", next.entries.len());
    Ok(())
}

fn cmd_set_enabled(session: &Session, n: usize, enabled: bool) -> Result<()> {
    let doc = session.load()?;
    let i = entry_index(&doc, n)?;
    let next = doc
        .set_entry_enabled(i, enabled)
        .with_context(|| format!("no entry #{n}"))?;
    session.commit(&next)
}

fn cmd_remove(session: &Session, n: usize) -> Result<()> {
    let doc = session.load()?;
    let i = entry_index(&doc, n)?;
    let next = doc
        .remove_entry(i)
        .with_context(|| format!("no entry #{n}"))?;
    session.commit(&next)
}

fn cmd_dups(session: &Session) -> Result<()> {
    let dups = conflicts::detect_duplicates(&session.load()?);
    if dups.is_empty() {
        println!("No conflicting domains.");
    }
    for dup in dups {
        let places: Vec<String> = dup
            .entries
            .iter()
            .map(|o| format!("{} (#{})", o.ip, o.index + 1))
            .collect();
        println!("{}: {}", dup.domain, places.join(", "));
    }
    Ok(())
}

fn cmd_apply(session: &Session, file: &Path, dry_run: bool) -> Result<()> {
    let doc = session.load()?;
    let original = rawedit::raw_text(&doc);
    let edited =
        std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let diff = rawedit::raw_diff(&original, &edited);
    if diff.is_empty() {
        println!("No changes.");
        return Ok(());
    }
    for line in &diff {
        let sign = match line.kind {
            rawedit::DiffKind::Same => ' ',
            rawedit::DiffKind::Added => '+',
            rawedit::DiffKind::Removed => '-',
        };
        println!("{sign}{}", line.text);
    }
    if dry_run {
        return Ok(());
    }
    let next = rawedit::reapply(&edited)?;
    session.commit(&next)
}

fn cmd_export(session: &Session, format: Format, output: Option<PathBuf>) -> Result<()> {
    let doc = session.load()?;
    let text = match format {
        Format::Hosts => interchange::export_hosts(&doc),
        Format::Json => interchange::export_json(&doc)?,
    };
    match output {
        Some(path) => {
            std::fs::write(&path, &text).with_context(|| format!("writing {}", path.display()))?;
            println!("Exported {} entries to {}", doc.entries.len(), path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn looks_like_json(path: &Path, text: &str) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case("json"))
        || text.trim_start().starts_with('{')
}

fn cmd_import(session: &Session, file: &Path, mode: Option<MergeMode>) -> Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let text = String::from_utf8_lossy(&bytes);
    let incoming = if looks_like_json(file, &text) {
        interchange::import_json(&text)?
    } else {
        codec::decode_bytes(&bytes)?
    };
    let mode = mode.unwrap_or(session.config.default_merge_mode);
    let next = merge(&session.load()?, &incoming, mode);
    session.commit(&next)?;
    println!("Imported {} entries ({mode})", incoming.entries.len());
    Ok(())
}

fn cmd_backup(session: &Session, cmd: BackupCmd) -> Result<()> {
    match cmd {
        BackupCmd::List => {
            for b in session.store.list_backups()? {
                println!("{}\t{}\t{} bytes", b.filename, b.timestamp, b.size);
            }
            Ok(())
        }
        BackupCmd::Restore { name } => {
            let backup = session.find_backup(&name)?;
            session.require_write()?;
            let fresh = hosts::restore(&session.store, &backup.path)?;
            println!("Restored {} (previous content saved as {})", backup.filename, fresh.display());
            Ok(())
        }
        BackupCmd::Delete { name } => {
            let backup = session.find_backup(&name)?;
            session.store.delete_backup(&backup.path)?;
            println!("Deleted backup {}", backup.filename);
            Ok(())
        }
    }
}

fn cmd_profile(session: &Session, cmd: ProfileCmd) -> Result<()> {
    let settings = session.settings();
    let mut book = ProfileBook::load(&settings)?;
    match cmd {
        ProfileCmd::List => {
            let active = book.active_profile_id.as_deref();
            for p in &book.profiles {
                let mark = if Some(p.id.as_str()) == active { "*" } else { " " };
                println!(
                    "{mark} {}\t{}\t{} entries\t{}",
                    p.id,
                    p.name,
                    p.hosts_data.entries.len(),
                    p.description.as_deref().unwrap_or("")
                );
            }
            Ok(())
        }
        ProfileCmd::Save { name, description } => {
            let doc = session.load()?;
            let id = book.create(&name, description.as_deref(), &doc)?.id.clone();
            book.save(&settings)?;
            println!("Saved profile {name} ({id})");
            Ok(())
        }
        ProfileCmd::Activate { name } => {
            let id = book
                .find(&name)
                .map(|p| p.id.clone())
                .with_context(|| format!("no profile named {name}"))?;
            activate_profile(session, &mut book, &id)?;
            book.save(&settings)?;
            Ok(())
        }
        ProfileCmd::Delete { name } => {
            let id = book
                .find(&name)
                .map(|p| p.id.clone())
                .with_context(|| format!("no profile named {name}"))?;
            book.delete(&id);
            book.save(&settings)?;
            println!("Deleted profile {name}");
            Ok(())
        }
    }
}

fn activate_profile(session: &Session, book: &mut ProfileBook, id: &str) -> Result<()> {
    let current = session.load()?;
    let next = book
        .activate(id, &current)
        .with_context(|| format!("no profile with id {id}"))?;
    session.commit(&next)?;
    if let Some(p) = book.get(id) {
        println!("Activated profile {}", p.name);
    }
    Ok(())
}

fn cmd_remote(session: &Session, cmd: RemoteCmd) -> Result<()> {
    let settings = session.settings();
    let mut list = RemoteSourceList::load(&settings)?;
    let lookup = |list: &RemoteSourceList, name: &str| -> Result<String> {
        list.find(name)
            .map(|s| s.id.clone())
            .with_context(|| format!("no remote source named {name}"))
    };
    match cmd {
        RemoteCmd::List => {
            for s in &list.sources {
                let state = if s.enabled { "on " } else { "off" };
                let status = match s.last_status {
                    Some(crate::remote::SourceStatus::Ok) => "ok",
                    Some(crate::remote::SourceStatus::Error) => "error",
                    None => "-",
                };
                println!(
                    "{state} {}\t{}\t{}\t{status}\t{}",
                    s.id,
                    s.name,
                    s.url,
                    s.last_updated.as_deref().unwrap_or("never")
                );
            }
            Ok(())
        }
        RemoteCmd::Add { name, url } => {
            let id = list.add(&name, &url)?.id.clone();
            list.save(&settings)?;
            println!("Added remote source {name} ({id})");
            Ok(())
        }
        RemoteCmd::Remove { name } => {
            let id = lookup(&list, &name)?;
            list.remove(&id);
            list.save(&settings)?;
            println!("Removed remote source {name}");
            Ok(())
        }
        RemoteCmd::Toggle { name } => {
            let id = lookup(&list, &name)?;
            let enabled = list.toggle(&id).unwrap_or(false);
            list.save(&settings)?;
            println!("{name}: {}", if enabled { "enabled" } else { "disabled" });
            Ok(())
        }
        RemoteCmd::Apply { name, mode } => {
            let id = lookup(&list, &name)?;
            if list.get(&id).is_some_and(|s| !s.enabled) {
                bail!("remote source {name} is disabled");
            }
            let mode = mode.unwrap_or(session.config.default_merge_mode);
            let base = session.load()?;
            let fetcher = HttpFetcher::new()?;
            let result = list.apply(&id, &fetcher, &base, mode);
            list.save(&settings)?;
            match result {
                Some(Ok(next)) => session.commit(&next),
                Some(Err(e)) => Err(e.into()),
                None => bail!("no remote source named {name}"),
            }
        }
    }
}

fn cmd_ssid(session: &Session, cmd: SsidCmd) -> Result<()> {
    let settings = session.settings();
    let mut rules = SsidRules::load(&settings)?;
    match cmd {
        SsidCmd::List => {
            let book = ProfileBook::load(&settings)?;
            for r in &rules.rules {
                let name = book.get(&r.profile_id).map(|p| p.name.as_str()).unwrap_or("?");
                println!("{}\t{}\t{name}", r.ssid, r.profile_id);
            }
            Ok(())
        }
        SsidCmd::Set { ssid, profile } => {
            let book = ProfileBook::load(&settings)?;
            let id = book
                .find(&profile)
                .map(|p| p.id.clone())
                .with_context(|| format!("no profile named {profile}"))?;
            rules.upsert(&ssid, &id)?;
            rules.save(&settings)?;
            println!("{ssid} -> {profile}");
            Ok(())
        }
        SsidCmd::Remove { ssid } => {
            if !rules.remove(&ssid) {
                bail!("no rule for {ssid}");
            }
            rules.save(&settings)?;
            println!("Removed rule for {ssid}");
            Ok(())
        }
        SsidCmd::Switch { ssid } => {
            let id = rules
                .profile_for(&ssid)
                .map(str::to_string)
                .with_context(|| format!("no rule for {ssid}"))?;
            let mut book = ProfileBook::load(&settings)?;
            activate_profile(session, &mut book, &id)?;
            book.save(&settings)?;
            Ok(())
        }
    }
}

fn cmd_doctor(session: &Session) -> Result<()> {
    let privilege = platform::default_privilege();
    let results = doctor::run_checks(&session.location, &session.store, privilege.as_ref());
    for r in &results {
        let mark = if r.ok { "ok" } else { "!!" };
        println!("[{mark}] {}", r.message);
    }
    Ok(())
}

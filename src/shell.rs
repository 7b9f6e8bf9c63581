//! Line-oriented terminal shell
//!
//! Reads one command per line from stdin and drives [`Browser`]. All
//! rendering lives here; the core only hands back nodes and errors.

use std::io::Write;

use anyhow::Result;
use s3_tree::browser::Browser;
use s3_tree::error::BrowserError;
use s3_tree::s3::ConnectionProfile;
use s3_tree::settings::Settings;
use s3_tree::tree::{KeyTree, NodeId, NodeKind};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

const HELP: &str = "\
Commands:
  profiles                  list saved connection profiles
  new                       create a connection profile
  connect <profile>         connect using a saved profile
  buckets                   list buckets of the current connection
  open <bucket>             show a bucket as a tree
  tree                      print the expanded tree
  expand <key>              load and show the children of a directory
  collapse <key>            hide the children of a directory
  mkdir <parent-key> <name> create a directory (use / for the bucket root)
  info <key>                show object metadata
  help                      show this help
  quit                      exit";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Help,
    Quit,
    Profiles,
    NewProfile,
    Connect(String),
    Buckets,
    Open(String),
    Tree,
    Expand(String),
    Collapse(String),
    Mkdir { parent: String, name: String },
    Info(String),
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    fn parse(line: &str) -> std::result::Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let required = |what: &str| -> std::result::Result<String, String> {
            if rest.is_empty() {
                Err(format!("usage: {} <{}>", word, what))
            } else {
                Ok(rest.to_string())
            }
        };

        let command = match word {
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            "profiles" => Command::Profiles,
            "new" => Command::NewProfile,
            "connect" => Command::Connect(required("profile")?),
            "buckets" => Command::Buckets,
            "open" => Command::Open(required("bucket")?),
            "tree" | "ls" => Command::Tree,
            "expand" => Command::Expand(rest.to_string()),
            "collapse" => Command::Collapse(rest.to_string()),
            "info" => Command::Info(required("key")?),
            "mkdir" => match rest.split_once(char::is_whitespace) {
                Some((parent, name)) if !name.trim().is_empty() => Command::Mkdir {
                    parent: parent.to_string(),
                    name: name.trim().to_string(),
                },
                _ => return Err("usage: mkdir <parent-key> <name>".to_string()),
            },
            other => return Err(format!("unknown command '{}'; type 'help'", other)),
        };

        Ok(Some(command))
    }
}

/// Indented rows for every visible node
fn render_tree(tree: &KeyTree) -> Vec<String> {
    tree.visible_rows()
        .into_iter()
        .map(|(depth, node)| {
            let marker = match (node.is_directory(), node.is_expanded()) {
                (true, true) => "- ",
                (true, false) => "+ ",
                (false, _) => "  ",
            };
            format!("{}{}{}", "  ".repeat(depth), marker, node.label())
        })
        .collect()
}

/// Whether `open_bucket` left the bucket open, possibly awaiting a retry
fn opened<T>(result: &std::result::Result<T, BrowserError>) -> bool {
    matches!(result, Ok(_) | Err(BrowserError::Network(_)))
}

fn report(err: &BrowserError) {
    println!("error [{}]: {}", err.kind(), err);
}

pub struct Shell {
    browser: Browser,
    settings: Settings,
    lines: Lines<BufReader<Stdin>>,
}

impl Shell {
    pub fn new(browser: Browser, settings: Settings) -> Self {
        Self {
            browser,
            settings,
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Read and execute commands until `quit` or end of input
    pub async fn run(&mut self) -> Result<()> {
        println!("s3-tree {} - type 'help' for commands", env!("CARGO_PKG_VERSION"));

        loop {
            print!("{}> ", self.browser.profile_name().unwrap_or("s3-tree"));
            std::io::stdout().flush()?;

            let Some(line) = self.lines.next_line().await? else {
                println!();
                break;
            };

            match Command::parse(&line) {
                Ok(None) => {}
                Ok(Some(Command::Quit)) => break,
                Ok(Some(command)) => self.execute(command).await?,
                Err(usage) => println!("{}", usage),
            }
        }

        Ok(())
    }

    async fn execute(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Help => println!("{}", HELP),
            Command::Quit => {}
            Command::Profiles => match self.browser.list_profiles() {
                Ok(names) if names.is_empty() => println!(
                    "No connections in {:?}; create one with 'new'",
                    self.browser.registry().dir()
                ),
                Ok(names) => names.iter().for_each(|n| println!("  {}", n)),
                Err(e) => report(&e),
            },
            Command::NewProfile => self.new_profile().await?,
            Command::Connect(name) => self.connect(&name, None).await,
            Command::Buckets => match self.browser.list_buckets().await {
                Ok(buckets) => buckets.iter().for_each(|b| println!("  {}", b.name)),
                Err(e) => report(&e),
            },
            Command::Open(bucket) => self.open(&bucket).await,
            Command::Tree => self.print_tree(),
            Command::Expand(key) => {
                if let Some(id) = self.resolve(&key) {
                    match self.browser.expand(id).await {
                        Ok(_) => self.print_tree(),
                        Err(e) => report(&e),
                    }
                }
            }
            Command::Collapse(key) => {
                if let Some(id) = self.resolve(&key) {
                    match self.browser.collapse(id) {
                        Ok(()) => self.print_tree(),
                        Err(e) => report(&e),
                    }
                }
            }
            Command::Mkdir { parent, name } => {
                if let Some(id) = self.resolve(&parent) {
                    match self.browser.create_directory(id, &name).await {
                        Ok(key) => {
                            println!("Created {}", key);
                            self.print_tree();
                        }
                        Err(e) => report(&e),
                    }
                }
            }
            Command::Info(key) => self.info(&key).await,
        }

        Ok(())
    }

    /// Connect with `profile` and open `preferred_bucket` if the store has
    /// it, else the first bucket.
    pub async fn connect(&mut self, profile: &str, preferred_bucket: Option<&str>) {
        println!("Connecting with '{}'...", profile);

        let buckets = match self.browser.establish_session(profile).await {
            Ok(buckets) => buckets,
            Err(e) => {
                tracing::error!("Failed to connect with '{}': {}", profile, e);
                report(&e);
                return;
            }
        };

        self.settings.set_profile(Some(profile));
        self.save_settings();

        let bucket = preferred_bucket
            .and_then(|p| buckets.iter().find(|b| b.name == p))
            .or_else(|| buckets.first());

        match bucket {
            Some(bucket) => {
                let name = bucket.name.clone();
                println!("Loaded {} buckets", buckets.len());
                self.open(&name).await;
            }
            None => println!("Connected, but no buckets were found"),
        }
    }

    async fn open(&mut self, bucket: &str) {
        let result = self.browser.open_bucket(bucket).await;

        if opened(&result) {
            self.settings.set_bucket(Some(bucket));
            self.save_settings();
        }

        match result {
            Ok(_) => self.print_tree(),
            Err(e @ BrowserError::Network(_)) => {
                report(&e);
                println!("Retry with 'expand /'");
            }
            Err(e) => report(&e),
        }
    }

    async fn info(&mut self, key: &str) {
        let kind = self
            .browser
            .tree()
            .and_then(|tree| tree.find(key).and_then(|id| tree.get(id)))
            .map(|node| node.kind())
            .unwrap_or_else(|| NodeKind::from_key(key));

        match self.browser.stat_object(key).await {
            Ok(info) => {
                println!("Key:           {}", info.key);
                println!("Kind:          {}", kind.describe());
                println!("Size:          {}", info.size_string());
                println!(
                    "Last modified: {}",
                    info.last_modified
                        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "-".to_string())
                );
                println!("ETag:          {}", info.etag.as_deref().unwrap_or("-"));
            }
            Err(BrowserError::NotFound(_)) if kind == NodeKind::Directory => {
                println!("{} is an implicit directory (no marker object)", key);
            }
            Err(e) => report(&e),
        }
    }

    async fn new_profile(&mut self) -> Result<()> {
        let Some(name) = self.prompt("Name").await? else { return Ok(()) };
        let Some(endpoint) = self.prompt("S3 Endpoint").await? else { return Ok(()) };
        let Some(access_key) = self.prompt("Access Key").await? else { return Ok(()) };
        let Some(secret_key) = self.prompt("Secret Key").await? else { return Ok(()) };
        let Some(ignore) = self.prompt("Ignore SSL Verification [y/N]").await? else {
            return Ok(());
        };

        let profile = ConnectionProfile {
            name,
            endpoint,
            access_key,
            secret_key,
            ignore_ssl_verification: matches!(ignore.trim(), "y" | "Y" | "yes"),
        };

        match self.browser.save_profile(&profile) {
            Ok(()) => println!("Connection information saved successfully!"),
            Err(e) => report(&e),
        }

        Ok(())
    }

    async fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        print!("{}: ", label);
        std::io::stdout().flush()?;
        Ok(self.lines.next_line().await?)
    }

    fn resolve(&self, key: &str) -> Option<NodeId> {
        match self.browser.resolve(key) {
            Ok(id) => Some(id),
            Err(e) => {
                report(&e);
                None
            }
        }
    }

    fn print_tree(&self) {
        match self.browser.tree() {
            Some(tree) => {
                let rows = render_tree(tree);
                tracing::debug!("Showing {} of {} loaded nodes", rows.len(), tree.node_count());
                rows.iter().for_each(|row| println!("{}", row));
            }
            None => println!("No bucket is open"),
        }
    }

    fn save_settings(&self) {
        if let Err(e) = self.settings.save() {
            tracing::warn!("Failed to save settings: {}", e);
        }
    }
}
